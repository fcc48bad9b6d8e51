//! Charts module - Chart rendering

mod palette;
mod plotter;
mod renderer;
mod series;

pub use plotter::ChartPlotter;
pub use renderer::{StaticChartRenderer, EXPORT_SIZE};
