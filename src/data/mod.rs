//! Data module - CSV loading, cleaning, formatting and reshaping

mod cleaner;
mod formatter;
pub mod loader;
mod pipeline;
mod processor;

pub use formatter::{format_currency, DisplayTable};
pub use pipeline::{Dashboard, PriceSeriesCache};
pub use processor::{
    axis_to_date_label, date_to_axis, DataProcessor, PricePoint, PriceType, ProcessorError,
    VolumePoint, VolumePolicy,
};
