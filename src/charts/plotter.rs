//! Chart Plotter Module
//! Interactive dashboard charts drawn with egui_plot.

use super::palette::{price_shade, series_color, viridis_for};
use super::series::{bar_values, price_lines, volume_lines};
use crate::data::{axis_to_date_label, PricePoint, VolumePoint};
use crate::stats::CompanyAverage;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

const CHART_HEIGHT: f32 = 420.0;

fn color32(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// Draws the three dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Bar chart of average price per company, colored on a Viridis scale.
    ///
    /// Returns false when there is nothing to draw.
    pub fn draw_average_price_chart(ui: &mut egui::Ui, averages: &[CompanyAverage]) -> bool {
        let values = bar_values(averages);
        if values.is_empty() {
            return false;
        }
        let lo = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let hi = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

        let bars: Vec<Bar> = values
            .iter()
            .enumerate()
            .map(|(i, (company, value))| {
                Bar::new(i as f64, *value)
                    .name(format!("{}: ${:.2}", company, value))
                    .width(0.6)
                    .fill(color32(viridis_for(*value, lo, hi)))
            })
            .collect();

        let labels: Vec<String> = values.into_iter().map(|(company, _)| company).collect();

        Plot::new("average_price_chart")
            .height(CHART_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Company")
            .y_axis_label("Average Price ($)")
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let v = mark.value;
                if v < 0.0 || (v - v.round()).abs() > 1e-6 {
                    return String::new();
                }
                labels.get(v.round() as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars));
            });
        true
    }

    /// Open/High/Low/Close lines with markers for one company.
    pub fn draw_price_action_chart(ui: &mut egui::Ui, company: &str, points: &[PricePoint]) {
        ui.label(
            RichText::new("Click specific Price Types in legend to remove from graph")
                .size(13.0)
                .color(Color32::GRAY),
        );

        Plot::new(format!("price_action_{}", company))
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Price ($)")
            .x_axis_formatter(|mark, _range| axis_to_date_label(mark.value))
            .label_formatter(|name, value| {
                format!("{}\n{}\n${:.2}", name, axis_to_date_label(value.x), value.y)
            })
            .show(ui, |plot_ui| {
                for (i, (name, line)) in price_lines(points).into_iter().enumerate() {
                    let color = color32(price_shade(i));
                    plot_ui.line(
                        Line::new(PlotPoints::new(line.clone()))
                            .color(color)
                            .width(1.5)
                            .name(&name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::new(line))
                            .radius(2.5)
                            .color(color)
                            .name(&name),
                    );
                }
            });
    }

    /// Volume over time, one line per company. Returns false when empty.
    pub fn draw_volume_chart(ui: &mut egui::Ui, points: &[VolumePoint]) -> bool {
        let lines = volume_lines(points);
        if lines.is_empty() {
            return false;
        }

        ui.label(
            RichText::new("Click company in legend to remove it from graph")
                .size(13.0)
                .color(Color32::GRAY),
        );

        Plot::new("volume_over_time")
            .height(CHART_HEIGHT)
            .legend(Legend::default())
            .allow_scroll(false)
            .x_axis_label("Date")
            .y_axis_label("Volume")
            .x_axis_formatter(|mark, _range| axis_to_date_label(mark.value))
            .label_formatter(|name, value| {
                format!("{}\n{}\n{:.0}", name, axis_to_date_label(value.x), value.y)
            })
            .show(ui, |plot_ui| {
                for (i, (company, line)) in lines.into_iter().enumerate() {
                    let color = color32(series_color(i));
                    plot_ui.line(
                        Line::new(PlotPoints::new(line.clone()))
                            .color(color)
                            .width(1.5)
                            .name(&company),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::new(line))
                            .radius(2.5)
                            .color(color)
                            .name(&company),
                    );
                }
            });
        true
    }
}
