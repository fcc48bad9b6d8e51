//! Static Chart Renderer
//! Draws the dashboard charts into PNG files with plotters.
//!
//! Each chart is rendered into an in-memory RGB buffer and saved through
//! `image`, so the export does not depend on the window being open.

use super::palette::{price_shade, series_color, viridis_for};
use super::series::{axis_range, bar_values, price_lines, volume_lines, NamedLine};
use crate::data::{axis_to_date_label, PricePoint, VolumePoint};
use crate::stats::CompanyAverage;
use image::RgbImage;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

pub const EXPORT_SIZE: (u32, u32) = (1200, 700);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Nothing to draw: {0}")]
    NoData(&'static str),
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Failed to save image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid image buffer")]
    Buffer,
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(e.to_string())
    }
}

fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Value axis for bars: always includes zero, padded on both sides.
fn bar_y_range(lo: f64, hi: f64) -> (f64, f64) {
    let bottom = lo.min(0.0);
    let top = hi.max(0.0);
    let pad = (top - bottom) * 0.1 + 1.0;
    (if bottom < 0.0 { bottom - pad } else { 0.0 }, top + pad)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    fn render_png<F>(path: &Path, size: (u32, u32), draw: F) -> Result<(), RenderError>
    where
        F: FnOnce(&Area<'_>) -> Result<(), RenderError>,
    {
        let (width, height) = size;
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, size).into_drawing_area();
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
        }
        let img = RgbImage::from_raw(width, height, buffer).ok_or(RenderError::Buffer)?;
        img.save(path)?;
        log::info!("Chart exported to {}", path.display());
        Ok(())
    }

    /// Bar chart of average prices.
    pub fn render_average_prices(
        averages: &[CompanyAverage],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let values = bar_values(averages);
        if values.is_empty() {
            return Err(RenderError::NoData("no average prices"));
        }
        let lo = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let hi = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);
        let n = values.len();
        let (y0, y1) = bar_y_range(lo, hi);

        Self::render_png(path, size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Average Share Price by Company", ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(80)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y0..y1)?;

            let label_at = |x: &f64| {
                if (x - x.round()).abs() > 1e-6 || *x < 0.0 {
                    return String::new();
                }
                values
                    .get(x.round() as usize)
                    .map(|(company, _)| company.clone())
                    .unwrap_or_default()
            };
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n)
                .x_label_formatter(&label_at)
                .x_desc("Company")
                .y_desc("Average Price ($)")
                .draw()?;

            chart.draw_series(values.iter().enumerate().map(|(i, (_, value))| {
                let color = rgb(viridis_for(*value, lo, hi));
                let x = i as f64;
                Rectangle::new([(x - 0.3, 0.0), (x + 0.3, *value)], color.filled())
            }))?;
            Ok(())
        })
    }

    /// Price action lines for one company.
    pub fn render_price_action(
        company: &str,
        points: &[PricePoint],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let lines = price_lines(points);
        let title = format!("Price Action: {}", company);
        Self::render_lines(&title, "Price ($)", &lines, price_shade, path, size)
    }

    /// Volume over time, one line per company.
    pub fn render_volume(
        points: &[VolumePoint],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let lines = volume_lines(points);
        Self::render_lines("Volume Over Time", "Volume", &lines, series_color, path, size)
    }

    fn render_lines(
        title: &str,
        y_desc: &str,
        lines: &[NamedLine],
        color_for: fn(usize) -> [u8; 3],
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let all = || lines.iter().flat_map(|(_, line)| line.iter());
        let (Some((x0, x1)), Some((y0, y1))) = (
            axis_range(all().map(|p| p[0])),
            axis_range(all().map(|p| p[1])),
        ) else {
            return Err(RenderError::NoData("no dated points"));
        };

        Self::render_png(path, size, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(title, ("sans-serif", 24))
                .margin(15)
                .x_label_area_size(40)
                .y_label_area_size(90)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            let date_label = |x: &f64| axis_to_date_label(*x);
            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&date_label)
                .x_desc("Date")
                .y_desc(y_desc)
                .draw()?;

            for (i, (name, line)) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let color = rgb(color_for(i));
                chart
                    .draw_series(LineSeries::new(
                        line.iter().map(|p| (p[0], p[1])),
                        color.stroke_width(2),
                    ))?
                    .label(name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
                chart.draw_series(
                    line.iter()
                        .map(|p| Circle::new((p[0], p[1]), 3, color.filled())),
                )?;
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
            Ok(())
        })
    }
}
