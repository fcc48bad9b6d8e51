//! Data table and company average cards.

use crate::config::CompanyLogos;
use crate::data::{format_currency, DisplayTable};
use crate::stats::{AveragePrice, CompanyAverage};
use egui::{Color32, RichText};
use egui_extras::{Column as TableColumn, TableBuilder};

const TABLE_HEIGHT: f32 = 420.0;
const ROW_HEIGHT: f32 = 20.0;

/// Formatted share price table.
pub fn show_data_table(ui: &mut egui::Ui, table: &DisplayTable) {
    if table.headers.is_empty() {
        ui.label("No data available");
        return;
    }

    ui.push_id("data_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(TableColumn::auto().at_least(90.0), table.headers.len())
            .min_scrolled_height(0.0)
            .max_scroll_height(TABLE_HEIGHT)
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for name in &table.headers {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, table.row_count(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

/// One bordered card per company with logo and average price.
pub fn show_average_cards(ui: &mut egui::Ui, averages: &[CompanyAverage], logos: &CompanyLogos) {
    for entry in averages {
        egui::Frame::none()
            .stroke(egui::Stroke::new(2.0, Color32::GRAY))
            .rounding(5.0)
            .inner_margin(10.0)
            .outer_margin(5.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    if let Some(url) = logos.logo_for(&entry.company) {
                        ui.add(egui::Image::new(url).fit_to_exact_size(egui::vec2(50.0, 50.0)));
                        ui.add_space(20.0);
                    }
                    ui.label(RichText::new(&entry.company).strong().size(14.0));
                    ui.add_space(20.0);
                    match entry.average {
                        AveragePrice::Value(price) => {
                            ui.label(RichText::new(format_currency(price)).size(21.0));
                        }
                        AveragePrice::NoData => {
                            ui.label(
                                RichText::new("No data available")
                                    .size(16.0)
                                    .color(Color32::GRAY),
                            );
                        }
                    }
                });
            });
    }
}
