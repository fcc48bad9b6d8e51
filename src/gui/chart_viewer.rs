//! Chart Viewer Widget
//! Tabbed chart area: average prices, price action, volume.

use crate::charts::ChartPlotter;
use crate::data::{Dashboard, PricePoint, PriceSeriesCache, ProcessorError};
use egui::{Color32, ComboBox, RichText};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartTab {
    AveragePrice,
    PriceAction,
    Volume,
}

impl ChartTab {
    pub const ALL: [ChartTab; 3] = [ChartTab::AveragePrice, ChartTab::PriceAction, ChartTab::Volume];

    pub fn label(self) -> &'static str {
        match self {
            ChartTab::AveragePrice => "Average Share Price by Company",
            ChartTab::PriceAction => "Price Action",
            ChartTab::Volume => "Volume High/Low",
        }
    }
}

/// Chart area state: current tab, selected company and its cached series.
pub struct ChartViewer {
    pub tab: ChartTab,
    pub selected_company: String,
    cache: PriceSeriesCache,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            tab: ChartTab::AveragePrice,
            selected_company: String::new(),
            cache: PriceSeriesCache::new(),
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selection valid for a newly loaded dashboard.
    pub fn on_dashboard_loaded(&mut self, dashboard: &Dashboard) {
        self.cache.clear();
        if !dashboard.companies.contains(&self.selected_company) {
            self.selected_company = dashboard.companies.first().cloned().unwrap_or_default();
        }
    }

    /// Melted series for the selected company.
    pub fn price_series(&mut self, dashboard: &Dashboard) -> Result<&[PricePoint], ProcessorError> {
        self.cache.get(dashboard, &self.selected_company)
    }

    /// Draw tabs and the active chart. Returns the tab whose PNG export was
    /// requested, if any.
    pub fn show(&mut self, ui: &mut egui::Ui, dashboard: &Dashboard) -> Option<ChartTab> {
        let mut export = None;

        ui.horizontal(|ui| {
            for tab in ChartTab::ALL {
                ui.selectable_value(&mut self.tab, tab, tab.label());
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("💾 Save PNG").clicked() {
                    export = Some(self.tab);
                }
            });
        });
        ui.separator();

        match self.tab {
            ChartTab::AveragePrice => {
                if !ChartPlotter::draw_average_price_chart(ui, &dashboard.averages) {
                    ui.label("No average prices to display.");
                }
            }
            ChartTab::PriceAction => self.show_price_action(ui, dashboard),
            ChartTab::Volume => {
                if !ChartPlotter::draw_volume_chart(ui, &dashboard.volume) {
                    ui.label("No data available for volume over time.");
                }
            }
        }

        export
    }

    fn show_price_action(&mut self, ui: &mut egui::Ui, dashboard: &Dashboard) {
        ComboBox::from_label("Select a Company")
            .width(220.0)
            .selected_text(&self.selected_company)
            .show_ui(ui, |ui| {
                for company in &dashboard.companies {
                    ui.selectable_value(&mut self.selected_company, company.clone(), company);
                }
            });
        ui.add_space(8.0);

        let company = self.selected_company.clone();
        match self.cache.get(dashboard, &company) {
            Ok(points) if !points.is_empty() => {
                ChartPlotter::draw_price_action_chart(ui, &company, points);
            }
            Ok(_) => {
                ui.label("No data available");
            }
            Err(e) => {
                ui.label(
                    RichText::new(format!("Error: {}", e)).color(Color32::from_rgb(220, 53, 69)),
                );
            }
        }
    }
}
