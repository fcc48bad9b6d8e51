//! Share Dashboard Main Application
//! Single page: data table, average price cards, tabbed charts.

use crate::charts::{StaticChartRenderer, EXPORT_SIZE};
use crate::config::DashboardConfig;
use crate::data::Dashboard;
use crate::gui::table_view::{show_average_cards, show_data_table};
use crate::gui::{ChartTab, ChartViewer, ControlPanel, ControlPanelAction};
use egui::{Color32, RichText, ScrollArea, TopBottomPanel};
use std::path::{Path, PathBuf};

/// Main application window.
pub struct DashboardApp {
    config: DashboardConfig,
    dashboard: Option<Dashboard>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

/// Red rule under section headings.
fn section_rule(ui: &mut egui::Ui) {
    let (rect, _) =
        ui.allocate_exact_size(egui::vec2(ui.available_width(), 2.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, 0.0, Color32::RED);
    ui.add_space(6.0);
}

/// File-name-safe version of a company name.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let mut app = Self {
            config,
            dashboard: None,
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
        };
        let path = app.config.data_path.clone();
        app.load(&path);
        app
    }

    /// Run the whole pipeline for `path` and swap in the result.
    fn load(&mut self, path: &Path) {
        let expected = self.config.company_logos.companies();
        match Dashboard::load(path, self.config.volume_policy, &expected) {
            Ok(dashboard) => {
                for company in &dashboard.companies {
                    if self.config.company_logos.logo_for(company).is_none() {
                        log::warn!("No logo configured for {}", company);
                    }
                }
                let degraded = dashboard.report.volume_failures.len();
                let mut status = format!(
                    "Loaded {} rows, {} companies",
                    dashboard.display.row_count(),
                    dashboard.companies.len()
                );
                if degraded > 0 {
                    status.push_str(&format!(" ({} volume cells not numeric)", degraded));
                }
                self.control_panel.set_status(status);
                self.chart_viewer.on_dashboard_loaded(&dashboard);
                self.dashboard = Some(dashboard);
            }
            Err(e) => {
                log::error!("Failed to load {}: {}", path.display(), e);
                self.control_panel.set_error(format!("Error: {}", e));
                self.dashboard = None;
            }
        }
    }

    fn handle_open_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.config.data_path = path.clone();
            self.load(&path);
        }
    }

    fn handle_reload(&mut self) {
        match &self.dashboard {
            Some(dashboard) if !dashboard.is_stale() => {
                log::debug!("{} unchanged, keeping results", dashboard.source.display());
                self.control_panel.set_status("File unchanged");
            }
            _ => {
                let path = self.config.data_path.clone();
                self.load(&path);
            }
        }
    }

    fn handle_export(&mut self, tab: ChartTab) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };

        let export_dir = &self.config.export_dir;
        if let Err(e) = std::fs::create_dir_all(export_dir) {
            self.control_panel
                .set_error(format!("Cannot create {}: {}", export_dir.display(), e));
            return;
        }

        let result = match tab {
            ChartTab::AveragePrice => {
                let path = export_dir.join("average_prices.png");
                StaticChartRenderer::render_average_prices(&dashboard.averages, &path, EXPORT_SIZE)
                    .map(|_| path)
            }
            ChartTab::PriceAction => {
                let company = self.chart_viewer.selected_company.clone();
                let path: PathBuf = export_dir.join(format!("price_action_{}.png", slug(&company)));
                match self.chart_viewer.price_series(dashboard) {
                    Ok(points) => {
                        StaticChartRenderer::render_price_action(&company, points, &path, EXPORT_SIZE)
                            .map(|_| path)
                    }
                    Err(e) => {
                        self.control_panel.set_error(format!("Error: {}", e));
                        return;
                    }
                }
            }
            ChartTab::Volume => {
                let path = export_dir.join("volume_over_time.png");
                StaticChartRenderer::render_volume(&dashboard.volume, &path, EXPORT_SIZE)
                    .map(|_| path)
            }
        };

        match result {
            Ok(path) => {
                self.control_panel
                    .set_status(format!("Saved {}", path.display()));
                if let Err(e) = open::that(&path) {
                    log::warn!("Could not open {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                log::error!("Chart export failed: {}", e);
                self.control_panel.set_error(format!("Export error: {}", e));
            }
        }
    }

    fn show_dashboard(&mut self, ui: &mut egui::Ui) -> Option<ChartTab> {
        let Some(dashboard) = &self.dashboard else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return None;
        };

        ui.heading(RichText::new(&self.config.title).size(28.0).strong());
        section_rule(ui);
        show_data_table(ui, &dashboard.display);
        ui.add_space(30.0);

        ui.label(RichText::new("Average Share Price by Company").size(20.0).strong());
        section_rule(ui);
        show_average_cards(ui, &dashboard.averages, &self.config.company_logos);
        ui.add_space(30.0);

        ui.label(RichText::new("Graphs").size(20.0).strong());
        section_rule(ui);
        self.chart_viewer.show(ui, dashboard)
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("control_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            let loaded = self.dashboard.is_some();
            let action = self.control_panel.show(ui, &self.config.data_path, loaded);
            ui.add_space(4.0);

            match action {
                ControlPanelAction::OpenCsv => self.handle_open_csv(),
                ControlPanelAction::Reload => self.handle_reload(),
                ControlPanelAction::None => {}
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let export = ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| self.show_dashboard(ui))
                .inner;

            if let Some(tab) = export {
                self.handle_export(tab);
            }
        });
    }
}
