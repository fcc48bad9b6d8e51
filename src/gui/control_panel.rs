//! Control Panel Widget
//! Top bar with the data source and the file actions.

use egui::{Color32, RichText};
use std::path::Path;

/// Actions requested from the control panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPanelAction {
    None,
    OpenCsv,
    Reload,
}

/// Top bar showing the loaded file and status line.
pub struct ControlPanel {
    pub status: String,
    pub is_error: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            status: "Ready".to_string(),
            is_error: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.is_error = false;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.status = error.into();
        self.is_error = true;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, source: &Path, loaded: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.horizontal(|ui| {
            ui.label(RichText::new("📁 Data Source").size(14.0).strong());

            let path_text = source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| source.display().to_string());
            let path_color = if loaded {
                ui.visuals().text_color()
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(path_text).size(12.0).color(path_color));

            if ui.button("📂 Open CSV").clicked() {
                action = ControlPanelAction::OpenCsv;
            }
            if ui.button("🔄 Reload").clicked() {
                action = ControlPanelAction::Reload;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let color = if self.is_error {
                    Color32::from_rgb(220, 53, 69)
                } else {
                    Color32::GRAY
                };
                ui.label(RichText::new(&self.status).size(12.0).color(color));
            });
        });

        action
    }
}
