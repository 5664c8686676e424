//! Control Panel Widget
//! Top panel with company/date selection, actions and status regions.

use crate::config::{AppConfig, Company};
use crate::data::correct_date_range;
use crate::gui::controller::ViewState;
use egui::{Color32, ComboBox, RichText, TextEdit};

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 167, 69);

/// Current form values.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub company: Option<usize>,
    pub start_date: String,
    pub end_date: String,
    pub show_volume: bool,
}

pub struct ControlPanel {
    pub companies: Vec<Company>,
    pub form: FormState,
}

impl ControlPanel {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            companies: config.companies.clone(),
            form: FormState {
                company: None,
                start_date: config.earliest_date.clone().unwrap_or_default(),
                end_date: config.latest_date.clone().unwrap_or_default(),
                show_volume: true,
            },
        }
    }

    /// Identifier of the selected company, empty when none.
    pub fn selected_company_id(&self) -> &str {
        self.form
            .company
            .and_then(|i| self.companies.get(i))
            .map(|c| c.id.as_str())
            .unwrap_or("")
    }

    /// Draw the panel
    pub fn show(&mut self, ui: &mut egui::Ui, view: &ViewState) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.add_space(5.0);
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("📈 Stock Viewer")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(5.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Selection =====
        ui.horizontal(|ui| {
            ui.label("Company:");
            let selected_text = self
                .form
                .company
                .and_then(|i| self.companies.get(i))
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Select a company".to_string());
            ComboBox::from_id_salt("company")
                .width(220.0)
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for (i, company) in self.companies.iter().enumerate() {
                        ui.selectable_value(&mut self.form.company, Some(i), company.to_string());
                    }
                });

            ui.add_space(15.0);

            ui.label("Start:");
            let start = ui.add(
                TextEdit::singleline(&mut self.form.start_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(100.0),
            );
            ui.label("End:");
            let end = ui.add(
                TextEdit::singleline(&mut self.form.end_date)
                    .hint_text("YYYY-MM-DD")
                    .desired_width(100.0),
            );
            if start.lost_focus() || end.lost_focus() {
                correct_date_range(&self.form.start_date, &mut self.form.end_date);
            }

            ui.add_space(15.0);
            ui.checkbox(&mut self.form.show_volume, "Show volume");
        });

        ui.add_space(8.0);

        // ===== Actions =====
        ui.horizontal(|ui| {
            let generate = egui::Button::new(RichText::new("▶ Generate Chart").size(15.0))
                .min_size(egui::vec2(160.0, 30.0));
            if ui.add(generate).clicked() {
                action = ControlPanelAction::GenerateChart;
            }

            let download = egui::Button::new(RichText::new("💾 Download CSV").size(15.0))
                .min_size(egui::vec2(160.0, 30.0));
            if ui.add(download).clicked() {
                action = ControlPanelAction::DownloadCsv;
            }

            if view.loading {
                ui.spinner();
                ui.label("Loading chart...");
            }
            if view.csv_loading {
                ui.spinner();
                ui.label("Preparing CSV...");
            }
        });

        // Enter anywhere generates once a company is picked.
        if action == ControlPanelAction::None
            && self.form.company.is_some()
            && ui.input(|i| i.key_pressed(egui::Key::Enter))
        {
            action = ControlPanelAction::GenerateChart;
        }

        // ===== Status =====
        if let Some(error) = &view.error {
            ui.add_space(5.0);
            ui.label(RichText::new(error).color(ERROR_COLOR));
        }

        if let Some(info) = &view.info {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.label(RichText::new("Data points:").strong());
                ui.label(info.data_points.to_string());
                ui.add_space(10.0);
                ui.label(RichText::new("Company:").strong());
                ui.label(info.company_name.as_str());
                ui.add_space(10.0);
                ui.label(RichText::new("Aggregation:").strong());
                ui.label(info.aggregation.as_str());
            });
        }

        if let Some(notice) = &view.notice {
            ui.add_space(5.0);
            ui.label(RichText::new(&notice.message).color(SUCCESS_COLOR));
        }

        ui.add_space(5.0);
        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    GenerateChart,
    DownloadCsv,
}
