//! Stock Viewer Main Application
//! Main window with the control panel on top and the chart below.

use crate::api::ChartDataSource;
use crate::charts::{chart_dimensions, ChartDimensions, Debouncer, RESIZE_DEBOUNCE};
use crate::config::AppConfig;
use crate::data::ExportError;
use crate::gui::controller::{ChartController, ControllerEvent, CsvDownload};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::{ScrollArea, TopBottomPanel, Vec2};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Repaint interval while a fetch is outstanding.
const BUSY_REPAINT: Duration = Duration::from_millis(100);

/// Main application window.
pub struct StockViewerApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    controller: ChartController,

    // Resize handling
    viewport: Option<Vec2>,
    resize: Debouncer<Vec2>,
}

impl StockViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &AppConfig,
        source: Arc<dyn ChartDataSource>,
    ) -> Self {
        let size = cc.egui_ctx.screen_rect().size();
        info!(companies = config.companies.len(), "Starting stock viewer");

        Self {
            control_panel: ControlPanel::new(config),
            chart_viewer: ChartViewer::new(chart_dimensions(size.x, size.y)),
            controller: ChartController::new(source),
            viewport: None,
            resize: Debouncer::new(RESIZE_DEBOUNCE),
        }
    }

    fn current_dimensions(&self, ctx: &egui::Context) -> ChartDimensions {
        let size = ctx.screen_rect().size();
        chart_dimensions(size.x, size.y)
    }

    /// Track window size changes and relayout once they settle.
    fn handle_resize(&mut self, ctx: &egui::Context, now: Instant) {
        let size = ctx.screen_rect().size();
        if self.viewport != Some(size) {
            if self.viewport.is_some() {
                self.resize.trigger(size, now);
            }
            self.viewport = Some(size);
        }

        if let Some(size) = self.resize.poll(now) {
            if self.controller.view.chart_visible {
                let dimensions = chart_dimensions(size.x, size.y);
                debug!(?dimensions, "Applying resized chart dimensions");
                self.chart_viewer.set_dimensions(dimensions);
            }
        }
    }

    /// Ask the user where to save and write the file.
    fn save_csv(&mut self, download: CsvDownload) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(&download.filename)
            .save_file()
        else {
            self.controller.download_cancelled();
            return;
        };

        match std::fs::write(&path, download.content.as_bytes()) {
            Ok(()) => {
                info!("Saved {}", path.display());
                self.controller
                    .download_saved(download.data_points, Instant::now());
            }
            Err(e) => self.controller.download_failed(ExportError::Io(e)),
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context, now: Instant) {
        if self.controller.is_busy() {
            ctx.request_repaint_after(BUSY_REPAINT);
        }
        if let Some(remaining) = self.resize.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
        if let Some(remaining) = self.controller.notice_remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }
}

impl eframe::App for StockViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.handle_resize(ctx, now);

        // Apply background results
        for event in self.controller.poll(now) {
            match event {
                ControllerEvent::ChartReady => {
                    let dimensions = self.current_dimensions(ctx);
                    self.chart_viewer.set_dimensions(dimensions);
                }
                ControllerEvent::CsvReady(download) => self.save_csv(download),
            }
        }

        // Top panel - Controls
        TopBottomPanel::top("control_panel").show(ctx, |ui| {
            let action = self.control_panel.show(ui, &self.controller.view);
            let company_id = self.control_panel.selected_company_id().to_string();
            let form = &self.control_panel.form;

            match action {
                ControlPanelAction::GenerateChart => {
                    self.controller
                        .generate(&company_id, &form.start_date, &form.end_date);
                }
                ControlPanelAction::DownloadCsv => {
                    self.controller
                        .download(&company_id, &form.start_date, &form.end_date);
                }
                ControlPanelAction::None => {}
            }
        });

        // Central panel - Chart
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                self.chart_viewer.show(
                    ui,
                    &self.controller.view,
                    self.controller.chart(),
                    self.control_panel.form.show_volume,
                );
            });
        });

        self.schedule_repaint(ctx, now);
    }
}
