//! Chart Viewer Widget
//! Central area showing the placeholder or the candlestick chart.

use crate::api::ChartDataResponse;
use crate::charts::{chart_title, CandlestickPlotter, ChartDimensions};
use crate::gui::controller::ViewState;
use egui::{Id, RichText};

/// Space between the price and volume plots.
const PLOT_GAP: f32 = 8.0;

pub struct ChartViewer {
    /// Size applied to the chart; updated on creation and after resizes.
    pub dimensions: ChartDimensions,
    link_group: Id,
}

impl ChartViewer {
    pub fn new(dimensions: ChartDimensions) -> Self {
        Self {
            dimensions,
            link_group: Id::new("price_volume_link"),
        }
    }

    pub fn set_dimensions(&mut self, dimensions: ChartDimensions) {
        self.dimensions = dimensions;
    }

    /// Draw the chart region.
    pub fn show(
        &self,
        ui: &mut egui::Ui,
        view: &ViewState,
        chart: Option<&ChartDataResponse>,
        show_volume: bool,
    ) {
        let chart = match chart {
            Some(chart) if view.chart_visible => chart,
            _ => {
                if view.placeholder_visible {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new("Select a company and date range, then generate a chart")
                                .size(18.0),
                        );
                    });
                }
                return;
            }
        };

        let title = chart_title(
            &chart.company_name,
            &chart.start_date,
            &chart.end_date,
            chart.aggregation,
            show_volume,
        );
        ui.vertical_centered(|ui| {
            ui.label(RichText::new(title).size(18.0).strong());
        });
        ui.add_space(6.0);

        if chart.chart_data.is_empty() {
            ui.label("No data points in the selected range");
            return;
        }

        let (price_height, volume_height) = self.dimensions.plot_heights(show_volume);
        let width = self.dimensions.width;

        CandlestickPlotter::draw_price_chart(
            ui,
            &chart.chart_data,
            width,
            price_height,
            self.link_group,
        );

        if show_volume {
            ui.add_space(PLOT_GAP);
            CandlestickPlotter::draw_volume_chart(
                ui,
                &chart.chart_data,
                width,
                volume_height,
                self.link_group,
            );
        }
    }
}
