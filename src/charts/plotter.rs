//! Chart Plotter Module
//! Candlestick and volume plots drawn with egui_plot.

use crate::charts::layout::{
    volume_color, CANDLE_FILL_OPACITY, DOWN_COLOR, UP_COLOR, VOLUME_OPACITY,
};
use crate::data::ChartSeries;
use egui::{Id, Stroke};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Plot};
use std::sync::Arc;

/// Width of a candle body / volume bar in x units (one unit per period).
const ELEMENT_WIDTH: f64 = 0.6;

/// Draws OHLC candlesticks and the volume subplot.
///
/// The x axis is the period index; tick labels map it back to dates.
pub struct CandlestickPlotter;

impl CandlestickPlotter {
    /// One box element per period: whiskers span low..high, the box spans
    /// the open/close body.
    pub fn candle_elements(series: &ChartSeries) -> Vec<BoxElem> {
        series
            .periods()
            .enumerate()
            .map(|(i, p)| {
                let color = if p.is_up() { UP_COLOR } else { DOWN_COLOR };
                let body_low = p.open.min(p.close);
                let body_high = p.open.max(p.close);

                BoxElem::new(
                    i as f64,
                    BoxSpread::new(p.low, body_low, p.close, body_high, p.high),
                )
                .box_width(ELEMENT_WIDTH)
                .whisker_width(0.0)
                .fill(color.gamma_multiply(CANDLE_FILL_OPACITY))
                .stroke(Stroke::new(1.0, color))
                .name(format!(
                    "{}\nOpen: {:.2}\nHigh: {:.2}\nLow: {:.2}\nClose: {:.2}",
                    p.date, p.open, p.high, p.low, p.close
                ))
            })
            .collect()
    }

    /// One bar per period, colored by price direction.
    pub fn volume_bars(series: &ChartSeries) -> Vec<Bar> {
        series
            .periods()
            .enumerate()
            .map(|(i, p)| {
                Bar::new(i as f64, p.volume as f64)
                    .width(ELEMENT_WIDTH)
                    .fill(volume_color(p.open, p.close).gamma_multiply(VOLUME_OPACITY))
                    .name(format!("{}\nVolume: {}", p.date, p.volume))
            })
            .collect()
    }

    /// Date label for an x-axis grid mark, empty between periods.
    pub fn date_label(dates: &[String], x: f64) -> String {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        dates.get(idx as usize).cloned().unwrap_or_default()
    }

    /// Compact volume label: 1.5K, 2.3M, 4.1B.
    pub fn format_volume(value: f64) -> String {
        let abs = value.abs();
        if abs >= 1e9 {
            format!("{:.1}B", value / 1e9)
        } else if abs >= 1e6 {
            format!("{:.1}M", value / 1e6)
        } else if abs >= 1e3 {
            format!("{:.1}K", value / 1e3)
        } else {
            format!("{:.0}", value)
        }
    }

    /// Draw the price plot.
    pub fn draw_price_chart(
        ui: &mut egui::Ui,
        series: &ChartSeries,
        width: f32,
        height: f32,
        link_group: Id,
    ) {
        let dates = Arc::new(series.dates.clone());
        let candles = Self::candle_elements(series);

        Plot::new("price_chart")
            .width(width)
            .height(height)
            .allow_scroll(false)
            .link_axis(link_group, [true, false])
            .link_cursor(link_group, [true, false].into())
            .y_axis_label("Price ($)")
            .x_axis_formatter(move |mark, _range| Self::date_label(&dates, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.box_plot(
                    BoxPlot::new(candles)
                        .name("OHLC")
                        .element_formatter(Box::new(|elem: &BoxElem, _plot: &BoxPlot| elem.name.clone())),
                );
            });
    }

    /// Draw the volume plot, x-linked to the price plot.
    pub fn draw_volume_chart(
        ui: &mut egui::Ui,
        series: &ChartSeries,
        width: f32,
        height: f32,
        link_group: Id,
    ) {
        let dates = Arc::new(series.dates.clone());
        let bars = Self::volume_bars(series);

        Plot::new("volume_chart")
            .width(width)
            .height(height)
            .allow_scroll(false)
            .link_axis(link_group, [true, false])
            .link_cursor(link_group, [true, false].into())
            .include_y(0.0)
            .include_y(series.max_volume() as f64 * 1.05)
            .x_axis_label("Date")
            .y_axis_label("Volume")
            .x_axis_formatter(move |mark, _range| Self::date_label(&dates, mark.value))
            .y_axis_formatter(|mark, _range| Self::format_volume(mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name("Volume")
                        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| bar.name.clone())),
                );
            });
    }
}
