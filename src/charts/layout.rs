//! Chart Layout Module
//! Responsive sizing, colors and titles for the candlestick chart.

use crate::data::Aggregation;
use egui::Color32;

/// Horizontal padding subtracted from the viewport width.
const HORIZONTAL_PADDING: f32 = 80.0;
/// Narrowest chart ever drawn.
const MIN_WIDTH: f32 = 300.0;

/// Share of the chart height given to the price plot when volume is shown.
pub const PRICE_SHARE: f32 = 0.70;
/// Share of the chart height given to the volume plot.
pub const VOLUME_SHARE: f32 = 0.25;

pub const UP_COLOR: Color32 = Color32::from_rgb(34, 197, 94); // #22c55e
pub const DOWN_COLOR: Color32 = Color32::from_rgb(239, 68, 68); // #ef4444

/// Opacity of candle bodies.
pub const CANDLE_FILL_OPACITY: f32 = 0.3;
/// Opacity of volume bars.
pub const VOLUME_OPACITY: f32 = 0.7;

/// Chart size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f32,
    pub height: f32,
}

impl ChartDimensions {
    /// Heights of the price and volume plots for the given variant.
    pub fn plot_heights(&self, with_volume: bool) -> (f32, f32) {
        if with_volume {
            (self.height * PRICE_SHARE, self.height * VOLUME_SHARE)
        } else {
            (self.height, 0.0)
        }
    }
}

/// Compute chart dimensions for a viewport size.
pub fn chart_dimensions(viewport_width: f32, viewport_height: f32) -> ChartDimensions {
    let width = (viewport_width - HORIZONTAL_PADDING).max(MIN_WIDTH);

    let fraction = if viewport_height >= 1200.0 {
        0.8
    } else if viewport_height >= 900.0 {
        0.75
    } else if viewport_height >= 700.0 {
        0.7
    } else {
        0.6
    };

    ChartDimensions {
        width,
        height: viewport_height * fraction,
    }
}

/// Color for a period's volume bar.
pub fn volume_color(open: f64, close: f64) -> Color32 {
    if close >= open {
        UP_COLOR
    } else {
        DOWN_COLOR
    }
}

/// Chart title.
pub fn chart_title(
    company_name: &str,
    start_date: &str,
    end_date: &str,
    aggregation: Aggregation,
    with_volume: bool,
) -> String {
    let subject = if with_volume {
        "Stock Price & Volume"
    } else {
        "Stock Price"
    };
    format!(
        "{} {} ({} to {}) - {} Data",
        company_name,
        subject,
        start_date,
        end_date,
        aggregation.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_policy() {
        for vw in [200.0, 300.0, 379.0, 380.0, 381.0, 1024.0, 1920.0, 3840.0] {
            let dims = chart_dimensions(vw, 800.0);
            assert_eq!(dims.width, (vw - 80.0_f32).max(300.0), "viewport {}", vw);
        }
        assert_eq!(chart_dimensions(380.0, 800.0).width, 300.0);
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-3, "{} != {}", actual, expected);
    }

    #[test]
    fn test_height_steps() {
        assert_close(chart_dimensions(1000.0, 1200.0).height, 960.0);
        assert_close(chart_dimensions(1000.0, 1000.0).height, 750.0);
        assert_close(chart_dimensions(1000.0, 900.0).height, 675.0);
        assert_close(chart_dimensions(1000.0, 700.0).height, 490.0);
        assert_close(chart_dimensions(1000.0, 699.0).height, 419.4);
        assert_close(chart_dimensions(1000.0, 500.0).height, 300.0);
    }

    #[test]
    fn test_plot_heights() {
        let dims = ChartDimensions {
            width: 800.0,
            height: 1000.0,
        };
        let (price, volume) = dims.plot_heights(true);
        assert_close(price, 700.0);
        assert_close(volume, 250.0);
        assert_eq!(dims.plot_heights(false), (1000.0, 0.0));
    }

    #[test]
    fn test_volume_colors() {
        assert_eq!(volume_color(10.0, 11.0), UP_COLOR);
        assert_eq!(volume_color(10.0, 10.0), UP_COLOR);
        assert_eq!(volume_color(10.0, 9.99), DOWN_COLOR);
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            chart_title("Acme", "2023-01-01", "2023-01-10", Aggregation::Daily, true),
            "Acme Stock Price & Volume (2023-01-01 to 2023-01-10) - Daily Data"
        );
        assert_eq!(
            chart_title("Acme", "2023-01-01", "2024-06-01", Aggregation::Monthly, false),
            "Acme Stock Price (2023-01-01 to 2024-06-01) - Monthly Data"
        );
    }
}
