//! Charts module - Chart sizing and rendering

mod debounce;
mod layout;
mod plotter;

pub use debounce::{Debouncer, RESIZE_DEBOUNCE};
pub use layout::{chart_dimensions, chart_title, ChartDimensions};
pub use plotter::CandlestickPlotter;
