//! # Reports
//!
//! Line, bar and pie charts rendered with plotters into temporary PNG files, and their
//! export to a PDF with lopdf.
pub mod chart;
pub mod pdf;

pub use chart::{render_chart, series_data, value_counts, ChartImage, ChartImages, ChartKind, CHART_SIZE};
pub use pdf::export_pdf;
