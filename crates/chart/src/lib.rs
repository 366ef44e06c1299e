//! Line chart rendering backend for plot slides.
//!
//! Draws charts with `plotters` into SVG or PNG files.

pub mod line;

pub use line::PlottersChart;
