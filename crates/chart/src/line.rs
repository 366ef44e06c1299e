//! Single-series line charts.

use plotters::coord::Shift;
use plotters::prelude::*;
use slidegen_core::{AxisLabels, ChartBackend, ChartFormat, Error, Result};
use std::ops::Range;
use std::path::Path;

/// Chart renderer on top of `plotters`.
#[derive(Debug, Clone)]
pub struct PlottersChart {
    width: u32,
    height: u32,
}

impl Default for PlottersChart {
    fn default() -> Self {
        Self {
            width: 960,
            height: 720,
        }
    }
}

impl PlottersChart {
    /// Create a renderer producing 960x720 images.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the image size in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl ChartBackend for PlottersChart {
    fn plot_line(
        &self,
        x: &[f64],
        y: &[f64],
        labels: &AxisLabels,
        title: &str,
        output: &Path,
    ) -> Result<()> {
        if x.len() != y.len() {
            return Err(Error::InvalidArgument(format!(
                "x and y differ in length ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(Error::InvalidArgument("no points to plot".to_string()));
        }

        let format = ChartFormat::from_path(output).ok_or_else(|| {
            Error::artifact_write(output, "unsupported image format (expected .svg or .png)")
        })?;

        // Render next to the target, then rename into place.
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = tempfile::Builder::new()
            .prefix(".slidegen-chart-")
            .suffix(&format!(".{}", format.extension()))
            .tempfile_in(dir)
            .map_err(|e| Error::artifact_write(output, e))?;

        let with_text = format == ChartFormat::Svg || cfg!(feature = "ttf");
        if !with_text {
            log::warn!(
                "Drawing {} without text: PNG labels need the `ttf` feature",
                output.display()
            );
        }

        let chart = LineChart {
            points: x.iter().copied().zip(y.iter().copied()).collect(),
            labels,
            title,
            with_text,
        };
        let size = (self.width, self.height);
        let drawn = match format {
            ChartFormat::Svg => chart
                .draw(SVGBackend::new(temp.path(), size).into_drawing_area())
                .map_err(|e| e.to_string()),
            ChartFormat::Png => chart
                .draw(BitMapBackend::new(temp.path(), size).into_drawing_area())
                .map_err(|e| e.to_string()),
        };
        drawn.map_err(|message| Error::artifact_write(output, message))?;

        temp.persist(output)
            .map_err(|e| Error::artifact_write(output, e.error))?;

        log::debug!(
            "Rendered {} chart with {} points to {}",
            format,
            x.len(),
            output.display()
        );
        Ok(())
    }
}

/// Everything needed to draw one chart.
struct LineChart<'a> {
    points: Vec<(f64, f64)>,
    labels: &'a AxisLabels,
    title: &'a str,
    /// Caption, tick labels and axis descriptions. Off when the backend has
    /// no font to draw them with.
    with_text: bool,
}

impl LineChart<'_> {
    fn draw<DB: DrawingBackend>(
        &self,
        root: DrawingArea<DB, Shift>,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let xs: Vec<f64> = self.points.iter().map(|p| p.0).collect();
        let ys: Vec<f64> = self.points.iter().map(|p| p.1).collect();

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20);
        if self.with_text {
            builder.x_label_area_size(50).y_label_area_size(60);
            if !self.title.is_empty() {
                builder.caption(self.title, ("sans-serif", 28).into_font());
            }
        } else {
            builder.x_label_area_size(10).y_label_area_size(10);
        }
        let mut chart = builder.build_cartesian_2d(axis_range(&xs), axis_range(&ys))?;

        let mut mesh = chart.configure_mesh();
        if self.with_text {
            mesh.x_desc(self.labels.x.as_str())
                .y_desc(self.labels.y.as_str())
                .axis_desc_style(("sans-serif", 20).into_font());
        } else {
            // No key points means no tick labels and no grid lines.
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw()?;

        chart.draw_series(LineSeries::new(self.points.iter().copied(), &BLUE))?;

        root.present()?;
        Ok(())
    }
}

/// Data bounds padded by 5%, widened when all values are equal.
fn axis_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }
    let pad = span * 0.05;
    (min - pad)..(max + pad)
}
