//! Plot slides: numeric source in, chart image out.

use crate::backend::ChartBackend;
use crate::descriptor::AxisLabels;
use crate::error::{Error, Result};
use crate::series::NumericSeriesParser;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Image format of generated charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    #[default]
    Svg,
    Png,
}

impl ChartFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ChartFormat::Svg => "svg",
            ChartFormat::Png => "png",
        }
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.parse().ok())
    }
}

impl FromStr for ChartFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => Err(Error::InvalidArgument(format!(
                "unsupported chart format '{other}' (expected svg or png)"
            ))),
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One chart to produce from a numeric source.
#[derive(Debug, Clone)]
pub struct PlotJob<'a> {
    source: &'a Path,
    labels: &'a AxisLabels,
    title: &'a str,
    parser: NumericSeriesParser,
}

impl<'a> PlotJob<'a> {
    /// Create a job for `source` with the given axis labels and no title.
    pub fn new(source: &'a Path, labels: &'a AxisLabels) -> Self {
        Self {
            source,
            labels,
            title: "",
            parser: NumericSeriesParser::new(),
        }
    }

    /// Set the chart caption.
    pub fn with_title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Parse the source and draw it into `output`, returning the image path.
    pub fn render<C: ChartBackend + ?Sized>(&self, charts: &C, output: &Path) -> Result<PathBuf> {
        if self.labels.x.trim().is_empty() {
            return Err(Error::InvalidArgument("x-label must not be empty".to_string()));
        }
        if self.labels.y.trim().is_empty() {
            return Err(Error::InvalidArgument("y-label must not be empty".to_string()));
        }

        let series = self.parser.parse(self.source)?;
        log::debug!(
            "Plotting {} points from {} into {}",
            series.len(),
            self.source.display(),
            output.display()
        );

        charts.plot_line(series.x(), series.y(), self.labels, self.title, output)?;
        log::info!("Chart written to {}", output.display());

        Ok(output.to_path_buf())
    }
}
