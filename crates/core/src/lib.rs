//! Slide descriptor model, numeric series parsing and deck interpretation
//! for generating presentations from JSON.

pub mod backend;
pub mod descriptor;
pub mod error;
pub mod interpreter;
pub mod layout;
pub mod plot;
pub mod series;

pub use backend::{ChartBackend, SlideBackend};
pub use descriptor::{AxisLabels, ListItem, SlideContent, SlideDescriptor, SlideKind};
pub use error::{Error, Result};
pub use interpreter::{load_config, parse_config, DeckInterpreter, DeckOptions};
pub use layout::LayoutId;
pub use plot::{ChartFormat, PlotJob};
pub use series::{CoordinateSeries, NumericSeriesParser};
