//! Slide descriptors read from the deck configuration.
//!
//! A descriptor is validated as a whole before it becomes a [`SlideDescriptor`]:
//! the `kind` tag decides which shape `content` (and, for plots,
//! `configuration`) must have.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The kind of a slide, selecting its payload shape and rendering operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Title,
    Text,
    List,
    Picture,
    Plot,
}

impl SlideKind {
    /// All recognized kinds.
    pub const ALL: [SlideKind; 5] = [
        SlideKind::Title,
        SlideKind::Text,
        SlideKind::List,
        SlideKind::Picture,
        SlideKind::Plot,
    ];

    /// The configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SlideKind::Title => "title",
            SlideKind::Text => "text",
            SlideKind::List => "list",
            SlideKind::Picture => "picture",
            SlideKind::Plot => "plot",
        }
    }
}

impl FromStr for SlideKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownKind(s.to_string()))
    }
}

impl fmt::Display for SlideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a list slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Indentation level, 0 being the outermost.
    pub level: u32,
    /// The line of text.
    pub text: String,
}

impl ListItem {
    pub fn new(level: u32, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// Accepted spellings of a list entry: `{"level": 1, "text": ".."}` or `[1, ".."]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListItemRepr {
    Object { level: u32, text: String },
    Pair(u32, String),
}

impl From<ListItemRepr> for ListItem {
    fn from(repr: ListItemRepr) -> Self {
        match repr {
            ListItemRepr::Object { level, text } | ListItemRepr::Pair(level, text) => {
                ListItem { level, text }
            }
        }
    }
}

/// Axis labels of a plot slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLabels {
    #[serde(rename = "x-label")]
    pub x: String,
    #[serde(rename = "y-label")]
    pub y: String,
}

impl AxisLabels {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
        }
    }
}

/// The kind-specific payload of a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideContent {
    Title { subtitle: String },
    Text { body: String },
    List { items: Vec<ListItem> },
    Picture { path: PathBuf },
    Plot { source: PathBuf, labels: AxisLabels },
}

impl SlideContent {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> SlideKind {
        match self {
            SlideContent::Title { .. } => SlideKind::Title,
            SlideContent::Text { .. } => SlideKind::Text,
            SlideContent::List { .. } => SlideKind::List,
            SlideContent::Picture { .. } => SlideKind::Picture,
            SlideContent::Plot { .. } => SlideKind::Plot,
        }
    }
}

/// A validated slide specification.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideDescriptor {
    pub title: String,
    pub content: SlideContent,
}

impl SlideDescriptor {
    pub fn new(title: impl Into<String>, content: SlideContent) -> Self {
        Self {
            title: title.into(),
            content,
        }
    }

    pub fn kind(&self) -> SlideKind {
        self.content.kind()
    }

    /// Validate one raw configuration entry at position `index`.
    pub fn from_value(index: usize, value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::validation(index, "?", "slide entry must be an object"))?;

        let raw_kind = object
            .get("kind")
            .or_else(|| object.get("type"))
            .ok_or_else(|| Error::validation(index, "?", "missing 'kind'"))?;
        let raw_kind = raw_kind
            .as_str()
            .ok_or_else(|| Error::validation(index, raw_kind.to_string(), "'kind' must be a string"))?;
        let kind = raw_kind.parse::<SlideKind>().map_err(|e| Error::Validation {
            index,
            kind: raw_kind.to_string(),
            message: "unrecognized slide kind".to_string(),
            source: Some(Box::new(e)),
        })?;

        let invalid = |message: String| Error::validation(index, kind.to_string(), message);

        let title = match object.get("title") {
            Some(Value::String(title)) => title.clone(),
            Some(_) => return Err(invalid("'title' must be a string".to_string())),
            None => return Err(invalid("missing 'title'".to_string())),
        };

        let content = object
            .get("content")
            .ok_or_else(|| invalid("missing 'content'".to_string()))?;

        let content = match kind {
            SlideKind::Title => SlideContent::Title {
                subtitle: expect_string(content, "subtitle").map_err(invalid)?,
            },
            SlideKind::Text => SlideContent::Text {
                body: expect_string(content, "body text").map_err(invalid)?,
            },
            SlideKind::List => SlideContent::List {
                items: list_items(content).map_err(invalid)?,
            },
            SlideKind::Picture => SlideContent::Picture {
                path: expect_string(content, "image path").map_err(invalid)?.into(),
            },
            SlideKind::Plot => {
                let source = expect_string(content, "data source path").map_err(invalid)?;
                let configuration = object
                    .get("configuration")
                    .ok_or_else(|| invalid("missing 'configuration'".to_string()))?;
                let labels = AxisLabels::deserialize(configuration).map_err(|e| {
                    invalid(format!("'configuration' must hold 'x-label' and 'y-label': {e}"))
                })?;
                SlideContent::Plot {
                    source: source.into(),
                    labels,
                }
            }
        };

        Ok(Self { title, content })
    }
}

fn expect_string(value: &Value, what: &str) -> std::result::Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("'content' must be the {what} (a string)"))
}

fn list_items(value: &Value) -> std::result::Result<Vec<ListItem>, String> {
    let entries = value
        .as_array()
        .ok_or_else(|| "'content' must be an array of list entries".to_string())?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            ListItemRepr::deserialize(entry)
                .map(ListItem::from)
                .map_err(|_| {
                    format!(
                        "list entry {i} must be {{\"level\": <non-negative integer>, \"text\": <string>}}"
                    )
                })
        })
        .collect()
}
