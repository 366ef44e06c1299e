//! Mapping of slide kinds onto template layout slots.

use crate::descriptor::SlideKind;
use crate::error::Result;
use std::fmt;

/// Index of a slide layout in the rendering backend's template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutId(pub usize);

impl LayoutId {
    /// Title Slide.
    pub const TITLE: LayoutId = LayoutId(0);
    /// Title and Content.
    pub const TITLE_AND_CONTENT: LayoutId = LayoutId(1);
    /// Title Only.
    pub const TITLE_ONLY: LayoutId = LayoutId(5);

    /// The layout used for a kind.
    ///
    /// Text, picture and plot slides share the title-only layout; their body
    /// is placed by the backend.
    pub fn for_kind(kind: SlideKind) -> Self {
        match kind {
            SlideKind::Title => Self::TITLE,
            SlideKind::List => Self::TITLE_AND_CONTENT,
            SlideKind::Picture | SlideKind::Plot | SlideKind::Text => Self::TITLE_ONLY,
        }
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolve a kind name to its layout, failing with `UnknownKind` for anything
/// outside the recognized kinds.
pub fn resolve(kind: &str) -> Result<LayoutId> {
    let kind = kind.parse::<SlideKind>()?;
    let layout = LayoutId::for_kind(kind);
    log::debug!("Layout for '{}' slides: {}", kind, layout);
    Ok(layout)
}
