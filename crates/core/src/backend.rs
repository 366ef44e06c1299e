//! Collaborator interfaces driven by the deck interpreter.

use crate::descriptor::AxisLabels;
use crate::error::Result;
use crate::layout::LayoutId;
use std::path::Path;

/// A presentation document being built, one slide at a time.
///
/// Implementations own the in-progress deck. Nothing is written to disk
/// before [`SlideBackend::finalize`].
pub trait SlideBackend {
    /// Add a slide with a title and a subtitle.
    fn add_title_slide(&mut self, layout: LayoutId, title: &str, subtitle: &str) -> Result<()>;

    /// Add a slide with a title and a block of body text.
    fn add_text_slide(&mut self, layout: LayoutId, title: &str, body: &str) -> Result<()>;

    /// Add a slide with a title and a leveled list. `levels` and `texts` are
    /// parallel and of equal length.
    fn add_list_slide(
        &mut self,
        layout: LayoutId,
        title: &str,
        levels: &[u32],
        texts: &[String],
    ) -> Result<()>;

    /// Add a slide with a title and an image read from `image`.
    fn add_image_slide(&mut self, layout: LayoutId, title: &str, image: &Path) -> Result<()>;

    /// Persist the deck to `output`.
    fn finalize(&mut self, output: &Path) -> Result<()>;
}

/// Renders line charts to image files.
pub trait ChartBackend {
    /// Draw a single line through the points (x[i], y[i]) and write the image
    /// to `output`. Either the whole image is written or nothing is.
    fn plot_line(
        &self,
        x: &[f64],
        y: &[f64],
        labels: &AxisLabels,
        title: &str,
        output: &Path,
    ) -> Result<()>;
}
