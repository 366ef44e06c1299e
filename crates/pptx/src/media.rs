//! Images embedded into slides.

use crate::package::{attribute, local_name, scan_elements};
use std::io::Cursor;
use std::path::Path;

/// Pixels are taken at 96 dpi.
const EMU_PER_PIXEL: i64 = 9_525;

/// Image formats a slide can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Svg,
}

impl ImageFormat {
    /// Detect the format from a file extension.
    pub(crate) fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Extension used for the media part.
    pub(crate) fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Svg => "svg",
        }
    }

    pub(crate) fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Svg => "image/svg+xml",
        }
    }
}

/// An image read from disk, ready to embed.
#[derive(Debug, Clone)]
pub(crate) struct Image {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
    /// Native size in pixels, when it could be determined.
    pub pixels: Option<(u32, u32)>,
}

impl Image {
    /// Read an image file. The error is a human-readable reason.
    pub(crate) fn load(path: &Path) -> Result<Self, String> {
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .ok_or_else(|| {
                format!(
                    "Unsupported image format: {} (expected png, jpeg, gif, bmp or svg)",
                    path.display()
                )
            })?;

        let bytes = std::fs::read(path)
            .map_err(|e| format!("Failed to read image {}: {}", path.display(), e))?;

        let pixels = match format {
            ImageFormat::Svg => {
                let size = svg_size(&bytes);
                if size.is_none() {
                    log::warn!("Could not read the size of {}", path.display());
                }
                size
            }
            _ => Some(
                image::image_dimensions(path)
                    .map_err(|e| format!("Not a readable image {}: {}", path.display(), e))?,
            ),
        };

        Ok(Self {
            format,
            bytes,
            pixels,
        })
    }

    /// Size in EMUs, scaled down to fit within `max` while keeping the aspect
    /// ratio. Images of unknown size fill `max`.
    pub(crate) fn fitted_size(&self, max: (i64, i64)) -> (i64, i64) {
        let Some((w, h)) = self.pixels.filter(|&(w, h)| w > 0 && h > 0) else {
            return max;
        };
        let (cx, cy) = (w as i64 * EMU_PER_PIXEL, h as i64 * EMU_PER_PIXEL);
        let scale = (max.0 as f64 / cx as f64)
            .min(max.1 as f64 / cy as f64)
            .min(1.0);
        (
            (cx as f64 * scale).round() as i64,
            (cy as f64 * scale).round() as i64,
        )
    }

    /// Transparent PNG with the picture's aspect ratio, shown by viewers that
    /// cannot draw SVG.
    pub(crate) fn fallback_png(&self) -> Result<Vec<u8>, String> {
        let (w, h) = self
            .pixels
            .filter(|&(w, h)| w > 0 && h > 0)
            .unwrap_or((1, 1));
        let scale = (FALLBACK_MAX_SIDE as f64 / w.max(h) as f64).min(1.0);
        let size = |v: u32| ((v as f64 * scale).round() as u32).max(1);

        let canvas = image::RgbaImage::new(size(w), size(h));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| format!("Failed to encode fallback image: {}", e))?;
        Ok(bytes)
    }
}

/// Longest side of the raster stand-in for an SVG picture.
const FALLBACK_MAX_SIDE: u32 = 64;

/// Pixel size from the root `svg` element's width/height, or its viewBox.
fn svg_size(bytes: &[u8]) -> Option<(u32, u32)> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut size = None;
    let mut seen_root = false;

    // Malformed trailing content does not matter once the root was read.
    let _ = scan_elements(text, |e| {
        if seen_root || local_name(e.name().as_ref()) != b"svg" {
            return;
        }
        seen_root = true;

        let width = attribute(e, b"width").and_then(|v| parse_length(&v));
        let height = attribute(e, b"height").and_then(|v| parse_length(&v));
        size = match (width, height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => attribute(e, b"viewBox").and_then(|v| {
                let values: Vec<f64> = v
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .filter_map(|s| s.parse().ok())
                    .collect();
                match values.as_slice() {
                    [_, _, w, h] if *w > 0.0 && *h > 0.0 => Some((w.round() as u32, h.round() as u32)),
                    _ => None,
                }
            }),
        };
    });

    size
}

/// Parse "800", "800px" or "800.5" into whole pixels. Other units are not
/// supported.
fn parse_length(value: &str) -> Option<u32> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value);
    let number: f64 = number.trim().parse().ok()?;
    (number > 0.0).then(|| number.round() as u32)
}
