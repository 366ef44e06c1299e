//! PPTX deck writer.
//!
//! Slides are composed in memory on top of a template package (built-in or
//! loaded from disk). Nothing touches the file system until [`PptxDeck::finalize`]
//! serialises the package, which it does through a temporary file renamed
//! onto the output path.

use crate::media::{Image, ImageFormat};
use crate::package::{
    attribute, extract_number, local_name, rels_path_for, relationships_xml, relative_target,
    resolve_target, scan_elements, Package, Relationship, CT_SLIDE, REL_IMAGE,
    REL_OFFICE_DOCUMENT, REL_SLIDE, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER,
};
use crate::slide::{Frame, SlideXml, TitleKind, EMU_PER_CM};
use crate::template;
use slidegen_core::{Error, LayoutId, Result, SlideBackend};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// Left edge of free-standing content (text boxes, pictures).
const CONTENT_LEFT: i64 = 35 * EMU_PER_CM / 10;
/// Top edge of free-standing content.
const CONTENT_TOP: i64 = 3 * EMU_PER_CM;
/// Space kept free below free-standing content.
const CONTENT_BOTTOM_MARGIN: i64 = EMU_PER_CM;

/// A slide added by this deck, waiting to be listed in the presentation.
#[derive(Debug, Clone)]
struct AddedSlide {
    part: String,
    rel_id: String,
    slide_id: u32,
}

/// A presentation under construction.
#[derive(Debug)]
pub struct PptxDeck {
    package: Package,
    /// Main presentation part, usually `ppt/presentation.xml`.
    presentation_part: String,
    /// Layout part names, indexed by [`LayoutId`].
    layouts: Vec<String>,
    /// Slide width and height in EMUs.
    slide_size: (i64, i64),
    slides: Vec<AddedSlide>,
    /// Relationships of the presentation part, including added slides.
    presentation_rels: Vec<Relationship>,
    next_slide_id: u32,
    /// Media extensions added to the package, with their content types.
    media_types: BTreeSet<(&'static str, &'static str)>,
    finalized: bool,
}

impl PptxDeck {
    /// Start a deck from the built-in 16:9 template.
    pub fn builtin() -> Result<Self> {
        let deck = Self::from_package(template::builtin_package())
            .map_err(|message| Error::data_format("<built-in template>", message))?;
        debug_assert_eq!(deck.layout_count(), template::layout_count());
        Ok(deck)
    }

    /// Start a deck from a template package on disk (.pptx or .potx).
    pub fn open_template(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::NotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let deck = Self::from_reader(BufReader::new(file))
            .map_err(|message| Error::data_format(path, message))?;
        log::info!(
            "Loaded template {} ({} layouts, {} existing slides)",
            path.display(),
            deck.layout_count(),
            deck.existing_slide_count()
        );
        Ok(deck)
    }

    /// Start a deck from a template package read from `reader`. The error is a
    /// human-readable reason.
    pub fn from_reader<R: Read + Seek>(reader: R) -> std::result::Result<Self, String> {
        Self::from_package(Package::from_reader(reader)?)
    }

    fn from_package(package: Package) -> std::result::Result<Self, String> {
        let presentation_part = package
            .relationships("")?
            .into_iter()
            .find(|rel| rel.rel_type == REL_OFFICE_DOCUMENT)
            .map(|rel| resolve_target("", &rel.target))
            .ok_or_else(|| "No presentation part in package".to_string())?;
        log::debug!("Presentation part: {}", presentation_part);

        let presentation_rels = package.relationships(&presentation_part)?;
        let master_part = presentation_rels
            .iter()
            .find(|rel| rel.rel_type == REL_SLIDE_MASTER)
            .map(|rel| resolve_target(&presentation_part, &rel.target))
            .ok_or_else(|| "No slide master in package".to_string())?;

        let layouts = master_layouts(&package, &master_part)?;
        if layouts.is_empty() {
            return Err(format!("Slide master '{}' has no layouts", master_part));
        }
        log::debug!("Template layouts: {:?}", layouts);

        let presentation_xml = package.text(&presentation_part)?;
        let (slide_size, max_slide_id) = presentation_info(presentation_xml)?;

        Ok(Self {
            package,
            presentation_part,
            layouts,
            slide_size,
            slides: Vec::new(),
            presentation_rels,
            next_slide_id: max_slide_id.map_or(256, |id| id + 1).max(256),
            media_types: BTreeSet::new(),
            finalized: false,
        })
    }

    /// Number of layouts the template offers.
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Slides added through this deck.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slides the template already contained.
    pub fn existing_slide_count(&self) -> usize {
        self.presentation_rels
            .iter()
            .filter(|rel| rel.rel_type == REL_SLIDE)
            .count()
            - self.slides.len()
    }

    /// Slide width and height in EMUs.
    pub fn slide_size(&self) -> (i64, i64) {
        self.slide_size
    }

    /// Frame available to free-standing content below the title.
    fn content_frame(&self) -> Frame {
        let (width, height) = self.slide_size;
        Frame {
            x: CONTENT_LEFT,
            y: CONTENT_TOP,
            cx: (width - 2 * CONTENT_LEFT).max(EMU_PER_CM),
            cy: (height - CONTENT_TOP - CONTENT_BOTTOM_MARGIN).max(EMU_PER_CM),
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.finalized {
            return Err(Error::InvalidArgument(
                "deck has already been finalized".to_string(),
            ));
        }
        Ok(())
    }

    fn layout_part(&self, layout: LayoutId) -> Result<&str> {
        self.layouts
            .get(layout.index())
            .map(String::as_str)
            .ok_or_else(|| {
                Error::Backend(format!(
                    "layout {} not present in template ({} layouts)",
                    layout,
                    self.layouts.len()
                ))
            })
    }

    fn next_presentation_rel_id(&self) -> String {
        let next = self
            .presentation_rels
            .iter()
            .filter_map(|rel| extract_number(&rel.id))
            .max()
            .unwrap_or(0)
            + 1;
        (next..)
            .map(|n| format!("rId{}", n))
            .find(|id| self.presentation_rels.iter().all(|rel| &rel.id != id))
            .unwrap_or_default()
    }

    /// Store a slide part with its relationships and register it with the
    /// presentation.
    fn push_slide(&mut self, layout: LayoutId, xml: &SlideXml, extra_rels: Vec<Relationship>) -> Result<()> {
        let layout_part = self.layout_part(layout)?.to_string();
        let slides_dir = match self.presentation_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/slides/slide", dir),
            None => "slides/slide".to_string(),
        };
        let part = self.package.next_part_name(&slides_dir, "xml");

        let mut rels = vec![Relationship {
            id: "rId1".to_string(),
            rel_type: REL_SLIDE_LAYOUT.to_string(),
            target: relative_target(&part, &layout_part),
            external: false,
        }];
        rels.extend(extra_rels.into_iter().map(|mut rel| {
            rel.target = relative_target(&part, &rel.target);
            rel
        }));

        self.package.insert(part.as_str(), xml.finish());
        self.package
            .insert(rels_path_for(&part), relationships_xml(&rels));

        let rel_id = self.next_presentation_rel_id();
        self.presentation_rels.push(Relationship {
            id: rel_id.clone(),
            rel_type: REL_SLIDE.to_string(),
            target: relative_target(&self.presentation_part, &part),
            external: false,
        });
        self.slides.push(AddedSlide {
            part,
            rel_id,
            slide_id: self.next_slide_id,
        });
        self.next_slide_id += 1;
        Ok(())
    }

    /// Patch presentation.xml, its relationships and the content types so the
    /// added slides are part of the package.
    fn register_slides(&mut self) -> std::result::Result<(), String> {
        let mut entries = String::new();
        for slide in &self.slides {
            entries.push_str(&format!(
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                slide.slide_id, slide.rel_id
            ));
        }

        let presentation = self.package.text(&self.presentation_part)?.to_string();
        let presentation = insert_slide_ids(&presentation, &entries)?;
        self.package
            .insert(self.presentation_part.as_str(), presentation);
        self.package.insert(
            rels_path_for(&self.presentation_part),
            relationships_xml(&self.presentation_rels),
        );

        let content_types = self.package.text("[Content_Types].xml")?.to_string();
        let known_extensions = default_extensions(&content_types)?;

        let mut additions = String::new();
        for (ext, content_type) in &self.media_types {
            if !known_extensions.contains(*ext) {
                additions.push_str(&format!(
                    r#"<Default Extension="{}" ContentType="{}"/>"#,
                    ext, content_type
                ));
            }
        }
        for slide in &self.slides {
            additions.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                slide.part, CT_SLIDE
            ));
        }

        let end = content_types
            .rfind("</Types>")
            .ok_or_else(|| "Malformed [Content_Types].xml".to_string())?;
        let mut patched = content_types;
        patched.insert_str(end, &additions);
        self.package.insert("[Content_Types].xml", patched);

        Ok(())
    }
}

impl SlideBackend for PptxDeck {
    fn add_title_slide(&mut self, layout: LayoutId, title: &str, subtitle: &str) -> Result<()> {
        self.check_open()?;
        let mut xml = SlideXml::new();
        xml.title(TitleKind::Centered, title).subtitle(subtitle);
        self.push_slide(layout, &xml, Vec::new())?;
        log::info!("Title slide added ({}, {})", title, subtitle);
        Ok(())
    }

    fn add_text_slide(&mut self, layout: LayoutId, title: &str, body: &str) -> Result<()> {
        self.check_open()?;
        let frame = self.content_frame();
        let mut xml = SlideXml::new();
        xml.title(TitleKind::Regular, title).text_box(frame, body);
        self.push_slide(layout, &xml, Vec::new())?;
        log::info!("Text slide added ({})", title);
        Ok(())
    }

    fn add_list_slide(
        &mut self,
        layout: LayoutId,
        title: &str,
        levels: &[u32],
        texts: &[String],
    ) -> Result<()> {
        self.check_open()?;
        if levels.len() != texts.len() {
            return Err(Error::InvalidArgument(format!(
                "{} levels for {} list lines",
                levels.len(),
                texts.len()
            )));
        }
        let mut xml = SlideXml::new();
        xml.title(TitleKind::Regular, title).list(levels, texts);
        self.push_slide(layout, &xml, Vec::new())?;
        log::info!("List slide added ({}, {} lines)", title, texts.len());
        Ok(())
    }

    fn add_image_slide(&mut self, layout: LayoutId, title: &str, image: &Path) -> Result<()> {
        self.check_open()?;
        // Fail on a bad layout before the media part is stored.
        self.layout_part(layout)?;
        let loaded = Image::load(image).map_err(Error::Backend)?;
        // SVG is embedded through the svgBlip extension over a PNG stand-in.
        let fallback = match loaded.format {
            ImageFormat::Svg => Some(loaded.fallback_png().map_err(Error::Backend)?),
            _ => None,
        };

        let media_dir = match self.presentation_part.rsplit_once('/') {
            Some((dir, _)) => format!("{}/media/image", dir),
            None => "media/image".to_string(),
        };

        let content = self.content_frame();
        let (cx, cy) = loaded.fitted_size((content.cx, content.cy));
        let frame = Frame {
            cx,
            cy,
            ..content
        };
        let description = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        // Targets are made relative to the slide part by push_slide.
        let image_rel = |id: &str, target: &str| Relationship {
            id: id.to_string(),
            rel_type: REL_IMAGE.to_string(),
            target: target.to_string(),
            external: false,
        };

        let media_part = self
            .package
            .next_part_name(&media_dir, loaded.format.extension());
        self.media_types
            .insert((loaded.format.extension(), loaded.format.content_type()));
        self.package.insert(media_part.as_str(), loaded.bytes);

        let mut xml = SlideXml::new();
        xml.title(TitleKind::Regular, title);
        let rels = match fallback {
            Some(png) => {
                let png_part = self
                    .package
                    .next_part_name(&media_dir, ImageFormat::Png.extension());
                self.media_types.insert((
                    ImageFormat::Png.extension(),
                    ImageFormat::Png.content_type(),
                ));
                self.package.insert(png_part.as_str(), png);
                xml.picture(frame, "rId2", Some("rId3"), &description);
                vec![image_rel("rId2", &png_part), image_rel("rId3", &media_part)]
            }
            None => {
                xml.picture(frame, "rId2", None, &description);
                vec![image_rel("rId2", &media_part)]
            }
        };
        self.push_slide(layout, &xml, rels)?;

        log::info!("Image slide added ({}, {})", title, image.display());
        Ok(())
    }

    fn finalize(&mut self, output: &Path) -> Result<()> {
        self.check_open()?;
        self.finalized = true;

        let is_pptx = output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));
        if !is_pptx {
            return Err(Error::artifact_write(
                output,
                "output must have a .pptx extension",
            ));
        }

        self.register_slides()
            .map_err(|message| Error::artifact_write(output, message))?;

        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = tempfile::Builder::new()
            .prefix(".slidegen-")
            .suffix(".pptx")
            .tempfile_in(&dir)
            .map_err(|e| Error::artifact_write(output, e))?;

        self.package
            .write_to(temp.as_file_mut())
            .map_err(|e| Error::artifact_write(output, e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::artifact_write(output, e))?;
        temp.persist(output)
            .map_err(|e| Error::artifact_write(output, e.error))?;

        log::info!(
            "Presentation saved to {} ({} new slides, {} parts)",
            output.display(),
            self.slides.len(),
            self.package.part_count()
        );
        Ok(())
    }
}

/// Layout part names in the order of the master's `sldLayoutIdLst`.
fn master_layouts(package: &Package, master_part: &str) -> std::result::Result<Vec<String>, String> {
    let rels = package.relationships(master_part)?;
    let master_xml = package.text(master_part)?;

    let mut rel_ids = Vec::new();
    scan_elements(master_xml, |e| {
        if local_name(e.name().as_ref()) == b"sldLayoutId" {
            if let Some(id) = attribute(e, b"r:id") {
                rel_ids.push(id);
            }
        }
    })
    .map_err(|e| format!("Error parsing slide master: {}", e))?;

    rel_ids
        .iter()
        .map(|id| {
            rels.iter()
                .find(|rel| &rel.id == id && rel.rel_type == REL_SLIDE_LAYOUT)
                .map(|rel| resolve_target(master_part, &rel.target))
                .ok_or_else(|| format!("Slide master references missing layout '{}'", id))
        })
        .collect()
}

/// Slide size and the highest slide id of presentation.xml.
fn presentation_info(xml: &str) -> std::result::Result<((i64, i64), Option<u32>), String> {
    let mut size = (template::SLIDE_WIDTH, template::SLIDE_HEIGHT);
    let mut max_id: Option<u32> = None;

    scan_elements(xml, |e| match local_name(e.name().as_ref()) {
        b"sldSz" => {
            let cx = attribute(e, b"cx").and_then(|v| v.parse().ok());
            let cy = attribute(e, b"cy").and_then(|v| v.parse().ok());
            if let (Some(cx), Some(cy)) = (cx, cy) {
                size = (cx, cy);
            }
        }
        b"sldId" => {
            if let Some(id) = attribute(e, b"id").and_then(|v| v.parse::<u32>().ok()) {
                max_id = Some(max_id.map_or(id, |m| m.max(id)));
            }
        }
        _ => {}
    })
    .map_err(|e| format!("Error parsing presentation: {}", e))?;

    Ok((size, max_id))
}

/// Append `entries` to the presentation's slide id list, creating the list
/// after the master id list when there is none.
fn insert_slide_ids(xml: &str, entries: &str) -> std::result::Result<String, String> {
    if entries.is_empty() {
        return Ok(xml.to_string());
    }
    if let Some(end) = xml.find("</p:sldIdLst>") {
        let mut out = xml.to_string();
        out.insert_str(end, entries);
        return Ok(out);
    }
    if xml.contains("<p:sldIdLst/>") {
        return Ok(xml.replacen(
            "<p:sldIdLst/>",
            &format!("<p:sldIdLst>{}</p:sldIdLst>", entries),
            1,
        ));
    }
    let anchor = "</p:sldMasterIdLst>";
    let pos = xml
        .find(anchor)
        .map(|p| p + anchor.len())
        .ok_or_else(|| "presentation.xml has no slide master list".to_string())?;
    let mut out = xml.to_string();
    out.insert_str(pos, &format!("<p:sldIdLst>{}</p:sldIdLst>", entries));
    Ok(out)
}

/// Lowercased extensions that already have a `Default` content type.
fn default_extensions(xml: &str) -> std::result::Result<BTreeSet<String>, String> {
    let mut extensions = BTreeSet::new();
    scan_elements(xml, |e| {
        if local_name(e.name().as_ref()) == b"Default" {
            if let Some(ext) = attribute(e, b"Extension") {
                extensions.insert(ext.to_lowercase());
            }
        }
    })
    .map_err(|e| format!("Error parsing content types: {}", e))?;
    Ok(extensions)
}
