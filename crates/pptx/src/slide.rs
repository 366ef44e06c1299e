//! Slide part XML.

use std::fmt::Write as FmtWrite;

/// EMUs per centimetre.
pub(crate) const EMU_PER_CM: i64 = 360_000;

/// Extension carrying an SVG picture next to its raster blip.
const SVG_BLIP_URI: &str = "{96DAC541-7B7A-43D3-8B79-37D633B846F1}";
const SVG_NS: &str = "http://schemas.microsoft.com/office/drawing/2016/SVG/main";

/// Placement of a shape on the slide, in EMUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

/// Which title placeholder a slide binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TitleKind {
    /// Centered title of a title slide.
    Centered,
    Regular,
}

impl TitleKind {
    fn ph_type(&self) -> &'static str {
        match self {
            TitleKind::Centered => "ctrTitle",
            TitleKind::Regular => "title",
        }
    }
}

/// Builder for the shape tree of one slide.
#[derive(Debug)]
pub(crate) struct SlideXml {
    shapes: String,
    next_id: u32,
}

impl SlideXml {
    pub(crate) fn new() -> Self {
        Self {
            shapes: String::with_capacity(2048),
            // The group shape is id 1.
            next_id: 2,
        }
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Title placeholder.
    pub(crate) fn title(&mut self, kind: TitleKind, text: &str) -> &mut Self {
        let id = self.take_id();
        let ph = format!(r#"<p:ph type="{}"/>"#, kind.ph_type());
        self.placeholder(id, "Title", &ph, &line_paragraphs(text));
        self
    }

    /// Subtitle placeholder of a title slide.
    pub(crate) fn subtitle(&mut self, text: &str) -> &mut Self {
        let id = self.take_id();
        self.placeholder(
            id,
            "Subtitle",
            r#"<p:ph type="subTitle" idx="1"/>"#,
            &line_paragraphs(text),
        );
        self
    }

    /// Content placeholder holding a leveled list.
    pub(crate) fn list(&mut self, levels: &[u32], texts: &[String]) -> &mut Self {
        let id = self.take_id();
        let mut body = String::new();
        for (level, text) in levels.iter().zip(texts) {
            let _ = write!(
                body,
                r#"<a:p><a:pPr lvl="{}"/>{}</a:p>"#,
                (*level).min(8),
                run(text)
            );
        }
        if body.is_empty() {
            body.push_str("<a:p/>");
        }
        self.placeholder(id, "Content", r#"<p:ph idx="1"/>"#, &body);
        self
    }

    /// Free text box; each line of `text` becomes a paragraph.
    pub(crate) fn text_box(&mut self, frame: Frame, text: &str) -> &mut Self {
        let id = self.take_id();
        let _ = write!(
            self.shapes,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr>"#
        );
        self.shapes.push_str("<p:spPr>");
        self.shapes.push_str(&xfrm(frame));
        self.shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>"#);
        self.shapes.push_str(
            r#"<p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>"#,
        );
        self.shapes.push_str(&line_paragraphs(text));
        self.shapes.push_str("</p:txBody></p:sp>");
        self
    }

    /// Picture referencing the image relationship `rel_id`. With `svg_rel_id`
    /// the picture is an SVG and `rel_id` its raster fallback.
    pub(crate) fn picture(
        &mut self,
        frame: Frame,
        rel_id: &str,
        svg_rel_id: Option<&str>,
        description: &str,
    ) -> &mut Self {
        let id = self.take_id();
        let _ = write!(
            self.shapes,
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
            id,
            id,
            escape_xml(description)
        );
        self.shapes
            .push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr>"#);
        match svg_rel_id {
            Some(svg) => {
                let _ = write!(
                    self.shapes,
                    r#"<p:blipFill><a:blip r:embed="{}"><a:extLst><a:ext uri="{}"><asvg:svgBlip xmlns:asvg="{}" r:embed="{}"/></a:ext></a:extLst></a:blip>"#,
                    escape_xml(rel_id),
                    SVG_BLIP_URI,
                    SVG_NS,
                    escape_xml(svg)
                );
            }
            None => {
                let _ = write!(
                    self.shapes,
                    r#"<p:blipFill><a:blip r:embed="{}"/>"#,
                    escape_xml(rel_id)
                );
            }
        }
        self.shapes
            .push_str("<a:stretch><a:fillRect/></a:stretch></p:blipFill>");
        self.shapes.push_str("<p:spPr>");
        self.shapes.push_str(&xfrm(frame));
        self.shapes
            .push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#);
        self
    }

    /// The complete slide part.
    pub(crate) fn finish(&self) -> String {
        let mut xml = String::with_capacity(self.shapes.len() + 1024);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        );
        xml.push_str(
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        );
        xml.push_str(r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(
            r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        );
        xml.push_str(
            r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#,
        );
        xml.push_str(&self.shapes);
        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str(r#"<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>"#);
        xml.push_str("</p:sld>");

        xml
    }

    fn placeholder(&mut self, id: u32, name: &str, ph: &str, paragraphs: &str) {
        let _ = write!(
            self.shapes,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="{name} {id}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr>{ph}</p:nvPr></p:nvSpPr><p:spPr/>"#
        );
        self.shapes.push_str("<p:txBody><a:bodyPr/><a:lstStyle/>");
        self.shapes.push_str(paragraphs);
        self.shapes.push_str("</p:txBody></p:sp>");
    }
}

fn xfrm(frame: Frame) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn run(text: &str) -> String {
    if text.is_empty() {
        return r#"<a:endParaRPr lang="en-US" dirty="0"/>"#.to_string();
    }
    format!(
        r#"<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r>"#,
        escape_xml(text)
    )
}

/// One paragraph per line of `text`.
fn line_paragraphs(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n");
    let mut xml = String::new();
    for line in normalized.split('\n') {
        xml.push_str("<a:p>");
        xml.push_str(&run(line));
        xml.push_str("</a:p>");
    }
    xml
}

/// Escape text for XML content and attributes, dropping characters XML 1.0
/// cannot carry.
pub(crate) fn escape_xml(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || c >= '\u{20}')
        .collect();
    quick_xml::escape::escape(cleaned.as_str()).into_owned()
}
