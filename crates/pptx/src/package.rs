//! In-memory OPC package: the parts of a .pptx and their relationships.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::io::{Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub(crate) const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub(crate) const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub(crate) const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub(crate) const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

pub(crate) const CT_SLIDE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

/// Every part of a package, keyed by part name (no leading slash).
#[derive(Debug, Clone, Default)]
pub(crate) struct Package {
    parts: BTreeMap<String, Vec<u8>>,
}

impl Package {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Read all parts of a ZIP archive.
    pub(crate) fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, String> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| format!("Failed to open ZIP: {}", e))?;

        let mut parts = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| format!("Failed to read ZIP entry {}: {}", i, e))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().trim_start_matches('/').to_string();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|e| format!("Failed to read '{}': {}", name, e))?;
            parts.insert(name, bytes);
        }

        Ok(Self { parts })
    }

    /// Write all parts as a ZIP archive, content types first.
    pub(crate) fn write_to<W: Write + Seek>(&self, writer: W) -> zip::result::ZipResult<W> {
        let mut zip = ZipWriter::new(writer);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let content_types = "[Content_Types].xml";
        let ordered = self
            .parts
            .get_key_value(content_types)
            .into_iter()
            .chain(self.parts.iter().filter(|(name, _)| *name != content_types));

        for (name, bytes) in ordered {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.parts.insert(name.into(), bytes.into());
    }

    /// A part as UTF-8 text.
    pub(crate) fn text(&self, name: &str) -> Result<&str, String> {
        let bytes = self
            .parts
            .get(name)
            .ok_or_else(|| format!("Part not found in package: '{}'", name))?;
        std::str::from_utf8(bytes).map_err(|_| format!("Part '{}' is not UTF-8", name))
    }

    /// The relationships of `part` (an empty list if it has none).
    pub(crate) fn relationships(&self, part: &str) -> Result<Vec<Relationship>, String> {
        let rels_path = rels_path_for(part);
        if !self.contains(&rels_path) {
            return Ok(Vec::new());
        }
        parse_relationships(self.text(&rels_path)?)
    }

    pub(crate) fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// First free part name of the form `{prefix}{n}.{ext}`, n starting at 1.
    /// A number is taken once any part uses it, whatever its extension.
    pub(crate) fn next_part_name(&self, prefix: &str, ext: &str) -> String {
        (1..)
            .map(|n| format!("{}{}.", prefix, n))
            .find(|stem| !self.parts.keys().any(|name| name.starts_with(stem.as_str())))
            .map(|stem| format!("{}{}", stem, ext))
            .unwrap_or_default()
    }
}

/// One entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Parse the `Relationship` entries of a `.rels` part, in document order.
pub(crate) fn parse_relationships(xml: &str) -> Result<Vec<Relationship>, String> {
    let mut rels = Vec::new();
    scan_elements(xml, |e| {
        if local_name(e.name().as_ref()) != b"Relationship" {
            return;
        }
        let mut rel = Relationship {
            id: String::new(),
            rel_type: String::new(),
            target: String::new(),
            external: false,
        };
        for attr in e.attributes().flatten() {
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_default();
            match attr.key.as_ref() {
                b"Id" => rel.id = value,
                b"Type" => rel.rel_type = value,
                b"Target" => rel.target = value,
                b"TargetMode" => rel.external = value == "External",
                _ => {}
            }
        }
        rels.push(rel);
    })
    .map_err(|e| format!("Error parsing relationships: {}", e))?;
    Ok(rels)
}

/// Render relationships as a `.rels` part.
pub(crate) fn relationships_xml(rels: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        xml.push_str(&relationship_xml(rel));
    }
    xml.push_str("</Relationships>");
    xml
}

pub(crate) fn relationship_xml(rel: &Relationship) -> String {
    format!(
        r#"<Relationship Id="{}" Type="{}" Target="{}"{}/>"#,
        crate::slide::escape_xml(&rel.id),
        crate::slide::escape_xml(&rel.rel_type),
        crate::slide::escape_xml(&rel.target),
        if rel.external {
            r#" TargetMode="External""#
        } else {
            ""
        }
    )
}

/// Call `f` for every start or empty element of `xml`.
pub(crate) fn scan_elements<F>(xml: &str, mut f: F) -> Result<(), quick_xml::Error>
where
    F: FnMut(&BytesStart<'_>),
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => f(e),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(())
}

/// Value of attribute `key` (matched on the full, possibly prefixed name).
pub(crate) fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract the number from an id like "rId12".
pub(crate) fn extract_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}

/// Path of the relationships part belonging to `part`.
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None if part.is_empty() => "_rels/.rels".to_string(),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return normalize(absolute.split('/'));
    }
    let dir = source_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    normalize(dir.split('/').chain(target.split('/')))
}

/// Relative target pointing from `source_part` to `target_part`.
pub(crate) fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();

    let common = source_dir
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count()
        .min(target.len().saturating_sub(1));

    let mut parts: Vec<&str> = vec![".."; source_dir.len() - common];
    parts.extend(&target[common..]);
    parts.join("/")
}

fn normalize<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    let mut out: Vec<&str> = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s),
        }
    }
    out.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_extract_number() {
        assert_eq!(extract_number("rId1"), Some(1));
        assert_eq!(extract_number("rId12"), Some(12));
        assert_eq!(extract_number("nodigits"), None);
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"p:sp"), b"sp");
        assert_eq!(local_name(b"a:t"), b"t");
        assert_eq!(local_name(b"sp"), b"sp");
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for(""), "_rels/.rels");
        assert_eq!(
            rels_path_for("ppt/presentation.xml"),
            "ppt/_rels/presentation.xml.rels"
        );
        assert_eq!(
            rels_path_for("ppt/slides/slide3.xml"),
            "ppt/slides/_rels/slide3.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("", "ppt/presentation.xml"),
            "ppt/presentation.xml"
        );
        assert_eq!(
            resolve_target("ppt/slideMasters/slideMaster1.xml", "../slideLayouts/slideLayout2.xml"),
            "ppt/slideLayouts/slideLayout2.xml"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "/ppt/slides/slide1.xml"),
            "ppt/slides/slide1.xml"
        );
    }

    #[test]
    fn test_relative_target() {
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/slideLayouts/slideLayout6.xml"),
            "../slideLayouts/slideLayout6.xml"
        );
        assert_eq!(
            relative_target("ppt/presentation.xml", "ppt/slides/slide1.xml"),
            "slides/slide1.xml"
        );
        assert_eq!(
            relative_target("ppt/slides/slide1.xml", "ppt/media/image1.png"),
            "../media/image1.png"
        );
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId2" Type="http://x/slide" Target="slides/slide1.xml"/>
              <Relationship Id="rId1" Type="http://x/slideMaster" Target="slideMasters/slideMaster1.xml"/>
              <Relationship Id="rId3" Type="http://x/hyperlink" Target="https://a?b&amp;c" TargetMode="External"/>
            </Relationships>"#;
        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].id, "rId2");
        assert_eq!(rels[1].target, "slideMasters/slideMaster1.xml");
        assert_eq!(rels[2].target, "https://a?b&c");
        assert!(rels[2].external);
    }

    #[test]
    fn test_relationships_round_trip() {
        let rels = vec![Relationship {
            id: "rId1".to_string(),
            rel_type: REL_SLIDE_LAYOUT.to_string(),
            target: "../slideLayouts/slideLayout1.xml".to_string(),
            external: false,
        }];
        assert_eq!(parse_relationships(&relationships_xml(&rels)).unwrap(), rels);
    }

    #[test]
    fn test_zip_round_trip() {
        let mut package = Package::new();
        package.insert("ppt/presentation.xml", "<p/>");
        package.insert("[Content_Types].xml", "<Types/>");

        let bytes = package.write_to(Cursor::new(Vec::new())).unwrap().into_inner();
        let reread = Package::from_reader(Cursor::new(bytes)).unwrap();
        assert_eq!(reread.part_count(), 2);
        assert_eq!(reread.text("ppt/presentation.xml").unwrap(), "<p/>");
    }

    #[test]
    fn test_next_part_name() {
        let mut package = Package::new();
        assert_eq!(
            package.next_part_name("ppt/slides/slide", "xml"),
            "ppt/slides/slide1.xml"
        );
        package.insert("ppt/slides/slide1.xml", "");
        assert_eq!(
            package.next_part_name("ppt/slides/slide", "xml"),
            "ppt/slides/slide2.xml"
        );
    }

    #[test]
    fn test_next_part_name_across_extensions() {
        let mut package = Package::new();
        package.insert("ppt/media/image1.svg", "");
        package.insert("ppt/media/image10.png", "");
        assert_eq!(
            package.next_part_name("ppt/media/image", "png"),
            "ppt/media/image2.png"
        );
    }
}
