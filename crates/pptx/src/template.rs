//! Built-in presentation template.
//!
//! A 16:9 package with one slide master and the seven layouts in their
//! conventional order: Title Slide, Title and Content, Section Header,
//! Two Content, Comparison, Title Only, Blank.

use crate::package::{relationships_xml, Package, Relationship, REL_SLIDE_LAYOUT};
use std::fmt::Write as FmtWrite;

/// Slide width in EMUs (13.333 in).
pub(crate) const SLIDE_WIDTH: i64 = 12_192_000;
/// Slide height in EMUs (7.5 in).
pub(crate) const SLIDE_HEIGHT: i64 = 6_858_000;

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A placeholder on a master or layout.
struct Placeholder {
    name: &'static str,
    ph_type: Option<&'static str>,
    idx: Option<u32>,
    size: Option<&'static str>,
    /// x, y, cx, cy in EMUs; None inherits from the master.
    frame: Option<(i64, i64, i64, i64)>,
}

const fn ph(
    name: &'static str,
    ph_type: Option<&'static str>,
    idx: Option<u32>,
    frame: Option<(i64, i64, i64, i64)>,
) -> Placeholder {
    Placeholder {
        name,
        ph_type,
        idx,
        size: None,
        frame,
    }
}

const fn half(name: &'static str, idx: u32, frame: (i64, i64, i64, i64)) -> Placeholder {
    Placeholder {
        name,
        ph_type: None,
        idx: Some(idx),
        size: Some("half"),
        frame: Some(frame),
    }
}

struct LayoutSpec {
    name: &'static str,
    layout_type: &'static str,
    placeholders: &'static [Placeholder],
}

const TITLE_FRAME: (i64, i64, i64, i64) = (838_200, 365_125, 10_515_600, 700_000);
const BODY_FRAME: (i64, i64, i64, i64) = (838_200, 1_080_000, 10_515_600, 5_097_000);

const LAYOUTS: &[LayoutSpec] = &[
    LayoutSpec {
        name: "Title Slide",
        layout_type: "title",
        placeholders: &[
            ph(
                "Title 1",
                Some("ctrTitle"),
                None,
                Some((1_524_000, 1_122_363, 9_144_000, 2_387_600)),
            ),
            ph(
                "Subtitle 2",
                Some("subTitle"),
                Some(1),
                Some((1_524_000, 3_602_038, 9_144_000, 1_655_762)),
            ),
        ],
    },
    LayoutSpec {
        name: "Title and Content",
        layout_type: "obj",
        placeholders: &[
            ph("Title 1", Some("title"), None, None),
            ph("Content Placeholder 2", None, Some(1), None),
        ],
    },
    LayoutSpec {
        name: "Section Header",
        layout_type: "secHead",
        placeholders: &[
            ph(
                "Title 1",
                Some("title"),
                None,
                Some((831_850, 1_709_738, 10_515_600, 2_852_737)),
            ),
            ph(
                "Text Placeholder 2",
                Some("body"),
                Some(1),
                Some((831_850, 4_589_463, 10_515_600, 1_500_187)),
            ),
        ],
    },
    LayoutSpec {
        name: "Two Content",
        layout_type: "twoObj",
        placeholders: &[
            ph("Title 1", Some("title"), None, None),
            half(
                "Content Placeholder 2",
                1,
                (838_200, 1_080_000, 5_181_600, 5_097_000),
            ),
            half(
                "Content Placeholder 3",
                2,
                (6_172_200, 1_080_000, 5_181_600, 5_097_000),
            ),
        ],
    },
    LayoutSpec {
        name: "Comparison",
        layout_type: "twoTxTwoObj",
        placeholders: &[
            ph("Title 1", Some("title"), None, None),
            ph(
                "Text Placeholder 2",
                Some("body"),
                Some(1),
                Some((839_788, 1_080_000, 5_157_787, 823_912)),
            ),
            half(
                "Content Placeholder 3",
                2,
                (839_788, 1_903_912, 5_157_787, 4_273_088),
            ),
            ph(
                "Text Placeholder 4",
                Some("body"),
                Some(3),
                Some((6_172_200, 1_080_000, 5_183_188, 823_912)),
            ),
            half(
                "Content Placeholder 5",
                4,
                (6_172_200, 1_903_912, 5_183_188, 4_273_088),
            ),
        ],
    },
    LayoutSpec {
        name: "Title Only",
        layout_type: "titleOnly",
        placeholders: &[ph("Title 1", Some("title"), None, None)],
    },
    LayoutSpec {
        name: "Blank",
        layout_type: "blank",
        placeholders: &[],
    },
];

/// Number of layouts in the built-in template.
pub(crate) fn layout_count() -> usize {
    LAYOUTS.len()
}

/// Assemble the built-in template package.
pub(crate) fn builtin_package() -> Package {
    let mut package = Package::new();

    package.insert("[Content_Types].xml", content_types_xml());
    package.insert(
        "_rels/.rels",
        relationships_xml(&[
            rel("rId1", &format!("{REL_BASE}/officeDocument"), "ppt/presentation.xml"),
            rel(
                "rId2",
                "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties",
                "docProps/core.xml",
            ),
            rel(
                "rId3",
                &format!("{REL_BASE}/extended-properties"),
                "docProps/app.xml",
            ),
        ]),
    );
    package.insert("docProps/core.xml", core_xml());
    package.insert("docProps/app.xml", app_xml());

    package.insert("ppt/presentation.xml", presentation_xml());
    package.insert(
        "ppt/_rels/presentation.xml.rels",
        relationships_xml(&[
            rel(
                "rId1",
                &format!("{REL_BASE}/slideMaster"),
                "slideMasters/slideMaster1.xml",
            ),
            rel("rId2", &format!("{REL_BASE}/theme"), "theme/theme1.xml"),
            rel("rId3", &format!("{REL_BASE}/presProps"), "presProps.xml"),
        ]),
    );
    package.insert(
        "ppt/presProps.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:presentationPr xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"/>"#
        ),
    );

    package.insert("ppt/slideMasters/slideMaster1.xml", master_xml());
    let mut master_rels: Vec<Relationship> = (1..=LAYOUTS.len())
        .map(|n| {
            rel(
                &format!("rId{n}"),
                REL_SLIDE_LAYOUT,
                &format!("../slideLayouts/slideLayout{n}.xml"),
            )
        })
        .collect();
    master_rels.push(rel(
        &format!("rId{}", LAYOUTS.len() + 1),
        &format!("{REL_BASE}/theme"),
        "../theme/theme1.xml",
    ));
    package.insert(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships_xml(&master_rels),
    );

    for (i, layout) in LAYOUTS.iter().enumerate() {
        let n = i + 1;
        package.insert(
            format!("ppt/slideLayouts/slideLayout{n}.xml"),
            layout_xml(layout),
        );
        package.insert(
            format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"),
            relationships_xml(&[rel(
                "rId1",
                &format!("{REL_BASE}/slideMaster"),
                "../slideMasters/slideMaster1.xml",
            )]),
        );
    }

    package.insert("ppt/theme/theme1.xml", theme_xml());
    package
}

fn rel(id: &str, rel_type: &str, target: &str) -> Relationship {
    Relationship {
        id: id.to_string(),
        rel_type: rel_type.to_string(),
        target: target.to_string(),
        external: false,
    }
}

fn content_types_xml() -> String {
    const PML: &str = "application/vnd.openxmlformats-officedocument.presentationml";

    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    xml.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);

    let mut overrides = vec![
        ("/ppt/presentation.xml", format!("{PML}.presentation.main+xml")),
        ("/ppt/presProps.xml", format!("{PML}.presProps+xml")),
        ("/ppt/slideMasters/slideMaster1.xml", format!("{PML}.slideMaster+xml")),
        (
            "/ppt/theme/theme1.xml",
            "application/vnd.openxmlformats-officedocument.theme+xml".to_string(),
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml".to_string(),
        ),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml".to_string(),
        ),
    ];
    let layout_parts: Vec<String> = (1..=LAYOUTS.len())
        .map(|n| format!("/ppt/slideLayouts/slideLayout{n}.xml"))
        .collect();
    for part in &layout_parts {
        overrides.push((part.as_str(), format!("{PML}.slideLayout+xml")));
    }

    for (part, content_type) in overrides {
        let _ = write!(
            xml,
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn core_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        "<dc:title>Presentation</dc:title><dc:creator>slidegen</dc:creator>",
        "</cp:coreProperties>"
    )
    .to_string()
}

fn app_xml() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
        "<Application>slidegen</Application>",
        "</Properties>"
    )
    .to_string()
}

fn presentation_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" saveSubsetFonts="1">"#,
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            r#"<p:sldSz cx="{cx}" cy="{cy}"/>"#,
            r#"<p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        a = NS_A,
        r = NS_R,
        p = NS_P,
        cx = SLIDE_WIDTH,
        cy = SLIDE_HEIGHT
    )
}

fn group_shape_header() -> &'static str {
    concat!(
        r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#,
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
    )
}

fn placeholder_xml(xml: &mut String, id: usize, placeholder: &Placeholder) {
    let _ = write!(
        xml,
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#,
        id, placeholder.name
    );
    if let Some(ph_type) = placeholder.ph_type {
        let _ = write!(xml, r#" type="{ph_type}""#);
    }
    if let Some(size) = placeholder.size {
        let _ = write!(xml, r#" sz="{size}""#);
    }
    if let Some(idx) = placeholder.idx {
        let _ = write!(xml, r#" idx="{idx}""#);
    }
    xml.push_str("/></p:nvPr></p:nvSpPr>");

    match placeholder.frame {
        Some((x, y, cx, cy)) => {
            let _ = write!(
                xml,
                r#"<p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></p:spPr>"#
            );
        }
        None => xml.push_str("<p:spPr/>"),
    }

    xml.push_str(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody></p:sp>"#);
}

fn master_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(
        xml,
        r#"<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}">"#
    );
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    xml.push_str(group_shape_header());
    placeholder_xml(
        &mut xml,
        2,
        &ph("Title Placeholder 1", Some("title"), None, Some(TITLE_FRAME)),
    );
    placeholder_xml(
        &mut xml,
        3,
        &ph("Text Placeholder 2", Some("body"), Some(1), Some(BODY_FRAME)),
    );
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" "#,
        r#"hlink="hlink" folHlink="folHlink"/>"#
    ));

    xml.push_str("<p:sldLayoutIdLst>");
    for n in 1..=LAYOUTS.len() {
        let _ = write!(
            xml,
            r#"<p:sldLayoutId id="{}" r:id="rId{}"/>"#,
            2_147_483_648u64 + n as u64,
            n
        );
    }
    xml.push_str("</p:sldLayoutIdLst>");

    xml.push_str("<p:txStyles>");
    xml.push_str(concat!(
        r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4000" kern="1200">"#,
        r#"<a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
        r#"<a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#
    ));
    xml.push_str("<p:bodyStyle>");
    for (level, size) in [2800, 2400, 2000, 1800, 1800, 1800, 1800, 1800, 1800]
        .iter()
        .enumerate()
    {
        let margin = 228_600 + 457_200 * level as i64;
        let _ = write!(
            xml,
            concat!(
                r#"<a:lvl{n}pPr marL="{m}" indent="-228600"><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/>"#,
                r#"<a:defRPr sz="{sz}" kern="1200"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill>"#,
                r#"<a:latin typeface="+mn-lt"/></a:defRPr></a:lvl{n}pPr>"#
            ),
            n = level + 1,
            m = margin,
            sz = size
        );
    }
    xml.push_str("</p:bodyStyle>");
    xml.push_str(r#"<p:otherStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:otherStyle>"#);
    xml.push_str("</p:txStyles>");

    xml.push_str("</p:sldMaster>");
    xml
}

fn layout_xml(layout: &LayoutSpec) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(
        xml,
        r#"<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="{}" preserve="1">"#,
        layout.layout_type
    );
    let _ = write!(xml, r#"<p:cSld name="{}"><p:spTree>"#, layout.name);
    xml.push_str(group_shape_header());
    for (i, placeholder) in layout.placeholders.iter().enumerate() {
        placeholder_xml(&mut xml, i + 2, placeholder);
    }
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
    xml.push_str("</p:sldLayout>");
    xml
}

fn theme_xml() -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    let _ = write!(xml, r#"<a:theme xmlns:a="{NS_A}" name="Office Theme">"#);
    xml.push_str("<a:themeElements>");

    xml.push_str(r#"<a:clrScheme name="Office">"#);
    xml.push_str(r#"<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#);
    xml.push_str(r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>"#);
    for (slot, rgb) in [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ] {
        let _ = write!(xml, r#"<a:{slot}><a:srgbClr val="{rgb}"/></a:{slot}>"#);
    }
    xml.push_str("</a:clrScheme>");

    xml.push_str(concat!(
        r#"<a:fontScheme name="Office">"#,
        r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
        r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
        "</a:fontScheme>"
    ));

    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    xml.push_str(r#"<a:fmtScheme name="Office"><a:fillStyleLst>"#);
    xml.push_str(&solid.repeat(3));
    xml.push_str("</a:fillStyleLst><a:lnStyleLst>");
    for width in [6350, 12700, 19050] {
        let _ = write!(
            xml,
            r#"<a:ln w="{width}" cap="flat" cmpd="sng" algn="ctr">{solid}<a:prstDash val="solid"/></a:ln>"#
        );
    }
    xml.push_str("</a:lnStyleLst><a:effectStyleLst>");
    xml.push_str(&"<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3));
    xml.push_str("</a:effectStyleLst><a:bgFillStyleLst>");
    xml.push_str(&solid.repeat(3));
    xml.push_str("</a:bgFillStyleLst></a:fmtScheme>");

    xml.push_str("</a:themeElements>");
    xml.push_str("<a:objectDefaults/><a:extraClrSchemeLst/>");
    xml.push_str("</a:theme>");
    xml
}
