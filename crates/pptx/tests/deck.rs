use slidegen_core::{Error, LayoutId, SlideBackend};
use slidegen_pptx::PptxDeck;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

fn read_part(archive: &mut ZipArchive<File>, name: &str) -> String {
    let mut text = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing part {name}"))
        .read_to_string(&mut text)
        .unwrap();
    text
}

fn build_full_deck(dir: &Path) -> std::path::PathBuf {
    let svg = dir.join("chart.svg");
    std::fs::write(
        &svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="960" height="720"></svg>"#,
    )
    .unwrap();
    let png = dir.join("logo.png");
    image::RgbImage::new(40, 20).save(&png).unwrap();

    let mut deck = PptxDeck::builtin().unwrap();
    deck.add_title_slide(LayoutId::TITLE, "Python course", "Basics")
        .unwrap();
    deck.add_text_slide(LayoutId::TITLE_ONLY, "Intro", "Line one\nLine two")
        .unwrap();
    deck.add_list_slide(
        LayoutId::TITLE_AND_CONTENT,
        "Tools",
        &[1, 2],
        &["Python".to_string(), "pip".to_string()],
    )
    .unwrap();
    deck.add_image_slide(LayoutId::TITLE_ONLY, "Chart", &svg)
        .unwrap();
    deck.add_image_slide(LayoutId::TITLE_ONLY, "Logo", &png)
        .unwrap();
    assert_eq!(deck.slide_count(), 5);

    let output = dir.join("deck.pptx");
    deck.finalize(&output).unwrap();
    output
}

#[test]
fn test_written_package_lists_every_slide() {
    let dir = tempfile::tempdir().unwrap();
    let output = build_full_deck(dir.path());

    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "[Content_Types].xml");

    for n in 1..=5 {
        archive
            .by_name(&format!("ppt/slides/slide{n}.xml"))
            .unwrap_or_else(|_| panic!("missing slide {n}"));
        archive
            .by_name(&format!("ppt/slides/_rels/slide{n}.xml.rels"))
            .unwrap_or_else(|_| panic!("missing rels for slide {n}"));
    }

    let presentation = read_part(&mut archive, "ppt/presentation.xml");
    let ids: Vec<usize> = (256..261)
        .map(|id| {
            presentation
                .find(&format!(r#"<p:sldId id="{id}""#))
                .unwrap_or_else(|| panic!("slide id {id} not listed"))
        })
        .collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels");
    assert!(rels.contains(r#"Target="slides/slide5.xml""#));

    let content_types = read_part(&mut archive, "[Content_Types].xml");
    assert!(content_types.contains(r#"PartName="/ppt/slides/slide1.xml""#));
    assert!(content_types.contains(r#"Extension="svg""#));
    assert!(content_types.contains(r#"Extension="png""#));
}

#[test]
fn test_slides_reference_layouts_and_media() {
    let dir = tempfile::tempdir().unwrap();
    let output = build_full_deck(dir.path());
    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();

    let title = read_part(&mut archive, "ppt/slides/slide1.xml");
    assert!(title.contains("<a:t>Python course</a:t>"));
    assert!(title.contains(r#"type="ctrTitle""#));
    let title_rels = read_part(&mut archive, "ppt/slides/_rels/slide1.xml.rels");
    assert!(title_rels.contains("../slideLayouts/slideLayout1.xml"));

    let list = read_part(&mut archive, "ppt/slides/slide3.xml");
    assert!(list.contains(r#"<a:pPr lvl="2"/>"#));
    let list_rels = read_part(&mut archive, "ppt/slides/_rels/slide3.xml.rels");
    assert!(list_rels.contains("../slideLayouts/slideLayout2.xml"));

    // SVG as image1, its raster stand-in as image2, the logo as image3.
    let chart_rels = read_part(&mut archive, "ppt/slides/_rels/slide4.xml.rels");
    assert!(chart_rels.contains("../slideLayouts/slideLayout6.xml"));
    assert!(chart_rels.contains(r#"Id="rId2""#));
    assert!(chart_rels.contains("../media/image2.png"));
    assert!(chart_rels.contains("../media/image1.svg"));
    let chart = read_part(&mut archive, "ppt/slides/slide4.xml");
    assert!(chart.contains(r#"<a:blip r:embed="rId2"><a:extLst>"#));
    assert!(chart.contains(r#"<asvg:svgBlip "#));
    assert!(chart.contains(r#"r:embed="rId3"/>"#));

    let logo_rels = read_part(&mut archive, "ppt/slides/_rels/slide5.xml.rels");
    assert!(logo_rels.contains("../media/image3.png"));
    let logo = read_part(&mut archive, "ppt/slides/slide5.xml");
    assert!(!logo.contains("svgBlip"));

    let svg = read_part(&mut archive, "ppt/media/image1.svg");
    assert!(svg.contains(r#"width="960""#));
    let mut fallback = Vec::new();
    archive
        .by_name("ppt/media/image2.png")
        .unwrap()
        .read_to_end(&mut fallback)
        .unwrap();
    assert!(fallback.starts_with(&[0x89, b'P', b'N', b'G']));
}

#[test]
fn test_written_deck_works_as_template() {
    let dir = tempfile::tempdir().unwrap();
    let first = build_full_deck(dir.path());

    let mut deck = PptxDeck::open_template(&first).unwrap();
    assert_eq!(deck.layout_count(), 7);
    assert_eq!(deck.existing_slide_count(), 5);
    deck.add_title_slide(LayoutId::TITLE, "Again", "").unwrap();

    let second = dir.path().join("second.pptx");
    deck.finalize(&second).unwrap();

    let mut archive = ZipArchive::new(File::open(&second).unwrap()).unwrap();
    let presentation = read_part(&mut archive, "ppt/presentation.xml");
    assert!(presentation.contains(r#"<p:sldId id="261""#));
    archive.by_name("ppt/slides/slide6.xml").unwrap();
    let content_types = read_part(&mut archive, "[Content_Types].xml");
    assert_eq!(content_types.matches(r#"Extension="svg""#).count(), 1);
}

#[test]
fn test_missing_image_is_a_backend_error() {
    let mut deck = PptxDeck::builtin().unwrap();
    let err = deck
        .add_image_slide(LayoutId::TITLE_ONLY, "Gone", Path::new("/no/such/plot.svg"))
        .unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
}

#[test]
fn test_finalize_twice_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("deck.pptx");
    let mut deck = PptxDeck::builtin().unwrap();
    deck.add_text_slide(LayoutId::TITLE_ONLY, "T", "B").unwrap();
    deck.finalize(&output).unwrap();
    assert!(matches!(
        deck.finalize(&output),
        Err(Error::InvalidArgument(_))
    ));
}
