//! The deck interpreter: configuration in, rendering calls out.
//!
//! A run loads the configuration, validates every slide descriptor, then
//! dispatches the slides in order to the [`SlideBackend`]. The deck is
//! finalized once, after the last slide succeeded. The first error aborts the
//! run and nothing is finalized.

use crate::backend::{ChartBackend, SlideBackend};
use crate::descriptor::{SlideContent, SlideDescriptor};
use crate::error::{Error, Result};
use crate::layout::LayoutId;
use crate::plot::{ChartFormat, PlotJob};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Settings of one deck generation.
#[derive(Debug, Clone)]
pub struct DeckOptions {
    /// Where the finished deck is written.
    output: PathBuf,
    /// Where plot images are kept. None means a scratch directory removed
    /// after the run.
    chart_dir: Option<PathBuf>,
    /// Image format of plot images.
    chart_format: ChartFormat,
}

impl DeckOptions {
    /// Options writing the deck to `output`.
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            chart_dir: None,
            chart_format: ChartFormat::default(),
        }
    }

    /// Keep plot images in `dir`.
    pub fn with_chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    pub fn with_chart_format(mut self, format: ChartFormat) -> Self {
        self.chart_format = format;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn chart_dir(&self) -> Option<&Path> {
        self.chart_dir.as_deref()
    }

    pub fn chart_format(&self) -> ChartFormat {
        self.chart_format
    }
}

/// Read and validate the slide descriptors of a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Vec<SlideDescriptor>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::InvalidData => {
            Error::data_format(path, "configuration is not valid UTF-8")
        }
        _ => Error::NotFound {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_config(&text, path)
}

/// Validate the slide descriptors of configuration text. `path` is only used
/// in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Vec<SlideDescriptor>> {
    let root: Value = serde_json::from_str(text)
        .map_err(|e| Error::data_format(path, format!("invalid JSON: {e}")))?;

    let slides = root
        .get("presentation")
        .ok_or_else(|| Error::data_format(path, "missing 'presentation' key"))?
        .as_array()
        .ok_or_else(|| Error::data_format(path, "'presentation' must be an array"))?;

    let slides = slides
        .iter()
        .enumerate()
        .map(|(index, value)| SlideDescriptor::from_value(index, value))
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Loaded {} slide descriptors from {}", slides.len(), path.display());
    Ok(slides)
}

/// Drives a [`SlideBackend`] from slide descriptors.
#[derive(Debug)]
pub struct DeckInterpreter<C> {
    charts: C,
    options: DeckOptions,
}

impl<C: ChartBackend> DeckInterpreter<C> {
    /// Create an interpreter drawing plots with `charts`.
    pub fn new(charts: C, options: DeckOptions) -> Self {
        Self { charts, options }
    }

    pub fn options(&self) -> &DeckOptions {
        &self.options
    }

    /// Generate the deck described by the configuration at `config_path`.
    pub fn generate<B: SlideBackend + ?Sized>(
        &self,
        config_path: impl AsRef<Path>,
        backend: &mut B,
    ) -> Result<()> {
        let config_path = config_path.as_ref();
        log::info!("Generating deck from {}", config_path.display());

        let slides = load_config(config_path)?;
        self.render(&slides, backend)
    }

    /// Render already validated slides, then finalize the deck.
    pub fn render<B: SlideBackend + ?Sized>(
        &self,
        slides: &[SlideDescriptor],
        backend: &mut B,
    ) -> Result<()> {
        let charts = ChartDir::prepare(&self.options, slides)?;

        for (index, slide) in slides.iter().enumerate() {
            self.dispatch(index, slide, &charts, backend)
                .map_err(|source| Error::Render {
                    index,
                    kind: slide.kind().to_string(),
                    source: Box::new(source),
                })?;
        }

        let output = &self.options.output;
        backend.finalize(output).map_err(|e| match e {
            e @ Error::ArtifactWrite { .. } => e,
            other => Error::artifact_write(output, other),
        })?;

        log::info!("Wrote {} slides to {}", slides.len(), output.display());
        Ok(())
    }

    fn dispatch<B: SlideBackend + ?Sized>(
        &self,
        index: usize,
        slide: &SlideDescriptor,
        charts: &ChartDir,
        backend: &mut B,
    ) -> Result<()> {
        let layout = LayoutId::for_kind(slide.kind());
        let title = slide.title.as_str();
        log::debug!("Slide {}: {} on layout {}", index, slide.kind(), layout);

        match &slide.content {
            SlideContent::Title { subtitle } => backend.add_title_slide(layout, title, subtitle),
            SlideContent::Text { body } => backend.add_text_slide(layout, title, body),
            SlideContent::List { items } => {
                let (levels, texts): (Vec<u32>, Vec<String>) = items
                    .iter()
                    .map(|item| (item.level, item.text.clone()))
                    .unzip();
                backend.add_list_slide(layout, title, &levels, &texts)
            }
            SlideContent::Picture { path } => backend.add_image_slide(layout, title, path),
            SlideContent::Plot { source, labels } => {
                let output = charts.image_path(index, self.options.chart_format);
                let image = PlotJob::new(source, labels)
                    .with_title(title)
                    .render(&self.charts, &output)?;
                backend.add_image_slide(layout, title, &image)
            }
        }
    }
}

/// Directory receiving the plot images of one run.
struct ChartDir {
    path: PathBuf,
    // Removed on drop; backends have read the images by then.
    _scratch: Option<tempfile::TempDir>,
}

impl ChartDir {
    fn prepare(options: &DeckOptions, slides: &[SlideDescriptor]) -> Result<Self> {
        if let Some(dir) = &options.chart_dir {
            std::fs::create_dir_all(dir).map_err(|e| Error::artifact_write(dir, e))?;
            return Ok(Self {
                path: dir.clone(),
                _scratch: None,
            });
        }

        let has_plots = slides
            .iter()
            .any(|s| matches!(s.content, SlideContent::Plot { .. }));
        if !has_plots {
            return Ok(Self {
                path: PathBuf::new(),
                _scratch: None,
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("slidegen-charts-")
            .tempdir()
            .map_err(|e| Error::artifact_write(std::env::temp_dir(), e))?;
        Ok(Self {
            path: scratch.path().to_path_buf(),
            _scratch: Some(scratch),
        })
    }

    fn image_path(&self, index: usize, format: ChartFormat) -> PathBuf {
        self.path
            .join(format!("plot-{:03}.{}", index, format.extension()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::AxisLabels;
    use crate::layout::LayoutId;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Title(LayoutId, String, String),
        Text(LayoutId, String, String),
        List(LayoutId, String, Vec<u32>, Vec<String>),
        Image(LayoutId, String, PathBuf),
        Finalize(PathBuf),
    }

    #[derive(Default)]
    struct RecordingBackend {
        calls: Vec<Call>,
        fail_images: bool,
        fail_finalize: bool,
    }

    impl SlideBackend for RecordingBackend {
        fn add_title_slide(&mut self, layout: LayoutId, title: &str, subtitle: &str) -> Result<()> {
            self.calls
                .push(Call::Title(layout, title.into(), subtitle.into()));
            Ok(())
        }

        fn add_text_slide(&mut self, layout: LayoutId, title: &str, body: &str) -> Result<()> {
            self.calls.push(Call::Text(layout, title.into(), body.into()));
            Ok(())
        }

        fn add_list_slide(
            &mut self,
            layout: LayoutId,
            title: &str,
            levels: &[u32],
            texts: &[String],
        ) -> Result<()> {
            self.calls.push(Call::List(
                layout,
                title.into(),
                levels.to_vec(),
                texts.to_vec(),
            ));
            Ok(())
        }

        fn add_image_slide(&mut self, layout: LayoutId, title: &str, image: &Path) -> Result<()> {
            if self.fail_images {
                return Err(Error::Backend("cannot read image".to_string()));
            }
            self.calls
                .push(Call::Image(layout, title.into(), image.to_path_buf()));
            Ok(())
        }

        fn finalize(&mut self, output: &Path) -> Result<()> {
            if self.fail_finalize {
                return Err(Error::Backend("disk full".to_string()));
            }
            self.calls.push(Call::Finalize(output.to_path_buf()));
            Ok(())
        }
    }

    /// Writes a small text file in place of a real chart.
    #[derive(Default)]
    struct FileCharts {
        plotted: RefCell<Vec<(Vec<f64>, Vec<f64>, AxisLabels)>>,
    }

    impl ChartBackend for FileCharts {
        fn plot_line(
            &self,
            x: &[f64],
            y: &[f64],
            labels: &AxisLabels,
            _title: &str,
            output: &Path,
        ) -> Result<()> {
            std::fs::write(output, "chart").map_err(|e| Error::artifact_write(output, e))?;
            self.plotted
                .borrow_mut()
                .push((x.to_vec(), y.to_vec(), labels.clone()));
            Ok(())
        }
    }

    fn write_config(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("deck.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    fn json_path(path: &Path) -> String {
        serde_json::to_string(&path.to_string_lossy()).unwrap()
    }

    #[test]
    fn test_plot_slide_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.txt");
        std::fs::write(&data, "0 0 1 1 2 4").unwrap();
        let config = write_config(
            dir.path(),
            &format!(
                r#"{{"presentation":[{{"kind":"plot","title":"T","content":{},"configuration":{{"x-label":"t","y-label":"v"}}}}]}}"#,
                json_path(&data)
            ),
        );

        let charts_dir = dir.path().join("charts");
        let options = DeckOptions::new(dir.path().join("out.pptx")).with_chart_dir(&charts_dir);
        let interpreter = DeckInterpreter::new(FileCharts::default(), options);
        let mut backend = RecordingBackend::default();
        interpreter.generate(&config, &mut backend).unwrap();

        let image = charts_dir.join("plot-000.svg");
        assert!(image.exists());
        assert_eq!(
            backend.calls,
            vec![
                Call::Image(LayoutId(5), "T".into(), image),
                Call::Finalize(dir.path().join("out.pptx")),
            ]
        );

        let plotted = interpreter.charts.plotted.borrow();
        assert_eq!(plotted.len(), 1);
        assert_eq!(plotted[0].0, vec![0.0, 1.0, 2.0]);
        assert_eq!(plotted[0].1, vec![0.0, 1.0, 4.0]);
        assert_eq!(plotted[0].2, AxisLabels::new("t", "v"));
    }

    #[test]
    fn test_slide_order_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.txt");
        std::fs::write(&data, "1 2 3 4").unwrap();
        let config = write_config(
            dir.path(),
            &format!(
                r#"{{"presentation":[
                    {{"kind":"title","title":"Course","content":"Intro"}},
                    {{"kind":"list","title":"Tools","content":[{{"level":1,"text":"Python"}},{{"level":2,"text":"pip"}}]}},
                    {{"kind":"plot","title":"Data","content":{},"configuration":{{"x-label":"x","y-label":"y"}}}},
                    {{"kind":"picture","title":"Logo","content":"logo.png"}}
                ]}}"#,
                json_path(&data)
            ),
        );

        let options = DeckOptions::new("out.pptx").with_chart_format(ChartFormat::Png);
        let interpreter = DeckInterpreter::new(FileCharts::default(), options);
        let mut backend = RecordingBackend::default();
        interpreter.generate(&config, &mut backend).unwrap();

        assert_eq!(backend.calls.len(), 5);
        assert_eq!(
            backend.calls[0],
            Call::Title(LayoutId(0), "Course".into(), "Intro".into())
        );
        assert_eq!(
            backend.calls[1],
            Call::List(
                LayoutId(1),
                "Tools".into(),
                vec![1, 2],
                vec!["Python".into(), "pip".into()]
            )
        );
        match &backend.calls[2] {
            Call::Image(layout, title, path) => {
                assert_eq!(*layout, LayoutId(5));
                assert_eq!(title, "Data");
                assert!(path.ends_with("plot-002.png"));
            }
            other => panic!("expected an image slide, got {other:?}"),
        }
        assert_eq!(
            backend.calls[3],
            Call::Image(LayoutId(5), "Logo".into(), PathBuf::from("logo.png"))
        );
        assert_eq!(backend.calls[4], Call::Finalize(PathBuf::from("out.pptx")));
    }

    #[test]
    fn test_text_slide() {
        let slides = vec![SlideDescriptor::new(
            "Notes",
            SlideContent::Text {
                body: "Long text".into(),
            },
        )];
        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("a.pptx"));
        let mut backend = RecordingBackend::default();
        interpreter.render(&slides, &mut backend).unwrap();
        assert_eq!(
            backend.calls[0],
            Call::Text(LayoutId(5), "Notes".into(), "Long text".into())
        );
    }

    #[test]
    fn test_validation_error_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data.txt");
        std::fs::write(&data, "1 2").unwrap();
        let config = write_config(
            dir.path(),
            &format!(
                r#"{{"presentation":[
                    {{"kind":"plot","title":"P","content":{},"configuration":{{"x-label":"x","y-label":"y"}}}},
                    {{"kind":"title","title":"A","content":"B"}},
                    {{"kind":"list","title":"Oops","content":"not a list"}}
                ]}}"#,
                json_path(&data)
            ),
        );

        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("out.pptx"));
        let mut backend = RecordingBackend::default();
        let err = interpreter.generate(&config, &mut backend).unwrap_err();

        assert!(matches!(err, Error::Validation { index: 2, ref kind, .. } if kind == "list"));
        assert!(backend.calls.is_empty());
        assert!(interpreter.charts.plotted.borrow().is_empty());
    }

    #[test]
    fn test_backend_failure_is_tagged_with_slide_index() {
        let slides = vec![
            SlideDescriptor::new(
                "A",
                SlideContent::Title {
                    subtitle: "B".into(),
                },
            ),
            SlideDescriptor::new(
                "Pic",
                SlideContent::Picture {
                    path: "missing.png".into(),
                },
            ),
        ];
        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("a.pptx"));
        let mut backend = RecordingBackend {
            fail_images: true,
            ..Default::default()
        };
        let err = interpreter.render(&slides, &mut backend).unwrap_err();

        match err {
            Error::Render {
                index,
                kind,
                source,
            } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "picture");
                assert!(matches!(*source, Error::Backend(_)));
            }
            other => panic!("expected a render error, got {other:?}"),
        }
        // The title slide went through, but the deck was never finalized.
        assert_eq!(backend.calls.len(), 1);
    }

    #[test]
    fn test_plot_failure_is_a_render_error() {
        let slides = vec![SlideDescriptor::new(
            "P",
            SlideContent::Plot {
                source: "/no/such/data.txt".into(),
                labels: AxisLabels::new("x", "y"),
            },
        )];
        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("a.pptx"));
        let mut backend = RecordingBackend::default();
        let err = interpreter.render(&slides, &mut backend).unwrap_err();

        assert!(matches!(
            err,
            Error::Render { index: 0, ref source, .. } if matches!(**source, Error::NotFound { .. })
        ));
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn test_finalize_failure_is_an_artifact_write_error() {
        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("a.pptx"));
        let mut backend = RecordingBackend {
            fail_finalize: true,
            ..Default::default()
        };
        let err = interpreter.render(&[], &mut backend).unwrap_err();
        assert!(matches!(err, Error::ArtifactWrite { ref path, .. } if path == Path::new("a.pptx")));
    }

    #[test]
    fn test_empty_presentation_still_finalizes() {
        let interpreter = DeckInterpreter::new(FileCharts::default(), DeckOptions::new("a.pptx"));
        let mut backend = RecordingBackend::default();
        interpreter.render(&[], &mut backend).unwrap();
        assert_eq!(backend.calls, vec![Call::Finalize(PathBuf::from("a.pptx"))]);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_config(dir.path().join("missing.json")),
            Err(Error::NotFound { .. })
        ));

        let bad = write_config(dir.path(), "{ not json");
        assert!(matches!(load_config(&bad), Err(Error::DataFormat { .. })));

        let no_key = write_config(dir.path(), r#"{"slides": []}"#);
        assert!(matches!(load_config(&no_key), Err(Error::DataFormat { .. })));

        let not_array = write_config(dir.path(), r#"{"presentation": {}}"#);
        assert!(matches!(load_config(&not_array), Err(Error::DataFormat { .. })));
    }
}
