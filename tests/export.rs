//! End-to-end export of the fixture drawing with a recording tool runner.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use layerex::cli::build::{run_with, BuildArgs};
use layerex::output::Printer;
use layerex::{
    get_property, ArtifactPipeline, Config, GenerationSpec, LayerDirectory, LayerexError, Result,
    SvgDocument, ToolOutput, ToolRunner,
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Keeps a copy of every SVG handed to the renderer.
#[derive(Default)]
struct Recorder {
    rendered: Vec<(PathBuf, String)>,
}

impl ToolRunner for Recorder {
    fn run(&mut self, program: &str, args: &[OsString]) -> Result<ToolOutput> {
        if let Some(svg) = args.last() {
            let svg = PathBuf::from(svg);
            let content = fs::read_to_string(&svg).unwrap_or_default();
            self.rendered.push((svg, content));
        }
        Ok(ToolOutput::ok(program))
    }
}

fn visible_layers(svg: &str) -> Vec<(String, String)> {
    let document = SvgDocument::parse(svg).unwrap();
    LayerDirectory::discover(&document)
        .iter()
        .map(|layer| {
            let style = document.element(&layer.path).unwrap().attr("style").unwrap();
            (
                layer.label.clone().unwrap(),
                get_property(style, "display").unwrap(),
            )
        })
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// Copy the fixture config into `dir` with the build path pointed there.
fn config_in(dir: &Path) -> PathBuf {
    let mut config: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(fixture("layers.json")).unwrap()).unwrap();
    config["build-path"] = serde_json::Value::from(dir.join("out").to_str().unwrap());

    let path = dir.join("layers.json");
    fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
fn pruned_artifacts_keep_only_their_layers() {
    let dir = tempdir().unwrap();
    let args = BuildArgs {
        config_file: config_in(dir.path()),
        svg_file: fixture("drawing.svg"),
    };

    let mut recorder = Recorder::default();
    let report = run_with(args, &mut recorder, &Printer::quiet()).unwrap();

    let names: Vec<&str> = report.completed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["step1", "step2"]);

    let out = dir.path().join("out");
    assert_eq!(recorder.rendered[0].0, out.join("step1.svg"));
    assert_eq!(
        visible_layers(&recorder.rendered[0].1),
        pairs(&[("Base", "inline"), ("Note", "inline")])
    );
    assert_eq!(recorder.rendered[1].0, out.join("step2.svg"));
    assert_eq!(
        visible_layers(&recorder.rendered[1].1),
        pairs(&[("Detail", "inline")])
    );
}

#[test]
fn unpruned_artifacts_keep_every_layer_and_other_markup() {
    let dir = tempdir().unwrap();
    let mut config = Config::load(&fixture("layers.json")).unwrap();
    config.build_path = dir.path().to_path_buf();
    config.del_invisible_layers_on_save = false;

    let mut drawing = SvgDocument::load(&fixture("drawing.svg")).unwrap();
    let layers = LayerDirectory::discover(&drawing);
    let pipeline = ArtifactPipeline::new(&config, GenerationSpec::from_config(&config));

    let mut recorder = Recorder::default();
    pipeline
        .run(&mut drawing, &layers, &mut recorder, &Printer::quiet())
        .unwrap();

    let step1 = &recorder.rendered[0].1;
    assert_eq!(
        visible_layers(step1),
        pairs(&[("Base", "inline"), ("Detail", "none"), ("Note", "inline")])
    );
    // Other style properties and markup survive the rewrite.
    assert!(step1.contains("opacity:0.8"), "{step1}");
    assert!(step1.contains("Step &amp; note"), "{step1}");
    assert!(step1.contains("sodipodi:namedview"), "{step1}");

    assert_eq!(
        visible_layers(&recorder.rendered[1].1),
        pairs(&[("Base", "none"), ("Detail", "inline"), ("Note", "none")])
    );
}

#[test]
fn missing_drawing_is_reported() {
    let dir = tempdir().unwrap();
    let args = BuildArgs {
        config_file: config_in(dir.path()),
        svg_file: dir.path().join("missing.svg"),
    };

    let err = run_with(args, &mut Recorder::default(), &Printer::quiet()).unwrap_err();
    assert!(matches!(err, LayerexError::Io { ref path, .. } if path.ends_with("missing.svg")));
}
