//! Integration test: unify a small drawing and export it to every format.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use unistroke_core::{PathsDocument, UnifyConfig};
use unistroke_export::{EtchCommand, EtchOptions, SvgMetadata, ThrMetadata};

/// Outline of a house plus a detached sun.
const DRAWING: &str = r#"{"paths": [
    [{"x": 0, "y": 0}, {"x": 4, "y": 0}, {"x": 4, "y": 3}, {"x": 0, "y": 3}, {"x": 0, "y": 0}],
    [{"x": 0, "y": 3}, {"x": 2, "y": 5}, {"x": 4, "y": 3}],
    [{"x": 1.5, "y": 0}, {"x": 1.5, "y": 1.8}, {"x": 2.5, "y": 1.8}, {"x": 2.5, "y": 0}],
    [{"x": 7, "y": 6}, {"x": 8, "y": 6}, {"x": 8, "y": 7}, {"x": 7, "y": 7}, {"x": 7, "y": 6}]
]}"#;

fn unified() -> unistroke_core::UnifyResult {
    let document: PathsDocument = serde_json::from_str(DRAWING).unwrap();
    unistroke_core::unify(document, UnifyConfig::default()).expect("unify should succeed")
}

#[test]
fn house_to_svg() {
    let result = unified();
    let config_json = serde_json::to_string(&UnifyConfig::default()).unwrap();
    let svg = unistroke_export::to_svg(
        &result.path,
        &SvgMetadata {
            title: Some("house"),
            description: None,
            config_json: Some(&config_json),
        },
    );

    assert!(svg.starts_with("<?xml"));
    assert_eq!(svg.matches("<path").count(), 1);
    assert!(svg.contains("<title>house</title>"));
    assert!(svg.contains("move_epsilon"));

    let diagnostic =
        unistroke_export::to_diagnostic_svg(&result.path, &result.transitions, &SvgMetadata::default());
    assert_eq!(diagnostic.matches("<line").count(), result.transitions.len());
}

#[test]
fn house_to_etch_stays_inside_area() {
    let result = unified();
    let options = EtchOptions::default();
    let file = unistroke_export::to_etch_commands(&result.path, &options).unwrap();

    assert_eq!(file.commands.len(), result.path.len() - 1);
    let inside = |x: f64, y: f64| {
        (-1e-9..=options.etch_width + 1e-9).contains(&x)
            && (-1e-9..=options.etch_height + 1e-9).contains(&y)
    };
    assert!(inside(file.start_x, file.start_y));
    for command in &file.commands {
        let EtchCommand::Line { line_end } = command;
        assert!(inside(line_end.x, line_end.y), "{line_end:?} outside area");
    }
}

#[test]
fn house_to_thr_has_one_pair_per_point() {
    let result = unified();
    let thr = unistroke_export::to_thr(&result.path, &ThrMetadata::default(), None);
    let pairs: Vec<&str> = thr.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(pairs.len(), result.path.len());
    for pair in pairs {
        let rho: f64 = pair.split_whitespace().nth(1).unwrap().parse().unwrap();
        assert!((0.0..=1.0).contains(&rho));
    }
}
