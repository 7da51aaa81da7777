//! SVG export serializer.
//!
//! Renders the unified path as a single `<path>` element using the
//! [`svg`] crate for document construction, XML escaping, and path data
//! formatting. The `viewBox` is fitted to the path's bounding box plus
//! a small margin, so any input coordinate system displays sensibly.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>`, and a
//! `<metadata>` block carrying the unify configuration as JSON.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Line, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use unistroke_core::{Aabb, Point, Polyline, TransitionInfo};

/// Margin around the drawing, as a fraction of its larger extent.
const MARGIN_FRACTION: f64 = 0.025;

/// Margin used when the drawing has no extent (empty or a single point).
const FALLBACK_MARGIN: f64 = 1.0;

/// Namespace of the `<unistroke:config>` metadata element.
const METADATA_NAMESPACE: &str = "https://unistroke.dev/ns/1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the input file name without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`UnifyConfig`](unistroke_core::UnifyConfig), emitted
    /// inside `<metadata>` wrapped in a namespaced `<unistroke:config>`
    /// element so exported files record how they were produced.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use unistroke_core::{Point, Polyline};
/// use unistroke_export::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(&polyline), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(polyline: &Polyline) -> String {
    let points = polyline.points();
    if points.len() < 2 {
        return String::new();
    }

    let first = &points[0];
    let mut data = Data::new().move_to((first.x, first.y));
    for p in &points[1..] {
        data = data.line_to((p.x, p.y));
    }
    String::from(Value::from(data))
}

/// The `viewBox` rectangle for a drawing with the given bounds.
///
/// Returns `(min_x, min_y, width, height)`.
fn view_box(bounds: Option<Aabb>) -> (f64, f64, f64, f64) {
    let bounds = bounds.unwrap_or_else(|| Aabb::new(Point::ZERO, Point::ZERO));
    let size = bounds.size();
    let extent = size.x.max(size.y);
    let margin = if extent > 0.0 {
        extent * MARGIN_FRACTION
    } else {
        FALLBACK_MARGIN
    };
    (
        bounds.min.x - margin,
        bounds.min.y - margin,
        2.0f64.mul_add(margin, size.x),
        2.0f64.mul_add(margin, size.y),
    )
}

/// Open a document with the fitted `viewBox` and optional metadata.
fn document(bounds: Option<Aabb>, metadata: &SvgMetadata<'_>) -> (Document, (f64, f64, f64, f64)) {
    let vb = view_box(bounds);
    let mut doc = Document::new()
        .set("viewBox", format!("{} {} {} {}", vb.0, vb.1, vb.2, vb.3))
        .set("preserveAspectRatio", "xMidYMid meet");

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("unistroke:config");
        config_el.assign("xmlns:unistroke", METADATA_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    (doc, vb)
}

/// Stroke for the drawing itself.
fn path_element(d: String, stroke: &str) -> Path {
    Path::new()
        .set("d", d)
        .set("fill", "none")
        .set("stroke", stroke)
        .set("stroke-width", 1)
        .set("vector-effect", "non-scaling-stroke")
}

/// Serialize the unified path to an SVG string.
///
/// Paths with fewer than 2 points produce a document without a
/// `<path>` element.
#[must_use]
pub fn to_svg(path: &Polyline, metadata: &SvgMetadata<'_>) -> String {
    let (mut doc, _) = document(path.bounds(), metadata);

    let d = build_path_data(path);
    if !d.is_empty() {
        doc = doc.add(path_element(d, "black"));
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize the unified path with its connective jumps highlighted.
///
/// The path is drawn in white on a dark background; every spanning
/// tree transition is overlaid as a red `<line>` inside
/// `<g id="transitions">`, carrying its length and the two segment
/// indices it joins as `data-*` attributes.
#[must_use]
pub fn to_diagnostic_svg(
    path: &Polyline,
    transitions: &[TransitionInfo],
    metadata: &SvgMetadata<'_>,
) -> String {
    let bounds = transitions
        .iter()
        .fold(path.bounds(), |acc, t| {
            let b = acc.unwrap_or(Aabb::EMPTY);
            Some(b.include_point(t.from).include_point(t.to))
        });
    let (mut doc, vb) = document(bounds, metadata);

    doc = doc.add(
        Rectangle::new()
            .set("x", vb.0.to_string())
            .set("y", vb.1.to_string())
            .set("width", vb.2.to_string())
            .set("height", vb.3.to_string())
            .set("fill", "#1a1a1a"),
    );

    let d = build_path_data(path);
    if !d.is_empty() {
        doc = doc.add(Group::new().set("id", "path").add(path_element(d, "white")));
    }

    if !transitions.is_empty() {
        let mut group = Group::new()
            .set("id", "transitions")
            .set("stroke", "red")
            .set("stroke-width", "1.5")
            .set("vector-effect", "non-scaling-stroke")
            .set("opacity", "0.9");
        for (i, t) in transitions.iter().enumerate() {
            group = group.add(
                Line::new()
                    .set("x1", t.from.x.to_string())
                    .set("y1", t.from.y.to_string())
                    .set("x2", t.to.x.to_string())
                    .set("y2", t.to.y.to_string())
                    .set("data-length", format!("{:.4}", t.length))
                    .set("data-segments", format!("{},{}", t.parent, t.child))
                    .set("data-index", i.to_string()),
            );
        }
        doc = doc.add(group);
    }

    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Shorthand: no metadata (most tests don't care about it).
    fn no_meta() -> SvgMetadata<'static> {
        SvgMetadata::default()
    }

    fn line(coords: &[(f64, f64)]) -> Polyline {
        Polyline::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn transition(from: (f64, f64), to: (f64, f64)) -> TransitionInfo {
        let (from, to) = (Point::new(from.0, from.1), Point::new(to.0, to.1));
        TransitionInfo {
            parent: 0,
            child: 1,
            from,
            to,
            length: from.distance(to),
        }
    }

    // --- build_path_data ---

    #[test]
    fn build_path_data_empty_polyline() {
        assert_eq!(build_path_data(&Polyline::new(vec![])), "");
    }

    #[test]
    fn build_path_data_single_point() {
        assert_eq!(build_path_data(&line(&[(5.0, 5.0)])), "");
    }

    #[test]
    fn build_path_data_three_points() {
        let d = build_path_data(&line(&[(10.0, 15.0), (12.5, 18.3), (14.0, 20.1)]));
        assert_eq!(d, "M10,15 L12.5,18.3 L14,20.1");
    }

    #[test]
    fn build_path_data_negative_coords() {
        let d = build_path_data(&line(&[(-1.0, -2.0), (3.0, -4.0)]));
        assert_eq!(d, "M-1,-2 L3,-4");
    }

    // --- viewBox ---

    #[test]
    fn view_box_adds_margin_around_bounds() {
        let vb = view_box(line(&[(0.0, 0.0), (100.0, 50.0)]).bounds());
        assert!((vb.0 - -2.5).abs() < 1e-12);
        assert!((vb.1 - -2.5).abs() < 1e-12);
        assert!((vb.2 - 105.0).abs() < 1e-12);
        assert!((vb.3 - 55.0).abs() < 1e-12);
    }

    #[test]
    fn view_box_of_nothing_is_not_degenerate() {
        let vb = view_box(None);
        assert!(vb.2 > 0.0 && vb.3 > 0.0);
        let vb = view_box(line(&[(4.0, 4.0)]).bounds());
        assert!(vb.2 > 0.0 && vb.3 > 0.0);
    }

    // --- to_svg ---

    #[test]
    fn empty_path_produces_valid_svg_without_path() {
        let svg = to_svg(&Polyline::default(), &no_meta());
        assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(svg.contains("<svg "));
        assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
        assert!(!svg.contains("<path"));
    }

    #[test]
    fn single_path_element_with_stroke() {
        let svg = to_svg(&line(&[(0.0, 0.0), (100.0, 50.0)]), &no_meta());
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(svg.contains(r#"d="M0,0 L100,50""#));
        assert!(svg.contains(r#"fill="none""#));
        assert!(svg.contains(r#"stroke="black""#));
        assert!(svg.contains(r#"viewBox="-2.5 -2.5 105 55""#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn title_desc_and_metadata_in_order() {
        let meta = SvgMetadata {
            title: Some("drawing"),
            description: Some("unified"),
            config_json: Some(r#"{"move_epsilon":1e-7}"#),
        };
        let svg = to_svg(&line(&[(0.0, 0.0), (1.0, 1.0)]), &meta);

        let title_pos = svg.find("<title>drawing</title>").unwrap();
        let desc_pos = svg.find("<desc>unified</desc>").unwrap();
        let metadata_pos = svg.find("<metadata>").unwrap();
        let path_pos = svg.find("<path").unwrap();
        assert!(title_pos < desc_pos);
        assert!(desc_pos < metadata_pos);
        assert!(metadata_pos < path_pos);
        assert!(svg.contains(r#"<unistroke:config xmlns:unistroke="https://unistroke.dev/ns/1">"#));
    }

    #[test]
    fn special_characters_are_escaped() {
        let meta = SvgMetadata {
            title: Some("A <B> & C"),
            ..SvgMetadata::default()
        };
        let svg = to_svg(&Polyline::default(), &meta);
        assert!(svg.contains("<title>A &lt;B&gt; &amp; C</title>"));
    }

    #[test]
    fn metadata_omitted_when_absent() {
        let svg = to_svg(&Polyline::default(), &no_meta());
        assert!(!svg.contains("<metadata>"));
        assert!(!svg.contains("<title>"));
    }

    // --- to_diagnostic_svg ---

    #[test]
    fn diagnostic_svg_draws_each_transition() {
        let path = line(&[(0.0, 0.0), (1.0, 0.0), (10.0, 0.0), (11.0, 0.0)]);
        let transitions = [transition((1.0, 0.0), (10.0, 0.0))];
        let svg = to_diagnostic_svg(&path, &transitions, &no_meta());

        assert!(svg.contains(r#"id="transitions""#));
        assert!(svg.contains(r#"stroke="red""#));
        assert_eq!(svg.matches("<line").count(), 1);
        assert!(svg.contains(r#"data-length="9.0000""#));
        assert!(svg.contains(r#"data-segments="0,1""#));
        assert!(svg.contains(r#"<g id="path">"#));
        assert!(svg.contains(r##"fill="#1a1a1a""##));
    }

    #[test]
    fn diagnostic_svg_without_transitions_has_no_group() {
        let svg = to_diagnostic_svg(&line(&[(0.0, 0.0), (1.0, 0.0)]), &[], &no_meta());
        assert!(!svg.contains("transitions"));
        assert!(svg.contains("<path"));
    }

    #[test]
    fn diagnostic_view_box_covers_transitions() {
        let svg = to_diagnostic_svg(
            &line(&[(0.0, 0.0), (10.0, 0.0)]),
            &[transition((0.0, 0.0), (0.0, 10.0))],
            &no_meta(),
        );
        assert!(svg.contains(r#"viewBox="-0.25 -0.25 10.5 10.5""#));
    }
}
