//! Etch-A-Sketch command file export.
//!
//! Produces the JSON command document consumed by the etch emulator:
//!
//! ```json
//! {
//!   "startX": 1.0, "startY": 1.0,
//!   "etchWidth": 2.0, "etchHeight": 2.0,
//!   "pointerRadius": 0.0025,
//!   "commands": [{"type": "LINE", "lineEnd": {"x": 1.5, "y": 1.0}}]
//! }
//! ```
//!
//! The stylus starts on the first path point and each following point
//! becomes one `LINE` command. Coordinates live in `[0, etchWidth]` by
//! `[0, etchHeight]`; with [`EtchOptions::fit`] the path is scaled
//! uniformly and centered into that area.

use serde::{Deserialize, Serialize};

use unistroke_core::{Point, Polyline};

/// Errors from building an etch command file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The path has no points, so there is no start position.
    #[error("cannot export an empty path")]
    EmptyPath,

    /// The drawing area or pointer settings are unusable.
    #[error("invalid etch area: {0}")]
    InvalidEtchArea(String),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Drawing area and placement options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtchOptions {
    /// Width of the drawing area.
    pub etch_width: f64,
    /// Height of the drawing area.
    pub etch_height: f64,
    /// Radius of the stylus tip, in drawing units.
    pub pointer_radius: f64,
    /// Scale and center the path into the drawing area.
    pub fit: bool,
    /// Border kept clear on every side when fitting.
    pub margin: f64,
}

impl EtchOptions {
    /// Default drawing area width (the polar plotter's unit disk, doubled).
    pub const DEFAULT_ETCH_WIDTH: f64 = 2.0;

    /// Default drawing area height.
    pub const DEFAULT_ETCH_HEIGHT: f64 = 2.0;

    /// Default stylus radius.
    pub const DEFAULT_POINTER_RADIUS: f64 = 0.0025;

    fn validate(&self) -> Result<(), ExportError> {
        if !(self.etch_width.is_finite() && self.etch_width > 0.0) {
            return Err(ExportError::InvalidEtchArea(format!(
                "width must be positive, got {}",
                self.etch_width
            )));
        }
        if !(self.etch_height.is_finite() && self.etch_height > 0.0) {
            return Err(ExportError::InvalidEtchArea(format!(
                "height must be positive, got {}",
                self.etch_height
            )));
        }
        if !(self.pointer_radius.is_finite() && self.pointer_radius >= 0.0) {
            return Err(ExportError::InvalidEtchArea(format!(
                "pointer radius must be non-negative, got {}",
                self.pointer_radius
            )));
        }
        if self.fit {
            let limit = self.etch_width.min(self.etch_height) / 2.0;
            if !(self.margin.is_finite() && self.margin >= 0.0 && self.margin < limit) {
                return Err(ExportError::InvalidEtchArea(format!(
                    "margin must be in [0, {limit}), got {}",
                    self.margin
                )));
            }
        }
        Ok(())
    }
}

impl Default for EtchOptions {
    fn default() -> Self {
        Self {
            etch_width: Self::DEFAULT_ETCH_WIDTH,
            etch_height: Self::DEFAULT_ETCH_HEIGHT,
            pointer_radius: Self::DEFAULT_POINTER_RADIUS,
            fit: true,
            margin: 0.0,
        }
    }
}

/// One stylus command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EtchCommand {
    /// Draw a straight line from the current stylus position.
    #[serde(rename = "LINE", rename_all = "camelCase")]
    Line { line_end: Point },
}

/// Complete command document for the etch emulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtchCommandFile {
    pub start_x: f64,
    pub start_y: f64,
    pub etch_width: f64,
    pub etch_height: f64,
    pub pointer_radius: f64,
    pub commands: Vec<EtchCommand>,
}

/// Map path coordinates into the drawing area.
fn placement(path: &Polyline, options: &EtchOptions) -> impl Fn(Point) -> Point {
    let identity = (Point::ZERO, 1.0, Point::ZERO);
    let (from, scale, to) = match path.bounds() {
        Some(bounds) if options.fit => {
            let size = bounds.size();
            let avail_w = 2.0f64.mul_add(-options.margin, options.etch_width);
            let avail_h = 2.0f64.mul_add(-options.margin, options.etch_height);
            let scale_w = if size.x > 0.0 { avail_w / size.x } else { f64::INFINITY };
            let scale_h = if size.y > 0.0 { avail_h / size.y } else { f64::INFINITY };
            let scale = scale_w.min(scale_h);
            let area_center = Point::new(options.etch_width / 2.0, options.etch_height / 2.0);
            (
                bounds.center(),
                if scale.is_finite() { scale } else { 1.0 },
                area_center,
            )
        }
        _ => identity,
    };
    move |p| to + (p - from) * scale
}

/// Convert a unified path into an etch command document.
///
/// # Errors
///
/// Returns [`ExportError::EmptyPath`] for a path without points and
/// [`ExportError::InvalidEtchArea`] for unusable options.
pub fn to_etch_commands(
    path: &Polyline,
    options: &EtchOptions,
) -> Result<EtchCommandFile, ExportError> {
    options.validate()?;
    let place = placement(path, options);
    let (first, rest) = path
        .points()
        .split_first()
        .ok_or(ExportError::EmptyPath)?;
    let start = place(*first);

    Ok(EtchCommandFile {
        start_x: start.x,
        start_y: start.y,
        etch_width: options.etch_width,
        etch_height: options.etch_height,
        pointer_radius: options.pointer_radius,
        commands: rest
            .iter()
            .map(|&p| EtchCommand::Line { line_end: place(p) })
            .collect(),
    })
}

/// Convert a unified path into pretty-printed etch command JSON.
///
/// # Errors
///
/// Same as [`to_etch_commands`], plus [`ExportError::Json`].
pub fn to_etch_json(path: &Polyline, options: &EtchOptions) -> Result<String, ExportError> {
    let file = to_etch_commands(path, options)?;
    Ok(serde_json::to_string_pretty(&file)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(coords: &[(f64, f64)]) -> Polyline {
        Polyline::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn ends(file: &EtchCommandFile) -> Vec<Point> {
        file.commands
            .iter()
            .map(|c| match c {
                EtchCommand::Line { line_end } => *line_end,
            })
            .collect()
    }

    #[test]
    fn one_line_command_per_following_point() {
        let path = line(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
        let options = EtchOptions {
            fit: false,
            ..EtchOptions::default()
        };
        let file = to_etch_commands(&path, &options).unwrap();
        assert_eq!((file.start_x, file.start_y), (0.0, 0.0));
        assert_eq!(ends(&file), vec![Point::new(1.0, 0.0), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn fit_centers_and_scales_uniformly() {
        // 10 x 5 box into a 2 x 2 area: scale 0.2, centered vertically.
        let path = line(&[(0.0, 0.0), (10.0, 5.0)]);
        let file = to_etch_commands(&path, &EtchOptions::default()).unwrap();
        assert!((file.start_x - 0.0).abs() < 1e-12);
        assert!((file.start_y - 0.5).abs() < 1e-12);
        let end = ends(&file)[0];
        assert!((end.x - 2.0).abs() < 1e-12);
        assert!((end.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn fit_respects_margin() {
        let path = line(&[(-3.0, -3.0), (3.0, 3.0)]);
        let options = EtchOptions {
            margin: 0.25,
            ..EtchOptions::default()
        };
        let file = to_etch_commands(&path, &options).unwrap();
        assert!((file.start_x - 0.25).abs() < 1e-12);
        assert!((ends(&file)[0].x - 1.75).abs() < 1e-12);
    }

    #[test]
    fn single_point_is_centered_without_commands() {
        let file = to_etch_commands(&line(&[(7.0, -2.0)]), &EtchOptions::default()).unwrap();
        assert_eq!((file.start_x, file.start_y), (1.0, 1.0));
        assert!(file.commands.is_empty());
    }

    #[test]
    fn empty_path_is_rejected() {
        let err = to_etch_commands(&Polyline::default(), &EtchOptions::default()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyPath));
    }

    #[test]
    fn bad_area_is_rejected() {
        let path = line(&[(0.0, 0.0), (1.0, 1.0)]);
        for options in [
            EtchOptions {
                etch_width: 0.0,
                ..EtchOptions::default()
            },
            EtchOptions {
                pointer_radius: -1.0,
                ..EtchOptions::default()
            },
            EtchOptions {
                margin: 1.0,
                ..EtchOptions::default()
            },
        ] {
            assert!(matches!(
                to_etch_commands(&path, &options),
                Err(ExportError::InvalidEtchArea(_))
            ));
        }
    }

    #[test]
    fn json_uses_emulator_field_names() {
        let path = line(&[(0.0, 0.0), (2.0, 2.0)]);
        let json: serde_json::Value =
            serde_json::from_str(&to_etch_json(&path, &EtchOptions::default()).unwrap()).unwrap();
        assert_eq!(json["etchWidth"], 2.0);
        assert_eq!(json["pointerRadius"], 0.0025);
        assert_eq!(json["startX"], 0.0);
        assert_eq!(json["commands"][0]["type"], "LINE");
        assert_eq!(json["commands"][0]["lineEnd"]["x"], 2.0);
        assert_eq!(json["commands"][0]["lineEnd"]["y"], 2.0);
    }
}
