//! THR (Theta-Rho) export serializer.
//!
//! Converts the unified path into a `.thr` text file for polar sand
//! tables, which like an Etch-A-Sketch can only draw one continuous
//! stroke.
//!
//! Each line contains a `theta rho` pair (space-separated), where:
//! - **theta**: continuous radians (accumulating, does NOT wrap at 2π)
//! - **rho**: 0.0 (center) to 1.0 (edge), normalized
//!
//! Lines beginning with `#` are metadata comments, ignored by table
//! firmware. Theta follows the sand table ecosystem's `atan2(x, y)`
//! convention, so theta 0 points along +Y.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::f64::consts::PI;
use std::fmt::Write;

use unistroke_core::{Point, Polyline};

/// Metadata to embed as `#`-prefixed comment lines at the top of the
/// `.thr` file.
#[derive(Debug, Clone, Default)]
pub struct ThrMetadata<'a> {
    /// Source file name, emitted as `# Source: <name>`.
    pub title: Option<&'a str>,

    /// Free-form description, emitted as a `#` comment.
    pub description: Option<&'a str>,

    /// Full `UnifyConfig` JSON, emitted as `# Config: <json>`.
    pub config_json: Option<&'a str>,
}

/// Polar coordinate frame: rho 1.0 lies `radius` away from `center`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarFrame {
    /// Polar origin.
    pub center: Point,
    /// Distance mapped to rho 1.0.
    pub radius: f64,
}

impl PolarFrame {
    /// Frame centered on the path's bounding box, with the radius of
    /// the smallest such circle containing every point.
    ///
    /// Returns `None` for an empty path.
    #[must_use]
    pub fn enclosing(path: &Polyline) -> Option<Self> {
        let center = path.bounds()?.center();
        let radius = path
            .points()
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f64::max);
        Some(Self { center, radius })
    }
}

/// Serialize the unified path into a THR (Theta-Rho) text string.
///
/// When `frame` is `None` the path is framed by
/// [`PolarFrame::enclosing`]. Coordinates are formatted to 5 decimal
/// places.
///
/// # Examples
///
/// ```
/// use unistroke_core::{Point, Polyline};
/// use unistroke_export::thr::{PolarFrame, ThrMetadata, to_thr};
///
/// let path = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(0.0, 1.0)]);
/// let frame = PolarFrame { center: Point::new(0.0, 0.0), radius: 1.0 };
/// let thr = to_thr(&path, &ThrMetadata::default(), Some(frame));
/// assert!(thr.ends_with("0.00000 0.00000\n0.00000 1.00000\n"));
/// ```
#[must_use]
pub fn to_thr(path: &Polyline, metadata: &ThrMetadata<'_>, frame: Option<PolarFrame>) -> String {
    let mut out = String::new();

    // --- Metadata header ---
    let _ = writeln!(out, "# unistroke");
    if let Some(title) = metadata.title {
        for line in title.lines() {
            let _ = writeln!(out, "# Source: {line}");
        }
    }
    if let Some(description) = metadata.description {
        for line in description.lines() {
            let _ = writeln!(out, "# {line}");
        }
    }
    if let Some(config_json) = metadata.config_json {
        for line in config_json.lines() {
            let _ = writeln!(out, "# Config: {line}");
        }
    }

    let Some(frame) = frame.or_else(|| PolarFrame::enclosing(path)) else {
        return out;
    };

    // --- Theta-Rho data ---
    let mut prev_theta: Option<f64> = None;
    for point in path.points() {
        let dx = point.x - frame.center.x;
        let dy = point.y - frame.center.y;

        let dist = dx.hypot(dy);
        let rho = if frame.radius > 0.0 {
            (dist / frame.radius).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Theta is undefined at the origin; keep the previous heading.
        let theta = if dist == 0.0 {
            prev_theta.unwrap_or(0.0)
        } else {
            let raw_theta = dx.atan2(dy);
            prev_theta.map_or(raw_theta, |prev| {
                // Unwind to the equivalent angle nearest the previous one.
                let two_pi = 2.0 * PI;
                let mut delta = (raw_theta - prev) % two_pi;
                if delta > PI {
                    delta -= two_pi;
                } else if delta < -PI {
                    delta += two_pi;
                }
                prev + delta
            })
        };
        prev_theta = Some(theta);

        let _ = writeln!(out, "{theta:.5} {rho:.5}");
    }

    out
}
