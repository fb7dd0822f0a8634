use kurbo::{Arc, BezPath, Point, Vec2};

use crate::foundation::error::{CardError, CardResult};

/// Flattening tolerance for arc-to-cubic conversion, in pixels.
const ARC_TOLERANCE: f64 = 0.1;

/// Clamp a corner radius so it never exceeds half of either side of a `w` x `h` rectangle.
///
/// The axes are checked independently and in order: width first, then height.
pub fn clamp_corner_radius(w: f64, h: f64, r: f64) -> f64 {
    let mut r = r;
    if w < 2.0 * r {
        r = w / 2.0;
    }
    if h < 2.0 * r {
        r = h / 2.0;
    }
    r
}

/// Canvas-style current-path builder.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    path: BezPath,
    current: Option<Point>,
    subpath_start: Option<Point>,
}

impl PathBuilder {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all subpaths.
    pub fn begin(&mut self) {
        *self = Self::default();
    }

    /// Start a new subpath at `p`.
    pub fn move_to(&mut self, p: Point) {
        self.path.move_to(p);
        self.current = Some(p);
        self.subpath_start = Some(p);
    }

    /// Straight segment to `p`. Starts a subpath when there is none.
    pub fn line_to(&mut self, p: Point) {
        if self.current.is_none() {
            self.move_to(p);
            return;
        }
        self.path.line_to(p);
        self.current = Some(p);
    }

    /// Tangent arc with canvas `arcTo` semantics.
    ///
    /// Draws a straight line from the current point to the first tangent point, then a circular
    /// arc of `radius` that touches both the `current -> p1` and `p1 -> p2` lines. Coincident or
    /// collinear points, and a zero radius, degrade to a straight line to `p1`.
    pub fn arc_to(&mut self, p1: Point, p2: Point, radius: f64) -> CardResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(CardError::validation(format!(
                "arc radius {radius} must be finite and >= 0"
            )));
        }
        let Some(p0) = self.current else {
            self.move_to(p1);
            return Ok(());
        };

        let v1 = p0 - p1;
        let v2 = p2 - p1;
        let cross = v1.cross(v2);
        let collinear = cross.abs() <= f64::EPSILON * v1.hypot() * v2.hypot();
        if p0 == p1 || p1 == p2 || radius == 0.0 || collinear {
            self.line_to(p1);
            return Ok(());
        }

        let u1 = v1.normalize();
        let u2 = v2.normalize();
        let angle = u1.dot(u2).clamp(-1.0, 1.0).acos();
        let half = angle / 2.0;
        let tangent_len = radius / half.tan();
        let t1 = p1 + u1 * tangent_len;
        let t2 = p1 + u2 * tangent_len;
        let center = p1 + (u1 + u2).normalize() * (radius / half.sin());

        let start_angle = angle_of(t1 - center);
        let mut sweep = angle_of(t2 - center) - start_angle;
        if sweep > std::f64::consts::PI {
            sweep -= 2.0 * std::f64::consts::PI;
        } else if sweep < -std::f64::consts::PI {
            sweep += 2.0 * std::f64::consts::PI;
        }

        self.line_to(t1);
        let arc = Arc {
            center,
            radii: Vec2::new(radius, radius),
            start_angle,
            sweep_angle: sweep,
            x_rotation: 0.0,
        };
        self.path.extend(arc.append_iter(ARC_TOLERANCE));
        self.current = Some(t2);
        Ok(())
    }

    /// Close the current subpath.
    pub fn close(&mut self) {
        if self.current.is_some() {
            self.path.close_path();
            self.current = self.subpath_start;
        }
    }

    /// Borrow the accumulated path.
    pub fn path(&self) -> &BezPath {
        &self.path
    }
}

fn angle_of(v: Vec2) -> f64 {
    v.y.atan2(v.x)
}

#[cfg(test)]
#[path = "../../tests/unit/render/path.rs"]
mod tests;
