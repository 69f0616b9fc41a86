//! Cubic Bézier segments and their inversion by bisection.

/// Full scale of the curve-design coordinate system.
///
/// Control points are authored against this range and scaled to the table's
/// maximum level when a table is generated.
pub const DESIGN_RANGE: f32 = 4095.0;

/// Width of the curve-parameter bracket at which bisection stops.
pub const BISECTION_TOLERANCE: f32 = 1e-5;

/// A point in curve-design units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlPoint {
    pub x: f32,
    pub y: f32,
}

impl ControlPoint {
    /// Creates a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Which way a curve travels between its anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// From `(0, 0)` up to `(max, max)`.
    Rising,
    /// From `(0, max)` down to `(max, 0)`.
    Falling,
}

/// A cubic Bézier with fixed anchors and two designer control points.
///
/// The anchors follow from the [`Orientation`] and the level the curve is
/// rendered at, so only the inner control points are stored.
///
/// # Examples
///
/// ```
/// use contour::{ControlPoint, CubicBezier};
///
/// let curve = CubicBezier::falling(
///     ControlPoint::new(250.0, 1500.0),
///     ControlPoint::new(1500.0, 250.0),
/// );
/// assert!(curve.is_x_monotonic());
///
/// // Starts at full scale and ends at zero
/// assert_eq!(curve.point_at(0.0, 4095.0), ControlPoint::new(0.0, 4095.0));
/// assert_eq!(curve.point_at(1.0, 4095.0), ControlPoint::new(4095.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBezier {
    p1: ControlPoint,
    p2: ControlPoint,
    orientation: Orientation,
}

impl CubicBezier {
    /// Creates a curve from its two control points.
    pub const fn new(p1: ControlPoint, p2: ControlPoint, orientation: Orientation) -> Self {
        Self {
            p1,
            p2,
            orientation,
        }
    }

    /// Creates a curve anchored at `(0, 0)` and `(max, max)`.
    pub const fn rising(p1: ControlPoint, p2: ControlPoint) -> Self {
        Self::new(p1, p2, Orientation::Rising)
    }

    /// Creates a curve anchored at `(0, max)` and `(max, 0)`.
    pub const fn falling(p1: ControlPoint, p2: ControlPoint) -> Self {
        Self::new(p1, p2, Orientation::Falling)
    }

    /// First control point, in design units.
    pub fn p1(&self) -> ControlPoint {
        self.p1
    }

    /// Second control point, in design units.
    pub fn p2(&self) -> ControlPoint {
        self.p2
    }

    /// Which pair of corners the curve is anchored to.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Returns true if x grows monotonically with the curve parameter, which
    /// bisection needs in order to find a unique point for every x.
    ///
    /// Generation does not check this; it is the caller's precondition.
    pub fn is_x_monotonic(&self) -> bool {
        let a = self.p1.x;
        let b = self.p2.x - self.p1.x;
        let c = DESIGN_RANGE - self.p2.x;
        a >= 0.0 && c >= 0.0 && (b >= 0.0 || b * b <= a * c)
    }

    /// Evaluates the curve at parameter `t` for a table whose maximum level
    /// is `max`.
    pub fn point_at(&self, t: f32, max: f32) -> ControlPoint {
        let (start, end) = self.anchors(max);
        let factor = max / DESIGN_RANGE;
        let p1 = self.p1.scaled(factor);
        let p2 = self.p2.scaled(factor);

        let one_minus_t = 1.0 - t;
        let one_minus_t_squared = one_minus_t * one_minus_t;
        let t_squared = t * t;

        let x = one_minus_t_squared * one_minus_t * start.x
            + 3.0 * one_minus_t_squared * t * p1.x
            + 3.0 * one_minus_t * t_squared * p2.x
            + t_squared * t * end.x;
        let y = one_minus_t_squared * one_minus_t * start.y
            + 3.0 * one_minus_t_squared * t * p1.y
            + 3.0 * one_minus_t * t_squared * p2.y
            + t_squared * t * end.y;

        ControlPoint::new(x, y)
    }

    /// Finds the curve's y at `x_target` by bisecting the curve parameter.
    ///
    /// Targets beyond either end converge to the nearest anchor. The result
    /// is the y of the last evaluated midpoint, so it is fully determined by
    /// the inputs.
    pub fn solve_y(&self, x_target: f32, max: f32) -> f32 {
        let mut t_low = 0.0f32;
        let mut t_high = 1.0f32;
        let mut t_mid = 0.0f32;

        while (t_high - t_low) > BISECTION_TOLERANCE {
            t_mid = (t_low + t_high) * 0.5;
            if self.point_at(t_mid, max).x < x_target {
                t_low = t_mid;
            } else {
                t_high = t_mid;
            }
        }

        self.point_at(t_mid, max).y
    }

    fn anchors(&self, max: f32) -> (ControlPoint, ControlPoint) {
        match self.orientation {
            Orientation::Rising => (ControlPoint::new(0.0, 0.0), ControlPoint::new(max, max)),
            Orientation::Falling => (ControlPoint::new(0.0, max), ControlPoint::new(max, 0.0)),
        }
    }
}
