//! Curve tables that shape envelope phases.
//!
//! A phase's shape is a monotonic table of levels indexed by normalized time.
//! Tables are usually generated from cubic Bézier curves (see
//! [`CubicBezier`]), but can also be exponential, linear, or supplied
//! directly by a designer. A [`CurveBank`] bundles the eight preset shapes
//! that envelopes select from with [`CurveShape`].

mod bank;
mod bezier;
mod table;

pub use bank::{CurveBank, CurveShape, DEFAULT_VERTICAL_RESOLUTION};
pub use bezier::{BISECTION_TOLERANCE, ControlPoint, CubicBezier, DESIGN_RANGE, Orientation};
pub use table::{CurveTable, MAX_TABLE_LEN, TABLE_LEN};
