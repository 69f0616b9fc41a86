//! Contour - Bézier-shaped ADSR envelopes for real-time control
//!
//! Envelopes are sampled against a tick clock and read their shapes from
//! precomputed curve tables, so producing an output level takes a few integer
//! multiplies and shifts and never allocates.
//!
//! ```
//! use contour::{Adsr, CurveBank, CurveShape, ManualClock};
//!
//! // Build the curve tables once, up front
//! let bank = CurveBank::default();
//!
//! let mut env = Adsr::new(&bank, ManualClock::millis())
//!     .with_decay_curve(CurveShape::Convex);
//! env.set_attack(5);
//!
//! env.note_on_at(0);
//! assert_eq!(env.wave_at(5), bank.vertical_resolution());
//! ```
//!
//! Custom curves are declared with the [`bezier!`] macro, which checks its
//! control points at compile time:
//!
//! ```
//! use contour::{CurveTable, bezier};
//!
//! let curve = bezier!(rising: (1200, 300), (2900, 3800));
//! let table = CurveTable::from_bezier(&curve, 4095, 512)?;
//! assert!(table.rising(511) >= 4094);
//! # Ok::<(), contour::CurveError>(())
//! ```

// Lets `bezier!` expand to `::contour::...` inside this crate too
extern crate self as contour;

pub mod clock;
pub mod curves;
pub mod envelopes;
pub mod error;
pub mod signal;

// Re-export commonly used types at the crate root
pub use clock::{Clock, ManualClock, MonotonicClock, Resolution, Ticks};
pub use contour_macros::bezier;
pub use curves::{
    ControlPoint, CubicBezier, CurveBank, CurveShape, CurveTable, MAX_TABLE_LEN, Orientation,
    TABLE_LEN,
};
pub use envelopes::{Adsr, EnvelopeParams, Phase};
pub use error::CurveError;
pub use signal::Signal;
