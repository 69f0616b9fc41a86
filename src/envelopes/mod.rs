//! Envelope generators driven by curve tables.
//!
//! [`Adsr`] is the envelope itself. [`EnvelopeParams`] carries its settings
//! as plain data, for presets and for restoring a patch in one call.

mod adsr;
mod fixed;
mod params;

pub use adsr::{Adsr, Phase};
pub use params::EnvelopeParams;
