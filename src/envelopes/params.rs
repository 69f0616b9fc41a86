//! Plain-data envelope settings.

use crate::{CurveShape, Resolution, Ticks};

/// Every user-facing setting of an [`Adsr`](crate::Adsr), as plain data.
///
/// Durations are in ticks of the envelope's clock and the sustain level is in
/// the bank's vertical-resolution units. With the `serde` feature enabled the
/// struct can be stored as a patch and restored with
/// [`Adsr::apply_params`](crate::Adsr::apply_params).
///
/// # Examples
///
/// ```
/// use contour::{CurveShape, EnvelopeParams, Resolution};
///
/// let params = EnvelopeParams {
///     attack: 5_000,
///     release_curve: CurveShape::Plateau,
///     ..EnvelopeParams::new(Resolution::Micros, 4095)
/// };
/// assert_eq!(params.decay, 100_000);
/// assert_eq!(params.sustain, 2047);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub struct EnvelopeParams {
    pub attack: Ticks,
    pub decay: Ticks,
    /// Level held while the note is down, in `0..=vertical_resolution`.
    pub sustain: u32,
    pub release: Ticks,
    /// Restart attack from zero on retrigger instead of from the current
    /// output.
    pub reset_attack_on_retrigger: bool,
    pub attack_curve: CurveShape,
    pub decay_curve: CurveShape,
    pub release_curve: CurveShape,
}

impl EnvelopeParams {
    /// Default length of each timed phase, in milliseconds.
    pub const DEFAULT_PHASE_MS: u32 = 100;

    /// Default settings: 100 ms phases, half-scale sustain, legato retrigger
    /// and the [`Soft`](CurveShape::Soft) curve everywhere.
    pub fn new(resolution: Resolution, vertical_resolution: u32) -> Self {
        let phase = resolution.ms_to_ticks(Self::DEFAULT_PHASE_MS);
        Self {
            attack: phase,
            decay: phase,
            sustain: vertical_resolution / 2,
            release: phase,
            reset_attack_on_retrigger: false,
            attack_curve: CurveShape::default(),
            decay_curve: CurveShape::default(),
            release_curve: CurveShape::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_resolution() {
        let micros = EnvelopeParams::new(Resolution::Micros, 4095);
        assert_eq!(micros.attack, 100_000);
        assert_eq!(micros.release, 100_000);

        let millis = EnvelopeParams::new(Resolution::Millis, 255);
        assert_eq!(millis.decay, 100);
        assert_eq!(millis.sustain, 127);
        assert!(!millis.reset_attack_on_retrigger);
        assert_eq!(millis.attack_curve, CurveShape::Soft);
    }
}
