//! ADSR (Attack, Decay, Sustain, Release) envelope generator.

use log::{debug, warn};

use super::EnvelopeParams;
use super::fixed::{LevelRange, PhaseTiming};
use crate::{Clock, CurveBank, CurveShape, CurveTable, ManualClock, Signal, Ticks};

/// Phase of an ADSR envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// Envelope is not active
    #[default]
    Idle,
    /// Rising from the level at note-on to full scale
    Attack,
    /// Falling from full scale to the sustain level
    Decay,
    /// Holding at the sustain level until note-off
    Sustain,
    /// Falling from the level at note-off to zero
    Release,
}

/// ADSR envelope driven by a tick clock and shaped by curve tables.
///
/// The envelope does not advance on its own: each call to
/// [`wave_at`](Self::wave_at) (or [`wave`](Self::wave)) computes the output
/// for the given instant from the time elapsed since the current phase began.
/// Sampling is integer-only: elapsed time maps to a table index through a
/// fixed-point scale, and the table value maps onto the phase's level range.
/// Phases longer than two seconds of clock time use exact division instead of
/// the fixed-point scale.
///
/// Output levels lie in `0..=vertical_resolution` of the [`CurveBank`] the
/// envelope reads from.
///
/// # Retriggering
///
/// Every note-on is counted and every note-off uncounted; release only begins
/// when the last held note is let go. A note-on while the envelope is
/// sounding restarts the attack from the current output (legato), or from
/// zero if [`set_reset_attack_on_retrigger`](Self::set_reset_attack_on_retrigger)
/// is enabled.
///
/// # Examples
///
/// ```
/// use contour::{Adsr, CurveBank, CurveShape, ManualClock, Phase};
///
/// let bank = CurveBank::default();
/// let mut env = Adsr::new(&bank, ManualClock::millis())
///     .with_attack_curve(CurveShape::Steep)
///     .with_release_curve(CurveShape::Plateau);
/// env.set_attack(10);
/// env.set_decay(20);
/// env.set_sustain(3000);
/// env.set_release(50);
///
/// env.note_on_at(0);
/// assert!(env.wave_at(5) > 0);
/// assert_eq!(env.wave_at(10), 4095);
/// assert_eq!(env.wave_at(30), 3000);
/// assert_eq!(env.phase(), Phase::Sustain);
///
/// env.note_off_at(100);
/// assert_eq!(env.wave_at(150), 0);
/// assert!(!env.is_active());
/// ```
#[derive(Debug, Clone)]
pub struct Adsr<'bank, C = ManualClock> {
    bank: &'bank CurveBank,
    clock: C,
    vertical_resolution: u32,
    last_index: usize,
    fixed_point_ceiling: Ticks,

    params: EnvelopeParams,
    attack_timing: PhaseTiming,
    decay_timing: PhaseTiming,
    release_timing: PhaseTiming,

    // Level ranges, fixed when their phase is entered
    attack_range: LevelRange,
    decay_range: LevelRange,
    release_range: LevelRange,

    phase: Phase,
    phase_start: Ticks,
    output: u32,
    attack_start: u32,
    release_start: u32,
    press_count: u32,
    note_on_tick: Ticks,
    note_off_tick: Ticks,
}

impl<'bank, C: Clock> Adsr<'bank, C> {
    /// Creates an idle envelope with default settings (see
    /// [`EnvelopeParams::new`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, MonotonicClock};
    ///
    /// let bank = CurveBank::default();
    /// let env = Adsr::new(&bank, MonotonicClock::micros());
    /// assert!(!env.is_active());
    /// assert_eq!(env.params().attack, 100_000);
    /// ```
    pub fn new(bank: &'bank CurveBank, clock: C) -> Self {
        let resolution = clock.resolution();
        let vertical_resolution = bank.vertical_resolution();
        let last_index = bank.table_len() - 1;
        let fixed_point_ceiling = resolution.fixed_point_ceiling();
        let params = EnvelopeParams::new(resolution, vertical_resolution);
        let timing = |duration| PhaseTiming::new(duration, last_index, fixed_point_ceiling);

        Self {
            bank,
            clock,
            vertical_resolution,
            last_index,
            fixed_point_ceiling,
            attack_timing: timing(params.attack),
            decay_timing: timing(params.decay),
            release_timing: timing(params.release),
            attack_range: LevelRange::default(),
            decay_range: LevelRange::new(
                params.sustain,
                vertical_resolution - params.sustain,
                vertical_resolution,
            ),
            release_range: LevelRange::default(),
            params,
            phase: Phase::Idle,
            phase_start: 0,
            output: 0,
            attack_start: 0,
            release_start: 0,
            press_count: 0,
            note_on_tick: 0,
            note_off_tick: 0,
        }
    }

    /// Applies a full set of parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, EnvelopeParams, ManualClock, Resolution};
    ///
    /// let bank = CurveBank::default();
    /// let patch = EnvelopeParams {
    ///     sustain: 4000,
    ///     ..EnvelopeParams::new(Resolution::Millis, 4095)
    /// };
    /// let env = Adsr::new(&bank, ManualClock::millis()).with_params(&patch);
    /// assert_eq!(env.params(), patch);
    /// ```
    pub fn with_params(mut self, params: &EnvelopeParams) -> Self {
        self.apply_params(params);
        self
    }

    /// Sets the curve for the attack phase.
    pub fn with_attack_curve(mut self, shape: CurveShape) -> Self {
        self.set_attack_curve(shape);
        self
    }

    /// Sets the curve for the decay phase.
    pub fn with_decay_curve(mut self, shape: CurveShape) -> Self {
        self.set_decay_curve(shape);
        self
    }

    /// Sets the curve for the release phase.
    pub fn with_release_curve(mut self, shape: CurveShape) -> Self {
        self.set_release_curve(shape);
        self
    }

    /// Chooses whether a retrigger restarts the attack from zero.
    pub fn with_reset_attack_on_retrigger(mut self, reset: bool) -> Self {
        self.set_reset_attack_on_retrigger(reset);
        self
    }

    /// Applies a full set of parameters in place. Out-of-range values are
    /// clamped exactly as the individual setters clamp them.
    pub fn apply_params(&mut self, params: &EnvelopeParams) {
        self.set_attack(params.attack);
        self.set_decay(params.decay);
        self.set_sustain(params.sustain);
        self.set_release(params.release);
        self.set_reset_attack_on_retrigger(params.reset_attack_on_retrigger);
        self.set_attack_curve(params.attack_curve);
        self.set_decay_curve(params.decay_curve);
        self.set_release_curve(params.release_curve);
    }

    /// Sets the attack duration in clock ticks.
    ///
    /// A phase already in progress picks up the new duration at its next
    /// sample; its start time is unchanged.
    pub fn set_attack(&mut self, ticks: Ticks) {
        self.params.attack = ticks;
        self.attack_timing = self.timing("attack", ticks);
    }

    /// Sets the decay duration in clock ticks.
    pub fn set_decay(&mut self, ticks: Ticks) {
        self.params.decay = ticks;
        self.decay_timing = self.timing("decay", ticks);
    }

    /// Sets the release duration in clock ticks.
    pub fn set_release(&mut self, ticks: Ticks) {
        self.params.release = ticks;
        self.release_timing = self.timing("release", ticks);
    }

    /// Sets the attack duration in milliseconds.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, ManualClock};
    ///
    /// let bank = CurveBank::default();
    /// let mut env = Adsr::new(&bank, ManualClock::micros());
    /// env.set_attack_ms(5);
    /// assert_eq!(env.params().attack, 5_000);
    /// ```
    pub fn set_attack_ms(&mut self, ms: u32) {
        self.set_attack(self.clock.resolution().ms_to_ticks(ms));
    }

    /// Sets the decay duration in milliseconds.
    pub fn set_decay_ms(&mut self, ms: u32) {
        self.set_decay(self.clock.resolution().ms_to_ticks(ms));
    }

    /// Sets the release duration in milliseconds.
    pub fn set_release_ms(&mut self, ms: u32) {
        self.set_release(self.clock.resolution().ms_to_ticks(ms));
    }

    /// Sets the sustain level, clamped to the bank's vertical resolution.
    ///
    /// The decay target changes immediately, including for a decay in
    /// progress.
    pub fn set_sustain(&mut self, level: u32) {
        let sustain = if level > self.vertical_resolution {
            warn!(
                "sustain level {} exceeds vertical resolution, clamping to {}",
                level, self.vertical_resolution
            );
            self.vertical_resolution
        } else {
            level
        };

        self.params.sustain = sustain;
        self.decay_range = LevelRange::new(
            sustain,
            self.vertical_resolution - sustain,
            self.vertical_resolution,
        );
    }

    /// Chooses whether a retrigger restarts the attack from zero (`true`) or
    /// from the current output (`false`, the default).
    pub fn set_reset_attack_on_retrigger(&mut self, reset: bool) {
        self.params.reset_attack_on_retrigger = reset;
    }

    /// Selects the attack curve.
    pub fn set_attack_curve(&mut self, shape: CurveShape) {
        self.params.attack_curve = shape;
    }

    /// Selects the decay curve.
    pub fn set_decay_curve(&mut self, shape: CurveShape) {
        self.params.decay_curve = shape;
    }

    /// Selects the release curve.
    pub fn set_release_curve(&mut self, shape: CurveShape) {
        self.params.release_curve = shape;
    }

    /// Registers a note-on at `now` and (re)starts the attack.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, ManualClock, Phase};
    ///
    /// let bank = CurveBank::default();
    /// let mut env = Adsr::new(&bank, ManualClock::millis());
    /// env.note_on_at(0);
    /// env.note_on_at(10);
    /// assert_eq!(env.press_count(), 2);
    /// assert_eq!(env.phase(), Phase::Attack);
    /// ```
    pub fn note_on_at(&mut self, now: Ticks) {
        self.press_count = self.press_count.saturating_add(1);
        self.note_on_tick = now;

        self.attack_start = if self.params.reset_attack_on_retrigger {
            0
        } else {
            self.output
        };
        self.attack_range = LevelRange::new(
            self.attack_start,
            self.vertical_resolution - self.attack_start,
            self.vertical_resolution,
        );
        self.enter(Phase::Attack, now);
    }

    /// Registers a note-off at `now`. Release begins once every note-on has
    /// been matched; a note-off with no note held is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, ManualClock, Phase};
    ///
    /// let bank = CurveBank::default();
    /// let mut env = Adsr::new(&bank, ManualClock::millis());
    /// env.note_on_at(0);
    /// env.note_on_at(10);
    ///
    /// env.note_off_at(20);
    /// assert_eq!(env.phase(), Phase::Attack);
    ///
    /// env.note_off_at(30);
    /// assert_eq!(env.phase(), Phase::Release);
    /// ```
    pub fn note_off_at(&mut self, now: Ticks) {
        if self.press_count == 0 {
            return;
        }

        self.press_count -= 1;
        if self.press_count > 0 {
            return;
        }

        self.note_off_tick = now;
        self.release_start = self.output;
        self.release_range = LevelRange::new(0, self.release_start, self.vertical_resolution);
        self.enter(Phase::Release, now);
    }

    /// Computes the output level at `now` and advances the phase if the
    /// current one has run its course.
    ///
    /// `now` must not precede the start of the current phase by more than
    /// the tick counter's wrap period; elapsed time is a wrapping difference.
    pub fn wave_at(&mut self, now: Ticks) -> u32 {
        let delta = now.wrapping_sub(self.phase_start);

        let level = match self.phase {
            Phase::Idle => 0,
            Phase::Attack => {
                if self.attack_timing.is_complete(delta) {
                    self.finish_attack();
                    self.vertical_resolution
                } else {
                    let index = self.attack_timing.index(delta);
                    let curve = self.curve(self.params.attack_curve).rising(index);
                    self.attack_range.map(curve)
                }
            }
            Phase::Decay => {
                if self.decay_timing.is_complete(delta) {
                    self.phase = Phase::Sustain;
                    self.params.sustain
                } else {
                    let index = self.decay_timing.index(delta);
                    let curve = self.curve(self.params.decay_curve).falling(index);
                    self.decay_range.map(curve)
                }
            }
            Phase::Sustain => self.params.sustain,
            Phase::Release => {
                if self.release_timing.is_complete(delta) {
                    self.phase = Phase::Idle;
                    0
                } else {
                    let index = self.release_timing.index(delta);
                    let curve = self.curve(self.params.release_curve).falling(index);
                    self.release_range.map(curve)
                }
            }
        };

        self.output = level.min(self.vertical_resolution);
        self.output
    }

    /// Registers a note-on at the clock's current time.
    pub fn note_on(&mut self) {
        let now = self.clock.now();
        self.note_on_at(now);
    }

    /// Registers a note-off at the clock's current time.
    pub fn note_off(&mut self) {
        let now = self.clock.now();
        self.note_off_at(now);
    }

    /// Computes the output level at the clock's current time.
    pub fn wave(&mut self) -> u32 {
        let now = self.clock.now();
        self.wave_at(now)
    }

    /// Returns the envelope to idle, forgetting held notes.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{Adsr, CurveBank, ManualClock};
    ///
    /// let bank = CurveBank::default();
    /// let mut env = Adsr::new(&bank, ManualClock::millis());
    /// env.note_on_at(0);
    /// env.wave_at(50);
    /// env.reset();
    /// assert!(!env.is_active());
    /// assert_eq!(env.output(), 0);
    /// assert_eq!(env.press_count(), 0);
    /// ```
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.phase_start = 0;
        self.output = 0;
        self.attack_start = 0;
        self.release_start = 0;
        self.press_count = 0;
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Level computed by the most recent sample.
    pub fn output(&self) -> u32 {
        self.output
    }

    /// Number of note-ons not yet matched by a note-off.
    pub fn press_count(&self) -> u32 {
        self.press_count
    }

    /// Returns true unless the envelope is idle.
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Current settings.
    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    /// Full-scale output level.
    pub fn vertical_resolution(&self) -> u32 {
        self.vertical_resolution
    }

    /// Time of the most recent note-on.
    pub fn note_on_tick(&self) -> Ticks {
        self.note_on_tick
    }

    /// Time of the most recent note-off that started a release.
    pub fn note_off_tick(&self) -> Ticks {
        self.note_off_tick
    }

    /// The clock the envelope reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Mutable access to the clock, for hosts that advance it themselves.
    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The curve bank this envelope samples.
    pub fn bank(&self) -> &'bank CurveBank {
        self.bank
    }

    fn curve(&self, shape: CurveShape) -> &'bank CurveTable {
        self.bank.table(shape)
    }

    fn timing(&self, phase: &str, duration: Ticks) -> PhaseTiming {
        let timing = PhaseTiming::new(duration, self.last_index, self.fixed_point_ceiling);
        if duration > 0 && !timing.uses_fixed_point() {
            debug!(
                "{} of {} ticks exceeds the fixed-point ceiling of {} ticks, using exact division",
                phase, duration, self.fixed_point_ceiling
            );
        }
        timing
    }

    fn enter(&mut self, phase: Phase, now: Ticks) {
        self.phase = phase;
        self.phase_start = now;
    }

    fn finish_attack(&mut self) {
        // Decay starts where attack should have ended, not at the sample
        // that noticed
        let boundary = self.phase_start.wrapping_add(self.attack_timing.duration());
        if self.decay_timing.duration() > 0 {
            self.enter(Phase::Decay, boundary);
        } else {
            self.enter(Phase::Sustain, boundary);
        }
    }
}

impl<C: Clock> Signal for Adsr<'_, C> {
    /// Samples the envelope at the clock's current time, normalized to
    /// `0.0..=1.0`.
    fn next_sample(&mut self) -> f64 {
        self.wave() as f64 / self.vertical_resolution as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VR: u32 = 4095;
    const SUSTAIN: u32 = 2047;

    fn envelope(bank: &CurveBank) -> Adsr<'_> {
        let mut env = Adsr::new(bank, ManualClock::micros());
        env.set_attack(100);
        env.set_decay(100);
        env.set_sustain(SUSTAIN);
        env.set_release(100);
        env
    }

    #[test]
    fn test_creation() {
        let bank = CurveBank::default();
        let env = Adsr::new(&bank, ManualClock::micros());
        assert!(!env.is_active());
        assert_eq!(env.phase(), Phase::Idle);
        assert_eq!(env.vertical_resolution(), VR);

        let params = env.params();
        assert_eq!(params.attack, 100_000);
        assert_eq!(params.decay, 100_000);
        assert_eq!(params.release, 100_000);
        assert_eq!(params.sustain, VR / 2);
        assert!(!params.reset_attack_on_retrigger);
        assert_eq!(params.decay_curve, CurveShape::Soft);
    }

    #[test]
    fn test_idle_outputs_zero() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        assert_eq!(env.wave_at(0), 0);
        assert_eq!(env.wave_at(12_345), 0);
        assert_eq!(env.phase(), Phase::Idle);
    }

    #[test]
    fn test_full_cycle() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);

        assert_eq!(env.wave_at(0), 0);
        let mut previous = 0;
        for t in (10..100).step_by(10) {
            let level = env.wave_at(t);
            assert!(level >= previous, "attack fell at {}", t);
            previous = level;
        }
        let mid_attack = env.wave_at(50);
        assert!(mid_attack > 0 && mid_attack < VR);

        assert_eq!(env.wave_at(100), VR);
        assert_eq!(env.phase(), Phase::Decay);

        let mid_decay = env.wave_at(150);
        assert!(mid_decay > SUSTAIN && mid_decay < VR);
        let late_decay = env.wave_at(199);
        assert!(late_decay >= SUSTAIN && late_decay <= mid_decay);

        assert_eq!(env.wave_at(200), SUSTAIN);
        assert_eq!(env.phase(), Phase::Sustain);
        assert_eq!(env.wave_at(250), SUSTAIN);
        assert_eq!(env.wave_at(299), SUSTAIN);

        env.note_off_at(300);
        assert_eq!(env.phase(), Phase::Release);
        assert_eq!(env.note_off_tick(), 300);
        let release_start = env.wave_at(300);
        assert!(release_start == SUSTAIN || release_start + 1 == SUSTAIN);

        let mid_release = env.wave_at(350);
        assert!(mid_release > 0 && mid_release < SUSTAIN);
        assert!(env.wave_at(399) <= 10);

        assert_eq!(env.wave_at(400), 0);
        assert_eq!(env.phase(), Phase::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn test_sparse_sampling_lands_on_phase_boundaries() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);

        // First sample long after attack ended; decay is timed from t=100
        assert_eq!(env.wave_at(150), VR);
        assert_eq!(env.phase(), Phase::Decay);
        assert_eq!(env.wave_at(200), SUSTAIN);
    }

    #[test]
    fn test_zero_attack_and_decay() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.set_attack(0);
        env.note_on_at(10);
        assert_eq!(env.wave_at(10), VR);
        assert_eq!(env.phase(), Phase::Decay);

        env.set_decay(0);
        env.note_on_at(20);
        assert_eq!(env.wave_at(20), VR);
        assert_eq!(env.phase(), Phase::Sustain);
        assert_eq!(env.wave_at(21), SUSTAIN);
    }

    #[test]
    fn test_zero_release() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.set_release(0);
        env.note_on_at(0);
        env.wave_at(250);
        env.note_off_at(300);
        assert_eq!(env.wave_at(300), 0);
        assert_eq!(env.phase(), Phase::Idle);
    }

    #[test]
    fn test_retrigger_continues_from_current_level() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);
        env.wave_at(100);
        let level = env.wave_at(150);

        env.note_on_at(150);
        assert_eq!(env.phase(), Phase::Attack);
        assert_eq!(env.wave_at(150), level);
        assert!(env.wave_at(200) >= level);
        assert_eq!(env.wave_at(250), VR);
    }

    #[test]
    fn test_retrigger_with_reset_starts_from_zero() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank).with_reset_attack_on_retrigger(true);
        env.note_on_at(0);
        env.wave_at(100);
        assert!(env.wave_at(150) > 0);

        env.note_on_at(150);
        assert_eq!(env.wave_at(150), 0);
    }

    #[test]
    fn test_press_count_delays_release() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);
        env.note_on_at(10);
        env.wave_at(200);
        assert_eq!(env.wave_at(300), SUSTAIN);

        env.note_off_at(310);
        assert_eq!(env.press_count(), 1);
        assert_eq!(env.phase(), Phase::Sustain);

        env.note_off_at(320);
        assert_eq!(env.press_count(), 0);
        assert_eq!(env.phase(), Phase::Release);
    }

    #[test]
    fn test_unmatched_note_off_is_ignored() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_off_at(5);
        assert_eq!(env.press_count(), 0);
        assert_eq!(env.phase(), Phase::Idle);

        env.note_on_at(10);
        env.note_off_at(20);
        env.note_off_at(30);
        assert_eq!(env.press_count(), 0);
        assert_eq!(env.note_off_tick(), 20);
    }

    #[test]
    fn test_note_off_during_attack() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);
        let level = env.wave_at(50);

        env.note_off_at(50);
        assert_eq!(env.phase(), Phase::Release);
        let start = env.wave_at(50);
        assert!(start == level || start + 1 == level);
    }

    #[test]
    fn test_sustain_is_clamped() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.set_sustain(10_000);
        assert_eq!(env.params().sustain, VR);

        env.note_on_at(0);
        assert_eq!(env.wave_at(150), VR);
        assert_eq!(env.wave_at(250), VR);
    }

    #[test]
    fn test_sustain_change_applies_live() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);
        env.wave_at(150);
        assert_eq!(env.wave_at(250), SUSTAIN);
        env.set_sustain(1000);
        assert_eq!(env.wave_at(260), 1000);
    }

    #[test]
    fn test_long_phase_uses_exact_division() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.set_attack(3_000_000);
        env.note_on_at(0);

        let expected = bank.table(CurveShape::Soft).rising(511);
        assert_eq!(env.wave_at(1_500_000), expected);
        assert_eq!(env.wave_at(3_000_000), VR);
    }

    #[test]
    fn test_tick_wraparound() {
        let bank = CurveBank::default();
        let mut reference = envelope(&bank);
        reference.note_on_at(0);
        let expected = reference.wave_at(50);

        let mut env = envelope(&bank);
        let start = Ticks::MAX - 9;
        env.note_on_at(start);
        assert_eq!(env.wave_at(start.wrapping_add(50)), expected);
        assert_eq!(env.wave_at(start.wrapping_add(100)), VR);
    }

    #[test]
    fn test_curve_selection_changes_shape() {
        let bank = CurveBank::default();
        let mut steep = envelope(&bank).with_decay_curve(CurveShape::Steep);
        let mut convex = envelope(&bank).with_decay_curve(CurveShape::Convex);
        for env in [&mut steep, &mut convex] {
            env.note_on_at(0);
            env.wave_at(100);
        }
        assert!(steep.wave_at(125) < convex.wave_at(125));
    }

    #[test]
    fn test_clock_driven_sampling() {
        let bank = CurveBank::default();
        let clock = ManualClock::millis();
        let mut env = Adsr::new(&bank, &clock);
        env.set_attack_ms(10);
        env.set_decay_ms(10);
        env.set_release_ms(10);

        clock.set(1_000);
        env.note_on();
        assert_eq!(env.note_on_tick(), 1_000);
        clock.advance(10);
        assert_eq!(env.wave(), VR);
        clock.advance(10);
        assert_eq!(env.wave(), VR / 2);

        env.note_off();
        clock.advance(10);
        assert_eq!(env.wave(), 0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_signal_is_normalized() {
        let bank = CurveBank::default();
        let clock = ManualClock::micros();
        let mut env = Adsr::new(&bank, &clock);
        env.set_attack(100);
        env.set_decay(100);
        env.note_on();

        let mut buffer = [0.0; 8];
        env.process(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));

        clock.set(150);
        assert_eq!(env.next_sample(), 1.0);
        clock.set(500);
        let level = env.next_sample();
        assert!((0.0..=1.0).contains(&level));
        assert!((level - (VR / 2) as f64 / VR as f64).abs() < 1e-9);
    }

    #[test]
    fn test_params_round_trip() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        let mut params = env.params();
        params.attack = 1234;
        params.release_curve = CurveShape::SCurve;
        params.reset_attack_on_retrigger = true;
        env.apply_params(&params);
        assert_eq!(env.params(), params);
    }

    #[test]
    fn test_reset() {
        let bank = CurveBank::default();
        let mut env = envelope(&bank);
        env.note_on_at(0);
        env.note_on_at(1);
        env.wave_at(50);
        env.reset();
        assert_eq!(env.phase(), Phase::Idle);
        assert_eq!(env.output(), 0);
        assert_eq!(env.press_count(), 0);
        assert_eq!(env.wave_at(60), 0);
    }

    #[test]
    fn test_smaller_bank() {
        let bank = CurveBank::new(255, 64).unwrap();
        let mut env = Adsr::new(&bank, ManualClock::millis());
        env.set_attack(20);
        env.note_on_at(0);
        assert!(env.wave_at(10) <= 255);
        assert_eq!(env.wave_at(20), 255);
        assert_eq!(env.params().sustain, 127);
    }
}
