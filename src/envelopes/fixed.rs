//! Integer arithmetic behind envelope sampling.
//!
//! Elapsed time maps to a table index through a Q24 scale factor computed
//! once per duration change, and table values map to output levels through a
//! Q16 scale computed once per phase entry. Sampling is then a multiply and a
//! shift per step, with no division.

use crate::Ticks;

/// Fractional bits of the time-to-index scale.
pub(crate) const TIME_SHIFT: u32 = 24;

/// Fractional bits of the level scale.
pub(crate) const LEVEL_SHIFT: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexPath {
    /// Zero duration: the phase is over as soon as it starts.
    Instant,
    /// Index is `(delta * scale) >> TIME_SHIFT`.
    FixedPoint { scale: u64 },
    /// Index is `last * delta / duration`, for durations too long for the
    /// fixed-point scale.
    ExactDivision,
}

/// Maps time elapsed in a phase to a table index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PhaseTiming {
    duration: Ticks,
    last_index: u64,
    path: IndexPath,
}

impl PhaseTiming {
    /// Precomputes the mapping for a phase of `duration` ticks over a table
    /// whose last index is `last_index`. Durations above `ceiling` take the
    /// exact-division path.
    pub(crate) fn new(duration: Ticks, last_index: usize, ceiling: Ticks) -> Self {
        let last_index = last_index as u64;
        let path = if duration == 0 {
            IndexPath::Instant
        } else if duration <= ceiling {
            match (last_index << TIME_SHIFT) / duration as u64 {
                0 => IndexPath::ExactDivision,
                scale => IndexPath::FixedPoint { scale },
            }
        } else {
            IndexPath::ExactDivision
        };

        Self {
            duration,
            last_index,
            path,
        }
    }

    pub(crate) fn duration(&self) -> Ticks {
        self.duration
    }

    pub(crate) fn uses_fixed_point(&self) -> bool {
        matches!(self.path, IndexPath::FixedPoint { .. })
    }

    /// True once `delta` ticks cover the whole phase.
    #[inline]
    pub(crate) fn is_complete(&self, delta: Ticks) -> bool {
        delta >= self.duration
    }

    /// Table index for `delta` ticks into the phase, never past the last one.
    #[inline]
    pub(crate) fn index(&self, delta: Ticks) -> usize {
        let index = match self.path {
            IndexPath::Instant => self.last_index,
            IndexPath::FixedPoint { scale } => (delta as u64).saturating_mul(scale) >> TIME_SHIFT,
            IndexPath::ExactDivision => self.last_index * delta as u64 / self.duration as u64,
        };
        index.min(self.last_index) as usize
    }
}

/// Maps a table value onto the level range of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LevelRange {
    base: u32,
    scale: u64,
}

impl LevelRange {
    /// A range starting at `base` and covering `span` levels, for tables
    /// whose full scale is `vertical_resolution`.
    pub(crate) fn new(base: u32, span: u32, vertical_resolution: u32) -> Self {
        Self {
            base,
            scale: ((span as u64) << LEVEL_SHIFT) / vertical_resolution.max(1) as u64,
        }
    }

    #[inline]
    pub(crate) fn map(&self, curve: u32) -> u32 {
        let offset = (curve as u64 * self.scale) >> LEVEL_SHIFT;
        self.base.saturating_add(offset as u32)
    }
}
