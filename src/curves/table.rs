//! Discretized curve tables.
//!
//! # Storage convention
//!
//! Every [`CurveTable`] is stored *rising*: index 0 holds level 0 and the
//! last index holds the table's maximum level. A falling curve (decay or
//! release shape) is solved along its own x axis and then stored reversed, so
//! [`CurveTable::falling`] hands back exactly the value the falling curve has
//! at a given index while [`CurveTable::rising`] reads the same samples
//! forwards for attack phases. One table therefore serves both directions.
//!
//! # Generation
//!
//! Bézier tables are built by sampling x at `len` evenly spaced targets and
//! bisecting the curve parameter for each one (see
//! [`CubicBezier::solve_y`]). This costs `len` bisections of a few dozen
//! curve evaluations each, which is why tables are built once, up front, and
//! never on the sampling path.

use super::bezier::{CubicBezier, Orientation};
use crate::CurveError;

#[cfg(feature = "table-loader")]
use std::path::Path;

/// Default number of samples per table.
pub const TABLE_LEN: usize = 1024;

/// Largest supported number of samples per table.
pub const MAX_TABLE_LEN: usize = 1 << 16;

/// A monotonic lookup table mapping normalized time to level.
///
/// # Examples
///
/// ```
/// use contour::{CurveTable, ControlPoint, CubicBezier};
///
/// let curve = CubicBezier::falling(
///     ControlPoint::new(840.0, 1780.0),
///     ControlPoint::new(1160.0, 210.0),
/// );
/// let table = CurveTable::from_bezier(&curve, 4095, 1024)?;
///
/// assert_eq!(table.len(), 1024);
/// // Read forwards for rising phases, backwards for falling ones
/// assert!(table.rising(0) <= 1);
/// assert!(table.falling(0) >= 4094);
/// # Ok::<(), contour::CurveError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurveTable {
    samples: Vec<u16>,
    max: u16,
}

impl CurveTable {
    /// Generates a table from a cubic Bézier.
    ///
    /// Index `i` samples the curve at `x = i * (max + 1) / (len - 1)`; the
    /// solved y is rounded and clamped into `[0, max]`.
    ///
    /// The curve's x must be monotonic in its parameter (see
    /// [`CubicBezier::is_x_monotonic`]). This is not checked here: bisection
    /// still converges for other curves, but the table may then not be
    /// monotonic.
    ///
    /// # Errors
    ///
    /// Returns an error if `len` is outside `2..=MAX_TABLE_LEN` or `max` is
    /// zero or wider than 16 bits.
    pub fn from_bezier(curve: &CubicBezier, max: u32, len: usize) -> Result<Self, CurveError> {
        let max = check_geometry(max, len)?;
        Ok(Self::generate(curve, max, len))
    }

    /// Generation for arguments already known to be in range.
    pub(crate) fn generate(curve: &CubicBezier, max: u16, len: usize) -> Self {
        let max_level = max as f32;
        let multiplier = (max_level + 1.0) / (len - 1) as f32;

        let mut samples: Vec<u16> = (0..len)
            .map(|i| {
                let x_target = multiplier * i as f32;
                let y = curve.solve_y(x_target, max_level);
                y.round().clamp(0.0, max_level) as u16
            })
            .collect();

        if curve.orientation() == Orientation::Falling {
            samples.reverse();
        }

        Self { samples, max }
    }

    /// Generates an exponential table, the shape of a one-pole smoother.
    ///
    /// A rising table follows `1 - alpha^i`, a falling one `alpha^i`; both are
    /// normalized so they span exactly `[0, max]`. `alpha` close to 1 gives a
    /// nearly straight line, smaller values a steeper curve.
    ///
    /// # Errors
    ///
    /// Returns an error if `alpha` is not strictly between 0 and 1, or if the
    /// geometry is out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{CurveTable, Orientation};
    ///
    /// let table = CurveTable::exponential(Orientation::Rising, 0.997, 4095, 1024)?;
    /// assert_eq!(table.rising(0), 0);
    /// assert_eq!(table.rising(1023), 4095);
    /// // Fast start: past half scale at half time
    /// assert!(table.rising(512) > 2048);
    /// # Ok::<(), contour::CurveError>(())
    /// ```
    pub fn exponential(
        orientation: Orientation,
        alpha: f64,
        max: u32,
        len: usize,
    ) -> Result<Self, CurveError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(CurveError::Alpha(alpha));
        }
        let max = check_geometry(max, len)?;

        let last = (len - 1) as i32;
        let floor = alpha.powi(last);
        let span = 1.0 - floor;
        let max_level = max as f64;

        let samples = (0..len as i32)
            .map(|i| {
                let normalized = match orientation {
                    Orientation::Rising => (1.0 - alpha.powi(i)) / span,
                    // Stored reversed, like every falling table
                    Orientation::Falling => (alpha.powi(last - i) - floor) / span,
                };
                (normalized * max_level).round().clamp(0.0, max_level) as u16
            })
            .collect();

        Ok(Self { samples, max })
    }

    /// Generates a straight line from 0 to `max`.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry is out of range.
    pub fn linear(max: u32, len: usize) -> Result<Self, CurveError> {
        let max = check_geometry(max, len)?;
        let steps = (len - 1) as u64;

        let samples = (0..len as u64)
            .map(|i| ((i * max as u64 + steps / 2) / steps) as u16)
            .collect();

        Ok(Self { samples, max })
    }

    /// Builds a table from designer-authored samples.
    ///
    /// The samples must be stored rising: non-decreasing, within `[0, max]`,
    /// starting at 0 and ending at `max` (each endpoint may be off by one
    /// rounding unit).
    ///
    /// # Errors
    ///
    /// Returns an error describing the first sample that breaks these rules.
    ///
    /// # Examples
    ///
    /// ```
    /// use contour::{CurveError, CurveTable};
    ///
    /// let table = CurveTable::from_samples(&[0, 10, 60, 255], 255)?;
    /// assert_eq!(table.falling(0), 255);
    ///
    /// let err = CurveTable::from_samples(&[0, 60, 10, 255], 255).unwrap_err();
    /// assert!(matches!(err, CurveError::NotMonotonic { index: 2, .. }));
    /// # Ok::<(), CurveError>(())
    /// ```
    pub fn from_samples(samples: &[u32], max: u32) -> Result<Self, CurveError> {
        let max_level = check_geometry(max, samples.len())?;

        let mut previous = 0;
        for (index, &value) in samples.iter().enumerate() {
            if value > max {
                return Err(CurveError::SampleOutOfRange { index, value, max });
            }
            if value < previous {
                return Err(CurveError::NotMonotonic {
                    index,
                    previous,
                    value,
                });
            }
            previous = value;
        }

        let first = samples[0];
        let last = samples[samples.len() - 1];
        if first > 1 || last + 1 < max {
            return Err(CurveError::Endpoints { first, last, max });
        }

        Ok(Self {
            samples: samples.iter().map(|&v| v as u16).collect(),
            max: max_level,
        })
    }

    /// Loads a designer-drawn curve from the first channel of a WAV file.
    ///
    /// The recording is normalized so its lowest sample maps to 0 and its
    /// highest to `max`, linearly resampled to `len` points, and then
    /// validated like [`from_samples`](Self::from_samples).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, holds no samples, or does
    /// not describe a rising curve.
    #[cfg(feature = "table-loader")]
    pub fn from_wav<P: AsRef<Path>>(path: P, max: u32, len: usize) -> Result<Self, CurveError> {
        check_geometry(max, len)?;

        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Result<Vec<f64>, _> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|v| v as f64))
                .collect(),
            hound::SampleFormat::Int => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64))
                .collect(),
        };
        let samples = samples?;

        let channel: Vec<f64> = samples
            .iter()
            .step_by(spec.channels.max(1) as usize)
            .copied()
            .collect();
        if channel.is_empty() {
            return Err(CurveError::EmptyWav);
        }

        let low = channel.iter().copied().fold(f64::INFINITY, f64::min);
        let high = channel.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = high - low;

        let resampled: Vec<u32> = (0..len)
            .map(|i| {
                let position = i as f64 * (channel.len() - 1) as f64 / (len - 1) as f64;
                let lower = position.floor() as usize;
                let upper = (lower + 1).min(channel.len() - 1);
                let fraction = position - lower as f64;
                let value = channel[lower] + (channel[upper] - channel[lower]) * fraction;
                let normalized = if range > 0.0 {
                    (value - low) / range
                } else {
                    0.0
                };
                (normalized * max as f64).round() as u32
            })
            .collect();

        Self::from_samples(&resampled, max)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a table holds at least two samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Level of the last sample.
    pub fn max(&self) -> u32 {
        self.max as u32
    }

    /// Raw samples in rising order.
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    /// Reads the table forwards. Indices past the end read the last sample.
    #[inline]
    pub fn rising(&self, index: usize) -> u32 {
        let last = self.samples.len() - 1;
        self.samples[index.min(last)] as u32
    }

    /// Reads the table backwards, giving the falling curve's value at
    /// `index`. Indices past the end read the first sample.
    #[inline]
    pub fn falling(&self, index: usize) -> u32 {
        let last = self.samples.len() - 1;
        self.samples[last - index.min(last)] as u32
    }
}

fn check_geometry(max: u32, len: usize) -> Result<u16, CurveError> {
    if !(2..=MAX_TABLE_LEN).contains(&len) {
        return Err(CurveError::TableLength(len));
    }
    match u16::try_from(max) {
        Ok(level) if level > 0 => Ok(level),
        _ => Err(CurveError::VerticalResolution(max)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ControlPoint;

    fn is_non_decreasing(table: &CurveTable) -> bool {
        table.samples().windows(2).all(|w| w[0] <= w[1])
    }

    fn soft() -> CubicBezier {
        CubicBezier::falling(
            ControlPoint::new(250.0, 1500.0),
            ControlPoint::new(1500.0, 250.0),
        )
    }

    #[test]
    fn test_falling_bezier_is_stored_rising() {
        let table = CurveTable::from_bezier(&soft(), 4095, TABLE_LEN).unwrap();
        assert_eq!(table.len(), TABLE_LEN);
        assert!(is_non_decreasing(&table));
        assert!(table.rising(0) <= 1);
        assert!(table.rising(TABLE_LEN - 1) >= 4094);
    }

    #[test]
    fn test_falling_reads_mirror_rising_reads() {
        let table = CurveTable::from_bezier(&soft(), 4095, 64).unwrap();
        for i in 0..64 {
            assert_eq!(table.falling(i), table.rising(63 - i));
        }
    }

    #[test]
    fn test_rising_bezier_tracks_diagonal() {
        let diagonal = CubicBezier::rising(
            ControlPoint::new(1365.0, 1365.0),
            ControlPoint::new(2730.0, 2730.0),
        );
        let table = CurveTable::from_bezier(&diagonal, 4095, 1024).unwrap();
        let line = CurveTable::linear(4095, 1024).unwrap();
        for i in 0..1024 {
            let diff = table.rising(i) as i64 - line.rising(i) as i64;
            assert!(diff.abs() <= 2, "index {} differs by {}", i, diff);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let first = CurveTable::from_bezier(&soft(), 4095, TABLE_LEN).unwrap();
        let second = CurveTable::from_bezier(&soft(), 4095, TABLE_LEN).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_indices_clamp() {
        let table = CurveTable::linear(255, 16).unwrap();
        assert_eq!(table.rising(1000), 255);
        assert_eq!(table.falling(1000), 0);
    }

    #[test]
    fn test_geometry_errors() {
        assert!(matches!(
            CurveTable::from_bezier(&soft(), 4095, 1),
            Err(CurveError::TableLength(1))
        ));
        assert!(matches!(
            CurveTable::linear(4095, MAX_TABLE_LEN + 1),
            Err(CurveError::TableLength(_))
        ));
        assert!(matches!(
            CurveTable::linear(0, 16),
            Err(CurveError::VerticalResolution(0))
        ));
        assert!(matches!(
            CurveTable::linear(70_000, 16),
            Err(CurveError::VerticalResolution(70_000))
        ));
    }

    #[test]
    fn test_linear_endpoints() {
        let table = CurveTable::linear(4095, 1024).unwrap();
        assert_eq!(table.rising(0), 0);
        assert_eq!(table.rising(1023), 4095);
        assert!(is_non_decreasing(&table));
    }

    #[test]
    fn test_exponential_shapes() {
        let rising = CurveTable::exponential(Orientation::Rising, 0.997, 4095, 1024).unwrap();
        let falling = CurveTable::exponential(Orientation::Falling, 0.997, 4095, 1024).unwrap();

        for table in [&rising, &falling] {
            assert!(is_non_decreasing(table));
            assert_eq!(table.rising(0), 0);
            assert_eq!(table.rising(1023), 4095);
        }

        // The falling curve drops fast at first
        assert!(falling.falling(100) < 4095 * 3 / 4);
        // The rising one climbs fast at first
        assert!(rising.rising(100) > 4095 / 4);
    }

    #[test]
    fn test_exponential_rejects_bad_alpha() {
        for alpha in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                CurveTable::exponential(Orientation::Rising, alpha, 4095, 16),
                Err(CurveError::Alpha(_))
            ));
        }
    }

    #[test]
    fn test_from_samples_validation() {
        assert!(CurveTable::from_samples(&[1, 2, 3, 254], 255).is_ok());
        assert!(matches!(
            CurveTable::from_samples(&[0, 300, 255], 255),
            Err(CurveError::SampleOutOfRange { index: 1, .. })
        ));
        assert!(matches!(
            CurveTable::from_samples(&[5, 10, 255], 255),
            Err(CurveError::Endpoints { first: 5, .. })
        ));
        assert!(matches!(
            CurveTable::from_samples(&[0, 10, 200], 255),
            Err(CurveError::Endpoints { last: 200, .. })
        ));
        assert!(matches!(
            CurveTable::from_samples(&[0], 255),
            Err(CurveError::TableLength(1))
        ));
    }

    #[cfg(feature = "table-loader")]
    #[test]
    fn test_from_wav_resamples_and_normalizes() {
        let path = std::env::temp_dir().join("contour_curve_table_test.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        // A quadratic ramp from -1000 to 9000
        for i in 0..200i32 {
            writer.write_sample(-1000 + i * i / 4).unwrap();
        }
        writer.finalize().unwrap();

        let table = CurveTable::from_wav(&path, 4095, 64).unwrap();
        assert_eq!(table.len(), 64);
        assert!(is_non_decreasing(&table));
        assert_eq!(table.rising(0), 0);
        assert_eq!(table.rising(63), 4095);
        // Quadratic: a quarter of the way up at half time
        let mid = table.rising(32) as i64;
        assert!((mid - 4095 / 4).abs() < 150, "mid = {}", mid);

        std::fs::remove_file(&path).ok();
    }
}
