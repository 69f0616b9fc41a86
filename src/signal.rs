//! Core signal trait.

/// Common interface for anything that produces a stream of samples.
///
/// Envelopes implement this so they can drive amplitude or any other
/// parameter of a host's signal chain. Samples from an envelope lie in
/// `0.0..=1.0`.
pub trait Signal {
    /// Generates the next sample from the signal.
    fn next_sample(&mut self) -> f64;

    /// Generates multiple samples into a buffer.
    ///
    /// Default implementation calls `next_sample()` for each element.
    /// Implementors may override this for more efficient batch processing.
    fn process(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
