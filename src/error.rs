//! Errors raised while building curve tables and banks.
//!
//! Only construction can fail. Once a [`CurveBank`](crate::CurveBank) exists,
//! every envelope operation is infallible and clamps out-of-range input.

use thiserror::Error;

/// Error type for curve table and bank construction.
#[derive(Debug, Error)]
pub enum CurveError {
    /// Table length outside `2..=MAX_TABLE_LEN`.
    #[error("table length {0} is out of range (2 to 65536)")]
    TableLength(usize),

    /// Vertical resolution of zero or wider than 16 bits.
    #[error("vertical resolution {0} is out of range (1 to 65535)")]
    VerticalResolution(u32),

    /// Exponential coefficient outside the open interval (0, 1).
    #[error("exponential alpha {0} must lie strictly between 0 and 1")]
    Alpha(f64),

    /// A designer-supplied sample exceeds the table's maximum level.
    #[error("sample {value} at index {index} exceeds the maximum level {max}")]
    SampleOutOfRange { index: usize, value: u32, max: u32 },

    /// A designer-supplied table decreases somewhere.
    #[error("table decreases at index {index} ({previous} -> {value})")]
    NotMonotonic {
        index: usize,
        previous: u32,
        value: u32,
    },

    /// A designer-supplied table does not start at 0 or end at full scale.
    #[error("table endpoints {first}..{last} do not span 0..{max}")]
    Endpoints { first: u32, last: u32, max: u32 },

    /// A table handed to a bank does not match the bank's geometry.
    #[error(
        "table of {len} samples at level {max} does not fit a bank of {bank_len} samples at level {bank_max}"
    )]
    BankMismatch {
        len: usize,
        max: u32,
        bank_len: usize,
        bank_max: u32,
    },

    /// The WAV file could not be read.
    #[cfg(feature = "table-loader")]
    #[error("failed to read curve table from WAV")]
    Wav(#[from] hound::Error),

    /// The WAV file holds no samples.
    #[cfg(feature = "table-loader")]
    #[error("WAV file contains no samples")]
    EmptyWav,
}
