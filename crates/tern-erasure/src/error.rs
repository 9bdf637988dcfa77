//! Error types for erasure coding operations.

use crate::config::LengthWidth;

/// Errors that can occur during erasure encoding or decoding.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErasureError {
    /// The three blocks passed to decode are not all the same length.
    #[error("blocks are of different sizes: {lengths:?}")]
    SizeMismatch {
        /// Length of each input block, in slot order.
        lengths: [usize; 3],
    },

    /// The payload half is too large for the configured length field.
    #[error("payload half of {len} bytes does not fit in a {width} length field")]
    SizeOverflow {
        /// The length that could not be represented.
        len: u64,
        /// The configured length field width.
        width: LengthWidth,
    },

    /// Fewer than two blocks passed validation.
    #[error("cannot reconstruct payload: only {good} of 3 blocks are good")]
    Unrecoverable {
        /// Number of blocks that were trustworthy.
        good: usize,
    },

    /// A block is too short to hold a header and a checksum.
    #[error("block of {len} bytes is truncated, need at least {min}")]
    Truncated {
        /// Actual block length.
        len: usize,
        /// Minimum length for the configured layout.
        min: usize,
    },
}
