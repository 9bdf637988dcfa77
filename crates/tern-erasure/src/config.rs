//! Codec configuration.
//!
//! The length field width is part of the block format: blocks encoded with
//! one width cannot be decoded with another. Hosts usually embed
//! [`CodecConfig`] as an `[erasure]` table in their own TOML config.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::frame::FrameLayout;

/// Width of the big-endian length field in every block header.
///
/// | Width | Header | Largest payload half |
/// |-------|--------|----------------------|
/// | `u32` | 5 B    | 4 GiB - 1            |
/// | `u64` | 9 B    | unbounded in practice |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthWidth {
    /// 4-byte length field.
    U32,
    /// 8-byte length field.
    #[default]
    U64,
}

impl LengthWidth {
    /// Number of bytes the length field occupies.
    pub const fn bytes(self) -> usize {
        match self {
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Largest value the field can hold.
    pub const fn max_value(self) -> u64 {
        match self {
            Self::U32 => u32::MAX as u64,
            Self::U64 => u64::MAX,
        }
    }
}

impl fmt::Display for LengthWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U32 => f.write_str("u32"),
            Self::U64 => f.write_str("u64"),
        }
    }
}

/// Configuration shared by the encoder and decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Width of the length field written into each block header.
    pub length_width: LengthWidth,
}

impl CodecConfig {
    /// Create a config with the given length field width.
    pub fn new(length_width: LengthWidth) -> Self {
        Self { length_width }
    }

    /// Byte layout of blocks produced under this config.
    pub fn layout(&self) -> FrameLayout {
        FrameLayout::new(self.length_width)
    }
}
