//! 2-of-3 XOR erasure encoder.
//!
//! Splits a payload into two data blocks, A and B, and derives a parity
//! block X from them. All three blocks have the same length and any two of
//! them are enough to rebuild the payload.

use bytes::Bytes;
use tracing::debug;

use crate::config::CodecConfig;
use crate::error::ErasureError;
use crate::frame::{CHECKSUM_LEN, FrameLayout, Role};
use crate::xor::xor_into;

/// One of the three self-describing blocks produced by [`ErasureEncoder::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Which part of the stripe this block holds.
    pub role: Role,
    /// The framed block bytes, checksum included.
    pub data: Bytes,
}

impl Block {
    /// Total length of the block in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the block holds no bytes. Never true for encoder output.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// 2-of-3 erasure encoder.
///
/// The first half of the payload goes to block A and the rest to block B, so
/// B carries the extra byte when the length is odd. Both are zero padded to
/// the same length, and X is the XOR of their bodies (header, payload and
/// padding) followed by its own checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErasureEncoder {
    layout: FrameLayout,
}

impl ErasureEncoder {
    /// Create an encoder for the given config.
    pub fn new(config: CodecConfig) -> Self {
        Self {
            layout: config.layout(),
        }
    }

    /// Block layout used by this encoder.
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    /// Encode a payload into three blocks, returned in the order A, B, X.
    ///
    /// An empty payload is valid and yields three header-only blocks.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::SizeOverflow`] if a payload half does not fit
    /// in the configured length field.
    pub fn encode(&self, payload: &[u8]) -> Result<[Block; 3], ErasureError> {
        let layout = &self.layout;
        check_fits(layout, payload.len())?;

        // B takes the extra byte on odd lengths.
        let split = payload.len() / 2;
        let (half_a, half_b) = payload.split_at(split);

        let block_len = layout.block_len(payload.len());
        let body_len = block_len - CHECKSUM_LEN;

        // Data blocks: header, half, zero pad, checksum.
        let a = frame_data(layout, Role::A, half_a, block_len)?;
        let b = frame_data(layout, Role::B, half_b, block_len)?;

        // Parity covers the whole body, so its header is A's header XOR B's.
        let mut x = vec![0u8; block_len];
        xor_into(&mut x[..body_len], &a, &b);
        layout.seal(&mut x)?;

        debug!(
            payload_len = payload.len(),
            a_len = half_a.len(),
            b_len = half_b.len(),
            block_len,
            "encoded payload into blocks"
        );

        Ok([
            Block {
                role: Role::A,
                data: Bytes::from(a),
            },
            Block {
                role: Role::B,
                data: Bytes::from(b),
            },
            Block {
                role: Role::Parity,
                data: Bytes::from(x),
            },
        ])
    }
}

/// Encode a payload with the default config.
pub fn encode(payload: &[u8]) -> Result<[Block; 3], ErasureError> {
    ErasureEncoder::default().encode(payload)
}

/// Reject a payload whose larger half overflows the length field, before
/// anything is allocated.
fn check_fits(layout: &FrameLayout, payload_len: usize) -> Result<(), ErasureError> {
    let longest = (payload_len - payload_len / 2) as u64;
    if longest > layout.width().max_value() {
        return Err(ErasureError::SizeOverflow {
            len: longest,
            width: layout.width(),
        });
    }
    Ok(())
}

/// Frame one data half into a zero-padded, sealed block of `block_len` bytes.
fn frame_data(
    layout: &FrameLayout,
    role: Role,
    half: &[u8],
    block_len: usize,
) -> Result<Vec<u8>, ErasureError> {
    let mut block = vec![0u8; block_len];
    layout.write_header(&mut block, role, half.len())?;
    let start = layout.header_len();
    block[start..start + half.len()].copy_from_slice(half);
    layout.seal(&mut block)?;
    Ok(block)
}
