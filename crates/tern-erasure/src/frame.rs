//! Block framing and checksums.
//!
//! Every block has the same layout:
//!
//! ```text
//! [ order (1) ][ length (4 or 8, big-endian) ][ payload ... zero pad ][ crc32 (4, big-endian) ]
//! ```
//!
//! The checksum covers every byte before it, padding included. The parity
//! block never has its header written explicitly: its whole body is the XOR of
//! the two data bodies, so its order byte is `1 ^ 2 = 3` and its length field
//! is the XOR of the two data lengths.

use std::fmt;

use crate::config::LengthWidth;
use crate::error::ErasureError;

/// Width of the order tag.
pub const ORDER_LEN: usize = 1;

/// Width of the trailing checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Logical role of a block within a stripe.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// First half of the payload.
    A = 1,
    /// Second half of the payload (carries the extra byte on odd lengths).
    B = 2,
    /// XOR of the A and B bodies.
    Parity = 3,
}

impl Role {
    /// All roles, in encode output order.
    pub const ALL: [Role; 3] = [Role::A, Role::B, Role::Parity];

    /// The order tag stored in the first byte of the block.
    pub const fn order(self) -> u8 {
        self as u8
    }

    /// Map an order tag to a role. Anything other than 1 or 2 is parity.
    pub const fn from_order(order: u8) -> Self {
        match order {
            1 => Self::A,
            2 => Self::B,
            _ => Self::Parity,
        }
    }

    /// Position of this role in [`Role::ALL`].
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => f.write_str("A"),
            Self::B => f.write_str("B"),
            Self::Parity => f.write_str("X"),
        }
    }
}

/// Byte offsets of a block for a given length field width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    width: LengthWidth,
}

impl FrameLayout {
    /// Layout for the given length field width.
    pub const fn new(width: LengthWidth) -> Self {
        Self { width }
    }

    /// The length field width.
    pub const fn width(&self) -> LengthWidth {
        self.width
    }

    /// Bytes before the payload: order tag plus length field.
    pub const fn header_len(&self) -> usize {
        ORDER_LEN + self.width.bytes()
    }

    /// Smallest well-formed block: a header and a checksum around an empty payload.
    pub const fn min_block_len(&self) -> usize {
        self.header_len() + CHECKSUM_LEN
    }

    /// Total length of each of the three blocks for a payload of `payload_len` bytes.
    pub const fn block_len(&self, payload_len: usize) -> usize {
        payload_len.div_ceil(2) + self.min_block_len()
    }

    /// Largest payload slice a block of `block_len` bytes can carry.
    pub const fn capacity(&self, block_len: usize) -> usize {
        block_len.saturating_sub(self.min_block_len())
    }

    /// Bytes covered by the checksum.
    ///
    /// # Panics
    ///
    /// Panics if `block` is shorter than [`CHECKSUM_LEN`]. Callers validate first.
    pub(crate) fn body<'a>(&self, block: &'a [u8]) -> &'a [u8] {
        &block[..block.len() - CHECKSUM_LEN]
    }

    /// The first `len` payload bytes of a block.
    ///
    /// # Panics
    ///
    /// Panics if `len` runs past the end of `block`. Callers only pass
    /// lengths checked by [`BlockHeader::fitting_len`].
    pub(crate) fn payload<'a>(&self, block: &'a [u8], len: usize) -> &'a [u8] {
        let start = self.header_len();
        &block[start..start + len]
    }

    /// Write the order tag and length field at the front of `block`.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::Truncated`] if `block` cannot hold a header,
    /// or [`ErasureError::SizeOverflow`] if `payload_len` does not fit in the
    /// length field.
    pub fn write_header(
        &self,
        block: &mut [u8],
        role: Role,
        payload_len: usize,
    ) -> Result<(), ErasureError> {
        ensure_len(block.len(), self.header_len())?;
        block[0] = role.order();
        write_uint(&mut block[ORDER_LEN..], self.width, payload_len as u64)
    }

    /// Compute the checksum over the body of `block` and store it in the
    /// trailing field.
    ///
    /// # Errors
    ///
    /// Returns [`ErasureError::Truncated`] if `block` is shorter than
    /// [`FrameLayout::min_block_len`].
    pub fn seal(&self, block: &mut [u8]) -> Result<(), ErasureError> {
        ensure_len(block.len(), self.min_block_len())?;
        let split = block.len() - CHECKSUM_LEN;
        let (body, tail) = block.split_at_mut(split);
        tail.copy_from_slice(&checksum(body).to_be_bytes());
        Ok(())
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::new(LengthWidth::default())
    }
}

/// Header fields and checksum outcome of a single block.
///
/// `order` and `declared_len` are read whether or not the checksum matched;
/// only trust them when `good` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// First byte of the block.
    pub order: u8,
    /// Payload length read from the length field.
    pub declared_len: u64,
    /// Whether the stored checksum matches the recomputed one.
    pub good: bool,
}

impl BlockHeader {
    /// Role claimed by the order tag.
    pub fn role(&self) -> Role {
        Role::from_order(self.order)
    }

    /// Declared length, if it fits in a block of `block_len` bytes.
    pub fn fitting_len(&self, layout: &FrameLayout, block_len: usize) -> Option<usize> {
        usize::try_from(self.declared_len)
            .ok()
            .filter(|&len| len <= layout.capacity(block_len))
    }
}

/// Write `value` big-endian into the first `width` bytes of `dst`.
///
/// # Errors
///
/// Returns [`ErasureError::Truncated`] if `dst` is shorter than `width`, or
/// [`ErasureError::SizeOverflow`] if `value` does not fit in `width`.
pub fn write_uint(dst: &mut [u8], width: LengthWidth, value: u64) -> Result<(), ErasureError> {
    ensure_len(dst.len(), width.bytes())?;
    match width {
        LengthWidth::U32 => {
            let v = u32::try_from(value)
                .map_err(|_| ErasureError::SizeOverflow { len: value, width })?;
            dst[..4].copy_from_slice(&v.to_be_bytes());
        }
        LengthWidth::U64 => dst[..8].copy_from_slice(&value.to_be_bytes()),
    }
    Ok(())
}

/// Read a big-endian integer of `width` bytes from the front of `src`.
///
/// # Errors
///
/// Returns [`ErasureError::Truncated`] if `src` is shorter than `width`.
pub fn read_uint(src: &[u8], width: LengthWidth) -> Result<u64, ErasureError> {
    ensure_len(src.len(), width.bytes())?;
    let value = match width {
        LengthWidth::U32 => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&src[..4]);
            u32::from_be_bytes(buf) as u64
        }
        LengthWidth::U64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&src[..8]);
            u64::from_be_bytes(buf)
        }
    };
    Ok(value)
}

fn ensure_len(len: usize, min: usize) -> Result<(), ErasureError> {
    if len < min {
        return Err(ErasureError::Truncated { len, min });
    }
    Ok(())
}

/// CRC-32 (IEEE) of `bytes`.
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// Read a block's header and check its stored checksum.
///
/// # Errors
///
/// Returns [`ErasureError::Truncated`] if the block cannot hold a header and
/// a checksum.
pub fn validate(layout: &FrameLayout, block: &[u8]) -> Result<BlockHeader, ErasureError> {
    ensure_len(block.len(), layout.min_block_len())?;

    let body = layout.body(block);
    let mut stored = [0u8; CHECKSUM_LEN];
    stored.copy_from_slice(&block[body.len()..]);

    Ok(BlockHeader {
        order: block[0],
        declared_len: read_uint(&block[ORDER_LEN..], layout.width())?,
        good: u32::from_be_bytes(stored) == checksum(body),
    })
}
