//! 2-of-3 XOR erasure coding.
//!
//! This crate provides:
//! - [`ErasureEncoder`] — splits a payload into two data blocks and one parity block.
//! - [`decode`] — rebuilds the payload from the three blocks in any order,
//!   tolerating one missing or corrupted block.
//! - [`scrub()`] — checks a stripe's checksums and parity without decoding it.
//!
//! Every block carries an order tag, a big-endian length field and a CRC-32
//! over everything before it, so blocks are self-describing and corruption is
//! detected per block. Overhead is 1.5x the payload plus a small fixed header.
//!
//! The codec is a pure in-memory transform: storing, transmitting and
//! rewriting blocks is left to the caller.

mod config;
mod decoder;
mod encoder;
mod error;
mod frame;
mod scrub;
mod xor;

pub use config::{CodecConfig, LengthWidth};
pub use decoder::{BrokenBlock, Decoded, decode};
pub use encoder::{Block, ErasureEncoder, encode};
pub use error::ErasureError;
pub use frame::{
    BlockHeader, CHECKSUM_LEN, FrameLayout, ORDER_LEN, Role, checksum, read_uint, validate,
    write_uint,
};
pub use scrub::{ScrubReport, ScrubVerdict, scrub};
pub use xor::{xor, xor_into};
