//! 2-of-3 XOR erasure decoder.
//!
//! Rebuilds the original payload from the three blocks produced by
//! [`ErasureEncoder`](crate::ErasureEncoder), passed in any order. Each block
//! is checked against its own checksum. Good blocks are placed by their order
//! tag, bad ones fill whichever role is left. With A and B good the payload is
//! read straight out of them; otherwise the missing data block is rebuilt as
//! the XOR of the other two.

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::config::CodecConfig;
use crate::error::ErasureError;
use crate::frame::{BlockHeader, CHECKSUM_LEN, FrameLayout, Role, validate};
use crate::xor::xor_into;

/// A block that failed validation during a successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenBlock {
    /// Position of the block in the decode input (0, 1 or 2).
    pub slot: usize,
    /// The role the block should have held.
    pub role: Role,
    /// Fresh copy of the block, byte-identical to what the encoder produced.
    pub replacement: Bytes,
}

/// Output of [`decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The original payload.
    pub payload: Vec<u8>,
    /// The block that had to be skipped, if any.
    pub broken: Option<BrokenBlock>,
}

impl Decoded {
    /// Whether one of the blocks was bad and should be rewritten.
    pub fn is_degraded(&self) -> bool {
        self.broken.is_some()
    }
}

/// Where one role landed among the three input slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoleEntry {
    /// Input slot holding this role.
    pub slot: usize,
    /// Whether the slot passed validation and owns the role.
    pub good: bool,
    /// Declared payload length. Zero for parity and bad blocks.
    pub len: usize,
}

/// Role to slot assignment for one stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RoleMap {
    entries: [RoleEntry; 3],
}

impl RoleMap {
    /// Assign roles in a single pass over the slot headers.
    ///
    /// A good block takes the role named by its order tag unless an earlier
    /// slot already holds it. A good data block whose declared length does
    /// not fit is not trusted. Every untrusted slot then fills a vacant role
    /// in slot order.
    pub(crate) fn build(layout: &FrameLayout, block_len: usize, headers: &[BlockHeader; 3]) -> Self {
        let mut entries = [RoleEntry {
            slot: 0,
            good: false,
            len: 0,
        }; 3];
        let mut leftover = Vec::with_capacity(3);

        for (slot, header) in headers.iter().enumerate() {
            let role = header.role();
            let len = match role {
                Role::Parity => Some(0),
                Role::A | Role::B => header.fitting_len(layout, block_len),
            };
            match len {
                Some(len) if header.good && !entries[role.index()].good => {
                    entries[role.index()] = RoleEntry {
                        slot,
                        good: true,
                        len,
                    };
                }
                _ => leftover.push(slot),
            }
        }

        let vacant: Vec<Role> = Role::ALL
            .into_iter()
            .filter(|role| !entries[role.index()].good)
            .collect();
        for (role, slot) in vacant.into_iter().zip(leftover) {
            entries[role.index()].slot = slot;
        }

        Self { entries }
    }

    pub(crate) fn get(&self, role: Role) -> RoleEntry {
        self.entries[role.index()]
    }

    pub(crate) fn good_count(&self) -> usize {
        self.entries.iter().filter(|e| e.good).count()
    }

    /// The first role whose slot is not trusted.
    pub(crate) fn bad_role(&self) -> Option<Role> {
        Role::ALL.into_iter().find(|role| !self.get(*role).good)
    }
}

/// Check that all three blocks have the same length and return it.
pub(crate) fn check_sizes(blocks: &[&[u8]; 3]) -> Result<usize, ErasureError> {
    let lengths = [blocks[0].len(), blocks[1].len(), blocks[2].len()];
    if lengths[0] != lengths[1] || lengths[1] != lengths[2] {
        return Err(ErasureError::SizeMismatch { lengths });
    }
    Ok(lengths[0])
}

/// Validate every block and assign roles.
pub(crate) fn classify(
    layout: &FrameLayout,
    blocks: &[&[u8]; 3],
) -> Result<([BlockHeader; 3], RoleMap), ErasureError> {
    let block_len = check_sizes(blocks)?;
    let headers = [
        validate(layout, blocks[0])?,
        validate(layout, blocks[1])?,
        validate(layout, blocks[2])?,
    ];
    for (slot, header) in headers.iter().enumerate() {
        trace!(slot, order = header.order, good = header.good, "validated block");
    }
    Ok((headers, RoleMap::build(layout, block_len, &headers)))
}

/// Rebuild a sealed block as the XOR of the bodies of two others.
pub(crate) fn rebuild(
    layout: &FrameLayout,
    p: &[u8],
    q: &[u8],
) -> Result<Vec<u8>, ErasureError> {
    let mut out = vec![0u8; p.len()];
    let body_len = out.len().saturating_sub(CHECKSUM_LEN);
    xor_into(&mut out[..body_len], p, q);
    layout.seal(&mut out)?;
    Ok(out)
}

/// Decode the original payload from three blocks in any order.
///
/// # Errors
///
/// - [`ErasureError::SizeMismatch`] if the blocks differ in length.
/// - [`ErasureError::Truncated`] if the blocks are too short to be framed.
/// - [`ErasureError::Unrecoverable`] if fewer than two blocks are good.
///
/// When all three checksums pass, the parity block is not compared against
/// `A ^ B`. A corrupted block whose checksum still matches by chance is
/// treated as good; use [`scrub`](crate::scrub()) to check parity as well.
pub fn decode(config: &CodecConfig, blocks: [&[u8]; 3]) -> Result<Decoded, ErasureError> {
    let layout = config.layout();
    // Size check, per-block checksums, then role assignment.
    let (_, roles) = classify(&layout, &blocks)?;

    // Two good blocks are the minimum for any path below.
    let good = roles.good_count();
    if good < 2 {
        warn!(good, "too many bad blocks, cannot reconstruct");
        return Err(ErasureError::Unrecoverable { good });
    }

    let a = roles.get(Role::A);
    let b = roles.get(Role::B);
    let x = roles.get(Role::Parity);

    let decoded = match roles.bad_role() {
        // Both data blocks are good: no XOR needed.
        None => Decoded {
            payload: join(
                layout.payload(blocks[a.slot], a.len),
                layout.payload(blocks[b.slot], b.len),
            ),
            broken: None,
        },
        // Parity lost: payload comes straight from A and B, X is regenerated
        // for write-back.
        Some(Role::Parity) => {
            let replacement = rebuild(&layout, blocks[a.slot], blocks[b.slot])?;
            Decoded {
                payload: join(
                    layout.payload(blocks[a.slot], a.len),
                    layout.payload(blocks[b.slot], b.len),
                ),
                broken: Some(broken(x.slot, Role::Parity, replacement)),
            }
        }
        // A lost: A = B ^ X, header included.
        Some(Role::A) => {
            let rebuilt = rebuild(&layout, blocks[b.slot], blocks[x.slot])?;
            let a_len = rebuilt_len(&layout, &rebuilt, Role::A)?;
            Decoded {
                payload: join(
                    layout.payload(&rebuilt, a_len),
                    layout.payload(blocks[b.slot], b.len),
                ),
                broken: Some(broken(a.slot, Role::A, rebuilt)),
            }
        }
        // B lost: B = A ^ X.
        Some(Role::B) => {
            let rebuilt = rebuild(&layout, blocks[a.slot], blocks[x.slot])?;
            let b_len = rebuilt_len(&layout, &rebuilt, Role::B)?;
            Decoded {
                payload: join(
                    layout.payload(blocks[a.slot], a.len),
                    layout.payload(&rebuilt, b_len),
                ),
                broken: Some(broken(b.slot, Role::B, rebuilt)),
            }
        }
    };

    if let Some(ref block) = decoded.broken {
        warn!(slot = block.slot, role = %block.role, "block failed validation");
    }
    debug!(
        payload_len = decoded.payload.len(),
        block_len = blocks[0].len(),
        degraded = decoded.is_degraded(),
        "decoded payload from blocks"
    );

    Ok(decoded)
}

fn broken(slot: usize, role: Role, replacement: Vec<u8>) -> BrokenBlock {
    BrokenBlock {
        slot,
        role,
        replacement: Bytes::from(replacement),
    }
}

/// Declared length of a rebuilt data block.
///
/// The rebuilt block is only as trustworthy as the two it came from, so a
/// wrong order tag or an oversized length means one of them matched its
/// checksum by chance.
fn rebuilt_len(layout: &FrameLayout, rebuilt: &[u8], want: Role) -> Result<usize, ErasureError> {
    let header = validate(layout, rebuilt)?;
    match header.fitting_len(layout, rebuilt.len()) {
        Some(len) if header.role() == want => Ok(len),
        _ => {
            warn!(role = %want, order = header.order, "rebuilt block is inconsistent");
            Err(ErasureError::Unrecoverable { good: 2 })
        }
    }
}

fn join(first: &[u8], second: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(first.len() + second.len());
    out.extend_from_slice(first);
    out.extend_from_slice(second);
    out
}
