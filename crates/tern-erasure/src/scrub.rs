//! Stripe scrubbing.
//!
//! Checks the health of a stripe without reassembling its payload:
//! 1. Validates each block's checksum and assigns roles as [`decode`](crate::decode) does.
//! 2. If one block is bad, reports it as degraded.
//! 3. If all three are good, checks that `A ^ B == X` over the block body.
//!
//! The parity check catches the case `decode` cannot: a corrupted block whose
//! checksum matches by chance. Such a stripe is flagged, never auto-repaired,
//! since there is no way to tell which of the three blocks is wrong.

use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::decoder::classify;
use crate::error::ErasureError;
use crate::frame::{BlockHeader, Role};
use crate::xor::xor;

/// Result of scrubbing a stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubVerdict {
    /// All three blocks are good and parity is consistent.
    Healthy,
    /// One block is bad. The stripe is still decodable.
    Degraded {
        /// Input slot of the bad block.
        slot: usize,
        /// Role the bad block should hold.
        role: Role,
    },
    /// All checksums pass but `A ^ B != X`.
    ParityMismatch,
    /// Fewer than two blocks are good.
    Unrecoverable {
        /// Number of good blocks.
        good: usize,
    },
}

/// Per-block headers and the overall verdict for one stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrubReport {
    /// Header and checksum outcome of each input block, in slot order.
    pub headers: [BlockHeader; 3],
    /// Overall health.
    pub verdict: ScrubVerdict,
}

/// Scrub three blocks of one stripe, passed in any order.
///
/// # Errors
///
/// Returns [`ErasureError::SizeMismatch`] or [`ErasureError::Truncated`] for
/// malformed input. Bad blocks are reported in the verdict, not as errors.
pub fn scrub(config: &CodecConfig, blocks: [&[u8]; 3]) -> Result<ScrubReport, ErasureError> {
    let layout = config.layout();
    let (headers, roles) = classify(&layout, &blocks)?;

    let good = roles.good_count();
    let verdict = match roles.bad_role() {
        _ if good < 2 => ScrubVerdict::Unrecoverable { good },
        Some(role) => ScrubVerdict::Degraded {
            slot: roles.get(role).slot,
            role,
        },
        None => {
            let a = layout.body(blocks[roles.get(Role::A).slot]);
            let b = layout.body(blocks[roles.get(Role::B).slot]);
            let x = layout.body(blocks[roles.get(Role::Parity).slot]);
            if xor(a, b) == x {
                ScrubVerdict::Healthy
            } else {
                ScrubVerdict::ParityMismatch
            }
        }
    };

    match verdict {
        ScrubVerdict::Healthy => debug!("stripe is healthy"),
        ScrubVerdict::Degraded { slot, role } => {
            warn!(slot, role = %role, "stripe is degraded");
        }
        ScrubVerdict::ParityMismatch => {
            warn!("parity mismatch despite valid checksums, flagging for inspection");
        }
        ScrubVerdict::Unrecoverable { good } => warn!(good, "stripe is unrecoverable"),
    }

    Ok(ScrubReport { headers, verdict })
}
