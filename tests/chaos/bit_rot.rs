//! Chaos test: random bit rot across many stripes.
//!
//! Each round encodes a random payload, rots a random number of bits in one
//! or two blocks, shuffles the blocks and decodes. One rotten block must
//! always be recovered and reported; two must always be refused.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tern_erasure::{CodecConfig, ErasureError, LengthWidth};
use tern_integration_tests::{
    PERMUTATIONS, decode_permuted, encode_blocks, flip_bits, init_tracing, test_data_seeded,
};

const ROUNDS: usize = 500;

#[test]
fn test_single_block_rot_always_recovers() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x7E57_0001);

    for round in 0..ROUNDS {
        let width = if rng.random_bool(0.5) {
            LengthWidth::U32
        } else {
            LengthWidth::U64
        };
        let config = CodecConfig::new(width);
        let size = rng.random_range(0..4096);
        let data = test_data_seeded(size, round as u32);
        let blocks = encode_blocks(config, &data);

        let target = rng.random_range(0..3);
        let total_bits = blocks[target].len() * 8;
        let flips = rng.random_range(1..=total_bits);
        let mut rotten = blocks.clone();
        flip_bits(&mut rotten[target], flips, &mut rng);

        let perm = PERMUTATIONS[rng.random_range(0..PERMUTATIONS.len())];
        let decoded = decode_permuted(&config, &rotten, perm).unwrap_or_else(|e| {
            panic!("round {round}: size {size}, {flips} flips in block {target}: {e}")
        });
        assert_eq!(decoded.payload, data, "round {round}");

        let broken = decoded.broken.expect("rotten block should be reported");
        assert_eq!(perm[broken.slot], target, "round {round}");
        assert_eq!(broken.replacement.as_ref(), blocks[target].as_slice());
    }
}

#[test]
fn test_two_block_rot_always_refused() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(0x7E57_0002);
    let config = CodecConfig::default();

    for round in 0..ROUNDS {
        let size = rng.random_range(0..4096);
        let data = test_data_seeded(size, round as u32 ^ 0xFFFF);
        let mut blocks = encode_blocks(config, &data);

        let keep = rng.random_range(0..3);
        for (i, block) in blocks.iter_mut().enumerate() {
            if i != keep {
                let flips = rng.random_range(1..=block.len() * 8);
                flip_bits(block, flips, &mut rng);
            }
        }

        let perm = PERMUTATIONS[rng.random_range(0..PERMUTATIONS.len())];
        match decode_permuted(&config, &blocks, perm) {
            Err(ErasureError::Unrecoverable { good }) => assert!(good < 2, "round {round}"),
            Err(e) => panic!("round {round}: unexpected error {e}"),
            Ok(decoded) => panic!(
                "round {round}: decoded {} bytes from two rotten blocks",
                decoded.payload.len()
            ),
        }
    }
}
