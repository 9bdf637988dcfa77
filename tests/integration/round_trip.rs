//! Encode/decode round trips across payload sizes, layouts and block orders.

use std::thread;

use tern_erasure::{CodecConfig, LengthWidth, Role, ScrubVerdict, decode, encode, scrub};
use tern_integration_tests::{
    PERMUTATIONS, decode_permuted, encode_blocks, init_tracing, test_data, test_data_seeded,
};

const SIZES: &[usize] = &[0, 1, 2, 3, 7, 8, 9, 15, 16, 17, 255, 1024, 4097, 65_537];

#[test]
fn test_hello_there() {
    init_tracing();
    let config = CodecConfig::default();
    let blocks = encode_blocks(config, b"hello there");
    for block in &blocks {
        assert_eq!(block.len(), config.layout().block_len(11));
    }

    for perm in PERMUTATIONS {
        let decoded = decode_permuted(&config, &blocks, perm).unwrap();
        assert_eq!(decoded.payload, b"hello there");
        assert!(decoded.broken.is_none());
    }
}

#[test]
fn test_round_trip_sizes_both_widths() {
    init_tracing();
    for width in [LengthWidth::U32, LengthWidth::U64] {
        let config = CodecConfig::new(width);
        for &size in SIZES {
            let data = test_data(size);
            let blocks = encode_blocks(config, &data);
            for perm in PERMUTATIONS {
                let decoded = decode_permuted(&config, &blocks, perm).unwrap();
                assert_eq!(decoded.payload, data, "size {size}, width {width}, order {perm:?}");
                assert!(decoded.broken.is_none());
            }
        }
    }
}

#[test]
fn test_block_length_and_overhead() {
    let layout = CodecConfig::default().layout();
    for &size in SIZES {
        let blocks = encode(&test_data(size)).unwrap();
        for block in &blocks {
            assert_eq!(block.len(), size.div_ceil(2) + 13);
            assert_eq!(block.len(), layout.block_len(size));
        }
    }
}

#[test]
fn test_encode_roles_in_order() {
    let blocks = encode(&test_data(100)).unwrap();
    let roles: Vec<Role> = blocks.iter().map(|b| b.role).collect();
    assert_eq!(roles, vec![Role::A, Role::B, Role::Parity]);
}

#[test]
fn test_fresh_stripe_scrubs_healthy() {
    let config = CodecConfig::default();
    for &size in SIZES {
        let blocks = encode_blocks(config, &test_data(size));
        for perm in PERMUTATIONS {
            let input = perm.map(|i| blocks[i].as_slice());
            let report = scrub(&config, input).unwrap();
            assert_eq!(report.verdict, ScrubVerdict::Healthy, "size {size}");
        }
    }
}

#[test]
fn test_width_mismatch_is_not_silently_accepted() {
    // Blocks written with a 4-byte length field, read with an 8-byte one.
    let data = test_data(64);
    let blocks = encode_blocks(CodecConfig::new(LengthWidth::U32), &data);
    let result = decode(
        &CodecConfig::new(LengthWidth::U64),
        [&blocks[0], &blocks[1], &blocks[2]],
    );
    if let Ok(decoded) = result {
        assert_ne!(decoded.payload, data);
    }
}

#[test]
fn test_concurrent_encode_decode() {
    init_tracing();
    let config = CodecConfig::default();
    thread::scope(|s| {
        for seed in 0..8u32 {
            s.spawn(move || {
                for round in 0..16 {
                    let data = test_data_seeded(1000 + round * 37, seed * 1000 + round as u32);
                    let blocks = encode_blocks(config, &data);
                    let perm = PERMUTATIONS[round % PERMUTATIONS.len()];
                    let decoded = decode_permuted(&config, &blocks, perm).unwrap();
                    assert_eq!(decoded.payload, data);
                }
            });
        }
    });
}
