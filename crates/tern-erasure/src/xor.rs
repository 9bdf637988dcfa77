//! Word-at-a-time XOR.
//!
//! Bytes are loaded into `u64` words by copying, so inputs of any alignment
//! work without reinterpreting the buffers. The tail that does not fill a
//! word is handled byte by byte.

const WORD: usize = size_of::<u64>();

#[inline]
fn load(chunk: &[u8]) -> u64 {
    let mut buf = [0u8; WORD];
    buf.copy_from_slice(chunk);
    u64::from_ne_bytes(buf)
}

/// Write `a ^ b` into `dst`.
///
/// Only the first `dst.len()` bytes of `a` and `b` are read.
///
/// # Panics
///
/// Panics if `a` or `b` is shorter than `dst`.
pub fn xor_into(dst: &mut [u8], a: &[u8], b: &[u8]) {
    let len = dst.len();
    let (a, b) = (&a[..len], &b[..len]);

    let mut dst_words = dst.chunks_exact_mut(WORD);
    let mut a_words = a.chunks_exact(WORD);
    let mut b_words = b.chunks_exact(WORD);

    for ((d, x), y) in (&mut dst_words).zip(&mut a_words).zip(&mut b_words) {
        d.copy_from_slice(&(load(x) ^ load(y)).to_ne_bytes());
    }

    let tail = dst_words.into_remainder();
    for ((d, x), y) in tail.iter_mut().zip(a_words.remainder()).zip(b_words.remainder()) {
        *d = x ^ y;
    }
}

/// Allocate and return `a ^ b` over the shorter of the two lengths.
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; a.len().min(b.len())];
    xor_into(&mut out, a, b);
    out
}
