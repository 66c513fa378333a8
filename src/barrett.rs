//! Reductions modulo `2^N`: masking and shifts only.
//!
//! A modulus that is a power of two needs none of the general Barrett
//! machinery; these helpers cover the cases the engine meets — canonical
//! `x mod 2^N`, the paired quotient/remainder split, and a recursive
//! fixed-width window walk that the radix converter uses for
//! power-of-two bases.

use crate::limbs::rlz;
use crate::shift::rshift_bits;

/// `out = x mod 2^n_bits`; returns the canonical result length.
/// `out` must hold `min(x.len(), ceil(n_bits/64))` words.
pub fn mod_pow2(x: &[u64], n_bits: u64, out: &mut [u64]) -> usize {
    if n_bits == 0 {
        out[0] = 0;
        return 1;
    }
    let full_words = (n_bits / 64) as usize;
    let top_bits = (n_bits % 64) as u32;
    if full_words >= x.len() {
        out[..x.len()].copy_from_slice(x);
        return rlz(&out[..x.len()]);
    }
    out[..full_words].copy_from_slice(&x[..full_words]);
    if top_bits != 0 {
        out[full_words] = x[full_words] & ((1u64 << top_bits) - 1);
        return rlz(&out[..full_words + 1]);
    }
    rlz(&out[..full_words.max(1)])
}

/// Split `x` into `(x >> n_bits, x mod 2^n_bits)`; returns the canonical
/// lengths `(quot_len, rem_len)`. A shift past the top yields a zero
/// quotient.
pub fn div_rem_pow2(x: &[u64], n_bits: u64, quot: &mut [u64], rem: &mut [u64]) -> (usize, usize) {
    let rem_len = mod_pow2(x, n_bits, rem);
    let word_shift = (n_bits / 64) as usize;
    if word_shift >= x.len() {
        quot[0] = 0;
        return (1, rem_len);
    }
    let quot_words = x.len() - word_shift;
    rshift_bits(x, &mut quot[..quot_words], n_bits);
    (rlz(&quot[..quot_words]), rem_len)
}

/// Walk `x` in fixed `window`-bit slices (low to high), recursively
/// halving the span: each level splits at a power-of-two multiple of the
/// window, so every reduction is a mask-and-shift. `emit` receives one
/// window value per call, low slice first.
///
/// `window < 64` (the radix fast path uses `digits_per_word * log2(base)`
/// bits, always below a word).
pub fn for_each_pow2_window<F: FnMut(u64)>(x: &[u64], window: u32, count: usize, emit: &mut F) {
    debug_assert!(window > 0 && window < 64);
    if count == 0 {
        return;
    }
    if count == 1 {
        emit(read_window(x, 0, window));
        return;
    }
    let half = (count / 2).next_power_of_two().min(count - 1);
    let split_bits = half as u64 * window as u64;
    // low half stays in place; high half is x >> split_bits
    let lo_words = (split_bits as usize).div_ceil(64).min(x.len());
    let mut lo = vec![0u64; lo_words.max(1)];
    let mut hi = vec![0u64; x.len()];
    let (hi_len, lo_len) = div_rem_pow2(x, split_bits, &mut hi, &mut lo);
    for_each_pow2_window(&lo[..lo_len], window, half, emit);
    for_each_pow2_window(&hi[..hi_len], window, count - half, emit);
}

/// One `window`-bit slice starting at bit `pos` (may straddle two words).
fn read_window(x: &[u64], pos: u64, window: u32) -> u64 {
    let w = (pos / 64) as usize;
    let b = (pos % 64) as u32;
    if w >= x.len() {
        return 0;
    }
    let mut v = x[w] >> b;
    if b + window > 64 && w + 1 < x.len() {
        v |= x[w + 1] << (64 - b);
    }
    v & ((1u64 << window) - 1)
}
