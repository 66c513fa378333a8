//! In-word and arbitrary-distance shifts over little-endian word slices.
//!
//! The in-word shifters require `0 <= shift < 64`; the `*_bits` variants
//! split an arbitrary distance into a word offset plus an in-word shift and
//! zero-fill the vacated slots.
//!
//! In-place use: `lshift_in_word` walks top-down and `rshift_in_word`
//! bottom-up, so each supports `out` overlapping `in` at the same base
//! address. Overlaps at other offsets are not supported.

/// Left-shift by `shift < 64` bits, writing `in.len()` words and returning
/// the bits spilled out of the top word.
pub fn lshift_in_word_half(input: &[u64], out: &mut [u64], shift: u32) -> u64 {
    assert!(shift < 64);
    let len = input.len();
    if len == 0 {
        return 0;
    }
    assert!(out.len() >= len, "lshift output buffer too short");
    if shift == 0 {
        out[..len].copy_from_slice(input);
        return 0;
    }
    let shift_rem = 64 - shift;
    let mut last = input[len - 1];
    let ret = last >> shift_rem;
    // top-down so out may alias input
    let mut i = len - 1;
    while i > 0 {
        let n = input[i - 1];
        out[i] = (last << shift) | (n >> shift_rem);
        last = n;
        i -= 1;
    }
    out[0] = last << shift;
    ret
}

/// Left-shift by `shift < 64` bits into a `len + 1`-word output; the top
/// output word receives the spilled bits.
pub fn lshift_in_word(input: &[u64], out: &mut [u64], shift: u32) {
    let len = input.len();
    if len == 0 {
        return;
    }
    assert!(out.len() >= len + 1, "lshift output buffer too short");
    let spill = lshift_in_word_half(input, out, shift);
    out[len] = spill;
}

/// Right-shift by `shift < 64` bits, writing `in.len()` words; the low
/// bits fall off.
pub fn rshift_in_word(input: &[u64], out: &mut [u64], shift: u32) {
    assert!(shift < 64);
    let len = input.len();
    if len == 0 {
        return;
    }
    assert!(out.len() >= len, "rshift output buffer too short");
    if shift == 0 {
        out[..len].copy_from_slice(input);
        return;
    }
    let shift_rem = 64 - shift;
    let mut last = input[0];
    // bottom-up so out may alias input
    for i in 1..len {
        let n = input[i];
        out[i - 1] = (last >> shift) | (n << shift_rem);
        last = n;
    }
    out[len - 1] = last >> shift;
}

/// Left-shift by an arbitrary bit distance. Writes
/// `in.len() + shift/64 + 1` words when the in-word part is non-zero,
/// `in.len() + shift/64` otherwise; the vacated low words are zeroed.
pub fn lshift_bits(input: &[u64], out: &mut [u64], shift: u64) {
    let shift_word = (shift / 64) as usize;
    let shift_bits = (shift % 64) as u32;
    out[..shift_word].fill(0);
    if shift_bits == 0 {
        out[shift_word..shift_word + input.len()].copy_from_slice(input);
    } else {
        lshift_in_word(input, &mut out[shift_word..], shift_bits);
    }
}

/// Right-shift by an arbitrary bit distance; the low `shift` bits fall
/// off. Writes `in.len() - shift/64` words. `shift/64 < in.len()` is a
/// precondition.
pub fn rshift_bits(input: &[u64], out: &mut [u64], shift: u64) {
    let shift_word = (shift / 64) as usize;
    let shift_bits = (shift % 64) as u32;
    assert!(shift_word < input.len(), "rshift_bits drops the whole magnitude");
    if shift_bits == 0 {
        let n = input.len() - shift_word;
        out[..n].copy_from_slice(&input[shift_word..]);
    } else {
        rshift_in_word(&input[shift_word..], out, shift_bits);
    }
}
