//! Conversion between binary magnitudes and packed-radix digit arrays.
//!
//! A packed word carries `digits_per_word(base)` digits (19 for base 10,
//! so one word spans the `10^19`-class radix), little-endian by word and
//! by digit. Small operands run the quadratic loops: repeated scalar
//! division one way, Horner evaluation the other. From
//! [`RADIX_MIN_LEN`] words up, both directions switch to divide-and-
//! conquer over a squared power tower — `2^(64·2^i)` expressed in digits
//! going out, `B^(2^i)` in binary coming in — so the heavy lifting runs
//! through the multiplication dispatcher and the base-emitting NTT.
//! Power-of-two bases bypass arithmetic entirely: one packed word is one
//! fixed-width bit window.
//!
//! Digit arrays coming in are data, not trusted state: out-of-range
//! packed words surface as [`RadixError::DigitOutOfRange`].

use log::debug;
use smallvec::SmallVec;

use crate::barrett::for_each_pow2_window;
use crate::crt::{ntt_mul_base, U192};
use crate::error::{RadixError, RadixResult};
use crate::limbs::{bit_length, rlz};
use crate::mul::{mul, KARATSUBA_MIN};
use crate::word::{div128_64, floor_log2};

/// Word-length threshold where the divide-and-conquer paths take over.
pub const RADIX_MIN_LEN: usize = 64;

/// Digits of `base` that fit in one packed word: the largest `d` with
/// `base^d <= u64::MAX`. Panics outside `2..=36`.
pub fn digits_per_word(base: u64) -> u32 {
    assert!((2..=36).contains(&base), "base out of range");
    let mut d = 1;
    let mut r = base;
    while let Some(next) = r.checked_mul(base) {
        r = next;
        d += 1;
    }
    d
}

/// The packed radix itself: `base^digits_per_word(base)`.
pub fn radix_pow(base: u64) -> u64 {
    let mut r = base;
    while let Some(next) = r.checked_mul(base) {
        r = next;
    }
    r
}

/// Packed-word count that always holds the digits of an `len`-word
/// magnitude: `ceil(len·64 / log2 base)` digits plus slack.
pub fn base_digits_len(len: usize, base: u64) -> usize {
    let digits = (len as f64 * 64.0 / (base as f64).log2()).ceil() as usize;
    digits / digits_per_word(base) as usize + 2
}

/// Binary word count that always holds the value of `count` packed digit
/// words.
pub fn binary_len_for_digits(count: usize, base: u64) -> usize {
    let bits = count as f64 * digits_per_word(base) as f64 * (base as f64).log2();
    (bits.ceil() as usize) / 64 + 2
}

fn check_base(base: u64) -> RadixResult<()> {
    if (2..=36).contains(&base) {
        Ok(())
    } else {
        Err(RadixError::UnsupportedBase(base))
    }
}

/// Convert a binary magnitude to little-endian packed digits.
///
/// Writes the canonical digit-word count into `out` and returns it;
/// sizing with [`base_digits_len`] always suffices.
pub fn binary_to_base(input: &[u64], base: u64, out: &mut [u64]) -> RadixResult<usize> {
    check_base(base)?;
    let l = rlz(input);
    let x = &input[..l];

    let packed = if base.is_power_of_two() {
        pow2_bin_to_base(x, base)
    } else if l < RADIX_MIN_LEN {
        small_bin_to_base(x, radix_pow(base))
    } else {
        debug!("binary_to_base: {l} words, divide-and-conquer");
        large_bin_to_base(x, base)
    };

    if out.len() < packed.len() {
        return Err(RadixError::BufferTooShort {
            needed: packed.len(),
            have: out.len(),
        });
    }
    out[..packed.len()].copy_from_slice(&packed);
    out[packed.len()..].fill(0);
    Ok(packed.len())
}

/// Convert little-endian packed digits back to a binary magnitude.
///
/// Every packed word must be below `base^digits_per_word(base)`; sizing
/// `out` with [`binary_len_for_digits`] always suffices.
pub fn base_to_binary(input: &[u64], base: u64, out: &mut [u64]) -> RadixResult<usize> {
    check_base(base)?;
    let radix = radix_pow(base);
    for (index, &value) in input.iter().enumerate() {
        if value >= radix {
            return Err(RadixError::DigitOutOfRange { index, value, base });
        }
    }
    let count = rlz(input);
    let digits = &input[..count];

    let value = if base.is_power_of_two() {
        pow2_base_to_bin(digits, base)
    } else if count < RADIX_MIN_LEN {
        small_base_to_bin(digits, radix)
    } else {
        debug!("base_to_binary: {count} digit words, product tree");
        large_base_to_bin(digits, radix)
    };

    if out.len() < value.len() {
        return Err(RadixError::BufferTooShort {
            needed: value.len(),
            have: out.len(),
        });
    }
    out[..value.len()].copy_from_slice(&value);
    out[value.len()..].fill(0);
    Ok(value.len())
}

// ---------------------------------------------------------------------
// power-of-two bases: pure window splitting (no arithmetic)
// ---------------------------------------------------------------------

fn pow2_bin_to_base(x: &[u64], base: u64) -> Vec<u64> {
    let window = digits_per_word(base) * floor_log2(base);
    let bits = bit_length(x).max(1);
    let count = (bits as usize).div_ceil(window as usize);
    let mut packed = Vec::with_capacity(count);
    for_each_pow2_window(x, window, count, &mut |w| packed.push(w));
    let len = rlz(&packed);
    packed.truncate(len);
    packed
}

fn pow2_base_to_bin(digits: &[u64], base: u64) -> Vec<u64> {
    let window = (digits_per_word(base) * floor_log2(base)) as u64;
    let total_bits = window * digits.len() as u64;
    let mut out = vec![0u64; (total_bits as usize).div_ceil(64).max(1)];
    for (i, &w) in digits.iter().enumerate() {
        let pos = i as u64 * window;
        let word = (pos / 64) as usize;
        let bit = (pos % 64) as u32;
        out[word] |= w << bit;
        if bit + window as u32 > 64 && word + 1 < out.len() {
            out[word + 1] |= w >> (64 - bit);
        }
    }
    let len = rlz(&out);
    out.truncate(len);
    out
}

// ---------------------------------------------------------------------
// base-domain arithmetic (digit words carry in base^digits_per_word)
// ---------------------------------------------------------------------

/// `acc += b`, digit words in base `radix`. Grows `acc` on final carry.
fn add_base_into(acc: &mut Vec<u64>, b: &[u64], radix: u64) {
    if acc.len() < b.len() {
        acc.resize(b.len(), 0);
    }
    let mut carry = 0u64;
    for i in 0..acc.len() {
        let add = if i < b.len() { b[i] } else { 0 };
        let s = acc[i] as u128 + add as u128 + carry as u128;
        if s >= radix as u128 {
            acc[i] = (s - radix as u128) as u64;
            carry = 1;
        } else {
            acc[i] = s as u64;
            carry = 0;
        }
        if carry == 0 && i >= b.len() {
            break;
        }
    }
    if carry != 0 {
        acc.push(1);
    }
}

/// Product of two packed-digit magnitudes, in the base domain.
/// Short operands run a column schoolbook with a 192-bit accumulator;
/// anything longer goes through the base-emitting NTT.
fn mul_base(a: &[u64], b: &[u64], radix: u64) -> Vec<u64> {
    let (la, lb) = (a.len(), b.len());
    let mut out = vec![0u64; la + lb];
    if la.min(lb) < KARATSUBA_MIN {
        let mut carry = U192::ZERO;
        for k in 0..la + lb - 1 {
            let mut acc = carry;
            let lo = k.saturating_sub(lb - 1);
            let hi = (k + 1).min(la);
            for i in lo..hi {
                acc.add_mul_word(a[i], b[k - i]);
            }
            out[k] = acc.div_rem_word(radix);
            carry = acc;
        }
        out[la + lb - 1] = carry.div_rem_word(radix);
        debug_assert_eq!(carry, U192::ZERO);
    } else {
        ntt_mul_base(a, b, &mut out, radix);
    }
    let len = rlz(&out);
    out.truncate(len);
    out
}

// ---------------------------------------------------------------------
// binary -> base
// ---------------------------------------------------------------------

/// Repeated division by the packed radix; destroys a local copy.
fn small_bin_to_base(x: &[u64], radix: u64) -> Vec<u64> {
    let mut scratch = x.to_vec();
    let mut len = rlz(&scratch);
    let mut packed = Vec::new();
    loop {
        let rem = div_rem_word_in_place(&mut scratch[..len], radix);
        packed.push(rem);
        len = rlz(&scratch[..len]);
        if len == 1 && scratch[0] == 0 {
            break;
        }
    }
    packed
}

fn div_rem_word_in_place(words: &mut [u64], d: u64) -> u64 {
    let mut rem = 0u64;
    for i in (0..words.len()).rev() {
        let (q, r) = div128_64(rem, words[i], d);
        words[i] = q;
        rem = r;
    }
    rem
}

/// Divide-and-conquer conversion: split at word `2^(level-1)`, convert
/// halves, recombine in the base domain against the digits of
/// `2^(64·2^(level-1))`.
fn large_bin_to_base(x: &[u64], base: u64) -> Vec<u64> {
    let radix = radix_pow(base);
    let level = ceil_log2(x.len());
    // tower[i] = digits of 2^(64·2^i)
    let mut tower: SmallVec<[Vec<u64>; 24]> = SmallVec::new();
    tower.push(small_bin_to_base(&[0, 1], radix));
    for i in 1..level {
        let sq = mul_base(&tower[i - 1], &tower[i - 1], radix);
        tower.push(sq);
    }
    bin_to_base_rec(x, level, &tower, radix)
}

fn bin_to_base_rec(x: &[u64], level: usize, tower: &[Vec<u64>], radix: u64) -> Vec<u64> {
    let l = rlz(x);
    let x = &x[..l];
    if l < RADIX_MIN_LEN {
        return small_bin_to_base(x, radix);
    }
    let k = 1usize << (level - 1);
    if l <= k {
        return bin_to_base_rec(x, level - 1, tower, radix);
    }
    let (lo, hi) = x.split_at(k);
    let dh = bin_to_base_rec(hi, level - 1, tower, radix);
    let dl = bin_to_base_rec(lo, level - 1, tower, radix);
    let mut res = mul_base(&dh, &tower[level - 1], radix);
    add_base_into(&mut res, &dl, radix);
    let len = rlz(&res);
    res.truncate(len);
    res
}

// ---------------------------------------------------------------------
// base -> binary
// ---------------------------------------------------------------------

/// Horner evaluation over the packed radix, most-significant word first.
fn small_base_to_bin(digits: &[u64], radix: u64) -> Vec<u64> {
    let mut acc: Vec<u64> = vec![0];
    for &d in digits.iter().rev() {
        let mut carry = d as u128;
        for w in acc.iter_mut() {
            let t = *w as u128 * radix as u128 + carry;
            *w = t as u64;
            carry = t >> 64;
        }
        if carry != 0 {
            acc.push(carry as u64);
        }
    }
    let len = rlz(&acc);
    acc.truncate(len);
    acc
}

/// Product tree: split below the largest power-of-two digit count,
/// evaluate halves, recombine as `hi·B^(2^i) + lo` with binary
/// multiplication.
fn large_base_to_bin(digits: &[u64], radix: u64) -> Vec<u64> {
    let level = ceil_log2(digits.len());
    // tower[i] = B^(2^i) in binary, B the packed radix
    let mut tower: SmallVec<[Vec<u64>; 24]> = SmallVec::new();
    tower.push(vec![radix]);
    for i in 1..level {
        let mut sq = vec![0u64; tower[i - 1].len() * 2];
        mul(&tower[i - 1], &tower[i - 1], &mut sq);
        let len = rlz(&sq);
        sq.truncate(len);
        tower.push(sq);
    }
    base_to_bin_rec(digits, &tower, radix)
}

fn base_to_bin_rec(digits: &[u64], tower: &[Vec<u64>], radix: u64) -> Vec<u64> {
    let count = rlz(digits);
    let digits = &digits[..count];
    if count < RADIX_MIN_LEN {
        return small_base_to_bin(digits, radix);
    }
    // split at the largest 2^i strictly below count
    let i = floor_log2((count - 1) as u64) as usize;
    let h = 1usize << i;
    let (lo, hi) = digits.split_at(h);
    let vhi = base_to_bin_rec(hi, tower, radix);
    let vlo = base_to_bin_rec(lo, tower, radix);
    let p = &tower[i];
    let mut res = vec![0u64; vhi.len() + p.len() + 1];
    mul(&vhi, p, &mut res[..vhi.len() + p.len()]);
    let carry = crate::limbs::add_into(&mut res, &vlo);
    debug_assert!(!carry);
    let len = rlz(&res);
    res.truncate(len);
    res
}

fn ceil_log2(n: usize) -> usize {
    debug_assert!(n > 1);
    (usize::BITS - (n - 1).leading_zeros()) as usize
}
