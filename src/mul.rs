//! Multiplication: schoolbook and Karatsuba tiers plus the strategy
//! dispatcher.
//!
//! The dispatcher picks by operand length (`n1 >= n2` after ordering):
//!
//! | condition                     | strategy            |
//! |-------------------------------|---------------------|
//! | `n2 < 24`                     | schoolbook          |
//! | `n2 < 1536` and `n1/n2 < 2`   | Karatsuba           |
//! | `n2 >= 1536` and `n1/n2 < 2`  | 3-prime NTT         |
//! | `n1/n2 >= 2`                  | chunked NTT         |
//!
//! Equal inputs always take the squaring entry, so a square never pays
//! for two forward transforms.
//!
//! Karatsuba threads one flat scratch slice through the recursion with
//! `split_at_mut`; no per-level allocation happens.

use log::debug;

use crate::crt;
use crate::limbs::{add_half, add_into, mul_add_scalar, rlz, sub_into};
use crate::word::isqrt;

/// Below this operand length the schoolbook loop wins.
pub const KARATSUBA_MIN: usize = 24;
/// At and above this balanced length the NTT takes over from Karatsuba.
pub const KARATSUBA_MAX: usize = 1536;

/// Schoolbook product: `out[..n1+n2] = in1 * in2`. Quadratic; the
/// dispatcher only routes short operands here.
pub fn schoolbook(in1: &[u64], in2: &[u64], out: &mut [u64]) {
    let (l1, l2) = (in1.len(), in2.len());
    assert!(out.len() >= l1 + l2, "schoolbook output buffer too short");
    out[..l1 + l2].fill(0);
    for (j, &m) in in2.iter().enumerate() {
        let carry = mul_add_scalar(in1, &mut out[j..j + l1], 0, m);
        out[j + l1] = carry;
    }
}

/// Scratch words needed by [`karatsuba_buffered`] for a top-level operand
/// of `n` words. Geometric recursion keeps the true need under `4n`; the
/// extra slack absorbs the per-level carry words.
pub fn karatsuba_scratch_len(n: usize) -> usize {
    6 * n + 64
}

/// Karatsuba product allocating its own scratch arena.
pub fn karatsuba(in1: &[u64], in2: &[u64], out: &mut [u64]) {
    let mut scratch = vec![0u64; karatsuba_scratch_len(in1.len().max(in2.len()))];
    karatsuba_buffered(in1, in2, out, &mut scratch);
}

/// Karatsuba product over a caller-provided scratch arena; recursion
/// carves the arena with `split_at_mut`, so a single allocation serves
/// every level.
pub fn karatsuba_buffered(in1: &[u64], in2: &[u64], out: &mut [u64], scratch: &mut [u64]) {
    let l1 = rlz(in1);
    let l2 = rlz(in2);
    let (a, b) = if l1 >= l2 {
        (&in1[..l1], &in2[..l2])
    } else {
        (&in2[..l2], &in1[..l1])
    };
    let n = in1.len() + in2.len();
    assert!(out.len() >= n, "karatsuba output buffer too short");
    out[a.len() + b.len()..n].fill(0);
    karatsuba_rec(a, b, &mut out[..a.len() + b.len()], scratch);
}

/// Recursive worker. `in1.len() >= in2.len() >= 1`, `out` exactly
/// `n1 + n2` words, fully overwritten.
fn karatsuba_rec(in1: &[u64], in2: &[u64], out: &mut [u64], scratch: &mut [u64]) {
    let n1 = in1.len();
    let n2 = in2.len();
    debug_assert!(n1 >= n2 && n2 >= 1);
    debug_assert_eq!(out.len(), n1 + n2);
    if n2 < KARATSUBA_MIN {
        schoolbook(in1, in2, out);
        return;
    }

    let half = n1.div_ceil(2);
    let (a0, a1) = in1.split_at(half);

    if n2 <= half {
        // in2 only reaches the low split: two sub-products, no middle term.
        let z1_len = a1.len() + n2;
        let (z1, rest) = scratch.split_at_mut(z1_len);
        karatsuba_ordered(a1, in2, z1, rest);
        karatsuba_ordered(a0, in2, &mut out[..half + n2], rest);
        out[half + n2..].fill(0);
        let z1c = rlz(z1);
        let carry = add_into(&mut out[half..], &z1[..z1c]);
        debug_assert!(!carry);
        return;
    }

    let (b0, b1) = in2.split_at(half);

    // z0 and z2 land directly in the low/high halves of out.
    karatsuba_rec(a0, b0, &mut out[..2 * half], scratch);
    karatsuba_ordered(a1, b1, &mut out[2 * half..], scratch);

    // Middle term (a0+a1)(b0+b1) - z0 - z2, built in scratch.
    let (sums, rest) = scratch.split_at_mut(2 * half + 2);
    let (asum, bsum) = sums.split_at_mut(half + 1);
    let ac = add_half(a0, a1, &mut asum[..half]) as u64;
    asum[half] = ac;
    let bc = add_half(b0, b1, &mut bsum[..half]) as u64;
    bsum[half] = bc;
    let alen = rlz(asum);
    let blen = rlz(bsum);
    let (zm, rest) = rest.split_at_mut(alen + blen);
    karatsuba_ordered(&asum[..alen], &bsum[..blen], zm, rest);

    // Subtract the canonical parts only: zm's buffer can be shorter than
    // the padded z0/z2 regions, never shorter than their values.
    let z0c = rlz(&out[..2 * half]);
    let borrow0 = sub_into(zm, &out[..z0c]);
    let z2c = rlz(&out[2 * half..]);
    let borrow2 = sub_into(zm, &out[2 * half..2 * half + z2c]);
    debug_assert!(!borrow0 && !borrow2);

    let zc = rlz(zm);
    let carry = add_into(&mut out[half..], &zm[..zc]);
    debug_assert!(!carry);
}

/// Entry that restores the `in1 >= in2` ordering before recursing.
fn karatsuba_ordered(x: &[u64], y: &[u64], out: &mut [u64], scratch: &mut [u64]) {
    if x.len() >= y.len() {
        karatsuba_rec(x, y, out, scratch);
    } else {
        karatsuba_rec(y, x, out, scratch);
    }
}

/// Magnitude multiplication with automatic strategy dispatch.
///
/// `out` must hold `in1.len() + in2.len()` words; the canonical result
/// length is recovered with [`rlz`](crate::limbs::rlz). Passing the same
/// slice for both operands takes the squaring path; any other overlap is
/// not supported.
pub fn mul(in1: &[u64], in2: &[u64], out: &mut [u64]) {
    if std::ptr::eq(in1.as_ptr(), in2.as_ptr()) && in1.len() == in2.len() {
        sqr(in1, out);
        return;
    }
    let full = in1.len() + in2.len();
    assert!(out.len() >= full, "mul output buffer too short");
    let l1 = rlz(in1);
    let l2 = rlz(in2);
    let (a, b) = if l1 >= l2 {
        (&in1[..l1], &in2[..l2])
    } else {
        (&in2[..l2], &in1[..l1])
    };
    let (n1, n2) = (a.len(), b.len());
    out[n1 + n2..full].fill(0);
    let out = &mut out[..n1 + n2];

    if n2 < KARATSUBA_MIN {
        schoolbook(a, b, out);
    } else if n1 / n2 >= 2 {
        mul_unbalanced(a, b, out);
    } else if n2 < KARATSUBA_MAX {
        karatsuba(a, b, out);
    } else {
        debug!("mul dispatch: balanced ntt ({n1} x {n2})");
        crt::ntt_mul(a, b, out);
    }
}

/// Chunked unbalanced path, with fallback to the balanced strategy when
/// the chunk formula degenerates for ratios barely above 2.
fn mul_unbalanced(a: &[u64], b: &[u64], out: &mut [u64]) {
    let (n1, n2) = (a.len(), b.len());
    let m = isqrt((n1 / n2) as u64) as usize;
    let min_sum = n2 + n2.max(m);
    let balance_len = min_sum.next_power_of_two();
    let single_len = balance_len - n2;
    if single_len > n1 {
        if n2 < KARATSUBA_MAX {
            karatsuba(a, b, out);
        } else {
            debug!("mul dispatch: balanced ntt, degenerate chunking ({n1} x {n2})");
            crt::ntt_mul(a, b, out);
        }
        return;
    }
    debug!("mul dispatch: chunked ntt ({n1} x {n2}), chunk {single_len}");
    crt::ntt_mul_unbalanced(a, b, m as u64, out);
}

/// Magnitude squaring: same contract as [`mul`] with `in2 == in1`, but a
/// single operand load and one forward transform per NTT lane.
pub fn sqr(input: &[u64], out: &mut [u64]) {
    let full = input.len() * 2;
    assert!(out.len() >= full, "sqr output buffer too short");
    let l = rlz(input);
    let a = &input[..l];
    out[2 * l..full].fill(0);
    let out = &mut out[..2 * l];
    if l < KARATSUBA_MIN {
        schoolbook(a, a, out);
    } else if l < KARATSUBA_MAX {
        karatsuba(a, a, out);
    } else {
        debug!("sqr dispatch: ntt ({l} words)");
        crt::ntt_sqr(a, out);
    }
}
