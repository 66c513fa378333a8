//! Number-theoretic transforms over the three Montgomery primes.
//!
//! The forward transform is decimation-in-frequency and leaves its output
//! in bit-reversed order; the inverse is decimation-in-time consuming that
//! same order, so pointwise multiplication needs no permutation pass.
//!
//! Transforms no longer than the twiddle table run fully in core: a
//! radix-4 rank loop down to rank 16 followed by one radix-4 or radix-8
//! short-kernel pass (by parity of `log2 N`). Longer convolutions recurse:
//! one radix-4 DIF layer at length `N` with on-the-fly twiddles, three
//! sub-convolutions at `N/2`, `N/4`, `N/4`, and the mirrored inverse
//! layer. Each sub-convolution completes transform → pointwise → inverse,
//! so twiddle storage never exceeds the in-core threshold.
//!
//! All arithmetic is lazy Montgomery: butterflies keep values in
//! `[0, 4p)` and renormalise just often enough that every product operand
//! satisfies the REDC bound. The sequences below mirror that discipline
//! op for op; reordering "equivalent" steps can silently widen a range.

use crate::montgomery::MontPrime;

/// In-core transform length bound: `2^17` Mont-words (one L2's worth).
pub const LONG_THRESHOLD: usize = 131072;

/// Hard bound on any transform length; the primes supply roots of order
/// up to `2^23`.
pub const MAX_NTT_LEN: usize = 1 << 23;

/// Forward/inverse root table for one prime lane.
///
/// Roots of order `2^i` occupy offsets `[2^(i-1), 2^i)`; the table serves
/// every rank of an in-core transform up to its length. The same backing
/// storage is refilled when the engine switches prime lanes.
pub(crate) struct TwiddleTable {
    len: usize,
    omega: Vec<u64>,
    iomega: Vec<u64>,
}

impl TwiddleTable {
    /// Allocate a table for in-core transforms of `len` words
    /// (a power of two, at most [`LONG_THRESHOLD`]).
    pub(crate) fn new(len: usize) -> Self {
        assert!(len.is_power_of_two() && len <= LONG_THRESHOLD);
        TwiddleTable {
            len,
            omega: vec![0; len],
            iomega: vec![0; len],
        }
    }

    /// Transform length this table serves.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Refill both root tables for the given prime lane.
    pub(crate) fn rebuild(&mut self, p: &MontPrime) {
        self.omega[0] = 0;
        self.iomega[0] = 0;
        let log_len = self.len.trailing_zeros();
        for order_log in 1..=log_len {
            let order = 1usize << order_log;
            let count = order / 2;
            let step_f = p.pow(p.mont_root, (p.modulus - 1) / order as u64);
            let step_i = p.pow(p.mont_root_inv, (p.modulus - 1) / order as u64);
            let mut cur_f = p.one;
            let mut cur_i = p.one;
            for ii in 0..count {
                self.omega[count + ii] = cur_f;
                cur_f = p.mul(cur_f, step_f);
                self.iomega[count + ii] = cur_i;
                cur_i = p.mul(cur_i, step_i);
            }
        }
    }

    #[inline]
    fn omega(&self, rank: usize) -> &[u64] {
        &self.omega[rank / 2..rank]
    }

    #[inline]
    fn iomega(&self, rank: usize) -> &[u64] {
        &self.iomega[rank / 2..rank]
    }
}

/// `(a, b) <- (a + b, a - b)` in the lazy range.
#[inline(always)]
fn transform2(p: &MontPrime, a: &mut u64, b: &mut u64) {
    let t = *a;
    let u = *b;
    *a = p.add_lazy(t, u);
    *b = p.sub_lazy(t, u);
}

/// DIF butterfly with twiddle on the difference lane.
#[inline(always)]
fn dif_butterfly2(p: &MontPrime, r0: &mut u64, r1: &mut u64, o: u64) {
    let x = p.add_lazy(*r0, *r1);
    let y = p.raw_sub(*r0, *r1);
    *r0 = x;
    *r1 = p.mul_lazy(y, o);
}

/// DIT butterfly with twiddle on the second input lane.
#[inline(always)]
fn dit_butterfly2(p: &MontPrime, r0: &mut u64, r1: &mut u64, o: u64) {
    let x = p.norm2(*r0);
    let y = p.mul_lazy(*r1, o);
    *r0 = p.raw_add(x, y);
    *r1 = p.raw_sub(x, y);
}

fn dif2_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 2 {
        return;
    }
    let (a, b) = v.split_at_mut(1);
    transform2(p, &mut a[0], &mut b[0]);
}

fn dif4(p: &MontPrime, v: &mut [u64]) {
    let (mut t0, mut t1, mut t2, mut t3) = (v[0], v[1], v[2], v[3]);
    transform2(p, &mut t0, &mut t2);
    transform2(p, &mut t1, &mut t3);
    t3 = p.mul_lazy(t3, p.w41);
    v[0] = p.add_lazy(t0, t1);
    v[1] = p.sub_lazy(t0, t1);
    v[2] = p.add_lazy(t2, t3);
    v[3] = p.sub_lazy(t2, t3);
}

fn dif4_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 4 {
        dif2_len(p, v);
        return;
    }
    dif4(p, &mut v[..4]);
}

fn dif8(p: &MontPrime, v: &mut [u64]) {
    let (mut t0, mut t1, mut t2, mut t3) = (v[0], v[1], v[2], v[3]);
    let (mut t4, mut t5, mut t6, mut t7) = (v[4], v[5], v[6], v[7]);
    transform2(p, &mut t0, &mut t4);
    transform2(p, &mut t1, &mut t5);
    transform2(p, &mut t2, &mut t6);
    transform2(p, &mut t3, &mut t7);
    t5 = p.mul_lazy(t5, p.w1);
    t6 = p.mul_lazy(t6, p.w2);
    t7 = p.mul_lazy(t7, p.w3);
    transform2(p, &mut t0, &mut t2);
    transform2(p, &mut t1, &mut t3);
    transform2(p, &mut t4, &mut t6);
    transform2(p, &mut t5, &mut t7);
    t3 = p.mul_lazy(t3, p.w41);
    t7 = p.mul_lazy(t7, p.w41);
    v[0] = p.add_lazy(t0, t1);
    v[1] = p.sub_lazy(t0, t1);
    v[2] = p.add_lazy(t2, t3);
    v[3] = p.sub_lazy(t2, t3);
    v[4] = p.add_lazy(t4, t5);
    v[5] = p.sub_lazy(t4, t5);
    v[6] = p.add_lazy(t6, t7);
    v[7] = p.sub_lazy(t6, t7);
}

fn dif8_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 8 {
        dif4_len(p, v);
        return;
    }
    dif8(p, &mut v[..8]);
}

fn dit4(p: &MontPrime, v: &mut [u64]) {
    let (mut t0, mut t1, mut t2, mut t3) = (v[0], v[1], v[2], v[3]);
    transform2(p, &mut t0, &mut t1);
    transform2(p, &mut t2, &mut t3);
    t3 = p.mul_lazy(t3, p.w41_inv);
    v[0] = p.add_lazy(t0, t2);
    v[1] = p.add_lazy(t1, t3);
    v[2] = p.sub_lazy(t0, t2);
    v[3] = p.sub_lazy(t1, t3);
}

fn dit2_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 2 {
        return;
    }
    let (a, b) = v.split_at_mut(1);
    transform2(p, &mut a[0], &mut b[0]);
}

fn dit4_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 4 {
        dit2_len(p, v);
        return;
    }
    dit4(p, &mut v[..4]);
}

fn dit8(p: &MontPrime, v: &mut [u64]) {
    let (mut t0, mut t1, mut t2, mut t3) = (v[0], v[1], v[2], v[3]);
    let (mut t4, mut t5, mut t6, mut t7) = (v[4], v[5], v[6], v[7]);
    transform2(p, &mut t0, &mut t1);
    transform2(p, &mut t2, &mut t3);
    transform2(p, &mut t4, &mut t5);
    transform2(p, &mut t6, &mut t7);
    t3 = p.mul_lazy(t3, p.w41_inv);
    t7 = p.mul_lazy(t7, p.w41_inv);
    transform2(p, &mut t0, &mut t2);
    transform2(p, &mut t1, &mut t3);
    transform2(p, &mut t4, &mut t6);
    transform2(p, &mut t5, &mut t7);
    t5 = p.mul_lazy(t5, p.w1_inv);
    t6 = p.mul_lazy(t6, p.w2_inv);
    t7 = p.mul_lazy(t7, p.w3_inv);
    v[0] = p.add_lazy(t0, t4);
    v[1] = p.add_lazy(t1, t5);
    v[2] = p.add_lazy(t2, t6);
    v[3] = p.add_lazy(t3, t7);
    v[4] = p.sub_lazy(t0, t4);
    v[5] = p.sub_lazy(t1, t5);
    v[6] = p.sub_lazy(t2, t6);
    v[7] = p.sub_lazy(t3, t7);
}

fn dit8_len(p: &MontPrime, v: &mut [u64]) {
    if v.len() < 8 {
        dit4_len(p, v);
        return;
    }
    dit8(p, &mut v[..8]);
}

/// In-core forward DIF transform of the whole slice (bit-reversed output).
pub(crate) fn dif(p: &MontPrime, table: &TwiddleTable, v: &mut [u64]) {
    let len = v.len();
    debug_assert!(len <= table.len());
    let mut rank = len;
    while rank >= 16 {
        let gap = rank / 4;
        let omega_rank = table.omega(rank);
        let omega_last = table.omega(rank / 2);
        for jj in (0..len).step_by(rank) {
            for ii in 0..gap {
                let i0 = jj + ii;
                let (mut t0, mut t1, mut t2, mut t3) =
                    (v[i0], v[i0 + gap], v[i0 + 2 * gap], v[i0 + 3 * gap]);
                let omega = omega_last[ii];
                dif_butterfly2(p, &mut t0, &mut t2, omega_rank[ii]);
                dif_butterfly2(p, &mut t1, &mut t3, omega_rank[gap + ii]);
                dif_butterfly2(p, &mut t0, &mut t1, omega);
                dif_butterfly2(p, &mut t2, &mut t3, omega);
                v[i0] = t0;
                v[i0 + gap] = t1;
                v[i0 + 2 * gap] = t2;
                v[i0 + 3 * gap] = t3;
            }
        }
        rank /= 4;
    }
    if rank.trailing_zeros() % 2 == 0 {
        dif4_len(p, v);
        let mut ii = 4;
        while ii < len {
            dif4(p, &mut v[ii..ii + 4]);
            ii += 4;
        }
    } else {
        dif8_len(p, v);
        let mut ii = 8;
        while ii < len {
            dif8(p, &mut v[ii..ii + 8]);
            ii += 8;
        }
    }
}

/// In-core inverse DIT transform (consumes bit-reversed order).
pub(crate) fn idit(p: &MontPrime, table: &TwiddleTable, v: &mut [u64]) {
    let len = v.len();
    debug_assert!(len <= table.len());
    let mut rank;
    if len.trailing_zeros() % 2 == 0 {
        dit4_len(p, v);
        let mut ii = 4;
        while ii < len {
            dit4(p, &mut v[ii..ii + 4]);
            ii += 4;
        }
        rank = 16;
    } else {
        dit8_len(p, v);
        let mut ii = 8;
        while ii < len {
            dit8(p, &mut v[ii..ii + 8]);
            ii += 8;
        }
        rank = 32;
    }
    while rank <= len {
        let gap = rank / 4;
        let iomega_rank = table.iomega(rank);
        let iomega_last = table.iomega(rank / 2);
        for jj in (0..len).step_by(rank) {
            for ii in 0..gap {
                let i0 = jj + ii;
                let (mut t0, mut t1, mut t2, mut t3) =
                    (v[i0], v[i0 + gap], v[i0 + 2 * gap], v[i0 + 3 * gap]);
                let omega = iomega_last[ii];
                dit_butterfly2(p, &mut t0, &mut t1, omega);
                dit_butterfly2(p, &mut t2, &mut t3, omega);
                dit_butterfly2(p, &mut t0, &mut t2, iomega_rank[ii]);
                dit_butterfly2(p, &mut t1, &mut t3, iomega_rank[gap + ii]);
                v[i0] = t0;
                v[i0 + gap] = t1;
                v[i0 + 2 * gap] = t2;
                v[i0 + 3 * gap] = t3;
            }
        }
        rank *= 4;
    }
}

/// One radix-4 DIF splitting layer; quarters 2 and 3 come out twiddled.
#[inline(always)]
fn dif_butterfly244(p: &MontPrime, r: &mut [u64; 4]) {
    let t0 = p.raw_add(r[0], r[2]);
    let t2 = p.sub_lazy(r[0], r[2]);
    let t1 = p.raw_add(r[1], r[3]);
    let t3 = p.mul_lazy(p.raw_sub(r[1], r[3]), p.w41);
    r[0] = p.norm2(t0);
    r[1] = p.norm2(t1);
    r[2] = p.raw_add(t2, t3);
    r[3] = p.raw_sub(t2, t3);
}

/// Inverse of [`dif_butterfly244`]; inputs already de-twiddled.
#[inline(always)]
fn idit_butterfly244(p: &MontPrime, r: &mut [u64; 4]) {
    let t0 = p.norm2(r[0]);
    let t1 = p.norm2(r[1]);
    let t2 = p.add_lazy(r[2], r[3]);
    let t3 = p.mul_lazy(p.raw_sub(r[2], r[3]), p.w41_inv);
    r[0] = p.raw_add(t0, t2);
    r[2] = p.raw_sub(t0, t2);
    r[1] = p.raw_add(t1, t3);
    r[3] = p.raw_sub(t1, t3);
}

/// Roots of order `len` for the splitting layer: `(ω, ω³)` forward or the
/// inverse pair.
fn layer_units(p: &MontPrime, len: usize, inverse: bool) -> (u64, u64) {
    let g = if inverse { p.mont_root_inv } else { p.mont_root };
    let unit1 = p.pow(g, (p.modulus - 1) / len as u64);
    let unit3 = p.pow(unit1, 3);
    (unit1, unit3)
}

/// Forward splitting layer over one buffer.
fn forward_layer(p: &MontPrime, v: &mut [u64]) {
    let len = v.len();
    let quarter = len / 4;
    let (unit1, unit3) = layer_units(p, len, false);
    let mut omega1 = p.one;
    let mut omega3 = p.one;
    for ii in 0..quarter {
        let mut r = [v[ii], v[quarter + ii], v[2 * quarter + ii], v[3 * quarter + ii]];
        dif_butterfly244(p, &mut r);
        v[ii] = r[0];
        v[quarter + ii] = r[1];
        v[2 * quarter + ii] = p.mul_lazy(r[2], omega1);
        v[3 * quarter + ii] = p.mul_lazy(r[3], omega3);
        omega1 = p.mul(omega1, unit1);
        omega3 = p.mul(omega3, unit3);
    }
}

/// Inverse merging layer over one buffer; applies `1/len` when `norm`.
fn inverse_layer(p: &MontPrime, v: &mut [u64], norm: bool) {
    let len = v.len();
    let quarter = len / 4;
    let (unit1, unit3) = layer_units(p, len, true);
    if norm {
        let inv_len = p.inv_len(len as u64);
        let mut omega1 = inv_len;
        let mut omega3 = inv_len;
        for ii in 0..quarter {
            let mut r = [
                p.mul_lazy(v[ii], inv_len),
                p.mul_lazy(v[quarter + ii], inv_len),
                p.mul_lazy(v[2 * quarter + ii], omega1),
                p.mul_lazy(v[3 * quarter + ii], omega3),
            ];
            idit_butterfly244(p, &mut r);
            v[ii] = r[0];
            v[quarter + ii] = r[1];
            v[2 * quarter + ii] = r[2];
            v[3 * quarter + ii] = r[3];
            omega1 = p.mul(omega1, unit1);
            omega3 = p.mul(omega3, unit3);
        }
    } else {
        let mut omega1 = p.one;
        let mut omega3 = p.one;
        for ii in 0..quarter {
            let mut r = [
                v[ii],
                v[quarter + ii],
                p.mul_lazy(v[2 * quarter + ii], omega1),
                p.mul_lazy(v[3 * quarter + ii], omega3),
            ];
            idit_butterfly244(p, &mut r);
            v[ii] = r[0];
            v[quarter + ii] = r[1];
            v[2 * quarter + ii] = r[2];
            v[3 * quarter + ii] = r[3];
            omega1 = p.mul(omega1, unit1);
            omega3 = p.mul(omega3, unit3);
        }
    }
}

/// Cyclic convolution of `a` and `b` (both in Mont-form), result in `a`.
/// Both buffers are consumed (left fully transformed / overwritten).
/// `norm` applies the `1/len` factor exactly once, at this level.
pub(crate) fn conv_rec(
    p: &MontPrime,
    a: &mut [u64],
    b: &mut [u64],
    table: &TwiddleTable,
    norm: bool,
) {
    let len = a.len();
    debug_assert_eq!(len, b.len());
    debug_assert!(len.is_power_of_two());
    if len <= table.len() {
        dif(p, table, a);
        dif(p, table, b);
        if norm {
            let inv_len = p.inv_len(len as u64);
            for ii in 0..len {
                a[ii] = p.mul(p.mul_lazy(a[ii], b[ii]), inv_len);
            }
        } else {
            for ii in 0..len {
                a[ii] = p.mul_lazy(a[ii], b[ii]);
            }
        }
        idit(p, table, a);
        return;
    }

    let quarter = len / 4;
    forward_layer(p, a);
    forward_layer(p, b);

    let (a_half, a_rest) = a.split_at_mut(2 * quarter);
    let (a2, a3) = a_rest.split_at_mut(quarter);
    let (b_half, b_rest) = b.split_at_mut(2 * quarter);
    let (b2, b3) = b_rest.split_at_mut(quarter);
    conv_rec(p, a_half, b_half, table, false);
    conv_rec(p, a2, b2, table, false);
    conv_rec(p, a3, b3, table, false);

    inverse_layer(p, a, norm);
}

/// Convolution against a cached operand: `a` was transformed in place by a
/// previous [`conv_rec`]/[`conv_single`] call at the same length and is
/// read-only here. Result lands in `b`.
pub(crate) fn conv_single(
    p: &MontPrime,
    a: &[u64],
    b: &mut [u64],
    table: &TwiddleTable,
    norm: bool,
) {
    let len = b.len();
    debug_assert_eq!(len, a.len());
    if len <= table.len() {
        dif(p, table, b);
        if norm {
            let inv_len = p.inv_len(len as u64);
            for ii in 0..len {
                b[ii] = p.mul(p.mul_lazy(a[ii], b[ii]), inv_len);
            }
        } else {
            for ii in 0..len {
                b[ii] = p.mul_lazy(a[ii], b[ii]);
            }
        }
        idit(p, table, b);
        return;
    }

    let quarter = len / 4;
    forward_layer(p, b);

    let (a_half, a_rest) = a.split_at(2 * quarter);
    let (a2, a3) = a_rest.split_at(quarter);
    let (b_half, b_rest) = b.split_at_mut(2 * quarter);
    let (b2, b3) = b_rest.split_at_mut(quarter);
    conv_single(p, a_half, b_half, table, false);
    conv_single(p, a2, b2, table, false);
    conv_single(p, a3, b3, table, false);

    inverse_layer(p, b, norm);
}

/// Cyclic self-convolution, in place: one forward transform per level.
pub(crate) fn conv_sqr(p: &MontPrime, a: &mut [u64], table: &TwiddleTable, norm: bool) {
    let len = a.len();
    if len <= table.len() {
        dif(p, table, a);
        if norm {
            let inv_len = p.inv_len(len as u64);
            for ii in 0..len {
                a[ii] = p.mul(p.mul_lazy(a[ii], a[ii]), inv_len);
            }
        } else {
            for ii in 0..len {
                a[ii] = p.mul_lazy(a[ii], a[ii]);
            }
        }
        idit(p, table, a);
        return;
    }

    let quarter = len / 4;
    forward_layer(p, a);

    let (a_half, a_rest) = a.split_at_mut(2 * quarter);
    let (a2, a3) = a_rest.split_at_mut(quarter);
    conv_sqr(p, a_half, table, false);
    conv_sqr(p, a2, table, false);
    conv_sqr(p, a3, table, false);

    inverse_layer(p, a, norm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::montgomery::NTT_PRIMES;

    /// Reference cyclic convolution mod p, over plain integers.
    fn cyclic_reference(p: &MontPrime, a: &[u64], b: &[u64]) -> Vec<u64> {
        let n = a.len();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                let k = (i + j) % n;
                let prod = (a[i] as u128 * b[j] as u128) % p.modulus as u128;
                out[k] = ((out[k] as u128 + prod) % p.modulus as u128) as u64;
            }
        }
        out
    }

    fn to_mont_vec(p: &MontPrime, v: &[u64]) -> Vec<u64> {
        v.iter().map(|&x| p.to_mont(x)).collect()
    }

    fn from_mont_vec(p: &MontPrime, v: &[u64]) -> Vec<u64> {
        v.iter().map(|&x| p.from_mont(x)).collect()
    }

    fn test_data(n: usize, seed: u64) -> Vec<u64> {
        let mut s = seed | 1;
        (0..n)
            .map(|_| {
                s ^= s << 13;
                s ^= s >> 7;
                s ^= s << 17;
                s
            })
            .collect()
    }

    #[test]
    fn test_dif_idit_roundtrip() {
        for p in &NTT_PRIMES {
            for n in [2usize, 4, 8, 16, 32, 64, 256] {
                let data = test_data(n, n as u64);
                let mut table = TwiddleTable::new(n);
                table.rebuild(p);
                let mut v = to_mont_vec(p, &data);
                dif(p, &table, &mut v);
                idit(p, &table, &mut v);
                let inv_n = p.inv_len(n as u64);
                let back: Vec<u64> = v
                    .iter()
                    .map(|&x| p.from_mont(p.mul(p.norm2(x), inv_n)))
                    .collect();
                let want: Vec<u64> = data.iter().map(|&x| x % p.modulus).collect();
                assert_eq!(back, want, "roundtrip failed n={n} p={}", p.modulus);
            }
        }
    }

    #[test]
    fn test_conv_rec_in_core() {
        for p in &NTT_PRIMES {
            for n in [4usize, 8, 64, 128] {
                let a = test_data(n, 3);
                let b = test_data(n, 5);
                let want = cyclic_reference(p, &a, &b);
                let mut am = to_mont_vec(p, &a);
                let mut bm = to_mont_vec(p, &b);
                let mut table = TwiddleTable::new(n);
                table.rebuild(p);
                conv_rec(p, &mut am, &mut bm, &table, true);
                let got: Vec<u64> = from_mont_vec(p, &am);
                assert_eq!(got, want, "conv mismatch n={n} p={}", p.modulus);
            }
        }
    }

    #[test]
    fn test_conv_rec_long_recursion() {
        // An undersized table forces the splitting recursion; the result
        // must match the fully in-core convolution.
        for p in &NTT_PRIMES {
            let n = 256;
            let a = test_data(n, 7);
            let b = test_data(n, 11);
            let want = cyclic_reference(p, &a, &b);
            let mut am = to_mont_vec(p, &a);
            let mut bm = to_mont_vec(p, &b);
            let mut small = TwiddleTable::new(32);
            small.rebuild(p);
            conv_rec(p, &mut am, &mut bm, &small, true);
            let got = from_mont_vec(p, &am);
            assert_eq!(got, want, "recursive conv mismatch p={}", p.modulus);
        }
    }

    #[test]
    fn test_conv_single_reuses_transform() {
        for p in &NTT_PRIMES {
            for table_len in [64usize, 16] {
                let n = 64;
                let a = test_data(n, 13);
                let b = test_data(n, 17);
                let c = test_data(n, 19);
                let mut am = to_mont_vec(p, &a);
                let mut bm = to_mont_vec(p, &b);
                let mut table = TwiddleTable::new(table_len);
                table.rebuild(p);
                // First convolution leaves `am` transformed ...
                conv_rec(p, &mut bm, &mut am, &table, true);
                assert_eq!(from_mont_vec(p, &bm), cyclic_reference(p, &a, &b));
                // ... which conv_single then multiplies against.
                let mut cm = to_mont_vec(p, &c);
                conv_single(p, &am, &mut cm, &table, true);
                assert_eq!(
                    from_mont_vec(p, &cm),
                    cyclic_reference(p, &a, &c),
                    "conv_single mismatch table={table_len} p={}",
                    p.modulus
                );
            }
        }
    }

    #[test]
    fn test_conv_sqr_matches_conv_rec() {
        for p in &NTT_PRIMES {
            for table_len in [128usize, 32] {
                let n = 128;
                let a = test_data(n, 23);
                let want = cyclic_reference(p, &a, &a);
                let mut am = to_mont_vec(p, &a);
                let mut table = TwiddleTable::new(table_len);
                table.rebuild(p);
                conv_sqr(p, &mut am, &table, true);
                assert_eq!(from_mont_vec(p, &am), want);
            }
        }
    }
}
