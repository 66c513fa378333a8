//! Three-prime CRT reassembly and the NTT multiplication drivers.
//!
//! Each convolution coefficient is a sum of word products bounded by
//! `N · (2⁶⁴−1)²`, which stays below `p₁p₂p₃ ≈ 2¹⁹¹` for every supported
//! transform length. The three mod-p residues are recombined with the
//! Garner form of the CRT into a 192-bit value, and a 192-bit carry is
//! streamed down the output: the low word (or, for packed-radix output,
//! the low base-B digit) is emitted and the carry shifts down.

use log::debug;

use crate::limbs::add_into;
use crate::montgomery::{MontPrime, NTT_PRIMES};
use crate::ntt::{conv_rec, conv_single, conv_sqr, TwiddleTable, LONG_THRESHOLD, MAX_NTT_LEN};
use crate::word::{div128_64, mul64_128};

/// `p₁·p₂·p₃`, little-endian.
const MOD123: U192 = U192([
    8610882487532388353,
    1266215182732886016,
    59403314713853952,
]);
/// `p₁·p₂`, `p₂·p₃`, `p₁·p₃`, little-endian 128-bit pairs.
const MOD12: [u64; 2] = [4431542033332568065, 262193940805976064];
const MOD23: [u64; 2] = [6124895493223874561, 440789813528887296];
const MOD13: [u64; 2] = [6665327448508334081, 563231428398022656];
/// Garner inverses in Montgomery form:
/// `mont((p₂p₃)⁻¹ mod p₁)`, `mont((p₁p₃)⁻¹ mod p₂)`, `mont((p₁p₂)⁻¹ mod p₃)`.
const MONT_MOD23_INV1: u64 = 84629344487098392;
const MONT_MOD13_INV2: u64 = 75311807962221426;
const MONT_MOD12_INV3: u64 = 3875284113674644599;

/// Little-endian 192-bit accumulator for CRT reassembly and carry
/// propagation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct U192(pub [u64; 3]);

impl U192 {
    pub const ZERO: U192 = U192([0, 0, 0]);

    #[inline]
    fn lt(&self, rhs: &U192) -> bool {
        if self.0[2] != rhs.0[2] {
            return self.0[2] < rhs.0[2];
        }
        if self.0[1] != rhs.0[1] {
            return self.0[1] < rhs.0[1];
        }
        self.0[0] < rhs.0[0]
    }

    #[inline]
    pub(crate) fn add_assign(&mut self, rhs: &U192) {
        let (s0, c0) = self.0[0].overflowing_add(rhs.0[0]);
        let (s1a, c1a) = self.0[1].overflowing_add(c0 as u64);
        let (s1, c1b) = s1a.overflowing_add(rhs.0[1]);
        self.0[0] = s0;
        self.0[1] = s1;
        self.0[2] = self.0[2]
            .wrapping_add(rhs.0[2])
            .wrapping_add(c1a as u64 + c1b as u64);
    }

    #[inline]
    fn sub_assign(&mut self, rhs: &U192) {
        let (d0, b0) = self.0[0].overflowing_sub(rhs.0[0]);
        let (d1a, b1a) = self.0[1].overflowing_sub(b0 as u64);
        let (d1, b1b) = d1a.overflowing_sub(rhs.0[1]);
        self.0[0] = d0;
        self.0[1] = d1;
        self.0[2] = self.0[2]
            .wrapping_sub(rhs.0[2])
            .wrapping_sub(b1a as u64 + b1b as u64);
    }

    /// `u128 × u64 → u192`, exact.
    #[inline]
    fn from_mul_128_64(x: &[u64; 2], y: u64) -> U192 {
        let (lo0, hi0) = mul64_128(x[0], y);
        let (lo1, hi1) = mul64_128(x[1], y);
        let (mid, c) = hi0.overflowing_add(lo1);
        U192([lo0, mid, hi1 + c as u64])
    }

    /// Drop the low word: `self >>= 64`.
    #[inline]
    fn shr_word(&mut self) {
        self.0[0] = self.0[1];
        self.0[1] = self.0[2];
        self.0[2] = 0;
    }

    /// `self += a * b` with a full 128-bit partial product.
    #[inline]
    pub(crate) fn add_mul_word(&mut self, a: u64, b: u64) {
        let (lo, hi) = mul64_128(a, b);
        self.add_assign(&U192([lo, hi, 0]));
    }

    /// In-place division by a word: `self /= d`, returns `self % d`.
    /// Requires `d > 1`.
    #[inline]
    pub(crate) fn div_rem_word(&mut self, d: u64) -> u64 {
        let q2 = self.0[2] / d;
        let r2 = self.0[2] % d;
        let (q1, r1) = div128_64(r2, self.0[1], d);
        let (q0, r0) = div128_64(r1, self.0[0], d);
        self.0 = [q0, q1, q2];
        r0
    }
}

/// Reassemble residues `(a mod p₁, b mod p₂, c mod p₃)` into the unique
/// 192-bit value below `p₁p₂p₃`. Residues may be in the lazy `[0, 4p)`
/// range the convolutions emit.
pub(crate) fn crt3(a: u64, b: u64, c: u64) -> U192 {
    let p = &NTT_PRIMES;
    let ra = p[0].from_mont(p[0].mul_lazy(a, MONT_MOD23_INV1));
    let rb = p[1].from_mont(p[1].mul_lazy(b, MONT_MOD13_INV2));
    let rc = p[2].from_mont(p[2].mul_lazy(c, MONT_MOD12_INV3));

    let mut res = U192::from_mul_128_64(&MOD23, ra);
    res.add_assign(&U192::from_mul_128_64(&MOD13, rb));
    res.add_assign(&U192::from_mul_128_64(&MOD12, rc));
    if !res.lt(&MOD123) {
        res.sub_assign(&MOD123);
    }
    if !res.lt(&MOD123) {
        res.sub_assign(&MOD123);
    }
    res
}

/// One prime lane: operand loading, convolution, and the per-lane table.
struct Lane<'a> {
    prime: &'a MontPrime,
    buf: Vec<u64>,
}

impl<'a> Lane<'a> {
    fn new(prime: &'a MontPrime, ntt_len: usize) -> Self {
        Lane {
            prime,
            buf: vec![0; ntt_len],
        }
    }

    /// Load a magnitude into Mont-form, zero-padding the transform tail.
    fn load(&mut self, words: &[u64]) {
        for (dst, &src) in self.buf.iter_mut().zip(words) {
            *dst = self.prime.to_mont(src);
        }
        self.buf[words.len()..].fill(0);
    }
}

fn transform_geometry(conv_len: usize) -> (usize, usize) {
    let ntt_len = conv_len.next_power_of_two().max(2);
    assert!(
        ntt_len <= MAX_NTT_LEN,
        "operands exceed the supported transform length"
    );
    (ntt_len, ntt_len.min(LONG_THRESHOLD))
}

/// Stream the CRT carry over all three lanes, emitting binary words.
fn crt_emit_binary(lanes: &[Lane; 3], conv_len: usize, out: &mut [u64]) {
    let mut carry = U192::ZERO;
    for ii in 0..conv_len {
        let t = crt3(lanes[0].buf[ii], lanes[1].buf[ii], lanes[2].buf[ii]);
        carry.add_assign(&t);
        out[ii] = carry.0[0];
        carry.shr_word();
    }
    out[conv_len] = carry.0[0];
}

/// Stream the CRT carry emitting packed base-`base` digits.
fn crt_emit_base(lanes: &[Lane; 3], conv_len: usize, out: &mut [u64], base: u64) {
    let mut carry = U192::ZERO;
    for ii in 0..conv_len {
        let t = crt3(lanes[0].buf[ii], lanes[1].buf[ii], lanes[2].buf[ii]);
        carry.add_assign(&t);
        out[ii] = carry.div_rem_word(base);
    }
    out[conv_len] = carry.div_rem_word(base);
}

/// Balanced 3-prime NTT multiplication: `out[..n1+n2] = in1 * in2`.
pub fn ntt_mul(in1: &[u64], in2: &[u64], out: &mut [u64]) {
    if std::ptr::eq(in1.as_ptr(), in2.as_ptr()) && in1.len() == in2.len() {
        ntt_sqr(in1, out);
        return;
    }
    let out_len = in1.len() + in2.len();
    assert!(out.len() >= out_len, "ntt_mul output buffer too short");
    let conv_len = out_len - 1;
    let (ntt_len, table_len) = transform_geometry(conv_len);
    debug!("ntt_mul: {} x {} words, transform {ntt_len}", in1.len(), in2.len());

    let mut table = TwiddleTable::new(table_len);
    let mut lanes = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];
    let mut tmp = vec![0u64; ntt_len];
    for lane in lanes.iter_mut() {
        lane.load(in1);
        for (dst, &src) in tmp.iter_mut().zip(in2) {
            *dst = lane.prime.to_mont(src);
        }
        tmp[in2.len()..].fill(0);
        table.rebuild(lane.prime);
        let p = lane.prime;
        conv_rec(p, &mut lane.buf, &mut tmp, &table, true);
    }
    crt_emit_binary(&lanes, conv_len, out);
}

/// NTT squaring: one forward transform per lane.
pub fn ntt_sqr(input: &[u64], out: &mut [u64]) {
    let out_len = input.len() * 2;
    assert!(out.len() >= out_len, "ntt_sqr output buffer too short");
    let conv_len = out_len - 1;
    let (ntt_len, table_len) = transform_geometry(conv_len);
    debug!("ntt_sqr: {} words, transform {ntt_len}", input.len());

    let mut table = TwiddleTable::new(table_len);
    let mut lanes = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];
    for lane in lanes.iter_mut() {
        lane.load(input);
        table.rebuild(lane.prime);
        let p = lane.prime;
        conv_sqr(p, &mut lane.buf, &table, true);
    }
    crt_emit_binary(&lanes, conv_len, out);
}

/// NTT multiplication emitting packed base-`base` digits instead of
/// binary words. `out` receives `n1 + n2` digit words.
pub fn ntt_mul_base(in1: &[u64], in2: &[u64], out: &mut [u64], base: u64) {
    if std::ptr::eq(in1.as_ptr(), in2.as_ptr()) && in1.len() == in2.len() {
        ntt_sqr_base(in1, out, base);
        return;
    }
    let out_len = in1.len() + in2.len();
    assert!(out.len() >= out_len, "ntt_mul_base output buffer too short");
    let conv_len = out_len - 1;
    let (ntt_len, table_len) = transform_geometry(conv_len);

    let mut table = TwiddleTable::new(table_len);
    let mut lanes = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];
    let mut tmp = vec![0u64; ntt_len];
    for lane in lanes.iter_mut() {
        lane.load(in1);
        for (dst, &src) in tmp.iter_mut().zip(in2) {
            *dst = lane.prime.to_mont(src);
        }
        tmp[in2.len()..].fill(0);
        table.rebuild(lane.prime);
        let p = lane.prime;
        conv_rec(p, &mut lane.buf, &mut tmp, &table, true);
    }
    crt_emit_base(&lanes, conv_len, out, base);
}

/// NTT squaring with packed base-`base` digit output.
pub fn ntt_sqr_base(input: &[u64], out: &mut [u64], base: u64) {
    let out_len = input.len() * 2;
    assert!(out.len() >= out_len, "ntt_sqr_base output buffer too short");
    let conv_len = out_len - 1;
    let (ntt_len, table_len) = transform_geometry(conv_len);

    let mut table = TwiddleTable::new(table_len);
    let mut lanes = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];
    for lane in lanes.iter_mut() {
        lane.load(input);
        table.rebuild(lane.prime);
        let p = lane.prime;
        conv_sqr(p, &mut lane.buf, &table, true);
    }
    crt_emit_base(&lanes, conv_len, out, base);
}

/// Chunked multiplication for unbalanced operands (`in1.len() > in2.len()`).
///
/// `in2` is transformed once per prime and cached in the frequency
/// domain; `in1` is walked in `single_len`-word chunks, each convolved
/// against the cached transforms and accumulated into `out` at its chunk
/// offset. `m` is the caller's unbalance hint `⌊√(n₁/n₂)⌋`.
///
/// The final partial chunk adds exactly `n₂ + rem` words so the
/// accumulation never writes past `out[n₁ + n₂]`.
pub fn ntt_mul_unbalanced(in1: &[u64], in2: &[u64], m: u64, out: &mut [u64]) {
    let len1 = in1.len();
    let len2 = in2.len();
    assert!(len1 > len2, "unbalanced multiply requires in1 longer than in2");
    assert!(out.len() >= len1 + len2, "ntt_mul_unbalanced output buffer too short");

    let min_sum = len2 + len2.max(m as usize);
    let balance_len = min_sum.next_power_of_two();
    let single_len = balance_len - len2;
    assert!(
        single_len >= 1 && single_len <= len1,
        "degenerate chunk geometry; use the balanced path"
    );
    let conv_len = balance_len - 1;
    let (ntt_len, table_len) = transform_geometry(conv_len);
    let rem = len1 % single_len;
    debug!(
        "ntt_mul_unbalanced: {len1} x {len2} words, chunk {single_len}, transform {ntt_len}"
    );

    // One table per lane: the cached in2 transforms outlive lane switches.
    let mut tables = Vec::with_capacity(3);
    for p in &NTT_PRIMES {
        let mut t = TwiddleTable::new(table_len);
        t.rebuild(p);
        tables.push(t);
    }

    let mut cached = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];
    let mut chunks = [
        Lane::new(&NTT_PRIMES[0], ntt_len),
        Lane::new(&NTT_PRIMES[1], ntt_len),
        Lane::new(&NTT_PRIMES[2], ntt_len),
    ];

    // First chunk: conv_rec both convolves and leaves the in2 lanes
    // transformed for every later chunk.
    for i in 0..3 {
        cached[i].load(in2);
        chunks[i].load(&in1[..single_len]);
        let p = chunks[i].prime;
        conv_rec(p, &mut chunks[i].buf, &mut cached[i].buf, &tables[i], true);
    }
    crt_emit_binary(&chunks, conv_len, &mut out[..balance_len]);

    let mut balance_prod = vec![0u64; balance_len];
    let mut offset = single_len;
    while offset < len1 - rem {
        for i in 0..3 {
            chunks[i].load(&in1[offset..offset + single_len]);
            let p = chunks[i].prime;
            conv_single(p, &cached[i].buf, &mut chunks[i].buf, &tables[i], true);
        }
        crt_emit_binary(&chunks, conv_len, &mut balance_prod);
        // prod + current high words; the sum is a prefix of the final
        // product, so the top carry is always absorbed.
        let carry = add_into(&mut balance_prod, &out[offset..offset + len2]);
        debug_assert!(!carry);
        out[offset..offset + balance_len].copy_from_slice(&balance_prod);
        offset += single_len;
    }

    if rem > 0 {
        for i in 0..3 {
            chunks[i].load(&in1[offset..]);
            let p = chunks[i].prime;
            conv_single(p, &cached[i].buf, &mut chunks[i].buf, &tables[i], true);
        }
        crt_emit_binary(&chunks, conv_len, &mut balance_prod);
        // The tail writes len2 + rem words only; widening the extent to a
        // full chunk here would run past the end of out.
        let tail = len2 + rem;
        let carry = add_into(&mut balance_prod[..tail], &out[offset..offset + len2]);
        debug_assert!(!carry);
        out[offset..offset + tail].copy_from_slice(&balance_prod[..tail]);
    }
}
