//! Property-based tests for the arithmetic core
//!
//! These use proptest to validate the algebraic identities every layer
//! must preserve: add/sub round trips, multiplication symmetry and the
//! squaring path, the division identity, shift round trips, and the
//! Montgomery/CRT scalar round trips under the NTT.

use mpcore::montgomery::NTT_PRIMES;
use mpcore::radix::{base_digits_len, binary_len_for_digits};
use mpcore::word::div128_64;
use mpcore::{
    add, base_to_binary, binary_to_base, compare, difference, div_rem, get_div_len, get_mul_len,
    lshift_bits, mul, rlz, rshift_bits, sqr, sub,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn magnitude(max_len: usize) -> impl Strategy<Value = Vec<u64>> {
    vec(any::<u64>(), 1..=max_len)
}

/// `x mod p` for a two-word x.
fn mod_p(x: &[u64; 2], p: u64) -> u64 {
    let hi = x[1] % p;
    div128_64(hi, x[0], p).1
}

proptest! {
    /// Property: (a + b) - b = a after canonicalisation
    #[test]
    fn prop_add_sub_roundtrip(a in magnitude(12), b in magnitude(12)) {
        let mut sum = vec![0u64; a.len().max(b.len()) + 1];
        add(&a, &b, &mut sum);
        let mut back = vec![0u64; sum.len()];
        sub(&sum, &b, &mut back);
        prop_assert_eq!(compare(&back, &a), 0);
    }

    /// Property: difference returns the sign of compare and |a - b|
    #[test]
    fn prop_difference_sign(a in magnitude(8), b in magnitude(8)) {
        let mut d = vec![0u64; a.len().max(b.len())];
        let sign = difference(&a, &b, &mut d);
        prop_assert_eq!(sign, compare(&a, &b));
        // adding the smaller back recovers the larger
        if sign != 0 {
            let (big, small) = if sign > 0 { (&a, &b) } else { (&b, &a) };
            let mut back = vec![0u64; d.len() + small.len() + 1];
            add(&d, small, &mut back);
            prop_assert_eq!(compare(&back, big), 0);
        } else {
            prop_assert_eq!(rlz(&d), 1);
            prop_assert_eq!(d[0], 0);
        }
    }

    /// Property: mul(a, b) = mul(b, a)
    #[test]
    fn prop_mul_commutative(a in magnitude(30), b in magnitude(30)) {
        let n = get_mul_len(a.len(), b.len());
        let mut ab = vec![0u64; n];
        let mut ba = vec![0u64; n];
        mul(&a, &b, &mut ab);
        mul(&b, &a, &mut ba);
        prop_assert_eq!(ab, ba);
    }

    /// Property: mul(a, a) = sqr(a)
    #[test]
    fn prop_sqr_matches_mul(a in magnitude(40)) {
        let b = a.clone();
        let mut want = vec![0u64; 2 * a.len()];
        mul(&a, &b, &mut want);
        let mut got = vec![0u64; 2 * a.len()];
        sqr(&a, &mut got);
        prop_assert_eq!(got, want);
    }

    /// Property: a = div(a,b)*b + rem(a,b) with 0 <= rem < b
    #[test]
    fn prop_division_identity(a in magnitude(20), b in magnitude(10)) {
        prop_assume!(rlz(&b) > 1 || b[0] != 0);
        let la = rlz(&a);
        let lb = rlz(&b);
        let q_slots = if la >= lb { get_div_len(la, lb) } else { 2 };
        let mut quot = vec![0u64; q_slots];
        let mut rem = vec![0u64; lb];
        div_rem(&a, &b, &mut quot, &mut rem);
        prop_assert!(compare(&rem, &b) < 0);
        let mut qb = vec![0u64; get_mul_len(q_slots, lb)];
        mul(&quot, &b, &mut qb);
        let mut back = vec![0u64; qb.len() + 1];
        add(&qb, &rem, &mut back);
        prop_assert_eq!(compare(&back, &a), 0);
    }

    /// Property: rshift(lshift(a, s), s) = a
    #[test]
    fn prop_shift_roundtrip(a in magnitude(8), s in 0u64..512) {
        let up_len = a.len() + (s / 64) as usize + 2;
        let mut up = vec![0u64; up_len];
        lshift_bits(&a, &mut up, s);
        let mut down = vec![0u64; up_len];
        rshift_bits(&up, &mut down, s);
        prop_assert_eq!(compare(&down, &a), 0);
    }

    /// Property: rlz is idempotent
    #[test]
    fn prop_rlz_idempotent(a in magnitude(10)) {
        let n = rlz(&a);
        prop_assert_eq!(rlz(&a[..n]), n);
    }

    /// Property: from_mont(to_mont(x)) = x mod p for each NTT prime
    #[test]
    fn prop_mont_roundtrip(x in any::<u64>()) {
        for p in &NTT_PRIMES {
            let m = p.to_mont(x);
            prop_assert!(m < p.modulus);
            prop_assert_eq!(p.from_mont(m), x % p.modulus);
        }
    }

    /// Property: the three residues of x < p1*p2*p3 reassemble to x.
    /// Verified on two-word values through an NTT multiply by 1.
    #[test]
    fn prop_crt_residues_consistent(x in any::<[u64; 2]>()) {
        for p in &NTT_PRIMES {
            let r = mod_p(&x, p.modulus);
            // residue arithmetic agrees with the Montgomery field
            let lifted = p.mul(p.to_mont(r), p.one);
            prop_assert_eq!(p.from_mont(lifted), r);
        }
        // the NTT path (which reassembles through crt3) preserves x * 1
        let one = [1u64];
        let mut out = vec![0u64; 3];
        mpcore::crt::ntt_mul(&x, &one, &mut out);
        prop_assert_eq!(&out[..2], &x);
        prop_assert_eq!(out[2], 0);
    }

    /// Property: binary -> base -> binary is the identity for every base
    #[test]
    fn prop_radix_roundtrip(a in magnitude(6), base in 2u64..=36) {
        let la = rlz(&a);
        let mut packed = vec![0u64; base_digits_len(la, base)];
        let n = binary_to_base(&a, base, &mut packed).unwrap();
        let mut back = vec![0u64; binary_len_for_digits(n, base)];
        let m = base_to_binary(&packed[..n], base, &mut back).unwrap();
        prop_assert_eq!(compare(&back[..m], &a), 0);
    }
}
