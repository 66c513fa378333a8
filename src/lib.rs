//! mpcore - arbitrary-precision unsigned arithmetic core
//!
//! Magnitudes are little-endian `u64` slices; every operation works on
//! caller-provided buffers and owns no state across calls. A signed
//! big-integer façade supplies allocation, sign bookkeeping and string
//! I/O on top of these primitives.
//!
//! ## Multiplication
//!
//! [`mul()`](mul()) dispatches between schoolbook, Karatsuba and a three-prime
//! NTT/CRT convolution by operand length, with a chunked variant for
//! heavily unbalanced operands and a dedicated squaring path ([`sqr()`](sqr())).
//! The NTT runs lazy Montgomery arithmetic over three 62-bit primes and
//! reassembles coefficients through a 192-bit CRT carry stream.
//!
//! ## Division
//!
//! [`div()`](div()) is Knuth Algorithm D with word-lane normalisation and a
//! three-halfword quotient estimate; single-word divisors take the
//! 128/64 scalar path.
//!
//! ## Radix conversion
//!
//! [`binary_to_base`]/[`base_to_binary`] convert between binary and
//! packed-radix digit arrays (19 decimal digits per word), switching to
//! divide-and-conquer power towers for large operands.

pub mod barrett;
pub mod crt;
pub mod div;
pub mod error;
pub mod limbs;
pub mod montgomery;
pub mod mul;
pub mod ntt;
pub mod radix;
pub mod shift;
pub mod word;

pub use div::{div, div_rem, div_rem_scalar};
pub use error::{RadixError, RadixResult};
pub use limbs::{
    add, add_half, bit_length, compare, difference, get_add_len, get_div_len, get_mul_len,
    get_sub_len, mul_add_scalar, mul_sub_scalar, rlz, sub,
};
pub use mul::{mul, sqr, KARATSUBA_MAX, KARATSUBA_MIN};
pub use ntt::{LONG_THRESHOLD, MAX_NTT_LEN};
pub use radix::{base_to_binary, binary_to_base};
pub use shift::{lshift_bits, lshift_in_word, rshift_bits, rshift_in_word};
