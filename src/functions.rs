use num_bigint::{BigInt, Sign};
use num_integer::Integer as _;
use num_traits::{One, Signed, Zero};
use rand::{rngs::OsRng, RngCore};
use rug::{integer::IsPrime, integer::Order, Integer};
use std::time::Instant;
use thiserror::Error;
use tracing::trace;

/// Miller-Rabin repetitions used when testing prime candidates.
pub const PRIMALITY_REPS: u32 = 40;

/// Upper bound on candidates drawn by a single prime search.
pub const MAX_PRIME_ATTEMPTS: usize = 10_000;

pub const MIN_PRIME_BITS: usize = 8;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FunctionError {
    #[error("random number generation failed")]
    RandomNumberGeneration,
    #[error("invalid bit length: {0}")]
    InvalidBitLength(usize),
    #[error("prime generation gave up after {0} candidates")]
    PrimeGenerationExhausted(usize),
    #[error("prime generation timed out")]
    Timeout,
}

pub fn random_int(bits: usize) -> Result<BigInt, FunctionError> {
    let max = BigInt::one() << bits;
    random_mod(&max, &mut OsRng)
}

/// Uniform sample from `[0, n)`.
pub fn random_mod(n: &BigInt, rng: &mut impl RngCore) -> Result<BigInt, FunctionError> {
    if n <= &BigInt::zero() {
        return Err(FunctionError::RandomNumberGeneration);
    }
    let bits = n.bits() as usize;
    let mut bytes = vec![0u8; (bits + 7) / 8];
    let excess = bytes.len() * 8 - bits;
    loop {
        rng.fill_bytes(&mut bytes);
        bytes[0] &= 0xff >> excess;
        let result = BigInt::from_bytes_be(Sign::Plus, &bytes);
        if &result < n {
            return Ok(result);
        }
    }
}

/// Uniform sample from the closed range `[low, high]`.
pub fn random_range(
    low: &BigInt,
    high: &BigInt,
    rng: &mut impl RngCore,
) -> Result<BigInt, FunctionError> {
    if high < low {
        return Err(FunctionError::RandomNumberGeneration);
    }
    let span = high - low + BigInt::one();
    Ok(low + random_mod(&span, rng)?)
}

/// Samples `r` in `[1, n-1]` with `gcd(r, n) = 1`.
pub fn random_coprime(n: &BigInt, rng: &mut impl RngCore) -> Result<BigInt, FunctionError> {
    if n <= &BigInt::one() {
        return Err(FunctionError::RandomNumberGeneration);
    }
    let upper = n - BigInt::one();
    loop {
        let r = random_range(&BigInt::one(), &upper, rng)?;
        if gcd(&r, n).is_one() {
            return Ok(r);
        }
    }
}

pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b)
}

pub fn lcm(a: &BigInt, b: &BigInt) -> BigInt {
    a.lcm(b)
}

/// Modular inverse by the iterative extended Euclidean algorithm.
///
/// Returns `None` when `gcd(a, m) != 1` or `m <= 1`. The result lies in `[0, m)`.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    if m <= &BigInt::one() {
        return None;
    }
    let (mut old_r, mut r) = (a.mod_floor(m), m.clone());
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let q = &old_r / &r;
        let next_r = &old_r - &q * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_s = &old_s - &q * &s;
        old_s = std::mem::replace(&mut s, next_s);
    }
    if !old_r.is_one() {
        return None;
    }
    Some(old_s.mod_floor(m))
}

/// `base^exp mod modulus`, inverting `base` first when `exp` is negative.
pub fn mod_pow(base: &BigInt, exp: &BigInt, modulus: &BigInt) -> Option<BigInt> {
    if modulus <= &BigInt::zero() {
        return None;
    }
    let base = base.mod_floor(modulus);
    if exp.is_negative() {
        let inv = mod_inverse(&base, modulus)?;
        Some(inv.modpow(&-exp, modulus))
    } else {
        Some(base.modpow(exp, modulus))
    }
}

/// Random probable prime of exactly `bits` bits.
///
/// The two leading bits are forced to one so that the product of two such
/// primes is exactly `2 * bits` wide.
pub fn generate_prime(bits: usize) -> Result<BigInt, FunctionError> {
    generate_prime_until(bits, None)
}

pub fn generate_prime_until(
    bits: usize,
    deadline: Option<Instant>,
) -> Result<BigInt, FunctionError> {
    if bits < MIN_PRIME_BITS {
        return Err(FunctionError::InvalidBitLength(bits));
    }
    let mut rng = OsRng;
    let bound = BigInt::one() << bits;
    let mask = (BigInt::one() << (bits - 1)) | (BigInt::one() << (bits - 2)) | BigInt::one();

    for attempt in 1..=MAX_PRIME_ATTEMPTS {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(FunctionError::Timeout);
            }
        }
        let candidate = random_mod(&bound, &mut rng)? | &mask;
        if is_probable_prime(&candidate) {
            trace!(bits, attempt, "prime candidate accepted");
            return Ok(candidate);
        }
    }
    Err(FunctionError::PrimeGenerationExhausted(MAX_PRIME_ATTEMPTS))
}

pub fn is_probable_prime(candidate: &BigInt) -> bool {
    if candidate <= &BigInt::one() {
        return false;
    }
    to_rug(candidate).is_probably_prime(PRIMALITY_REPS) != IsPrime::No
}

fn to_rug(value: &BigInt) -> Integer {
    let (sign, digits) = value.to_bytes_be();
    let magnitude = Integer::from_digits(&digits, Order::Msf);
    if sign == Sign::Minus {
        -magnitude
    } else {
        magnitude
    }
}
