use crate::functions::random_range;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::rngs::OsRng;
use thiserror::Error;

/// Polynomial over the prime field `Z_prime`, coefficients in ascending order.
pub struct Polynomial {
    coefficients: Vec<BigInt>,
    prime: BigInt,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolynomialError {
    #[error("random number generation failed: {0}")]
    RandomNumberGeneration(String),
    #[error("invalid field modulus")]
    InvalidModulus,
}

impl Polynomial {
    /// Degree-`degree` polynomial with `constant_term` as `a_0` and the other
    /// coefficients drawn uniformly from `[1, prime-1]`.
    pub fn with_constant_term(
        constant_term: &BigInt,
        degree: usize,
        prime: &BigInt,
    ) -> Result<Self, PolynomialError> {
        if prime <= &BigInt::one() {
            return Err(PolynomialError::InvalidModulus);
        }
        let mut rng = OsRng;
        let upper = prime - BigInt::one();
        let mut coefficients = Vec::with_capacity(degree + 1);
        coefficients.push(constant_term.mod_floor(prime));
        for _ in 0..degree {
            let coeff = random_range(&BigInt::one(), &upper, &mut rng)
                .map_err(|e| PolynomialError::RandomNumberGeneration(e.to_string()))?;
            coefficients.push(coeff);
        }
        Ok(Polynomial {
            coefficients,
            prime: prime.clone(),
        })
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation of `f(x) mod prime`.
    pub fn evaluate(&self, x: &BigInt) -> BigInt {
        self.coefficients
            .iter()
            .rev()
            .fold(BigInt::zero(), |acc, coeff| (acc * x + coeff).mod_floor(&self.prime))
    }
}

impl Drop for Polynomial {
    fn drop(&mut self) {
        for coeff in self.coefficients.iter_mut() {
            *coeff = BigInt::zero();
        }
        self.coefficients.clear();
    }
}
