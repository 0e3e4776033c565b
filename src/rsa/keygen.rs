// RSA Key Generation
// Derives (n, e, d) from two random primes and checks user-supplied keys

use std::str::FromStr;

use log::debug;
use num_bigint::RandBigInt;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use super::bigint::{are_coprime, mod_inverse, parse_biguint, RsaBigInt};
use super::decrypt::decrypt_text;
use super::encrypt::encrypt_text;
use super::primes::generate_primes_with_rng;
use crate::error::{Result, RsaError};
use crate::util::decimal;

/// Plaintext round-tripped by `validate_keypair`.
pub const KEY_CHECK_PLAINTEXT: &str = "test-message";

/// Padding digits used by `validate_keypair`.
pub const KEY_CHECK_PADDING_DIGITS: u32 = 10;

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// RSA Private Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub d: RsaBigInt, // Private exponent
}

/// RSA Key Pair
///
/// Immutable once built. Rotating a key means building a new `Keypair`, never
/// editing one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    #[serde(with = "decimal")]
    n: RsaBigInt,
    #[serde(with = "decimal")]
    e: RsaBigInt,
    #[serde(with = "decimal")]
    d: RsaBigInt,
}

impl Keypair {
    /// Wrap raw key material. No checks are made; see `validate`.
    pub fn new(n: RsaBigInt, e: RsaBigInt, d: RsaBigInt) -> Self {
        Self { n, e, d }
    }

    pub fn modulus(&self) -> &RsaBigInt {
        &self.n
    }

    pub fn public_exponent(&self) -> &RsaBigInt {
        &self.e
    }

    pub fn private_exponent(&self) -> &RsaBigInt {
        &self.d
    }

    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }

    pub fn private_key(&self) -> RsaPrivateKey {
        RsaPrivateKey {
            n: self.n.clone(),
            d: self.d.clone(),
        }
    }

    /// Round-trip self test, see `validate_keypair`.
    pub fn validate(&self) -> bool {
        validate_keypair(&self.n, &self.e, &self.d)
    }

    pub fn into_parts(self) -> (RsaBigInt, RsaBigInt, RsaBigInt) {
        (self.n, self.e, self.d)
    }
}

/// Parses `"n e d"`: exactly three whitespace-separated non-negative integers.
impl FromStr for Keypair {
    type Err = RsaError;

    fn from_str(text: &str) -> Result<Self> {
        let parts: Vec<&str> = text.split_whitespace().collect();
        match parts.as_slice() {
            [n, e, d] => Ok(Keypair::new(
                parse_biguint(n)?,
                parse_biguint(e)?,
                parse_biguint(d)?,
            )),
            _ => Err(RsaError::InvalidNumber(text.to_string())),
        }
    }
}

/// Generate a key pair whose prime factors lie in `[min_prime, max_prime)`.
pub fn generate_keypair(min_prime: &RsaBigInt, max_prime: &RsaBigInt) -> Result<Keypair> {
    generate_keypair_with_rng(min_prime, max_prime, &mut thread_rng())
}

/// `generate_keypair` drawing primes and the public exponent from `rng`.
pub fn generate_keypair_with_rng<R: Rng + ?Sized>(
    min_prime: &RsaBigInt,
    max_prime: &RsaBigInt,
    rng: &mut R,
) -> Result<Keypair> {
    let primes = generate_primes_with_rng(min_prime, max_prime, 2, rng)?;
    let (p, q) = (&primes[0], &primes[1]);

    let n = p * q;
    let phi = (p - 1u8) * (q - 1u8);

    // e = 2k + 1 with k uniform in [0, floor(phi / 2)), i.e. an odd value in [1, phi)
    let odd_slots = &phi >> 1;
    let e = loop {
        let candidate = (rng.gen_biguint_below(&odd_slots) << 1) + 1u8;
        if are_coprime(&phi, &candidate) {
            break candidate;
        }
    };
    let d = mod_inverse(&e, &phi)?;

    debug!("generated {}-bit modulus", n.bits());
    Ok(Keypair::new(n, e, d))
}

/// Check a key by encrypting `KEY_CHECK_PLAINTEXT` and decrypting it again.
///
/// Every failure along the way (message too large for the modulus, zero
/// modulus, a decrypted value that is not a character, a mismatch) counts as
/// an invalid key.
pub fn validate_keypair(n: &RsaBigInt, e: &RsaBigInt, d: &RsaBigInt) -> bool {
    let encrypted = match encrypt_text(KEY_CHECK_PLAINTEXT, n, e, KEY_CHECK_PADDING_DIGITS) {
        Ok(encrypted) => encrypted,
        Err(err) => {
            debug!("key check failed while encrypting: {}", err);
            return false;
        }
    };
    match decrypt_text(&encrypted.values, n, d, encrypted.padding_digits).into_string() {
        Ok(text) => text == KEY_CHECK_PLAINTEXT,
        Err(err) => {
            debug!("key check failed while decrypting: {}", err);
            false
        }
    }
}
