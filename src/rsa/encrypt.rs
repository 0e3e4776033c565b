// RSA Encryption Implementation
// Character-wise textbook RSA with decimal padding

use num_traits::Zero;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};

use super::bigint::{decimal_digits, mod_pow, RsaBigInt};
use super::keygen::RsaPublicKey;
use super::padding::add_padding_with_rng;
use crate::error::{Result, RsaError};
use crate::util::decimal;

/// One cipher value per source character, with the padding it was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    #[serde(with = "decimal::vec")]
    pub values: Vec<RsaBigInt>,
    pub padding_digits: u32,
}

impl EncryptedMessage {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Encrypt a single integer: pad, then compute padded^e mod n.
pub fn encrypt_value(m: &RsaBigInt, n: &RsaBigInt, e: &RsaBigInt, digits: u32) -> Result<RsaBigInt> {
    encrypt_value_with_rng(m, n, e, digits, &mut thread_rng())
}

/// `encrypt_value` with a caller-supplied padding source.
pub fn encrypt_value_with_rng<R: Rng + ?Sized>(
    m: &RsaBigInt,
    n: &RsaBigInt,
    e: &RsaBigInt,
    digits: u32,
    rng: &mut R,
) -> Result<RsaBigInt> {
    // a padded zero is just the suffix and would come back too short to strip
    if m.is_zero() && digits > 0 {
        return Err(RsaError::PaddedZero {
            padding_digits: digits,
        });
    }

    let message_digits = decimal_digits(m);
    let modulus_digits = decimal_digits(n);
    // padded value then stays below 10^(modulus_digits - 1) <= n
    if message_digits + digits >= modulus_digits {
        return Err(RsaError::MessageTooLarge {
            message_digits,
            padding_digits: digits,
            modulus_digits,
        });
    }

    let padded = add_padding_with_rng(m, digits, rng);
    mod_pow(&padded, e, n)
}

/// Encrypt every character of `text` by its Unicode scalar value.
pub fn encrypt_text(text: &str, n: &RsaBigInt, e: &RsaBigInt, digits: u32) -> Result<EncryptedMessage> {
    encrypt_text_with_rng(text, n, e, digits, &mut thread_rng())
}

/// `encrypt_text` with a caller-supplied padding source.
pub fn encrypt_text_with_rng<R: Rng + ?Sized>(
    text: &str,
    n: &RsaBigInt,
    e: &RsaBigInt,
    digits: u32,
    rng: &mut R,
) -> Result<EncryptedMessage> {
    let values = text
        .chars()
        .map(|c| encrypt_value_with_rng(&RsaBigInt::from(u32::from(c)), n, e, digits, rng))
        .collect::<Result<Vec<_>>>()?;

    Ok(EncryptedMessage {
        values,
        padding_digits: digits,
    })
}

impl RsaPublicKey {
    /// Encrypt a string under this key with `digits` padding digits per character.
    pub fn encrypt_text(&self, text: &str, digits: u32) -> Result<EncryptedMessage> {
        encrypt_text(text, &self.n, &self.e, digits)
    }
}
