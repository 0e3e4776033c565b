// RSA Decryption Implementation
// Character-wise decryption with per-character fault isolation

use std::fmt;

use num_traits::ToPrimitive;

use super::bigint::{mod_pow, RsaBigInt};
use super::encrypt::EncryptedMessage;
use super::keygen::RsaPrivateKey;
use super::padding::strip_padding;
use crate::error::{Result, RsaError};

/// Outcome of decrypting one cipher value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecryptedChar {
    Plain(char),
    Corrupted { index: usize, error: RsaError },
}

/// Decryption result of a whole message, one entry per cipher value.
///
/// A bad value only spoils its own position; the rest of the message is
/// still available.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecryptedText {
    pub chars: Vec<DecryptedChar>,
}

impl DecryptedText {
    /// True when no position is corrupted.
    pub fn is_intact(&self) -> bool {
        self.chars
            .iter()
            .all(|c| matches!(c, DecryptedChar::Plain(_)))
    }

    /// Number of corrupted positions.
    pub fn corrupted_count(&self) -> usize {
        self.chars.len() - self.chars.iter().filter(|c| matches!(c, DecryptedChar::Plain(_))).count()
    }

    /// The plaintext, or the error of the first corrupted position.
    pub fn into_string(self) -> Result<String> {
        self.chars
            .into_iter()
            .map(|c| match c {
                DecryptedChar::Plain(ch) => Ok(ch),
                DecryptedChar::Corrupted { error, .. } => Err(error),
            })
            .collect()
    }

    /// The plaintext with U+FFFD in place of every corrupted position.
    pub fn to_string_lossy(&self) -> String {
        self.chars
            .iter()
            .map(|c| match c {
                DecryptedChar::Plain(ch) => *ch,
                DecryptedChar::Corrupted { .. } => char::REPLACEMENT_CHARACTER,
            })
            .collect()
    }
}

impl fmt::Display for DecryptedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

/// Decrypt a single value: c^d mod n, then strip `digits` padding digits.
pub fn decrypt_value(c: &RsaBigInt, n: &RsaBigInt, d: &RsaBigInt, digits: u32) -> Result<RsaBigInt> {
    let padded = mod_pow(c, d, n)?;
    strip_padding(&padded, digits)
}

/// Decrypt a single value and read it as a Unicode scalar value.
pub fn decrypt_char(c: &RsaBigInt, n: &RsaBigInt, d: &RsaBigInt, digits: u32) -> Result<char> {
    let code = decrypt_value(c, n, d, digits)?;
    code.to_u32()
        .and_then(char::from_u32)
        .ok_or(RsaError::InvalidCodePoint(code))
}

/// Decrypt a cipher list character by character.
///
/// Never fails as a whole: each position is either the recovered character or
/// a `Corrupted` marker carrying the reason.
pub fn decrypt_text(values: &[RsaBigInt], n: &RsaBigInt, d: &RsaBigInt, digits: u32) -> DecryptedText {
    let chars = values
        .iter()
        .enumerate()
        .map(|(index, c)| match decrypt_char(c, n, d, digits) {
            Ok(ch) => DecryptedChar::Plain(ch),
            Err(error) => DecryptedChar::Corrupted { index, error },
        })
        .collect();
    DecryptedText { chars }
}

impl RsaPrivateKey {
    /// Decrypt a message using the padding recorded alongside it.
    pub fn decrypt_message(&self, message: &EncryptedMessage) -> DecryptedText {
        decrypt_text(&message.values, &self.n, &self.d, message.padding_digits)
    }
}
