// Error types for the RSA engine
// Validation, arithmetic and conversion failures share one enum

use thiserror::Error;

use crate::rsa::bigint::RsaBigInt;

/// Errors raised by the arithmetic core and the message codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RsaError {
    /// Lower bound of an interval is above its upper bound.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: RsaBigInt, max: RsaBigInt },

    /// Asked for fewer than one prime.
    #[error("the number of primes must be at least 1")]
    InvalidCount,

    /// A signed value was supplied where only non-negative integers are accepted.
    #[error("inputs must be non-negative integers, got {0}")]
    NegativeInput(String),

    /// A token could not be parsed as a decimal integer.
    #[error("not a decimal integer: {0:?}")]
    InvalidNumber(String),

    /// Stripping more padding digits than the value has.
    #[error("cannot strip {digits} padding digits from a value with {value_digits} digits")]
    PaddingOutOfRange { digits: u32, value_digits: u32 },

    /// Message plus padding would not fit below the modulus.
    #[error(
        "message ({message_digits} digits) plus {padding_digits} padding digits must have fewer digits than the modulus ({modulus_digits})"
    )]
    MessageTooLarge {
        message_digits: u32,
        padding_digits: u32,
        modulus_digits: u32,
    },

    /// A zero value has no leading digit to keep it apart from its padding.
    #[error("a zero value cannot carry {padding_digits} padding digits")]
    PaddedZero { padding_digits: u32 },

    /// Exponentiation or factoring against a zero modulus.
    #[error("modulus must be positive")]
    ZeroModulus,

    /// gcd(a, m) != 1.
    #[error("{value} has no inverse modulo {modulus}")]
    NoInverse { value: RsaBigInt, modulus: RsaBigInt },

    /// The interval does not hold enough distinct primes.
    #[error("not enough primes in [{min}, {max})")]
    NoPrimeInRange { min: RsaBigInt, max: RsaBigInt },

    /// Public exponent outside (1, phi) or not invertible mod phi.
    #[error("public key is not valid")]
    InvalidPublicExponent,

    /// Pollard rho gave up on a composite.
    #[error("could not factor {0}")]
    FactorizationFailed(RsaBigInt),

    /// Decrypted integer is not a Unicode scalar value.
    #[error("decrypted value {0} is not a valid character")]
    InvalidCodePoint(RsaBigInt),
}

/// Result type for RSA operations.
pub type Result<T> = std::result::Result<T, RsaError>;
