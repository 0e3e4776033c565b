// Chat Configuration
// Session settings: padding, key size and where the directory lives

use std::path::PathBuf;

use num_traits::One;

use crate::rsa::bigint::RsaBigInt;

/// Padding digits used by a fresh directory.
pub const DEFAULT_PADDING_DIGITS: u32 = 10;

/// Default location of the user directory.
pub const DEFAULT_STORE_PATH: &str = "data/users.json";

/// Configuration for a chat session
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Padding digits for a directory created from scratch.
    pub padding_digits: u32,
    /// Inclusive lower bound for generated key primes.
    pub min_prime: RsaBigInt,
    /// Exclusive upper bound for generated key primes.
    pub max_prime: RsaBigInt,
    pub store_path: PathBuf,
}

impl Default for ChatConfig {
    fn default() -> Self {
        // primes between 64 and 128 bits
        Self {
            padding_digits: DEFAULT_PADDING_DIGITS,
            min_prime: RsaBigInt::one() << 64,
            max_prime: RsaBigInt::one() << 128,
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl ChatConfig {
    pub fn with_padding_digits(mut self, digits: u32) -> Self {
        self.padding_digits = digits;
        self
    }

    pub fn with_prime_range(mut self, min_prime: RsaBigInt, max_prime: RsaBigInt) -> Self {
        self.min_prime = min_prime;
        self.max_prime = max_prime;
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::parse_biguint;

    #[test]
    fn test_default_config() {
        let config = ChatConfig::default();
        assert_eq!(config.padding_digits, 10);
        assert_eq!(config.min_prime, parse_biguint("18446744073709551616").unwrap());
        assert_eq!(
            config.max_prime,
            parse_biguint("340282366920938463463374607431768211456").unwrap()
        );
        assert_eq!(config.store_path, PathBuf::from("data/users.json"));
    }

    #[test]
    fn test_builder() {
        let config = ChatConfig::default()
            .with_padding_digits(3)
            .with_prime_range(RsaBigInt::from(100u32), RsaBigInt::from(1000u32))
            .with_store_path("/tmp/chat.json");
        assert_eq!(config.padding_digits, 3);
        assert_eq!(config.min_prime, RsaBigInt::from(100u32));
        assert_eq!(config.store_path, PathBuf::from("/tmp/chat.json"));
    }
}
