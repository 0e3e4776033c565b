// Decimal Padding
// Appends random decimal digits to a plaintext integer before exponentiation

use num_bigint::RandBigInt;
use rand::{thread_rng, Rng};

use super::bigint::{decimal_digits, pow10, RsaBigInt};
use crate::error::{Result, RsaError};

/// Append `digits` random decimal digits to `message`.
///
/// Produces `message * 10^digits + suffix` with `suffix` uniform in
/// `[0, 10^digits)`.
pub fn add_padding(message: &RsaBigInt, digits: u32) -> RsaBigInt {
    add_padding_with_rng(message, digits, &mut thread_rng())
}

/// `add_padding` with a caller-supplied digit source.
pub fn add_padding_with_rng<R: Rng + ?Sized>(
    message: &RsaBigInt,
    digits: u32,
    rng: &mut R,
) -> RsaBigInt {
    let scale = pow10(digits);
    let suffix = rng.gen_biguint_below(&scale);
    message * scale + suffix
}

/// Drop the last `digits` decimal digits of `value`.
///
/// `digits` must be strictly smaller than the number of digits in `value`,
/// so a short value is rejected instead of collapsing to zero.
pub fn strip_padding(value: &RsaBigInt, digits: u32) -> Result<RsaBigInt> {
    let value_digits = decimal_digits(value);
    if digits >= value_digits {
        return Err(RsaError::PaddingOutOfRange {
            digits,
            value_digits,
        });
    }
    Ok(value / pow10(digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_add_padding_appends_digits() {
        let mut rng = StdRng::seed_from_u64(0);
        let padded = add_padding_with_rng(&from_u64(72), 4, &mut rng);
        assert_eq!(decimal_digits(&padded), 6);
        assert_eq!(&padded / from_u64(10_000), from_u64(72));
    }

    #[test]
    fn test_add_padding_zero_digits() {
        assert_eq!(add_padding(&from_u64(72), 0), from_u64(72));
    }

    #[test]
    fn test_strip_padding() {
        assert_eq!(strip_padding(&from_u64(721234), 4).unwrap(), from_u64(72));
        assert_eq!(strip_padding(&from_u64(72), 0).unwrap(), from_u64(72));
        assert_eq!(strip_padding(&from_u64(72), 1).unwrap(), from_u64(7));
    }

    #[test]
    fn test_strip_too_many_digits() {
        // two-digit value cannot lose three digits
        assert_eq!(
            strip_padding(&from_u64(72), 3),
            Err(RsaError::PaddingOutOfRange {
                digits: 3,
                value_digits: 2
            })
        );
        assert!(strip_padding(&from_u64(72), 2).is_err());
    }
}
