// Key Recovery
// Breaks a small public key by factoring the modulus

use log::{debug, warn};
use num_traits::One;

use super::bigint::{are_coprime, euler_totient, mod_inverse, RsaBigInt};
use super::decrypt::{decrypt_text, DecryptedText};
use crate::error::{Result, RsaError};

/// Recover the private exponent from a public key `(n, e)`.
///
/// Factors `n` to get phi(n) and inverts `e` modulo it. Requires
/// `1 < e < phi(n)` and gcd(e, phi(n)) = 1.
pub fn recover_private_exponent(n: &RsaBigInt, e: &RsaBigInt) -> Result<RsaBigInt> {
    let phi = euler_totient(n)?;
    debug!("recovered totient of {}-bit modulus", n.bits());

    if e <= &RsaBigInt::one() || e >= &phi || !are_coprime(&phi, e) {
        return Err(RsaError::InvalidPublicExponent);
    }
    mod_inverse(e, &phi)
}

/// Decrypt unpadded ciphertext knowing only the public key.
pub fn plaintext_attack(values: &[RsaBigInt], n: &RsaBigInt, e: &RsaBigInt) -> Result<DecryptedText> {
    let d = recover_private_exponent(n, e)?;
    let text = decrypt_text(values, n, &d, 0);
    if !text.is_intact() {
        warn!(
            "{} of {} values did not decrypt to characters",
            text.corrupted_count(),
            values.len()
        );
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa::bigint::from_u64;
    use crate::rsa::encrypt::encrypt_text;
    use crate::rsa::keygen::generate_keypair_with_rng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_recover_known_key() {
        // n = 61 * 53, phi = 3120, 17 * 2753 ≡ 1
        let d = recover_private_exponent(&from_u64(3233), &from_u64(17)).unwrap();
        assert_eq!(d, from_u64(2753));
    }

    #[test]
    fn test_recover_generated_key() {
        let mut rng = StdRng::seed_from_u64(13);
        let key = generate_keypair_with_rng(&from_u64(1 << 24), &from_u64(1 << 28), &mut rng).unwrap();
        let d = recover_private_exponent(key.modulus(), key.public_exponent()).unwrap();
        assert_eq!(&d, key.private_exponent());
    }

    #[test]
    fn test_recover_rejects_bad_exponent() {
        let n = from_u64(3233);
        // e = 1 is below range
        assert_eq!(
            recover_private_exponent(&n, &from_u64(1)),
            Err(RsaError::InvalidPublicExponent)
        );
        // e = phi is out of range
        assert_eq!(
            recover_private_exponent(&n, &from_u64(3120)),
            Err(RsaError::InvalidPublicExponent)
        );
        // gcd(4, 3120) = 4
        assert_eq!(
            recover_private_exponent(&n, &from_u64(4)),
            Err(RsaError::InvalidPublicExponent)
        );
        assert_eq!(
            recover_private_exponent(&from_u64(0), &from_u64(3)),
            Err(RsaError::ZeroModulus)
        );
    }

    #[test]
    fn test_plaintext_attack() {
        let n = from_u64(10403);
        let e = from_u64(7);
        let encrypted = encrypt_text("Hola mundo", &n, &e, 0).unwrap();
        let text = plaintext_attack(&encrypted.values, &n, &e).unwrap();
        assert_eq!(text.into_string().unwrap(), "Hola mundo");
    }

    #[test]
    fn test_plaintext_attack_on_padded_ciphertext() {
        // the attack assumes zero padding, so padded input decodes to other characters
        let n = from_u64(10403);
        let e = from_u64(7);
        let encrypted = encrypt_text("Hi", &n, &e, 1).unwrap();
        let text = plaintext_attack(&encrypted.values, &n, &e).unwrap();
        assert_ne!(text.to_string_lossy(), "Hi");
    }
}
