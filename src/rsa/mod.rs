// RSA Module - Main module file
// Exports the arithmetic core, key handling and the character codec

pub mod attack;
pub mod bigint;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod padding;
pub mod primes;

pub use attack::{plaintext_attack, recover_private_exponent};
pub use bigint::{are_coprime, euler_totient, is_prime, mod_inverse, mod_pow, RsaBigInt};
pub use decrypt::{decrypt_text, decrypt_value, DecryptedChar, DecryptedText};
pub use encrypt::{encrypt_text, encrypt_value, EncryptedMessage};
pub use keygen::{generate_keypair, validate_keypair, Keypair, RsaPrivateKey, RsaPublicKey};
pub use padding::{add_padding, strip_padding};
pub use primes::generate_primes;
