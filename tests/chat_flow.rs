use criptochat::chat::{ChatConfig, ChatError, InboxContent, UserDirectory};
use criptochat::rsa::bigint::from_u64;
use criptochat::rsa::keygen::generate_keypair_with_rng;
use criptochat::rsa::{plaintext_attack, recover_private_exponent};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config(dir: &tempfile::TempDir) -> ChatConfig {
    ChatConfig::default()
        .with_padding_digits(6)
        .with_prime_range(from_u64(1 << 36), from_u64(1 << 40))
        .with_store_path(dir.path().join("users.json"))
}

#[test]
fn register_send_rotate_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);

    let mut directory = UserDirectory::load(&config).unwrap();
    let ana = directory.register("ana", None, &config).unwrap();
    let luis = directory.register("luis", None, &config).unwrap();

    directory.send_message(ana, luis, "¿Quedamos mañana?").unwrap();
    directory.send_message(luis, ana, "vale").unwrap();
    directory.save(&config.store_path).unwrap();

    let mut directory = UserDirectory::load(&config).unwrap();
    let mut rng = StdRng::seed_from_u64(99);
    let new_key = generate_keypair_with_rng(&config.min_prime, &config.max_prime, &mut rng).unwrap();
    let report = directory.rotate_keys(luis, new_key.clone(), false).unwrap();
    assert_eq!(report.reencrypted, 1);
    assert_eq!(directory.find(luis).unwrap().key, new_key);

    let inbox = directory.check_inbox(luis).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].sender, "ana");
    assert_eq!(inbox[0].content, InboxContent::Text("¿Quedamos mañana?".to_string()));

    assert_eq!(directory.check_inbox(ana).unwrap()[0].content.as_text(), Some("vale"));
}

#[test]
fn unknown_users_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let directory = UserDirectory::load(&config(&dir)).unwrap();
    assert!(matches!(directory.check_inbox(3), Err(ChatError::UserNotFound(3))));
}

#[test]
fn corrupt_store_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    std::fs::write(&config.store_path, "{ not json").unwrap();
    assert!(matches!(UserDirectory::load(&config), Err(ChatError::Json(_))));
}

#[test]
fn attack_breaks_a_small_key() {
    let mut rng = StdRng::seed_from_u64(4);
    let key = generate_keypair_with_rng(&from_u64(1 << 20), &from_u64(1 << 22), &mut rng).unwrap();
    let (n, e) = (key.modulus(), key.public_exponent());

    assert_eq!(&recover_private_exponent(n, e).unwrap(), key.private_exponent());

    let ciphertext = key.public_key().encrypt_text("attack at dawn", 0).unwrap();
    let text = plaintext_attack(&ciphertext.values, n, e).unwrap();
    assert_eq!(text.into_string().unwrap(), "attack at dawn");
}
