use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::LevelFilter;

use criptochat::chat::{ChatConfig, UserDirectory};
use criptochat::rsa::bigint::parse_biguint;
use criptochat::rsa::{generate_keypair, plaintext_attack, Keypair, RsaBigInt};

#[derive(Parser)]
#[command(
    name = "criptochat",
    author,
    version,
    about = "Encrypted chat between local users over textbook RSA"
)]
struct Cli {
    /// User directory file.
    #[arg(long, global = true, value_name = "FILE", default_value = criptochat::chat::config::DEFAULT_STORE_PATH)]
    store: PathBuf,
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user, with a random key unless one is given.
    Register {
        username: String,
        /// Key as "n e d".
        #[arg(long, value_name = "N E D")]
        key: Option<Keypair>,
    },
    /// List registered users.
    Users,
    /// Send a message from one user to another.
    Send { from: u32, to: u32, message: String },
    /// Show a user's decrypted inbox.
    Inbox { id: u32 },
    /// Show a user's public and private key.
    Keys { id: u32 },
    /// Replace a user's key, re-encrypting their inbox.
    Rotate {
        id: u32,
        /// Key as "n e d"; a random key is generated when omitted.
        #[arg(long, value_name = "N E D")]
        key: Option<Keypair>,
    },
    /// Change the padding digits used for new messages.
    Padding { digits: u32 },
    /// Decrypt a cipher list with a user's private key.
    Decrypt {
        id: u32,
        #[arg(required = true, value_parser = parse_value)]
        values: Vec<RsaBigInt>,
    },
    /// Generate a key pair without registering it.
    Keygen {
        #[arg(long, value_parser = parse_value)]
        min: Option<RsaBigInt>,
        #[arg(long, value_parser = parse_value)]
        max: Option<RsaBigInt>,
    },
    /// Recover the private key from (n, e) and decrypt unpadded ciphertext.
    Attack {
        #[arg(value_parser = parse_value)]
        n: RsaBigInt,
        #[arg(value_parser = parse_value)]
        e: RsaBigInt,
        #[arg(required = true, value_parser = parse_value)]
        values: Vec<RsaBigInt>,
    },
}

fn parse_value(text: &str) -> std::result::Result<RsaBigInt, String> {
    parse_biguint(text).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    let config = ChatConfig::default().with_store_path(cli.store);

    match cli.command {
        Commands::Register { username, key } => {
            let mut directory = load(&config)?;
            let id = directory.register(&username, key, &config)?;
            let user = directory.find(id)?;
            let (n, e, d) = (user.key.modulus(), user.key.public_exponent(), user.key.private_exponent());
            println!("Registered {} with id {}", user.username, id);
            println!("Your key is: n = {}, e = {}, d = {}", n, e, d);
            save(&directory, &config)?;
        }
        Commands::Users => {
            let directory = load(&config)?;
            if directory.is_empty() {
                println!("\tNo users registered.");
            }
            for user in directory.users() {
                println!("\tID: {} USERNAME: {}", user.id, user.username);
            }
        }
        Commands::Send { from, to, message } => {
            let mut directory = load(&config)?;
            let encrypted = directory.send_message(from, to, &message)?;
            let rendered: Vec<String> = encrypted.values.iter().map(ToString::to_string).collect();
            println!("Message encrypted and sent.");
            println!("Encrypted message: {}", rendered.join(" "));
            save(&directory, &config)?;
        }
        Commands::Inbox { id } => {
            let directory = load(&config)?;
            let inbox = directory.check_inbox(id)?;
            if inbox.is_empty() {
                println!("You have not received any messages.");
            }
            for (count, view) in inbox.iter().enumerate() {
                println!("{} | {} ({}): {}", count + 1, view.sender, view.date, view.content);
            }
        }
        Commands::Keys { id } => {
            let directory = load(&config)?;
            let key = &directory.find(id)?.key;
            let (public, private) = (key.public_key(), key.private_key());
            println!(
                "Your public key is (n, e) = ({}, {}) and private key (n, d) = ({}, {}).",
                public.n, public.e, private.n, private.d
            );
        }
        Commands::Rotate { id, key } => {
            let mut directory = load(&config)?;
            let (key, report) = match key {
                Some(key) => {
                    let report = directory.rotate_keys(id, key.clone(), false)?;
                    (key, report)
                }
                None => directory.rotate_random_keys(id, &config)?,
            };
            println!(
                "Your new key is: n = {}, e = {}, d = {}",
                key.modulus(),
                key.public_exponent(),
                key.private_exponent()
            );
            println!(
                "{} messages re-encrypted, {} lost",
                report.reencrypted, report.corrupted
            );
            save(&directory, &config)?;
        }
        Commands::Padding { digits } => {
            let mut directory = load(&config)?;
            directory.change_padding(digits);
            println!("Padding set to {} digits.", digits);
            save(&directory, &config)?;
        }
        Commands::Decrypt { id, values } => {
            let directory = load(&config)?;
            let text = directory.decrypt_raw(id, &values)?;
            if !text.is_intact() {
                log::warn!("{} characters could not be decrypted", text.corrupted_count());
            }
            println!("{}", text);
        }
        Commands::Keygen { min, max } => {
            let min = min.unwrap_or_else(|| config.min_prime.clone());
            let max = max.unwrap_or_else(|| config.max_prime.clone());
            let key = generate_keypair(&min, &max).context("key generation failed")?;
            println!(
                "n = {}, e = {}, d = {}",
                key.modulus(),
                key.public_exponent(),
                key.private_exponent()
            );
        }
        Commands::Attack { n, e, values } => {
            let text = plaintext_attack(&values, &n, &e).context("could not break the public key")?;
            println!("{}", text);
        }
    }

    Ok(())
}

fn load(config: &ChatConfig) -> Result<UserDirectory> {
    UserDirectory::load(config)
        .with_context(|| format!("failed to load {}", config.store_path.display()))
}

fn save(directory: &UserDirectory, config: &ChatConfig) -> Result<()> {
    directory
        .save(&config.store_path)
        .with_context(|| format!("failed to save {}", config.store_path.display()))
}

fn init_logging(debug: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp(None);
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    let _ = builder.try_init();
}
