// User Directory
// Registration, messaging, key rotation and persistence of all users

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Local;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::config::ChatConfig;
use super::error::{ChatError, Result};
use super::user::{InboxBody, InboxContent, InboxEntry, InboxView, User};
use crate::rsa::{generate_keypair, DecryptedText, EncryptedMessage, Keypair, RsaBigInt};
use crate::util::file_ops::{format_file_size, read_file, write_file};

/// Outcome of a key rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationReport {
    pub reencrypted: usize,
    pub corrupted: usize,
}

/// Every registered user plus the padding applied to newly sent messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirectory {
    padding_digits: u32,
    #[serde(default)]
    users: BTreeMap<u32, User>,
}

impl UserDirectory {
    pub fn new(padding_digits: u32) -> Self {
        Self {
            padding_digits,
            users: BTreeMap::new(),
        }
    }

    /// Load the directory at `config.store_path`, or start an empty one.
    pub fn load(config: &ChatConfig) -> Result<Self> {
        match read_file(&config.store_path)? {
            Some(json) => {
                let directory: Self = serde_json::from_str(&json)?;
                debug!(
                    "loaded {} users from {}",
                    directory.users.len(),
                    config.store_path.display()
                );
                Ok(directory)
            }
            None => {
                warn!(
                    "{} not found, starting with an empty directory",
                    config.store_path.display()
                );
                Ok(Self::new(config.padding_digits))
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        write_file(path, json.as_bytes())?;
        info!(
            "saved {} users to {} ({})",
            self.users.len(),
            path.display(),
            format_file_size(json.len() as u64)
        );
        Ok(())
    }

    pub fn padding_digits(&self) -> u32 {
        self.padding_digits
    }

    /// Set the padding for messages sent from now on.
    ///
    /// Stored messages carry their own digit count and are left untouched.
    pub fn change_padding(&mut self, digits: u32) {
        info!("padding changed from {} to {} digits", self.padding_digits, digits);
        self.padding_digits = digits;
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find(&self, id: u32) -> Result<&User> {
        self.users.get(&id).ok_or(ChatError::UserNotFound(id))
    }

    fn find_mut(&mut self, id: u32) -> Result<&mut User> {
        self.users.get_mut(&id).ok_or(ChatError::UserNotFound(id))
    }

    /// Register a user and return the new id.
    ///
    /// A supplied key must pass the round-trip check; without one, a key is
    /// generated from `config`'s prime range.
    pub fn register(&mut self, username: &str, key: Option<Keypair>, config: &ChatConfig) -> Result<u32> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ChatError::EmptyUsername);
        }

        let key = match key {
            Some(key) if key.validate() => key,
            Some(_) => return Err(ChatError::InvalidKey),
            None => generate_keypair(&config.min_prime, &config.max_prime)?,
        };

        let id = self.users.keys().next_back().map_or(0, |last| last + 1);
        self.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                key,
                inbox: Vec::new(),
            },
        );
        info!("registered user {} as {}", id, username);
        Ok(id)
    }

    /// Encrypt `text` for `to` and drop it in their inbox, dated today.
    pub fn send_message(&mut self, from: u32, to: u32, text: &str) -> Result<EncryptedMessage> {
        let today = Local::now().format("%d/%m/%Y").to_string();
        self.send_message_dated(from, to, text, today)
    }

    /// `send_message` with an explicit date string.
    pub fn send_message_dated(&mut self, from: u32, to: u32, text: &str, date: String) -> Result<EncryptedMessage> {
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.find(from)?;
        let padding_digits = self.padding_digits;
        let receiver = self.find_mut(to)?;

        debug!("encrypting {} characters for user {}", text.chars().count(), to);
        let encrypted = receiver.key.public_key().encrypt_text(text, padding_digits)?;
        receiver.inbox.push(InboxEntry {
            sender_id: from,
            date,
            body: InboxBody::Encrypted(encrypted.clone()),
        });
        Ok(encrypted)
    }

    /// Decrypt every message in a user's inbox.
    ///
    /// A message with any bad character is reported as corrupted; the other
    /// messages are unaffected.
    pub fn check_inbox(&self, id: u32) -> Result<Vec<InboxView>> {
        let user = self.find(id)?;
        let private_key = user.key.private_key();
        debug!("decrypting {} inbox messages", user.inbox.len());

        let views = user
            .inbox
            .iter()
            .map(|entry| {
                let sender = self
                    .users
                    .get(&entry.sender_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_else(|| format!("user #{}", entry.sender_id));
                let content = match &entry.body {
                    InboxBody::Encrypted(message) => match private_key.decrypt_message(message).into_string() {
                        Ok(text) => InboxContent::Text(text),
                        Err(err) => {
                            warn!("message from {} on {} is corrupted: {}", sender, entry.date, err);
                            InboxContent::Corrupted
                        }
                    },
                    InboxBody::Corrupted => InboxContent::Corrupted,
                };
                InboxView {
                    sender,
                    date: entry.date.clone(),
                    content,
                }
            })
            .collect();
        Ok(views)
    }

    /// Replace a user's key, carrying the inbox over to it.
    ///
    /// Unless `checked`, the new key must pass the round-trip check first.
    /// Each message is decrypted with the old key and encrypted again with
    /// the new one under its own padding; messages that fail either step
    /// become `Corrupted`.
    pub fn rotate_keys(&mut self, id: u32, new_key: Keypair, checked: bool) -> Result<RotationReport> {
        if !checked && !new_key.validate() {
            return Err(ChatError::InvalidKey);
        }
        let user = self.find_mut(id)?;
        info!("changing keys for user {}", id);

        let old_private = user.key.private_key();
        let new_public = new_key.public_key();
        let mut report = RotationReport::default();

        for entry in user.inbox.iter_mut() {
            let message = match &entry.body {
                InboxBody::Encrypted(message) => message,
                InboxBody::Corrupted => continue,
            };
            let carried = old_private
                .decrypt_message(message)
                .into_string()
                .and_then(|text| new_public.encrypt_text(&text, message.padding_digits));
            entry.body = match carried {
                Ok(reencrypted) => {
                    report.reencrypted += 1;
                    InboxBody::Encrypted(reencrypted)
                }
                Err(err) => {
                    warn!("message from user {} lost during key change: {}", entry.sender_id, err);
                    report.corrupted += 1;
                    InboxBody::Corrupted
                }
            };
        }

        user.key = new_key;
        Ok(report)
    }

    /// Rotate to a freshly generated key from `config`'s prime range.
    pub fn rotate_random_keys(&mut self, id: u32, config: &ChatConfig) -> Result<(Keypair, RotationReport)> {
        self.find(id)?;
        let key = generate_keypair(&config.min_prime, &config.max_prime)?;
        let report = self.rotate_keys(id, key.clone(), true)?;
        Ok((key, report))
    }

    /// Decrypt a hand-entered cipher list with a user's key and the current padding.
    pub fn decrypt_raw(&self, id: u32, values: &[RsaBigInt]) -> Result<DecryptedText> {
        let user = self.find(id)?;
        let private_key = user.key.private_key();
        Ok(crate::rsa::decrypt_text(values, &private_key.n, &private_key.d, self.padding_digits))
    }
}
