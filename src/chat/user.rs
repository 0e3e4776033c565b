// Users and Inbox Entries

use serde::{Deserialize, Serialize};

use crate::rsa::{EncryptedMessage, Keypair};

/// A registered user: a name, a key and the messages sent to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub username: String,
    pub key: Keypair,
    #[serde(default)]
    pub inbox: Vec<InboxEntry>,
}

/// One received message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub sender_id: u32,
    /// `dd/mm/YYYY`
    pub date: String,
    pub body: InboxBody,
}

/// Stored form of a message. `Corrupted` marks an entry that could not be
/// carried over a key rotation and is lost for good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboxBody {
    Encrypted(EncryptedMessage),
    Corrupted,
}

/// Decrypted view of an inbox entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboxView {
    pub sender: String,
    pub date: String,
    pub content: InboxContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxContent {
    Text(String),
    Corrupted,
}

impl InboxContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InboxContent::Text(text) => Some(text),
            InboxContent::Corrupted => None,
        }
    }
}

impl std::fmt::Display for InboxContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InboxContent::Text(text) => f.write_str(text),
            InboxContent::Corrupted => f.write_str("CORRUPTED MESSAGE"),
        }
    }
}
