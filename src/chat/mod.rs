// Chat Module
// Local users exchanging RSA-encrypted messages through their inboxes

pub mod config;
pub mod directory;
pub mod error;
pub mod user;

pub use config::ChatConfig;
pub use directory::{RotationReport, UserDirectory};
pub use error::ChatError;
pub use user::{InboxBody, InboxContent, InboxEntry, InboxView, User};
