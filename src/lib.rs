//! Textbook RSA built from first principles, plus a small local chat that
//! uses it to exchange messages between registered users.
//!
//! The [`rsa`] module holds the arithmetic: prime generation, modular
//! exponentiation and inverses, decimal padding, the per-character codec and
//! a key-recovery routine that factors small moduli. The [`chat`] module
//! keeps users, inboxes and the JSON store.

pub mod chat;
pub mod error;
pub mod rsa;
pub mod util;

pub use error::{Result, RsaError};
