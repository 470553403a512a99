//! Error types.
//!
//! Granular enums for the two cryptographic layers plus the operation-level
//! `VaultError`. Every vault operation either completes fully or fails with
//! one of these; there are no partial-success return values and no internal
//! retries.

use thiserror::Error;

/// Key load, wrap, or unwrap failure.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("unsupported key material: {0}")]
    InvalidFormat(String),

    #[error("wrap failed: {0}")]
    WrapFailed(String),

    #[error("unwrap failed: {0}")]
    UnwrapFailed(String),

    #[error("unwrapped payload is {0} bytes, expected 32")]
    BadLength(usize),
}

/// Malformed salted ciphertext or document.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("value is not salted")]
    NotSalted,

    #[error("invalid base64: {0}")]
    Encoding(String),

    #[error("initialization vector is {0} bytes, expected 16")]
    BadIvLength(usize),

    #[error("invalid padding")]
    Padding,

    #[error("decrypted payload is not UTF-8")]
    NotUtf8,

    #[error("malformed document: {0}")]
    Document(String),
}

/// Operation-level errors reported by the vault.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("user already exists: {0}")]
    UserExists(String),

    #[error("group already exists: {0}")]
    GroupExists(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("group not found: {0}")]
    GroupNotFound(String),

    #[error("user {user} is not a member of group {group}")]
    NotAMember { user: String, group: String },

    #[error("user {user} is the only member of group {group}")]
    SoleMember { user: String, group: String },

    #[error("group {0} needs at least one member")]
    NoMembers(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

pub type Result<T> = std::result::Result<T, VaultError>;
