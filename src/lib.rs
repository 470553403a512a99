//! Warren - a group-based envelope-encrypted secret store.
//!
//! A set of users, each holding an RSA keypair, collaborate inside named
//! groups. Each group has a symmetric key that is never stored in the clear;
//! it is wrapped individually under every member's public key, and it in
//! turn encrypts the group's secret keys and values.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── error             # Error enums and the crate Result alias
//! └── core/             # Core library components
//!     ├── envelope      # RSA wrap/unwrap of group keys, PEM loading
//!     ├── cipher        # AES-256-CBC salted encryption under a group key
//!     ├── domain/       # Users, groups, and their registries
//!     ├── document      # Typed serde schema for the persisted form
//!     └── vault         # Orchestration: membership, secrets, re-keying
//! ```
//!
//! # Features
//!
//! - Envelope encryption: one wrapped group key per member
//! - Non-deterministic secret storage (fresh IV per encryption)
//! - Membership changes without re-encrypting the secret set
//! - Atomic re-keying that re-wraps members and re-encrypts secrets
//! - Format-agnostic document conversion; no file I/O in the core
//!
//! The vault assumes exclusive access for the duration of each operation;
//! callers serving concurrent writers must serialize them per vault.

pub mod core;
pub mod error;

pub use crate::core::document::Document;
pub use crate::core::envelope::{KeyKind, PrivateKey, PublicKey};
pub use crate::core::vault::Vault;
pub use crate::error::{FormatError, KeyError, Result, VaultError};
