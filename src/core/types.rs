//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A registered user's name (unique within the vault).
pub type UserName = String;

/// A group's name (unique within the vault).
pub type GroupName = String;

/// A plaintext secret key name within a group.
pub type SecretKey = String;

/// A group key wrapped under a member's public key.
///
/// Base64 of the asymmetric-encryption output.
pub type WrappedKey = String;

/// The textual form of a symmetric encryption result.
///
/// `base64(IV) + "." + base64(ciphertext)`; the IV is unique per call.
pub type SaltedCiphertext = String;
