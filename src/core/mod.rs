//! Core library components.
//!
//! This module contains the reusable business logic for envelope-encrypted
//! group secret sharing: key wrapping, symmetric encryption, the group data
//! model, and the vault orchestration.

pub mod cipher;
pub mod document;
pub mod domain;
pub mod envelope;
pub mod types;
pub mod vault;
