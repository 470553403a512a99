//! Typed document schema.
//!
//! The persisted form of a vault, mirrored as explicit serde structs so an
//! external loader can carry it in any serde format. The crate performs no
//! file I/O itself; conversion to and from the in-memory model lives on
//! [`Vault`](crate::core::vault::Vault).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::envelope::KeyKind;
use crate::core::types::{GroupName, SaltedCiphertext, UserName, WrappedKey};
use crate::error::{FormatError, Result};

/// The whole persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub users: BTreeMap<UserName, UserDoc>,
    pub groups: BTreeMap<GroupName, GroupDoc>,
}

/// One user record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDoc {
    pub key: KeyDoc,
}

/// Serialized key material with its family tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyDoc {
    #[serde(rename = "type")]
    pub kind: KeyKind,
    pub value: String,
}

/// One group record: wrapped key per member, wrapped key/value secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDoc {
    pub users: BTreeMap<UserName, WrappedKey>,
    pub values: BTreeMap<SaltedCiphertext, SaltedCiphertext>,
}

impl Document {
    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Document` on malformed JSON or missing required
    /// fields.
    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| FormatError::Document(e.to_string()).into())
    }

    /// Render the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FormatError::Document(e.to_string()).into())
    }
}
