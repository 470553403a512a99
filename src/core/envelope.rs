//! Asymmetric wrapping of group keys.
//!
//! Wraps (RSA-encrypts) a group key under a member's public key so that only
//! the holder of the matching private key can recover it. Key material is
//! loaded from PEM; private keys may be passphrase-encrypted PKCS#8.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use pkcs8::{DecodePrivateKey, DecodePublicKey};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::trace;
use zeroize::Zeroizing;

use crate::core::cipher::GroupKey;
use crate::core::types::WrappedKey;
use crate::error::KeyError;

type KeyResult<T> = std::result::Result<T, KeyError>;

/// Supported asymmetric key families.
///
/// Serialized as `rsa-ssh` for document compatibility. The tag is preserved
/// for forward extensibility but not otherwise interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyKind {
    #[serde(rename = "rsa-ssh")]
    Rsa,
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rsa => f.write_str("rsa-ssh"),
        }
    }
}

/// A member's public key, used to wrap group keys.
///
/// Retains the PEM text it was loaded from so the persisted document
/// round-trips byte-for-byte.
#[derive(Clone)]
pub struct PublicKey {
    kind: KeyKind,
    inner: RsaPublicKey,
    pem: String,
}

impl PublicKey {
    /// Load a public key from PEM contents.
    ///
    /// Accepts SPKI (`BEGIN PUBLIC KEY`) and PKCS#1 (`BEGIN RSA PUBLIC KEY`)
    /// encodings. `_passphrase` mirrors [`PrivateKey::from_pem`]; public PEM
    /// material is never encrypted, so it is unused.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidFormat` if the contents parse as neither
    /// encoding.
    pub fn from_pem(contents: &str, _passphrase: Option<&str>) -> KeyResult<Self> {
        let inner = RsaPublicKey::from_public_key_pem(contents)
            .or_else(|_| RsaPublicKey::from_pkcs1_pem(contents))
            .map_err(|e| KeyError::InvalidFormat(e.to_string()))?;

        Ok(Self {
            kind: KeyKind::Rsa,
            inner,
            pem: contents.to_string(),
        })
    }

    /// Wrap a group key for the holder of the matching private key.
    ///
    /// RSA PKCS#1 v1.5 encryption of the raw key bytes, base64 encoded.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::WrapFailed` if the payload exceeds the modulus
    /// capacity or the key material is unusable.
    pub fn wrap(&self, group_key: &GroupKey) -> KeyResult<WrappedKey> {
        let wrapped = self
            .inner
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, group_key.as_bytes())
            .map_err(|e| KeyError::WrapFailed(e.to_string()))?;

        trace!(wrapped_len = wrapped.len(), "wrapped group key");

        Ok(BASE64.encode(wrapped))
    }

    /// Key family tag.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// PEM text the key was loaded from.
    pub fn pem(&self) -> &str {
        &self.pem
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicKey")
            .field("kind", &self.kind)
            .field("bits", &(self.inner.size() * 8))
            .finish()
    }
}

/// A member's private key, used to unwrap group keys.
///
/// Supplied by the caller per operation; the vault never stores one.
pub struct PrivateKey {
    kind: KeyKind,
    inner: RsaPrivateKey,
}

impl PrivateKey {
    /// Load a private key from PEM contents.
    ///
    /// With a passphrase the contents must be encrypted PKCS#8
    /// (`BEGIN ENCRYPTED PRIVATE KEY`); without one, plain PKCS#8
    /// (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) are
    /// accepted.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidFormat` on unsupported encodings or a wrong
    /// passphrase.
    pub fn from_pem(contents: &str, passphrase: Option<&str>) -> KeyResult<Self> {
        let inner = match passphrase {
            Some(passphrase) => RsaPrivateKey::from_pkcs8_encrypted_pem(contents, passphrase)
                .map_err(|e| KeyError::InvalidFormat(e.to_string()))?,
            None => RsaPrivateKey::from_pkcs8_pem(contents)
                .or_else(|_| RsaPrivateKey::from_pkcs1_pem(contents))
                .map_err(|e| KeyError::InvalidFormat(e.to_string()))?,
        };

        Ok(Self {
            kind: KeyKind::Rsa,
            inner,
        })
    }

    /// Unwrap a group key that was wrapped for this keypair.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::UnwrapFailed` on bad base64 or a ciphertext wrapped
    /// under a different keypair, and `KeyError::BadLength` if the recovered
    /// payload is not a group key.
    pub fn unwrap(&self, wrapped: &str) -> KeyResult<GroupKey> {
        let ciphertext = BASE64
            .decode(wrapped)
            .map_err(|e| KeyError::UnwrapFailed(e.to_string()))?;

        let payload = Zeroizing::new(
            self.inner
                .decrypt(Pkcs1v15Encrypt, &ciphertext)
                .map_err(|e| KeyError::UnwrapFailed(e.to_string()))?,
        );

        trace!("unwrapped group key");

        GroupKey::from_bytes(&payload)
    }

    /// Key family tag.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrivateKey")
            .field("kind", &self.kind)
            .finish()
    }
}
