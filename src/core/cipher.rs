//! Symmetric group-key encryption.
//!
//! Encrypts arbitrary UTF-8 strings under a group key using AES-256-CBC with
//! a fresh random IV per call. The textual form is `base64(IV).base64(ct)`,
//! so encrypting the same plaintext twice never yields the same ciphertext.
//!
//! No authentication tag is produced; a garbled ciphertext that happens to
//! unpad cleanly decrypts to garbage rather than failing. Callers must not
//! treat this primitive as authenticated encryption.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::{rngs::OsRng, RngCore};
use tracing::trace;
use zeroize::{Zeroize, Zeroizing};

use crate::core::types::SaltedCiphertext;
use crate::error::{FormatError, KeyError, Result};

/// Group key length in bytes (256-bit).
pub const GROUP_KEY_LEN: usize = 32;

/// IV length in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// Separator between the encoded IV and the encoded ciphertext.
const SALT_SEPARATOR: char = '.';

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// A group's 256-bit symmetric key.
///
/// Never persisted in plaintext. Held in memory only for the duration of one
/// vault operation and zeroized on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct GroupKey([u8; GROUP_KEY_LEN]);

impl GroupKey {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; GROUP_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build a key from raw bytes, e.g. an unwrapped envelope payload.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::BadLength` unless exactly [`GROUP_KEY_LEN`] bytes
    /// are supplied.
    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, KeyError> {
        if bytes.len() != GROUP_KEY_LEN {
            return Err(KeyError::BadLength(bytes.len()));
        }
        let mut key = [0u8; GROUP_KEY_LEN];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; GROUP_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material
        f.write_str("GroupKey(..)")
    }
}

/// Encrypt a UTF-8 string under a group key.
///
/// Draws an independent random IV on every call; two encryptions of the same
/// plaintext produce different ciphertexts.
pub fn encrypt(plaintext: &str, group_key: &GroupKey) -> SaltedCiphertext {
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(group_key.as_bytes().into(), &iv.into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

    trace!(
        plaintext_len = plaintext.len(),
        ciphertext_len = ciphertext.len(),
        "encrypted value"
    );

    format!(
        "{}{}{}",
        BASE64.encode(iv),
        SALT_SEPARATOR,
        BASE64.encode(&ciphertext)
    )
}

/// Decrypt a salted ciphertext under a group key.
///
/// The IV segment is everything before the first separator, consumed exactly.
///
/// # Errors
///
/// Returns `FormatError::NotSalted` if no separator is present, and other
/// `FormatError` variants for bad base64, a wrong-length IV, invalid padding,
/// or a decrypted payload that is not UTF-8.
pub fn decrypt(salted: &str, group_key: &GroupKey) -> Result<Zeroizing<String>> {
    let (iv_part, ct_part) = salted
        .split_once(SALT_SEPARATOR)
        .ok_or(FormatError::NotSalted)?;

    let iv: [u8; IV_LEN] = BASE64
        .decode(iv_part)
        .map_err(|e| FormatError::Encoding(e.to_string()))?
        .try_into()
        .map_err(|bytes: Vec<u8>| FormatError::BadIvLength(bytes.len()))?;

    let ciphertext = BASE64
        .decode(ct_part)
        .map_err(|e| FormatError::Encoding(e.to_string()))?;

    let plaintext = Aes256CbcDec::new(group_key.as_bytes().into(), (&iv).into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| FormatError::Padding)?;

    trace!(ciphertext_len = ciphertext.len(), "decrypted value");

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|_| FormatError::NotUtf8.into())
}
