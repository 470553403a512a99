//! Test support utilities for warren integration tests.
//!
//! Provides keypair fixtures and a builder for populated vaults.

#![allow(dead_code)]

use std::collections::BTreeMap;

use pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use warren::{PrivateKey, Vault};

/// Generate an RSA keypair as (public PEM, parsed private key).
///
/// 1024-bit keys keep the suite fast; capacity is ample for a group key.
pub fn keypair() -> (String, PrivateKey) {
    let private = RsaPrivateKey::new(&mut OsRng, 1024).expect("keygen");
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("public pem");
    let private_pem = private.to_pkcs8_pem(LineEnding::LF).expect("private pem");

    (
        public_pem,
        PrivateKey::from_pem(&private_pem, None).expect("parse private"),
    )
}

/// Generate an RSA keypair with both halves as PEM text.
pub fn keypair_pem() -> (String, String) {
    let private = RsaPrivateKey::new(&mut OsRng, 1024).expect("keygen");
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("public pem");
    let private_pem = private.to_pkcs8_pem(LineEnding::LF).expect("private pem");

    (public_pem, private_pem.to_string())
}

/// Create a vault with one registered user per name, returning their
/// private keys alongside.
pub fn vault_with_users(names: &[&str]) -> (Vault, BTreeMap<String, PrivateKey>) {
    let mut vault = Vault::new();
    let mut keys = BTreeMap::new();
    for name in names {
        let (public_pem, private) = keypair();
        vault.add_user(name, &public_pem, None).expect("add user");
        keys.insert(name.to_string(), private);
    }
    (vault, keys)
}

/// Build an entries map from string pairs.
pub fn entries(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
