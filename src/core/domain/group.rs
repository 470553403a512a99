//! Groups, their secret stores, and the group registry.
//!
//! A group holds two maps of opaque ciphertext: the group key wrapped per
//! member, and the secret entries where both key and value are encrypted
//! under the group's current symmetric key. Plaintext never lands in either
//! map.

use std::collections::BTreeMap;

use tracing::trace;
use zeroize::Zeroizing;

use crate::core::cipher::{self, GroupKey};
use crate::core::types::{GroupName, SaltedCiphertext, SecretKey, UserName, WrappedKey};
use crate::error::Result;

/// One group's member map and secret store.
///
/// Every `members` entry is the group's current symmetric key wrapped for
/// that member's public key; every `secrets` entry has key and value
/// encrypted under the same key version.
#[derive(Debug, Clone, Default)]
pub struct Group {
    members: BTreeMap<UserName, WrappedKey>,
    secrets: BTreeMap<SaltedCiphertext, SaltedCiphertext>,
}

impl Group {
    /// Create a group with an initial member map and no secrets.
    pub(crate) fn new(members: BTreeMap<UserName, WrappedKey>) -> Self {
        Self {
            members,
            secrets: BTreeMap::new(),
        }
    }

    /// Rebuild a group from its persisted parts.
    pub(crate) fn from_parts(
        members: BTreeMap<UserName, WrappedKey>,
        secrets: BTreeMap<SaltedCiphertext, SaltedCiphertext>,
    ) -> Self {
        Self { members, secrets }
    }

    // --- Members ---

    /// Member names, sorted.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// The group key wrapped for a member, if they belong to the group.
    pub fn wrapped_key(&self, member: &str) -> Option<&str> {
        self.members.get(member).map(String::as_str)
    }

    pub(crate) fn set_wrapped_key(&mut self, member: UserName, wrapped: WrappedKey) {
        self.members.insert(member, wrapped);
    }

    pub(crate) fn remove_member(&mut self, name: &str) -> Option<WrappedKey> {
        self.members.remove(name)
    }

    pub(crate) fn replace_members(&mut self, members: BTreeMap<UserName, WrappedKey>) {
        self.members = members;
    }

    // --- Secrets ---

    pub fn secret_count(&self) -> usize {
        self.secrets.len()
    }

    pub(crate) fn secrets(&self) -> &BTreeMap<SaltedCiphertext, SaltedCiphertext> {
        &self.secrets
    }

    /// Map plaintext secret keys to their wrapped form.
    ///
    /// Decrypts every wrapped key in the store; O(secrets). This is the
    /// dominant cost of every write and removal.
    pub fn key_index(
        &self,
        group_key: &GroupKey,
    ) -> Result<BTreeMap<SecretKey, SaltedCiphertext>> {
        let mut index = BTreeMap::new();
        for wrapped_name in self.secrets.keys() {
            let name = cipher::decrypt(wrapped_name, group_key)?;
            index.insert(name.to_string(), wrapped_name.clone());
        }
        Ok(index)
    }

    /// Decrypt every key/value pair for full disclosure.
    pub fn decrypt_all(
        &self,
        group_key: &GroupKey,
    ) -> Result<BTreeMap<SecretKey, Zeroizing<String>>> {
        let mut pairs = BTreeMap::new();
        for (wrapped_name, wrapped_value) in &self.secrets {
            let name = cipher::decrypt(wrapped_name, group_key)?;
            let value = cipher::decrypt(wrapped_value, group_key)?;
            pairs.insert(name.to_string(), value);
        }
        Ok(pairs)
    }

    /// Insert or update one secret.
    ///
    /// An existing key whose stored value already equals `value` is left
    /// untouched, ciphertext included; a differing value is overwritten at
    /// the existing wrapped key. A new key gets a fresh wrapped entry.
    pub(crate) fn upsert(&mut self, name: &str, value: &str, group_key: &GroupKey) -> Result<()> {
        let index = self.key_index(group_key)?;

        match index.get(name) {
            Some(wrapped_name) => {
                let unchanged = match self.secrets.get(wrapped_name) {
                    Some(current) => cipher::decrypt(current, group_key)?.as_str() == value,
                    None => false,
                };
                if !unchanged {
                    self.secrets
                        .insert(wrapped_name.clone(), cipher::encrypt(value, group_key));
                    trace!("updated secret value");
                }
            }
            None => {
                let wrapped_name = cipher::encrypt(name, group_key);
                self.secrets
                    .insert(wrapped_name, cipher::encrypt(value, group_key));
                trace!("inserted secret value");
            }
        }

        Ok(())
    }

    /// Remove secrets by plaintext key; absent keys are silently ignored.
    pub(crate) fn remove<S: AsRef<str>>(
        &mut self,
        names: &[S],
        group_key: &GroupKey,
    ) -> Result<()> {
        let index = self.key_index(group_key)?;

        for name in names {
            if let Some(wrapped_name) = index.get(name.as_ref()) {
                self.secrets.remove(wrapped_name);
            }
        }

        Ok(())
    }

    /// Re-encrypt every secret under a new group key.
    ///
    /// Stages all pairs into a fresh map and swaps it in only after every
    /// entry re-encrypted; on failure the live store is untouched.
    pub(crate) fn reencrypt(&mut self, old_key: &GroupKey, new_key: &GroupKey) -> Result<()> {
        let mut staged = BTreeMap::new();
        for (wrapped_name, wrapped_value) in &self.secrets {
            let name = cipher::decrypt(wrapped_name, old_key)?;
            let value = cipher::decrypt(wrapped_value, old_key)?;
            staged.insert(
                cipher::encrypt(&name, new_key),
                cipher::encrypt(&value, new_key),
            );
        }

        self.secrets = staged;
        Ok(())
    }
}

/// Flat collection of groups keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Groups(BTreeMap<GroupName, Group>);

impl Groups {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.0.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.0.get_mut(name)
    }

    pub(crate) fn insert(&mut self, name: GroupName, group: Group) {
        self.0.insert(name, group);
    }

    /// Group names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.0.iter().map(|(name, group)| (name.as_str(), group))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Group)> {
        self.0.iter_mut().map(|(name, group)| (name.as_str(), group))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
