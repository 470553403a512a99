//! Users and the user registry.

use std::collections::BTreeMap;

use crate::core::envelope::PublicKey;
use crate::core::types::UserName;

/// A registered user and their public key.
///
/// Created on registration, destroyed on removal; the registry owns every
/// instance exclusively.
#[derive(Debug, Clone)]
pub struct User {
    name: UserName,
    key: PublicKey,
}

impl User {
    pub(crate) fn new(name: UserName, key: PublicKey) -> Self {
        Self { name, key }
    }

    /// The user's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user's public key.
    pub fn key(&self) -> &PublicKey {
        &self.key
    }
}

/// Flat collection of users keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Users(BTreeMap<UserName, User>);

impl Users {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&User> {
        self.0.get(name)
    }

    pub(crate) fn insert(&mut self, user: User) {
        self.0.insert(user.name.clone(), user);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<User> {
        self.0.remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
