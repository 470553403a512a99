//! Vault.
//!
//! The root aggregate combining the user and group registries. Every
//! creation, removal, or mutation of a user or group goes through here, so
//! the confidentiality invariants hold at all times: plaintext group keys
//! and secret values are never stored, and a group with members is never
//! reduced to zero members.

use std::collections::BTreeMap;

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::cipher::GroupKey;
use crate::core::document::{Document, GroupDoc, KeyDoc, UserDoc};
use crate::core::domain::{Group, Groups, User, Users};
use crate::core::envelope::{PrivateKey, PublicKey};
use crate::core::types::{SecretKey, WrappedKey};
use crate::error::{Result, VaultError};

/// The primary interface for all vault operations.
///
/// An explicit value owned by the caller; load and save happen at the
/// document boundary, never implicitly.
#[derive(Debug, Default)]
pub struct Vault {
    users: Users,
    groups: Groups,
}

impl Vault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Document boundary ---

    /// Build a vault from a persisted document.
    ///
    /// # Errors
    ///
    /// Returns `KeyError` if any user's PEM material fails to parse.
    pub fn from_document(doc: Document) -> Result<Self> {
        let mut users = Users::new();
        for (name, user_doc) in doc.users {
            let key = PublicKey::from_pem(&user_doc.key.value, None)?;
            users.insert(User::new(name, key));
        }

        let mut groups = Groups::new();
        for (name, group_doc) in doc.groups {
            groups.insert(name, Group::from_parts(group_doc.users, group_doc.values));
        }

        Ok(Self { users, groups })
    }

    /// Render the vault as a document, PEM text emitted verbatim.
    pub fn to_document(&self) -> Document {
        let users = self
            .users
            .iter()
            .map(|user| {
                (
                    user.name().to_string(),
                    UserDoc {
                        key: KeyDoc {
                            kind: user.key().kind(),
                            value: user.key().pem().to_string(),
                        },
                    },
                )
            })
            .collect();

        let groups = self
            .groups
            .iter()
            .map(|(name, group)| {
                (
                    name.to_string(),
                    GroupDoc {
                        users: group
                            .members()
                            .map(|member| {
                                let wrapped = group
                                    .wrapped_key(member)
                                    .unwrap_or_default()
                                    .to_string();
                                (member.to_string(), wrapped)
                            })
                            .collect(),
                        values: group.secrets().clone(),
                    },
                )
            })
            .collect();

        Document { users, groups }
    }

    // --- Registries ---

    /// Registered users.
    pub fn users(&self) -> &Users {
        &self.users
    }

    /// Registered groups.
    pub fn groups(&self) -> &Groups {
        &self.groups
    }

    // --- Users ---

    /// Register a user from their public key PEM.
    ///
    /// # Errors
    ///
    /// Returns `UserExists` on a duplicate name and `KeyError` if the key
    /// material fails to parse.
    pub fn add_user(&mut self, name: &str, pem: &str, passphrase: Option<&str>) -> Result<()> {
        if self.users.contains(name) {
            return Err(VaultError::UserExists(name.to_string()));
        }

        let key = PublicKey::from_pem(pem, passphrase)?;
        self.users.insert(User::new(name.to_string(), key));

        debug!(user = name, "added user");
        Ok(())
    }

    /// Remove a user from the registry and from every group.
    ///
    /// Scans all groups before mutating anything: if removal would leave any
    /// group empty the operation fails and the vault is untouched.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for an unknown name and `SoleMember` if the
    /// user is the only member of some group.
    pub fn remove_user(&mut self, name: &str) -> Result<()> {
        if !self.users.contains(name) {
            return Err(VaultError::UserNotFound(name.to_string()));
        }

        // Dry-run scan; mutation starts only once every group is safe.
        for (group_name, group) in self.groups.iter() {
            if group.is_member(name) && group.member_count() == 1 {
                return Err(VaultError::SoleMember {
                    user: name.to_string(),
                    group: group_name.to_string(),
                });
            }
        }

        for (_, group) in self.groups.iter_mut() {
            group.remove_member(name);
        }
        self.users.remove(name);

        debug!(user = name, "removed user");
        Ok(())
    }

    // --- Groups ---

    /// Create a group with a fresh key wrapped for each founding member.
    ///
    /// # Errors
    ///
    /// Returns `GroupExists` on a duplicate name, `NoMembers` for an empty
    /// member list, and `UserNotFound` for any unregistered member.
    pub fn add_group<S: AsRef<str>>(&mut self, name: &str, member_names: &[S]) -> Result<()> {
        if self.groups.contains(name) {
            return Err(VaultError::GroupExists(name.to_string()));
        }
        if member_names.is_empty() {
            return Err(VaultError::NoMembers(name.to_string()));
        }

        let group_key = GroupKey::generate();

        let mut members: BTreeMap<String, WrappedKey> = BTreeMap::new();
        for member in member_names {
            let member = member.as_ref();
            let user = self
                .users
                .get(member)
                .ok_or_else(|| VaultError::UserNotFound(member.to_string()))?;
            members.insert(member.to_string(), user.key().wrap(&group_key)?);
        }

        debug!(group = name, members = members.len(), "added group");
        self.groups.insert(name.to_string(), Group::new(members));
        Ok(())
    }

    /// Wrap the group's current key for each new member.
    ///
    /// The symmetric key does not change, so existing secrets stay
    /// decryptable without re-encryption.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`/`UserNotFound`/`NotAMember` during
    /// resolution and `KeyError` if unwrapping or wrapping fails.
    pub fn add_members<S: AsRef<str>>(
        &mut self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
        new_members: &[S],
    ) -> Result<()> {
        let group_key = self.group_key(group_name, acting_user, private_key)?;

        // Wrap for everyone before touching the group.
        let mut wrapped = Vec::with_capacity(new_members.len());
        for member in new_members {
            let member = member.as_ref();
            let user = self
                .users
                .get(member)
                .ok_or_else(|| VaultError::UserNotFound(member.to_string()))?;
            wrapped.push((member.to_string(), user.key().wrap(&group_key)?));
        }

        let group = self.group_mut(group_name)?;
        let count = wrapped.len();
        for (member, wrapped_key) in wrapped {
            group.set_wrapped_key(member, wrapped_key);
        }

        debug!(group = group_name, added = count, "added members to group");
        Ok(())
    }

    // --- Secrets ---

    /// Insert or update secret values in a group.
    ///
    /// Entries whose stored value already matches are left untouched,
    /// ciphertext included.
    ///
    /// # Errors
    ///
    /// Returns resolution errors as [`Self::add_members`], plus
    /// `FormatError` if an existing entry fails to decrypt.
    pub fn set_values(
        &mut self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
        entries: &BTreeMap<String, String>,
    ) -> Result<()> {
        let group_key = self.group_key(group_name, acting_user, private_key)?;

        let group = self.group_mut(group_name)?;
        for (name, value) in entries {
            group.upsert(name, value, &group_key)?;
        }

        debug!(group = group_name, entries = entries.len(), "set values");
        Ok(())
    }

    /// Remove secret values by key; absent keys are silently ignored.
    pub fn remove_values<S: AsRef<str>>(
        &mut self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
        keys: &[S],
    ) -> Result<()> {
        let group_key = self.group_key(group_name, acting_user, private_key)?;

        let group = self.group_mut(group_name)?;
        group.remove(keys, &group_key)?;

        debug!(group = group_name, "removed values");
        Ok(())
    }

    /// Replace the group's symmetric key.
    ///
    /// Re-wraps the new key for every current member and re-encrypts every
    /// secret under it. All re-wraps and re-encryptions are staged first and
    /// swapped in together, so a failure partway leaves the group exactly as
    /// it was.
    ///
    /// # Errors
    ///
    /// Returns resolution errors as [`Self::add_members`], `UserNotFound` if
    /// a member is no longer registered, and `KeyError`/`FormatError` from
    /// the cryptographic steps.
    pub fn rekey(
        &mut self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
    ) -> Result<()> {
        let old_key = self.group_key(group_name, acting_user, private_key)?;
        let new_key = GroupKey::generate();

        let group = self.group_ref(group_name)?;
        let mut members: BTreeMap<String, WrappedKey> = BTreeMap::new();
        for member in group.members() {
            let user = self
                .users
                .get(member)
                .ok_or_else(|| VaultError::UserNotFound(member.to_string()))?;
            members.insert(member.to_string(), user.key().wrap(&new_key)?);
        }

        let group = self.group_mut(group_name)?;
        group.reencrypt(&old_key, &new_key)?;
        group.replace_members(members);

        debug!(group = group_name, "rekeyed group");
        Ok(())
    }

    /// Decrypt a group's full secret set.
    pub fn decrypt_group(
        &self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
    ) -> Result<BTreeMap<SecretKey, Zeroizing<String>>> {
        let group_key = self.group_key(group_name, acting_user, private_key)?;
        self.group_ref(group_name)?.decrypt_all(&group_key)
    }

    // --- Private helpers ---

    /// Resolve a group's symmetric key through an acting member.
    fn group_key(
        &self,
        group_name: &str,
        acting_user: &str,
        private_key: &PrivateKey,
    ) -> Result<GroupKey> {
        let group = self.group_ref(group_name)?;

        if !self.users.contains(acting_user) {
            return Err(VaultError::UserNotFound(acting_user.to_string()));
        }

        let wrapped = group
            .wrapped_key(acting_user)
            .ok_or_else(|| VaultError::NotAMember {
                user: acting_user.to_string(),
                group: group_name.to_string(),
            })?;

        Ok(private_key.unwrap(wrapped)?)
    }

    fn group_ref(&self, name: &str) -> Result<&Group> {
        self.groups
            .get(name)
            .ok_or_else(|| VaultError::GroupNotFound(name.to_string()))
    }

    fn group_mut(&mut self, name: &str) -> Result<&mut Group> {
        self.groups
            .get_mut(name)
            .ok_or_else(|| VaultError::GroupNotFound(name.to_string()))
    }
}
