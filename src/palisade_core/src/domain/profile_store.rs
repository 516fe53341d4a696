use serde::{Deserialize, Serialize};

use crate::domain::profile::UserProfile;

/// An ordered mapping from client name to profile.
///
/// Keys are unique. Insertion order is meaningful: the first entry is the
/// "first profile" for single-profile semantics, and upserting an existing
/// key keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    entries: Vec<(String, UserProfile)>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding a single profile under its own store key.
    pub fn from_profile(profile: UserProfile) -> Self {
        let mut store = Self::new();
        store.put(profile.store_key().to_string(), profile);
        store
    }

    /// Insert or replace the entry for `key`, keeping its position when the
    /// key already exists.
    pub fn put(&mut self, key: impl Into<String>, profile: UserProfile) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = profile,
            None => self.entries.push((key, profile)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&UserProfile> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, profile)| profile)
    }

    pub fn first(&self) -> Option<&UserProfile> {
        self.entries.first().map(|(_, profile)| profile)
    }

    /// The first profile belonging to an actual identity.
    pub fn first_non_anonymous(&self) -> Option<&UserProfile> {
        self.entries
            .iter()
            .map(|(_, profile)| profile)
            .find(|profile| !profile.is_anonymous())
    }

    /// Apply every entry of `other` on top of this store, in `other`'s
    /// order. Existing keys are overwritten in place.
    pub fn merge(&mut self, other: ProfileStore) {
        for (key, profile) in other.entries {
            self.put(key, profile);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn profiles(&self) -> Vec<UserProfile> {
        self.entries
            .iter()
            .map(|(_, profile)| profile.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
