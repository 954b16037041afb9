//! In-memory profile store
//!
//! Keeps one [`Profile`] per address in insertion order. Re-inserting an
//! address replaces its figures in place, so the enumeration order seen by
//! the clustering engine only ever grows at the tail.

use std::collections::HashMap;

use crate::address::Address;
use crate::profile::Profile;

/// Address -> profile mapping with stable enumeration order
#[derive(Debug, Default)]
pub struct ProfileStore {
    /// Profiles in first-seen order
    profiles: Vec<Profile>,
    /// Address -> index into `profiles`
    index: HashMap<Address, usize>,
}

impl ProfileStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or fully replace the profile for `address`
    ///
    /// The previous cluster label is dropped; it comes back on the next
    /// clustering pass.
    pub fn upsert(&mut self, address: Address, balance: f64, tx_count: u64) -> Profile {
        let profile = Profile::new(address.clone(), balance, tx_count);

        match self.index.get(&address) {
            Some(&slot) => self.profiles[slot] = profile.clone(),
            None => {
                self.index.insert(address, self.profiles.len());
                self.profiles.push(profile.clone());
            }
        }

        profile
    }

    /// Look up a profile
    pub fn get(&self, address: &Address) -> Option<&Profile> {
        self.index.get(address).map(|&slot| &self.profiles[slot])
    }

    /// Check whether `address` has been stored
    pub fn contains(&self, address: &Address) -> bool {
        self.index.contains_key(address)
    }

    /// `(balance, tx_count)` for an address, or the zero vector if absent
    pub fn vector(&self, address: &Address) -> [f64; 2] {
        self.get(address).map(Profile::vector).unwrap_or([0.0, 0.0])
    }

    /// Number of distinct addresses held
    pub fn size(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate profiles in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.iter()
    }

    /// All profile vectors in enumeration order
    pub fn vectors(&self) -> Vec<[f64; 2]> {
        self.profiles.iter().map(Profile::vector).collect()
    }

    /// Write cluster labels back, one per profile in enumeration order
    ///
    /// Returns `false` (and writes nothing) if the label count does not match.
    pub fn assign_clusters(&mut self, labels: &[usize]) -> bool {
        if labels.len() != self.profiles.len() {
            return false;
        }
        for (profile, &label) in self.profiles.iter_mut().zip(labels) {
            profile.cluster = Some(label);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{:040x}", n)).unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let mut store = ProfileStore::new();
        assert!(store.is_empty());

        store.upsert(addr(1), 1.5, 10);
        let profile = store.get(&addr(1)).unwrap();
        assert_eq!(profile.balance, 1.5);
        assert_eq!(profile.tx_count, 10);
        assert_eq!(profile.cluster, None);
        assert_eq!(store.size(), 1);
        assert!(store.contains(&addr(1)));
        assert!(!store.contains(&addr(2)));
    }

    #[test]
    fn test_upsert_overwrites_and_keeps_position() {
        let mut store = ProfileStore::new();
        store.upsert(addr(1), 1.0, 1);
        store.upsert(addr(2), 2.0, 2);
        store.assign_clusters(&[0, 1]);

        store.upsert(addr(1), 9.0, 90);

        assert_eq!(store.size(), 2);
        let profile = store.get(&addr(1)).unwrap();
        assert_eq!(profile.vector(), [9.0, 90.0]);
        assert_eq!(profile.cluster, None, "re-query invalidates the cluster");
        assert_eq!(store.get(&addr(2)).unwrap().cluster, Some(1));

        let order: Vec<_> = store.iter().map(|p| p.address.clone()).collect();
        assert_eq!(order, vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_vector_defaults_to_zero() {
        let mut store = ProfileStore::new();
        assert_eq!(store.vector(&addr(7)), [0.0, 0.0]);

        store.upsert(addr(7), 0.5, 3);
        assert_eq!(store.vector(&addr(7)), [0.5, 3.0]);
    }

    #[test]
    fn test_assign_clusters_length_mismatch() {
        let mut store = ProfileStore::new();
        store.upsert(addr(1), 1.0, 1);
        store.upsert(addr(2), 2.0, 2);

        assert!(!store.assign_clusters(&[0]));
        assert!(store.iter().all(|p| p.cluster.is_none()));

        assert!(store.assign_clusters(&[2, 0]));
        assert_eq!(store.get(&addr(1)).unwrap().cluster, Some(2));
        assert_eq!(store.vectors(), vec![[1.0, 1.0], [2.0, 2.0]]);
    }
}
