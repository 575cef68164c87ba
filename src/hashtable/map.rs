/*
 * Created on Fri Jan 12 2024
 *
 * This file is a part of Vessel, a free and open-source, embeddable
 * collection of generic in-process container types (array, list, hash
 * map/set, ordered map/set, and a structured-format string buffer),
 * spun out of Skytable's storage-engine internals.
 *
 * Copyright (c) 2024, Sayan Nandan <ohsayan@outlook.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 *
*/

//! A hash map keyed by any `K: Hash + Eq`, open-addressed over
//! [`super::raw::RawTable`].

use core::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
};

use super::raw::RawTable;
use crate::hooks::BuildFx;

pub struct HMap<K, V, S = BuildFx> {
    raw: RawTable<K, V, S>,
}

impl<K, V> Default for HMap<K, V, BuildFx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> HMap<K, V, BuildFx> {
    pub fn new() -> Self {
        Self { raw: RawTable::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self
    where
        K: Hash + Eq,
    {
        Self {
            raw: RawTable::with_capacity_and_hasher(capacity, BuildFx::default()),
        }
    }
}

impl<K, V, S: BuildHasher + Default> HMap<K, V, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            raw: RawTable::with_hasher(hash_builder),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self
    where
        K: Hash + Eq,
    {
        Self {
            raw: RawTable::with_capacity_and_hasher(capacity, hash_builder),
        }
    }
}

impl<K, V, S: BuildHasher> HMap<K, V, S> {
    pub fn with_max_load(hash_builder: S, max_load: f64) -> Self {
        Self {
            raw: RawTable::with_hasher(hash_builder).with_max_load(max_load),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Reserve capacity for at least `additional` more entries. Returns
    /// `false` on allocation failure, leaving the map unchanged.
    pub fn reserve(&mut self, additional: usize) -> bool
    where
        K: Hash + Eq,
    {
        self.raw.reserve(additional)
    }

    /// Rebuild to fit the current length exactly. Returns `false` on
    /// allocation failure, leaving the map unchanged.
    pub fn shrink_to_fit(&mut self) -> bool
    where
        K: Hash + Eq,
    {
        self.raw.shrink_to_fit()
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    pub fn cleanup(&mut self) {
        self.raw.cleanup();
    }

    /// Insert `key`/`value`. `None` only on allocation failure (the map is
    /// left unchanged); otherwise `Some(None)` for a fresh key or
    /// `Some(Some(old))` when `key` was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<Option<V>>
    where
        K: Hash + Eq,
    {
        self.raw.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.get(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.raw.remove(key).map(|(_, v)| v)
    }

    /// Insert `key` with `make_value()` if absent, then return a mutable
    /// reference to its value either way. `None` only on allocation
    /// failure.
    pub fn get_or_insert_with(&mut self, key: K, make_value: impl FnOnce() -> V) -> Option<&mut V>
    where
        K: Hash + Eq + Clone,
    {
        self.raw.get_or_insert_with(key, make_value)
    }

    /// Drop every entry for which `f` returns `false`.
    pub fn retain(&mut self, f: impl FnMut(&K, &mut V) -> bool)
    where
        K: Hash + Eq,
    {
        self.raw.retain(f);
    }

    /// Remove and return every entry, leaving the map empty but with its
    /// allocation intact.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> {
        self.raw.drain()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.raw.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.raw.iter_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.raw.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.raw.iter().map(|(_, v)| v)
    }
}

impl<K: Clone, V: Clone, S: BuildHasher + Clone> Clone for HMap<K, V, S> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: Hash + Eq + fmt::Debug, V: fmt::Debug, S: BuildHasher> fmt::Debug for HMap<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, V: PartialEq, S: BuildHasher> PartialEq for HMap<K, V, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}
impl<K: Hash + Eq, V: Eq, S: BuildHasher> Eq for HMap<K, V, S> {}

impl<K: Hash + Eq, V, S: BuildHasher + Default> Extend<(K, V)> for HMap<K, V, S> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Hash + Eq, V, S: BuildHasher + Default> FromIterator<(K, V)> for HMap<K, V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(iter);
        out
    }
}

impl<K, V, S> IntoIterator for HMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = super::raw::IntoIterPairs<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.raw.into_iter_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_usage() {
        let mut m: HMap<&str, i32> = HMap::new();
        assert_eq!(m.insert("a", 1), Some(None));
        assert_eq!(m.insert("a", 2), Some(Some(1)));
        assert_eq!(m.get("a"), Some(&2));
        assert_eq!(m.remove("a"), Some(2));
        assert!(m.is_empty());
    }

    #[test]
    fn heterogeneous_lookup_by_string_key() {
        use crate::string::{TString, Width1};
        let mut m: HMap<TString<Width1>, u32> = HMap::new();
        m.insert(TString::from("France"), 1).unwrap();
        m.insert(TString::from("Germany"), 2).unwrap();
        assert_eq!(m.get(b"France".as_slice()), Some(&1));
        assert_eq!(m.get(b"Spain".as_slice()), None);
    }

    #[test]
    fn equality_is_order_independent() {
        let a: HMap<i32, i32> = [(1, 1), (2, 2)].into_iter().collect();
        let b: HMap<i32, i32> = [(2, 2), (1, 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn get_or_insert_with_only_calls_builder_on_miss() {
        let mut m: HMap<&str, i32> = HMap::new();
        *m.get_or_insert_with("a", || 1).unwrap() += 9;
        assert_eq!(m.get("a"), Some(&10));
        *m.get_or_insert_with("a", || panic!("should not rebuild")).unwrap() += 1;
        assert_eq!(m.get("a"), Some(&11));
    }

    #[test]
    fn retain_drops_non_matching_entries() {
        let mut m: HMap<i32, i32> = (0..10).map(|i| (i, i)).collect();
        m.retain(|k, _| k % 2 == 0);
        assert_eq!(m.len(), 5);
        assert!(m.iter().all(|(k, _)| k % 2 == 0));
    }

    #[test]
    fn drain_empties_the_map_and_yields_every_entry() {
        let mut m: HMap<i32, i32> = (0..5).map(|i| (i, i * i)).collect();
        let mut drained: Vec<(i32, i32)> = m.drain().collect();
        drained.sort();
        assert_eq!(drained, vec![(0, 0), (1, 1), (2, 4), (3, 9), (4, 16)]);
        assert!(m.is_empty());
        assert_eq!(m.capacity() > 0, true);
    }
}
