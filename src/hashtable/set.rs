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

//! A hash set, built directly on [`super::map::HMap`] keyed by `()`, same
//! as `std::collections::HashSet` is built on `HashMap`.

use core::{
    borrow::Borrow,
    fmt,
    hash::{BuildHasher, Hash},
};

use super::map::HMap;
use crate::hooks::BuildFx;

pub struct HSet<K, S = BuildFx> {
    inner: HMap<K, (), S>,
}

impl<K> Default for HSet<K, BuildFx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> HSet<K, BuildFx> {
    pub fn new() -> Self {
        Self { inner: HMap::new() }
    }
}

impl<K, S: BuildHasher + Default> HSet<K, S> {
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            inner: HMap::with_hasher(hash_builder),
        }
    }
}

impl<K, S: BuildHasher> HSet<K, S> {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    pub fn reserve(&mut self, additional: usize) -> bool
    where
        K: Hash + Eq,
    {
        self.inner.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) -> bool
    where
        K: Hash + Eq,
    {
        self.inner.shrink_to_fit()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn cleanup(&mut self) {
        self.inner.cleanup();
    }

    /// Insert `key`. `None` only on allocation failure (the set is left
    /// unchanged); otherwise `Some(true)` if it was newly inserted,
    /// `Some(false)` if it was already present (and left untouched).
    pub fn insert(&mut self, key: K) -> Option<bool>
    where
        K: Hash + Eq,
    {
        self.inner.insert(key, ()).map(|prev| prev.is_none())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q> + Hash + Eq,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.inner.keys()
    }
}

impl<K, S> HSet<K, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
{
    pub fn union(&self, other: &Self) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(self.iter().cloned());
        out.extend(other.iter().cloned());
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(self.iter().filter(|k| other.contains(*k)).cloned());
        out
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(self.iter().filter(|k| !other.contains(*k)).cloned());
        out
    }

    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let mut out = self.difference(other);
        out.extend(other.difference(self).iter().cloned());
        out
    }
}

impl<K: Clone, S: BuildHasher + Clone> Clone for HSet<K, S> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<K: Hash + Eq + fmt::Debug, S: BuildHasher> fmt::Debug for HSet<K, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, S: BuildHasher> PartialEq for HSet<K, S> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|k| other.contains(k))
    }
}
impl<K: Hash + Eq, S: BuildHasher> Eq for HSet<K, S> {}

impl<K: Hash + Eq, S: BuildHasher + Default> Extend<K> for HSet<K, S> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            if self.insert(k).is_none() {
                break;
            }
        }
    }
}

impl<K: Hash + Eq, S: BuildHasher + Default> FromIterator<K> for HSet<K, S> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut out = Self::with_hasher(S::default());
        out.extend(iter);
        out
    }
}

impl<K, S> IntoIterator for HSet<K, S> {
    type Item = K;
    type IntoIter = core::iter::Map<super::raw::IntoIterPairs<K, ()>, fn((K, ())) -> K>;
    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter().map(|(k, ())| k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_contains_remove() {
        let mut s: HSet<i32> = HSet::new();
        assert_eq!(s.insert(1), Some(true));
        assert_eq!(s.insert(1), Some(false));
        assert!(s.contains(&1));
        assert!(s.remove(&1));
        assert!(!s.contains(&1));
    }

    #[test]
    fn set_operations() {
        let a: HSet<i32> = [1, 2, 3].into_iter().collect();
        let b: HSet<i32> = [2, 3, 4].into_iter().collect();
        let mut u: Vec<_> = a.union(&b).iter().copied().collect();
        u.sort_unstable();
        assert_eq!(u, vec![1, 2, 3, 4]);

        let mut i: Vec<_> = a.intersection(&b).iter().copied().collect();
        i.sort_unstable();
        assert_eq!(i, vec![2, 3]);

        let mut d: Vec<_> = a.difference(&b).iter().copied().collect();
        d.sort_unstable();
        assert_eq!(d, vec![1]);

        let mut sd: Vec<_> = a.symmetric_difference(&b).iter().copied().collect();
        sd.sort_unstable();
        assert_eq!(sd, vec![1, 4]);
    }
}
