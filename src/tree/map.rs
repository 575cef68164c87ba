/*
 * Created on Sat Jan 13 2024
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

//! A map keyed by any `K: Ord`, kept sorted over [`super::raw::RbTree`].

use core::{borrow::Borrow, fmt};

pub use super::raw::Cursor;
use super::raw::RbTree;

pub struct OMap<K, V> {
    raw: RbTree<K, V>,
}

impl<K, V> Default for OMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OMap<K, V> {
    pub const fn new() -> Self {
        Self { raw: RbTree::new() }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Insert `key`/`value`. `None` only on allocation failure (the map is
    /// left unchanged); otherwise `Some(None)` for a fresh key or
    /// `Some(Some(old))` when `key` was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<Option<V>>
    where
        K: Ord,
    {
        self.raw.insert(key, value)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.get(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.remove(key).map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.raw.first()
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.raw.last()
    }

    /// Smallest entry whose key is `>= key`.
    pub fn first_at_or_after<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.first_at_or_after(key)
    }

    /// Largest entry whose key is `<= key`.
    pub fn last_at_or_before<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.last_at_or_before(key)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.raw.iter()
    }

    /// A stable handle to the entry stored under `key`, if any, that
    /// survives insertion/removal of unrelated keys.
    pub fn cursor<Q>(&self, key: &Q) -> Option<Cursor<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.cursor_at(key)
    }

    pub fn cursor_first(&self) -> Option<Cursor<K, V>> {
        self.raw.cursor_first()
    }

    pub fn cursor_last(&self) -> Option<Cursor<K, V>> {
        self.raw.cursor_last()
    }

    pub fn next(&self, at: Cursor<K, V>) -> Option<Cursor<K, V>> {
        self.raw.cursor_next(at)
    }

    pub fn prev(&self, at: Cursor<K, V>) -> Option<Cursor<K, V>> {
        self.raw.cursor_prev(at)
    }

    /// In-order entries with keys in `[lo, hi]`.
    pub fn range<'a, Q>(&'a self, lo: &Q, hi: &Q) -> impl DoubleEndedIterator<Item = (&'a K, &'a V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.raw.iter().filter(move |(k, _)| {
            let k = (*k).borrow();
            k >= lo && k <= hi
        })
    }
}

impl<K: Ord + Clone, V: Clone> Clone for OMap<K, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for OMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Ord, V: PartialEq> PartialEq for OMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
impl<K: Ord, V: Eq> Eq for OMap<K, V> {}

impl<K: Ord, V> Extend<(K, V)> for OMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut out = OMap::new();
        out.extend(iter);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_iteration() {
        let m: OMap<i32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
        let keys: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    #[test]
    fn range_query() {
        let m: OMap<i32, ()> = (0..20).map(|i| (i, ())).collect();
        let keys: Vec<i32> = m.range(&5, &10).map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn iterator_stable_under_unrelated_erase() {
        let mut m: OMap<i32, ()> = (0..10).map(|i| (i, ())).collect();
        m.remove(&3);
        let keys: Vec<i32> = m.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn cursor_stable_under_unrelated_mutation() {
        let mut m: OMap<i32, i32> = (0..10).map(|i| (i, i * i)).collect();
        let mut cur = m.cursor(&5).unwrap();
        assert_eq!(*cur.key(), 5);
        assert_eq!(*cur.get(), 25);

        m.remove(&3);
        m.insert(100, 100);
        m.insert(4, -4);

        assert_eq!(*cur.key(), 5);
        assert_eq!(*cur.get(), 25);
        *cur.get_mut() += 1;
        assert_eq!(m.get(&5), Some(&26));
    }
}
