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

//! An ordered set, built directly on [`super::map::OMap`] keyed by `()`.

use core::{borrow::Borrow, fmt};

use super::map::OMap;

/// A stable handle to one member of an [`OSet`], analogous to
/// [`super::map::Cursor`] but scoped to a key with no associated value.
pub struct Cursor<K>(super::map::Cursor<K, ()>);

impl<K> Clone for Cursor<K> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<K> Copy for Cursor<K> {}

impl<K> Cursor<K> {
    pub fn key(&self) -> &K {
        self.0.key()
    }
}

pub struct OSet<K> {
    inner: OMap<K, ()>,
}

impl<K> Default for OSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> OSet<K> {
    pub const fn new() -> Self {
        Self { inner: OMap::new() }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Insert `key`. `None` only on allocation failure (the set is left
    /// unchanged); otherwise `Some(true)` if it was newly inserted,
    /// `Some(false)` if it was already present.
    pub fn insert(&mut self, key: K) -> Option<bool>
    where
        K: Ord,
    {
        self.inner.insert(key, ()).map(|prev| prev.is_none())
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.contains_key(key)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.remove(key).is_some()
    }

    pub fn first(&self) -> Option<&K> {
        self.inner.first().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&K> {
        self.inner.last().map(|(k, _)| k)
    }

    pub fn first_at_or_after<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.first_at_or_after(key).map(|(k, _)| k)
    }

    pub fn last_at_or_before<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.last_at_or_before(key).map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.inner.iter().map(|(k, _)| k)
    }

    pub fn range<'a, Q>(&'a self, lo: &Q, hi: &Q) -> impl DoubleEndedIterator<Item = &'a K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.range(lo, hi).map(|(k, _)| k)
    }

    /// A stable handle to `key`, if present, that survives insertion/
    /// removal of unrelated keys.
    pub fn cursor<Q>(&self, key: &Q) -> Option<Cursor<K>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.cursor(key).map(Cursor)
    }

    pub fn cursor_first(&self) -> Option<Cursor<K>> {
        self.inner.cursor_first().map(Cursor)
    }

    pub fn cursor_last(&self) -> Option<Cursor<K>> {
        self.inner.cursor_last().map(Cursor)
    }

    pub fn next(&self, at: Cursor<K>) -> Option<Cursor<K>> {
        self.inner.next(at.0).map(Cursor)
    }

    pub fn prev(&self, at: Cursor<K>) -> Option<Cursor<K>> {
        self.inner.prev(at.0).map(Cursor)
    }
}

impl<K> OSet<K>
where
    K: Ord + Clone,
{
    pub fn union(&self, other: &Self) -> Self {
        let mut out = Self::new();
        out.extend(self.iter().cloned());
        out.extend(other.iter().cloned());
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = Self::new();
        out.extend(self.iter().filter(|k| other.contains(*k)).cloned());
        out
    }

    pub fn difference(&self, other: &Self) -> Self {
        let mut out = Self::new();
        out.extend(self.iter().filter(|k| !other.contains(*k)).cloned());
        out
    }
}

impl<K: Ord + Clone> Clone for OSet<K> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<K: Ord + fmt::Debug> fmt::Debug for OSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> PartialEq for OSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
impl<K: Ord> Eq for OSet<K> {}

impl<K: Ord> Extend<K> for OSet<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            if self.insert(k).is_none() {
                break;
            }
        }
    }
}

impl<K: Ord> FromIterator<K> for OSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut out = OSet::new();
        out.extend(iter);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_unique_iteration() {
        let s: OSet<i32> = [3, 1, 2, 1, 3].into_iter().collect();
        assert_eq!(s.len(), 3);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn insert_reports_novelty() {
        let mut s: OSet<i32> = OSet::new();
        assert_eq!(s.insert(1), Some(true));
        assert_eq!(s.insert(1), Some(false));
    }

    #[test]
    fn cursor_survives_unrelated_mutation() {
        let mut s: OSet<i32> = [10, 20, 30, 40].into_iter().collect();
        let cur = s.cursor(&20).unwrap();
        assert_eq!(*cur.key(), 20);
        s.remove(&10);
        s.insert(50);
        assert_eq!(*cur.key(), 20);
        assert_eq!(*s.next(cur).unwrap().key(), 30);
    }

    #[test]
    fn set_operations() {
        let a: OSet<i32> = [1, 2, 3].into_iter().collect();
        let b: OSet<i32> = [2, 3, 4].into_iter().collect();
        assert_eq!(a.union(&b).iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(a.intersection(&b).iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(a.difference(&b).iter().copied().collect::<Vec<_>>(), vec![1]);
    }
}
