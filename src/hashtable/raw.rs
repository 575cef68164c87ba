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

//! Open-addressing hash table core shared by [`crate::hashtable::map::HMap`]
//! and [`crate::hashtable::set::HSet`].
//!
//! Two allocations back every table: `buckets` holds the `(K, V)` pairs and
//! `meta` holds one 16-bit word per bucket (plus a handful of stopper words
//! past the last real bucket, never addressed by any probe). A bucket's
//! word is zero iff the bucket is empty — bits 15..12 carry a 4-bit
//! fragment of the key's hash for a cheap mismatch check before ever
//! touching the bucket itself, bit 11 marks the bucket as its occupant's
//! *home* (the bucket its hash maps to directly), and bits 10..0 carry a
//! displacement: the home-relative quadratic probe index of the next
//! member of this bucket's collision chain, or [`DISPLACEMENT_LIMIT`] if
//! this bucket is the chain's tail.
//!
//! Every key lands at its own home bucket, or failing that, is relocated
//! onto the quadratic (triangular-number) probe sequence rooted at that
//! *same* home bucket — never at someone else's. A home bucket can only
//! ever be given up by the one key whose true home it is; any foreign
//! occupant found squatting there on insert is evicted first, relocated
//! onto its own true home's chain, making room.

use core::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
    mem::MaybeUninit,
};

use crate::{
    hooks::{hash_of, BuildFx, DEFAULT_MAX_LOAD},
    lookup::{equivalent, hash_query},
    raw_buf::RawBuf,
};

/// Sentinel displacement: "this bucket is the end of its chain". Also the
/// largest representable displacement — a chain that would need to encode
/// a larger one forces a rehash instead of overflowing the field.
const DISPLACEMENT_LIMIT: u16 = 0x7FF;
const DISP_MASK: u16 = 0x7FF;
const HOME_BIT: u16 = 1 << 11;
const FRAG_SHIFT: u32 = 12;
/// Trailing words past the last real bucket, so batched scans never need a
/// bounds check mid-probe. No probe computed from a real home ever indexes
/// into these; they exist purely so the metadata array's tail looks like a
/// normal run of occupied, foreign (non-home) words instead of a cliff.
const STOPPER_WORDS: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq)]
struct Meta(u16);

impl Meta {
    const EMPTY: Meta = Meta(0);
    const STOPPER: Meta = Meta(HOME_BIT | (0xF << FRAG_SHIFT) | DISPLACEMENT_LIMIT);

    fn occupied(fragment: u8, is_home: bool, displacement: u16) -> Meta {
        let mut w = ((fragment as u16) & 0xF) << FRAG_SHIFT;
        if is_home {
            w |= HOME_BIT;
        }
        w |= displacement & DISP_MASK;
        Meta(w)
    }

    fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn is_home(self) -> bool {
        self.0 & HOME_BIT != 0
    }

    fn fragment(self) -> u8 {
        ((self.0 >> FRAG_SHIFT) & 0xF) as u8
    }

    fn displacement(self) -> u16 {
        self.0 & DISP_MASK
    }

    fn with_displacement(self, d: u16) -> Meta {
        Meta((self.0 & !DISP_MASK) | (d & DISP_MASK))
    }
}

#[inline]
fn fragment_of(hash: u64) -> u8 {
    (hash >> 60) as u8 & 0xF
}

/// The `i`-th quadratic (triangular-number) probe from `home`, wrapped into
/// `[0, cap)`. `cap` must be a power of two.
#[inline]
fn quadratic(home: usize, i: usize, cap: usize) -> usize {
    let mask = cap - 1;
    home.wrapping_add((i * i + i) / 2) & mask
}

enum InsertOutcome<K, V> {
    Inserted,
    Replaced(V),
    /// Displacement exhausted while probing or relinking: caller should
    /// grow and retry. Hands the key/value back untouched.
    Exhausted(K, V),
}

pub(crate) struct RawTable<K, V, S = BuildFx> {
    buckets: RawBuf<MaybeUninit<(K, V)>>,
    meta: RawBuf<Meta>,
    capacity: usize,
    len: usize,
    hash_builder: S,
    max_load: f64,
}

impl<K, V, S: BuildHasher + Default> Default for RawTable<K, V, S> {
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S: BuildHasher + Default> RawTable<K, V, S> {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

impl<K, V, S: BuildHasher> RawTable<K, V, S> {
    pub(crate) fn with_hasher(hash_builder: S) -> Self {
        Self {
            buckets: RawBuf::new(),
            meta: RawBuf::new(),
            capacity: 0,
            len: 0,
            hash_builder,
            max_load: DEFAULT_MAX_LOAD,
        }
    }

    pub(crate) fn with_max_load(mut self, max_load: f64) -> Self {
        assert!(max_load > 0.0 && max_load <= 1.0, "max load must be in (0, 1]");
        self.max_load = max_load;
        self
    }

    pub(crate) fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self
    where
        K: Hash + Eq,
    {
        let mut out = Self::with_hasher(hash_builder);
        out.reserve(capacity);
        out
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    fn home(&self, hash: u64) -> usize {
        if self.capacity == 0 {
            0
        } else {
            (hash as usize) & (self.capacity - 1)
        }
    }

    fn meta_at(&self, idx: usize) -> Meta {
        unsafe { *self.meta.as_ptr().add(idx) }
    }

    fn set_meta_at(&mut self, idx: usize, m: Meta) {
        unsafe { *self.meta.as_mut_ptr().add(idx) = m };
    }

    fn bucket_ptr(&self, idx: usize) -> *const (K, V) {
        self.buckets.as_ptr().cast::<(K, V)>().wrapping_add(idx)
    }

    fn bucket_ptr_mut(&mut self, idx: usize) -> *mut (K, V) {
        self.buckets.as_mut_ptr().cast::<(K, V)>().wrapping_add(idx)
    }

    fn write_bucket(&mut self, idx: usize, key: K, value: V) {
        unsafe { self.bucket_ptr_mut(idx).write((key, value)) };
    }

    fn target_capacity(&self, for_len: usize) -> usize {
        if for_len == 0 {
            return 0;
        }
        let mut cap = 8usize;
        while (cap as f64) * self.max_load < for_len as f64 {
            cap *= 2;
        }
        cap
    }

    fn should_grow(&self) -> bool {
        self.capacity == 0 || (self.len + 1) as f64 > self.capacity as f64 * self.max_load
    }

    fn alloc_storage(new_cap: usize) -> Option<(RawBuf<MaybeUninit<(K, V)>>, RawBuf<Meta>)> {
        let mut buckets = RawBuf::new();
        if !buckets.set_capacity(new_cap) {
            return None;
        }
        let mut meta: RawBuf<Meta> = RawBuf::new();
        if !meta.set_capacity(new_cap + STOPPER_WORDS) {
            buckets.release();
            return None;
        }
        unsafe {
            for i in 0..new_cap {
                meta.as_mut_ptr().add(i).write(Meta::EMPTY);
            }
            for i in 0..STOPPER_WORDS {
                meta.as_mut_ptr().add(new_cap + i).write(Meta::STOPPER);
            }
        }
        Some((buckets, meta))
    }

    fn drop_all_entries(&mut self) {
        for idx in 0..self.capacity {
            if !self.meta_at(idx).is_empty() {
                unsafe { core::ptr::drop_in_place(self.bucket_ptr_mut(idx)) };
            }
        }
    }

    /// Unlink the bucket at `target_idx` from the chain rooted at `home`,
    /// patching its predecessor's displacement to skip over it.
    /// `target_idx` must not be `home` itself.
    fn chain_unlink(&mut self, home: usize, target_idx: usize) {
        let mut prev_idx = home;
        let mut cur_d = self.meta_at(home).displacement();
        loop {
            let cur_idx = quadratic(home, cur_d as usize, self.capacity);
            if cur_idx == target_idx {
                let skip_to = self.meta_at(cur_idx).displacement();
                let pm = self.meta_at(prev_idx);
                self.set_meta_at(prev_idx, pm.with_displacement(skip_to));
                return;
            }
            prev_idx = cur_idx;
            cur_d = self.meta_at(cur_idx).displacement();
        }
    }

    /// Splice a chain member already written at `new_idx` (home-relative
    /// probe index `new_d`) into the chain rooted at `home`, keeping
    /// displacement strictly ascending.
    fn chain_insert_sorted(&mut self, home: usize, new_idx: usize, new_d: u16, frag: u8) {
        let mut prev_idx = home;
        let mut cur_d = self.meta_at(home).displacement();
        loop {
            if cur_d == DISPLACEMENT_LIMIT || new_d < cur_d {
                let pm = self.meta_at(prev_idx);
                self.set_meta_at(prev_idx, pm.with_displacement(new_d));
                self.set_meta_at(new_idx, Meta::occupied(frag, false, cur_d));
                return;
            }
            prev_idx = quadratic(home, cur_d as usize, self.capacity);
            cur_d = self.meta_at(prev_idx).displacement();
        }
    }

    /// Evict whatever foreign occupant sits in `bucket` (which must not be
    /// its own home) onto a fresh probe from its true home, making `bucket`
    /// available. Returns `false`, leaving `bucket` and the table
    /// untouched, if no empty bucket is reachable before displacement
    /// exhaustion — the caller must grow and retry.
    fn evict(&mut self, bucket: usize) -> bool
    where
        K: Hash,
    {
        let true_home = {
            let (k, _) = unsafe { &*self.bucket_ptr(bucket) };
            self.home(hash_of(&self.hash_builder, k))
        };
        let frag = self.meta_at(bucket).fragment();
        let mut d = 1u16;
        let new_idx = loop {
            if d as usize >= DISPLACEMENT_LIMIT as usize {
                return false;
            }
            let idx = quadratic(true_home, d as usize, self.capacity);
            if self.meta_at(idx).is_empty() {
                break idx;
            }
            d += 1;
        };
        self.chain_unlink(true_home, bucket);
        unsafe {
            let pair = self.bucket_ptr(bucket).read();
            self.bucket_ptr_mut(new_idx).write(pair);
        }
        self.set_meta_at(bucket, Meta::EMPTY);
        self.chain_insert_sorted(true_home, new_idx, d, frag);
        true
    }

    /// Insert without growing: never reallocates, and reports displacement
    /// exhaustion instead of panicking so the caller can grow and retry.
    fn try_insert_no_grow(&mut self, key: K, value: V) -> InsertOutcome<K, V>
    where
        K: Hash + Eq,
    {
        let hash = hash_of(&self.hash_builder, &key);
        let home = self.home(hash);
        let frag = fragment_of(hash);
        let home_meta = self.meta_at(home);

        if home_meta.is_empty() {
            self.write_bucket(home, key, value);
            self.set_meta_at(home, Meta::occupied(frag, true, DISPLACEMENT_LIMIT));
            self.len += 1;
            return InsertOutcome::Inserted;
        }

        if !home_meta.is_home() {
            if !self.evict(home) {
                return InsertOutcome::Exhausted(key, value);
            }
            self.write_bucket(home, key, value);
            self.set_meta_at(home, Meta::occupied(frag, true, DISPLACEMENT_LIMIT));
            self.len += 1;
            return InsertOutcome::Inserted;
        }

        // our own chain already has a head here; walk it looking for a match
        let mut cur_idx = home;
        let mut cur_meta = home_meta;
        loop {
            if cur_meta.fragment() == frag {
                let (k, _) = unsafe { &*self.bucket_ptr(cur_idx) };
                if *k == key {
                    let (_, v) = unsafe { &mut *self.bucket_ptr_mut(cur_idx) };
                    let old = core::mem::replace(v, value);
                    return InsertOutcome::Replaced(old);
                }
            }
            let next_d = cur_meta.displacement();
            if next_d == DISPLACEMENT_LIMIT {
                break;
            }
            cur_idx = quadratic(home, next_d as usize, self.capacity);
            cur_meta = self.meta_at(cur_idx);
        }

        // not present: claim an empty bucket via quadratic probe and splice it in
        let mut d = 1u16;
        let new_idx = loop {
            if d as usize >= DISPLACEMENT_LIMIT as usize {
                return InsertOutcome::Exhausted(key, value);
            }
            let idx = quadratic(home, d as usize, self.capacity);
            if self.meta_at(idx).is_empty() {
                break idx;
            }
            d += 1;
        };
        self.write_bucket(new_idx, key, value);
        self.chain_insert_sorted(home, new_idx, d, frag);
        self.len += 1;
        InsertOutcome::Inserted
    }

    /// Grow or shrink to `new_cap` buckets (rounded up to a power of two;
    /// `0` releases the table entirely), doubling past it if replay runs
    /// into displacement exhaustion. Returns `false` on allocation failure,
    /// leaving the table completely untouched.
    fn rehash(&mut self, mut new_cap: usize) -> bool
    where
        K: Hash + Eq,
    {
        if new_cap == 0 {
            log::trace!("hashtable: releasing {} buckets", self.capacity);
            self.drop_all_entries();
            self.buckets.release();
            self.meta.release();
            self.capacity = 0;
            self.len = 0;
            return true;
        }
        new_cap = new_cap.next_power_of_two();
        log::trace!(
            "hashtable: rehashing {} -> {} buckets ({} live)",
            self.capacity,
            new_cap,
            self.len
        );
        loop {
            let Some((new_buckets, new_meta)) = Self::alloc_storage(new_cap) else {
                return false;
            };
            let mut old_buckets = core::mem::replace(&mut self.buckets, new_buckets);
            let mut old_meta = core::mem::replace(&mut self.meta, new_meta);
            let old_capacity = core::mem::replace(&mut self.capacity, new_cap);
            let old_len = self.len;
            self.len = 0;

            let mut exhausted = false;
            for idx in 0..old_capacity {
                let m = unsafe { *old_meta.as_ptr().add(idx) };
                if m.is_empty() {
                    continue;
                }
                // read, not take: if this attempt is abandoned below, these
                // bytes in `old_buckets` are still the only live copy.
                let (k, v) = unsafe { old_buckets.as_ptr().cast::<(K, V)>().add(idx).read() };
                match self.try_insert_no_grow(k, v) {
                    InsertOutcome::Inserted => {}
                    InsertOutcome::Replaced(_) => unreachable!("rehash cannot observe a duplicate key"),
                    InsertOutcome::Exhausted(..) => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if exhausted {
                // the new storage holds nothing but bitwise duplicates of
                // still-live entries in the old storage: drop no elements,
                // just release the backing memory and retry bigger.
                self.buckets.release();
                self.meta.release();
                self.buckets = old_buckets;
                self.meta = old_meta;
                self.capacity = old_capacity;
                self.len = old_len;
                new_cap *= 2;
                continue;
            }

            old_buckets.release();
            old_meta.release();
            self.check_invariants();
            return true;
        }
    }

    pub(crate) fn reserve(&mut self, additional: usize) -> bool
    where
        K: Hash + Eq,
    {
        let target = self.target_capacity(self.len + additional);
        if target > self.capacity {
            self.rehash(target)
        } else {
            true
        }
    }

    /// Rebuild the table to fit `len()` exactly (or release it entirely
    /// when empty).
    pub(crate) fn shrink_to_fit(&mut self) -> bool
    where
        K: Hash + Eq,
    {
        let target = self.target_capacity(self.len);
        if target != self.capacity {
            self.rehash(target)
        } else {
            true
        }
    }

    /// Insert `key`/`value`. `None` only on allocation failure, in which
    /// case the table is left unchanged; otherwise `Some(None)` for a
    /// fresh key or `Some(Some(old))` when `key` was already present.
    pub(crate) fn insert(&mut self, mut key: K, mut value: V) -> Option<Option<V>>
    where
        K: Hash + Eq,
    {
        if self.should_grow() {
            let target = self.target_capacity(self.len + 1).max(8);
            if !self.rehash(target) {
                return None;
            }
        }
        loop {
            match self.try_insert_no_grow(key, value) {
                InsertOutcome::Inserted => return Some(None),
                InsertOutcome::Replaced(old) => return Some(Some(old)),
                InsertOutcome::Exhausted(k, v) => {
                    let bigger = (self.capacity * 2).max(8);
                    if !self.rehash(bigger) {
                        return None;
                    }
                    key = k;
                    value = v;
                }
            }
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            return None;
        }
        let hash = hash_query(&self.hash_builder, key);
        let home = self.home(hash);
        let frag = fragment_of(hash);
        let mut cur_meta = self.meta_at(home);
        if cur_meta.is_empty() {
            return None;
        }
        let mut cur_idx = home;
        loop {
            if cur_meta.fragment() == frag {
                let (k, v) = unsafe { &*self.bucket_ptr(cur_idx) };
                if equivalent(k, key) {
                    return Some(v);
                }
            }
            let next_d = cur_meta.displacement();
            if next_d == DISPLACEMENT_LIMIT {
                return None;
            }
            cur_idx = quadratic(home, next_d as usize, self.capacity);
            cur_meta = self.meta_at(cur_idx);
        }
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            return None;
        }
        let hash = hash_query(&self.hash_builder, key);
        let home = self.home(hash);
        let frag = fragment_of(hash);
        let mut cur_meta = self.meta_at(home);
        if cur_meta.is_empty() {
            return None;
        }
        let mut cur_idx = home;
        loop {
            if cur_meta.fragment() == frag {
                let matches = {
                    let (k, _) = unsafe { &*self.bucket_ptr(cur_idx) };
                    equivalent(k, key)
                };
                if matches {
                    let (_, v) = unsafe { &mut *self.bucket_ptr_mut(cur_idx) };
                    return Some(v);
                }
            }
            let next_d = cur_meta.displacement();
            if next_d == DISPLACEMENT_LIMIT {
                return None;
            }
            cur_idx = quadratic(home, next_d as usize, self.capacity);
            cur_meta = self.meta_at(cur_idx);
        }
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.capacity == 0 {
            return None;
        }
        let hash = hash_query(&self.hash_builder, key);
        let home = self.home(hash);
        let frag = fragment_of(hash);
        let home_meta = self.meta_at(home);
        if home_meta.is_empty() {
            return None;
        }
        let mut pred: Option<usize> = None;
        let mut cur_idx = home;
        let mut cur_meta = home_meta;
        loop {
            let found = cur_meta.fragment() == frag && {
                let (k, _) = unsafe { &*self.bucket_ptr(cur_idx) };
                equivalent(k, key)
            };
            if found {
                let pair = self.remove_at(home, pred, cur_idx, cur_meta);
                self.check_invariants();
                return Some(pair);
            }
            let next_d = cur_meta.displacement();
            if next_d == DISPLACEMENT_LIMIT {
                return None;
            }
            pred = Some(cur_idx);
            cur_idx = quadratic(home, next_d as usize, self.capacity);
            cur_meta = self.meta_at(cur_idx);
        }
    }

    /// Erase the chain member at `target_idx` (meta `target_meta`, rooted
    /// at `home`, immediate predecessor `pred` if any) and return its pair.
    fn remove_at(&mut self, home: usize, pred: Option<usize>, target_idx: usize, target_meta: Meta) -> (K, V) {
        self.len -= 1;
        if target_meta.displacement() == DISPLACEMENT_LIMIT {
            // target is the chain's tail: nothing downstream needs relocating.
            if let Some(pred_idx) = pred {
                let pm = self.meta_at(pred_idx);
                self.set_meta_at(pred_idx, pm.with_displacement(DISPLACEMENT_LIMIT));
            }
            let pair = unsafe { self.bucket_ptr(target_idx).read() };
            self.set_meta_at(target_idx, Meta::EMPTY);
            return pair;
        }

        // target has a successor: move the chain's last member into the
        // erased slot instead, so target's own bucket (and its is_home
        // flag / forward pointer) never has to move.
        let mut l_pred_idx = target_idx;
        let mut l_idx = quadratic(home, target_meta.displacement() as usize, self.capacity);
        let mut l_meta = self.meta_at(l_idx);
        while l_meta.displacement() != DISPLACEMENT_LIMIT {
            l_pred_idx = l_idx;
            l_idx = quadratic(home, l_meta.displacement() as usize, self.capacity);
            l_meta = self.meta_at(l_idx);
        }

        let removed = unsafe { self.bucket_ptr(target_idx).read() };
        let l_pair = unsafe { self.bucket_ptr(l_idx).read() };
        unsafe { self.bucket_ptr_mut(target_idx).write(l_pair) };
        self.set_meta_at(
            target_idx,
            Meta::occupied(l_meta.fragment(), target_meta.is_home(), target_meta.displacement()),
        );
        if l_pred_idx == target_idx {
            // `L` was target's immediate successor: target's freshly-written
            // meta above still points at `L`'s now-vacated bucket, fix it up.
            let tm = self.meta_at(target_idx);
            self.set_meta_at(target_idx, tm.with_displacement(DISPLACEMENT_LIMIT));
        } else {
            let lpm = self.meta_at(l_pred_idx);
            self.set_meta_at(l_pred_idx, lpm.with_displacement(DISPLACEMENT_LIMIT));
        }
        self.set_meta_at(l_idx, Meta::EMPTY);
        removed
    }

    /// Insert `key` with `make_value()` if absent, then return a mutable
    /// reference to its value either way. `None` only on allocation
    /// failure.
    pub(crate) fn get_or_insert_with(&mut self, key: K, make_value: impl FnOnce() -> V) -> Option<&mut V>
    where
        K: Hash + Eq + Clone,
    {
        if self.get(&key).is_none() {
            self.insert(key.clone(), make_value())?;
        }
        self.get_mut(&key)
    }

    /// Drop every entry for which `f` returns `false`.
    pub(crate) fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool)
    where
        K: Hash + Eq,
    {
        let mut survivors = Vec::new();
        for (k, mut v) in self.drain() {
            if f(&k, &mut v) {
                survivors.push((k, v));
            }
        }
        for (k, v) in survivors {
            let _ = self.insert(k, v);
        }
    }

    /// Remove and return every entry, leaving the table empty but with its
    /// allocation intact where possible (best-effort: falls back to an
    /// empty allocation if reallocating fresh storage fails).
    pub(crate) fn drain(&mut self) -> IntoIterPairs<K, V> {
        let old_capacity = self.capacity;
        let old_buckets = core::mem::replace(&mut self.buckets, RawBuf::new());
        let old_meta = core::mem::replace(&mut self.meta, RawBuf::new());
        self.capacity = 0;
        self.len = 0;
        if old_capacity > 0 {
            if let Some((new_buckets, new_meta)) = Self::alloc_storage(old_capacity) {
                self.buckets = new_buckets;
                self.meta = new_meta;
                self.capacity = old_capacity;
            }
        }
        IntoIterPairs {
            buckets: old_buckets,
            meta: old_meta,
            capacity: old_capacity,
            next: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.drop_all_entries();
        for idx in 0..self.capacity {
            self.set_meta_at(idx, Meta::EMPTY);
        }
        self.len = 0;
    }

    pub(crate) fn cleanup(&mut self) {
        log::trace!("hashtable: releasing {} buckets", self.capacity);
        self.clear();
        self.buckets.release();
        self.meta.release();
        self.capacity = 0;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        (0..self.capacity).filter_map(move |idx| {
            if self.meta_at(idx).is_empty() {
                None
            } else {
                let (k, v) = unsafe { &*self.bucket_ptr(idx) };
                Some((k, v))
            }
        })
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> + '_ {
        let capacity = self.capacity;
        let meta_ptr = self.meta.as_ptr();
        let buckets_ptr = self.buckets.as_mut_ptr().cast::<(K, V)>();
        (0..capacity).filter_map(move |idx| {
            let m = unsafe { *meta_ptr.add(idx) };
            if m.is_empty() {
                None
            } else {
                let (k, v) = unsafe { &mut *buckets_ptr.add(idx) };
                Some((&*k, v))
            }
        })
    }

    pub(crate) fn into_iter_pairs(self) -> IntoIterPairs<K, V> {
        let mut this = core::mem::ManuallyDrop::new(self);
        let buckets = unsafe { core::ptr::read(&this.buckets) };
        let meta = unsafe { core::ptr::read(&this.meta) };
        let capacity = this.capacity;
        unsafe { core::ptr::drop_in_place(&mut this.hash_builder) };
        IntoIterPairs {
            buckets,
            meta,
            capacity,
            next: 0,
        }
    }

    #[cfg(debug_assertions)]
    fn check_invariants(&self)
    where
        K: Hash,
    {
        let mut occ = 0usize;
        for home in 0..self.capacity {
            let hm = self.meta_at(home);
            if hm.is_empty() {
                continue;
            }
            debug_assert!(hm.is_home(), "an occupied chain head must carry the home bit");
            occ += 1;
            let mut cur_d = hm.displacement();
            let mut last_d = 0u16;
            while cur_d != DISPLACEMENT_LIMIT {
                debug_assert!(cur_d > last_d, "chain displacement must be strictly ascending");
                last_d = cur_d;
                let cur_idx = quadratic(home, cur_d as usize, self.capacity);
                let m = self.meta_at(cur_idx);
                debug_assert!(!m.is_empty(), "chain link points at an empty bucket");
                debug_assert!(!m.is_home(), "a non-head chain member must not carry the home bit");
                let (k, _) = unsafe { &*self.bucket_ptr(cur_idx) };
                let hash = hash_of(&self.hash_builder, k);
                debug_assert_eq!(self.home(hash), home, "chain member's true home must match its chain");
                occ += 1;
                cur_d = m.displacement();
            }
        }
        debug_assert_eq!(occ, self.len, "occupied bucket count drifted from len");
    }

    #[cfg(not(debug_assertions))]
    fn check_invariants(&self)
    where
        K: Hash,
    {
    }
}

/// Owning iterator over a consumed (or drained) table's live entries.
pub(crate) struct IntoIterPairs<K, V> {
    buckets: RawBuf<MaybeUninit<(K, V)>>,
    meta: RawBuf<Meta>,
    capacity: usize,
    next: usize,
}

impl<K, V> Iterator for IntoIterPairs<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<(K, V)> {
        while self.next < self.capacity {
            let idx = self.next;
            self.next += 1;
            let m = unsafe { *self.meta.as_ptr().add(idx) };
            if !m.is_empty() {
                let pair = unsafe { self.buckets.as_ptr().cast::<(K, V)>().add(idx).read() };
                return Some(pair);
            }
        }
        None
    }
}

impl<K, V> Drop for IntoIterPairs<K, V> {
    fn drop(&mut self) {
        while self.next < self.capacity {
            let idx = self.next;
            self.next += 1;
            let m = unsafe { *self.meta.as_ptr().add(idx) };
            if !m.is_empty() {
                unsafe { core::ptr::drop_in_place(self.buckets.as_mut_ptr().cast::<(K, V)>().add(idx)) };
            }
        }
        // `buckets`/`meta` release their own allocation on drop once every
        // live pair has already been read out or dropped above.
    }
}

impl<K, V, S> Drop for RawTable<K, V, S> {
    fn drop(&mut self) {
        self.drop_all_entries();
    }
}

impl<K: Clone + Hash + Eq, V: Clone, S: BuildHasher + Clone> Clone for RawTable<K, V, S> {
    /// Best-effort under allocation pressure: mirrors `Array::clone`'s
    /// silent-partial-on-OOM tradeoff rather than a second, fallible
    /// `try_clone` API.
    fn clone(&self) -> Self {
        let mut out = RawTable::with_hasher(self.hash_builder.clone());
        out.max_load = self.max_load;
        for (k, v) in self.iter() {
            if out.insert(k.clone(), v.clone()).is_none() {
                break;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::BuildFx;

    fn table() -> RawTable<u32, u32, BuildFx> {
        RawTable::new()
    }

    #[test]
    fn insert_get_remove_roundtrip() {
        let mut t = table();
        for i in 0..1000u32 {
            assert_eq!(t.insert(i, i * 2), Some(None));
        }
        assert_eq!(t.len(), 1000);
        for i in 0..1000u32 {
            assert_eq!(*t.get(&i).unwrap(), i * 2);
        }
        for i in 0..500u32 {
            assert_eq!(t.remove(&i), Some((i, i * 2)));
        }
        assert_eq!(t.len(), 500);
        for i in 0..500u32 {
            assert!(t.get(&i).is_none());
        }
        for i in 500..1000u32 {
            assert_eq!(*t.get(&i).unwrap(), i * 2);
        }
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut t = table();
        assert_eq!(t.insert(1, 10), Some(None));
        assert_eq!(t.insert(1, 20), Some(Some(10)));
        assert_eq!(*t.get(&1).unwrap(), 20);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn erase_interior_member_preserves_chain() {
        // a tiny capacity packs many keys onto a handful of home buckets,
        // forcing long chains and interior erasures.
        let mut t: RawTable<u32, u32, BuildFx> = RawTable::with_capacity_and_hasher(8, BuildFx::default());
        let keys: Vec<u32> = (0..50).collect();
        for &k in &keys {
            assert!(t.insert(k, k * 2).is_some());
        }
        for &k in keys.iter().step_by(3) {
            assert_eq!(t.remove(&k), Some((k, k * 2)));
        }
        for &k in &keys {
            if k % 3 == 0 {
                assert_eq!(t.get(&k), None);
            } else {
                assert_eq!(t.get(&k), Some(&(k * 2)));
            }
        }
    }

    #[test]
    fn shrink_reclaims_capacity() {
        let mut t = table();
        for i in 0..200u32 {
            t.insert(i, i).unwrap();
        }
        for i in 0..180u32 {
            t.remove(&i);
        }
        let before = t.capacity();
        assert!(t.shrink_to_fit());
        assert!(t.capacity() <= before);
        for i in 180..200u32 {
            assert_eq!(*t.get(&i).unwrap(), i);
        }
    }

    #[cfg(not(miri))]
    const SPAM_CNT: u32 = 1_000_000;
    #[cfg(miri)]
    const SPAM_CNT: u32 = 2_000;

    #[test]
    fn million_key_round_trip() {
        let mut t = table();
        let n = SPAM_CNT;
        for i in 0..n {
            t.insert(i, i.wrapping_mul(7)).unwrap();
        }
        assert_eq!(t.len() as u32, n);
        for i in (0..n).step_by(997) {
            assert_eq!(*t.get(&i).unwrap(), i.wrapping_mul(7));
        }
    }

    #[test]
    fn randomized_interleaved_reserve_and_shrink() {
        use rand::{rngs::StdRng, Rng, SeedableRng};
        use std::collections::HashMap as StdMap;

        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut t = table();
        let mut model: StdMap<u32, u32> = StdMap::new();
        for step in 0..20_000u32 {
            let key = rng.gen_range(0..2000);
            match rng.gen_range(0..4) {
                0 => {
                    let v = rng.gen();
                    assert_eq!(t.insert(key, v).unwrap(), model.insert(key, v));
                }
                1 => {
                    assert_eq!(t.remove(&key).map(|(_, v)| v), model.remove(&key));
                }
                2 => assert!(t.reserve(rng.gen_range(0..500))),
                _ => {
                    if step % 1000 == 0 {
                        assert!(t.shrink_to_fit());
                    }
                }
            }
        }
        for (k, v) in &model {
            assert_eq!(t.get(k), Some(v));
        }
        assert_eq!(t.len(), model.len());
    }

    #[test]
    fn clone_is_independent() {
        let mut a = table();
        for i in 0..50u32 {
            a.insert(i, i * i).unwrap();
        }
        let mut b = a.clone();
        b.insert(999, 0).unwrap();
        assert_eq!(a.len(), 50);
        assert_eq!(b.len(), 51);
        for i in 0..50u32 {
            assert_eq!(a.get(&i), b.get(&i));
        }
    }
}
