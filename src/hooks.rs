/*
 * Created on Tue Jan 09 2024
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

//! # Capability hooks
//!
//! The C original threads four function pointers (destroy, three-way
//! compare, equal, hash) plus a max-load float through a macro-generated
//! registration table bound at container instantiation. In a monomorphized
//! language those hooks are just the ordinary trait bounds on `K`/`V`:
//!
//! - *destroy* → `Drop`. A container owns its elements; dropping a bucket
//!   or node runs whatever `Drop` impl the element type has. There is no
//!   separate destroy hook to wire up.
//! - *three-way compare* → `Ord` (used by the ordered map/set core).
//! - *equal* → `Eq` (used by the hash map/set core; by default derived
//!   from `Ord` the same way the original falls back to its compare hook,
//!   but `Eq` is requested directly since that's how Rust expresses it).
//! - *hash* → `Hash`, combined with a [`BuildHasher`] — this module
//!   supplies [`BuildFx`], the default, grounded on the same
//!   rotate-xor-multiply mixer the storage engine uses for its own
//!   integer/byte hashing.
//!
//! *max-load* has no natural per-type trait (it's a table-tuning knob, not
//! a property of `K`), so it stays a runtime field on the hash table with
//! a `0.9` default, settable via `with_max_load`.

use std::hash::{BuildHasher, Hash, Hasher};

/// Default max load factor for the hash table, matching the spec and the
/// conventional "never past 90% full" defaults used across the corpus.
pub const DEFAULT_MAX_LOAD: f64 = 0.9;

const ROTATE: u32 = 5;
const PRIME64: u64 = 0x517C_C1B7_2722_0A95; // archimedes

#[inline(always)]
fn mix(state: u64, word: u64) -> u64 {
    (state.rotate_left(ROTATE) ^ word).wrapping_mul(PRIME64)
}

/// The default hasher: a simple rotate-xor-multiply mixer over 64-bit
/// words, processed in 8-byte chunks with a tail for the remainder. Not
/// cryptographic, not DoS-resistant — a fast, good-enough mixer for
/// in-process containers, exactly the role the original's default integer
/// and wy-style string hooks play.
#[derive(Debug, Default)]
pub struct FxHasher(u64);

impl Hasher for FxHasher {
    #[inline(always)]
    fn finish(&self) -> u64 {
        self.0
    }
    fn write(&mut self, mut bytes: &[u8]) {
        let mut state = self.0;
        while bytes.len() >= 8 {
            let (chunk, rest) = bytes.split_at(8);
            state = mix(state, u64::from_ne_bytes(chunk.try_into().unwrap()));
            bytes = rest;
        }
        if bytes.len() >= 4 {
            let (chunk, rest) = bytes.split_at(4);
            state = mix(state, u32::from_ne_bytes(chunk.try_into().unwrap()) as u64);
            bytes = rest;
        }
        if bytes.len() >= 2 {
            let (chunk, rest) = bytes.split_at(2);
            state = mix(state, u16::from_ne_bytes(chunk.try_into().unwrap()) as u64);
            bytes = rest;
        }
        if let Some(&b) = bytes.first() {
            state = mix(state, b as u64);
        }
        self.0 = state;
    }
    fn write_u8(&mut self, i: u8) {
        self.0 = mix(self.0, i as u64);
    }
    fn write_u16(&mut self, i: u16) {
        self.0 = mix(self.0, i as u64);
    }
    fn write_u32(&mut self, i: u32) {
        self.0 = mix(self.0, i as u64);
    }
    fn write_u64(&mut self, i: u64) {
        self.0 = mix(self.0, i);
    }
    fn write_u128(&mut self, i: u128) {
        let [a, b]: [u64; 2] = unsafe { core::mem::transmute(i) };
        self.0 = mix(self.0, a);
        self.0 = mix(self.0, b);
    }
    fn write_usize(&mut self, i: usize) {
        self.0 = mix(self.0, i as u64);
    }
}

/// [`BuildHasher`] for [`FxHasher`] — the default hasher builder for every
/// hash map/set in this crate unless a custom one is supplied.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildFx;

impl BuildHasher for BuildFx {
    type Hasher = FxHasher;
    fn build_hasher(&self) -> FxHasher {
        FxHasher::default()
    }
}

/// Hash `key` with `builder`, as the hash table core does at every
/// lookup/insert/erase.
#[inline]
pub(crate) fn hash_of<K: Hash + ?Sized, S: BuildHasher>(builder: &S, key: &K) -> u64 {
    let mut h = builder.build_hasher();
    key.hash(&mut h);
    h.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_across_calls() {
        let a = hash_of(&BuildFx, "hello world");
        let b = hash_of(&BuildFx, "hello world");
        assert_eq!(a, b);
    }

    #[test]
    fn differs_for_different_input() {
        assert_ne!(hash_of(&BuildFx, &1u64), hash_of(&BuildFx, &2u64));
    }
}
