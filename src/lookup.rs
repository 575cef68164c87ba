/*
 * Created on Thu Jan 11 2024
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

//! Heterogeneous key lookup.
//!
//! The storage engine's sequential index keeps an owned key type (often a
//! boxed string) stored once per entry, but still needs to look entries up
//! by a borrowed view (a `&str` against a boxed key, say) without
//! allocating a throwaway owned key just to throw it away again after one
//! comparison — that's what `IndexSTSeqDllKeyptr`/`IndexSTSeqDllQref`
//! exist for.
//!
//! The same need shows up here: a map keyed by an owned `TString<Width1>`
//! should accept a plain `&str`/`&[u8]` at the call site. Rust's
//! `Borrow<Q>` already expresses the zero-copy view relationship (it's
//! the same trait `std::collections::HashMap` uses for this), so this
//! module is the small bit of shared plumbing the hash table and ordered
//! map cores call into instead of each re-deriving it: hash the query with
//! the container's own hasher, and compare with the container's own
//! equality, never the query's.

use core::{
    borrow::Borrow,
    hash::{BuildHasher, Hash},
};

use crate::hooks::hash_of;

/// `true` if `key`, viewed through `Borrow<Q>`, equals `query`.
#[inline]
pub(crate) fn equivalent<K, Q>(key: &K, query: &Q) -> bool
where
    K: Borrow<Q>,
    Q: Eq + ?Sized,
{
    key.borrow() == query
}

/// Hash `query` with the container's hasher — the same mixer a stored key
/// would be hashed with, since `K: Borrow<Q>` obligates `K` and `Q` to
/// agree on `Hash`.
#[inline]
pub(crate) fn hash_query<Q, S>(builder: &S, query: &Q) -> u64
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    hash_of(builder, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        hooks::BuildFx,
        string::{TString, Width1},
    };

    #[test]
    fn owned_key_and_borrowed_query_hash_equal() {
        let key: TString<Width1> = TString::from("France");
        let a = hash_query(&BuildFx, key.as_slice());
        let b = hash_query(&BuildFx, b"France".as_slice());
        assert_eq!(a, b);
        assert!(equivalent::<TString<Width1>, [u8]>(&key, b"France"));
        assert!(!equivalent::<TString<Width1>, [u8]>(&key, b"Germany"));
    }
}
