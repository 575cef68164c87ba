/*
 * Created on Mon Jan 08 2024
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

//! # vessel
//!
//! A typed, generic in-process container library. Every container is a
//! single owning handle over a heap allocation; default-constructed
//! handles point at a shared, immutable placeholder and allocate nothing
//! until the first mutation that needs real storage.
//!
//! Containers:
//! - [`Array`](array::Array) — dynamic array
//! - [`List`](list::List) — doubly linked list
//! - [`HMap`]/[`HSet`] — hash map/set (open addressing, quadratic probing,
//!   chained overflow encoded in per-bucket metadata)
//! - [`OMap`]/[`OSet`] — ordered map/set (red-black tree)
//! - [`TString`](string::TString) — growable, null-terminated string buffer
//!   with a structured multi-argument formatter
//!
//! All operations are single-threaded against a handle: the library does
//! no internal synchronization, and simultaneous access to one handle from
//! multiple threads is undefined behavior. Independent handles may be used
//! freely across threads provided the allocator is thread-safe.

pub mod alloc;
pub mod array;
pub mod error;
pub mod hashtable;
pub mod hooks;
pub mod list;
pub mod lookup;
pub mod string;
pub mod tree;

pub(crate) mod raw_buf;

pub use crate::{
    array::Array,
    error::VesselError,
    hashtable::{HMap, HSet},
    list::List,
    string::{TString, Width1, Width2, Width4},
    tree::{MapCursor, OMap, OSet, SetCursor},
};
