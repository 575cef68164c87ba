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

//! A bare growable buffer shared by [`crate::array::Array`] and
//! [`crate::string::TString`]: no length tracking, no drop glue for the
//! elements it holds — just capacity-managed storage over the allocator
//! capability. Callers own the element lifecycle.

use crate::alloc::{self, Allocator, System};
use core::ptr::NonNull;

pub(crate) struct RawBuf<T, A: Allocator = System> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
}

impl<T> RawBuf<T, System> {
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc: System,
        }
    }
}

impl<T, A: Allocator> RawBuf<T, A> {
    pub fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Ensure `capacity() >= min_cap`, growing geometrically (doubling,
    /// minimum 2) so amortized push cost stays linear. Returns `false` on
    /// allocation failure, leaving the buffer untouched.
    pub fn ensure_capacity(&mut self, min_cap: usize) -> bool {
        if self.cap >= min_cap {
            return true;
        }
        let new_cap = (self.cap.max(1) * 2).max(min_cap).max(2);
        self.set_capacity(new_cap)
    }

    /// Reallocate to hold exactly `new_cap` elements (never less than the
    /// caller asks for). Returns `false` on allocation failure.
    pub fn set_capacity(&mut self, new_cap: usize) -> bool {
        if new_cap == self.cap {
            return true;
        }
        let new_ptr = if self.cap == 0 {
            alloc::alloc_array::<T, A>(&self.alloc, new_cap)
        } else {
            unsafe { alloc::realloc_array::<T, A>(&self.alloc, self.ptr, self.cap, new_cap) }
        };
        match new_ptr {
            Some(p) => {
                self.ptr = p;
                self.cap = new_cap;
                true
            }
            None => false,
        }
    }

    /// Release the backing allocation, returning to the zero-capacity
    /// placeholder state. The caller must have already dropped/moved out
    /// any live elements.
    pub fn release(&mut self) {
        if self.cap != 0 {
            unsafe { alloc::dealloc_array::<T, A>(&self.alloc, self.ptr, self.cap) };
            self.ptr = NonNull::dangling();
            self.cap = 0;
        }
    }
}

impl<T, A: Allocator> Drop for RawBuf<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}
