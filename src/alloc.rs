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

//! # The allocator capability
//!
//! Every container is generic over an [`Allocator`]. Unlike the raw
//! `alloc`/`dealloc` wrappers this is modeled on (see the sibling
//! `unsafe_apis` helpers this crate grew out of), every entry point here is
//! fallible: a failed allocation returns `None` rather than aborting the
//! process, because spec-level callers (`insert`, `reserve`, `shrink`,
//! `clone`) must be able to surface allocation failure without unwinding.

use core::{alloc::Layout, ptr::NonNull};

/// A capability providing reallocate/free, shared by every container in
/// this crate. Implementations may be process-global (as [`System`] is)
/// or carry per-container state; the trait itself requires neither `Send`
/// nor `Sync` since containers are single-threaded against a handle.
///
/// # Safety
///
/// Implementors must behave like a conforming allocator: a pointer
/// returned by `reallocate` must be valid for `new_layout` until passed to
/// `free` or another `reallocate` call on the same allocator instance.
pub unsafe trait Allocator {
    /// Allocate a fresh block for `layout`, or `None` on failure.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return Some(dangling_for(layout));
        }
        // SAFETY: nonzero size, layout is valid by construction.
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr)
    }
    /// Grow or shrink a previously-allocated block from `old_layout` to
    /// `new_layout`, preserving the `min(old, new)` size prefix of
    /// content. `None` on failure leaves the original block untouched and
    /// owned by the caller (the caller must not free it twice).
    ///
    /// # Safety
    ///
    /// `ptr` must have been returned by `self.allocate`/`self.reallocate`
    /// with `old_layout`, and not yet freed.
    unsafe fn reallocate(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Option<NonNull<u8>> {
        if old_layout.size() == 0 {
            return self.allocate(new_layout);
        }
        if new_layout.size() == 0 {
            self.free(ptr, old_layout);
            return Some(dangling_for(new_layout));
        }
        if old_layout.align() == new_layout.align() {
            let raw = std::alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size());
            return NonNull::new(raw);
        }
        // alignment changed: allocate fresh, copy, free old
        let fresh = self.allocate(new_layout)?;
        let copy_len = old_layout.size().min(new_layout.size());
        core::ptr::copy_nonoverlapping(ptr.as_ptr(), fresh.as_ptr(), copy_len);
        self.free(ptr, old_layout);
        Some(fresh)
    }
    /// Free a block previously returned by `allocate`/`reallocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must have been allocated by this allocator with `layout`, and
    /// must not be used again afterward.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            std::alloc::dealloc(ptr.as_ptr(), layout);
        }
    }
}

fn dangling_for(layout: Layout) -> NonNull<u8> {
    // any well-aligned, non-null address is valid for a zero-size block
    unsafe { NonNull::new_unchecked(layout.align() as *mut u8) }
}

/// The default allocator: a thin, fallible wrapper over the global Rust
/// allocator (`std::alloc`). This is the allocator every container in
/// this crate uses unless the caller opts into a custom one.
#[derive(Debug, Default, Clone, Copy)]
pub struct System;

// SAFETY: forwards straight to `std::alloc`, which upholds the contract.
unsafe impl Allocator for System {}

/// Allocate an array of `len` `T`s with the given allocator, or `None` on
/// failure. `len == 0` never touches the allocator.
pub(crate) fn alloc_array<T, A: Allocator>(alloc: &A, len: usize) -> Option<NonNull<T>> {
    if len == 0 {
        return Some(NonNull::dangling());
    }
    let layout = Layout::array::<T>(len).ok()?;
    alloc.allocate(layout).map(NonNull::cast)
}

/// Grow/shrink a `T` array allocation from `old_len` to `new_len` elements.
///
/// # Safety
/// `ptr` must be the block most recently returned for `old_len` (or
/// `NonNull::dangling()` if `old_len == 0`).
pub(crate) unsafe fn realloc_array<T, A: Allocator>(
    alloc: &A,
    ptr: NonNull<T>,
    old_len: usize,
    new_len: usize,
) -> Option<NonNull<T>> {
    if old_len == 0 {
        return alloc_array(alloc, new_len);
    }
    if new_len == 0 {
        dealloc_array(alloc, ptr, old_len);
        return Some(NonNull::dangling());
    }
    let old_layout = Layout::array::<T>(old_len).ok()?;
    let new_layout = Layout::array::<T>(new_len).ok()?;
    alloc
        .reallocate(ptr.cast(), old_layout, new_layout)
        .map(NonNull::cast)
}

/// Deallocate a `T` array of `len` elements.
///
/// # Safety
/// `ptr` must be the block most recently allocated/reallocated for `len`.
pub(crate) unsafe fn dealloc_array<T, A: Allocator>(alloc: &A, ptr: NonNull<T>, len: usize) {
    if len != 0 {
        if let Ok(layout) = Layout::array::<T>(len) {
            alloc.free(ptr.cast(), layout);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_len_never_allocates_garbage() {
        let p: NonNull<u64> = alloc_array(&System, 0).unwrap();
        unsafe { dealloc_array(&System, p, 0) };
    }

    #[test]
    fn grow_then_shrink_preserves_prefix() {
        unsafe {
            let p: NonNull<u32> = alloc_array(&System, 4).unwrap();
            for i in 0..4u32 {
                p.as_ptr().add(i as usize).write(i);
            }
            let p = realloc_array(&System, p, 4, 16).unwrap();
            for i in 0..4u32 {
                assert_eq!(p.as_ptr().add(i as usize).read(), i);
            }
            let p = realloc_array(&System, p, 16, 2).unwrap();
            assert_eq!(p.as_ptr().add(0).read(), 0);
            assert_eq!(p.as_ptr().add(1).read(), 1);
            dealloc_array(&System, p, 2);
        }
    }
}
