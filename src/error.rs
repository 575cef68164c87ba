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

//! Most operations in this crate report failure through the return type
//! they already have (`Option`, `bool`) per container contract; there is
//! no global "last error". [`VesselError`] exists only for the handful of
//! call sites that have no such natural success value to fall back to.

use core::fmt;

pub type VesselResult<T> = Result<T, VesselError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VesselError {
    /// The allocator could not satisfy a grow/shrink request. The
    /// container is left unchanged.
    AllocFailed,
    /// A raw character sequence handed to the heterogeneous lookup shim
    /// was empty where a non-empty key was required.
    EmptyKey,
}

impl fmt::Display for VesselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocFailed => write!(f, "allocator could not satisfy the request"),
            Self::EmptyKey => write!(f, "raw key sequence was empty"),
        }
    }
}

impl std::error::Error for VesselError {}
