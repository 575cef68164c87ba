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

pub(crate) mod raw;
pub mod map;
pub mod set;

pub use map::HMap;
pub use set::HSet;
