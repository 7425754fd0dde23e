/*
 * Copyright 2025 Luc Lenôtre
 *
 * This file is part of Maestro.
 *
 * Maestro is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Maestro is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Maestro. If not, see <https://www.gnu.org/licenses/>.
 */

//! The directory row record: a 64-byte `(child id, name)` pair.

use crate::error::FsError;
use std::mem::size_of;

/// Maximum length of a name, including the terminating NUL.
pub const NAME_FIELD_SIZE: usize = 62;

/// One packed directory entry.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct DirRow {
    /// The id of the inode this entry names.
    pub child_id: u16,
    /// NUL-terminated name, padded with zero bytes.
    pub name: [u8; NAME_FIELD_SIZE],
}

impl DirRow {
    /// The on-disk size of one directory row; must be exactly 64 bytes.
    pub const SIZE: usize = size_of::<DirRow>();

    /// Builds a row for `child_id` named `name`.
    ///
    /// Fails with [`FsError::NameTooLong`] if `name` (plus its terminator) doesn't fit in
    /// [`NAME_FIELD_SIZE`] bytes.
    pub fn new(child_id: u16, name: &str) -> Result<Self, FsError> {
        let bytes = name.as_bytes();
        if bytes.len() >= NAME_FIELD_SIZE {
            return Err(FsError::NameTooLong);
        }
        let mut field = [0u8; NAME_FIELD_SIZE];
        field[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            child_id,
            name: field,
        })
    }

    /// Returns this row's name, stopping at the first NUL byte.
    pub fn name(&self) -> &str {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        std::str::from_utf8(&self.name[..end]).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_64_bytes() {
        assert_eq!(DirRow::SIZE, 64);
    }

    #[test]
    fn name_round_trips() {
        let row = DirRow::new(3, "hello").unwrap();
        assert_eq!(row.name(), "hello");
    }

    #[test]
    fn max_length_name_fits() {
        let name = "a".repeat(NAME_FIELD_SIZE - 1);
        let row = DirRow::new(1, &name).unwrap();
        assert_eq!(row.name(), name);
    }

    #[test]
    fn too_long_name_rejected() {
        let name = "a".repeat(NAME_FIELD_SIZE);
        assert!(matches!(DirRow::new(1, &name), Err(FsError::NameTooLong)));
    }
}
