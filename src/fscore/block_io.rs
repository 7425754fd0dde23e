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

//! Positioned record I/O against the backing file, and the offset arithmetic that locates
//! records within it.

use crate::error::FsError;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::Write;
use std::mem::size_of;
use std::slice;

/// The fixed block size of the image, in bytes.
pub const BLOCK_SIZE: u64 = 512;

/// Returns the number of inode-table blocks needed for `inode_count` inodes of
/// `inodes_per_block` each.
pub fn inode_table_blocks(inode_count: u32, inodes_per_block: u32) -> u32 {
    inode_count.div_ceil(inodes_per_block)
}

/// Returns the byte offset of inode `id` within the backing file.
pub fn inode_offset(id: u32, inodes_per_block: u32, inode_size: u64) -> u64 {
    (1 + (id / inodes_per_block) as u64) * BLOCK_SIZE
        + (id % inodes_per_block) as u64 * inode_size
}

/// Returns the byte offset of data block `index` within the backing file.
pub fn datablock_offset(index: u32, inode_table_blocks: u32) -> u64 {
    (1 + inode_table_blocks as u64 + index as u64) * BLOCK_SIZE
}

/// Seeks to `offset`, tagging any failure with `ctx`.
pub fn seek(file: &mut File, offset: u64, ctx: &'static str) -> Result<(), FsError> {
    file.seek(SeekFrom::Start(offset))
        .map(|_| ())
        .map_err(|e| FsError::Seek(ctx, e))
}

/// Reads a fixed-size record of type `T` at the current position.
///
/// # Safety
/// `T` must be a `#[repr(C, packed)]` plain-old-data type with no padding-sensitive invariants;
/// every record type in this crate satisfies that by construction.
pub fn read_record<T: Copy>(file: &mut File, ctx: &'static str) -> Result<T, FsError> {
    let mut record: T = unsafe { std::mem::zeroed() };
    let buf =
        unsafe { slice::from_raw_parts_mut(&mut record as *mut T as *mut u8, size_of::<T>()) };
    file.read_exact(buf).map_err(|e| FsError::Read(ctx, e))?;
    Ok(record)
}

/// Writes a fixed-size record of type `T` at the current position.
pub fn write_record<T: Copy>(file: &mut File, record: &T, ctx: &'static str) -> Result<(), FsError> {
    let buf = unsafe { slice::from_raw_parts(record as *const T as *const u8, size_of::<T>()) };
    file.write_all(buf).map_err(|e| FsError::Write(ctx, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inode_table_blocks_rounds_up() {
        assert_eq!(inode_table_blocks(14, 7), 2);
        assert_eq!(inode_table_blocks(15, 7), 3);
        assert_eq!(inode_table_blocks(0, 7), 0);
    }

    #[test]
    fn offsets_are_disjoint_from_superblock_and_inodes() {
        let ipb = 7;
        let isz = 65;
        let itb = inode_table_blocks(20, ipb);
        assert_eq!(inode_offset(0, ipb, isz), BLOCK_SIZE);
        assert!(datablock_offset(0, itb) >= (1 + itb as u64) * BLOCK_SIZE);
    }
}
