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

//! `debug`: dumps the superblock and the compile-time sizes of every on-disk record.

use fscore::DataBlock;
use fscore::DirRow;
use fscore::FsError;
use fscore::Inode;
use fscore::Superblock;
use std::mem::size_of;
use std::path::Path;

pub fn run(fs_path: &Path) -> Result<(), FsError> {
    let sb = fscore::ops::debug_info(fs_path)?;
    let magic = sb.magic;
    let inode_count = sb.inode_count;
    let used_inodes = sb.used_inodes;
    let data_blocks = sb.data_blocks;
    let used_data_blocks = sb.used_data_blocks;
    let first_free_inode = sb.first_free_inode;
    let first_free_datablock = sb.first_free_datablock;
    let inodes_per_datablock = sb.inodes_per_datablock;
    let fs_size = sb.fs_size;
    let checksum = sb.checksum;

    println!("magic: {magic}");
    println!("inodeCount: {inode_count}");
    println!("usedInodes: {used_inodes}");
    println!("dataBlocks: {data_blocks}");
    println!("usedDataBlocks: {used_data_blocks}");
    println!("firstFreeInode: {first_free_inode}");
    println!("firstFreeDatablock: {first_free_datablock}");
    println!("inodesPerDatablock: {inodes_per_datablock}");
    println!("fsSize: {fs_size}");
    println!("checksum: {checksum}");
    println!("checksum valid: {}", sb.is_checksum_valid());
    println!("sizeof(Superblock): {}", size_of::<Superblock>());
    println!("sizeof(Inode): {}", size_of::<Inode>());
    println!("sizeof(DataBlock): {}", size_of::<DataBlock>());
    println!("sizeof(DirRow): {}", size_of::<DirRow>());
    Ok(())
}
