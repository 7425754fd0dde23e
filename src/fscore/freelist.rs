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

//! Allocation and release against the two intrusive free chains (inodes, data blocks).

use crate::error::FsError;
use crate::inode::DATABLOCKS_PER_INODE;
use crate::inode::Inode;
use crate::inode::InodeType;
use crate::session::Session;
use crate::superblock::Superblock;

/// Pops the head of the inode free chain, initializes it as a fresh `kind`, and returns its id.
///
/// Rewrites the superblock immediately after detaching the head (before the inode itself is
/// initialized), matching how the chain pointer and the payload are committed as separate steps.
pub fn alloc_inode(
    session: &mut Session,
    sb: &mut Superblock,
    kind: InodeType,
    mod_time: i64,
) -> Result<u16, FsError> {
    if sb.first_free_inode < 0 || sb.first_free_inode as u32 >= sb.inode_count as u32 {
        return Err(FsError::NoInodes);
    }
    let id = sb.first_free_inode as u16;
    let mut inode = session.read_inode(sb, id)?;
    sb.first_free_inode = inode.next_free_inode;
    sb.used_inodes += 1;
    session.write_superblock(sb)?;

    inode.kind = kind.to_byte();
    inode.id = id;
    inode.next_free_inode = -1;
    inode.mod_time = mod_time;
    inode.datablocks = [-1; DATABLOCKS_PER_INODE];
    inode.size = 0;
    session.write_inode(sb, &inode)?;
    Ok(id)
}

/// Pushes inode `id` back onto the free chain.
///
/// Only the chain pointer is touched; `uid`/`gid`/`permissions` are left as whatever the last
/// occupant had, since nothing reads them until the slot is reallocated and reinitialized.
pub fn release_inode(session: &mut Session, sb: &mut Superblock, id: u16) -> Result<(), FsError> {
    let mut inode = session.read_inode(sb, id)?;
    inode.next_free_inode = sb.first_free_inode;
    session.write_inode(sb, &inode)?;
    sb.first_free_inode = id as i32;
    sb.used_inodes -= 1;
    session.write_superblock(sb)
}

/// Pops the head of the data-block free chain and returns its index.
pub fn alloc_datablock(session: &mut Session, sb: &mut Superblock) -> Result<u16, FsError> {
    if sb.first_free_datablock < 0 || sb.first_free_datablock as u32 >= sb.data_blocks as u32 {
        return Err(FsError::NoBlocks);
    }
    let index = sb.first_free_datablock as u16;
    let next = session.read_datablock_trailer(sb, index as u32)?;
    sb.first_free_datablock = next as i32;
    sb.used_data_blocks += 1;
    session.write_superblock(sb)?;
    Ok(index)
}

/// Pushes data block `index` back onto the free chain, writing only its trailer.
pub fn release_datablock(session: &mut Session, sb: &mut Superblock, index: u16) -> Result<(), FsError> {
    session.write_datablock_trailer(sb, index as u32, sb.first_free_datablock as u16)?;
    sb.first_free_datablock = index as i32;
    sb.used_data_blocks -= 1;
    session.write_superblock(sb)
}

/// Initializes the inode table and data-block free chains on a freshly sized image, as part of
/// `mkfs`. Every inode (including id 0) starts out on the free chain with the given defaults;
/// the caller allocates inode 0 afterwards to consume it as the root directory, going through
/// the ordinary allocation path rather than a special case.
pub fn format_chains(
    session: &mut Session,
    sb: &mut Superblock,
    mod_time: i64,
    default_uid: u16,
    default_gid: u16,
    default_permissions: u16,
) -> Result<(), FsError> {
    let inode_count = sb.inode_count;
    for id in 0..inode_count {
        let next_free = if id + 1 < inode_count { (id + 1) as i32 } else { inode_count as i32 };
        let inode = Inode {
            kind: InodeType::Directory.to_byte(),
            id,
            uid: default_uid,
            gid: default_gid,
            permissions: default_permissions,
            mod_time,
            datablocks: [-1; DATABLOCKS_PER_INODE],
            next_free_inode: next_free,
            size: 0,
        };
        session.write_inode(sb, &inode)?;
    }
    sb.first_free_inode = if inode_count > 0 { 0 } else { inode_count as i32 };
    sb.used_inodes = 0;

    let data_blocks = sb.data_blocks;
    for index in 0..data_blocks {
        let next_free = if index + 1 < data_blocks { index + 1 } else { data_blocks };
        session.write_datablock_trailer(sb, index as u32, next_free)?;
    }
    sb.first_free_datablock = if data_blocks > 0 { 0 } else { data_blocks as i32 };
    sb.used_data_blocks = 0;
    Ok(())
}
