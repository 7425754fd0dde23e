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

//! Directory row lookup, insertion, and removal on top of an inode's data blocks.

use crate::block_io::BLOCK_SIZE;
use crate::dirent::DirRow;
use crate::error::FsError;
use crate::freelist;
use crate::inode::DATABLOCKS_PER_INODE;
use crate::inode::Inode;
use crate::inode::InodeType;
use crate::session::Session;
use crate::superblock::Superblock;

pub(crate) const ROWS_PER_BLOCK: usize = (BLOCK_SIZE as usize) / DirRow::SIZE;

/// Number of data blocks currently holding rows, and the row count in the last of them.
pub(crate) fn shape(size: u32) -> (usize, usize) {
    let full_blocks = size as usize / BLOCK_SIZE as usize;
    let tail_rows = (size as usize % BLOCK_SIZE as usize) / DirRow::SIZE;
    if tail_rows > 0 {
        (full_blocks + 1, tail_rows)
    } else {
        (full_blocks, ROWS_PER_BLOCK)
    }
}

/// Looks up `name` among `dir`'s entries. Returns `None` if absent.
pub fn lookup(
    session: &mut Session,
    sb: &Superblock,
    dir: &Inode,
    name: &str,
) -> Result<Option<u16>, FsError> {
    let (blocks_used, last_rows) = shape(dir.size);
    for b in 0..blocks_used {
        let rows = if b + 1 == blocks_used { last_rows } else { ROWS_PER_BLOCK };
        let db = dir.datablocks[b];
        if db < 0 {
            return Err(FsError::Internal);
        }
        for r in 0..rows {
            let row = session.read_dirrow(sb, db as u32, r)?;
            if row.name() == name {
                return Ok(Some(row.child_id));
            }
        }
    }
    Ok(None)
}

/// Appends a new entry named `name` of type `kind` to `dir`, allocating its inode.
///
/// Fails with [`FsError::Exists`] if the name is already taken, [`FsError::NameTooLong`] if it
/// doesn't fit a row, and [`FsError::DirFull`] if all ten data blocks are in use and full.
pub fn append(
    session: &mut Session,
    sb: &mut Superblock,
    dir: &mut Inode,
    name: &str,
    kind: InodeType,
    mod_time: i64,
) -> Result<u16, FsError> {
    if lookup(session, sb, dir, name)?.is_some() {
        return Err(FsError::Exists);
    }
    // Validated up front: the original only catches this after allocating the child inode,
    // which would leak it on a name that's too long.
    if name.as_bytes().len() >= crate::dirent::NAME_FIELD_SIZE {
        return Err(FsError::NameTooLong);
    }

    let block_idx = dir.size as usize / BLOCK_SIZE as usize;
    if block_idx >= DATABLOCKS_PER_INODE {
        return Err(FsError::DirFull);
    }
    if dir.datablocks[block_idx] < 0 {
        let new_db = freelist::alloc_datablock(session, sb)?;
        dir.datablocks[block_idx] = new_db as i32;
    }

    let child_id = freelist::alloc_inode(session, sb, kind, mod_time)?;
    let row = DirRow::new(child_id, name)?;
    let row_in_block = (dir.size as u64 % BLOCK_SIZE) as usize / DirRow::SIZE;
    session.write_dirrow(sb, dir.datablocks[block_idx] as u32, row_in_block, &row)?;

    dir.size += DirRow::SIZE as u32;
    session.write_inode(sb, dir)?;
    Ok(child_id)
}

/// Removes the entry named `name` from `dir`.
///
/// The row is only spliced out (and its child inode released) when it is the last row in the
/// directory; removing an earlier entry leaves a stale row behind and its child inode allocated.
/// This mirrors the source algorithm's own asymmetry rather than repairing it with a tail swap.
pub fn remove(
    session: &mut Session,
    sb: &mut Superblock,
    dir: &mut Inode,
    name: &str,
) -> Result<(), FsError> {
    let (blocks_used, last_rows) = shape(dir.size);
    let mut found: Option<(usize, usize, u16)> = None;
    'search: for b in 0..blocks_used {
        let rows = if b + 1 == blocks_used { last_rows } else { ROWS_PER_BLOCK };
        let db = dir.datablocks[b];
        if db < 0 {
            return Err(FsError::Internal);
        }
        for r in 0..rows {
            let row = session.read_dirrow(sb, db as u32, r)?;
            if row.name() == name {
                found = Some((b, r, row.child_id));
                break 'search;
            }
        }
    }
    let (found_block, found_row, child_id) = found.ok_or(FsError::Absent)?;

    let last_block = blocks_used - 1;
    let is_last = found_block == last_block && found_row + 1 == last_rows;
    if is_last {
        let last_db = dir.datablocks[last_block];
        dir.size -= DirRow::SIZE as u32;
        if dir.size % BLOCK_SIZE as u32 == 0 {
            freelist::release_datablock(session, sb, last_db as u16)?;
            dir.datablocks[last_block] = -1;
        }
        freelist::release_inode(session, sb, child_id)?;
        session.write_inode(sb, dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_superblock() -> Superblock {
        Superblock {
            magic: crate::superblock::MAGIC,
            inode_count: 16,
            used_inodes: 1,
            data_blocks: 32,
            used_data_blocks: 0,
            first_free_inode: 1,
            first_free_datablock: 0,
            inodes_per_datablock: 7,
            fs_size: 0,
            checksum: 0,
        }
    }

    fn new_session() -> (Session, Superblock) {
        let path = std::env::temp_dir().join(format!(
            "bdsm-directory-test-{:?}",
            std::thread::current().id()
        ));
        let mut session = Session::create(&path).unwrap();
        let mut sb = sample_superblock();
        let itb = sb.inode_table_blocks();
        let size = (1 + itb as u64 + sb.data_blocks as u64) * BLOCK_SIZE;
        session.set_len(size).unwrap();
        freelist::format_chains(&mut session, &mut sb, 0, 0, 0, 644).unwrap();
        session.write_superblock(&mut sb).unwrap();
        freelist::alloc_inode(&mut session, &mut sb, InodeType::Directory, 0).unwrap();
        (session, sb)
    }

    #[test]
    fn append_then_lookup_round_trips() {
        let (mut session, mut sb) = new_session();
        let mut root = session.read_inode(&sb, 0).unwrap();
        let id = append(&mut session, &mut sb, &mut root, "a", InodeType::File, 0).unwrap();
        assert_eq!(lookup(&mut session, &sb, &root, "a").unwrap(), Some(id));
        assert_eq!(lookup(&mut session, &sb, &root, "b").unwrap(), None);
    }

    #[test]
    fn duplicate_name_rejected() {
        let (mut session, mut sb) = new_session();
        let mut root = session.read_inode(&sb, 0).unwrap();
        append(&mut session, &mut sb, &mut root, "a", InodeType::File, 0).unwrap();
        let err = append(&mut session, &mut sb, &mut root, "a", InodeType::File, 0).unwrap_err();
        assert!(matches!(err, FsError::Exists));
    }

    #[test]
    fn remove_last_entry_frees_its_inode() {
        let (mut session, mut sb) = new_session();
        let mut root = session.read_inode(&sb, 0).unwrap();
        append(&mut session, &mut sb, &mut root, "a", InodeType::File, 0).unwrap();
        let used_before = sb.used_inodes;
        remove(&mut session, &mut sb, &mut root, "a").unwrap();
        assert_eq!(sb.used_inodes, used_before - 1);
        assert_eq!(lookup(&mut session, &sb, &root, "a").unwrap(), None);
        assert_eq!(root.size, 0);
    }

    #[test]
    fn remove_non_tail_entry_leaves_a_stale_row() {
        let (mut session, mut sb) = new_session();
        let mut root = session.read_inode(&sb, 0).unwrap();
        append(&mut session, &mut sb, &mut root, "a", InodeType::File, 0).unwrap();
        append(&mut session, &mut sb, &mut root, "b", InodeType::File, 0).unwrap();
        let size_before = root.size;
        let used_before = sb.used_inodes;
        remove(&mut session, &mut sb, &mut root, "a").unwrap();
        // Not the tail row: no splice, no release.
        assert_eq!(root.size, size_before);
        assert_eq!(sb.used_inodes, used_before);
        assert_eq!(lookup(&mut session, &sb, &root, "a").unwrap().is_some(), true);
    }
}
