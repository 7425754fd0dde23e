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

//! The filesystem operations the `bdsm` binary exposes: `mkfs`, `fsck`, `debug`, `lsdir`,
//! `lsobj`, `stat`, `mkdir`, `rmdir`, and the two directions of `cpfile`.
//!
//! Every function here opens its own [`Session`] and runs to completion (or failure) within it;
//! nothing is cached across calls, matching the one-command-per-process model.

use crate::block_io;
use crate::block_io::BLOCK_SIZE;
use crate::directory;
use crate::error::FsError;
use crate::freelist;
use crate::inode::DATABLOCKS_PER_INODE;
use crate::inode::Inode;
use crate::inode::InodeType;
use crate::path;
use crate::perm;
use crate::session::Session;
use crate::superblock;
use crate::superblock::Superblock;
use std::io::Read;
use std::io::Write;
use std::mem::size_of;
use std::os::unix::fs::MetadataExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

fn now_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Builds a fresh filesystem of `fs_size` bytes at `path`, truncating any existing content.
pub fn mkfs(path: &Path, fs_size: u32) -> Result<(), FsError> {
    let mut session = Session::create(path)?;
    session.set_len(fs_size as u64)?;

    let inode_size = Inode::SIZE as u32;
    let inodes_per_block = BLOCK_SIZE as u32 / inode_size;
    let inode_count = (fs_size - size_of::<Superblock>() as u32) / 2000;
    let itb = block_io::inode_table_blocks(inode_count, inodes_per_block);
    let data_blocks = (fs_size / BLOCK_SIZE as u32).saturating_sub(1 + itb);

    let mut sb = Superblock {
        magic: superblock::MAGIC,
        inode_count: inode_count as u16,
        used_inodes: 0,
        data_blocks: data_blocks as u16,
        used_data_blocks: 0,
        first_free_inode: 0,
        first_free_datablock: 0,
        inodes_per_datablock: inodes_per_block as u16,
        fs_size,
        checksum: 0,
    };

    let mod_time = now_epoch_seconds();
    freelist::format_chains(&mut session, &mut sb, mod_time, 0, 0, perm::DEFAULT_PERMISSIONS)?;
    session.write_superblock(&mut sb)?;
    let root = freelist::alloc_inode(&mut session, &mut sb, InodeType::Directory, mod_time)?;
    debug_assert_eq!(root, 0);
    Ok(())
}

/// Verifies the superblock checksum and both free-chain lengths.
pub fn fsck(path: &Path) -> Result<(), FsError> {
    let mut session = Session::open(path)?;
    let sb = session.read_superblock()?;
    if !sb.is_checksum_valid() {
        return Err(FsError::Corrupt);
    }

    let mut count = 0u32;
    let mut cur = sb.first_free_inode;
    while cur >= 0 && (cur as u32) < sb.inode_count as u32 {
        let inode = session.read_inode(&sb, cur as u16)?;
        count += 1;
        cur = inode.next_free_inode;
    }
    if count != (sb.inode_count - sb.used_inodes) as u32 {
        return Err(FsError::Corrupt);
    }

    let mut count = 0u32;
    let mut cur = sb.first_free_datablock;
    while cur >= 0 && (cur as u32) < sb.data_blocks as u32 {
        let next = session.read_datablock_trailer(&sb, cur as u32)?;
        count += 1;
        cur = next as i32;
    }
    if count != (sb.data_blocks - sb.used_data_blocks) as u32 {
        return Err(FsError::Corrupt);
    }
    Ok(())
}

/// Reads the raw superblock for `debug` to print, without validating it.
pub fn debug_info(path: &Path) -> Result<Superblock, FsError> {
    let mut session = Session::open(path)?;
    session.read_superblock()
}

/// Resolves `obj_path` and returns its inode, for `lsobj` and `stat`.
pub fn stat_object(path: &Path, obj_path: &str) -> Result<Inode, FsError> {
    let mut session = Session::open(path)?;
    let sb = session.read_superblock()?;
    let id = path::resolve(&mut session, &sb, obj_path)?;
    session.read_inode(&sb, id)
}

/// Resolves `dir_path` (must be a directory) and returns its entries as `(name, inode)` pairs.
pub fn list_dir(path: &Path, dir_path: &str) -> Result<Vec<(String, Inode)>, FsError> {
    let mut session = Session::open(path)?;
    let sb = session.read_superblock()?;
    let id = path::resolve(&mut session, &sb, dir_path)?;
    let dir = session.read_inode(&sb, id)?;
    if dir.kind() != InodeType::Directory {
        return Err(FsError::BadPath);
    }

    let (blocks_used, last_rows) = directory::shape(dir.size);
    let mut entries = Vec::new();
    for b in 0..blocks_used {
        let rows = if b + 1 == blocks_used { last_rows } else { directory::ROWS_PER_BLOCK };
        let db = dir.datablocks[b];
        if db < 0 {
            return Err(FsError::Internal);
        }
        for r in 0..rows {
            let row = session.read_dirrow(&sb, db as u32, r)?;
            let child = session.read_inode(&sb, row.child_id)?;
            entries.push((row.name().to_string(), child));
        }
    }
    Ok(entries)
}

/// Creates an empty directory at `target`, which must name a not-yet-existing child of an
/// existing parent.
pub fn make_dir(path: &Path, target: &str) -> Result<(), FsError> {
    if !path::validate_strict(target) {
        return Err(FsError::BadPath);
    }
    let (parent_path, last) = path::parent_and_last(target);

    let mut session = Session::open(path)?;
    let mut sb = session.read_superblock()?;
    let parent_id = path::resolve(&mut session, &sb, &parent_path)?;
    let mut parent = session.read_inode(&sb, parent_id)?;

    let mod_time = now_epoch_seconds();
    directory::append(&mut session, &mut sb, &mut parent, &last, InodeType::Directory, mod_time)?;
    Ok(())
}

/// Removes the empty directory at `target` from its parent.
pub fn remove_dir(path: &Path, target: &str) -> Result<(), FsError> {
    let mut session = Session::open(path)?;
    let mut sb = session.read_superblock()?;
    let id = path::resolve(&mut session, &sb, target)?;
    let inode = session.read_inode(&sb, id)?;
    if id == 0 || inode.size != 0 || inode.kind() != InodeType::Directory {
        return Err(FsError::RmdirPrecondition);
    }

    let (parent_path, last) = path::parent_and_last(target);
    let parent_id = path::resolve(&mut session, &sb, &parent_path)?;
    let mut parent = session.read_inode(&sb, parent_id)?;
    directory::remove(&mut session, &mut sb, &mut parent, &last)
}

/// Releases every data block currently attached to `inode` and zeros its size, in place.
fn truncate_inode(session: &mut Session, sb: &mut Superblock, inode: &mut Inode) -> Result<(), FsError> {
    let used = inode.blocks_in_use();
    for i in 0..used {
        let slot = inode.datablocks[i];
        if slot >= 0 {
            freelist::release_datablock(session, sb, slot as u16)?;
        }
        inode.datablocks[i] = -1;
    }
    inode.size = 0;
    session.write_inode(sb, inode)
}

/// Copies a host file into the image at `image_dst`, creating it (or truncating an existing
/// file inode of the same name) as needed.
pub fn copy_in(image_path: &Path, host_src: &Path, image_dst: &str) -> Result<(), FsError> {
    let mut host_file = std::fs::File::open(host_src).map_err(FsError::HostOpenSrc)?;
    let metadata = host_file.metadata().map_err(FsError::HostOpenSrc)?;
    let size = metadata.len();
    let blocks_needed = (size as usize).div_ceil(BLOCK_SIZE as usize);
    if blocks_needed > DATABLOCKS_PER_INODE {
        return Err(FsError::TooBig);
    }

    let mut session = Session::open(image_path)?;
    let mut sb = session.read_superblock()?;
    let mod_time = now_epoch_seconds();

    let child_id = match path::try_resolve(&mut session, &sb, image_dst)? {
        Some(id) => {
            let mut inode = session.read_inode(&sb, id)?;
            if inode.kind() != InodeType::File {
                return Err(FsError::Exists);
            }
            truncate_inode(&mut session, &mut sb, &mut inode)?;
            id
        }
        None => {
            if !path::validate_strict(image_dst) {
                return Err(FsError::BadPath);
            }
            let (parent_path, last) = path::parent_and_last(image_dst);
            let parent_id = path::resolve(&mut session, &sb, &parent_path)?;
            let mut parent = session.read_inode(&sb, parent_id)?;
            directory::append(&mut session, &mut sb, &mut parent, &last, InodeType::File, mod_time)?
        }
    };

    let mut inode = session.read_inode(&sb, child_id)?;
    let mut remaining = size;
    let mut buf = [0u8; BLOCK_SIZE as usize];
    for i in 0..blocks_needed {
        let chunk = remaining.min(BLOCK_SIZE) as usize;
        host_file
            .read_exact(&mut buf[..chunk])
            .map_err(FsError::HostRead)?;
        let db = freelist::alloc_datablock(&mut session, &mut sb)?;
        inode.datablocks[i] = db as i32;
        session.write_datablock_payload(&sb, db as u32, &buf[..chunk])?;
        remaining -= chunk as u64;
    }

    inode.size = size as u32;
    inode.permissions = perm::encode_permissions(metadata.permissions().mode());
    inode.uid = metadata.uid() as u16;
    inode.gid = metadata.gid() as u16;
    inode.mod_time = mod_time;
    session.write_inode(&sb, &inode)?;
    session.write_superblock(&mut sb)?;
    Ok(())
}

/// Copies a file out of the image at `image_src` onto the host at `host_dst`.
pub fn copy_out(image_path: &Path, image_src: &str, host_dst: &Path) -> Result<(), FsError> {
    let mut session = Session::open(image_path)?;
    let sb = session.read_superblock()?;
    let id = path::try_resolve(&mut session, &sb, image_src)?.ok_or(FsError::Absent)?;
    let inode = session.read_inode(&sb, id)?;
    if inode.kind() != InodeType::File {
        return Err(FsError::Absent);
    }

    let mut host_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(host_dst)
        .map_err(FsError::HostOpenDst)?;

    let blocks = inode.blocks_in_use();
    let mut remaining = inode.size as u64;
    for i in 0..blocks {
        let slot = inode.datablocks[i];
        if slot < 0 {
            return Err(FsError::Internal);
        }
        let chunk = remaining.min(BLOCK_SIZE) as usize;
        let raw = session.read_datablock_raw(&sb, slot as u32)?;
        host_file.write_all(&raw[..chunk]).map_err(FsError::HostWrite)?;
        remaining -= chunk as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_image_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("bdsm-ops-test-{tag}-{:?}", std::thread::current().id()))
    }

    #[test]
    fn mkfs_then_fsck_succeeds() {
        let path = temp_image_path("mkfs-fsck");
        mkfs(&path, 1_048_576).unwrap();
        fsck(&path).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mkfs_leaves_root_as_empty_directory() {
        let path = temp_image_path("mkfs-root");
        mkfs(&path, 1_048_576).unwrap();
        let root = stat_object(&path, "+/").unwrap();
        assert_eq!(root.kind(), InodeType::Directory);
        assert_eq!(root.size, 0);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mkdir_creates_a_listable_entry() {
        let path = temp_image_path("mkdir-list");
        mkfs(&path, 1_048_576).unwrap();
        make_dir(&path, "+/a").unwrap();
        let entries = list_dir(&path, "+/").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "a");
        assert_eq!(entries[0].1.kind(), InodeType::Directory);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mkdir_twice_fails_with_exists() {
        let path = temp_image_path("mkdir-twice");
        mkfs(&path, 1_048_576).unwrap();
        make_dir(&path, "+/a").unwrap();
        let err = make_dir(&path, "+/a").unwrap_err();
        assert_eq!(err.exit_code(), 9);
        fsck(&path).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn mkdir_under_missing_parent_fails_with_bad_path() {
        let path = temp_image_path("mkdir-missing-parent");
        mkfs(&path, 1_048_576).unwrap();
        let err = make_dir(&path, "+/a/b").unwrap_err();
        assert_eq!(err.exit_code(), 12);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rmdir_round_trips_used_inodes() {
        let path = temp_image_path("rmdir-round-trip");
        mkfs(&path, 1_048_576).unwrap();
        make_dir(&path, "+/a").unwrap();
        remove_dir(&path, "+/a").unwrap();
        let sb = debug_info(&path).unwrap();
        assert_eq!(sb.used_inodes, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rmdir_root_fails_precondition() {
        let path = temp_image_path("rmdir-root");
        mkfs(&path, 1_048_576).unwrap();
        let err = remove_dir(&path, "+/").unwrap_err();
        assert_eq!(err.exit_code(), 21);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rmdir_non_empty_fails_precondition() {
        let path = temp_image_path("rmdir-non-empty");
        mkfs(&path, 1_048_576).unwrap();
        make_dir(&path, "+/a").unwrap();
        make_dir(&path, "+/a/b").unwrap();
        let err = remove_dir(&path, "+/a").unwrap_err();
        assert_eq!(err.exit_code(), 21);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn directory_fills_at_eighty_entries() {
        let path = temp_image_path("dir-full");
        mkfs(&path, 1_048_576).unwrap();
        for i in 0..80 {
            make_dir(&path, &format!("+/d{i}")).unwrap();
        }
        let err = make_dir(&path, "+/overflow").unwrap_err();
        assert_eq!(err.exit_code(), 14);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn cpfile_round_trip_preserves_bytes() {
        let image = temp_image_path("cpfile-image");
        mkfs(&image, 1_048_576).unwrap();

        let src = temp_image_path("cpfile-src");
        let mut f = std::fs::File::create(&src).unwrap();
        let content = vec![0x41u8; 600];
        f.write_all(&content).unwrap();
        drop(f);

        copy_in(&image, &src, "+/x").unwrap();
        let inode = stat_object(&image, "+/x").unwrap();
        assert_eq!(inode.size, 600);

        let dst = temp_image_path("cpfile-dst");
        copy_out(&image, "+/x", &dst).unwrap();
        let round_tripped = std::fs::read(&dst).unwrap();
        assert_eq!(round_tripped, content);

        let _ = std::fs::remove_file(&image);
        let _ = std::fs::remove_file(&src);
        let _ = std::fs::remove_file(&dst);
    }

    #[test]
    fn cpfile_too_big_is_rejected() {
        let image = temp_image_path("cpfile-too-big");
        mkfs(&image, 1_048_576).unwrap();

        let src = temp_image_path("cpfile-too-big-src");
        let mut f = std::fs::File::create(&src).unwrap();
        f.write_all(&vec![0u8; 512 * 11]).unwrap();
        drop(f);

        let err = copy_in(&image, &src, "+/big").unwrap_err();
        assert_eq!(err.exit_code(), 17);

        let _ = std::fs::remove_file(&image);
        let _ = std::fs::remove_file(&src);
    }

    #[test]
    fn flipping_any_superblock_byte_fails_fsck() {
        use std::io::Seek;
        use std::io::SeekFrom;

        let path = temp_image_path("fsck-bitflip");
        mkfs(&path, 1_048_576).unwrap();
        let checksum_offset = size_of::<Superblock>() - size_of::<u16>();

        for byte in 0..checksum_offset {
            let mut file = std::fs::OpenOptions::new()
                .read(true)
                .write(true)
                .open(&path)
                .unwrap();
            file.seek(SeekFrom::Start(byte as u64)).unwrap();
            let mut b = [0u8; 1];
            file.read_exact(&mut b).unwrap();
            file.seek(SeekFrom::Start(byte as u64)).unwrap();
            file.write_all(&[b[0] ^ 0xff]).unwrap();
            drop(file);

            assert_eq!(fsck(&path).unwrap_err().exit_code(), 10);

            let mut file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(byte as u64)).unwrap();
            file.write_all(&b).unwrap();
        }
        fsck(&path).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn random_mkdir_rmdir_sequence_keeps_used_inodes_consistent() {
        use rand::Rng;

        let path = temp_image_path("random-mkdir-rmdir");
        mkfs(&path, 1_048_576).unwrap();

        // Only ever pop the tail entry: `directory::remove` splices (and frees the child
        // inode) only when the removed row is the directory's actual last row, so removing
        // anything else wouldn't change `usedInodes` and would break the assertion below.
        let mut rng = rand::thread_rng();
        let mut live: Vec<String> = Vec::new();
        for i in 0..40 {
            let name = format!("+/d{i}");
            make_dir(&path, &name).unwrap();
            live.push(name);
            if rng.gen::<f32>() < 0.3 {
                let victim = live.pop().unwrap();
                remove_dir(&path, &victim).unwrap();
            }
        }

        let sb = debug_info(&path).unwrap();
        assert_eq!(sb.used_inodes as usize, 1 + live.len());
        fsck(&path).unwrap();
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn second_mkdir_on_same_path_leaves_image_untouched() {
        let path = temp_image_path("mkdir-idempotent-bytes");
        mkfs(&path, 1_048_576).unwrap();
        make_dir(&path, "+/a").unwrap();

        let before = std::fs::read(&path).unwrap();
        let err = make_dir(&path, "+/a").unwrap_err();
        assert_eq!(err.exit_code(), 9);
        let after = std::fs::read(&path).unwrap();
        assert_eq!(before, after);

        let _ = std::fs::remove_file(&path);
    }
}
