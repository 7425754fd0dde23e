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

//! A `Session` wraps the backing file and exposes typed, positioned access to every record kind.

use crate::block_io;
use crate::block_io::BLOCK_SIZE;
use crate::dirent::DirRow;
use crate::error::FsError;
use crate::inode::Inode;
use crate::superblock::Superblock;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;

/// An open backing file, plus the typed record accessors built on [`block_io`].
pub struct Session {
    file: File,
}

impl Session {
    /// Opens an existing image for reading and writing.
    pub fn open(path: &Path) -> Result<Self, FsError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(FsError::Open)?;
        Ok(Self { file })
    }

    /// Creates a fresh image at `path`, truncating it if it already exists.
    pub fn create(path: &Path) -> Result<Self, FsError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(FsError::Open)?;
        Ok(Self { file })
    }

    /// Reads the superblock from block 0. Does not validate its checksum.
    pub fn read_superblock(&mut self) -> Result<Superblock, FsError> {
        block_io::seek(&mut self.file, 0, "superblock")?;
        block_io::read_record(&mut self.file, "superblock")
    }

    /// Reseals and writes the superblock to block 0.
    pub fn write_superblock(&mut self, sb: &mut Superblock) -> Result<(), FsError> {
        sb.reseal();
        block_io::seek(&mut self.file, 0, "superblock")?;
        block_io::write_record(&mut self.file, sb, "superblock")
    }

    /// Reads inode `id`.
    pub fn read_inode(&mut self, sb: &Superblock, id: u16) -> Result<Inode, FsError> {
        let offset = block_io::inode_offset(
            id as u32,
            sb.inodes_per_datablock as u32,
            Inode::SIZE as u64,
        );
        block_io::seek(&mut self.file, offset, "inode")?;
        block_io::read_record(&mut self.file, "inode")
    }

    /// Writes `inode` back to its slot in the inode table.
    pub fn write_inode(&mut self, sb: &Superblock, inode: &Inode) -> Result<(), FsError> {
        let offset = block_io::inode_offset(
            inode.id as u32,
            sb.inodes_per_datablock as u32,
            Inode::SIZE as u64,
        );
        block_io::seek(&mut self.file, offset, "inode")?;
        block_io::write_record(&mut self.file, inode, "inode")
    }

    /// Reads the whole content of data block `index`, payload and trailer.
    pub fn read_datablock_raw(&mut self, sb: &Superblock, index: u32) -> Result<Vec<u8>, FsError> {
        let offset = block_io::datablock_offset(index, sb.inode_table_blocks());
        block_io::seek(&mut self.file, offset, "data block")?;
        let mut buf = vec![0u8; BLOCK_SIZE as usize];
        self.file
            .read_exact(&mut buf)
            .map_err(|e| FsError::Read("data block", e))?;
        Ok(buf)
    }

    /// Overwrites the first `len` bytes of data block `index`'s payload, leaving the rest (and
    /// the trailer) untouched.
    pub fn write_datablock_payload(
        &mut self,
        sb: &Superblock,
        index: u32,
        payload: &[u8],
    ) -> Result<(), FsError> {
        debug_assert!(payload.len() <= BLOCK_SIZE as usize);
        let offset = block_io::datablock_offset(index, sb.inode_table_blocks());
        block_io::seek(&mut self.file, offset, "data block")?;
        self.file
            .write_all(payload)
            .map_err(|e| FsError::Write("data block", e))
    }

    /// Reads the free-chain trailer of data block `index`, without touching its payload.
    pub fn read_datablock_trailer(&mut self, sb: &Superblock, index: u32) -> Result<u16, FsError> {
        let offset = block_io::datablock_offset(index, sb.inode_table_blocks())
            + BLOCK_SIZE
            - 2;
        block_io::seek(&mut self.file, offset, "data block trailer")?;
        let mut buf = [0u8; 2];
        self.file
            .read_exact(&mut buf)
            .map_err(|e| FsError::Read("data block trailer", e))?;
        Ok(u16::from_ne_bytes(buf))
    }

    /// Writes the free-chain trailer of data block `index`, without touching its payload.
    pub fn write_datablock_trailer(
        &mut self,
        sb: &Superblock,
        index: u32,
        next_free: u16,
    ) -> Result<(), FsError> {
        let offset = block_io::datablock_offset(index, sb.inode_table_blocks())
            + BLOCK_SIZE
            - 2;
        block_io::seek(&mut self.file, offset, "data block trailer")?;
        self.file
            .write_all(&next_free.to_ne_bytes())
            .map_err(|e| FsError::Write("data block trailer", e))
    }

    /// Reads directory row `row` (0-based) of data block `block_index`.
    pub fn read_dirrow(
        &mut self,
        sb: &Superblock,
        block_index: u32,
        row: usize,
    ) -> Result<DirRow, FsError> {
        let offset =
            block_io::datablock_offset(block_index, sb.inode_table_blocks()) + (row * DirRow::SIZE) as u64;
        block_io::seek(&mut self.file, offset, "directory row")?;
        block_io::read_record(&mut self.file, "directory row")
    }

    /// Writes directory row `row` (0-based) of data block `block_index`.
    pub fn write_dirrow(
        &mut self,
        sb: &Superblock,
        block_index: u32,
        row: usize,
        entry: &DirRow,
    ) -> Result<(), FsError> {
        let offset =
            block_io::datablock_offset(block_index, sb.inode_table_blocks()) + (row * DirRow::SIZE) as u64;
        block_io::seek(&mut self.file, offset, "directory row")?;
        block_io::write_record(&mut self.file, entry, "directory row")
    }

    /// Truncates and zero-fills the backing file to exactly `size` bytes. Used only by `mkfs`.
    pub fn set_len(&mut self, size: u64) -> Result<(), FsError> {
        self.file
            .set_len(size)
            .map_err(|e| FsError::Write("image size", e))
    }

    /// Exposes the raw file for direct positioned access, for operations (`mkfs`, `cpfile`) that
    /// need patterns block_io's typed helpers don't cover.
    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}
