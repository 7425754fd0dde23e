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

//! Core library for the single-file block filesystem: on-disk records, the two free chains, the
//! directory service, path resolution, and the high-level operations the `bdsm` binary exposes.

pub mod block_io;
pub mod checksum;
pub mod datablock;
pub mod dirent;
pub mod directory;
pub mod error;
pub mod freelist;
pub mod inode;
pub mod ops;
pub mod path;
pub mod perm;
pub mod session;
pub mod superblock;

pub use datablock::DataBlock;
pub use dirent::DirRow;
pub use error::FsError;
pub use inode::Inode;
pub use inode::InodeType;
pub use session::Session;
pub use superblock::Superblock;
