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

//! The error kinds produced by the filesystem core, and their mapping to the stable exit codes.

use std::fmt;
use std::io;

/// A single closed sum type covering every way an operation on the image can fail.
///
/// Each variant carries enough context to format a diagnostic; the CLI binary is the only place
/// that translates a variant into a process exit code.
#[derive(Debug)]
pub enum FsError {
    /// The backing file could not be opened.
    Open(io::Error),
    /// A positioned write failed.
    Write(&'static str, io::Error),
    /// A positioned read failed.
    Read(&'static str, io::Error),
    /// A seek failed.
    Seek(&'static str, io::Error),
    /// A path did not satisfy the path grammar.
    BadPath,
    /// A path resolved to nothing.
    Absent,
    /// A directory entry with that name already exists.
    Exists,
    /// No free inodes remain.
    NoInodes,
    /// No free data blocks remain.
    NoBlocks,
    /// A directory entry name is longer than the row can hold.
    NameTooLong,
    /// A host file is too large to fit within ten data blocks.
    TooBig,
    /// A directory has no room for another entry.
    DirFull,
    /// The superblock checksum or a free-chain length did not match.
    Corrupt,
    /// `rmdir` was asked to remove the root, a non-directory, or a non-empty directory.
    RmdirPrecondition,
    /// A data block referenced by a directory's size was missing (`-1`) during removal.
    Internal,
    /// The host source file could not be opened for `cpfile`.
    HostOpenSrc(io::Error),
    /// The host destination file could not be opened for `cpfile`.
    HostOpenDst(io::Error),
    /// A write to a host file failed.
    HostWrite(io::Error),
    /// A read from a host file failed.
    HostRead(io::Error),
}

impl FsError {
    /// Returns the stable exit code for this error, per the external interface table.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Open(_) => 2,
            Self::Write(..) => 7,
            Self::Read(..) => 6,
            Self::Seek(..) => 8,
            Self::BadPath => 12,
            Self::Absent => 18,
            Self::Exists => 9,
            Self::NoInodes => 11,
            Self::NoBlocks => 11,
            Self::NameTooLong => 13,
            Self::TooBig => 17,
            Self::DirFull => 14,
            Self::Corrupt => 10,
            Self::RmdirPrecondition => 21,
            Self::Internal => 22,
            Self::HostOpenSrc(_) => 15,
            Self::HostOpenDst(_) => 16,
            Self::HostWrite(_) => 19,
            Self::HostRead(_) => 20,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(e) => write!(f, "cannot open backing file: {e}"),
            Self::Write(ctx, e) => write!(f, "write failed ({ctx}): {e}"),
            Self::Read(ctx, e) => write!(f, "read failed ({ctx}): {e}"),
            Self::Seek(ctx, e) => write!(f, "seek failed ({ctx}): {e}"),
            Self::BadPath => write!(f, "invalid path"),
            Self::Absent => write!(f, "no such file or directory in image"),
            Self::Exists => write!(f, "already exists"),
            Self::NoInodes => write!(f, "no free inodes"),
            Self::NoBlocks => write!(f, "no free data blocks"),
            Self::NameTooLong => write!(f, "name too long"),
            Self::TooBig => write!(f, "file too big"),
            Self::DirFull => write!(f, "directory full"),
            Self::Corrupt => write!(f, "filesystem is corrupt"),
            Self::RmdirPrecondition => {
                write!(f, "not a directory, or directory not empty, or is the root")
            }
            Self::Internal => write!(f, "internal inconsistency"),
            Self::HostOpenSrc(e) => write!(f, "cannot open source file: {e}"),
            Self::HostOpenDst(e) => write!(f, "cannot open destination file: {e}"),
            Self::HostWrite(e) => write!(f, "host write failed: {e}"),
            Self::HostRead(e) => write!(f, "host read failed: {e}"),
        }
    }
}

impl std::error::Error for FsError {}
