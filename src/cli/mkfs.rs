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

//! `mkfs`: builds a fresh filesystem in the backing file, sized to its current length.

use fscore::FsError;
use std::path::Path;

pub fn run(fs_path: &Path) -> Result<(), FsError> {
    let fs_size = std::fs::metadata(fs_path).map_err(FsError::Open)?.len();
    fscore::ops::mkfs(fs_path, fs_size as u32)?;
    println!("File system created successfully");
    Ok(())
}
