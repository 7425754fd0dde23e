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

//! `lsdir P`: lists the entries of the directory at `P`.

use crate::cli::display;
use fscore::FsError;
use std::path::Path;

pub fn run(fs_path: &Path, target: &str) -> Result<(), FsError> {
    let entries = fscore::ops::list_dir(fs_path, target)?;
    for (name, inode) in entries {
        let mode = display::mode_string(inode.kind(), inode.permissions);
        let user = display::user_name(inode.uid);
        let group = display::group_name(inode.gid);
        let size = inode.size;
        let date = display::format_timestamp(inode.mod_time, 'T');
        println!("{mode} {user} {group} {size} {date} {name}");
    }
    Ok(())
}
