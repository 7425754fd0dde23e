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

//! `stat P`: prints a detailed, labeled metadata block for the object at `P`.

use crate::cli::display;
use fscore::FsError;
use fscore::InodeType;
use std::path::Path;

pub fn run(fs_path: &Path, target: &str) -> Result<(), FsError> {
    let inode = fscore::ops::stat_object(fs_path, target)?;
    let kind = inode.kind();
    let type_name = if kind == InodeType::Directory {
        "directory"
    } else {
        "regular file"
    };
    let id = inode.id;
    let size = inode.size;
    let permissions = inode.permissions;
    let user = display::user_name(inode.uid);
    let group = display::group_name(inode.gid);
    let date = display::format_timestamp(inode.mod_time, ' ');

    println!("{:>17}: {}", "File", target);
    println!("{:>17}: {}", "Type", type_name);
    println!("{:>17}: {}", "Size", size);
    println!("{:>17}: {}", "Inode", id);
    println!("{:>17}: {}", "Uid", user);
    println!("{:>17}: {}", "Gid", group);
    println!("{:>17}: {}", "Access", permissions);
    println!("{:>17}: {}", "Modification time", date);
    Ok(())
}
