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

//! `cpfile S D`: copies `S` to `D`. Direction is inferred from whether `D` starts with `+`.

use fscore::FsError;
use std::path::Path;

pub fn run(fs_path: &Path, src: &str, dst: &str) -> Result<(), FsError> {
    if dst.starts_with('+') {
        fscore::ops::copy_in(fs_path, Path::new(src), dst)
    } else {
        fscore::ops::copy_out(fs_path, src, Path::new(dst))
    }
}
