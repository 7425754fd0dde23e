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

//! Entry point of `bdsm`: reads `BDSM_FS`, dispatches the first argument to a subcommand.

mod cli;

use fscore::FsError;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::exit;

const BIN: &str = "bdsm";

fn usage() -> ! {
    eprintln!("usage: {BIN} <mkfs|fsck|debug|lsdir P|lsobj P|stat P|mkdir P|rmdir P|cpfile S D>");
    exit(1);
}

fn backing_file() -> PathBuf {
    match env::var_os("BDSM_FS") {
        Some(path) => PathBuf::from(path),
        None => {
            let err = FsError::Open(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "BDSM_FS is not set",
            ));
            report_error(&err);
        }
    }
}

fn report_error(err: &FsError) -> ! {
    eprintln!("{BIN}: error: {err}");
    exit(err.exit_code());
}

fn arg_str(arg: &OsString) -> String {
    arg.to_str().map(str::to_owned).unwrap_or_else(usage)
}

fn main() {
    let mut args = env::args_os();
    args.next();
    let command = args.next().unwrap_or_else(usage);
    let command = arg_str(&command);
    let rest: Vec<OsString> = args.collect();

    let fs_path = backing_file();

    let result = match (command.as_str(), rest.len()) {
        ("mkfs", 0) => cli::mkfs::run(&fs_path),
        ("fsck", 0) => cli::fsck::run(&fs_path),
        ("debug", 0) => cli::debug::run(&fs_path),
        ("lsdir", 1) => cli::lsdir::run(&fs_path, &arg_str(&rest[0])),
        ("lsobj", 1) => cli::lsobj::run(&fs_path, &arg_str(&rest[0])),
        ("stat", 1) => cli::stat::run(&fs_path, &arg_str(&rest[0])),
        ("mkdir", 1) => cli::mkdir::run(&fs_path, &arg_str(&rest[0])),
        ("rmdir", 1) => cli::rmdir::run(&fs_path, &arg_str(&rest[0])),
        ("cpfile", 2) => cli::cpfile::run(&fs_path, &arg_str(&rest[0]), &arg_str(&rest[1])),
        _ => usage(),
    };

    if let Err(err) = result {
        report_error(&err);
    }
}
