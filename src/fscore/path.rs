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

//! Path grammar validation and resolution against the image's directory tree.
//!
//! Paths look like `+/a/b/c`: a literal `+/` prefix followed by zero or more `/`-separated
//! segments, each made of `[A-Za-z0-9_.]` bytes. The bare root `+/` is valid grammar but is
//! rejected by [`validate_strict`]; callers that accept operating on the root itself (`lsdir`,
//! `lsobj`, `stat`, `rmdir`) special-case it, while callers that name something to create
//! (`mkdir`, `cpfile`'s destination) do not.

use crate::directory;
use crate::error::FsError;
use crate::inode::Inode;
use crate::session::Session;
use crate::superblock::Superblock;

fn is_segment_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'.'
}

/// Tells whether `path` is `+/` followed by at least one well-formed segment.
pub fn validate_strict(path: &str) -> bool {
    let bytes = path.as_bytes();
    if bytes.len() <= 2 || &bytes[..2] != b"+/" {
        return false;
    }
    let rest = &bytes[2..];
    if rest.first() == Some(&b'/') || rest.last() == Some(&b'/') {
        return false;
    }
    let mut prev_slash = false;
    for &b in rest {
        if b == b'/' {
            if prev_slash {
                return false;
            }
            prev_slash = true;
        } else {
            if !is_segment_byte(b) {
                return false;
            }
            prev_slash = false;
        }
    }
    true
}

/// Tells whether `path` is exactly the bare root.
pub fn is_root(path: &str) -> bool {
    path == "+/"
}

/// Splits a validated non-root path into its segments.
pub fn split_segments(path: &str) -> Vec<&str> {
    path[2..].split('/').collect()
}

/// Splits a validated non-root path into its parent path and final segment name.
///
/// `+/a/b/c` becomes (`+/a/b`, `c`); `+/a` becomes (`+/`, `a`).
pub fn parent_and_last(path: &str) -> (String, String) {
    let rest = &path[2..];
    match rest.rfind('/') {
        Some(idx) => (format!("+/{}", &rest[..idx]), rest[idx + 1..].to_string()),
        None => ("+/".to_string(), rest.to_string()),
    }
}

/// Resolves `path` to an inode id, walking segment by segment from the root.
///
/// Accepts the bare root. Any grammar violation or failed segment lookup is reported as
/// [`FsError::BadPath`]: the source this filesystem follows does not distinguish a malformed
/// path from one that is well-formed but dangling.
pub fn resolve(session: &mut Session, sb: &Superblock, path: &str) -> Result<u16, FsError> {
    try_resolve(session, sb, path)?.ok_or(FsError::BadPath)
}

/// Like [`resolve`], but returns `None` instead of erroring when a segment lookup fails partway
/// through a syntactically valid path. Used by `cpfile` to tell "does not exist" from "malformed".
pub fn try_resolve(
    session: &mut Session,
    sb: &Superblock,
    path: &str,
) -> Result<Option<u16>, FsError> {
    if is_root(path) {
        return Ok(Some(0));
    }
    if !validate_strict(path) {
        return Err(FsError::BadPath);
    }
    let mut current = 0u16;
    for seg in split_segments(path) {
        let dir: Inode = session.read_inode(sb, current)?;
        match directory::lookup(session, sb, &dir, seg)? {
            Some(id) => current = id,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_accepts_well_formed_paths() {
        assert!(validate_strict("+/a"));
        assert!(validate_strict("+/a/b/c"));
        assert!(validate_strict("+/a.b_2"));
    }

    #[test]
    fn grammar_rejects_bare_root_and_malformed_paths() {
        assert!(!validate_strict("+/"));
        assert!(!validate_strict("+/a/"));
        assert!(!validate_strict("+//a"));
        assert!(!validate_strict("+/a//b"));
        assert!(!validate_strict("a/b"));
        assert!(!validate_strict("+/a b"));
        assert!(!validate_strict("+/a-b"));
    }

    #[test]
    fn parent_and_last_splits_correctly() {
        assert_eq!(parent_and_last("+/a"), ("+/".to_string(), "a".to_string()));
        assert_eq!(
            parent_and_last("+/a/b/c"),
            ("+/a/b".to_string(), "c".to_string())
        );
    }
}
