//! Recursive directory copy and move.
//!
//! Neither operation is atomic. A failed copy leaves whatever was already
//! written at the destination in place.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Copy the directory tree at `src` into `dst`.
///
/// Symbolic links are followed, so a link to a directory is copied as a
/// directory. Missing destination directories are created and existing
/// destination files are overwritten. Access and modification times are carried over
/// from the source, directories included.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::metadata(src)?;
    if !meta.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("source '{}' is not a directory", src.display()),
        ));
    }
    if overlaps(src, dst) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "destination '{}' is the source or lies inside it",
                dst.display()
            ),
        ));
    }

    fs::create_dir_all(dst)?;

    // Directory times are applied after their contents are written,
    // deepest first, since writing a child touches the parent's mtime.
    let mut dirs: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            dirs.push((entry.path().to_path_buf(), target));
        } else {
            trace!(from = %entry.path().display(), to = %target.display(), "Copying file");
            fs::copy(entry.path(), &target)?;
            copy_times(entry.path(), &target)?;
        }
    }

    for (from, to) in dirs.iter().rev() {
        copy_times(from, to)?;
    }

    Ok(())
}

/// Move the directory tree at `src` to `dst`.
///
/// `dst` must not exist. A rename is tried first; if the filesystem refuses
/// it (for example across devices) the tree is copied and then removed.
pub fn move_tree(src: &Path, dst: &Path) -> io::Result<()> {
    if dst.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("destination '{}' already exists", dst.display()),
        ));
    }
    if overlaps(src, dst) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot move '{}' into itself", src.display()),
        ));
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound && !src.exists() => Err(e),
        Err(e) => {
            debug!(
                from = %src.display(),
                to = %dst.display(),
                error = %e,
                "Rename failed, falling back to copy and delete"
            );
            copy_tree(src, dst)?;
            fs::remove_dir_all(src)
        }
    }
}

fn copy_times(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from)?;
    set_file_times(
        to,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
}

/// True if `dst` is `src` or lies below it.
fn overlaps(src: &Path, dst: &Path) -> bool {
    let src = fs::canonicalize(src).unwrap_or_else(|_| src.to_path_buf());
    let dst = canonicalize_lenient(dst);
    dst.starts_with(&src)
}

/// Canonicalize the longest existing ancestor of `path` and re-append the rest.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        if let Ok(canonical) = fs::canonicalize(existing) {
            let mut resolved = canonical;
            for part in rest.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
