//! Root-relative addressing.
//!
//! All externally visible paths are expressed relative to the configured
//! root and prefixed with `/`. Filesystem paths outside the root never leave
//! this module in rendered form.

use crate::error::{FolderDavError, FolderDavResult};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Bytes escaped inside one URL path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Check that `name` names exactly one direct child entry.
pub fn is_plain_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Render `path` as a `/`-prefixed path relative to `root`.
///
/// The root itself renders as `/`.
pub fn root_relative(root: &Path, path: &Path) -> String {
    let Ok(relative) = path.strip_prefix(root) else {
        warn!(
            root = %root.display(),
            path = %path.display(),
            "Path is not below the root, rendering as root"
        );
        return "/".to_string();
    };

    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", segments.join("/"))
}

/// Percent-encode each segment of a rendered root-relative path for use as
/// a link target. Separators are kept as-is.
pub fn encode_href(relative: &str) -> String {
    relative
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Compute `<root>/<collection_name>/<new_name>` for copy and move.
///
/// The collection name is only ever interpreted relative to `root`: an
/// absolute name below the root has the root stripped, and any other
/// absolute name loses its leading separator. Parent-directory components
/// are refused.
pub fn rerooted_destination(
    root: &Path,
    collection_name: &str,
    new_name: &str,
) -> FolderDavResult<PathBuf> {
    if !is_plain_segment(new_name) {
        return Err(FolderDavError::invalid_path(
            new_name,
            "destination name must be a single path segment",
        ));
    }

    let name_path = Path::new(collection_name);
    let relative = name_path.strip_prefix(root).unwrap_or(name_path);

    let mut destination = root.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => destination.push(segment),
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(FolderDavError::invalid_path(
                    collection_name,
                    "destination collection escapes the root",
                ));
            }
        }
    }
    destination.push(new_name);
    Ok(destination)
}

/// Resolve a `/`-separated request path below `root`.
///
/// Empty segments are ignored, so `""`, `"/"` and `"//"` all address the
/// root. `.` and `..` segments are refused rather than normalized.
pub fn resolve_request_path(root: &Path, url_path: &str) -> FolderDavResult<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in url_path.split('/').filter(|s| !s.is_empty()) {
        if !is_plain_segment(segment) {
            return Err(FolderDavError::invalid_path(
                url_path,
                format!("segment '{segment}' is not addressable"),
            ));
        }
        resolved.push(segment);
    }
    Ok(resolved)
}
