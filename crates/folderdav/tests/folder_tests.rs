//! Folder resource tests: lookup, listing, index rendering, creation, delete.

mod common;

use common::{TestTree, folder, names, render_index};
use folderdav::{CollectionResource, DavResource, ErrorCategory, FolderDavError, Resource};
use std::io::{self, Read};

// ============================================================================
// Child lookup
// ============================================================================

#[test]
fn test_child_missing_is_none() {
    let tree = TestTree::new();
    let factory = tree.factory();
    let root = factory.root_folder();

    assert!(root.child("nope").is_none());
    assert!(root.child("nope.txt").is_none());
}

#[test]
fn test_child_types() {
    let tree = TestTree::new();
    tree.mkdir("docs");
    tree.write("readme.txt", b"hello");
    let factory = tree.factory();
    let root = factory.root_folder();

    let docs = root.child("docs").unwrap();
    assert!(docs.is_collection());
    assert!(matches!(docs, Resource::Folder(_)));
    assert_eq!(docs.unique_id(), tree.path("docs").display().to_string());

    let readme = root.child("readme.txt").unwrap();
    assert!(!readme.is_collection());
    assert_eq!(readme.content_length(), Some(5));
}

#[test]
fn test_child_refuses_non_segment_names() {
    let tree = TestTree::new();
    tree.write("a/b.txt", b"x");
    let factory = tree.factory();
    let a = folder(&factory, "/a");

    assert!(a.child("..").is_none());
    assert!(a.child(".").is_none());
    assert!(factory.root_folder().child("a/b.txt").is_none());
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_children_are_typed() {
    let tree = TestTree::new();
    tree.mkdir("photos/2024");
    tree.mkdir("photos/2025");
    tree.write("photos/cover.jpg", b"jpeg");
    let factory = tree.factory();
    let photos = folder(&factory, "/photos");

    let children = photos.children().unwrap();
    assert_eq!(children.len(), 3);
    assert_eq!(names(&children), vec!["2024", "2025", "cover.jpg"]);

    for child in &children {
        let is_dir = child.path().is_dir();
        assert_eq!(child.is_collection(), is_dir, "{}", child.path().display());
        assert_eq!(child.as_folder().is_some(), is_dir);
        assert_eq!(child.as_file().is_some(), !is_dir);
    }
}

#[test]
fn test_children_of_empty_folder() {
    let tree = TestTree::new();
    tree.mkdir("empty");
    let factory = tree.factory();
    assert!(folder(&factory, "/empty").children().unwrap().is_empty());
}

#[test]
fn test_children_reflect_current_disk_state() {
    let tree = TestTree::new();
    tree.mkdir("live");
    let factory = tree.factory();
    let live = folder(&factory, "/live");

    assert_eq!(live.children().unwrap().len(), 0);
    tree.write("live/new.txt", b"1");
    assert_eq!(live.children().unwrap().len(), 1);
}

#[test]
fn test_children_of_vanished_folder_is_io_fault() {
    let tree = TestTree::new();
    tree.mkdir("gone");
    let factory = tree.factory();
    let gone = folder(&factory, "/gone");
    std::fs::remove_dir(tree.path("gone")).unwrap();

    let err = gone.children().unwrap_err();
    assert!(matches!(err, FolderDavError::Io { .. }));
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

// ============================================================================
// Index rendering
// ============================================================================

#[test]
fn test_index_lists_children_with_root_relative_links() {
    let tree = TestTree::new();
    tree.write("a/b/x", b"file");
    tree.mkdir("a/b/y");
    let factory = tree.factory();
    let b = folder(&factory, "/a/b");

    let html = render_index(&b);
    assert!(html.contains("<title>Folder listing for /a/b</title>"), "{html}");
    assert!(html.contains("<h1>Folder listing for /a/b</h1>"), "{html}");
    assert!(html.contains("<li><a href=\"/a/b/x\">x</a></li>"), "{html}");
    assert!(html.contains("<li><a href=\"/a/b/y\">y</a></li>"), "{html}");
    assert!(
        !html.contains(&tree.root().display().to_string()),
        "index leaks the filesystem root: {html}"
    );
}

#[test]
fn test_index_of_root() {
    let tree = TestTree::new();
    tree.write("top.txt", b"");
    let factory = tree.factory();

    let html = render_index(&factory.root_folder());
    assert!(html.contains("<h1>Folder listing for /</h1>"), "{html}");
    assert!(html.contains("<a href=\"/top.txt\">top.txt</a>"), "{html}");
    assert!(html.trim_end().ends_with("</ul></body></html>"));
}

#[test]
fn test_index_escapes_names() {
    let tree = TestTree::new();
    tree.write("docs/<b>&.txt", b"");
    let factory = tree.factory();

    let html = render_index(&folder(&factory, "/docs"));
    assert!(html.contains("&lt;b&gt;&amp;.txt"), "{html}");
    assert!(!html.contains("<b>&"), "{html}");
}

#[test]
fn test_index_percent_encodes_link_targets() {
    let tree = TestTree::new();
    tree.write("docs/notes #1?.txt", b"");
    tree.mkdir("docs/100% done");
    let factory = tree.factory();

    let html = render_index(&folder(&factory, "/docs"));
    assert!(
        html.contains("<li><a href=\"/docs/notes%20%231%3F.txt\">notes #1?.txt</a></li>"),
        "{html}"
    );
    assert!(
        html.contains("<li><a href=\"/docs/100%25%20done\">100% done</a></li>"),
        "{html}"
    );
}

#[test]
fn test_index_of_vanished_folder_writes_nothing() {
    let tree = TestTree::new();
    tree.mkdir("gone");
    let factory = tree.factory();
    let gone = folder(&factory, "/gone");
    std::fs::remove_dir(tree.path("gone")).unwrap();

    let mut out = Vec::new();
    assert!(gone.send_content(&mut out, &Default::default()).is_err());
    assert!(out.is_empty());
}

// ============================================================================
// Collection creation
// ============================================================================

#[test]
fn test_create_collection() {
    let tree = TestTree::new();
    tree.mkdir("parent");
    let factory = tree.factory();
    let parent = folder(&factory, "/parent");

    let sub = parent.create_collection("sub").unwrap();
    assert_eq!(sub.unique_id(), tree.path("parent/sub").display().to_string());
    assert_eq!(sub.root_relative_path(), "/parent/sub");
    common::assert_is_dir(&tree.path("parent/sub"));
}

#[test]
fn test_create_collection_existing_is_none() {
    let tree = TestTree::new();
    tree.mkdir("parent/sub");
    let factory = tree.factory();
    let parent = folder(&factory, "/parent");

    assert!(parent.create_collection("sub").is_none());
    let err = parent.try_create_collection("sub").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::AlreadyExists);
}

#[test]
fn test_try_create_collection_in_vanished_folder() {
    let tree = TestTree::new();
    tree.mkdir("parent");
    let factory = tree.factory();
    let parent = folder(&factory, "/parent");
    std::fs::remove_dir(tree.path("parent")).unwrap();

    let err = parent.try_create_collection("sub").unwrap_err();
    assert!(matches!(err, FolderDavError::Io { .. }));
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert!(parent.create_collection("sub").is_none());
}

#[test]
fn test_create_collection_invalid_name_is_none() {
    let tree = TestTree::new();
    tree.mkdir("parent");
    let factory = tree.factory();
    let parent = folder(&factory, "/parent");

    assert!(parent.create_collection("").is_none());
    assert!(parent.create_collection("..").is_none());
    assert!(parent.create_collection("a/b").is_none());
    assert!(!tree.exists("a"));
}

// ============================================================================
// File creation
// ============================================================================

#[test]
fn test_create_new_writes_stream() {
    let tree = TestTree::new();
    tree.mkdir("uploads");
    let factory = tree.factory();
    let uploads = folder(&factory, "/uploads");

    let content = b"uploaded bytes".to_vec();
    let file = uploads
        .create_new("upload.bin", content.as_slice(), Some(3), Some("text/plain"))
        .unwrap();

    // Advisory length and type are not enforced
    assert_eq!(tree.read("uploads/upload.bin"), content);
    assert_eq!(file.content_length(), Some(content.len() as u64));
    assert_eq!(file.root_relative_path(), "/uploads/upload.bin");
}

#[test]
fn test_create_new_overwrites_existing_file() {
    let tree = TestTree::new();
    tree.write("uploads/upload.bin", b"old content that is longer");
    let factory = tree.factory();

    folder(&factory, "/uploads")
        .create_new("upload.bin", &b"new"[..], None, None)
        .unwrap();
    assert_eq!(tree.read("uploads/upload.bin"), b"new");
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("stream broke"))
    }
}

#[test]
fn test_create_new_stream_failure_is_io_fault() {
    let tree = TestTree::new();
    tree.mkdir("uploads");
    let factory = tree.factory();

    let err = folder(&factory, "/uploads")
        .create_new("broken.bin", FailingReader, None, None)
        .unwrap_err();
    assert!(matches!(err, FolderDavError::Io { .. }));
    assert!(err.to_string().contains("stream broke"));
}

#[test]
fn test_create_new_in_missing_folder_is_io_fault() {
    let tree = TestTree::new();
    tree.mkdir("uploads");
    let factory = tree.factory();
    let uploads = folder(&factory, "/uploads");
    std::fs::remove_dir(tree.path("uploads")).unwrap();

    let err = uploads
        .create_new("file.txt", &b"x"[..], None, None)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn test_delete_empty_folder() {
    let tree = TestTree::new();
    tree.mkdir("trash");
    let factory = tree.factory();

    folder(&factory, "/trash").delete().unwrap();
    assert!(!tree.exists("trash"));
}

#[test]
fn test_delete_non_empty_folder_fails() {
    let tree = TestTree::new();
    tree.write("full/keep.txt", b"keep");
    let factory = tree.factory();

    let err = folder(&factory, "/full").delete().unwrap_err();
    assert!(matches!(err, FolderDavError::Io { .. }));
    assert_eq!(err.category(), ErrorCategory::NotEmpty);
    assert!(tree.exists("full/keep.txt"));
}

#[test]
fn test_delete_missing_folder_fails() {
    let tree = TestTree::new();
    tree.mkdir("once");
    let factory = tree.factory();
    let once = folder(&factory, "/once");

    once.delete().unwrap();
    assert_eq!(once.delete().unwrap_err().category(), ErrorCategory::NotFound);
}

// ============================================================================
// Metadata
// ============================================================================

#[test]
fn test_folder_metadata() {
    let tree = TestTree::new();
    tree.mkdir("meta");
    let factory = tree.factory();
    let meta = folder(&factory, "/meta");
    let path = tree.path("meta").display().to_string();

    assert_eq!(meta.unique_id(), path);
    assert_eq!(meta.name(), path);
    assert_eq!(meta.realm(), path);
    assert!(meta.create_date().is_none());
    assert!(meta.content_type(Some("text/html")).is_none());
    assert!(meta.content_length().is_none());
    assert!(meta.max_age_seconds(None).is_none());
    assert!(meta.check_redirect(&common::get("/meta")).is_none());

    let expected = std::fs::metadata(tree.path("meta")).unwrap().modified().unwrap();
    assert_eq!(meta.modified_date(), expected);
}
