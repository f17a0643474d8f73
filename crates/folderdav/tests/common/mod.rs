//! Shared fixtures for integration tests.

#![allow(dead_code)] // Not every test binary uses every helper

use folderdav::{
    Auth, CollectionResource, DavResource, FolderResource, Method, Principal, Request, Resource,
    ResourceFactory,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

/// Install a test subscriber once. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A temporary directory to serve, with helpers for populating it.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Canonical root, matching what the factory stores.
    pub fn root(&self) -> PathBuf {
        fs::canonicalize(self.dir.path()).expect("canonicalize temp dir")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative.trim_start_matches('/'))
    }

    pub fn mkdir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).expect("create dir");
        path
    }

    pub fn write(&self, relative: &str, content: &[u8]) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, content).expect("write file");
        path
    }

    pub fn read(&self, relative: &str) -> Vec<u8> {
        fs::read(self.path(relative)).expect("read file")
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }

    pub fn factory(&self) -> ResourceFactory {
        ResourceFactory::new(self.dir.path()).expect("create factory")
    }
}

/// Resolve `path` and expect a folder.
pub fn folder<'f>(factory: &'f ResourceFactory, path: &str) -> FolderResource<'f> {
    match factory.resource(None, path).expect("resolve path") {
        Some(Resource::Folder(folder)) => folder,
        Some(Resource::File(_)) => panic!("{path} is a file"),
        None => panic!("{path} does not exist"),
    }
}

pub fn names(children: &[Resource<'_>]) -> Vec<String> {
    let mut names: Vec<String> = children
        .iter()
        .map(|c| {
            c.path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();
    names.sort();
    names
}

/// Render a folder's index page to a string.
pub fn render_index(folder: &FolderResource<'_>) -> String {
    let mut out = Vec::new();
    folder
        .send_content(&mut out, &Default::default())
        .expect("render index");
    String::from_utf8(out).expect("index is utf-8")
}

pub fn get(path: &str) -> Request {
    Request::new(Method::Get, path)
}

/// A collection from outside this factory, identified only by its name.
pub struct NamedCollection {
    pub name: String,
}

impl NamedCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DavResource for NamedCollection {
    fn unique_id(&self) -> String {
        format!("foreign:{}", self.name)
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn realm(&self) -> String {
        "foreign".to_string()
    }

    fn modified_date(&self) -> SystemTime {
        SystemTime::UNIX_EPOCH
    }

    fn create_date(&self) -> Option<SystemTime> {
        None
    }

    fn content_type(&self, _accepts: Option<&str>) -> Option<String> {
        None
    }

    fn content_length(&self) -> Option<u64> {
        None
    }

    fn max_age_seconds(&self, _auth: Option<&Auth>) -> Option<u64> {
        None
    }

    fn authenticate(&self, user: &str, _password: &str) -> Option<Principal> {
        Some(Principal::new(user))
    }

    fn authorise(&self, _request: &Request, _method: Method, _auth: Option<&Auth>) -> bool {
        true
    }

    fn check_redirect(&self, _request: &Request) -> Option<String> {
        None
    }

    fn is_collection(&self) -> bool {
        true
    }
}

impl CollectionResource<'static> for NamedCollection {
    fn child(&self, _name: &str) -> Option<Resource<'static>> {
        None
    }

    fn children(&self) -> folderdav::FolderDavResult<Vec<Resource<'static>>> {
        Ok(Vec::new())
    }
}

pub fn assert_is_dir(path: &Path) {
    assert!(path.is_dir(), "expected directory at {}", path.display());
}
