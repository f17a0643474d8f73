//! Serve a local directory tree as WebDAV resources.
//!
//! This crate is the resource layer between a WebDAV protocol handler and
//! the filesystem. It maps every path below a configured root onto either a
//! [`FolderResource`] (a directory, exposed as a collection) or a
//! [`FileResource`] (anything else, exposed as a leaf), and implements the
//! collection operations on top of plain `std::fs` calls.
//!
//! # How It Works
//!
//! 1. A [`ResourceFactory`] is built once for the process with the root
//!    directory and an optional [`SecurityManager`]
//! 2. The protocol layer resolves each request path with
//!    [`ResourceFactory::resource`]
//! 3. It checks access with [`DavResource::authorise`] and then calls the
//!    operation on the returned resource
//!
//! Resources are cheap views that borrow the factory. Nothing is cached:
//! every listing re-reads the directory.
//!
//! # Example
//!
//! ```no_run
//! use folderdav::{CollectionResource, ResourceFactory, Resource};
//!
//! let factory = ResourceFactory::new("/srv/share")?;
//! if let Some(Resource::Folder(folder)) = factory.resource(None, "/docs")? {
//!     for child in folder.children()? {
//!         println!("{}", child.path().display());
//!     }
//!     folder.create_collection("drafts");
//! }
//! # Ok::<(), folderdav::FolderDavError>(())
//! ```
//!
//! # Security
//!
//! Without a security manager the factory runs in open mode: any
//! credentials authenticate and every request is authorized. Request paths
//! containing `.` or `..` segments are refused, and links in rendered
//! listings are always relative to the root.

mod config;
mod error;
mod factory;
mod file;
mod folder;
pub mod paths;
mod request;
mod resource;
mod security;
pub mod tree;

// Public exports
pub use config::{DEFAULT_REALM, FolderDavConfig};
pub use error::{ErrorCategory, FolderDavError, FolderDavResult, OpContext};
pub use factory::ResourceFactory;
pub use file::FileResource;
pub use folder::FolderResource;
pub use request::{Auth, Method, Principal, Request, UnknownMethod};
pub use resource::{CollectionResource, DavResource, Resource};
pub use security::{SecurityManager, SimpleSecurityManager};
