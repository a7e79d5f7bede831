//! The versioned blob backend.
//!
//! This module is the only place that touches storage. It exposes a narrow
//! contract - read a document and its content-hash token, write conditioned
//! on that token, list a namespace - and two implementations of it:
//!
//! - [`GitStore`]: a local Git repository manipulated through `git2`. Every
//!   mutation is a commit on `main`; the token is the blob OID.
//! - [`MemoryStore`]: a map-backed fake for tests.
//!
//! The layers above never see `git2` directly.

mod error;
mod git;
mod memory;
mod store;
mod tree;
mod types;

pub use error::{BackendError, BackendResult};
pub use git::{CommitSignature, GitStore};
pub use memory::MemoryStore;
pub use store::{Document, VersionedStore};
pub use types::{ContentHash, DocPath, Entry, EntryKind, InvalidPathError};
