//! Genesis document store for Genesis Tinker.
//!
//! This crate owns everything between raw bytes on disk (or on the network)
//! and the in-memory JSON tree the mutation operations edit:
//!
//! - [`GenesisDocument`] -- the parsed genesis tree with path-scoped
//!   accessors (`app_state`, `gov`, the top-level validator set, ...).
//! - [`OutputStyle`] -- byte-exact serialization styles for the final file.
//! - [`SourceLoader`] -- the loading boundary: local files or `http(s)` URLs,
//!   transparently unpacking `.gz`, `.tar.gz` and `.zip` archives and
//!   verifying an expected checksum before any bytes are handed on.
//! - [`write_atomic`] -- persistence that never leaves a partial file.
//!
//! # Design Rules
//!
//! 1. Object key order and number text are preserved exactly from input to
//!    output; a genesis file is hashed, so re-ordering keys is a change.
//! 2. A missing path is an error carrying the dotted path, never a silent
//!    default.
//! 3. Integrity is checked on the decompressed bytes, before parsing.

pub mod archive;
pub mod document;
pub mod error;
pub mod format;
pub mod persist;
pub mod source;

pub use archive::{Compression, GENESIS_MEMBER};
pub use document::{paths, GenesisDocument};
pub use error::{StoreError, StoreResult};
pub use format::{to_vec_styled, OutputStyle};
pub use persist::write_atomic;
pub use source::{DefaultLoader, Source, SourceLoader};
