//! Content digests for Genesis Tinker.
//!
//! Genesis files are distributed together with a checksum, and a tinkered
//! genesis is only useful if every node operator can confirm they hold the
//! same bytes. This crate computes those checksums and verifies downloads
//! against them.
//!
//! All crypto operations wrap established libraries (`sha2`, `blake3`).

pub mod digest;

pub use digest::{ContentDigest, DigestAlgorithm, DigestError};
