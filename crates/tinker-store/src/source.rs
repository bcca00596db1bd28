use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tinker_crypto::DigestAlgorithm;
use tracing::{debug, info};

use crate::archive::Compression;
use crate::error::StoreResult;

/// Where the input genesis comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Interpret a user-supplied location. `http://` and `https://` prefixes
    /// select a URL; everything else is a local path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::Path(PathBuf::from(location))
        }
    }

    pub fn compression(&self) -> Compression {
        match self {
            Self::Path(p) => Compression::detect(&p.to_string_lossy()),
            Self::Url(u) => Compression::detect(u),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Url(u) => f.write_str(u),
        }
    }
}

/// Loading boundary for genesis sources.
///
/// Implementations only fetch raw bytes; [`SourceLoader::load`] handles
/// decompression and integrity checks so every loader behaves the same.
pub trait SourceLoader {
    /// Fetch the raw (possibly compressed) bytes of `source`.
    fn fetch(&self, source: &Source) -> StoreResult<Vec<u8>>;

    /// Fetch, unpack, and verify a source.
    ///
    /// When `expected_checksum` is given it is checked against the
    /// decompressed bytes; a mismatch is an error and nothing is returned.
    fn load(
        &self,
        source: &Source,
        expected_checksum: Option<&str>,
        algorithm: DigestAlgorithm,
    ) -> StoreResult<Vec<u8>> {
        let raw = self.fetch(source)?;
        let compression = source.compression();
        let bytes = compression.unpack(raw, &source.to_string())?;
        debug!(%source, ?compression, len = bytes.len(), "genesis source fetched");
        if let Some(expected) = expected_checksum {
            let digest = algorithm.verify(&bytes, expected)?;
            info!(%source, %digest, "{} verified", algorithm.sum_label());
        }
        Ok(bytes)
    }
}

/// Filesystem and HTTP(S) loader.
#[derive(Clone, Debug)]
pub struct DefaultLoader {
    timeout: Duration,
}

impl DefaultLoader {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

    pub fn new() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for DefaultLoader {
    fn fetch(&self, source: &Source) -> StoreResult<Vec<u8>> {
        match source {
            Source::Path(path) => Ok(std::fs::read(path)?),
            Source::Url(url) => {
                info!(%url, "downloading genesis");
                let client = reqwest::blocking::Client::builder()
                    .timeout(self.timeout)
                    .build()?;
                let response = client.get(url).send()?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            }
        }
    }
}
