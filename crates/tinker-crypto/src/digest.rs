use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Hash function used for genesis checksums.
///
/// SHA-256 is the default because it is what chain operators publish next to
/// genesis archives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Digest a complete byte slice.
    pub fn digest(&self, data: &[u8]) -> ContentDigest {
        let bytes: [u8; 32] = match self {
            Self::Sha256 => Sha256::digest(data).into(),
            Self::Blake3 => *blake3::hash(data).as_bytes(),
        };
        ContentDigest {
            algorithm: *self,
            bytes,
        }
    }

    /// Digest everything readable from `reader`.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> std::io::Result<ContentDigest> {
        let mut buf = [0u8; 64 * 1024];
        let bytes: [u8; 32] = match self {
            Self::Sha256 => {
                let mut hasher = Sha256::new();
                loop {
                    let n = reader.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                hasher.finalize().into()
            }
            Self::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                loop {
                    let n = reader.read(&mut buf)?;
                    if n == 0 {
                        break;
                    }
                    hasher.update(&buf[..n]);
                }
                *hasher.finalize().as_bytes()
            }
        };
        Ok(ContentDigest {
            algorithm: *self,
            bytes,
        })
    }

    /// Check `data` against an expected hex digest (case-insensitive).
    pub fn verify(&self, data: &[u8], expected_hex: &str) -> Result<ContentDigest, DigestError> {
        let computed = self.digest(data);
        if computed.to_hex().eq_ignore_ascii_case(expected_hex.trim()) {
            Ok(computed)
        } else {
            Err(DigestError::Mismatch {
                algorithm: *self,
                expected: expected_hex.trim().to_string(),
                computed: computed.to_hex(),
            })
        }
    }

    /// Label used when reporting a checksum, e.g. `SHA256SUM`.
    pub fn sum_label(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA256SUM",
            Self::Blake3 => "BLAKE3SUM",
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

/// A 32-byte digest tagged with the algorithm that produced it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    algorithm: DigestAlgorithm,
    bytes: [u8; 32],
}

impl ContentDigest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Lower-case hex, as printed by `sha256sum`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }
}

impl fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentDigest({}:{})", self.algorithm, self.to_hex())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors from digest verification.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("{algorithm} digest mismatch: expected {expected}, computed {computed}")]
    Mismatch {
        algorithm: DigestAlgorithm,
        expected: String,
        computed: String,
    },
}
