use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tinker_crypto::DigestAlgorithm;
use tinker_ops::{ActiveSetPolicy, MutationConfig};
use tinker_store::{OutputStyle, Source};

/// Run configuration.
///
/// Read from the `[tinker]` table of a task plan; command-line flags
/// override individual fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TinkerConfig {
    /// Input genesis: a local path or an `http(s)://` URL.
    pub input: String,
    /// Expected checksum of the (decompressed) input, hex encoded.
    pub shasum: Option<String>,
    pub output: PathBuf,
    /// Where to put the scratch copy. A temporary file when unset.
    pub preprocessing: Option<PathBuf>,
    /// Leave the scratch copy behind after the run.
    pub keep_preprocessing: bool,
    pub output_style: OutputStyle,
    pub digest: DigestAlgorithm,
    pub active_set: ActiveSetPolicy,
    pub bonded_pool_address: Option<String>,
    pub not_bonded_pool_address: Option<String>,
}

impl Default for TinkerConfig {
    fn default() -> Self {
        Self {
            input: "genesis.json".into(),
            shasum: None,
            output: PathBuf::from("tinkered_genesis.json"),
            preprocessing: None,
            keep_preprocessing: false,
            output_style: OutputStyle::default(),
            digest: DigestAlgorithm::default(),
            active_set: ActiveSetPolicy::default(),
            bonded_pool_address: None,
            not_bonded_pool_address: None,
        }
    }
}

impl TinkerConfig {
    pub fn source(&self) -> Source {
        Source::parse(&self.input)
    }

    /// The subset of settings the mutation operations need.
    pub fn mutation_config(&self) -> MutationConfig {
        MutationConfig {
            active_set: self.active_set.clone(),
            bonded_pool_address: self.bonded_pool_address.clone(),
            not_bonded_pool_address: self.not_bonded_pool_address.clone(),
        }
    }
}
