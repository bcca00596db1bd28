use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempPath;
use tracing::debug;

use crate::error::RewriteResult;

/// The formatted working copy of the genesis file.
///
/// The copy is re-serialized as two-space pretty JSON so every scalar sits on
/// its own line, with key order and number text preserved. Unless `keep` is
/// set the file is removed when the `ScratchFile` is dropped.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    temp: Option<TempPath>,
    keep: bool,
}

impl ScratchFile {
    /// Create a scratch copy of `source`.
    ///
    /// With `at = None` the copy is a fresh temporary file; otherwise it is
    /// written to (and overwrites) the given path.
    pub fn create(source: &[u8], at: Option<&Path>, keep: bool) -> RewriteResult<Self> {
        let formatted = format_scratch(&serde_json::from_slice(source)?)?;
        let (path, temp) = match at {
            Some(path) => {
                fs::write(path, &formatted)?;
                (path.to_path_buf(), None)
            }
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("genesis-tinker-")
                    .suffix(".json")
                    .tempfile()?
                    .into_temp_path();
                fs::write(&temp, &formatted)?;
                (temp.to_path_buf(), Some(temp))
            }
        };
        debug!(path = %path.display(), len = formatted.len(), "scratch file created");
        Ok(Self { path, temp, keep })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> RewriteResult<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }

    pub fn read_string(&self) -> RewriteResult<String> {
        Ok(String::from_utf8(self.read()?)?)
    }

    pub fn write(&mut self, bytes: &[u8]) -> RewriteResult<()> {
        fs::write(&self.path, bytes)?;
        Ok(())
    }

    /// Parse the current contents.
    pub fn parse(&self) -> RewriteResult<Value> {
        Ok(serde_json::from_slice(&self.read()?)?)
    }

    /// Replace the contents with `value` in scratch formatting.
    pub fn store(&mut self, value: &Value) -> RewriteResult<()> {
        let formatted = format_scratch(value)?;
        self.write(&formatted)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match (self.keep, self.temp.take()) {
            (true, Some(temp)) => {
                // Detach so the temporary survives.
                if let Ok(path) = temp.keep() {
                    debug!(path = %path.display(), "scratch file kept");
                }
            }
            (true, None) => {}
            (false, Some(temp)) => drop(temp),
            (false, None) => {
                let _ = fs::remove_file(&self.path);
            }
        }
    }
}

fn format_scratch(value: &Value) -> RewriteResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}
