use tinker_rewrite::ScratchFile;
use tinker_store::GenesisDocument;
use tinker_types::StepLog;

use crate::task::Phase;

/// State owned by a single run.
///
/// Created fresh for every [`crate::GenesisTinker::run_tasks`] call, so step
/// numbering and the scratch file never leak between runs. Dropping the
/// context removes the scratch file unless it is configured to be kept.
#[derive(Debug, Default)]
pub struct RunContext {
    pub steps: StepLog,
    pub phase: Phase,
    pub scratch: Option<ScratchFile>,
    pub document: Option<GenesisDocument>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }
}
