//! Task queue and run loop for Genesis Tinker.
//!
//! A [`GenesisTinker`] collects [`Task`]s and runs them in two phases:
//!
//! 1. **bytes** -- identity replacements ([`ByteTask`]) run as literal
//!    substitutions on a formatted scratch copy of the input;
//! 2. **json** -- every other operation ([`JsonTask`]) runs on the parsed
//!    document, loaded once from the scratch copy (or the input when there
//!    were no byte tasks).
//!
//! Byte tasks must be submitted before json tasks. A run whose submission
//! order differs from its execution order fails with
//! [`TinkerError::Sequencing`] before any I/O.
//!
//! Runs are usually described by a TOML [`Plan`]:
//!
//! ```toml
//! [tinker]
//! input = "genesis.json"
//! output = "tinkered_genesis.json"
//!
//! [validators.old]
//! address = "19CEF0E87C6FBDED2A2A486069C8F4DD51BD3981"
//!
//! [validators.new]
//! address = "0000000000000000000000000000000000000ABC"
//!
//! [[task]]
//! op = "replace_validator"
//! old = "old"
//! new = "new"
//!
//! [[task]]
//! op = "set_chain_id"
//! chain_id = "local-testnet"
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod plan;
pub mod queue;
pub mod task;
pub mod tinker;

pub use config::TinkerConfig;
pub use context::RunContext;
pub use error::{TinkerError, TinkerResult};
pub use plan::{Plan, TaskSpec};
pub use queue::{QueuedTask, TaskQueue};
pub use task::{ByteTask, JsonTask, Phase, Task};
pub use tinker::{GenesisTinker, RunReport};
