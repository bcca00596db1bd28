use std::collections::VecDeque;

use tracing::error;

use crate::error::{TinkerError, TinkerResult};
use crate::task::{Phase, Task};

/// A task tagged with its submission sequence number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueuedTask {
    pub seq: u64,
    pub task: Task,
}

/// Two-bucket task queue.
///
/// Tasks are filed into the byte or json bucket on submission. Execution
/// drains the byte bucket first; the phase flips to `Json` on the first json
/// pop and stays there until [`TaskQueue::clear`].
#[derive(Debug, Default)]
pub struct TaskQueue {
    bytes: VecDeque<QueuedTask>,
    json: VecDeque<QueuedTask>,
    submitted: Vec<QueuedTask>,
    phase: Phase,
    next_seq: u64,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a task and return its sequence number.
    pub fn add(&mut self, task: Task) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        let queued = QueuedTask { seq, task };
        self.submitted.push(queued.clone());
        match queued.task.phase() {
            Phase::Bytes => self.bytes.push_back(queued),
            Phase::Json => self.json.push_back(queued),
        }
        seq
    }

    /// Pending tasks in execution order.
    pub fn tasks(&self) -> Vec<&Task> {
        self.bytes
            .iter()
            .chain(self.json.iter())
            .map(|q| &q.task)
            .collect()
    }

    /// Every task in submission order.
    pub fn user_tasks(&self) -> Vec<&Task> {
        self.submitted.iter().map(|q| &q.task).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.json.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bytes.len() + self.json.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pop the next task to execute.
    pub fn next(&mut self) -> Option<Task> {
        if let Some(q) = self.bytes.pop_front() {
            return Some(q.task);
        }
        let q = self.json.pop_front()?;
        self.phase = Phase::Json;
        Some(q.task)
    }

    /// Check that execution order equals submission order.
    pub fn validate(&self) -> TinkerResult<()> {
        let in_order = self
            .bytes
            .iter()
            .chain(self.json.iter())
            .map(|q| q.seq)
            .eq(self.submitted.iter().map(|q| q.seq));
        if in_order {
            return Ok(());
        }
        let expected: Vec<_> = self.tasks().iter().map(|t| t.name()).collect();
        let submitted: Vec<_> = self.user_tasks().iter().map(|t| t.name()).collect();
        error!(
            ?expected,
            ?submitted,
            "invalid sequence: replace_validator and replace_delegator must come before all other operations"
        );
        Err(TinkerError::Sequencing {
            expected,
            submitted,
        })
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.json.clear();
        self.submitted.clear();
        self.phase = Phase::Bytes;
    }
}
