/// Numbered progress log for a single tinkering run.
///
/// Every mutation announces itself through [`StepLog::log`], which bumps the
/// counter and emits an `info` event carrying the step number. The counter is
/// owned by the run, so separate runs never share numbering.
#[derive(Debug, Default)]
pub struct StepLog {
    count: u64,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step and return its number.
    pub fn log(&mut self, message: impl AsRef<str>) -> u64 {
        self.count += 1;
        tracing::info!(step = self.count, "{}", message.as_ref());
        self.count
    }

    /// Number of steps logged so far.
    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_numbered_from_one() {
        let mut log = StepLog::new();
        assert_eq!(log.log("first"), 1);
        assert_eq!(log.log(String::from("second")), 2);
        assert_eq!(log.count(), 2);
    }

    #[test]
    fn fresh_logs_do_not_share_counters() {
        let mut a = StepLog::new();
        a.log("x");
        let b = StepLog::new();
        assert_eq!(b.count(), 0);
    }
}
