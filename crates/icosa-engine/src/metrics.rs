//! Per-run timing for programs.
//!
//! [`RunMetrics`] records how long one [`Program::run`](crate::Program::run)
//! took, split by statement, for profiling and benchmarks.

/// Timing collected during a single program run.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Wall-clock time for the whole run, including the up-front checks.
    pub total_us: u64,
    /// Time spent checking offsets and bindings before the first statement.
    pub validation_us: u64,
    /// Per-statement execution times: `(operator name, microseconds)`, in
    /// program order.
    pub statement_us: Vec<(String, u64)>,
}

impl RunMetrics {
    /// Number of statements that ran.
    pub fn statements_run(&self) -> usize {
        self.statement_us.len()
    }

    /// Sum of the per-statement times.
    pub fn statements_total_us(&self) -> u64 {
        self.statement_us.iter().map(|(_, us)| us).sum()
    }

    /// The slowest statement, if any ran.
    pub fn slowest(&self) -> Option<(&str, u64)> {
        self.statement_us
            .iter()
            .max_by_key(|(_, us)| *us)
            .map(|(name, us)| (name.as_str(), *us))
    }
}
