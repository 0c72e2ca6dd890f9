//! Staging buffer for one operator call.
//!
//! An operator writes its results for the active domain into a
//! [`StagingBuffer`] instead of the output field. The invocation commits the
//! buffer after the operator returns, so an operator may read the field it
//! writes. In debug builds the buffer tracks which points were written and
//! logs a warning on drop if coverage is incomplete.

use icosa_core::{Element, EvalError};
#[cfg(debug_assertions)]
use tracing::warn;

/// Results for the active domain, laid out `[(h - start) * levels + k]`.
///
/// The buffer is seeded with the output's current values, so a point the
/// operator skips keeps its value.
pub struct StagingBuffer<'a, T: Element> {
    data: &'a mut [T],
    start: usize,
    levels: usize,
    #[cfg(debug_assertions)]
    written: Vec<bool>,
    #[cfg(debug_assertions)]
    operator: String,
}

impl<'a, T: Element> StagingBuffer<'a, T> {
    /// Wrap `data` for horizontal entities starting at `start`, each with
    /// `levels` vertical levels.
    pub fn new(
        data: &'a mut [T],
        start: usize,
        levels: usize,
        #[cfg_attr(not(debug_assertions), allow(unused_variables))] operator: &str,
    ) -> Self {
        Self {
            #[cfg(debug_assertions)]
            written: vec![false; data.len()],
            #[cfg(debug_assertions)]
            operator: operator.to_string(),
            data,
            start,
            levels,
        }
    }

    /// Write the value at entity `h` (absolute index) and level `k`.
    ///
    /// A point outside the active domain is an `ExecutionFailed` error and
    /// nothing is written.
    pub fn write_at(&mut self, h: usize, k: usize, value: T) -> Result<(), EvalError> {
        let i = self.index(h, k).ok_or_else(|| EvalError::ExecutionFailed {
            reason: format!(
                "write to entity {h}, level {k} outside the domain [{}, {}) x {} levels",
                self.start,
                self.end(),
                self.levels
            ),
        })?;
        self.data[i] = value;
        #[cfg(debug_assertions)]
        {
            self.written[i] = true;
        }
        Ok(())
    }

    fn index(&self, h: usize, k: usize) -> Option<usize> {
        if h < self.start || h >= self.end() || k >= self.levels {
            return None;
        }
        Some((h - self.start) * self.levels + k)
    }

    fn end(&self) -> usize {
        match self.levels {
            0 => self.start,
            n => self.start + self.data.len() / n,
        }
    }

    /// The whole buffer for bulk writes.
    ///
    /// Marks every point as written.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        #[cfg(debug_assertions)]
        {
            self.written.fill(true);
        }
        self.data
    }

    /// First horizontal entity of the domain.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Levels per entity.
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the domain is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fraction of points written (always 1.0 in release builds).
    pub fn coverage(&self) -> f64 {
        #[cfg(debug_assertions)]
        {
            if self.data.is_empty() {
                return 1.0;
            }
            let count = self.written.iter().filter(|&&b| b).count();
            count as f64 / self.data.len() as f64
        }
        #[cfg(not(debug_assertions))]
        {
            1.0
        }
    }
}

#[cfg(debug_assertions)]
impl<T: Element> Drop for StagingBuffer<'_, T> {
    fn drop(&mut self) {
        let total = self.written.len();
        let count = self.written.iter().filter(|&&b| b).count();
        if count < total {
            warn!(
                operator = %self.operator,
                written = count,
                total,
                "operator left part of its domain unwritten"
            );
        }
    }
}
