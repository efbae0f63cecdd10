//! Row iterator.
//!
//! The [`Executor`] runs a row operation over every row of a batch: it
//! prepares each input adapter once, short-circuits rows where any input is
//! null, invokes the operation for the rest and writes its outcome through the
//! result adapter. Row errors are handled by the executor's [`ErrorPolicy`].

mod config;
mod policy;
mod result;

use tracing::{debug, debug_span, trace};

use crate::adapter::{ReadAdapter, RowWriter, WriteAdapter};
use crate::error::{Result, VexecError};
use crate::vector::Vector;

pub use config::{ExecutorConfig, DEFAULT_BATCH_SIZE};
pub use policy::{CastMode, ErrorPolicy, RowControl};
pub use result::{RowError, RowResult};

/// Row counters of the last batch an executor ran.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Rows the loop reached, including the row that aborted it.
    pub rows_visited: usize,
    /// Rows written as null, by input short-circuit or by the operation.
    pub null_rows: usize,
    /// Rows whose operation returned a row error.
    pub error_rows: usize,
}

/// The first row error of an aborted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub row: usize,
    pub message: String,
}

/// Runs row operations over batches under one error policy.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    policy: ErrorPolicy,
    stats: ExecutionStats,
    failure: Option<BatchFailure>,
}

impl Executor {
    #[must_use]
    pub fn new(policy: ErrorPolicy) -> Self {
        Executor {
            policy,
            stats: ExecutionStats::default(),
            failure: None,
        }
    }

    #[must_use]
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// Counters of the last batch.
    #[must_use]
    pub fn stats(&self) -> ExecutionStats {
        self.stats
    }

    /// Returns false when the last batch was aborted by a row error.
    #[must_use]
    pub fn success(&self) -> bool {
        self.failure.is_none()
    }

    #[must_use]
    pub fn failure(&self) -> Option<&BatchFailure> {
        self.failure.as_ref()
    }

    /// Applies `op` to the first `count` rows of `input`, writing `output`.
    ///
    /// # Errors
    ///
    /// Returns a contract violation if either vector does not match its
    /// adapter or holds fewer than `count` rows; nothing is written in that
    /// case. Returns `RowFailed` with the first row error's message when the
    /// policy aborts the batch; rows before it stay written.
    pub fn execute_unary<'a, A, R, F>(
        &mut self,
        input: &'a Vector,
        output: &mut Vector,
        count: usize,
        mut op: F,
    ) -> Result<()>
    where
        A: ReadAdapter<'a>,
        R: for<'w> WriteAdapter<'w>,
        F: FnMut(A::Arg) -> RowResult<R::Value>,
    {
        self.reset();
        let state = A::prepare(input, count)?;
        self.run::<R, _>("unary", output, count, |row| {
            if !A::is_valid(&state, row) {
                return None;
            }
            Some(op(A::read(&state, row)))
        })
    }

    /// Applies `op` to row pairs of `left` and `right`, writing `output`.
    ///
    /// A row is null without invoking `op` if either input is null there.
    ///
    /// # Errors
    ///
    /// Same as [`Executor::execute_unary`].
    pub fn execute_binary<'a, A, B, R, F>(
        &mut self,
        left: &'a Vector,
        right: &'a Vector,
        output: &mut Vector,
        count: usize,
        mut op: F,
    ) -> Result<()>
    where
        A: ReadAdapter<'a>,
        B: ReadAdapter<'a>,
        R: for<'w> WriteAdapter<'w>,
        F: FnMut(A::Arg, B::Arg) -> RowResult<R::Value>,
    {
        self.reset();
        let left_state = A::prepare(left, count)?;
        let right_state = B::prepare(right, count)?;
        self.run::<R, _>("binary", output, count, |row| {
            if !A::is_valid(&left_state, row) || !B::is_valid(&right_state, row) {
                return None;
            }
            Some(op(A::read(&left_state, row), B::read(&right_state, row)))
        })
    }

    fn reset(&mut self) {
        self.stats = ExecutionStats::default();
        self.failure = None;
    }

    /// The row loop. `row_fn` returns `None` when an input is null at the row.
    fn run<R, F>(
        &mut self,
        shape: &'static str,
        output: &mut Vector,
        count: usize,
        mut row_fn: F,
    ) -> Result<()>
    where
        R: for<'w> WriteAdapter<'w>,
        F: FnMut(usize) -> Option<RowResult<R::Value>>,
    {
        let policy = self.policy;
        let _span = debug_span!("execute_batch", shape, rows = count, policy = policy.name()).entered();

        let mut annotations = Vec::new();
        {
            let mut writer = R::prepare_write(output, count)?;
            for row in 0..count {
                self.stats.rows_visited += 1;
                match row_fn(row) {
                    None | Some(Ok(None)) => {
                        writer.set_null(row);
                        self.stats.null_rows += 1;
                    }
                    Some(Ok(Some(value))) => writer.write(row, value),
                    Some(Err(error)) => {
                        self.stats.error_rows += 1;
                        trace!(row, error = %error, "row error");
                        let message = error.into_message();
                        if policy.annotates_rows() {
                            annotations.push((row, message.clone()));
                        }
                        match policy.on_row_error() {
                            RowControl::Continue => writer.set_null(row),
                            RowControl::Abort => {
                                debug!(row, "batch aborted");
                                self.failure = Some(BatchFailure { row, message });
                                break;
                            }
                        }
                    }
                }
            }
        }
        // Annotations describe this batch only.
        output.clear_row_errors();
        for (row, message) in annotations {
            output.record_row_error(row, message);
        }

        debug!(
            rows_visited = self.stats.rows_visited,
            null_rows = self.stats.null_rows,
            error_rows = self.stats.error_rows,
            success = self.failure.is_none(),
            "execute_batch complete"
        );

        match &self.failure {
            Some(failure) => Err(VexecError::RowFailed {
                row: failure.row,
                message: failure.message.clone(),
            }),
            None => Ok(()),
        }
    }
}
