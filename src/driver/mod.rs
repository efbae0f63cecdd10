//! In-process host driver.
//!
//! Runs bound entry points over Arrow arrays of any length. Input is cut into
//! windows of `batch_size` rows; each window becomes one invocation with its
//! own chunk and output vector, so windows can run in parallel without
//! sharing mutable state.

use std::sync::Arc;

use arrow::array::{new_empty_array, Array, ArrayRef};
use arrow::compute::concat;
use arrow::error::ArrowError;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{Result, VexecError};
use crate::executor::ExecutorConfig;
use crate::function::{CastFunction, CastInfo, ScalarFunction};
use crate::types::LogicalType;
use crate::vector::{DataChunk, RowErrorAnnotation, Vector};

/// A window of input rows handled by one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    offset: usize,
    length: usize,
}

/// Output of one window.
struct WindowResult {
    array: ArrayRef,
    row_errors: Vec<RowErrorAnnotation>,
}

/// Drives scalar functions and casts over Arrow data.
#[derive(Debug, Clone)]
pub struct ArrowDriver {
    config: ExecutorConfig,
    /// Worker pool shared by every call; `None` when running on one partition.
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl ArrowDriver {
    /// Creates a driver.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration does not validate or
    /// the worker pool cannot be started.
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        config.validate()?;
        let pool = if config.partitions > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.partitions)
                .build()
                .map_err(|e| VexecError::InvalidConfig(e.to_string()))?;
            Some(Arc::new(pool))
        } else {
            None
        };
        Ok(ArrowDriver { config, pool })
    }

    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Runs `function` over equally long argument arrays.
    ///
    /// Batch failures report their row from the start of the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the argument count or lengths do not match the
    /// function, an argument type has no logical counterpart, or a window
    /// fails. The first failing window's error is returned.
    pub fn run_scalar(&self, function: &dyn ScalarFunction, args: &[ArrayRef]) -> Result<ArrayRef> {
        let expected = function.arguments().len();
        if args.len() != expected {
            return Err(VexecError::ArgumentCountMismatch {
                expected,
                actual: args.len(),
            });
        }
        let len = args.first().map_or(0, |array| array.len());
        if let Some(array) = args.iter().find(|array| array.len() != len) {
            return Err(ArrowError::InvalidArgumentError(format!(
                "argument arrays differ in length: {} and {}",
                len,
                array.len()
            ))
            .into());
        }

        let return_type = function.return_type();
        let entry = function.function();
        let results = self.run_windows(len, |window| {
            let arrays: Vec<ArrayRef> = args
                .iter()
                .map(|array| array.slice(window.offset, window.length))
                .collect();
            let chunk = DataChunk::from_arrays(&arrays, window.length)?;
            let mut output = Vector::new(return_type.clone(), window.length);
            entry(&chunk, &mut output).map_err(|e| rebase(e, window.offset))?;
            Ok(WindowResult {
                array: output.to_arrow(window.length)?,
                row_errors: Vec::new(),
            })
        })?;

        let (array, _) = assemble(&return_type, results)?;
        Ok(array)
    }

    /// Runs `function` over `input` in the configured cast mode.
    ///
    /// Returns the converted array plus the row error annotations, with rows
    /// numbered from the start of `input`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input type has no logical counterpart or a
    /// window fails. In try mode row errors do not fail a window.
    pub fn run_cast(
        &self,
        function: &dyn CastFunction,
        input: &ArrayRef,
    ) -> Result<(ArrayRef, Vec<RowErrorAnnotation>)> {
        let info = CastInfo::new(self.config.cast_mode);
        let target_type = function.target_type();
        let entry = function.function();
        let results = self.run_windows(input.len(), |window| {
            let source = Vector::from_arrow(input.slice(window.offset, window.length).as_ref())?;
            let mut output = Vector::new(target_type.clone(), window.length);
            entry(&info, window.length, &source, &mut output)
                .map_err(|e| rebase(e, window.offset))?;
            let row_errors = output
                .row_errors()
                .iter()
                .map(|annotation| RowErrorAnnotation {
                    row: annotation.row + window.offset,
                    message: annotation.message.clone(),
                })
                .collect();
            Ok(WindowResult {
                array: output.to_arrow(window.length)?,
                row_errors,
            })
        })?;

        assemble(&target_type, results)
    }

    fn windows(&self, len: usize) -> Vec<Window> {
        (0..len)
            .step_by(self.config.batch_size)
            .map(|offset| Window {
                offset,
                length: self.config.batch_size.min(len - offset),
            })
            .collect()
    }

    /// Runs `run` on every window, in parallel when configured.
    fn run_windows<F>(&self, len: usize, run: F) -> Result<Vec<WindowResult>>
    where
        F: Fn(Window) -> Result<WindowResult> + Sync + Send,
    {
        let windows = self.windows(len);
        debug!(
            rows = len,
            windows = windows.len(),
            partitions = self.config.partitions,
            "driving windows"
        );

        let results: Vec<Result<WindowResult>> = match &self.pool {
            Some(pool) if windows.len() > 1 => {
                pool.install(|| windows.par_iter().map(|&window| run(window)).collect())
            }
            _ => windows.iter().map(|&window| run(window)).collect(),
        };

        // Windows come back in input order, so the first error is the earliest window's.
        results.into_iter().collect()
    }
}

/// Numbers a batch failure's row from the start of the input.
fn rebase(error: VexecError, offset: usize) -> VexecError {
    match error {
        VexecError::RowFailed { row, message } => VexecError::RowFailed {
            row: row + offset,
            message,
        },
        other => other,
    }
}

/// Concatenates window outputs in order.
fn assemble(
    logical_type: &LogicalType,
    results: Vec<WindowResult>,
) -> Result<(ArrayRef, Vec<RowErrorAnnotation>)> {
    if results.is_empty() {
        return Ok((new_empty_array(&logical_type.to_arrow()), Vec::new()));
    }
    let mut row_errors = Vec::new();
    let mut arrays = Vec::with_capacity(results.len());
    for result in results {
        arrays.push(result.array);
        row_errors.extend(result.row_errors);
    }
    let refs: Vec<&dyn Array> = arrays.iter().map(AsRef::as_ref).collect();
    Ok((concat(&refs)?, row_errors))
}
