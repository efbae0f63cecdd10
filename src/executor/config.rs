//! Executor configuration.

use crate::error::{Result, VexecError};

use super::CastMode;

/// Default number of rows per batch.
pub const DEFAULT_BATCH_SIZE: usize = 2048;

/// Configuration for driving bound functions over host data.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Number of rows per batch.
    pub batch_size: usize,
    /// Number of batches run concurrently.
    pub partitions: usize,
    /// Mode handed to cast functions.
    pub cast_mode: CastMode,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            partitions: 1,
            cast_mode: CastMode::Normal,
        }
    }
}

impl ExecutorConfig {
    /// Creates a new executor configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the number of partitions.
    #[must_use]
    pub fn with_partitions(mut self, partitions: usize) -> Self {
        self.partitions = partitions;
        self
    }

    /// Sets the cast mode.
    #[must_use]
    pub fn with_cast_mode(mut self, cast_mode: CastMode) -> Self {
        self.cast_mode = cast_mode;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the batch size or partition count is zero.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(VexecError::InvalidConfig(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        if self.partitions == 0 {
            return Err(VexecError::InvalidConfig(
                "partitions must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
