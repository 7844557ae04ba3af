//! Pipeline run configuration.
//!
//! [`PipelineOptions`] is a builder that threads progress callbacks,
//! cancellation tokens, and failure-handling policy through pipeline
//! stages without polluting every function signature.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use shotscribe::{CancellationToken, PipelineOptions, ProgressCallback, ProgressInfo};
//!
//! struct LogProgress;
//! impl ProgressCallback for LogProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("{:?}: {} done", info.operation, info.current);
//!     }
//! }
//!
//! let token = CancellationToken::new();
//! let options = PipelineOptions::new()
//!     .with_progress(Arc::new(LogProgress))
//!     .with_cancellation(token.clone())
//!     .with_batch_size(10)
//!     .lenient(true);
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Configuration for pipeline runs.
///
/// Carries optional progress-, cancellation-, and policy-related settings.
/// All fields have sensible defaults — a default-constructed value behaves
/// identically to calling the plain (non-`_with`) methods.
#[derive(Clone)]
pub struct PipelineOptions {
    /// Progress callback. Defaults to a no-op.
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Cancellation token. `None` means never cancelled.
    pub(crate) cancellation: Option<CancellationToken>,
    /// How often to fire the progress callback (every N items).
    /// Defaults to 1 (every item).
    pub(crate) batch_size: u64,
    /// When `true`, a detector failing on one shot logs a warning and the
    /// run continues; when `false` (default) the failure propagates.
    pub(crate) lenient: bool,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("has_cancellation", &self.cancellation.is_some())
            .field("batch_size", &self.batch_size)
            .field("lenient", &self.lenient)
            .finish_non_exhaustive()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineOptions {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoOpProgress),
            cancellation: None,
            batch_size: 1,
            lenient: false,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Fire the progress callback every `batch_size` items instead of every
    /// item.
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set the failure-handling policy for per-shot detector errors.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Whether per-shot detector failures should be tolerated.
    pub fn is_lenient(&self) -> bool {
        self.lenient
    }

    pub(crate) fn progress_callback(&self) -> Arc<dyn ProgressCallback> {
        Arc::clone(&self.progress)
    }

    pub(crate) fn batch_size(&self) -> u64 {
        self.batch_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = PipelineOptions::new();
        assert!(!options.is_cancelled());
        assert!(!options.is_lenient());
        assert_eq!(options.batch_size(), 1);
    }

    #[test]
    fn batch_size_floor_is_one() {
        let options = PipelineOptions::new().with_batch_size(0);
        assert_eq!(options.batch_size(), 1);
    }

    #[test]
    fn cancellation_is_observed() {
        let token = CancellationToken::new();
        let options = PipelineOptions::new().with_cancellation(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
    }
}
