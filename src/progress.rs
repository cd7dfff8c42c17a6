//! Progress-callback trait for per-document refinement events.
//!
//! Inject an [`Arc<dyn RefineProgressCallback>`] via
//! [`crate::config::RefineConfigBuilder::progress_callback`] to receive events
//! while [`crate::refine::refine_batch`] or [`crate::stream::refine_stream`]
//! work through a set of documents.
//!
//! # Example
//!
//! ```rust
//! use edgequake_mdrefine::{RefineConfig, RefineProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     figures: AtomicUsize,
//! }
//!
//! impl RefineProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, _index: usize, _total: usize, figure_count: usize) {
//!         self.figures.fetch_add(figure_count, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { figures: AtomicUsize::new(0) });
//!
//! let config = RefineConfig::builder()
//!     .progress_callback(counter as Arc<dyn RefineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch APIs as each document is refined.
///
/// Implementations must be `Send + Sync`: documents are refined concurrently
/// on the blocking thread pool, so `on_document_*` may be called from
/// different threads at once. All methods default to no-ops.
pub trait RefineProgressCallback: Send + Sync {
    /// Called once before any document is read.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is read.
    ///
    /// # Arguments
    /// * `index` — 1-indexed position of the document in the input list
    /// * `total` — number of documents in the batch
    fn on_document_start(&self, index: usize, total: usize) {
        let _ = (index, total);
    }

    /// Called when a document has been refined and written.
    ///
    /// # Arguments
    /// * `index`        — 1-indexed position of the document
    /// * `total`        — number of documents in the batch
    /// * `figure_count` — figures synthesised in this document
    fn on_document_complete(&self, index: usize, total: usize, figure_count: usize) {
        let _ = (index, total, figure_count);
    }

    /// Called when a document fails with an I/O error.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let _ = (total_documents, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RefineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RefineConfig`].
pub type ProgressCallback = Arc<dyn RefineProgressCallback>;
