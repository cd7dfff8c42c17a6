//! Streaming batch API: emit one result per document as it completes.
//!
//! Unlike [`crate::refine::refine_batch`], which returns only after every
//! document is done, [`refine_stream`] yields [`DocumentResult`] items as
//! soon as each file has been written. Documents run concurrently (up to
//! `config.concurrency`), so items arrive in completion order; sort by
//! `index` if input order matters.

use crate::config::RefineConfig;
use crate::error::RefineError;
use crate::output::RefinedDocument;
use crate::refine::refine_file_async;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::{info, warn};

/// Outcome for one document of a batch.
#[derive(Debug)]
pub struct DocumentResult {
    /// 1-indexed position in the input list.
    pub index: usize,
    pub source_path: PathBuf,
    pub result: Result<RefinedDocument, RefineError>,
}

/// A boxed stream of per-document results.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentResult> + Send>>;

/// Refine `paths`, streaming results as each document finishes.
///
/// Per-document I/O failures are reported inside the stream; they never end
/// it early.
pub fn refine_stream<I, P>(paths: I, config: &RefineConfig) -> DocumentStream
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let paths: Vec<PathBuf> = paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect();
    let total = paths.len();
    info!("Starting batch refinement of {} documents", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(paths.into_iter().enumerate().map(move |(i, path)| {
        let cfg = config.clone();
        async move {
            let index = i + 1;
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_document_start(index, total);
            }

            let result = refine_file_async(path.clone(), &cfg).await;

            match &result {
                Ok(doc) => {
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_complete(index, total, doc.output.figures.len());
                    }
                }
                Err(e) => {
                    warn!("Document {}/{} failed: {}", index, total, e);
                    if let Some(ref cb) = cfg.progress_callback {
                        cb.on_document_error(index, total, &e.to_string());
                    }
                }
            }

            DocumentResult {
                index,
                source_path: path,
                result,
            }
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
