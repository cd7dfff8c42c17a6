//! Refinement entry points.
//!
//! ## Which function?
//!
//! - [`refine_markdown`] — pure text in, text out. No I/O, never fails.
//! - [`refine_file`] — read one file, write its `_refined` sibling.
//! - [`refine_file_async`] — the same on tokio's blocking pool.
//! - [`refine_batch`] — many files concurrently, results in input order.
//!   Use [`crate::stream::refine_stream`] to receive them as they finish.

use crate::config::RefineConfig;
use crate::error::RefineError;
use crate::output::{RefineOutput, RefineStats, RefinedDocument};
use crate::pipeline::figure::synthesize_figures;
use crate::pipeline::input;
use crate::pipeline::paths::ImagePathRewriter;
use crate::stream::refine_stream;
use futures::StreamExt;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

/// Refine a Markdown string.
///
/// Content anomalies (malformed references, missing captions, empty alt
/// text) are resolved locally, so this function has no error path.
///
/// # Example
/// ```rust
/// use edgequake_mdrefine::{refine_markdown, RefineConfig};
///
/// let md = "![An image alt text](images/image1.png)\n\
///           Figure 1: This is the caption for the first image.\n";
/// let out = refine_markdown(md, &RefineConfig::default());
/// assert_eq!(
///     out.markdown,
///     "<figure id=\"fig-001\"><img src=\"images/image1.png\" alt=\"An image alt text\" />\
///      <figcaption>This is the caption for the first image.</figcaption></figure>\n"
/// );
/// ```
pub fn refine_markdown(text: &str, config: &RefineConfig) -> RefineOutput {
    let start = Instant::now();

    // ── Step 1: Canonicalise image paths ─────────────────────────────────
    let text: Cow<'_, str> = if config.normalize_paths {
        ImagePathRewriter::new(&config.image_dir).rewrite(text)
    } else {
        Cow::Borrowed(text)
    };

    // ── Step 2: Split, keeping each line's own terminator ────────────────
    let (lines, endings): (Vec<&str>, Vec<&str>) =
        text.split_inclusive('\n').map(split_terminator).unzip();

    // ── Step 3: Synthesise figures ───────────────────────────────────────
    let synthesis = synthesize_figures(&lines, config);

    // ── Step 4: Reassemble ───────────────────────────────────────────────
    let mut markdown = String::with_capacity(text.len() + 128 * synthesis.figures.len());
    for (line, &source_idx) in synthesis.lines.iter().zip(&synthesis.line_ends) {
        markdown.push_str(line);
        markdown.push_str(endings.get(source_idx).copied().unwrap_or(""));
    }

    let captioned = synthesis
        .figures
        .iter()
        .filter(|f| f.caption.is_some())
        .count();
    let stats = RefineStats {
        total_lines: lines.len(),
        image_count: synthesis.figures.len(),
        captioned_count: captioned,
        uncaptioned_count: synthesis.figures.len() - captioned,
        consumed_lines: synthesis.consumed_lines,
        duration_ms: start.elapsed().as_millis() as u64,
    };

    RefineOutput {
        markdown,
        figures: synthesis.figures,
        stats,
    }
}

/// Split a line produced by `split_inclusive('\n')` into body and terminator.
fn split_terminator(raw: &str) -> (&str, &'static str) {
    if let Some(body) = raw.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = raw.strip_suffix('\n') {
        (body, "\n")
    } else {
        (raw, "")
    }
}

/// Refine a Markdown file and write the result next to it.
///
/// The destination is `<stem><suffix>.<ext>` (default suffix `_refined`) in
/// the source's directory. It is written only after the refined text is
/// complete, via temp file + rename, so a failure never leaves a partial file.
///
/// # Errors
/// Only I/O faults: [`RefineError::FileNotFound`], [`RefineError::NotAFile`],
/// [`RefineError::PermissionDenied`], [`RefineError::ReadFailed`],
/// [`RefineError::OutputWriteFailed`].
pub fn refine_file(
    path: impl AsRef<Path>,
    config: &RefineConfig,
) -> Result<RefinedDocument, RefineError> {
    let path = path.as_ref();
    refine_file_inner(path, config)
        .inspect_err(|e| error!("Failed to refine Markdown file {}: {}", path.display(), e))
}

fn refine_file_inner(path: &Path, config: &RefineConfig) -> Result<RefinedDocument, RefineError> {
    info!("Refining Markdown: {}", path.display());

    let text = input::read_markdown(path)?;
    let output = refine_markdown(&text, config);

    let output_path = input::refined_path(path, &config.output_suffix);
    input::write_atomic(&output_path, &output.markdown)?;

    info!(
        "Refined Markdown saved to: {} ({} figures, {} captioned)",
        output_path.display(),
        output.stats.image_count,
        output.stats.captioned_count
    );

    Ok(RefinedDocument {
        source_path: path.to_path_buf(),
        output_path,
        output,
    })
}

/// Async wrapper around [`refine_file`].
///
/// Runs the read-refine-write sequence on tokio's blocking thread pool.
pub async fn refine_file_async(
    path: impl Into<PathBuf>,
    config: &RefineConfig,
) -> Result<RefinedDocument, RefineError> {
    let path = path.into();
    let config = config.clone();
    tokio::task::spawn_blocking(move || refine_file(&path, &config))
        .await
        .map_err(|e| RefineError::Internal(format!("refinement task failed: {e}")))?
}

/// Refine many files concurrently (up to `config.concurrency` at once).
///
/// Each document is independent: one failure does not stop the others.
/// Results are returned in input order.
pub async fn refine_batch<I, P>(
    paths: I,
    config: &RefineConfig,
) -> Vec<(PathBuf, Result<RefinedDocument, RefineError>)>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let start = Instant::now();
    let mut results: Vec<_> = refine_stream(paths, config).collect().await;
    results.sort_by_key(|r| r.index);

    let total = results.len();
    let succeeded = results.iter().filter(|r| r.result.is_ok()).count();
    info!(
        "Batch complete: {}/{} documents refined in {}ms",
        succeeded,
        total,
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    results
        .into_iter()
        .map(|r| (r.source_path, r.result))
        .collect()
}

/// Synchronous wrapper around [`refine_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn refine_batch_sync<I, P>(
    paths: I,
    config: &RefineConfig,
) -> Result<Vec<(PathBuf, Result<RefinedDocument, RefineError>)>, RefineError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| RefineError::Internal(format!("Failed to create tokio runtime: {}", e)))?;
    Ok(runtime.block_on(refine_batch(paths, config)))
}
