//! Result types returned by the refinement entry points.

use crate::pipeline::caption::CaptionKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One synthesised `<figure>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Document-unique identifier, `fig-001`, `fig-002`, …
    pub id: String,
    /// Canonical image source, e.g. `images/chart.png` (unescaped).
    pub source: String,
    /// Normalised alt text as emitted (HTML-escaped).
    pub alt: String,
    /// Detected caption text (unescaped), if any.
    pub caption: Option<String>,
    /// Which caption pattern matched.
    pub caption_kind: Option<CaptionKind>,
    /// 0-indexed line of the image reference in the source document.
    pub line: usize,
}

impl Figure {
    /// Format the 1-based figure number as an identifier.
    pub fn format_id(number: usize) -> String {
        format!("fig-{number:03}")
    }

    /// Render the figure as a single line of HTML.
    pub fn to_html(&self) -> String {
        let img = format!(
            r#"<img src="{}" alt="{}" />"#,
            html_escape::encode_quoted_attribute(&self.source),
            self.alt
        );
        match &self.caption {
            Some(caption) => format!(
                r#"<figure id="{}">{img}<figcaption>{}</figcaption></figure>"#,
                self.id,
                html_escape::encode_quoted_attribute(caption)
            ),
            None => format!(r#"<figure id="{}">{img}</figure>"#, self.id),
        }
    }
}

/// Counters describing one refinement run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefineStats {
    /// Lines in the source document.
    pub total_lines: usize,
    /// Figures emitted (one per recognised image reference).
    pub image_count: usize,
    /// Figures that received a `<figcaption>`.
    pub captioned_count: usize,
    /// Figures emitted without a caption.
    pub uncaptioned_count: usize,
    /// Source lines folded into a figure (caption lines and blank lines skipped with them).
    pub consumed_lines: usize,
    /// Wall-clock time spent refining, in milliseconds.
    pub duration_ms: u64,
}

/// The refined text of one document plus what was found in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineOutput {
    /// Refined Markdown.
    pub markdown: String,
    /// Figures in document order.
    pub figures: Vec<Figure>,
    pub stats: RefineStats,
}

/// A refined document that has been written next to its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedDocument {
    pub source_path: PathBuf,
    /// The `<stem>_refined.<ext>` file that was written.
    pub output_path: PathBuf,
    pub output: RefineOutput,
}
