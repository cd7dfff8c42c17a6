//! # edgequake-mdrefine
//!
//! Refine converter-emitted Markdown into accessible `<figure>` markup.
//!
//! ## Why this crate?
//!
//! Document converters (PDF, DOCX, PPTX → Markdown) dump images as bare
//! `![](/tmp/run-42/images/picture_3.png)` references, with the figure's
//! caption left as an ordinary paragraph somewhere below. The result renders,
//! but the image path only works on the machine that ran the conversion, the
//! alt text is usually empty, and nothing ties the caption to its image.
//!
//! This crate post-processes that Markdown: each image becomes
//!
//! ```html
//! <figure id="fig-001"><img src="images/picture_3.png" alt="picture 3" /><figcaption>Quarterly revenue</figcaption></figure>
//! ```
//!
//! with a canonical relative path, a usable alt text and the caption it
//! detected in the next few lines. Everything that is not an image passes
//! through untouched.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown file
//!  │
//!  ├─ 1. Input    resolve and read the source (typed I/O errors)
//!  ├─ 2. Paths    rewrite `…/images/x.png` → `images/x.png` (idempotent)
//!  ├─ 3. Figures  line state machine: image → alt → caption lookahead → <figure>
//!  └─ 4. Output   atomic write to `<stem>_refined.<ext>` + stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_mdrefine::{refine_file, RefineConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RefineConfig::default();
//!     let doc = refine_file("output/document.md", &config)?;
//!     println!("wrote {}", doc.output_path.display());
//!     eprintln!("figures: {} ({} captioned)",
//!         doc.output.stats.image_count,
//!         doc.output.stats.captioned_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mdrefine` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-mdrefine = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod refine;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{InlineTextPolicy, RefineConfig, RefineConfigBuilder};
pub use error::RefineError;
pub use output::{Figure, RefineOutput, RefineStats, RefinedDocument};
pub use pipeline::alt::normalize_alt_text;
pub use pipeline::caption::{find_caption_after, CaptionKind, CaptionMatch};
pub use pipeline::input::refined_path;
pub use pipeline::paths::{canonical_source, normalize_image_paths, ImagePathRewriter};
pub use progress::{NoopProgressCallback, ProgressCallback, RefineProgressCallback};
pub use refine::{refine_batch, refine_batch_sync, refine_file, refine_file_async, refine_markdown};
pub use stream::{refine_stream, DocumentResult, DocumentStream};
