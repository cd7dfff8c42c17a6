//! Configuration types for Markdown figure refinement.
//!
//! All refinement behaviour is controlled through [`RefineConfig`], built via
//! its [`RefineConfigBuilder`]. The config is constructed explicitly by the
//! caller and passed by reference into every invocation; nothing in the
//! library caches a process-wide instance, so concurrent refinements over
//! different documents never share mutable state.

use crate::error::RefineError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory name that converter-emitted images live in.
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Suffix inserted before the extension of the destination file.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_refined";

/// Lines after an image searched for a caption.
pub const DEFAULT_CAPTION_WINDOW: usize = 3;

const MAX_CAPTION_WINDOW: usize = 10;

/// Configuration for a refinement run.
///
/// Built via [`RefineConfig::builder()`] or using [`RefineConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_mdrefine::{InlineTextPolicy, RefineConfig};
///
/// let config = RefineConfig::builder()
///     .image_dir("assets")
///     .caption_window(2)
///     .inline_text(InlineTextPolicy::Discard)
///     .build()
///     .unwrap();
/// assert_eq!(config.image_dir, "assets");
/// ```
#[derive(Clone)]
pub struct RefineConfig {
    /// Name of the image directory sources are canonicalised into. Default: `images`.
    pub image_dir: String,

    /// Suffix appended to the source stem to name the output file. Default: `_refined`.
    pub output_suffix: String,

    /// How many lines after an image are searched for a caption. Range 1–10. Default: 3.
    ///
    /// Blank lines count towards the window. A wider window catches captions
    /// separated from their image by a paragraph break but raises the chance of
    /// claiming an unrelated emphasised line as a caption.
    pub caption_window: usize,

    /// Run the whole-document image path rewrite before synthesising figures. Default: true.
    pub normalize_paths: bool,

    /// What to do with text sharing a line with an image reference.
    /// Default: [`InlineTextPolicy::Preserve`].
    pub inline_text: InlineTextPolicy,

    /// Maximum documents refined at once by the batch APIs. Default: 4.
    pub concurrency: usize,

    /// Optional per-document progress events for the batch APIs.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            image_dir: DEFAULT_IMAGE_DIR.to_string(),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            caption_window: DEFAULT_CAPTION_WINDOW,
            normalize_paths: true,
            inline_text: InlineTextPolicy::default(),
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RefineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefineConfig")
            .field("image_dir", &self.image_dir)
            .field("output_suffix", &self.output_suffix)
            .field("caption_window", &self.caption_window)
            .field("normalize_paths", &self.normalize_paths)
            .field("inline_text", &self.inline_text)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RefineProgressCallback>"),
            )
            .finish()
    }
}

impl RefineConfig {
    /// Create a new builder for `RefineConfig`.
    pub fn builder() -> RefineConfigBuilder {
        RefineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RefineConfig`].
#[derive(Debug)]
pub struct RefineConfigBuilder {
    config: RefineConfig,
}

impl RefineConfigBuilder {
    pub fn image_dir(mut self, dir: impl Into<String>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn caption_window(mut self, lines: usize) -> Self {
        self.config.caption_window = lines.clamp(1, MAX_CAPTION_WINDOW);
        self
    }

    pub fn normalize_paths(mut self, v: bool) -> Self {
        self.config.normalize_paths = v;
        self
    }

    pub fn inline_text(mut self, policy: InlineTextPolicy) -> Self {
        self.config.inline_text = policy;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RefineConfig, RefineError> {
        let c = &self.config;
        let dir = c.image_dir.trim();
        if dir.is_empty() {
            return Err(RefineError::InvalidConfig(
                "image directory name must not be empty".into(),
            ));
        }
        if dir.contains(['/', '\\']) {
            return Err(RefineError::InvalidConfig(format!(
                "image directory must be a single path segment, got '{}'",
                c.image_dir
            )));
        }
        if c.output_suffix.is_empty() {
            return Err(RefineError::InvalidConfig(
                "output suffix must not be empty (the source would be overwritten)".into(),
            ));
        }
        if c.output_suffix.contains(['/', '\\']) {
            return Err(RefineError::InvalidConfig(format!(
                "output suffix must not contain path separators, got '{}'",
                c.output_suffix
            )));
        }
        if c.caption_window == 0 || c.caption_window > MAX_CAPTION_WINDOW {
            return Err(RefineError::InvalidConfig(format!(
                "caption window must be 1–{MAX_CAPTION_WINDOW}, got {}",
                c.caption_window
            )));
        }
        if c.concurrency == 0 {
            return Err(RefineError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        let mut config = self.config;
        config.image_dir = config.image_dir.trim().to_string();
        Ok(config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Handling of text that shares a line with an image reference.
///
/// | Policy | Effect on `Intro ![a](x.png) outro` |
/// |--------|-------------------------------------|
/// | `Preserve` | `Intro <figure …>…</figure> outro` |
/// | `Discard`  | `<figure …>…</figure>` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum InlineTextPolicy {
    /// Replace each reference in place, keeping the surrounding text, and
    /// refine every image on the line. (default)
    #[default]
    Preserve,
    /// Use only the first image reference and drop everything else on the line.
    Discard,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RefineConfig::default();
        assert_eq!(c.image_dir, "images");
        assert_eq!(c.output_suffix, "_refined");
        assert_eq!(c.caption_window, 3);
        assert!(c.normalize_paths);
        assert_eq!(c.inline_text, InlineTextPolicy::Preserve);
    }

    #[test]
    fn builder_clamps_window_and_concurrency() {
        let c = RefineConfig::builder()
            .caption_window(0)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.caption_window, 1);
        assert_eq!(c.concurrency, 1);

        let c = RefineConfig::builder().caption_window(99).build().unwrap();
        assert_eq!(c.caption_window, 10);
    }

    #[test]
    fn builder_rejects_bad_image_dir() {
        assert!(RefineConfig::builder().image_dir("  ").build().is_err());
        assert!(RefineConfig::builder().image_dir("a/b").build().is_err());
        let c = RefineConfig::builder().image_dir(" figs ").build().unwrap();
        assert_eq!(c.image_dir, "figs");
    }

    #[test]
    fn builder_rejects_empty_suffix() {
        let err = RefineConfig::builder().output_suffix("").build().unwrap_err();
        assert!(matches!(err, RefineError::InvalidConfig(_)));
    }

    #[test]
    fn debug_hides_callback() {
        let c = RefineConfig::builder()
            .progress_callback(std::sync::Arc::new(crate::progress::NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn RefineProgressCallback>"));
    }

    #[cfg(feature = "cli")]
    #[test]
    fn policy_parses_from_cli_value() {
        use clap::ValueEnum;
        assert_eq!(
            <InlineTextPolicy as ValueEnum>::from_str("discard", false),
            Ok(InlineTextPolicy::Discard)
        );
        assert!(<InlineTextPolicy as ValueEnum>::from_str("keep", false).is_err());
    }

    #[test]
    fn policy_serialises_lowercase() {
        let json = serde_json::to_string(&InlineTextPolicy::Discard).unwrap();
        assert_eq!(json, "\"discard\"");
    }
}
