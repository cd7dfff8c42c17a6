//! Image path normalisation: rewrite references into `images/<basename>`.
//!
//! Converters write images with whatever path they were given: absolute
//! output directories, `./out/images/…`, or Windows paths with backslashes.
//! The refined document lives next to its `images/` directory, so every
//! reference that points into an `images` segment is rewritten to the
//! canonical relative form.
//!
//! The rewrite runs over the whole document as one regex substitution and is
//! idempotent: a canonical reference matches the pattern with an empty prefix
//! and is rewritten to itself.

use super::image::SOURCE_BODY;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Whole-document rewriter for one image directory name.
#[derive(Debug, Clone)]
pub struct ImagePathRewriter {
    image_dir: String,
    pattern: Regex,
}

impl ImagePathRewriter {
    /// Build a rewriter for `image_dir` (normally `images`).
    pub fn new(image_dir: &str) -> Self {
        // The directory must be a whole segment: either the first thing in
        // the parentheses or preceded by a separator.
        let pattern = format!(
            r"!\[([^\]\n]*)\]\(\s*(?:{body}*?[\\/])?{dir}[\\/]({body}*?)\s*\)",
            body = SOURCE_BODY,
            dir = regex::escape(image_dir)
        );
        // `regex::escape` output embedded in a fixed template always compiles.
        let pattern = Regex::new(&pattern).unwrap();
        Self {
            image_dir: image_dir.to_string(),
            pattern,
        }
    }

    /// Rewrite every reference into the image directory. Returns the input
    /// unchanged (borrowed) when nothing matches.
    pub fn rewrite<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, |caps: &Captures<'_>| {
            let name = basename(&caps[2]);
            if name.is_empty() {
                caps[0].to_string()
            } else {
                format!("![{}]({}/{})", &caps[1], self.image_dir, name)
            }
        })
    }
}

/// Rewrite `text` against the default `images` directory.
pub fn normalize_image_paths(text: &str) -> String {
    ImagePathRewriter::new(crate::config::DEFAULT_IMAGE_DIR)
        .rewrite(text)
        .into_owned()
}

/// Canonical source for a single reference.
///
/// A source already under `<image_dir>/` is kept as is; anything else is
/// reduced to its last path segment and placed under `<image_dir>/`.
pub fn canonical_source(source: &str, image_dir: &str) -> String {
    let source = source.trim();
    match source.strip_prefix(image_dir) {
        Some(rest) if rest.starts_with('/') => source.to_string(),
        _ => format!("{}/{}", image_dir, basename(source)),
    }
}

/// Last path segment, splitting on either separator style.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
