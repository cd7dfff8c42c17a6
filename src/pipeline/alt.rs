//! Alt-text normalisation for emitted `<img>` tags.

use super::paths::basename;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_NAME_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\-]+").unwrap());

/// Produce display-safe alt text for an image.
///
/// Whitespace runs collapse to single spaces. When nothing is left, a label
/// is derived from the source filename (`chart_1-final.png` → `chart 1 final`).
/// The result is escaped for use inside a quoted HTML attribute and may be
/// empty when the filename yields nothing either.
pub fn normalize_alt_text(alt: &str, source: &str) -> String {
    let cleaned = collapse_whitespace(alt);
    let label = if cleaned.is_empty() {
        label_from_filename(source)
    } else {
        cleaned
    };
    html_escape::encode_quoted_attribute(&label).into_owned()
}

fn label_from_filename(source: &str) -> String {
    let name = basename(source);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _ext)| stem);
    collapse_whitespace(&RE_NAME_SEPARATORS.replace_all(stem, " "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
