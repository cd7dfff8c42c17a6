//! Caption detection in the lines following an image reference.
//!
//! Converters emit a figure's caption as ordinary text close below the image:
//! a `Figure 3: …` label, an italic line, or (when the source was HTML) an
//! existing `<figcaption>`. The detector looks at a small forward window and
//! tries an ordered table of patterns on each non-blank line.
//!
//! ## Tie-break rule
//!
//! The nearest offset wins. At that offset the highest-priority pattern wins.
//! Once a line matches, nothing further down is considered, even if a later
//! line carries a higher-priority pattern.

use super::image::contains_image;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Which caption pattern matched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionKind {
    /// `Figure 2: text`, `Fig. 3 - text`, `図1：text`, …
    FigureLabel,
    /// A line that is entirely `*text*` or `_text_`.
    Emphasis,
    /// A line that is entirely `<figcaption>text</figcaption>`.
    CaptionElement,
}

impl CaptionKind {
    /// 1 is the highest priority.
    pub fn priority(self) -> u8 {
        match self {
            CaptionKind::FigureLabel => 1,
            CaptionKind::Emphasis => 2,
            CaptionKind::CaptionElement => 3,
        }
    }
}

/// A caption found below an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionMatch {
    /// Caption text, trimmed and unescaped.
    pub text: String,
    pub kind: CaptionKind,
    /// Distance in lines from the image line (1-based).
    pub offset: usize,
}

/// Ordered pattern table. Every regex exposes the caption as group `text`.
static CAPTION_PATTERNS: Lazy<Vec<(CaptionKind, Regex)>> = Lazy::new(|| {
    vec![
        (
            CaptionKind::FigureLabel,
            Regex::new(
                r"(?i)^\s*(?:figure|fig\.|abbildung|abb\.|figura|図|图)\s*(?:\d+(?:[.\-]\d+)*)?\s*[:：\-－]\s*(?P<text>.+)$",
            )
            .unwrap(),
        ),
        (
            CaptionKind::Emphasis,
            Regex::new(r"^\*(?P<text>[^*\s](?:.*[^*\s])?)\*$").unwrap(),
        ),
        (
            CaptionKind::Emphasis,
            Regex::new(r"^_(?P<text>[^_\s](?:.*[^_\s])?)_$").unwrap(),
        ),
        (
            CaptionKind::CaptionElement,
            Regex::new(r"(?i)^<figcaption>\s*(?P<text>.+?)\s*</figcaption>$").unwrap(),
        ),
    ]
});

/// Search up to `window` lines after `idx` for a caption.
///
/// Blank lines are skipped but use up the window. The search stops at a line
/// carrying another image reference. Returns `None` when nothing in the
/// window matches, which is the common case.
pub fn find_caption_after(lines: &[&str], idx: usize, window: usize) -> Option<CaptionMatch> {
    for offset in 1..=window {
        let candidate = lines.get(idx + offset)?.trim();
        if candidate.is_empty() {
            continue;
        }
        if contains_image(candidate) {
            return None;
        }
        if let Some((kind, text)) = match_caption(candidate) {
            return Some(CaptionMatch { text, kind, offset });
        }
    }
    None
}

/// Try the pattern table against one trimmed line.
pub fn match_caption(candidate: &str) -> Option<(CaptionKind, String)> {
    CAPTION_PATTERNS.iter().find_map(|(kind, re)| {
        let raw = re.captures(candidate)?.name("text")?.as_str().trim();
        let text = match kind {
            CaptionKind::CaptionElement => html_escape::decode_html_entities(raw).into_owned(),
            _ => raw.to_string(),
        };
        (!text.is_empty()).then_some((*kind, text))
    })
}
