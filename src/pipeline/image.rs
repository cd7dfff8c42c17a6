//! Image reference detection: `![alt](source)` on a single line.
//!
//! Detection is loose on the alt half (lazy `.*?`) because converter output
//! is not guaranteed to be CommonMark-clean. The source may contain one level
//! of balanced parentheses, so `chart (1).png` style names survive intact.
//! A reference whose source is empty after trimming (`![x]()`) is treated as
//! malformed: it is not recognised and the line passes through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Source body: any character except parentheses and newlines, or one
/// balanced `( … )` group.
pub(crate) const SOURCE_BODY: &str = r"(?:[^()\n]|\([^()\n]*\))";

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"!\[(.*?)\]\(({SOURCE_BODY}*)\)")).unwrap());

/// An image reference found on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Raw alt text between the brackets.
    pub alt: String,
    /// Source between the parentheses, trimmed.
    pub source: String,
    /// Byte range of the whole `![…](…)` match within the line.
    pub span: Range<usize>,
}

impl ImageReference {
    /// All well-formed references on `line`, left to right.
    pub fn find_all(line: &str) -> Vec<ImageReference> {
        RE_IMAGE_REF
            .captures_iter(line)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let source = caps.get(2)?.as_str().trim();
                if source.is_empty() {
                    return None;
                }
                Some(ImageReference {
                    alt: caps.get(1).map_or("", |m| m.as_str()).to_string(),
                    source: source.to_string(),
                    span: whole.range(),
                })
            })
            .collect()
    }

    /// The first well-formed reference on `line`.
    pub fn find_first(line: &str) -> Option<ImageReference> {
        Self::find_all(line).into_iter().next()
    }
}

/// `true` if `line` carries at least one well-formed image reference.
pub fn contains_image(line: &str) -> bool {
    RE_IMAGE_REF
        .captures_iter(line)
        .any(|caps| caps.get(2).is_some_and(|m| !m.as_str().trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_reference() {
        let r = ImageReference::find_first("![Chart](images/c.png)").unwrap();
        assert_eq!(r.alt, "Chart");
        assert_eq!(r.source, "images/c.png");
        assert_eq!(r.span, 0..22);
    }

    #[test]
    fn source_is_trimmed() {
        let r = ImageReference::find_first("![](  a.png )").unwrap();
        assert_eq!(r.source, "a.png");
    }

    #[test]
    fn empty_source_is_not_recognised() {
        assert!(ImageReference::find_first("![alt]()").is_none());
        assert!(ImageReference::find_first("![alt](   )").is_none());
        assert!(!contains_image("![alt]()"));
    }

    #[test]
    fn plain_links_are_not_images() {
        assert!(ImageReference::find_first("[text](images/a.png)").is_none());
        assert!(!contains_image("see [docs](https://example.org)"));
    }

    #[test]
    fn multiple_references_in_order() {
        let refs = ImageReference::find_all("![a](1.png) and ![b](2.png)");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].alt, "a");
        assert_eq!(refs[1].source, "2.png");
        assert!(refs[0].span.end <= refs[1].span.start);
    }

    #[test]
    fn balanced_parentheses_stay_in_source() {
        let line = "![a](images/chart (1).png) after";
        let r = ImageReference::find_first(line).unwrap();
        assert_eq!(r.source, "images/chart (1).png");
        assert_eq!(&line[r.span.clone()], "![a](images/chart (1).png)");

        let refs = ImageReference::find_all("![a](x(1).png) and ![b](y(2).png)");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].source, "y(2).png");
    }

    #[test]
    fn unbalanced_parenthesis_is_not_recognised() {
        assert!(ImageReference::find_first("![a](we(ird.png)").is_none());
    }

    #[test]
    fn malformed_first_reference_is_skipped() {
        let r = ImageReference::find_first("![x]() then ![y](y.png)").unwrap();
        assert_eq!(r.alt, "y");
    }
}
