//! Figure synthesis: the line-by-line pass that turns image references into
//! `<figure>` elements.
//!
//! ## State machine
//!
//! ```text
//!            image line, caption at offset k
//!   ┌──────────┐ ───────────────────────────▶ ┌──────────────────┐
//!   │ Scanning │                               │ Skip { until }   │
//!   └──────────┘ ◀─────────────────────────── └──────────────────┘
//!                   reached the caption line
//! ```
//!
//! In `Scanning`, lines without an image are copied unchanged. An image line
//! is replaced by its figure; if a caption was found `k` lines below, the
//! machine enters `Skip` and folds those `k` lines into the figure. While
//! skipping, the caption line and blank lines are dropped, but any other text
//! that sat between image and caption is re-emitted after the figure so it
//! is never lost.
//!
//! Figure IDs come from a counter owned by the synthesizer. One synthesizer
//! handles one document, so concurrent refinements never share a counter.

use super::alt::normalize_alt_text;
use super::caption::{find_caption_after, CaptionMatch};
use super::image::ImageReference;
use super::paths::canonical_source;
use crate::config::{InlineTextPolicy, RefineConfig};
use crate::output::Figure;
use tracing::debug;

/// Result of one synthesis pass.
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    /// Output lines, without terminators.
    pub lines: Vec<String>,
    /// For each output line, the index of the source line whose terminator
    /// it ends with. A figure that folded a caption ends with the caption
    /// line's terminator.
    pub line_ends: Vec<usize>,
    /// Figures in document order.
    pub figures: Vec<Figure>,
    /// Source lines folded into a preceding figure.
    pub consumed_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    /// Consuming lines up to and including the caption line at `until`.
    Skip { until: usize },
}

/// Drives one document through the figure state machine.
#[derive(Debug)]
pub struct FigureSynthesizer<'a> {
    config: &'a RefineConfig,
    next_number: usize,
    out: Synthesis,
}

impl<'a> FigureSynthesizer<'a> {
    pub fn new(config: &'a RefineConfig) -> Self {
        Self {
            config,
            next_number: 1,
            out: Synthesis::default(),
        }
    }

    /// Process `lines` top to bottom and return the refined lines.
    pub fn run(mut self, lines: &[&str]) -> Synthesis {
        let mut state = State::Scanning;

        for (idx, line) in lines.iter().enumerate() {
            state = match state {
                State::Skip { until } => {
                    self.skip_line(idx, line, until);
                    if idx >= until {
                        State::Scanning
                    } else {
                        state
                    }
                }
                State::Scanning => self.scan_line(lines, idx, line),
            };
        }

        self.out
    }

    fn skip_line(&mut self, idx: usize, line: &str, until: usize) {
        if idx == until || line.trim().is_empty() {
            self.out.consumed_lines += 1;
        } else {
            debug!("Keeping line {} between image and caption", idx + 1);
            self.emit(line.to_string(), idx);
        }
        if idx == until {
            if let Some(end) = self.out.line_ends.last_mut() {
                *end = until;
            }
        }
    }

    fn emit(&mut self, line: String, source_idx: usize) {
        self.out.lines.push(line);
        self.out.line_ends.push(source_idx);
    }

    fn scan_line(&mut self, lines: &[&str], idx: usize, line: &str) -> State {
        let refs = match self.config.inline_text {
            InlineTextPolicy::Preserve => ImageReference::find_all(line),
            InlineTextPolicy::Discard => ImageReference::find_first(line).into_iter().collect(),
        };
        let Some(last) = refs.len().checked_sub(1) else {
            self.emit(line.to_string(), idx);
            return State::Scanning;
        };

        let caption = find_caption_after(lines, idx, self.config.caption_window);
        let mut rendered = String::with_capacity(line.len() + 128);
        let mut cursor = 0;

        for (n, reference) in refs.iter().enumerate() {
            let own_caption = if n == last { caption.as_ref() } else { None };
            let figure = self.make_figure(reference, idx, own_caption);

            if self.config.inline_text == InlineTextPolicy::Preserve {
                rendered.push_str(&line[cursor..reference.span.start]);
            }
            rendered.push_str(&figure.to_html());
            cursor = reference.span.end;
            self.out.figures.push(figure);
        }
        if self.config.inline_text == InlineTextPolicy::Preserve {
            rendered.push_str(&line[cursor..]);
        }
        self.emit(rendered, idx);

        match caption {
            Some(c) => State::Skip { until: idx + c.offset },
            None => State::Scanning,
        }
    }

    fn make_figure(
        &mut self,
        reference: &ImageReference,
        line: usize,
        caption: Option<&CaptionMatch>,
    ) -> Figure {
        let source = canonical_source(&reference.source, &self.config.image_dir);
        let alt = normalize_alt_text(&reference.alt, &source);
        let id = Figure::format_id(self.next_number);
        self.next_number += 1;

        match caption {
            Some(c) => debug!("Caption detected for image {} ({:?}): {}", source, c.kind, c.text),
            None => debug!("No caption for image {} on line {}", source, line + 1),
        }

        Figure {
            id,
            source,
            alt,
            caption: caption.map(|c| c.text.clone()),
            caption_kind: caption.map(|c| c.kind),
            line,
        }
    }
}

/// Run the synthesizer over `lines` with `config`.
pub fn synthesize_figures(lines: &[&str], config: &RefineConfig) -> Synthesis {
    FigureSynthesizer::new(config).run(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::caption::CaptionKind;

    fn run(doc: &str) -> Synthesis {
        let lines: Vec<&str> = doc.lines().collect();
        synthesize_figures(&lines, &RefineConfig::default())
    }

    fn run_with(doc: &str, config: &RefineConfig) -> Synthesis {
        let lines: Vec<&str> = doc.lines().collect();
        synthesize_figures(&lines, config)
    }

    #[test]
    fn image_without_caption() {
        let s = run("![](images/foo_bar-1.png)");
        assert_eq!(
            s.lines,
            vec![r#"<figure id="fig-001"><img src="images/foo_bar-1.png" alt="foo bar 1" /></figure>"#]
        );
        assert_eq!(s.figures[0].caption, None);
        assert_eq!(s.consumed_lines, 0);
    }

    #[test]
    fn image_with_label_caption_consumes_caption_line() {
        let s = run("![An image alt text](images/image1.png)\nFigure 1: This is the caption for the first image.\nAfter.");
        assert_eq!(
            s.lines,
            vec![
                r#"<figure id="fig-001"><img src="images/image1.png" alt="An image alt text" /><figcaption>This is the caption for the first image.</figcaption></figure>"#,
                "After.",
            ]
        );
        assert_eq!(s.consumed_lines, 1);
        assert_eq!(s.figures[0].caption_kind, Some(CaptionKind::FigureLabel));
    }

    #[test]
    fn ids_increase_regardless_of_captions() {
        let doc = "![a](a.png)\n\n![b](b.png)\n*Caption b*\n![c](c.png)\ntext\n![d](d.png)";
        let s = run(doc);
        let ids: Vec<&str> = s.figures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, ["fig-001", "fig-002", "fig-003", "fig-004"]);
        assert_eq!(s.figures[1].caption.as_deref(), Some("Caption b"));
        assert!(s.figures[0].caption.is_none());
        assert!(s.figures[2].caption.is_none());
    }

    #[test]
    fn duplicate_images_get_distinct_ids() {
        let s = run("![x](images/same.png)\n\n![x](images/same.png)");
        assert_eq!(s.figures.len(), 2);
        assert_eq!(s.figures[0].source, s.figures[1].source);
        assert_ne!(s.figures[0].id, s.figures[1].id);
    }

    #[test]
    fn source_is_canonicalised() {
        let s = run(r"![](C:\tmp\chart.png)");
        assert_eq!(s.figures[0].source, "images/chart.png");
        assert_eq!(s.figures[0].alt, "chart");
    }

    #[test]
    fn blank_lines_before_caption_are_consumed() {
        let s = run("![a](a.png)\n\n*cap*\nrest");
        assert_eq!(s.lines.len(), 2);
        assert!(s.lines[0].contains("<figcaption>cap</figcaption>"));
        assert_eq!(s.lines[1], "rest");
        assert_eq!(s.consumed_lines, 2);
    }

    #[test]
    fn text_between_image_and_caption_is_kept() {
        let s = run("![a](a.png)\nSource: survey data\nFigure 4: Results");
        assert_eq!(s.lines.len(), 2);
        assert!(s.lines[0].contains("<figcaption>Results</figcaption>"));
        assert_eq!(s.lines[1], "Source: survey data");
    }

    #[test]
    fn caption_beyond_window_stays_text() {
        let s = run("![a](a.png)\n\n\n\nFigure 1: too far");
        assert!(!s.lines[0].contains("figcaption"));
        assert_eq!(s.lines.last().map(String::as_str), Some("Figure 1: too far"));
        assert_eq!(s.lines.len(), 5);
    }

    #[test]
    fn malformed_reference_passes_through() {
        let doc = "![broken](\n![]()\n![alt] (x.png)";
        let s = run(doc);
        assert!(s.figures.is_empty());
        assert_eq!(s.lines, doc.lines().collect::<Vec<_>>());
    }

    #[test]
    fn preserve_keeps_inline_text_in_place() {
        let s = run("See ![a](a.png) here and ![b](b.png).\n*Caption for b*");
        assert_eq!(s.figures.len(), 2);
        assert_eq!(s.lines.len(), 1);
        let line = &s.lines[0];
        assert!(line.starts_with(r#"See <figure id="fig-001">"#), "{line}");
        assert!(line.contains(" here and <figure id=\"fig-002\">"), "{line}");
        assert!(line.ends_with("<figcaption>Caption for b</figcaption></figure>."), "{line}");
        assert!(s.figures[0].caption.is_none());
    }

    #[test]
    fn discard_drops_inline_text_and_later_images() {
        let config = RefineConfig::builder()
            .inline_text(InlineTextPolicy::Discard)
            .build()
            .unwrap();
        let s = run_with("See ![a](a.png) here and ![b](b.png).", &config);
        assert_eq!(s.figures.len(), 1);
        assert_eq!(
            s.lines,
            vec![r#"<figure id="fig-001"><img src="images/a.png" alt="a" /></figure>"#]
        );
    }

    #[test]
    fn escapes_caption_and_source() {
        let s = run("![a](images/a&b.png)\nFigure 1: x < y");
        let html = &s.lines[0];
        assert!(html.contains(r#"src="images/a&amp;b.png""#), "{html}");
        assert!(html.contains("<figcaption>x &lt; y</figcaption>"), "{html}");
    }

    #[test]
    fn caption_window_from_config() {
        let config = RefineConfig::builder().caption_window(1).build().unwrap();
        let s = run_with("![a](a.png)\n\n*cap*", &config);
        assert!(s.figures[0].caption.is_none());
        assert_eq!(s.lines.len(), 3);
    }

    #[test]
    fn custom_image_dir() {
        let config = RefineConfig::builder().image_dir("figs").build().unwrap();
        let s = run_with("![a](out/a.png)\n![b](figs/b.png)", &config);
        assert_eq!(s.figures[0].source, "figs/a.png");
        assert_eq!(s.figures[1].source, "figs/b.png");
    }

    #[test]
    fn line_ends_follow_source_lines() {
        let s = run("intro\n![a](a.png)\nSource: survey\n*cap*\nend");
        assert_eq!(s.lines.len(), 4);
        assert_eq!(s.lines[2], "Source: survey");
        // The block image..caption ends where the caption line ended.
        assert_eq!(s.line_ends, vec![0, 1, 3, 4]);

        let plain = run("a\nb");
        assert_eq!(plain.line_ends, vec![0, 1]);
    }

    #[test]
    fn parenthesised_file_name_is_one_figure() {
        let s = run("![a](images/chart(1).png)");
        assert_eq!(s.figures.len(), 1);
        assert_eq!(s.figures[0].source, "images/chart(1).png");
        assert_eq!(
            s.lines,
            vec![r#"<figure id="fig-001"><img src="images/chart(1).png" alt="a" /></figure>"#]
        );
    }

    #[test]
    fn empty_document() {
        let s = run("");
        assert!(s.lines.is_empty());
        assert!(s.figures.is_empty());
    }
}
