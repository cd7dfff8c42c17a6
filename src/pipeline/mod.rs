//! Pipeline stages for Markdown figure refinement.
//!
//! Each submodule implements exactly one step, is a pure function of its
//! inputs (except [`input`]), and is independently testable.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ paths ──▶ figure ──▶ input
//! (read)   (rewrite)  (image + alt + caption)  (atomic write)
//! ```
//!
//! 1. [`input`]   — resolve and read the source; name and atomically write the
//!    `_refined` sibling
//! 2. [`paths`]   — whole-document rewrite of image sources into `images/<file>`
//! 3. [`image`]   — find `![alt](source)` references on a line
//! 4. [`alt`]     — normalise and escape alt text
//! 5. [`caption`] — look ahead for a caption below an image
//! 6. [`figure`]  — the state machine that emits `<figure>` elements

pub mod alt;
pub mod caption;
pub mod figure;
pub mod image;
pub mod input;
pub mod paths;
