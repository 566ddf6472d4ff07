//! Structural segmentation of word-processor documents.
//!
//! An explicit state object replaces the generator-with-captured-buffer
//! shape: the router feeds blocks one at a time and inspects the returned
//! flushes.

use docset_core::types::DocBlock;

/// A section's accumulated prose, flushed when a boundary is crossed.
#[derive(Debug, Clone, PartialEq)]
pub struct FlushedSection {
    /// Label of the section the text belonged to (the kind that opened it).
    pub label: String,
    /// Raw accumulated text, one block per line; not yet normalized.
    pub text: String,
}

/// Heading depth at or above which a heading opens a new section.
const SECTION_HEADING_MAX_LEVEL: u8 = 3;

/// Groups paragraph blocks into sections by heading/formatting boundaries.
///
/// Holds the current buffer, the tracked section label, and a block counter.
/// The counter enforces a warm-up window after every flush: the first
/// `warmup` buffered blocks never trigger a boundary, so a fresh section
/// seeds its label before formatting signals are trusted. Tables and images
/// are not fed here; the router flushes explicitly around them and calls
/// [`SectionAssembler::reset_counter`].
#[derive(Debug)]
pub struct SectionAssembler {
    buf: Vec<String>,
    label: String,
    blocks_in_section: usize,
    warmup: usize,
}

impl SectionAssembler {
    pub fn new(warmup: usize) -> Self {
        Self {
            buf: Vec::new(),
            label: String::new(),
            blocks_in_section: 0,
            warmup,
        }
    }

    /// Feed one prose block. Returns the flushed previous section when this
    /// block opens a new one.
    pub fn push(&mut self, block: &DocBlock) -> Option<FlushedSection> {
        let kind = boundary_kind(block);
        let text = block_text(block);

        if self.blocks_in_section < self.warmup {
            if self.blocks_in_section == 0 {
                self.label = label_of(block).to_string();
            }
            self.append(text);
            return None;
        }

        if let Some(kind) = kind {
            let flushed = self.flush();
            self.label = kind.to_string();
            self.append(text);
            return flushed;
        }

        self.append(text);
        None
    }

    /// Close the current buffer, returning its contents under the tracked
    /// label. Resets the block counter, re-arming the warm-up window.
    pub fn flush(&mut self) -> Option<FlushedSection> {
        self.blocks_in_section = 0;
        if self.buf.is_empty() {
            return None;
        }
        let text = self.buf.join("\n");
        self.buf.clear();
        Some(FlushedSection {
            label: self.label.clone(),
            text,
        })
    }

    /// Re-arm the warm-up window without touching the buffer or label; used
    /// by the router after table/image interruptions.
    pub fn reset_counter(&mut self) {
        self.blocks_in_section = 0;
    }

    pub fn current_label(&self) -> &str {
        &self.label
    }

    fn append(&mut self, text: &str) {
        if !text.is_empty() {
            self.buf.push(text.to_string());
            self.blocks_in_section += 1;
        }
    }
}

/// The section-opening kind of a block, or None for plain prose. Headings
/// deeper than level 3 are plain prose.
fn boundary_kind(block: &DocBlock) -> Option<&'static str> {
    match block {
        DocBlock::Heading { level, .. } if *level <= SECTION_HEADING_MAX_LEVEL => Some("heading"),
        DocBlock::BiggerFont(_) => Some("bigger-font"),
        DocBlock::Underlined(_) => Some("underlined"),
        DocBlock::Bold(_) => Some("bold"),
        DocBlock::Italic(_) => Some("italic"),
        DocBlock::ParagraphBreak(_) => Some("paragraph-break"),
        _ => None,
    }
}

fn label_of(block: &DocBlock) -> &'static str {
    boundary_kind(block).unwrap_or(match block {
        DocBlock::Heading { .. } => "heading",
        _ => "paragraph",
    })
}

/// The textual payload of a prose block; tables and images have none.
fn block_text(block: &DocBlock) -> &str {
    match block {
        DocBlock::Heading { text, .. }
        | DocBlock::BiggerFont(text)
        | DocBlock::Underlined(text)
        | DocBlock::Bold(text)
        | DocBlock::Italic(text)
        | DocBlock::ParagraphBreak(text)
        | DocBlock::Paragraph(text) => text,
        DocBlock::Table { .. } | DocBlock::Image(_) => "",
    }
}
