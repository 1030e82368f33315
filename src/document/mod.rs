//! Markdown document parsing and preview layout.
//!
//! This module handles:
//! - Parsing markdown with comrak into a block tree
//! - Laying the block tree out as styled terminal lines
//!
//! The block tree is the single rendering source: the clipboard HTML and the
//! PDF exporter consume it too, so every surface shows the same content.

mod layout;
mod parser;
mod types;

pub use parser::parse_blocks;
pub use types::{
    Block, CellAlignment, Document, InlineColor, InlineSpan, InlineStyle, LineType, RenderOptions,
    RenderedLine,
};

impl Document {
    /// Render markdown source into a laid-out document.
    ///
    /// Deterministic and infallible with respect to `(source, width, options)`;
    /// malformed markdown degrades to literal text.
    pub fn render(source: &str, width: u16, options: RenderOptions) -> Self {
        let blocks = parser::parse_blocks(source, options);
        let lines = layout::layout_blocks(&blocks, width, options);
        Self::from_parts(source.to_string(), blocks, lines, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_roundtrips_source() {
        let doc = Document::render("# Hi\n\nbody", 80, RenderOptions::default());
        assert_eq!(doc.source(), "# Hi\n\nbody");
        assert!(doc.line_count() >= 2);
    }

    #[test]
    fn test_render_empty_source() {
        let doc = Document::render("", 80, RenderOptions::default());
        assert_eq!(doc.line_count(), 0);
    }

    #[test]
    fn test_render_carries_options() {
        let options = RenderOptions {
            raw_html: true,
            highlight: false,
        };
        let doc = Document::render("text", 80, options);
        assert_eq!(doc.options(), options);
    }
}
