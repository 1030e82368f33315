//! Core document types.

/// Options controlling how markdown is rendered.
///
/// The two observed presentation variants (raw-HTML passthrough and syntax
/// coloring) are a single configurable rendering mode rather than separate
/// code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Let embedded HTML blocks/inlines pass through to exports verbatim.
    pub raw_html: bool,
    /// Apply syntax coloring to fenced code blocks by language tag.
    pub highlight: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            raw_html: false,
            highlight: true,
        }
    }
}

/// Column alignment of a table cell, from the delimiter row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// A block-level element of the parsed document.
///
/// Blocks are the single source for every downstream rendering: the terminal
/// preview lines, the portable clipboard HTML, and the PDF pages are all
/// produced from this tree, never from each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        inlines: Vec<InlineSpan>,
    },
    Paragraph(Vec<InlineSpan>),
    CodeBlock {
        language: Option<String>,
        literal: String,
    },
    BlockQuote(Vec<Block>),
    List {
        ordered: bool,
        start: usize,
        items: Vec<Vec<Block>>,
    },
    Table {
        alignments: Vec<CellAlignment>,
        /// First row is the header when `has_header` is true.
        rows: Vec<Vec<Vec<InlineSpan>>>,
        has_header: bool,
    },
    Rule,
    Image {
        alt: String,
        src: String,
    },
    /// Raw embedded HTML, present only when passthrough is enabled.
    HtmlBlock(String),
}

/// A parsed and laid-out markdown document.
///
/// Holds the block tree plus terminal lines wrapped at a specific width.
/// Recomputed in full on every edit; rendering is deterministic with respect
/// to `(source, width, options)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    blocks: Vec<Block>,
    lines: Vec<RenderedLine>,
    options: RenderOptions,
}

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            blocks: Vec::new(),
            lines: Vec::new(),
            options: RenderOptions::default(),
        }
    }

    pub(crate) const fn from_parts(
        source: String,
        blocks: Vec<Block>,
        lines: Vec<RenderedLine>,
        options: RenderOptions,
    ) -> Self {
        Self {
            source,
            blocks,
            lines,
            options,
        }
    }

    /// Get the total number of rendered lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Get the block tree.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Rendering options this document was produced with.
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Get visible lines for rendering.
    ///
    /// Returns lines from `offset` to `offset + count`.
    pub fn visible_lines(&self, offset: usize, count: usize) -> Vec<&RenderedLine> {
        self.lines.iter().skip(offset).take(count).collect()
    }

    /// Get a specific rendered line by index.
    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The plain-text rendering of the block tree.
    ///
    /// This is the alternate clipboard representation: the same content as
    /// the HTML payload, stripped of all styling.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        plain_text_blocks(&self.blocks, &mut out, 0);
        while out.ends_with('\n') {
            out.pop();
        }
        out
    }
}

fn plain_text_blocks(blocks: &[Block], out: &mut String, list_depth: usize) {
    for block in blocks {
        match block {
            Block::Heading { inlines, .. } | Block::Paragraph(inlines) => {
                push_inline_text(inlines, out);
                out.push_str("\n\n");
            }
            Block::CodeBlock { literal, .. } => {
                out.push_str(literal);
                if !literal.ends_with('\n') {
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::BlockQuote(inner) => {
                let mut quoted = String::new();
                plain_text_blocks(inner, &mut quoted, list_depth);
                for line in quoted.trim_end().lines() {
                    out.push_str("> ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::List {
                ordered,
                start,
                items,
            } => {
                for (idx, item) in items.iter().enumerate() {
                    let indent = "  ".repeat(list_depth);
                    let marker = if *ordered {
                        format!("{}. ", start + idx)
                    } else {
                        "- ".to_string()
                    };
                    let mut item_text = String::new();
                    plain_text_blocks(item, &mut item_text, list_depth + 1);
                    let trimmed = item_text.trim_end();
                    for (line_idx, line) in trimmed.lines().enumerate() {
                        if line_idx == 0 {
                            out.push_str(&indent);
                            out.push_str(&marker);
                        } else {
                            out.push_str(&indent);
                            out.push_str(&" ".repeat(marker.len()));
                        }
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                out.push('\n');
            }
            Block::Table { rows, .. } => {
                for row in rows {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|cell| {
                            let mut text = String::new();
                            push_inline_text(cell, &mut text);
                            text
                        })
                        .collect();
                    out.push_str(&cells.join(" | "));
                    out.push('\n');
                }
                out.push('\n');
            }
            Block::Rule => out.push_str("---\n\n"),
            Block::Image { alt, src } => {
                if alt.is_empty() {
                    out.push_str(src);
                } else {
                    out.push_str(alt);
                }
                out.push_str("\n\n");
            }
            Block::HtmlBlock(_) => {}
        }
    }
}

fn push_inline_text(inlines: &[InlineSpan], out: &mut String) {
    for span in inlines {
        out.push_str(span.text());
    }
}

/// A single rendered terminal line with styling information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// The text content of the line
    content: String,
    /// The type of line (for styling)
    line_type: LineType,
    /// Optional inline-styled spans for rendering
    spans: Vec<InlineSpan>,
}

impl RenderedLine {
    /// Create a new rendered line.
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
        }
    }

    /// Create a new rendered line with inline spans.
    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans,
        }
    }

    /// Get the text content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the line type.
    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    /// Get inline spans, if present.
    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    /// Raw HTML inline, kept verbatim by the HTML exporter.
    pub raw: bool,
    pub fg: Option<InlineColor>,
}

/// RGB color for inline styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A styled inline span, optionally carrying a link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
    href: Option<String>,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self {
            text,
            style,
            href: None,
        }
    }

    #[must_use]
    pub fn with_href(mut self, href: String) -> Self {
        self.href = Some(href);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    /// Normal paragraph text
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    /// Code block line
    CodeBlock,
    /// Block quote line
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    /// Table row
    Table,
    /// Horizontal rule
    HorizontalRule,
    /// Image placeholder
    Image,
    /// Raw HTML shown verbatim
    Html,
    /// Empty line
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str) -> InlineSpan {
        InlineSpan::new(text.to_string(), InlineStyle::default())
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::empty();
        assert_eq!(doc.line_count(), 0);
        assert!(doc.blocks().is_empty());
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn test_rendered_line_content() {
        let line = RenderedLine::new("Hello".to_string(), LineType::Paragraph);
        assert_eq!(line.content(), "Hello");
        assert_eq!(line.line_type(), &LineType::Paragraph);
        assert!(line.spans().is_none());
    }

    #[test]
    fn test_visible_lines() {
        let lines = vec![
            RenderedLine::new("Line 1".to_string(), LineType::Paragraph),
            RenderedLine::new("Line 2".to_string(), LineType::Paragraph),
            RenderedLine::new("Line 3".to_string(), LineType::Paragraph),
        ];
        let doc = Document::from_parts(
            "source".to_string(),
            Vec::new(),
            lines,
            RenderOptions::default(),
        );

        let visible = doc.visible_lines(1, 2);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].content(), "Line 2");
        assert_eq!(visible[1].content(), "Line 3");
    }

    #[test]
    fn test_visible_lines_beyond_end() {
        let lines = vec![RenderedLine::new("Line 1".to_string(), LineType::Paragraph)];
        let doc = Document::from_parts(
            "source".to_string(),
            Vec::new(),
            lines,
            RenderOptions::default(),
        );
        assert_eq!(doc.visible_lines(0, 10).len(), 1);
    }

    #[test]
    fn test_plain_text_paragraphs_and_heading() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                inlines: vec![span("Title")],
            },
            Block::Paragraph(vec![span("Body text.")]),
        ];
        let doc = Document::from_parts(
            String::new(),
            blocks,
            Vec::new(),
            RenderOptions::default(),
        );
        assert_eq!(doc.plain_text(), "Title\n\nBody text.");
    }

    #[test]
    fn test_plain_text_blockquote_prefixes_lines() {
        let blocks = vec![Block::BlockQuote(vec![Block::Paragraph(vec![span(
            "quoted",
        )])])];
        let doc = Document::from_parts(
            String::new(),
            blocks,
            Vec::new(),
            RenderOptions::default(),
        );
        assert_eq!(doc.plain_text(), "> quoted");
    }

    #[test]
    fn test_plain_text_ordered_list_numbers_from_start() {
        let blocks = vec![Block::List {
            ordered: true,
            start: 3,
            items: vec![
                vec![Block::Paragraph(vec![span("three")])],
                vec![Block::Paragraph(vec![span("four")])],
            ],
        }];
        let doc = Document::from_parts(
            String::new(),
            blocks,
            Vec::new(),
            RenderOptions::default(),
        );
        assert_eq!(doc.plain_text(), "3. three\n4. four");
    }

    #[test]
    fn test_plain_text_skips_raw_html() {
        let blocks = vec![
            Block::HtmlBlock("<div>x</div>".to_string()),
            Block::Paragraph(vec![span("visible")]),
        ];
        let doc = Document::from_parts(
            String::new(),
            blocks,
            Vec::new(),
            RenderOptions::default(),
        );
        assert_eq!(doc.plain_text(), "visible");
    }

    #[test]
    fn test_plain_text_table_uses_pipes() {
        let blocks = vec![Block::Table {
            alignments: vec![CellAlignment::Left, CellAlignment::Left],
            rows: vec![
                vec![vec![span("a")], vec![span("b")]],
                vec![vec![span("1")], vec![span("2")]],
            ],
            has_header: true,
        }];
        let doc = Document::from_parts(
            String::new(),
            blocks,
            Vec::new(),
            RenderOptions::default(),
        );
        assert_eq!(doc.plain_text(), "a | b\n1 | 2");
    }

    #[test]
    fn test_default_render_options() {
        let options = RenderOptions::default();
        assert!(!options.raw_html);
        assert!(options.highlight);
    }
}
