//! Markdown parsing with comrak.
//!
//! The comrak AST is walked once into a [`Block`] tree. Everything downstream
//! (terminal preview, clipboard HTML, PDF pages) renders from that tree.

use comrak::nodes::{AstNode, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};

use super::types::{Block, CellAlignment, InlineSpan, InlineStyle, RenderOptions};

/// Parse markdown source into a block tree.
///
/// Parsing is infallible: malformed markdown degrades to literal text, which
/// is the parsing library's contract, not something re-implemented here.
pub fn parse_blocks(source: &str, options: RenderOptions) -> Vec<Block> {
    let arena = Arena::new();
    let comrak_options = create_options();
    let root = parse_document(&arena, source, &comrak_options);

    let mut blocks = Vec::new();
    for child in root.children() {
        collect_block(child, options, &mut blocks);
    }
    blocks
}

fn create_options() -> Options {
    let mut options = Options::default();

    // GFM extensions
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;

    options
}

fn collect_block<'a>(node: &'a AstNode<'a>, options: RenderOptions, blocks: &mut Vec<Block>) {
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            blocks.push(Block::Heading {
                level: heading.level,
                inlines: collect_inlines(node, options),
            });
        }

        NodeValue::Paragraph => {
            // A paragraph that is nothing but one image becomes an image
            // block; anything else keeps inline images as their alt text.
            if let Some((alt, src)) = sole_image(node) {
                blocks.push(Block::Image { alt, src });
                return;
            }
            let inlines = collect_inlines(node, options);
            if !inlines.is_empty() {
                blocks.push(Block::Paragraph(inlines));
            }
        }

        NodeValue::CodeBlock(code_block) => {
            let language = code_block
                .info
                .split_whitespace()
                .next()
                .filter(|s| !s.is_empty())
                .map(ToString::to_string);
            blocks.push(Block::CodeBlock {
                language,
                literal: code_block.literal.clone(),
            });
        }

        NodeValue::BlockQuote => {
            let mut inner = Vec::new();
            for child in node.children() {
                collect_block(child, options, &mut inner);
            }
            blocks.push(Block::BlockQuote(inner));
        }

        NodeValue::List(list) => {
            let ordered = matches!(list.list_type, comrak::nodes::ListType::Ordered);
            let mut items = Vec::new();
            for item in node.children() {
                let mut item_blocks = Vec::new();
                for child in item.children() {
                    collect_block(child, options, &mut item_blocks);
                }
                items.push(item_blocks);
            }
            blocks.push(Block::List {
                ordered,
                start: list.start,
                items,
            });
        }

        NodeValue::Table(table) => {
            let alignments = table
                .alignments
                .iter()
                .map(|alignment| match alignment {
                    TableAlignment::Center => CellAlignment::Center,
                    TableAlignment::Right => CellAlignment::Right,
                    TableAlignment::None | TableAlignment::Left => CellAlignment::Left,
                })
                .collect();
            let mut rows = Vec::new();
            let mut has_header = false;
            for row in node.children() {
                if let NodeValue::TableRow(header) = &row.data.borrow().value {
                    has_header |= *header;
                    let cells = row
                        .children()
                        .map(|cell| collect_inlines(cell, options))
                        .collect();
                    rows.push(cells);
                }
            }
            blocks.push(Block::Table {
                alignments,
                rows,
                has_header,
            });
        }

        NodeValue::ThematicBreak => blocks.push(Block::Rule),

        NodeValue::HtmlBlock(html) => {
            let literal = html.literal.trim_end().to_string();
            if literal.is_empty() {
                return;
            }
            if options.raw_html {
                blocks.push(Block::HtmlBlock(literal));
            } else {
                // Escaped variant: embedded HTML renders as literal text.
                blocks.push(Block::Paragraph(vec![InlineSpan::new(
                    literal,
                    InlineStyle::default(),
                )]));
            }
        }

        _ => {
            for child in node.children() {
                collect_block(child, options, blocks);
            }
        }
    }
}

/// If the paragraph contains exactly one image and no other visible content,
/// return its `(alt, src)`.
fn sole_image<'a>(node: &'a AstNode<'a>) -> Option<(String, String)> {
    let mut image = None;
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Image(link) => {
                if image.is_some() {
                    return None;
                }
                image = Some((extract_text(child), link.url.clone()));
            }
            NodeValue::Text(text) if text.trim().is_empty() => {}
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            _ => return None,
        }
    }
    image
}

/// Collect the styled inline spans under a node.
fn collect_inlines<'a>(node: &'a AstNode<'a>, options: RenderOptions) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children() {
        collect_inline(child, InlineStyle::default(), None, options, &mut spans);
    }
    spans
}

fn collect_inline<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    href: Option<&str>,
    options: RenderOptions,
    spans: &mut Vec<InlineSpan>,
) {
    let push = |text: String, style: InlineStyle, spans: &mut Vec<InlineSpan>| {
        if text.is_empty() {
            return;
        }
        let span = InlineSpan::new(text, style);
        spans.push(match href {
            Some(url) => span.with_href(url.to_string()),
            None => span,
        });
    };

    match &node.data.borrow().value {
        NodeValue::Text(text) => push(text.clone(), style, spans),
        NodeValue::Code(code) => {
            let mut code_style = style;
            code_style.code = true;
            push(code.literal.clone(), code_style, spans);
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => push(" ".to_string(), style, spans),
        NodeValue::Emph => {
            let mut inner = style;
            inner.emphasis = true;
            for child in node.children() {
                collect_inline(child, inner, href, options, spans);
            }
        }
        NodeValue::Strong => {
            let mut inner = style;
            inner.strong = true;
            for child in node.children() {
                collect_inline(child, inner, href, options, spans);
            }
        }
        NodeValue::Strikethrough => {
            let mut inner = style;
            inner.strikethrough = true;
            for child in node.children() {
                collect_inline(child, inner, href, options, spans);
            }
        }
        NodeValue::Link(link) => {
            for child in node.children() {
                collect_inline(child, style, Some(&link.url), options, spans);
            }
        }
        NodeValue::Image(_) => {
            // Inline image inside a mixed paragraph: keep the alt text.
            let mut inner = style;
            inner.emphasis = true;
            push(extract_text(node), inner, spans);
        }
        NodeValue::HtmlInline(html) => {
            let mut inner = style;
            inner.raw = options.raw_html;
            push(html.clone(), inner, spans);
        }
        _ => {
            for child in node.children() {
                collect_inline(child, style, href, options, spans);
            }
        }
    }
}

/// Extract the concatenated plain text under a node.
fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => out.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push(' '),
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Vec<Block> {
        parse_blocks(source, RenderOptions::default())
    }

    #[test]
    fn test_heading_level_and_text() {
        let blocks = parse("# Title");
        assert_eq!(blocks.len(), 1);
        let Block::Heading { level, inlines } = &blocks[0] else {
            panic!("expected heading, got {:?}", blocks[0]);
        };
        assert_eq!(*level, 1);
        assert_eq!(inlines[0].text(), "Title");
    }

    #[test]
    fn test_paragraph_with_styles() {
        let blocks = parse("some **bold** and *italic* and ~~gone~~ text");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(
            inlines
                .iter()
                .any(|s| s.text() == "bold" && s.style().strong)
        );
        assert!(
            inlines
                .iter()
                .any(|s| s.text() == "italic" && s.style().emphasis)
        );
        assert!(
            inlines
                .iter()
                .any(|s| s.text() == "gone" && s.style().strikethrough)
        );
    }

    #[test]
    fn test_fenced_code_block_language_tag() {
        let blocks = parse("```javascript\nlet x = 1;\n```");
        let Block::CodeBlock { language, literal } = &blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(language.as_deref(), Some("javascript"));
        assert_eq!(literal, "let x = 1;\n");
    }

    #[test]
    fn test_fence_without_language_has_no_tag() {
        let blocks = parse("```\nplain\n```");
        let Block::CodeBlock { language, .. } = &blocks[0] else {
            panic!("expected code block");
        };
        assert!(language.is_none());
    }

    #[test]
    fn test_autolink_extension() {
        let blocks = parse("visit https://example.com today");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(
            inlines
                .iter()
                .any(|s| s.href() == Some("https://example.com"))
        );
    }

    #[test]
    fn test_link_href_attached_to_text() {
        let blocks = parse("[click](https://example.com/page)");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let link = inlines.iter().find(|s| s.text() == "click").unwrap();
        assert_eq!(link.href(), Some("https://example.com/page"));
    }

    #[test]
    fn test_table_rows_and_header() {
        let blocks = parse("| a | b |\n|---|---:|\n| 1 | 2 |");
        let Block::Table {
            alignments,
            rows,
            has_header,
        } = &blocks[0]
        else {
            panic!("expected table, got {:?}", blocks[0]);
        };
        assert!(has_header);
        assert_eq!(rows.len(), 2);
        assert_eq!(alignments[1], CellAlignment::Right);
        assert_eq!(rows[1][1][0].text(), "2");
    }

    #[test]
    fn test_blockquote_nests_blocks() {
        let blocks = parse("> quoted text");
        let Block::BlockQuote(inner) = &blocks[0] else {
            panic!("expected blockquote");
        };
        assert!(matches!(inner[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_ordered_list_start() {
        let blocks = parse("3. three\n4. four");
        let Block::List {
            ordered,
            start,
            items,
        } = &blocks[0]
        else {
            panic!("expected list");
        };
        assert!(ordered);
        assert_eq!(*start, 3);
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_image_paragraph_becomes_image_block() {
        let blocks = parse("![logo](assets/logo.png)");
        assert_eq!(
            blocks[0],
            Block::Image {
                alt: "logo".to_string(),
                src: "assets/logo.png".to_string()
            }
        );
    }

    #[test]
    fn test_html_block_escaped_by_default() {
        let blocks = parse("<div align=\"center\">hi</div>");
        assert!(matches!(blocks[0], Block::Paragraph(_)));
    }

    #[test]
    fn test_html_block_passes_through_when_enabled() {
        let options = RenderOptions {
            raw_html: true,
            ..RenderOptions::default()
        };
        let blocks = parse_blocks("<div align=\"center\">hi</div>", options);
        let Block::HtmlBlock(literal) = &blocks[0] else {
            panic!("expected raw html block, got {:?}", blocks[0]);
        };
        assert!(literal.contains("align=\"center\""));
    }

    #[test]
    fn test_unclosed_emphasis_degrades_to_literal_text() {
        let blocks = parse("an *unmatched emphasis");
        let Block::Paragraph(inlines) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let text: String = inlines.iter().map(InlineSpan::text).collect();
        assert_eq!(text, "an *unmatched emphasis");
    }

    #[test]
    fn test_empty_source_parses_to_no_blocks() {
        assert!(parse("").is_empty());
    }
}
