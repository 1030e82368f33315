//! Portable HTML rendering of a document's block tree.
//!
//! The payload ships on the clipboard into arbitrary editors, so every
//! presentation rule it relies on is inlined: code blocks carry their
//! background, padding, monospace font and overflow handling; blockquotes
//! carry their left border, italics and muted color. Nothing here touches
//! rendered preview state — the HTML is built from the blocks themselves.

use std::fmt::Write;

use crate::document::{Block, CellAlignment, Document, InlineSpan, RenderOptions};
use crate::highlight::{self, ColorScheme};

const CODE_BLOCK_STYLE: &str = "background:#f6f8fa;padding:12px;border-radius:6px;overflow:auto";
const CODE_FONT_STYLE: &str =
    "font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace;font-size:0.9em";
const INLINE_CODE_STYLE: &str = "background:#f6f8fa;padding:2px 5px;border-radius:4px;\
     font-family:ui-monospace,SFMono-Regular,Menlo,Consolas,monospace;font-size:0.9em";
const BLOCKQUOTE_STYLE: &str =
    "border-left:4px solid #d0d7de;margin:0 0 16px 0;padding:0 0 0 14px;\
     color:#57606a;font-style:italic";
const TABLE_STYLE: &str = "border-collapse:collapse;margin-bottom:16px";
const CELL_STYLE: &str = "border:1px solid #d0d7de;padding:5px 12px";

/// Render the document as a self-contained HTML fragment.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    write_blocks(doc.blocks(), doc.options(), &mut out);
    out
}

fn write_blocks(blocks: &[Block], options: RenderOptions, out: &mut String) {
    for block in blocks {
        match block {
            Block::Heading { level, inlines } => {
                let level = (*level).clamp(1, 6);
                let _ = write!(out, "<h{level}>");
                write_inlines(inlines, out);
                let _ = writeln!(out, "</h{level}>");
            }

            Block::Paragraph(inlines) => {
                out.push_str("<p>");
                write_inlines(inlines, out);
                out.push_str("</p>\n");
            }

            Block::CodeBlock { language, literal } => {
                write_code_block(language.as_deref(), literal, options, out);
            }

            Block::BlockQuote(inner) => {
                let _ = writeln!(out, "<blockquote style=\"{BLOCKQUOTE_STYLE}\">");
                write_blocks(inner, options, out);
                out.push_str("</blockquote>\n");
            }

            Block::List {
                ordered,
                start,
                items,
            } => {
                if *ordered {
                    if *start == 1 {
                        out.push_str("<ol>\n");
                    } else {
                        let _ = writeln!(out, "<ol start=\"{start}\">");
                    }
                } else {
                    out.push_str("<ul>\n");
                }
                for item in items {
                    out.push_str("<li>");
                    write_list_item(item, options, out);
                    out.push_str("</li>\n");
                }
                out.push_str(if *ordered { "</ol>\n" } else { "</ul>\n" });
            }

            Block::Table {
                alignments,
                rows,
                has_header,
            } => write_table(alignments, rows, *has_header, out),

            Block::Rule => out.push_str("<hr/>\n"),

            Block::Image { alt, src } => {
                let _ = writeln!(
                    out,
                    "<img src=\"{}\" alt=\"{}\" style=\"max-width:100%\"/>",
                    escape_attr(src),
                    escape_attr(alt)
                );
            }

            Block::HtmlBlock(html) => {
                out.push_str(html);
                out.push('\n');
            }
        }
    }
}

/// List items keep single paragraphs inline so `<li>` content stays tight.
fn write_list_item(blocks: &[Block], options: RenderOptions, out: &mut String) {
    match blocks {
        [Block::Paragraph(inlines)] => write_inlines(inlines, out),
        [Block::Paragraph(inlines), rest @ ..] => {
            write_inlines(inlines, out);
            out.push('\n');
            write_blocks(rest, options, out);
        }
        _ => write_blocks(blocks, options, out),
    }
}

fn write_code_block(
    language: Option<&str>,
    literal: &str,
    options: RenderOptions,
    out: &mut String,
) {
    let _ = write!(out, "<pre style=\"{CODE_BLOCK_STYLE}\">");
    match language {
        Some(lang) => {
            let _ = write!(
                out,
                "<code class=\"language-{}\" style=\"{CODE_FONT_STYLE}\">",
                escape_attr(lang)
            );
        }
        None => {
            let _ = write!(out, "<code style=\"{CODE_FONT_STYLE}\">");
        }
    }

    if options.highlight && language.is_some() {
        // Force the light palette: the payload lands on white backgrounds.
        let lines = highlight::highlight_code_with(language, literal, ColorScheme::Light);
        for (idx, spans) in lines.iter().enumerate() {
            if idx > 0 {
                out.push('\n');
            }
            for span in spans {
                match span.style().fg {
                    Some(color) => {
                        let _ = write!(
                            out,
                            "<span style=\"color:#{:02x}{:02x}{:02x}\">",
                            color.r, color.g, color.b
                        );
                        escape_html(span.text(), out);
                        out.push_str("</span>");
                    }
                    None => escape_html(span.text(), out),
                }
            }
        }
    } else {
        escape_html(literal.trim_end_matches('\n'), out);
    }
    out.push_str("</code></pre>\n");
}

fn write_table(
    alignments: &[CellAlignment],
    rows: &[Vec<Vec<InlineSpan>>],
    has_header: bool,
    out: &mut String,
) {
    let _ = writeln!(out, "<table style=\"{TABLE_STYLE}\">");
    for (row_idx, row) in rows.iter().enumerate() {
        let header = has_header && row_idx == 0;
        out.push_str("<tr>");
        for (col_idx, cell) in row.iter().enumerate() {
            let tag = if header { "th" } else { "td" };
            let align = match alignments.get(col_idx).copied().unwrap_or_default() {
                CellAlignment::Left => "left",
                CellAlignment::Center => "center",
                CellAlignment::Right => "right",
            };
            let _ = write!(out, "<{tag} style=\"{CELL_STYLE};text-align:{align}\">");
            write_inlines(cell, out);
            let _ = write!(out, "</{tag}>");
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

fn write_inlines(inlines: &[InlineSpan], out: &mut String) {
    for span in inlines {
        let style = span.style();

        if style.raw {
            out.push_str(span.text());
            continue;
        }

        let mut close = Vec::new();
        if let Some(href) = span.href() {
            let _ = write!(out, "<a href=\"{}\">", escape_attr(href));
            close.push("</a>");
        }
        if style.strong {
            out.push_str("<strong>");
            close.push("</strong>");
        }
        if style.emphasis {
            out.push_str("<em>");
            close.push("</em>");
        }
        if style.strikethrough {
            out.push_str("<del>");
            close.push("</del>");
        }
        if style.code {
            let _ = write!(out, "<code style=\"{INLINE_CODE_STYLE}\">");
            close.push("</code>");
        }

        escape_html(span.text(), out);

        for tag in close.into_iter().rev() {
            out.push_str(tag);
        }
    }
}

fn escape_html(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RenderOptions;

    fn html_for(source: &str) -> String {
        let doc = Document::render(source, 80, RenderOptions::default());
        to_html(&doc)
    }

    #[test]
    fn test_heading_tag() {
        let html = html_for("# Title");
        assert!(html.contains("<h1>Title</h1>"));
    }

    #[test]
    fn test_inline_styles_render_tags() {
        let html = html_for("**bold** *em* ~~gone~~ `x`");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains(">x</code>"));
    }

    #[test]
    fn test_code_block_is_self_contained() {
        let html = html_for("```\nlet x = 1;\n```");
        assert!(html.contains("background:#f6f8fa"));
        assert!(html.contains("padding:12px"));
        assert!(html.contains("overflow:auto"));
        assert!(html.contains("font-family:ui-monospace"));
    }

    #[test]
    fn test_code_block_language_class_and_colors() {
        let html = html_for("```javascript\nlet x = 1;\n```");
        assert!(html.contains("language-javascript"));
        assert!(html.contains("<span style=\"color:#"));
    }

    #[test]
    fn test_blockquote_is_self_contained() {
        let html = html_for("> wise words");
        assert!(html.contains("<blockquote"));
        assert!(html.contains("border-left:4px solid"));
        assert!(html.contains("font-style:italic"));
        assert!(html.contains("color:#57606a"));
        assert!(html.contains("wise words"));
    }

    #[test]
    fn test_link_href() {
        let html = html_for("[docs](https://example.com)");
        assert!(html.contains("<a href=\"https://example.com\">docs</a>"));
    }

    #[test]
    fn test_table_alignment() {
        let html = html_for("| a | b |\n|---|---:|\n| 1 | 2 |");
        assert!(html.contains("<th"));
        assert!(html.contains("text-align:right"));
        assert!(html.contains("border:1px solid"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = html_for("a < b & c > d");
        assert!(html.contains("a &lt; b &amp; c &gt; d"));
    }

    #[test]
    fn test_html_escaped_without_passthrough() {
        let html = html_for("<div class=\"x\">hi</div>");
        assert!(!html.contains("<div class"));
        assert!(html.contains("&lt;div"));
    }

    #[test]
    fn test_html_passthrough_when_enabled() {
        let options = RenderOptions {
            raw_html: true,
            ..RenderOptions::default()
        };
        let doc = Document::render("<div class=\"x\">hi</div>", 80, options);
        let html = to_html(&doc);
        assert!(html.contains("<div class=\"x\">hi</div>"));
    }

    #[test]
    fn test_ordered_list_start_attribute() {
        let html = html_for("3. three\n4. four");
        assert!(html.contains("<ol start=\"3\">"));
        assert!(html.contains("<li>three</li>"));
    }

    #[test]
    fn test_image_tag() {
        let html = html_for("![logo](assets/logo.png)");
        assert!(html.contains("<img src=\"assets/logo.png\" alt=\"logo\""));
    }
}
