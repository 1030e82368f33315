//! Terminal layout: flatten the block tree into styled, wrapped lines.

use unicode_width::UnicodeWidthStr;

use super::types::{
    Block, CellAlignment, InlineSpan, InlineStyle, LineType, RenderOptions, RenderedLine,
};

const CODE_RIGHT_PADDING: usize = 3;

/// Lay out blocks as terminal lines wrapped at `width` columns.
pub fn layout_blocks(blocks: &[Block], width: u16, options: RenderOptions) -> Vec<RenderedLine> {
    let wrap_width = usize::from(width.max(1));
    let mut lines = Vec::new();
    for block in blocks {
        layout_block(block, wrap_width, options, 0, None, &mut lines);
    }
    // Trim the trailing blank separator so the preview ends on content.
    while lines
        .last()
        .is_some_and(|line| matches!(line.line_type(), LineType::Empty))
    {
        lines.pop();
    }
    lines
}

fn layout_block(
    block: &Block,
    wrap_width: usize,
    options: RenderOptions,
    list_depth: usize,
    list_marker: Option<&str>,
    lines: &mut Vec<RenderedLine>,
) {
    match block {
        Block::Heading { level, inlines } => {
            // Keep headings visually separated with two rows above.
            if !lines.is_empty() {
                ensure_trailing_empty_lines(lines, 2);
            }
            let text: String = inlines.iter().map(InlineSpan::text).collect();
            let prefix = "#".repeat(usize::from(*level));
            lines.push(RenderedLine::new(
                format!("{prefix} {text}"),
                LineType::Heading(*level),
            ));
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::Paragraph(inlines) => {
            let (prefix_first, prefix_next) = list_prefixes(list_depth, list_marker);
            let line_type = if list_marker.is_some() {
                LineType::ListItem(list_depth)
            } else {
                LineType::Paragraph
            };
            for line_spans in wrap_spans(inlines, wrap_width, &prefix_first, &prefix_next) {
                let content = spans_to_string(&line_spans);
                lines.push(RenderedLine::with_spans(content, line_type, line_spans));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::CodeBlock { language, literal } => {
            layout_code_block(language.as_deref(), literal, wrap_width, options, lines);
        }

        Block::BlockQuote(inner) => {
            layout_blockquote(inner, wrap_width, options, 1, lines);
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::List {
            ordered,
            start,
            items,
        } => {
            let max_number = start + items.len().saturating_sub(1);
            let number_width = max_number.to_string().len();
            for (index, item) in items.iter().enumerate() {
                let marker = if *ordered {
                    format!("{:>width$}. ", start + index, width = number_width)
                } else {
                    "• ".to_string()
                };
                let mut first = true;
                for child in item {
                    // Only the item's first block carries the marker.
                    let marker = if first { Some(marker.as_str()) } else { None };
                    first = false;
                    layout_list_child(child, wrap_width, options, list_depth + 1, marker, lines);
                }
            }
            if list_marker.is_none() {
                lines.push(RenderedLine::new(String::new(), LineType::Empty));
            }
        }

        Block::Table {
            alignments,
            rows,
            has_header,
        } => {
            for line in render_table(alignments, rows, *has_header, wrap_width) {
                lines.push(RenderedLine::new(line, LineType::Table));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::Rule => {
            lines.push(RenderedLine::new(
                "---".to_string(),
                LineType::HorizontalRule,
            ));
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::Image { alt, src } => {
            let label = if alt.is_empty() { src } else { alt };
            lines.push(RenderedLine::new(
                format!("[Image: {label}]"),
                LineType::Image,
            ));
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }

        Block::HtmlBlock(html) => {
            for raw_line in html.lines() {
                lines.push(RenderedLine::new(raw_line.to_string(), LineType::Html));
            }
            lines.push(RenderedLine::new(String::new(), LineType::Empty));
        }
    }
}

fn ensure_trailing_empty_lines(lines: &mut Vec<RenderedLine>, count: usize) {
    let existing = lines
        .iter()
        .rev()
        .take_while(|line| matches!(line.line_type(), LineType::Empty))
        .count();
    for _ in existing..count {
        lines.push(RenderedLine::new(String::new(), LineType::Empty));
    }
}

fn layout_list_child(
    block: &Block,
    wrap_width: usize,
    options: RenderOptions,
    list_depth: usize,
    marker: Option<&str>,
    lines: &mut Vec<RenderedLine>,
) {
    match block {
        Block::Paragraph(_) | Block::List { .. } => {
            layout_block(block, wrap_width, options, list_depth, marker, lines);
            // Tight list items don't get the paragraph's blank separator.
            if matches!(block, Block::Paragraph(_))
                && lines
                    .last()
                    .is_some_and(|line| matches!(line.line_type(), LineType::Empty))
            {
                lines.pop();
            }
        }
        _ => layout_block(block, wrap_width, options, list_depth, None, lines),
    }
}

fn list_prefixes(list_depth: usize, list_marker: Option<&str>) -> (String, String) {
    match list_marker {
        Some(marker) => {
            let indent = "  ".repeat(list_depth.saturating_sub(1));
            (
                format!("{indent}{marker}"),
                format!("{indent}{}", " ".repeat(marker.chars().count())),
            )
        }
        None if list_depth > 0 => {
            let indent = "  ".repeat(list_depth);
            (indent.clone(), indent)
        }
        None => (String::new(), String::new()),
    }
}

fn layout_code_block(
    language: Option<&str>,
    literal: &str,
    wrap_width: usize,
    options: RenderOptions,
    lines: &mut Vec<RenderedLine>,
) {
    let content_width = literal
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .min(wrap_width.saturating_sub(4).max(1));
    let title = language.unwrap_or("code");
    let label = format!(" {title} ");
    let frame_inner_width = content_width + 2 + CODE_RIGHT_PADDING;
    let top_label_width = frame_inner_width.min(label.chars().count());
    let visible_label: String = label.chars().take(top_label_width).collect();
    let top = format!(
        "┌{}{}┐",
        visible_label,
        "─".repeat(frame_inner_width.saturating_sub(visible_label.chars().count()))
    );
    lines.push(RenderedLine::new(top, LineType::CodeBlock));

    let highlighted = if options.highlight {
        crate::highlight::highlight_code(language, literal)
    } else {
        crate::highlight::plain_code(literal)
    };

    for line_spans in highlighted {
        let trimmed_spans = truncate_spans(&line_spans, content_width);
        let trimmed_len = spans_char_len(&trimmed_spans);
        let padding = " ".repeat(content_width.saturating_sub(trimmed_len) + CODE_RIGHT_PADDING);

        let mut framed = Vec::new();
        framed.push(InlineSpan::new("│ ".to_string(), InlineStyle::default()));
        framed.extend(trimmed_spans);
        framed.push(InlineSpan::new(
            format!("{padding} │"),
            InlineStyle::default(),
        ));
        let content = spans_to_string(&framed);
        lines.push(RenderedLine::with_spans(
            content,
            LineType::CodeBlock,
            framed,
        ));
    }

    lines.push(RenderedLine::new(
        format!("└{}┘", "─".repeat(frame_inner_width)),
        LineType::CodeBlock,
    ));
    lines.push(RenderedLine::new(String::new(), LineType::Empty));
}

fn layout_blockquote(
    blocks: &[Block],
    wrap_width: usize,
    options: RenderOptions,
    quote_depth: usize,
    lines: &mut Vec<RenderedLine>,
) {
    let prefix = quote_prefix(quote_depth);

    for block in blocks {
        match block {
            Block::Paragraph(inlines) => {
                for line_spans in wrap_spans(inlines, wrap_width, &prefix, &prefix) {
                    let content = spans_to_string(&line_spans);
                    lines.push(RenderedLine::with_spans(
                        content,
                        LineType::BlockQuote,
                        line_spans,
                    ));
                }
            }
            Block::BlockQuote(inner) => {
                layout_blockquote(inner, wrap_width, options, quote_depth + 1, lines);
            }
            other => {
                // Flatten nested structures to prefixed plain text.
                let mut inner_lines = Vec::new();
                layout_block(other, wrap_width, options, 0, None, &mut inner_lines);
                for inner in inner_lines {
                    if matches!(inner.line_type(), LineType::Empty) {
                        continue;
                    }
                    lines.push(RenderedLine::new(
                        format!("{prefix}{}", inner.content()),
                        LineType::BlockQuote,
                    ));
                }
            }
        }
    }
}

fn quote_prefix(depth: usize) -> String {
    let mut prefix = String::new();
    for _ in 0..depth {
        prefix.push('│');
        prefix.push(' ');
    }
    prefix
}

fn render_table(
    alignments: &[CellAlignment],
    rows: &[Vec<Vec<InlineSpan>>],
    has_header: bool,
    wrap_width: usize,
) -> Vec<String> {
    if rows.is_empty() {
        return Vec::new();
    }

    let mut cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.iter().map(InlineSpan::text).collect::<String>())
                .collect()
        })
        .collect();

    let num_cols = cells.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 {
        return Vec::new();
    }
    for row in &mut cells {
        while row.len() < num_cols {
            row.push(String::new());
        }
    }

    let mut col_widths = vec![1_usize; num_cols];
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            col_widths[idx] = col_widths[idx].max(cell.width());
        }
    }

    // Keep the table inside available width.
    // Table row width is: 1 + sum(col_width + 3) for all columns.
    let max_table_width = wrap_width.max(4);
    while 1 + col_widths.iter().sum::<usize>() + (3 * num_cols) > max_table_width {
        if let Some((widest_idx, _)) = col_widths.iter().enumerate().max_by_key(|(_, w)| *w) {
            if col_widths[widest_idx] > 1 {
                col_widths[widest_idx] -= 1;
            } else {
                break;
            }
        }
    }

    let top = render_table_border(&col_widths, '┌', '┬', '┐');
    let mid = render_table_border(&col_widths, '├', '┼', '┤');
    let bottom = render_table_border(&col_widths, '└', '┴', '┘');

    let mut lines = Vec::new();
    lines.push(top);
    for (idx, row) in cells.iter().enumerate() {
        lines.push(render_table_row(row, &col_widths, alignments));
        if has_header && idx == 0 {
            lines.push(mid.clone());
        }
    }
    lines.push(bottom);
    lines
}

fn render_table_border(col_widths: &[usize], left: char, sep: char, right: char) -> String {
    let mut out = String::new();
    out.push(left);
    for (idx, width) in col_widths.iter().enumerate() {
        if idx > 0 {
            out.push(sep);
        }
        out.push_str(&"─".repeat(width + 2));
    }
    out.push(right);
    out
}

fn render_table_row(
    row: &[String],
    col_widths: &[usize],
    alignments: &[CellAlignment],
) -> String {
    let mut out = String::new();
    out.push('│');
    for (idx, cell) in row.iter().enumerate() {
        let width = col_widths[idx];
        let text = truncate_to_width(cell, width);
        let pad = width.saturating_sub(text.width());
        let (left_pad, right_pad) = match alignments.get(idx).copied().unwrap_or_default() {
            CellAlignment::Left => (0, pad),
            CellAlignment::Right => (pad, 0),
            CellAlignment::Center => (pad / 2, pad - pad / 2),
        };
        out.push(' ');
        out.push_str(&" ".repeat(left_pad));
        out.push_str(&text);
        out.push_str(&" ".repeat(right_pad));
        out.push(' ');
        out.push('│');
    }
    out
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    for ch in text.chars() {
        let mut candidate = out.clone();
        candidate.push(ch);
        if candidate.width() > max_width {
            break;
        }
        out = candidate;
    }
    out
}

/// Word-wrap styled spans into lines of at most `wrap_width` columns.
///
/// `prefix_first` starts the first line, `prefix_next` each continuation.
pub(crate) fn wrap_spans(
    spans: &[InlineSpan],
    wrap_width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let atoms = tokenize(spans);
    if atoms.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<Vec<InlineSpan>> = Vec::new();
    let mut current: Vec<InlineSpan> = Vec::new();
    let mut current_width = 0_usize;
    let mut avail = wrap_width.saturating_sub(prefix_first.width()).max(1);

    let flush =
        |current: &mut Vec<InlineSpan>, lines: &mut Vec<Vec<InlineSpan>>, avail: &mut usize| {
            let prefix = if lines.is_empty() {
                prefix_first
            } else {
                prefix_next
            };
            let mut line = Vec::new();
            if !prefix.is_empty() {
                line.push(InlineSpan::new(prefix.to_string(), InlineStyle::default()));
            }
            line.extend(merge_atoms(std::mem::take(current)));
            lines.push(line);
            *avail = wrap_width.saturating_sub(prefix_next.width()).max(1);
        };

    for atom in atoms {
        let atom_width = atom.text().width();
        let is_space = atom.text() == " ";

        if is_space && current.is_empty() {
            continue;
        }
        if current_width + atom_width > avail && !current.is_empty() {
            if is_space {
                continue;
            }
            // Drop a trailing space before breaking.
            if current.last().is_some_and(|s| s.text() == " ") {
                current.pop();
                current_width = current_width.saturating_sub(1);
            }
            flush(&mut current, &mut lines, &mut avail);
            current_width = 0;
        }
        if atom_width > avail {
            // A single word wider than the line: hard-split by characters.
            let mut piece = String::new();
            for ch in atom.text().chars() {
                let mut candidate = piece.clone();
                candidate.push(ch);
                if candidate.width() + current_width > avail && !piece.is_empty() {
                    current.push(restyle(&atom, piece.clone()));
                    flush(&mut current, &mut lines, &mut avail);
                    current_width = 0;
                    piece = ch.to_string();
                } else {
                    piece = candidate;
                }
            }
            if !piece.is_empty() {
                current_width += piece.width();
                current.push(restyle(&atom, piece));
            }
            continue;
        }
        current_width += atom_width;
        current.push(atom);
    }

    if current.last().is_some_and(|s| s.text() == " ") {
        current.pop();
    }
    if !current.is_empty() {
        flush(&mut current, &mut lines, &mut avail);
    }
    lines
}

fn restyle(atom: &InlineSpan, text: String) -> InlineSpan {
    let span = InlineSpan::new(text, atom.style());
    match atom.href() {
        Some(url) => span.with_href(url.to_string()),
        None => span,
    }
}

/// Split spans into word and single-space atoms, preserving style and href.
fn tokenize(spans: &[InlineSpan]) -> Vec<InlineSpan> {
    let mut atoms = Vec::new();
    for span in spans {
        let mut word = String::new();
        for ch in span.text().chars() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    atoms.push(restyle(span, std::mem::take(&mut word)));
                }
                if atoms.last().is_none_or(|a: &InlineSpan| a.text() != " ") {
                    atoms.push(restyle(span, " ".to_string()));
                }
            } else {
                word.push(ch);
            }
        }
        if !word.is_empty() {
            atoms.push(restyle(span, word));
        }
    }
    atoms
}

/// Merge adjacent atoms with identical style and link target.
fn merge_atoms(atoms: Vec<InlineSpan>) -> Vec<InlineSpan> {
    let mut merged: Vec<InlineSpan> = Vec::new();
    for atom in atoms {
        if let Some(last) = merged.last_mut() {
            if last.style() == atom.style() && last.href() == atom.href() {
                let text = format!("{}{}", last.text(), atom.text());
                *last = restyle(&atom, text);
                continue;
            }
        }
        merged.push(atom);
    }
    merged
}

fn truncate_spans(spans: &[InlineSpan], max_len: usize) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut remaining = max_len;
    for span in spans {
        if remaining == 0 {
            break;
        }
        let taken: String = span.text().chars().take(remaining).collect();
        let count = taken.chars().count();
        if count > 0 {
            out.push(InlineSpan::new(taken, span.style()));
            remaining -= count;
        }
    }
    out
}

fn spans_char_len(spans: &[InlineSpan]) -> usize {
    spans.iter().map(|s| s.text().chars().count()).sum()
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    let mut content = String::new();
    for span in spans {
        content.push_str(span.text());
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn render(source: &str) -> Document {
        Document::render(source, 80, RenderOptions::default())
    }

    #[test]
    fn test_title_renders_as_level_one_heading() {
        let doc = render("# Title");
        let heading = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .find(|line| matches!(line.line_type(), LineType::Heading(1)))
            .expect("level-1 heading line");
        assert!(heading.content().contains("Title"));
    }

    #[test]
    fn test_javascript_fence_gets_code_styling() {
        let doc = render("```javascript\nlet x = 1;\n```");
        let code_lines: Vec<_> = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .filter(|line| matches!(line.line_type(), LineType::CodeBlock))
            .collect();
        // Frame top carries the language tag.
        assert!(code_lines[0].content().contains("javascript"));
        // Body line is syntax colored.
        let colored = code_lines
            .iter()
            .filter_map(|line| line.spans())
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(colored, "expected colored spans for javascript fence");
    }

    #[test]
    fn test_plain_code_variant_has_no_colors() {
        let options = RenderOptions {
            highlight: false,
            ..RenderOptions::default()
        };
        let doc = Document::render("```javascript\nlet x = 1;\n```", 80, options);
        let colored = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .filter_map(RenderedLine::spans)
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(!colored);
    }

    #[test]
    fn test_blockquote_lines_carry_quote_gutter() {
        let doc = render("> quoted words");
        let quote = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .find(|line| matches!(line.line_type(), LineType::BlockQuote))
            .expect("blockquote line");
        assert!(quote.content().starts_with("│ "));
        assert!(quote.content().contains("quoted words"));
    }

    #[test]
    fn test_paragraph_wraps_at_width() {
        let doc = Document::render(
            "alpha beta gamma delta epsilon zeta",
            12,
            RenderOptions::default(),
        );
        for line in doc.visible_lines(0, doc.line_count()) {
            assert!(line.content().width() <= 12, "line too wide: {:?}", line);
        }
        assert!(doc.line_count() > 1);
    }

    #[test]
    fn test_long_word_hard_splits() {
        let doc = Document::render(&"x".repeat(30), 10, RenderOptions::default());
        assert!(doc.line_count() >= 3);
        for line in doc.visible_lines(0, doc.line_count()) {
            assert!(line.content().width() <= 10);
        }
    }

    #[test]
    fn test_bullet_list_markers() {
        let doc = render("- one\n- two");
        let items: Vec<_> = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .filter(|line| matches!(line.line_type(), LineType::ListItem(_)))
            .collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].content().starts_with("• "));
    }

    #[test]
    fn test_ordered_list_aligns_numbers() {
        let doc = render("1. one\n2. two\n3. three");
        let first = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .find(|line| matches!(line.line_type(), LineType::ListItem(_)))
            .unwrap()
            .content()
            .to_string();
        assert!(first.starts_with("1. "));
    }

    #[test]
    fn test_table_has_borders_and_header_rule() {
        let doc = render("| a | b |\n|---|---|\n| 1 | 2 |");
        let table: Vec<_> = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .filter(|line| matches!(line.line_type(), LineType::Table))
            .map(|line| line.content().to_string())
            .collect();
        assert!(table[0].starts_with('┌'));
        assert!(table.iter().any(|line| line.starts_with('├')));
        assert!(table.last().unwrap().starts_with('└'));
    }

    #[test]
    fn test_wide_table_is_clamped() {
        let doc = Document::render(
            "| aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa | bbbbbbbbbbbbbbbbbbbbbbbbbbbbb |\n|---|---|\n| 1 | 2 |",
            30,
            RenderOptions::default(),
        );
        for line in doc.visible_lines(0, doc.line_count()) {
            assert!(line.content().width() <= 30);
        }
    }

    #[test]
    fn test_image_placeholder_line() {
        let doc = render("![diagram](assets/d.png)");
        let image = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .find(|line| matches!(line.line_type(), LineType::Image))
            .unwrap();
        assert_eq!(image.content(), "[Image: diagram]");
    }

    #[test]
    fn test_raw_html_lines_when_passthrough_enabled() {
        let options = RenderOptions {
            raw_html: true,
            ..RenderOptions::default()
        };
        let doc = Document::render("<div>\nhello\n</div>", 80, options);
        let html: Vec<_> = doc
            .visible_lines(0, doc.line_count())
            .into_iter()
            .filter(|line| matches!(line.line_type(), LineType::Html))
            .collect();
        assert_eq!(html.len(), 3);
    }

    #[test]
    fn test_wrap_spans_preserves_href() {
        let spans = vec![
            InlineSpan::new("see ".to_string(), InlineStyle::default()),
            InlineSpan::new("the docs".to_string(), InlineStyle::default())
                .with_href("https://example.com".to_string()),
        ];
        let wrapped = wrap_spans(&spans, 40, "", "");
        let hrefs: Vec<_> = wrapped[0]
            .iter()
            .filter(|s| s.href() == Some("https://example.com"))
            .collect();
        assert!(!hrefs.is_empty());
    }

    #[test]
    fn test_wrap_spans_continuation_prefix() {
        let spans = vec![InlineSpan::new(
            "one two three four five six".to_string(),
            InlineStyle::default(),
        )];
        let wrapped = wrap_spans(&spans, 12, "> ", "| ");
        assert!(wrapped.len() > 1);
        assert_eq!(wrapped[0][0].text(), "> ");
        assert_eq!(wrapped[1][0].text(), "| ");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Rendering is pure in the source string: same input, same output.
            #[test]
            fn render_is_deterministic(source in ".{0,400}") {
                let a = Document::render(&source, 60, RenderOptions::default());
                let b = Document::render(&source, 60, RenderOptions::default());
                prop_assert_eq!(a, b);
            }

            #[test]
            fn render_never_panics_and_respects_width(source in ".{0,400}") {
                let doc = Document::render(&source, 24, RenderOptions { raw_html: false, highlight: false });
                for line in doc.visible_lines(0, doc.line_count()) {
                    // Code frames add two border columns outside the budget;
                    // everything else must fit.
                    if matches!(line.line_type(), LineType::Paragraph) {
                        prop_assert!(line.content().width() <= 24);
                    }
                }
            }
        }
    }
}
