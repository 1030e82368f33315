//! Theming and color definitions.
//!
//! Styling for rendered markdown elements in the preview pane. Uses semantic
//! ANSI colors that respect the terminal's palette, with darker indexed
//! alternatives for light backgrounds.

use ratatui::style::{Color, Modifier, Style};

use crate::document::{InlineStyle, LineType};

/// Get the style for a given line type.
pub fn style_for_line_type(line_type: &LineType) -> Style {
    let light_bg = crate::highlight::is_light_background();
    match line_type {
        // Headings - bold with distinct colors per level
        LineType::Heading(1) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Cyan
            })
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineType::Heading(2) => Style::default()
            .fg(if light_bg {
                Color::Indexed(22)
            } else {
                Color::Green
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(3) => Style::default()
            .fg(if light_bg {
                Color::Indexed(58)
            } else {
                Color::Yellow
            })
            .add_modifier(Modifier::BOLD),
        LineType::Heading(_) => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Blue
            })
            .add_modifier(Modifier::BOLD),

        // Code blocks - dimmer color for the frame, spans override
        LineType::CodeBlock => Style::default()
            .fg(if light_bg {
                Color::Indexed(238)
            } else {
                Color::Indexed(245)
            })
            .add_modifier(Modifier::DIM),

        // Block quotes - the fixed treatment: border gutter, italic, muted
        LineType::BlockQuote => Style::default()
            .fg(if light_bg {
                Color::Indexed(24)
            } else {
                Color::Blue
            })
            .add_modifier(Modifier::ITALIC),

        // Horizontal rule - dim
        LineType::HorizontalRule => Style::default()
            .fg(if light_bg {
                Color::Indexed(241)
            } else {
                Color::Indexed(240)
            })
            .add_modifier(Modifier::DIM),

        // Images - magenta italic to stand out as placeholder
        LineType::Image => Style::default()
            .fg(if light_bg {
                Color::Indexed(90)
            } else {
                Color::Magenta
            })
            .add_modifier(Modifier::ITALIC),

        // Raw HTML passthrough - dim, it only matters for exports
        LineType::Html => Style::default()
            .fg(if light_bg {
                Color::Indexed(244)
            } else {
                Color::Indexed(242)
            })
            .add_modifier(Modifier::DIM),

        // List items, tables, paragraphs, empty lines - normal style
        LineType::ListItem(_) | LineType::Table | LineType::Paragraph | LineType::Empty => {
            Style::default()
        }
    }
}

/// Get the style for an inline span, merged with a base line style.
pub fn style_for_inline(base: Style, span: &crate::document::InlineSpan) -> Style {
    let inline: InlineStyle = span.style();
    let mut style = base;

    if let Some(fg) = inline.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }

    if inline.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if inline.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if inline.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if span.href().is_some() {
        style = style.add_modifier(Modifier::UNDERLINED);
        if inline.fg.is_none() {
            let light_bg = crate::highlight::is_light_background();
            style = style.fg(if light_bg {
                Color::Blue
            } else {
                Color::LightBlue
            });
        }
    }
    if inline.code && inline.fg.is_none() {
        let light_bg = crate::highlight::is_light_background();
        style = style
            .fg(if light_bg {
                Color::Indexed(88)
            } else {
                Color::Red
            })
            .add_modifier(Modifier::BOLD);
    }

    style
}

fn fg_color_for_terminal(fg: crate::document::InlineColor) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("INKDOWN_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    if let Some(ct) = colorterm {
        let lower = ct.to_ascii_lowercase();
        if lower.contains("truecolor") || lower.contains("24bit") {
            return true;
        }
    }
    if let Some(t) = term {
        let lower = t.to_ascii_lowercase();
        if lower.contains("direct") || lower.contains("truecolor") {
            return true;
        }
    }
    false
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    let ri = to_cube(r);
    let gi = to_cube(g);
    let bi = to_cube(b);
    16 + (36 * ri) + (6 * gi) + bi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{InlineColor, InlineSpan};

    #[test]
    fn test_heading_styles_are_bold() {
        for level in 1..=6 {
            let style = style_for_line_type(&LineType::Heading(level));
            assert!(style.add_modifier.contains(Modifier::BOLD));
        }
    }

    #[test]
    fn test_h1_is_underlined() {
        let style = style_for_line_type(&LineType::Heading(1));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_blockquote_is_italic() {
        let style = style_for_line_type(&LineType::BlockQuote);
        assert!(style.add_modifier.contains(Modifier::ITALIC));
        assert!(style.fg.is_some());
    }

    #[test]
    fn test_inline_color_removes_dim_modifier() {
        let base = Style::default().add_modifier(Modifier::DIM);
        let mut inline = InlineStyle::default();
        inline.fg = Some(InlineColor { r: 255, g: 0, b: 0 });
        let span = InlineSpan::new("x".to_string(), inline);

        let styled = style_for_inline(base, &span);
        assert!(!styled.add_modifier.contains(Modifier::DIM));
    }

    #[test]
    fn test_link_spans_are_underlined() {
        let span = InlineSpan::new("docs".to_string(), InlineStyle::default())
            .with_href("https://example.com".to_string());
        let styled = style_for_inline(Style::default(), &span);
        assert!(styled.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_truecolor_detection_without_colorterm() {
        assert!(!supports_truecolor_from_env(None, Some("xterm-256color")));
    }

    #[test]
    fn test_truecolor_detection_with_colorterm() {
        assert!(supports_truecolor_from_env(
            Some("truecolor"),
            Some("xterm-256color")
        ));
    }

    #[test]
    fn test_fallback_indexed_color_when_not_truecolor() {
        let idx = rgb_to_xterm_256(255, 0, 0);
        assert_eq!(idx, 196);
    }
}
