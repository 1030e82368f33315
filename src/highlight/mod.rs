//! Syntax highlighting for fenced code blocks.
//!
//! Uses syntect with the bundled Sublime Text syntax definitions. The color
//! scheme is selected per fence by language tag; unrecognized tags fall back
//! to undecorated code styling.

use std::sync::{Mutex, OnceLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::document::{InlineColor, InlineSpan, InlineStyle};

/// Terminal background the highlight palette is adapted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScheme {
    Light,
    Dark,
}

/// Highlight code, selecting the palette from the active color scheme.
///
/// Returns one span vector per source line. When the language tag is missing
/// or unrecognized, every span is plain code styling with no color.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<InlineSpan>> {
    highlight_code_with(language, code, active_scheme())
}

/// Highlight code for a specific color scheme.
///
/// The HTML exporter uses this with [`ColorScheme::Light`] so the portable
/// payload reads well on the white backgrounds it is usually pasted into.
pub fn highlight_code_with(
    language: Option<&str>,
    code: &str,
    scheme: ColorScheme,
) -> Vec<Vec<InlineSpan>> {
    let syntax_set = syntax_set();
    let syntax = language
        .and_then(|lang| syntax_set.find_syntax_by_token(lang))
        .or_else(|| language.and_then(|lang| syntax_set.find_syntax_by_name(lang)));

    let Some(syntax) = syntax else {
        return plain_code(code);
    };

    let mut highlighter = HighlightLines::new(syntax, theme(scheme));
    let mut lines = Vec::new();
    for line in code.lines() {
        let ranges = highlighter
            .highlight_line(line, syntax_set)
            .unwrap_or_default();
        let mut spans = Vec::new();
        for (style, text) in ranges {
            let mut inline_style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            let fg = InlineColor {
                r: style.foreground.r,
                g: style.foreground.g,
                b: style.foreground.b,
            };
            inline_style.fg = Some(adjust_fg_for_scheme(fg, scheme));
            spans.push(InlineSpan::new(text.to_string(), inline_style));
        }
        lines.push(spans);
    }
    lines
}

/// Undecorated code styling: one uncolored span per line.
pub fn plain_code(code: &str) -> Vec<Vec<InlineSpan>> {
    code.lines()
        .map(|line| {
            let style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            vec![InlineSpan::new(line.to_string(), style)]
        })
        .collect()
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntax_set.load_defaults");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme(scheme: ColorScheme) -> &'static Theme {
    static DARK: OnceLock<Theme> = OnceLock::new();
    static LIGHT: OnceLock<Theme> = OnceLock::new();
    let (cell, preferred): (&OnceLock<Theme>, &[&str]) = match scheme {
        ColorScheme::Dark => (
            &DARK,
            &[
                "Monokai Extended",
                "Dracula",
                "Solarized (dark)",
                "base16-ocean.dark",
            ],
        ),
        ColorScheme::Light => (
            &LIGHT,
            &["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
        ),
    };
    cell.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load_defaults");
        let theme_set = ThemeSet::load_defaults();
        for name in preferred {
            if let Some(theme) = theme_set.themes.get(*name) {
                return theme.clone();
            }
        }
        theme_set
            .themes
            .values()
            .next()
            .cloned()
            .unwrap_or_default()
    })
}

static SCHEME_OVERRIDE: OnceLock<Mutex<Option<ColorScheme>>> = OnceLock::new();

/// Force a color scheme, or clear the override with `None`.
pub fn set_color_scheme(scheme: Option<ColorScheme>) {
    let lock = SCHEME_OVERRIDE.get_or_init(|| Mutex::new(None));
    let mut guard = lock.lock().expect("color scheme lock");
    *guard = scheme;
}

/// Whether the active scheme targets a light terminal background.
pub fn is_light_background() -> bool {
    active_scheme() == ColorScheme::Light
}

fn active_scheme() -> ColorScheme {
    let lock = SCHEME_OVERRIDE.get_or_init(|| Mutex::new(None));
    if let Ok(guard) = lock.lock() {
        if let Some(scheme) = *guard {
            return scheme;
        }
    }
    scheme_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn scheme_from_colorfgbg(colorfgbg: Option<&str>) -> ColorScheme {
    let Some(value) = colorfgbg else {
        return ColorScheme::Dark;
    };
    let bg_str = value.rsplit(';').next().unwrap_or(value);
    let Ok(bg) = bg_str.parse::<u8>() else {
        return ColorScheme::Dark;
    };

    if bg >= 7 {
        ColorScheme::Light
    } else {
        ColorScheme::Dark
    }
}

/// Dark-theme palettes carry bright foregrounds that wash out on light
/// backgrounds; darken anything above the readability threshold.
fn adjust_fg_for_scheme(color: InlineColor, scheme: ColorScheme) -> InlineColor {
    match scheme {
        ColorScheme::Dark => color,
        ColorScheme::Light => {
            let luma = luma(color);
            if luma < 155.0 {
                return color;
            }

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            InlineColor {
                r: (f32::from(color.r) * 0.42).round() as u8,
                g: (f32::from(color.g) * 0.42).round() as u8,
                b: (f32::from(color.b) * 0.42).round() as u8,
            }
        }
    }
}

fn luma(color: InlineColor) -> f32 {
    (0.2126 * f32::from(color.r)) + (0.7152 * f32::from(color.g)) + (0.0722 * f32::from(color.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rust_produces_colored_spans() {
        let code = "fn main() {\n    let x = 1;\n}\n";
        let lines = highlight_code_with(Some("rust"), code, ColorScheme::Dark);

        assert_eq!(lines.len(), 3);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(has_color, "Expected at least one colored span for Rust");
    }

    #[test]
    fn test_highlight_javascript_is_recognized() {
        let lines = highlight_code_with(Some("javascript"), "let x = 1;\n", ColorScheme::Dark);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(has_color, "javascript fence should colorize");
    }

    #[test]
    fn test_highlight_unknown_language_falls_back_to_plain() {
        let lines = highlight_code_with(Some("nope"), "just text", ColorScheme::Dark);

        assert_eq!(lines.len(), 1);
        let has_color = lines
            .iter()
            .flatten()
            .any(|span| span.style().fg.is_some());
        assert!(!has_color, "Unknown language should not colorize");
    }

    #[test]
    fn test_plain_code_sets_code_style() {
        let lines = plain_code("plain");
        assert!(lines[0].iter().all(|span| span.style().code));
        assert!(lines[0].iter().all(|span| span.style().fg.is_none()));
    }

    #[test]
    fn test_colorfgbg_dark_background() {
        assert_eq!(scheme_from_colorfgbg(Some("15;0")), ColorScheme::Dark);
    }

    #[test]
    fn test_colorfgbg_light_background() {
        assert_eq!(scheme_from_colorfgbg(Some("0;15")), ColorScheme::Light);
    }

    #[test]
    fn test_colorfgbg_missing_defaults_dark() {
        assert_eq!(scheme_from_colorfgbg(None), ColorScheme::Dark);
    }

    #[test]
    fn test_light_scheme_darkens_bright_fg() {
        let bright = InlineColor {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = adjust_fg_for_scheme(bright, ColorScheme::Light);
        assert!(adjusted.r < bright.r);
        assert!(adjusted.g < bright.g);
        assert!(adjusted.b < bright.b);
        assert!(luma(adjusted) < 120.0, "adjusted color still too bright");
    }

    #[test]
    fn test_dark_scheme_keeps_colors() {
        let bright = InlineColor {
            r: 240,
            g: 230,
            b: 120,
        };
        assert_eq!(adjust_fg_for_scheme(bright, ColorScheme::Dark), bright);
    }
}
