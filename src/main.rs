//! Inkdown - a terminal markdown editor with live preview and rich export.
//!
//! # Usage
//!
//! ```bash
//! inkdown
//! inkdown --raw-html
//! inkdown --plain-code --theme light
//! ```

use anyhow::{Context, Result};
use clap::Parser;

use inkdown::app::App;
use inkdown::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use inkdown::document::RenderOptions;
use inkdown::highlight::{ColorScheme, set_color_scheme};
use inkdown::perf;

/// A terminal markdown editor with live preview and rich export
#[derive(Parser, Debug)]
#[command(name = "inkdown", version, about, long_about = None)]
struct Cli {
    /// Let embedded HTML blocks pass through to exports verbatim
    #[arg(long)]
    raw_html: bool,

    /// Disable syntax coloring of fenced code blocks
    #[arg(long)]
    plain_code: bool,

    /// Syntax highlight palette (light or dark)
    #[arg(long, value_enum, default_value = "auto")]
    theme: ThemeMode,

    /// Enable startup performance logging
    #[arg(long)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);

    match effective.theme.unwrap_or(ThemeMode::Auto) {
        // Auto leaves the override unset; the highlighter falls back to the
        // COLORFGBG heuristic.
        ThemeMode::Auto => set_color_scheme(None),
        ThemeMode::Light => set_color_scheme(Some(ColorScheme::Light)),
        ThemeMode::Dark => set_color_scheme(Some(ColorScheme::Dark)),
    }

    let options = RenderOptions {
        raw_html: effective.raw_html,
        highlight: !effective.plain_code,
    };

    let mut app = App::new().with_render_options(options);
    app.run().context("Application error")
}
