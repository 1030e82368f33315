use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

/// Flags that can be persisted as defaults with `--save`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub raw_html: bool,
    pub plain_code: bool,
    pub perf: bool,
    pub theme: Option<ThemeMode>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            raw_html: self.raw_html || other.raw_html,
            plain_code: self.plain_code || other.plain_code,
            perf: self.perf || other.perf,
            theme: other.theme.or(self.theme),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("inkdown").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("inkdown")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("inkdown").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("inkdown")
                .join("config");
        }
    }

    PathBuf::from(".inkdownrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".inkdownrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# inkdown defaults (saved with --save)".to_string());
    if flags.raw_html {
        lines.push("--raw-html".to_string());
    }
    if flags.plain_code {
        lines.push("--plain-code".to_string());
    }
    if let Some(theme) = flags.theme {
        let theme_str = match theme {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        lines.push(format!("--theme {theme_str}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--raw-html" {
            flags.raw_html = true;
        } else if token == "--plain-code" {
            flags.plain_code = true;
        } else if token == "--perf" {
            flags.perf = true;
        } else if token == "--theme" {
            if let Some(next) = tokens.get(i + 1) {
                flags.theme = parse_theme(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--theme=") {
            flags.theme = parse_theme(value);
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "inkdown".to_string(),
            "--raw-html".to_string(),
            "--plain-code".to_string(),
            "--theme".to_string(),
            "dark".to_string(),
            "--perf".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.raw_html);
        assert!(flags.plain_code);
        assert!(flags.perf);
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_parse_theme_equals_form() {
        let args = vec!["--theme=light".to_string()];
        assert_eq!(parse_flag_tokens(&args).theme, Some(ThemeMode::Light));
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let args = vec!["--bogus".to_string(), "value".to_string()];
        assert_eq!(parse_flag_tokens(&args), ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            raw_html: true,
            theme: Some(ThemeMode::Light),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            plain_code: true,
            theme: Some(ThemeMode::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.raw_html);
        assert!(merged.plain_code);
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".inkdownrc");
        let flags = ConfigFlags {
            raw_html: true,
            plain_code: true,
            perf: true,
            theme: Some(ThemeMode::Dark),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_load_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("missing")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
