use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::store::EmptyTabPolicy;

const APP_NAME: &str = "twinpad";

/// Quiet period after the last edit before the active tab is auto-saved.
pub const DEFAULT_AUTOSAVE_MS: u64 = 2000;
/// How long a save status stays visible.
pub const DEFAULT_STATUS_MS: u64 = 1000;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub data_dir: Option<PathBuf>,
    pub autosave_ms: Option<u64>,
    pub keep_empty: bool,
    pub verbose: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            data_dir: other.data_dir.clone().or_else(|| self.data_dir.clone()),
            autosave_ms: other.autosave_ms.or(self.autosave_ms),
            keep_empty: self.keep_empty || other.keep_empty,
            verbose: self.verbose || other.verbose,
        }
    }

    /// Auto-save quiet period in milliseconds, falling back to the default.
    pub fn effective_autosave_ms(&self) -> u64 {
        self.autosave_ms.unwrap_or(DEFAULT_AUTOSAVE_MS)
    }

    pub const fn empty_tab_policy(&self) -> EmptyTabPolicy {
        if self.keep_empty {
            EmptyTabPolicy::Retain
        } else {
            EmptyTabPolicy::Purge
        }
    }

    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_NAME).join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_NAME)
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_NAME).join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join(APP_NAME).join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".twinpadrc")
}

/// Where tab and settings records live unless `--data-dir` says otherwise.
pub fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join(APP_NAME).join("data");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join(APP_NAME)
                .join("data");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join(APP_NAME);
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".local").join("share").join(APP_NAME);
        }
    }

    PathBuf::from(".twinpad")
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
    lines.push("# twinpad defaults (saved with --save)".to_string());
    if let Some(dir) = &flags.data_dir {
        lines.push(format!("--data-dir {}", dir.display()));
    }
    if let Some(ms) = flags.autosave_ms {
        lines.push(format!("--autosave-ms {ms}"));
    }
    if flags.keep_empty {
        lines.push("--keep-empty".to_string());
    }
    if flags.verbose {
        lines.push("--verbose".to_string());
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

/// Pick the flags this module understands out of a token stream.
///
/// Unknown tokens (subcommands, file arguments) are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--keep-empty" {
            flags.keep_empty = true;
        } else if token == "--verbose" || token == "-v" {
            flags.verbose = true;
        } else if token == "--data-dir" {
            if let Some(next) = tokens.get(i + 1) {
                flags.data_dir = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--data-dir=") {
            flags.data_dir = Some(PathBuf::from(value));
        } else if token == "--autosave-ms" {
            if let Some(next) = tokens.get(i + 1) {
                flags.autosave_ms = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--autosave-ms=") {
            flags.autosave_ms = value.parse().ok();
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "twinpad".to_string(),
            "--data-dir".to_string(),
            "/tmp/notes".to_string(),
            "--autosave-ms=500".to_string(),
            "--keep-empty".to_string(),
            "shell".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.data_dir, Some(PathBuf::from("/tmp/notes")));
        assert_eq!(flags.autosave_ms, Some(500));
        assert!(flags.keep_empty);
        assert!(!flags.verbose);
    }

    #[test]
    fn test_bad_autosave_value_is_dropped() {
        let args = vec!["--autosave-ms".to_string(), "soon".to_string()];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.autosave_ms, None);
        assert_eq!(flags.effective_autosave_ms(), DEFAULT_AUTOSAVE_MS);
    }

    #[test]
    fn test_autosave_ms_passes_through_unchanged() {
        let args = vec!["--autosave-ms".to_string(), u64::MAX.to_string()];
        assert_eq!(parse_flag_tokens(&args).effective_autosave_ms(), u64::MAX);
        let args = vec!["--autosave-ms=0".to_string()];
        assert_eq!(parse_flag_tokens(&args).effective_autosave_ms(), 0);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            data_dir: Some(PathBuf::from("file-dir")),
            autosave_ms: Some(3000),
            keep_empty: true,
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            autosave_ms: Some(100),
            verbose: true,
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert_eq!(merged.data_dir, Some(PathBuf::from("file-dir")));
        assert_eq!(merged.autosave_ms, Some(100));
        assert!(merged.keep_empty);
        assert!(merged.verbose);
    }

    #[test]
    fn test_keep_empty_selects_retain_policy() {
        let flags = ConfigFlags::default();
        assert_eq!(flags.empty_tab_policy(), EmptyTabPolicy::Purge);
        let flags = ConfigFlags {
            keep_empty: true,
            ..ConfigFlags::default()
        };
        assert_eq!(flags.empty_tab_policy(), EmptyTabPolicy::Retain);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config");
        let flags = ConfigFlags {
            data_dir: Some(PathBuf::from("notes-data")),
            autosave_ms: Some(750),
            keep_empty: true,
            verbose: true,
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
