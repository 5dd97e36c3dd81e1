//! Configuration file loading for the terminal adapter.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use rogue_chase_session::SessionConfig;
use serde::Deserialize;

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct FileConfig {
    /// Session parameters, including key binding overrides.
    pub(crate) session: SessionConfig,
    /// Terminal presentation options.
    pub(crate) display: DisplayConfig,
}

/// Terminal presentation options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct DisplayConfig {
    /// Emits ANSI color escapes around actor glyphs.
    pub(crate) color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Loads the configuration file, or defaults when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid configuration in {}", path.display()))
}

fn parse(contents: &str) -> Result<FileConfig> {
    toml::from_str(contents).context("failed to parse configuration toml contents")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rogue_chase_system_input::KeyAction;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").expect("empty toml is valid");
        assert_eq!(config, FileConfig::default());
        assert!(config.display.color);
        assert_eq!(config.session.width, 125);
    }

    #[test]
    fn session_and_key_overrides_are_read() {
        let config = parse(
            r#"
            [session]
            seed = 17
            pursuer_count = 2

            [session.keys]
            w = "north"
            e = "interact"

            [display]
            color = false
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.session.seed, 17);
        assert_eq!(config.session.pursuer_count, 2);
        assert_eq!(config.session.box_count, 10);
        assert_eq!(config.session.keys.get("w"), Some(&KeyAction::North));
        assert_eq!(config.session.keys.get("e"), Some(&KeyAction::Interact));
        assert!(!config.display.color);
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let result = parse(
            r#"
            [session.keys]
            w = "teleport"
            "#,
        );
        assert!(result.is_err());
    }
}
