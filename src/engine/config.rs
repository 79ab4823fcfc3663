//! Simulation settings: player count, token pool, deck size, batch size.
//! Loaded from TOML at runtime for the CLI; every field has a default.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::carcassonne::game::DEFAULT_MEEPLES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub players: usize,
    pub meeples_per_player: u32,
    /// Playouts per batch.
    pub games: usize,
    /// Base seed; game `i` of a batch uses `seed + i`.
    pub seed: u64,
    /// Copies of the 71-tile bag shuffled into one deck.
    pub deck_copies: usize,
    /// Undo every move after each playout and check the state round-trips.
    pub undo_after: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            players: 3,
            meeples_per_player: DEFAULT_MEEPLES,
            games: 100,
            seed: 42,
            deck_copies: 1,
            undo_after: false,
        }
    }
}

impl SimulationConfig {
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::Invalid("players must be at least 1".into()));
        }
        if self.games == 0 {
            return Err(ConfigError::Invalid("games must be at least 1".into()));
        }
        if self.deck_copies == 0 {
            return Err(ConfigError::Invalid("deck_copies must be at least 1".into()));
        }
        Ok(())
    }
}

/// Load a config from a TOML file at the given path.
pub fn load_config(path: &Path) -> Result<SimulationConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SimulationConfig::from_toml_str(&content, path)
}

/// Try to load a config from well-known paths, returning the defaults if none found.
pub fn load_default_config() -> SimulationConfig {
    let candidates = [
        "meeple_rules.toml",
        "../meeple_rules.toml",
        "/etc/meeple/meeple_rules.toml",
    ];
    for path in &candidates {
        let p = Path::new(path);
        if p.exists() {
            match load_config(p) {
                Ok(config) => {
                    tracing::info!(path = %p.display(), "loaded simulation config");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "failed to load simulation config");
                }
            }
        }
    }
    tracing::info!("no meeple_rules.toml found, using built-in defaults");
    SimulationConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "players = 4\nundo_after = true").expect("write config");

        let config = load_config(file.path()).expect("valid config");
        assert_eq!(config.players, 4);
        assert!(config.undo_after);
        assert_eq!(config.meeples_per_player, DEFAULT_MEEPLES);
        assert_eq!(config.games, 100);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "players = 0").expect("write config");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "players = \"many\"").expect("write config");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
