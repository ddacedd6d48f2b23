use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sweeper_core::{BoardConfig, CellCount, Coord, Preset};

/// User settings, read from a TOML file.
///
/// ```toml
/// store_dir = "/var/lib/sweeper"
/// preset = "intermediate"
/// seed = 42
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one JSON file per board
    pub store_dir: PathBuf,
    /// Board configuration used when `new` gets no explicit size
    pub preset: Preset,
    /// Fixed seed for mine placement, random when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("boards"),
            preset: Preset::default(),
            seed: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when there is no file.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .with_context(|| format!("Invalid settings file {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!("Settings file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => {
                Err(err).with_context(|| format!("Could not read settings file {}", path.display()))
            }
        }
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Explicit dimensions win over the preset flag, which wins over the configured preset.
    pub fn board_config(
        &self,
        preset: Option<Preset>,
        dimensions: Option<(Coord, Coord, CellCount)>,
    ) -> sweeper_core::Result<BoardConfig> {
        match dimensions {
            Some((rows, columns, mines)) => BoardConfig::new(rows, columns, mines),
            None => Ok(preset.unwrap_or(self.preset).config()),
        }
    }

    /// A seed given on the command line wins over the configured one.
    pub fn resolve_seed(&self, seed: Option<u64>) -> u64 {
        seed.or(self.seed).unwrap_or_else(rand::random)
    }
}
