use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use trap_labs_world::{LevelCatalogue, LevelDefinition, LevelLayout};

/// Settings read from the optional TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    /// Seed driving trap placement.
    pub(crate) seed: Option<u64>,
    /// Location of the JSON progress store.
    pub(crate) store: Option<PathBuf>,
    /// Custom levels replacing the built-in catalogue when present.
    #[serde(default)]
    pub(crate) levels: Vec<LevelConfig>,
}

/// Authored level inside the configuration file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LevelConfig {
    /// Moves the player must survive.
    pub(crate) step_budget: u32,
    /// ASCII rows where `#` is a block and `.` is floor.
    pub(crate) layout: Vec<String>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Level catalogue described by the file, or the built-in one.
    pub(crate) fn catalogue(&self) -> Result<LevelCatalogue> {
        if self.levels.is_empty() {
            return Ok(LevelCatalogue::standard());
        }

        let levels = self
            .levels
            .iter()
            .enumerate()
            .map(|(index, level)| {
                let layout = LevelLayout::from_rows(&level.layout)
                    .with_context(|| format!("level {} has an invalid layout", index + 1))?;
                Ok(LevelDefinition::new(layout, level.step_budget))
            })
            .collect::<Result<Vec<_>>>()?;
        LevelCatalogue::from_levels(levels).context("invalid level catalogue")
    }
}
