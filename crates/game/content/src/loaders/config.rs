//! Balance configuration loader.

use anyhow::Context;
use nightfall_core::GameConfig;

use super::LoadResult;

/// Loads the balance configuration from the embedded TOML file.
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn load() -> LoadResult<GameConfig> {
        let raw = include_str!("../../data/config.toml");
        Self::from_toml(raw)
    }

    pub fn from_toml(raw: &str) -> LoadResult<GameConfig> {
        toml::from_str(raw).context("failed to parse config.toml")
    }
}
