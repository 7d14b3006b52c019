//! Race loadout loader.

use std::collections::HashMap;

use anyhow::Context;
use nightfall_core::{GameConfig, RaceConfig};

use super::LoadResult;

/// Registry for race configurations, keyed by race name.
#[derive(Debug, Clone)]
pub struct RaceRegistry {
    races: HashMap<String, RaceConfig>,
}

impl RaceRegistry {
    /// Loads and validates all races from the embedded RON data file.
    pub fn load(config: &GameConfig) -> LoadResult<Self> {
        let raw = include_str!("../../data/races.ron");
        Self::from_ron(raw, config)
    }

    pub fn from_ron(raw: &str, config: &GameConfig) -> LoadResult<Self> {
        let defs: Vec<RaceConfig> = ron::from_str(raw).context("failed to parse races.ron")?;

        let mut races = HashMap::with_capacity(defs.len());
        for race in defs {
            race.validate(config)
                .with_context(|| format!("invalid race '{}'", race.name))?;
            if races.insert(race.name.clone(), race).is_some() {
                anyhow::bail!("duplicate race name");
            }
        }
        Ok(Self { races })
    }

    pub fn get(&self, name: &str) -> Option<&RaceConfig> {
        self.races.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RaceConfig> {
        self.races.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.races.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightfall_core::UsageLimit;

    #[test]
    fn load_race_loadouts() {
        let registry = RaceRegistry::load(&GameConfig::default()).expect("failed to load races");

        let dwarf = registry.get("Dwarf").unwrap();
        assert!(dwarf.passives.stone_armor.unwrap() > 0);

        let vampire = registry.get("Vampire").unwrap();
        assert!(vampire.passives.life_steal_percent.unwrap() > 0);

        // At least one race must carry a per-game burst ability.
        assert!(registry
            .iter()
            .any(|r| matches!(r.ability.limit, UsageLimit::PerGame { .. })));
    }

    #[test]
    fn zero_use_racial_ability_is_rejected() {
        let raw = r#"[
            (name: "Ghost",
             ability: (id: "fade", name: "Fade", limit: PerGame(max_uses: 0))),
        ]"#;
        assert!(RaceRegistry::from_ron(raw, &GameConfig::default()).is_err());
    }
}
