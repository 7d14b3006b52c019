//! Class kit loader.

use std::collections::HashMap;

use anyhow::Context;
use nightfall_core::{ClassConfig, GameConfig};

use super::LoadResult;

/// Registry for class configurations, keyed by class name.
#[derive(Debug, Clone)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassConfig>,
}

impl ClassRegistry {
    /// Loads and validates all classes from the embedded RON data file.
    pub fn load(config: &GameConfig) -> LoadResult<Self> {
        let raw = include_str!("../../data/classes.ron");
        Self::from_ron(raw, config)
    }

    pub fn from_ron(raw: &str, config: &GameConfig) -> LoadResult<Self> {
        let defs: Vec<ClassConfig> = ron::from_str(raw).context("failed to parse classes.ron")?;

        let mut classes = HashMap::with_capacity(defs.len());
        for class in defs {
            class
                .validate(config)
                .with_context(|| format!("invalid class '{}'", class.name))?;
            if classes.insert(class.name.clone(), class).is_some() {
                anyhow::bail!("duplicate class name");
            }
        }
        Ok(Self { classes })
    }

    pub fn get(&self, name: &str) -> Option<&ClassConfig> {
        self.classes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassConfig> {
        self.classes.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_class_kits() {
        let registry = ClassRegistry::load(&GameConfig::default()).expect("failed to load classes");
        assert!(registry.get("Warrior").is_some());

        for class in registry.iter() {
            assert!(
                !class.abilities.is_empty(),
                "class '{}' has an empty kit",
                class.name
            );
        }
    }

    #[test]
    fn out_of_range_modifier_is_rejected() {
        let raw = r#"[
            (name: "Berserker", damage_modifier_percent: 9000, abilities: ["slash"]),
        ]"#;
        assert!(ClassRegistry::from_ron(raw, &GameConfig::default()).is_err());
    }
}
