//! Ability catalog loader.
//!
//! Loads ability definitions from the embedded RON data file and serves them
//! through [`AbilityOracle`].

use std::collections::HashMap;

use anyhow::Context;
use nightfall_core::{AbilityDefinition, AbilityId, AbilityOracle};

use super::LoadResult;

/// Registry for ability definitions.
///
/// Loaded once at startup and shared immutably across game instances.
#[derive(Debug, Clone)]
pub struct AbilityRegistry {
    abilities: HashMap<AbilityId, AbilityDefinition>,
}

impl AbilityRegistry {
    /// Loads all ability definitions from the embedded RON data file.
    pub fn load() -> LoadResult<Self> {
        let raw = include_str!("../../data/abilities.ron");
        Self::from_ron(raw)
    }

    /// Parses a RON document holding a list of ability definitions.
    ///
    /// Duplicate ids are rejected; a catalog with two definitions for one id
    /// is a content bug.
    pub fn from_ron(raw: &str) -> LoadResult<Self> {
        let defs: Vec<AbilityDefinition> =
            ron::from_str(raw).context("failed to parse abilities.ron")?;

        let mut abilities = HashMap::with_capacity(defs.len());
        for def in defs {
            if let Some(previous) = abilities.insert(def.id.clone(), def) {
                anyhow::bail!("duplicate ability id '{}'", previous.id);
            }
        }
        Ok(Self { abilities })
    }

    pub fn get(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl AbilityOracle for AbilityRegistry {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }
}
