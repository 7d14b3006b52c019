//! Content loaders for the embedded data files.
//!
//! Each loader parses one RON/TOML file into core types and validates it
//! against the balance configuration before handing it to a game instance.

pub mod abilities;
pub mod classes;
pub mod config;
pub mod races;

pub use abilities::AbilityRegistry;
pub use classes::ClassRegistry;
pub use config::ConfigLoader;
pub use races::RaceRegistry;

use nightfall_core::GameConfig;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Everything a game instance needs, loaded and cross-validated in one call.
pub struct ContentBundle {
    pub config: GameConfig,
    pub abilities: AbilityRegistry,
    pub classes: ClassRegistry,
    pub races: RaceRegistry,
}

impl ContentBundle {
    /// Loads the embedded content set.
    ///
    /// Classes and races are validated against the balance config, and every
    /// ability id referenced by a class kit must resolve in the catalog.
    pub fn load() -> LoadResult<Self> {
        let config = ConfigLoader::load()?;
        let abilities = AbilityRegistry::load()?;
        let classes = ClassRegistry::load(&config)?;
        let races = RaceRegistry::load(&config)?;

        for class in classes.iter() {
            for id in &class.abilities {
                if abilities.get(id).is_none() {
                    anyhow::bail!(
                        "class '{}' references unknown ability '{}'",
                        class.name,
                        id
                    );
                }
            }
        }

        Ok(Self {
            config,
            abilities,
            classes,
            races,
        })
    }
}
