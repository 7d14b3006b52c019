//! Data-driven combat content and loaders.
//!
//! This crate houses the static content a game instance runs on and provides
//! loaders for the embedded data files:
//! - Ability catalog (data-driven via RON)
//! - Class kits (data-driven via RON)
//! - Race loadouts (data-driven via RON)
//! - Balance configuration (data-driven via TOML)
//!
//! Content is consumed through the oracle traits in `nightfall-core` and
//! never appears in game state. All loaders deserialize directly into core
//! types with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{AbilityRegistry, ClassRegistry, ConfigLoader, ContentBundle, RaceRegistry};
