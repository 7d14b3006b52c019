//! Runtime error types.

use nightfall_core::{LoadoutError, PlayerId};

/// Session-level failures. Per-player policy rejections (cooldowns,
/// duplicate submissions) are returned as values by the engine, not raised
/// here.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),

    #[error("player {0} is dead")]
    PlayerDead(PlayerId),

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("unknown race '{0}'")]
    UnknownRace(String),

    #[error("invalid loadout: {0}")]
    Loadout(#[from] LoadoutError),

    #[error("racial ability unavailable: {0}")]
    Racial(#[from] nightfall_core::RacialUseError),
}

/// Persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;
