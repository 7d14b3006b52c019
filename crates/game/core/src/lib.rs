//! Deterministic combat rules for round-based multiplayer games.
//!
//! `nightfall-core` defines the canonical resolution rules (abilities, status
//! effects, submissions, rounds) and exposes pure APIs reusable by the
//! runtime and offline tools. Content is injected through the
//! [`catalog::AbilityOracle`] trait; the engine performs no I/O and never
//! reads clocks, so identical inputs always produce identical round logs.
pub mod abilities;
pub mod catalog;
pub mod config;
pub mod effects;
pub mod error;
pub mod loadout;
pub mod player;
pub mod round;
pub mod submission;
pub mod types;
pub use abilities::{
    AbilityTracker, CooldownLogEntry, RacialAbilityState, RacialUsage, RacialUseError,
};
pub use catalog::{
    AbilityCategory, AbilityDefinition, AbilityId, AbilityOracle, AbilityParams, TargetShape,
};
pub use config::GameConfig;
pub use effects::{
    Applied, DegradationReport, EffectEvent, EffectKind, EffectLogEntry, EffectTag, EffectTiming,
    ImmunityTags, StatusEffect, StatusEffects, StoneArmor,
};
pub use error::{CombatError, ErrorSeverity};
pub use loadout::{
    ClassConfig, LoadoutError, RaceConfig, RacialAbilityDef, RacialPassives, UsageLimit,
};
pub use player::{PlayerCombatState, RacialActivation};
pub use round::{Combatant, MonsterState, RoundEvent, RoundLog, RoundOrchestrator};
pub use submission::{
    ActionSubmission, InvalidReason, SubmissionSlot, SubmissionStatus, SubmitError, SubmitOutcome,
    ValidationReport, ValidationState,
};
pub use types::{MonsterVitals, PlayerId, PlayerVitals, Round, SubmissionStamp, TargetId};
