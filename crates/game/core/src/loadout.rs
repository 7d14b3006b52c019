//! Class and race configuration bundles.
//!
//! A player joins with one class and one race. The bundle supplies
//! immunities, the class armor bonus and damage modifier, racial passives,
//! and the racial-ability definition. Configuration is validated eagerly at
//! assignment: a malformed bundle is a content bug and rejected loudly, never
//! a player-facing error.

use crate::catalog::{AbilityId, AbilityParams};
use crate::config::GameConfig;
use crate::effects::EffectTag;
use crate::error::{CombatError, ErrorSeverity};

/// How often a racial ability may be used.
///
/// Modeled as a closed enum with associated data so illegal states (a
/// passive ability carrying a remaining-uses counter) are unrepresentable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UsageLimit {
    /// Finite uses over the whole game; never replenished.
    PerGame { max_uses: u8 },
    /// Once per round, reset when the round ends.
    PerRound,
    /// Always-on. Queried by the modifier pipeline, never individually used.
    Passive,
}

/// Static definition of a race's special ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RacialAbilityDef {
    pub id: AbilityId,
    pub name: String,
    pub limit: UsageLimit,
    /// Cooldown in rounds between uses. Tracked separately from the
    /// usage counter.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u8,
    /// Status effect applied to the user on activation, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<EffectTag>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: AbilityParams,
    /// One-shot outgoing multiplier armed on activation ("double next hit").
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_hit_multiplier_percent: Option<u32>,
}

/// Passive racial effects consumed by the modifier pipeline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RacialPassives {
    /// Initial stone armor value, for races that carry it.
    pub stone_armor: Option<i32>,
    /// Fraction of damage dealt returned as healing, in percent.
    pub life_steal_percent: Option<u32>,
    /// Outgoing damage boost per character level, in percent.
    pub damage_per_level_percent: Option<u32>,
    /// Maximum outgoing damage boost at zero health, scaled linearly by
    /// missing health, in percent.
    pub low_health_bonus_percent: Option<u32>,
}

/// Class half of the configuration bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassConfig {
    pub name: String,
    /// Flat armor added to the effective-armor sum.
    #[cfg_attr(feature = "serde", serde(default))]
    pub armor_bonus: i32,
    /// Outgoing damage modifier; 100 is neutral.
    #[cfg_attr(feature = "serde", serde(default = "neutral_percent"))]
    pub damage_modifier_percent: u32,
    /// Flat incoming damage reduction, in percent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub damage_resistance_percent: u32,
    /// Debuffs this class can never receive.
    #[cfg_attr(feature = "serde", serde(default))]
    pub immunities: Vec<EffectTag>,
    /// Catalog ids of the class ability kit; unlock levels live in the
    /// catalog definitions.
    pub abilities: Vec<AbilityId>,
}

#[cfg(feature = "serde")]
fn neutral_percent() -> u32 {
    100
}

/// Race half of the configuration bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceConfig {
    pub name: String,
    pub ability: RacialAbilityDef,
    #[cfg_attr(feature = "serde", serde(default))]
    pub passives: RacialPassives,
    /// Debuffs this race can never receive.
    #[cfg_attr(feature = "serde", serde(default))]
    pub immunities: Vec<EffectTag>,
}

/// Content-bug errors raised when a bundle is assigned. Fatal at load time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadoutError {
    #[error("{field} is {value}% but must not exceed {max}%")]
    PercentOutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },

    #[error("per-game racial ability '{0}' declares zero uses")]
    ZeroUses(String),

    #[error("stone armor initialized to {0}, below zero")]
    NegativeStoneArmor(i32),

    #[error("damage modifier of 0% would nullify all outgoing damage")]
    ZeroDamageModifier,
}

impl CombatError for LoadoutError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::PercentOutOfRange { .. } => "LOADOUT_PERCENT_OUT_OF_RANGE",
            Self::ZeroUses(_) => "LOADOUT_ZERO_USES",
            Self::NegativeStoneArmor(_) => "LOADOUT_NEGATIVE_STONE_ARMOR",
            Self::ZeroDamageModifier => "LOADOUT_ZERO_DAMAGE_MODIFIER",
        }
    }
}

fn check_percent(field: &'static str, value: u32, max: u32) -> Result<(), LoadoutError> {
    if value > max {
        return Err(LoadoutError::PercentOutOfRange { field, value, max });
    }
    Ok(())
}

impl ClassConfig {
    pub fn validate(&self, config: &GameConfig) -> Result<(), LoadoutError> {
        let max = config.max_effect_percent;
        if self.damage_modifier_percent == 0 {
            return Err(LoadoutError::ZeroDamageModifier);
        }
        check_percent("class damage modifier", self.damage_modifier_percent, max)?;
        check_percent(
            "class damage resistance",
            self.damage_resistance_percent,
            max,
        )?;
        Ok(())
    }
}

impl RaceConfig {
    pub fn validate(&self, config: &GameConfig) -> Result<(), LoadoutError> {
        let max = config.max_effect_percent;

        if let UsageLimit::PerGame { max_uses } = self.ability.limit
            && max_uses == 0
        {
            return Err(LoadoutError::ZeroUses(self.ability.id.to_string()));
        }
        if let Some(multiplier) = self.ability.next_hit_multiplier_percent {
            check_percent("next-hit multiplier", multiplier, max)?;
        }

        let passives = &self.passives;
        if let Some(value) = passives.stone_armor
            && value < 0
        {
            return Err(LoadoutError::NegativeStoneArmor(value));
        }
        if let Some(percent) = passives.life_steal_percent {
            check_percent("life steal", percent, 100)?;
        }
        if let Some(percent) = passives.damage_per_level_percent {
            check_percent("damage per level", percent, max)?;
        }
        if let Some(percent) = passives.low_health_bonus_percent {
            check_percent("low health bonus", percent, max)?;
        }
        Ok(())
    }
}
