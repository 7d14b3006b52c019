//! Static ability catalog.
//!
//! Ability definitions are content data: loaded once at startup, injected
//! through [`AbilityOracle`], and never mutated by the engine. Unknown ids
//! resolve to `None`, never a panic, so a stale client request cannot abort
//! resolution.

use crate::effects::EffectTag;

/// Identifier of an ability definition, as declared in content tables.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AbilityId(String);

impl AbilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for AbilityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AbilityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Broad grouping that drives how an ability resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityCategory {
    /// Deals damage to the target.
    Attack,
    /// Restores the target's health.
    Heal,
    /// Protective or utility; typically applies a beneficial effect.
    Defense,
    /// Everything else (debuffs, control, tricks).
    Special,
}

/// Who an ability may be aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetShape {
    /// Always targets the caster; no target selection.
    Caster,
    /// One player or the monster.
    Single,
    /// Hits every living participant on the relevant side.
    Multi,
}

/// Numeric parameters of an ability. Which fields are meaningful depends on
/// the category and effect tag; absent fields default to "not used".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AbilityParams {
    /// Raw damage before modifiers.
    pub damage: Option<i32>,
    /// Healing or per-round effect magnitude.
    pub amount: Option<i32>,
    /// Bonus armor granted (shield effects).
    pub armor: Option<i32>,
    /// Percentage magnitude (vulnerability increase, weaken reduction, ...).
    pub percent: Option<u32>,
    /// Effect duration in rounds.
    pub duration: Option<u8>,
    /// Recoil damage the caster takes on use.
    pub self_damage: Option<i32>,
}

/// Static definition of one ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDefinition {
    pub id: AbilityId,
    pub name: String,
    pub category: AbilityCategory,
    /// Status effect this ability applies, if any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<EffectTag>,
    pub target: TargetShape,
    #[cfg_attr(feature = "serde", serde(default))]
    pub params: AbilityParams,
    /// Execution priority within a round; lower resolves first.
    pub order: u16,
    /// Cooldown in rounds after use. 0 means usable every round.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cooldown: u8,
    /// Level at which the ability becomes available.
    #[cfg_attr(feature = "serde", serde(default = "default_unlock"))]
    pub unlock_at: u8,
}

#[cfg(feature = "serde")]
fn default_unlock() -> u8 {
    1
}

/// Read-only lookup into the ability catalog.
///
/// Implemented by the content crate's registry; the engine only ever sees
/// this trait so independent game instances can share one immutable catalog.
pub trait AbilityOracle: Send + Sync {
    /// Looks up an ability definition. Unknown ids return `None`.
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition>;
}
