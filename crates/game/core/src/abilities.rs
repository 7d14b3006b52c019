//! Ability unlock and cooldown tracking.
//!
//! Cooldowns are stored as `rounds + 1` when set, because the end-of-round
//! pass that decrements them also runs on the round the ability was used.
//! A player therefore waits exactly `rounds` full rounds before reuse.

use std::collections::BTreeMap;

use crate::catalog::{AbilityId, AbilityOracle};
use crate::error::{CombatError, ErrorSeverity};
use crate::loadout::{RacialAbilityDef, UsageLimit};

/// One cooldown change from a per-round tick. `remaining == 0` means the
/// ability just came off cooldown.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CooldownLogEntry {
    pub ability: AbilityId,
    pub remaining: u8,
}

/// Per-player view of which catalog abilities are unlocked and which are
/// cooling down.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityTracker {
    unlocked: Vec<AbilityId>,
    cooldowns: BTreeMap<AbilityId, u8>,
}

impl AbilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlocks an ability. Re-unlocking is idempotent.
    pub fn unlock(&mut self, id: AbilityId) {
        if !self.unlocked.contains(&id) {
            self.unlocked.push(id);
        }
    }

    /// Unlocks every ability from `kit` whose catalog definition is
    /// available at `level`. Returns the ids newly unlocked by this call.
    ///
    /// Ids missing from the catalog are skipped; a stale kit entry must not
    /// abort state creation.
    pub fn unlock_for_level(
        &mut self,
        catalog: &(impl AbilityOracle + ?Sized),
        kit: &[AbilityId],
        level: u8,
    ) -> Vec<AbilityId> {
        let mut fresh = Vec::new();
        for id in kit {
            let Some(def) = catalog.ability(id) else {
                continue;
            };
            if def.unlock_at <= level && !self.unlocked.contains(id) {
                self.unlocked.push(id.clone());
                fresh.push(id.clone());
            }
        }
        fresh
    }

    pub fn is_unlocked(&self, id: &AbilityId) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked(&self) -> &[AbilityId] {
        &self.unlocked
    }

    /// Rounds remaining on an ability's cooldown. Unknown or ready abilities
    /// report 0.
    pub fn cooldown(&self, id: &AbilityId) -> u8 {
        self.cooldowns.get(id).copied().unwrap_or(0)
    }

    pub fn is_on_cooldown(&self, id: &AbilityId) -> bool {
        self.cooldown(id) > 0
    }

    /// An ability is usable iff unlocked and off cooldown. Stun and immunity
    /// gating live with the status engine, layered on by the player state.
    pub fn can_use(&self, id: &AbilityId) -> bool {
        self.is_unlocked(id) && !self.is_on_cooldown(id)
    }

    /// Puts an ability on cooldown for `rounds`, storing `rounds + 1`
    /// internally to absorb the round of use. A cooldown of 0 is a no-op.
    pub fn put_on_cooldown(&mut self, id: &AbilityId, rounds: u8) {
        if rounds == 0 {
            return;
        }
        self.cooldowns.insert(id.clone(), rounds + 1);
    }

    /// Decrements every cooldown by one round, dropping zeroed entries.
    pub fn tick(&mut self) -> Vec<CooldownLogEntry> {
        let mut log = Vec::new();
        self.cooldowns.retain(|id, remaining| {
            *remaining -= 1;
            log.push(CooldownLogEntry {
                ability: id.clone(),
                remaining: *remaining,
            });
            *remaining > 0
        });
        log
    }
}

// ============================================================================
// Racial Ability State
// ============================================================================

/// Why a racial ability activation was refused. Always recovered locally as
/// a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RacialUseError {
    #[error("racial ability has no uses left this game")]
    Exhausted,

    #[error("racial ability already used this round")]
    UsedThisRound,

    #[error("racial ability is on cooldown")]
    OnCooldown,

    #[error("passive racial abilities are never activated")]
    Passive,
}

impl CombatError for RacialUseError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Exhausted => "RACIAL_EXHAUSTED",
            Self::UsedThisRound => "RACIAL_USED_THIS_ROUND",
            Self::OnCooldown => "RACIAL_ON_COOLDOWN",
            Self::Passive => "RACIAL_PASSIVE",
        }
    }
}

/// Usage counters matching the ability's declared limit. Derived from
/// [`UsageLimit`] at creation so a passive can never carry a use counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RacialUsage {
    PerGame { remaining: u8 },
    PerRound { used: bool },
    Passive,
}

/// Live state of a player's racial ability.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RacialAbilityState {
    def: RacialAbilityDef,
    usage: RacialUsage,
    cooldown: u8,
}

impl RacialAbilityState {
    pub fn new(def: RacialAbilityDef) -> Self {
        let usage = match def.limit {
            UsageLimit::PerGame { max_uses } => RacialUsage::PerGame {
                remaining: max_uses,
            },
            UsageLimit::PerRound => RacialUsage::PerRound { used: false },
            UsageLimit::Passive => RacialUsage::Passive,
        };
        Self {
            def,
            usage,
            cooldown: 0,
        }
    }

    pub fn def(&self) -> &RacialAbilityDef {
        &self.def
    }

    pub fn usage(&self) -> RacialUsage {
        self.usage
    }

    pub fn cooldown(&self) -> u8 {
        self.cooldown
    }

    /// Whether the ability can be activated right now. Passives report
    /// false: they are queried by the modifier pipeline, never used.
    pub fn can_use(&self) -> bool {
        if self.cooldown > 0 {
            return false;
        }
        match self.usage {
            RacialUsage::PerGame { remaining } => remaining > 0,
            RacialUsage::PerRound { used } => !used,
            RacialUsage::Passive => false,
        }
    }

    /// Consumes one activation, starting the cooldown.
    pub fn activate(&mut self) -> Result<&RacialAbilityDef, RacialUseError> {
        if self.cooldown > 0 {
            return Err(RacialUseError::OnCooldown);
        }
        match &mut self.usage {
            RacialUsage::PerGame { remaining } => {
                if *remaining == 0 {
                    return Err(RacialUseError::Exhausted);
                }
                *remaining -= 1;
            }
            RacialUsage::PerRound { used } => {
                if *used {
                    return Err(RacialUseError::UsedThisRound);
                }
                *used = true;
            }
            RacialUsage::Passive => return Err(RacialUseError::Passive),
        }
        if self.def.cooldown > 0 {
            self.cooldown = self.def.cooldown + 1;
        }
        Ok(&self.def)
    }

    /// Per-round pass: decrements the cooldown and resets a per-round use.
    pub fn tick(&mut self) -> Option<CooldownLogEntry> {
        if let RacialUsage::PerRound { used } = &mut self.usage {
            *used = false;
        }
        if self.cooldown == 0 {
            return None;
        }
        self.cooldown -= 1;
        Some(CooldownLogEntry {
            ability: self.def.id.clone(),
            remaining: self.cooldown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        AbilityCategory, AbilityDefinition, AbilityParams, TargetShape,
    };
    use std::collections::HashMap;

    struct MapOracle(HashMap<AbilityId, AbilityDefinition>);

    impl AbilityOracle for MapOracle {
        fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
            self.0.get(id)
        }
    }

    fn def(id: &str, unlock_at: u8, cooldown: u8) -> AbilityDefinition {
        AbilityDefinition {
            id: AbilityId::new(id),
            name: id.to_string(),
            category: AbilityCategory::Attack,
            effect: None,
            target: TargetShape::Single,
            params: AbilityParams::default(),
            order: 10,
            cooldown,
            unlock_at,
        }
    }

    fn oracle() -> MapOracle {
        let defs = [def("slash", 1, 0), def("cleave", 3, 2), def("rampage", 6, 4)];
        MapOracle(
            defs.into_iter()
                .map(|d| (d.id.clone(), d))
                .collect(),
        )
    }

    #[test]
    fn unlock_for_level_respects_unlock_levels() {
        let oracle = oracle();
        let kit: Vec<AbilityId> =
            ["slash", "cleave", "rampage"].map(AbilityId::from).into();

        let mut tracker = AbilityTracker::new();
        let fresh = tracker.unlock_for_level(&oracle, &kit, 3);
        assert_eq!(fresh, vec![AbilityId::from("slash"), AbilityId::from("cleave")]);
        assert!(!tracker.is_unlocked(&AbilityId::from("rampage")));

        // Idempotent: a second pass at the same level unlocks nothing new.
        assert!(tracker.unlock_for_level(&oracle, &kit, 3).is_empty());

        let fresh = tracker.unlock_for_level(&oracle, &kit, 6);
        assert_eq!(fresh, vec![AbilityId::from("rampage")]);
    }

    #[test]
    fn cooldown_stores_rounds_plus_one_and_counts_down() {
        let mut tracker = AbilityTracker::new();
        let cleave = AbilityId::from("cleave");
        tracker.unlock(cleave.clone());

        tracker.put_on_cooldown(&cleave, 2);
        assert_eq!(tracker.cooldown(&cleave), 3);
        assert!(!tracker.can_use(&cleave));

        for expected in [2, 1, 0] {
            tracker.tick();
            assert_eq!(tracker.cooldown(&cleave), expected);
        }
        assert!(!tracker.is_on_cooldown(&cleave));
        assert!(tracker.can_use(&cleave));
    }

    #[test]
    fn zero_cooldown_is_a_noop() {
        let mut tracker = AbilityTracker::new();
        let slash = AbilityId::from("slash");
        tracker.unlock(slash.clone());

        tracker.put_on_cooldown(&slash, 0);
        assert!(!tracker.is_on_cooldown(&slash));
        assert!(tracker.can_use(&slash));
    }

    #[test]
    fn unknown_ability_reports_zero_cooldown_and_unusable() {
        let tracker = AbilityTracker::new();
        let ghost = AbilityId::from("ghost");
        assert_eq!(tracker.cooldown(&ghost), 0);
        assert!(!tracker.can_use(&ghost));
    }

    fn racial(limit: UsageLimit, cooldown: u8) -> RacialAbilityState {
        RacialAbilityState::new(RacialAbilityDef {
            id: AbilityId::new("surge"),
            name: "Surge".into(),
            limit,
            cooldown,
            effect: None,
            params: AbilityParams::default(),
            next_hit_multiplier_percent: Some(200),
        })
    }

    #[test]
    fn per_game_ability_stays_spent_after_cooldown_expires() {
        let mut state = racial(UsageLimit::PerGame { max_uses: 1 }, 2);
        assert!(state.can_use());
        state.activate().unwrap();

        assert_eq!(state.activate(), Err(RacialUseError::OnCooldown));
        while state.cooldown() > 0 {
            state.tick();
        }
        // Cooldown has expired, but the per-game use is gone for good.
        assert!(!state.can_use());
        assert_eq!(state.activate(), Err(RacialUseError::Exhausted));
    }

    #[test]
    fn per_round_ability_resets_each_round() {
        let mut state = racial(UsageLimit::PerRound, 0);
        state.activate().unwrap();
        assert_eq!(state.activate(), Err(RacialUseError::UsedThisRound));

        state.tick();
        assert!(state.can_use());
    }

    #[test]
    fn passive_ability_is_never_activatable() {
        let mut state = racial(UsageLimit::Passive, 0);
        assert!(!state.can_use());
        assert_eq!(state.activate(), Err(RacialUseError::Passive));
    }
}
