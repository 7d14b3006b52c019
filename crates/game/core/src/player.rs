//! Per-player combat state.
//!
//! [`PlayerCombatState`] aggregates the unlock/cooldown tracker, status
//! effect engine, stone armor, racial ability state, and the submission
//! slot, and exposes the operations the session and orchestrator drive each
//! round. Created when a player joins with a class and race; destroyed when
//! they leave or the game ends.
//!
//! Every field round-trips losslessly through serde (with the `serde`
//! feature), so a session can be persisted mid-round and restored without
//! altering any cooldown, effect, or submission outcome.

use crate::abilities::{AbilityTracker, CooldownLogEntry, RacialAbilityState, RacialUseError};
use crate::catalog::{AbilityId, AbilityOracle, TargetShape};
use crate::config::GameConfig;
use crate::effects::{
    self, Applied, DegradationReport, EffectKind, EffectLogEntry, EffectTag, EffectTiming,
    StatusEffects, StoneArmor,
};
use crate::loadout::{ClassConfig, LoadoutError, RaceConfig, RacialPassives};
use crate::submission::{
    ActionSubmission, InvalidReason, SubmissionSlot, SubmissionStatus, SubmitError, SubmitOutcome,
    ValidationReport,
};
use crate::types::{MonsterVitals, PlayerId, PlayerVitals, SubmissionStamp, TargetId};

/// Record of a racial ability activation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RacialActivation {
    pub ability: AbilityId,
    /// One-shot outgoing multiplier armed by this activation, if any.
    pub armed_multiplier: Option<u32>,
    /// Outcome of the self-applied effect, if the ability carries one.
    pub effect: Option<Applied>,
}

/// Complete combat state of one player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerCombatState {
    id: PlayerId,
    level: u8,
    class: ClassConfig,
    race_name: String,
    /// Class and racial immunities combined at creation.
    immunities: Vec<EffectTag>,
    racial: RacialAbilityState,
    racial_passives: RacialPassives,
    tracker: AbilityTracker,
    effects: StatusEffects,
    stone_armor: Option<StoneArmor>,
    /// Armed one-shot outgoing multiplier, consumed by the next damaging
    /// ability.
    next_hit_multiplier: Option<u32>,
    slot: SubmissionSlot,
}

impl PlayerCombatState {
    /// Creates combat state for a player joining with the given bundle.
    ///
    /// The bundle is validated eagerly: a malformed class or race is a
    /// content bug and fails here, before the player ever acts.
    pub fn new(
        id: PlayerId,
        class: ClassConfig,
        race: RaceConfig,
        level: u8,
        config: &GameConfig,
        catalog: &(impl AbilityOracle + ?Sized),
    ) -> Result<Self, LoadoutError> {
        class.validate(config)?;
        race.validate(config)?;

        let mut immunities = class.immunities.clone();
        for tag in &race.immunities {
            if !immunities.contains(tag) {
                immunities.push(*tag);
            }
        }

        let stone_armor = race.passives.stone_armor.map(|value| {
            StoneArmor::new(
                value,
                config.stone_armor_minimum,
                config.stone_armor_degradation,
            )
        });

        let mut tracker = AbilityTracker::new();
        tracker.unlock_for_level(catalog, &class.abilities, level);

        Ok(Self {
            id,
            level,
            racial: RacialAbilityState::new(race.ability),
            racial_passives: race.passives,
            race_name: race.name,
            immunities,
            class,
            tracker,
            effects: StatusEffects::empty(),
            stone_armor,
            next_hit_multiplier: None,
            slot: SubmissionSlot::new(),
        })
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn class(&self) -> &ClassConfig {
        &self.class
    }

    pub fn race_name(&self) -> &str {
        &self.race_name
    }

    pub fn effects(&self) -> &StatusEffects {
        &self.effects
    }

    pub fn stone_armor(&self) -> Option<&StoneArmor> {
        self.stone_armor.as_ref()
    }

    pub fn racial(&self) -> &RacialAbilityState {
        &self.racial
    }

    /// Raises the player's level, appending any newly available unlocks.
    pub fn level_up(
        &mut self,
        catalog: &(impl AbilityOracle + ?Sized),
        level: u8,
    ) -> Vec<AbilityId> {
        self.level = self.level.max(level);
        self.tracker
            .unlock_for_level(catalog, &self.class.abilities, self.level)
    }

    // ========================================================================
    // Ability availability
    // ========================================================================

    /// An ability is usable iff unlocked, off cooldown, and the player is
    /// not stunned.
    pub fn can_use_ability(&self, id: &AbilityId) -> bool {
        self.tracker.can_use(id) && !self.effects.is_stunned()
    }

    pub fn available_abilities(&self) -> Vec<AbilityId> {
        self.tracker
            .unlocked()
            .iter()
            .filter(|id| self.can_use_ability(id))
            .cloned()
            .collect()
    }

    pub fn ability_cooldown(&self, id: &AbilityId) -> u8 {
        self.tracker.cooldown(id)
    }

    pub fn is_ability_on_cooldown(&self, id: &AbilityId) -> bool {
        self.tracker.is_on_cooldown(id)
    }

    pub fn unlocked_abilities(&self) -> &[AbilityId] {
        self.tracker.unlocked()
    }

    pub(crate) fn put_on_cooldown(&mut self, id: &AbilityId, rounds: u8) {
        self.tracker.put_on_cooldown(id, rounds);
    }

    // ========================================================================
    // Submission lifecycle
    // ========================================================================

    /// Submits an action for this round.
    ///
    /// Policy rejections (duplicate submit, unusable ability, missing
    /// target) come back as `{success: false, reason}` values.
    pub fn submit_action(
        &mut self,
        catalog: &(impl AbilityOracle + ?Sized),
        ability: AbilityId,
        target: Option<TargetId>,
        stamp: SubmissionStamp,
    ) -> SubmitOutcome {
        if self.slot.has_pending() {
            return SubmitOutcome::rejected(SubmitError::AlreadySubmitted);
        }
        let Some(def) = catalog.ability(&ability) else {
            return SubmitOutcome::rejected(SubmitError::UnknownAbility(ability.to_string()));
        };
        if !self.tracker.is_unlocked(&ability) {
            return SubmitOutcome::rejected(SubmitError::AbilityLocked(ability.to_string()));
        }
        if self.tracker.is_on_cooldown(&ability) {
            return SubmitOutcome::rejected(SubmitError::AbilityOnCooldown(ability.to_string()));
        }
        if self.effects.is_stunned() {
            return SubmitOutcome::rejected(SubmitError::Stunned);
        }

        let target = match def.target {
            TargetShape::Caster => TargetId::Player(self.id),
            TargetShape::Single | TargetShape::Multi => match target {
                Some(target) => target,
                None => return SubmitOutcome::rejected(SubmitError::MissingTarget),
            },
        };

        let action = ActionSubmission::new(ability, target, stamp);
        match self.slot.accept(action.clone()) {
            Ok(_) => SubmitOutcome::accepted(action),
            Err(reason) => SubmitOutcome::rejected(reason),
        }
    }

    /// Re-validates the pending submission against live game state.
    ///
    /// Called whenever state changes between select and resolve. On failure
    /// the submission transitions to `Invalid` with a reason and the slot is
    /// cleared so the player may resubmit.
    pub fn validate_submitted_action(
        &mut self,
        catalog: &(impl AbilityOracle + ?Sized),
        alive_players: &[PlayerVitals],
        monster: MonsterVitals,
    ) -> ValidationReport {
        let Some(action) = self.slot.pending() else {
            return ValidationReport::invalid(InvalidReason::NothingSubmitted);
        };

        if catalog.ability(&action.ability).is_none()
            || !self.tracker.is_unlocked(&action.ability)
        {
            return self.slot.invalidate(InvalidReason::AbilityLocked);
        }
        if self.tracker.is_on_cooldown(&action.ability) {
            return self.slot.invalidate(InvalidReason::AbilityOnCooldown);
        }

        match action.target {
            TargetId::Player(target) => {
                match alive_players.iter().find(|p| p.id == target) {
                    None => return self.slot.invalidate(InvalidReason::TargetMissing),
                    Some(vitals) if !vitals.is_alive => {
                        return self.slot.invalidate(InvalidReason::TargetDead);
                    }
                    Some(_) => {}
                }
            }
            TargetId::Monster => {
                if !monster.is_alive() {
                    return self.slot.invalidate(InvalidReason::MonsterDead);
                }
            }
        }

        self.slot.confirm_valid()
    }

    pub fn submission_status(&self) -> SubmissionStatus {
        self.slot.status()
    }

    /// Invalidates any pending submission, e.g. on disconnect. Other
    /// players' resolution proceeds unaffected.
    pub fn invalidate_submission(&mut self, reason: InvalidReason) -> ValidationReport {
        self.slot.invalidate(reason)
    }

    pub(crate) fn take_valid_submission(&mut self) -> Option<ActionSubmission> {
        self.slot.take_valid()
    }

    pub(crate) fn clear_submission(&mut self) {
        self.slot.clear();
    }

    // ========================================================================
    // Status effects and modifiers
    // ========================================================================

    /// Attempts to apply a status effect, honoring immunities and stacking
    /// limits. An immune target is a reported no-op.
    pub fn apply_status_effect(&mut self, kind: EffectKind, duration: u8) -> Applied {
        self.effects.apply(kind, duration, &self.immunities)
    }

    pub fn cure(&mut self, tag: EffectTag) -> bool {
        self.effects.cure(tag)
    }

    /// Effective armor: base + stone armor (while intact) + shield bonus +
    /// class bonus. An order-independent sum.
    pub fn effective_armor(&self, base: i32) -> i32 {
        let stone = self
            .stone_armor
            .as_ref()
            .map_or(0, StoneArmor::armor_value);
        base + stone + self.effects.shield_armor() + self.class.armor_bonus
    }

    /// Composes every outgoing-damage modifier onto `raw`, consuming the
    /// armed one-shot multiplier if present.
    pub fn apply_damage_modifiers(&mut self, raw: i32, hp: i32, max_hp: i32) -> i32 {
        effects::compose_outgoing(
            raw,
            &self.class,
            &self.racial_passives,
            self.level,
            hp,
            max_hp,
            &mut self.next_hit_multiplier,
            &self.effects,
        )
    }

    /// Composes incoming-damage modifiers onto `raw`: vulnerability
    /// increase first, then flat resistance reduction.
    pub fn apply_damage_resistance(&self, raw: i32) -> i32 {
        effects::compose_incoming(raw, &self.class, &self.effects)
    }

    /// Degrades stone armor for one nonzero hit taken.
    pub fn process_stone_armor_degradation(&mut self) -> Option<DegradationReport> {
        self.stone_armor.as_mut()?.degrade()
    }

    /// Healing from the racial life-steal passive after dealing damage.
    pub fn life_steal_healing(&self, damage_dealt: i32, hp: i32, max_hp: i32) -> i32 {
        match self.racial_passives.life_steal_percent {
            Some(percent) => effects::life_steal_healing(percent, damage_dealt, hp, max_hp),
            None => 0,
        }
    }

    // ========================================================================
    // Racial ability
    // ========================================================================

    pub fn can_use_racial_ability(&self) -> bool {
        self.racial.can_use()
    }

    /// Activates the racial ability: consumes a use, starts its cooldown,
    /// arms any one-shot multiplier, and self-applies its effect.
    pub fn use_racial_ability(&mut self) -> Result<RacialActivation, RacialUseError> {
        let def = self.racial.activate()?.clone();

        if let Some(multiplier) = def.next_hit_multiplier_percent {
            self.next_hit_multiplier = Some(multiplier);
        }

        let effect = def.effect.and_then(|tag| {
            let (kind, duration) = EffectKind::from_ability(tag, &def.params)?;
            Some(self.effects.apply(kind, duration, &self.immunities))
        });

        Ok(RacialActivation {
            ability: def.id,
            armed_multiplier: def.next_hit_multiplier_percent,
            effect,
        })
    }

    // ========================================================================
    // Per-round processing
    // ========================================================================

    pub fn process_ability_cooldowns(&mut self) -> Vec<CooldownLogEntry> {
        self.tracker.tick()
    }

    pub fn process_racial_cooldowns(&mut self) -> Option<CooldownLogEntry> {
        self.racial.tick()
    }

    pub fn process_vulnerability(&mut self) -> Option<EffectLogEntry> {
        self.effects.process_vulnerability()
    }

    pub fn process_status_effects(&mut self, timing: EffectTiming) -> Vec<EffectLogEntry> {
        self.effects.process(timing)
    }
}
