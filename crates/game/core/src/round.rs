//! Round orchestration.
//!
//! One round: start-of-round effect processing, final re-validation, pulling
//! at most one valid submission per living player, resolving in ability
//! priority order (lower `order` first, ties by submission stamp, so earlier
//! arrivals act first), then end-of-round processing and timer ticks for
//! everyone. The
//! orchestrator is the sole caller allowed to clear submission slots for the
//! next round.
//!
//! Resolution is logically single-threaded per game instance and performs no
//! I/O; everything observable comes back in the [`RoundLog`].

use std::collections::BTreeMap;

use crate::abilities::CooldownLogEntry;
use crate::catalog::{AbilityCategory, AbilityId, AbilityOracle, TargetShape};
use crate::effects::{Applied, DegradationReport, EffectKind, EffectLogEntry, EffectTiming};
use crate::player::PlayerCombatState;
use crate::submission::{ActionSubmission, InvalidReason};
use crate::types::{MonsterVitals, PlayerId, PlayerVitals, Round, TargetId};

/// A player's combat state plus their health pool.
///
/// Health lives with the session rather than the combat record so the
/// engine's processing passes can stay pure and return logs; the orchestrator
/// is the one place the two meet.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub state: PlayerCombatState,
    pub hp: i32,
    pub max_hp: i32,
}

impl Combatant {
    pub fn new(state: PlayerCombatState, max_hp: i32) -> Self {
        Self {
            state,
            hp: max_hp,
            max_hp,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn vitals(&self) -> PlayerVitals {
        PlayerVitals {
            id: self.state.id(),
            is_alive: self.is_alive(),
        }
    }

    fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }

    fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
    }
}

/// The shared monster entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonsterState {
    pub hp: i32,
    pub max_hp: i32,
}

impl MonsterState {
    pub fn new(max_hp: i32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn vitals(&self) -> MonsterVitals {
        MonsterVitals { hp: self.hp }
    }

    fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }
}

/// One narration-ready entry in the round log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoundEvent {
    /// A timed effect ticked on a player.
    EffectTick {
        player: PlayerId,
        entry: EffectLogEntry,
    },
    /// A pending submission failed final re-validation.
    SubmissionInvalidated {
        player: PlayerId,
        reason: InvalidReason,
    },
    /// A living player contributed no action this round.
    NoAction { player: PlayerId },
    /// An ability resolved against its target.
    AbilityResolved {
        player: PlayerId,
        ability: AbilityId,
        target: TargetId,
        damage: i32,
        healing: i32,
    },
    /// A status effect application attempt during resolution.
    EffectApplied {
        player: PlayerId,
        target: TargetId,
        outcome: Applied,
    },
    /// Recoil damage taken by the caster.
    SelfDamage { player: PlayerId, amount: i32 },
    /// Life-steal healing gained by the attacker.
    LifeSteal { player: PlayerId, healing: i32 },
    /// Stone armor degraded on a hit.
    StoneArmorDegraded {
        player: PlayerId,
        report: DegradationReport,
    },
    /// A cooldown advanced during the end-of-round tick.
    CooldownTick {
        player: PlayerId,
        entry: CooldownLogEntry,
    },
    PlayerDied { player: PlayerId },
    MonsterDied,
}

/// Structured log of everything that happened in one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoundLog {
    pub round: Round,
    pub events: Vec<RoundEvent>,
}

struct PendingAction {
    player: PlayerId,
    action: ActionSubmission,
    order: u16,
}

/// Drives one resolution cycle over a set of combatants and the monster.
pub struct RoundOrchestrator<'a, O: AbilityOracle + ?Sized> {
    catalog: &'a O,
}

impl<'a, O: AbilityOracle + ?Sized> RoundOrchestrator<'a, O> {
    pub fn new(catalog: &'a O) -> Self {
        Self { catalog }
    }

    /// Resolves one full round.
    ///
    /// Players without a valid submission cleanly contribute "no action";
    /// nothing any single player does can abort resolution for the rest.
    pub fn resolve_round(
        &self,
        round: Round,
        players: &mut BTreeMap<PlayerId, Combatant>,
        monster: &mut MonsterState,
    ) -> RoundLog {
        let mut log = RoundLog {
            round,
            events: Vec::new(),
        };

        self.process_effects(players, EffectTiming::StartOfRound, &mut log);
        self.revalidate_all(players, *monster, &mut log);
        let pending = self.collect_actions(players, &mut log);

        for entry in pending {
            self.resolve_action(entry, players, monster, &mut log);
        }

        self.process_effects(players, EffectTiming::EndOfRound, &mut log);
        self.tick_timers(players, &mut log);

        for combatant in players.values_mut() {
            combatant.state.clear_submission();
        }

        if !monster.is_alive() {
            log.events.push(RoundEvent::MonsterDied);
        }
        log
    }

    /// Runs one effect-processing pass for every living player, applying
    /// damage and healing to health pools.
    fn process_effects(
        &self,
        players: &mut BTreeMap<PlayerId, Combatant>,
        timing: EffectTiming,
        log: &mut RoundLog,
    ) {
        for combatant in players.values_mut() {
            if !combatant.is_alive() {
                continue;
            }
            let player = combatant.state.id();
            for entry in combatant.state.process_status_effects(timing) {
                match entry.event {
                    crate::effects::EffectEvent::Damage => combatant.take_damage(entry.magnitude),
                    crate::effects::EffectEvent::Heal => combatant.heal(entry.magnitude),
                    crate::effects::EffectEvent::Expired => {}
                }
                log.events.push(RoundEvent::EffectTick { player, entry });
            }
            if !combatant.is_alive() {
                log.events.push(RoundEvent::PlayerDied { player });
            }
        }
    }

    /// Final re-validation before collection: state may have changed since
    /// the submissions were placed.
    fn revalidate_all(
        &self,
        players: &mut BTreeMap<PlayerId, Combatant>,
        monster: MonsterState,
        log: &mut RoundLog,
    ) {
        let vitals: Vec<PlayerVitals> = players.values().map(Combatant::vitals).collect();

        for combatant in players.values_mut() {
            if !combatant.state.submission_status().has_submitted {
                continue;
            }
            let player = combatant.state.id();
            let report = combatant.state.validate_submitted_action(
                self.catalog,
                &vitals,
                monster.vitals(),
            );
            if let Some(reason) = report.reason {
                log.events
                    .push(RoundEvent::SubmissionInvalidated { player, reason });
            }
        }
    }

    /// Pulls at most one valid submission per living player, sorted by
    /// ability priority. Ties break on the submission stamp, so the earlier
    /// arrival acts first.
    fn collect_actions(
        &self,
        players: &mut BTreeMap<PlayerId, Combatant>,
        log: &mut RoundLog,
    ) -> Vec<PendingAction> {
        let mut pending = Vec::new();
        for combatant in players.values_mut() {
            let player = combatant.state.id();
            if !combatant.is_alive() {
                combatant.state.clear_submission();
                continue;
            }
            match combatant.state.take_valid_submission() {
                Some(action) => {
                    // Unknown ids were weeded out during re-validation.
                    let Some(def) = self.catalog.ability(&action.ability) else {
                        continue;
                    };
                    pending.push(PendingAction {
                        player,
                        action,
                        order: def.order,
                    });
                }
                None => log.events.push(RoundEvent::NoAction { player }),
            }
        }
        pending.sort_by_key(|p| (p.order, p.action.submitted_at));
        pending
    }

    fn resolve_action(
        &self,
        entry: PendingAction,
        players: &mut BTreeMap<PlayerId, Combatant>,
        monster: &mut MonsterState,
        log: &mut RoundLog,
    ) {
        let Some(def) = self.catalog.ability(&entry.action.ability) else {
            return;
        };
        let def = def.clone();
        let attacker = entry.player;

        // Attacker may have died earlier in this round's resolution.
        if !players.get(&attacker).is_some_and(Combatant::is_alive) {
            return;
        }

        let targets: Vec<TargetId> = match def.target {
            TargetShape::Caster => vec![TargetId::Player(attacker)],
            TargetShape::Single => vec![entry.action.target],
            TargetShape::Multi => match entry.action.target {
                TargetId::Monster => vec![TargetId::Monster],
                TargetId::Player(_) => players
                    .values()
                    .filter(|c| c.is_alive())
                    .map(|c| TargetId::Player(c.state.id()))
                    .filter(|t| {
                        // Offensive sweeps spare the caster; support hits
                        // everyone.
                        def.category != AbilityCategory::Attack
                            || *t != TargetId::Player(attacker)
                    })
                    .collect(),
            },
        };

        for target in targets {
            self.resolve_against(&def, attacker, target, players, monster, log);
        }

        if let Some(recoil) = def.params.self_damage
            && recoil > 0
            && let Some(caster) = players.get_mut(&attacker)
        {
            caster.take_damage(recoil);
            log.events.push(RoundEvent::SelfDamage {
                player: attacker,
                amount: recoil,
            });
            if !caster.is_alive() {
                log.events.push(RoundEvent::PlayerDied { player: attacker });
            }
        }

        if let Some(caster) = players.get_mut(&attacker) {
            caster.state.put_on_cooldown(&def.id, def.cooldown);
        }
    }

    fn resolve_against(
        &self,
        def: &crate::catalog::AbilityDefinition,
        attacker: PlayerId,
        target: TargetId,
        players: &mut BTreeMap<PlayerId, Combatant>,
        monster: &mut MonsterState,
        log: &mut RoundLog,
    ) {
        let mut damage_dealt = 0;
        let mut healing_done = 0;

        match def.category {
            AbilityCategory::Attack => {
                let raw = def.params.damage.unwrap_or(0);
                let outgoing = {
                    let Some(caster) = players.get_mut(&attacker) else {
                        return;
                    };
                    let (hp, max_hp) = (caster.hp, caster.max_hp);
                    caster.state.apply_damage_modifiers(raw, hp, max_hp)
                };

                match target {
                    TargetId::Monster => {
                        if !monster.is_alive() {
                            return;
                        }
                        monster.take_damage(outgoing);
                        damage_dealt = outgoing;
                    }
                    TargetId::Player(victim_id) => {
                        let Some(victim) = players.get_mut(&victim_id) else {
                            return;
                        };
                        if !victim.is_alive() {
                            return;
                        }
                        let resisted = victim.state.apply_damage_resistance(outgoing);
                        let armor = victim.state.effective_armor(0);
                        let final_damage = (resisted - armor).max(0);
                        victim.take_damage(final_damage);
                        damage_dealt = final_damage;

                        if final_damage > 0
                            && let Some(report) = victim.state.process_stone_armor_degradation()
                        {
                            log.events.push(RoundEvent::StoneArmorDegraded {
                                player: victim_id,
                                report,
                            });
                        }
                        if !victim.is_alive() {
                            log.events.push(RoundEvent::PlayerDied { player: victim_id });
                        }
                    }
                }

                if damage_dealt > 0
                    && let Some(caster) = players.get_mut(&attacker)
                {
                    let (hp, max_hp) = (caster.hp, caster.max_hp);
                    let healing = caster.state.life_steal_healing(damage_dealt, hp, max_hp);
                    if healing > 0 {
                        caster.heal(healing);
                        log.events.push(RoundEvent::LifeSteal {
                            player: attacker,
                            healing,
                        });
                    }
                }
            }
            AbilityCategory::Heal => {
                if let TargetId::Player(patient_id) = target
                    && let Some(patient) = players.get_mut(&patient_id)
                    && patient.is_alive()
                {
                    let amount = def.params.amount.unwrap_or(0);
                    let before = patient.hp;
                    patient.heal(amount);
                    healing_done = patient.hp - before;
                }
            }
            AbilityCategory::Defense | AbilityCategory::Special => {}
        }

        if let Some(tag) = def.effect
            && let Some((kind, duration)) = EffectKind::from_ability(tag, &def.params)
            && let TargetId::Player(victim_id) = target
            && let Some(victim) = players.get_mut(&victim_id)
            && victim.is_alive()
        {
            let outcome = victim.state.apply_status_effect(kind, duration);
            log.events.push(RoundEvent::EffectApplied {
                player: attacker,
                target,
                outcome,
            });
        }

        log.events.push(RoundEvent::AbilityResolved {
            player: attacker,
            ability: def.id.clone(),
            target,
            damage: damage_dealt,
            healing: healing_done,
        });
    }

    /// End-of-round timer advancement for everyone, dead or alive.
    fn tick_timers(&self, players: &mut BTreeMap<PlayerId, Combatant>, log: &mut RoundLog) {
        for combatant in players.values_mut() {
            let player = combatant.state.id();
            for entry in combatant.state.process_ability_cooldowns() {
                log.events.push(RoundEvent::CooldownTick { player, entry });
            }
            if let Some(entry) = combatant.state.process_racial_cooldowns() {
                log.events.push(RoundEvent::CooldownTick { player, entry });
            }
            if let Some(entry) = combatant.state.process_vulnerability() {
                log.events.push(RoundEvent::EffectTick { player, entry });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AbilityDefinition, AbilityParams};
    use crate::config::GameConfig;
    use crate::effects::EffectTag;
    use crate::loadout::{ClassConfig, RaceConfig, RacialAbilityDef, RacialPassives, UsageLimit};
    use crate::types::SubmissionStamp;
    use std::collections::HashMap;

    struct MapOracle(HashMap<AbilityId, AbilityDefinition>);

    impl AbilityOracle for MapOracle {
        fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition> {
            self.0.get(id)
        }
    }

    fn catalog() -> MapOracle {
        let defs = [
            AbilityDefinition {
                id: AbilityId::new("quick_stab"),
                name: "Quick Stab".into(),
                category: AbilityCategory::Attack,
                effect: None,
                target: TargetShape::Single,
                params: AbilityParams {
                    damage: Some(10),
                    ..AbilityParams::default()
                },
                order: 5,
                cooldown: 0,
                unlock_at: 1,
            },
            AbilityDefinition {
                id: AbilityId::new("heavy_blow"),
                name: "Heavy Blow".into(),
                category: AbilityCategory::Attack,
                effect: None,
                target: TargetShape::Single,
                params: AbilityParams {
                    damage: Some(25),
                    ..AbilityParams::default()
                },
                order: 20,
                cooldown: 2,
                unlock_at: 1,
            },
            AbilityDefinition {
                id: AbilityId::new("skull_ring"),
                name: "Skull Ring".into(),
                category: AbilityCategory::Attack,
                effect: Some(EffectTag::Stunned),
                target: TargetShape::Single,
                params: AbilityParams {
                    damage: Some(6),
                    duration: Some(1),
                    ..AbilityParams::default()
                },
                order: 8,
                cooldown: 2,
                unlock_at: 1,
            },
            AbilityDefinition {
                id: AbilityId::new("venom_dart"),
                name: "Venom Dart".into(),
                category: AbilityCategory::Special,
                effect: Some(EffectTag::Poisoned),
                target: TargetShape::Single,
                params: AbilityParams {
                    amount: Some(4),
                    duration: Some(2),
                    ..AbilityParams::default()
                },
                order: 15,
                cooldown: 1,
                unlock_at: 1,
            },
        ];
        MapOracle(defs.into_iter().map(|d| (d.id.clone(), d)).collect())
    }

    fn combatant(id: u32, catalog: &MapOracle) -> Combatant {
        let class = ClassConfig {
            name: "Warrior".into(),
            armor_bonus: 0,
            damage_modifier_percent: 100,
            damage_resistance_percent: 0,
            immunities: Vec::new(),
            abilities: vec![
                AbilityId::new("quick_stab"),
                AbilityId::new("heavy_blow"),
                AbilityId::new("skull_ring"),
                AbilityId::new("venom_dart"),
            ],
        };
        let race = RaceConfig {
            name: "Human".into(),
            ability: RacialAbilityDef {
                id: AbilityId::new("second_wind"),
                name: "Second Wind".into(),
                limit: UsageLimit::PerGame { max_uses: 1 },
                cooldown: 0,
                effect: None,
                params: AbilityParams::default(),
                next_hit_multiplier_percent: None,
            },
            passives: RacialPassives::default(),
            immunities: Vec::new(),
        };
        let state = PlayerCombatState::new(
            PlayerId(id),
            class,
            race,
            1,
            &GameConfig::default(),
            catalog,
        )
        .unwrap();
        Combatant::new(state, 100)
    }

    fn submit(players: &mut BTreeMap<PlayerId, Combatant>, id: u32, ability: &str, target: TargetId, catalog: &MapOracle, seq: u32) {
        let outcome = players
            .get_mut(&PlayerId(id))
            .unwrap()
            .state
            .submit_action(
                catalog,
                AbilityId::new(ability),
                Some(target),
                SubmissionStamp::new(1, seq),
            );
        assert!(outcome.success, "submit failed: {:?}", outcome.reason);
    }

    fn game(count: u32, catalog: &MapOracle) -> (BTreeMap<PlayerId, Combatant>, MonsterState) {
        let players = (1..=count)
            .map(|id| (PlayerId(id), combatant(id, catalog)))
            .collect();
        (players, MonsterState::new(200))
    }

    #[test]
    fn lower_order_resolves_first() {
        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);

        // Player 1 submits the slow ability first; player 2's fast one must
        // still resolve before it.
        submit(&mut players, 1, "heavy_blow", TargetId::Monster, &catalog, 0);
        submit(&mut players, 2, "quick_stab", TargetId::Monster, &catalog, 1);

        let orchestrator = RoundOrchestrator::new(&catalog);
        let log = orchestrator.resolve_round(1, &mut players, &mut monster);

        let resolved: Vec<PlayerId> = log
            .events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::AbilityResolved { player, .. } => Some(*player),
                _ => None,
            })
            .collect();
        assert_eq!(resolved, vec![PlayerId(2), PlayerId(1)]);
        assert_eq!(monster.hp, 200 - 10 - 25);
    }

    #[test]
    fn equal_priority_resolves_in_arrival_order() {
        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);

        // Same ability, so the same priority; player 2 submitted first and
        // must act first despite the higher player id.
        submit(&mut players, 2, "quick_stab", TargetId::Monster, &catalog, 0);
        submit(&mut players, 1, "quick_stab", TargetId::Monster, &catalog, 1);

        let orchestrator = RoundOrchestrator::new(&catalog);
        let log = orchestrator.resolve_round(1, &mut players, &mut monster);

        let resolved: Vec<PlayerId> = log
            .events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::AbilityResolved { player, .. } => Some(*player),
                _ => None,
            })
            .collect();
        assert_eq!(resolved, vec![PlayerId(2), PlayerId(1)]);
    }

    #[test]
    fn stun_landed_mid_round_blocks_the_following_round() {
        use crate::submission::SubmitError;

        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);
        submit(
            &mut players,
            1,
            "skull_ring",
            TargetId::Player(PlayerId(2)),
            &catalog,
            0,
        );

        let orchestrator = RoundOrchestrator::new(&catalog);
        orchestrator.resolve_round(1, &mut players, &mut monster);

        // The one-round stun survives the round it landed in.
        assert!(players[&PlayerId(2)].state.effects().is_stunned());
        let outcome = players.get_mut(&PlayerId(2)).unwrap().state.submit_action(
            &catalog,
            AbilityId::new("quick_stab"),
            Some(TargetId::Monster),
            SubmissionStamp::new(2, 0),
        );
        assert_eq!(outcome.reason, Some(SubmitError::Stunned));

        // It expires after the round it denied.
        orchestrator.resolve_round(2, &mut players, &mut monster);
        assert!(!players[&PlayerId(2)].state.effects().is_stunned());
        let outcome = players.get_mut(&PlayerId(2)).unwrap().state.submit_action(
            &catalog,
            AbilityId::new("quick_stab"),
            Some(TargetId::Monster),
            SubmissionStamp::new(3, 0),
        );
        assert!(outcome.success);
    }

    #[test]
    fn used_ability_goes_on_cooldown_and_slots_clear() {
        let catalog = catalog();
        let (mut players, mut monster) = game(1, &catalog);
        submit(&mut players, 1, "heavy_blow", TargetId::Monster, &catalog, 0);

        let orchestrator = RoundOrchestrator::new(&catalog);
        orchestrator.resolve_round(1, &mut players, &mut monster);

        let player = &players[&PlayerId(1)];
        // Stored 2+1, end-of-round tick already consumed one.
        assert_eq!(player.state.ability_cooldown(&AbilityId::new("heavy_blow")), 2);
        assert!(!player.state.submission_status().has_submitted);
    }

    #[test]
    fn non_responders_log_no_action_and_round_proceeds() {
        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);
        submit(&mut players, 1, "quick_stab", TargetId::Monster, &catalog, 0);

        let orchestrator = RoundOrchestrator::new(&catalog);
        let log = orchestrator.resolve_round(1, &mut players, &mut monster);

        assert!(log.events.contains(&RoundEvent::NoAction { player: PlayerId(2) }));
        assert_eq!(monster.hp, 190);
    }

    #[test]
    fn submission_against_dead_target_is_invalidated_not_resolved() {
        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);
        submit(
            &mut players,
            1,
            "quick_stab",
            TargetId::Player(PlayerId(2)),
            &catalog,
            0,
        );

        // Target dies between select and resolve.
        players.get_mut(&PlayerId(2)).unwrap().hp = 0;

        let orchestrator = RoundOrchestrator::new(&catalog);
        let log = orchestrator.resolve_round(1, &mut players, &mut monster);

        assert!(log.events.iter().any(|e| matches!(
            e,
            RoundEvent::SubmissionInvalidated {
                player: PlayerId(1),
                reason: InvalidReason::TargetDead,
            }
        )));
        assert!(!log
            .events
            .iter()
            .any(|e| matches!(e, RoundEvent::AbilityResolved { .. })));
    }

    #[test]
    fn applied_poison_ticks_next_round_start() {
        let catalog = catalog();
        let (mut players, mut monster) = game(2, &catalog);
        submit(
            &mut players,
            1,
            "venom_dart",
            TargetId::Player(PlayerId(2)),
            &catalog,
            0,
        );

        let orchestrator = RoundOrchestrator::new(&catalog);
        orchestrator.resolve_round(1, &mut players, &mut monster);
        assert!(players[&PlayerId(2)].state.effects().has(EffectTag::Poisoned));
        assert_eq!(players[&PlayerId(2)].hp, 100);

        let log = orchestrator.resolve_round(2, &mut players, &mut monster);
        assert_eq!(players[&PlayerId(2)].hp, 96);
        assert!(log.events.iter().any(|e| matches!(
            e,
            RoundEvent::EffectTick { player: PlayerId(2), .. }
        )));
    }

    #[test]
    fn monster_death_is_logged() {
        let catalog = catalog();
        let (mut players, mut monster) = game(1, &catalog);
        monster.hp = 5;
        submit(&mut players, 1, "quick_stab", TargetId::Monster, &catalog, 0);

        let orchestrator = RoundOrchestrator::new(&catalog);
        let log = orchestrator.resolve_round(1, &mut players, &mut monster);

        assert_eq!(monster.hp, 0);
        assert!(log.events.contains(&RoundEvent::MonsterDied));
    }
}
