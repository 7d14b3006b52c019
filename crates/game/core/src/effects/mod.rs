//! Status effect engine.
//!
//! Timed effects are stored as a closed tagged-variant type with per-variant
//! payload so stacking, immunity, and the modifier pipeline are exhaustively
//! checked at compile time instead of via string comparison.
//!
//! # Round-based duration
//!
//! Effects store `remaining` rounds. Processing runs twice per round:
//! damage-over-time at the start, healing-over-time and buff expiry at the
//! end. Each phase decrements only the effects it owns and removes zeroed
//! entries. Vulnerability is the exception: it is decremented by the
//! dedicated vulnerability pass so the incoming-damage pipeline sees a
//! consistent value for the whole round.
//!
//! State-modifier effects store one extra round on application: their
//! decrement pass still runs in the round they land, and a one-round stun
//! or shield must survive into the round it is meant to deny. Per-tick
//! effects deliver their value inside the pass and store the raw duration.

mod modifiers;
mod stone_armor;

pub use modifiers::{compose_incoming, compose_outgoing, life_steal_healing};
pub use stone_armor::{DegradationReport, StoneArmor};

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Payload-free identifier for an effect variant.
///
/// Used in immunity lists, stacking tables, ability definitions, and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTag {
    Poisoned,
    Bleeding,
    Shielded,
    Vulnerable,
    Weakened,
    Enraged,
    Stunned,
    Invisible,
    Regenerating,
    Resistant,
    Immune,
}

impl EffectTag {
    /// Maximum stack count for this effect. Non-stacking effects refresh
    /// their duration instead.
    pub const fn max_stacks(&self) -> u8 {
        match self {
            Self::Poisoned | Self::Bleeding => 3,
            _ => 1,
        }
    }

    /// Whether an application stores `duration + 1`.
    ///
    /// The decrement pass for these effects still runs in the round the
    /// application lands; without the extra round a one-round effect would
    /// expire before anything observed it. Per-tick effects (damage and
    /// healing over time) deliver inside their pass and store the raw
    /// duration.
    pub(crate) const fn absorbs_application_round(&self) -> bool {
        !matches!(self, Self::Poisoned | Self::Bleeding | Self::Regenerating)
    }

    /// Debuffs are subject to immunity checks; buffs always land.
    pub const fn is_debuff(&self) -> bool {
        matches!(
            self,
            Self::Poisoned | Self::Bleeding | Self::Vulnerable | Self::Weakened | Self::Stunned
        )
    }
}

/// List of effect tags blocked by a temporary immunity. Empty blocks all
/// debuffs.
pub type ImmunityTags = ArrayVec<EffectTag, { GameConfig::MAX_IMMUNITY_TAGS }>;

/// A status effect variant with its numeric payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectKind {
    /// Damage at the start of each round. Stacks.
    Poisoned { damage: i32 },
    /// Damage at the start of each round. Stacks.
    Bleeding { damage: i32 },
    /// Bonus armor while active.
    Shielded { armor: i32 },
    /// Multiplicative increase to damage taken.
    Vulnerable { increase_percent: u32 },
    /// Flat percentage reduction to damage dealt.
    Weakened { reduction_percent: u32 },
    /// Multiplicative increase to damage dealt.
    Enraged { multiplier_percent: u32 },
    /// Cannot act.
    Stunned,
    /// Cannot be targeted by the monster's heuristics.
    Invisible,
    /// Healing at the end of each round.
    Regenerating { amount: i32 },
    /// Flat percentage reduction to damage taken.
    Resistant { reduction_percent: u32 },
    /// Blocks application of the listed debuffs (all debuffs when empty).
    Immune { blocked: ImmunityTags },
}

impl EffectKind {
    /// Builds the concrete effect an ability applies from its catalog
    /// parameters, paired with the duration in rounds.
    ///
    /// Returns `None` when the parameters cannot supply the variant's
    /// payload (a content mistake surfaced as "ability applies nothing").
    pub fn from_ability(tag: EffectTag, params: &crate::catalog::AbilityParams) -> Option<(Self, u8)> {
        let duration = params.duration.unwrap_or(1);
        let kind = match tag {
            EffectTag::Poisoned => Self::Poisoned {
                damage: params.amount?,
            },
            EffectTag::Bleeding => Self::Bleeding {
                damage: params.amount?,
            },
            EffectTag::Shielded => Self::Shielded {
                armor: params.armor?,
            },
            EffectTag::Vulnerable => Self::Vulnerable {
                increase_percent: params.percent?,
            },
            EffectTag::Weakened => Self::Weakened {
                reduction_percent: params.percent?,
            },
            EffectTag::Enraged => Self::Enraged {
                multiplier_percent: params.percent?,
            },
            EffectTag::Stunned => Self::Stunned,
            EffectTag::Invisible => Self::Invisible,
            EffectTag::Regenerating => Self::Regenerating {
                amount: params.amount?,
            },
            EffectTag::Resistant => Self::Resistant {
                reduction_percent: params.percent?,
            },
            EffectTag::Immune => Self::Immune {
                blocked: ImmunityTags::new(),
            },
        };
        Some((kind, duration))
    }

    pub fn tag(&self) -> EffectTag {
        match self {
            Self::Poisoned { .. } => EffectTag::Poisoned,
            Self::Bleeding { .. } => EffectTag::Bleeding,
            Self::Shielded { .. } => EffectTag::Shielded,
            Self::Vulnerable { .. } => EffectTag::Vulnerable,
            Self::Weakened { .. } => EffectTag::Weakened,
            Self::Enraged { .. } => EffectTag::Enraged,
            Self::Stunned => EffectTag::Stunned,
            Self::Invisible => EffectTag::Invisible,
            Self::Regenerating { .. } => EffectTag::Regenerating,
            Self::Resistant { .. } => EffectTag::Resistant,
            Self::Immune { .. } => EffectTag::Immune,
        }
    }
}

/// When during the round a processing pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectTiming {
    /// Damage-over-time (poison, bleed).
    StartOfRound,
    /// Healing-over-time and buff expiry.
    EndOfRound,
}

/// Outcome of an effect application attempt.
///
/// An immune target's application is a reported no-op, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Applied {
    /// New effect added.
    Fresh,
    /// Existing stackable effect gained a stack.
    Stacked,
    /// Existing effect had its duration refreshed.
    Refreshed,
    /// Already at max stacks; duration refreshed only.
    AtMaxStacks,
    /// Target is immune to this effect.
    Immune,
    /// Effect capacity reached; application dropped.
    CapacityFull,
}

impl Applied {
    /// True when the application changed (or at least refreshed) state.
    pub const fn accepted(&self) -> bool {
        !matches!(self, Self::Immune | Self::CapacityFull)
    }
}

/// What happened to an effect during a processing pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectEvent {
    /// Effect dealt damage this round (magnitude = total damage).
    Damage,
    /// Effect healed this round (magnitude = healing).
    Heal,
    /// Effect ran out and was removed.
    Expired,
}

/// Narration-ready record of one effect event. The engine never prints;
/// the transport layer turns these into player-facing messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectLogEntry {
    pub tag: EffectTag,
    pub event: EffectEvent,
    pub magnitude: i32,
    pub remaining: u8,
}

/// A single active status effect.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: EffectKind,
    /// Rounds left before expiry.
    pub remaining: u8,
    pub stacks: u8,
}

impl StatusEffect {
    pub fn max_stacks(&self) -> u8 {
        self.kind.tag().max_stacks()
    }
}

/// Active status effects on one player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffects {
    effects: ArrayVec<StatusEffect, { GameConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffects {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Checks whether an effect with the given tag is active.
    pub fn has(&self, tag: EffectTag) -> bool {
        self.effects.iter().any(|e| e.kind.tag() == tag)
    }

    pub fn get(&self, tag: EffectTag) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind.tag() == tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Attempts to apply an effect for `duration` rounds.
    ///
    /// Immunity is checked before application: class-level immunities, then
    /// an active [`EffectKind::Immune`] effect. Stackable effects gain a
    /// stack up to their declared maximum; non-stacking effects refresh to
    /// the longer remaining duration.
    pub fn apply(
        &mut self,
        kind: EffectKind,
        duration: u8,
        class_immunities: &[EffectTag],
    ) -> Applied {
        let tag = kind.tag();

        if tag.is_debuff() && self.blocks(tag, class_immunities) {
            return Applied::Immune;
        }

        let duration = if tag.absorbs_application_round() {
            duration.saturating_add(1)
        } else {
            duration
        };

        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind.tag() == tag) {
            let max = tag.max_stacks();
            if max > 1 {
                if existing.stacks < max {
                    existing.stacks += 1;
                    existing.remaining = existing.remaining.max(duration);
                    return Applied::Stacked;
                }
                existing.remaining = existing.remaining.max(duration);
                return Applied::AtMaxStacks;
            }
            // Non-stacking: take the fresher payload and the longer duration.
            existing.kind = kind;
            existing.remaining = existing.remaining.max(duration);
            return Applied::Refreshed;
        }

        if self.effects.is_full() {
            return Applied::CapacityFull;
        }
        self.effects.push(StatusEffect {
            kind,
            remaining: duration,
            stacks: 1,
        });
        Applied::Fresh
    }

    /// Removes an effect immediately (cure).
    ///
    /// Returns true if the effect was present.
    pub fn cure(&mut self, tag: EffectTag) -> bool {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind.tag() != tag);
        self.effects.len() != before
    }

    fn blocks(&self, tag: EffectTag, class_immunities: &[EffectTag]) -> bool {
        if class_immunities.contains(&tag) {
            return true;
        }
        self.effects.iter().any(|e| match &e.kind {
            EffectKind::Immune { blocked } => blocked.is_empty() || blocked.contains(&tag),
            _ => false,
        })
    }

    /// Runs one processing pass, decrementing the durations owned by that
    /// timing and removing zeroed effects.
    ///
    /// Returns the structured log; the caller applies any damage/healing to
    /// hit points.
    pub fn process(&mut self, timing: EffectTiming) -> Vec<EffectLogEntry> {
        let mut log = Vec::new();

        for effect in self.effects.iter_mut() {
            if !Self::owned_by(effect.kind.tag(), timing) {
                continue;
            }

            match &effect.kind {
                EffectKind::Poisoned { damage } | EffectKind::Bleeding { damage } => {
                    let total = damage.saturating_mul(effect.stacks as i32);
                    effect.remaining = effect.remaining.saturating_sub(1);
                    log.push(EffectLogEntry {
                        tag: effect.kind.tag(),
                        event: EffectEvent::Damage,
                        magnitude: total,
                        remaining: effect.remaining,
                    });
                }
                EffectKind::Regenerating { amount } => {
                    let amount = *amount;
                    effect.remaining = effect.remaining.saturating_sub(1);
                    log.push(EffectLogEntry {
                        tag: EffectTag::Regenerating,
                        event: EffectEvent::Heal,
                        magnitude: amount,
                        remaining: effect.remaining,
                    });
                }
                _ => {
                    effect.remaining = effect.remaining.saturating_sub(1);
                }
            }
        }

        self.effects.retain(|e| {
            let expired = Self::owned_by(e.kind.tag(), timing) && e.remaining == 0;
            if expired {
                log.push(EffectLogEntry {
                    tag: e.kind.tag(),
                    event: EffectEvent::Expired,
                    magnitude: 0,
                    remaining: 0,
                });
            }
            !expired
        });

        log
    }

    /// Decrements the vulnerability debuff by one round, expiring it on the
    /// final call and resetting the increase to 0.
    pub fn process_vulnerability(&mut self) -> Option<EffectLogEntry> {
        let effect = self
            .effects
            .iter_mut()
            .find(|e| e.kind.tag() == EffectTag::Vulnerable)?;

        effect.remaining = effect.remaining.saturating_sub(1);
        if effect.remaining > 0 {
            return None;
        }

        self.effects.retain(|e| e.kind.tag() != EffectTag::Vulnerable);
        Some(EffectLogEntry {
            tag: EffectTag::Vulnerable,
            event: EffectEvent::Expired,
            magnitude: 0,
            remaining: 0,
        })
    }

    /// Which timing decrements which tag. Vulnerability belongs to neither;
    /// the dedicated vulnerability pass owns it.
    fn owned_by(tag: EffectTag, timing: EffectTiming) -> bool {
        match timing {
            EffectTiming::StartOfRound => {
                matches!(tag, EffectTag::Poisoned | EffectTag::Bleeding)
            }
            EffectTiming::EndOfRound => !matches!(
                tag,
                EffectTag::Poisoned | EffectTag::Bleeding | EffectTag::Vulnerable
            ),
        }
    }

    // ===== values read by the modifier pipeline =====

    /// Armor contributed by an active shield effect.
    pub fn shield_armor(&self) -> i32 {
        self.effects
            .iter()
            .filter_map(|e| match e.kind {
                EffectKind::Shielded { armor } => Some(armor),
                _ => None,
            })
            .sum()
    }

    /// Multiplicative increase to damage taken, in percent.
    pub fn vulnerability_percent(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|e| match e.kind {
                EffectKind::Vulnerable { increase_percent } => Some(increase_percent),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Flat reduction to damage taken, in percent.
    pub fn resistance_percent(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|e| match e.kind {
                EffectKind::Resistant { reduction_percent } => Some(reduction_percent),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Multiplicative increase to damage dealt, in percent.
    pub fn enrage_percent(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|e| match e.kind {
                EffectKind::Enraged { multiplier_percent } => Some(multiplier_percent),
                _ => None,
            })
            .unwrap_or(0)
    }

    /// Flat reduction to damage dealt, in percent.
    pub fn weakened_percent(&self) -> u32 {
        self.effects
            .iter()
            .find_map(|e| match e.kind {
                EffectKind::Weakened { reduction_percent } => Some(reduction_percent),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn is_stunned(&self) -> bool {
        self.has(EffectTag::Stunned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poison() -> EffectKind {
        EffectKind::Poisoned { damage: 5 }
    }

    #[test]
    fn poison_stacks_up_to_max() {
        let mut effects = StatusEffects::empty();
        assert_eq!(effects.apply(poison(), 3, &[]), Applied::Fresh);
        assert_eq!(effects.apply(poison(), 3, &[]), Applied::Stacked);
        assert_eq!(effects.apply(poison(), 3, &[]), Applied::Stacked);
        assert_eq!(effects.apply(poison(), 3, &[]), Applied::AtMaxStacks);
        assert_eq!(effects.get(EffectTag::Poisoned).unwrap().stacks, 3);
    }

    #[test]
    fn stacked_poison_deals_scaled_damage_at_start() {
        let mut effects = StatusEffects::empty();
        effects.apply(poison(), 2, &[]);
        effects.apply(poison(), 2, &[]);

        let log = effects.process(EffectTiming::StartOfRound);
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].event, EffectEvent::Damage);
        assert_eq!(log[0].magnitude, 10);
        assert_eq!(log[0].remaining, 1);
    }

    #[test]
    fn dot_untouched_by_end_of_round_pass() {
        let mut effects = StatusEffects::empty();
        effects.apply(poison(), 2, &[]);

        let log = effects.process(EffectTiming::EndOfRound);
        assert!(log.is_empty());
        assert_eq!(effects.get(EffectTag::Poisoned).unwrap().remaining, 2);
    }

    #[test]
    fn regeneration_heals_and_expires_at_end() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Regenerating { amount: 8 }, 1, &[]);

        let log = effects.process(EffectTiming::EndOfRound);
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].event, EffectEvent::Heal);
        assert_eq!(log[0].magnitude, 8);
        assert_eq!(log[1].event, EffectEvent::Expired);
        assert!(!effects.has(EffectTag::Regenerating));
    }

    #[test]
    fn class_immunity_blocks_debuff_as_noop() {
        let mut effects = StatusEffects::empty();
        let outcome = effects.apply(poison(), 3, &[EffectTag::Poisoned]);
        assert_eq!(outcome, Applied::Immune);
        assert!(!outcome.accepted());
        assert!(effects.is_empty());
    }

    #[test]
    fn immune_effect_blocks_listed_tags_only() {
        let mut effects = StatusEffects::empty();
        let mut blocked = ImmunityTags::new();
        blocked.push(EffectTag::Stunned);
        effects.apply(EffectKind::Immune { blocked }, 2, &[]);

        assert_eq!(effects.apply(EffectKind::Stunned, 1, &[]), Applied::Immune);
        assert_eq!(effects.apply(poison(), 2, &[]), Applied::Fresh);
    }

    #[test]
    fn empty_immune_list_blocks_all_debuffs_not_buffs() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Immune { blocked: ImmunityTags::new() }, 2, &[]);

        assert_eq!(effects.apply(EffectKind::Stunned, 1, &[]), Applied::Immune);
        assert_eq!(
            effects.apply(EffectKind::Shielded { armor: 3 }, 2, &[]),
            Applied::Fresh
        );
    }

    #[test]
    fn non_stacking_effect_refreshes_to_longer_duration() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Shielded { armor: 3 }, 4, &[]);
        let outcome = effects.apply(EffectKind::Shielded { armor: 5 }, 2, &[]);

        assert_eq!(outcome, Applied::Refreshed);
        let shield = effects.get(EffectTag::Shielded).unwrap();
        // 4 rounds plus the application round the end pass will absorb.
        assert_eq!(shield.remaining, 5);
        assert_eq!(shield.stacks, 1);
        assert_eq!(effects.shield_armor(), 5);
    }

    #[test]
    fn vulnerability_expires_on_final_pass() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Vulnerable { increase_percent: 50 }, 2, &[]);

        // The pass of the application round, then two full rounds.
        assert_eq!(effects.process_vulnerability(), None);
        assert_eq!(effects.process_vulnerability(), None);
        assert_eq!(effects.vulnerability_percent(), 50);

        let expiry = effects.process_vulnerability().expect("expires on final call");
        assert_eq!(expiry.event, EffectEvent::Expired);
        assert_eq!(effects.vulnerability_percent(), 0);
    }

    #[test]
    fn one_round_stun_survives_the_pass_of_its_own_round() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Stunned, 1, &[]);

        // End-of-round pass of the round the stun landed in.
        effects.process(EffectTiming::EndOfRound);
        assert!(effects.is_stunned());

        // It expires after the round it denied.
        let log = effects.process(EffectTiming::EndOfRound);
        assert!(!effects.is_stunned());
        assert!(log.iter().any(|e| e.event == EffectEvent::Expired));
    }

    #[test]
    fn only_damage_over_time_debuffs_stack() {
        use strum::IntoEnumIterator;

        for tag in EffectTag::iter() {
            let stackable = tag.max_stacks() > 1;
            assert_eq!(
                stackable,
                matches!(tag, EffectTag::Poisoned | EffectTag::Bleeding),
                "{tag}"
            );
            if stackable {
                assert!(tag.is_debuff());
            }
        }
    }

    #[test]
    fn end_of_round_pass_leaves_vulnerability_alone() {
        let mut effects = StatusEffects::empty();
        effects.apply(EffectKind::Vulnerable { increase_percent: 50 }, 1, &[]);

        effects.process(EffectTiming::EndOfRound);
        assert_eq!(effects.vulnerability_percent(), 50);
    }

    #[test]
    fn cure_removes_effect_immediately() {
        let mut effects = StatusEffects::empty();
        effects.apply(poison(), 3, &[]);
        assert!(effects.cure(EffectTag::Poisoned));
        assert!(!effects.cure(EffectTag::Poisoned));
        assert!(effects.is_empty());
    }
}
