//! Damage and healing modifier composition.
//!
//! Composition order is fixed so outcomes are reproducible:
//!
//! - Outgoing: one-shot racial multiplier (consumed) → class modifier →
//!   passive level scaling → missing-health scaling → rage multiplier →
//!   flat "weakened" reduction.
//! - Incoming: vulnerability increase → flat resistance reduction.
//!
//! All math is integer (`value * (100 ± pct) / 100`, division applied per
//! factor); no floats anywhere in the engine.

use super::StatusEffects;
use crate::loadout::{ClassConfig, RacialPassives};

fn scale(value: i32, percent: u32) -> i32 {
    ((value as i64 * percent as i64) / 100) as i32
}

/// Composes every outgoing-damage modifier onto `raw`.
///
/// Consumes the armed one-shot multiplier, if any ("double next hit" style
/// racial abilities fire exactly once).
pub fn compose_outgoing(
    raw: i32,
    class: &ClassConfig,
    passives: &RacialPassives,
    level: u8,
    hp: i32,
    max_hp: i32,
    next_hit_multiplier: &mut Option<u32>,
    effects: &StatusEffects,
) -> i32 {
    if raw <= 0 {
        return 0;
    }
    let mut damage = raw;

    if let Some(multiplier) = next_hit_multiplier.take() {
        damage = scale(damage, multiplier);
    }

    damage = scale(damage, class.damage_modifier_percent);

    if let Some(per_level) = passives.damage_per_level_percent {
        damage = scale(damage, 100 + per_level * level as u32);
    }

    if let Some(max_bonus) = passives.low_health_bonus_percent
        && max_hp > 0
    {
        let missing_percent = ((max_hp - hp).clamp(0, max_hp) as i64 * 100 / max_hp as i64) as u32;
        let bonus = max_bonus * missing_percent / 100;
        damage = scale(damage, 100 + bonus);
    }

    let rage = effects.enrage_percent();
    if rage > 0 {
        damage = scale(damage, 100 + rage);
    }

    let weakened = effects.weakened_percent().min(100);
    if weakened > 0 {
        damage = scale(damage, 100 - weakened);
    }

    damage.max(0)
}

/// Composes incoming-damage modifiers onto `raw`: vulnerability increase
/// first, then the flat resistance reduction (class plus any temporary
/// resistance effect).
pub fn compose_incoming(raw: i32, class: &ClassConfig, effects: &StatusEffects) -> i32 {
    if raw <= 0 {
        return 0;
    }
    let mut damage = raw;

    let vulnerability = effects.vulnerability_percent();
    if vulnerability > 0 {
        damage = scale(damage, 100 + vulnerability);
    }

    let reduction = (class.damage_resistance_percent + effects.resistance_percent()).min(100);
    if reduction > 0 {
        damage = scale(damage, 100 - reduction);
    }

    damage.max(0)
}

/// Healing from a life-steal passive after dealing damage, capped so current
/// health never exceeds maximum.
pub fn life_steal_healing(percent: u32, damage_dealt: i32, hp: i32, max_hp: i32) -> i32 {
    if damage_dealt <= 0 {
        return 0;
    }
    let healing = scale(damage_dealt, percent);
    healing.min((max_hp - hp).max(0))
}
