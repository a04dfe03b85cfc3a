//! Knockback and recoil: the side effects of landing a hit.

use tracing::debug;

use super::ActionContext;
use super::damage::resistance_factor;
use crate::events::CombatEvent;
use crate::state::{CharacterId, Point};

/// A target pushed by recoil.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoilOutcome {
    pub magnitude: f64,
    pub from: Point,
    pub to: Point,
}

/// Reflects part of `total` damage back onto the attacker.
///
/// The magnitude is the target's percent share of `total` plus its constant,
/// less the attacker's first-slot reduction, floored at zero and scaled by the
/// attacker's first-slot resistance. Returns the health the attacker lost.
pub fn apply_knockback(ctx: &mut ActionContext<'_>, target: CharacterId, total: i64) -> i64 {
    let Some(profile) = ctx.roster.get(target).map(|c| c.stats.knockback) else {
        return 0;
    };
    let Some(guard) = ctx.attacker().map(|a| a.stats.defense_slot(0)) else {
        return 0;
    };

    let raw =
        (total as f64 * profile.percent / 100.0 + profile.constant - guard.reduction).max(0.0);
    let amount = (raw * resistance_factor(guard.resistance)).round() as i64;
    if amount == 0 {
        return 0;
    }

    let attacker = ctx.attacker;
    ctx.emit(CombatEvent::Knockback {
        attacker,
        target,
        amount,
    });
    if let Some(character) = ctx.roster.get_mut(attacker) {
        let health = character.health.get();
        character.health.set(health - amount);
    }
    debug!(target: "combat::damage", attacker = %attacker, target = %target, amount, "knockback");
    amount
}

/// Pushes `target` directly away from the attacker.
///
/// Only attackers with a positive minimum recoil push. The magnitude is drawn
/// from `[min, max)`.
pub fn apply_recoil(ctx: &mut ActionContext<'_>, target: CharacterId) -> Option<RecoilOutcome> {
    let attacker = ctx.attacker()?;
    let recoil = attacker.stats.recoil;
    if recoil.min <= 0.0 {
        return None;
    }
    let origin = attacker.location();
    let from = ctx.roster.location(target)?;

    let magnitude = ctx.rng.uniform(recoil.min, recoil.max);
    let angle = origin.angle_to(&from);
    let to = from.offset_polar(angle, magnitude);

    let attacker = ctx.attacker;
    ctx.emit(CombatEvent::RecoilSent {
        attacker,
        target,
        magnitude,
    });
    ctx.emit(CombatEvent::RecoilReceived {
        attacker,
        target,
        from,
        to,
    });
    if let Some(character) = ctx.roster.get_mut(target) {
        character.position.set(to);
    }
    debug!(target: "combat::damage", attacker = %attacker, target = %target, magnitude, "recoil");

    Some(RecoilOutcome { magnitude, from, to })
}
