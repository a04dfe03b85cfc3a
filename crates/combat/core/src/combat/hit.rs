//! Hit and dodge resolution.

use tracing::trace;

use super::ActionContext;
use crate::events::CombatEvent;
use crate::state::CharacterId;
use crate::stats::HitStatus;

/// Which targets an attack connects with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HitResolution {
    pub hits: Vec<CharacterId>,
    pub dodged: Vec<CharacterId>,
    /// The attacker's own hit roll failed; no target was rolled against.
    pub attacker_missed: bool,
}

/// Resolves which of `targets` the attacker hits.
///
/// An `AlwaysHit` attacker hits every target without rolling. Otherwise one
/// roll against the attacker's hit chance gates the whole attack, followed by
/// one dodge roll per target. Targets absent from the roster are ignored.
pub fn resolve_hits(ctx: &mut ActionContext<'_>, targets: &[CharacterId]) -> HitResolution {
    let mut resolution = HitResolution::default();
    let Some(attacker) = ctx.attacker() else {
        return resolution;
    };
    let attacker_id = attacker.id;
    let hit_status = attacker.stats.hit_status;
    let hit_chance = attacker.stats.hit_chance;

    let present: Vec<CharacterId> = targets
        .iter()
        .copied()
        .filter(|id| ctx.roster.contains(*id))
        .collect();

    if hit_status == HitStatus::AlwaysHit {
        resolution.hits = present;
        return resolution;
    }

    if !ctx.rng.roll_percent(hit_chance) {
        trace!(target: "combat::damage", attacker = %attacker_id, "attack missed outright");
        ctx.emit(CombatEvent::Missed {
            attacker: attacker_id,
            target: None,
        });
        resolution.attacker_missed = true;
        return resolution;
    }

    for target in present {
        let dodge_chance = ctx
            .roster
            .get(target)
            .map_or(0.0, |c| c.stats.dodge_chance);
        if ctx.rng.roll_percent(dodge_chance) {
            trace!(target: "combat::damage", attacker = %attacker_id, target = %target, "dodged");
            ctx.emit(CombatEvent::Dodged {
                attacker: attacker_id,
                target,
            });
            resolution.dodged.push(target);
        } else {
            resolution.hits.push(target);
        }
    }

    resolution
}
