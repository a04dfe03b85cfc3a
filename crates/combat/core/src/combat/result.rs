//! The composed attack and its report.

use tracing::debug;

use super::damage::{apply_reductions, deal_damage, roll_attacker_damage, target_damage};
use super::hit::resolve_hits;
use super::range::{apply_range, range_multiplier};
use super::reaction::{RecoilOutcome, apply_knockback, apply_recoil};
use super::ActionContext;
use crate::economy::{MoveAction, move_action};
use crate::state::CharacterId;

/// What one target took from an attack.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetOutcome {
    pub target: CharacterId,
    /// Per-slot damage after range and reductions.
    pub amounts: Vec<f64>,
    pub total: i64,
    /// Health the attacker lost to this target's knockback.
    pub knockback: i64,
    pub recoil: Option<RecoilOutcome>,
}

/// Full account of one resolved attack.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackReport {
    pub attacker: Option<CharacterId>,
    /// The attacker's hit roll failed.
    pub missed: bool,
    pub dodged: Vec<CharacterId>,
    pub critical: bool,
    pub outcomes: Vec<TargetOutcome>,
}

impl AttackReport {
    pub fn hits(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.outcomes.iter().map(|outcome| outcome.target)
    }

    pub fn total_damage(&self) -> i64 {
        self.outcomes.iter().map(|outcome| outcome.total).sum()
    }
}

/// Runs the whole pipeline for the context's attacker against `targets`.
///
/// Damage is rolled once per attack and shared by every target hit; range,
/// reductions, knockback and recoil are resolved per target in list order.
pub fn resolve_attack(ctx: &mut ActionContext<'_>, targets: &[CharacterId]) -> AttackReport {
    let mut report = AttackReport::default();
    if ctx.attacker().is_none() {
        return report;
    }
    report.attacker = Some(ctx.attacker);

    let resolution = resolve_hits(ctx, targets);
    report.missed = resolution.attacker_missed;
    report.dodged = resolution.dodged;
    if resolution.hits.is_empty() {
        return report;
    }

    let roll = roll_attacker_damage(ctx);
    report.critical = roll.any_crit();

    for target in resolution.hits {
        let Some(amounts) = prepare_damage(ctx, &roll, target) else {
            continue;
        };
        let Some(total) = deal_damage(ctx, target, &amounts) else {
            continue;
        };
        let knockback = apply_knockback(ctx, target, total);
        let recoil = apply_recoil(ctx, target);
        report.outcomes.push(TargetOutcome {
            target,
            amounts,
            total,
            knockback,
            recoil,
        });
    }

    debug!(
        target: "combat::damage",
        attacker = %ctx.attacker,
        hits = report.outcomes.len(),
        dodged = report.dodged.len(),
        total = report.total_damage(),
        "attack resolved"
    );
    report
}

/// Steps 3-5 for one target: crit selection, range modifier, reductions.
fn prepare_damage(
    ctx: &ActionContext<'_>,
    roll: &super::damage::DamageRoll,
    target: CharacterId,
) -> Option<Vec<f64>> {
    let attacker = ctx.attacker()?;
    let defender = ctx.roster.get(target)?;
    let selected = target_damage(roll, defender);
    let distance = attacker.location().distance(&defender.location());
    let ranged = apply_range(selected, range_multiplier(&attacker.stats.range, distance));
    Some(apply_reductions(&ranged, &defender.stats))
}

/// The default attack: the full pipeline against the move's targets.
pub fn basic_attack() -> MoveAction {
    move_action(|ctx, targets| {
        resolve_attack(ctx, targets);
    })
}
