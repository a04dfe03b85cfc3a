//! Damage rolls, reductions and application.

use tracing::debug;

use super::ActionContext;
use crate::events::CombatEvent;
use crate::state::{Character, CharacterId};
use crate::stats::CombatStats;

/// Per-slot damage rolled by an attacker, with and without crits.
///
/// `base[i]` is the raw roll for damage slot `i`; `crit[i]` is the same roll
/// with slot `i`'s crit multiplier applied when its crit succeeded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DamageRoll {
    pub base: Vec<f64>,
    pub crit: Vec<f64>,
}

impl DamageRoll {
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Whether any slot critted.
    pub fn any_crit(&self) -> bool {
        self.base.iter().zip(&self.crit).any(|(base, crit)| base != crit)
    }
}

/// Rolls every damage slot of the attacker.
///
/// Per slot: one draw for the amount in `[min, max]` (none when the range is
/// a single value), then one crit roll. Each successful crit is announced.
pub fn roll_attacker_damage(ctx: &mut ActionContext<'_>) -> DamageRoll {
    let Some(attacker) = ctx.attacker() else {
        return DamageRoll::default();
    };
    let attacker_id = attacker.id;
    let slots = attacker.stats.damage.clone();

    let mut roll = DamageRoll {
        base: Vec::with_capacity(slots.len()),
        crit: Vec::with_capacity(slots.len()),
    };
    for (index, slot) in slots.iter().enumerate() {
        let amount = ctx.rng.range_inclusive(slot.min, slot.max) as f64;
        let critical = ctx.rng.roll_percent(slot.crit_chance);
        roll.base.push(amount);
        if critical {
            let boosted = amount * slot.crit_multiplier;
            debug!(
                target: "combat::damage",
                attacker = %attacker_id,
                slot = index,
                kind = %slot.kind,
                amount = boosted,
                "critical hit"
            );
            ctx.emit(CombatEvent::Crit {
                attacker: attacker_id,
                slot: index,
                kind: slot.kind,
                amount: boosted,
            });
            roll.crit.push(boosted);
        } else {
            roll.crit.push(amount);
        }
    }
    roll
}

/// The damage vector a given target receives from `roll`.
pub fn target_damage<'r>(roll: &'r DamageRoll, target: &Character) -> &'r [f64] {
    if target.stats.crit_immune {
        &roll.base
    } else {
        &roll.crit
    }
}

/// Multiplier for a resistance on a 0-100 scale.
///
/// Negative resistance amplifies: `-25` yields `1.25`.
pub fn resistance_factor(resistance: f64) -> f64 {
    (100.0 - resistance) / 100.0
}

/// Applies the defender's flat reduction (floored at zero) and resistance to
/// each slot, matching defense slots by index.
pub fn apply_reductions(amounts: &[f64], defender: &CombatStats) -> Vec<f64> {
    amounts
        .iter()
        .enumerate()
        .map(|(index, amount)| {
            let defense = defender.defense_slot(index);
            (amount - defense.reduction).max(0.0) * resistance_factor(defense.resistance)
        })
        .collect()
}

/// Subtracts the rounded sum of `amounts` from the target's health.
///
/// Returns the total dealt, or `None` when the target is gone. A vetoed
/// health write still reports the computed total.
pub fn deal_damage(
    ctx: &mut ActionContext<'_>,
    target: CharacterId,
    amounts: &[f64],
) -> Option<i64> {
    if !ctx.roster.contains(target) {
        return None;
    }
    let attacker = ctx.attacker;
    ctx.emit(CombatEvent::BeforeDealDamage {
        attacker,
        target,
        amounts: amounts.to_vec(),
    });
    ctx.emit(CombatEvent::BeforeReceiveDamage {
        attacker,
        target,
        amounts: amounts.to_vec(),
    });

    let total = amounts.iter().sum::<f64>().round() as i64;
    let defender = ctx.roster.get_mut(target)?;
    let health = defender.health.get();
    defender.health.set(health - total);
    debug!(
        target: "combat::damage",
        attacker = %attacker,
        target = %target,
        total,
        health = *defender.health.raw(),
        "damage applied"
    );

    ctx.emit(CombatEvent::AfterDealDamage {
        attacker,
        target,
        total,
    });
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventBus, EventKind};
    use crate::rng::ScriptedRng;
    use crate::state::{Roster, TeamId};
    use crate::stats::{DamageSlot, DamageType, DefenseSlot};

    fn roster_with(attacker: CombatStats, defender: CombatStats) -> Roster {
        let mut roster = Roster::new();
        roster
            .insert(Character::new(CharacterId(1), TeamId(0)).with_stats(attacker))
            .unwrap();
        roster
            .insert(
                Character::new(CharacterId(2), TeamId(1))
                    .with_health(100)
                    .with_stats(defender),
            )
            .unwrap();
        roster
    }

    #[test]
    fn crit_multiplies_only_the_critting_slot() {
        let stats = CombatStats::new()
            .with_damage(DamageSlot::fixed(DamageType::Physical, 10).with_crit(50.0, 2.0))
            .with_damage(DamageSlot::fixed(DamageType::Fire, 4).with_crit(50.0, 3.0));
        let mut roster = roster_with(stats, CombatStats::new());
        // Fixed slots draw only the crit roll: 0.1 crits, 0.9 does not.
        let mut rng = ScriptedRng::new([0.1, 0.9]);
        let mut events = EventBus::new();
        let crits = std::sync::Arc::new(std::sync::Mutex::new(0));
        let sink = std::sync::Arc::clone(&crits);
        events.subscribe(EventKind::Crit, move |_| *sink.lock().unwrap() += 1);

        let mut ctx = ActionContext::new(CharacterId(1), &mut roster, &mut rng, &mut events);
        let roll = roll_attacker_damage(&mut ctx);

        assert_eq!(roll.base, vec![10.0, 4.0]);
        assert_eq!(roll.crit, vec![20.0, 4.0]);
        assert!(roll.any_crit());
        assert_eq!(*crits.lock().unwrap(), 1);
    }

    #[test]
    fn crit_immune_target_takes_base_roll() {
        let roll = DamageRoll {
            base: vec![5.0],
            crit: vec![15.0],
        };
        let immune = Character::new(CharacterId(3), TeamId(1)).with_stats(CombatStats {
            crit_immune: true,
            ..CombatStats::new()
        });
        let exposed = Character::new(CharacterId(4), TeamId(1));

        assert_eq!(target_damage(&roll, &immune), &[5.0]);
        assert_eq!(target_damage(&roll, &exposed), &[15.0]);
    }

    #[test]
    fn reductions_floor_then_scale() {
        let defender = CombatStats::new()
            .with_defense(DefenseSlot::new(3.0, 50.0))
            .with_defense(DefenseSlot::new(10.0, 0.0));
        let reduced = apply_reductions(&[10.0, 4.0, 8.0], &defender);
        // Slot 2 has no defense slot at all.
        assert_eq!(reduced, vec![3.5, 0.0, 8.0]);
    }

    #[test]
    fn negative_resistance_amplifies() {
        assert_eq!(resistance_factor(-25.0), 1.25);
        assert_eq!(resistance_factor(100.0), 0.0);
    }

    #[test]
    fn deal_damage_rounds_the_sum() {
        let mut roster = roster_with(CombatStats::new(), CombatStats::new());
        let mut rng = ScriptedRng::new([0.0]);
        let mut events = EventBus::new();
        let mut ctx = ActionContext::new(CharacterId(1), &mut roster, &mut rng, &mut events);

        assert_eq!(deal_damage(&mut ctx, CharacterId(2), &[2.4, 2.4]), Some(5));
        assert_eq!(deal_damage(&mut ctx, CharacterId(9), &[1.0]), None);
        assert_eq!(*roster.get(CharacterId(2)).unwrap().health.raw(), 95);
    }

    #[test]
    fn deal_damage_reads_health_through_hooks() {
        let mut roster = roster_with(CombatStats::new(), CombatStats::new());
        let reads = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = std::sync::Arc::clone(&reads);
        roster
            .get_mut(CharacterId(2))
            .unwrap()
            .health
            .on_get(move |_| {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            });
        let mut rng = ScriptedRng::new([0.0]);
        let mut events = EventBus::new();
        let mut ctx = ActionContext::new(CharacterId(1), &mut roster, &mut rng, &mut events);

        deal_damage(&mut ctx, CharacterId(2), &[3.0]);

        assert_eq!(reads.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(*roster.get(CharacterId(2)).unwrap().health.raw(), 97);
    }
}
