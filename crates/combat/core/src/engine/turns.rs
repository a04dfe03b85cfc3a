//! Turn-order computation.
//!
//! Each round every character gets a speed delay: its negated move speed plus
//! the time delays of the moves it chose in a dry run of its move economy.
//! Lower delays act first. The sorted order is then stably partitioned into
//! always-first, normal and always-last groups.

use std::cmp::Ordering;

use crate::state::{CharacterFeatures, CharacterId, CombatHistory, Roster, RoundHistory};
use crate::stats::SpeedStatus;

/// Runs the move economy of `id` once and returns the summed time delay of
/// the chosen moves. The chosen list stays committed for the turn itself.
///
/// While the economy runs, the character is visible in the history view
/// without its economy.
pub(crate) fn plan_moves(roster: &mut Roster, history: &RoundHistory, id: CharacterId) -> f64 {
    let Some(character) = roster.get_mut(id) else {
        return 0.0;
    };
    if !character.features.contains(CharacterFeatures::MOVE_SELECTION) {
        return 0.0;
    }
    let mut economy = std::mem::take(&mut character.economy);

    let view = CombatHistory::new(roster, history);
    economy.perform(&view, id);
    let delay = economy.chosen_delay();

    if let Some(character) = roster.get_mut(id) {
        character.economy = economy;
    }
    delay
}

/// Base speed delay of `id` for this round, before carry-over normalization.
pub(crate) fn speed_delay(
    roster: &mut Roster,
    history: &RoundHistory,
    id: CharacterId,
    carryover: bool,
) -> f64 {
    let delay = plan_moves(roster, history, id);
    let Some(character) = roster.get_mut(id) else {
        return 0.0;
    };
    let mut speed = -character.stats.move_speed + delay;
    if carryover {
        speed += character.carried_speed;
    }
    // Adding +0.0 turns a -0.0 key into +0.0.
    speed += 0.0;
    character.speed = speed;
    speed
}

/// Recomputes every character's speed and returns the new turn order.
pub(crate) fn compute_order(
    roster: &mut Roster,
    history: &RoundHistory,
    carryover: bool,
) -> Vec<CharacterId> {
    let ids = roster.ids();
    for id in &ids {
        speed_delay(roster, history, *id, carryover);
    }

    if carryover {
        let slowest = roster
            .iter()
            .map(|c| c.speed)
            .fold(f64::NEG_INFINITY, f64::max);
        for character in roster.iter_mut() {
            character.carried_speed = character.speed - slowest;
        }
    }

    order_roster(roster, &ids)
}

/// Orders `ids` by their current speed and speed status.
pub(crate) fn order_roster(roster: &Roster, ids: &[CharacterId]) -> Vec<CharacterId> {
    let entries: Vec<_> = ids
        .iter()
        .filter_map(|id| roster.get(*id))
        .map(|c| (c.id, c.speed, c.stats.speed_status))
        .collect();
    order_by_speed(&entries)
}

/// Stable ascending sort by speed, then a stable three-way partition:
/// always-first, normal, always-last.
///
/// Speeds that compare equal (including `0.0` and `-0.0`) keep their input
/// order.
pub fn order_by_speed(entries: &[(CharacterId, f64, SpeedStatus)]) -> Vec<CharacterId> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

    let group = |status: SpeedStatus| {
        sorted
            .iter()
            .filter(move |(_, _, s)| *s == status)
            .map(|(id, _, _)| *id)
    };
    group(SpeedStatus::AlwaysFirst)
        .chain(group(SpeedStatus::Normal))
        .chain(group(SpeedStatus::AlwaysLast))
        .collect()
}
