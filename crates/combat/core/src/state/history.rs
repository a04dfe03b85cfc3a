//! Round history: deep snapshots of the roster at the end of each round.

use std::collections::VecDeque;

use super::Roster;

/// Completed-round snapshots, most recent first.
///
/// Position 0 of the combined [`CombatHistory`] view is the live roster, so
/// the newest snapshot is history position 1.
#[derive(Clone, Debug, Default)]
pub struct RoundHistory {
    snapshots: VecDeque<Roster>,
    limit: usize,
}

impl RoundHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Records a snapshot at position 1, evicting the oldest beyond the limit.
    pub fn record(&mut self, snapshot: Roster) {
        self.snapshots.push_front(snapshot);
        self.snapshots.truncate(self.limit);
    }

    /// Number of stored snapshots (the live round is not counted).
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot `rounds_ago` rounds back; `1` is the last completed round.
    pub fn rounds_ago(&self, rounds_ago: usize) -> Option<&Roster> {
        rounds_ago
            .checked_sub(1)
            .and_then(|index| self.snapshots.get(index))
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// Read-only view over the live roster plus past rounds, handed to AI hooks.
#[derive(Clone, Copy, Debug)]
pub struct CombatHistory<'a> {
    current: &'a Roster,
    past: &'a RoundHistory,
}

impl<'a> CombatHistory<'a> {
    pub fn new(current: &'a Roster, past: &'a RoundHistory) -> Self {
        Self { current, past }
    }

    /// The live roster (history position 0).
    pub fn current(&self) -> &'a Roster {
        self.current
    }

    /// Roster at history position `index`; 0 is the live roster.
    pub fn get(&self, index: usize) -> Option<&'a Roster> {
        if index == 0 {
            Some(self.current)
        } else {
            self.past.rounds_ago(index)
        }
    }

    /// Number of positions, live roster included.
    pub fn len(&self) -> usize {
        self.past.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Character, CharacterId, TeamId};

    fn roster_with(hp: i64) -> Roster {
        let mut roster = Roster::new();
        roster
            .insert(Character::new(CharacterId(1), TeamId(0)).with_health(hp))
            .unwrap();
        roster
    }

    #[test]
    fn history_never_exceeds_limit_plus_live_round() {
        let mut history = RoundHistory::new(2);
        for hp in 0..5 {
            history.record(roster_with(hp));
        }

        let live = roster_with(99);
        let view = CombatHistory::new(&live, &history);
        assert_eq!(view.len(), 3);
        assert!(view.get(3).is_none());
    }

    #[test]
    fn newest_snapshot_sits_at_position_one() {
        let mut history = RoundHistory::new(3);
        history.record(roster_with(10));
        history.record(roster_with(20));

        let live = roster_with(30);
        let view = CombatHistory::new(&live, &history);
        let health = |index: usize| {
            view.get(index)
                .and_then(|roster| roster.get(CharacterId(1)))
                .map(|c| *c.health.raw())
        };

        assert_eq!(health(0), Some(30));
        assert_eq!(health(1), Some(20));
        assert_eq!(health(2), Some(10));
    }

    #[test]
    fn zero_limit_keeps_only_live_round() {
        let mut history = RoundHistory::new(0);
        history.record(roster_with(1));
        assert!(history.is_empty());
    }
}
