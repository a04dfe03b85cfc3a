//! Move-economy state machine.
//!
//! Each character owns one [`MoveEconomy`]. Once per turn `perform` decides
//! which moves run: it filters the performable moves, asks the motive and
//! selection hooks for a candidate order, then walks that order spending a
//! budget of one turn. Moves costing more than what is left can bank partial
//! charge and execute on a later turn.

mod ledger;
mod moves;

pub use ledger::{BUDGET_PRECISION, LedgerEntry, TurnLedger};
pub use moves::{Motive, Move, MoveAction, MoveState, move_action};

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::state::{CharacterId, CombatHistory, MoveId, round_to};

/// Computes motive priorities for a character from the combat history.
pub type MotiveFn =
    Arc<dyn Fn(&CombatHistory<'_>, CharacterId) -> Vec<(Motive, i32)> + Send + Sync>;

/// Orders the performable moves into a candidate list for this turn.
pub type SelectionFn = Arc<
    dyn Fn(&CombatHistory<'_>, CharacterId, &[(Motive, i32)], &[&Move]) -> Vec<MoveId>
        + Send
        + Sync,
>;

/// Per-character bookkeeping of selectable, charging and chosen moves.
#[derive(Clone)]
pub struct MoveEconomy {
    moves: Vec<Move>,
    next_move_id: u32,
    /// Static motive priorities used when no motive function is set.
    pub motives: Vec<(Motive, i32)>,
    motive_fn: Option<MotiveFn>,
    selection_fn: Option<SelectionFn>,
    chosen: Vec<MoveId>,
    committed: bool,
    ledger: TurnLedger,
    turn_fraction_left: f64,
    pub allow_partial_charging: bool,
    pub preserve_leftover_charge: bool,
}

impl MoveEconomy {
    pub fn new() -> Self {
        Self {
            moves: Vec::new(),
            next_move_id: 0,
            motives: Vec::new(),
            motive_fn: None,
            selection_fn: None,
            chosen: Vec::new(),
            committed: false,
            ledger: TurnLedger::default(),
            turn_fraction_left: 1.0,
            allow_partial_charging: false,
            preserve_leftover_charge: false,
        }
    }

    /// Adds a move and returns the id it was assigned.
    pub fn add_move(&mut self, mut mv: Move) -> MoveId {
        let id = MoveId(self.next_move_id);
        self.next_move_id += 1;
        mv.id = id;
        self.moves.push(mv);
        id
    }

    pub fn with_move(mut self, mv: Move) -> Self {
        self.add_move(mv);
        self
    }

    pub fn with_motives(mut self, motives: impl IntoIterator<Item = (Motive, i32)>) -> Self {
        self.motives = motives.into_iter().collect();
        self
    }

    pub fn with_motive_fn<F>(mut self, motive_fn: F) -> Self
    where
        F: Fn(&CombatHistory<'_>, CharacterId) -> Vec<(Motive, i32)> + Send + Sync + 'static,
    {
        self.motive_fn = Some(Arc::new(motive_fn));
        self
    }

    pub fn with_selection_fn<F>(mut self, selection_fn: F) -> Self
    where
        F: Fn(&CombatHistory<'_>, CharacterId, &[(Motive, i32)], &[&Move]) -> Vec<MoveId>
            + Send
            + Sync
            + 'static,
    {
        self.selection_fn = Some(Arc::new(selection_fn));
        self
    }

    pub fn with_partial_charging(mut self, enabled: bool) -> Self {
        self.allow_partial_charging = enabled;
        self
    }

    pub fn with_preserved_charge(mut self, enabled: bool) -> Self {
        self.preserve_leftover_charge = enabled;
        self
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn get(&self, id: MoveId) -> Option<&Move> {
        self.moves.iter().find(|mv| mv.id == id)
    }

    pub fn get_mut(&mut self, id: MoveId) -> Option<&mut Move> {
        self.moves.iter_mut().find(|mv| mv.id == id)
    }

    /// Moves chosen by the last `perform` call.
    pub fn chosen(&self) -> &[MoveId] {
        &self.chosen
    }

    /// Budget ledger of the last `perform` call.
    pub fn ledger(&self) -> &TurnLedger {
        &self.ledger
    }

    pub fn turn_fraction_left(&self) -> f64 {
        self.turn_fraction_left
    }

    /// Puts the character in turn-fraction debt; values above 1.0 block every
    /// move until paid down by `end_turn`.
    pub fn set_turn_fraction_left(&mut self, value: f64) {
        self.turn_fraction_left = value;
    }

    /// Returns the chosen list if a `perform` result is still waiting to be
    /// consumed, clearing the pending mark.
    pub fn take_committed(&mut self) -> Option<Vec<MoveId>> {
        if !self.committed {
            return None;
        }
        self.committed = false;
        Some(self.chosen.clone())
    }

    /// Sum of the time delays of the chosen moves.
    pub fn chosen_delay(&self) -> f64 {
        self.chosen
            .iter()
            .filter_map(|id| self.get(*id))
            .map(|mv| mv.time_delay)
            .sum()
    }

    /// Decides this turn's execution list and updates charge state.
    pub fn perform(&mut self, history: &CombatHistory<'_>, actor: CharacterId) -> &[MoveId] {
        let debt = self.turn_fraction_left;
        let performable: Vec<&Move> = self
            .moves
            .iter()
            .filter(|mv| mv.is_performable(debt))
            .collect();
        let performable_ids: Vec<MoveId> = performable.iter().map(|mv| mv.id).collect();
        // Uses left per move for this walk; a candidate listed twice is funded
        // at most `uses_remaining` times.
        let mut uses_left: Vec<(MoveId, u32)> = performable
            .iter()
            .map(|mv| (mv.id, mv.uses_remaining()))
            .collect();

        let motives = match &self.motive_fn {
            Some(motive_fn) => motive_fn(history, actor),
            None => self.motives.clone(),
        };
        let candidates = match &self.selection_fn {
            Some(selection_fn) => selection_fn(history, actor, &motives, &performable),
            None => default_selection(&motives, &performable),
        };

        let allow_partial = self.allow_partial_charging;
        let preserve = self.preserve_leftover_charge;
        let mut budget = 1.0_f64;
        let mut ledger = TurnLedger::default();
        let mut chosen = Vec::new();

        for id in candidates {
            let Some(mv) = self.moves.iter_mut().find(|mv| mv.id == id) else {
                continue;
            };
            if !performable_ids.contains(&id) {
                ledger.record(LedgerEntry::Skipped { move_id: id });
                continue;
            }

            if mv.charge_only {
                if budget >= mv.turn_fraction {
                    mv.charge += mv.turn_fraction;
                    budget = round_to(budget - mv.turn_fraction, BUDGET_PRECISION);
                    ledger.record(LedgerEntry::Charged {
                        move_id: id,
                        amount: mv.turn_fraction,
                    });
                } else if allow_partial && budget > 0.0 {
                    mv.charge += budget;
                    ledger.record(LedgerEntry::Charged {
                        move_id: id,
                        amount: budget,
                    });
                    budget = 0.0;
                } else {
                    ledger.record(LedgerEntry::Skipped { move_id: id });
                }
                continue;
            }

            let Some(left) = uses_left
                .iter_mut()
                .find(|(move_id, _)| *move_id == id)
                .map(|(_, left)| left)
                .filter(|left| **left > 0)
            else {
                ledger.record(LedgerEntry::Skipped { move_id: id });
                continue;
            };

            let cost = (mv.turn_fraction - mv.charge).max(0.0);
            if budget >= cost {
                *left -= 1;
                let spent = if mv.consumes_rest_of_turn { budget } else { cost };
                budget = round_to(budget - spent, BUDGET_PRECISION);
                if preserve && cost == 0.0 {
                    mv.charge -= mv.turn_fraction;
                } else {
                    mv.charge = 0.0;
                }
                ledger.record(LedgerEntry::Executed {
                    move_id: id,
                    cost: spent,
                });
                chosen.push(id);
            } else if allow_partial && budget > 0.0 {
                mv.charge += budget;
                ledger.record(LedgerEntry::Charged {
                    move_id: id,
                    amount: budget,
                });
                budget = 0.0;
            } else {
                ledger.record(LedgerEntry::Skipped { move_id: id });
            }
        }

        trace!(
            target: "combat::economy",
            actor = %actor,
            chosen = ?chosen,
            consumed = ledger.consumed(),
            "move economy allocated turn budget"
        );

        self.ledger = ledger;
        self.chosen = chosen;
        self.committed = true;
        &self.chosen
    }

    /// Closes the owner's turn: ticks cooldowns of moves that did not run,
    /// restores per-turn uses and pays down turn-fraction debt.
    pub fn end_turn(&mut self, executed: &[MoveId]) {
        for mv in &mut self.moves {
            if !executed.contains(&mv.id) {
                mv.tick_cooldown();
            }
            mv.reset_uses();
        }
        if self.turn_fraction_left > 1.0 {
            self.turn_fraction_left = (self.turn_fraction_left - 1.0).max(1.0);
        }
    }
}

impl Default for MoveEconomy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MoveEconomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveEconomy")
            .field("moves", &self.moves)
            .field("motives", &self.motives)
            .field("chosen", &self.chosen)
            .field("turn_fraction_left", &self.turn_fraction_left)
            .field("allow_partial_charging", &self.allow_partial_charging)
            .field("preserve_leftover_charge", &self.preserve_leftover_charge)
            .finish_non_exhaustive()
    }
}

/// Orders moves by the best priority among their motives, highest first.
/// Moves without a prioritized motive keep their relative order at the end.
pub fn default_selection(motives: &[(Motive, i32)], performable: &[&Move]) -> Vec<MoveId> {
    let priority = |mv: &Move| {
        mv.motives
            .iter()
            .filter_map(|motive| {
                motives
                    .iter()
                    .find(|(candidate, _)| candidate == motive)
                    .map(|(_, priority)| *priority)
            })
            .max()
    };

    let mut ordered = performable.to_vec();
    ordered.sort_by(|a, b| priority(b).cmp(&priority(a)));
    ordered.into_iter().map(|mv| mv.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Roster, RoundHistory};

    fn run(economy: &mut MoveEconomy) -> Vec<MoveId> {
        let roster = Roster::new();
        let history = RoundHistory::new(4);
        let view = CombatHistory::new(&roster, &history);
        economy.perform(&view, CharacterId(0)).to_vec()
    }

    fn noop() -> MoveAction {
        move_action(|_, _| {})
    }

    #[test]
    fn fills_budget_in_candidate_order() {
        let mut economy = MoveEconomy::new()
            .with_move(Move::new("a").with_turn_fraction(0.5).with_action(noop()))
            .with_move(Move::new("b").with_turn_fraction(0.4).with_action(noop()))
            .with_move(Move::new("c").with_turn_fraction(0.3).with_action(noop()));

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0), MoveId(1)]);
        assert_eq!(economy.ledger().consumed(), 0.9);
        assert_eq!(
            economy.ledger().entries()[2],
            LedgerEntry::Skipped { move_id: MoveId(2) }
        );
    }

    #[test]
    fn rest_of_turn_move_drains_budget() {
        let mut economy = MoveEconomy::new()
            .with_move(
                Move::new("finisher")
                    .with_turn_fraction(0.2)
                    .consuming_rest_of_turn(),
            )
            .with_move(Move::new("jab").with_turn_fraction(0.1));

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0)]);
        assert_eq!(economy.ledger().consumed(), 1.0);
        assert_eq!(economy.ledger().remaining(), 0.0);
    }

    #[test]
    fn partial_charging_banks_remaining_budget() {
        let mut economy = MoveEconomy::new()
            .with_move(Move::new("quick").with_turn_fraction(0.25))
            .with_move(Move::new("nuke").with_turn_fraction(2.0))
            .with_partial_charging(true);

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0)]);
        assert_eq!(economy.get(MoveId(1)).unwrap().charge(), 0.75);
        assert!(economy.ledger().consumed() <= 1.0);
    }

    #[test]
    fn without_partial_charging_expensive_move_is_skipped() {
        let mut economy = MoveEconomy::new().with_move(Move::new("nuke").with_turn_fraction(2.0));

        let chosen = run(&mut economy);

        assert!(chosen.is_empty());
        assert_eq!(economy.get(MoveId(0)).unwrap().charge(), 0.0);
    }

    #[test]
    fn charge_only_move_never_executes() {
        let mut economy = MoveEconomy::new().with_move(
            Move::new("focus")
                .with_turn_fraction(0.5)
                .charge_only(),
        );

        assert!(run(&mut economy).is_empty());
        assert_eq!(economy.get(MoveId(0)).unwrap().charge(), 0.5);
        assert!(run(&mut economy).is_empty());
        assert_eq!(economy.get(MoveId(0)).unwrap().charge(), 1.0);
    }

    #[test]
    fn preserved_charge_rolls_forward_when_fully_prepaid() {
        let mut economy = MoveEconomy::new()
            .with_move(Move::new("volley").with_turn_fraction(1.0))
            .with_preserved_charge(true);
        economy.get_mut(MoveId(0)).unwrap().charge = 2.5;

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0)]);
        assert_eq!(economy.get(MoveId(0)).unwrap().charge(), 1.5);
        assert_eq!(economy.ledger().consumed(), 0.0);
    }

    #[test]
    fn cooldown_blocks_until_ticked_down() {
        let mut economy = MoveEconomy::new().with_move(Move::new("slam").with_cooldown(1));

        let chosen = run(&mut economy);
        assert_eq!(chosen, vec![MoveId(0)]);
        economy.get_mut(MoveId(0)).unwrap().record_use();
        economy.end_turn(&chosen);

        assert!(run(&mut economy).is_empty());
        economy.end_turn(&[]);

        assert_eq!(run(&mut economy), vec![MoveId(0)]);
    }

    #[test]
    fn debt_is_paid_one_turn_at_a_time() {
        let mut economy = MoveEconomy::new().with_move(Move::new("jab"));
        economy.set_turn_fraction_left(2.5);

        assert!(run(&mut economy).is_empty());
        economy.end_turn(&[]);
        assert_eq!(economy.turn_fraction_left(), 1.5);

        assert!(run(&mut economy).is_empty());
        economy.end_turn(&[]);
        assert_eq!(economy.turn_fraction_left(), 1.0);

        assert_eq!(run(&mut economy), vec![MoveId(0)]);
    }

    #[test]
    fn default_selection_prefers_higher_motive_priority() {
        let mut economy = MoveEconomy::new()
            .with_move(Move::new("wait").with_turn_fraction(0.1))
            .with_move(
                Move::new("mend")
                    .with_turn_fraction(0.5)
                    .with_motives([Motive::Heal]),
            )
            .with_move(
                Move::new("strike")
                    .with_turn_fraction(0.5)
                    .with_motives([Motive::Damage]),
            )
            .with_motives([(Motive::Damage, 5), (Motive::Heal, 2)]);

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(2), MoveId(1)]);
    }

    #[test]
    fn selection_fn_cannot_pick_unperformable_moves() {
        let mut economy = MoveEconomy::new()
            .with_move(Move::new("ready"))
            .with_move(Move::new("cooling").with_cooldown(3))
            .with_selection_fn(|_, _, _, _| vec![MoveId(1), MoveId(0)]);
        economy.get_mut(MoveId(1)).unwrap().set_cooldown_remaining(2);

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0)]);
    }

    #[test]
    fn motive_fn_overrides_static_motives() {
        let mut economy = MoveEconomy::new()
            .with_move(
                Move::new("strike")
                    .with_turn_fraction(0.6)
                    .with_motives([Motive::Damage]),
            )
            .with_move(
                Move::new("mend")
                    .with_turn_fraction(0.6)
                    .with_motives([Motive::Heal]),
            )
            .with_motives([(Motive::Damage, 9)])
            .with_motive_fn(|_, _| vec![(Motive::Heal, 10)]);

        assert_eq!(run(&mut economy), vec![MoveId(1)]);
    }

    #[test]
    fn take_committed_is_one_shot() {
        let mut economy = MoveEconomy::new().with_move(Move::new("jab"));
        assert!(economy.take_committed().is_none());

        run(&mut economy);
        assert_eq!(economy.take_committed(), Some(vec![MoveId(0)]));
        assert!(economy.take_committed().is_none());
    }

    #[test]
    fn repeated_candidate_is_funded_once_per_use() {
        let mut economy = MoveEconomy::new()
            .with_move(
                Move::new("jab")
                    .with_turn_fraction(0.5)
                    .with_time_delay(3.0)
                    .with_action(noop()),
            )
            .with_selection_fn(|_, _, _, _| vec![MoveId(0), MoveId(0)]);

        let chosen = run(&mut economy);

        assert_eq!(chosen, vec![MoveId(0)]);
        assert_eq!(
            economy.ledger().entries(),
            &[
                LedgerEntry::Executed {
                    move_id: MoveId(0),
                    cost: 0.5,
                },
                LedgerEntry::Skipped { move_id: MoveId(0) },
            ]
        );
        assert_eq!(economy.ledger().consumed(), 0.5);
        assert_eq!(economy.chosen_delay(), 3.0);
    }

    #[test]
    fn second_use_is_funded_when_available() {
        let mut economy = MoveEconomy::new()
            .with_move(
                Move::new("flurry")
                    .with_turn_fraction(0.4)
                    .with_uses_per_turn(2)
                    .with_action(noop()),
            )
            .with_selection_fn(|_, _, _, _| vec![MoveId(0), MoveId(0), MoveId(0)]);

        assert_eq!(run(&mut economy), vec![MoveId(0), MoveId(0)]);
        assert_eq!(economy.ledger().consumed(), 0.8);
    }
}
