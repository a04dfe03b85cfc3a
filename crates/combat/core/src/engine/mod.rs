//! Round and turn scheduling.
//!
//! The [`Scheduler`] owns the roster for the length of a session. It computes
//! the turn order once per round, drives each turn through its phase sequence
//! and defers every roster mutation (additions, removals, deaths) to queues
//! that are flushed at well-defined points.

mod errors;
mod phase;
mod turns;

pub use errors::SchedulerError;
pub use phase::{PlannedMove, TurnPhase, TurnPlan};
pub use turns::order_by_speed;

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::CombatConfig;
use crate::events::{CombatEvent, EventBus};
use crate::rng::{PcgRng, RngOracle};
use crate::state::{Character, CharacterId, CombatHistory, Roster, RoundHistory, TeamId};

/// Outcome of [`Scheduler::run_to_completion`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub rounds_played: u32,
    /// Round counter when the session stopped.
    pub final_round: u32,
    /// Teams with at least one living character.
    pub surviving_teams: BTreeSet<TeamId>,
    /// Characters still in the roster.
    pub remaining: Vec<CharacterId>,
}

/// Owns the roster and resolves a combat session round by round.
pub struct Scheduler<R: RngOracle = PcgRng> {
    config: CombatConfig,
    roster: Roster,
    history: RoundHistory,
    turn_order: Vec<CharacterId>,
    pointer: Option<usize>,
    acted: Vec<CharacterId>,
    round: u32,
    round_complete: bool,
    pending_add: Vec<Character>,
    pending_remove: Vec<CharacterId>,
    events: EventBus,
    rng: R,
    started: bool,
}

impl Scheduler<PcgRng> {
    /// Creates a scheduler using a [`PcgRng`] seeded from the config.
    pub fn new(config: CombatConfig) -> Self {
        let rng = PcgRng::new(config.rng_seed);
        Self::with_rng(config, rng)
    }
}

impl<R: RngOracle> Scheduler<R> {
    pub fn with_rng(config: CombatConfig, rng: R) -> Self {
        let history = RoundHistory::new(config.round_history_limit);
        Self {
            config,
            roster: Roster::new(),
            history,
            turn_order: Vec::new(),
            pointer: None,
            acted: Vec::new(),
            round: 0,
            round_complete: false,
            pending_add: Vec::new(),
            pending_remove: Vec::new(),
            events: EventBus::new(),
            rng,
            started: false,
        }
    }

    // ===== accessors =====

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Direct roster access for effects outside the turn flow. Membership
    /// changes should go through the queues.
    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Live roster plus past round snapshots.
    pub fn history(&self) -> CombatHistory<'_> {
        CombatHistory::new(&self.roster, &self.history)
    }

    pub fn round_history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn turn_order(&self) -> &[CharacterId] {
        &self.turn_order
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The character whose turn the pointer is on.
    pub fn current_actor(&self) -> Option<CharacterId> {
        self.pointer.and_then(|index| self.turn_order.get(index).copied())
    }

    pub fn pending_additions(&self) -> impl Iterator<Item = CharacterId> + '_ {
        self.pending_add.iter().map(|c| c.id)
    }

    pub fn pending_removals(&self) -> &[CharacterId] {
        &self.pending_remove
    }

    // ===== deferred roster mutation =====

    /// Queues `character` to join at the next flush.
    ///
    /// Queueing an id that is pending removal cancels the removal instead.
    pub fn queue_add(&mut self, character: Character) -> Result<(), SchedulerError> {
        let id = character.id;
        if let Some(index) = self.pending_remove.iter().position(|queued| *queued == id) {
            self.pending_remove.remove(index);
            debug!(target: "combat::scheduler", character = %id, "queued removal cancelled");
            return Ok(());
        }
        if self.roster.contains(id) || self.pending_add.iter().any(|c| c.id == id) {
            warn!(target: "combat::scheduler", character = %id, "rejected duplicate add");
            return Err(SchedulerError::duplicate(id, self.round));
        }
        self.pending_add.push(character);
        Ok(())
    }

    /// Queues `id` for removal at the next flush. Returns `true` if the
    /// queues changed.
    ///
    /// Removing an id that is pending addition cancels the addition instead.
    pub fn queue_remove(&mut self, id: CharacterId) -> bool {
        if let Some(index) = self.pending_add.iter().position(|c| c.id == id) {
            self.pending_add.remove(index);
            debug!(target: "combat::scheduler", character = %id, "queued addition cancelled");
            return true;
        }
        if !self.roster.contains(id) {
            warn!(
                target: "combat::scheduler",
                character = %id,
                "ignored removal of unknown character"
            );
            return false;
        }
        if self.pending_remove.contains(&id) {
            return false;
        }
        self.pending_remove.push(id);
        true
    }

    /// Queues every character that died under the remove-at-zero policy.
    fn queue_deaths(&mut self) {
        let dead: Vec<CharacterId> = self
            .roster
            .iter()
            .filter(|c| c.should_be_removed())
            .map(|c| c.id)
            .collect();
        for id in dead {
            if !self.pending_remove.contains(&id) {
                debug!(
                    target: "combat::scheduler",
                    character = %id,
                    "queued for removal at zero health"
                );
                self.pending_remove.push(id);
            }
        }
    }

    /// Applies queued removals, then queued additions, to the roster.
    /// Returns the ids that were added.
    fn flush_queues(&mut self) -> Vec<CharacterId> {
        for id in std::mem::take(&mut self.pending_remove) {
            if self.roster.remove(id).is_some() {
                debug!(target: "combat::scheduler", character = %id, "character removed");
                self.events.emit(CombatEvent::CharacterRemoved { id });
            }
        }

        let mut added = Vec::new();
        for character in std::mem::take(&mut self.pending_add) {
            match self.roster.insert(character) {
                Ok(id) => {
                    debug!(target: "combat::scheduler", character = %id, "character added");
                    self.events.emit(CombatEvent::CharacterAdded { id });
                    added.push(id);
                }
                Err(error) => {
                    warn!(target: "combat::scheduler", %error, "dropped queued addition");
                }
            }
        }
        added
    }

    /// Mid-round flush: updates the roster, gives newcomers a speed and
    /// re-sorts the characters that have not acted yet.
    fn flush_into_turn_order(&mut self) {
        let added = self.flush_queues();
        for id in &added {
            turns::speed_delay(
                &mut self.roster,
                &self.history,
                *id,
                self.config.speed_carries_over,
            );
        }

        let mut ids: Vec<CharacterId> = self
            .turn_order
            .iter()
            .copied()
            .filter(|id| self.roster.contains(*id))
            .collect();
        ids.extend(added);

        let sorted = turns::order_roster(&self.roster, &ids);
        let (done, upcoming): (Vec<_>, Vec<_>) =
            sorted.into_iter().partition(|id| self.acted.contains(id));
        self.pointer = done.len().checked_sub(1);
        self.turn_order = done;
        self.turn_order.extend(upcoming);
    }

    // ===== session lifecycle =====

    /// Builds round 0 from the queued additions and computes its turn order.
    pub fn start_session(&mut self) {
        info!(target: "combat::scheduler", queued = self.pending_add.len(), "session started");
        self.started = true;
        self.round = 0;
        self.round_complete = false;
        self.pointer = None;
        self.acted.clear();
        self.history.clear();
        self.flush_queues();
        self.compute_turn_order();
    }

    /// Recomputes speeds and the turn order for the current round.
    ///
    /// This runs every character's move economy once; the chosen moves stay
    /// committed for that character's turn.
    pub fn compute_turn_order(&mut self) -> &[CharacterId] {
        self.turn_order = turns::compute_order(
            &mut self.roster,
            &self.history,
            self.config.speed_carries_over,
        );
        debug!(
            target: "combat::scheduler",
            round = self.round,
            order = ?self.turn_order,
            "turn order"
        );
        &self.turn_order
    }

    pub fn has_next_turn(&self) -> bool {
        self.pointer.map_or(0, |index| index + 1) < self.turn_order.len()
    }

    /// Moves the pointer to the next character. No-op past the end.
    pub fn next_turn(&mut self) {
        if !self.has_next_turn() {
            return;
        }
        let index = self.pointer.map_or(0, |index| index + 1);
        self.pointer = Some(index);
        if let Some(id) = self.turn_order.get(index) {
            self.acted.push(*id);
        }
    }

    /// A new round needs at least two teams on the roster.
    pub fn has_next_round(&self) -> bool {
        self.started && self.roster.teams().len() >= 2
    }

    /// Advances the round counter and computes the new turn order.
    pub fn next_round(&mut self) -> Result<(), SchedulerError> {
        if !self.started {
            return Err(SchedulerError::SessionNotStarted);
        }
        self.round += 1;
        self.round_complete = false;
        self.pointer = None;
        self.acted.clear();
        self.compute_turn_order();
        Ok(())
    }

    /// Plays every turn of the current round, snapshots it into the history
    /// and flushes the queues.
    pub fn execute_round(&mut self) -> Result<(), SchedulerError> {
        if !self.started {
            return Err(SchedulerError::SessionNotStarted);
        }
        let round = self.round;
        debug!(target: "combat::scheduler", round, "round started");
        self.events.emit(CombatEvent::RoundStarted { round });

        while self.has_next_turn() {
            self.next_turn();
            self.execute_turn()?;
        }

        self.events.emit(CombatEvent::RoundEnded { round });
        self.history.record(self.roster.snapshot());
        self.flush_queues();
        self.round_complete = true;
        debug!(target: "combat::scheduler", round, remaining = self.roster.len(), "round ended");
        Ok(())
    }

    /// Plays rounds until fewer than two teams remain or `max_rounds` rounds
    /// have been played by this call. Starts the session if needed.
    pub fn run_to_completion(&mut self, max_rounds: u32) -> Result<SessionSummary, SchedulerError> {
        if !self.started {
            self.start_session();
        }

        let mut rounds_played = 0;
        while rounds_played < max_rounds && self.has_next_round() {
            if self.round_complete {
                self.next_round()?;
            }
            self.execute_round()?;
            rounds_played += 1;
        }

        let surviving_teams = self
            .roster
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.team)
            .collect();
        let summary = SessionSummary {
            rounds_played,
            final_round: self.round,
            surviving_teams,
            remaining: self.roster.ids(),
        };
        info!(
            target: "combat::scheduler",
            rounds = summary.rounds_played,
            teams = ?summary.surviving_teams,
            "session finished"
        );
        Ok(summary)
    }
}

impl<R: RngOracle> std::fmt::Debug for Scheduler<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("round", &self.round)
            .field("turn_order", &self.turn_order)
            .field("pointer", &self.pointer)
            .field("roster", &self.roster.ids())
            .field("pending_add", &self.pending_add.len())
            .field("pending_remove", &self.pending_remove)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;
    use crate::state::RemovalPolicy;

    fn scheduler() -> Scheduler<ScriptedRng> {
        Scheduler::with_rng(CombatConfig::new(), ScriptedRng::new([0.0]))
    }

    fn character(id: u32, team: u32) -> Character {
        Character::new(CharacterId(id), TeamId(team)).with_health(10)
    }

    #[test]
    fn add_then_remove_cancels() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();

        assert!(scheduler.queue_remove(CharacterId(1)));
        assert_eq!(scheduler.pending_additions().count(), 0);
        assert!(scheduler.pending_removals().is_empty());
    }

    #[test]
    fn remove_then_add_cancels() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler.start_session();

        assert!(scheduler.queue_remove(CharacterId(1)));
        scheduler.queue_add(character(1, 0)).unwrap();

        assert!(scheduler.pending_removals().is_empty());
        assert_eq!(scheduler.pending_additions().count(), 0);
        assert!(scheduler.roster().contains(CharacterId(1)));
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();

        let error = scheduler.queue_add(character(1, 1)).unwrap_err();
        assert!(matches!(error, SchedulerError::DuplicateCharacter { .. }));
        assert!(!scheduler.queue_remove(CharacterId(7)));
    }

    #[test]
    fn driving_before_start_fails() {
        let mut scheduler = scheduler();
        assert_eq!(scheduler.execute_round(), Err(SchedulerError::SessionNotStarted));
        assert!(matches!(
            scheduler.execute_turn(),
            Err(SchedulerError::SessionNotStarted)
        ));
    }

    #[test]
    fn turn_pointer_walks_the_order() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler.queue_add(character(2, 1)).unwrap();
        scheduler.start_session();

        assert_eq!(scheduler.current_actor(), None);
        assert!(matches!(
            scheduler.execute_turn(),
            Err(SchedulerError::NoActiveTurn { .. })
        ));
        scheduler.next_turn();
        assert_eq!(scheduler.current_actor(), Some(CharacterId(1)));
        scheduler.next_turn();
        assert_eq!(scheduler.current_actor(), Some(CharacterId(2)));
        assert!(!scheduler.has_next_turn());
        scheduler.next_turn();
        assert_eq!(scheduler.current_actor(), Some(CharacterId(2)));
    }

    #[test]
    fn history_is_capped() {
        let mut scheduler = Scheduler::with_rng(
            CombatConfig::new().with_round_history_limit(2),
            ScriptedRng::new([0.0]),
        );
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler.queue_add(character(2, 1)).unwrap();

        let summary = scheduler.run_to_completion(5).unwrap();

        assert_eq!(summary.rounds_played, 5);
        assert_eq!(summary.final_round, 4);
        assert_eq!(scheduler.round_history().len(), 2);
        assert_eq!(scheduler.history().len(), 3);
    }

    #[test]
    fn single_team_has_no_next_round() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler.queue_add(character(2, 0)).unwrap();

        let summary = scheduler.run_to_completion(3).unwrap();
        assert_eq!(summary.rounds_played, 0);
        assert_eq!(summary.remaining, vec![CharacterId(1), CharacterId(2)]);
    }
    #[test]
    fn kept_corpses_hold_their_team_in_the_session() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler
            .queue_add(
                character(2, 1)
                    .with_health(0)
                    .with_removal(RemovalPolicy::Keep),
            )
            .unwrap();

        let summary = scheduler.run_to_completion(2).unwrap();

        assert!(scheduler.has_next_round());
        assert_eq!(summary.rounds_played, 2);
        assert_eq!(summary.remaining, vec![CharacterId(1), CharacterId(2)]);
        assert_eq!(summary.surviving_teams, BTreeSet::from([TeamId(0)]));
    }

    #[test]
    fn dead_characters_leave_by_default() {
        let mut scheduler = scheduler();
        scheduler.queue_add(character(1, 0)).unwrap();
        scheduler.queue_add(character(2, 1).with_health(0)).unwrap();

        let summary = scheduler.run_to_completion(2).unwrap();

        assert!(!scheduler.has_next_round());
        assert_eq!(summary.rounds_played, 1);
        assert_eq!(summary.remaining, vec![CharacterId(1)]);
    }
}
