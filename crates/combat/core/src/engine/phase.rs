//! The turn state machine.
//!
//! A turn runs through a fixed sequence of phases. [`TurnPlan`] carries the
//! data one phase hands to the next, so callers can drive a turn phase by
//! phase with [`Scheduler::step_turn`] or all at once with
//! [`Scheduler::execute_turn`].

use std::sync::Arc;

use tracing::{debug, trace};

use super::{Scheduler, SchedulerError};
use crate::combat::ActionContext;
use crate::events::{CombatEvent, MotionStage};
use crate::motion::MovementBehavior;
use crate::rng::RngOracle;
use crate::state::{CharacterFeatures, CharacterId, CombatHistory, MoveId};
use crate::targeting::TargetingBehavior;

/// Phases of a single turn, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TurnPhase {
    Start,
    SelectMoves,
    PreMoveMotion,
    Retarget,
    Execute,
    PostMoveMotion,
    End,
    Cleanup,
    Done,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectMoves => "select_moves",
            Self::PreMoveMotion => "pre_move_motion",
            Self::Retarget => "retarget",
            Self::Execute => "execute",
            Self::PostMoveMotion => "post_move_motion",
            Self::End => "end",
            Self::Cleanup => "cleanup",
            Self::Done => "done",
        }
    }

    /// The phase that follows this one. `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Start => Self::SelectMoves,
            Self::SelectMoves => Self::PreMoveMotion,
            Self::PreMoveMotion => Self::Retarget,
            Self::Retarget => Self::Execute,
            Self::Execute => Self::PostMoveMotion,
            Self::PostMoveMotion => Self::End,
            Self::End => Self::Cleanup,
            Self::Cleanup | Self::Done => Self::Done,
        }
    }
}

/// A chosen move and the targets it will be executed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedMove {
    pub move_id: MoveId,
    pub targets: Vec<CharacterId>,
}

/// Data carried between the phases of one turn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnPlan {
    actor: CharacterId,
    round: u32,
    phase: TurnPhase,
    /// Chosen moves in selection order.
    pub moves: Vec<PlannedMove>,
    /// Moves whose action actually ran.
    pub executed: Vec<MoveId>,
    /// Whether the end-of-turn cleanup flushed the queues.
    pub flushed: bool,
}

impl TurnPlan {
    fn new(actor: CharacterId, round: u32) -> Self {
        Self {
            actor,
            round,
            phase: TurnPhase::Start,
            moves: Vec::new(),
            executed: Vec::new(),
            flushed: false,
        }
    }

    pub fn actor(&self) -> CharacterId {
        self.actor
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// The phase the next `step_turn` call will run.
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == TurnPhase::Done
    }

    /// Union of every planned move's targets, in first-seen order.
    pub fn all_targets(&self) -> Vec<CharacterId> {
        let mut targets: Vec<CharacterId> = Vec::new();
        for target in self.moves.iter().flat_map(|planned| &planned.targets) {
            if !targets.contains(target) {
                targets.push(*target);
            }
        }
        targets
    }
}

impl<R: RngOracle> Scheduler<R> {
    /// Creates a plan for the character under the turn pointer.
    pub fn begin_turn(&self) -> Result<TurnPlan, SchedulerError> {
        if !self.started {
            return Err(SchedulerError::SessionNotStarted);
        }
        let actor = self
            .current_actor()
            .ok_or_else(|| SchedulerError::no_active_turn(self.round))?;
        if !self.roster.contains(actor) {
            return Err(SchedulerError::unknown(actor, self.round));
        }
        Ok(TurnPlan::new(actor, self.round))
    }

    /// Runs the current phase of `plan` and advances it. Returns the phase
    /// that will run next.
    pub fn step_turn(&mut self, plan: &mut TurnPlan) -> TurnPhase {
        trace!(
            target: "combat::scheduler",
            actor = %plan.actor,
            phase = plan.phase.as_str(),
            "turn phase"
        );
        match plan.phase {
            TurnPhase::Start => self.start_phase(plan),
            TurnPhase::SelectMoves => self.select_phase(plan),
            TurnPhase::PreMoveMotion => self.motion_phase(plan, MotionStage::PreMove),
            TurnPhase::Retarget => self.retarget_phase(plan),
            TurnPhase::Execute => self.execute_phase(plan),
            TurnPhase::PostMoveMotion => self.motion_phase(plan, MotionStage::PostMove),
            TurnPhase::End => self.end_phase(plan),
            TurnPhase::Cleanup => self.cleanup_phase(plan),
            TurnPhase::Done => {}
        }
        plan.phase = plan.phase.next();
        plan.phase
    }

    /// Runs the whole turn of the character under the turn pointer.
    pub fn execute_turn(&mut self) -> Result<TurnPlan, SchedulerError> {
        let mut plan = self.begin_turn()?;
        while !plan.is_done() {
            self.step_turn(&mut plan);
        }
        Ok(plan)
    }

    fn start_phase(&mut self, plan: &TurnPlan) {
        debug!(
            target: "combat::scheduler",
            round = plan.round,
            actor = %plan.actor,
            "turn started"
        );
        self.events.emit(CombatEvent::TurnStarted {
            round: plan.round,
            actor: plan.actor,
        });
    }

    fn select_phase(&mut self, plan: &mut TurnPlan) {
        let actor = plan.actor;
        let Some(character) = self.roster.get_mut(actor) else {
            return;
        };
        if !character.features.contains(CharacterFeatures::MOVE_SELECTION) {
            return;
        }
        let chosen = match character.economy.take_committed() {
            Some(chosen) => chosen,
            None => {
                super::turns::plan_moves(&mut self.roster, &self.history, actor);
                self.roster
                    .get_mut(actor)
                    .and_then(|c| c.economy.take_committed())
                    .unwrap_or_default()
            }
        };

        for move_id in chosen {
            self.events.emit(CombatEvent::MoveSelected { actor, move_id });
            let targets = self.resolve_targets(actor, move_id, false);
            for target in &targets {
                self.events.emit(CombatEvent::TargetSelected {
                    actor,
                    move_id,
                    target: *target,
                });
            }
            plan.moves.push(PlannedMove { move_id, targets });
        }
    }

    fn motion_phase(&mut self, plan: &TurnPlan, stage: MotionStage) {
        let actor = plan.actor;
        let Some(character) = self.roster.get(actor) else {
            return;
        };
        if !character.features.contains(CharacterFeatures::MOVEMENT) {
            return;
        }
        let Some(behavior) = self.motion_for(plan, stage) else {
            return;
        };
        let Some(destination) = behavior.resolve(&self.roster, actor, &plan.all_targets()) else {
            return;
        };
        self.events.emit(CombatEvent::MotionSelected {
            actor,
            stage,
            destination,
        });

        let Some(character) = self.roster.get_mut(actor) else {
            return;
        };
        let from = character.location();
        if from == destination || !character.position.set(destination) {
            return;
        }
        trace!(target: "combat::motion", actor = %actor, %from, to = %destination, "moved");
        self.events.emit(CombatEvent::Moved {
            actor,
            stage,
            from,
            to: destination,
        });
    }

    fn retarget_phase(&mut self, plan: &mut TurnPlan) {
        let actor = plan.actor;
        for index in 0..plan.moves.len() {
            let move_id = plan.moves[index].move_id;
            let targets = self.resolve_targets(actor, move_id, true);
            let dropped: Vec<CharacterId> = plan.moves[index]
                .targets
                .iter()
                .copied()
                .filter(|target| !targets.contains(target))
                .collect();
            if !dropped.is_empty() {
                self.events.emit(CombatEvent::TargetsDropped {
                    actor,
                    move_id,
                    dropped,
                });
            }
            plan.moves[index].targets = targets;
        }
    }

    fn execute_phase(&mut self, plan: &mut TurnPlan) {
        let actor = plan.actor;
        let moves: Vec<MoveId> = plan.moves.iter().map(|planned| planned.move_id).collect();
        self.events.emit(CombatEvent::BeforeMove {
            actor,
            moves: moves.clone(),
        });
        for planned in &plan.moves {
            if self.run_move(actor, planned.move_id, &planned.targets) {
                plan.executed.push(planned.move_id);
            }
        }
        self.events.emit(CombatEvent::AfterMove { actor, moves });
    }

    fn end_phase(&mut self, plan: &TurnPlan) {
        if let Some(character) = self.roster.get_mut(plan.actor) {
            character.economy.end_turn(&plan.executed);
        }
        self.events.emit(CombatEvent::TurnEnded {
            round: plan.round,
            actor: plan.actor,
        });
    }

    fn cleanup_phase(&mut self, plan: &mut TurnPlan) {
        if !self.cleanup_due() {
            trace!(target: "combat::scheduler", actor = %plan.actor, "cleanup deferred");
            return;
        }
        self.queue_deaths();
        self.flush_into_turn_order();
        plan.flushed = true;
    }

    /// Cleanup runs unless simultaneous turns are on and the next character
    /// in the order shares the current speed.
    fn cleanup_due(&self) -> bool {
        if !self.config.simultaneous_turns {
            return true;
        }
        let Some(pointer) = self.pointer else {
            return true;
        };
        let speed_of = |index: usize| {
            self.turn_order
                .get(index)
                .and_then(|id| self.roster.get(*id))
                .map(|c| c.speed)
        };
        match (speed_of(pointer), speed_of(pointer + 1)) {
            (Some(current), Some(next)) => current != next,
            _ => true,
        }
    }

    /// Targets for one chosen move: the move's behavior, else the actor's.
    fn resolve_targets(
        &self,
        actor: CharacterId,
        move_id: MoveId,
        post_move: bool,
    ) -> Vec<CharacterId> {
        let Some(character) = self.roster.get(actor) else {
            return Vec::new();
        };
        if !character.features.contains(CharacterFeatures::TARGETING) {
            return Vec::new();
        }
        let behavior: Option<Arc<dyn TargetingBehavior>> = character
            .economy
            .get(move_id)
            .and_then(|mv| mv.targeting.clone())
            .or_else(|| character.targeting.clone());
        let Some(behavior) = behavior else {
            return Vec::new();
        };
        let view = CombatHistory::new(&self.roster, &self.history);
        behavior.resolve(&view, actor, post_move)
    }

    /// Motion for `stage`: the first chosen move carrying its own behavior,
    /// else the actor's default.
    fn motion_for(&self, plan: &TurnPlan, stage: MotionStage) -> Option<MovementBehavior> {
        let character = self.roster.get(plan.actor)?;
        let pick = |pre: &Option<MovementBehavior>, post: &Option<MovementBehavior>| match stage {
            MotionStage::PreMove => pre.clone(),
            MotionStage::PostMove => post.clone(),
        };
        plan.moves
            .iter()
            .filter_map(|planned| character.economy.get(planned.move_id))
            .find_map(|mv| pick(&mv.pre_motion, &mv.post_motion))
            .or_else(|| pick(&character.pre_motion, &character.post_motion))
    }

    /// Runs one move through [`Move::perform`](crate::economy::Move::perform).
    /// Returns `false` when the move has no action or no use left.
    ///
    /// The move is performed on a copy while the roster is lent to the action;
    /// the copy then replaces the stored move.
    fn run_move(&mut self, actor: CharacterId, move_id: MoveId, targets: &[CharacterId]) -> bool {
        let Some(mut mv) = self
            .roster
            .get(actor)
            .and_then(|c| c.economy.get(move_id))
            .cloned()
        else {
            return false;
        };

        let mut ctx = ActionContext::new(actor, &mut self.roster, &mut self.rng, &mut self.events);
        if !mv.perform(&mut ctx, targets) {
            return false;
        }

        if let Some(slot) = self
            .roster
            .get_mut(actor)
            .and_then(|c| c.economy.get_mut(move_id))
        {
            *slot = mv;
        }
        true
    }
}
