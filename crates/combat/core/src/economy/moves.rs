//! Move definitions and per-move bookkeeping.

use std::fmt;
use std::sync::Arc;

use crate::combat::ActionContext;
use crate::motion::MovementBehavior;
use crate::state::{CharacterId, MoveId};
use crate::targeting::TargetingBehavior;

/// Executable body of a move: runs against the attacker (in the context) and
/// the resolved target list.
pub type MoveAction = Arc<dyn Fn(&mut ActionContext<'_>, &[CharacterId]) + Send + Sync>;

/// Wraps a closure as a shareable [`MoveAction`].
pub fn move_action<F>(action: F) -> MoveAction
where
    F: Fn(&mut ActionContext<'_>, &[CharacterId]) + Send + Sync + 'static,
{
    Arc::new(action)
}

/// Tagged category of intent used to bias move selection.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Motive {
    Damage,
    Heal,
    Buff,
    Debuff,
    Reposition,
    Defend,
}

/// Conceptual state of a move, derived from its counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveState {
    Disabled,
    CoolingDown(u32),
    Ready,
    Charging(f64),
}

/// A single move in a character's repertoire.
#[derive(Clone)]
pub struct Move {
    pub(crate) id: MoveId,
    pub name: String,
    pub enabled: bool,
    cooldown: u32,
    cooldown_remaining: u32,
    /// Fixed per-use delay added to the owner's turn-order key.
    pub time_delay: f64,
    pub motives: Vec<Motive>,
    /// Overrides the owner's default targeting behavior.
    pub targeting: Option<Arc<dyn TargetingBehavior>>,
    /// Overrides the owner's default pre-move motion.
    pub pre_motion: Option<MovementBehavior>,
    /// Overrides the owner's default post-move motion.
    pub post_motion: Option<MovementBehavior>,
    action: Option<MoveAction>,
    /// Portion of a turn this move costs; values above 1 need charging.
    pub turn_fraction: f64,
    pub(crate) charge: f64,
    uses_per_turn: u32,
    uses_remaining: u32,
    pub consumes_rest_of_turn: bool,
    /// Only accumulates charge; never lands in the execution list.
    pub charge_only: bool,
}

impl Move {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: MoveId::default(),
            name: name.into(),
            enabled: true,
            cooldown: 0,
            cooldown_remaining: 0,
            time_delay: 0.0,
            motives: Vec::new(),
            targeting: None,
            pre_motion: None,
            post_motion: None,
            action: None,
            turn_fraction: 1.0,
            charge: 0.0,
            uses_per_turn: 1,
            uses_remaining: 1,
            consumes_rest_of_turn: false,
            charge_only: false,
        }
    }

    pub fn id(&self) -> MoveId {
        self.id
    }

    pub fn with_action(mut self, action: MoveAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_cooldown(mut self, cooldown: u32) -> Self {
        self.cooldown = cooldown;
        self.cooldown_remaining = self.cooldown_remaining.min(cooldown);
        self
    }

    pub fn with_time_delay(mut self, delay: f64) -> Self {
        self.time_delay = delay;
        self
    }

    pub fn with_motives(mut self, motives: impl IntoIterator<Item = Motive>) -> Self {
        self.motives = motives.into_iter().collect();
        self
    }

    pub fn with_turn_fraction(mut self, fraction: f64) -> Self {
        self.turn_fraction = fraction;
        self
    }

    pub fn with_uses_per_turn(mut self, uses: u32) -> Self {
        self.uses_per_turn = uses;
        self.uses_remaining = uses;
        self
    }

    pub fn with_targeting(mut self, targeting: Arc<dyn TargetingBehavior>) -> Self {
        self.targeting = Some(targeting);
        self
    }

    pub fn with_pre_motion(mut self, motion: MovementBehavior) -> Self {
        self.pre_motion = Some(motion);
        self
    }

    pub fn with_post_motion(mut self, motion: MovementBehavior) -> Self {
        self.post_motion = Some(motion);
        self
    }

    pub fn consuming_rest_of_turn(mut self) -> Self {
        self.consumes_rest_of_turn = true;
        self
    }

    pub fn charge_only(mut self) -> Self {
        self.charge_only = true;
        self
    }

    pub fn action(&self) -> Option<&MoveAction> {
        self.action.as_ref()
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    /// Sets the remaining cooldown, clamped to the move's cooldown.
    pub fn set_cooldown_remaining(&mut self, remaining: u32) {
        self.cooldown_remaining = remaining.min(self.cooldown);
    }

    pub fn charge(&self) -> f64 {
        self.charge
    }

    pub fn uses_per_turn(&self) -> u32 {
        self.uses_per_turn
    }

    pub fn uses_remaining(&self) -> u32 {
        self.uses_remaining
    }

    pub fn state(&self) -> MoveState {
        if !self.enabled {
            MoveState::Disabled
        } else if self.cooldown_remaining > 0 {
            MoveState::CoolingDown(self.cooldown_remaining)
        } else if self.charge > 0.0 {
            MoveState::Charging(self.charge)
        } else {
            MoveState::Ready
        }
    }

    /// Whether the move may be chosen this turn given the owner's
    /// turn-fraction debt.
    pub fn is_performable(&self, turn_fraction_left: f64) -> bool {
        self.enabled
            && self.cooldown_remaining == 0
            && turn_fraction_left <= 1.0
            && self.uses_remaining > 0
    }

    /// Runs the action against `targets`.
    ///
    /// Returns `false` without touching any state when there is no action or
    /// no use left this turn.
    pub fn perform(&mut self, ctx: &mut ActionContext<'_>, targets: &[CharacterId]) -> bool {
        let Some(action) = self.action.clone() else {
            return false;
        };
        if self.uses_remaining == 0 {
            return false;
        }
        action(ctx, targets);
        self.record_use();
        true
    }

    /// Spends one use and starts the cooldown.
    pub(crate) fn record_use(&mut self) {
        self.uses_remaining = self.uses_remaining.saturating_sub(1);
        self.cooldown_remaining = self.cooldown;
    }

    pub(crate) fn tick_cooldown(&mut self) {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
    }

    pub(crate) fn reset_uses(&mut self) {
        self.uses_remaining = self.uses_per_turn;
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Move")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state())
            .field("turn_fraction", &self.turn_fraction)
            .field("uses_remaining", &self.uses_remaining)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}
