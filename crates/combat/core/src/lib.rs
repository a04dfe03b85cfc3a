//! Deterministic turn-based combat resolution.
//!
//! `combat-core` resolves combat sessions between teams of characters: the
//! [`engine::Scheduler`] orders turns by speed and drives each one through a
//! fixed phase sequence, the [`economy::MoveEconomy`] budgets a turn's moves
//! with multi-turn charging, [`combat`] turns attacks into damage and side
//! effects, and [`motion`] picks a destination per movement opportunity.
//! Every random draw goes through one injected [`rng::RngOracle`].
pub mod combat;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod events;
pub mod motion;
pub mod rng;
pub mod state;
pub mod stats;
pub mod targeting;

pub use combat::{ActionContext, AttackReport, basic_attack, resolve_attack};
pub use config::CombatConfig;
pub use economy::{
    LedgerEntry, Motive, MotiveFn, Move, MoveAction, MoveEconomy, MoveState, SelectionFn,
    TurnLedger, default_selection, move_action,
};
pub use engine::{PlannedMove, Scheduler, SchedulerError, SessionSummary, TurnPhase, TurnPlan};
pub use error::{CombatError, ErrorContext, ErrorSeverity};
pub use events::{CombatEvent, EventBus, EventKind, ListenerId, MotionStage};
pub use motion::{MotionKind, MotionRule, MovementBehavior, OriginMode};
pub use rng::{PcgRng, RandRng, RngOracle, ScriptedRng};
pub use state::{
    Character, CharacterFeatures, CharacterId, CombatHistory, MoveId, Observable, Point,
    RemovalPolicy, Roster, RosterError, RoundHistory, TeamId,
};
pub use stats::{
    CombatStats, DamageSlot, DamageType, DefenseSlot, HitStatus, KnockbackProfile, RangeProfile,
    RecoilProfile, SpeedStatus,
};
pub use targeting::{EnemiesInRange, FixedTargets, TargetingBehavior};
