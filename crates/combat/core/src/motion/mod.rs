//! Spatial motion resolution.
//!
//! A [`MovementBehavior`] turns the roster into a single destination point for
//! one movement opportunity of a turn (before or after acting).

mod behavior;
mod kinds;

pub use behavior::{MotionOverride, MovementBehavior};
pub use kinds::{MotionKind, MotionPredicate, MotionRule, OriginMode};
