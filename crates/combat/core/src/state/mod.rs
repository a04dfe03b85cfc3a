//! Combat state: characters, the roster arena that owns them, and the
//! round history of deep snapshots.
//!
//! The scheduler is the only component that mutates the live roster between
//! phases; snapshots are never mutated after being recorded.

mod character;
mod history;
mod observable;
mod roster;
mod types;

pub use character::{Character, CharacterFeatures, RemovalPolicy};
pub use history::{CombatHistory, RoundHistory};
pub use observable::{AfterSetHook, BeforeSetHook, Observable, OnGetHook};
pub use roster::{Roster, RosterError};
pub use types::{CharacterId, MoveId, Point, TeamId, round_to};
