use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use super::observable::Observable;
use super::types::{CharacterId, Point, TeamId};
use crate::economy::MoveEconomy;
use crate::motion::MovementBehavior;
use crate::stats::CombatStats;
use crate::targeting::TargetingBehavior;

bitflags! {
    /// Per-character feature toggles consulted by the turn state machine.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CharacterFeatures: u8 {
        const TARGETING      = 1 << 0;
        const MOVEMENT       = 1 << 1;
        const MOVE_SELECTION = 1 << 2;
    }
}

impl Default for CharacterFeatures {
    fn default() -> Self {
        Self::all()
    }
}

/// What the scheduler does with a character whose health reaches zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RemovalPolicy {
    #[default]
    RemoveAtZero,
    Keep,
}

/// A combatant owned by the [`Roster`](super::Roster).
#[derive(Clone)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub team: TeamId,
    pub health: Observable<i64>,
    pub position: Observable<Point>,
    pub stats: CombatStats,
    pub economy: MoveEconomy,
    /// Default targeting behavior; moves may override it.
    pub targeting: Option<Arc<dyn TargetingBehavior>>,
    /// Default motion before acting; moves may override it.
    pub pre_motion: Option<MovementBehavior>,
    /// Default motion after acting; moves may override it.
    pub post_motion: Option<MovementBehavior>,
    pub features: CharacterFeatures,
    pub removal: RemovalPolicy,
    pub(crate) speed: f64,
    pub(crate) carried_speed: f64,
}

impl Character {
    pub fn new(id: CharacterId, team: TeamId) -> Self {
        Self {
            id,
            name: String::new(),
            team,
            health: Observable::new(1),
            position: Observable::new(Point::ORIGIN),
            stats: CombatStats::default(),
            economy: MoveEconomy::default(),
            targeting: None,
            pre_motion: None,
            post_motion: None,
            features: CharacterFeatures::default(),
            removal: RemovalPolicy::default(),
            speed: 0.0,
            carried_speed: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_health(mut self, health: i64) -> Self {
        self.health.set_raw(health);
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position.set_raw(position);
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_economy(mut self, economy: MoveEconomy) -> Self {
        self.economy = economy;
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

    pub fn with_features(mut self, features: CharacterFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_removal(mut self, removal: RemovalPolicy) -> Self {
        self.removal = removal;
        self
    }

    /// Turn-order key computed for the current round; lower acts first.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Speed delay carried into the next round when carryover is enabled.
    pub fn carried_speed(&self) -> f64 {
        self.carried_speed
    }

    pub fn location(&self) -> Point {
        self.position.get()
    }

    pub fn is_alive(&self) -> bool {
        self.health.get() > 0
    }

    pub fn is_ally_of(&self, other: &Character) -> bool {
        self.team == other.team
    }

    /// Whether the cleanup pass should queue this character for removal.
    pub fn should_be_removed(&self) -> bool {
        self.removal == RemovalPolicy::RemoveAtZero && !self.is_alive()
    }

    /// Deep copy with fresh, hook-free stat cells and the same identity.
    pub fn snapshot(&self) -> Character {
        let mut copy = self.clone();
        copy.health = self.health.detached();
        copy.position = self.position.detached();
        copy
    }

    /// Deep copy under a new identity.
    pub fn duplicate(&self, id: CharacterId) -> Character {
        let mut copy = self.snapshot();
        copy.id = id;
        copy
    }
}

impl fmt::Debug for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("health", self.health.raw())
            .field("position", self.position.raw())
            .field("speed", &self.speed)
            .field("features", &self.features)
            .field("economy", &self.economy)
            .finish_non_exhaustive()
    }
}
