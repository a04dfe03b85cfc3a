//! Targeting behaviors.
//!
//! The engine only depends on the [`TargetingBehavior`] contract; concrete
//! selection policy belongs to the game layer. Two small behaviors ship here
//! so sessions can run without one.

use crate::state::{CharacterId, CombatHistory};

/// Turns the combat history into a concrete target list for a character.
pub trait TargetingBehavior: Send + Sync {
    /// Initial resolution, before pre-move motion.
    fn perform(&self, history: &CombatHistory<'_>, actor: CharacterId) -> Vec<CharacterId>;

    /// Re-resolution after pre-move motion has changed distances.
    fn post_move_perform(
        &self,
        history: &CombatHistory<'_>,
        actor: CharacterId,
    ) -> Vec<CharacterId> {
        self.perform(history, actor)
    }

    /// Fixed targets that take precedence over computed results.
    fn override_targets(&self) -> Option<&[CharacterId]> {
        None
    }

    /// Resolves targets, honoring the override list.
    fn resolve(
        &self,
        history: &CombatHistory<'_>,
        actor: CharacterId,
        post_move: bool,
    ) -> Vec<CharacterId> {
        if let Some(targets) = self.override_targets() {
            return targets.to_vec();
        }
        if post_move {
            self.post_move_perform(history, actor)
        } else {
            self.perform(history, actor)
        }
    }
}

/// Living enemies within `range` of the actor, nearest first, at most
/// `limit` of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemiesInRange {
    pub range: f64,
    pub limit: usize,
}

impl EnemiesInRange {
    pub fn new(range: f64, limit: usize) -> Self {
        Self { range, limit }
    }

    /// Every living enemy regardless of distance.
    pub fn all() -> Self {
        Self::new(f64::INFINITY, usize::MAX)
    }
}

impl TargetingBehavior for EnemiesInRange {
    fn perform(&self, history: &CombatHistory<'_>, actor: CharacterId) -> Vec<CharacterId> {
        let roster = history.current();
        let Some(origin) = roster.location(actor) else {
            return Vec::new();
        };

        let mut candidates: Vec<_> = roster
            .enemies_of(actor)
            .filter(|enemy| enemy.is_alive())
            .map(|enemy| (enemy.location().distance(&origin), enemy.id))
            .filter(|(distance, _)| *distance <= self.range)
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        candidates
            .into_iter()
            .take(self.limit)
            .map(|(_, id)| id)
            .collect()
    }
}

/// Always targets the same characters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedTargets(pub Vec<CharacterId>);

impl TargetingBehavior for FixedTargets {
    fn perform(&self, _history: &CombatHistory<'_>, _actor: CharacterId) -> Vec<CharacterId> {
        self.0.clone()
    }

    fn override_targets(&self) -> Option<&[CharacterId]> {
        Some(&self.0)
    }
}
