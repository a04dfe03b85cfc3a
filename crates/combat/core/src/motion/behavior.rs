//! Per-character movement behavior.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use super::kinds::{MotionKind, MotionRule, OriginMode};
use crate::state::{CharacterId, Point, Roster};

/// Post-processing hook for a proposed destination, e.g. collision.
pub type MotionOverride = Arc<dyn Fn(&Roster, CharacterId, Point) -> Point + Send + Sync>;

/// Computes one destination per movement opportunity.
///
/// Candidate points come from the first configured source:
///
/// 1. explicit [`target_points`](Self::target_points)
/// 2. positions of explicit [`target_characters`](Self::target_characters)
/// 3. positions of the resolved attack targets, when
///    [`use_targeting_targets`](Self::use_targeting_targets) is set
/// 4. every character not on the mover's team
///
/// [`extra_points`](Self::extra_points) are always appended.
#[derive(Clone, Default)]
pub struct MovementBehavior {
    pub rules: Vec<MotionRule>,
    /// Used when no rule matches.
    pub default_origin: OriginMode,
    pub default_kind: MotionKind,
    pub target_points: Option<Vec<Point>>,
    pub target_characters: Option<Vec<CharacterId>>,
    pub use_targeting_targets: bool,
    pub extra_points: Vec<Point>,
    override_hook: Option<MotionOverride>,
}

impl MovementBehavior {
    pub fn new(origin: OriginMode, kind: MotionKind) -> Self {
        Self {
            default_origin: origin,
            default_kind: kind,
            ..Self::default()
        }
    }

    pub fn with_rule(mut self, rule: MotionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_target_points(mut self, points: Vec<Point>) -> Self {
        self.target_points = Some(points);
        self
    }

    pub fn with_target_characters(mut self, characters: Vec<CharacterId>) -> Self {
        self.target_characters = Some(characters);
        self
    }

    pub fn using_targeting_targets(mut self) -> Self {
        self.use_targeting_targets = true;
        self
    }

    pub fn with_extra_point(mut self, point: Point) -> Self {
        self.extra_points.push(point);
        self
    }

    pub fn with_override<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Roster, CharacterId, Point) -> Point + Send + Sync + 'static,
    {
        self.override_hook = Some(Arc::new(hook));
        self
    }

    /// The `(origin, kind)` pair in effect for `actor` right now.
    pub fn select(&self, roster: &Roster, actor: CharacterId) -> (OriginMode, MotionKind) {
        self.rules
            .iter()
            .find(|rule| rule.matches(roster, actor))
            .map_or((self.default_origin, self.default_kind), |rule| {
                (rule.origin, rule.kind)
            })
    }

    /// Candidate points for `actor`, in source order.
    pub fn candidates(
        &self,
        roster: &Roster,
        actor: CharacterId,
        resolved_targets: &[CharacterId],
    ) -> Vec<Point> {
        let positions = |ids: &[CharacterId]| -> Vec<Point> {
            ids.iter().filter_map(|id| roster.location(*id)).collect()
        };

        let mut points = if let Some(points) = &self.target_points {
            points.clone()
        } else if let Some(characters) = &self.target_characters {
            positions(characters)
        } else if self.use_targeting_targets {
            positions(resolved_targets)
        } else {
            roster.enemies_of(actor).map(|c| c.location()).collect()
        };
        points.extend_from_slice(&self.extra_points);
        points
    }

    /// Destination for `actor`, or `None` when it is not in the roster.
    ///
    /// With no candidates, no movement rate, or nothing to do, the current
    /// position comes back unchanged. The override hook sees every other
    /// result.
    pub fn resolve(
        &self,
        roster: &Roster,
        actor: CharacterId,
        resolved_targets: &[CharacterId],
    ) -> Option<Point> {
        let mover = roster.get(actor)?;
        let here = mover.location();
        let rate = mover.stats.movement_rate;

        let candidates = self.candidates(roster, actor, resolved_targets);
        if candidates.is_empty() || rate <= 0.0 {
            return Some(here);
        }

        let (origin_mode, kind) = self.select(roster, actor);
        let Some(origin) = origin_mode.pick(here, &candidates, mover.stats.range.center()) else {
            return Some(here);
        };
        let (angle, magnitude) = kind.step(here, origin, rate);
        let proposed = if magnitude > 0.0 {
            here.offset_polar(angle, magnitude)
        } else {
            here
        };
        trace!(
            target: "combat::motion",
            actor = %actor,
            origin = %origin,
            %proposed,
            "motion resolved"
        );

        Some(match &self.override_hook {
            Some(hook) => hook(roster, actor, proposed),
            None => proposed,
        })
    }
}

impl fmt::Debug for MovementBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MovementBehavior")
            .field("rules", &self.rules)
            .field("default_origin", &self.default_origin)
            .field("default_kind", &self.default_kind)
            .field("target_points", &self.target_points)
            .field("target_characters", &self.target_characters)
            .field("use_targeting_targets", &self.use_targeting_targets)
            .field("extra_points", &self.extra_points)
            .field("override_hook", &self.override_hook.is_some())
            .finish()
    }
}
