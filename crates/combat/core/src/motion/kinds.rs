//! Origin selection and motion formulas.
//!
//! An [`OriginMode`] reduces a candidate set to one reference point; a
//! [`MotionKind`] turns that point into a heading and a distance.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::state::{CharacterId, Point, Roster};

/// How the reference point is picked from the candidate set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OriginMode {
    /// Mean of all candidates.
    Average,
    First,
    Furthest,
    #[default]
    Nearest,
    /// Candidate whose distance is closest to the middle of the mover's
    /// engagement range.
    NearestToCenter,
}

impl OriginMode {
    /// Picks the origin from `candidates` as seen from `from`.
    ///
    /// `center` is the preferred engagement distance, only used by
    /// [`OriginMode::NearestToCenter`]. Ties go to the earliest candidate.
    pub fn pick(self, from: Point, candidates: &[Point], center: f64) -> Option<Point> {
        match self {
            Self::Average => Point::centroid(candidates),
            Self::First => candidates.first().copied(),
            Self::Furthest => first_best(candidates, |p| -from.distance(p)),
            Self::Nearest => first_best(candidates, |p| from.distance(p)),
            Self::NearestToCenter => first_best(candidates, |p| (from.distance(p) - center).abs()),
        }
    }
}

/// Candidate with the smallest key; the first one wins ties.
fn first_best(candidates: &[Point], key: impl Fn(&Point) -> f64) -> Option<Point> {
    candidates
        .iter()
        .map(|p| (key(p), *p))
        .fold(None, |best: Option<(f64, Point)>, (k, p)| match best {
            Some((bk, _)) if bk <= k || k.is_nan() => best,
            _ => Some((k, p)),
        })
        .map(|(_, p)| p)
}

/// Direction and extent of a movement relative to the origin point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MotionKind {
    /// Close the whole gap, up to the movement rate.
    #[default]
    Towards,
    TowardsUpToDistance(f64),
    /// Retreat as far as the movement rate allows.
    Away,
    AwayUpToDistance(f64),
    /// Seek the middle of the `[min, max]` band around the origin.
    ToDistance { min: f64, max: f64 },
    /// Move only as far as needed to enter the `[min, max]` band.
    WithinDistanceRange { min: f64, max: f64 },
}

impl MotionKind {
    /// Angle and magnitude of a step from `from` relative to `origin`.
    ///
    /// A zero magnitude means hold position.
    pub fn step(self, from: Point, origin: Point, rate: f64) -> (f64, f64) {
        let towards = from.angle_to(&origin);
        let away = towards + PI;
        let gap = from.distance(&origin);

        match self {
            Self::Towards => (towards, gap.min(rate)),
            Self::TowardsUpToDistance(limit) => (towards, gap.min(rate).min(limit.max(0.0))),
            Self::Away => (away, rate),
            Self::AwayUpToDistance(limit) => (away, rate.min(limit.max(0.0))),
            Self::ToDistance { min, max } => {
                let desired = (min + max) / 2.0;
                if gap > desired {
                    (towards, (gap - desired).min(rate))
                } else {
                    (away, (desired - gap).min(rate))
                }
            }
            Self::WithinDistanceRange { min, max } => {
                if gap > max {
                    (towards, (gap - max).min(rate))
                } else if gap < min {
                    (away, (min - gap).min(rate))
                } else {
                    (towards, 0.0)
                }
            }
        }
    }
}

pub type MotionPredicate = Arc<dyn Fn(&Roster, CharacterId) -> bool + Send + Sync>;

/// Conditional `(origin, kind)` pair; the first rule whose predicate holds
/// is used.
#[derive(Clone)]
pub struct MotionRule {
    predicate: MotionPredicate,
    pub origin: OriginMode,
    pub kind: MotionKind,
}

impl MotionRule {
    pub fn new<F>(predicate: F, origin: OriginMode, kind: MotionKind) -> Self
    where
        F: Fn(&Roster, CharacterId) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            origin,
            kind,
        }
    }

    /// A rule that always applies.
    pub fn always(origin: OriginMode, kind: MotionKind) -> Self {
        Self::new(|_, _| true, origin, kind)
    }

    pub fn matches(&self, roster: &Roster, actor: CharacterId) -> bool {
        (self.predicate)(roster, actor)
    }
}

impl fmt::Debug for MotionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MotionRule")
            .field("origin", &self.origin)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<Point> {
        vec![
            Point::new(4.0, 0.0),
            Point::new(-2.0, 0.0),
            Point::new(0.0, 2.0),
            Point::new(8.0, 0.0),
        ]
    }

    #[test]
    fn origin_modes() {
        let from = Point::ORIGIN;
        let candidates = points();

        assert_eq!(OriginMode::First.pick(from, &candidates, 0.0), Some(Point::new(4.0, 0.0)));
        assert_eq!(OriginMode::Nearest.pick(from, &candidates, 0.0), Some(Point::new(-2.0, 0.0)));
        assert_eq!(OriginMode::Furthest.pick(from, &candidates, 0.0), Some(Point::new(8.0, 0.0)));
        assert_eq!(
            OriginMode::NearestToCenter.pick(from, &candidates, 5.0),
            Some(Point::new(4.0, 0.0))
        );
        assert_eq!(OriginMode::Average.pick(from, &candidates, 0.0), Some(Point::new(2.5, 0.5)));
        assert_eq!(OriginMode::Nearest.pick(from, &[], 0.0), None);
    }

    #[test]
    fn within_range_holds_inside_band() {
        let (_, magnitude) = MotionKind::WithinDistanceRange { min: 2.0, max: 6.0 }.step(
            Point::ORIGIN,
            Point::new(4.0, 0.0),
            10.0,
        );
        assert_eq!(magnitude, 0.0);
    }

    #[test]
    fn to_distance_backs_off_when_too_close() {
        let (angle, magnitude) = MotionKind::ToDistance { min: 4.0, max: 6.0 }.step(
            Point::ORIGIN,
            Point::new(1.0, 0.0),
            10.0,
        );
        assert_eq!(magnitude, 4.0);
        assert_eq!(angle, PI);
    }

    #[test]
    fn capped_by_configured_distance() {
        let (_, magnitude) =
            MotionKind::TowardsUpToDistance(2.0).step(Point::ORIGIN, Point::new(9.0, 0.0), 5.0);
        assert_eq!(magnitude, 2.0);
    }
}
