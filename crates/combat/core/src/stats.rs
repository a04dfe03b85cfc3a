//! Combat stat bundle carried by every character.
//!
//! Damage and defense are organised in parallel slots: slot `i` of an
//! attacker's [`DamageSlot`]s is reduced by slot `i` of the target's
//! [`DefenseSlot`]s. A missing defense slot reduces nothing.

/// Damage type label for a damage slot.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageType {
    /// Physical damage (melee, projectiles).
    #[default]
    Physical,
    /// Fire damage (burns, explosions).
    Fire,
    /// Cold damage (ice, frost).
    Cold,
    /// Lightning damage (electricity, storms).
    Lightning,
    /// Poison damage (toxins, venom).
    Poison,
    /// Arcane damage (pure magic).
    Arcane,
}

/// One damage roll an attacker makes per attack.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageSlot {
    pub kind: DamageType,
    /// Inclusive lower bound of the roll.
    pub min: i64,
    /// Inclusive upper bound of the roll.
    pub max: i64,
    /// Crit chance on a 0-100 scale.
    pub crit_chance: f64,
    pub crit_multiplier: f64,
}

impl DamageSlot {
    pub fn new(kind: DamageType, min: i64, max: i64) -> Self {
        Self {
            kind,
            min,
            max,
            crit_chance: 0.0,
            crit_multiplier: 1.0,
        }
    }

    /// A slot that always rolls `amount`.
    pub fn fixed(kind: DamageType, amount: i64) -> Self {
        Self::new(kind, amount, amount)
    }

    pub fn with_crit(mut self, chance: f64, multiplier: f64) -> Self {
        self.crit_chance = chance;
        self.crit_multiplier = multiplier;
        self
    }
}

/// Flat reduction and percentage resistance against one damage slot.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseSlot {
    pub reduction: f64,
    /// Percentage resisted; negative values amplify incoming damage.
    pub resistance: f64,
}

impl DefenseSlot {
    pub fn new(reduction: f64, resistance: f64) -> Self {
        Self {
            reduction,
            resistance,
        }
    }
}

/// Whether an attacker rolls to hit at all.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitStatus {
    #[default]
    Normal,
    AlwaysHit,
}

/// Turn-order priority tier overriding the raw speed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpeedStatus {
    #[default]
    Normal,
    AlwaysFirst,
    AlwaysLast,
}

/// Engagement range thresholds and the damage multipliers at each end.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeProfile {
    pub min_range_required: f64,
    pub max_range_allowed: f64,
    pub min_range_multiplier: f64,
    pub max_range_multiplier: f64,
}

impl RangeProfile {
    /// Upper range bound of a profile with no effective limit. Finite and
    /// exactly representable, so it survives a JSON round trip.
    pub const UNBOUNDED: f64 = 1.0e9;

    pub fn new(min_range_required: f64, max_range_allowed: f64) -> Self {
        Self {
            min_range_required,
            max_range_allowed,
            ..Self::default()
        }
    }

    pub fn with_multipliers(mut self, at_min: f64, at_max: f64) -> Self {
        self.min_range_multiplier = at_min;
        self.max_range_multiplier = at_max;
        self
    }

    /// Midpoint of the engagement band.
    pub fn center(&self) -> f64 {
        (self.min_range_required + self.max_range_allowed) / 2.0
    }
}

impl Default for RangeProfile {
    fn default() -> Self {
        Self {
            min_range_required: 0.0,
            max_range_allowed: Self::UNBOUNDED,
            min_range_multiplier: 1.0,
            max_range_multiplier: 1.0,
        }
    }
}

/// Damage reflected back onto attackers that hit this character.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnockbackProfile {
    /// Share of the damage received, on a 0-100 scale.
    pub percent: f64,
    pub constant: f64,
}

/// Push distance applied to targets this character hits.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoilProfile {
    pub min: f64,
    pub max: f64,
}

/// Everything the damage pipeline and the scheduler read from a character.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatStats {
    pub damage: Vec<DamageSlot>,
    pub defense: Vec<DefenseSlot>,
    /// Hit chance on a 0-100 scale.
    pub hit_chance: f64,
    pub hit_status: HitStatus,
    /// Dodge chance on a 0-100 scale.
    pub dodge_chance: f64,
    pub crit_immune: bool,
    pub range: RangeProfile,
    /// Maximum distance covered per motion resolution.
    pub movement_rate: f64,
    /// Higher speed acts earlier.
    pub move_speed: f64,
    pub speed_status: SpeedStatus,
    pub knockback: KnockbackProfile,
    pub recoil: RecoilProfile,
}

impl CombatStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defense against slot `index`, or no defense at all.
    pub fn defense_slot(&self, index: usize) -> DefenseSlot {
        self.defense.get(index).copied().unwrap_or_default()
    }

    pub fn with_damage(mut self, slot: DamageSlot) -> Self {
        self.damage.push(slot);
        self
    }

    pub fn with_defense(mut self, slot: DefenseSlot) -> Self {
        self.defense.push(slot);
        self
    }

    pub fn with_hit(mut self, chance: f64, status: HitStatus) -> Self {
        self.hit_chance = chance;
        self.hit_status = status;
        self
    }

    pub fn with_dodge(mut self, chance: f64) -> Self {
        self.dodge_chance = chance;
        self
    }

    pub fn with_range(mut self, range: RangeProfile) -> Self {
        self.range = range;
        self
    }

    pub fn with_movement_rate(mut self, rate: f64) -> Self {
        self.movement_rate = rate;
        self
    }

    pub fn with_speed(mut self, move_speed: f64, status: SpeedStatus) -> Self {
        self.move_speed = move_speed;
        self.speed_status = status;
        self
    }

    pub fn with_knockback(mut self, percent: f64, constant: f64) -> Self {
        self.knockback = KnockbackProfile { percent, constant };
        self
    }

    pub fn with_recoil(mut self, min: f64, max: f64) -> Self {
        self.recoil = RecoilProfile { min, max };
        self
    }
}

impl Default for CombatStats {
    fn default() -> Self {
        Self {
            damage: Vec::new(),
            defense: Vec::new(),
            hit_chance: 100.0,
            hit_status: HitStatus::Normal,
            dodge_chance: 0.0,
            crit_immune: false,
            range: RangeProfile::default(),
            movement_rate: 0.0,
            move_speed: 0.0,
            speed_status: SpeedStatus::Normal,
            knockback: KnockbackProfile::default(),
            recoil: RecoilProfile::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_is_unbounded_and_neutral() {
        let range = RangeProfile::default();
        assert_eq!(range.max_range_allowed, RangeProfile::UNBOUNDED);
        assert!(range.center().is_finite());
        assert_eq!(range.min_range_multiplier, 1.0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn default_stats_survive_json() {
        let stats = CombatStats::new().with_damage(DamageSlot::new(DamageType::Fire, 2, 5));
        let json = serde_json::to_string(&stats).unwrap();
        let back: CombatStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
