//! Damage-resolution pipeline.
//!
//! Each step is a standalone function over an [`ActionContext`] so custom move
//! actions can reuse any subset. [`resolve_attack`] composes them in order:
//!
//! 1. hit and dodge rolls ([`resolve_hits`])
//! 2. attacker damage roll with per-slot crits ([`roll_attacker_damage`])
//! 3. crit or base vector per target ([`target_damage`])
//! 4. range multiplier ([`range_multiplier`])
//! 5. flat reduction and resistance ([`apply_reductions`])
//! 6. health loss ([`deal_damage`])
//! 7. knockback onto the attacker ([`apply_knockback`])
//! 8. recoil push on the target ([`apply_recoil`])

mod context;
mod damage;
mod hit;
mod range;
mod reaction;
mod result;

pub use context::ActionContext;
pub use damage::{
    DamageRoll, apply_reductions, deal_damage, resistance_factor, roll_attacker_damage,
    target_damage,
};
pub use hit::{HitResolution, resolve_hits};
pub use range::{RANGE_PRECISION, apply_range, range_multiplier};
pub use reaction::{RecoilOutcome, apply_knockback, apply_recoil};
pub use result::{AttackReport, TargetOutcome, basic_attack, resolve_attack};
