//! Shared fixtures for combat-core integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use combat_core::{
    Character, CharacterId, CombatEvent, CombatStats, DamageSlot, DamageType, EventKind,
    FixedTargets, HitStatus, Move, MoveEconomy, Point, Scheduler, TeamId, basic_attack,
};
use combat_core::rng::RngOracle;
use tracing_subscriber::EnvFilter;

/// Installs a test-writer subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn id(n: u32) -> CharacterId {
    CharacterId(n)
}

/// A character with `health` at `at` that owns a single basic attack.
pub fn fighter(n: u32, team: u32, health: i64, at: Point) -> Character {
    Character::new(id(n), TeamId(team))
        .with_name(format!("fighter-{n}"))
        .with_health(health)
        .with_position(at)
        .with_economy(MoveEconomy::new().with_move(Move::new("strike").with_action(basic_attack())))
}

/// Always-hitting stats with one fixed damage slot.
pub fn sure_hit(damage: i64) -> CombatStats {
    CombatStats::new()
        .with_hit(100.0, HitStatus::AlwaysHit)
        .with_damage(DamageSlot::fixed(DamageType::Physical, damage))
}

pub fn aimed_at(character: Character, targets: &[u32]) -> Character {
    character.with_targeting(Arc::new(FixedTargets(targets.iter().copied().map(id).collect())))
}

pub fn health<R: RngOracle>(scheduler: &Scheduler<R>, n: u32) -> Option<i64> {
    scheduler.roster().get(id(n)).map(|c| *c.health.raw())
}

/// Records every emitted event.
pub fn record_events<R: RngOracle>(scheduler: &mut Scheduler<R>) -> Arc<Mutex<Vec<CombatEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    scheduler
        .events_mut()
        .subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
    log
}

pub fn kinds(log: &Arc<Mutex<Vec<CombatEvent>>>) -> Vec<EventKind> {
    log.lock().unwrap().iter().map(CombatEvent::kind).collect()
}
