//! Multi-turn charging through full rounds.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use combat_core::{
    Character, CombatConfig, LedgerEntry, Move, MoveEconomy, Scheduler, TeamId, move_action,
};
use common::{health, id};

fn counted(mv: Move) -> (Move, Arc<AtomicU32>) {
    let fired = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&fired);
    let mv = mv.with_action(move_action(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));
    (mv, fired)
}

fn charging_session(turn_fraction: f64) -> (Scheduler, Arc<AtomicU32>) {
    let (heavy, fired) = counted(Move::new("meteor").with_turn_fraction(turn_fraction));
    (session_with(heavy), fired)
}

fn session_with(heavy: Move) -> Scheduler {
    let mut scheduler = Scheduler::new(CombatConfig::new());
    scheduler
        .queue_add(
            Character::new(id(1), TeamId(0))
                .with_health(10)
                .with_economy(MoveEconomy::new().with_move(heavy).with_partial_charging(true)),
        )
        .unwrap();
    scheduler
        .queue_add(Character::new(id(2), TeamId(1)).with_health(10))
        .unwrap();
    scheduler.start_session();
    scheduler
}

fn meteor_charge(scheduler: &Scheduler) -> f64 {
    scheduler.roster().get(id(1)).unwrap().economy.moves()[0].charge()
}

#[test]
fn heavy_move_fires_once_charge_covers_its_cost() {
    let (mut scheduler, fired) = charging_session(2.5);

    let mut fired_per_round = Vec::new();
    for round in 0..4 {
        if round > 0 {
            scheduler.next_round().unwrap();
        }
        let ledger = scheduler.roster().get(id(1)).unwrap().economy.ledger().clone();
        assert!(ledger.consumed() <= 1.0);
        scheduler.execute_round().unwrap();
        fired_per_round.push(fired.load(Ordering::SeqCst));
    }

    assert_eq!(fired_per_round, vec![0, 0, 1, 1]);
    assert_eq!(health(&scheduler, 2), Some(10));
}

#[test]
fn ledger_shows_partial_charge_then_execution() {
    let (mut scheduler, _) = charging_session(1.5);

    let economy = &scheduler.roster().get(id(1)).unwrap().economy;
    let move_id = economy.moves()[0].id();
    assert_eq!(
        economy.ledger().entries(),
        &[LedgerEntry::Charged {
            move_id,
            amount: 1.0
        }]
    );

    scheduler.execute_round().unwrap();
    scheduler.next_round().unwrap();

    let economy = &scheduler.roster().get(id(1)).unwrap().economy;
    assert_eq!(
        economy.ledger().entries(),
        &[LedgerEntry::Executed {
            move_id,
            cost: 0.5
        }]
    );
    assert_eq!(economy.ledger().remaining(), 0.5);
}

#[test]
fn charge_only_move_banks_a_turn_per_round_until_released() {
    let (meteor, fired) = counted(Move::new("meteor").with_turn_fraction(2.5).charge_only());
    let mut scheduler = session_with(meteor);
    let move_id = scheduler.roster().get(id(1)).unwrap().economy.moves()[0].id();

    // ceil(2.5) rounds of charging, each banking the whole turn.
    for round in 0..3 {
        if round > 0 {
            scheduler.next_round().unwrap();
        }
        assert_eq!(meteor_charge(&scheduler), f64::from(round + 1));
        assert!(scheduler.roster().get(id(1)).unwrap().economy.chosen().is_empty());
        scheduler.execute_round().unwrap();
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    scheduler
        .roster_mut()
        .get_mut(id(1))
        .unwrap()
        .economy
        .get_mut(move_id)
        .unwrap()
        .charge_only = false;
    scheduler.next_round().unwrap();

    let economy = &scheduler.roster().get(id(1)).unwrap().economy;
    assert_eq!(
        economy.ledger().entries(),
        &[LedgerEntry::Executed {
            move_id,
            cost: 0.0
        }]
    );
    assert_eq!(meteor_charge(&scheduler), 0.0);

    scheduler.execute_round().unwrap();
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
