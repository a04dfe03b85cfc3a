//! Per-turn budget ledger.

use crate::state::{MoveId, round_to};

/// Decimal places the turn budget is tracked at.
pub const BUDGET_PRECISION: i32 = 6;

/// What happened to one candidate move while the turn budget was allocated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LedgerEntry {
    /// Paid `cost` and joined the execution list.
    Executed { move_id: MoveId, cost: f64 },
    /// Banked `amount` of charge without executing.
    Charged { move_id: MoveId, amount: f64 },
    /// Considered but neither funded nor charged.
    Skipped { move_id: MoveId },
}

/// Record of how one `perform` call spent the turn budget of 1.0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TurnLedger {
    entries: Vec<LedgerEntry>,
}

impl TurnLedger {
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub(crate) fn record(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// Total budget spent on executions and charging.
    pub fn consumed(&self) -> f64 {
        let total = self
            .entries
            .iter()
            .map(|entry| match entry {
                LedgerEntry::Executed { cost, .. } => *cost,
                LedgerEntry::Charged { amount, .. } => *amount,
                LedgerEntry::Skipped { .. } => 0.0,
            })
            .sum::<f64>();
        round_to(total, BUDGET_PRECISION)
    }

    pub fn remaining(&self) -> f64 {
        round_to(1.0 - self.consumed(), BUDGET_PRECISION)
    }

    pub fn executed(&self) -> impl Iterator<Item = MoveId> + '_ {
        self.entries.iter().filter_map(|entry| match entry {
            LedgerEntry::Executed { move_id, .. } => Some(*move_id),
            _ => None,
        })
    }
}
