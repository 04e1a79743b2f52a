use std::sync::Arc;

use ledger_core::{FixedClock, Ledger, LedgerConfig, Transaction};
use rust_decimal::Decimal;

pub const EPOCH: i64 = 1_600_000_000;

pub fn fixed_ledger(difficulty: u32) -> Ledger {
    let config = LedgerConfig {
        difficulty,
        ..Default::default()
    };
    let clock = FixedClock::at_epoch(EPOCH).expect("valid epoch");
    Ledger::with_clock("genesis-beneficiary", config, Arc::new(clock)).expect("valid config")
}

pub fn transfer(from: &str, to: &str, amount: i64) -> Transaction {
    Transaction::new(from, to, Decimal::from(amount), "2020-09-13T12:26:40Z")
}
