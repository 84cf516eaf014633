//! Performance metrics for a finished run.
//!
//! This module provides tools to calculate:
//! - Total return and a buy-and-hold benchmark
//! - Max drawdown over the equity curve
//! - Trade counts and win rate
//!
//! Everything here is pure post-processing over the ledger; the engine
//! itself reports nothing beyond the per-day entries.
//!
//! It needs the `metrics` feature to be enabled.

use std::fmt;

use crate::BandCalculus;
use crate::engine::{Action, Gear, LedgerEntry, SimConfig};

/// Summary statistics calculated from a ledger.
///
/// `Metrics` holds its own copy of the entries plus the initial cash the
/// run started from, and derives key performance indicators on demand.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct Metrics {
    initial_cash: f64,
    entries: Vec<LedgerEntry>,
}

impl From<(&SimConfig, &[LedgerEntry])> for Metrics {
    fn from((config, ledger): (&SimConfig, &[LedgerEntry])) -> Self {
        Self::new(config.initial_cash(), ledger)
    }
}

impl Metrics {
    /// Creates a new `Metrics` instance from an initial cash amount and a ledger.
    pub fn new(initial_cash: f64, ledger: &[LedgerEntry]) -> Self {
        Self {
            initial_cash,
            entries: ledger.to_vec(),
        }
    }

    /// Returns the ledger entries.
    pub fn entries(&self) -> std::slice::Iter<'_, LedgerEntry> {
        self.entries.iter()
    }

    /// Returns the cash the run started from.
    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Returns the mark-to-market equity after the final day.
    ///
    /// The initial cash when the ledger is empty.
    pub fn final_equity(&self) -> f64 {
        self.entries
            .last()
            .map(|entry| entry.total_equity())
            .unwrap_or(self.initial_cash)
    }

    /// Returns the total return as a fraction (0.25 for +25%).
    pub fn total_return(&self) -> f64 {
        self.initial_cash.change(self.final_equity())
    }

    /// Returns the buy-and-hold benchmark return as a fraction.
    ///
    /// What holding from the first close to the last would have returned;
    /// zero for an empty ledger.
    pub fn buy_and_hold_return(&self) -> f64 {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => first.close().change(last.close()),
            _ => 0.0,
        }
    }

    /// Computes the maximum drawdown of the equity curve as a percentage.
    pub fn max_drawdown(&self) -> f64 {
        let mut max_peak = self.initial_cash;
        let mut max_drawdown = 0.0;

        for entry in &self.entries {
            let equity = entry.total_equity();
            if equity > max_peak {
                max_peak = equity;
            }
            let drawdown = (max_peak - equity) / max_peak;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
        }

        max_drawdown * 100.0
    }

    /// Returns the number of buy days.
    pub fn buys(&self) -> usize {
        self.entries.iter().filter(|e| e.action() == Action::Buy).count()
    }

    /// Returns the number of sell days.
    pub fn sells(&self) -> usize {
        self.entries.iter().filter(|e| e.action() == Action::Sell).count()
    }

    /// Returns the sum of all realized P&L.
    pub fn realized_pnl(&self) -> f64 {
        self.entries.iter().map(|e| e.realized_pnl()).sum()
    }

    /// Computes the win rate as a percentage of profitable sells.
    pub fn win_rate(&self) -> f64 {
        let mut winning_sells = 0;
        let mut total_sells = 0;

        for entry in &self.entries {
            if entry.action() == Action::Sell {
                total_sells += 1;
                if entry.realized_pnl() > 0.0 {
                    winning_sells += 1;
                }
            }
        }

        if total_sells == 0 {
            return 0.0;
        }

        (winning_sells as f64 / total_sells as f64) * 100.0
    }

    /// Returns the virtual seed after the final day.
    pub fn final_virtual_seed(&self) -> f64 {
        self.entries
            .last()
            .map(|entry| entry.virtual_seed())
            .unwrap_or(self.initial_cash)
    }

    /// Returns the gear in effect on the final day, if any.
    pub fn final_gear(&self) -> Option<Gear> {
        self.entries.last().map(|entry| entry.gear())
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Gear-Band Metrics ===")?;
        writeln!(f, "Initial Cash: {:.2}", self.initial_cash)?;
        writeln!(f, "Final Equity: {:.2}", self.final_equity())?;
        writeln!(f, "Total Return: {:.2}%", self.total_return() * 100.0)?;
        writeln!(f, "Buy & Hold Return: {:.2}%", self.buy_and_hold_return() * 100.0)?;
        #[allow(clippy::writeln_empty_string)]
        writeln!(f, "")?;
        writeln!(f, "Max Drawdown: {:.2}%", self.max_drawdown())?;
        writeln!(f, "Realized P&L: {:.2}", self.realized_pnl())?;
        writeln!(f, "Trades: {} buys, {} sells", self.buys(), self.sells())?;
        writeln!(f, "Win Rate: {:.2}%", self.win_rate())?;
        writeln!(f, "Final Virtual Seed: {:.2}", self.final_virtual_seed())?;
        match self.final_gear() {
            Some(gear) => writeln!(f, "Final Gear: {gear}"),
            None => writeln!(f, "Final Gear: -"),
        }
    }
}

#[cfg(test)]
// Helper to build a ledger entry where only the reporting fields matter
fn entry(day: u32, close: f64, action: Action, pnl: f64, equity: f64) -> LedgerEntry {
    use chrono::NaiveDate;

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(day as u64);
    let trade_value = if action.is_trade() { 1_250.0 } else { 0.0 };
    LedgerEntry::new(date, close, Gear::Normal, close, action, trade_value, pnl, 0.0, equity, 10_000.0)
}

#[cfg(test)]
#[test]
fn max_drawdown() {
    let ledger = vec![
        entry(0, 100.0, Action::Hold, 0.0, 10_000.0),
        entry(1, 100.0, Action::Hold, 0.0, 12_000.0),
        entry(2, 100.0, Action::Hold, 0.0, 9_000.0),
        entry(3, 100.0, Action::Hold, 0.0, 11_000.0),
    ];
    let metrics = Metrics::new(10_000.0, &ledger);
    assert_eq!(metrics.max_drawdown(), 25.0); // (12000 - 9000) / 12000 = 25%
}

#[cfg(test)]
#[test]
fn max_drawdown_empty_ledger() {
    let metrics = Metrics::new(10_000.0, &[]);
    assert_eq!(metrics.max_drawdown(), 0.0); // no drawdown without entries
}

#[cfg(test)]
#[test]
fn total_return_and_final_equity() {
    let ledger = vec![
        entry(0, 100.0, Action::Hold, 0.0, 10_000.0),
        entry(1, 110.0, Action::Hold, 0.0, 12_500.0),
    ];
    let metrics = Metrics::new(10_000.0, &ledger);
    assert_eq!(metrics.final_equity(), 12_500.0);
    assert_eq!(metrics.total_return(), 0.25);
}

#[cfg(test)]
#[test]
fn empty_ledger_returns_nothing() {
    let metrics = Metrics::new(10_000.0, &[]);
    assert_eq!(metrics.final_equity(), 10_000.0);
    assert_eq!(metrics.total_return(), 0.0);
    assert_eq!(metrics.buy_and_hold_return(), 0.0);
    assert_eq!(metrics.final_virtual_seed(), 10_000.0);
    assert_eq!(metrics.final_gear(), None);
}

#[cfg(test)]
#[test]
fn buy_and_hold_benchmark() {
    let ledger = vec![
        entry(0, 100.0, Action::Hold, 0.0, 10_000.0),
        entry(1, 80.0, Action::Buy, 0.0, 10_000.0),
        entry(2, 120.0, Action::Sell, 400.0, 10_400.0),
    ];
    let metrics = Metrics::new(10_000.0, &ledger);
    assert_eq!(metrics.buy_and_hold_return(), 0.20); // 100 -> 120
}

#[cfg(test)]
#[test]
fn trade_counts_and_win_rate() {
    let ledger = vec![
        entry(0, 100.0, Action::Buy, 0.0, 10_000.0),
        entry(1, 95.0, Action::Buy, 0.0, 10_000.0),
        entry(2, 110.0, Action::Sell, 150.0, 10_150.0),
        entry(3, 90.0, Action::Sell, -50.0, 10_100.0),
    ];
    let metrics = Metrics::new(10_000.0, &ledger);
    assert_eq!(metrics.buys(), 2);
    assert_eq!(metrics.sells(), 2);
    assert_eq!(metrics.win_rate(), 50.0); // 1 winning sell out of 2
    assert_eq!(metrics.realized_pnl(), 100.0);
}

#[cfg(test)]
#[test]
fn win_rate_no_sells() {
    let ledger = vec![entry(0, 100.0, Action::Hold, 0.0, 10_000.0)];
    let metrics = Metrics::new(10_000.0, &ledger);
    assert_eq!(metrics.win_rate(), 0.0);
}

#[cfg(test)]
#[test]
fn display_block() {
    let ledger = vec![
        entry(0, 100.0, Action::Buy, 0.0, 10_000.0),
        entry(1, 120.0, Action::Sell, 250.0, 10_250.0),
    ];
    let metrics = Metrics::new(10_000.0, &ledger);
    let text = metrics.to_string();
    assert!(text.contains("=== Gear-Band Metrics ==="));
    assert!(text.contains("Final Equity: 10250.00"));
    assert!(text.contains("Win Rate: 100.00%"));
    assert!(text.contains("Final Gear: N"));
}
