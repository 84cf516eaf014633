use std::fmt;

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::Gear;

/// What the engine did on a given day.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No trade: no threshold crossed, or a trigger was skipped.
    Hold,
    /// One unit was accumulated.
    Buy,
    /// Up to one unit's worth was distributed.
    Sell,
}

impl Action {
    /// Returns true for `Buy` and `Sell`.
    pub fn is_trade(&self) -> bool {
        !matches!(self, Self::Hold)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Hold => "Hold",
            Self::Buy => "Buy",
            Self::Sell => "Sell",
        };
        f.write_str(name)
    }
}

/// One post-trade snapshot per input day, in chronological order.
///
/// Entries record everything the reporting layer needs: the day's market
/// facts (close, gear, effective reference price), the action taken, the
/// cash moved and P&L realized by it, and the state left behind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry {
    date: NaiveDate,
    close: f64,
    gear: Gear,
    reference_price: f64,
    action: Action,
    trade_value: f64,
    realized_pnl: f64,
    holdings: f64,
    total_equity: f64,
    virtual_seed: f64,
}

impl LedgerEntry {
    /// Creates a ledger entry.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        close: f64,
        gear: Gear,
        reference_price: f64,
        action: Action,
        trade_value: f64,
        realized_pnl: f64,
        holdings: f64,
        total_equity: f64,
        virtual_seed: f64,
    ) -> Self {
        Self {
            date,
            close,
            gear,
            reference_price,
            action,
            trade_value,
            realized_pnl,
            holdings,
            total_equity,
            virtual_seed,
        }
    }

    /// Returns the trading day.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the day's closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the gear in effect for the day.
    pub fn gear(&self) -> Gear {
        self.gear
    }

    /// Returns the reference price the day's thresholds were derived from.
    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    /// Returns the action taken.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Returns the cash moved by the day's trade (zero on Hold).
    pub fn trade_value(&self) -> f64 {
        self.trade_value
    }

    /// Returns the P&L realized by the day's trade (zero unless Sell).
    pub fn realized_pnl(&self) -> f64 {
        self.realized_pnl
    }

    /// Returns the share count after the day's trade.
    pub fn holdings(&self) -> f64 {
        self.holdings
    }

    /// Returns the mark-to-market equity after the day's trade.
    pub fn total_equity(&self) -> f64 {
        self.total_equity
    }

    /// Returns the virtual seed after the day's compounding update.
    pub fn virtual_seed(&self) -> f64 {
        self.virtual_seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_trade_classification() {
        assert!(!Action::Hold.is_trade());
        assert!(Action::Buy.is_trade());
        assert!(Action::Sell.is_trade());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Hold.to_string(), "Hold");
        assert_eq!(Action::Buy.to_string(), "Buy");
        assert_eq!(Action::Sell.to_string(), "Sell");
    }

    #[test]
    fn entry_accessors() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let entry = LedgerEntry::new(
            date,
            95.0,
            Gear::Normal,
            100.0,
            Action::Buy,
            1_250.0,
            0.0,
            13.157,
            10_000.0,
            10_000.0,
        );

        assert_eq!(entry.date(), date);
        assert_eq!(entry.close(), 95.0);
        assert_eq!(entry.gear(), Gear::Normal);
        assert_eq!(entry.reference_price(), 100.0);
        assert_eq!(entry.action(), Action::Buy);
        assert_eq!(entry.trade_value(), 1_250.0);
        assert_eq!(entry.realized_pnl(), 0.0);
        assert_eq!(entry.holdings(), 13.157);
        assert_eq!(entry.total_equity(), 10_000.0);
        assert_eq!(entry.virtual_seed(), 10_000.0);
    }
}
