#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::SimConfig;

// Holdings below this are floating-point residue, not a position.
const HOLDINGS_EPSILON: f64 = 1e-4;

/// The mutable state threaded through one simulation run.
///
/// One instance exists per run; it is created fresh at the start, owned
/// exclusively by that run, and discarded after the last ledger entry.
/// Parameter sweeps must build an independent state per parameterization.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    // Available cash, never negative
    cash: f64,
    // Share count, never negative
    holdings: f64,
    // Cost basis of current holdings, meaningless while holdings == 0
    average_cost: f64,
    // Compounding capital base used to size units; diverges from cash
    virtual_seed: f64,
    // Anchor price the day's band is computed from
    reference_price: f64,
    // Trading days since the reference price was last set
    days_since_reset: u32,
}

impl EngineState {
    /// Creates the opening state for a run.
    ///
    /// The reference price is seeded with the first observation's close so
    /// it is defined from day one; cash and virtual seed both start at the
    /// configured initial cash.
    pub fn opening(config: &SimConfig, first_close: f64) -> Self {
        Self {
            cash: config.initial_cash(),
            holdings: 0.0,
            average_cost: 0.0,
            virtual_seed: config.initial_cash(),
            reference_price: first_close,
            days_since_reset: 0,
        }
    }

    /// Returns the available cash.
    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Returns the current share count.
    pub fn holdings(&self) -> f64 {
        self.holdings
    }

    /// Returns the cost basis of the current holdings.
    pub fn average_cost(&self) -> f64 {
        self.average_cost
    }

    /// Returns the virtual seed.
    pub fn virtual_seed(&self) -> f64 {
        self.virtual_seed
    }

    /// Returns the reference price the current band is anchored on.
    pub fn reference_price(&self) -> f64 {
        self.reference_price
    }

    /// Returns the trading days elapsed since the last reference reset.
    pub fn days_since_reset(&self) -> u32 {
        self.days_since_reset
    }

    /// Returns the mark-to-market equity at the given close.
    pub fn equity(&self, close: f64) -> f64 {
        self.cash + self.holdings * close
    }

    /// Returns the capital allocation per trade.
    ///
    /// Recomputed from the current virtual seed, so it drifts as the seed
    /// compounds. Zero when the seed is non-positive: the sizing step must
    /// never divide by or allocate from a degenerate seed.
    pub fn unit(&self, split_count: u32) -> f64 {
        if self.virtual_seed > 0.0 {
            self.virtual_seed / split_count as f64
        } else {
            0.0
        }
    }

    /// Returns the fraction of the virtual seed held as marked-to-market stock.
    ///
    /// Zero when the seed is non-positive, by the same guard as [`unit`].
    ///
    /// [`unit`]: EngineState::unit
    pub fn invested_ratio(&self, close: f64) -> f64 {
        if self.virtual_seed > 0.0 {
            (self.holdings * close) / self.virtual_seed
        } else {
            0.0
        }
    }

    /// Advances the reference-price scheduler by one trading day.
    ///
    /// Once the counter reaches the reset period the reference price is
    /// overwritten with the day's close; otherwise it only counts the day.
    pub(crate) fn roll_reference(&mut self, close: f64, reset_period: u32) {
        if self.days_since_reset >= reset_period {
            self.reference_price = close;
            self.days_since_reset = 0;
        } else {
            self.days_since_reset += 1;
        }
    }

    /// Buys one unit's worth of stock at the close.
    ///
    /// The caller has already checked the funding (`cash >= unit`).
    pub(crate) fn execute_buy(&mut self, close: f64, unit: f64) {
        let quantity = unit / close;
        let lot_cost = self.holdings * self.average_cost + unit;
        self.holdings += quantity;
        self.average_cost = lot_cost / self.holdings;
        self.cash -= unit;
    }

    /// Sells at most one unit's worth of stock at the close.
    ///
    /// Never sells more than is held. The cost basis of the remaining
    /// shares is unaffected by a partial sell.
    ///
    /// ### Returns
    /// The `(revenue, realized_pnl)` of the trade.
    pub(crate) fn execute_sell(&mut self, close: f64, unit: f64) -> (f64, f64) {
        let quantity = self.holdings.min(unit / close);
        let revenue = quantity * close;
        let realized_pnl = (close - self.average_cost) * quantity;
        self.cash += revenue;
        self.holdings -= quantity;
        if self.holdings < HOLDINGS_EPSILON {
            self.holdings = 0.0;
        }
        (revenue, realized_pnl)
    }

    /// Feeds a realized P&L into the virtual seed, asymmetrically.
    pub(crate) fn absorb_pnl(&mut self, realized_pnl: f64, profit_retention: f64, loss_retention: f64) {
        if realized_pnl > 0.0 {
            self.virtual_seed += realized_pnl * profit_retention;
        } else {
            self.virtual_seed += realized_pnl * loss_retention;
        }
    }
}

#[cfg(test)]
fn opening_state() -> EngineState {
    EngineState::opening(&SimConfig::default(), 100.0)
}

#[cfg(test)]
#[test]
fn opening_seeds_reference_and_capital() {
    let state = opening_state();
    assert_eq!(state.cash(), 10_000.0);
    assert_eq!(state.virtual_seed(), 10_000.0);
    assert_eq!(state.holdings(), 0.0);
    assert_eq!(state.reference_price(), 100.0);
    assert_eq!(state.days_since_reset(), 0);
    assert_eq!(state.equity(100.0), 10_000.0);
}

#[cfg(test)]
#[test]
fn roll_reference_counts_then_resets() {
    let mut state = opening_state();
    for day in 1..=6 {
        state.roll_reference(90.0, 6);
        assert_eq!(state.days_since_reset(), day);
        assert_eq!(state.reference_price(), 100.0);
    }
    // seventh day: the counter has reached the period
    state.roll_reference(90.0, 6);
    assert_eq!(state.reference_price(), 90.0);
    assert_eq!(state.days_since_reset(), 0);
}

#[cfg(test)]
#[test]
fn unit_is_seed_over_split() {
    let state = opening_state();
    assert_eq!(state.unit(8), 1_250.0);
    assert_eq!(state.unit(10), 1_000.0);
}

#[cfg(test)]
#[test]
fn degenerate_seed_guards_sizing() {
    let mut state = opening_state();
    state.virtual_seed = -50.0;
    state.holdings = 3.0;
    assert_eq!(state.unit(8), 0.0);
    assert_eq!(state.invested_ratio(100.0), 0.0);

    state.virtual_seed = 0.0;
    assert_eq!(state.unit(8), 0.0);
    assert_eq!(state.invested_ratio(100.0), 0.0);
}

#[cfg(test)]
#[test]
fn execute_buy_updates_weighted_average_cost() {
    let mut state = opening_state();
    state.execute_buy(100.0, 1_250.0);
    assert_eq!(state.holdings(), 12.5);
    assert_eq!(state.average_cost(), 100.0);
    assert_eq!(state.cash(), 8_750.0);

    // second lot at a lower price pulls the basis down
    state.execute_buy(80.0, 1_250.0);
    assert_eq!(state.holdings(), 12.5 + 15.625);
    assert_eq!(state.cash(), 7_500.0);
    let expected_basis = 2_500.0 / (12.5 + 15.625);
    assert!((state.average_cost() - expected_basis).abs() < 1e-12);
}

#[cfg(test)]
#[test]
fn execute_sell_caps_quantity_at_holdings() {
    let mut state = opening_state();
    state.execute_buy(100.0, 1_250.0); // 12.5 shares

    // a unit's worth at 110 would be ~11.36 shares, less than held
    let (revenue, pnl) = state.execute_sell(110.0, 1_250.0);
    let quantity = 1_250.0 / 110.0;
    assert!((revenue - quantity * 110.0).abs() < 1e-9);
    assert!((pnl - quantity * 10.0).abs() < 1e-9);
    assert!(state.holdings() > 0.0);

    // selling the rest is bounded by what is held
    let (revenue, _) = state.execute_sell(110.0, 10_000.0);
    assert!(revenue > 0.0);
    assert_eq!(state.holdings(), 0.0);
}

#[cfg(test)]
#[test]
fn execute_sell_snaps_residue_to_zero() {
    let mut state = opening_state();
    state.execute_buy(100.0, 1_250.0);
    // sell a hair less than everything; the residue is not a position
    let unit = (state.holdings() - 1e-6) * 100.0;
    state.execute_sell(100.0, unit);
    assert_eq!(state.holdings(), 0.0);
}

#[cfg(test)]
#[test]
fn execute_sell_keeps_cost_basis_on_partial_exit() {
    let mut state = opening_state();
    state.execute_buy(100.0, 1_250.0);
    let basis = state.average_cost();
    state.execute_sell(120.0, 600.0);
    assert_eq!(state.average_cost(), basis);
}

#[cfg(test)]
#[test]
fn absorb_pnl_is_asymmetric() {
    let mut state = opening_state();
    state.absorb_pnl(100.0, 0.90, 0.20);
    assert_eq!(state.virtual_seed(), 10_090.0);

    state.absorb_pnl(-100.0, 0.90, 0.20);
    assert_eq!(state.virtual_seed(), 10_070.0);
}
