//! # GBS: Gear-Band Strategy backtester
//!
//! **GBS** simulates a rule-based, gear-switching accumulation/distribution
//! strategy over a daily closing-price series and reports the resulting
//! equity curve, drawdown, and trade history. Around a periodically reset
//! *reference price*, a discrete *gear* signal selects how wide the trading
//! band is; dips below the band accumulate, pops above it distribute, and a
//! compounding *virtual seed* sizes every trade.
//!
//! ## Core Components
//! | Component   | Description                                                                       |
//! |-------------|-----------------------------------------------------------------------------------|
//! | **`DailyObservation`** | One trading day: date, closing price, and gear signal.                 |
//! | **`Gear`** / **`GearProfile`** | The regime signal and its mapping to symmetric band widths.    |
//! | **`SimConfig`** | All strategy parameters as one immutable, validated value.                    |
//! | **`EngineState`** | Cash, holdings, cost basis, virtual seed, and reference-price counter.      |
//! | **`Simulation`** | The engine: a pure per-day step folded over the observation sequence.        |
//! | **`LedgerEntry`** | Post-trade snapshot emitted once per input day.                             |
//! | **`Metrics`** | Reporting layer: total return, max drawdown, win rate, benchmark.               |
//!
//! ## The trading rules
//! Every day, in order:
//! 1. The reference price resets to the day's close once the reset period
//!    has elapsed (6 trading days by default).
//! 2. One *unit* is sized as `virtual seed / split count` (8 by default).
//! 3. **Buy** one unit when the close falls below the gear's lower band and
//!    the invested ratio is under the configured cap; skip silently when
//!    cash cannot fund a full unit.
//! 4. Otherwise **sell** at most one unit's worth when the close rises above
//!    the upper band.
//! 5. Realized profits feed 90% back into the virtual seed; realized losses
//!    only drain it at 20%. That asymmetry is the strategy's defining
//!    property: winners compound aggressively, losers erode the sizing base
//!    slowly.
//!
//! ## Getting Started
//! ```rust
//! use gbs_rs::prelude::*;
//! use chrono::NaiveDate;
//!
//! fn main() {
//!     let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
//!     // A steady slide: 1.5 per day off a 100.0 start.
//!     let days = (0..30)
//!         .map(|i| {
//!             let date = start + chrono::Days::new(i);
//!             let close = 100.0 - (i as f64) * 1.5;
//!             DailyObservation::from((date, close, Gear::Normal))
//!         })
//!         .collect::<Vec<_>>();
//!
//!     let sim = Simulation::new(SimConfig::default()).unwrap();
//!     let ledger = sim.run(&days);
//!
//!     assert_eq!(ledger.len(), days.len());
//!     assert!(ledger.iter().any(|entry| entry.action() == Action::Buy));
//! }
//! ```
//!
//! ## Features
//! | Feature     | Description                                                                       |
//! |-------------|-----------------------------------------------------------------------------------|
//! | **`metrics`** | Summary statistics computed from the ledger (return, drawdown, win rate).       |
//! | **`serde`**   | Serde derives on the data types plus JSON loading in the data provider.         |
//! | **`draws`** *(default)* | Price/reference/equity charts with a lot of backends: png, svg, etc.  |
//!
//! ## Error Handling
//! Configuration and observation construction are validated up front with
//! custom error types; the simulation itself never fails at run time. Empty
//! input yields an empty ledger, unknown gear symbols resolve to the default
//! gear, and degenerate sizing (a non-positive virtual seed) turns the day
//! into a Hold instead of corrupting state.
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Core simulation engine: observations, gears, configuration, state, ledger.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Data provider: raw daily records normalized into clean observations.
pub mod provider;

/// Performance metrics computed from a finished ledger.
#[cfg(feature = "metrics")]
pub mod metrics;

/// Draw graphics with a lot of backends: png, svg, etc.
#[cfg(feature = "draws")]
pub mod draws;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::provider::*;

    #[cfg(feature = "metrics")]
    pub use crate::metrics::*;

    #[cfg(feature = "draws")]
    pub use crate::draws::*;
}

use std::ops::{Add, Div, Mul, Sub};

/// Trait for band arithmetic on prices.
///
/// Band widths are plain fractions (0.05 for a 5% band), so this trait
/// provides the add/subtract-a-fraction operations the engine computes its
/// thresholds with.
pub trait BandCalculus<Rhs = Self> {
    /// Adds a fraction of the value to itself.
    ///
    /// ### Arguments
    /// * `rhs` - The fraction to add (e.g., 0.05 for 5%).
    ///
    /// ### Returns
    /// The value increased by the given fraction.
    fn addfrac(self, rhs: Rhs) -> Self;

    /// Subtracts a fraction of the value from itself.
    ///
    /// ### Arguments
    /// * `rhs` - The fraction to subtract (e.g., 0.05 for 5%).
    ///
    /// ### Returns
    /// The value decreased by the given fraction.
    fn subfrac(self, rhs: Rhs) -> Self;

    /// Calculates the fractional change between two values.
    ///
    /// ### Arguments
    /// * `new` - The new value to compare with.
    ///
    /// ### Returns
    /// The fractional change from the original value to the new value.
    fn change(self, new: Self) -> Self;
}

impl BandCalculus for f64 {
    fn addfrac(self, frac: Self) -> Self {
        self.add(self.mul(frac))
    }

    fn subfrac(self, frac: Self) -> Self {
        self.sub(self.mul(frac))
    }

    fn change(self, new: Self) -> Self {
        new.sub(self).div(self)
    }
}

#[cfg(test)]
mod band {
    use super::*;

    #[test]
    fn add() {
        assert_eq!(105.0, 100.0.addfrac(0.05))
    }

    #[test]
    fn sub() {
        assert_eq!(95.0, 100.0.subfrac(0.05))
    }

    #[test]
    fn change() {
        assert_eq!(0.10, 100.0.change(110.0))
    }
}
