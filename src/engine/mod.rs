//! Core simulation engine components.
//!
//! This module provides the fundamental types for a backtest run:
//! - `DailyObservation`: one trading day of input.
//! - `Gear` / `GearProfile`: the regime signal and its band mapping.
//! - `SimConfig`: the immutable parameter set.
//! - `EngineState`: the state threaded through a run.
//! - `LedgerEntry`: the per-day output record.
//! - `Simulation`: the decision loop itself.

mod config;
mod gear;
mod ledger;
mod observation;
mod state;

pub use config::*;
pub use gear::*;
pub use ledger::*;
pub use observation::*;
pub use state::*;

use crate::errors::Result;

/// The gear-band accumulation/distribution engine.
///
/// A simulation owns a validated [`SimConfig`] and nothing else; all run
/// state lives in an [`EngineState`] value threaded through [`step`], so a
/// single `Simulation` can serve any number of independent runs.
///
/// [`step`]: Simulation::step
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
}

impl Simulation {
    /// Creates a new simulation from a configuration.
    ///
    /// ### Arguments
    /// * `config` - The strategy parameters; validated here, once.
    ///
    /// ### Returns
    /// The simulation, or the first validation error in the config.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration the simulation runs with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Runs the full simulation over an observation sequence.
    ///
    /// The sequence is consumed once, in order; each day's decision folds
    /// the previous day's state forward, so the run is inherently serial.
    /// An empty input yields an empty ledger.
    ///
    /// ### Arguments
    /// * `days` - The normalized daily observations, dates strictly increasing.
    ///
    /// ### Returns
    /// One [`LedgerEntry`] per input day, in the same order.
    ///
    /// ### Example
    /// ```rust
    /// use gbs_rs::prelude::*;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    /// let days = vec![
    ///     DailyObservation::from((start, 100.0, Gear::Normal)),
    ///     DailyObservation::from((start + chrono::Days::new(1), 90.0, Gear::Normal)),
    /// ];
    ///
    /// let sim = Simulation::new(SimConfig::default()).unwrap();
    /// let ledger = sim.run(&days);
    ///
    /// assert_eq!(ledger.len(), 2);
    /// assert_eq!(ledger[1].action(), Action::Buy);
    /// ```
    pub fn run(&self, days: &[DailyObservation]) -> Vec<LedgerEntry> {
        let Some(first) = days.first() else {
            return Vec::new();
        };

        let mut state = EngineState::opening(&self.config, first.close());
        let mut ledger = Vec::with_capacity(days.len());
        for day in days {
            let (next_state, entry) = self.step(state, day);
            state = next_state;
            ledger.push(entry);
        }
        ledger
    }

    /// Advances the simulation by one trading day.
    ///
    /// The day unfolds in a fixed order: the reference-price scheduler runs
    /// first, so the day's thresholds are always derived from the reference
    /// price as of the start of the day; then at most one trade executes.
    /// The sell rule is only evaluated when the buy trigger (price below the
    /// band and invested ratio under the cap) did not hold, so a buy skipped
    /// for lack of cash stays a Hold rather than falling through to the sell
    /// rule.
    ///
    /// ### Arguments
    /// * `state` - The state as of the end of the previous day.
    /// * `day` - The day's observation.
    ///
    /// ### Returns
    /// The state after the day and the day's ledger entry.
    pub fn step(&self, state: EngineState, day: &DailyObservation) -> (EngineState, LedgerEntry) {
        let mut state = state;
        let close = day.close();

        state.roll_reference(close, self.config.reset_period());

        let unit = state.unit(self.config.split_count());
        let (buy_line, sell_line) = self.config.gears().thresholds(day.gear(), state.reference_price());

        let mut action = Action::Hold;
        let mut trade_value = 0.0;
        let mut realized_pnl = 0.0;

        if close <= buy_line && state.invested_ratio(close) < self.config.invested_cap() {
            // a unit that cannot be funded is skipped silently
            if unit > 0.0 && state.cash() >= unit {
                state.execute_buy(close, unit);
                action = Action::Buy;
                trade_value = unit;
            }
        } else if close >= sell_line && state.holdings() > 0.0 && unit > 0.0 {
            let (revenue, pnl) = state.execute_sell(close, unit);
            state.absorb_pnl(pnl, self.config.profit_retention(), self.config.loss_retention());
            action = Action::Sell;
            trade_value = revenue;
            realized_pnl = pnl;
        }

        let entry = LedgerEntry::new(
            day.date(),
            close,
            day.gear(),
            state.reference_price(),
            action,
            trade_value,
            realized_pnl,
            state.holdings(),
            state.equity(close),
            state.virtual_seed(),
        );
        (state, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
    }

    fn series(closes: &[f64], gear: Gear) -> Vec<DailyObservation> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| DailyObservation::from((start_date() + Days::new(i as u64), *close, gear)))
            .collect()
    }

    fn default_sim() -> Simulation {
        Simulation::new(SimConfig::default()).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_ledger() {
        let sim = default_sim();
        assert!(sim.run(&[]).is_empty());
    }

    #[test]
    fn ledger_matches_input_one_to_one() {
        let closes = [100.0, 98.0, 96.0, 101.0, 99.0, 97.0, 103.0, 95.0];
        let days = series(&closes, Gear::Normal);
        let sim = default_sim();
        let ledger = sim.run(&days);

        assert_eq!(ledger.len(), days.len());
        for (entry, day) in ledger.iter().zip(&days) {
            assert_eq!(entry.date(), day.date());
            assert_eq!(entry.close(), day.close());
            assert_eq!(entry.gear(), day.gear());
        }
    }

    #[test]
    fn scenario_flat_market_only_holds() {
        let days = series(&[100.0; 20], Gear::Normal);
        let sim = default_sim();
        let ledger = sim.run(&days);

        assert_eq!(ledger.len(), 20);
        for entry in &ledger {
            assert_eq!(entry.action(), Action::Hold);
            assert_eq!(entry.reference_price(), 100.0);
            assert_eq!(entry.total_equity(), 10_000.0);
            assert_eq!(entry.virtual_seed(), 10_000.0);
            assert_eq!(entry.holdings(), 0.0);
            assert_eq!(entry.realized_pnl(), 0.0);
        }
    }

    #[test]
    fn scenario_first_dip_buys_one_unit() {
        // 10% step down on day 1, flat afterwards
        let days = series(&[100.0, 90.0, 90.0], Gear::Normal);
        let sim = default_sim();
        let ledger = sim.run(&days);

        assert_eq!(ledger[0].action(), Action::Hold);

        // day 1: buy line is 100 * 0.95 = 95, one unit is 10000 / 8 = 1250
        let entry = &ledger[1];
        assert_eq!(entry.action(), Action::Buy);
        assert_eq!(entry.reference_price(), 100.0);
        assert_eq!(entry.trade_value(), 1_250.0);
        assert_eq!(entry.holdings(), 1_250.0 / 90.0);
        assert_eq!(entry.total_equity(), 8_750.0 + (1_250.0 / 90.0) * 90.0);
        // the opening lot's basis is its own price
        let (state, _) = sim.step(
            EngineState::opening(sim.config(), 100.0),
            &DailyObservation::from((start_date(), 100.0, Gear::Normal)),
        );
        let (state, _) = sim.step(state, &days[1]);
        assert_eq!(state.average_cost(), 90.0);
        assert_eq!(state.cash(), 8_750.0);
    }

    #[test]
    fn gear_selects_the_band_width() {
        // -7% sits inside Dynamic's 10% band but below Normal's 5% line
        let normal = series(&[100.0, 93.0], Gear::Normal);
        let dynamic = series(&[100.0, 93.0], Gear::Dynamic);
        let sim = default_sim();

        assert_eq!(sim.run(&normal)[1].action(), Action::Buy);
        assert_eq!(sim.run(&dynamic)[1].action(), Action::Hold);
    }

    #[test]
    fn unknown_symbol_trades_like_normal() {
        // the provider's fallback: an out-of-alphabet symbol becomes the default gear
        let gear = Gear::from_symbol("turbo").unwrap_or_default();
        assert_eq!(gear, Gear::Normal);

        let days = series(&[100.0, 92.0], gear);
        let ledger = default_sim().run(&days);
        assert_eq!(ledger[1].action(), Action::Buy);
    }

    #[test]
    fn profitable_sell_compounds_at_profit_retention() {
        // buy 15.625 shares at 80, sell one unit's worth (10 shares) at 125
        let days = series(&[100.0, 80.0, 125.0], Gear::Normal);
        let sim = default_sim();
        let ledger = sim.run(&days);

        let entry = &ledger[2];
        assert_eq!(entry.action(), Action::Sell);
        assert_eq!(entry.trade_value(), 1_250.0);
        assert_eq!(entry.realized_pnl(), (125.0 - 80.0) * 10.0);
        assert_eq!(entry.virtual_seed(), 10_000.0 + 450.0 * 0.90);
        assert_eq!(entry.holdings(), 15.625 - 10.0);
        assert_eq!(entry.total_equity(), 10_000.0 + 5.625 * 125.0);
    }

    #[test]
    fn losing_sell_compounds_at_loss_retention() {
        // hand-built state: basis 100, anchor 95, so 99.75 trips the sell
        // line while still sitting under the basis
        let sim = default_sim();
        let mut state = EngineState::opening(sim.config(), 95.0);
        state.execute_buy(100.0, 1_250.0);
        let seed_before = state.virtual_seed();

        let day = DailyObservation::from((start_date(), 99.75, Gear::Normal));
        let (state, entry) = sim.step(state, &day);

        assert_eq!(entry.action(), Action::Sell);
        let pnl = (99.75 - 100.0) * 12.5;
        assert_eq!(entry.realized_pnl(), pnl);
        assert_eq!(state.virtual_seed(), seed_before + pnl * 0.20);
        assert_eq!(state.holdings(), 0.0);
    }

    #[test]
    fn insufficient_cash_is_a_silent_hold() {
        // most of the cash is already deployed; the trigger fires but the
        // unit cannot be funded
        let sim = default_sim();
        let mut state = EngineState::opening(sim.config(), 100.0);
        state.execute_buy(100.0, 9_000.0);
        assert!(state.cash() < 1_250.0);

        let day = DailyObservation::from((start_date(), 90.0, Gear::Normal));
        let before = state.clone();
        let (state, entry) = sim.step(state, &day);

        assert_eq!(entry.action(), Action::Hold);
        assert_eq!(entry.trade_value(), 0.0);
        assert_eq!(state.cash(), before.cash());
        assert_eq!(state.holdings(), before.holdings());
        assert_eq!(state.virtual_seed(), before.virtual_seed());
    }

    #[test]
    fn invested_cap_blocks_further_buying() {
        // holdings marked at the close put the ratio above the 0.90 cap
        // even though cash could fund the unit
        let sim = default_sim();
        let mut state = EngineState::opening(sim.config(), 100.0);
        state.execute_buy(50.0, 5_000.0); // 100 shares, 5000 cash left
        assert!(state.invested_ratio(95.0) >= 0.90);

        let day = DailyObservation::from((start_date(), 95.0, Gear::Normal));
        let (state, entry) = sim.step(state, &day);

        assert_eq!(entry.action(), Action::Hold);
        assert_eq!(state.holdings(), 100.0);
    }

    #[test]
    fn degenerate_seed_holds_without_corrupting_state() {
        let sim = default_sim();
        let mut state = EngineState::opening(sim.config(), 100.0);
        state.execute_buy(100.0, 1_250.0);
        state.absorb_pnl(-(state.virtual_seed() + 10.0) / 0.20, 0.90, 0.20);
        assert!(state.virtual_seed() <= 0.0);

        // both a dip and a pop are holds while the seed is degenerate
        for close in [80.0, 120.0] {
            let day = DailyObservation::from((start_date(), close, Gear::Normal));
            let before = state.clone();
            let (after, entry) = sim.step(before.clone(), &day);
            assert_eq!(entry.action(), Action::Hold);
            assert_eq!(after.cash(), before.cash());
            assert_eq!(after.holdings(), before.holdings());
            state = after;
        }
    }

    #[test]
    fn reference_resets_on_schedule_to_that_close() {
        let closes = [100.0, 101.0, 102.0, 103.0, 104.0, 105.5, 104.5, 103.5, 102.5];
        let days = series(&closes, Gear::Dynamic); // wide band, no trades in the way
        let sim = Simulation::new(SimConfig::default().with_reset_period(2)).unwrap();
        let ledger = sim.run(&days);

        // the counter starts at zero, so the first reset lands on day 2 and
        // then every period-plus-one days
        let reset_days = [2, 5, 8];
        let mut reference = 100.0;
        for (i, entry) in ledger.iter().enumerate() {
            if reset_days.contains(&i) {
                reference = closes[i];
            }
            assert_eq!(entry.reference_price(), reference, "day {i}");
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let closes = [100.0, 94.0, 91.0, 97.0, 106.0, 99.0, 93.0, 104.0, 108.0, 90.0];
        let days = series(&closes, Gear::Normal);
        let sim = default_sim();

        assert_eq!(sim.run(&days), sim.run(&days));
    }

    #[test]
    fn sell_is_capped_at_one_unit_per_day() {
        // the position is worth more than a unit, so the pop only sheds
        // a unit's worth and leaves the rest
        let days = series(&[100.0, 94.0, 110.0], Gear::Normal);
        let sim = default_sim();
        let ledger = sim.run(&days);

        let bought = 1_250.0 / 94.0;
        let sold = 1_250.0 / 110.0;
        assert!(sold < bought);
        assert_eq!(ledger[2].action(), Action::Sell);
        assert_relative_eq!(ledger[2].holdings(), bought - sold, epsilon = 1e-12);
        assert_relative_eq!(ledger[2].trade_value(), 1_250.0, epsilon = 1e-9);
    }

    proptest! {
        #[test]
        fn invariants_hold_on_arbitrary_series(closes in proptest::collection::vec(10.0f64..500.0, 0..80)) {
            let days = closes
                .iter()
                .enumerate()
                .map(|(i, close)| {
                    let gear = match i % 3 {
                        0 => Gear::Slow,
                        1 => Gear::Normal,
                        _ => Gear::Dynamic,
                    };
                    DailyObservation::from((start_date() + Days::new(i as u64), *close, gear))
                })
                .collect::<Vec<_>>();

            let sim = default_sim();
            let ledger = sim.run(&days);

            prop_assert_eq!(ledger.len(), days.len());

            let mut prev_holdings = 0.0f64;
            let mut prev_seed = 10_000.0f64;
            for (entry, day) in ledger.iter().zip(&days) {
                prop_assert_eq!(entry.date(), day.date());

                // no margin, no shorting
                prop_assert!(entry.holdings() >= 0.0);
                let cash = entry.total_equity() - entry.holdings() * entry.close();
                prop_assert!(cash >= -1e-9);

                if entry.action() == Action::Sell {
                    let sold = prev_holdings - entry.holdings();
                    let unit = prev_seed / 8.0;
                    // never more than held, never more than a unit's worth
                    prop_assert!(sold <= prev_holdings + 1e-9);
                    prop_assert!(entry.trade_value() <= unit + 1e-6);
                } else {
                    prop_assert_eq!(entry.realized_pnl(), 0.0);
                }

                prev_holdings = entry.holdings();
                prev_seed = entry.virtual_seed();
            }
        }
    }
}
