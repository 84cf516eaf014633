#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::GearProfile;
use crate::errors::{Error, Result};

/// All strategy parameters as one immutable value.
///
/// A config is validated once when it enters [`Simulation::new`] and never
/// mutated afterwards, so several simulations with different
/// parameterizations can run side by side without interference.
///
/// Defaults: 10 000 initial cash, stock gear bands (3% / 5% / 10%), 8-way
/// split, 6-day reference reset, 0.90 invested-ratio cap, 90% profit
/// retention, 20% loss retention.
///
/// [`Simulation::new`]: crate::engine::Simulation::new
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    initial_cash: f64,
    gears: GearProfile,
    split_count: u32,
    reset_period: u32,
    invested_cap: f64,
    profit_retention: f64,
    loss_retention: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_cash: 10_000.0,
            gears: GearProfile::default(),
            split_count: 8,
            reset_period: 6,
            invested_cap: 0.90,
            profit_retention: 0.90,
            loss_retention: 0.20,
        }
    }
}

impl SimConfig {
    /// Sets the starting cash, which also seeds the virtual seed.
    pub fn with_initial_cash(mut self, cash: f64) -> Self {
        self.initial_cash = cash;
        self
    }

    /// Sets the gear-to-band mapping.
    pub fn with_gears(mut self, gears: GearProfile) -> Self {
        self.gears = gears;
        self
    }

    /// Sets how many units the virtual seed is split into.
    pub fn with_split_count(mut self, count: u32) -> Self {
        self.split_count = count;
        self
    }

    /// Sets the reference-price reset period in trading days.
    pub fn with_reset_period(mut self, days: u32) -> Self {
        self.reset_period = days;
        self
    }

    /// Sets the invested-ratio ceiling above which buying stops.
    pub fn with_invested_cap(mut self, cap: f64) -> Self {
        self.invested_cap = cap;
        self
    }

    /// Sets the fraction of a realized profit fed back into the virtual seed.
    pub fn with_profit_retention(mut self, fraction: f64) -> Self {
        self.profit_retention = fraction;
        self
    }

    /// Sets the fraction of a realized loss absorbed into the virtual seed.
    pub fn with_loss_retention(mut self, fraction: f64) -> Self {
        self.loss_retention = fraction;
        self
    }

    /// Returns the starting cash.
    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    /// Returns the gear-to-band mapping.
    pub fn gears(&self) -> &GearProfile {
        &self.gears
    }

    /// Returns the split count.
    pub fn split_count(&self) -> u32 {
        self.split_count
    }

    /// Returns the reset period in trading days.
    pub fn reset_period(&self) -> u32 {
        self.reset_period
    }

    /// Returns the invested-ratio ceiling.
    pub fn invested_cap(&self) -> f64 {
        self.invested_cap
    }

    /// Returns the profit retention fraction.
    pub fn profit_retention(&self) -> f64 {
        self.profit_retention
    }

    /// Returns the loss retention fraction.
    pub fn loss_retention(&self) -> f64 {
        self.loss_retention
    }

    /// Checks every parameter once, before a simulation is built from the config.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.initial_cash <= 0.0 || !self.initial_cash.is_finite() {
            return Err(Error::NegZeroCash(self.initial_cash));
        }
        if self.split_count == 0 {
            return Err(Error::ZeroSplitCount);
        }
        if self.reset_period == 0 {
            return Err(Error::ZeroResetPeriod);
        }
        if !self.invested_cap.is_finite() || self.invested_cap <= 0.0 || self.invested_cap > 1.0 {
            return Err(Error::InvestedCap(self.invested_cap));
        }
        for fraction in [self.profit_retention, self.loss_retention] {
            if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
                return Err(Error::Retention(fraction));
            }
        }
        self.gears.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Gear;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn builder_setters() {
        let config = SimConfig::default()
            .with_initial_cash(25_000.0)
            .with_split_count(10)
            .with_reset_period(5)
            .with_invested_cap(0.95)
            .with_profit_retention(1.0)
            .with_loss_retention(0.0)
            .with_gears(GearProfile::default().with_band(Gear::Slow, 0.02));

        assert_eq!(config.initial_cash(), 25_000.0);
        assert_eq!(config.split_count(), 10);
        assert_eq!(config.reset_period(), 5);
        assert_eq!(config.invested_cap(), 0.95);
        assert_eq!(config.profit_retention(), 1.0);
        assert_eq!(config.loss_retention(), 0.0);
        assert_eq!(config.gears().band(Gear::Slow), 0.02);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_cash() {
        let result = SimConfig::default().with_initial_cash(0.0).validate();
        assert!(matches!(result, Err(Error::NegZeroCash(_))));

        let result = SimConfig::default().with_initial_cash(-100.0).validate();
        assert!(matches!(result, Err(Error::NegZeroCash(_))));
    }

    #[test]
    fn validate_rejects_zero_split_and_period() {
        let result = SimConfig::default().with_split_count(0).validate();
        assert!(matches!(result, Err(Error::ZeroSplitCount)));

        let result = SimConfig::default().with_reset_period(0).validate();
        assert!(matches!(result, Err(Error::ZeroResetPeriod)));
    }

    #[test]
    fn validate_rejects_bad_cap_and_retention() {
        let result = SimConfig::default().with_invested_cap(0.0).validate();
        assert!(matches!(result, Err(Error::InvestedCap(_))));

        let result = SimConfig::default().with_invested_cap(1.2).validate();
        assert!(matches!(result, Err(Error::InvestedCap(_))));

        let result = SimConfig::default().with_profit_retention(1.5).validate();
        assert!(matches!(result, Err(Error::Retention(_))));

        let result = SimConfig::default().with_loss_retention(-0.2).validate();
        assert!(matches!(result, Err(Error::Retention(_))));
    }
}
