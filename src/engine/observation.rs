use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::Gear;
use crate::errors::{Error, Result};

/// A single trading day as the engine consumes it.
///
/// Observations come out of the data provider already normalized: dates are
/// strictly increasing and unique, closes are positive finite numbers, and
/// the gear is a member of the enumerated set.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyObservation {
    date: NaiveDate,
    close: f64,
    gear: Gear,
}

impl DailyObservation {
    /// Returns the calendar date of the observation.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the gear signal in effect for the day.
    pub fn gear(&self) -> Gear {
        self.gear
    }
}

impl From<(NaiveDate, f64, Gear)> for DailyObservation {
    fn from((date, close, gear): (NaiveDate, f64, Gear)) -> Self {
        Self { date, close, gear }
    }
}

/// Builder for [`DailyObservation`] with validation of the close price.
#[derive(Debug, Default)]
pub struct ObservationBuilder {
    date: Option<NaiveDate>,
    close: Option<f64>,
    gear: Option<Gear>,
}

impl ObservationBuilder {
    /// Creates an empty builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Sets the calendar date.
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the closing price.
    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    /// Sets the gear signal. Defaults to [`Gear::Normal`] when unset.
    pub fn gear(mut self, gear: Gear) -> Self {
        self.gear = Some(gear);
        self
    }

    /// Builds the observation.
    ///
    /// ### Returns
    /// The observation, or an error when the date is missing or the close is
    /// not a positive finite number.
    pub fn build(self) -> Result<DailyObservation> {
        let date = self.date.ok_or(Error::MissingField("date"))?;
        let close = self.close.ok_or(Error::MissingField("close"))?;
        if close <= 0.0 || !close.is_finite() {
            return Err(Error::ClosePrice(close));
        }

        Ok(DailyObservation {
            date,
            close,
            gear: self.gear.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[test]
fn build_valid_observation() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let obs = ObservationBuilder::builder()
        .date(date)
        .close(101.5)
        .gear(Gear::Dynamic)
        .build()
        .unwrap();

    assert_eq!(obs.date(), date);
    assert_eq!(obs.close(), 101.5);
    assert_eq!(obs.gear(), Gear::Dynamic);
}

#[cfg(test)]
#[test]
fn build_defaults_gear_to_normal() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let obs = ObservationBuilder::builder().date(date).close(50.0).build().unwrap();
    assert_eq!(obs.gear(), Gear::Normal);
}

#[cfg(test)]
#[test]
fn build_rejects_bad_close() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();

    let result = ObservationBuilder::builder().date(date).close(0.0).build();
    assert!(matches!(result, Err(Error::ClosePrice(_))));

    let result = ObservationBuilder::builder().date(date).close(-3.0).build();
    assert!(matches!(result, Err(Error::ClosePrice(_))));

    let result = ObservationBuilder::builder().date(date).close(f64::NAN).build();
    assert!(matches!(result, Err(Error::ClosePrice(_))));
}

#[cfg(test)]
#[test]
fn build_rejects_missing_fields() {
    let result = ObservationBuilder::builder().close(10.0).build();
    assert!(matches!(result, Err(Error::MissingField("date"))));

    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let result = ObservationBuilder::builder().date(date).build();
    assert!(matches!(result, Err(Error::MissingField("close"))));
}
