//! Data provider: raw daily records normalized into clean observations.
//!
//! The engine's input contract is established here: dates strictly
//! increasing and unique, closes positive and finite, and every gear a
//! member of the enumerated set. Downstream of [`normalize`] the engine
//! never sees an invalid record.

use chrono::NaiveDate;

#[cfg(feature = "serde")]
use serde::Deserialize;

use crate::engine::{DailyObservation, Gear};

// { "date": "2024-01-02", "close": 471.33, "gear": "N" }
// { "date": "2024-01-03", "close": 468.79 }

/// One raw record as an ingestion step yields it.
///
/// The gear is optional and unvalidated: weekly signals leave most days
/// blank, and upstream sources occasionally carry symbols outside the
/// alphabet. [`normalize`] resolves both.
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[derive(Debug, Clone)]
pub struct RawDay {
    date: NaiveDate,
    close: f64,
    gear: Option<String>,
}

impl RawDay {
    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the raw closing price.
    pub fn close(&self) -> f64 {
        self.close
    }

    /// Returns the raw gear symbol, if the source carried one.
    pub fn gear(&self) -> Option<&str> {
        self.gear.as_deref()
    }
}

impl From<(NaiveDate, f64, Option<&str>)> for RawDay {
    fn from((date, close, gear): (NaiveDate, f64, Option<&str>)) -> Self {
        Self {
            date,
            close,
            gear: gear.map(str::to_owned),
        }
    }
}

/// Normalizes raw records into engine-ready observations.
///
/// - records with a non-positive or non-finite close are dropped;
/// - records are sorted by date and duplicate dates collapse to the first
///   record seen;
/// - missing gear symbols are forward-filled from the most recent record
///   that carried one;
/// - symbols outside the alphabet (and days before the first signal)
///   resolve to the default gear.
///
/// ### Arguments
/// * `records` - The raw records, in any order.
///
/// ### Returns
/// The normalized observation sequence, possibly empty.
pub fn normalize(records: Vec<RawDay>) -> Vec<DailyObservation> {
    let mut records = records
        .into_iter()
        .filter(|r| r.close.is_finite() && r.close > 0.0)
        .collect::<Vec<_>>();
    records.sort_by_key(|r| r.date);
    records.dedup_by_key(|r| r.date);

    let mut last_symbol: Option<String> = None;
    records
        .into_iter()
        .map(|record| {
            if record.gear.is_some() {
                last_symbol = record.gear.clone();
            }
            let gear = last_symbol
                .as_deref()
                .and_then(Gear::from_symbol)
                .unwrap_or_default();
            DailyObservation::from((record.date, record.close, gear))
        })
        .collect()
}

#[cfg(feature = "serde")]
/// Reads raw records from a JSON file and returns the normalized observations.
pub fn observations_from_file(filepath: std::path::PathBuf) -> crate::errors::Result<Vec<DailyObservation>> {
    use std::{fs::File, io::BufReader};

    let file = File::open(filepath)?;
    let reader = BufReader::new(file);
    let records: Vec<RawDay> = serde_json::from_reader(reader)?;
    Ok(normalize(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn normalize_empty_input() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn normalize_sorts_and_dedups_dates() {
        let records = vec![
            RawDay::from((date(3), 102.0, None)),
            RawDay::from((date(1), 100.0, Some("S"))),
            RawDay::from((date(1), 999.0, None)), // duplicate, first wins
            RawDay::from((date(2), 101.0, None)),
        ];
        let observations = normalize(records);

        assert_eq!(observations.len(), 3);
        assert_eq!(observations[0].date(), date(1));
        assert_eq!(observations[0].close(), 100.0);
        assert_eq!(observations[1].date(), date(2));
        assert_eq!(observations[2].date(), date(3));
    }

    #[test]
    fn normalize_drops_bad_closes() {
        let records = vec![
            RawDay::from((date(1), 100.0, None)),
            RawDay::from((date(2), 0.0, None)),
            RawDay::from((date(3), -5.0, None)),
            RawDay::from((date(4), f64::NAN, None)),
            RawDay::from((date(5), 104.0, None)),
        ];
        let observations = normalize(records);

        assert_eq!(observations.len(), 2);
        assert_eq!(observations[1].close(), 104.0);
    }

    #[test]
    fn normalize_forward_fills_gears() {
        let records = vec![
            RawDay::from((date(1), 100.0, Some("D"))),
            RawDay::from((date(2), 101.0, None)),
            RawDay::from((date(3), 102.0, None)),
            RawDay::from((date(4), 103.0, Some("s"))),
            RawDay::from((date(5), 104.0, None)),
        ];
        let observations = normalize(records);

        let gears = observations.iter().map(|o| o.gear()).collect::<Vec<_>>();
        assert_eq!(gears, vec![Gear::Dynamic, Gear::Dynamic, Gear::Dynamic, Gear::Slow, Gear::Slow]);
    }

    #[test]
    fn normalize_defaults_before_first_signal() {
        let records = vec![
            RawDay::from((date(1), 100.0, None)),
            RawDay::from((date(2), 101.0, Some("D"))),
        ];
        let observations = normalize(records);
        assert_eq!(observations[0].gear(), Gear::Normal);
        assert_eq!(observations[1].gear(), Gear::Dynamic);
    }

    #[test]
    fn normalize_substitutes_unknown_symbols() {
        let records = vec![
            RawDay::from((date(1), 100.0, Some("D"))),
            RawDay::from((date(2), 101.0, Some("banana"))),
            RawDay::from((date(3), 102.0, None)),
        ];
        let observations = normalize(records);

        assert_eq!(observations[0].gear(), Gear::Dynamic);
        // the unknown symbol resolves to the default, and it also occupies
        // the forward-fill slot for the days after it
        assert_eq!(observations[1].gear(), Gear::Normal);
        assert_eq!(observations[2].gear(), Gear::Normal);
    }
}
