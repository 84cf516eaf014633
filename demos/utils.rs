use chrono::{Days, NaiveDate};
use gbs_rs::prelude::*;

/// Generates a deterministic daily series with a weekly gear signal.
///
/// The closes oscillate around a slowly rising base so both band edges get
/// hit; the gear symbol only appears every fifth day (cycling S, N, D) and
/// the provider forward-fills the gaps, like a weekly signal column would.
pub fn sample_days(count: usize, seed: i32, base_price: f64) -> Vec<DailyObservation> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let symbols = ["S", "N", "D"];

    let records = (0..count)
        .map(|i| {
            let base = base_price + 0.05 * (i as f64);
            let wave = base * 0.08 * ((i as f64) * 0.25 + (seed as f64)).sin();
            let close = base + wave;
            let gear = if i % 5 == 0 { Some(symbols[(i / 5) % 3]) } else { None };
            RawDay::from((start + Days::new(i as u64), close, gear))
        })
        .collect::<Vec<_>>();

    normalize(records)
}
