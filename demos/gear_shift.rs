//! # Same tape, different gears
//!
//! Runs one price path three times: with the weekly shifting signal, locked
//! in Slow, and locked in Dynamic. The band width decides how often the
//! strategy trades, and the metrics show what that does to the outcome.
mod utils;

use std::error::Error;

use gbs_rs::prelude::*;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let days = utils::sample_days(360, 11, 100.0);
    let sim = Simulation::new(SimConfig::default())?;

    let fixed = |gear: Gear| {
        days.iter()
            .map(|d| DailyObservation::from((d.date(), d.close(), gear)))
            .collect::<Vec<_>>()
    };

    let variants = [
        ("shifting signal", days.clone()),
        ("locked slow", fixed(Gear::Slow)),
        ("locked dynamic", fixed(Gear::Dynamic)),
    ];

    for (label, series) in variants {
        let ledger = sim.run(&series);
        let metrics = Metrics::from((sim.config(), ledger.as_slice()));
        println!("--- {label} ---");
        println!("{metrics}");
    }

    Ok(())
}
