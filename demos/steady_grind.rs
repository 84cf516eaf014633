//! # Grinding an oscillating market
//!
//! Runs the gear-band strategy over a synthetic oscillating series: dips
//! below the band accumulate a unit at a time, pops above it hand units
//! back, and the asymmetric compounding slowly grows the sizing base.
mod utils;

use std::error::Error;

use gbs_rs::prelude::*;

fn main() -> std::result::Result<(), Box<dyn Error>> {
    let days = utils::sample_days(360, 7, 100.0);
    let initial_cash = 10_000.0;

    let config = SimConfig::default().with_initial_cash(initial_cash);
    let sim = Simulation::new(config)?;
    let ledger = sim.run(&days);

    let trades = ledger.iter().filter(|e| e.action().is_trade()).count();
    println!("trades {trades} / {}", ledger.len());

    let first_price = days.first().unwrap().close();
    let last = ledger.last().unwrap();

    let performance = initial_cash.change(last.total_equity());
    println!("performance {:.2} ({:.2}%)", last.total_equity(), performance * 100.0);

    let buy_and_hold = (initial_cash / first_price) * last.close();
    let buy_and_hold_perf = first_price.change(last.close());
    println!("buy and hold {buy_and_hold:.2} ({:.2}%)", buy_and_hold_perf * 100.0);

    #[cfg(feature = "metrics")]
    {
        let metrics = Metrics::from((sim.config(), ledger.as_slice()));
        println!("{metrics}");
    }

    #[cfg(feature = "draws")]
    {
        let options = DrawOptions::default()
            .title("Gear-band run")
            .draw_output(DrawOutput::Svg("gbs.svg".to_owned()))
            .show_equity(true)
            .show_seed(true);
        let draw = Draw::from(ledger.as_slice()).with_options(options);
        draw.plot()?;
    }

    Ok(())
}
