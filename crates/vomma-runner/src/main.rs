//! # Vomma Simulation Runner
//!
//! Console harness driving the market-making engine through a stepped
//! synthetic market.
//!
//! ## Description
//! Each step the harness quotes every active contract, lets a simulated
//! counterparty hit or lift a quote, evolves the underlyings along a seeded
//! stochastic path, ticks the option expiry clocks, and hands the new state
//! back to the engine. A JSON summary line is printed at the end of the run.

mod paths;

use std::sync::Arc;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, Level};

use vomma_engine::MarketMaker;
use vomma_models::{ModelError, OptionContract, OptionKind, Underlying};

use paths::PathGenerator;

#[derive(Parser, Debug)]
#[command(name = "vomma-runner", about = "Synthetic options market-making simulation")]
struct Args {
    /// Number of simulation steps to run.
    #[arg(long, default_value_t = 10)]
    steps: u32,

    /// Seed for the path generator and the simulated counterparty.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Per-step probability that a counterparty trades against a quote.
    #[arg(long, default_value_t = 0.35)]
    hit_rate: f64,
}

/// Two underlyings with a call/put pair bracketing each spot.
fn build_market() -> Result<(Vec<Arc<Underlying>>, Vec<Arc<OptionContract>>), ModelError> {
    let alpha = Arc::new(Underlying::new("ALPHA", 1, 150.0, 0.5, 2.0, 0.1, 0.5, 2.0)?);
    let beta = Arc::new(Underlying::new("BETA", 2, 200.0, 0.5, 3.0, 0.2, 0.5, 3.0)?);

    let options = vec![
        Arc::new(OptionContract::on_underlying(&alpha, 1001, OptionKind::Call, 5, 152)),
        Arc::new(OptionContract::on_underlying(&alpha, 1002, OptionKind::Put, 5, 148)),
        Arc::new(OptionContract::on_underlying(&beta, 1003, OptionKind::Call, 3, 205)),
        Arc::new(OptionContract::on_underlying(&beta, 1004, OptionKind::Put, 3, 195)),
    ];

    Ok((vec![alpha, beta], options))
}

fn log_positions(maker: &MarketMaker) {
    for (option_id, contracts) in maker.position().options() {
        if *contracts != 0 {
            info!(option_id, contracts, "open option line");
        }
    }
    for (underlying_id, shares) in maker.position().underlyings() {
        if shares.abs() > 1e-6 {
            info!(underlying_id, shares, "underlying shares");
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();
    info!(steps = args.steps, seed = args.seed, "starting simulation");

    let (underlyings, options) = build_market()?;
    for u in &underlyings {
        info!(name = %u.name, id = u.id, valuation = u.valuation, "underlying");
    }
    for o in &options {
        info!(contract = %o, "active option");
    }

    let mut maker = MarketMaker::new(underlyings, options);
    maker.register_trade_callback(Box::new(|underlying_id, quantity| {
        info!(underlying_id, quantity, "hedge order routed");
        Ok(())
    }));

    let mut generator = PathGenerator::new(args.seed);
    let mut flow_rng = StdRng::seed_from_u64(args.seed.wrapping_add(1));

    for step in 1..=args.steps {
        info!(step, "quoting cycle");
        let actives: Vec<Arc<OptionContract>> = maker.active_options().to_vec();
        for option in &actives {
            let quote = maker.make_market(option);
            info!(
                contract = %option,
                bid = quote.bid,
                ask = quote.ask,
                spread = quote.spread(),
                "quote"
            );
        }

        // Simulated counterparty: occasionally trades against a fresh quote.
        if !actives.is_empty() && flow_rng.gen::<f64>() < args.hit_rate {
            let option = &actives[flow_rng.gen_range(0..actives.len())];
            let quote = maker.make_market(option);
            if flow_rng.gen::<f64>() < 0.5 {
                info!(contract = %option, price = quote.bid, "counterparty hits our bid");
                maker.on_bid_hit(option, quote.bid);
            } else {
                info!(contract = %option, price = quote.ask, "counterparty lifts our offer");
                maker.on_offer_hit(option, quote.ask);
            }
        }

        let new_underlyings = generator.advance(maker.underlyings());
        for (old, new) in maker.underlyings().iter().zip(&new_underlyings) {
            info!(
                name = %new.name,
                from = old.valuation,
                to = new.valuation,
                change = new.valuation - old.valuation,
                "market moves"
            );
        }
        let new_options = paths::tick_options(maker.active_options());
        maker.on_step_advance(new_underlyings, new_options);

        log_positions(&maker);
    }

    let portfolio_value = maker.portfolio_value();
    info!(
        realized_pnl = maker.realized_pnl(),
        portfolio_value,
        safe_mode = maker.is_safe_mode(),
        cached_valuations = maker.cache_entries(),
        "simulation complete"
    );
    log_positions(&maker);

    let summary = serde_json::json!({
        "steps": args.steps,
        "seed": args.seed,
        "realized_pnl": maker.realized_pnl(),
        "portfolio_value": portfolio_value,
        "safe_mode": maker.is_safe_mode(),
        "open_option_lines": maker.position().open_option_count(),
    });
    println!("{summary}");

    Ok(())
}
