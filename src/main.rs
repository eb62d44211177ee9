use anyhow::{anyhow, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use core_types::{AlgoKind, Offset, OrderSide, TickData};
use engine::AlgoEngine;
use gateway::SimGateway;
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// The main entry point for the algo execution application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            for kind in AlgoEngine::<SimGateway>::list_policies() {
                println!("{kind}");
            }
            Ok(())
        }
        Commands::Run(args) => run_demo(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A modular execution-algorithm engine with a paper-trading demo venue.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available slicing policies.
    List,
    /// Run one algo instance against the simulated venue.
    Run(RunArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// The slicing policy to run (e.g. "twap", "sniper").
    #[arg(long)]
    policy: String,

    /// Parent order side, "buy" or "sell".
    #[arg(long, default_value = "buy")]
    side: String,

    /// Parent limit price (or trigger/center price, policy dependent).
    #[arg(long, default_value = "100")]
    price: Decimal,

    /// Total target quantity.
    #[arg(long, default_value = "50")]
    volume: Decimal,

    /// Policy setting as a JSON object; defaults per policy when omitted.
    #[arg(long)]
    setting: Option<String>,

    /// Number of simulated market ticks to run for.
    #[arg(long, default_value_t = 300)]
    ticks: u64,
}

// ==============================================================================
// Demo Venue Loop
// ==============================================================================

const ACTIVE_SYMBOL: &str = "DEMO";
const PASSIVE_SYMBOL: &str = "DEMO-FAR";

async fn run_demo(args: RunArgs) -> anyhow::Result<()> {
    let kind = parse_kind(&args.policy)?;
    let side = parse_side(&args.side)?;
    let setting = match &args.setting {
        Some(raw) => serde_json::from_str(raw)?,
        None => default_setting(kind),
    };

    let mut gw = SimGateway::new();
    gw.set_contract(core_types::ContractData {
        symbol: ACTIVE_SYMBOL.to_string(),
        min_volume: dec!(1),
        price_tick: dec!(0.5),
    });
    gw.set_contract(core_types::ContractData {
        symbol: PASSIVE_SYMBOL.to_string(),
        min_volume: dec!(1),
        price_tick: dec!(0.5),
    });

    let (mut engine, mut snapshots) = AlgoEngine::new(gw);
    let algo_id = engine.start_algo(
        kind,
        ACTIVE_SYMBOL,
        side,
        Offset::None,
        args.price,
        args.volume,
        &setting,
    )?;
    info!(algo = %algo_id, %kind, "demo instance started");

    let mut rng = rand::thread_rng();
    let mut price = args.price;
    let mut clock = tokio::time::interval(Duration::from_millis(50));

    for round in 0..args.ticks {
        clock.tick().await;

        // Random-walk the active leg; the passive leg trails it by a
        // small, noisy discount so arbitrage spreads occasionally open.
        price += dec!(0.5) * Decimal::from(rng.gen_range(-2i64..=2));
        let passive = price - dec!(1) + dec!(0.5) * Decimal::from(rng.gen_range(-1i64..=1));

        for tick in [market_tick(ACTIVE_SYMBOL, price, &mut rng), market_tick(PASSIVE_SYMBOL, passive, &mut rng)] {
            engine.gateway_mut().push_tick(tick.clone());
            engine.process_tick(&tick);
        }
        engine.process_timer();

        // The venue is generous: resting orders fill every third round.
        if round % 3 == 2 {
            for order_id in engine.gateway().open_order_ids() {
                engine.gateway_mut().fill_order(&order_id);
            }
        }
        for order in engine.gateway_mut().take_updates() {
            engine.process_order(&order);
        }
        for trade in engine.gateway_mut().take_trades() {
            engine.process_trade(&trade);
        }

        while let Ok(snapshot) = snapshots.try_recv() {
            info!(
                algo = %snapshot.algo_id,
                status = ?snapshot.status,
                traded = %snapshot.traded,
                remaining = %snapshot.remaining,
                avg_price = %snapshot.traded_price,
                "snapshot"
            );
        }

        if !engine.is_live(&algo_id) {
            info!(algo = %algo_id, "instance reached a terminal state");
            break;
        }
    }

    engine.stop_all();
    while let Ok(snapshot) = snapshots.try_recv() {
        info!(
            algo = %snapshot.algo_id,
            status = ?snapshot.status,
            traded = %snapshot.traded,
            avg_price = %snapshot.traded_price,
            "final snapshot"
        );
    }

    Ok(())
}

fn market_tick(symbol: &str, mid: Decimal, rng: &mut impl Rng) -> TickData {
    TickData {
        symbol: symbol.to_string(),
        last_price: mid,
        bid_price: mid - dec!(0.5),
        bid_volume: Decimal::from(rng.gen_range(5i64..=50)),
        ask_price: mid + dec!(0.5),
        ask_volume: Decimal::from(rng.gen_range(5i64..=50)),
        limit_up: None,
        limit_down: None,
        timestamp: Utc::now(),
    }
}

fn parse_kind(name: &str) -> anyhow::Result<AlgoKind> {
    AlgoKind::all()
        .iter()
        .copied()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("unknown policy '{name}', try the `list` command"))
}

fn parse_side(raw: &str) -> anyhow::Result<OrderSide> {
    match raw.to_ascii_lowercase().as_str() {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        _ => bail!("side must be \"buy\" or \"sell\", got '{raw}'"),
    }
}

/// Sensible demo settings for each policy, tuned to the 50ms tick cadence.
fn default_setting(kind: AlgoKind) -> Value {
    match kind {
        AlgoKind::Twap => json!({ "time": 120, "interval": 6 }),
        AlgoKind::Iceberg => json!({ "display_volume": "5", "interval": 10 }),
        AlgoKind::Sniper => json!({}),
        AlgoKind::Stop => json!({ "price_add": "1" }),
        AlgoKind::BestLimit => json!({ "min_volume": "1", "max_volume": "5" }),
        AlgoKind::Grid => json!({ "step_price": "2", "step_volume": "2", "interval": 5 }),
        AlgoKind::Arbitrage => json!({
            "passive_symbol": PASSIVE_SYMBOL,
            "spread_up": "2",
            "spread_down": "2",
            "max_pos": "10",
            "interval": 5
        }),
    }
}
