// src/main.rs
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info};

use zone_detector::config::DetectorConfig;
use zone_detector::data::{load_candles_csv, write_report};
use zone_detector::engine::{ZoneDetectionRequest, ZoneEngine};
use zone_detector::errors::EngineError;

/// Detects supply and demand zones from a candle CSV and reports them as JSON.
#[derive(Parser, Debug)]
#[command(
    name = "zone-detector",
    version,
    about = "Supply/demand zone detection over OHLCV candles"
)]
struct Args {
    /// CSV file with time,open,high,low,close,volume columns
    #[arg(short, long)]
    input: PathBuf,

    /// Trading pair symbol, used for zone ids and logging
    #[arg(short, long, default_value = "BTCUSDT")]
    symbol: String,

    /// Candle timeframe: 1m, 30m, 1h, 4h, 1d, 1w
    #[arg(short, long, default_value = "1h")]
    timeframe: String,

    /// Write the JSON report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,

    /// Body-to-range ratio below which a candle counts as Base
    #[arg(long)]
    base_threshold: Option<f64>,

    /// Rolling average volume window
    #[arg(long)]
    volume_window: Option<usize>,

    /// Merge proximity as a fraction of the average candle range
    #[arg(long)]
    merge_gap_pct: Option<f64>,

    /// Drop zones touched more than this many times
    #[arg(long)]
    max_touches: Option<i64>,
}

fn run(args: Args) -> Result<(), EngineError> {
    let mut config = DetectorConfig::default();
    if let Some(v) = args.base_threshold {
        config.base_body_threshold = v;
    }
    if let Some(v) = args.volume_window {
        config.volume_window = v;
    }
    if let Some(v) = args.merge_gap_pct {
        config.merge_gap_pct = v;
    }
    if args.max_touches.is_some() {
        config.max_touch_count = args.max_touches;
    }

    let candles = load_candles_csv(&args.input)?;
    info!("loaded {} candles from {}", candles.len(), args.input.display());

    let request = ZoneDetectionRequest {
        symbol: args.symbol,
        timeframe: args.timeframe,
        candles,
    };
    let result = ZoneEngine::detect_zones(request, config)?;
    write_report(&result, args.output.as_deref(), args.pretty)
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("zone_detector=debug,info"));
    let args = Args::parse();
    if let Err(err) = run(args) {
        error!("{}", err);
        process::exit(1);
    }
}
