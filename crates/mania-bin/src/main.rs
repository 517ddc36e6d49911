mod headless;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use mania_config::PlayConfig;

use headless::{SpeedChange, parse_speed_change};

#[derive(Parser)]
#[command(name = "mania", about = "Headless autoplay run of a mania chart")]
struct Args {
    /// Chart file (JSON)
    #[arg(long)]
    chart: PathBuf,

    /// Play configuration; defaults are used when the file is missing
    #[arg(long, default_value = "play_config.json")]
    config: PathBuf,

    /// Change scroll speed at a chart time, as <ms>:<speed>
    #[arg(long = "speed-change", value_parser = parse_speed_change)]
    speed_changes: Vec<SpeedChange>,

    /// Pretty-print the summary
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = PlayConfig::read_or_default(&args.config)?;
    let parsed = headless::load_chart(&args.chart)?;
    info!("Playing {}", args.chart.display());

    let summary = headless::run(&parsed, &config, &args.speed_changes)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{json}");
    Ok(())
}
