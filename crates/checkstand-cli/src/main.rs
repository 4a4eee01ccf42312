use anyhow::Context;
use checkstand_idcheck::summarize_for_popup;
use checkstand_pipeline::ScanOutcome;
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

use config::ReplayConfig;
use replay::{ReplayEntry, Replayer};

#[derive(Parser, Debug)]
#[command(
    name = "checkstand",
    version,
    about = "Replay scanner captures through the checkstand pipeline"
)]
struct Cli {
    #[arg(long, help = "Send the whole input as a single scan")]
    raw: bool,
    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(long, value_name = "N", help = "Silence in milliseconds that ends a scan")]
    idle_ms: Option<u64>,
    #[arg(long, value_name = "DATE", help = "Evaluate ages as of this date (YYYY-MM-DD)")]
    today: Option<chrono::NaiveDate>,
    #[arg(long, value_name = "FILE", help = "JSON file with capture and policy settings")]
    config: Option<PathBuf>,
    #[arg(value_name = "INPUT", help = "Capture file to replay, stdin if omitted or '-'")]
    input: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ReplayConfig::load(path)?,
        None => ReplayConfig::default(),
    };
    if let Some(ms) = cli.idle_ms {
        config.capture.idle_threshold = std::time::Duration::from_millis(ms);
    }

    let input = read_input(cli.input.as_deref())?;
    let scans = if cli.raw {
        replay::whole_input(&input)
    } else {
        replay::scans_from_lines(&input)
    };

    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let entries = Replayer::new(config, today).run(scans).await?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut {
                ok: true,
                data: &entries
            })?
        );
    } else {
        for entry in &entries {
            print_entry(entry);
        }
    }
    Ok(())
}

fn read_input(path: Option<&std::path::Path>) -> anyhow::Result<Vec<u8>> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn print_entry(entry: &ReplayEntry) {
    match &entry.outcome {
        Some(ScanOutcome::Barcode(code)) => println!("{}\tbarcode\t{}", entry.scan, code),
        Some(ScanOutcome::Identity(decision)) => {
            println!("{}\t{}", entry.scan, decision.severity().label());
            println!("{}", summarize_for_popup(decision));
            println!();
        }
        None => println!("{}\tdiscarded", entry.scan),
    }
}
