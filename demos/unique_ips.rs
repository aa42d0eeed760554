//! Count unique IPv4 addresses of an access log exactly and with
//! `CardinalityEstimator`, then print both results side by side.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Instant;

use approx_sketch::SketchConfig;
use clap::Parser;
use regex::Regex;
use tabled::settings::{Settings, Style};
use tabled::{Table, Tabled};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "unique_ips", about = "Exact vs HyperLogLog unique IP count")]
struct Cli {
    /// Access log to scan
    #[arg(long, default_value = "./data/lms-stage-access.log")]
    log: PathBuf,
    /// Estimator precision in [4..18]
    #[arg(long, default_value_t = 14)]
    precision: u8,
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "")]
    metric: String,
    #[tabled(rename = "Exact count")]
    exact: String,
    #[tabled(rename = "HyperLogLog")]
    hll: String,
}

/// Stream valid IPv4 addresses, one per line at most, skipping lines without one.
fn for_each_ip(path: &Path, mut f: impl FnMut(&str)) -> std::io::Result<()> {
    let re = Regex::new(r"(?:\d{1,3}\.){3}\d{1,3}").expect("static regex is valid");
    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        if let Some(m) = re.find(&line) {
            if m.as_str().parse::<Ipv4Addr>().is_ok() {
                f(m.as_str());
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if !cli.log.exists() {
        println!("Log file '{}' not found.", cli.log.display());
        return Ok(());
    }

    let config = SketchConfig::default().with_precision(cli.precision);
    let mut estimator = config.estimator()?;

    let start = Instant::now();
    for_each_ip(&cli.log, |ip| estimator.add(ip))?;
    let hll_count = estimator.count();
    let hll_time = start.elapsed();

    let start = Instant::now();
    let mut exact = HashSet::new();
    for_each_ip(&cli.log, |ip| {
        exact.insert(ip.to_owned());
    })?;
    let exact_time = start.elapsed();

    let rows = vec![
        Row {
            metric: "Unique elements".to_string(),
            exact: format!("{:.1}", exact.len() as f64),
            hll: format!("{:.1}", hll_count),
        },
        Row {
            metric: "Time (sec.)".to_string(),
            exact: format!("{:.6}", exact_time.as_secs_f64()),
            hll: format!("{:.6}", hll_time.as_secs_f64()),
        },
        Row {
            metric: "Parameters".to_string(),
            exact: "-".to_string(),
            hll: format!(
                "p={}, m={} (error ~ {:.4})",
                estimator.precision(),
                estimator.num_registers(),
                estimator.standard_error()
            ),
        },
    ];

    let table_config = Settings::default().with(Style::markdown());
    println!("{}", Table::new(rows).with(table_config));
    Ok(())
}
