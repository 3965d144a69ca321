use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use lookout_common::ScanOptions;

#[derive(Parser)]
#[command(name = "lookout")]
#[command(version)]
#[command(about = "TCP connect scanner with service identification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a host for open TCP ports
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Target IP address or hostname. Example: 192.168.1.1 or example.com
    #[arg(short = 't', long, required = true)]
    pub target: String,

    /// Ports to scan. Examples: 80 or 1-100 or 22,80,443,8000-9000
    #[arg(short, long, default_value = "1-1000")]
    pub ports: String,

    /// Identify services on open ports
    #[arg(short = 's', long)]
    pub service_detection: bool,

    /// Save results to file (.json or .csv; anything else is saved as JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Connect timeout in seconds (fractions allowed)
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Number of concurrent connect workers
    #[arg(long)]
    pub threads: Option<usize>,

    /// Banner grab timeout in seconds
    #[arg(long)]
    pub banner_timeout: Option<f64>,

    /// Concurrent banner probes during service detection
    #[arg(long)]
    pub identify_concurrency: Option<usize>,

    /// JSON service table (falls back to LOOKOUT_SERVICES_DB, then the built-in table)
    #[arg(long)]
    pub services_db: Option<PathBuf>,

    /// Preset: default, fast, accurate
    #[arg(long, default_value = "default", value_parser = ["default", "fast", "accurate"])]
    pub preset: String,

    /// Report format on stdout: text, json, csv
    #[arg(short = 'f', long, default_value = "text", value_parser = ["text", "json", "csv"])]
    pub format: String,
}

impl ScanArgs {
    /// Preset first, then explicit flags on top.
    pub fn options(&self) -> Result<ScanOptions> {
        let mut options = ScanOptions::preset(&self.preset)?;
        if let Some(secs) = self.timeout {
            options.timeout = seconds(secs, "timeout")?;
        }
        if let Some(secs) = self.banner_timeout {
            options.banner_timeout = seconds(secs, "banner timeout")?;
        }
        if let Some(threads) = self.threads {
            if threads == 0 {
                bail!("threads must be at least 1");
            }
            options.workers = threads;
        }
        if let Some(n) = self.identify_concurrency {
            if n == 0 {
                bail!("identify concurrency must be at least 1");
            }
            options.identify_concurrency = n;
        }
        options.service_detection = self.service_detection;
        options.services_db = self.services_db.clone();
        Ok(options)
    }
}

fn seconds(value: f64, what: &str) -> Result<Duration> {
    if !(value > 0.0) {
        bail!("{} must be a positive number of seconds, got {}", what, value);
    }
    Ok(Duration::try_from_secs_f64(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_args(argv: &[&str]) -> ScanArgs {
        let mut full = vec!["lookout", "scan"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Scan(args) => args,
        }
    }

    #[test]
    fn defaults() {
        let args = scan_args(&["-t", "127.0.0.1"]);
        assert_eq!(args.ports, "1-1000");
        assert!(!args.service_detection);
        assert_eq!(args.format, "text");

        let opts = args.options().unwrap();
        assert_eq!(opts.timeout, Duration::from_secs(1));
        assert_eq!(opts.workers, 100);
    }

    #[test]
    fn flags_override_preset() {
        let args = scan_args(&[
            "-t", "10.0.0.1", "--preset", "fast", "--timeout", "0.5", "--threads", "20", "-s",
        ]);
        let opts = args.options().unwrap();
        assert_eq!(opts.timeout, Duration::from_millis(500));
        assert_eq!(opts.workers, 20);
        assert!(opts.service_detection);
        // untouched preset value survives
        assert_eq!(opts.identify_concurrency, 16);
    }

    #[test]
    fn rejects_non_positive_values() {
        assert!(scan_args(&["-t", "x", "--timeout", "0"]).options().is_err());
        assert!(scan_args(&["-t", "x", "--timeout=-1"]).options().is_err());
        assert!(scan_args(&["-t", "x", "--threads", "0"]).options().is_err());
        assert!(scan_args(&["-t", "x", "--banner-timeout", "NaN"]).options().is_err());
    }

    #[test]
    fn target_is_required() {
        assert!(Cli::try_parse_from(["lookout", "scan"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["lookout", "-vv", "scan", "-t", "h"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
