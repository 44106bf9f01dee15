use anyhow::Result;
use clap::{Parser, Subcommand};
use fastproxy::{
    output,
    proxy::{BatchConfig, CandidateParser, GeoLocator, ProxyChecker},
    sources::SourceManager,
};
use std::path::PathBuf;
use std::time::Duration;

/// A proxy scraper and validator with bounded concurrency
#[derive(Parser)]
#[command(name = "fastproxy")]
#[command(about = "Scrapes proxy listings and validates the candidates concurrently")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the listing sources and validate what they return
    Fetch {
        /// Number of concurrent validation workers
        #[arg(short = 'n', long, default_value = "100")]
        concurrency: usize,
        /// Timeout per probe attempt in seconds
        #[arg(short, long, default_value = "4")]
        timeout: u64,
        /// Hard ceiling for the whole validation run in seconds
        #[arg(short, long, default_value = "45")]
        deadline: u64,
        /// Cap on candidates taken per source and admitted to validation
        #[arg(short, long)]
        max_candidates: Option<usize>,
        /// Write working proxies to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Also dump every scraped candidate to this CSV file
        #[arg(long)]
        all_csv: Option<PathBuf>,
    },
    /// Validate candidates read from a file
    Check {
        /// Input file with one IP:PORT or scheme://IP:PORT per line
        input: PathBuf,
        /// Treat every candidate as declaring HTTPS support
        #[arg(long)]
        https: bool,
        /// MaxMind database for filling in country metadata
        #[arg(long)]
        mmdb: Option<PathBuf>,
        /// Number of concurrent validation workers
        #[arg(short = 'n', long, default_value = "100")]
        concurrency: usize,
        /// Timeout per probe attempt in seconds
        #[arg(short, long, default_value = "4")]
        timeout: u64,
        /// Hard ceiling for the whole validation run in seconds
        #[arg(short, long, default_value = "45")]
        deadline: u64,
        /// Cap on the number of candidates admitted to validation
        #[arg(short, long)]
        max_candidates: Option<usize>,
        /// Write working proxies to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    fastproxy::initialize_logging(log_level(cli.verbose))?;

    match cli.command {
        Commands::Fetch {
            concurrency,
            timeout,
            deadline,
            max_candidates,
            csv,
            all_csv,
        } => {
            let manager = SourceManager::new();
            let candidates = manager.fetch_all(max_candidates).await?;
            println!("Collected {} candidates", candidates.len());

            if let Some(path) = all_csv {
                output::write_candidates_csv(&candidates, &path)?;
                println!("Saved candidate list to {:?}", path);
            }

            let config = batch_config(concurrency, timeout, deadline, max_candidates);
            let working = ProxyChecker::with_config(config).run_batch(candidates).await?;

            output::print_working(&working);
            if let Some(path) = csv {
                output::write_working_csv(&working, &path)?;
                println!("Saved {} working proxies to {:?}", working.len(), path);
            }
        }
        Commands::Check {
            input,
            https,
            mmdb,
            concurrency,
            timeout,
            deadline,
            max_candidates,
            csv,
        } => {
            let mut candidates = CandidateParser::parse_file(&input, https)?;
            println!("Loaded {} candidates from {:?}", candidates.len(), input);

            if let Some(mmdb_path) = mmdb {
                match GeoLocator::from_path(&mmdb_path) {
                    Ok(locator) => locator.enrich(&mut candidates),
                    Err(e) => log::warn!("cannot open MMDB {:?}: {}", mmdb_path, e),
                }
            }

            let config = batch_config(concurrency, timeout, deadline, max_candidates);
            let working = ProxyChecker::with_config(config).run_batch(candidates).await?;

            output::print_working(&working);
            if let Some(path) = csv {
                output::write_working_csv(&working, &path)?;
                println!("Saved {} working proxies to {:?}", working.len(), path);
            }
        }
    }

    Ok(())
}

fn batch_config(
    concurrency: usize,
    timeout: u64,
    deadline: u64,
    max_candidates: Option<usize>,
) -> BatchConfig {
    let config = BatchConfig::new()
        .with_concurrency(concurrency)
        .with_per_probe_timeout(Duration::from_secs(timeout))
        .with_batch_deadline(Duration::from_secs(deadline));

    match max_candidates {
        Some(max) => config.with_max_candidates(max),
        None => config,
    }
}

fn log_level(verbosity: u8) -> log::LevelFilter {
    match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}
