//! fastproxy - Proxy Scraper and Validator
//!
//! Scrapes proxy candidates from public listing sites and validates
//! them concurrently through a bounded worker pool. A candidate counts
//! as working when a test request routed through it comes back with a
//! 200; candidates that declare HTTPS support are probed over HTTPS
//! first.
//!
//! ```rust,no_run
//! use fastproxy::{BatchConfig, Candidate, ProxyChecker};
//!
//! # async fn example() -> fastproxy::Result<()> {
//! let candidates = vec![Candidate::new("203.0.113.7".to_string(), 8080)];
//!
//! let config = BatchConfig::new().with_concurrency(50);
//! let working = ProxyChecker::with_config(config).run_batch(candidates).await?;
//!
//! for proxy in &working {
//!     println!("{}", proxy);
//! }
//! # Ok(())
//! # }
//! ```

pub mod output;
pub mod proxy;
pub mod sources;

pub use proxy::*;

/// Application result type
pub type Result<T> = anyhow::Result<T>;

/// Route log records to stderr, keeping stdout clean for results
pub fn initialize_logging(log_level: log::LevelFilter) -> Result<()> {
    stderrlog::new()
        .module(module_path!())
        .show_module_names(true)
        .verbosity(log_level)
        .init()?;
    Ok(())
}
