//! Listing-site adapters that feed candidates into the validator

pub mod free_proxy_list;
pub mod geonode;

pub use free_proxy_list::FreeProxyListSource;
pub use geonode::GeonodeSource;

use crate::proxy::models::Candidate;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default timeout for listing-site requests in seconds
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Browser-like user agent; some listing sites reject default client strings
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One upstream listing of proxy candidates
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch the listing and parse it into candidates
    async fn fetch(&self, client: &Client) -> Result<Vec<Candidate>>;
}

/// Fetches all configured sources, tolerating individual failures.
///
/// A source that errors is logged and skipped so one broken listing
/// site never empties the whole candidate pool.
pub struct SourceManager {
    sources: Vec<Box<dyn CandidateSource>>,
    timeout: Duration,
}

impl SourceManager {
    /// Manager over the default source set
    pub fn new() -> Self {
        Self {
            sources: vec![
                Box::new(FreeProxyListSource),
                Box::new(GeonodeSource),
            ],
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    /// Manager with no sources; add them with `add_source`
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn add_source(&mut self, source: Box<dyn CandidateSource>) {
        self.sources.push(source);
    }

    /// Fetch every source in turn and concatenate the candidates.
    ///
    /// `max_per_source` caps how many candidates each listing may
    /// contribute; `None` takes everything.
    pub async fn fetch_all(&self, max_per_source: Option<usize>) -> Result<Vec<Candidate>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;

        let mut all = Vec::new();
        for source in &self.sources {
            match source.fetch(&client).await {
                Ok(mut candidates) => {
                    if let Some(max) = max_per_source {
                        candidates.truncate(max);
                    }
                    log::debug!("{}: {} candidates", source.name(), candidates.len());
                    all.extend(candidates);
                }
                Err(e) => {
                    log::error!("failed to fetch from {}: {}", source.name(), e);
                }
            }
        }

        Ok(all)
    }
}

impl Default for SourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_source_set() {
        let manager = SourceManager::new();
        assert_eq!(manager.sources.len(), 2);
    }

    #[test]
    fn test_empty_manager() {
        let manager = SourceManager::empty();
        assert!(manager.sources.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_with_no_sources() {
        let manager = SourceManager::empty();
        let candidates = manager.fetch_all(None).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        struct BrokenSource;

        #[async_trait]
        impl CandidateSource for BrokenSource {
            fn name(&self) -> &'static str {
                "broken"
            }

            async fn fetch(&self, _client: &Client) -> Result<Vec<Candidate>> {
                anyhow::bail!("listing site unreachable")
            }
        }

        struct FixedSource;

        #[async_trait]
        impl CandidateSource for FixedSource {
            fn name(&self) -> &'static str {
                "fixed"
            }

            async fn fetch(&self, _client: &Client) -> Result<Vec<Candidate>> {
                Ok(vec![
                    Candidate::new("1.2.3.4".to_string(), 8080),
                    Candidate::new("5.6.7.8".to_string(), 3128),
                ])
            }
        }

        let mut manager = SourceManager::empty();
        manager.add_source(Box::new(BrokenSource));
        manager.add_source(Box::new(FixedSource));

        let candidates = manager.fetch_all(None).await.unwrap();
        assert_eq!(candidates.len(), 2);

        let capped = manager.fetch_all(Some(1)).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].endpoint(), "1.2.3.4:8080");
    }
}
