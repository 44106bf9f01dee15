//! Single-candidate liveness probes

use crate::proxy::models::{Candidate, Protocol, Verdict};
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use std::time::{Duration, Instant};

/// Echo endpoint reachable over plain HTTP
const DEFAULT_HTTP_TEST_URL: &str = "http://httpbin.org/ip";

/// Echo endpoint that forces a CONNECT tunnel through the proxy
const DEFAULT_HTTPS_TEST_URL: &str = "https://httpbin.org/ip";

/// A liveness check for one candidate.
///
/// Implementations must bound every network attempt by `timeout` and
/// always come back with a verdict rather than an error; a candidate
/// that cannot be reached is simply dead.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, candidate: &Candidate, timeout: Duration) -> Verdict;
}

/// Probes candidates by issuing GET requests through them as forward proxies.
///
/// The attempt order is fixed: an HTTPS attempt runs first when the
/// candidate declares HTTPS support, and a plain HTTP attempt runs
/// unless HTTPS already succeeded. Each attempt gets its own timeout
/// budget, so a probe takes at most two timeouts of wall time.
#[derive(Debug, Clone)]
pub struct HttpProber {
    http_test_url: String,
    https_test_url: String,
}

impl Default for HttpProber {
    fn default() -> Self {
        Self {
            http_test_url: DEFAULT_HTTP_TEST_URL.to_string(),
            https_test_url: DEFAULT_HTTPS_TEST_URL.to_string(),
        }
    }
}

impl HttpProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the echo endpoints, e.g. to point at a local test server
    pub fn with_test_urls(mut self, http_url: String, https_url: String) -> Self {
        self.http_test_url = http_url;
        self.https_test_url = https_url;
        self
    }

    /// Create a reqwest client routed through the candidate
    fn create_client(&self, candidate: &Candidate, timeout: Duration) -> Result<Client> {
        let proxy = ReqwestProxy::all(candidate.proxy_url())?;

        let client = Client::builder().proxy(proxy).timeout(timeout).build()?;

        Ok(client)
    }

    /// Run one attempt against `url`; any failure makes the attempt false
    async fn attempt(&self, candidate: &Candidate, url: &str, timeout: Duration) -> bool {
        let client = match self.create_client(candidate, timeout) {
            Ok(client) => client,
            Err(e) => {
                log::debug!("{}: cannot build client: {}", candidate.endpoint(), e);
                return false;
            }
        };

        // The client carries its own timeout; the outer one also covers
        // connection setup stalls the client timeout can miss.
        match tokio::time::timeout(timeout, client.get(url).send()).await {
            Ok(Ok(response)) => response.status() == StatusCode::OK,
            Ok(Err(e)) => {
                log::trace!("{}: {}", candidate.endpoint(), e);
                false
            }
            Err(_) => {
                log::trace!("{}: attempt timed out", candidate.endpoint());
                false
            }
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, candidate: &Candidate, timeout: Duration) -> Verdict {
        if candidate.declared_https {
            let start = Instant::now();
            if self.attempt(candidate, &self.https_test_url, timeout).await {
                return Verdict::alive(candidate.clone(), Protocol::Https, start.elapsed());
            }
        }

        let start = Instant::now();
        if self.attempt(candidate, &self.http_test_url, timeout).await {
            return Verdict::alive(candidate.clone(), Protocol::Http, start.elapsed());
        }

        Verdict::dead(candidate.clone())
    }
}
