//! Data models for candidates, probe verdicts and validated proxies

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Protocol confirmed by a successful probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Protocol {
    #[default]
    Http,
    Https,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
        }
    }
}

/// An unvalidated proxy endpoint collected from a listing source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub host: String,
    pub port: u16,
    /// Whether the listing claims this endpoint can tunnel HTTPS
    pub declared_https: bool,
    /// ISO country code as reported by the listing, empty if unknown
    pub country_code: String,
    pub country_name: String,
    /// Anonymity label as reported by the listing, passed through untouched
    pub anonymity: String,
}

impl Candidate {
    /// Create a candidate with no listing metadata
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            declared_https: false,
            country_code: String::new(),
            country_name: String::new(),
            anonymity: String::new(),
        }
    }

    pub fn with_https(mut self, declared_https: bool) -> Self {
        self.declared_https = declared_https;
        self
    }

    pub fn with_country(mut self, code: String, name: String) -> Self {
        self.country_code = code;
        self.country_name = name;
        self
    }

    pub fn with_anonymity(mut self, anonymity: String) -> Self {
        self.anonymity = anonymity;
        self
    }

    /// Canonical `host:port` form, the identity used for deduplication
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// URL the probe client uses to reach this endpoint as a forward proxy
    pub fn proxy_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// A candidate is probeable when the host is a plausible address and
    /// the port is in range. Listing tables are scraped from the wild, so
    /// rows with blank hosts, embedded whitespace or a zero port do occur.
    pub fn is_valid(&self) -> bool {
        !self.host.is_empty() && !self.host.contains(char::is_whitespace) && self.port != 0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

/// Outcome of probing a single candidate
#[derive(Debug, Clone)]
pub struct Verdict {
    pub candidate: Candidate,
    /// Highest protocol that returned a 200, `None` when the endpoint is dead
    pub protocol: Option<Protocol>,
    /// Time taken by the successful attempt
    pub elapsed: Option<Duration>,
}

impl Verdict {
    pub fn alive(candidate: Candidate, protocol: Protocol, elapsed: Duration) -> Self {
        Self {
            candidate,
            protocol: Some(protocol),
            elapsed: Some(elapsed),
        }
    }

    pub fn dead(candidate: Candidate) -> Self {
        Self {
            candidate,
            protocol: None,
            elapsed: None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.protocol.is_some()
    }
}

/// A validated proxy as it appears in the final result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingProxy {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
    pub country_code: String,
    pub anonymity: String,
}

impl WorkingProxy {
    /// Canonical `host:port` form
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for WorkingProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.endpoint(), self.protocol)
    }
}
