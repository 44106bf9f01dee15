//! Core validation engine
//!
//! This module provides functionality for:
//! - Modelling candidates, probe verdicts and working proxies
//! - Probing endpoints over HTTP and HTTPS
//! - Running bounded concurrent validation batches with a deadline
//! - Folding verdicts into a deduplicated working set

pub mod aggregate;
pub mod checker;
pub mod geo;
pub mod models;
pub mod parser;
pub mod probe;

pub use aggregate::aggregate;
pub use checker::{BatchConfig, ProxyChecker};
pub use geo::{CountryInfo, GeoLocator};
pub use models::{Candidate, Protocol, Verdict, WorkingProxy};
pub use parser::CandidateParser;
pub use probe::{HttpProber, Prober};
