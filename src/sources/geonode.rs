//! proxylist.geonode.com API source adapter

use super::CandidateSource;
use crate::proxy::models::Candidate;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const API_URL: &str = "https://proxylist.geonode.com/api/proxy-list?protocols=http%2Chttps&filterUpTime=90&filterLastChecked=5&speed=fast&limit=500&page=1&sort_by=lastChecked&sort_type=desc";

#[derive(Debug, Deserialize)]
struct ProxyListResponse {
    #[serde(default)]
    data: Vec<ProxyEntry>,
}

/// One listing entry. The API has served ports as numbers and strings,
/// and protocols as arrays and comma-joined strings, so both shapes
/// are tolerated.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyEntry {
    #[serde(default)]
    ip: String,
    #[serde(default)]
    port: Value,
    #[serde(default)]
    country: String,
    #[serde(default)]
    anonymity_level: String,
    #[serde(default)]
    protocols: Value,
}

fn parse_port(raw: &Value) -> Option<u16> {
    match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn declares_https(protocols: &Value) -> bool {
    match protocols {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str())
            .any(|protocol| protocol.eq_ignore_ascii_case("https")),
        Value::String(joined) => joined
            .split(',')
            .any(|protocol| protocol.trim().eq_ignore_ascii_case("https")),
        _ => false,
    }
}

fn into_candidates(listing: ProxyListResponse) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    for entry in listing.data {
        if entry.ip.is_empty() {
            continue;
        }
        let Some(port) = parse_port(&entry.port) else {
            log::trace!("skipping geonode entry with unusable port: {}", entry.ip);
            continue;
        };
        if port == 0 {
            continue;
        }

        let declared_https = declares_https(&entry.protocols);
        candidates.push(
            Candidate::new(entry.ip, port)
                .with_https(declared_https)
                .with_country(entry.country, String::new())
                .with_anonymity(entry.anonymity_level),
        );
    }

    candidates
}

/// Fetches the geonode proxy-list API.
///
/// The query asks for HTTP and HTTPS proxies only, checked within the
/// last five minutes and with at least 90% uptime.
pub struct GeonodeSource;

#[async_trait]
impl CandidateSource for GeonodeSource {
    fn name(&self) -> &'static str {
        "proxylist.geonode.com"
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Candidate>> {
        let response = client.get(API_URL).send().await?;
        let listing: ProxyListResponse = response.json().await?;
        Ok(into_candidates(listing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_and_string_ports() {
        let raw = r#"{
            "data": [
                {"ip": "1.2.3.4", "port": 8080, "country": "US", "anonymityLevel": "elite", "protocols": ["http"]},
                {"ip": "5.6.7.8", "port": "3128", "country": "DE", "anonymityLevel": "anonymous", "protocols": ["http", "https"]},
                {"ip": "9.9.9.9", "port": "eighty", "country": "FR", "anonymityLevel": "elite", "protocols": ["http"]}
            ]
        }"#;
        let listing: ProxyListResponse = serde_json::from_str(raw).unwrap();
        let candidates = into_candidates(listing);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].endpoint(), "1.2.3.4:8080");
        assert!(!candidates[0].declared_https);
        assert_eq!(candidates[0].country_code, "US");
        assert_eq!(candidates[0].anonymity, "elite");

        assert_eq!(candidates[1].endpoint(), "5.6.7.8:3128");
        assert!(candidates[1].declared_https);
    }

    #[test]
    fn test_parse_protocols_as_joined_string() {
        let raw = r#"{
            "data": [
                {"ip": "1.2.3.4", "port": 8080, "country": "US", "anonymityLevel": "elite", "protocols": "http, https"}
            ]
        }"#;
        let listing: ProxyListResponse = serde_json::from_str(raw).unwrap();
        let candidates = into_candidates(listing);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].declared_https);
    }

    #[test]
    fn test_missing_fields_default() {
        let raw = r#"{"data": [{"ip": "1.2.3.4", "port": 8080}]}"#;
        let listing: ProxyListResponse = serde_json::from_str(raw).unwrap();
        let candidates = into_candidates(listing);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].country_code.is_empty());
        assert!(candidates[0].anonymity.is_empty());
        assert!(!candidates[0].declared_https);
    }

    #[test]
    fn test_empty_and_absent_data() {
        let listing: ProxyListResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(into_candidates(listing).is_empty());

        let listing: ProxyListResponse = serde_json::from_str("{}").unwrap();
        assert!(into_candidates(listing).is_empty());
    }

    #[test]
    fn test_entries_without_ip_are_skipped() {
        let raw = r#"{"data": [{"port": 8080, "protocols": ["http"]}]}"#;
        let listing: ProxyListResponse = serde_json::from_str(raw).unwrap();
        assert!(into_candidates(listing).is_empty());
    }
}
