//! free-proxy-list.net source adapter

use super::CandidateSource;
use crate::proxy::models::Candidate;
use crate::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::net::Ipv4Addr;

const LISTING_URL: &str = "https://free-proxy-list.net/";

/// Matches one table row, including rows spanning multiple lines
static ROW_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").expect("Invalid row regex"));

/// Matches one data cell within a row
static CELL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<td[^>]*>([^<]*)</td>").expect("Invalid cell regex"));

/// Index of the anonymity column in the listing table
const ANONYMITY_COLUMN: usize = 4;

/// Index of the https column in the listing table
const HTTPS_COLUMN: usize = 6;

/// Number of columns a data row must have
const COLUMN_COUNT: usize = 8;

/// Scrapes the free-proxy-list.net HTML table.
///
/// The table columns are: IP, port, country code, country, anonymity,
/// google, https, last checked. Header rows use `<th>` cells and fall
/// out naturally; rows with an unparseable IP or port are skipped.
pub struct FreeProxyListSource;

impl FreeProxyListSource {
    fn parse(html: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for row in ROW_REGEX.captures_iter(html) {
            let cells: Vec<&str> = CELL_REGEX
                .captures_iter(&row[1])
                .map(|cell| cell.get(1).map_or("", |m| m.as_str()).trim())
                .collect();

            if cells.len() < COLUMN_COUNT {
                continue;
            }
            if cells[0].parse::<Ipv4Addr>().is_err() {
                log::trace!("skipping listing row with host {:?}", cells[0]);
                continue;
            }
            let Ok(port) = cells[1].parse::<u16>() else {
                log::trace!("skipping listing row with port {:?}", cells[1]);
                continue;
            };
            if port == 0 {
                continue;
            }

            candidates.push(
                Candidate::new(cells[0].to_string(), port)
                    .with_https(cells[HTTPS_COLUMN].eq_ignore_ascii_case("yes"))
                    .with_country(cells[2].to_string(), cells[3].to_string())
                    .with_anonymity(cells[ANONYMITY_COLUMN].to_string()),
            );
        }

        candidates
    }
}

#[async_trait]
impl CandidateSource for FreeProxyListSource {
    fn name(&self) -> &'static str {
        "free-proxy-list.net"
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Candidate>> {
        let response = client.get(LISTING_URL).send().await?;
        let body = response.text().await?;
        Ok(Self::parse(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TABLE: &str = r#"
<table class="table">
<thead>
<tr><th>IP Address</th><th>Port</th><th>Code</th><th>Country</th><th>Anonymity</th><th>Google</th><th>Https</th><th>Last Checked</th></tr>
</thead>
<tbody>
<tr><td>160.86.242.23</td><td>8080</td><td>JP</td><td>Japan</td><td class="hm">anonymous</td><td>no</td><td class="hx">no</td><td class="hm">4 secs ago</td></tr>
<tr><td>50.174.7.153</td><td>80</td><td>US</td><td>United States</td><td class="hm">elite proxy</td><td>no</td><td class="hx">yes</td><td class="hm">1 min ago</td></tr>
<tr><td>not-an-ip</td><td>8080</td><td>DE</td><td>Germany</td><td>anonymous</td><td>no</td><td>no</td><td>2 mins ago</td></tr>
<tr><td>10.0.0.1</td><td>notaport</td><td>DE</td><td>Germany</td><td>anonymous</td><td>no</td><td>no</td><td>2 mins ago</td></tr>
</tbody>
</table>
"#;

    #[test]
    fn test_parse_sample_table() {
        let candidates = FreeProxyListSource::parse(SAMPLE_TABLE);
        assert_eq!(candidates.len(), 2);

        assert_eq!(candidates[0].endpoint(), "160.86.242.23:8080");
        assert!(!candidates[0].declared_https);
        assert_eq!(candidates[0].country_code, "JP");
        assert_eq!(candidates[0].country_name, "Japan");
        assert_eq!(candidates[0].anonymity, "anonymous");

        assert_eq!(candidates[1].endpoint(), "50.174.7.153:80");
        assert!(candidates[1].declared_https);
        assert_eq!(candidates[1].anonymity, "elite proxy");
    }

    #[test]
    fn test_parse_multiline_rows() {
        let html = "<tr>\n<td>1.2.3.4</td>\n<td>3128</td>\n<td>FR</td>\n<td>France</td>\n<td>transparent</td>\n<td>no</td>\n<td>yes</td>\n<td>now</td>\n</tr>";
        let candidates = FreeProxyListSource::parse(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].endpoint(), "1.2.3.4:3128");
        assert!(candidates[0].declared_https);
    }

    #[test]
    fn test_parse_short_rows_are_skipped() {
        let html = "<tr><td>1.2.3.4</td><td>8080</td></tr>";
        assert!(FreeProxyListSource::parse(html).is_empty());
    }

    #[test]
    fn test_parse_empty_page() {
        assert!(FreeProxyListSource::parse("<html><body></body></html>").is_empty());
    }
}
