//! Country lookup for candidates that arrive without listing metadata

use crate::proxy::models::Candidate;
use crate::Result;
use maxminddb::{geoip2, Reader};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Country information for an IP address
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryInfo {
    /// ISO 3166-1 alpha-2 country code (e.g., "US", "DE")
    pub code: Option<String>,
    /// Country name in English
    pub name: Option<String>,
}

/// GeoLocator for resolving candidate IPs against an MMDB database
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Create a new GeoLocator from an MMDB file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Look up country information for an IP address
    pub fn lookup(&self, ip: IpAddr) -> Result<CountryInfo> {
        let lookup_result = self.reader.lookup(ip)?;

        let country: Option<geoip2::Country> = lookup_result.decode()?;

        let Some(country) = country else {
            return Ok(CountryInfo::default());
        };

        Ok(CountryInfo {
            code: country.country.iso_code.map(String::from),
            name: country.country.names.english.map(String::from),
        })
    }

    /// Fill in country fields for candidates whose source left them blank.
    ///
    /// Hostnames and addresses missing from the database are skipped.
    pub fn enrich(&self, candidates: &mut [Candidate]) {
        for candidate in candidates {
            if !candidate.country_code.is_empty() {
                continue;
            }
            let Ok(ip) = candidate.host.parse::<IpAddr>() else {
                continue;
            };
            match self.lookup(ip) {
                Ok(info) => {
                    if let Some(code) = info.code {
                        candidate.country_code = code;
                    }
                    if let Some(name) = info.name {
                        candidate.country_name = name;
                    }
                }
                Err(e) => {
                    log::trace!("geo lookup failed for {}: {}", candidate.host, e);
                }
            }
        }
    }
}

impl Clone for GeoLocator {
    fn clone(&self) -> Self {
        Self {
            reader: Arc::clone(&self.reader),
        }
    }
}
