//! Folding probe verdicts into the final working-proxy set

use crate::proxy::models::{Protocol, Verdict, WorkingProxy};
use std::collections::BTreeMap;

/// Reduce verdicts to a deduplicated, endpoint-sorted list of working
/// proxies.
///
/// Dead verdicts are discarded. When several verdicts share an
/// endpoint the record is kept once; HTTPS wins over HTTP, and for
/// equal protocols the first verdict's metadata is kept.
pub fn aggregate(verdicts: Vec<Verdict>) -> Vec<WorkingProxy> {
    let mut by_endpoint: BTreeMap<String, WorkingProxy> = BTreeMap::new();

    for verdict in verdicts {
        let Some(protocol) = verdict.protocol else {
            continue;
        };

        let endpoint = verdict.candidate.endpoint();
        match by_endpoint.get_mut(&endpoint) {
            Some(existing) => {
                if existing.protocol == Protocol::Http && protocol == Protocol::Https {
                    existing.protocol = Protocol::Https;
                }
            }
            None => {
                let candidate = verdict.candidate;
                by_endpoint.insert(
                    endpoint,
                    WorkingProxy {
                        host: candidate.host,
                        port: candidate.port,
                        protocol,
                        country_code: candidate.country_code,
                        anonymity: candidate.anonymity,
                    },
                );
            }
        }
    }

    by_endpoint.into_values().collect()
}
