//! Output sinks: console printer and CSV files

use crate::proxy::models::{Candidate, WorkingProxy};
use crate::Result;
use std::fs;
use std::path::Path;

/// Header row for the working-proxy CSV
const WORKING_CSV_HEADER: &str = "IP,Port,Country,Anonymity,Protocol";

/// Header row for the raw candidate CSV
const CANDIDATES_CSV_HEADER: &str = "IP,Port,Code,Country,Anonymity,Https";

/// Print the working-proxy set to stdout
pub fn print_working(proxies: &[WorkingProxy]) {
    println!("\nWorking proxies: {}", proxies.len());
    for proxy in proxies {
        println!("{}", proxy);
    }
}

/// Quote a CSV field when it contains a separator, quote or newline
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(())
}

/// Write the working-proxy set as CSV
pub fn write_working_csv<P: AsRef<Path>>(proxies: &[WorkingProxy], path: P) -> Result<()> {
    let mut content = String::from(WORKING_CSV_HEADER);
    content.push('\n');

    for proxy in proxies {
        content.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&proxy.host),
            proxy.port,
            csv_field(&proxy.country_code),
            csv_field(&proxy.anonymity),
            proxy.protocol,
        ));
    }

    write_file(path, &content)
}

/// Write every scraped candidate as CSV, validated or not
pub fn write_candidates_csv<P: AsRef<Path>>(candidates: &[Candidate], path: P) -> Result<()> {
    let mut content = String::from(CANDIDATES_CSV_HEADER);
    content.push('\n');

    for candidate in candidates {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&candidate.host),
            candidate.port,
            csv_field(&candidate.country_code),
            csv_field(&candidate.country_name),
            csv_field(&candidate.anonymity),
            if candidate.declared_https { "yes" } else { "no" },
        ));
    }

    write_file(path, &content)
}
