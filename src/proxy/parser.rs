//! Parsing candidate lists from text and files

use crate::proxy::models::Candidate;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Matches `scheme://host:port` lines
static URL_LINE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?)://([^\s:/]+):(\d{1,5})/?$").expect("Invalid URL regex"));

/// Parser for plain-text candidate lists
pub struct CandidateParser;

impl CandidateParser {
    /// Parse a single line into a candidate.
    ///
    /// Supports formats:
    /// - IP:PORT
    /// - scheme://IP:PORT, where an `https` scheme marks the candidate
    ///   as declaring HTTPS support
    ///
    /// Blank lines and `#` comments yield `None`. Lines without a
    /// scheme inherit `declared_https`.
    pub fn parse_line(line: &str, declared_https: bool) -> Option<Candidate> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        if let Some(candidate) = Self::parse_url_format(line) {
            return Some(candidate);
        }

        Self::parse_colon_format(line, declared_https)
    }

    fn parse_url_format(line: &str) -> Option<Candidate> {
        let caps = URL_LINE_REGEX.captures(line)?;

        let host = caps[2].to_string();
        let port: u16 = caps[3].parse().ok()?;
        if port == 0 {
            return None;
        }

        Some(Candidate::new(host, port).with_https(&caps[1] == "https"))
    }

    fn parse_colon_format(line: &str, declared_https: bool) -> Option<Candidate> {
        let (host, port) = line.split_once(':')?;
        if host.is_empty() || host.contains(char::is_whitespace) {
            return None;
        }

        let port: u16 = port.parse().ok()?;
        if port == 0 {
            return None;
        }

        Some(Candidate::new(host.to_string(), port).with_https(declared_https))
    }

    /// Parse candidates from a string (multiple lines)
    pub fn parse_string(content: &str, declared_https: bool) -> Vec<Candidate> {
        content
            .lines()
            .filter_map(|line| Self::parse_line(line, declared_https))
            .collect()
    }

    /// Parse candidates from a file
    pub fn parse_file<P: AsRef<Path>>(path: P, declared_https: bool) -> Result<Vec<Candidate>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_string(&content, declared_https))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_format() {
        let candidate = CandidateParser::parse_line("192.168.1.1:8080", false).unwrap();
        assert_eq!(candidate.host, "192.168.1.1");
        assert_eq!(candidate.port, 8080);
        assert!(!candidate.declared_https);
    }

    #[test]
    fn test_parse_simple_format_with_declared_https() {
        let candidate = CandidateParser::parse_line("192.168.1.1:8080", true).unwrap();
        assert!(candidate.declared_https);
    }

    #[test]
    fn test_parse_url_format() {
        let candidate = CandidateParser::parse_line("http://192.168.1.1:8080", false).unwrap();
        assert_eq!(candidate.host, "192.168.1.1");
        assert_eq!(candidate.port, 8080);
        assert!(!candidate.declared_https);

        let candidate = CandidateParser::parse_line("https://192.168.1.2:3128", false).unwrap();
        assert!(candidate.declared_https);
    }

    #[test]
    fn test_parse_url_format_trailing_slash() {
        let candidate = CandidateParser::parse_line("http://192.168.1.1:8080/", false).unwrap();
        assert_eq!(candidate.port, 8080);
    }

    #[test]
    fn test_parse_empty_line() {
        assert!(CandidateParser::parse_line("", false).is_none());
        assert!(CandidateParser::parse_line("   ", false).is_none());
    }

    #[test]
    fn test_parse_comment_line() {
        assert!(CandidateParser::parse_line("# a comment", false).is_none());
    }

    #[test]
    fn test_parse_invalid_format() {
        assert!(CandidateParser::parse_line("invalid", false).is_none());
        assert!(CandidateParser::parse_line("192.168.1.1", false).is_none());
        assert!(CandidateParser::parse_line("192.168.1.1:abc", false).is_none());
        assert!(CandidateParser::parse_line("192.168.1.1:0", false).is_none());
        assert!(CandidateParser::parse_line("192.168.1.1:99999", false).is_none());
        assert!(CandidateParser::parse_line("socks5://192.168.1.1:1080", false).is_none());
    }

    #[test]
    fn test_parse_string() {
        let content = r#"
192.168.1.1:8080
# a comment
https://192.168.1.2:3128
not a proxy line
192.168.1.3:80
"#;
        let candidates = CandidateParser::parse_string(content, false);
        assert_eq!(candidates.len(), 3);
        assert!(candidates[1].declared_https);
    }

    #[test]
    fn test_parse_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "192.168.1.1:8080").unwrap();
        writeln!(file, "https://192.168.1.2:3128").unwrap();

        let candidates = CandidateParser::parse_file(file.path(), false).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].endpoint(), "192.168.1.1:8080");
        assert!(candidates[1].declared_https);
    }
}
