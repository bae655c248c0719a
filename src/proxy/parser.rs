//! Line parsers for proxy candidates
//!
//! Two acceptance rules exist side by side:
//! - [`ProxyParser::parse_line`] is the strict validator applied to scraped text:
//!   exactly `a.b.c.d:port` with every octet in 0..=255 and port in 1..=65535.
//! - [`ProxyParser::parse_loose_line`] is used when loading a candidate file for a
//!   check-only run: any line with a `:` whose second field is numeric.

use crate::error::PipelineError;
use crate::proxy::models::EndpointCandidate;
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Dotted quad followed by a port, nothing else
static STRICT_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)\.([0-9]+):([0-9]+)$")
        .expect("Invalid strict proxy line regex")
});

/// Proxy parser for parsing candidates from strings and files
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single scraped line with the strict validator.
    ///
    /// The line is trimmed first. The host is split from the port at the first
    /// `:`; anything else on the line makes the port non-numeric and rejects it.
    pub fn parse_line(line: &str) -> Option<EndpointCandidate> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let caps = STRICT_LINE_REGEX.captures(line)?;

        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            *octet = caps[i + 1].parse().ok()?;
        }

        let port: u16 = caps[5].parse().ok()?;
        if port == 0 {
            return None;
        }

        let host = format!("{}.{}.{}.{}", octets[0], octets[1], octets[2], octets[3]);
        Some(EndpointCandidate::new(host, port))
    }

    /// Parse a single line of a candidate file with the loose rule.
    ///
    /// Accepts `host:port` and longer forms like `host:port:user:pass`; only the
    /// host and port are kept. The host itself is not validated.
    pub fn parse_loose_line(line: &str) -> Option<EndpointCandidate> {
        let line = line.trim();
        if line.is_empty() || !line.contains(':') {
            return None;
        }

        let mut parts = line.split(':');
        let host = parts.next()?;
        let port = parts.next()?;

        if host.is_empty() || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let port: u16 = port.parse().ok()?;
        if port == 0 {
            return None;
        }

        Some(EndpointCandidate::new(host, port))
    }

    /// Parse scraped text (multiple lines) with the strict validator
    pub fn parse_string(content: &str) -> Vec<EndpointCandidate> {
        content.lines().filter_map(Self::parse_line).collect()
    }

    /// Load a candidate file for a check-only run.
    ///
    /// Fails when the file cannot be read or yields no accepted line.
    pub fn load_candidates<P: AsRef<Path>>(path: P) -> Result<Vec<EndpointCandidate>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| PipelineError::UnreadableInput {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let candidates: Vec<_> = content
            .lines()
            .filter_map(Self::parse_loose_line)
            .collect();

        if candidates.is_empty() {
            return Err(PipelineError::NoCandidates.into());
        }

        Ok(candidates)
    }

    /// Save candidates to a file, one `host:port` per line
    pub fn save_to_file<P: AsRef<Path>>(candidates: &[EndpointCandidate], path: P) -> Result<()> {
        let mut content: String = candidates
            .iter()
            .map(EndpointCandidate::canonical)
            .collect::<Vec<_>>()
            .join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        fs::write(path, content)?;
        Ok(())
    }
}
