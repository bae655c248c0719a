//! Writers for the live-result collections: plain lists, grouped lists, JSON and CSV

use crate::proxy::models::ProbeResult;
use crate::proxy::store::ResultStore;
use crate::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Flat record exposing every field of a probe result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub host: String,
    pub port: u16,
    pub country: String,
    pub city: String,
    pub isp: String,
    pub org: String,
    #[serde(rename = "as")]
    pub as_number: String,
    pub latency_ms: u64,
    pub protocol: String,
    pub anonymity: String,
    pub outcome: String,
}

impl From<&ProbeResult> for ExportRecord {
    fn from(r: &ProbeResult) -> Self {
        Self {
            host: r.candidate.host.clone(),
            port: r.candidate.port,
            country: r.country.clone(),
            city: r.city.clone(),
            isp: r.isp.clone(),
            org: r.org.clone(),
            as_number: r.as_number.clone(),
            latency_ms: r.latency_ms,
            protocol: r.protocol.label().to_string(),
            anonymity: r.anonymity.to_string(),
            outcome: if r.is_live() { "LIVE" } else { "DEAD" }.to_string(),
        }
    }
}

/// Turn a group key into a file-name-safe stem: spaces and path separators
/// become underscores
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Default export file name with a local timestamp, e.g. `live_proxies_20240101_120000.json`
pub fn timestamped_name(prefix: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, Local::now().format("%Y%m%d_%H%M%S"), extension)
}

fn write_lines<P, I>(path: P, lines: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = String>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

/// One `host:port` per line
pub fn write_plain<P: AsRef<Path>>(path: P, results: &[ProbeResult]) -> Result<()> {
    write_lines(path, results.iter().map(|r| r.candidate.canonical()))
}

/// One `host:port | country | <ms>ms | PROTOCOL` per line
pub fn write_summary<P: AsRef<Path>>(path: P, results: &[ProbeResult]) -> Result<()> {
    write_lines(path, results.iter().map(ProbeResult::summary_line))
}

/// Pretty JSON array of flat records
pub fn write_json<P: AsRef<Path>>(path: P, results: &[ProbeResult]) -> Result<()> {
    let records: Vec<ExportRecord> = results.iter().map(ExportRecord::from).collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

/// CSV with a header row, records sorted by latency
pub fn write_csv<P: AsRef<Path>>(path: P, results: &[ProbeResult]) -> Result<()> {
    let mut sorted: Vec<&ProbeResult> = results.iter().collect();
    sorted.sort_by_key(|r| r.latency_ms);

    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    for result in sorted {
        writer.serialize(ExportRecord::from(result))?;
    }
    writer.flush()?;
    Ok(())
}

/// Return `stem`, or `stem_2`, `stem_3`, ... when an earlier group already
/// claimed it. Names are compared case-insensitively.
fn claim_stem(stem: String, used: &mut HashSet<String>) -> String {
    if used.insert(stem.to_lowercase()) {
        return stem;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if used.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n += 1;
    }
}

/// Write `live_proxies.txt`, one `live_<protocol>.txt` per protocol group and one
/// `live_<Country>.txt` per country group into `dir`. Returns the written paths.
///
/// Every group gets its own file: a country whose name maps onto an already
/// written file gets a numeric suffix.
pub fn write_grouped<P: AsRef<Path>>(dir: P, store: &ResultStore) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    let mut used = HashSet::new();

    let stem = claim_stem("proxies".to_string(), &mut used);
    let all_path = dir.join(format!("live_{}.txt", stem));
    write_plain(&all_path, store.all())?;
    written.push(all_path);

    for (protocol, results) in store.by_protocol() {
        let stem = claim_stem(protocol.to_string(), &mut used);
        let path = dir.join(format!("live_{}.txt", stem));
        write_plain(&path, results)?;
        written.push(path);
    }

    for (country, results) in store.by_country() {
        let stem = claim_stem(safe_file_stem(country), &mut used);
        let path = dir.join(format!("live_{}.txt", stem));
        write_plain(&path, results)?;
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::models::{Anonymity, EndpointCandidate, Outcome, Protocol};

    fn live(host: &str, country: &str) -> ProbeResult {
        ProbeResult {
            candidate: EndpointCandidate::new(host, 8080),
            latency_ms: 100,
            protocol: Protocol::Http,
            country: country.to_string(),
            city: "Unknown".to_string(),
            isp: "Unknown".to_string(),
            org: "Unknown".to_string(),
            as_number: "Unknown".to_string(),
            anonymity: Anonymity::Elite,
            outcome: Outcome::Live,
        }
    }

    #[test]
    fn test_claim_stem() {
        let mut used = HashSet::new();
        assert_eq!(claim_stem("Vietnam".to_string(), &mut used), "Vietnam");
        assert_eq!(claim_stem("vietnam".to_string(), &mut used), "vietnam_2");
        assert_eq!(claim_stem("VIETNAM".to_string(), &mut used), "VIETNAM_3");
    }

    #[test]
    fn test_grouped_files_never_overwrite_each_other() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::from_live(vec![
            live("1.1.1.1", "Bosnia/Herzegovina"),
            live("2.2.2.2", "Bosnia Herzegovina"),
            live("3.3.3.3", "proxies"),
            live("4.4.4.4", "HTTP"),
        ]);

        let written = write_grouped(dir.path(), &store).unwrap();
        // all, one protocol group, four country groups
        assert_eq!(written.len(), 6);
        let unique: HashSet<_> = written.iter().collect();
        assert_eq!(unique.len(), written.len());

        let all = fs::read_to_string(dir.path().join("live_proxies.txt")).unwrap();
        assert_eq!(all.lines().count(), 4);
        let http = fs::read_to_string(dir.path().join("live_http.txt")).unwrap();
        assert_eq!(http.lines().count(), 4);

        assert!(dir.path().join("live_Bosnia_Herzegovina.txt").exists());
        assert!(dir.path().join("live_Bosnia_Herzegovina_2.txt").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("live_proxies_2.txt")).unwrap(),
            "3.3.3.3:8080\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("live_HTTP_2.txt")).unwrap(),
            "4.4.4.4:8080\n"
        );
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("United States"), "United_States");
        assert_eq!(safe_file_stem("Bosnia/Herzegovina"), "Bosnia_Herzegovina");
        assert_eq!(safe_file_stem("Vietnam"), "Vietnam");
    }

    #[test]
    fn test_timestamped_name() {
        let name = timestamped_name("live_proxies", "json");
        assert!(name.starts_with("live_proxies_"));
        assert!(name.ends_with(".json"));
        assert_eq!(name.len(), "live_proxies_".len() + 15 + ".json".len());
    }
}
