use proxy_master::export::{self, ExportRecord};
use proxy_master::{Anonymity, EndpointCandidate, Outcome, ProbeResult, Protocol, ProxyParser, ResultStore};
use std::fs;

fn result(host: &str, port: u16, country: &str, latency_ms: u64) -> ProbeResult {
    ProbeResult {
        candidate: EndpointCandidate::new(host, port),
        latency_ms,
        protocol: Protocol::from_port(port),
        country: country.to_string(),
        city: "Unknown".to_string(),
        isp: "Example ISP".to_string(),
        org: "Example Org".to_string(),
        as_number: "AS64500".to_string(),
        anonymity: Anonymity::Elite,
        outcome: Outcome::Live,
    }
}

fn store() -> ResultStore {
    ResultStore::from_live(vec![
        result("1.1.1.1", 8080, "United States", 700),
        result("2.2.2.2", 1080, "Vietnam", 120),
        result("3.3.3.3", 443, "United States", 300),
    ])
}

#[test]
fn grouped_files_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let written = export::write_grouped(dir.path(), &store()).unwrap();

    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    for expected in [
        "live_proxies.txt",
        "live_http.txt",
        "live_https.txt",
        "live_socks5.txt",
        "live_United_States.txt",
        "live_Vietnam.txt",
    ] {
        assert!(names.contains(&expected.to_string()), "missing {}", expected);
    }

    let all = fs::read_to_string(dir.path().join("live_proxies.txt")).unwrap();
    assert_eq!(all, "2.2.2.2:1080\n3.3.3.3:443\n1.1.1.1:8080\n");

    let us = fs::read_to_string(dir.path().join("live_United_States.txt")).unwrap();
    assert_eq!(us.lines().count(), 2);
}

#[test]
fn json_export_has_every_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.json");
    export::write_json(&path, store().all()).unwrap();

    let records: Vec<ExportRecord> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].host, "2.2.2.2");
    assert_eq!(records[0].protocol, "SOCKS5");
    assert_eq!(records[0].as_number, "AS64500");
    assert_eq!(records[0].outcome, "LIVE");
    assert_eq!(records[0].anonymity, "Elite");

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw[0]["as"], "AS64500");
}

#[test]
fn csv_export_sorted_by_latency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("live.csv");
    let unsorted = vec![
        result("1.1.1.1", 8080, "United States", 700),
        result("2.2.2.2", 1080, "Vietnam", 120),
    ];
    export::write_csv(&path, &unsorted).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("host,port,country,city,isp,org,as,latency_ms,protocol,anonymity,outcome")
    );
    assert!(lines.next().unwrap().starts_with("2.2.2.2,1080,Vietnam,"));
    assert!(lines.next().unwrap().starts_with("1.1.1.1,8080,United States,"));
}

#[test]
fn summary_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("summary.txt");
    export::write_summary(&path, store().all()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().next(), Some("2.2.2.2:1080 | Vietnam | 120ms | SOCKS5"));
}

#[test]
fn candidate_file_round_trip_through_loose_loader() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("proxy.txt");
    let candidates = vec![
        EndpointCandidate::new("1.2.3.4", 8080),
        EndpointCandidate::new("5.6.7.8", 3128),
    ];
    ProxyParser::save_to_file(&candidates, &path).unwrap();

    assert_eq!(ProxyParser::load_candidates(&path).unwrap(), candidates);
}

#[test]
fn empty_candidate_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.txt");
    fs::write(&path, "\nno proxies here\n").unwrap();

    let err = ProxyParser::load_candidates(&path).unwrap_err();
    assert_eq!(
        err.downcast_ref::<proxy_master::PipelineError>(),
        Some(&proxy_master::PipelineError::NoCandidates)
    );
}
