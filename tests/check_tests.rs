mod common;

use async_trait::async_trait;
use parking_lot::Mutex;
use proxy_master::{
    Anonymity, CheckEvent, CheckerConfig, EndpointCandidate, HttpProber, Outcome, Probe,
    ProbeResult, Protocol, ProxyChecker, ResultStore,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const REFLECTOR_URL: &str = "http://reflector.test/json";

fn candidate(addr: SocketAddr) -> EndpointCandidate {
    EndpointCandidate::new(addr.ip().to_string(), addr.port())
}

fn prober(timeout: Duration) -> HttpProber {
    HttpProber::new(timeout, Protocol::Http, REFLECTOR_URL)
}

#[tokio::test]
async fn live_proxy_yields_metadata() {
    let proxy = common::spawn_responder(200, common::REFLECTOR_BODY).await;

    let result = prober(Duration::from_secs(5))
        .probe(&candidate(proxy))
        .await
        .expect("proxy should be live");

    assert_eq!(result.candidate, candidate(proxy));
    assert_eq!(result.outcome, Outcome::Live);
    assert_eq!(result.country, "United States");
    assert_eq!(result.city, "Ashburn");
    assert_eq!(result.isp, "Example Cloud");
    assert_eq!(result.org, "Example Org");
    assert_eq!(result.as_number, "AS64500 Example Cloud");
    assert_eq!(result.anonymity, Anonymity::Elite);
    assert_eq!(result.protocol, Protocol::from_port(proxy.port()));
}

#[tokio::test]
async fn non_200_reflector_answer_is_dead() {
    let proxy = common::spawn_responder(502, "bad gateway").await;
    assert!(prober(Duration::from_secs(5)).probe(&candidate(proxy)).await.is_none());
}

#[tokio::test]
async fn undecodable_body_is_dead() {
    let proxy = common::spawn_responder(200, "<html>captive portal</html>").await;
    assert!(prober(Duration::from_secs(5)).probe(&candidate(proxy)).await.is_none());
}

#[tokio::test]
async fn timed_out_probe_counts_one_dead() {
    let proxy = common::spawn_silent().await;
    let config = CheckerConfig::new()
        .with_timeout(Duration::from_millis(300))
        .with_reflector_url(REFLECTOR_URL.to_string());
    let checker = ProxyChecker::with_config(config).unwrap();

    let summary = checker.run(vec![candidate(proxy)], &proxy_master::NoopSink).await.unwrap();

    assert_eq!(summary.stats.checked, 1);
    assert_eq!(summary.stats.dead, 1);
    assert_eq!(summary.stats.live, 0);
    assert!(summary.live.is_empty());
}

#[tokio::test]
async fn mixed_run_keeps_only_live_results() {
    let live_a = common::spawn_responder(200, common::REFLECTOR_BODY).await;
    let live_b = common::spawn_responder(200, r#"{"country":"Vietnam"}"#).await;
    let forbidden = common::spawn_responder(403, "denied").await;
    let silent = common::spawn_silent().await;

    let mut candidates = vec![
        candidate(live_a),
        candidate(live_b),
        candidate(forbidden),
        candidate(silent),
        EndpointCandidate::new("127.0.0.1", common::closed_port()),
    ];
    candidates.sort();

    let config = CheckerConfig::new()
        .with_timeout(Duration::from_millis(500))
        .with_concurrency(3)
        .with_reflector_url(REFLECTOR_URL.to_string());
    let checker = ProxyChecker::with_config(config).unwrap();

    let sink = Mutex::new(Vec::new());
    let summary = checker.run(candidates, &sink).await.unwrap();

    assert_eq!(summary.stats.total, 5);
    assert_eq!(summary.stats.checked, 5);
    assert_eq!(summary.stats.live, 2);
    assert_eq!(summary.stats.dead, 3);
    assert_eq!(summary.live.len(), summary.stats.live);
    assert!(summary.live.iter().all(|r| r.is_live()));

    let events = sink.into_inner();
    assert_eq!(events.len(), 6);
    for event in &events[..5] {
        let CheckEvent::Probed(progress) = event else {
            panic!("unexpected terminal event before all probes");
        };
        assert_eq!(progress.stats.checked, progress.stats.live + progress.stats.dead);
        assert!(progress.stats.checked <= progress.stats.total);
    }
    assert!(matches!(events.last(), Some(CheckEvent::Finished(_))));

    let store = ResultStore::from_live(summary.live);
    assert_eq!(store.by_country().len(), 2);
    assert_eq!(store.by_country()["Vietnam"][0].city, "Unknown");
}

#[tokio::test]
async fn socks5_hint_changes_transport() {
    let proxy = common::spawn_responder(200, common::REFLECTOR_BODY).await;
    let target = candidate(proxy);

    let http = HttpProber::new(Duration::from_secs(2), Protocol::Http, REFLECTOR_URL);
    assert!(http.try_probe(&target).await.is_ok());

    // The responder speaks HTTP only, so a SOCKS5 handshake against it cannot succeed
    let socks = HttpProber::new(Duration::from_secs(2), Protocol::Socks5, REFLECTOR_URL);
    assert_eq!(socks.hint(), Protocol::Socks5);
    assert!(socks.try_probe(&target).await.is_err());
    assert!(socks.probe(&target).await.is_none());
}

/// Blocks its thread while probing; every candidate is live
#[derive(Default)]
struct BlockingProber {
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Probe for BlockingProber {
    async fn probe(&self, candidate: &EndpointCandidate) -> Option<ProbeResult> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(150));
        self.active.fetch_sub(1, Ordering::SeqCst);

        Some(ProbeResult {
            candidate: candidate.clone(),
            latency_ms: 150,
            protocol: Protocol::from_port(candidate.port),
            country: "Vietnam".to_string(),
            city: "Hanoi".to_string(),
            isp: "Unknown".to_string(),
            org: "Unknown".to_string(),
            as_number: "Unknown".to_string(),
            anonymity: Anonymity::Elite,
            outcome: Outcome::Live,
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn candidates_are_probed_on_parallel_workers() {
    let candidates: Vec<_> = (1..=8u16)
        .map(|port| EndpointCandidate::new("10.3.0.1", 9000 + port))
        .collect();
    let checker = ProxyChecker::with_prober(
        CheckerConfig::new().with_concurrency(8),
        BlockingProber::default(),
    );

    let sink = Mutex::new(Vec::new());
    let start = Instant::now();
    let summary = checker.run(candidates, &sink).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(summary.stats.checked, 8);
    assert_eq!(summary.stats.live, 8);
    assert_eq!(summary.live.len(), 8);
    // eight sequential probes would take 1.2s
    assert!(elapsed < Duration::from_millis(700), "took {:?}", elapsed);

    for event in sink.into_inner() {
        if let CheckEvent::Probed(progress) = event {
            assert_eq!(progress.stats.checked, progress.stats.live + progress.stats.dead);
        }
    }
}
