//! Single-shot liveness probe through a candidate proxy

use crate::error::ProbeError;
use crate::proxy::geo::{GeoLocator, UNKNOWN};
use crate::proxy::models::{Anonymity, EndpointCandidate, Outcome, ProbeResult, Protocol};
use async_trait::async_trait;
use reqwest::{Client, Proxy as ReqwestProxy, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// IP-geolocation service queried through each candidate
pub const DEFAULT_REFLECTOR_URL: &str = "http://ip-api.com/json";

const PROBE_USER_AGENT: &str = "Mozilla/5.0";

/// Probes one candidate
#[async_trait]
pub trait Probe: Send + Sync {
    /// `Some` when the candidate is live, `None` when it is dead
    async fn probe(&self, candidate: &EndpointCandidate) -> Option<ProbeResult>;
}

/// Body of the reflector response. Fields that are missing or not strings
/// decode as `None`.
#[derive(Debug, Default, Deserialize)]
struct ReflectorInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    country: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    city: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    isp: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    org: Option<String>,
    #[serde(default, rename = "as", deserialize_with = "lenient_string")]
    as_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    proxy: bool,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s == "true",
        _ => false,
    })
}

fn or_unknown(value: Option<String>) -> String {
    value.unwrap_or_else(|| UNKNOWN.to_string())
}

/// Build a live result from a decoded reflector body
fn live_result(candidate: &EndpointCandidate, latency_ms: u64, info: ReflectorInfo) -> ProbeResult {
    ProbeResult {
        candidate: candidate.clone(),
        latency_ms,
        protocol: Protocol::from_port(candidate.port),
        anonymity: if info.proxy {
            Anonymity::High
        } else {
            Anonymity::Elite
        },
        country: or_unknown(info.country),
        city: or_unknown(info.city),
        isp: or_unknown(info.isp),
        org: or_unknown(info.org),
        as_number: or_unknown(info.as_number),
        outcome: Outcome::Live,
    }
}

/// Decode a reflector body into a live result
pub fn parse_reflector_body(
    candidate: &EndpointCandidate,
    latency_ms: u64,
    body: &[u8],
) -> Result<ProbeResult, ProbeError> {
    let info: ReflectorInfo =
        serde_json::from_slice(body).map_err(|e| ProbeError::Decode(e.to_string()))?;
    Ok(live_result(candidate, latency_ms, info))
}

/// Probes candidates by fetching the reflector through them
#[derive(Clone)]
pub struct HttpProber {
    timeout: Duration,
    hint: Protocol,
    reflector_url: String,
    geo_locator: Option<GeoLocator>,
}

impl HttpProber {
    pub fn new(timeout: Duration, hint: Protocol, reflector_url: impl Into<String>) -> Self {
        Self {
            timeout,
            hint,
            reflector_url: reflector_url.into(),
            geo_locator: None,
        }
    }

    pub fn with_geo_locator(mut self, geo_locator: GeoLocator) -> Self {
        self.geo_locator = Some(geo_locator);
        self
    }

    pub fn hint(&self) -> Protocol {
        self.hint
    }

    /// One probe attempt, with the reason when the candidate is dead
    pub async fn try_probe(&self, candidate: &EndpointCandidate) -> Result<ProbeResult, ProbeError> {
        let client = self.create_client(candidate)?;

        let exchange = async {
            let start = Instant::now();
            let response = client.get(&self.reflector_url).send().await?;
            let latency_ms = start.elapsed().as_millis() as u64;

            let status = response.status();
            if status != StatusCode::OK {
                return Err(ProbeError::HttpStatus(status.as_u16()));
            }

            let body = response.bytes().await?;
            Ok::<_, ProbeError>((latency_ms, body))
        };

        let (latency_ms, body) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ProbeError::Timeout)??;

        let mut result = parse_reflector_body(candidate, latency_ms, &body)?;

        if let Some(ref geo) = self.geo_locator {
            if let Ok(location) = geo.lookup(&candidate.host) {
                location.fill_unknown(&mut result.country, &mut result.city);
            }
        }

        Ok(result)
    }

    /// Create a reqwest client routed through the candidate
    fn create_client(&self, candidate: &EndpointCandidate) -> Result<Client, ProbeError> {
        let proxy = ReqwestProxy::all(candidate.url(self.hint))
            .map_err(|e| ProbeError::Other(e.to_string()))?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .user_agent(PROBE_USER_AGENT)
            .build()
            .map_err(|e| ProbeError::Other(e.to_string()))
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, candidate: &EndpointCandidate) -> Option<ProbeResult> {
        match self.try_probe(candidate).await {
            Ok(result) => Some(result),
            Err(e) => {
                debug!(proxy = %candidate, error = %e, "probe failed");
                None
            }
        }
    }
}
