//! Proxy data models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proxy protocol, used both as a probe transport hint and as the port-based guess
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Http,
    Https,
    Socks4,
    Socks5,
}

impl Protocol {
    /// Guess the protocol from the port number alone
    pub fn from_port(port: u16) -> Self {
        match port {
            1080 | 1081 => Protocol::Socks5,
            1082 | 1083 | 1085 => Protocol::Socks4,
            443 | 8443 => Protocol::Https,
            _ => Protocol::Http,
        }
    }

    /// Upper-case protocol name as shown in reports
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Http => "HTTP",
            Protocol::Https => "HTTPS",
            Protocol::Socks4 => "SOCKS4",
            Protocol::Socks5 => "SOCKS5",
        }
    }

    /// URL scheme used to route a probe through a proxy of this kind.
    ///
    /// Only SOCKS5 gets a SOCKS transport; every other hint is forwarded as a
    /// plain HTTP proxy.
    pub fn proxy_scheme(&self) -> &'static str {
        match self {
            Protocol::Socks5 => "socks5",
            _ => "http",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Http => write!(f, "http"),
            Protocol::Https => write!(f, "https"),
            Protocol::Socks4 => write!(f, "socks4"),
            Protocol::Socks5 => write!(f, "socks5"),
        }
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "socks4" => Ok(Protocol::Socks4),
            "socks5" => Ok(Protocol::Socks5),
            _ => Err(format!(
                "Invalid proxy type: {}. Use: http, https, socks4, socks5",
                s
            )),
        }
    }
}

/// A host:port pair believed to be a usable proxy.
///
/// Equality, hashing and ordering follow the canonical `host:port` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub host: String,
    pub port: u16,
}

impl EndpointCandidate {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Canonical `host:port` form
    pub fn canonical(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Proxy URL for routing a request through this candidate
    pub fn url(&self, hint: Protocol) -> String {
        format!("{}://{}:{}", hint.proxy_scheme(), self.host, self.port)
    }
}

impl fmt::Display for EndpointCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anonymity {
    High,
    Elite,
}

impl fmt::Display for Anonymity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anonymity::High => write!(f, "High"),
            Anonymity::Elite => write!(f, "Elite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Live,
    Dead,
}

/// Result of one probe attempt through a candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub candidate: EndpointCandidate,
    pub latency_ms: u64,
    /// Derived from the port number, independent of the probe transport
    pub protocol: Protocol,
    pub country: String,
    pub city: String,
    pub isp: String,
    pub org: String,
    pub as_number: String,
    pub anonymity: Anonymity,
    pub outcome: Outcome,
}

impl ProbeResult {
    pub fn is_live(&self) -> bool {
        self.outcome == Outcome::Live
    }

    /// One-line summary: `host:port | country | <ms>ms | PROTOCOL`
    pub fn summary_line(&self) -> String {
        format!(
            "{} | {} | {}ms | {}",
            self.candidate,
            self.country,
            self.latency_ms,
            self.protocol.label()
        )
    }
}
