//! Registry of remote proxy list sources

use crate::error::PipelineError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Layout of a source's response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SourceFormat {
    /// One `ip:port` per line
    #[default]
    PlainList,
}

/// A remote text list of proxies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub url: String,
    pub format: SourceFormat,
}

impl SourceDescriptor {
    pub fn plain(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: SourceFormat::PlainList,
        }
    }
}

const DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://api.proxyscrape.com/?request=displayproxies&proxytype=http",
    "https://api.proxyscrape.com/?request=displayproxies&proxytype=https",
    "https://api.openproxylist.xyz/http.txt",
    "https://openproxylist.xyz/http.txt",
    "http://worm.rip/http.txt",
    "http://rootjazz.com/proxies/proxies.txt",
    "https://proxy-spider.com/api/proxies.example.txt",
    "https://proxyspace.pro/http.txt",
    "https://proxyspace.pro/https.txt",
    "https://www.proxy-list.download/api/v1/get?type=http",
    "https://www.proxy-list.download/api/v1/get?type=https",
    "https://sunny9577.github.io/proxy-scraper/proxies.txt",
    "https://sunny9577.github.io/proxy-scraper/generated/http_proxies.txt",
    "https://vakhov.github.io/fresh-proxy-list/http.txt",
    "https://raw.githubusercontent.com/proxy4parsing/proxy-list/main/http.txt",
    "https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-https.txt",
    "https://raw.githubusercontent.com/jetkai/proxy-list/main/online-proxies/txt/proxies-http.txt",
    "https://raw.githubusercontent.com/roosterkid/openproxylist/main/HTTPS_RAW.txt",
    "https://raw.githubusercontent.com/TheSpeedX/PROXY-List/master/http.txt",
    "https://raw.githubusercontent.com/TheSpeedX/SOCKS-List/master/http.txt",
    "https://raw.githubusercontent.com/mmpx12/proxy-list/master/http.txt",
    "https://raw.githubusercontent.com/mmpx12/proxy-list/master/https.txt",
    "https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/http.txt",
    "https://raw.githubusercontent.com/ShiftyTR/Proxy-List/master/https.txt",
    "https://raw.githubusercontent.com/shiftytr/proxy-list/master/proxy.txt",
    "https://raw.githubusercontent.com/almroot/proxylist/master/list.txt",
    "https://raw.githubusercontent.com/monosans/proxy-list/main/proxies_anonymous/http.txt",
    "https://raw.githubusercontent.com/monosans/proxy-list/refs/heads/main/proxies/http.txt",
    "https://raw.githubusercontent.com/clarketm/proxy-list/master/proxy-list-raw.txt",
    "https://raw.githubusercontent.com/sunny9577/proxy-scraper/master/proxies.txt",
    "https://raw.githubusercontent.com/opsxcq/proxy-list/master/list.txt",
    "https://raw.githubusercontent.com/aslisk/proxyhttps/main/https.txt",
    "https://raw.githubusercontent.com/B4RC0DE-TM/proxy-list/main/HTTP.txt",
    "https://raw.githubusercontent.com/hendrikbgr/Free-Proxy-Repo/master/proxy_list.txt",
    "https://raw.githubusercontent.com/ALIILAPRO/Proxy/main/http.txt",
    "https://raw.githubusercontent.com/Skiddle-ID/proxylist/refs/heads/main/generated/http_proxies.txt",
    "https://raw.githubusercontent.com/Skiddle-ID/proxylist/refs/heads/main/generated/socks4_proxies.txt",
    "https://raw.githubusercontent.com/fahimscirex/proxybd/refs/heads/master/proxylist/http.txt",
    "https://raw.githubusercontent.com/yemixzy/proxy-list/refs/heads/main/proxies/http.txt",
    "https://raw.githubusercontent.com/yemixzy/proxy-list/refs/heads/main/proxies/socks4.txt",
    "https://raw.githubusercontent.com/yemixzy/proxy-list/refs/heads/main/proxies/unchecked.txt",
    "https://raw.githubusercontent.com/TuanMinPay/live-proxy/refs/heads/master/http.txt",
    "https://raw.githubusercontent.com/TuanMinPay/live-proxy/refs/heads/master/all.txt",
    "https://raw.githubusercontent.com/TuanMinPay/live-proxy/refs/heads/master/socks4.txt",
    "https://raw.githubusercontent.com/Vann-Dev/proxy-list/refs/heads/main/proxies/http.txt",
    "https://raw.githubusercontent.com/Vann-Dev/proxy-list/refs/heads/main/proxies/https.txt",
    "https://raw.githubusercontent.com/r00tee/Proxy-List/main/Https.txt",
    "https://github.com/zloi-user/hideip.me/raw/refs/heads/master/http.txt",
    "https://github.com/zloi-user/hideip.me/raw/refs/heads/master/https.txt",
    "https://raw.githubusercontent.com/zloi-user/hideip.me/main/http.txt",
    "https://raw.githubusercontent.com/zloi-user/hideip.me/main/https.txt",
    "https://raw.githubusercontent.com/dpangestuw/Free-Proxy/refs/heads/main/All_proxies.txt",
    "https://raw.githubusercontent.com/dpangestuw/Free-Proxy/refs/heads/main/http_proxies.txt",
    "https://raw.githubusercontent.com/Zaeem20/FREE_PROXIES_LIST/master/http.txt",
    "https://raw.githubusercontent.com/Zaeem20/FREE_PROXIES_LIST/refs/heads/master/http.txt",
    "https://raw.githubusercontent.com/Zaeem20/FREE_PROXIES_LIST/refs/heads/master/https.txt",
    "https://raw.githubusercontent.com/ErcinDedeoglu/proxies/refs/heads/main/proxies/http.txt",
    "https://raw.githubusercontent.com/ErcinDedeoglu/proxies/refs/heads/main/proxies/https.txt",
    "https://raw.githubusercontent.com/BreakingTechFr/Proxy_Free/main/proxies/http.txt",
    "https://raw.githubusercontent.com/proxifly/free-proxy-list/main/proxies/protocols/http/data.txt",
    "https://raw.githubusercontent.com/proxifly/free-proxy-list/refs/heads/main/proxies/protocols/https/data.txt",
    "https://raw.githubusercontent.com/vakhov/fresh-proxy-list/master/http.txt",
    "https://raw.githubusercontent.com/vakhov/fresh-proxy-list/master/https.txt",
    "https://raw.githubusercontent.com/MuRongPIG/Proxy-Master/main/http.txt",
    "https://raw.githubusercontent.com/saisuiu/uiu/main/free.txt",
    "https://raw.githubusercontent.com/saisuiu/Lionkings-Http-Proxys-Proxies/main/free.txt",
    "https://raw.githubusercontent.com/saisuiu/Lionkings-Http-Proxys-Proxies/main/cnfree.txt",
    "https://raw.githubusercontent.com/rdavydov/proxy-list/main/proxies/http.txt",
    "https://raw.githubusercontent.com/rdavydov/proxy-list/main/proxies_anonymous/http.txt",
    "https://raw.githubusercontent.com/zevtyardt/proxy-list/main/http.txt",
    "https://raw.githubusercontent.com/mmpx12/proxy-list/refs/heads/master/http.txt",
    "https://raw.githubusercontent.com/mmpx12/proxy-list/refs/heads/master/https.txt",
];

/// Built-in list of free proxy sources
pub fn default_sources() -> Vec<SourceDescriptor> {
    DEFAULT_SOURCE_URLS
        .iter()
        .map(|url| SourceDescriptor::plain(*url))
        .collect()
}

/// Wrap user-supplied URLs as plain-list sources
pub fn from_urls<I, S>(urls: I) -> Vec<SourceDescriptor>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    urls.into_iter().map(SourceDescriptor::plain).collect()
}

/// Read source URLs from a file, one per line. Blank lines and `#` comments are skipped.
///
/// A file without any URL is an error, like an unreadable one.
pub fn load_sources_file<P: AsRef<Path>>(path: P) -> Result<Vec<SourceDescriptor>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| PipelineError::UnreadableInput {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let sources: Vec<_> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(SourceDescriptor::plain)
        .collect();

    if sources.is_empty() {
        return Err(PipelineError::NoSources.into());
    }
    Ok(sources)
}

/// Combine command-line URLs and a sources file. The built-in list is used when
/// neither was given, or in addition to them when `with_defaults` is set.
pub fn resolve_sources(
    urls: &[String],
    sources_file: Option<&Path>,
    with_defaults: bool,
) -> Result<Vec<SourceDescriptor>> {
    let mut selected = from_urls(urls.iter().cloned());

    if let Some(path) = sources_file {
        let from_file = load_sources_file(path)?;
        info!("Loaded {} URLs from {:?}", from_file.len(), path);
        selected.extend(from_file);
    }

    if (urls.is_empty() && sources_file.is_none()) || with_defaults {
        selected.extend(default_sources());
    }

    Ok(selected)
}
