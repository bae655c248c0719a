//! Offline geolocation from a MaxMind database, used to fill in the location
//! fields the reflector left unknown

use crate::Result;
use maxminddb::{geoip2, Reader};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

/// Placeholder for metadata the reflector or database did not provide
pub const UNKNOWN: &str = "Unknown";

/// Geographic location information for an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoLocation {
    /// Country name in English
    pub country_name: Option<String>,
    /// City name in English
    pub city_name: Option<String>,
}

impl GeoLocation {
    pub fn is_empty(&self) -> bool {
        self.country_name.is_none() && self.city_name.is_none()
    }

    /// Replace `Unknown` values in place with what this location knows
    pub fn fill_unknown(&self, country: &mut String, city: &mut String) {
        if country == UNKNOWN {
            if let Some(name) = &self.country_name {
                *country = name.clone();
            }
        }
        if city == UNKNOWN {
            if let Some(name) = &self.city_name {
                *city = name.clone();
            }
        }
    }
}

/// GeoLocator for looking up IP addresses in MMDB databases
#[derive(Clone)]
pub struct GeoLocator {
    reader: Arc<Reader<Vec<u8>>>,
}

impl GeoLocator {
    /// Open an MMDB file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader: Arc::new(reader),
        })
    }

    /// Look up the location of a host given as an IP address string
    pub fn lookup(&self, host: &str) -> Result<GeoLocation> {
        let ip: IpAddr = host.parse()?;
        let lookup_result = self.reader.lookup(ip)?;

        let city: Option<geoip2::City> = lookup_result.decode()?;
        let Some(city) = city else {
            return Ok(GeoLocation::default());
        };

        Ok(GeoLocation {
            country_name: city.country.names.english.map(String::from),
            city_name: city.city.names.english.map(String::from),
        })
    }
}
