// SPDX-License-Identifier: MPL-2.0

//! Local and public address lookup

use super::AddressQuery;
use crate::error::{MonitorError, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::time::Duration;

pub const NOT_CONNECTED: &str = "Not connected";
pub const UNABLE_TO_GET: &str = "Unable to get";

/// `{"ip": "..."}`, as returned by most echo services in JSON mode
#[derive(Debug, Deserialize)]
struct EchoResponse {
    ip: String,
}

/// Outbound HTTP, reduced to what the resolver needs.
pub trait PublicAddressSource {
    fn get_text(&mut self, url: &str, timeout: Duration) -> Result<String>;
}

/// Blocking reqwest client
pub struct HttpTextClient {
    client: reqwest::blocking::Client,
}

impl HttpTextClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl PublicAddressSource for HttpTextClient {
    fn get_text(&mut self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}

/// Accept a bare address or an `{"ip": ...}` object. IPv4 only: an IPv6
/// address does not fit on one panel line.
pub fn parse_public_address(body: &str) -> Result<Ipv4Addr> {
    let body = body.trim();
    if let Ok(addr) = body.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    serde_json::from_str::<EchoResponse>(body)
        .ok()
        .and_then(|echo| echo.ip.trim().parse::<Ipv4Addr>().ok())
        .ok_or_else(|| MonitorError::MalformedAddress(body.chars().take(40).collect()))
}

pub struct AddressResolver {
    public_ip_url: String,
    timeout: Duration,
}

impl AddressResolver {
    pub fn new(public_ip_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            public_ip_url: public_ip_url.into(),
            timeout,
        }
    }

    /// Address on `interface`, else the host's primary address.
    pub fn local_address(&self, query: &mut impl AddressQuery, interface: &str) -> Option<Ipv4Addr> {
        match query.interface_address(interface) {
            Ok(Some(addr)) => return Some(addr),
            Ok(None) => {}
            Err(e) => log::debug!("Address query for {} failed: {}", interface, e),
        }

        match query.primary_local_address() {
            Ok(addr) => addr,
            Err(e) => {
                log::debug!("Primary address query failed: {}", e);
                None
            }
        }
    }

    /// Ask the echo service. A timeout is just another failure.
    pub fn public_address(&self, http: &mut impl PublicAddressSource) -> Result<Ipv4Addr> {
        let body = http.get_text(&self.public_ip_url, self.timeout)?;
        parse_public_address(&body)
    }

    /// Returns `(local, public)` display strings, placeholders included.
    pub fn resolve(
        &self,
        query: &mut impl AddressQuery,
        http: &mut impl PublicAddressSource,
        interface: &str,
    ) -> (String, String) {
        let local = self
            .local_address(query, interface)
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| NOT_CONNECTED.to_string());

        let public = match self.public_address(http) {
            Ok(addr) => addr.to_string(),
            Err(e) => {
                log::warn!("Public address lookup failed: {}", e);
                UNABLE_TO_GET.to_string()
            }
        };

        (local, public)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::testing::{FakeAddressQuery, FakeHttp};

    fn resolver() -> AddressResolver {
        AddressResolver::new("https://echo.test", Duration::from_secs(3))
    }

    #[test]
    fn test_parse_plain_and_json_bodies() {
        assert_eq!(
            parse_public_address("203.0.113.7\n").unwrap(),
            Ipv4Addr::new(203, 0, 113, 7)
        );
        assert_eq!(
            parse_public_address(r#"{"ip":"198.51.100.2"}"#).unwrap(),
            Ipv4Addr::new(198, 51, 100, 2)
        );
        assert!(matches!(
            parse_public_address("<html>rate limited</html>"),
            Err(MonitorError::MalformedAddress(_))
        ));
        assert!(parse_public_address(r#"{"ip":"nope"}"#).is_err());
    }

    #[test]
    fn test_ipv6_bodies_rejected() {
        assert!(matches!(
            parse_public_address("2001:db8:85a3::8a2e:370:7334"),
            Err(MonitorError::MalformedAddress(_))
        ));
        assert!(parse_public_address(r#"{"ip":"2001:db8::1"}"#).is_err());

        let mut query = FakeAddressQuery::default();
        let mut http = FakeHttp::ok("2001:db8:85a3::8a2e:370:7334\n");
        let (_, public) = resolver().resolve(&mut query, &mut http, "wlan0");
        assert_eq!(public, UNABLE_TO_GET);
    }

    #[test]
    fn test_resolve_happy_path() {
        let mut query = FakeAddressQuery::default().with("wlan0", Some(Ipv4Addr::new(192, 168, 1, 20)));
        let mut http = FakeHttp::ok("203.0.113.7");

        let (local, public) = resolver().resolve(&mut query, &mut http, "wlan0");

        assert_eq!(local, "192.168.1.20");
        assert_eq!(public, "203.0.113.7");
        assert_eq!(http.requests, vec![("https://echo.test".to_string(), Duration::from_secs(3))]);
    }

    #[test]
    fn test_local_falls_back_to_primary() {
        let mut query = FakeAddressQuery {
            primary: Some(Ipv4Addr::new(10, 0, 0, 9)),
            ..Default::default()
        };
        let mut http = FakeHttp::ok("203.0.113.7");

        let (local, _) = resolver().resolve(&mut query, &mut http, "wlan0");
        assert_eq!(local, "10.0.0.9");
    }

    #[test]
    fn test_placeholders() {
        let mut query = FakeAddressQuery {
            fail_primary: true,
            ..Default::default()
        }
        .with("wlan0", None);
        let mut http = FakeHttp::failing();

        let (local, public) = resolver().resolve(&mut query, &mut http, "wlan0");
        assert_eq!(local, NOT_CONNECTED);
        assert_eq!(public, UNABLE_TO_GET);

        let mut garbage = FakeHttp::ok("not an address");
        let (_, public) = resolver().resolve(&mut query, &mut garbage, "wlan0");
        assert_eq!(public, UNABLE_TO_GET);
    }
}
