//! Trusted proxy addresses
//!
//! Proxy hops on private (RFC1918), unique-local and loopback addresses are
//! trusted when picking the client address out of an `X-Forwarded-For`
//! header. The set is fixed and not configurable.

use regex::RegexSet;
use serde::{Serialize, Serializer};

/// Address patterns of trusted proxy hops
pub const TRUSTED_PROXY_PATTERNS: &[&str] = &[
    r"^127\.0\.0\.1$",
    r"^::1$",
    r"^fc00:",
    r"^10\.",
    r"^172\.(1[6-9]|2[0-9]|3[0-1])\.",
    r"^192\.168\.",
];

#[derive(Debug, Clone)]
pub struct TrustedProxies {
    set: RegexSet,
}

impl Default for TrustedProxies {
    fn default() -> Self {
        Self {
            set: RegexSet::new(TRUSTED_PROXY_PATTERNS).expect("built-in proxy patterns are valid"),
        }
    }
}

impl PartialEq for TrustedProxies {
    fn eq(&self, other: &Self) -> bool {
        self.patterns() == other.patterns()
    }
}

impl TrustedProxies {
    pub fn patterns(&self) -> &[String] {
        self.set.patterns()
    }

    /// Whether a hop address belongs to a trusted proxy
    pub fn is_trusted(&self, addr: &str) -> bool {
        self.set.is_match(addr.trim())
    }

    /// Pick the client address from an `X-Forwarded-For` value.
    ///
    /// Walks from the directly connected `peer` towards the left of the
    /// header and returns the first hop that is not a trusted proxy. When
    /// every hop is trusted the left-most address is the client.
    pub fn client_addr<'a>(&self, forwarded_for: &'a str, peer: &'a str) -> &'a str {
        let hops: Vec<&str> = forwarded_for
            .split(',')
            .map(str::trim)
            .filter(|hop| !hop.is_empty())
            .chain(std::iter::once(peer.trim()))
            .collect();

        hops.iter()
            .rev()
            .find(|hop| !self.is_trusted(hop))
            .or_else(|| hops.first())
            .copied()
            .unwrap_or(peer)
    }
}

impl Serialize for TrustedProxies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.patterns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trusted_ranges() {
        let proxies = TrustedProxies::default();

        for addr in [
            "127.0.0.1",
            "::1",
            "fc00::1",
            "10.1.2.3",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.1.10",
        ] {
            assert!(proxies.is_trusted(addr), "{} should be trusted", addr);
        }

        for addr in ["8.8.8.8", "172.15.0.1", "172.32.0.1", "127.0.0.2", "192.169.0.1"] {
            assert!(!proxies.is_trusted(addr), "{} should not be trusted", addr);
        }
    }

    #[test]
    fn test_client_addr_skips_trusted_hops() {
        let proxies = TrustedProxies::default();

        assert_eq!(
            proxies.client_addr("203.0.113.7, 10.0.0.5", "127.0.0.1"),
            "203.0.113.7"
        );
        // A spoofed left-most entry is ignored once an untrusted hop is found
        assert_eq!(
            proxies.client_addr("1.1.1.1, 198.51.100.2, 192.168.0.3", "10.0.0.1"),
            "198.51.100.2"
        );
    }

    #[test]
    fn test_client_addr_untrusted_peer() {
        let proxies = TrustedProxies::default();
        assert_eq!(proxies.client_addr("203.0.113.7", "198.51.100.9"), "198.51.100.9");
    }

    #[test]
    fn test_client_addr_all_trusted() {
        let proxies = TrustedProxies::default();
        assert_eq!(proxies.client_addr("10.0.0.2, 10.0.0.3", "127.0.0.1"), "10.0.0.2");
        assert_eq!(proxies.client_addr("", "127.0.0.1"), "127.0.0.1");
    }

    #[test]
    fn test_serializes_patterns() {
        let json = serde_json::to_value(TrustedProxies::default()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), TRUSTED_PROXY_PATTERNS.len());
        assert_eq!(json[0], r"^127\.0\.0\.1$");
    }
}
