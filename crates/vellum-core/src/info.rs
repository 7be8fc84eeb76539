//! Base-URL information and resolvers.

use http::HeaderMap;

/// Resolves the base URL prepended to every generated link.
///
/// Resolvers are supplied once at API construction. A resolver that wants
/// to vary the base URL per request (e.g. by the `Host` header) implements
/// [`for_request`]; the engine consults it on every call and falls back to
/// [`base_url`] when it declines.
///
/// [`for_request`]: UrlResolver::for_request
/// [`base_url`]: UrlResolver::base_url
pub trait UrlResolver: Send + Sync {
    /// Returns the static base URL, possibly empty for relative links.
    fn base_url(&self) -> String;

    /// Returns a request-specific base URL, or `None` to use the static
    /// one. The default is not request-aware.
    fn for_request(&self, headers: &HeaderMap) -> Option<String> {
        let _ = headers;
        None
    }
}

/// A resolver that always returns the same base URL.
#[derive(Debug, Clone)]
pub struct StaticResolver {
    base: String,
}

impl StaticResolver {
    /// Creates a resolver for a fixed base URL. An empty base yields
    /// relative links.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }
}

impl UrlResolver for StaticResolver {
    fn base_url(&self) -> String {
        self.base.clone()
    }
}

/// The URL context handed to the codec and the pagination engine.
///
/// A snapshot of the configured prefix and the base URL resolved for the
/// current request.
#[derive(Debug, Clone)]
pub struct Information {
    prefix: String,
    base_url: String,
}

impl Information {
    /// Creates an information snapshot. The prefix is stored as configured
    /// (already stripped of surrounding slashes by the API).
    #[must_use]
    pub fn new(prefix: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base_url: base_url.into(),
        }
    }

    /// Returns the URL prefix, without surrounding slashes.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the resolved base URL, possibly empty.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HostResolver;

    impl UrlResolver for HostResolver {
        fn base_url(&self) -> String {
            "https://fallback.example".to_string()
        }

        fn for_request(&self, headers: &HeaderMap) -> Option<String> {
            headers
                .get(http::header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(|host| format!("https://{host}"))
        }
    }

    #[test]
    fn test_static_resolver() {
        let resolver = StaticResolver::new("https://api.example.com");
        assert_eq!(resolver.base_url(), "https://api.example.com");
        assert!(resolver.for_request(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_request_aware_resolver() {
        let resolver = HostResolver;
        let mut headers = HeaderMap::new();
        headers.insert(http::header::HOST, "tenant.example".parse().unwrap());
        assert_eq!(
            resolver.for_request(&headers).as_deref(),
            Some("https://tenant.example")
        );
        assert!(resolver.for_request(&HeaderMap::new()).is_none());
    }

    #[test]
    fn test_information_snapshot() {
        let info = Information::new("v1", "https://api.example.com");
        assert_eq!(info.prefix(), "v1");
        assert_eq!(info.base_url(), "https://api.example.com");
    }
}
