//! Per-request context.
//!
//! [`Request`] carries the request metadata every backend capability call
//! receives: method, path, headers, and query parameters. It is built once
//! per incoming call and never mutated afterward except by copy-and-extend
//! (see [`Request::insert_param`], used when resolving linked resources).
//!
//! Cancellation propagates the async-native way: dropping the request
//! future cancels any in-flight backend call.

use http::{HeaderMap, Method, Uri};
use std::collections::HashMap;

/// Typed per-request context handed to backend capabilities.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    /// Query parameters with comma-separated values split into lists.
    /// Parameters the engine does not recognize pass through verbatim as
    /// backend filter hints.
    pub query_params: HashMap<String, Vec<String>>,
    raw_query: Vec<(String, String)>,
}

impl Request {
    /// Builds a request context from HTTP request parts.
    ///
    /// Each query parameter value is split on commas for the backend-facing
    /// map; the raw decoded pairs are kept for link generation.
    #[must_use]
    pub fn from_http(method: &Method, uri: &Uri, headers: HeaderMap) -> Self {
        let raw_query: Vec<(String, String)> = uri
            .query()
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        let mut query_params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in &raw_query {
            query_params
                .entry(key.clone())
                .or_default()
                .extend(value.split(',').map(str::to_string));
        }

        Self {
            method: method.clone(),
            path: uri.path().to_string(),
            headers,
            query_params,
            raw_query,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the comma-split values for a query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&[String]> {
        self.query_params.get(name).map(Vec::as_slice)
    }

    /// Returns the raw (unsplit) value of the first occurrence of a query
    /// parameter, as submitted on the wire.
    #[must_use]
    pub fn raw_query_value(&self, name: &str) -> Option<&str> {
        self.raw_query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the decoded query pairs in wire order.
    #[must_use]
    pub fn raw_query_pairs(&self) -> &[(String, String)] {
        &self.raw_query
    }

    /// Injects a synthetic query parameter into the backend-facing map.
    ///
    /// Used when resolving linked resources to pass the owner's id and
    /// relation name as filter hints. The raw pairs used for link
    /// generation are left untouched.
    pub fn insert_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query_params.insert(name.into(), vec![value.into()]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &'static str) -> Request {
        Request::from_http(&Method::GET, &Uri::from_static(uri), HeaderMap::new())
    }

    #[test]
    fn test_comma_split_query_params() {
        let req = request("/v1/posts?fields[posts]=title,body&sort=-date");
        assert_eq!(
            req.query("fields[posts]"),
            Some(&["title".to_string(), "body".to_string()][..])
        );
        assert_eq!(req.query("sort"), Some(&["-date".to_string()][..]));
        assert_eq!(req.query("missing"), None);
    }

    #[test]
    fn test_raw_query_value_is_unsplit() {
        let req = request("/v1/posts?fields[posts]=title,body");
        assert_eq!(req.raw_query_value("fields[posts]"), Some("title,body"));
    }

    #[test]
    fn test_percent_decoding() {
        let req = request("/v1/posts?page%5Bnumber%5D=2");
        assert_eq!(req.raw_query_value("page[number]"), Some("2"));
    }

    #[test]
    fn test_insert_param_leaves_raw_pairs_untouched() {
        let mut req = request("/v1/posts/1/comments?sort=date");
        req.insert_param("postsID", "1");
        assert_eq!(req.query("postsID"), Some(&["1".to_string()][..]));
        assert_eq!(req.raw_query_pairs().len(), 1);
    }

    #[test]
    fn test_path_and_method() {
        let req = request("/v1/posts/1?x=y");
        assert_eq!(req.path(), "/v1/posts/1");
        assert_eq!(req.method(), &Method::GET);
    }
}
