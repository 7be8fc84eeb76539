//! Pagination parameter validation and link generation.
//!
//! Two mutually exclusive styles are supported: `page[number]`/`page[size]`
//! and `page[offset]`/`page[limit]`. A request carrying exactly one
//! complete style is paginated; a request with none of the four parameters
//! is not; any other combination is treated as "no pagination" and falls
//! through to the plain collection fetch.

use indexmap::IndexMap;
use std::collections::BTreeMap;
use vellum_core::{EngineError, EngineResult, Information, Request};

/// The four optional `page[...]` query parameters of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationQueryParams {
    number: Option<String>,
    size: Option<String>,
    offset: Option<String>,
    limit: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

impl PaginationQueryParams {
    /// Reads the raw `page[...]` parameters off a request.
    #[must_use]
    pub fn from_request(req: &Request) -> Self {
        Self {
            number: non_empty(req.raw_query_value("page[number]")),
            size: non_empty(req.raw_query_value("page[size]")),
            offset: non_empty(req.raw_query_value("page[offset]")),
            limit: non_empty(req.raw_query_value("page[limit]")),
        }
    }

    /// Returns `true` when the parameters form exactly one complete
    /// pagination mode.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (
            self.number.is_some(),
            self.size.is_some(),
            self.offset.is_some(),
            self.limit.is_some(),
        ) {
            (true, true, false, false) | (false, false, true, true) => true,
            _ => false,
        }
    }

    /// Computes the `first`/`prev`/`next`/`last` links for a paginated
    /// collection of `count` total entities.
    ///
    /// Links are absolute: resolved base URL plus the request path plus the
    /// re-encoded query string with the single moving `page[...]` parameter
    /// replaced. Malformed numeric parameters fail the call.
    pub fn links(
        &self,
        req: &Request,
        count: u64,
        info: &Information,
    ) -> EngineResult<IndexMap<String, String>> {
        let mut result = IndexMap::new();
        let request_url = format!("{}{}", info.base_url(), req.path());

        if let (Some(number), Some(size)) = (&self.number, &self.size) {
            let number = parse_page_param("page[number]", number)?;
            let size = parse_page_param("page[size]", size)?;
            if size == 0 {
                return Err(EngineError::internal("page[size] must be positive"));
            }
            let total_pages = count / size + u64::from(count % size != 0);

            if number > 1 {
                result.insert(
                    "first".to_string(),
                    page_url(req, &request_url, "page[number]", 1),
                );
                result.insert(
                    "prev".to_string(),
                    page_url(req, &request_url, "page[number]", number - 1),
                );
            }
            if number < total_pages {
                result.insert(
                    "next".to_string(),
                    page_url(req, &request_url, "page[number]", number + 1),
                );
                result.insert(
                    "last".to_string(),
                    page_url(req, &request_url, "page[number]", total_pages),
                );
            }
        } else if let (Some(offset), Some(limit)) = (&self.offset, &self.limit) {
            let offset = parse_page_param("page[offset]", offset)?;
            let limit = parse_page_param("page[limit]", limit)?;

            if offset != 0 {
                result.insert(
                    "first".to_string(),
                    page_url(req, &request_url, "page[offset]", 0),
                );
                result.insert(
                    "prev".to_string(),
                    page_url(req, &request_url, "page[offset]", offset.saturating_sub(limit)),
                );
            }
            // Checked: offset and limit are client-supplied and may sum past
            // u64::MAX, which must read as "no further page".
            if let Some(next) = offset.checked_add(limit).filter(|n| *n < count) {
                result.insert(
                    "next".to_string(),
                    page_url(req, &request_url, "page[offset]", next),
                );
                result.insert(
                    "last".to_string(),
                    page_url(req, &request_url, "page[offset]", count.saturating_sub(limit)),
                );
            }
        }

        Ok(result)
    }
}

fn parse_page_param(name: &str, value: &str) -> EngineResult<u64> {
    value
        .parse::<u64>()
        .map_err(|e| EngineError::internal_with_source(format!("invalid {name} parameter"), e))
}

/// Rebuilds the query string with one `page[...]` parameter replaced.
///
/// Keys are emitted in sorted order and values are left unescaped, matching
/// the link format clients already rely on.
fn page_url(req: &Request, request_url: &str, param: &str, value: u64) -> String {
    let mut params: BTreeMap<String, String> = req
        .raw_query_pairs()
        .iter()
        .cloned()
        .collect();
    params.insert(param.to_string(), value.to_string());
    let query: Vec<String> = params
        .into_iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("{}?{}", request_url, query.join("&"))
}
