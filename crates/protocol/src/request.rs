//! Request and response types of the adapter boundary.

use bytes::Bytes;
use serde::Serialize;

/// Parameters of one tile request, as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    /// Full URL including the custom scheme, e.g. `shinsui://tiles/5/10/12.png`.
    pub url: String,
}

impl RequestParameters {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Scheme part of the URL, if it has one.
    pub fn scheme(&self) -> Option<&str> {
        scheme_of(&self.url)
    }
}

/// Encoded overlay tile handed back to the host.
///
/// No caching directives are ever produced: `cache_control` and `expires`
/// are always `None`. Serializes as `{"cacheControl":null,"expires":null}`;
/// the payload itself travels out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileResponse {
    #[serde(skip)]
    pub data: Bytes,
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

impl TileResponse {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            cache_control: None,
            expires: None,
        }
    }

    /// Split into the legacy `(data, cache_control, expires)` triple.
    pub fn into_parts(self) -> (Bytes, Option<String>, Option<String>) {
        (self.data, self.cache_control, self.expires)
    }
}

/// Scheme of `url` (the part before `://`), if present and non-empty.
pub fn scheme_of(url: &str) -> Option<&str> {
    url.split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
}

/// Remove a leading `scheme://` from `url`.
///
/// URLs without that prefix pass through verbatim.
pub fn strip_scheme<'a>(url: &'a str, scheme: &str) -> &'a str {
    url.strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
        .unwrap_or(url)
}
