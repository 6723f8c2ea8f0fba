//! Backend endpoints and base-address parsing.

use std::fmt;

use url::Url;

/// Stable identifier of a backend: its position in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BackendId(usize);

impl BackendId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single downstream server, identified by its base address.
#[derive(Debug, Clone)]
pub struct Backend {
    id: BackendId,
    url: Url,
    /// Base address without a trailing slash, ready for path concatenation.
    base: String,
}

impl Backend {
    pub(crate) fn new(index: usize, url: Url) -> Self {
        let base = url.as_str().trim_end_matches('/').to_string();
        Self {
            id: BackendId(index),
            url,
            base,
        }
    }

    #[must_use]
    pub const fn id(&self) -> BackendId {
        self.id
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for `path_and_query` on this backend.
    ///
    /// `path_and_query` is appended verbatim, so it must start with `/`.
    #[must_use]
    pub fn endpoint(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Parse a backend base address. Returns the URL or a human-readable reason.
///
/// Accepts absolute `http`/`https` URLs with a host and an optional base
/// path. Query strings and fragments are rejected since the inbound path is
/// appended to the base.
pub fn parse_base_address(address: &str) -> Result<Url, String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;

    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".into());
    }
    if url.query().is_some() {
        return Err("query strings are not allowed in a backend address".into());
    }
    if url.fragment().is_some() {
        return Err("fragments are not allowed in a backend address".into());
    }
    Ok(url)
}
