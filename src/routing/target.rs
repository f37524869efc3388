//! Target URL construction.
//!
//! Maps the wildcard part of an inbound path onto the backend base URL so
//! that exactly one `/` separates the two, however the segments arrived.

/// Normalized backend base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    base: String,
}

impl BackendTarget {
    /// Create a target from the configured base URL. A single trailing
    /// slash is dropped.
    pub fn new(base_url: &str) -> Self {
        let base = base_url.strip_suffix('/').unwrap_or(base_url);
        Self {
            base: base.to_string(),
        }
    }

    /// Build the outbound URL for the given wildcard segments.
    ///
    /// Segments are joined with `/`, leading and trailing slashes are
    /// stripped, and the query string (if any) is appended unchanged.
    pub fn url_for<S: AsRef<str>>(&self, segments: &[S], query: Option<&str>) -> String {
        let joined = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("/");
        let path = joined.trim_matches('/');

        match query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}/{}?{}", self.base, path, query),
            None => format!("{}/{}", self.base, path),
        }
    }
}

/// Split the part of `request_path` after `mount_path` into segments.
///
/// The raw (still percent-encoded) path is used so that encoded characters
/// reach the backend exactly as the caller sent them.
pub fn wildcard_segments<'a>(request_path: &'a str, mount_path: &str) -> Vec<&'a str> {
    let rest = request_path.strip_prefix(mount_path).unwrap_or(request_path);
    if rest.is_empty() {
        return Vec::new();
    }
    rest.split('/').collect()
}
