//! Manifest path resolution and origin comparison.

/// Error type for path resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty path")]
    Empty,

    #[error("path must be root-relative: {0}")]
    NotRootRelative(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a root-relative manifest path onto the app origin.
///
/// `"/"` resolves to the origin root; any other path must also start with
/// `/`. Query strings are preserved, fragments are dropped.
pub fn resolve(origin: &url::Url, path: &str) -> Result<url::Url, UrlError> {
    let trimmed = path.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if !trimmed.starts_with('/') {
        return Err(UrlError::NotRootRelative(trimmed.to_string()));
    }

    let mut resolved = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    resolved.set_fragment(None);

    Ok(resolved)
}

/// Compare two URLs by origin: scheme, host, and port.
///
/// Default ports count as equal to their explicit form.
pub fn same_origin(a: &url::Url, b: &url::Url) -> bool {
    a.scheme() == b.scheme() && a.host_str() == b.host_str() && a.port_or_known_default() == b.port_or_known_default()
}
