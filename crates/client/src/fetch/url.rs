//! Download link validation.

/// Error type for link parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host in {0}")]
    MissingHost(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a download link.
///
/// Unlike a browser address bar, no scheme is assumed: the link must be a
/// complete `http://` or `https://` URL with a host. Surrounding whitespace is
/// trimmed and any fragment is dropped, the query string is kept as is.
pub fn parse_link(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlError::MissingHost(trimmed.to_string()));
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Check that a link root parses as an http(s) link with a host.
///
/// File names are appended to the root verbatim, so a root that fails here
/// would fail every attempt of every day.
pub fn check_root(root: &str) -> Result<(), UrlError> {
    parse_link(root).map(|_| ())
}
