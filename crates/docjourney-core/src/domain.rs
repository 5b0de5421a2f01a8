//! Domain-key derivation: the cache partition key for one documentation site.
//!
//! The key is the second-to-last dot-separated label of the URL's host
//! (`python.langchain.com` → `langchain`), or the host itself when it has a
//! single label. This is a heuristic, not a public-suffix parser: every
//! subdomain of one registrable domain shares a key, and so do unrelated
//! sites such as `example.com` and `example.org`. Callers rely on that
//! collision to reuse one script per site.

use url::Url;

use crate::{Error, Result};

/// Parse and validate a documentation URL. Only `http` and `https` URLs
/// with a host are accepted.
pub fn parse_doc_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                raw, other
            )))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::InvalidUrl(format!("{}: missing host", raw)));
    }

    Ok(url)
}

/// Derive the domain key for a URL.
pub fn derive_key(raw: &str) -> Result<String> {
    let url = parse_doc_url(raw)?;
    Ok(key_for_url(&url))
}

/// Derive the domain key from an already-parsed URL.
pub fn key_for_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    // Fully-qualified hosts ("example.com.") keep the same key as their
    // relative form.
    let host = host.strip_suffix('.').unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();

    if labels.len() >= 2 {
        labels[labels.len() - 2].to_string()
    } else {
        labels[0].to_string()
    }
}
