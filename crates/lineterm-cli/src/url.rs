//! Link validation before the host opens anything.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    Empty,
    #[error("URL must start with http:// or https://")]
    InvalidProtocol,
    #[error("URL has no host")]
    NoHost,
    #[error("domain '{0}' is not allowed")]
    DomainNotAllowed(String),
}

/// Check that `url` is an http(s) link to an allowed host.
///
/// An empty `allowed` list accepts every host. `www.` is ignored when
/// matching, and subdomains of an allowed domain are accepted.
pub fn validate_link(url: &str, allowed: &[String]) -> Result<String, UrlError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(UrlError::Empty);
    }

    let host = extract_host(url)?;
    if !allowed.is_empty() && !allowed.iter().any(|domain| domain_matches(&host, domain)) {
        return Err(UrlError::DomainNotAllowed(host));
    }

    Ok(url.to_string())
}

fn extract_host(url: &str) -> Result<String, UrlError> {
    let lower = url.to_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .ok_or(UrlError::InvalidProtocol)?;

    // Host is everything before the first `/`, `?` or `#`, minus any
    // `user:pass@` prefix and port
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let host = host_port.split(':').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host.is_empty() {
        return Err(UrlError::NoHost);
    }
    Ok(host.to_string())
}

fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.to_lowercase();
    host == domain || host.ends_with(&format!(".{}", domain))
}
