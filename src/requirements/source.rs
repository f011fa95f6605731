//! Loading requirements text from a local file or a URL.
//!
//! The resolver core does not care where a requirements listing comes from;
//! this module covers the two sources the tool supports: a path on disk and
//! an HTTP(S) URL. GitHub "blob" page URLs are transparently rewritten to
//! their raw-content equivalents so users can paste a browser URL directly.

use anyhow::Result;

use crate::core::PipmatrixError;

/// Rewrites a GitHub blob URL to the corresponding raw URL.
///
/// `https://github.com/{owner}/{repo}/blob/{branch}/{path}` becomes
/// `https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}`.
/// Any other URL is returned unchanged.
pub fn normalize_raw_url(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return url.to_string();
    };
    if parsed.host_str().map(str::to_ascii_lowercase).as_deref() != Some("github.com") {
        return url.to_string();
    }

    let parts: Vec<&str> = match parsed.path_segments() {
        Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
        None => return url.to_string(),
    };
    // owner / repo / "blob" / branch / path...
    if parts.len() >= 5 && parts[2] == "blob" {
        let owner = parts[0];
        let repo = parts[1];
        let branch = parts[3];
        let rest = parts[4..].join("/");
        return format!("https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{rest}");
    }
    url.to_string()
}

/// Whether a requirements source string is a URL rather than a path.
pub fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads raw requirements text from a file path or URL.
pub async fn load(source: &str) -> Result<String> {
    if is_url(source) {
        fetch_url(source).await
    } else {
        read_file(source)
    }
}

fn read_file(path: &str) -> Result<String> {
    tracing::debug!(target: "requirements", "Reading requirements from file: {path}");
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipmatrixError::RequirementsNotFound {
                path: path.to_string(),
            }
            .into()
        } else {
            PipmatrixError::IoError(e).into()
        }
    })
}

async fn fetch_url(url: &str) -> Result<String> {
    let raw_url = normalize_raw_url(url);
    tracing::debug!(target: "requirements", "Fetching requirements from URL: {raw_url}");

    let response = reqwest::get(&raw_url).await.map_err(|e| PipmatrixError::NetworkError {
        url: raw_url.clone(),
        reason: e.to_string(),
    })?;
    let response = response.error_for_status().map_err(|e| PipmatrixError::NetworkError {
        url: raw_url.clone(),
        reason: e.to_string(),
    })?;
    response
        .text()
        .await
        .map_err(|e| {
            PipmatrixError::NetworkError {
                url: raw_url,
                reason: e.to_string(),
            }
            .into()
        })
}
