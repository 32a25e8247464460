//! Source URL validation.

use thiserror::Error;
use url::Url;

/// Hosts the acquisition collaborator is allowed to fetch from.
const ALLOWED_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "youtu.be",
];

/// Reasons a submitted source URL is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlValidationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL: {0}")]
    Malformed(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid YouTube URL")]
    UnsupportedHost,

    #[error("URL does not point to a video")]
    MissingPath,
}

/// Validate a YouTube URL and return it in normalized form.
///
/// The scheme is optional (`youtu.be/abc` is accepted as `https://youtu.be/abc`).
pub fn validate_source_url(raw: &str) -> Result<String, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let candidate = if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let url = Url::parse(&candidate).map_err(|e| UrlValidationError::Malformed(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlValidationError::UnsupportedScheme(other.to_string())),
    }

    let host = url
        .host_str()
        .map(|h| h.to_ascii_lowercase())
        .ok_or(UrlValidationError::UnsupportedHost)?;
    if !ALLOWED_HOSTS.contains(&host.as_str()) {
        return Err(UrlValidationError::UnsupportedHost);
    }

    let has_path = !url.path().trim_matches('/').is_empty();
    let has_query = url.query().is_some_and(|q| !q.is_empty());
    if !has_path && !has_query {
        return Err(UrlValidationError::MissingPath);
    }

    Ok(url.to_string())
}

/// Whether `raw` starts with `scheme://`, ignoring `://` later in the URL.
fn has_scheme(raw: &str) -> bool {
    raw.split_once("://").is_some_and(|(scheme, _)| {
        !scheme.is_empty() && !scheme.contains(['/', '?', '.', '&', '=', '#'])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_youtube_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ",
            "youtube.com/shorts/dQw4w9WgXcQ",
        ] {
            assert!(validate_source_url(url).is_ok(), "{url} should be accepted");
        }
    }

    #[test]
    fn test_missing_scheme_is_normalized() {
        assert_eq!(
            validate_source_url("youtu.be/abc").unwrap(),
            "https://youtu.be/abc"
        );
    }

    #[test]
    fn test_embedded_url_in_query_without_scheme() {
        let url = validate_source_url("youtube.com/watch?v=abc&ref=https://example.com").unwrap();
        assert!(url.starts_with("https://youtube.com/watch?v=abc&ref="));
        assert!(has_scheme("http://youtu.be/abc"));
        assert!(!has_scheme("youtu.be/abc?next=http://x"));
    }

    #[test]
    fn test_rejects_other_urls() {
        assert_eq!(validate_source_url("   "), Err(UrlValidationError::Empty));
        assert_eq!(
            validate_source_url("https://vimeo.com/123"),
            Err(UrlValidationError::UnsupportedHost)
        );
        assert_eq!(
            validate_source_url("https://notyoutube.com/watch?v=abc"),
            Err(UrlValidationError::UnsupportedHost)
        );
        assert_eq!(
            validate_source_url("https://youtube.com/"),
            Err(UrlValidationError::MissingPath)
        );
        assert!(matches!(
            validate_source_url("ftp://youtube.com/watch?v=abc"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
    }
}
