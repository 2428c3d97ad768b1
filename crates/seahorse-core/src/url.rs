//! Bookmark URL normalization for duplicate detection.
//!
//! The normalized form is a dedup key, never shown to the user:
//!
//! - Surrounding whitespace is trimmed
//! - `https://` is assumed when no scheme is given
//! - Scheme and host are lowercased
//! - The fragment is dropped
//! - Default ports (80 for http, 443 for https) are dropped
//! - A trailing slash is dropped, except for the root path `/`
//! - An empty query (`?` with nothing after it) is dropped
//!
//! Input that does not parse as a URL falls back to its trimmed, lowercased form.

use ::url::Url;

pub fn normalize_bookmark_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let Ok(mut url) = Url::parse(&candidate) else {
        return trimmed.to_lowercase();
    };

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_scheme_and_root_path() {
        assert_eq!(normalize_bookmark_url("example.com"), "https://example.com/");
    }

    #[test]
    fn test_lowercases_scheme_and_host_only() {
        assert_eq!(
            normalize_bookmark_url("HTTPS://Example.COM/Some/Path"),
            "https://example.com/Some/Path"
        );
    }

    #[test]
    fn test_drops_fragment_default_port_and_trailing_slash() {
        assert_eq!(
            normalize_bookmark_url("  https://example.com:443/docs/#intro "),
            "https://example.com/docs"
        );
        assert_eq!(
            normalize_bookmark_url("http://example.com:80/"),
            "http://example.com/"
        );
    }

    #[test]
    fn test_keeps_non_default_port_and_query() {
        assert_eq!(
            normalize_bookmark_url("http://localhost:8080/a/?q=1"),
            "http://localhost:8080/a?q=1"
        );
    }

    #[test]
    fn test_drops_empty_query() {
        assert_eq!(
            normalize_bookmark_url("https://example.com/a?"),
            "https://example.com/a"
        );
    }

    #[test]
    fn test_equivalent_urls_share_a_key() {
        let a = normalize_bookmark_url("https://a.com");
        let b = normalize_bookmark_url("A.COM/");
        let c = normalize_bookmark_url("https://a.com:443/#top");
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_empty_and_unparseable() {
        assert_eq!(normalize_bookmark_url("   "), "");
        assert_eq!(normalize_bookmark_url("http://[bad"), "http://[bad");
    }
}
