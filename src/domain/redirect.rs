//! Construction of the post-payment redirect target.
//!
//! The provider's reference is carried back to the merchant as the
//! `reference` query parameter of the callback URL. Existing query
//! parameters are kept; a stale `reference` parameter is replaced.

use url::Url;

pub const REFERENCE_PARAM: &str = "reference";

/// Returns `callback_url` with `reference=<provider_reference>` merged into its query.
///
/// The existing query is left byte-for-byte intact unless it already carries
/// a `reference` parameter, in which case the query is rebuilt without it.
pub fn redirect_target(callback_url: &Url, provider_reference: &str) -> Url {
    let mut target = callback_url.clone();

    let stale = callback_url
        .query_pairs()
        .any(|(key, _)| key == REFERENCE_PARAM);
    if stale {
        let kept: Vec<(String, String)> = callback_url
            .query_pairs()
            .filter(|(key, _)| key != REFERENCE_PARAM)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        target.set_query(None);
        target.query_pairs_mut().extend_pairs(kept);
    }

    target
        .query_pairs_mut()
        .append_pair(REFERENCE_PARAM, provider_reference);
    target
}

/// Reads the provider reference back out of a redirect URL.
pub fn reference_from(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == REFERENCE_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_plain_callback() {
        let target = redirect_target(&url("https://example.com/done"), "abc123");
        assert_eq!(target.as_str(), "https://example.com/done?reference=abc123");
    }

    #[test]
    fn test_existing_query_is_merged() {
        let target = redirect_target(&url("https://shop.test/cb?item=7&src=web"), "abc123");
        assert_eq!(
            target.as_str(),
            "https://shop.test/cb?item=7&src=web&reference=abc123"
        );
    }

    #[test]
    fn test_existing_query_bytes_are_kept() {
        let target = redirect_target(&url("https://shop.test/cb?flag&q=a%20b"), "abc");
        assert_eq!(target.as_str(), "https://shop.test/cb?flag&q=a%20b&reference=abc");

        let target = redirect_target(&url("https://shop.test/cb?a=1;b=2"), "abc");
        assert_eq!(target.as_str(), "https://shop.test/cb?a=1;b=2&reference=abc");
    }

    #[test]
    fn test_stale_reference_is_replaced() {
        let target = redirect_target(&url("https://shop.test/cb?reference=old&a=1"), "new");
        assert_eq!(target.as_str(), "https://shop.test/cb?a=1&reference=new");
    }

    #[test]
    fn test_fragment_is_kept() {
        let target = redirect_target(&url("https://shop.test/cb#receipt"), "abc");
        assert_eq!(target.as_str(), "https://shop.test/cb?reference=abc#receipt");
    }

    #[test]
    fn test_reference_is_percent_encoded() {
        let target = redirect_target(&url("https://shop.test/cb"), "a&b=c");
        assert_eq!(target.as_str(), "https://shop.test/cb?reference=a%26b%3Dc");
        assert_eq!(reference_from(&target).as_deref(), Some("a&b=c"));
    }

    #[test]
    fn test_reference_from_missing_or_empty() {
        assert_eq!(reference_from(&url("https://shop.test/cb")), None);
        assert_eq!(reference_from(&url("https://shop.test/cb?reference=")), None);
    }
}
