//! Signed CDN URL normalization
//!
//! Cookie-session image uploads come back as signed, time-limited `ibyteimg`
//! URLs. They are rewritten to the unsigned object form, which does not expire.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

fn signed_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://(p\d+)-ad-site-sign-(\w+)\.ibyteimg\.com/([^/]+)/([^~]+)~[^?]+\?.*$")
            .expect("signed CDN URL pattern is valid")
    })
}

/// `https://p16-ad-site-sign-sg.ibyteimg.com/bucket/object~tplv...?x-expires=..`
/// becomes `https://p16-ad-sg.ibyteimg.com/obj/bucket/object`.
pub fn transform_image_url(url: &str) -> Cow<'_, str> {
    signed_url_pattern().replace(url, "https://${1}-ad-${2}.ibyteimg.com/obj/${3}/${4}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SIGNED: &str = "https://p16-ad-site-sign-sg.ibyteimg.com/ad-site-i18n-sg/202410105d0d9b1f4e2a~tplv-noop.image?x-expires=1760000000&x-signature=abc%3D";

    #[test]
    fn test_signed_url_is_unsigned() {
        assert_eq!(
            transform_image_url(SIGNED),
            "https://p16-ad-sg.ibyteimg.com/obj/ad-site-i18n-sg/202410105d0d9b1f4e2a"
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let once = transform_image_url(SIGNED).into_owned();
        let twice = transform_image_url(&once);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_unrelated_urls_pass_through() {
        for url in [
            "https://example.com/a.jpg",
            "https://p16-ad-site-sign-sg.ibyteimg.com/bucket/object",
            "http://p16-ad-site-sign-sg.ibyteimg.com/bucket/object~tplv.image?x=1",
            "",
        ] {
            assert!(matches!(transform_image_url(url), Cow::Borrowed(_)), "{}", url);
        }
    }
}
