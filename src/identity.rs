//! Advertiser identity resolution
//!
//! Nearly every call needs the advertiser account id. When it is not
//! configured it is looked up once per credential set and cached for a day.

use crate::api::TikTokHttpClient;
use crate::auth::Credentials;
use crate::cache::CacheStore;
use crate::{Error, Result};
use std::time::Duration;

pub const ADVERTISER_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Cache key derived from a hash of the credential material.
///
/// `None` for token credentials without an app id/secret pair.
pub fn cache_key(credentials: &Credentials) -> Option<String> {
    match credentials {
        Credentials::Cookie { raw, .. } => Some(format!(
            "tiktok_advertisers_cookie_{:x}",
            md5::compute(raw.as_bytes())
        )),
        Credentials::Token {
            app_id: Some(app_id),
            app_secret: Some(app_secret),
            ..
        } => Some(format!(
            "tiktok_advertiser_{:x}",
            md5::compute(format!("{}_{}", app_id, app_secret).as_bytes())
        )),
        Credentials::Token { .. } => None,
    }
}

pub struct AdvertiserResolver<'a> {
    http: &'a TikTokHttpClient,
    credentials: &'a Credentials,
    cache: &'a dyn CacheStore,
}

impl<'a> AdvertiserResolver<'a> {
    pub fn new(
        http: &'a TikTokHttpClient,
        credentials: &'a Credentials,
        cache: &'a dyn CacheStore,
    ) -> Self {
        Self {
            http,
            credentials,
            cache,
        }
    }

    /// Return `configured` when set, otherwise the cached or freshly fetched id.
    pub async fn resolve(&self, configured: Option<&str>) -> Result<String> {
        if let Some(advertiser_id) = configured {
            return Ok(advertiser_id.to_string());
        }

        let key = cache_key(self.credentials).ok_or_else(|| {
            Error::Configuration("App ID and secret are required for get advertisers".to_string())
        })?;

        match self.cache.get(&key).await {
            Ok(Some(advertiser_id)) => {
                tracing::debug!("Advertiser id {} served from cache", advertiser_id);
                return Ok(advertiser_id);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Advertiser cache lookup failed, fetching instead: {}", e),
        }

        let advertiser_id = self
            .fetch()
            .await
            .map_err(|e| Error::Resolution(e.to_string()))?
            .ok_or_else(|| Error::Resolution("Not found any advertisers".to_string()))?;

        if let Err(e) = self
            .cache
            .set(&key, &advertiser_id, ADVERTISER_CACHE_TTL)
            .await
        {
            tracing::warn!("Failed to cache advertiser id: {}", e);
        }

        tracing::info!("Resolved advertiser id {}", advertiser_id);
        Ok(advertiser_id)
    }

    async fn fetch(&self) -> Result<Option<String>> {
        match self.credentials {
            Credentials::Token {
                app_id: Some(app_id),
                app_secret: Some(app_secret),
                ..
            } => self.http.first_advertiser_id(app_id, app_secret).await,
            Credentials::Token { .. } => Ok(None),
            Credentials::Cookie { .. } => self.http.session_account_id().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{parse_cookie, ClientContext};
    use crate::cache::{CacheEntry, MockCache};
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_credentials() -> Credentials {
        Credentials::Token {
            access_token: "t".to_string(),
            app_id: Some("a".to_string()),
            app_secret: Some("s".to_string()),
        }
    }

    fn cookie_credentials() -> Credentials {
        let raw = "csrftoken=abc; sessionid_ss_ads=xyz".to_string();
        Credentials::Cookie {
            cookies: parse_cookie(&raw).unwrap(),
            raw,
        }
    }

    fn http(server: &MockServer, credentials: &Credentials) -> TikTokHttpClient {
        TikTokHttpClient::new(ClientContext::new(credentials, Some(server.uri().as_str())).unwrap())
    }

    async fn mount_advertiser_list(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/oauth2/advertiser/get/"))
            .and(query_param("app_id", "a"))
            .and(query_param("secret", "s"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": { "list": [{ "advertiser_id": "7001" }, { "advertiser_id": "7002" }] }
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_cache_key_depends_on_credentials() {
        let token = cache_key(&token_credentials()).unwrap();
        assert!(token.starts_with("tiktok_advertiser_"));
        assert!(!token.contains("_a_s"));

        let other = cache_key(&Credentials::Token {
            access_token: "t".to_string(),
            app_id: Some("a".to_string()),
            app_secret: Some("other".to_string()),
        })
        .unwrap();
        assert_ne!(token, other);

        let cookie = cache_key(&cookie_credentials()).unwrap();
        assert!(cookie.starts_with("tiktok_advertisers_cookie_"));

        let no_app = Credentials::Token {
            access_token: "t".to_string(),
            app_id: None,
            app_secret: None,
        };
        assert_eq!(cache_key(&no_app), None);
    }

    #[tokio::test]
    async fn test_configured_id_skips_network_and_cache() {
        let server = MockServer::start().await;
        mount_advertiser_list(&server, 0).await;

        let credentials = token_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new();

        let id = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(Some("42"))
            .await
            .unwrap();
        assert_eq!(id, "42");
        assert_eq!(cache.get_write_count(), 0);
    }

    #[tokio::test]
    async fn test_fetches_once_within_ttl() {
        let server = MockServer::start().await;
        mount_advertiser_list(&server, 1).await;

        let credentials = token_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new();
        let resolver = AdvertiserResolver::new(&http, &credentials, &cache);

        assert_eq!(resolver.resolve(None).await.unwrap(), "7001");
        assert_eq!(resolver.resolve(None).await.unwrap(), "7001");

        let entry = cache.get_entry(&cache_key(&credentials).unwrap()).unwrap();
        let ttl = entry.expires_at - Utc::now();
        assert!(ttl > chrono::Duration::hours(23));
        assert!(ttl <= chrono::Duration::hours(24));
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let server = MockServer::start().await;
        mount_advertiser_list(&server, 1).await;

        let credentials = token_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new().with_entry(
            &cache_key(&credentials).unwrap(),
            CacheEntry {
                value: "stale".to_string(),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            },
        );

        let id = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(None)
            .await
            .unwrap();
        assert_eq!(id, "7001");
    }

    #[tokio::test]
    async fn test_cookie_mode_reads_account_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v4/i18n/account/permission/detail/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": { "account": { "id": 6999000111u64 } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credentials = cookie_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new();

        let id = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(None)
            .await
            .unwrap();
        assert_eq!(id, "6999000111");
    }

    #[tokio::test]
    async fn test_empty_list_is_resolution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/advertiser/get/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "code": 0,
                "data": { "list": [] }
            })))
            .mount(&server)
            .await;

        let credentials = token_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new();

        let err = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolution(ref m) if m.contains("Not found any advertisers")));
        assert_eq!(cache.get_write_count(), 0);
    }

    #[tokio::test]
    async fn test_api_failure_is_resolution_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oauth2/advertiser/get/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": 40105,
                "message": "Access token is incorrect"
            })))
            .mount(&server)
            .await;

        let credentials = token_credentials();
        let http = http(&server, &credentials);
        let cache = MockCache::new();

        let err = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Resolution(ref m) if m.contains("Access token is incorrect")));
    }

    #[tokio::test]
    async fn test_token_without_app_pair_is_configuration_error() {
        let server = MockServer::start().await;
        let credentials = Credentials::Token {
            access_token: "t".to_string(),
            app_id: Some("a".to_string()),
            app_secret: None,
        };
        let http = http(&server, &credentials);
        let cache = MockCache::new();

        let err = AdvertiserResolver::new(&http, &credentials, &cache)
            .resolve(None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
