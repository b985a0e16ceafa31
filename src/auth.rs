//! Credential resolution
//!
//! Turns raw configuration into one of the two supported authentication
//! modes and builds the HTTP client context used for every API call.

use crate::config::{usable, Config};
use crate::{Error, Result};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const BUSINESS_API_BASE_URL: &str = "https://business-api.tiktok.com/open_api/v1.3/";
pub const ADS_WEB_BASE_URL: &str = "https://ads.tiktok.com/";

pub const CSRF_COOKIE: &str = "csrftoken";
pub const SESSION_COOKIE: &str = "sessionid_ss_ads";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Authentication mode, selected once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Business API bearer token. The app pair is only needed to look up advertisers.
    Token {
        access_token: String,
        app_id: Option<String>,
        app_secret: Option<String>,
    },
    /// Captured ads-manager browser session.
    Cookie {
        raw: String,
        cookies: BTreeMap<String, String>,
    },
}

impl Credentials {
    /// Pick the authentication mode from configuration.
    ///
    /// A cookie session takes precedence over an access token when both are set.
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(raw) = usable(&config.cookie) {
            let cookies = parse_cookie(raw)?;
            return Ok(Credentials::Cookie {
                raw: raw.to_string(),
                cookies,
            });
        }

        if let Some(token) = usable(&config.access_token) {
            return Ok(Credentials::Token {
                access_token: token.to_string(),
                app_id: usable(&config.app_id).map(str::to_string),
                app_secret: usable(&config.app_secret).map(str::to_string),
            });
        }

        Err(Error::Configuration(
            "Access token or cookie is required".to_string(),
        ))
    }

    pub fn is_cookie(&self) -> bool {
        matches!(self, Credentials::Cookie { .. })
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Credentials::Token { .. } => BUSINESS_API_BASE_URL,
            Credentials::Cookie { .. } => ADS_WEB_BASE_URL,
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let (name, value) = match self {
            Credentials::Token { access_token, .. } => ("access-token", access_token.as_str()),
            Credentials::Cookie { cookies, .. } => {
                // Presence is checked by parse_cookie.
                let csrf = cookies.get(CSRF_COOKIE).map(String::as_str).unwrap_or("");
                ("x-csrftoken", csrf)
            }
        };
        let value = HeaderValue::from_str(value).map_err(|_| {
            Error::Configuration(format!("Credential contains characters not allowed in the {} header", name))
        })?;
        headers.insert(HeaderName::from_static(name), value);

        Ok(headers)
    }
}

/// Split a raw `Cookie` header into name/value pairs.
///
/// A lone fragment without `=` is the bare session id.
pub fn parse_cookie(raw: &str) -> Result<BTreeMap<String, String>> {
    let mut cookies = BTreeMap::new();
    for fragment in raw.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        match fragment.split_once('=') {
            Some((name, value)) => {
                cookies.insert(name.trim().to_string(), value.trim().to_string());
            }
            None => {
                cookies.insert(SESSION_COOKIE.to_string(), fragment.to_string());
            }
        }
    }

    for required in [CSRF_COOKIE, SESSION_COOKIE] {
        if !cookies.contains_key(required) {
            return Err(Error::Configuration(format!(
                "The cookie {} is required",
                required
            )));
        }
    }

    Ok(cookies)
}

/// Cookie jar holding the session cookies, scoped to the host of `url`.
pub fn cookie_jar(cookies: &BTreeMap<String, String>, url: &Url) -> Arc<Jar> {
    let jar = Jar::default();
    for (name, value) in cookies {
        jar.add_cookie_str(&format!("{}={}", name, value), url);
    }
    Arc::new(jar)
}

/// Ready-to-use HTTP client plus the base URL endpoints are joined onto.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub client: Client,
    pub base_url: Url,
}

impl ClientContext {
    pub fn new(credentials: &Credentials, base_uri: Option<&str>) -> Result<Self> {
        let base_url = parse_base_url(base_uri.unwrap_or(credentials.default_base_url()))?;

        let mut builder = Client::builder().default_headers(credentials.headers()?);
        if let Credentials::Cookie { cookies, .. } = credentials {
            builder = builder.cookie_provider(cookie_jar(cookies, &base_url));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            "HTTP client ready (mode: {}, base: {})",
            if credentials.is_cookie() { "cookie" } else { "token" },
            base_url
        );

        Ok(Self { client, base_url })
    }
}

/// Parse a base URL, appending `/` so relative endpoint paths nest beneath it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw).map_err(|e| Error::Configuration(format!("Invalid base URI '{}': {}", raw, e)))
}
