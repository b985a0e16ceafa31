//! TikTok Ads HTTP API
//!
//! Endpoint paths are relative to the base URL chosen by the credential mode:
//! the Business API root for token auth, the ads-manager web root for cookie
//! sessions.

pub mod advertiser;
pub mod client;
pub mod image;
pub mod video;

pub use client::{ApiReply, TikTokHttpClient};

use serde_json::Value;

// Business API (token auth)
pub const ADVERTISER_LIST_PATH: &str = "oauth2/advertiser/get/";
pub const IMAGE_UPLOAD_PATH: &str = "file/image/ad/upload/";
pub const VIDEO_UPLOAD_PATH: &str = "file/video/ad/upload/";
pub const VIDEO_INFO_PATH: &str = "file/video/ad/info/";

// Ads-manager web API (cookie auth)
pub const ACCOUNT_DETAIL_PATH: &str = "api/v4/i18n/account/permission/detail/";
pub const MATERIAL_IMAGE_UPLOAD_PATH: &str = "mi/api/v2/i18n/material/image/upload/";

pub const UPLOAD_BY_FILE: &str = "UPLOAD_BY_FILE";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Hex MD5 digest the upload endpoints expect as the file signature.
pub fn content_signature(contents: &[u8]) -> String {
    format!("{:x}", md5::compute(contents))
}

/// Last path segment, used as the multipart filename.
pub fn basename(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Ids come back as strings from the Business API and as numbers from the web API.
pub(crate) fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
