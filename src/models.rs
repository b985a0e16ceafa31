//! Data models and structures
//!
//! Upload options, results, and the platform payloads returned to callers.

use crate::api::id_string;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Per-call upload options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Send the basename as an explicit `file_name` form field.
    pub include_file_name: bool,
    pub is_third_party: bool,
    pub flaw_detect: bool,
    pub auto_fix_enabled: bool,
    pub auto_bind_enabled: bool,
    /// Maximum in-flight uploads for `put_many`. Falls back to the configured default.
    pub concurrency: Option<usize>,
}

impl PutOptions {
    pub fn with_file_name(mut self) -> Self {
        self.include_file_name = true;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }
}

fn string_or_number_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_string(&value)
        .ok_or_else(|| serde::de::Error::custom("expected a non-empty string or numeric id"))
}

/// Image record returned by the Business API upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageInfo {
    #[serde(deserialize_with = "string_or_number_id")]
    pub image_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Video record returned by the video info lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoInfo {
    #[serde(deserialize_with = "string_or_number_id")]
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum UploadResult {
    /// Cookie-session image upload: the stable, unsigned CDN URL.
    ImageUrl(String),
    /// Token image upload: the platform's `data` object.
    Image(ImageInfo),
    Video(VideoInfo),
}

impl UploadResult {
    /// Best URL to reach the uploaded media, if the platform returned one.
    pub fn url(&self) -> Option<&str> {
        match self {
            UploadResult::ImageUrl(url) => Some(url),
            UploadResult::Image(info) => info.url.as_deref(),
            UploadResult::Video(info) => info.preview_url.as_deref(),
        }
    }
}

/// Outcome of one file in a batch upload. Failures are reported inline.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BatchOutcome {
    Uploaded(String),
    Failed(String),
}

impl BatchOutcome {
    pub fn is_uploaded(&self) -> bool {
        matches!(self, BatchOutcome::Uploaded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_image_info_keeps_extra_fields() {
        let info: ImageInfo = serde_json::from_value(json!({
            "image_id": "x",
            "url": "y",
            "width": 640,
        }))
        .unwrap();

        assert_eq!(info.image_id, "x");
        assert_eq!(info.url.as_deref(), Some("y"));
        assert_eq!(info.extra.get("width"), Some(&json!(640)));

        let back = serde_json::to_value(UploadResult::Image(info)).unwrap();
        assert_eq!(back, json!({ "image_id": "x", "url": "y", "width": 640 }));
    }

    #[test]
    fn test_numeric_ids_are_accepted() {
        let info: VideoInfo =
            serde_json::from_value(json!({ "video_id": 7300012345u64, "preview_url": "u" }))
                .unwrap();
        assert_eq!(info.video_id, "7300012345");

        let info: ImageInfo = serde_json::from_value(json!({ "image_id": 99 })).unwrap();
        assert_eq!(info.image_id, "99");

        assert!(serde_json::from_value::<VideoInfo>(json!({ "video_id": "" })).is_err());
    }

    #[test]
    fn test_upload_result_url() {
        let video = UploadResult::Video(VideoInfo {
            video_id: "v1".to_string(),
            preview_url: Some("u".to_string()),
            extra: Map::new(),
        });
        assert_eq!(video.url(), Some("u"));
        assert_eq!(UploadResult::ImageUrl("a".to_string()).url(), Some("a"));
    }

    #[test]
    fn test_batch_outcome_serializes_inline() {
        let outcomes = vec![
            BatchOutcome::Uploaded("https://cdn/a.jpg".to_string()),
            BatchOutcome::Failed("boom".to_string()),
        ];
        assert_eq!(
            serde_json::to_value(&outcomes).unwrap(),
            json!(["https://cdn/a.jpg", "boom"])
        );
        assert!(outcomes[0].is_uploaded());
        assert!(!outcomes[1].is_uploaded());
    }

    #[test]
    fn test_put_options_default() {
        let options = PutOptions::default().with_file_name().with_concurrency(2);
        assert!(options.include_file_name);
        assert!(!options.is_third_party);
        assert_eq!(options.concurrency, Some(2));
    }
}
