use super::client::TikTokHttpClient;
use super::{
    basename, content_signature, id_string, UPLOAD_BY_FILE, VIDEO_INFO_PATH, VIDEO_UPLOAD_PATH,
};
use crate::models::{PutOptions, VideoInfo};
use crate::Result;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;

const UPLOAD_CONTEXT: &str = "Failed to upload video";
const INFO_CONTEXT: &str = "Failed to get video info";

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

impl TikTokHttpClient {
    /// Upload a video file and return the id the platform assigned to it.
    pub async fn upload_video(
        &self,
        advertiser_id: &str,
        file_name: &str,
        contents: Vec<u8>,
        options: &PutOptions,
    ) -> Result<String> {
        let signature = content_signature(&contents);
        let mut form = Form::new()
            .text("advertiser_id", advertiser_id.to_string())
            .part(
                "video_file",
                Part::bytes(contents).file_name(basename(file_name)),
            )
            .text("upload_type", UPLOAD_BY_FILE)
            .text("video_signature", signature)
            .text("is_third_party", flag(options.is_third_party))
            .text("flaw_detect", flag(options.flaw_detect))
            .text("auto_fix_enabled", flag(options.auto_fix_enabled))
            .text("auto_bind_enabled", flag(options.auto_bind_enabled));
        if options.include_file_name {
            form = form.text("file_name", basename(file_name));
        }

        let reply = self
            .post_multipart(VIDEO_UPLOAD_PATH, &[], form, UPLOAD_CONTEXT)
            .await?;

        let video_id = reply
            .data
            .get(0)
            .and_then(|video| video.get("video_id"))
            .and_then(id_string)
            .ok_or_else(|| reply.error(UPLOAD_CONTEXT))?;

        tracing::info!("Video uploaded (video_id: {})", video_id);
        Ok(video_id)
    }

    pub async fn get_video_info(&self, advertiser_id: &str, video_id: &str) -> Result<VideoInfo> {
        let video_ids = serde_json::to_string(&[video_id])?;
        let reply = self
            .get(
                VIDEO_INFO_PATH,
                &[("advertiser_id", advertiser_id), ("video_ids", video_ids.as_str())],
                INFO_CONTEXT,
            )
            .await?;

        let first = reply
            .data
            .get("list")
            .and_then(|list| list.get(0))
            .cloned()
            .ok_or_else(|| reply.error(INFO_CONTEXT))?;

        Ok(serde_json::from_value(first)?)
    }

    /// Wait `interval` for the platform to process the upload, then look the
    /// video up, up to `attempts` times at the same fixed interval.
    pub async fn await_video_info(
        &self,
        advertiser_id: &str,
        video_id: &str,
        interval: Duration,
        attempts: usize,
    ) -> Result<VideoInfo> {
        tokio::time::sleep(interval).await;

        let strategy = FixedInterval::new(interval).take(attempts.saturating_sub(1));
        Retry::spawn(strategy, move || async move {
            let result = self.get_video_info(advertiser_id, video_id).await;
            if let Err(e) = &result {
                tracing::debug!("Video {} not ready: {}", video_id, e);
            }
            result
        })
        .await
    }
}
