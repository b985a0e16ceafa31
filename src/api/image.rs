use super::client::TikTokHttpClient;
use super::{basename, content_signature, IMAGE_UPLOAD_PATH, MATERIAL_IMAGE_UPLOAD_PATH, UPLOAD_BY_FILE};
use crate::models::ImageInfo;
use crate::Result;
use reqwest::multipart::{Form, Part};

const CONTEXT: &str = "Failed to upload image";

impl TikTokHttpClient {
    /// Upload through the ads-manager material library. Returns the raw,
    /// still-signed CDN URL.
    pub async fn upload_image_with_cookie(
        &self,
        advertiser_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<String> {
        let form = Form::new().part(
            "Filedata",
            Part::bytes(contents).file_name(basename(file_name)),
        );

        let reply = self
            .post_multipart(
                MATERIAL_IMAGE_UPLOAD_PATH,
                &[("aadvid", advertiser_id), ("Content-Type", "multipart/form-data")],
                form,
                CONTEXT,
            )
            .await?;

        reply
            .data
            .get("url")
            .or_else(|| reply.data.get("image_url"))
            .and_then(|url| url.as_str())
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .ok_or_else(|| reply.error(CONTEXT))
    }

    /// Upload through the Business API. Returns the `data` object as sent.
    pub async fn upload_image_with_token(
        &self,
        advertiser_id: &str,
        file_name: &str,
        contents: Vec<u8>,
        include_file_name: bool,
    ) -> Result<ImageInfo> {
        let signature = content_signature(&contents);
        let mut form = Form::new()
            .text("advertiser_id", advertiser_id.to_string())
            .part(
                "image_file",
                Part::bytes(contents).file_name(basename(file_name)),
            )
            .text("upload_type", UPLOAD_BY_FILE)
            .text("image_signature", signature);
        if include_file_name {
            form = form.text("file_name", basename(file_name));
        }

        let reply = self.post_multipart(IMAGE_UPLOAD_PATH, &[], form, CONTEXT).await?;
        Ok(serde_json::from_value(reply.data)?)
    }
}
