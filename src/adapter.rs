//! TikTok Ads storage adapter
//!
//! Presents the ads media library as a write-only filesystem: writing an
//! image or video uploads it and returns the platform's record of it. All
//! other filesystem operations are unsupported.

use crate::api::TikTokHttpClient;
use crate::auth::{ClientContext, Credentials};
use crate::cache::{CacheStore, FileCache};
use crate::config::{usable, Config};
use crate::identity::AdvertiserResolver;
use crate::media::{detect_mime, DefaultMimeDetector, MediaKind, MimeTypeDetector};
use crate::models::{BatchOutcome, PutOptions, UploadResult, VideoInfo};
use crate::storage::{FileAttributes, FilesystemAdapter, MediaUploader, Operation};
use crate::url::transform_image_url;
use crate::{Error, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;

pub struct TikTokAdapter {
    http: TikTokHttpClient,
    credentials: Credentials,
    advertiser_id: String,
    detector: Box<dyn MimeTypeDetector>,
    video_poll_interval: Duration,
    video_poll_attempts: usize,
    batch_concurrency: usize,
}

impl TikTokAdapter {
    /// Build an adapter, caching the advertiser id on disk under
    /// `config.cache_dir` (or the default cache directory).
    pub async fn new(config: Config) -> Result<Self> {
        let cache = match &config.cache_dir {
            Some(dir) => FileCache::new(dir),
            None => FileCache::default(),
        };
        Self::with_cache(config, &cache).await
    }

    /// Build an adapter with an explicit advertiser id cache.
    ///
    /// Fails if no credential is usable or the advertiser id cannot be resolved.
    pub async fn with_cache(config: Config, cache: &dyn CacheStore) -> Result<Self> {
        let credentials = Credentials::from_config(&config)?;
        let context = ClientContext::new(&credentials, usable(&config.base_uri))?;
        let http = TikTokHttpClient::new(context);

        let advertiser_id = AdvertiserResolver::new(&http, &credentials, cache)
            .resolve(config.advertiser_id())
            .await?;

        tracing::info!(
            "TikTok adapter ready (advertiser: {}, base: {})",
            advertiser_id,
            http.base_url()
        );

        Ok(Self {
            http,
            credentials,
            advertiser_id,
            detector: Box::new(DefaultMimeDetector),
            video_poll_interval: config.video_poll_interval,
            video_poll_attempts: config.video_poll_attempts.max(1),
            batch_concurrency: config.batch_concurrency.max(1),
        })
    }

    pub fn with_mime_detector(mut self, detector: impl MimeTypeDetector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn advertiser_id(&self) -> &str {
        &self.advertiser_id
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Upload one file, routed by its detected media type.
    pub async fn put(
        &self,
        file_name: &str,
        contents: &[u8],
        options: &PutOptions,
    ) -> Result<UploadResult> {
        let mime = detect_mime(self.detector.as_ref(), file_name, contents);
        tracing::debug!("Uploading {} ({}, {} bytes)", file_name, mime, contents.len());

        let result = match MediaKind::from_mime(&mime) {
            MediaKind::Image => self.upload_image(file_name, contents.to_vec(), options).await,
            MediaKind::Video => self.upload_video(file_name, contents.to_vec(), options).await,
            MediaKind::Unsupported(mime) => Err(Error::UnsupportedMediaType(mime)),
        };

        result.map_err(|e| {
            tracing::error!("Failed to upload {}: {}", file_name, e);
            e
        })
    }

    /// Upload several images concurrently.
    ///
    /// Results come back in input order. A failed item carries its error
    /// message instead of failing the whole batch.
    pub async fn put_many(
        &self,
        files: Vec<(String, Vec<u8>)>,
        options: &PutOptions,
    ) -> Vec<(String, BatchOutcome)> {
        let concurrency = options.concurrency.unwrap_or(self.batch_concurrency).max(1);
        tracing::debug!(
            "Uploading {} files (concurrency: {})",
            files.len(),
            concurrency
        );

        stream::iter(files)
            .map(|(name, contents)| async move {
                let outcome = match self.upload_image_url(&name, contents).await {
                    Ok(url) => BatchOutcome::Uploaded(url),
                    Err(e) => {
                        tracing::warn!("Batch upload of {} failed: {}", name, e);
                        BatchOutcome::Failed(e.to_string())
                    }
                };
                (name, outcome)
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    pub async fn get_video_info(&self, video_id: &str) -> Result<VideoInfo> {
        self.http
            .get_video_info(&self.advertiser_id, video_id)
            .await
    }

    async fn upload_image(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        options: &PutOptions,
    ) -> Result<UploadResult> {
        match &self.credentials {
            Credentials::Cookie { .. } => {
                let url = self
                    .http
                    .upload_image_with_cookie(&self.advertiser_id, file_name, contents)
                    .await?;
                Ok(UploadResult::ImageUrl(transform_image_url(&url).into_owned()))
            }
            Credentials::Token { .. } => {
                let info = self
                    .http
                    .upload_image_with_token(
                        &self.advertiser_id,
                        file_name,
                        contents,
                        options.include_file_name,
                    )
                    .await?;
                tracing::info!("Image uploaded (image_id: {})", info.image_id);
                Ok(UploadResult::Image(info))
            }
        }
    }

    /// Image pathway reduced to a URL, as reported by `put_many`.
    async fn upload_image_url(&self, file_name: &str, contents: Vec<u8>) -> Result<String> {
        let mime = detect_mime(self.detector.as_ref(), file_name, &contents);
        if MediaKind::from_mime(&mime) != MediaKind::Image {
            return Err(Error::UnsupportedMediaType(mime));
        }

        match &self.credentials {
            Credentials::Cookie { .. } => {
                let url = self
                    .http
                    .upload_image_with_cookie(&self.advertiser_id, file_name, contents)
                    .await?;
                Ok(transform_image_url(&url).into_owned())
            }
            Credentials::Token { .. } => {
                let info = self
                    .http
                    .upload_image_with_token(&self.advertiser_id, file_name, contents, false)
                    .await?;
                let url = info
                    .url
                    .as_deref()
                    .or_else(|| info.extra.get("image_url").and_then(|url| url.as_str()))
                    .filter(|url| !url.is_empty());
                match url {
                    Some(url) => Ok(url.to_string()),
                    None => Err(Error::Upload {
                        message: "Failed to upload image: response has no image url".to_string(),
                        body: serde_json::to_string(&info)?,
                    }),
                }
            }
        }
    }

    async fn upload_video(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        options: &PutOptions,
    ) -> Result<UploadResult> {
        if self.credentials.is_cookie() {
            return Err(Error::Upload {
                message: "Upload video with cookie is not supported".to_string(),
                body: String::new(),
            });
        }

        let video_id = self
            .http
            .upload_video(&self.advertiser_id, file_name, contents, options)
            .await?;

        let info = self
            .http
            .await_video_info(
                &self.advertiser_id,
                &video_id,
                self.video_poll_interval,
                self.video_poll_attempts,
            )
            .await?;
        Ok(UploadResult::Video(info))
    }
}

#[async_trait]
impl MediaUploader for TikTokAdapter {
    async fn put(
        &self,
        file_name: &str,
        contents: &[u8],
        options: &PutOptions,
    ) -> Result<UploadResult> {
        TikTokAdapter::put(self, file_name, contents, options).await
    }

    async fn put_many(
        &self,
        files: Vec<(String, Vec<u8>)>,
        options: &PutOptions,
    ) -> Vec<(String, BatchOutcome)> {
        TikTokAdapter::put_many(self, files, options).await
    }
}

#[async_trait]
impl FilesystemAdapter for TikTokAdapter {
    fn supports(&self, operation: Operation) -> bool {
        matches!(operation, Operation::MimeType | Operation::Visibility)
    }

    /// Visibility is not a concept on the platform; report empty attributes.
    async fn visibility(&self, path: &str) -> Result<FileAttributes> {
        Ok(FileAttributes::new(path))
    }

    async fn mime_type(&self, path: &str) -> Result<FileAttributes> {
        Ok(FileAttributes {
            mime_type: self.detector.detect_from_path(path),
            ..FileAttributes::new(path)
        })
    }
}
