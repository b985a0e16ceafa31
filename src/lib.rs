//! Write-only storage adapter backed by the TikTok Ads media library
//!
//! Writing an image or video uploads it to the advertiser's creative library
//! and returns the platform's record of it. Authentication uses either a
//! Business API access token or a captured ads-manager browser session.

pub mod adapter;
pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod identity;
pub mod media;
pub mod models;
pub mod storage;
pub mod url;

pub use adapter::TikTokAdapter;
pub use config::Config;
pub use error::{Error, Result};
