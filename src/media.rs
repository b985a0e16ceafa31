//! Media classification
//!
//! Decides which upload pathway a file takes, from its name first and its
//! leading bytes second.

pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_PNG: &str = "image/png";
pub const VIDEO_MP4: &str = "video/mp4";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Pluggable MIME detection.
pub trait MimeTypeDetector: Send + Sync {
    fn detect_from_path(&self, path: &str) -> Option<String>;
    fn detect_from_buffer(&self, bytes: &[u8]) -> Option<String>;
}

/// Extension lookup via `mime_guess`, magic-byte sniffing for buffers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMimeDetector;

impl MimeTypeDetector for DefaultMimeDetector {
    fn detect_from_path(&self, path: &str) -> Option<String> {
        mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }

    fn detect_from_buffer(&self, bytes: &[u8]) -> Option<String> {
        sniff_mime(bytes).map(str::to_string)
    }
}

pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some(IMAGE_JPEG),
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(IMAGE_PNG),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        // ISO base media: box size, then `ftyp` and the major brand.
        [_, _, _, _, b'f', b't', b'y', b'p', b0, b1, b2, b3, ..] => {
            let brand = [*b0, *b1, *b2, *b3];
            let mime = ftyp_brand_mime(&brand);
            if mime.is_none() {
                tracing::debug!(
                    "Unrecognized ftyp brand {:?}",
                    String::from_utf8_lossy(&brand)
                );
            }
            mime
        }
        _ => {
            tracing::debug!(
                "Unrecognized content (first 4 bytes: {:02X?})",
                &bytes[..bytes.len().min(4)]
            );
            None
        }
    }
}

fn ftyp_brand_mime(brand: &[u8; 4]) -> Option<&'static str> {
    match brand {
        b"isom" | b"iso2" | b"iso3" | b"iso4" | b"iso5" | b"iso6" | b"mp41" | b"mp42"
        | b"avc1" | b"dash" | b"M4V " => Some(VIDEO_MP4),
        b"qt  " => Some("video/quicktime"),
        b"heic" | b"heix" | b"mif1" => Some("image/heic"),
        b"avif" => Some("image/avif"),
        b"M4A " => Some("audio/mp4"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    /// Carries the detected MIME type.
    Unsupported(String),
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            IMAGE_JPEG | IMAGE_PNG => MediaKind::Image,
            VIDEO_MP4 => MediaKind::Video,
            other => MediaKind::Unsupported(other.to_string()),
        }
    }
}

/// Detect the MIME type of an upload: extension first, content second.
pub fn detect_mime(detector: &dyn MimeTypeDetector, file_name: &str, contents: &[u8]) -> String {
    detector
        .detect_from_path(file_name)
        .or_else(|| detector.detect_from_buffer(contents))
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

pub fn classify(detector: &dyn MimeTypeDetector, file_name: &str, contents: &[u8]) -> MediaKind {
    MediaKind::from_mime(&detect_mime(detector, file_name, contents))
}
