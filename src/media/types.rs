//! Media file, upload and listing types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{BaseResponse, Pagination, ValidationErrors};
use crate::config::defaults;

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Kind of media the platform accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
    Audio,
    Document,
    Sticker,
}

impl MediaType {
    pub const ALL: [Self; 5] = [
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Document,
        Self::Sticker,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Document => "document",
            Self::Sticker => "sticker",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// Largest upload accepted for this type, in bytes.
    #[must_use]
    pub const fn max_file_size(self) -> u64 {
        match self {
            Self::Image => 5 * MIB,
            Self::Video | Self::Audio => 16 * MIB,
            Self::Document => 100 * MIB,
            Self::Sticker => 500 * KIB,
        }
    }

    /// MIME types accepted for this type. Stickers have no list of their own.
    #[must_use]
    pub const fn mime_types(self) -> &'static [&'static str] {
        match self {
            Self::Image => &["image/jpeg", "image/png", "image/webp", "image/gif"],
            Self::Video => &[
                "video/mp4",
                "video/3gpp",
                "video/quicktime",
                "video/avi",
                "video/mkv",
            ],
            Self::Audio => &[
                "audio/aac",
                "audio/mp4",
                "audio/mpeg",
                "audio/amr",
                "audio/ogg",
                "audio/opus",
            ],
            Self::Document => &[
                "application/pdf",
                "application/vnd.ms-powerpoint",
                "application/msword",
                "application/vnd.ms-excel",
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                "application/vnd.openxmlformats-officedocument.presentationml.presentation",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                "text/plain",
                "text/csv",
            ],
            Self::Sticker => &[],
        }
    }

    #[must_use]
    pub fn supports_mime_type(self, mime_type: &str) -> bool {
        self.mime_types().contains(&mime_type)
    }

    /// The type whose MIME list contains `mime_type`, if any.
    #[must_use]
    pub fn from_mime_type(mime_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.supports_mime_type(mime_type))
    }

    /// # Errors
    ///
    /// Returns a message naming both sizes when `size` is over the limit.
    pub fn check_size(self, size: u64) -> Result<(), String> {
        let max = self.max_file_size();
        if size > max {
            return Err(format!(
                "file size {size} bytes exceeds maximum allowed size {max} bytes for media type {self}"
            ));
        }
        Ok(())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks a file before upload: name, MIME type and size limit.
///
/// # Errors
///
/// Returns every failed check.
pub fn validate_upload(file_name: &str, size: u64, mime_type: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.check(file_name.is_empty(), "fileName", "fileName is required");
    match MediaType::from_mime_type(mime_type) {
        Some(media_type) => {
            if let Err(message) = media_type.check_size(size) {
                errors.add("size", message);
            }
        }
        None => errors.add("mimeType", format!("unsupported MIME type: {mime_type}")),
    }
    errors.into_result()
}

/// A stored media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaFile {
    pub id: String,
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Seconds, audio and video only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// `uploading`, `processing`, `ready`, `failed` or `deleted`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
}

impl MediaFile {
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.is_kind(MediaType::Image)
    }

    #[must_use]
    pub fn is_video(&self) -> bool {
        self.is_kind(MediaType::Video)
    }

    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.is_kind(MediaType::Audio)
    }

    #[must_use]
    pub fn is_document(&self) -> bool {
        self.is_kind(MediaType::Document)
    }

    fn is_kind(&self, kind: MediaType) -> bool {
        self.mime_type == kind.as_str() || kind.supports_mime_type(&self.mime_type)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        matches!(self.status.as_str(), "processing" | "uploading")
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == "failed"
    }

    #[must_use]
    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Extension including the dot, e.g. `.pdf`; empty when there is none.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.file_name
            .rfind('.')
            .map_or("", |i| &self.file_name[i..])
    }

    /// Size in binary units, e.g. `1.5 MB`.
    #[must_use]
    pub fn format_size(&self) -> String {
        if self.size < KIB {
            return format!("{} B", self.size);
        }
        let mut div = KIB;
        let mut exp = 0;
        let mut n = self.size / KIB;
        while n >= KIB {
            div *= KIB;
            exp += 1;
            n /= KIB;
        }
        #[allow(clippy::cast_precision_loss)]
        let value = self.size as f64 / div as f64;
        let unit = ['K', 'M', 'G', 'T', 'P', 'E'][exp];
        format!("{value:.1} {unit}B")
    }
}

/// A file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub file: Vec<u8>,
    pub file_name: String,
    pub media_type: MediaType,
    pub caption: Option<String>,
    pub description: Option<String>,
}

impl UploadRequest {
    #[must_use]
    pub fn new(file: Vec<u8>, file_name: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            file,
            file_name: file_name.into(),
            media_type,
            caption: None,
            description: None,
        }
    }

    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// # Errors
    ///
    /// Returns every missing field and an oversize file.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.file.is_empty(), "file", "file is required");
        errors.check(self.file_name.is_empty(), "fileName", "fileName is required");
        if let Err(message) = self.media_type.check_size(self.file.len() as u64) {
            errors.add("file", message);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub media: MediaFile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub media: MediaFile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
}

/// A page of media files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaListResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    #[serde(flatten)]
    pub pagination: Pagination,
    pub media: Vec<MediaFile>,
}

/// Paging and filters for [`list_media`](super::MediaService::list_media).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMediaParams {
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    pub media_type: Option<MediaType>,
    pub status: Option<String>,
}

impl GetMediaParams {
    pub(crate) fn query(&self) -> [(&'static str, Option<String>); 4] {
        let size = self.page_size.filter(|&s| s > 0).unwrap_or(defaults::PAGE_SIZE);
        let number = self.page_number.filter(|&n| n > 0).unwrap_or(1);
        [
            ("pageSize", Some(size.to_string())),
            ("pageNumber", Some(number.to_string())),
            ("mediaType", self.media_type.map(|t| t.as_str().to_string())),
            ("status", self.status.clone().filter(|s| !s.is_empty())),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediaStats {
    pub total_files: u64,
    pub total_size: u64,
    pub image_count: u64,
    pub video_count: u64,
    pub audio_count: u64,
    pub document_count: u64,
    pub other_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaStatsResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub stats: MediaStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str, size: u64) -> MediaFile {
        MediaFile {
            file_name: name.to_string(),
            mime_type: mime.to_string(),
            size,
            ..MediaFile::default()
        }
    }

    #[test]
    fn size_limits_per_type() {
        assert!(MediaType::Image.check_size(5 * MIB).is_ok());
        assert!(MediaType::Image.check_size(5 * MIB + 1).is_err());
        assert!(MediaType::Video.check_size(16 * MIB).is_ok());
        assert!(MediaType::Audio.check_size(16 * MIB + 1).is_err());
        assert!(MediaType::Document.check_size(100 * MIB).is_ok());
        assert_eq!(
            MediaType::Sticker.check_size(600 * KIB).unwrap_err(),
            "file size 614400 bytes exceeds maximum allowed size 512000 bytes for media type sticker"
        );
    }

    #[test]
    fn upload_check_uses_mime_type() {
        assert!(validate_upload("a.png", 1024, "image/png").is_ok());

        let errors = validate_upload("a.png", 6 * MIB, "image/png").unwrap_err();
        assert_eq!(errors.errors()[0].field, "size");

        let errors = validate_upload("", 10, "application/zip").unwrap_err();
        let messages: Vec<_> = errors.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            ["fileName is required", "unsupported MIME type: application/zip"]
        );
    }

    #[test]
    fn file_kind_and_extension() {
        let pdf = file("report.final.pdf", "application/pdf", 0);
        assert!(pdf.is_document());
        assert!(!pdf.is_image());
        assert_eq!(pdf.extension(), ".pdf");
        assert_eq!(file("README", "text/plain", 0).extension(), "");
    }

    #[test]
    fn human_sizes() {
        assert_eq!(file("a", "", 512).format_size(), "512 B");
        assert_eq!(file("a", "", 1536).format_size(), "1.5 KB");
        assert_eq!(file("a", "", 5 * MIB).format_size(), "5.0 MB");
    }

    #[test]
    fn list_query_defaults() {
        let params = GetMediaParams {
            media_type: Some(MediaType::Video),
            ..GetMediaParams::default()
        };
        let query: Vec<_> = params.query().into_iter().filter_map(|(k, v)| v.map(|v| (k, v))).collect();
        assert_eq!(
            query,
            [
                ("pageSize", "20".to_string()),
                ("pageNumber", "1".to_string()),
                ("mediaType", "video".to_string())
            ]
        );
    }
}
