//! Media uploads and the media library.

mod multipart;
mod service;
mod types;


pub use service::MediaService;
pub use types::{
    GetMediaParams, MediaFile, MediaListResponse, MediaResponse, MediaStats, MediaStatsResponse,
    MediaType, UploadRequest, UploadResponse, validate_upload,
};
