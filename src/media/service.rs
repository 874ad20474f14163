//! Media façade.

use std::sync::Arc;

use crate::api::{ApiExecutor, ApiRequest, Error, ValidationError, path_segment, with_query};
use crate::config::defaults;
use crate::context::Context;

use super::multipart::Form;
use super::{
    GetMediaParams, MediaFile, MediaListResponse, MediaResponse, MediaStatsResponse, MediaType,
    UploadRequest, UploadResponse,
};

fn require_file_name(file_name: &str) -> Result<(), Error> {
    if file_name.is_empty() {
        return Err(ValidationError::new("fileName", "fileName is required").into());
    }
    Ok(())
}

/// Upload, lookup and housekeeping of media files.
pub struct MediaService<E> {
    executor: Arc<E>,
}

impl<E> Clone for MediaService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> std::fmt::Debug for MediaService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService").finish_non_exhaustive()
    }
}

impl<E> MediaService<E> {
    #[must_use]
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

impl<E: ApiExecutor> MediaService<E> {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty name, otherwise the
    /// executor's error.
    pub async fn get_media_by_file_name(
        &self,
        ctx: &Context,
        file_name: &str,
    ) -> Result<MediaResponse, Error> {
        require_file_name(file_name)?;
        let path = format!("/api/v1/getMediaByFileName/{}", path_segment(file_name));
        self.executor.execute(ctx, ApiRequest::get(path)).await
    }

    /// Uploads one file as `multipart/form-data`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty or oversize file,
    /// otherwise the executor's error.
    pub async fn upload_media(
        &self,
        ctx: &Context,
        request: &UploadRequest,
    ) -> Result<UploadResponse, Error> {
        request.validate()?;
        let (content_type, body) = Form::new(&request.file)
            .file("file", &request.file_name, &request.file)
            .text("mediaType", request.media_type.as_str())
            .optional_text("caption", request.caption.as_deref())
            .optional_text("description", request.description.as_deref())
            .finish();
        tracing::debug!(
            file = %request.file_name,
            media_type = %request.media_type,
            bytes = request.file.len(),
            "Uploading media"
        );
        let request = ApiRequest::post("/api/v1/uploadMedia").raw(content_type, body);
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// As [`MediaService::upload_media`].
    pub async fn upload_image(
        &self,
        ctx: &Context,
        file: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<UploadResponse, Error> {
        self.upload_captioned(ctx, file, file_name, MediaType::Image, caption)
            .await
    }

    /// # Errors
    ///
    /// As [`MediaService::upload_media`].
    pub async fn upload_video(
        &self,
        ctx: &Context,
        file: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<UploadResponse, Error> {
        self.upload_captioned(ctx, file, file_name, MediaType::Video, caption)
            .await
    }

    /// # Errors
    ///
    /// As [`MediaService::upload_media`].
    pub async fn upload_audio(
        &self,
        ctx: &Context,
        file: Vec<u8>,
        file_name: &str,
    ) -> Result<UploadResponse, Error> {
        let request = UploadRequest::new(file, file_name, MediaType::Audio);
        self.upload_media(ctx, &request).await
    }

    /// # Errors
    ///
    /// As [`MediaService::upload_media`].
    pub async fn upload_document(
        &self,
        ctx: &Context,
        file: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<UploadResponse, Error> {
        self.upload_captioned(ctx, file, file_name, MediaType::Document, caption)
            .await
    }

    async fn upload_captioned(
        &self,
        ctx: &Context,
        file: Vec<u8>,
        file_name: &str,
        media_type: MediaType,
        caption: &str,
    ) -> Result<UploadResponse, Error> {
        let mut request = UploadRequest::new(file, file_name, media_type);
        if !caption.is_empty() {
            request = request.with_caption(caption);
        }
        self.upload_media(ctx, &request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty name, otherwise the
    /// executor's error.
    pub async fn delete_media(&self, ctx: &Context, file_name: &str) -> Result<(), Error> {
        require_file_name(file_name)?;
        let path = format!("/api/v1/deleteMedia/{}", path_segment(file_name));
        self.executor
            .execute_discarding(ctx, ApiRequest::delete(path))
            .await
    }

    /// Public URL of a stored file.
    ///
    /// # Errors
    ///
    /// As [`MediaService::get_media_by_file_name`].
    pub async fn get_media_url(&self, ctx: &Context, file_name: &str) -> Result<String, Error> {
        Ok(self.get_media_info(ctx, file_name).await?.url)
    }

    /// # Errors
    ///
    /// As [`MediaService::get_media_by_file_name`].
    pub async fn get_media_info(&self, ctx: &Context, file_name: &str) -> Result<MediaFile, Error> {
        Ok(self.get_media_by_file_name(ctx, file_name).await?.media)
    }

    /// # Errors
    ///
    /// As [`MediaService::get_media_by_file_name`].
    pub async fn is_media_ready(&self, ctx: &Context, file_name: &str) -> Result<bool, Error> {
        Ok(self.get_media_info(ctx, file_name).await?.is_ready())
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn list_media(
        &self,
        ctx: &Context,
        params: &GetMediaParams,
    ) -> Result<MediaListResponse, Error> {
        let path = with_query("/api/v1/media", params.query());
        self.executor.execute(ctx, ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_media_stats(&self, ctx: &Context) -> Result<MediaStatsResponse, Error> {
        self.executor
            .execute(ctx, ApiRequest::get("/api/v1/media/stats"))
            .await
    }

    /// One page of files of `media_type`; `params` supplies paging.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_media_by_type(
        &self,
        ctx: &Context,
        media_type: MediaType,
        params: GetMediaParams,
    ) -> Result<MediaListResponse, Error> {
        let params = GetMediaParams {
            media_type: Some(media_type),
            ..params
        };
        self.list_media(ctx, &params).await
    }

    /// Lists one page and keeps files whose stored or original name
    /// contains `query`, ignoring case. `total_count` is the number kept.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn search_media(
        &self,
        ctx: &Context,
        query: &str,
        params: &GetMediaParams,
    ) -> Result<MediaListResponse, Error> {
        let mut response = self.list_media(ctx, params).await?;
        let needle = query.to_lowercase();
        response.media.retain(|m| {
            m.file_name.to_lowercase().contains(&needle)
                || m
                    .original_name
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        });
        response.pagination.total_count = u32::try_from(response.media.len()).unwrap_or(u32::MAX);
        Ok(response)
    }

    /// Polls once per second, up to `max_polls` times, until the file is
    /// ready.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MediaFailed`] if processing failed,
    /// [`Error::MediaTimeout`] when the polls run out and
    /// [`Error::Cancelled`] if `ctx` finishes while waiting.
    pub async fn wait_for_media_ready(
        &self,
        ctx: &Context,
        file_name: &str,
        max_polls: u32,
    ) -> Result<MediaFile, Error> {
        for poll in 1..=max_polls {
            let media = self.get_media_info(ctx, file_name).await?;
            if media.is_ready() {
                return Ok(media);
            }
            if media.is_failed() {
                return Err(Error::MediaFailed(file_name.to_string()));
            }
            tracing::debug!(file = %file_name, status = %media.status, poll, "Media not ready yet");
            ctx.run(tokio::time::sleep(defaults::media_poll_interval()))
                .await?;
        }
        Err(Error::MediaTimeout(file_name.to_string()))
    }
}
