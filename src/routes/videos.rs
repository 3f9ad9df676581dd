use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{ApiPath, EventPayload};
use crate::models::event::{EventIdResponse, MessageResponse, VideoResponse};
use crate::routes::events::find_event;
use crate::services::media::MediaService;
use crate::state::AppState;

/// Matches both `/videos/{event_id}/` and `/videos/{event_id}/{video_id}/`.
#[derive(Debug, Deserialize)]
pub struct VideoPath {
    pub event_id: i32,
    pub video_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/videos/{event_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "The event's video, or null", body = VideoResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "Event Media"
)]
pub async fn get_video(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<VideoPath>,
) -> Result<Json<VideoResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let video = MediaService::new(&state.db, &state.storage)
        .get_video(&event)
        .await?;

    Ok(Json(VideoResponse { video }))
}

#[utoipa::path(
    method(post, put),
    path = "/videos/{event_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "A `video` file part"),
    responses(
        (status = 200, description = "Video created or replaced", body = EventIdResponse),
        (status = 400, description = "No video provided"),
        (status = 404, description = "Event not found")
    ),
    tag = "Event Media"
)]
pub async fn set_video(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<VideoPath>,
    payload: Result<EventPayload, AppError>,
) -> Result<Json<EventIdResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let (_, _, video) = payload?.into_parts();
    let video = video.ok_or(AppError::BadRequest("No video provided".to_string()))?;

    MediaService::new(&state.db, &state.storage)
        .set_video(&event, video)
        .await?;

    Ok(Json(EventIdResponse::success(event.id)))
}

#[utoipa::path(
    delete,
    path = "/videos/{event_id}/{video_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
        ("video_id" = i32, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video and its file deleted", body = MessageResponse),
        (status = 404, description = "Event not found, or the id is not the event's video")
    ),
    tag = "Event Media"
)]
pub async fn delete_video(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<VideoPath>,
) -> Result<Json<MessageResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let video_id = path
        .video_id
        .ok_or(AppError::NotFound("Video not found".to_string()))?;

    MediaService::new(&state.db, &state.storage)
        .delete_video(&event, video_id)
        .await?;

    Ok(Json(MessageResponse::success("Video deleted")))
}
