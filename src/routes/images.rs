use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{ApiPath, EventPayload};
use crate::models::event::{ImageListResponse, ImagesAddedResponse, MessageResponse};
use crate::routes::events::find_event;
use crate::services::media::MediaService;
use crate::state::AppState;

/// Matches both `/images/{event_id}/` and `/images/{event_id}/{image_id}/`.
#[derive(Debug, Deserialize)]
pub struct ImagePath {
    pub event_id: i32,
    pub image_id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/images/{event_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Images of the event", body = ImageListResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "Event Media"
)]
pub async fn list_images(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ImagePath>,
) -> Result<Json<ImageListResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let images = MediaService::new(&state.db, &state.storage)
        .list_images(&event)
        .await?;

    Ok(Json(ImageListResponse { images }))
}

#[utoipa::path(
    method(post, put),
    path = "/images/{event_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID")
    ),
    request_body(content = Vec<u8>, content_type = "multipart/form-data", description = "`images` file parts"),
    responses(
        (status = 200, description = "Images appended up to the cap of five", body = ImagesAddedResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "Event Media"
)]
pub async fn add_images(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ImagePath>,
    payload: Result<EventPayload, AppError>,
) -> Result<Json<ImagesAddedResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let (_, images, _) = payload?.into_parts();

    let added = MediaService::new(&state.db, &state.storage)
        .add_images(&event, images)
        .await?;

    Ok(Json(ImagesAddedResponse {
        status: "success".to_string(),
        added,
        event_id: event.id,
    }))
}

#[utoipa::path(
    delete,
    path = "/images/{event_id}/{image_id}/",
    params(
        ("event_id" = i32, Path, description = "Event ID"),
        ("image_id" = i32, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image and its file deleted", body = MessageResponse),
        (status = 404, description = "Event or image not found")
    ),
    tag = "Event Media"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    ApiPath(path): ApiPath<ImagePath>,
) -> Result<Json<MessageResponse>, AppError> {
    let event = find_event(&state.db, path.event_id).await?;
    let image_id = path
        .image_id
        .ok_or(AppError::NotFound("Image not found".to_string()))?;

    MediaService::new(&state.db, &state.storage)
        .delete_image(&event, image_id)
        .await?;

    Ok(Json(MessageResponse::success("Image deleted")))
}
