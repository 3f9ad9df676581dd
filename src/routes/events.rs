use std::collections::HashMap;

use axum::{extract::State, response::Json};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::event::{self, Entity as Event};
use crate::entities::event_image::{self, Entity as EventImage};
use crate::entities::event_video::{self, Entity as EventVideo};
use crate::error::AppError;
use crate::extract::{ApiPath, EventPayload};
use crate::models::event::{
    EventFields, EventIdResponse, EventListResponse, EventResponse, MediaRef, MessageResponse,
};
use crate::services::media::{self, MediaService};
use crate::state::AppState;

const DUPLICATE_NAME: &str = "An event with this name already exists";

pub(crate) async fn find_event(
    db: &sea_orm::DatabaseConnection,
    event_id: i32,
) -> Result<event::Model, AppError> {
    Event::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("Event not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "All events with their images and video", body = EventListResponse)
    ),
    tag = "Events"
)]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<EventListResponse>, AppError> {
    let events = Event::find()
        .order_by_asc(event::Column::Id)
        .all(&state.db)
        .await?;
    let event_ids: Vec<i32> = events.iter().map(|e| e.id).collect();

    let mut images: HashMap<i32, Vec<MediaRef>> = HashMap::new();
    for image in EventImage::find()
        .filter(event_image::Column::EventId.is_in(event_ids.clone()))
        .order_by_asc(event_image::Column::Id)
        .all(&state.db)
        .await?
    {
        images.entry(image.event_id).or_default().push(MediaRef {
            id: image.id,
            url: state.storage.url_for(&image.file),
        });
    }

    let mut videos: HashMap<i32, MediaRef> = EventVideo::find()
        .filter(event_video::Column::EventId.is_in(event_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|video| {
            (
                video.event_id,
                MediaRef {
                    id: video.id,
                    url: state.storage.url_for(&video.file),
                },
            )
        })
        .collect();

    let events = events
        .into_iter()
        .map(|e| EventResponse {
            images: images.remove(&e.id).unwrap_or_default(),
            video: videos.remove(&e.id),
            id: e.id,
            name: e.name,
            description: e.description,
            date: e.date.to_string(),
        })
        .collect();

    Ok(Json(EventListResponse { events }))
}

#[utoipa::path(
    post,
    path = "/",
    request_body(
        content = EventFields,
        description = "JSON, or multipart/form-data with optional `images` files and a `video` file"
    ),
    responses(
        (status = 200, description = "Event created", body = EventIdResponse),
        (status = 400, description = "Malformed body or missing fields"),
        (status = 409, description = "Event name already taken")
    ),
    tag = "Events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    payload: EventPayload,
) -> Result<Json<EventIdResponse>, AppError> {
    let kind = payload.kind();
    let (fields, images, video) = payload.into_parts();
    let new_event = fields.into_new_event()?;

    let event = event::ActiveModel {
        name: Set(new_event.name),
        description: Set(new_event.description),
        date: Set(new_event.date),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_NAME))?;

    let media = MediaService::new(&state.db, &state.storage);
    let added = if images.is_empty() {
        0
    } else {
        media.add_images(&event, images).await?
    };
    if let Some(video) = video {
        media.set_video(&event, video).await?;
    }

    tracing::info!(event_id = event.id, name = %event.name, body = ?kind, images = added, "Event created");
    Ok(Json(EventIdResponse::success(event.id)))
}

#[utoipa::path(
    put,
    path = "/{id}/",
    params(
        ("id" = i32, Path, description = "Event ID")
    ),
    request_body(
        content = EventFields,
        description = "JSON, multipart/form-data (fields plus media) or legacy urlencoded fields"
    ),
    responses(
        (status = 200, description = "Event updated", body = EventIdResponse),
        (status = 400, description = "Malformed body"),
        (status = 404, description = "Event not found"),
        (status = 409, description = "Event name already taken")
    ),
    tag = "Events"
)]
pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i32>,
    payload: Result<EventPayload, AppError>,
) -> Result<Json<EventIdResponse>, AppError> {
    let event = find_event(&state.db, event_id).await?;
    let payload = payload?;
    let kind = payload.kind();
    let (fields, images, video) = payload.into_parts();

    let date = fields.parsed_date()?;
    let mut active_event: event::ActiveModel = event.clone().into();
    if let Some(name) = fields.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("name must not be blank".to_string()));
        }
        active_event.name = Set(name);
    }
    if let Some(description) = fields.description {
        active_event.description = Set(description);
    }
    if let Some(date) = date {
        active_event.date = Set(date);
    }

    let event = if active_event.is_changed() {
        active_event
            .update(&state.db)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, DUPLICATE_NAME))?
    } else {
        event
    };

    let media = MediaService::new(&state.db, &state.storage);
    if !images.is_empty() {
        media.add_images(&event, images).await?;
    }
    if let Some(video) = video {
        media.set_video(&event, video).await?;
    }

    tracing::info!(event_id, body = ?kind, "Event updated");
    Ok(Json(EventIdResponse::success(event.id)))
}

#[utoipa::path(
    delete,
    path = "/{id}/",
    params(
        ("id" = i32, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event and all of its media deleted", body = MessageResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "Events"
)]
pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let event = find_event(&state.db, event_id).await?;
    media::delete_event(&state.db, &state.storage, &event).await?;

    Ok(Json(MessageResponse::success("Event deleted")))
}
