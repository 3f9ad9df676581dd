use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::entities::event_image::{self, Entity as EventImage};
use crate::entities::event_video::{self, Entity as EventVideo};
use crate::entities::event::{self, Entity as Event};
use crate::error::AppError;
use crate::models::event::MediaRef;
use crate::models::upload::UploadedFile;
use crate::services::storage::{MediaKind, MediaStorage};

pub const MAX_IMAGES_PER_EVENT: u64 = 5;

/// Media lifecycle rules for a single connection (pool or transaction).
///
/// Images are capped at [`MAX_IMAGES_PER_EVENT`] per event and an event owns
/// at most one video. Every record removal deletes the backing file first.
/// The cap and the singleton are read-then-write checks without locking.
pub struct MediaService<'a, C: ConnectionTrait> {
    conn: &'a C,
    storage: &'a MediaStorage,
}

impl<'a, C: ConnectionTrait> MediaService<'a, C> {
    pub fn new(conn: &'a C, storage: &'a MediaStorage) -> Self {
        Self { conn, storage }
    }

    /// Stores files as images until the event reaches the cap. Files beyond
    /// the cap are dropped. Returns how many were added.
    pub async fn add_images(
        &self,
        event: &event::Model,
        files: Vec<UploadedFile>,
    ) -> Result<u64, AppError> {
        let mut current_count = EventImage::find()
            .filter(event_image::Column::EventId.eq(event.id))
            .count(self.conn)
            .await?;

        let offered = files.len();
        let mut added = 0;
        for file in files {
            if current_count >= MAX_IMAGES_PER_EVENT {
                break;
            }

            let key = MediaStorage::object_key(MediaKind::Image, &event.name, &file.file_name);
            self.storage.put_object(&key, &file.data).await?;

            let image = event_image::ActiveModel {
                event_id: Set(event.id),
                file: Set(key.clone()),
                ..Default::default()
            };
            if let Err(e) = image.insert(self.conn).await {
                discard_file(self.storage, &key).await;
                return Err(e.into());
            }

            current_count += 1;
            added += 1;
        }

        if (added as usize) < offered {
            tracing::info!(
                event_id = event.id,
                offered,
                added,
                "Image cap reached, extra files dropped"
            );
        }

        Ok(added)
    }

    pub async fn list_images(&self, event: &event::Model) -> Result<Vec<MediaRef>, AppError> {
        let images = EventImage::find()
            .filter(event_image::Column::EventId.eq(event.id))
            .order_by_asc(event_image::Column::Id)
            .all(self.conn)
            .await?;

        Ok(images
            .into_iter()
            .map(|img| MediaRef {
                id: img.id,
                url: self.storage.url_for(&img.file),
            })
            .collect())
    }

    pub async fn delete_image(&self, event: &event::Model, image_id: i32) -> Result<(), AppError> {
        let image = EventImage::find_by_id(image_id)
            .filter(event_image::Column::EventId.eq(event.id))
            .one(self.conn)
            .await?
            .ok_or(AppError::NotFound("Image not found".to_string()))?;

        self.storage.delete_object(&image.file).await?;
        EventImage::delete_by_id(image.id).exec(self.conn).await?;

        tracing::info!(event_id = event.id, image_id, "Image deleted");
        Ok(())
    }

    /// Creates the event's video, or replaces the file of the existing one
    /// in place. The old file is removed once the record points at the new one.
    pub async fn set_video(
        &self,
        event: &event::Model,
        file: UploadedFile,
    ) -> Result<event_video::Model, AppError> {
        let existing = self.find_video(event).await?;

        let key = MediaStorage::object_key(MediaKind::Video, &event.name, &file.file_name);
        self.storage.put_object(&key, &file.data).await?;

        let result = match existing {
            Some(video) => {
                let old_key = video.file.clone();
                let mut active_video: event_video::ActiveModel = video.into();
                active_video.file = Set(key.clone());
                let updated = active_video.update(self.conn).await;
                if updated.is_ok() {
                    if let Err(e) = self.storage.delete_object(&old_key).await {
                        tracing::warn!(key = %old_key, error = %e, "Failed to remove replaced video file");
                    }
                }
                updated
            }
            None => {
                event_video::ActiveModel {
                    event_id: Set(event.id),
                    file: Set(key.clone()),
                    ..Default::default()
                }
                .insert(self.conn)
                .await
            }
        };

        match result {
            Ok(video) => {
                tracing::info!(event_id = event.id, video_id = video.id, size = file.size(), "Video stored");
                Ok(video)
            }
            Err(e) => {
                discard_file(self.storage, &key).await;
                Err(e.into())
            }
        }
    }

    pub async fn get_video(&self, event: &event::Model) -> Result<Option<MediaRef>, AppError> {
        Ok(self.find_video(event).await?.map(|video| MediaRef {
            id: video.id,
            url: self.storage.url_for(&video.file),
        }))
    }

    pub async fn delete_video(&self, event: &event::Model, video_id: i32) -> Result<(), AppError> {
        let video = self
            .find_video(event)
            .await?
            .filter(|video| video.id == video_id)
            .ok_or(AppError::NotFound("Video not found".to_string()))?;

        self.storage.delete_object(&video.file).await?;
        EventVideo::delete_by_id(video.id).exec(self.conn).await?;

        tracing::info!(event_id = event.id, video_id, "Video deleted");
        Ok(())
    }

    /// Deletes every image and the video of the event: all files first, then
    /// the rows.
    pub async fn purge_all_media(&self, event: &event::Model) -> Result<(), AppError> {
        let images = EventImage::find()
            .filter(event_image::Column::EventId.eq(event.id))
            .all(self.conn)
            .await?;
        let video = self.find_video(event).await?;

        for image in &images {
            self.storage.delete_object(&image.file).await?;
        }
        if let Some(video) = &video {
            self.storage.delete_object(&video.file).await?;
        }

        EventImage::delete_many()
            .filter(event_image::Column::EventId.eq(event.id))
            .exec(self.conn)
            .await?;
        EventVideo::delete_many()
            .filter(event_video::Column::EventId.eq(event.id))
            .exec(self.conn)
            .await?;

        tracing::info!(
            event_id = event.id,
            images = images.len(),
            video = video.is_some(),
            "Event media purged"
        );
        Ok(())
    }

    async fn find_video(&self, event: &event::Model) -> Result<Option<event_video::Model>, AppError> {
        Ok(EventVideo::find()
            .filter(event_video::Column::EventId.eq(event.id))
            .one(self.conn)
            .await?)
    }
}

/// Removes an event with everything it owns. Files go first, the media rows
/// and the event row are deleted in one transaction.
pub async fn delete_event(
    db: &DatabaseConnection,
    storage: &MediaStorage,
    event: &event::Model,
) -> Result<(), AppError> {
    let txn = db.begin().await?;

    MediaService::new(&txn, storage).purge_all_media(event).await?;
    Event::delete_by_id(event.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(event_id = event.id, name = %event.name, "Event deleted");
    Ok(())
}

/// Best-effort removal of a file whose record was never written.
async fn discard_file(storage: &MediaStorage, key: &str) {
    if let Err(e) = storage.delete_object(key).await {
        tracing::warn!(key, error = %e, "Failed to remove orphaned media file");
    }
}
