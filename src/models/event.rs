use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Event fields as sent by clients. Every field is optional so the same
/// shape serves creation (all required) and partial updates.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct EventFields {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2025-01-01")]
    pub date: Option<String>,
}

/// Validated fields for a new event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
}

impl EventFields {
    pub fn into_new_event(self) -> Result<NewEvent, AppError> {
        match (self.name, self.description, self.date) {
            (Some(name), Some(description), Some(date)) if !name.trim().is_empty() => {
                Ok(NewEvent {
                    name,
                    description,
                    date: parse_date(&date)?,
                })
            }
            _ => Err(AppError::BadRequest(
                "name, description and date are required".to_string(),
            )),
        }
    }

    pub fn parsed_date(&self) -> Result<Option<NaiveDate>, AppError> {
        self.date.as_deref().map(parse_date).transpose()
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MediaRef {
    pub id: i32,
    pub url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    #[schema(example = "2025-01-01")]
    pub date: String,
    pub images: Vec<MediaRef>,
    pub video: Option<MediaRef>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EventIdResponse {
    pub status: String,
    pub event_id: i32,
}

impl EventIdResponse {
    pub fn success(event_id: i32) -> Self {
        Self {
            status: "success".to_string(),
            event_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub status: String,
    pub message: String,
}

impl MessageResponse {
    pub fn success(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageListResponse {
    pub images: Vec<MediaRef>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImagesAddedResponse {
    pub status: String,
    pub added: u64,
    pub event_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoResponse {
    pub video: Option<MediaRef>,
}
