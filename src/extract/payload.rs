use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};

use crate::error::AppError;
use crate::models::event::EventFields;
use crate::models::upload::UploadedFile;

/// Body encodings accepted by the event endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Multipart,
    /// Legacy `application/x-www-form-urlencoded`, also the fallback for
    /// any other or missing content type.
    Form,
}

impl BodyKind {
    pub fn sniff(content_type: Option<&str>) -> Self {
        let mime = content_type
            .unwrap_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if mime == "application/json" || mime.ends_with("+json") {
            BodyKind::Json
        } else if mime.starts_with("multipart/") {
            BodyKind::Multipart
        } else {
            BodyKind::Form
        }
    }
}

/// A parsed event request body. Only multipart bodies carry files.
#[derive(Debug)]
pub enum EventPayload {
    Json(EventFields),
    Multipart {
        fields: EventFields,
        images: Vec<UploadedFile>,
        video: Option<UploadedFile>,
    },
    Form(EventFields),
}

impl EventPayload {
    pub fn kind(&self) -> BodyKind {
        match self {
            EventPayload::Json(_) => BodyKind::Json,
            EventPayload::Multipart { .. } => BodyKind::Multipart,
            EventPayload::Form(_) => BodyKind::Form,
        }
    }

    pub fn into_parts(self) -> (EventFields, Vec<UploadedFile>, Option<UploadedFile>) {
        match self {
            EventPayload::Json(fields) | EventPayload::Form(fields) => (fields, Vec::new(), None),
            EventPayload::Multipart {
                fields,
                images,
                video,
            } => (fields, images, video),
        }
    }
}

impl<S> FromRequest<S> for EventPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        match BodyKind::sniff(content_type.as_deref()) {
            BodyKind::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))?;
                let fields = serde_json::from_slice::<EventFields>(&bytes)
                    .map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))?;
                Ok(EventPayload::Json(fields))
            }
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state).await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid multipart data: {}", e.body_text()))
                })?;
                read_multipart(multipart).await
            }
            BodyKind::Form => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
                Ok(EventPayload::Form(parse_form(&bytes)))
            }
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<EventPayload, AppError> {
    let mut fields = EventFields::default();
    let mut images = Vec::new();
    let mut video = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "images" | "images[]" | "video" => {
                // Browsers send an empty part for an untouched file input.
                let Some(file_name) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string) else {
                    continue;
                };
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                let file = UploadedFile {
                    file_name,
                    content_type,
                    data,
                };
                if name == "video" {
                    video = Some(file);
                } else {
                    images.push(file);
                }
            }
            "name" => fields.name = Some(field.text().await?),
            "description" => fields.description = Some(field.text().await?),
            "date" => fields.date = Some(field.text().await?),
            _ => {
                tracing::debug!(field = %name, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(EventPayload::Multipart {
        fields,
        images,
        video,
    })
}

fn parse_form(body: &[u8]) -> EventFields {
    let mut fields = EventFields::default();
    for (key, value) in url::form_urlencoded::parse(body) {
        match key.as_ref() {
            "name" => fields.name = Some(value.into_owned()),
            "description" => fields.description = Some(value.into_owned()),
            "date" => fields.date = Some(value.into_owned()),
            _ => {}
        }
    }
    fields
}
