mod auth;
mod events;
mod images;
mod videos;

use axum::{
    extract::{rejection::RawPathParamsRejection, DefaultBodyLimit, RawPathParams},
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::error::AppError;
use crate::middleware::session::require_session;
use crate::state::AppState;

// Define the OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Event endpoints
        events::list_events,
        events::create_event,
        events::update_event,
        events::delete_event,
        // Event media endpoints
        images::list_images,
        images::add_images,
        images::delete_image,
        videos::get_video,
        videos::set_video,
        videos::delete_video,
        // Authentication endpoints
        auth::login,
        auth::logout,
        auth::get_csrf_token,
        auth::check_user,
        auth::change_password,
    ),
    components(
        schemas(
            // Event schemas
            crate::models::event::EventFields,
            crate::models::event::MediaRef,
            crate::models::event::EventResponse,
            crate::models::event::EventListResponse,
            crate::models::event::EventIdResponse,
            crate::models::event::MessageResponse,
            crate::models::event::ImageListResponse,
            crate::models::event::ImagesAddedResponse,
            crate::models::event::VideoResponse,
            // Auth schemas
            auth::LoginRequest,
            auth::LoginResponse,
            auth::StatusResponse,
            auth::CsrfTokenResponse,
            auth::CheckUserRequest,
            auth::CheckUserResponse,
            auth::UserSummary,
            auth::ChangePasswordRequest,
        )
    ),
    tags(
        (name = "Events", description = "Create, list, update and delete events"),
        (name = "Event Media", description = "Images (at most five) and the single video of an event"),
        (name = "Authentication", description = "Login, logout, CSRF token, user lookup and password change")
    ),
    info(
        title = "EventMediaKit API",
        version = "0.1.0",
        description = "Event records with attached images and video, backed by a relational store and a local media root",
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

// Session tokens are sent as `Authorization: Bearer <token>`
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session_token",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer
                )
            ),
        );
    }
}

// Ids are integers, so a path that cannot name a record is a 404 whatever the method
async fn method_not_allowed(
    params: Result<RawPathParams, RawPathParamsRejection>,
) -> AppError {
    if let Ok(params) = params {
        if params.iter().any(|(_, value)| value.parse::<i32>().is_err()) {
            return AppError::NotFound("Not found".to_string());
        }
    }
    AppError::MethodNotAllowed("Method not allowed".to_string())
}

fn with_405(router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    router.fallback(method_not_allowed)
}

pub fn create_cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-csrftoken"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

pub fn create_routes(state: AppState) -> Router {
    // Swagger UI (stateless)
    let swagger_router: Router = SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into();

    // Routes that require a live session
    let session_routes = Router::new()
        .route("/logout/", with_405(post(auth::logout)))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let image_routes = || {
        with_405(
            get(images::list_images)
                .post(images::add_images)
                .put(images::add_images)
                .delete(images::delete_image),
        )
    };
    let video_routes = || {
        with_405(
            get(videos::get_video)
                .post(videos::set_video)
                .put(videos::set_video)
                .delete(videos::delete_video),
        )
    };

    let mut app_routes = Router::new()
        .route("/", with_405(get(events::list_events).post(events::create_event)))
        .route(
            "/{event_id}/",
            with_405(axum::routing::put(events::update_event).delete(events::delete_event)),
        )
        .route("/images/{event_id}/", image_routes())
        .route("/images/{event_id}/{image_id}/", image_routes())
        .route("/videos/{event_id}/", video_routes())
        .route("/videos/{event_id}/{video_id}/", video_routes())
        .route("/login/", with_405(post(auth::login)))
        .route("/get-csrf-token/", with_405(get(auth::get_csrf_token)))
        .route("/check-user/", with_405(post(auth::check_user)))
        .route("/change-password/", with_405(post(auth::change_password)))
        .merge(session_routes);

    // Media files are served straight from the media root when the prefix is local
    let media_prefix = state.config.media_url.trim_end_matches('/').to_string();
    if media_prefix.starts_with('/') && !media_prefix.is_empty() {
        app_routes = app_routes.nest_service(
            &media_prefix,
            ServeDir::new(state.config.media_root.clone()),
        );
    }

    let cors = create_cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .merge(swagger_router)
        .merge(app_routes.with_state(state))
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
