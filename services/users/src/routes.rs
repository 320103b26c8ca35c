//! Users service routes

use axum::{
    Json, Router,
    extract::{
        OriginalUri, Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::{TypedHeader, headers::Host};
use common::{
    error::ValidationErrors,
    pagination::{PAGINATION_HEADER, PageRequest, PaginationHeader},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{UserDto, UserToPostDto, UserUpdateDto},
    negotiate::{Format, JSON_CONTENT_TYPE},
    patch::PatchDocument,
    repositories::UpsertOutcome,
    state::AppState,
    validation,
};

/// Methods advertised on the collection resource
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Create the router for the users service
///
/// The user routes are served both under `/api` and at the root.
pub fn create_router(state: AppState) -> Router {
    let users = Router::new()
        .route(
            "/users",
            get(get_users).post(create_user).options(get_options),
        )
        .route(
            "/users/:id",
            get(get_user_by_id)
                .head(head_user_by_id)
                .put(update_user)
                .patch(partially_update_user)
                .delete(delete_user),
        );

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", users.clone())
        .merge(users)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "users-service"
    }))
}

/// Identity from a route constrained to UUIDs; anything else does not match
fn route_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// Absolute base URL of the request, e.g. `http://localhost:3000`
fn base_url(state: &AppState, host: Option<TypedHeader<Host>>) -> String {
    match host {
        Some(TypedHeader(host)) => format!("http://{}", host),
        None => format!("http://{}", state.config.bind_address()),
    }
}

fn body_or_bad_request<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        ApiError::BadRequest(rejection.body_text())
    })
}

/// Get a user by ID
pub async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    format: Result<Format, ApiError>,
) -> ApiResult<Response> {
    let id = route_id(&id)?;
    let user = state
        .user_repository
        .find_by_id(id)
        .await
        .ok_or(ApiError::NotFound)?;

    format?.render("UserDto", &UserDto::from(&user))
}

/// Same lookup as GET, answered with headers only
pub async fn head_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = route_id(&id)?;
    state
        .user_repository
        .find_by_id(id)
        .await
        .ok_or(ApiError::NotFound)?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
    )
        .into_response())
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    host: Option<TypedHeader<Host>>,
    format: Result<Format, ApiError>,
    payload: Result<Json<UserToPostDto>, JsonRejection>,
) -> ApiResult<Response> {
    let user = body_or_bad_request(payload)?;
    validation::validate_new_user(&user)?;
    // a created user always comes with a body, so refuse before storing
    let format = format?;

    let stored = state.user_repository.insert(user.into_entity()).await;
    info!("Created user {} ({})", stored.id, stored.login);

    let location = format!(
        "{}{}/{}",
        base_url(&state, host),
        uri.path().trim_end_matches('/'),
        stored.id
    );
    let body = format.render("guid", &stored.id)?;

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], body).into_response())
}

/// Replace a user, creating it under the given identity if it does not exist
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    OriginalUri(uri): OriginalUri,
    host: Option<TypedHeader<Host>>,
    format: Result<Format, ApiError>,
    payload: Result<Json<UserUpdateDto>, JsonRejection>,
) -> ApiResult<Response> {
    let id = Uuid::parse_str(&id)
        .ok()
        .filter(|id| !id.is_nil())
        .ok_or_else(|| ApiError::BadRequest("A non-empty user identity is required".to_string()))?;
    let update = body_or_bad_request(payload)?;
    validation::validate_user_update(&update)?;

    let user = update.into_entity(id);
    match state.user_repository.update_or_insert(user).await {
        UpsertOutcome::Created => {
            info!("Created user {} through replacement", id);
            let location = format!("{}{}", base_url(&state, host), uri.path());
            let body = format?.render("guid", &id)?;
            Ok((StatusCode::CREATED, [(header::LOCATION, location)], body).into_response())
        }
        UpsertOutcome::Replaced => {
            info!("Replaced user {}", id);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

/// Apply a patch document to a user
pub async fn partially_update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PatchDocument>, JsonRejection>,
) -> ApiResult<Response> {
    let id = route_id(&id)?;
    let patch = body_or_bad_request(payload)?;

    state
        .user_repository
        .update_with(id, |user| -> Result<(), ValidationErrors> {
            let mut projection = UserUpdateDto::from_entity(user);
            let mut errors = ValidationErrors::new();
            patch.apply_to(&mut projection, &mut errors);

            if let Err(validation_errors) = validation::validate_user_update(&projection) {
                errors.merge(validation_errors);
            }
            errors.into_result()?;

            projection.apply_to(user);
            Ok(())
        })
        .await
        .ok_or(ApiError::NotFound)?
        .map_err(|errors| {
            warn!("Patch of user {} rejected: {}", id, errors);
            ApiError::Validation(errors)
        })?;
    info!("Patched user {} with {} operation(s)", id, patch.0.len());

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Delete a user by ID
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = route_id(&id)?;
    if !state.user_repository.delete(id).await {
        return Err(ApiError::NotFound);
    }
    info!("Removed user {}", id);

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// Get one page of users, with navigation metadata in `X-Pagination`
pub async fn get_users(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    host: Option<TypedHeader<Host>>,
    format: Result<Format, ApiError>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<Response> {
    let format = format?;
    let request = query.map(|Query(request)| request).unwrap_or_else(|rejection| {
        warn!("Ignoring malformed page query: {}", rejection.body_text());
        PageRequest::default()
    });
    let settings = &state.config.pagination;
    let (page_number, page_size) =
        request.clamped(settings.default_page_size, settings.max_page_size);

    let page = state
        .user_repository
        .get_page(page_number, page_size)
        .await
        .map(|user| UserDto::from(&user));

    let base = base_url(&state, host);
    let path = uri.path();
    let pagination = PaginationHeader::for_page(&page, |number, size| {
        format!("{}{}?pageNumber={}&pageSize={}", base, path, number, size)
    });
    let pagination = serde_json::to_string(&pagination)
        .map_err(|e| ApiError::Internal(e.to_string()))
        .and_then(|value| {
            HeaderValue::from_str(&value).map_err(|e| ApiError::Internal(e.to_string()))
        })?;

    let mut response = format.render_list("ArrayOfUserDto", &page.items)?;
    response.headers_mut().insert(PAGINATION_HEADER, pagination);

    Ok(response)
}

/// Advertise the methods supported on the collection
pub async fn get_options() -> impl IntoResponse {
    (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)])
}
