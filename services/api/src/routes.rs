//! API service routes

use auth::{Role, models::LoginCredentials};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use booking::{AvailabilityQuery, CreateBooking};
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware, require_admin},
    models::{AvailabilityParams, LoginResponse, RegisterRequest},
    state::AppState,
};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/availability", get(check_availability));

    let admin_routes = Router::new()
        .route("/admin/users/:id/bookings", get(get_user_bookings))
        .route_layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/auth/me", get(me))
        .route("/bookings", post(create_booking).get(get_my_bookings))
        .route("/bookings/:id", get(get_booking))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", public_routes.merge(protected_routes))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "booking-api"
    }))
}

/// Register a new user. Self-registration always gets the `user` role.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .auth
        .register(
            &payload.email,
            &payload.password,
            payload.profile,
            Some(Role::User),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginCredentials>,
) -> ApiResult<impl IntoResponse> {
    let (user, token) = state
        .auth
        .login(&credentials.email, &credentials.password)
        .await?;

    Ok(Json(LoginResponse { user, token }))
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.auth.get_user(user.id).await?))
}

pub async fn check_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<impl IntoResponse> {
    let query = AvailabilityQuery::new(
        params.hotel_id,
        params.check_in,
        params.check_out,
        params.guests,
    )?;

    Ok(Json(state.availability.check_availability(&query).await))
}

pub async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateBooking>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.create_booking(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Bookings of the calling user, newest first
pub async fn get_my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.get_user_bookings(user.id).await?))
}

/// A single booking; other users' bookings look like missing ones unless
/// the caller is an admin
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let booking = state.bookings.get_booking_by_id(id).await?;

    if booking.user_id != user.id && !user.is_admin() {
        return Err(ApiError::NotFound(format!("booking {}", id)));
    }

    Ok(Json(booking))
}

pub async fn get_user_bookings(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.bookings.get_user_bookings(user_id).await?))
}
