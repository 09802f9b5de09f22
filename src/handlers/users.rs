use crate::auth::AuthUser;
use crate::entities::user::{self, UserRole, UserStatus};
use crate::errors::ServiceError;
use crate::services::users::{UserInput, UserUpdate};
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub status: Option<UserStatus>,
}

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", put(update_user))
        .route("/volunteers", get(list_volunteers))
}

/// Register a directory user (admin)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created"),
        (status = 409, description = "Duplicate email", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<user::Model>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let created = state
        .services
        .users
        .create(UserInput {
            name: payload.name,
            email: payload.email,
            role: payload.role,
        })
        .await?;

    Ok(Json(ApiResponse::success(created)))
}

/// Rename a user or toggle their active status (admin)
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 404, description = "Unknown user", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<user::Model>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let updated = state
        .services
        .users
        .update(
            user_id,
            UserUpdate {
                name: payload.name,
                status: payload.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Active volunteers listing (admin)
#[utoipa::path(
    get,
    path = "/api/v1/users/volunteers",
    responses(
        (status = 200, description = "Volunteers returned"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "users"
)]
pub async fn list_volunteers(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<user::Model>>>, ServiceError> {
    user.require_admin()?;

    let volunteers = state.services.users.volunteers().await?;
    Ok(Json(ApiResponse::success(volunteers)))
}
