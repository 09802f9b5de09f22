use crate::auth::AuthUser;
use crate::entities::item;
use crate::errors::ServiceError;
use crate::services::items::ItemInput;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ItemRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    /// Measurement unit ("kg", "pieces", "litres")
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct ItemListQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

pub fn item_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/:id", get(get_item).put(update_item))
        .route("/:id/deactivate", post(deactivate_item))
}

/// Item directory listing
#[utoipa::path(
    get,
    path = "/api/v1/items",
    params(ItemListQuery),
    responses((status = 200, description = "Items returned")),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<ApiResponse<Vec<item::Model>>>, ServiceError> {
    let items = state.services.items.list(query.include_inactive).await?;
    Ok(Json(ApiResponse::success(items)))
}

/// Fetch one item
#[utoipa::path(
    get,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item returned"),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<item::Model>>, ServiceError> {
    let item = state.services.items.get(item_id).await?;
    Ok(Json(ApiResponse::success(item)))
}

/// Create a directory item (admin)
#[utoipa::path(
    post,
    path = "/api/v1/items",
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item created"),
        (status = 409, description = "Duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<item::Model>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let item = state
        .services
        .items
        .create(ItemInput {
            name: payload.name,
            category: payload.category,
            unit: payload.unit,
        })
        .await?;

    Ok(Json(ApiResponse::success(item)))
}

/// Update a directory item (admin)
#[utoipa::path(
    put,
    path = "/api/v1/items/{id}",
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated"),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemRequest>,
) -> Result<Json<ApiResponse<item::Model>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let item = state
        .services
        .items
        .update(
            item_id,
            ItemInput {
                name: payload.name,
                category: payload.category,
                unit: payload.unit,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(item)))
}

/// Retire an item once every holder's balance is zero (admin)
#[utoipa::path(
    post,
    path = "/api/v1/items/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deactivated"),
        (status = 400, description = "Item still holds stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown item", body = crate::errors::ErrorResponse)
    ),
    tag = "items"
)]
pub async fn deactivate_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<item::Model>>, ServiceError> {
    user.require_admin()?;

    let item = state.services.items.deactivate(item_id).await?;
    Ok(Json(ApiResponse::success(item)))
}
