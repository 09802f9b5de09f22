use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::stock::StockLevel;
use crate::services::LineItem;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct CentralStockQuery {
    /// Narrow the projection to one item
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddStockRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LineItemRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssignStockRequest {
    pub volunteer_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReturnStockRequest {
    pub volunteer_id: Uuid,
    #[validate(length(min = 1))]
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignStockResponse {
    pub assignment_id: Uuid,
}

pub fn stock_router() -> Router<AppState> {
    Router::new()
        .route("/central", get(central_stock))
        .route("/volunteer/:id", get(volunteer_stock))
        .route("/add", post(add_stock))
        .route("/assign", post(assign_stock))
        .route("/return", post(return_stock))
}

fn to_lines(items: &[LineItemRequest]) -> Vec<LineItem> {
    items
        .iter()
        .map(|l| LineItem {
            item_id: l.item_id,
            quantity: l.quantity,
        })
        .collect()
}

/// Central warehouse stock projection
#[utoipa::path(
    get,
    path = "/api/v1/stock/central",
    params(CentralStockQuery),
    responses(
        (status = 200, description = "Central balances returned"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn central_stock(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<CentralStockQuery>,
) -> Result<Json<ApiResponse<Vec<StockLevel>>>, ServiceError> {
    let levels = state.services.stock.central_stock(query.item_id).await?;
    Ok(Json(ApiResponse::success(levels)))
}

/// One volunteer's in-hand stock projection
#[utoipa::path(
    get,
    path = "/api/v1/stock/volunteer/{id}",
    params(("id" = Uuid, Path, description = "Volunteer user id")),
    responses(
        (status = 200, description = "Volunteer balances returned"),
        (status = 404, description = "Unknown volunteer", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn volunteer_stock(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(volunteer_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<StockLevel>>>, ServiceError> {
    let mut levels = state.services.stock.volunteer_stock(volunteer_id).await?;
    // Display behavior only: the ledger keeps the true signed value.
    for level in &mut levels {
        if level.quantity < 0 {
            level.quantity = 0;
        }
    }
    Ok(Json(ApiResponse::success(levels)))
}

/// Receive goods into the central warehouse (admin)
#[utoipa::path(
    post,
    path = "/api/v1/stock/add",
    request_body = AddStockRequest,
    responses(
        (status = 200, description = "Stock added"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn add_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddStockRequest>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    state
        .services
        .stock
        .add_stock(user.id, payload.item_id, payload.quantity)
        .await?;

    Ok(Json(ApiResponse::message("Stock added".to_string())))
}

/// Assign central stock to a volunteer (admin)
#[utoipa::path(
    post,
    path = "/api/v1/stock/assign",
    request_body = AssignStockRequest,
    responses(
        (status = 200, description = "Stock assigned", body = AssignStockResponse),
        (status = 400, description = "Insufficient stock or invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn assign_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AssignStockRequest>,
) -> Result<Json<ApiResponse<AssignStockResponse>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let assignment_id = state
        .services
        .stock
        .assign_stock(user.id, payload.volunteer_id, &to_lines(&payload.items))
        .await?;

    Ok(Json(ApiResponse::success(AssignStockResponse {
        assignment_id,
    })))
}

/// Take unused goods back from a volunteer (admin)
#[utoipa::path(
    post,
    path = "/api/v1/stock/return",
    request_body = ReturnStockRequest,
    responses(
        (status = 200, description = "Stock returned"),
        (status = 400, description = "Insufficient volunteer stock", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "stock"
)]
pub async fn return_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReturnStockRequest>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    state
        .services
        .stock
        .return_stock(user.id, payload.volunteer_id, &to_lines(&payload.items))
        .await?;

    Ok(Json(ApiResponse::message("Stock returned".to_string())))
}
