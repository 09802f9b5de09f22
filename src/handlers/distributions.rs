use crate::auth::AuthUser;
use crate::errors::ServiceError;
use crate::services::distributions::{
    DistributionFilter, DistributionPage, NewDistribution,
};
use crate::services::LineItem;
use crate::{ApiResponse, AppState};
use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordDistributionRequest {
    /// Caller-supplied idempotency key; retries with the same key conflict
    #[validate(length(min = 1, max = 128))]
    pub request_id: String,
    pub campaign_id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub state: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub pin_code: String,
    pub area: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<DistributionLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DistributionLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportDamageRequest {
    #[validate(length(min = 1, max = 128))]
    pub request_id: String,
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct DistributionListQuery {
    pub volunteer_id: Option<Uuid>,
    pub city: Option<String>,
    pub campaign_id: Option<Uuid>,
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordDistributionResponse {
    pub distribution_id: Uuid,
}

pub fn distribution_router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_distribution).get(list_distributions))
        .route("/damage", post(report_damage))
}

/// Record a distribution to beneficiaries (volunteer)
#[utoipa::path(
    post,
    path = "/api/v1/distributions",
    request_body = RecordDistributionRequest,
    responses(
        (status = 200, description = "Distribution recorded", body = RecordDistributionResponse),
        (status = 400, description = "Insufficient stock or invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate request ID", body = crate::errors::ErrorResponse)
    ),
    tag = "distributions"
)]
pub async fn record_distribution(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordDistributionRequest>,
) -> Result<Json<ApiResponse<RecordDistributionResponse>>, ServiceError> {
    user.require_volunteer()?;
    payload.validate()?;
    for line in &payload.items {
        line.validate()?;
    }

    let input = NewDistribution {
        request_id: payload.request_id,
        campaign_id: payload.campaign_id,
        state: payload.state,
        city: payload.city,
        pin_code: payload.pin_code,
        area: payload.area,
        lines: payload
            .items
            .iter()
            .map(|l| LineItem {
                item_id: l.item_id,
                quantity: l.quantity,
            })
            .collect(),
    };

    let distribution_id = state.services.distributions.record(user.id, input).await?;

    Ok(Json(ApiResponse::success(RecordDistributionResponse {
        distribution_id,
    })))
}

/// Paginated distribution listing with filters (admin)
#[utoipa::path(
    get,
    path = "/api/v1/distributions",
    params(DistributionListQuery),
    responses(
        (status = 200, description = "Distribution page returned"),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    tag = "distributions"
)]
pub async fn list_distributions(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<DistributionListQuery>,
) -> Result<Json<ApiResponse<DistributionPage>>, ServiceError> {
    user.require_admin()?;

    let filter = DistributionFilter {
        volunteer_id: query.volunteer_id,
        city: query.city,
        campaign_id: query.campaign_id,
    };
    let page = state
        .services
        .distributions
        .list(filter, query.page, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(page)))
}

/// Write off damaged or lost goods (volunteer)
#[utoipa::path(
    post,
    path = "/api/v1/distributions/damage",
    request_body = ReportDamageRequest,
    responses(
        (status = 200, description = "Damage recorded"),
        (status = 400, description = "Insufficient stock or invalid request", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate request ID", body = crate::errors::ErrorResponse)
    ),
    tag = "distributions"
)]
pub async fn report_damage(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ReportDamageRequest>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    user.require_volunteer()?;
    payload.validate()?;

    state
        .services
        .distributions
        .report_damage(user.id, payload.request_id, payload.item_id, payload.quantity)
        .await?;

    Ok(Json(ApiResponse::message("Damage recorded".to_string())))
}
