use crate::auth::AuthUser;
use crate::entities::campaign;
use crate::errors::ServiceError;
use crate::services::campaigns::CampaignInput;
use crate::{ApiResponse, AppState};
use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
}

pub fn campaign_router() -> Router<AppState> {
    Router::new().route("/", get(list_campaigns).post(create_campaign))
}

/// Create a relief campaign (admin)
#[utoipa::path(
    post,
    path = "/api/v1/campaigns",
    request_body = CreateCampaignRequest,
    responses(
        (status = 200, description = "Campaign created"),
        (status = 409, description = "Duplicate name", body = crate::errors::ErrorResponse)
    ),
    tag = "campaigns"
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<ApiResponse<campaign::Model>>, ServiceError> {
    user.require_admin()?;
    payload.validate()?;

    let campaign = state
        .services
        .campaigns
        .create(CampaignInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    Ok(Json(ApiResponse::success(campaign)))
}

/// Campaign directory listing, newest first
#[utoipa::path(
    get,
    path = "/api/v1/campaigns",
    responses((status = 200, description = "Campaigns returned")),
    tag = "campaigns"
)]
pub async fn list_campaigns(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<ApiResponse<Vec<campaign::Model>>>, ServiceError> {
    let campaigns = state.services.campaigns.list().await?;
    Ok(Json(ApiResponse::success(campaigns)))
}
