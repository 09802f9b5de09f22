use crate::entities::campaign;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a relief campaign
#[derive(Debug, Clone)]
pub struct CampaignInput {
    pub name: String,
    pub description: Option<String>,
}

/// Campaign directory; distributions attribute themselves to these by id
#[derive(Clone)]
pub struct CampaignService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl CampaignService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CampaignInput) -> Result<campaign::Model, ServiceError> {
        let existing = campaign::Entity::find()
            .filter(campaign::Column::Name.eq(input.name.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Campaign named '{}' already exists",
                input.name
            )));
        }

        let model = campaign::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(campaign_id = %model.id, "campaign created");
        self.event_sender
            .notify(Event::CampaignCreated(model.id))
            .await;

        Ok(model)
    }

    pub async fn get(&self, campaign_id: Uuid) -> Result<campaign::Model, ServiceError> {
        campaign::Entity::find_by_id(campaign_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Campaign {} not found", campaign_id)))
    }

    /// All campaigns, newest first
    pub async fn list(&self) -> Result<Vec<campaign::Model>, ServiceError> {
        Ok(campaign::Entity::find()
            .order_by_desc(campaign::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }
}
