use crate::entities::user::{self, UserRole, UserStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for registering a directory user
#[derive(Debug, Clone)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

/// Partial update; absent fields are left untouched. Role and email are
/// fixed at registration.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub status: Option<UserStatus>,
}

/// Minimal user directory: enough for the ledger's existence and
/// active-volunteer checks. Identity and credentials stay external.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: UserInput) -> Result<user::Model, ServiceError> {
        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(input.email.as_str()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "User with email {} already exists",
                input.email
            )));
        }

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            role: Set(input.role),
            status: Set(UserStatus::Active),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(user_id = %model.id, role = ?model.role, "user created");
        self.event_sender.notify(Event::UserCreated(model.id)).await;

        Ok(model)
    }

    /// Renames a user or toggles their status. Deactivating a volunteer
    /// stops new assignments and distributions; goods already in their hands
    /// stay returnable.
    #[instrument(skip(self, update))]
    pub async fn update(&self, user_id: Uuid, update: UserUpdate) -> Result<user::Model, ServiceError> {
        let existing = self.get(user_id).await?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(status) = update.status {
            active.status = Set(status);
        }

        let model = active.update(self.db.as_ref()).await?;
        info!(%user_id, status = ?model.status, "user updated");

        Ok(model)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))
    }

    /// Active volunteers, for the admin assigning stock
    pub async fn volunteers(&self) -> Result<Vec<user::Model>, ServiceError> {
        Ok(user::Entity::find()
            .filter(user::Column::Role.eq(UserRole::Volunteer))
            .filter(user::Column::Status.eq(UserStatus::Active))
            .order_by_asc(user::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }
}
