use super::{active_volunteer, aggregate_lines, ensure_active_items, ensure_sufficient, LineItem};
use crate::db;
use crate::entities::ledger_entry::{Direction, EntryKind};
use crate::entities::{campaign, distribution, distribution_item};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ledger::{self, EntryRef};
use crate::projection::HolderScope;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for recording one field distribution
#[derive(Debug, Clone)]
pub struct NewDistribution {
    pub request_id: String,
    pub campaign_id: Option<Uuid>,
    pub state: String,
    pub city: String,
    pub pin_code: String,
    pub area: Option<String>,
    pub lines: Vec<LineItem>,
}

/// Listing filters, all optional
#[derive(Debug, Clone, Default)]
pub struct DistributionFilter {
    pub volunteer_id: Option<Uuid>,
    pub city: Option<String>,
    pub campaign_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DistributionWithLines {
    #[serde(flatten)]
    pub distribution: distribution::Model,
    pub lines: Vec<distribution_item::Model>,
}

#[derive(Debug, Serialize)]
pub struct DistributionPage {
    pub items: Vec<DistributionWithLines>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Field-side operations: recording distributions and damage reports
#[derive(Clone)]
pub struct DistributionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl DistributionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a distribution to beneficiaries. The whole batch commits or
    /// nothing does; a duplicate request key is a Conflict with no appended
    /// entries.
    #[instrument(skip(self, input), fields(request_id = %input.request_id))]
    pub async fn record(
        &self,
        volunteer_id: Uuid,
        input: NewDistribution,
    ) -> Result<Uuid, ServiceError> {
        let needs = aggregate_lines(&input.lines)?;
        let request_id = input.request_id.clone();

        let distribution_id = db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                // Duplicate check inside the transaction; the unique index on
                // request_id backs this up under concurrency.
                let duplicate = distribution::Entity::find()
                    .filter(distribution::Column::RequestId.eq(input.request_id.as_str()))
                    .one(txn)
                    .await?;
                if duplicate.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "Distribution with request ID {} already recorded",
                        input.request_id
                    )));
                }

                active_volunteer(txn, volunteer_id).await?;
                ensure_active_items(txn, &needs.iter().map(|(id, _)| *id).collect::<Vec<_>>())
                    .await?;

                if let Some(campaign_id) = input.campaign_id {
                    campaign::Entity::find_by_id(campaign_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Campaign {} not found", campaign_id))
                        })?;
                }

                ensure_sufficient(txn, HolderScope::Volunteer(volunteer_id), &needs).await?;

                let distribution_id = Uuid::new_v4();
                distribution::ActiveModel {
                    id: Set(distribution_id),
                    request_id: Set(input.request_id.clone()),
                    volunteer_id: Set(volunteer_id),
                    campaign_id: Set(input.campaign_id),
                    state: Set(input.state.clone()),
                    city: Set(input.city.clone()),
                    pin_code: Set(input.pin_code.clone()),
                    area: Set(input.area.clone()),
                    ..Default::default()
                }
                .insert(txn)
                .await?;

                let line_rows: Vec<distribution_item::ActiveModel> = needs
                    .iter()
                    .map(|(item_id, quantity)| distribution_item::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        distribution_id: Set(distribution_id),
                        item_id: Set(*item_id),
                        quantity: Set(*quantity),
                    })
                    .collect();
                distribution_item::Entity::insert_many(line_rows)
                    .exec(txn)
                    .await?;

                let reference = EntryRef::distribution(distribution_id);
                let entries = needs
                    .iter()
                    .map(|(item_id, quantity)| {
                        ledger::new_entry(
                            *item_id,
                            EntryKind::Distribute,
                            Direction::Out,
                            *quantity,
                            volunteer_id,
                            Some(&reference),
                        )
                    })
                    .collect();
                ledger::append_all(txn, entries).await?;

                Ok(distribution_id)
            })
        })
        .await?;

        info!(%distribution_id, %volunteer_id, "distribution recorded");
        self.event_sender
            .notify(Event::DistributionRecorded {
                distribution_id,
                request_id,
                volunteer_id,
            })
            .await;

        Ok(distribution_id)
    }

    /// Writes off damaged or lost goods from a volunteer's shelf. The
    /// caller-supplied request key dedups retries; the ledger entry itself
    /// carries the key, so no extra record table is needed.
    #[instrument(skip(self))]
    pub async fn report_damage(
        &self,
        volunteer_id: Uuid,
        request_id: String,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(), ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::BadRequest(
                "Quantity must be positive".to_string(),
            ));
        }
        let event_request = request_id.clone();

        db::atomic(self.db.as_ref(), move |txn| {
            Box::pin(async move {
                let duplicate =
                    ledger::find_by_reference(txn, EntryKind::Damage, &request_id).await?;
                if duplicate.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "Damage report with request ID {} already recorded",
                        request_id
                    )));
                }

                active_volunteer(txn, volunteer_id).await?;
                ensure_active_items(txn, &[item_id]).await?;
                ensure_sufficient(
                    txn,
                    HolderScope::Volunteer(volunteer_id),
                    &[(item_id, quantity)],
                )
                .await?;

                let reference = EntryRef::damage_report(&request_id);
                ledger::append_all(
                    txn,
                    vec![ledger::new_entry(
                        item_id,
                        EntryKind::Damage,
                        Direction::Out,
                        quantity,
                        volunteer_id,
                        Some(&reference),
                    )],
                )
                .await?;

                Ok(())
            })
        })
        .await?;

        info!(%item_id, quantity, %volunteer_id, request_id = %event_request, "damage recorded");
        self.event_sender
            .notify(Event::DamageReported {
                item_id,
                quantity,
                volunteer_id,
            })
            .await;

        Ok(())
    }

    /// Paginated listing for admins, newest first
    pub async fn list(
        &self,
        filter: DistributionFilter,
        page: u64,
        limit: u64,
    ) -> Result<DistributionPage, ServiceError> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);

        let mut query = distribution::Entity::find();
        if let Some(volunteer_id) = filter.volunteer_id {
            query = query.filter(distribution::Column::VolunteerId.eq(volunteer_id));
        }
        if let Some(city) = &filter.city {
            query = query.filter(distribution::Column::City.eq(city.as_str()));
        }
        if let Some(campaign_id) = filter.campaign_id {
            query = query.filter(distribution::Column::CampaignId.eq(campaign_id));
        }

        let paginator = query
            .order_by_desc(distribution::Column::CreatedAt)
            .paginate(self.db.as_ref(), limit);
        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page - 1).await?;

        let ids: Vec<Uuid> = records.iter().map(|d| d.id).collect();
        let lines = distribution_item::Entity::find()
            .filter(distribution_item::Column::DistributionId.is_in(ids))
            .all(self.db.as_ref())
            .await?;

        let items = records
            .into_iter()
            .map(|d| {
                let own_lines = lines
                    .iter()
                    .filter(|l| l.distribution_id == d.id)
                    .cloned()
                    .collect();
                DistributionWithLines {
                    distribution: d,
                    lines: own_lines,
                }
            })
            .collect();

        Ok(DistributionPage {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }
}
