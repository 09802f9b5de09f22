mod common;

use reliefstock_api::errors::ServiceError;
use reliefstock_api::services::items::ItemInput;
use reliefstock_api::services::LineItem;

fn item(name: &str) -> ItemInput {
    ItemInput {
        name: name.to_string(),
        category: "Food".into(),
        unit: "kg".into(),
    }
}

#[tokio::test]
async fn duplicate_item_name_conflicts() {
    let state = common::test_state().await;
    common::seed(&state).await;

    let dup = state.services.items.create(item("Rice")).await;
    assert!(matches!(dup, Err(ServiceError::Conflict(_))));
}

#[tokio::test]
async fn rename_cannot_steal_an_existing_name() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    let dal = state.services.items.create(item("Dal")).await.unwrap();
    let stolen = state.services.items.update(dal.id, item("Rice")).await;
    assert!(matches!(stolen, Err(ServiceError::Conflict(_))));

    // Renaming to an unused name works
    let renamed = state
        .services
        .items
        .update(dal.id, item("Toor Dal"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Toor Dal");
    let _ = seed;
}

/// Deactivation is refused while central still holds stock.
#[tokio::test]
async fn deactivation_refused_with_central_stock() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    state
        .services
        .stock
        .add_stock(seed.admin_id, seed.rice_id, 5)
        .await
        .unwrap();

    let refused = state.services.items.deactivate(seed.rice_id).await;
    assert!(matches!(refused, Err(ServiceError::BadRequest(_))));
}

/// Deactivation is refused while any volunteer still holds stock, and
/// allowed once every balance is back to zero.
#[tokio::test]
async fn deactivation_guard_tracks_every_holder() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;
    let stock = &state.services.stock;

    stock
        .add_stock(seed.admin_id, seed.rice_id, 8)
        .await
        .unwrap();
    stock
        .assign_stock(
            seed.admin_id,
            seed.volunteer_id,
            &[LineItem {
                item_id: seed.rice_id,
                quantity: 8,
            }],
        )
        .await
        .unwrap();

    // Central is zero but the volunteer still holds 8
    let refused = state.services.items.deactivate(seed.rice_id).await;
    assert!(matches!(refused, Err(ServiceError::BadRequest(_))));

    stock
        .return_stock(seed.admin_id, seed.volunteer_id, &[LineItem {
            item_id: seed.rice_id,
            quantity: 8,
        }])
        .await
        .unwrap();

    // Central now holds the 8 again
    let refused = state.services.items.deactivate(seed.rice_id).await;
    assert!(matches!(refused, Err(ServiceError::BadRequest(_))));

    // Hand out and distribute everything, then the item can retire
    stock
        .assign_stock(
            seed.admin_id,
            seed.volunteer_id,
            &[LineItem {
                item_id: seed.rice_id,
                quantity: 8,
            }],
        )
        .await
        .unwrap();
    state
        .services
        .distributions
        .record(
            seed.volunteer_id,
            reliefstock_api::services::distributions::NewDistribution {
                request_id: "final".into(),
                campaign_id: None,
                state: "Bihar".into(),
                city: "Patna".into(),
                pin_code: "800001".into(),
                area: None,
                lines: vec![LineItem {
                    item_id: seed.rice_id,
                    quantity: 8,
                }],
            },
        )
        .await
        .unwrap();

    let retired = state.services.items.deactivate(seed.rice_id).await.unwrap();
    assert!(!retired.is_active);

    // And a retired item takes no further stock
    let refused = stock.add_stock(seed.admin_id, seed.rice_id, 1).await;
    assert!(matches!(refused, Err(ServiceError::BadRequest(_))));
}

#[tokio::test]
async fn active_listing_hides_retired_items() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    state.services.items.deactivate(seed.rice_id).await.unwrap();

    let active = state.services.items.list(false).await.unwrap();
    assert!(active.is_empty());

    let all = state.services.items.list(true).await.unwrap();
    assert_eq!(all.len(), 1);
}
