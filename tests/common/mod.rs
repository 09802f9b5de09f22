use reliefstock_api::config::AppConfig;
use reliefstock_api::db;
use reliefstock_api::entities::user::UserRole;
use reliefstock_api::events::EventSender;
use reliefstock_api::services::items::ItemInput;
use reliefstock_api::services::users::UserInput;
use reliefstock_api::AppState;
use tokio::sync::mpsc;
use std::sync::Arc;
use uuid::Uuid;

/// Spins up the full service stack over an in-memory SQLite database with
/// migrations applied. Events go to a consumer the test does not read.
pub async fn test_state() -> AppState {
    let cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "test_secret_key_for_testing_purposes_only_padded_to_sixty_four__".to_string(),
        3600,
        "127.0.0.1".to_string(),
        18080,
        "test".to_string(),
    );

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let (tx, rx) = mpsc::channel(100);
    let sender = EventSender::new(tx);
    tokio::spawn(reliefstock_api::events::process_events(rx));

    AppState::build(Arc::new(pool), cfg, sender)
}

pub struct Seed {
    pub admin_id: Uuid,
    pub volunteer_id: Uuid,
    pub rice_id: Uuid,
}

/// One admin, one active volunteer, one item ("Rice", kg)
pub async fn seed(state: &AppState) -> Seed {
    let admin = state
        .services
        .users
        .create(UserInput {
            name: "Admin".into(),
            email: "admin@reliefstock.test".into(),
            role: UserRole::Admin,
        })
        .await
        .expect("seed admin");

    let volunteer = state
        .services
        .users
        .create(UserInput {
            name: "Asha".into(),
            email: "asha@reliefstock.test".into(),
            role: UserRole::Volunteer,
        })
        .await
        .expect("seed volunteer");

    let rice = state
        .services
        .items
        .create(ItemInput {
            name: "Rice".into(),
            category: "Food".into(),
            unit: "kg".into(),
        })
        .await
        .expect("seed item");

    Seed {
        admin_id: admin.id,
        volunteer_id: volunteer.id,
        rice_id: rice.id,
    }
}
