mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use reliefstock_api as api;
use reliefstock_api::entities::user::UserRole;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

/// Router wired the way `main` wires it: routes, state, and the
/// AuthService extension the extractor reads.
fn app(state: &api::AppState) -> Router {
    let auth_service = state.auth_service.clone();
    Router::new()
        .merge(api::app_routes())
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            |axum::extract::State(auth): axum::extract::State<Arc<api::auth::AuthService>>,
             mut req: axum::http::Request<Body>,
             next: axum::middleware::Next| async move {
                req.extensions_mut().insert(auth);
                next.run(req).await
            },
        ))
        .with_state(state.clone())
}

fn bearer(state: &api::AppState, id: uuid::Uuid, role: UserRole) -> String {
    let token = state
        .auth_service
        .issue_token(id, "tester", role)
        .expect("token");
    format!("Bearer {}", token)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let state = common::test_state().await;
    let response = app(&state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn stock_read_requires_a_token() {
    let state = common::test_state().await;
    let response = app(&state)
        .oneshot(
            Request::get("/api/v1/stock/central")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn volunteer_cannot_add_stock() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    let response = app(&state)
        .oneshot(
            Request::post("/api/v1/stock/add")
                .header(
                    header::AUTHORIZATION,
                    bearer(&state, seed.volunteer_id, UserRole::Volunteer),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"item_id": seed.rice_id, "quantity": 5}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_adds_stock_and_anyone_authenticated_reads_it() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    let response = app(&state)
        .oneshot(
            Request::post("/api/v1/stock/add")
                .header(
                    header::AUTHORIZATION,
                    bearer(&state, seed.admin_id, UserRole::Admin),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"item_id": seed.rice_id, "quantity": 50}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&state)
        .oneshot(
            Request::get("/api/v1/stock/central")
                .header(
                    header::AUTHORIZATION,
                    bearer(&state, seed.volunteer_id, UserRole::Volunteer),
                )
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"][0]["quantity"], json!(50));
    assert_eq!(body["data"][0]["name"], json!("Rice"));
}

#[tokio::test]
async fn assign_over_http_validates_and_moves_stock() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    state
        .services
        .stock
        .add_stock(seed.admin_id, seed.rice_id, 30)
        .await
        .unwrap();

    // Empty line list is rejected before it reaches the ledger
    let response = app(&state)
        .oneshot(
            Request::post("/api/v1/stock/assign")
                .header(
                    header::AUTHORIZATION,
                    bearer(&state, seed.admin_id, UserRole::Admin),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"volunteer_id": seed.volunteer_id, "items": []}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app(&state)
        .oneshot(
            Request::post("/api/v1/stock/assign")
                .header(
                    header::AUTHORIZATION,
                    bearer(&state, seed.admin_id, UserRole::Admin),
                )
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "volunteer_id": seed.volunteer_id,
                        "items": [{"item_id": seed.rice_id, "quantity": 12}],
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"]["assignment_id"].is_string());

    let volunteer = state
        .services
        .stock
        .volunteer_stock(seed.volunteer_id)
        .await
        .unwrap();
    assert_eq!(volunteer[0].quantity, 12);
}

#[tokio::test]
async fn duplicate_distribution_maps_to_conflict_status() {
    let state = common::test_state().await;
    let seed = common::seed(&state).await;

    // Seed stock into the volunteer's hands through the services directly
    state
        .services
        .stock
        .add_stock(seed.admin_id, seed.rice_id, 20)
        .await
        .unwrap();
    state
        .services
        .stock
        .assign_stock(
            seed.admin_id,
            seed.volunteer_id,
            &[api::services::LineItem {
                item_id: seed.rice_id,
                quantity: 10,
            }],
        )
        .await
        .unwrap();

    let payload = json!({
        "request_id": "http-r1",
        "state": "Odisha",
        "city": "Puri",
        "pin_code": "752001",
        "items": [{"item_id": seed.rice_id, "quantity": 4}],
    })
    .to_string();

    let request = |body: String, state: &api::AppState| {
        Request::post("/api/v1/distributions")
            .header(
                header::AUTHORIZATION,
                bearer(state, seed.volunteer_id, UserRole::Volunteer),
            )
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let response = app(&state)
        .oneshot(request(payload.clone(), &state))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app(&state)
        .oneshot(request(payload, &state))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["error"], json!("Conflict"));
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let state = common::test_state().await;
    let response = app(&state)
        .oneshot(
            Request::get("/api/v1/stock/central")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
