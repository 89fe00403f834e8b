//! In-process router tests against the in-memory record store

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use school_visits_server::{
    api,
    config::{AppConfig, OrganizerConfig},
    models::{District, School},
    repository::memory::MemoryStore,
    services::Services,
    AppState,
};

struct TestApp {
    router: Router,
    token_13: String,
    token_17: String,
}

async fn test_app() -> TestApp {
    let mut config = AppConfig::default();
    config.organizers = vec![
        OrganizerConfig {
            id: 13,
            name: "Universidad Santo Tomás".to_string(),
            password: Some("ust".to_string()),
        },
        OrganizerConfig {
            id: 17,
            name: "Universidad de Talca".to_string(),
            password: Some("utalca".to_string()),
        },
    ];

    let store = MemoryStore::new();
    store
        .add_school(School {
            rbd: 8485,
            name: "Liceo de Aplicación".to_string(),
            district_code: 13101,
        })
        .await;
    store
        .add_district(District {
            code: 13101,
            name: "Santiago".to_string(),
        })
        .await;
    store
        .block_date(
            chrono::NaiveDate::from_ymd_opt(2024, 9, 18).unwrap(),
            Some("Fiestas Patrias".to_string()),
        )
        .await;

    let services = Services::new(Arc::new(store), &config);
    let (token_13, _) = services.auth.authenticate(13, "ust").unwrap();
    let (token_17, _) = services.auth.authenticate(17, "utalca").unwrap();
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    TestApp {
        router: api::create_router(state),
        token_13,
        token_17,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn visit_body(date: &str) -> Value {
    json!({
        "visit_date": date,
        "rbd": 8485,
        "start_time": "10:00",
        "status": "confirmed"
    })
}

#[tokio::test]
async fn test_health_and_readiness() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, "GET", "/api/v1/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_login() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"organizer_id": 13, "password": "ust"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["organizer"]["id"], 13);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"organizer_id": 13, "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_me_without_token_is_viewer() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/api/v1/auth/me", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["organizer"]["id"], 0);
    assert_eq!(body["can_edit"], false);

    let (_, body) = send(&app, "GET", "/api/v1/auth/me", Some(&app.token_13), None).await;
    assert_eq!(body["can_edit"], true);
}

#[tokio::test]
async fn test_fourth_visit_on_a_day_is_rejected() {
    let app = test_app().await;

    for _ in 0..3 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/v1/visits",
            Some(&app.token_13),
            Some(visit_body("2024-04-10")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(body["visit_id"].is_number());
    }

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/visits",
        Some(&app.token_17),
        Some(visit_body("2024-04-10")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 5);

    let (_, body) = send(&app, "GET", "/api/v1/visits/by-date/2024-04-10", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[2]["position"], 3);

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/blocked-dates/check?date=2024-04-10&source=authoritative",
        None,
        None,
    )
    .await;
    assert_eq!(body["blocked"], true);

    let (_, body) = send(
        &app,
        "GET",
        "/api/v1/blocked-dates/check?date=2024-04-10&exclude_date=2024-04-10",
        None,
        None,
    )
    .await;
    assert_eq!(body["blocked"], false);
    assert_eq!(body["source"], "local");
}

#[tokio::test]
async fn test_override_date_is_rejected() {
    let app = test_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/visits",
        Some(&app.token_13),
        Some(visit_body("2024-09-18")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = send(&app, "GET", "/api/v1/blocked-dates?source=authoritative", None, None).await;
    assert_eq!(body, json!(["2024-09-18"]));
    let (_, body) = send(&app, "GET", "/api/v1/blocked-dates", None, None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_viewer_cannot_create() {
    let app = test_app().await;

    let (status, _) = send(&app, "POST", "/api/v1/visits", None, Some(visit_body("2024-04-10"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/v1/visits", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_redate_and_delete_lifecycle() {
    let app = test_app().await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/visits",
        Some(&app.token_13),
        Some(visit_body("2024-05-01")),
    )
    .await;
    let id = created["visit_id"].as_i64().unwrap();

    // Same date: edited in place
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/visits/{}", id),
        Some(&app.token_13),
        Some(json!({"visit_date": "2024-05-01", "notes": "Patio central"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visit_id"].as_i64(), Some(id));

    // Another organizer cannot touch it
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/visits/{}", id),
        Some(&app.token_17),
        Some(json!({"visit_date": "2024-05-02"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // New date: replaced under a new id
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/visits/{}", id),
        Some(&app.token_13),
        Some(json!({"visit_date": "2024-05-02"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_id = body["visit_id"].as_i64().unwrap();
    assert_ne!(new_id, id);

    let (status, _) = send(&app, "GET", &format!("/api/v1/visits/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, moved) = send(&app, "GET", &format!("/api/v1/visits/{}", new_id), None, None).await;
    assert_eq!(moved["rescheduled_from"].as_i64(), Some(id));

    // Stale selection: updating the old id
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/visits/{}", id),
        Some(&app.token_13),
        Some(json!({"visit_date": "2024-05-03"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/visits/{}", new_id),
        Some(&app.token_13),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["notice"].is_null());
    assert_eq!(body["visits"], json!([]));

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/v1/visits/{}", new_id),
        Some(&app.token_13),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["notice"].is_string());
}

#[tokio::test]
async fn test_attendance_and_report() {
    let app = test_app().await;

    let (_, created) = send(
        &app,
        "POST",
        "/api/v1/visits",
        Some(&app.token_13),
        Some(visit_body("2024-06-12")),
    )
    .await;
    let id = created["visit_id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/v1/visits/{}/attendance", id),
        Some(&app.token_17),
        Some(json!({"attends": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = send(&app, "GET", &format!("/api/v1/visits/{}/attendance", id), None, None).await;
    assert_eq!(summary["attending"], json!(["Universidad de Talca"]));
    assert_eq!(summary["not_attending"], json!(["Universidad Santo Tomás"]));

    let (status, report) = send(&app, "GET", &format!("/api/v1/visits/{}/report", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["file_name"], "reporte_8485.pdf");
    assert_eq!(report["fields"][5]["value"], "Santiago");
}

#[tokio::test]
async fn test_exports_depend_on_session() {
    let app = test_app().await;
    send(
        &app,
        "POST",
        "/api/v1/visits",
        Some(&app.token_13),
        Some(visit_body("2024-04-10")),
    )
    .await;

    let (_, public) = send(&app, "GET", "/api/v1/visits/export", None, None).await;
    assert_eq!(public["columns"].as_array().unwrap().len(), 7);
    assert_eq!(public["rows"][0][1], "10/04/2024");

    let (_, detailed) = send(&app, "GET", "/api/v1/visits/export", Some(&app.token_13), None).await;
    let columns = detailed["columns"].as_array().unwrap();
    assert_eq!(columns.last().unwrap(), "Universidad de Talca");
    assert_eq!(detailed["rows"][0].as_array().unwrap().len(), columns.len());
}

#[tokio::test]
async fn test_proposals() {
    let app = test_app().await;

    let (status, proposal) = send(
        &app,
        "POST",
        "/api/v1/proposals",
        Some(&app.token_17),
        Some(json!({"rbd": 8485})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(proposal["school_name"], "Liceo de Aplicación");
    let id = proposal["id"].as_i64().unwrap();

    let (_, mine) = send(&app, "GET", "/api/v1/proposals/mine", Some(&app.token_13), None).await;
    assert_eq!(mine, json!([]));

    let (_, table) = send(&app, "GET", "/api/v1/proposals/export", None, None).await;
    assert_eq!(table["rows"], json!([["8485", "Liceo de Aplicación", "Universidad de Talca"]]));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/proposals/{}", id),
        Some(&app.token_13),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/v1/proposals/{}", id),
        Some(&app.token_17),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_calendar_and_campaign() {
    let app = test_app().await;

    let (status, days) = send(&app, "GET", "/api/v1/calendar?month=9", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let days = days.as_array().unwrap();
    assert_eq!(days.len(), 30);
    let override_day = days.iter().find(|d| d["date"] == "2024-09-18").unwrap();
    assert_eq!(override_day["blocked"], true);
    assert_eq!(override_day["remaining"], 3);

    let (_, campaign) = send(&app, "GET", "/api/v1/campaign", None, None).await;
    assert_eq!(campaign["daily_cap"], 3);
    assert_eq!(campaign["start_date"], "2024-03-01");
}

#[tokio::test]
async fn test_catalog_and_openapi() {
    let app = test_app().await;

    let (_, schools) = send(&app, "GET", "/api/v1/schools", None, None).await;
    assert_eq!(schools[0]["rbd"], 8485);
    let (status, _) = send(&app, "GET", "/api/v1/schools/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, districts) = send(&app, "GET", "/api/v1/districts", None, None).await;
    assert_eq!(districts[0]["name"], "Santiago");

    let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"]["/visits/{id}"].is_object());
}
