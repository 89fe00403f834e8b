//! API integration tests against a running server
//!
//! Start the server with a fresh store and set `U13`/`U17` to the passwords of
//! organizers 13 and 17 before running these.

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to log in as an organizer, with the password taken from `U{id}`
async fn get_auth_token(client: &Client, organizer_id: i32) -> String {
    let password = std::env::var(format!("U{}", organizer_id)).unwrap_or_default();
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "organizer_id": organizer_id,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_campaign() {
    let client = Client::new();

    let response = client
        .get(format!("{}/campaign", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["daily_cap"].as_u64().unwrap() >= 1);
    assert!(body["first_available_date"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_login_rejects_bad_password() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "organizer_id": 13,
            "password": "definitely-not-the-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_list_visits_as_viewer() {
    let client = Client::new();

    let response = client
        .get(format!("{}/visits", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_fill_a_day_then_reject() {
    let client = Client::new();
    let token = get_auth_token(&client, 13).await;

    let campaign: Value = client
        .get(format!("{}/campaign", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let date = campaign["first_available_date"].as_str().unwrap().to_string();
    let schools: Value = client
        .get(format!("{}/schools", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let rbd = schools[0]["rbd"].as_i64().expect("The seed needs at least one school");

    let remaining: Value = client
        .get(format!("{}/visits/by-date/{}", BASE_URL, date))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let cap = campaign["daily_cap"].as_u64().unwrap() as usize;
    let already = remaining.as_array().map(|v| v.len()).unwrap_or(0);

    let mut created = Vec::new();
    for _ in already..cap {
        let response = client
            .post(format!("{}/visits", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({ "visit_date": date, "rbd": rbd }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse response");
        created.push(body["visit_id"].as_i64().unwrap());
    }

    let response = client
        .post(format!("{}/visits", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "visit_date": date, "rbd": rbd }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Clean up
    for id in created {
        let response = client
            .delete(format!("{}/visits/{}", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
    }
}

/// Helper to find campaign days with every slot still free
async fn free_dates(client: &Client, count: usize) -> Vec<String> {
    let days: Value = client
        .get(format!("{}/calendar", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let free: Vec<String> = days
        .as_array()
        .expect("Calendar is not a list")
        .iter()
        .filter(|d| d["visits"] == 0 && d["blocked"] == false && d["holiday"] == false)
        .take(count)
        .map(|d| d["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(free.len(), count, "Not enough free campaign days");
    free
}

async fn first_school(client: &Client) -> i64 {
    let schools: Value = client
        .get(format!("{}/schools", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    schools[0]["rbd"].as_i64().expect("The seed needs at least one school")
}

#[tokio::test]
#[ignore]
async fn test_redate_moves_visit_and_attendance() {
    let client = Client::new();
    let token = get_auth_token(&client, 13).await;
    let other = get_auth_token(&client, 17).await;
    let rbd = first_school(&client).await;
    let dates = free_dates(&client, 3).await;
    let (first, second, full) = (&dates[0], &dates[1], &dates[2]);

    // Create and answer attendance
    let response = client
        .post(format!("{}/visits", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "visit_date": first, "rbd": rbd }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.expect("Failed to parse response");
    let old_id = body["visit_id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/visits/{}/attendance", BASE_URL, old_id))
        .header("Authorization", format!("Bearer {}", other))
        .json(&json!({ "attends": true }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // Move it to another day
    let response = client
        .put(format!("{}/visits/{}", BASE_URL, old_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "visit_date": second }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    let new_id = body["visit_id"].as_i64().unwrap();
    assert_ne!(new_id, old_id);

    let moved: Value = client
        .get(format!("{}/visits/{}", BASE_URL, new_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(moved["rescheduled_from"].as_i64(), Some(old_id));
    assert_eq!(moved["visit_date"].as_str(), Some(second.as_str()));

    let response = client
        .get(format!("{}/visits/{}", BASE_URL, old_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let attendance: Value = client
        .get(format!("{}/visits/{}/attendance", BASE_URL, new_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(attendance["attending"].as_array().unwrap().len(), 1);

    // Fill another day, then try to move onto it
    let campaign: Value = client
        .get(format!("{}/campaign", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let cap = campaign["daily_cap"].as_u64().unwrap();

    let mut fillers = Vec::new();
    for _ in 0..cap {
        let response = client
            .post(format!("{}/visits", BASE_URL))
            .header("Authorization", format!("Bearer {}", other))
            .json(&json!({ "visit_date": full, "rbd": rbd }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = response.json().await.expect("Failed to parse response");
        fillers.push(body["visit_id"].as_i64().unwrap());
    }

    let response = client
        .put(format!("{}/visits/{}", BASE_URL, new_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "visit_date": full }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let unchanged: Value = client
        .get(format!("{}/visits/{}", BASE_URL, new_id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(unchanged["visit_date"].as_str(), Some(second.as_str()));

    // Clean up
    for id in fillers {
        client
            .delete(format!("{}/visits/{}", BASE_URL, id))
            .header("Authorization", format!("Bearer {}", other))
            .send()
            .await
            .expect("Failed to send request");
    }
    client
        .delete(format!("{}/visits/{}", BASE_URL, new_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .post(format!("{}/visits", BASE_URL))
        .json(&json!({ "visit_date": "2024-04-10", "rbd": 8485 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
