//! Live tests against a running API.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`solace-cli migrate`)
//! - The API running (`cargo run -p solace-api`)
//! - `SOLACE_DATABASE_URL` pointing at the same database, for fixtures
//!
//! Run with: `cargo test -p solace-integration-tests -- --ignored`

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

use solace_integration_tests::base_url;

async fn pool() -> PgPool {
    let url = std::env::var("SOLACE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("SOLACE_DATABASE_URL must be set for live tests");
    PgPool::connect(&url).await.expect("connect to database")
}

/// Insert a profile and return its ID.
async fn create_profile(pool: &PgPool, role: &str) -> Uuid {
    let email = format!("live-{}@test.solace.health", Uuid::new_v4());
    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO profiles (email, full_name, role) VALUES ($1, 'Live Test', $2::user_role) RETURNING id",
    )
    .bind(&email)
    .bind(role)
    .fetch_one(pool)
    .await
    .expect("insert profile");
    id
}

async fn post(client: &Client, path: &str, body: &Value) -> (StatusCode, Value) {
    let resp = client
        .post(format!("{}{path}", base_url()))
        .json(body)
        .send()
        .await
        .expect("request failed");
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_live_readiness() {
    let resp = Client::new()
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Messaging
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_message_round_trip() {
    let pool = pool().await;
    let client = Client::new();
    let alice = create_profile(&pool, "client").await;
    let bob = create_profile(&pool, "therapist").await;

    let (status, body) = post(
        &client,
        "/functions/send-message",
        &json!({"sender_id": alice, "recipient_id": bob, "content": "Hello <there>"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"]["content"], "Hello there");
    let conversation_id = body["message"]["conversation_id"]
        .as_str()
        .expect("conversation id")
        .to_string();

    let (_, body) = post(
        &client,
        "/functions/get-conversations",
        &json!({"user_id": bob}),
    )
    .await;
    let conversations = body["conversations"].as_array().expect("conversations");
    let entry = conversations
        .iter()
        .find(|c| c["conversation_id"] == conversation_id.as_str())
        .expect("conversation listed");
    assert_eq!(entry["unread_count"], 1);
    assert_eq!(entry["participant_id"], alice.to_string());

    let (status, body) = post(
        &client,
        &format!("/api/conversations/{conversation_id}/read"),
        &json!({"user_id": bob}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_notification_is_stored() {
    let pool = pool().await;
    let user = create_profile(&pool, "client").await;

    let (status, body) = post(
        &Client::new(),
        "/functions/send-notification",
        &json!({
            "user_id": user,
            "title": "Session reminder",
            "message": "Your session starts in 1 hour",
            "notification_type": "session_reminder"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["channel"], "in_app");
    assert_eq!(body["delivery"], "stored");
}

// ============================================================================
// Workshops
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_concurrent_registrations_respect_capacity() {
    let pool = pool().await;
    let (workshop_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO workshops (title, facilitator, starts_at, capacity) \
         VALUES ('Grounding', 'Live Test', NOW() + INTERVAL '7 days', 1) RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .expect("insert workshop");

    let mut profiles = Vec::new();
    for _ in 0..8 {
        profiles.push(create_profile(&pool, "client").await);
    }

    let client = Client::new();
    let path = format!("/api/workshops/{workshop_id}/register");
    let mut requests = tokio::task::JoinSet::new();
    for profile in profiles {
        let client = client.clone();
        let path = path.clone();
        requests.spawn(async move {
            post(&client, &path, &json!({"profile_id": profile})).await.0
        });
    }

    let mut created = 0;
    while let Some(status) = requests.join_next().await {
        match status.expect("request task") {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);

    let (registered,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM workshop_registrations WHERE workshop_id = $1")
            .bind(workshop_id)
            .fetch_one(&pool)
            .await
            .expect("count registrations");
    assert_eq!(registered, 1);
}

// ============================================================================
// Billing
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_pricing_plans() {
    let resp = Client::new()
        .get(format!("{}/api/pricing/plans", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("json body");
    let tiers: Vec<&str> = body["plans"]
        .as_array()
        .expect("plans")
        .iter()
        .filter_map(|p| p["tier"].as_str())
        .collect();
    assert_eq!(tiers, ["basic", "premium", "enterprise"]);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_failed_renewals_cancel_after_retries() {
    let pool = pool().await;
    let profile = create_profile(&pool, "client").await;
    let (subscription_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO subscriptions (profile_id, plan_tier, current_period_start, current_period_end) \
         VALUES ($1, 'basic', NOW(), NOW() + INTERVAL '30 days') RETURNING id",
    )
    .bind(profile)
    .fetch_one(&pool)
    .await
    .expect("insert subscription");

    let client = Client::new();
    let path = format!("/api/subscriptions/{subscription_id}/payment-failed");

    for attempt in 1..=3 {
        let (status, body) = post(&client, &path, &json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subscription"]["status"], "past_due");
        assert_eq!(body["retry_schedule"]["attempt"], attempt);
    }

    let (status, body) = post(&client, &path, &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription"]["status"], "cancelled");
    assert!(body["retry_schedule"].is_null());
    assert!(body["subscription"]["next_retry_at"].is_null());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_concurrent_failures_are_each_counted() {
    let pool = pool().await;
    let profile = create_profile(&pool, "client").await;
    let (subscription_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO subscriptions (profile_id, plan_tier, status, retry_attempt, \
                                    current_period_start, current_period_end) \
         VALUES ($1, 'basic', 'past_due', 2, NOW(), NOW() + INTERVAL '30 days') RETURNING id",
    )
    .bind(profile)
    .fetch_one(&pool)
    .await
    .expect("insert subscription");

    let client = Client::new();
    let path = format!("/api/subscriptions/{subscription_id}/payment-failed");
    let body = json!({});
    let (first, second) = tokio::join!(
        post(&client, &path, &body),
        post(&client, &path, &body),
    );

    let accepted = [&first, &second]
        .into_iter()
        .filter(|(status, _)| *status == StatusCode::OK)
        .count();
    let (status, retry_attempt): (String, i32) = sqlx::query_as(
        "SELECT status::text, retry_attempt FROM subscriptions WHERE id = $1",
    )
    .bind(subscription_id)
    .fetch_one(&pool)
    .await
    .expect("read subscription");

    // Either both failures landed in turn, or the loser was turned away.
    if accepted == 2 {
        assert_eq!(status, "cancelled");
    } else {
        assert_eq!(accepted, 1);
        assert!(
            [&first, &second]
                .iter()
                .any(|(status, _)| *status == StatusCode::CONFLICT)
        );
        assert_eq!((status.as_str(), retry_attempt), ("past_due", 3));
    }
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_live_upgrade_returns_proration() {
    let pool = pool().await;
    let profile = create_profile(&pool, "client").await;
    let (subscription_id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO subscriptions (profile_id, plan_tier, current_period_start, current_period_end) \
         VALUES ($1, 'basic', NOW(), NOW() + INTERVAL '30 days') RETURNING id",
    )
    .bind(profile)
    .fetch_one(&pool)
    .await
    .expect("insert subscription");

    let (status, body) = post(
        &Client::new(),
        &format!("/api/subscriptions/{subscription_id}/change-plan"),
        &json!({"new_plan": "premium"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscription"]["plan_tier"], "premium");
    assert_eq!(body["proration"]["change"], "upgrade");
}
