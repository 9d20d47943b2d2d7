use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

use solvendo_auth::{JwtClaims, PrincipalId, Role};
use solvendo_core::TenantId;
use solvendo_infra::delivery::{DeliveryChannel, ScriptedDelivery};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        let app = solvendo_api::app::build_app(jwt_secret.to_string());
        Self::serve(app).await
    }

    /// Same router as prod, but with a scripted delivery channel.
    async fn spawn_with_channel(jwt_secret: &str, channel: Arc<dyn DeliveryChannel>) -> Self {
        let app = solvendo_api::app::build_app_with_channel(jwt_secret.to_string(), channel);
        Self::serve(app).await
    }

    async fn serve(app: axum::Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, tenant_id: TenantId, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: PrincipalId::new(),
        tenant_id,
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn segment_body() -> serde_json::Value {
    json!({
        "name": "Late payers",
        "description": "Recurring late payers, moderate amounts",
        "criteria": {
            "overdueDays": { "min": 10, "max": 60 },
            "amountRange": { "min": 100.0, "max": 5000.0 },
            "customerType": "both",
            "riskLevel": "medium"
        },
        "strategy": {
            "maxRetries": 4,
            "retryInterval": 12,
            "escalationSteps": 3,
            "communicationChannels": ["email", "sms"],
            "priority": "high"
        },
        "kpis": {
            "targetCollectionRate": 0.75,
            "targetResponseTime": 24.0,
            "maxDunningDuration": 45,
            "acceptableFailureRate": 0.1
        }
    })
}

fn dlq_body() -> serde_json::Value {
    json!({
        "originalMessageId": uuid::Uuid::now_v7(),
        "queueName": "dunning-notifications",
        "messageType": "dunning_step",
        "payload": { "invoiceId": "INV-1001" },
        "failureReason": "SMTP connection refused",
        "priority": "high"
    })
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/dunning-solid/segments", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenant_context_is_derived_from_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenantId"].as_str().unwrap(), tenant_id.to_string());
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
}

#[tokio::test]
async fn segment_create_round_trip() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .json(&segment_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let created: serde_json::Value = res.json().await.unwrap();
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Dunning segment created successfully");
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/dunning-solid/segments/{}", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: serde_json::Value = res.json().await.unwrap();
    assert_eq!(fetched["data"]["id"].as_str().unwrap(), id);
    assert_eq!(fetched["data"]["name"], "Late payers");
    assert_eq!(fetched["data"]["isActive"], true);
    assert_eq!(fetched["data"]["strategy"]["maxRetries"], 4);
}

#[tokio::test]
async fn segment_get_is_idempotent() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .json(&segment_body())
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let url = format!("{}/dunning-solid/segments/{}", srv.base_url, id);
    let first: serde_json::Value = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: serde_json::Value = client
        .get(&url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The envelope timestamp moves, the data must not.
    assert_eq!(first["data"], second["data"]);
}

#[tokio::test]
async fn unknown_segment_returns_exact_not_found_body() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    for id in [uuid::Uuid::now_v7().to_string(), "unknown-id".to_string()] {
        let res = client
            .get(format!("{}/dunning-solid/segments/{}", srv.base_url, id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "success": false, "error": "Segment not found" }));
    }
}

#[tokio::test]
async fn invalid_segment_payload_is_rejected() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    // min > max in the overdue range fails domain validation.
    let mut body = segment_body();
    body["criteria"]["overdueDays"] = json!({ "min": 60, "max": 10 });

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn dlq_add_then_retry_succeeds() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn_with_channel(
        jwt_secret,
        Arc::new(ScriptedDelivery::always_succeed()),
    )
    .await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let added: serde_json::Value = res.json().await.unwrap();
    assert_eq!(added["message"], "Message added to DLQ successfully");
    assert_eq!(added["data"]["status"], "pending");
    assert_eq!(added["data"]["retryCount"], 0);
    let id = added["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/retry", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let retried: serde_json::Value = res.json().await.unwrap();
    assert_eq!(retried["message"], "DLQ message retry initiated successfully");
    assert_eq!(retried["data"]["attemptNumber"], 1);
    assert_eq!(retried["data"]["status"], "success");

    // The message itself moved to retried.
    let res = client
        .get(format!("{}/dunning-solid/dlq?status=retried", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["data"]["pagination"]["total"], 1);
    assert_eq!(listed["data"]["messages"][0]["id"].as_str().unwrap(), id);
}

#[tokio::test]
async fn exhausted_retry_budget_dead_letters_the_message() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn_with_channel(
        jwt_secret,
        Arc::new(ScriptedDelivery::always_fail("provider down")),
    )
    .await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/dunning-solid/config", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "maxRetries": 3 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    let added: serde_json::Value = res.json().await.unwrap();
    let id = added["data"]["id"].as_str().unwrap().to_string();
    let retry_url = format!("{}/dunning-solid/dlq/{}/retry", srv.base_url, id);

    // Three failing attempts consume the budget.
    for attempt in 1..=3 {
        let res = client.post(&retry_url).bearer_auth(&token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["data"]["attemptNumber"], attempt);
        assert_eq!(body["data"]["status"], "failed");
    }

    // The fourth call dead-letters instead of attempting delivery.
    let res = client.post(&retry_url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["attemptNumber"], 4);
    assert_eq!(body["data"]["status"], "failed");
    assert_eq!(body["data"]["errorMessage"], "retry budget exhausted");

    let res = client
        .get(format!("{}/dunning-solid/dlq?status=dead", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["data"]["pagination"]["total"], 1);

    // Dead is terminal: a further retry conflicts.
    let res = client.post(&retry_url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Requeue reopens the message with a fresh budget.
    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/requeue", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let requeued: serde_json::Value = res.json().await.unwrap();
    assert_eq!(requeued["data"]["status"], "pending");
    assert_eq!(requeued["data"]["retryCount"], 0);
}

#[tokio::test]
async fn resolve_closes_message_over_http() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    let added: serde_json::Value = res.json().await.unwrap();
    let id = added["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/resolve", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let resolved: serde_json::Value = res.json().await.unwrap();
    assert_eq!(resolved["message"], "DLQ message resolved successfully");
    assert_eq!(resolved["data"]["status"], "resolved");

    // Resolved is terminal: no further retry or resolve.
    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/retry", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/resolve", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn stream_emits_events_for_own_tenant_only() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant1 = TenantId::new();
    let tenant2 = TenantId::new();
    let token1 = mint_jwt(jwt_secret, tenant1, vec![Role::new("admin")]);
    let token2 = mint_jwt(jwt_secret, tenant2, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    // Once the response headers arrive the subscription is live.
    let mut stream = client
        .get(format!("{}/stream", srv.base_url))
        .bearer_auth(&token1)
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);

    // Another tenant's activity must not reach this stream.
    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token2)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let foreign: serde_json::Value = res.json().await.unwrap();
    let foreign_id = foreign["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token1)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let own: serde_json::Value = res.json().await.unwrap();
    let own_id = own["data"]["id"].as_str().unwrap().to_string();

    let mut seen = String::new();
    let waited = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while let Some(chunk) = stream.chunk().await.unwrap() {
            seen.push_str(&String::from_utf8_lossy(&chunk));
            if seen.contains(&own_id) {
                break;
            }
        }
    })
    .await;

    assert!(waited.is_ok(), "no event within timeout, saw: {seen}");
    assert!(seen.contains("event: dlq.message_added"));
    // The foreign add was broadcast first; it must have been filtered out.
    assert!(!seen.contains(&foreign_id));
}

#[tokio::test]
async fn dlq_list_pagination_and_limits() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let res = client
            .post(format!("{}/dunning-solid/dlq", srv.base_url))
            .bearer_auth(&token)
            .json(&dlq_body())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("{}/dunning-solid/dlq?limit=2", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["pagination"]["limit"], 2);

    let res = client
        .get(format!("{}/dunning-solid/dlq?limit=0", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/dunning-solid/dlq?limit=101", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn config_defaults_and_update() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/dunning-solid/config", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["maxRetries"], 5);
    assert_eq!(body["data"]["retryIntervals"], json!([1, 6, 24, 72, 168]));
    assert_eq!(body["data"]["dlqRetentionDays"], 30);

    let res = client
        .put(format!("{}/dunning-solid/config", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "maxRetries": 7, "dlqRetentionDays": 14 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Dunning configuration updated successfully");
    assert_eq!(body["data"]["maxRetries"], 7);
    assert_eq!(body["data"]["dlqRetentionDays"], 14);

    // Invalid patches leave the stored config untouched.
    let res = client
        .put(format!("{}/dunning-solid/config", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "maxRetries": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/dunning-solid/config", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["maxRetries"], 7);
}

#[tokio::test]
async fn writes_require_permission() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    // Viewer has no write permissions; reads still work.
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("viewer")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .json(&segment_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn operator_role_covers_dunning_writes() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("dunning_operator")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token)
        .json(&segment_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn tenant_isolation_blocks_cross_tenant_reads() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant1 = TenantId::new();
    let tenant2 = TenantId::new();
    let token1 = mint_jwt(jwt_secret, tenant1, vec![Role::new("admin")]);
    let token2 = mint_jwt(jwt_secret, tenant2, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token1)
        .json(&segment_body())
        .send()
        .await
        .unwrap();
    let created: serde_json::Value = res.json().await.unwrap();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/dunning-solid/segments/{}", srv.base_url, id))
        .bearer_auth(&token2)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/dunning-solid/segments", srv.base_url))
        .bearer_auth(&token2)
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert!(listed["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn process_reports_counts() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    // Fresh messages are scheduled in the future, so nothing is due yet.
    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/dunning-solid/process", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["processed"], 0);
    assert_eq!(body["data"]["purged"], 0);
}

#[tokio::test]
async fn stats_reflect_message_history() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn_with_channel(
        jwt_secret,
        Arc::new(ScriptedDelivery::always_succeed()),
    )
    .await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/dunning-solid/dlq", srv.base_url))
        .bearer_auth(&token)
        .json(&dlq_body())
        .send()
        .await
        .unwrap();
    let added: serde_json::Value = res.json().await.unwrap();
    let id = added["data"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/dunning-solid/dlq/{}/retry", srv.base_url, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/dunning-solid/stats", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["dlq"]["totalMessages"], 1);
    assert_eq!(body["data"]["dlq"]["retried"], 1);
    assert_eq!(body["data"]["dlq"]["retrySuccessRate"], 1.0);
}

#[tokio::test]
async fn retries_listing_filters_by_message() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn_with_channel(
        jwt_secret,
        Arc::new(ScriptedDelivery::always_fail("provider down")),
    )
    .await;

    let tenant_id = TenantId::new();
    let token = mint_jwt(jwt_secret, tenant_id, vec![Role::new("admin")]);
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let res = client
            .post(format!("{}/dunning-solid/dlq", srv.base_url))
            .bearer_auth(&token)
            .json(&dlq_body())
            .send()
            .await
            .unwrap();
        let added: serde_json::Value = res.json().await.unwrap();
        ids.push(added["data"]["id"].as_str().unwrap().to_string());
    }

    for id in &ids {
        let res = client
            .post(format!("{}/dunning-solid/dlq/{}/retry", srv.base_url, id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!(
            "{}/dunning-solid/retries?messageId={}",
            srv.base_url, ids[0]
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(
        body["data"]["retries"][0]["messageId"].as_str().unwrap(),
        ids[0]
    );
    assert_eq!(body["data"]["retries"][0]["status"], "failed");
}
