//! API Integration Tests
//!
//! The server under test runs on in-memory repositories, so the suite needs
//! no database or environment setup and exercises the full HTTP stack:
//! authentication, capability checks, query parsing, services, and the
//! audit/moderation write paths.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use chrono::{Duration, Utc};
use integration_tests::{assert_json, assert_status, fixtures::*, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};

use desk_core::{ThreadSource, ThreadStatus};

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));
    assert!(body["uptime"].is_u64());
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/health/ready").await.expect("Request failed");
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["database"], "healthy");
}

#[tokio::test]
async fn test_health_ready_reports_database_down() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.set_database_healthy(false);

    let response = server.get("/health/ready").await.unwrap();
    let body: Value = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();

    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["checks"]["database"], "unhealthy");
}

// ============================================================================
// Auth Tests
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get("/threads").await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    assert_eq!(body.error, "Missing authentication");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server.get_auth("/threads", "not-a-jwt").await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();

    assert_eq!(body.error, "Invalid token");
}

#[tokio::test]
async fn test_buyer_role_cannot_view_threads() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&buyer_actor());

    let response = server.get_auth("/threads", &token).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();

    assert_eq!(body.error, "Missing capability: VIEW_THREADS");
}

#[tokio::test]
async fn test_support_role_can_list_threads() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server.get_auth("/threads", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 50);
}

// ============================================================================
// Thread Listing Tests
// ============================================================================

#[tokio::test]
async fn test_list_returns_enriched_rows() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_seller(seller("sel_1", "Atelier Rustic"));
    server.store.insert_user(buyer_user("usr_ion", "Ion Moraru"));

    let mut th = thread("th_1");
    th.source = ThreadSource::Chatbot;
    th.seller_id = Some("sel_1".to_string());
    th.buyer_id = Some("usr_ion".to_string());
    server.store.insert_thread(th);
    server.store.insert_tag("th_1", "VIP");

    let token = server.token_for(&support_actor());
    let response = server.get_auth("/threads", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    let row = &body["data"][0];
    assert_eq!(row["id"], "th_1");
    assert_eq!(row["source"], "chatbot");
    assert_eq!(row["status"], "open");
    assert_eq!(row["displaySubject"], "Webchat: Ion Moraru");
    assert_eq!(row["seller"]["brandName"], "Atelier Rustic");
    assert_eq!(row["seller"]["slug"], "atelier-rustic");
    assert_eq!(row["buyer"]["email"], "usr_ion@example.com");
    assert_eq!(row["tags"], json!(["vip"]));
    assert!(row["assignedTo"].is_null());
}

#[tokio::test]
async fn test_list_pagination_totals() {
    let server = TestServer::start().await.expect("Failed to start server");
    for i in 0..5 {
        let mut th = thread(&format!("th_{i}"));
        th.last_message_at = Some(Utc::now() - Duration::hours(i));
        server.store.insert_thread(th);
    }

    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?page=1&limit=2", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 2);

    let response = server
        .get_auth("/threads?page=3&limit=2", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 5);
}

#[tokio::test]
async fn test_triage_queue_ordering() {
    let server = TestServer::start().await.expect("Failed to start server");
    let now = Utc::now();

    let seed = [
        ("th_open_new", ThreadStatus::Open, 0),
        ("th_wait_old", ThreadStatus::Waiting, 3),
        ("th_wait_new", ThreadStatus::Waiting, 1),
        ("th_open_old", ThreadStatus::Open, 2),
    ];
    for (id, status, hours_ago) in seed {
        let mut th = thread(id);
        th.status = status;
        th.last_message_at = Some(now - Duration::hours(hours_ago));
        server.store.insert_thread(th);
    }

    // The triage override applies to the exact open+waiting set even when a
    // sort is requested: waiting oldest-first, then open newest-first
    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?status=open,waiting&sortBy=createdAt", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec!["th_wait_old", "th_wait_new", "th_open_new", "th_open_old"]
    );
}

#[tokio::test]
async fn test_tag_filter_short_circuits() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));

    let token = server.token_for(&support_actor());
    let response = server.get_auth("/threads?tags=vip", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["data"], json!([]));
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_tag_filter_matches_case_insensitive() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_tagged"));
    server.store.insert_thread(thread("th_plain"));
    server.store.insert_tag("th_tagged", "vip");

    let token = server.token_for(&support_actor());
    let response = server.get_auth("/threads?tags=VIP", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_tagged");
}

#[tokio::test]
async fn test_seller_filter() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut th = thread("th_a");
    th.seller_id = Some("sel_1".to_string());
    server.store.insert_thread(th);
    let mut th = thread("th_b");
    th.seller_id = Some("sel_2".to_string());
    server.store.insert_thread(th);

    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?sellerId=sel_1", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_a");
}

#[tokio::test]
async fn test_unknown_status_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .get_auth("/threads?status=archived", &token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert!(body.error.contains("archived"));
}

#[tokio::test]
async fn test_unknown_sort_key_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .get_auth("/threads?sortBy=subject", &token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert!(body.error.contains("subject"));
}

#[tokio::test]
async fn test_my_queue_shorthand() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut th = thread("th_mine");
    th.assigned_to_user_id = Some("usr_support".to_string());
    server.store.insert_thread(th);
    let mut th = thread("th_other");
    th.assigned_to_user_id = Some("usr_other".to_string());
    server.store.insert_thread(th);
    server.store.insert_thread(thread("th_unassigned"));

    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?myQueue=true", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_mine");
}

#[tokio::test]
async fn test_unassigned_sentinel() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut th = thread("th_assigned");
    th.assigned_to_user_id = Some("usr_other".to_string());
    server.store.insert_thread(th);
    server.store.insert_thread(thread("th_free"));

    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?assignedToUserId=unassigned", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_free");
}

#[tokio::test]
async fn test_search_scans_subject_and_preview() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut th = thread("th_subject");
    th.subject = Some("Refund for order 9941".to_string());
    server.store.insert_thread(th);
    let mut th = thread("th_preview");
    th.last_message_preview = Some("Where is my package?".to_string());
    server.store.insert_thread(th);

    let token = server.token_for(&support_actor());
    let response = server
        .get_auth("/threads?search=refund", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_subject");

    let response = server
        .get_auth("/threads?search=PACKAGE", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], "th_preview");
}

// ============================================================================
// Thread Action Tests
// ============================================================================

#[tokio::test]
async fn test_assign_then_unassign_emits_event_pair() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    // Assign
    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "assign", "assignToUserId": "usr_other" }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Thread assigned to usr_other");
    assert_eq!(
        server.store.thread("th_1").unwrap().assigned_to_user_id,
        Some("usr_other".to_string())
    );

    // Unassign by omitting the target
    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "assign" }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Thread unassigned");
    assert_eq!(server.store.thread("th_1").unwrap().assigned_to_user_id, None);

    let events = server.store.moderation_events("th_1");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action_type, "thread.assign");
    assert!(events[0].metadata["previous"].is_null());
    assert_eq!(events[0].metadata["new"], "usr_other");
    assert_eq!(events[1].action_type, "thread.unassign");
    assert_eq!(events[1].metadata["previous"], "usr_other");
    assert!(events[1].metadata["new"].is_null());
}

#[tokio::test]
async fn test_action_on_unknown_thread_is_not_found() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_missing", "action": "assign", "assignToUserId": "usr_9" }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();

    assert_eq!(body.error, "Thread not found: th_missing");
}

#[tokio::test]
async fn test_resolve_stamps_provenance_once() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let support = server.token_for(&support_actor());
    let admin = server.token_for(&admin_actor());

    let request = json!({ "threadId": "th_1", "action": "status", "status": "resolved" });
    let response = server.post_auth("/threads", &support, &request).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Re-resolving by someone else must not steal the provenance
    let response = server.post_auth("/threads", &admin, &request).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let stored = server.store.thread("th_1").unwrap();
    assert_eq!(stored.status, ThreadStatus::Resolved);
    assert_eq!(stored.resolved_by_user_id, Some("usr_support".to_string()));
    assert_eq!(stored.closed_by_user_id, None);
}

#[tokio::test]
async fn test_status_transition_policy_denies() {
    let server = TestServer::start_with_transitions("open>assigned,assigned>resolved")
        .await
        .expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    // open -> resolved is not whitelisted
    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "status", "status": "resolved" }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert_eq!(body.error, "Status transition not allowed: open -> resolved");
    assert_eq!(
        server.store.thread("th_1").unwrap().status,
        ThreadStatus::Open
    );

    // The whitelisted path passes
    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "status", "status": "assigned" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "status", "status": "resolved" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();
    assert_eq!(
        server.store.thread("th_1").unwrap().status,
        ThreadStatus::Resolved
    );
}

#[tokio::test]
async fn test_priority_change_lands_in_feed() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "priority", "priority": "urgent" }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Priority changed to urgent");

    let response = server
        .get_auth("/moderation?threadId=th_1", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    let event = &body["data"][0];
    assert_eq!(event["actionType"], "thread.priorityChange");
    assert_eq!(event["metadata"]["previous"], "normal");
    assert_eq!(event["metadata"]["new"], "urgent");
    assert_eq!(event["actorId"], "usr_support");
}

#[tokio::test]
async fn test_invalid_priority_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "priority", "priority": "critical" }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert_eq!(body.error, "Invalid priority: critical");
}

#[tokio::test]
async fn test_tags_normalize_and_dedupe() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "addTag", "tag": "  VIP " }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Tag 'vip' added");

    // Re-adding is a row no-op but still audited
    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "addTag", "tag": "vip" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    assert_eq!(server.store.tags_of("th_1"), vec!["vip"]);
    let tag_audits = server
        .store
        .audit_entries()
        .into_iter()
        .filter(|e| e.action == "support.thread.tag_add")
        .count();
    assert_eq!(tag_audits, 2);
}

#[tokio::test]
async fn test_empty_tag_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/threads",
            &token,
            &json!({ "threadId": "th_1", "action": "addTag", "tag": "   " }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert_eq!(body.error, "Tag must not be empty");
}

// ============================================================================
// Flag Tests
// ============================================================================

#[tokio::test]
async fn test_fraud_provenance_survives_clearing() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({
                "conversationId": "conv-9",
                "action": "setFraud",
                "fraudSuspected": true,
                "fraudReason": "chargeback pattern"
            }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Fraud suspicion set");

    let flag = server.store.extended_flag("conv-9").unwrap();
    assert!(flag.fraud_suspected);
    assert_eq!(flag.fraud_reason.as_deref(), Some("chargeback pattern"));
    assert!(flag.fraud_detected_at.is_some());
    assert_eq!(
        flag.fraud_detected_by_user_id.as_deref(),
        Some("usr_support")
    );

    // Clearing without a reason keeps both the stored reason and the
    // detection provenance
    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-9", "action": "setFraud", "fraudSuspected": false }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Fraud suspicion cleared");

    let flag = server.store.extended_flag("conv-9").unwrap();
    assert!(!flag.fraud_suspected);
    assert_eq!(flag.fraud_reason.as_deref(), Some("chargeback pattern"));
    assert!(flag.fraud_detected_at.is_some());
    assert_eq!(
        flag.fraud_detected_by_user_id.as_deref(),
        Some("usr_support")
    );
}

#[tokio::test]
async fn test_escalate_requires_target() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-1", "action": "escalate" }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert_eq!(body.error, "Escalation requires a target user");
}

#[tokio::test]
async fn test_escalate_then_deescalate() {
    let server = TestServer::start().await.expect("Failed to start server");
    // thread("th_1") uses conversation id "conv-th_1"
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({
                "conversationId": "conv-th_1",
                "action": "escalate",
                "escalateToUserId": "usr_admin",
                "escalationReason": "possible fraud ring"
            }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Escalated to usr_admin");

    let flag = server.store.extended_flag("conv-th_1").unwrap();
    assert_eq!(flag.escalated_to_user_id.as_deref(), Some("usr_admin"));
    assert!(flag.escalated_at.is_some());
    assert_eq!(flag.escalation_reason.as_deref(), Some("possible fraud ring"));

    // The moderation event lands under the owning thread
    let events = server.store.moderation_events("th_1");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action_type, "thread.escalate");
    assert_eq!(events[0].reason.as_deref(), Some("possible fraud ring"));
    assert_eq!(events[0].metadata["escalatedTo"], "usr_admin");

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-th_1", "action": "deescalate" }),
        )
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["message"], "Escalation cleared");

    let flag = server.store.extended_flag("conv-th_1").unwrap();
    assert_eq!(flag.escalated_to_user_id, None);
    assert_eq!(flag.escalated_at, None);
    assert_eq!(flag.escalation_reason, None);

    let events = server.store.moderation_events("th_1");
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].action_type, "thread.deescalate");
    assert_eq!(events[1].metadata["previous"], "usr_admin");
}

#[tokio::test]
async fn test_deescalate_without_record_is_not_found() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-none", "action": "deescalate" }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::NOT_FOUND).await.unwrap();

    assert_eq!(
        body.error,
        "Nothing to de-escalate for conversation: conv-none"
    );
}

#[tokio::test]
async fn test_escalation_reason_overwritten_as_unit() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({
                "conversationId": "conv-5",
                "action": "escalate",
                "escalateToUserId": "usr_a",
                "escalationReason": "first pass"
            }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    // Re-escalating without a reason replaces the whole triple; the old
    // reason must not survive under the new target
    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-5", "action": "escalate", "escalateToUserId": "usr_b" }),
        )
        .await
        .unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let flag = server.store.extended_flag("conv-5").unwrap();
    assert_eq!(flag.escalated_to_user_id.as_deref(), Some("usr_b"));
    assert_eq!(flag.escalation_reason, None);
}

#[tokio::test]
async fn test_evidence_appends_accumulate() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    for payload in [
        json!({ "kind": "order", "id": "ord_1" }),
        json!({ "kind": "screenshot", "url": "https://cdn.example/s.png" }),
    ] {
        let response = server
            .post_auth(
                "/flags",
                &token,
                &json!({ "conversationId": "conv-2", "action": "addEvidence", "evidence": payload }),
            )
            .await
            .unwrap();
        let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
        assert_eq!(body["message"], "Evidence appended");
    }

    let flag = server.store.extended_flag("conv-2").unwrap();
    assert_eq!(flag.evidence.entries.len(), 2);
    assert!(flag
        .evidence
        .entries
        .iter()
        .all(|e| e.added_by == "usr_support"));

    // The inspection view carries the ledger
    let response = server
        .get_auth("/flags?conversationId=conv-2", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    let entries = body["extendedFlags"]["evidence"]["entries"]
        .as_array()
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["addedBy"], "usr_support");
    assert_eq!(entries[0]["content"]["kind"], "order");
}

#[tokio::test]
async fn test_empty_evidence_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server
        .post_auth(
            "/flags",
            &token,
            &json!({ "conversationId": "conv-2", "action": "addEvidence", "evidence": "   " }),
        )
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert_eq!(body.error, "Evidence payload must not be empty");
    assert!(server.store.extended_flag("conv-2").is_none());
}

#[tokio::test]
async fn test_inspect_returns_both_records_or_nulls() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_basic_flag(basic_flag("conv-a", true, 3));
    let token = server.token_for(&support_actor());

    let response = server
        .get_auth("/flags?conversationId=conv-a", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["conversationId"], "conv-a");
    assert_eq!(body["basicFlags"]["bypassSuspected"], true);
    assert_eq!(body["basicFlags"]["attempts24h"], 3);
    assert!(body["extendedFlags"].is_null());

    // A conversation with no records at all still answers, with nulls
    let response = server
        .get_auth("/flags?conversationId=conv-b", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["conversationId"], "conv-b");
    assert!(body["basicFlags"].is_null());
    assert!(body["extendedFlags"].is_null());
}

#[tokio::test]
async fn test_flag_listing_filters() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_basic_flag(basic_flag("conv-b", true, 5));
    server
        .store
        .insert_basic_flag(basic_flag("conv-quiet", false, 0));

    let mut fraud = extended_flag("conv-f");
    fraud.fraud_suspected = true;
    fraud.fraud_detected_at = Some(Utc::now());
    fraud.fraud_detected_by_user_id = Some("usr_support".to_string());
    server.store.insert_extended_flag(fraud);

    let mut escalated = extended_flag("conv-e");
    escalated.escalated_to_user_id = Some("usr_esc".to_string());
    escalated.escalated_at = Some(Utc::now());
    server.store.insert_extended_flag(escalated);
    server.store.insert_user(staff_user("usr_esc", "Maria Toma"));

    let token = server.token_for(&support_actor());

    let response = server.get_auth("/flags?filter=bypass", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["filter"], "bypass");
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["conversationId"], "conv-b");

    let response = server.get_auth("/flags?filter=fraud", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["conversationId"], "conv-f");

    // Escalated rows resolve their target through the directory
    let response = server
        .get_auth("/flags?filter=escalated", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["conversationId"], "conv-e");
    assert_eq!(body["data"][0]["escalatedTo"]["name"], "Maria Toma");

    // No filter means the fraud-or-escalated union
    let response = server.get_auth("/flags", &token).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["filter"], "all");
    assert_eq!(body["total"], 2);

    let response = server
        .get_auth("/flags?filter=suspicious", &token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();
    assert!(body.error.contains("suspicious"));
}

// ============================================================================
// CSV Export Tests
// ============================================================================

#[tokio::test]
async fn test_export_requires_capability() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let response = server
        .get_auth("/threads?export=csv", &token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error, "Missing capability: EXPORT_THREADS");

    // A rejected export never reaches the audit log
    assert!(server.store.audit_entries().is_empty());
}

#[tokio::test]
async fn test_export_renders_csv_and_audits() {
    let server = TestServer::start().await.expect("Failed to start server");
    let mut th = thread("th_1");
    th.subject = Some("Refund for order 9941".to_string());
    th.sla_breach = true;
    server.store.insert_thread(th);
    server.store.insert_thread(thread("th_2"));
    let token = server.token_for(&admin_actor());

    let response = server
        .get_auth("/threads?export=csv&status=open", &token)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap(),
        "text/csv; charset=utf-8"
    );
    let disposition = response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"support-threads-"));
    assert!(disposition.ends_with(".csv\""));

    let body = response.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Source,Status,Priority,Subject,Seller,Buyer Email,Assigned To,\
         Message Count,SLA Breach,Last Message,Created"
    );
    assert_eq!(lines.clone().count(), 2);
    assert!(body.contains("Unassigned"));
    assert!(body.contains("Yes"));

    let audits = server.store.audit_entries();
    assert_eq!(audits.len(), 1);
    let entry = &audits[0];
    assert_eq!(entry.action, "support.threads.export");
    assert_eq!(entry.entity_type, "thread");
    assert_eq!(entry.entity_id, "export");
    assert_eq!(entry.message, "Exported 2 threads to CSV");
    assert_eq!(entry.meta["rows"], 2);
    assert_eq!(entry.meta["filters"]["status"], "open");
}

#[tokio::test]
async fn test_unknown_export_format_is_rejected() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&admin_actor());

    let response = server
        .get_auth("/threads?export=xlsx", &token)
        .await
        .unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert!(body.error.contains("xlsx"));
}

// ============================================================================
// History Tests
// ============================================================================

#[tokio::test]
async fn test_moderation_feed_requires_thread_id() {
    let server = TestServer::start().await.expect("Failed to start server");
    let token = server.token_for(&support_actor());

    let response = server.get_auth("/moderation", &token).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::BAD_REQUEST)
        .await
        .unwrap();

    assert!(body.error.contains("threadId"));
}

#[tokio::test]
async fn test_moderation_feed_newest_first() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let token = server.token_for(&support_actor());

    let assign = json!({ "threadId": "th_1", "action": "assign", "assignToUserId": "usr_9" });
    let response = server.post_auth("/threads", &token, &assign).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let bump = json!({ "threadId": "th_1", "action": "priority", "priority": "high" });
    let response = server.post_auth("/threads", &token, &bump).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth("/moderation?threadId=th_1", &token)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();

    assert_eq!(body["total"], 2);
    assert_eq!(body["data"][0]["actionType"], "thread.priorityChange");
    assert_eq!(body["data"][1]["actionType"], "thread.assign");
}

#[tokio::test]
async fn test_audit_trail_requires_admin() {
    let server = TestServer::start().await.expect("Failed to start server");
    let support = server.token_for(&support_actor());
    let admin = server.token_for(&admin_actor());

    let response = server.get_auth("/audit", &support).await.unwrap();
    let body: ErrorBody = assert_json(response, StatusCode::FORBIDDEN).await.unwrap();
    assert_eq!(body.error, "Missing capability: VIEW_AUDIT");

    let response = server.get_auth("/audit", &admin).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_audit_trail_scopes_to_entity() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.store.insert_thread(thread("th_1"));
    let support = server.token_for(&support_actor());
    let admin = server.token_for(&admin_actor());

    // One thread entry and one flag entry
    let assign = json!({ "threadId": "th_1", "action": "assign", "assignToUserId": "usr_9" });
    let response = server.post_auth("/threads", &support, &assign).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let fraud = json!({ "conversationId": "conv-x", "action": "setFraud", "fraudSuspected": true });
    let response = server.post_auth("/flags", &support, &fraud).await.unwrap();
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = server
        .get_auth("/audit?entityType=thread&entityId=th_1", &admin)
        .await
        .unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["action"], "support.thread.assign");
    assert_eq!(body["data"][0]["entityType"], "thread");
    assert_eq!(body["data"][0]["entityId"], "th_1");
    assert_eq!(body["data"][0]["actorId"], "usr_support");

    let response = server.get_auth("/audit", &admin).await.unwrap();
    let body: Value = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["total"], 2);
}
