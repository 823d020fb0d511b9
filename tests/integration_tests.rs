use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio_stream::StreamExt;
use tower::ServiceExt;

use talk2book::config::AppConfig;
use talk2book::handlers;
use talk2book::models::{Branding, ClockFormat, ExhibitionCatalog};
use talk2book::services::booking_id::SequentialIdGenerator;
use talk2book::state::AppState;

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        branding: Branding::heritage_museum(),
        typing_delay_ms: 0, // zero delays = replies surface on the next drain
        payment_delay_ms: 0,
        display_utc_offset_minutes: 0,
        clock_format: ClockFormat::TwentyFourHour,
        cors_allow_any: true,
    }
}

fn test_state_with(config: AppConfig) -> Arc<AppState> {
    Arc::new(AppState::new(
        config,
        ExhibitionCatalog::default(),
        Arc::new(SequentialIdGenerator::new()),
    ))
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Read SSE frames until `done` holds, returning `(event name, data)` pairs.
async fn read_events(
    body: Body,
    done: impl Fn(&[(String, serde_json::Value)]) -> bool,
) -> Vec<(String, serde_json::Value)> {
    let mut stream = body.into_data_stream();
    let mut buf = String::new();
    let mut events = Vec::new();

    while !done(&events) {
        let chunk = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for an event")
            .expect("event stream ended")
            .unwrap();
        buf.push_str(std::str::from_utf8(&chunk).unwrap());

        while let Some(end) = buf.find("\n\n") {
            let frame: String = buf.drain(..end + 2).collect();
            let mut name = None;
            let mut data = None;
            for line in frame.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    name = Some(v.trim().to_string());
                } else if let Some(v) = line.strip_prefix("data:") {
                    data = Some(serde_json::from_str(v.trim()).unwrap());
                }
            }
            // keepalive comments carry neither
            if let (Some(name), Some(data)) = (name, data) {
                events.push((name, data));
            }
        }
    }
    events
}

fn has_booking(events: &[(String, serde_json::Value)]) -> bool {
    events.iter().any(|(name, _)| name == "booking_complete")
}

fn message_ids(events: &[(String, serde_json::Value)]) -> Vec<u64> {
    events
        .iter()
        .filter(|(name, _)| name == "message")
        .map(|(_, data)| data["message"]["id"].as_u64().unwrap())
        .collect()
}

async fn create_session(state: &Arc<AppState>, exhibition: Option<&str>) -> String {
    let (status, json) = send(
        test_app(state.clone()),
        post_json(
            "/api/chat/sessions",
            serde_json::json!({ "exhibition": exhibition }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn say(state: &Arc<AppState>, session_id: &str, text: &str) -> serde_json::Value {
    let (status, json) = send(
        test_app(state.clone()),
        post_json(
            &format!("/api/chat/sessions/{session_id}/messages"),
            serde_json::json!({ "text": text }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

// ── Health ──

#[tokio::test]
async fn test_health() {
    let state = test_state_with(test_config());
    let (status, json) = send(test_app(state), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

// ── Exhibitions ──

#[tokio::test]
async fn test_list_exhibitions() {
    let state = test_state_with(test_config());
    let (status, json) = send(test_app(state), get("/api/exhibitions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exhibitions"].as_array().unwrap().len(), 4);
    assert_eq!(json["categories"][0], "All");
}

#[tokio::test]
async fn test_filter_exhibitions() {
    let state = test_state_with(test_config());

    let (_, json) = send(
        test_app(state.clone()),
        get("/api/exhibitions?category=Science"),
    )
    .await;
    let list = json["exhibitions"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Space & Science");

    let (_, json) = send(test_app(state), get("/api/exhibitions?search=warhol")).await;
    let list = json["exhibitions"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["unit_price"], 30);
}

#[tokio::test]
async fn test_exhibition_by_id() {
    let state = test_state_with(test_config());
    let (status, json) = send(test_app(state.clone()), get("/api/exhibitions/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Ancient Civilizations");

    let (status, _) = send(test_app(state), get("/api/exhibitions/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Chat Sessions ──

#[tokio::test]
async fn test_create_session_greets() {
    let state = test_state_with(test_config());
    let id = create_session(&state, None).await;

    let (status, json) = send(test_app(state), get(&format!("/api/chat/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "awaiting_exhibition");
    assert_eq!(json["assistant_name"], "Heritage Museum Assistant");
    assert_eq!(json["typing"], false);

    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["sender"], "assistant");
    assert!(messages[0]["text"]
        .as_str()
        .unwrap()
        .contains("Welcome to Heritage Museum"));
    assert_eq!(messages[0]["suggested_replies"].as_array().unwrap().len(), 4);
    assert_eq!(messages[0]["time"].as_str().unwrap().len(), 5);
}

#[tokio::test]
async fn test_create_session_without_body() {
    let state = test_state_with(test_config());
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_preselected_exhibition_skips_first_step() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Modern Art Gallery")).await;

    let (_, json) = send(test_app(state), get(&format!("/api/chat/sessions/{id}"))).await;
    assert_eq!(json["step"], "awaiting_date");
    assert_eq!(json["draft"]["exhibition"], "Modern Art Gallery");
}

#[tokio::test]
async fn test_full_booking_flow() {
    let state = test_state_with(test_config());
    let id = create_session(&state, None).await;

    let json = say(&state, &id, "Ancient Civilizations").await;
    assert_eq!(json["accepted"], true);
    assert_eq!(json["session"]["step"], "awaiting_date");

    let json = say(&state, &id, "Tomorrow").await;
    assert_eq!(json["session"]["step"], "awaiting_ticket_count");
    let last = json["session"]["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["suggested_replies"][4], "5+");

    let json = say(&state, &id, "2").await;
    assert_eq!(json["session"]["step"], "awaiting_confirmation");
    assert_eq!(json["session"]["draft"]["total"], 50);
    let last = json["session"]["messages"].as_array().unwrap().last().unwrap().clone();
    assert_eq!(last["summary"]["total"], 50);
    assert_eq!(last["summary"]["ticket_count"], 2);

    let json = say(&state, &id, "yes").await;
    let session = &json["session"];
    assert_eq!(session["step"], "complete");
    assert_eq!(session["booking"]["booking_id"], "HM-000001");
    assert_eq!(session["booking"]["ticket_count"], 2);
    assert_eq!(session["booking"]["total_price"], 50);

    // greeting + 4 user inputs + 3 replies + processing + success
    let messages = session["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 10);
    assert!(messages[8]["text"].as_str().unwrap().contains("Processing"));
    assert!(messages[9]["text"].as_str().unwrap().contains("HM-000001"));

    let (status, json) = send(test_app(state.clone()), get("/api/bookings/HM-000001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["exhibition"], "Ancient Civilizations");
    assert_eq!(json["visit_date"], "Tomorrow");

    let json = say(&state, &id, "book again").await;
    assert_eq!(json["accepted"], false);
    assert_eq!(json["reason"], "completed");
}

#[tokio::test]
async fn test_invalid_ticket_count_reprompts() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Space & Science")).await;
    say(&state, &id, "Today").await;

    for input in ["0", "abc"] {
        let json = say(&state, &id, input).await;
        assert_eq!(json["accepted"], true);
        assert_eq!(json["session"]["step"], "awaiting_ticket_count");
        assert!(json["session"]["draft"]["ticket_count"].is_null());
        let last = json["session"]["messages"].as_array().unwrap().last().unwrap().clone();
        assert!(last["text"].as_str().unwrap().contains("valid number"));
    }
}

#[tokio::test]
async fn test_decline_starts_over() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Contemporary Photography")).await;
    say(&state, &id, "This weekend").await;
    say(&state, &id, "3").await;

    let json = say(&state, &id, "no").await;
    let draft = &json["session"]["draft"];
    assert_eq!(json["session"]["step"], "awaiting_exhibition");
    assert!(draft["exhibition"].is_null());
    assert!(draft["visit_date"].is_null());
    assert!(draft["ticket_count"].is_null());
}

#[tokio::test]
async fn test_empty_input_ignored() {
    let state = test_state_with(test_config());
    let id = create_session(&state, None).await;

    let json = say(&state, &id, "   ").await;
    assert_eq!(json["accepted"], false);
    assert_eq!(json["reason"], "empty_input");
    assert_eq!(json["session"]["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_payment_in_progress_blocks_input_and_restart() {
    let mut config = test_config();
    config.payment_delay_ms = 60_000;
    let state = test_state_with(config);
    let id = create_session(&state, Some("Ancient Civilizations")).await;
    say(&state, &id, "Tomorrow").await;
    say(&state, &id, "1").await;

    let json = say(&state, &id, "confirm").await;
    assert_eq!(json["session"]["step"], "processing_payment");
    assert_eq!(json["session"]["typing"], true);

    let json = say(&state, &id, "hurry up").await;
    assert_eq!(json["accepted"], false);
    assert_eq!(json["reason"], "payment_in_progress");

    let (status, _) = send(
        test_app(state),
        post_json(
            &format!("/api/chat/sessions/{id}/restart"),
            serde_json::json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_restart_session() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Ancient Civilizations")).await;
    say(&state, &id, "Tomorrow").await;

    let (status, json) = send(
        test_app(state),
        post_json(
            &format!("/api/chat/sessions/{id}/restart"),
            serde_json::json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "awaiting_exhibition");
    assert!(json["draft"]["exhibition"].is_null());
    let last = json["messages"].as_array().unwrap().last().unwrap().clone();
    assert!(last["text"].as_str().unwrap().contains("Welcome"));
}

#[tokio::test]
async fn test_unknown_session() {
    let state = test_state_with(test_config());
    let (status, json) = send(
        test_app(state.clone()),
        get("/api/chat/sessions/00000000-0000-0000-0000-000000000000"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("not found"));

    let (status, _) = send(test_app(state), get("/api/chat/sessions/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_session() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Modern Art Gallery")).await;
    for input in ["Today", "1", "yes"] {
        say(&state, &id, input).await;
    }

    let uri = format!("/api/chat/sessions/{id}");
    let (status, _) = send(test_app(state.clone()), delete(&uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(test_app(state.clone()), get(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(test_app(state.clone()), delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // the completed booking outlives its session
    let (status, json) = send(test_app(state), get("/api/bookings/HM-000001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_price"], 30);
}

#[tokio::test]
async fn test_delete_session_refused_during_payment() {
    let mut config = test_config();
    config.payment_delay_ms = 60_000;
    let state = test_state_with(config);
    let id = create_session(&state, Some("Ancient Civilizations")).await;
    for input in ["Tomorrow", "1", "confirm"] {
        say(&state, &id, input).await;
    }

    let uri = format!("/api/chat/sessions/{id}");
    let (status, _) = send(test_app(state.clone()), delete(&uri)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, json) = send(test_app(state), get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["step"], "processing_payment");
}

#[tokio::test]
async fn test_unaffordable_ticket_count_reprompts() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Ancient Civilizations")).await;
    say(&state, &id, "Today").await;

    let json = say(&state, &id, "200000000").await;
    assert_eq!(json["session"]["step"], "awaiting_ticket_count");
    let last = json["session"]["messages"].as_array().unwrap().last().unwrap().clone();
    assert!(last["text"].as_str().unwrap().contains("valid number"));
    assert!(last.get("summary").map_or(true, |s| s.is_null()));
}

// ── Event Stream ──

#[tokio::test]
async fn test_events_catch_up_then_live_in_order() {
    let state = test_state_with(test_config());
    let id = create_session(&state, None).await;
    say(&state, &id, "Ancient Civilizations").await;
    say(&state, &id, "Tomorrow").await;

    let res = test_app(state.clone())
        .oneshot(get(&format!("/api/chat/sessions/{id}/events?last_id=3")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    say(&state, &id, "2").await;
    say(&state, &id, "yes").await;

    let events = read_events(res.into_body(), has_booking).await;

    // 4 and 5 from the catch-up, the rest live, none repeated
    assert_eq!(message_ids(&events), (4..=10).collect::<Vec<_>>());
    let (last_name, last_data) = events.last().unwrap();
    assert_eq!(last_name, "booking_complete");
    assert_eq!(last_data["kind"], "booking_complete");
    assert_eq!(last_data["booking"]["booking_id"], "HM-000001");
    assert_eq!(last_data["booking"]["total_price"], 50);
    assert!(events
        .iter()
        .all(|(_, data)| data["session_id"] == id.as_str()));
}

#[tokio::test]
async fn test_events_after_completion_include_booking() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Space & Science")).await;
    for input in ["Next week", "3", "yes"] {
        say(&state, &id, input).await;
    }

    let res = test_app(state)
        .oneshot(get(&format!("/api/chat/sessions/{id}/events?last_id=7")))
        .await
        .unwrap();
    let events = read_events(res.into_body(), has_booking).await;

    let names: Vec<&str> = events.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["message", "booking_complete"]);
    assert_eq!(message_ids(&events), vec![8]);
    assert!(events[0].1["message"]["text"]
        .as_str()
        .unwrap()
        .contains("Payment successful"));
    assert_eq!(events[1].1["booking"]["total_price"], 84);
}

#[tokio::test]
async fn test_events_unknown_session() {
    let state = test_state_with(test_config());
    let (status, _) = send(
        test_app(state),
        get("/api/chat/sessions/00000000-0000-0000-0000-000000000000/events"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Ticket Download ──

#[tokio::test]
async fn test_ticket_not_found() {
    let state = test_state_with(test_config());
    let (status, _) = send(test_app(state), get("/api/bookings/HM-404/ticket")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ticket_download() {
    let state = test_state_with(test_config());
    let id = create_session(&state, Some("Modern Art Gallery")).await;
    for input in ["Next week", "4 tickets", "Yes, confirm"] {
        say(&state, &id, input).await;
    }

    let res = test_app(state)
        .oneshot(get("/api/bookings/HM-000001/ticket"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let disposition = res
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("ticket-HM-000001.json"));

    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["bookingId"], "HM-000001");
    assert_eq!(json["museum"], "Heritage Museum");
    assert_eq!(json["exhibition"], "Modern Art Gallery");
    assert_eq!(json["date"], "Next week");
    assert_eq!(json["tickets"], 4);
    assert_eq!(json["total"], 120);
}
