//! API route handlers for the gateway.
//!
//! Only a missing required field produces a client error. Everything past
//! the boundary degrades into a normal response.

use askdesk_core::error::{AskDeskError, Result};
use askdesk_core::types::Source;
use axum::http::StatusCode;
use axum::{
    Json,
    extract::{Query, State},
};
use serde_json::{Value, json};
use std::sync::Arc;

use super::server::AppState;

type ApiResponse = (StatusCode, Json<Value>);

fn bad_request(body: Value) -> ApiResponse {
    (StatusCode::BAD_REQUEST, Json(body))
}

/// Client-facing errors go back verbatim as 400; anything else becomes a
/// fixed 500 message and stays in the log.
fn error_response(e: &AskDeskError, context: &str) -> ApiResponse {
    if e.is_client_facing() {
        return bad_request(json!({"error": e.to_string()}));
    }
    tracing::warn!("⚠️ {context}: {e}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"ok": false, "error": context})),
    )
}

/// A required, non-blank string field of the request body.
fn required_text<'a>(body: &'a Value, field: &str) -> Result<&'a str> {
    match body[field].as_str().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AskDeskError::MalformedRequest("No input provided".into())),
    }
}

/// Health check endpoint.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.assistant.stats();
    Json(json!({
        "status": "ok",
        "service": "askdesk-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "entries": stats.entries,
        "semantic": stats.semantic,
        "encoder": stats.encoder,
        "snippet_source": stats.snippet_source,
        "provider": stats.provider,
    }))
}

/// Chat widget endpoint: answer plus follow-up suggestions.
pub async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResponse {
    let message = match required_text(&body, "message") {
        Ok(message) => message,
        Err(e) => return error_response(&e, "Chat failed"),
    };

    let assistant = &state.assistant;
    let result = assistant.resolve(message).await;

    let suggestions = if result.is_miss() {
        // The cascade already logged failed generations
        let logged = assistant.dedupe_missed_log() && result.source == Source::Error;
        if !logged {
            assistant.log_miss(message).await;
        }
        tracing::info!("🧠 Knowledge-base miss ({}) for: {message}", result.source);
        assistant.fallback_suggestions().to_vec()
    } else {
        let related = assistant.suggest(Some(message), assistant.top_k()).await;
        if related.is_empty() {
            assistant.default_suggestions()
        } else {
            related
        }
    };

    (
        StatusCode::OK,
        Json(json!({
            "response": result.answer,
            "source": result.source,
            "suggestions": suggestions,
        })),
    )
}

/// Full resolution result plus related suggestions.
pub async fn get_response(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResponse {
    let message = match required_text(&body, "message") {
        Ok(message) => message,
        Err(e) => return error_response(&e, "Resolution failed"),
    };

    let assistant = &state.assistant;
    let result = assistant.resolve(message).await;
    let suggestions = assistant.suggest(Some(message), assistant.top_k()).await;

    (
        StatusCode::OK,
        Json(json!({
            "answer": result.answer,
            "question": result.canonical_question,
            "source": result.source,
            "resolved_from_knowledge_base": result.resolved_from_knowledge_base,
            "suggestions": suggestions,
        })),
    )
}

/// Suggestions related to a typed query.
pub async fn suggest(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str();
    let suggestions = state.assistant.suggest(query, state.assistant.top_k()).await;
    Json(json!({ "suggestions": suggestions }))
}

/// Starter suggestions shown before the first message.
pub async fn starter_suggestions(State(state): State<Arc<AppState>>) -> Json<Value> {
    let suggestions = state.assistant.suggest(None, state.assistant.top_k()).await;
    Json(json!({ "suggestions": suggestions }))
}

/// Store a star rating with an optional comment.
pub async fn submit_feedback(State(state): State<Arc<AppState>>, Json(body): Json<Value>) -> ApiResponse {
    let rating = &body["rating"];
    if rating.is_null() {
        return bad_request(json!({"status": "error", "message": "Rating is required"}));
    }
    let Some(rating) = rating
        .as_i64()
        .or_else(|| rating.as_str().and_then(|s| s.trim().parse().ok()))
    else {
        return bad_request(json!({"status": "error", "message": "Rating must be an integer"}));
    };
    let comment = body["comment"].as_str().unwrap_or("");

    match state.store.submit_feedback(rating, comment) {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({"status": "success", "message": "Feedback received"})),
        ),
        Err(e) => {
            tracing::error!("❌ Failed to store feedback: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"status": "error", "message": "Could not store feedback"})),
            )
        }
    }
}

/// Thumbs-style score; acknowledged and logged only.
pub async fn rating(Json(body): Json<Value>) -> ApiResponse {
    let score = &body["score"];
    if score.is_null() {
        return bad_request(json!({"status": "error", "message": "Score missing"}));
    }
    tracing::info!("📊 Received rating: {score}");
    (StatusCode::OK, Json(json!({"status": "received"})))
}

/// Reload the knowledge base and swap in a fresh snapshot.
pub async fn rebuild(State(state): State<Arc<AppState>>) -> ApiResponse {
    match state.assistant.rebuild().await {
        Ok(entries) => (StatusCode::OK, Json(json!({"ok": true, "entries": entries}))),
        Err(e) => error_response(&e, "Rebuild failed"),
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct MissedParams {
    pub limit: Option<usize>,
}

/// Recent missed queries, newest first.
pub async fn list_missed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MissedParams>,
) -> ApiResponse {
    let limit = params.limit.unwrap_or(50).min(1000);
    match state.store.recent_missed(limit) {
        Ok(missed) => (
            StatusCode::OK,
            Json(json!({
                "ok": true,
                "total": state.store.missed_count(),
                "missed": missed,
            })),
        ),
        Err(e) => {
            tracing::error!("❌ Failed to read missed queries: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": "Could not read missed queries"})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::build_router;
    use askdesk_core::config::AskDeskConfig;
    use askdesk_core::types::KnowledgeEntry;
    use askdesk_engine::{Assistant, Collaborators};
    use askdesk_knowledge::HashingEncoder;
    use askdesk_memory::SqliteStore;
    use std::path::Path;
    use tower::ServiceExt;

    fn faq() -> Vec<KnowledgeEntry> {
        vec![
            KnowledgeEntry::new("What services do you offer?", "We offer web design."),
            KnowledgeEntry::new("Do you offer custom UI/UX design?", "Yes."),
            KnowledgeEntry::new("Can you produce marketing videos?", "Yes, short and long form."),
            KnowledgeEntry::new("Where is your team based?", "Remote-first."),
        ]
    }

    async fn test_state_with(config: AskDeskConfig) -> Arc<AppState> {
        let store = Arc::new(SqliteStore::open(Path::new(":memory:")).unwrap());
        let parts = Collaborators {
            encoder: Some(Arc::new(HashingEncoder::new(384))),
            snippet: None,
            provider: None,
            missed: store.clone(),
        };
        let assistant = Assistant::new(&config, parts, faq()).await;
        Arc::new(AppState::new(Arc::new(assistant), store))
    }

    async fn test_state() -> Arc<AppState> {
        test_state_with(AskDeskConfig::default()).await
    }

    // ---- Health ----

    #[tokio::test]
    async fn test_health_check() {
        let json = health_check(State(test_state().await)).await.0;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["entries"], 4);
        assert_eq!(json["semantic"], true);
    }

    // ---- Chat ----

    #[tokio::test]
    async fn test_chat_exact_hit_suggests_related() {
        let state = test_state().await;
        let (status, Json(json)) =
            chat(State(state.clone()), Json(json!({"message": " What services do you offer? "}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "We offer web design.");
        assert_eq!(json["source"], "exact");
        let suggestions = json["suggestions"].as_array().unwrap();
        assert!(!suggestions.is_empty());
        assert!(!suggestions.contains(&json!("What services do you offer?")));
        assert_eq!(state.store.missed_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_miss_logs_twice_by_default() {
        let state = test_state().await;
        let (status, Json(json)) = chat(State(state.clone()), Json(json!({"message": "banana"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "error");
        assert_eq!(json["response"], "Sorry, I couldn't fetch a proper answer right now.");
        assert_eq!(
            json["suggestions"],
            json!([
                "Do you offer custom UI/UX design?",
                "Do you offer content creation services?",
                "Can you produce marketing videos?"
            ])
        );
        // Once inside the cascade, once at the boundary
        assert_eq!(state.store.missed_count(), 2);
    }

    #[tokio::test]
    async fn test_chat_miss_logs_once_with_dedupe() {
        let mut config = AskDeskConfig::default();
        config.cascade.dedupe_missed_log = true;
        let state = test_state_with(config).await;
        chat(State(state.clone()), Json(json!({"message": "banana"}))).await;
        assert_eq!(state.store.missed_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let (status, Json(json)) = chat(State(test_state().await), Json(json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No input provided");
    }

    // ---- get-response ----

    #[tokio::test]
    async fn test_get_response_returns_full_result() {
        let (status, Json(json)) =
            get_response(State(test_state().await), Json(json!({"message": "services offered?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "semantic");
        assert_eq!(json["question"], "What services do you offer?");
        assert_eq!(json["resolved_from_knowledge_base"], true);
        assert!(json["suggestions"].is_array());
    }

    #[tokio::test]
    async fn test_get_response_missing_message() {
        let (status, Json(json)) = get_response(State(test_state().await), Json(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No input provided");
    }

    // ---- Suggestions ----

    #[tokio::test]
    async fn test_starter_suggestions() {
        let json = starter_suggestions(State(test_state().await)).await.0;
        assert_eq!(
            json["suggestions"],
            json!([
                "What services do you offer?",
                "Do you offer custom UI/UX design?",
                "Can you produce marketing videos?"
            ])
        );
    }

    #[tokio::test]
    async fn test_suggest_excludes_query() {
        let json = suggest(
            State(test_state().await),
            Json(json!({"query": "Can you produce marketing videos?"})),
        )
        .await
        .0;
        let suggestions = json["suggestions"].as_array().unwrap();
        assert!(suggestions.len() <= 3);
        assert!(!suggestions.contains(&json!("Can you produce marketing videos?")));
    }

    // ---- Feedback ----

    #[tokio::test]
    async fn test_submit_feedback() {
        let state = test_state().await;
        let (status, Json(json)) = submit_feedback(
            State(state.clone()),
            Json(json!({"rating": 4, "comment": "Quick answers"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        let stored = state.store.list_feedback(1).unwrap();
        assert_eq!(stored[0].rating, 4);
        assert_eq!(stored[0].comment, "Quick answers");
    }

    #[tokio::test]
    async fn test_submit_feedback_requires_rating() {
        let (status, Json(json)) =
            submit_feedback(State(test_state().await), Json(json!({"comment": "no stars"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Rating is required");
    }

    #[tokio::test]
    async fn test_rating() {
        let (status, Json(json)) = rating(Json(json!({"score": "up"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "received");

        let (status, Json(json)) = rating(Json(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Score missing");
    }

    // ---- Operator ----

    #[tokio::test]
    async fn test_rebuild_without_loader_reports_error() {
        let (status, Json(json)) = rebuild(State(test_state().await)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["ok"], false);
        assert_eq!(json["error"], "Rebuild failed");
    }

    #[test]
    fn test_internal_errors_are_not_echoed() {
        let err = AskDeskError::KnowledgeBase("mongodb://admin:secret@db refused".into());
        let (status, Json(json)) = error_response(&err, "Rebuild failed");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!json.to_string().contains("secret"));

        let err = AskDeskError::MalformedRequest("No input provided".into());
        let (status, Json(json)) = error_response(&err, "Chat failed");
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No input provided");
    }

    #[tokio::test]
    async fn test_list_missed() {
        let state = test_state().await;
        state.assistant.log_miss("do you sell hats?").await;
        let (status, Json(json)) =
            list_missed(State(state), Query(MissedParams { limit: Some(10) })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 1);
        assert_eq!(json["missed"][0]["query"], "do you sell hats?");
    }

    // ---- Router ----

    #[tokio::test]
    async fn test_router_serves_suggestions() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/suggestions")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["suggestions"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_router_rejects_non_json_body() {
        let app = build_router(test_state().await);
        let resp = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/get-response")
                    .header("content-type", "application/json")
                    .body(axum::body::Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.status().is_client_error());
    }
}
