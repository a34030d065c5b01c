//! JSON API — same conversation, without the HTML.

use std::sync::Arc;

use axum::{extract::State, routing::{get, post}, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};

use carebot_core::generator::TextGenerator;
use carebot_core::session::EMPTY_QUERY_WARNING;

use super::{session_from, AppState};

pub fn routes<G: TextGenerator + 'static>() -> Router<Arc<AppState<G>>> {
    Router::new()
        .route(
            "/api/conversation",
            get(get_conversation::<G>).delete(clear_conversation::<G>),
        )
        .route("/api/message", post(post_message::<G>))
        .route("/api/status", get(get_status::<G>))
}

// --- Conversation ---

async fn get_conversation<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let (jar, session_id) = session_from(jar);
    let history = state.sessions.history(&session_id).await;
    (
        jar,
        Json(json!({"session_id": session_id, "conversation": history})),
    )
}

async fn clear_conversation<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let (jar, session_id) = session_from(jar);
    state.sessions.clear(&session_id).await;
    (jar, Json(json!({"ok": true})))
}

// --- Message ---

#[derive(Deserialize)]
struct MessageBody {
    text: Option<String>,
}

async fn post_message<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
    jar: CookieJar,
    Json(body): Json<MessageBody>,
) -> (CookieJar, Json<Value>) {
    let (jar, session_id) = session_from(jar);
    let text = body.text.unwrap_or_default();

    let response = match state
        .sessions
        .submit(&session_id, &text, &state.assistant)
        .await
    {
        Some(reply) => json!({"ok": true, "reply": reply.text, "source": reply.source}),
        None => json!({"ok": false, "error": EMPTY_QUERY_WARNING}),
    };
    (jar, Json(response))
}

// --- Status ---

async fn get_status<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
) -> Json<Value> {
    Json(json!({
        "provider": state.config.provider,
        "model": state.config.model,
        "model_loaded": state.assistant.model_loaded(),
        "load_error": state.load_error,
        "sessions": state.sessions.session_count().await,
    }))
}
