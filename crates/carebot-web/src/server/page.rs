//! The single HTML page: form, warnings and the conversation history.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::error;

use carebot_core::generator::TextGenerator;
use carebot_core::session::EMPTY_QUERY_WARNING;
use carebot_core::types::ChatTurn;

use super::{session_from, AppState};

pub fn routes<G: TextGenerator + 'static>() -> Router<Arc<AppState<G>>> {
    Router::new().route("/", get(index::<G>).post(submit::<G>))
}

#[derive(Deserialize)]
struct SubmitForm {
    #[serde(default)]
    user_input: String,
}

#[derive(Serialize)]
struct TurnView<'a> {
    role: &'static str,
    label: &'static str,
    message: &'a str,
}

async fn index<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
    jar: CookieJar,
) -> Response {
    let (jar, session_id) = session_from(jar);
    let history = state.sessions.history(&session_id).await;
    (jar, render(&state, &history, None, "")).into_response()
}

async fn submit<G: TextGenerator + 'static>(
    State(state): State<Arc<AppState<G>>>,
    jar: CookieJar,
    Form(form): Form<SubmitForm>,
) -> Response {
    let (jar, session_id) = session_from(jar);

    let warning = match state
        .sessions
        .submit(&session_id, &form.user_input, &state.assistant)
        .await
    {
        Some(_) => None,
        None => Some(EMPTY_QUERY_WARNING),
    };

    let history = state.sessions.history(&session_id).await;
    (jar, render(&state, &history, warning, &form.user_input)).into_response()
}

fn render<G>(
    state: &AppState<G>,
    history: &[ChatTurn],
    warning: Option<&str>,
    user_input: &str,
) -> Response {
    let turns: Vec<TurnView> = history
        .iter()
        .map(|turn| TurnView {
            role: turn.role.as_str(),
            label: turn.role.label(),
            message: &turn.message,
        })
        .collect();

    let mut ctx = tera::Context::new();
    ctx.insert("turns", &turns);
    ctx.insert("warning", &warning);
    ctx.insert("load_error", &state.load_error);
    ctx.insert("user_input", user_input);

    match state.templates.render("index.html", &ctx) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}
