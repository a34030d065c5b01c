//! Web server — Axum router + shared state.

pub mod api;
pub mod page;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tera::Tera;
use tower_http::cors::CorsLayer;

use carebot_core::assistant::HealthcareAssistant;
use carebot_core::config::Config;
use carebot_core::generator::TextGenerator;
use carebot_core::session::{SessionId, SessionStore};

/// Cookie carrying the caller's session id.
pub const SESSION_COOKIE: &str = "carebot_session";

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Shared application state.
pub struct AppState<G> {
    pub assistant: HealthcareAssistant<G>,
    pub sessions: SessionStore,
    pub templates: Tera,
    pub config: Config,
    /// Why the model could not be loaded, shown as a banner on every page.
    pub load_error: Option<String>,
}

impl<G: TextGenerator> AppState<G> {
    pub fn new(
        config: Config,
        generator: Option<G>,
        load_error: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            assistant: HealthcareAssistant::new(generator),
            sessions: SessionStore::new(),
            templates: load_templates()?,
            config,
            load_error,
        })
    }
}

fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", INDEX_TEMPLATE)
        .context("Failed to compile index.html template")?;
    Ok(tera)
}

pub fn router<G: TextGenerator + 'static>(state: Arc<AppState<G>>) -> Router {
    let cors = CorsLayer::very_permissive();

    Router::new()
        .merge(page::routes::<G>())
        .merge(api::routes::<G>())
        .layer(cors)
        .with_state(state)
}

/// Read the session id from the cookie jar, issuing a fresh one if absent.
pub fn session_from(jar: CookieJar) -> (CookieJar, SessionId) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let id = cookie.value().to_string();
        return (jar, id);
    }

    let id = SessionStore::new_session_id();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), id)
}
