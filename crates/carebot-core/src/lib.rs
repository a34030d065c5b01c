//! carebot-core — Pure chatbot logic, no UI.
//!
//! Keyword table, text-generation backend, reply dispatch and per-session
//! transcripts. Frontends (the web server) hold a `HealthcareAssistant` and a
//! `SessionStore` and render whatever the transcript contains.

pub mod assistant;
pub mod config;
pub mod generator;
pub mod keywords;
pub mod session;
pub mod types;
