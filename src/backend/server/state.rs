/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is built once at startup and cloned into every handler:
 * - the loaded configuration
 * - the realtime gateway (which owns the connection registry)
 * - the message collaborators (Postgres or in-memory)
 * - the session token verifier
 * - the optional database pool
 *
 * Nothing here is a global: tests build as many isolated states as they like.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::sessions::JwtVerifier;
use crate::backend::messaging::Collaborators;
use crate::backend::realtime::{GatewaySettings, RealtimeGateway};
use crate::shared::AppConfig;

/// Application state shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Connect/disconnect/send entry points and the connection registry
    pub gateway: Arc<RealtimeGateway>,

    /// Message store, user directory and interest resolver
    pub collaborators: Collaborators,

    /// Issues and verifies session tokens
    pub sessions: JwtVerifier,

    /// Database connection pool
    ///
    /// `None` if `DATABASE_URL` is not configured; account endpoints then
    /// answer 503.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Wire the state together around the given collaborators
    pub fn new(config: AppConfig, collaborators: Collaborators, db_pool: Option<PgPool>) -> Self {
        let sessions = JwtVerifier::new(&config.jwt_secret);
        let gateway = RealtimeGateway::new(
            GatewaySettings::from(&config),
            collaborators.clone(),
            Arc::new(sessions.clone()),
        );
        Self {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
            collaborators,
            sessions,
            db_pool,
        }
    }
}

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for Arc<RealtimeGateway> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gateway.clone()
    }
}

impl FromRef<AppState> for Collaborators {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.collaborators.clone()
    }
}

impl FromRef<AppState> for JwtVerifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}

/// Implement FromRef for Option<PgPool>
///
/// This allows Axum handlers to extract the optional database pool
/// directly from `AppState`.
impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}
