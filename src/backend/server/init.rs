/**
 * Server Initialization
 *
 * Builds the application: database, collaborators, realtime core,
 * background tasks and router.
 *
 * # Initialization Process
 *
 * 1. Connect to the database if one is configured
 * 2. Pick Postgres or in-memory collaborators
 * 3. Build the state (registry, router, gateway)
 * 4. Start the presence notifier and the idle sweeper
 * 5. Create the router
 */

use axum::Router;

use crate::backend::messaging::{Collaborators, InMemoryStore};
use crate::backend::realtime::{spawn_idle_sweeper, PresenceNotifier};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create and configure the Axum application
pub async fn create_app(config: AppConfig) -> Router<()> {
    tracing::info!(environment = config.environment.as_str(), "Initializing PulseChat backend server");

    let db_pool = load_database(config.database_url.as_deref()).await;
    let collaborators = match &db_pool {
        Some(pool) => Collaborators::postgres(pool.clone()),
        None => {
            tracing::warn!("Using in-memory message store; messages are lost on restart");
            Collaborators::in_memory(InMemoryStore::new())
        }
    };

    let state = AppState::new(config, collaborators, db_pool);
    start_background_tasks(&state);
    create_router(state)
}

/// Start the presence notifier and the idle sweeper for `state`
///
/// Must run before the first connection is accepted so no presence change
/// is missed.
pub fn start_background_tasks(state: &AppState) {
    let registry = state.gateway.registry().clone();

    PresenceNotifier::new(registry.clone(), state.gateway.interests().clone()).spawn();
    spawn_idle_sweeper(registry, state.config.sweep_interval, state.config.idle_timeout);

    tracing::info!(
        sweep_interval_secs = state.config.sweep_interval.as_secs(),
        idle_timeout_secs = state.config.idle_timeout.as_secs(),
        "Presence notifier and idle sweeper started"
    );
}
