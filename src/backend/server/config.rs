/**
 * Database Configuration
 *
 * Connects to Postgres when a `DATABASE_URL` is configured and runs the
 * embedded migrations.
 *
 * # Error Handling
 *
 * Connection errors are logged but do not prevent server startup. The server
 * then runs with in-memory collaborators and the account endpoints answer
 * 503.
 */

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Database configuration result
pub type DatabaseConfig = Option<PgPool>;

/// Load and initialize the database connection pool
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
pub async fn load_database(database_url: Option<&str>) -> DatabaseConfig {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Database features will be disabled.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPoolOptions::new().max_connections(10).connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Database features will be disabled.");
            return None;
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(()) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            // Continue anyway - migrations might have already been run
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
