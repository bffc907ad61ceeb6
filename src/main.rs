//! Remindr backend
//!
//! Main application entry point

use tracing::info;

use remindr::{
    config::Settings,
    database::{connection, DatabaseService},
    handlers::{self, AppState},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard keeps the file appender flushing until
    // the process exits
    let _logging_guard = logging::init_logging(&settings.logging)?;

    info!("Starting Remindr backend...");

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = connection::DatabaseConfig {
        url: settings.database.url.clone(),
        max_connections: settings.database.max_connections,
        min_connections: settings.database.min_connections,
        ..Default::default()
    };
    let pool = connection::create_pool(&db_config).await?;

    // Run database migrations
    connection::run_migrations(&pool).await?;

    // Initialize services
    info!("Initializing services...");
    let database_service = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(&settings, &database_service)?;

    // Build router
    let state = AppState::new(services, pool);
    let app = handlers::router().with_state(state);

    // Start server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!(addr = %addr, "Remindr backend listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    info!("Remindr backend has been shut down.");

    Ok(())
}
