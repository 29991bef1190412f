//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, LocalFileStorage};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    // Initialize database (pending migrations are applied)
    let db = Arc::new(Database::connect(&config).await?);

    // Initialize file storage
    let storage = Arc::new(LocalFileStorage::new(&config.upload_dir).await?);
    tracing::info!(root = %storage.root().display(), "File storage ready");

    let admin = config
        .admin_password()
        .map(|password| (config.admin_email.clone(), password.to_string()));

    // Create application state with centralized service container
    // Uses Unit of Work internally for repository access
    let app_state = AppState::from_config(db, storage, config);

    match admin {
        Some((email, password)) => {
            app_state.auth_service.ensure_admin(email, password).await?;
        }
        None => tracing::debug!("ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
