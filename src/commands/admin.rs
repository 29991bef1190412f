//! Admin command - Administrator account management.

use std::sync::Arc;

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::services::{AuthService, Authenticator};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let auth = Authenticator::new(Arc::new(Persistence::new(db.get_connection())), config);

    match args.action {
        AdminAction::Create { email, password } => {
            if auth.ensure_admin(email.clone(), password).await? {
                println!("Admin account created: {}", email);
            } else {
                println!("Account already exists: {}", email);
            }
        }
    }

    Ok(())
}
