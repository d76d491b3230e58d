use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use application::auth_service::AuthService;
use application::user_service::UserService;
use data::repositories::postgres::user_repository::PostgresUserRepository;
use data::user_repository::UserRepository;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::jwt::JwtService;
use infrastructure::logging::init_logging;
use infrastructure::password::PasswordService;
use infrastructure::settings::Settings;
use presentation::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let settings = Settings::from_env()?;

    init_logging(&settings.log_level, settings.log_format)?;

    let pool = create_pool(&settings.database_url, settings.database_max_connections).await?;
    run_migrations(&pool).await?;

    let repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool));
    let passwords = Arc::new(
        PasswordService::new(settings.password_cost).context("invalid password hashing cost")?,
    );
    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
        settings.jwt_refresh_ttl_seconds,
    ));

    let user_service = Arc::new(UserService::new(Arc::clone(&repo), Arc::clone(&passwords)));
    let auth_service = Arc::new(AuthService::new(repo, passwords, Arc::clone(&jwt)));

    let state = AppState::new(
        user_service,
        auth_service,
        jwt,
        Duration::from_secs(settings.create_user_timeout_secs),
    );

    info!(
        addr = %settings.http_addr,
        log_format = ?settings.log_format,
        "starting user-server"
    );
    server::run_http(&settings, state).await
}
