//! Booking server entry-point: loads settings, selects storage and serves
//! the site.

mod server;

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookings::inbound::http::session_config::session_settings;
use bookings::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use bookings::settings::AppSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings =
        AppSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    let config = server_config(&settings).await?;
    create_server(config)
        .await
        .wrap_err("failed to start server")?
        .await
        .wrap_err("server stopped with an error")
}

async fn server_config(settings: &AppSettings) -> Result<ServerConfig> {
    let session = session_settings(
        settings.session_key_file.as_deref(),
        settings.in_production,
        settings.session_ttl_hours(),
    )?;
    let config = ServerConfig::new(
        session,
        settings.bind_addr()?,
        settings.owner_email().to_owned(),
    )
    .with_smtp(settings.smtp())
    .with_administrator(settings.administrator()?)
    .with_mail_queue_capacity(settings.mail_queue_capacity());

    let Some(database_url) = settings.database_url.as_deref() else {
        return Ok(config);
    };

    run_migrations(database_url)
        .await
        .wrap_err("failed to apply migrations")?;
    let pool = DbPool::new(
        PoolConfig::new(database_url)
            .with_max_size(settings.db_max_connections())
            .with_connection_timeout(settings.db_timeout())
            .with_operation_timeout(settings.db_timeout()),
    )
    .await
    .wrap_err("failed to build database pool")?;
    info!("using PostgreSQL storage");
    Ok(config.with_db_pool(pool))
}
