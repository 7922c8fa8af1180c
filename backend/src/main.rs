//! Backend entry-point: loads configuration, selects adapters, and serves the
//! REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zeroize::Zeroizing;

use barberzon::inbound::http::error::set_diagnostic_mode;
use barberzon::inbound::http::health::HealthState;
use barberzon::inbound::http::session_config::{BuildMode, session_settings};
use barberzon::outbound::paystack::{PaystackConfig, PaystackHttpGateway};
use barberzon::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use barberzon::settings::BarberzonSettings;

use server::{Gateway, ServerConfig, create_server};

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

    let settings = BarberzonSettings::load().wrap_err("load configuration")?;
    set_diagnostic_mode(settings.diagnostic_mode());
    if settings.diagnostic_mode() {
        warn!("diagnostic mode enabled; internal errors are returned to clients");
    }

    let session = session_settings(&settings, BuildMode::from_debug_assertions())
        .wrap_err("session configuration")?;
    info!(
        fingerprint = %session.key_fingerprint(),
        "session signing key loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr(),
    )
    .with_gateway(build_gateway(&settings)?)
    .with_callback_url(settings.paystack_callback_url.clone());

    if let Some(database_url) = settings.database_url() {
        run_pending_migrations(database_url)
            .await
            .wrap_err("apply database migrations")?;
        let mut pool_config = PoolConfig::new(database_url);
        if let Some(max) = settings.database_max_connections {
            pool_config = pool_config.with_max_size(max);
        }
        let pool = DbPool::new(pool_config)
            .await
            .wrap_err("build database pool")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("bind HTTP server")?;
    info!(addr = %settings.bind_addr(), "barberzon listening");
    server.await.wrap_err("HTTP server")
}

fn build_gateway(settings: &BarberzonSettings) -> Result<Gateway> {
    let Some(secret) = settings.paystack_secret_key() else {
        warn!("no Paystack secret configured; using the fixture gateway");
        return Ok(Gateway::fixture());
    };
    let gateway = PaystackHttpGateway::new(PaystackConfig {
        base_url: settings.paystack_base_url()?,
        secret_key: Zeroizing::new(secret.to_owned()),
        timeout: settings.gateway_timeout()?,
    })
    .wrap_err("build Paystack client")?;
    Ok(Gateway::Paystack(gateway))
}
