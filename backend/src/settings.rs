//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `BARBERZON_*` environment variables and the
//! optional configuration file, in that order of precedence.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::outbound::paystack::DEFAULT_PAYSTACK_BASE_URL;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The configured Paystack base URL does not parse.
    #[error("invalid paystack_base_url '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// A zero timeout would fail every gateway call.
    #[error("gateway_timeout_secs must be positive")]
    ZeroTimeout,
}

/// Runtime configuration for the Barberzon backend.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BARBERZON")]
pub struct BarberzonSettings {
    /// PostgreSQL connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// TCP port the HTTP server binds on all interfaces.
    #[ortho_config(default = 8080)]
    pub port: u16,
    /// File holding the session signing key.
    pub session_key_file: Option<PathBuf>,
    /// Permit a generated session key when the key file is unreadable.
    pub session_allow_ephemeral: Option<bool>,
    /// Mark session cookies `Secure`; on unless set to `false`.
    pub cookie_secure: Option<bool>,
    /// `SameSite` policy for the session cookie: Strict, Lax, or None.
    pub session_same_site: Option<String>,
    /// Paystack secret key; the fixture gateway is used when absent.
    pub paystack_secret_key: Option<String>,
    /// Override for the Paystack API root.
    pub paystack_base_url: Option<String>,
    /// Where Paystack redirects payers after checkout.
    pub paystack_callback_url: Option<String>,
    /// Timeout applied to every gateway call.
    #[ortho_config(default = 15)]
    pub gateway_timeout_secs: u64,
    /// Return internal error messages to clients.
    pub diagnostic_mode: Option<bool>,
}

impl BarberzonSettings {
    /// Address the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    /// Whether a generated session key may replace an unreadable key file.
    #[must_use]
    pub fn session_allow_ephemeral(&self) -> bool {
        self.session_allow_ephemeral.unwrap_or(false)
    }

    /// Whether internal error details reach clients.
    #[must_use]
    pub fn diagnostic_mode(&self) -> bool {
        self.diagnostic_mode.unwrap_or(false)
    }

    /// Configured database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Configured Paystack secret, ignoring blank values.
    #[must_use]
    pub fn paystack_secret_key(&self) -> Option<&str> {
        non_blank(self.paystack_secret_key.as_deref())
    }

    /// Parsed Paystack API root, falling back to the public endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBaseUrl`] when the override does not
    /// parse as a URL.
    pub fn paystack_base_url(&self) -> Result<Url, SettingsError> {
        let value = non_blank(self.paystack_base_url.as_deref()).unwrap_or(DEFAULT_PAYSTACK_BASE_URL);
        Url::parse(value).map_err(|source| SettingsError::InvalidBaseUrl {
            value: value.to_owned(),
            source,
        })
    }

    /// Gateway call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroTimeout`] for a zero setting.
    pub fn gateway_timeout(&self) -> Result<Duration, SettingsError> {
        if self.gateway_timeout_secs == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        Ok(Duration::from_secs(self.gateway_timeout_secs))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.trim().is_empty())
}
