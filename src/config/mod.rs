//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `CHECKOUT` prefix and
//! `__` between nesting levels.
//!
//! # Example
//!
//! ```no_run
//! use checkout_orchestrator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod checkout;
mod deep_link;
mod error;
mod gateway;
mod redirects;
mod server;
mod wallets;
mod webhooks;

pub use checkout::CheckoutConfig;
pub use deep_link::DeepLinkConfig;
pub use error::{ConfigError, ValidationError};
pub use gateway::GatewayConfig;
pub use redirects::RedirectsConfig;
pub use server::{Environment, ServerConfig};
pub use wallets::WalletsConfig;
pub use webhooks::WebhooksConfig;

use serde::Deserialize;

/// Root application configuration.
///
/// Every section has defaults, so an empty environment yields a runnable
/// (if unconfigured) service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// NMI credentials and endpoint
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Subscribers and signing secret
    #[serde(default)]
    pub webhooks: WebhooksConfig,

    #[serde(default)]
    pub redirects: RedirectsConfig,

    /// Currencies, defaults and order-reference policy
    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub deep_link: DeepLinkConfig,

    #[serde(default)]
    pub wallets: WalletsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` if present
    /// 2. Reads variables with the `CHECKOUT` prefix
    /// 3. Splits nested keys on `__`
    ///
    /// # Environment Variable Format
    ///
    /// - `CHECKOUT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHECKOUT__GATEWAY__SECURITY_KEY=...` -> `gateway.security_key = ...`
    /// - `CHECKOUT__WEBHOOKS__URLS=https://a,https://b`
    ///
    /// # Errors
    ///
    /// `ConfigError::LoadError` when a value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHECKOUT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Semantic checks: ports, URL formats, currency codes.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.gateway.validate()?;
        self.webhooks.validate()?;
        self.redirects.validate()?;
        self.checkout.validate()?;
        self.wallets.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
