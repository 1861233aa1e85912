//! Service wiring: configuration in, router out.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;

use crate::adapters::http::{api_router, CheckoutHandlers, PaymentHandlers, SessionRegistry};
use crate::adapters::{ClientDrivenChallenge, HttpWebhookTransport, NmiGateway};
use crate::application::{
    CheckoutServices, GetExpressConfigHandler, ProcessPaymentHandler, ReceiveWebhookHandler,
    WebhookDispatcher, WebhookInbox,
};
use crate::config::{AppConfig, ConfigError, ServerConfig};
use crate::ports::{PaymentGateway, ThreeDsChallenge, WebhookTransport};

/// Outbound collaborators. Production uses NMI, reqwest and the browser
/// 3DS widget; tests swap in doubles.
#[derive(Clone)]
pub struct Collaborators {
    pub gateway: Arc<dyn PaymentGateway>,
    pub webhook_transport: Arc<dyn WebhookTransport>,
    pub challenge: Arc<dyn ThreeDsChallenge>,
}

impl Collaborators {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            gateway: Arc::new(NmiGateway::new(config.gateway.nmi())),
            webhook_transport: Arc::new(HttpWebhookTransport::new(config.webhooks.timeout())),
            challenge: Arc::new(ClientDrivenChallenge),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the shared checkout services.
pub fn checkout_services(
    config: &AppConfig,
    collaborators: &Collaborators,
) -> Result<CheckoutServices, ConfigError> {
    let webhooks = WebhookDispatcher::new(
        collaborators.webhook_transport.clone(),
        config.webhooks.subscriber_urls(),
        config.webhooks.codec(),
    )
    .with_signature_headers(config.webhooks.signature_header_names());

    Ok(CheckoutServices {
        policy: Arc::new(config.checkout.policy(config.wallets.enabled)),
        gateway: collaborators.gateway.clone(),
        challenge: collaborators.challenge.clone(),
        webhooks,
        redirects: Arc::new(config.redirects.resolver()?),
        link_codec: config.deep_link.codec(),
        channel: config.checkout.channel(),
    })
}

/// Router with explicit collaborators.
pub fn build_router_with(
    config: &AppConfig,
    collaborators: Collaborators,
) -> Result<Router, ConfigError> {
    config.validate()?;

    let services = checkout_services(config, &collaborators)?;

    let process_handler = ProcessPaymentHandler::new(
        services.gateway.clone(),
        services.webhooks.clone(),
        services.redirects.clone(),
        services.policy.clone(),
        services.channel.clone(),
    );
    let inbox = Arc::new(WebhookInbox::new());
    let webhook_handler = ReceiveWebhookHandler::new(inbox.clone(), config.webhooks.codec());
    let express_handler = GetExpressConfigHandler::new(config.wallets.settings(
        &config.checkout.default_country,
        &config.checkout.default_currency,
    ));

    let payments = PaymentHandlers::new(
        Arc::new(process_handler),
        Arc::new(webhook_handler),
        inbox,
        Arc::new(express_handler),
        config.webhooks.signature_header_names(),
        config.wallets.apple_pay_domain_association_path.clone(),
    );
    let registry = SessionRegistry::with_ttl(config.checkout.session_ttl());
    let checkout = CheckoutHandlers::new(services, Arc::new(registry));

    Ok(api_router(
        checkout,
        payments,
        Duration::from_secs(config.server.request_timeout_secs),
    ))
}

/// Router backed by the real adapters.
pub fn build_router(config: &AppConfig) -> Result<Router, ConfigError> {
    build_router_with(config, Collaborators::from_config(config))
}

/// Installs the global tracing subscriber. JSON in production.
pub fn init_tracing(server: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = std::env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| server.log_level.clone());

    if server.json_logs() {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter))
            .pretty()
            .try_init();
    }
}

/// Binds and serves until the process is stopped.
pub async fn serve(config: AppConfig) -> Result<(), ServeError> {
    let addr = config.server.socket_addr().map_err(ConfigError::from)?;
    let router = build_router(&config)?;

    if config.gateway.security_key.is_none() {
        tracing::warn!("No gateway security key configured; payments will be refused");
    }
    if config.webhooks.subscriber_urls().is_empty() {
        tracing::warn!("No webhook subscribers configured");
    }
    if config.webhooks.secret.is_none() {
        tracing::warn!("No webhook secret configured; events will be sent unsigned");
    }
    if config.deep_link.signing_secret.is_none() {
        tracing::warn!("No deep link secret configured; link signatures are not checked");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        redirect_environment = %config.redirects.environment,
        "Checkout service listening"
    );
    axum::serve(listener, router).await?;
    Ok(())
}
