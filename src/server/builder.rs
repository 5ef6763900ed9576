//! ServerBuilder for fluent API to build the portal's HTTP server

use super::exposure::{RestExposure, WebSocketExposure};
use super::host::ServerHost;
use crate::config::AppConfig;
use crate::core::auth::{AuthProvider, JwtAuthProvider, TokenService};
use crate::core::events::EventBus;
use crate::mail::{LogMailer, Mailer};
use crate::storage::Stores;
use anyhow::Result;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the portal server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .with_stores(Stores::in_memory())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: Option<AppConfig>,
    stores: Option<Stores>,
    mailer: Option<Arc<dyn Mailer>>,
    auth: Option<Arc<dyn AuthProvider>>,
    custom_routes: Vec<Router<Arc<ServerHost>>>,
    event_bus: Option<EventBus>,
    event_bus_disabled: bool,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            stores: None,
            mailer: None,
            auth: None,
            custom_routes: Vec::new(),
            event_bus: None,
            event_bus_disabled: false,
        }
    }

    /// Set the configuration (required)
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the stores; defaults to fresh in-memory stores
    pub fn with_stores(mut self, stores: Stores) -> Self {
        self.stores = Some(stores);
        self
    }

    /// Set the mailer; defaults to Brevo when an API key is configured
    /// (feature `email`) and to [`LogMailer`] otherwise
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Replace the bearer-token auth provider
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth = Some(Arc::new(provider));
        self
    }

    /// Add custom routes sharing the host as state
    pub fn with_custom_routes(mut self, routes: Router<Arc<ServerHost>>) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Use an event bus with the given capacity instead of the configured one
    pub fn with_event_bus(mut self, capacity: usize) -> Self {
        self.event_bus = Some(EventBus::new(capacity));
        self.event_bus_disabled = false;
        self
    }

    /// Run without an event bus; payments are then never pushed over WebSocket
    pub fn without_event_bus(mut self) -> Self {
        self.event_bus = None;
        self.event_bus_disabled = true;
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let config = self
            .config
            .take()
            .ok_or_else(|| anyhow::anyhow!("AppConfig is required. Call .with_config()"))?;
        config.validate()?;

        let tokens = Arc::new(TokenService::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl_hours,
        ));
        let auth = self
            .auth
            .take()
            .unwrap_or_else(|| Arc::new(JwtAuthProvider::new(tokens.clone())));
        let mailer = match self.mailer.take() {
            Some(mailer) => mailer,
            None => default_mailer(&config),
        };
        let stores = self.stores.take().unwrap_or_else(Stores::in_memory);

        let event_bus = if self.event_bus_disabled {
            None
        } else {
            Some(
                self.event_bus
                    .take()
                    .unwrap_or_else(|| EventBus::new(config.server.event_bus_capacity)),
            )
        };

        let mut host = ServerHost::from_builder_components(config, stores, tokens, auth, mailer);
        if let Some(event_bus) = event_bus {
            host = host.with_event_bus(event_bus);
        }

        Ok(host)
    }

    /// Build the host and the full application router
    ///
    /// The router serves REST and `/ws` with CORS and request tracing.
    /// Must be called inside a Tokio runtime (the WebSocket dispatcher is
    /// spawned here).
    pub fn build_with_host(mut self) -> Result<(Arc<ServerHost>, Router)> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);

        let rest_router = RestExposure::build_router(host.clone(), custom_routes)?;
        let ws_router = WebSocketExposure::build_router(host.clone())?;

        let app = rest_router
            .merge(ws_router)
            .layer(cors_layer(&host.config))
            .layer(TraceLayer::new_for_http());

        Ok((host, app))
    }

    /// Build the final application router
    pub fn build(self) -> Result<Router> {
        Ok(self.build_with_host()?.1)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Creates the configured admin account if missing, binds to the
    /// configured `host:port` and stops on Ctrl+C or SIGTERM.
    pub async fn serve(self) -> Result<()> {
        let addr = self
            .config
            .as_ref()
            .map(AppConfig::bind_addr)
            .ok_or_else(|| anyhow::anyhow!("AppConfig is required. Call .with_config()"))?;

        let (host, app) = self.build_with_host()?;
        bootstrap_admin(&host).await?;

        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn bootstrap_admin(host: &ServerHost) -> Result<()> {
    if let Some(admin) = &host.config.admin {
        host.accounts()
            .ensure_admin(&admin.name, &admin.email, &admin.password)
            .await?;
    }
    Ok(())
}

fn default_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    #[cfg(feature = "email")]
    {
        if let Some(api_key) = &config.email.brevo_api_key {
            return Arc::new(crate::mail::BrevoMailer::new(
                api_key.clone(),
                config.email.from.clone(),
                config.email.sender_name.clone(),
            ));
        }
    }

    if config.email.brevo_api_key.is_some() {
        tracing::warn!(
            "BREVO_API_KEY is set but the `email` feature is disabled; emails will only be logged"
        );
    }
    Arc::new(LogMailer)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

/// Resolves on Ctrl+C or SIGTERM
///
/// If a handler cannot be installed, that branch never resolves and the
/// failure is logged.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
