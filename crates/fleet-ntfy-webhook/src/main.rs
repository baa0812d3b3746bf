use std::{
    env, fmt,
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
};

use anyhow::{bail, Context};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use fleet_ntfy::{
    integration::DEFAULT_NTFY_URL, DeliveryConfig, NotificationBuilder, NtfyClient,
    WebhookPayload,
};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LISTEN_ADDR: &str = ":8080";
const DEFAULT_NTFY_TOPIC: &str = "fleet-alerts";

#[derive(Debug, Clone)]
struct ServerConfig {
    listen_addr: ListenAddr,
    ntfy_url: String,
    ntfy_topic: String,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = ListenAddr::parse(&listen_addr).context("failed to parse LISTEN_ADDR")?;

        let ntfy_url = lookup("NTFY_URL").unwrap_or_else(|| DEFAULT_NTFY_URL.to_string());
        if ntfy_url.trim().is_empty() {
            bail!("NTFY_URL must not be empty");
        }

        let ntfy_topic = lookup("NTFY_TOPIC").unwrap_or_else(|| DEFAULT_NTFY_TOPIC.to_string());

        Ok(Self {
            listen_addr,
            ntfy_url,
            ntfy_topic,
        })
    }
}

/// Address the webhook listener binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListenAddr {
    /// Host-less `:port`; every interface, IPv6 included when available.
    AnyInterface(u16),
    /// `host:port`, where host may be a name resolved at bind time.
    Host(String),
}

impl ListenAddr {
    fn parse(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        let Some((host, port)) = value.rsplit_once(':') else {
            bail!("listen address must be host:port or :port, got {value:?}");
        };
        let port = port
            .parse::<u16>()
            .with_context(|| format!("invalid port in listen address: {value}"))?;

        if host.is_empty() {
            Ok(Self::AnyInterface(port))
        } else {
            Ok(Self::Host(value.to_string()))
        }
    }

    async fn bind(&self) -> anyhow::Result<TcpListener> {
        match self {
            Self::AnyInterface(port) => {
                match TcpListener::bind(SocketAddr::from((Ipv6Addr::UNSPECIFIED, *port))).await {
                    Ok(listener) => Ok(listener),
                    Err(error) => {
                        warn!(%error, port = *port, "IPv6 bind failed, falling back to IPv4");
                        TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, *port)))
                            .await
                            .with_context(|| format!("failed to bind {self}"))
                    }
                }
            }
            Self::Host(addr) => TcpListener::bind(addr.as_str())
                .await
                .with_context(|| format!("failed to bind {addr}")),
        }
    }
}

impl fmt::Display for ListenAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyInterface(port) => write!(f, ":{port}"),
            Self::Host(addr) => f.write_str(addr),
        }
    }
}

#[derive(Clone)]
struct AppState {
    builder: NotificationBuilder,
    client: NtfyClient,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    info!(
        listen_addr = %config.listen_addr,
        ntfy_url = %config.ntfy_url,
        ntfy_topic = %config.ntfy_topic,
        "starting fleet-ntfy-webhook"
    );

    let client = NtfyClient::new(DeliveryConfig::new(config.ntfy_url.clone()))
        .context("failed to build ntfy client")?;
    let state = AppState {
        builder: NotificationBuilder::new(config.ntfy_topic.clone()),
        client,
    };

    let app = build_router(state);

    let listener = config.listen_addr.bind().await?;
    let local_addr = listener
        .local_addr()
        .context("failed to read listener address")?;

    info!(%local_addr, "fleet-ntfy-webhook listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited with error")?;

    info!("fleet-ntfy-webhook stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/webhook",
            post(handle_webhook)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::disable()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn handle_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<&'static str, (StatusCode, &'static str)> {
    // A bare `null` body decodes to an empty payload.
    let payload = serde_json::from_slice::<Option<WebhookPayload>>(&body)
        .map_err(|error| {
            warn!(%error, "error parsing webhook JSON");
            (StatusCode::BAD_REQUEST, "Invalid JSON payload")
        })?
        .unwrap_or_default();

    let Some(notification) = state.builder.build(&payload) else {
        info!("no details in webhook payload");
        return Ok("");
    };

    if let Err(error) = state.client.send(&notification).await {
        error!(%error, title = %notification.title, "error sending to ntfy");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to send notification",
        ));
    }

    info!(
        title = %notification.title,
        priority = %notification.priority,
        details = payload.details.len(),
        "notification sent"
    );
    Ok("OK")
}
