//! Studio API Server - protected settings and SEO API.
//!
//! Serves the site's general, email and SEO settings. Every route sits behind
//! the three-path authorizer: an admin session, an unsigned GET from the
//! trusted frontend, or an HMAC-signed request from an internal caller.
//!
//! # Usage
//!
//! ```text
//! API_SIGNING_SECRET=... FRONTEND_URL=https://studio.example studio-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `STUDIO_LISTEN` | `0.0.0.0:5000` | Bind address |
//! | `API_SIGNING_SECRET` | *(unset)* | Shared secret for signed requests |
//! | `FRONTEND_URL` | *(unset)* | Origin allowed to issue unsigned GETs |
//! | `AUTH_BASE_URL` | *(unset)* | Session service base URL |
//! | `SESSION_TIMEOUT_MS` | `3000` | Bound on a session lookup |
//! | `SESSION_FAILURE_POLICY` | `open` | `open` or `closed` on session lookup errors |
//! | `API_SIGNATURE_MAX_AGE_MS` | *(unset)* | Replay window for signed requests |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod gateway;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use studio_auth::{Authorizer, NoSessionResolver, RemoteSessionResolver, SessionResolver};
use studio_core::StudioConfig;
use studio_http::{ProtectedApiConfig, ProtectedApiService};

use crate::gateway::GatewayService;
use crate::store::{SettingsStore, SettingsStoreHandler};

/// Server version reported in health check responses.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the session resolver from `AUTH_BASE_URL`.
///
/// Without a session service the session path never matches.
fn build_session_resolver(config: &StudioConfig) -> Result<Arc<dyn SessionResolver>> {
    match config.auth_base_url.as_deref() {
        Some(base_url) => {
            let resolver = RemoteSessionResolver::new(base_url)
                .with_context(|| format!("invalid session service URL: {base_url}"))?;
            info!(endpoint = resolver.endpoint(), "using remote session service");
            Ok(Arc::new(resolver))
        }
        None => {
            warn!("AUTH_BASE_URL is not set, admin sessions are disabled");
            Ok(Arc::new(NoSessionResolver))
        }
    }
}

/// Assemble the protected API behind the gateway.
fn build_gateway(authorizer: Authorizer) -> GatewayService<SettingsStoreHandler> {
    let handler = SettingsStoreHandler::new(Arc::new(SettingsStore::new()));
    let api = ProtectedApiService::new(
        Arc::new(handler),
        ProtectedApiConfig::new(Arc::new(authorizer)),
    );
    GatewayService::new(api, VERSION)
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: GatewayService<SettingsStoreHandler>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Perform a health check by connecting to the server and requesting `/health`.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"ok\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = StudioConfig::from_env().context("invalid configuration")?;

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;

    let resolver = build_session_resolver(&config)?;
    let authorizer = Authorizer::from_config(&config, resolver);
    if !authorizer.accepts_signatures() {
        warn!("API_SIGNING_SECRET is not set, signed requests will be rejected");
    }
    if authorizer.trusted_origin().is_none() {
        warn!("FRONTEND_URL is not set, unsigned frontend reads are disabled");
    }

    let gateway = build_gateway(authorizer);

    let addr: SocketAddr = config
        .listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        frontend_url = config.frontend_url.as_deref().unwrap_or("-"),
        session_timeout_ms = u64::try_from(config.session_timeout.as_millis()).unwrap_or(u64::MAX),
        session_failure_policy = %config.session_failure_policy,
        version = VERSION,
        "starting Studio API Server",
    );

    serve(listener, gateway).await
}
