//! Tool service HTTP server (single port).

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use crate::config::{self, Config};
use crate::credentials::EnvCredentialSource;
use crate::service::protocol::{ErrorBody, HealthPayload, ServiceMetadata};
use crate::tools::{ToolContext, ToolRegistry};
use crate::twilio::TwilioClient;

/// Shared state for request handlers.
#[derive(Clone)]
pub struct ServiceState {
    pub config: Arc<Config>,
    pub registry: ToolRegistry,
    pub metadata: Arc<ServiceMetadata>,
    /// When Some, tool requests must carry `Authorization: Bearer <token>`.
    pub required_token: Option<String>,
}

impl ServiceState {
    pub fn new(config: Config, registry: ToolRegistry) -> Self {
        let required_token = require_api_token(&config);
        Self {
            config: Arc::new(config),
            registry,
            metadata: Arc::new(ServiceMetadata::default()),
            required_token,
        }
    }
}

/// When auth mode is token and a token is configured, returns it for request validation.
fn require_api_token(config: &Config) -> Option<String> {
    if config.service.auth.mode == config::ServiceAuthMode::Token {
        config::resolve_service_token(config)
    } else {
        None
    }
}

/// Registry wired to the real Twilio API, with credentials from env over the config file.
pub fn build_registry(config: &Config) -> ToolRegistry {
    let gateway = TwilioClient::new(Some(config::resolve_twilio_api_base(config)));
    let credentials = EnvCredentialSource::new(config.twilio.clone());
    ToolRegistry::new(ToolContext::new(Arc::new(credentials), Arc::new(gateway)))
}

/// Routes for the tool surface.
pub fn router(state: ServiceState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/tools", get(list_tools))
        .route("/tools/:id", post(call_tool))
        .with_state(state)
}

/// Run the service; binds to config.service.bind:config.service.port.
/// When bind is not loopback, an API key must be configured or startup fails.
/// Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_service(config: Config) -> Result<()> {
    let bind = config.service.bind.trim().to_string();
    if !config::is_loopback_bind(&bind) {
        let token = config::resolve_service_token(&config);
        if token.is_none() || config.service.auth.mode != config::ServiceAuthMode::Token {
            anyhow::bail!(
                "refusing to bind service to {} without auth (set service.auth.mode to \"token\" and service.auth.token or WHATSAPP_SERVICE_API_KEY)",
                bind
            );
        }
    }

    let registry = build_registry(&config);
    let port = config.service.port;
    let state = ServiceState::new(config, registry);
    log::info!("registered tools: {}", state.registry.ids().join(", "));

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("WhatsApp messaging service listening on {}", bind_addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("service exited")?;
    log::info!("service stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// True when no token is required or the bearer token matches.
fn authorized(state: &ServiceState, headers: &HeaderMap) -> bool {
    let Some(ref required) = state.required_token else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map_or(false, |t| t.trim() == required.as_str())
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorBody::new(error))).into_response()
}

/// GET / returns health plus service metadata (for health checks and discovery).
async fn health_http(State(state): State<ServiceState>) -> Json<HealthPayload> {
    Json(HealthPayload {
        runtime: "running".to_string(),
        port: state.config.service.port,
        service: (*state.metadata).clone(),
        tools: state.registry.ids(),
    })
}

/// GET /tools returns the tool definitions.
async fn list_tools(State(state): State<ServiceState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    Json(state.registry.definitions()).into_response()
}

/// POST /tools/:id runs one tool. Body is the tool input JSON (empty body = no arguments).
async fn call_tool(
    State(state): State<ServiceState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&state, &headers) {
        return error_response(StatusCode::UNAUTHORIZED, "unauthorized");
    }
    if !state.registry.has_tool(&id) {
        return error_response(StatusCode::NOT_FOUND, format!("unknown tool: {}", id));
    }
    let args: serde_json::Value = if body.iter().all(|b| b.is_ascii_whitespace()) {
        serde_json::Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("invalid JSON body: {}", e))
            }
        }
    };
    log::debug!("tool call: {}", id);
    match state.registry.execute(&id, args).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e),
    }
}
