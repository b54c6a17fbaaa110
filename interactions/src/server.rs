//! The HTTP interactions endpoint.
//!
//! Discord POSTs every slash command to `/interactions`. Requests are
//! signature-checked, PINGs are answered inline, and commands are deferred:
//! the endpoint acknowledges within Discord's three-second window, runs the
//! command in a spawned task, then edits the deferred reply.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use senatus_bot::CommandHandler;
use senatus_platform::ChatPlatform;

use crate::error::InteractionError;
use crate::payload::{parse_interaction, Interaction};
use crate::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

const RESPONSE_PONG: u8 = 1;
const RESPONSE_MESSAGE: u8 = 4;
const RESPONSE_DEFERRED: u8 = 5;
const FLAG_EPHEMERAL: u32 = 1 << 6;

/// Shared state for the interactions endpoint.
pub struct InteractionState {
    pub verifier: SignatureVerifier,
    pub handler: Arc<CommandHandler>,
    pub platform: Arc<dyn ChatPlatform>,
}

pub fn router(state: Arc<InteractionState>) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .with_state(state)
}

/// Serve the endpoint until `shutdown` fires.
pub async fn serve(
    addr: SocketAddr,
    state: Arc<InteractionState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), InteractionError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "interactions endpoint listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    info!("interactions endpoint stopped");
    Ok(())
}

async fn interactions(
    State(state): State<Arc<InteractionState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, InteractionError> {
    let signature = header(&headers, SIGNATURE_HEADER)?;
    let timestamp = header(&headers, TIMESTAMP_HEADER)?;
    if let Err(e) = state.verifier.verify(timestamp, &body, signature) {
        debug!("rejected unsigned interaction");
        return Err(e);
    }

    let response = match parse_interaction(&body)? {
        Interaction::Ping => Json(json!({ "type": RESPONSE_PONG })),
        Interaction::Rejected { reason } => ephemeral(&reason),
        Interaction::Unsupported(kind) => {
            debug!(kind, "ignoring unsupported interaction");
            ephemeral("This interaction is not supported.")
        }
        Interaction::Command { token, invocation } => {
            info!(
                command = invocation.command.name(),
                community = %invocation.community,
                invoker = %invocation.invoker,
                "command received"
            );
            let state = state.clone();
            tokio::spawn(async move {
                let reply = state.handler.handle(&invocation).await;
                if let Err(e) = state
                    .platform
                    .edit_interaction_reply(&token, &reply.into_message())
                    .await
                {
                    warn!(command = invocation.command.name(), error = %e, "could not deliver reply");
                }
            });
            Json(json!({ "type": RESPONSE_DEFERRED }))
        }
    };
    Ok(response.into_response())
}

fn header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, InteractionError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(InteractionError::MissingHeader(name))
}

fn ephemeral(content: &str) -> Json<serde_json::Value> {
    Json(json!({
        "type": RESPONSE_MESSAGE,
        "data": { "content": content, "flags": FLAG_EPHEMERAL },
    }))
}
