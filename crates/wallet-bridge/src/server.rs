//! Axum HTTP server for the wallet bridge

use axum::{routing::get, routing::post, Router};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::handlers::{handle_callback, handle_request};
use crate::types::{PendingRequest, RequestStatus};

/// Shared server state
pub struct ServerState {
    /// Port the server is running on
    pub port: u16,
    /// Pending requests by ID
    pub pending_requests: RwLock<HashMap<String, PendingRequest>>,
}

/// Wallet bridge HTTP server
pub struct WalletBridge {
    state: Arc<ServerState>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl WalletBridge {
    /// Start the server on an available port
    pub async fn start() -> Result<Self, std::io::Error> {
        Self::start_on_port(0).await
    }

    /// Start the server on a specific port (0 for auto-assign)
    pub async fn start_on_port(port: u16) -> Result<Self, std::io::Error> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_port = listener.local_addr()?.port();

        let state = Arc::new(ServerState {
            port: actual_port,
            pending_requests: RwLock::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/request/:id", get(handle_request))
            .route("/callback/:id", post(handle_callback))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state.clone());

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            tracing::info!("Wallet bridge starting on port {}", actual_port);

            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    tracing::info!("Wallet bridge shutting down");
                })
                .await
                .ok();
        });

        // Sweep expired requests
        let cleanup_state = state.clone();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                let mut requests = cleanup_state.pending_requests.write().await;
                requests.retain(|id, req| {
                    let expired = req.is_expired();
                    if expired {
                        tracing::debug!("Cleaning up expired request: {}", id);
                    }
                    !expired
                });
            }
        });

        Ok(Self {
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Get the port the server is running on
    pub fn port(&self) -> u16 {
        self.state.port
    }

    /// URL the frontend fetches the request payload from
    pub fn request_url(&self, request_id: &str) -> String {
        format!("http://127.0.0.1:{}/request/{}", self.state.port, request_id)
    }

    /// Create a new wallet connect request
    pub async fn create_connect_request(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let request = PendingRequest::new_connect(id.clone());

        let mut requests = self.state.pending_requests.write().await;
        requests.insert(id.clone(), request);

        id
    }

    /// Create a new transaction signing request
    pub async fn create_sign_request(&self, call: serde_json::Value, message: String) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let request = PendingRequest::new_sign(id.clone(), call, message);

        let mut requests = self.state.pending_requests.write().await;
        requests.insert(id.clone(), request);

        id
    }

    /// Get the status of a request. Expired entries report Expired even
    /// before the sweeper removes them.
    pub async fn get_request_status(&self, request_id: &str) -> Option<RequestStatus> {
        let requests = self.state.pending_requests.read().await;
        requests.get(request_id).map(|r| {
            if r.is_expired() && matches!(r.status, RequestStatus::Pending) {
                RequestStatus::Expired
            } else {
                r.status.clone()
            }
        })
    }

    /// Cancel a pending request
    pub async fn cancel_request(&self, request_id: &str) {
        let mut requests = self.state.pending_requests.write().await;
        requests.remove(request_id);
    }
}

impl Drop for WalletBridge {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
