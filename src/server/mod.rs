// Caduceus - HTTP server module
// Serves the chat routing pipeline to the patient portal

mod handlers;

pub use handlers::{create_router, ChatTurnRequest};

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::MessageRouter;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Main assistant server structure
pub struct AssistantServer {
    /// Message routing pipeline (shared across requests)
    router: Arc<MessageRouter>,
    /// Server configuration
    config: ServerConfig,
}

impl AssistantServer {
    /// Create a new assistant server
    pub fn new(router: MessageRouter, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(router),
            config,
        }
    }

    /// Start the HTTP server
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.bind_address.parse()?;

        // Create application state
        let app_state = Arc::new(self);

        // Build router. The portal frontend is served from another origin,
        // so CORS stays permissive.
        let app = create_router(app_state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        tracing::info!("Starting caduceus assistant server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }

    /// Get reference to the routing pipeline
    pub fn router(&self) -> &Arc<MessageRouter> {
        &self.router
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}
