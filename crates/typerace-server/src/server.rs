//! `TypeRaceServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → controller → rooms.

use std::sync::Arc;

use typerace_engine::{GameConfig, ParagraphSource};
use typerace_protocol::JsonCodec;
use typerace_transport::{Transport, WebSocketTransport};

use crate::controller::Controller;
use crate::fetch::HttpParagraphs;
use crate::handler::handle_connection;
use crate::ServerError;

/// Builder for configuring and starting a typerace server.
///
/// # Example
///
/// ```rust,ignore
/// let server = TypeRaceServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct TypeRaceServerBuilder<S: ParagraphSource> {
    bind_addr: String,
    config: GameConfig,
    source: S,
}

impl TypeRaceServerBuilder<HttpParagraphs> {
    /// Creates a builder with default settings: local bind, default game
    /// rules, HTTP paragraphs with the lorem fallback.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            config: GameConfig::default(),
            source: HttpParagraphs::default(),
        }
    }
}

impl Default for TypeRaceServerBuilder<HttpParagraphs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ParagraphSource> TypeRaceServerBuilder<S> {
    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the game configuration (player cap, round duration, name policy).
    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    /// Swaps the paragraph source (tests use a fixed paragraph).
    pub fn paragraphs<T: ParagraphSource>(self, source: T) -> TypeRaceServerBuilder<T> {
        TypeRaceServerBuilder {
            bind_addr: self.bind_addr,
            config: self.config,
            source,
        }
    }

    /// Binds the transport and builds the server.
    pub async fn build(self) -> Result<TypeRaceServer<S>, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;
        let controller = Arc::new(Controller::new(self.config, self.source));
        Ok(TypeRaceServer {
            transport,
            controller,
        })
    }
}

/// A running typerace server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TypeRaceServer<S: ParagraphSource> {
    transport: WebSocketTransport,
    controller: Arc<Controller<S>>,
}

impl TypeRaceServer<HttpParagraphs> {
    /// Creates a new builder.
    pub fn builder() -> TypeRaceServerBuilder<HttpParagraphs> {
        TypeRaceServerBuilder::new()
    }
}

impl<S: ParagraphSource> TypeRaceServer<S> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop: one handler task per connection, until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("typerace server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let controller = Arc::clone(&self.controller);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection(conn, controller, JsonCodec).await
                        {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
