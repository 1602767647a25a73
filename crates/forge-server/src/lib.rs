mod cors;
mod health;

use std::net::SocketAddr;

use axum::Router;
use forge_backend::Backend;
use forge_config::Config;
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration, connecting to the managed backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend client or a function server cannot be
    /// initialized
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let backend = Backend::from_config(&config.backend)?;
        Self::with_backend(config, backend)
    }

    /// Build the server against an already constructed backend
    ///
    /// # Errors
    ///
    /// Returns an error if a function server cannot be initialized
    pub fn with_backend(config: &Config, backend: Backend) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let imagegen_state = forge_imagegen::build_server(config)?;
        let tts_state = tts::build_server(config, backend.clone())?;
        let llm_state = forge_llm::build_server(config, backend.clone());
        let jobs_state = forge_jobs::build_server(backend);

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app
            .merge(forge_imagegen::endpoint_router().with_state(imagegen_state))
            .merge(tts::endpoint_router().with_state(tts_state))
            .merge(forge_llm::endpoint_router().with_state(llm_state))
            .merge(forge_jobs::endpoint_router().with_state(jobs_state));

        // CORS outermost so preflights never reach the handlers
        app = app
            .layer(TraceLayer::new_for_http())
            .layer(cors::cors_layer(&config.server.cors));

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener
    ///
    /// # Errors
    ///
    /// Returns an error if serving fails
    pub async fn serve_on(
        self,
        listener: tokio::net::TcpListener,
        shutdown: tokio_util::sync::CancellationToken,
    ) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
