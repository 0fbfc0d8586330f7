//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::EvictRoomsUseCase;

use super::{
    handler::{
        create_room, execute_code, get_room_detail, get_rooms, health_check, search_question,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Room hub server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(app_state, evict_rooms_usecase);
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    app_state: Arc<AppState>,
    /// EvictRoomsUseCase（古い空きルームの掃除）
    evict_rooms_usecase: Arc<EvictRoomsUseCase>,
}

impl Server {
    pub fn new(app_state: AppState, evict_rooms_usecase: Arc<EvictRoomsUseCase>) -> Self {
        Self {
            app_state: Arc::new(app_state),
            evict_rooms_usecase,
        }
    }

    /// Define handlers
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/search", post(search_question))
            .route("/api/execute-code", post(execute_code))
            .layer(TraceLayer::new_for_http())
            .with_state(self.app_state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The stale-room sweeper runs for as long as the server does.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let sweeper = spawn_sweeper(
            self.evict_rooms_usecase.clone(),
            self.app_state.hub.sweep_interval,
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();
        result
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Duocode server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws?room_id=<room>", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

fn spawn_sweeper(
    evict_rooms_usecase: Arc<EvictRoomsUseCase>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // the first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            evict_rooms_usecase.execute().await;
        }
    })
}
