//! Duocode room hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin duocode-server
//! cargo run --bin duocode-server -- --host 0.0.0.0 --port 3000
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use duocode_server::{
    config::ServerConfig,
    infrastructure::{
        executor::HttpCodeExecutor, question::LeetCodeQuestionLookup,
        repository::InMemoryRoomRepository,
    },
    ui::{AppState, Server},
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
        EvictRoomsUseCase, ExecuteCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        RelayEventUseCase, SearchQuestionUseCase,
    },
};
use duocode_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = ServerConfig::parse();
    let hub = match config.hub() {
        Ok(hub) => hub,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Repository
    // 2. External services
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new(
        hub.clone(),
        Arc::new(SystemClock),
    ));

    // 2. Create clients for the question service and the execution engine
    let question_lookup = match LeetCodeQuestionLookup::new(
        config.question_api_url.clone(),
        Duration::from_secs(config.question_timeout_secs),
    ) {
        Ok(lookup) => Arc::new(lookup),
        Err(e) => {
            tracing::error!("Failed to build question service client: {}", e);
            std::process::exit(1);
        }
    };
    let code_executor = match HttpCodeExecutor::new(
        config.execution_engine_url.clone(),
        Duration::from_secs(config.execution_timeout_secs),
    ) {
        Ok(executor) => Arc::new(executor),
        Err(e) => {
            tracing::error!("Failed to build execution engine client: {}", e);
            std::process::exit(1);
        }
    };

    // 3. Create UseCases
    let app_state = AppState {
        connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(repository.clone())),
        disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new()),
        relay_event_usecase: Arc::new(RelayEventUseCase::new()),
        create_room_usecase: Arc::new(CreateRoomUseCase::new(repository.clone())),
        get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
        get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository.clone())),
        search_question_usecase: Arc::new(SearchQuestionUseCase::new(question_lookup)),
        execute_code_usecase: Arc::new(ExecuteCodeUseCase::new(
            code_executor,
            repository.clone(),
        )),
        hub,
    };
    let evict_rooms_usecase = Arc::new(EvictRoomsUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(app_state, evict_rooms_usecase);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
