//! Shared application state.

use std::sync::Arc;

use crate::{
    config::HubConfig,
    usecase::{
        ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase,
        ExecuteCodeUseCase, GetRoomDetailUseCase, GetRoomsUseCase, RelayEventUseCase,
        SearchQuestionUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// RelayEventUseCase（イベント中継のユースケース）
    pub relay_event_usecase: Arc<RelayEventUseCase>,
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    pub search_question_usecase: Arc<SearchQuestionUseCase>,
    pub execute_code_usecase: Arc<ExecuteCodeUseCase>,
    /// Connection timing and queue sizes
    pub hub: HubConfig,
}
