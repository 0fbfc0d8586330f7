//! UseCase 層
//!
//! ハンドラーから呼ばれるアプリケーションのユースケース。ルームの状態には
//! `RoomHandle` 経由でのみ触れ、外部サービスにはドメインのポート経由で触れる。

pub mod connect_participant;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod evict_rooms;
pub mod execute_code;
pub mod get_room_detail;
pub mod get_rooms;
pub mod relay_event;
pub mod search_question;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{
    ConnectError, CreateRoomError, ExecuteCodeError, GetRoomDetailError, SearchQuestionError,
};
pub use evict_rooms::EvictRoomsUseCase;
pub use execute_code::{ExecuteCodeUseCase, ExecutionRequest};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use relay_event::RelayEventUseCase;
pub use search_question::SearchQuestionUseCase;
