//! Room event loop
//!
//! ## 責務
//!
//! - ルームごとに 1 つの tokio タスクを起動し、状態変更を直列化する
//! - クライアントの送信キューへのノンブロッキング配信（満杯・切断なら退出扱い）
//! - 定期的な生存確認（probe）
//!
//! ## 設計ノート
//!
//! admit / dismiss / publish は 1 本の有界キューに載せて順序を保つ。
//! 同じクライアントの admit → イベント → dismiss が入れ替わることはない。

mod room_loop;

pub use room_loop::RoomLoopHandle;
