// 進捗監視機能
// アイテム投入・処理の報告、エラー通知、完了通知

pub mod implementations;

// 公開API
pub use implementations::{ConsoleReporter, NoOpReporter};
