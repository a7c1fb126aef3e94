// 設定管理機能
// キュー容量・変換・進捗報告の設定とJSON設定ファイル

pub mod implementations;

// 公開API
pub use implementations::{
    ensure_distinct_outputs, DefaultPipelineConfig, PipelineSettings, DEFAULT_CAPACITY,
};
