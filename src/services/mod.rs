// サービス層 - 機能別の具象実装
// ワーカーが依存するトレイトの実装を提供し、エンジン層から注入される

pub mod config;
pub mod io;
pub mod monitoring;
pub mod processing;

// 公開API - 各サービスの主要機能を明示的にエクスポート
pub use config::{ensure_distinct_outputs, DefaultPipelineConfig, PipelineSettings, DEFAULT_CAPACITY};
pub use io::{FileLineSink, FileLineSource, MemoryLineSink, MemoryLineSource, StdoutLineSink};
pub use monitoring::{ConsoleReporter, NoOpReporter};
pub use processing::FnProcessor;
