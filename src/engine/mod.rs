// エンジン層 - ワーカースレッドとオーケストレーション
// キューとサービス層を組み合わせてパイプラインを実行する

pub mod api;
pub mod consumer;
pub mod orchestrator;
pub mod producer;
pub mod worker;

// 公開API
pub use api::{run_files, run_pipeline};
pub use consumer::{run_consumer, spawn_consumer};
pub use orchestrator::{CancelHandle, Orchestrator, RunMonitor};
pub use producer::{run_producer, spawn_producer};
pub use worker::{RunSignals, WorkerContext, WorkerProgress};
