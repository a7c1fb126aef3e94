// bounded_pipeline - 固定容量キューによるProducer/Consumerパイプライン
//
// レイヤー構成:
// - core: トレイト・型・エラー定義
// - queue: 固定容量のブロッキングキュー
// - services: ソース・シンク・変換・設定・進捗報告の具象実装
// - engine: ワーカースレッドとオーケストレーション
// - cli: コマンドライン

pub mod cli;
pub mod core;
pub mod engine;
pub mod queue;
pub mod services;

// 公開API - よく使う型をクレート直下から参照できるようにする
pub use crate::core::{
    ItemProcessor, LineSink, LineSource, LineTransform, OrchestratorState, PipelineConfig,
    PipelineError, PipelineReporter, PipelineResult, RunStatistics, WorkerRecord, WorkerStatus,
};
pub use engine::{run_files, run_pipeline, CancelHandle, Orchestrator, RunMonitor};
pub use queue::{BoundedBlockingQueue, PutError, QueueError};
pub use services::{
    ConsoleReporter, DefaultPipelineConfig, FileLineSink, FileLineSource, FnProcessor, MemoryLineSink,
    MemoryLineSource, NoOpReporter, PipelineSettings, StdoutLineSink,
};

/// ログ出力を初期化する
///
/// `RUST_LOG` が設定されていればそれに従い、なければ `verbose` に応じて
/// `bounded_pipeline=info` または `bounded_pipeline=debug` を使う。
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_filter = if verbose {
        "bounded_pipeline=debug"
    } else {
        "bounded_pipeline=info"
    };

    // 二重初期化（テスト等）は無視する
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
