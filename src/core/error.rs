// パイプライン用のカスタムエラー型定義
// ワーカー側の失敗・設定エラー・プロトコル違反をひとつの型で扱う

use super::types::OrchestratorState;
use thiserror::Error;

/// パイプライン固有のエラー型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("ソース利用不可: {resource} - {source}")]
    SourceUnavailable {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("読み込みエラー: {resource} (行 {line}) - {source}")]
    ReadError {
        resource: String,
        line: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("シンク利用不可: {resource} - {source}")]
    SinkUnavailable {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("書き込みエラー: {resource} - {source}")]
    WriteError {
        resource: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("アイテム処理エラー: {item} - {message}")]
    ProcessingError { item: String, message: String },

    #[error("容量設定エラー: 容量は1以上である必要があります (指定値: {capacity})")]
    CapacityConfig { capacity: usize },

    #[error("設定エラー: Consumerが1つも登録されていません")]
    NoConsumers,

    #[error("状態エラー: {operation} は {state} 状態では実行できません")]
    InvalidState {
        operation: String,
        state: OrchestratorState,
    },

    #[error("シャットダウンプロトコル違反: {worker} - {message}")]
    ShutdownProtocolViolation { worker: String, message: String },

    #[error("キューが閉じられています: {worker}")]
    QueueClosed { worker: String },

    #[error("ワーカーパニック: {worker} - {message}")]
    WorkerPanicked { worker: String, message: String },

    #[error("スレッド起動エラー: {worker} - {source}")]
    ThreadSpawn {
        worker: String,
        #[source]
        source: std::io::Error,
    },

    #[error("設定エラー: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    /// ソース利用不可エラーの作成
    pub fn source_unavailable(
        resource: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::SourceUnavailable {
            resource: resource.into(),
            source: source.into(),
        }
    }

    /// 読み込みエラーの作成
    pub fn read_error(
        resource: impl Into<String>,
        line: usize,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::ReadError {
            resource: resource.into(),
            line,
            source: source.into(),
        }
    }

    /// シンク利用不可エラーの作成
    pub fn sink_unavailable(resource: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::SinkUnavailable {
            resource: resource.into(),
            source: source.into(),
        }
    }

    /// 書き込みエラーの作成
    pub fn write_error(resource: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::WriteError {
            resource: resource.into(),
            source: source.into(),
        }
    }

    /// アイテム処理エラーの作成
    pub fn processing(item: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessingError {
            item: item.into(),
            message: message.into(),
        }
    }

    pub fn invalid_state(operation: impl Into<String>, state: OrchestratorState) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state,
        }
    }

    pub fn shutdown_violation(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ShutdownProtocolViolation {
            worker: worker.into(),
            message: message.into(),
        }
    }

    pub fn queue_closed(worker: impl Into<String>) -> Self {
        Self::QueueClosed {
            worker: worker.into(),
        }
    }

    pub fn worker_panicked(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::WorkerPanicked {
            worker: worker.into(),
            message: message.into(),
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// 統計・ログ出力用の安定した種別名
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::ReadError { .. } => "read_error",
            Self::SinkUnavailable { .. } => "sink_unavailable",
            Self::WriteError { .. } => "write_error",
            Self::ProcessingError { .. } => "processing_error",
            Self::CapacityConfig { .. } => "capacity_config",
            Self::NoConsumers => "no_consumers",
            Self::InvalidState { .. } => "invalid_state",
            Self::ShutdownProtocolViolation { .. } => "shutdown_protocol_violation",
            Self::QueueClosed { .. } => "queue_closed",
            Self::WorkerPanicked { .. } => "worker_panicked",
            Self::ThreadSpawn { .. } => "thread_spawn",
            Self::Configuration { .. } => "configuration",
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ProcessingError { .. } | Self::QueueClosed { .. } => ErrorSeverity::Low,
            Self::ReadError { .. } | Self::WriteError { .. } => ErrorSeverity::Medium,
            Self::SourceUnavailable { .. } | Self::SinkUnavailable { .. } => ErrorSeverity::Medium,
            Self::CapacityConfig { .. }
            | Self::NoConsumers
            | Self::InvalidState { .. }
            | Self::Configuration { .. } => ErrorSeverity::High,
            Self::ThreadSpawn { .. } => ErrorSeverity::High,
            Self::ShutdownProtocolViolation { .. } | Self::WorkerPanicked { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    /// 実行を継続できる種類のエラーかどうか
    ///
    /// ワーカー単位で記録されるエラーは回復可能、実行開始前に検出される
    /// 設定系のエラーと内部不整合は回復不能として扱う。
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::SourceUnavailable { .. }
            | Self::ReadError { .. }
            | Self::SinkUnavailable { .. }
            | Self::WriteError { .. }
            | Self::ProcessingError { .. }
            | Self::QueueClosed { .. }
            | Self::WorkerPanicked { .. } => true,
            Self::CapacityConfig { .. }
            | Self::NoConsumers
            | Self::InvalidState { .. }
            | Self::ThreadSpawn { .. }
            | Self::Configuration { .. }
            | Self::ShutdownProtocolViolation { .. } => false,
        }
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - 個別アイテムの失敗
    Low,
    /// 中重要度 - ワーカー単位の失敗
    Medium,
    /// 高重要度 - 実行自体が開始できない
    High,
    /// 致命的 - ロジックの不整合
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// パイプラインの結果型
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
