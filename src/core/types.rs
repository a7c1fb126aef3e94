// パイプラインに関連するデータ型定義

use super::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// オーケストレーターの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    Idle,
    Running,
    Draining,
    Completed,
    Failed,
}

impl OrchestratorState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Draining => "Draining",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }

    /// これ以上遷移しない状態かどうか
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 各アイテムに適用する変換
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LineTransform {
    /// そのまま書き出す
    #[default]
    Identity,
    Uppercase,
    Lowercase,
    /// 文字順を反転
    Reverse,
}

impl LineTransform {
    pub fn apply(&self, line: &str) -> String {
        match self {
            Self::Identity => line.to_string(),
            Self::Uppercase => line.to_uppercase(),
            Self::Lowercase => line.to_lowercase(),
            Self::Reverse => line.chars().rev().collect(),
        }
    }
}

/// ワーカーの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
    Producer,
    Consumer,
}

/// ワーカーの終了状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// 統計に含めるエラーのスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerError {
    pub worker: String,
    pub kind: String,
    pub message: String,
}

impl WorkerError {
    pub fn from_error(worker: impl Into<String>, error: &PipelineError) -> Self {
        Self {
            worker: worker.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// 単一ワーカーの実行記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecord {
    pub name: String,
    pub role: WorkerRole,
    /// ソースまたはシンクの説明（ファイルパス等）
    pub resource: String,
    pub items_produced: usize,
    pub items_consumed: usize,
    pub items_failed: usize,
    pub status: WorkerStatus,
    pub errors: Vec<WorkerError>,
}

impl WorkerRecord {
    pub fn new(name: impl Into<String>, role: WorkerRole, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            resource: resource.into(),
            items_produced: 0,
            items_consumed: 0,
            items_failed: 0,
            status: WorkerStatus::Pending,
            errors: Vec::new(),
        }
    }

    /// エラーを記録
    pub fn record_error(&mut self, error: &PipelineError) {
        self.errors.push(WorkerError::from_error(&self.name, error));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// 実行全体の統計
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub state: OrchestratorState,
    pub capacity: usize,
    pub producers: usize,
    pub consumers: usize,
    pub total_produced: usize,
    pub total_consumed: usize,
    pub total_failed: usize,
    /// 統計取得時点でキューに残っているアイテム数
    pub queue_size: usize,
    pub elapsed_ms: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub workers: Vec<WorkerRecord>,
    pub errors: Vec<WorkerError>,
}

impl RunStatistics {
    /// ワーカー記録から合計値を集計して統計を組み立てる
    pub fn from_workers(
        state: OrchestratorState,
        capacity: usize,
        queue_size: usize,
        workers: Vec<WorkerRecord>,
    ) -> Self {
        let producers = workers
            .iter()
            .filter(|w| w.role == WorkerRole::Producer)
            .count();
        let consumers = workers.len() - producers;
        let total_produced = workers.iter().map(|w| w.items_produced).sum();
        let total_consumed = workers.iter().map(|w| w.items_consumed).sum();
        let total_failed = workers.iter().map(|w| w.items_failed).sum();
        let errors = workers.iter().flat_map(|w| w.errors.clone()).collect();

        Self {
            state,
            capacity,
            producers,
            consumers,
            total_produced,
            total_consumed,
            total_failed,
            queue_size,
            elapsed_ms: 0,
            started_at: None,
            finished_at: None,
            workers,
            errors,
        }
    }

    /// 名前でワーカー記録を検索
    pub fn worker(&self, name: &str) -> Option<&WorkerRecord> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// 種別でエラーを絞り込み
    pub fn errors_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a WorkerError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    pub fn is_complete(&self) -> bool {
        self.state == OrchestratorState::Completed
    }
}
