// ワーカー共通 - ProducerとConsumerが共有する実行コンテキスト

use crate::{
    core::{
        ErrorSeverity, PipelineError, PipelineReporter, WorkerRecord, WorkerRole, WorkerStatus,
    },
    queue::BoundedBlockingQueue,
};
use parking_lot::Mutex;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};
use tracing::{error, warn, Level};

/// オーケストレーターとワーカー間の終了シグナル
#[derive(Debug, Default)]
pub struct RunSignals {
    producers_finished: AtomicBool,
    cancelled: AtomicBool,
    active_consumers: AtomicUsize,
}

impl RunSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// 全Producerの合流完了を記録。キューを閉じる前に呼ぶこと
    pub fn mark_producers_finished(&self) {
        self.producers_finished.store(true, Ordering::SeqCst);
    }

    pub fn producers_finished(&self) -> bool {
        self.producers_finished.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn set_active_consumers(&self, count: usize) {
        self.active_consumers.store(count, Ordering::SeqCst);
    }

    /// Consumerの終了を記録し、最後の1つだった場合に true を返す
    pub(crate) fn consumer_exited(&self) -> bool {
        self.active_consumers.fetch_sub(1, Ordering::SeqCst) == 1
    }
}

/// 実行中に監視スレッドから読まれるワーカー単位の進捗
///
/// カウンターはワーカー自身だけが更新し、読み取りはロックなしで行う。
#[derive(Debug)]
pub struct WorkerProgress {
    name: String,
    role: WorkerRole,
    resource: String,
    produced: AtomicUsize,
    consumed: AtomicUsize,
    failed: AtomicUsize,
    status: Mutex<WorkerStatus>,
}

impl WorkerProgress {
    pub fn new(name: impl Into<String>, role: WorkerRole, resource: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role,
            resource: resource.into(),
            produced: AtomicUsize::new(0),
            consumed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
            status: Mutex::new(WorkerStatus::Pending),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> WorkerRole {
        self.role
    }

    pub(crate) fn add_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_consumed(&self) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn set_status(&self, status: WorkerStatus) {
        *self.status.lock() = status;
    }

    /// 現時点のカウンターから記録を組み立てる（エラー一覧は含まない）
    pub fn snapshot(&self) -> WorkerRecord {
        let mut record = WorkerRecord::new(&self.name, self.role, &self.resource);
        record.items_produced = self.produced.load(Ordering::Relaxed);
        record.items_consumed = self.consumed.load(Ordering::Relaxed);
        record.items_failed = self.failed.load(Ordering::Relaxed);
        record.status = *self.status.lock();
        record
    }
}

/// 各ワーカースレッドに渡される依存関係一式
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: Arc<BoundedBlockingQueue<String>>,
    pub reporter: Arc<dyn PipelineReporter>,
    pub signals: Arc<RunSignals>,
    pub progress: Arc<WorkerProgress>,
}

impl WorkerContext {
    pub fn name(&self) -> &str {
        self.progress.name()
    }

    /// ワーカーの最終状態を確定させて記録を返す
    pub(crate) fn finish(&self, mut record: WorkerRecord, status: WorkerStatus) -> WorkerRecord {
        record.status = status;
        self.progress.set_status(status);
        record
    }

    /// エラーをログ出力し、記録に追加して報告する
    pub(crate) fn fail(&self, record: &mut WorkerRecord, failure: &PipelineError) {
        let severity = failure.severity().as_str();
        if log_level(failure) == Level::ERROR {
            error!(worker = self.name(), kind = failure.kind(), severity, "{failure}");
        } else {
            warn!(worker = self.name(), kind = failure.kind(), severity, "{failure}");
        }
        record.record_error(failure);
        self.reporter.report_error(self.name(), failure);
    }
}

/// 重要度 High 以上は ERROR、それ未満は WARN
pub(crate) fn log_level(error: &PipelineError) -> Level {
    if error.severity() >= ErrorSeverity::High {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// `JoinHandle::join` のパニックペイロードから文字列を取り出す
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
