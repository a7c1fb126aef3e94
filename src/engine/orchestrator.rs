// Orchestrator - ワーカーの起動・合流・終了シグナル・統計集計

use super::{
    consumer::spawn_consumer,
    producer::spawn_producer,
    worker::{panic_message, RunSignals, WorkerContext, WorkerProgress},
};
use crate::{
    core::{
        ItemProcessor, LineSink, LineSource, LineTransform, OrchestratorState, PipelineConfig,
        PipelineError, PipelineReporter, PipelineResult, RunStatistics, WorkerRecord, WorkerRole,
        WorkerStatus,
    },
    queue::BoundedBlockingQueue,
    services::{ConsoleReporter, NoOpReporter},
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{error, info};

/// オーケストレーターと監視ハンドルが共有する実行状態
#[derive(Debug)]
struct SharedRun {
    state: Mutex<OrchestratorState>,
    started: Mutex<Option<(Instant, DateTime<Utc>)>>,
    /// 登録順のワーカー進捗
    workers: Mutex<Vec<Arc<WorkerProgress>>>,
}

impl SharedRun {
    fn new() -> Self {
        Self {
            state: Mutex::new(OrchestratorState::Idle),
            started: Mutex::new(None),
            workers: Mutex::new(Vec::new()),
        }
    }

    fn state(&self) -> OrchestratorState {
        *self.state.lock()
    }

    fn set_state(&self, state: OrchestratorState) {
        let previous = std::mem::replace(&mut *self.state.lock(), state);
        info!(from = %previous, to = %state, "orchestrator state changed");
    }

    /// 実行中カウンターからの参考値。エラー一覧は含まない
    fn snapshot(&self, queue: &BoundedBlockingQueue<String>) -> RunStatistics {
        let workers = self.workers.lock();
        let records = workers
            .iter()
            .filter(|p| p.role() == WorkerRole::Producer)
            .chain(workers.iter().filter(|p| p.role() == WorkerRole::Consumer))
            .map(|p| p.snapshot())
            .collect();
        drop(workers);

        let mut stats =
            RunStatistics::from_workers(self.state(), queue.capacity(), queue.size(), records);
        if let Some((instant, started_at)) = *self.started.lock() {
            stats.elapsed_ms = instant.elapsed().as_millis() as u64;
            stats.started_at = Some(started_at);
        }
        stats
    }
}

/// 実行中のパイプラインを外部から停止させるハンドル
#[derive(Debug, Clone)]
pub struct CancelHandle {
    signals: Arc<RunSignals>,
    queue: Arc<BoundedBlockingQueue<String>>,
}

impl CancelHandle {
    /// 新規投入を止め、Producerを停止させる。バッファ済みのアイテムはConsumerが処理する
    pub fn cancel(&self) {
        info!("cancellation requested");
        self.signals.cancel();
        self.queue.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.signals.is_cancelled()
    }
}

/// 別スレッドから実行中の進捗を参照するハンドル
#[derive(Debug, Clone)]
pub struct RunMonitor {
    shared: Arc<SharedRun>,
    queue: Arc<BoundedBlockingQueue<String>>,
}

impl RunMonitor {
    pub fn state(&self) -> OrchestratorState {
        self.shared.state()
    }

    /// 現時点の参考統計
    pub fn snapshot(&self) -> RunStatistics {
        self.shared.snapshot(&self.queue)
    }

    /// 実行が完了または失敗で終わったかどうか
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }
}

struct PendingProducer {
    progress: Arc<WorkerProgress>,
    source: Box<dyn LineSource>,
}

struct PendingConsumer {
    progress: Arc<WorkerProgress>,
    sink: Box<dyn LineSink>,
}

type RunningWorker = (Arc<WorkerProgress>, JoinHandle<WorkerRecord>);

/// Producer/Consumerパイプラインの実行管理
///
/// `Idle → Running → Draining → Completed` の順に遷移する。
/// 設定不備やスレッド起動失敗の場合は `Failed` になる。
pub struct Orchestrator {
    queue: Arc<BoundedBlockingQueue<String>>,
    processor: Arc<dyn ItemProcessor>,
    reporter: Arc<dyn PipelineReporter>,
    signals: Arc<RunSignals>,
    shared: Arc<SharedRun>,
    producers: Vec<PendingProducer>,
    consumers: Vec<PendingConsumer>,
    producer_count: usize,
    consumer_count: usize,
    stats: Option<RunStatistics>,
}

impl Orchestrator {
    /// 指定容量のキューを持つオーケストレーターを作成
    pub fn new(capacity: usize) -> PipelineResult<Self> {
        Ok(Self {
            queue: Arc::new(BoundedBlockingQueue::new(capacity)?),
            processor: Arc::new(LineTransform::Identity),
            reporter: Arc::new(NoOpReporter::new()),
            signals: Arc::new(RunSignals::new()),
            shared: Arc::new(SharedRun::new()),
            producers: Vec::new(),
            consumers: Vec::new(),
            producer_count: 0,
            consumer_count: 0,
            stats: None,
        })
    }

    /// 設定から作成。進捗報告が有効ならコンソール出力を使う
    pub fn from_config<C: PipelineConfig>(config: &C) -> PipelineResult<Self> {
        let orchestrator = Self::new(config.capacity())?.with_processor(config.transform());
        Ok(if config.enable_progress_reporting() {
            orchestrator.with_reporter(ConsoleReporter::new())
        } else {
            orchestrator
        })
    }

    pub fn with_processor<P>(mut self, processor: P) -> Self
    where
        P: ItemProcessor + 'static,
    {
        self.processor = Arc::new(processor);
        self
    }

    pub fn with_reporter<R>(mut self, reporter: R) -> Self
    where
        R: PipelineReporter + 'static,
    {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Producerを登録。名前省略時は `Producer-N`
    pub fn add_producer<S>(&mut self, source: S, name: Option<&str>) -> PipelineResult<String>
    where
        S: LineSource + 'static,
    {
        self.ensure_idle("add_producer")?;
        self.producer_count += 1;
        let name = name.map_or_else(|| format!("Producer-{}", self.producer_count), str::to_string);
        let progress = self.register(&name, WorkerRole::Producer, source.describe());
        self.producers.push(PendingProducer {
            progress,
            source: Box::new(source),
        });
        Ok(name)
    }

    /// Consumerを登録。名前省略時は `Consumer-N`
    pub fn add_consumer<K>(&mut self, sink: K, name: Option<&str>) -> PipelineResult<String>
    where
        K: LineSink + 'static,
    {
        self.ensure_idle("add_consumer")?;
        self.consumer_count += 1;
        let name = name.map_or_else(|| format!("Consumer-{}", self.consumer_count), str::to_string);
        let progress = self.register(&name, WorkerRole::Consumer, sink.describe());
        self.consumers.push(PendingConsumer {
            progress,
            sink: Box::new(sink),
        });
        Ok(name)
    }

    /// パイプラインを実行し、全ワーカーの終了まで待機する
    ///
    /// 1. 全Consumer、続いて全Producerを起動
    /// 2. 全Producerの合流後にキューを閉じる（終了シグナル）
    /// 3. 全Consumerの合流後に統計を確定
    pub fn run(&mut self) -> PipelineResult<RunStatistics> {
        self.ensure_idle("run")?;
        if self.consumers.is_empty() {
            self.shared.set_state(OrchestratorState::Failed);
            return Err(PipelineError::NoConsumers);
        }

        let started = Instant::now();
        *self.shared.started.lock() = Some((started, Utc::now()));
        self.shared.set_state(OrchestratorState::Running);
        info!(
            producers = self.producer_count,
            consumers = self.consumer_count,
            capacity = self.capacity(),
            "pipeline started"
        );
        self.reporter
            .report_started(self.producer_count, self.consumer_count, self.capacity());
        self.signals.set_active_consumers(self.consumers.len());

        // Consumerを先に起動し、Producerが満杯で待たされないようにする
        let mut consumer_handles: Vec<RunningWorker> = Vec::with_capacity(self.consumers.len());
        for pending in std::mem::take(&mut self.consumers) {
            let ctx = self.context(&pending.progress);
            match spawn_consumer(pending.sink, Arc::clone(&self.processor), ctx) {
                Ok(handle) => consumer_handles.push((pending.progress, handle)),
                Err(source) => {
                    return Err(self.abort(pending.progress.name(), source, Vec::new(), consumer_handles))
                }
            }
        }

        let mut producer_handles: Vec<RunningWorker> = Vec::with_capacity(self.producers.len());
        for pending in std::mem::take(&mut self.producers) {
            let ctx = self.context(&pending.progress);
            match spawn_producer(pending.source, ctx) {
                Ok(handle) => producer_handles.push((pending.progress, handle)),
                Err(source) => {
                    return Err(self.abort(
                        pending.progress.name(),
                        source,
                        producer_handles,
                        consumer_handles,
                    ))
                }
            }
        }

        // 全Producerの合流（バリア）
        let mut records: Vec<WorkerRecord> = producer_handles
            .into_iter()
            .map(|(progress, handle)| self.join_worker(&progress, handle))
            .collect();

        self.signals.mark_producers_finished();
        self.shared.set_state(OrchestratorState::Draining);
        self.queue.close();

        records.extend(
            consumer_handles
                .into_iter()
                .map(|(progress, handle)| self.join_worker(&progress, handle)),
        );

        let stats = self.finalize(OrchestratorState::Completed, records);
        info!(
            produced = stats.total_produced,
            consumed = stats.total_consumed,
            failed = stats.total_failed,
            errors = stats.errors.len(),
            elapsed_ms = stats.elapsed_ms,
            "pipeline completed"
        );
        self.reporter.report_completed(&stats);
        Ok(stats)
    }

    /// 実行統計を取得
    ///
    /// 完了後は確定値を返し、何度呼んでも同じ結果になる。
    /// 完了前は実行中カウンターからの参考値でエラー一覧は含まない。
    pub fn get_stats(&self) -> RunStatistics {
        match &self.stats {
            Some(stats) => stats.clone(),
            None => self.shared.snapshot(&self.queue),
        }
    }

    pub fn state(&self) -> OrchestratorState {
        self.shared.state()
    }

    pub fn queue(&self) -> &Arc<BoundedBlockingQueue<String>> {
        &self.queue
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn producer_count(&self) -> usize {
        self.producer_count
    }

    pub fn consumer_count(&self) -> usize {
        self.consumer_count
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            signals: Arc::clone(&self.signals),
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn monitor(&self) -> RunMonitor {
        RunMonitor {
            shared: Arc::clone(&self.shared),
            queue: Arc::clone(&self.queue),
        }
    }

    fn ensure_idle(&self, operation: &str) -> PipelineResult<()> {
        match self.state() {
            OrchestratorState::Idle => Ok(()),
            state => Err(PipelineError::invalid_state(operation, state)),
        }
    }

    fn register(&self, name: &str, role: WorkerRole, resource: String) -> Arc<WorkerProgress> {
        let progress = Arc::new(WorkerProgress::new(name, role, resource));
        self.shared.workers.lock().push(Arc::clone(&progress));
        progress
    }

    fn context(&self, progress: &Arc<WorkerProgress>) -> WorkerContext {
        WorkerContext {
            queue: Arc::clone(&self.queue),
            reporter: Arc::clone(&self.reporter),
            signals: Arc::clone(&self.signals),
            progress: Arc::clone(progress),
        }
    }

    /// ワーカーと合流し、パニックしていた場合は進捗から記録を組み立てる
    fn join_worker(&self, progress: &WorkerProgress, handle: JoinHandle<WorkerRecord>) -> WorkerRecord {
        match handle.join() {
            Ok(record) => record,
            Err(payload) => {
                let error = PipelineError::worker_panicked(progress.name(), panic_message(payload.as_ref()));
                error!(worker = progress.name(), "{error}");
                self.reporter.report_error(progress.name(), &error);
                progress.set_status(WorkerStatus::Failed);
                let mut record = progress.snapshot();
                record.record_error(&error);
                record
            }
        }
    }

    /// スレッド起動失敗時に起動済みワーカーを停止・合流させる
    fn abort(
        &mut self,
        worker: &str,
        source: std::io::Error,
        producers: Vec<RunningWorker>,
        consumers: Vec<RunningWorker>,
    ) -> PipelineError {
        error!(worker, "failed to spawn worker thread: {source}");
        self.signals.cancel();
        self.queue.close();

        let records = producers
            .into_iter()
            .chain(consumers)
            .map(|(progress, handle)| self.join_worker(&progress, handle))
            .collect();
        self.finalize(OrchestratorState::Failed, records);

        PipelineError::ThreadSpawn {
            worker: worker.to_string(),
            source,
        }
    }

    fn finalize(&mut self, state: OrchestratorState, records: Vec<WorkerRecord>) -> RunStatistics {
        let mut stats =
            RunStatistics::from_workers(state, self.capacity(), self.queue.size(), records);
        if let Some((instant, started_at)) = *self.shared.started.lock() {
            stats.elapsed_ms = instant.elapsed().as_millis() as u64;
            stats.started_at = Some(started_at);
        }
        stats.finished_at = Some(Utc::now());

        self.shared.set_state(state);
        self.stats = Some(stats.clone());
        stats
    }
}
