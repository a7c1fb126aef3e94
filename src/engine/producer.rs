// Producer - ソースの行をキューへ配信

use super::worker::WorkerContext;
use crate::core::{LineSource, PipelineError, WorkerRecord, WorkerRole, WorkerStatus};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// ソースを読み切るまで行をキューに投入する
///
/// 終了シグナルは投入しない（Consumer数に依存するためオーケストレーターの責務）。
/// 空行は読み飛ばし、前後の空白は取り除く。
pub fn run_producer<S>(source: &mut S, ctx: &WorkerContext) -> WorkerRecord
where
    S: LineSource + ?Sized,
{
    let mut record = WorkerRecord::new(ctx.name(), WorkerRole::Producer, source.describe());
    ctx.progress.set_status(WorkerStatus::Running);

    if let Err(error) = source.open() {
        ctx.fail(&mut record, &error);
        return ctx.finish(record, WorkerStatus::Failed);
    }
    debug!(worker = ctx.name(), source = %record.resource, "producer started");

    let status = loop {
        // 協調的な停止要求
        if ctx.signals.is_cancelled() {
            break WorkerStatus::Cancelled;
        }

        let line = match source.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => break WorkerStatus::Succeeded,
            Err(error) => {
                ctx.fail(&mut record, &error);
                break WorkerStatus::Failed;
            }
        };

        let item = line.trim();
        if item.is_empty() {
            continue;
        }

        // 満杯の間はここでブロックする
        match ctx.queue.put(item.to_string()) {
            Ok(()) => {
                record.items_produced += 1;
                ctx.progress.add_produced();
                ctx.reporter.report_produced(ctx.name(), item);
                debug!(worker = ctx.name(), item, "produced");
            }
            Err(rejected) if ctx.signals.is_cancelled() => {
                let dropped = rejected.into_inner();
                debug!(worker = ctx.name(), item = %dropped, "dropped after cancel");
                break WorkerStatus::Cancelled;
            }
            Err(rejected) => {
                // 全Consumerが先に終了した場合のみ到達する
                let dropped = rejected.into_inner();
                debug!(worker = ctx.name(), item = %dropped, "rejected by closed queue");
                ctx.fail(&mut record, &PipelineError::queue_closed(ctx.name()));
                break WorkerStatus::Failed;
            }
        }
    };

    info!(
        worker = ctx.name(),
        produced = record.items_produced,
        ?status,
        "producer finished"
    );
    ctx.finish(record, status)
}

/// Producerを専用スレッドで起動
pub fn spawn_producer(
    mut source: Box<dyn LineSource>,
    ctx: WorkerContext,
) -> std::io::Result<JoinHandle<WorkerRecord>> {
    thread::Builder::new()
        .name(ctx.name().to_string())
        .spawn(move || run_producer(source.as_mut(), &ctx))
}
