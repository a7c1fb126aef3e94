// Consumer - キューからアイテムを取り出して処理・書き出し

use super::worker::WorkerContext;
use crate::{
    core::{ItemProcessor, LineSink, PipelineError, WorkerRecord, WorkerRole, WorkerStatus},
    queue::QueueError,
};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Consumer終了時にアクティブ数を減らし、最後の1つならキューを閉じる
///
/// パニックで抜けた場合も実行されるため、Consumerが全滅した状態で
/// Producerが満杯のキューを待ち続けることはない。
struct ExitGuard<'a> {
    ctx: &'a WorkerContext,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        if self.ctx.signals.consumer_exited() {
            self.ctx.queue.close();
        }
    }
}

/// 終了シグナル（キューのクローズ）を受け取るまでアイテムを処理する
///
/// 1件の失敗でループは止めない。シンクが開けなかった場合も自分の分は
/// 取り出し続け、失敗として数える。
pub fn run_consumer<K>(sink: &mut K, processor: &dyn ItemProcessor, ctx: &WorkerContext) -> WorkerRecord
where
    K: LineSink + ?Sized,
{
    let _guard = ExitGuard { ctx };
    let mut record = WorkerRecord::new(ctx.name(), WorkerRole::Consumer, sink.describe());
    ctx.progress.set_status(WorkerStatus::Running);

    let sink_ready = match sink.open() {
        Ok(()) => true,
        Err(error) => {
            ctx.fail(&mut record, &error);
            false
        }
    };
    debug!(worker = ctx.name(), sink = %record.resource, sink_ready, "consumer started");

    loop {
        let item = match ctx.queue.get() {
            Ok(item) => item,
            Err(QueueError::Closed) => {
                if !ctx.signals.producers_finished() && !ctx.signals.is_cancelled() {
                    let violation = PipelineError::shutdown_violation(
                        ctx.name(),
                        "全Producerの終了前に終了シグナルを受信しました",
                    );
                    ctx.fail(&mut record, &violation);
                }
                break;
            }
            Err(other) => {
                warn!(worker = ctx.name(), "unexpected queue error: {other}");
                break;
            }
        };

        record.items_consumed += 1;
        ctx.progress.add_consumed();

        if sink_ready {
            match processor
                .process(&item)
                .and_then(|output| sink.write_line(&output).map(|()| output))
            {
                Ok(output) => {
                    ctx.reporter.report_consumed(ctx.name(), &item, &output);
                    debug!(worker = ctx.name(), item = %item, output = %output, "consumed");
                }
                Err(error) => {
                    record.items_failed += 1;
                    ctx.progress.add_failed();
                    ctx.fail(&mut record, &error);
                }
            }
        } else {
            record.items_failed += 1;
            ctx.progress.add_failed();
        }

        if let Err(error) = ctx.queue.task_done() {
            warn!(worker = ctx.name(), "task_done failed: {error}");
        }
    }

    if sink_ready {
        if let Err(error) = sink.flush() {
            ctx.fail(&mut record, &error);
        }
    }

    let status = if !sink_ready {
        WorkerStatus::Failed
    } else if ctx.signals.is_cancelled() {
        WorkerStatus::Cancelled
    } else {
        WorkerStatus::Succeeded
    };

    info!(
        worker = ctx.name(),
        consumed = record.items_consumed,
        failed = record.items_failed,
        ?status,
        "consumer finished"
    );
    ctx.finish(record, status)
}

/// Consumerを専用スレッドで起動
pub fn spawn_consumer(
    mut sink: Box<dyn LineSink>,
    processor: Arc<dyn ItemProcessor>,
    ctx: WorkerContext,
) -> std::io::Result<JoinHandle<WorkerRecord>> {
    thread::Builder::new()
        .name(ctx.name().to_string())
        .spawn(move || run_consumer(sink.as_mut(), processor.as_ref(), &ctx))
}
