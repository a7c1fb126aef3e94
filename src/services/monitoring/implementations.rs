// 進捗監視の具象実装

use crate::core::{PipelineError, PipelineReporter, RunStatistics};

/// コンソール出力による進捗報告実装
///
/// 標準出力はデータ用のシンクが使うため、報告は全て標準エラーに出す。
#[derive(Debug, Default, Clone)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// エラーと完了報告のみ出力する
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl PipelineReporter for ConsoleReporter {
    fn report_started(&self, producers: usize, consumers: usize, capacity: usize) {
        if !self.quiet {
            eprintln!(
                "🚀 Starting pipeline: {producers} producer(s), {consumers} consumer(s), capacity {capacity}"
            );
        }
    }

    fn report_produced(&self, worker: &str, item: &str) {
        if !self.quiet {
            eprintln!("[{worker}] Produced: {item}");
        }
    }

    fn report_consumed(&self, worker: &str, item: &str, output: &str) {
        if !self.quiet {
            eprintln!("[{worker}] Consumed and processed: {item} -> {output}");
        }
    }

    fn report_error(&self, worker: &str, error: &PipelineError) {
        let mark = if error.is_recoverable() { "⚠️ " } else { "❌" };
        eprintln!("{mark} [{worker}] [{}] {error}", error.severity().as_str());
    }

    fn report_completed(&self, stats: &RunStatistics) {
        eprintln!(
            "✅ Completed! Produced: {}, Consumed: {}, Failed: {}, Errors: {} ({} ms)",
            stats.total_produced,
            stats.total_consumed,
            stats.total_failed,
            stats.errors.len(),
            stats.elapsed_ms
        );
        for worker in stats.workers.iter().filter(|w| w.has_errors()) {
            eprintln!("   {}: {}件のエラー", worker.name, worker.errors.len());
        }
    }
}

/// 何もしない進捗報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpReporter;

impl NoOpReporter {
    pub fn new() -> Self {
        Self
    }
}

impl PipelineReporter for NoOpReporter {
    fn report_started(&self, _producers: usize, _consumers: usize, _capacity: usize) {}

    fn report_produced(&self, _worker: &str, _item: &str) {}

    fn report_consumed(&self, _worker: &str, _item: &str, _output: &str) {}

    fn report_error(&self, _worker: &str, _error: &PipelineError) {}

    fn report_completed(&self, _stats: &RunStatistics) {}
}
