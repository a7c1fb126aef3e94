// パイプラインのトレイト定義
// ワーカーが依存する全ての抽象化インターフェースを定義

use super::error::{PipelineError, PipelineResult};
use super::types::{LineTransform, RunStatistics};
use mockall::automock;

/// Producerが読み込むアイテムの供給元
///
/// `open` で資源を確保し、`next_line` が `Ok(None)` を返すまで行を供給する。
/// 供給元はそれを開いたワーカースレッドが排他的に所有する。
#[automock]
pub trait LineSource: Send {
    /// ログ・統計用の説明（ファイルパス等）
    fn describe(&self) -> String;

    /// 資源を開く。失敗時は `SourceUnavailable`
    fn open(&mut self) -> PipelineResult<()>;

    /// 次の行を取得。読み込み途中の失敗は `ReadError`
    fn next_line(&mut self) -> PipelineResult<Option<String>>;
}

impl LineSource for Box<dyn LineSource> {
    fn describe(&self) -> String {
        self.as_ref().describe()
    }

    fn open(&mut self) -> PipelineResult<()> {
        self.as_mut().open()
    }

    fn next_line(&mut self) -> PipelineResult<Option<String>> {
        self.as_mut().next_line()
    }
}

/// Consumerが書き出す先
#[automock]
pub trait LineSink: Send {
    fn describe(&self) -> String;

    /// 書き出し先を開く。失敗時は `SinkUnavailable`
    fn open(&mut self) -> PipelineResult<()>;

    /// 1レコードを書き出す。失敗時は `WriteError`
    fn write_line(&mut self, line: &str) -> PipelineResult<()>;

    fn flush(&mut self) -> PipelineResult<()>;
}

impl LineSink for Box<dyn LineSink> {
    fn describe(&self) -> String {
        self.as_ref().describe()
    }

    fn open(&mut self) -> PipelineResult<()> {
        self.as_mut().open()
    }

    fn write_line(&mut self, line: &str) -> PipelineResult<()> {
        self.as_mut().write_line(line)
    }

    fn flush(&mut self) -> PipelineResult<()> {
        self.as_mut().flush()
    }
}

/// Consumerが各アイテムに適用する処理
#[automock]
pub trait ItemProcessor: Send + Sync {
    fn process(&self, item: &str) -> PipelineResult<String>;
}

/// 進捗報告の抽象化トレイト
///
/// 全ワーカースレッドから共有されるため `Sync` が必要。
#[automock]
pub trait PipelineReporter: Send + Sync {
    /// 実行開始時の報告
    fn report_started(&self, producers: usize, consumers: usize, capacity: usize);

    /// Producerがアイテムをキューに投入した
    fn report_produced(&self, worker: &str, item: &str);

    /// Consumerがアイテムを処理した
    fn report_consumed(&self, worker: &str, item: &str, output: &str);

    /// ワーカーでエラーが記録された
    fn report_error(&self, worker: &str, error: &PipelineError);

    /// 実行完了時の報告
    fn report_completed(&self, stats: &RunStatistics);
}

impl PipelineReporter for Box<dyn PipelineReporter> {
    fn report_started(&self, producers: usize, consumers: usize, capacity: usize) {
        self.as_ref().report_started(producers, consumers, capacity)
    }

    fn report_produced(&self, worker: &str, item: &str) {
        self.as_ref().report_produced(worker, item)
    }

    fn report_consumed(&self, worker: &str, item: &str, output: &str) {
        self.as_ref().report_consumed(worker, item, output)
    }

    fn report_error(&self, worker: &str, error: &PipelineError) {
        self.as_ref().report_error(worker, error)
    }

    fn report_completed(&self, stats: &RunStatistics) {
        self.as_ref().report_completed(stats)
    }
}

/// パイプライン設定を抽象化するトレイト
#[automock]
pub trait PipelineConfig: Send + Sync {
    /// キュー容量
    fn capacity(&self) -> usize;

    /// Consumerが適用する変換
    fn transform(&self) -> LineTransform;

    /// 進捗報告を有効にするかどうか
    fn enable_progress_reporting(&self) -> bool;
}
