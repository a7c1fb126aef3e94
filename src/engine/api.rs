// 高レベル公開API
// ブロッキングなOrchestratorをtokioランタイムから利用するための関数

use super::Orchestrator;
use crate::{
    core::{PipelineError, PipelineResult, RunStatistics},
    services::{ensure_distinct_outputs, FileLineSink, FileLineSource, PipelineSettings},
};
use std::path::PathBuf;

/// 設定済みOrchestratorをブロッキングスレッドプールで実行
///
/// 実行後のOrchestratorも返すため、呼び出し元は `get_stats` 等を続けて使える。
pub async fn run_pipeline(
    mut orchestrator: Orchestrator,
) -> PipelineResult<(Orchestrator, RunStatistics)> {
    tokio::task::spawn_blocking(move || -> PipelineResult<(Orchestrator, RunStatistics)> {
        let stats = orchestrator.run()?;
        Ok((orchestrator, stats))
    })
    .await
    .map_err(|e| PipelineError::worker_panicked("orchestrator", e.to_string()))?
}

/// 入力ファイルごとにProducer、出力ファイルごとにConsumerを割り当てて実行
pub async fn run_files(
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
    settings: &PipelineSettings,
) -> PipelineResult<RunStatistics> {
    settings.validate()?;
    ensure_distinct_outputs(&outputs)?;
    let mut orchestrator = Orchestrator::from_config(&settings.to_config())?;

    for input in inputs {
        orchestrator.add_producer(FileLineSource::new(input), None)?;
    }
    for output in outputs {
        orchestrator.add_consumer(FileLineSink::new(output), None)?;
    }

    let (_, stats) = run_pipeline(orchestrator).await?;
    Ok(stats)
}
