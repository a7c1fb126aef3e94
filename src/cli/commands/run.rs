use crate::{
    core::{LineTransform, PipelineConfig, RunStatistics},
    engine::{run_pipeline, Orchestrator},
    services::{ConsoleReporter, FileLineSink, FileLineSource, PipelineSettings, StdoutLineSink},
};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Configuration struct for run command to reduce argument count
#[derive(Debug, Default)]
pub struct RunConfig {
    pub inputs: Vec<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub outputs: Vec<PathBuf>,
    pub stdout_consumers: Option<usize>,
    pub capacity: Option<usize>,
    pub transform: Option<LineTransform>,
    pub config_file: Option<PathBuf>,
    pub stats_output: Option<PathBuf>,
    pub quiet: bool,
}

/// Execute run command
pub async fn execute_run(config: RunConfig) -> Result<RunStatistics> {
    let settings = resolve_settings(&config)?;
    let pipeline_config = settings.to_config();

    let stdout_consumers = config.stdout_consumers.unwrap_or(if settings.outputs.is_empty() {
        num_cpus::get().max(1)
    } else {
        0
    });

    if settings.inputs.is_empty() {
        warn!("no input files given, consumers will receive end-of-stream immediately");
    }

    let reporter = if pipeline_config.enable_progress_reporting() {
        ConsoleReporter::new()
    } else {
        ConsoleReporter::quiet()
    };
    let mut orchestrator = Orchestrator::new(pipeline_config.capacity())?
        .with_processor(pipeline_config.transform())
        .with_reporter(reporter);

    for input in &settings.inputs {
        orchestrator.add_producer(FileLineSource::new(input), None)?;
    }
    for output in &settings.outputs {
        orchestrator.add_consumer(FileLineSink::new(output), None)?;
    }
    for _ in 0..stdout_consumers {
        orchestrator.add_consumer(StdoutLineSink::new(), None)?;
    }

    info!(
        inputs = settings.inputs.len(),
        outputs = settings.outputs.len(),
        stdout_consumers,
        capacity = pipeline_config.capacity(),
        transform = ?pipeline_config.transform(),
        "pipeline configured"
    );

    // Ctrl-C で新規投入を止め、バッファ済みのアイテムは処理させる
    let cancel = orchestrator.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let result = run_pipeline(orchestrator).await;
    ctrl_c.abort();
    let (_, stats) = result.context("パイプラインの実行に失敗しました")?;

    if let Some(path) = &config.stats_output {
        write_stats(&stats, path)?;
        eprintln!("📄 統計を {} に保存しました", path.display());
    }

    if !stats.errors.is_empty() {
        eprintln!("⚠️  {}件のエラーが発生しました", stats.errors.len());
    }

    Ok(stats)
}

/// 設定ファイルとCLI引数を統合する（CLI引数が優先）
pub fn resolve_settings(config: &RunConfig) -> Result<PipelineSettings> {
    let file_settings = match &config.config_file {
        Some(path) => PipelineSettings::from_file(path)
            .with_context(|| format!("設定ファイルの読み込みに失敗しました: {}", path.display()))?,
        None => PipelineSettings::default(),
    };

    let mut inputs = config.inputs.clone();
    if let Some(dir) = &config.input_dir {
        inputs.extend(collect_input_files(dir)?);
    }

    let settings = file_settings.merge(PipelineSettings {
        capacity: config.capacity,
        transform: config.transform,
        report_progress: config.quiet.then_some(false),
        inputs,
        outputs: config.outputs.clone(),
    });
    settings.validate()?;
    Ok(settings)
}

/// ディレクトリ配下の通常ファイルをファイル名順に列挙
pub fn collect_input_files(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        anyhow::bail!("Input directory does not exist: {}", directory.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// 統計をJSONで書き出す
pub fn write_stats(stats: &RunStatistics, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    fs::write(path, json)
        .with_context(|| format!("統計ファイルを書き込めません: {}", path.display()))
}
