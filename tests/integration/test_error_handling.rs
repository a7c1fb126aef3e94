// エラーハンドリングの統合テスト
use crate::fixtures::*;
use anyhow::Result;
use bounded_pipeline::{
    core::ErrorSeverity, run_files, run_pipeline, FileLineSink, FileLineSource, FnProcessor,
    MemoryLineSink, MemoryLineSource, Orchestrator, OrchestratorState, PipelineError,
    PipelineSettings, WorkerStatus,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_input_file_is_recorded() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let good = create_input_file(temp_dir.path(), "good.txt", FRUITS_2)?;
    let missing = temp_dir.path().join("missing.txt");
    let output = temp_dir.path().join("output.txt");

    let mut orchestrator = Orchestrator::new(5)?;
    orchestrator.add_producer(FileLineSource::new(&missing), None)?;
    orchestrator.add_producer(FileLineSource::new(&good), None)?;
    orchestrator.add_consumer(FileLineSink::new(&output), None)?;

    let (_, stats) = run_pipeline(orchestrator).await?;

    assert_eq!(stats.state, OrchestratorState::Completed);
    assert_eq!(stats.total_produced, 5);
    assert_eq!(stats.total_consumed, 5);
    let errors: Vec<_> = stats.errors_of_kind("source_unavailable").collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].worker, "Producer-1");
    assert!(errors[0].message.contains("missing.txt"));
    assert_eq!(read_lines(&output), FRUITS_2);
    Ok(())
}

#[tokio::test]
async fn test_read_error_keeps_items_before_failure() -> Result<()> {
    let sink = MemoryLineSink::new();
    let mut orchestrator = Orchestrator::new(2)?;
    orchestrator.add_producer(flaky_source("flaky.txt", vec!["one", "two"]), None)?;
    orchestrator.add_consumer(sink.clone(), None)?;

    let (_, stats) = run_pipeline(orchestrator).await?;

    let producer = stats.worker("Producer-1").expect("producer record");
    assert_eq!(producer.status, WorkerStatus::Failed);
    assert_eq!(producer.items_produced, 2);
    assert_eq!(stats.errors_of_kind("read_error").count(), 1);
    assert_eq!(sink.lines(), vec!["one", "two"]);
    Ok(())
}

#[tokio::test]
async fn test_unavailable_sink_does_not_deadlock_producers() -> Result<()> {
    let healthy = MemoryLineSink::new();
    let mut orchestrator = Orchestrator::new(1)?;
    let lines: Vec<String> = (0..50).map(|i| format!("item-{i}")).collect();
    orchestrator.add_producer(MemoryLineSource::new(lines), None)?;
    orchestrator.add_consumer(unavailable_sink("/forbidden/out.txt"), None)?;
    orchestrator.add_consumer(healthy.clone(), None)?;

    let (_, stats) = tokio::time::timeout(Duration::from_secs(30), run_pipeline(orchestrator))
        .await
        .expect("pipeline should not deadlock")?;

    assert_eq!(stats.total_produced, 50);
    assert_eq!(stats.total_consumed, 50);
    let broken = stats.worker("Consumer-1").expect("consumer record");
    assert_eq!(broken.status, WorkerStatus::Failed);
    assert_eq!(broken.items_failed, broken.items_consumed);
    assert_eq!(stats.total_failed, broken.items_failed);
    assert_eq!(healthy.lines().len(), 50 - broken.items_consumed);
    assert_eq!(stats.errors_of_kind("sink_unavailable").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_processing_errors_are_per_item() -> Result<()> {
    let sink = MemoryLineSink::new();
    let mut orchestrator = Orchestrator::new(3)?.with_processor(FnProcessor::new(|item: &str| {
        if item.starts_with('#') {
            Err(PipelineError::processing(item, "comment lines are rejected"))
        } else {
            Ok(item.to_uppercase())
        }
    }));
    orchestrator.add_producer(MemoryLineSource::new(["a", "#skip", "b", "#also"]), None)?;
    orchestrator.add_consumer(sink.clone(), None)?;

    let (_, stats) = run_pipeline(orchestrator).await?;

    assert_eq!(stats.total_consumed, 4);
    assert_eq!(stats.total_failed, 2);
    assert_eq!(stats.errors_of_kind("processing_error").count(), 2);
    assert_eq!(sink.lines(), vec!["A", "B"]);
    Ok(())
}

#[tokio::test]
async fn test_configuration_errors_before_start() -> Result<()> {
    assert!(matches!(
        Orchestrator::new(0),
        Err(PipelineError::CapacityConfig { capacity: 0 })
    ));

    let error = run_files(vec![], vec![], &PipelineSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(error, PipelineError::NoConsumers));
    assert_eq!(error.severity(), ErrorSeverity::High);
    assert!(!error.is_recoverable());
    Ok(())
}

#[tokio::test]
async fn test_invalid_settings_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("settings.json");
    fs::write(&path, r#"{"capacity": 2, "unknown_field": true}"#)?;

    let error = PipelineSettings::from_file(&path).unwrap_err();

    assert!(matches!(error, PipelineError::Configuration { .. }));
    Ok(())
}

#[test]
fn test_cancel_from_another_thread() -> Result<()> {
    let mut orchestrator = Orchestrator::new(1)?;
    let lines: Vec<String> = (0..100_000).map(|i| i.to_string()).collect();
    orchestrator.add_producer(MemoryLineSource::new(lines), None)?;

    // 書き出しを遅くしてProducerが満杯で待つ状態にする
    let slow = FnProcessor::new(|item: &str| {
        std::thread::sleep(Duration::from_millis(1));
        Ok(item.to_string())
    });
    let mut orchestrator = orchestrator.with_processor(slow);
    orchestrator.add_consumer(MemoryLineSink::new(), None)?;

    let cancel = orchestrator.cancel_handle();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(50));
        cancel.cancel();
    });

    let stats = orchestrator.run()?;
    canceller.join().expect("canceller thread");

    assert_eq!(stats.state, OrchestratorState::Completed);
    assert!(stats.total_produced < 100_000);
    assert_eq!(stats.total_consumed, stats.total_produced);
    assert_eq!(
        stats.worker("Producer-1").map(|w| w.status),
        Some(WorkerStatus::Cancelled)
    );
    assert!(stats.errors_of_kind("shutdown_protocol_violation").next().is_none());
    Ok(())
}
