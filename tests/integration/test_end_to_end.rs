// エンドツーエンドの統合テスト
use crate::fixtures::*;
use anyhow::Result;
use bounded_pipeline::{
    run_files, run_pipeline, FileLineSink, FileLineSource, LineTransform, MemoryLineSink,
    MemoryLineSource, Orchestrator, OrchestratorState, PipelineSettings, WorkerStatus,
};
use std::collections::HashSet;
use tempfile::TempDir;

fn quiet_settings(capacity: usize) -> PipelineSettings {
    PipelineSettings {
        capacity: Some(capacity),
        transform: Some(LineTransform::Uppercase),
        report_progress: Some(false),
        ..PipelineSettings::default()
    }
}

#[tokio::test]
async fn test_two_files_two_consumers() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input1 = create_input_file(temp_dir.path(), "input1.txt", FRUITS_1)?;
    let input2 = create_input_file(temp_dir.path(), "input2.txt", FRUITS_2)?;
    let outputs = vec![
        temp_dir.path().join("output1.txt"),
        temp_dir.path().join("output2.txt"),
    ];

    let stats = run_files(vec![input1, input2], outputs.clone(), &quiet_settings(5)).await?;

    assert_eq!(stats.state, OrchestratorState::Completed);
    assert_eq!(stats.producers, 2);
    assert_eq!(stats.consumers, 2);
    assert_eq!(stats.total_produced, 10);
    assert_eq!(stats.total_consumed, 10);
    assert_eq!(stats.queue_size, 0);
    assert!(stats.errors.is_empty());
    assert_eq!(read_all_sorted(&outputs), sorted_upper(&[FRUITS_1, FRUITS_2]));
    Ok(())
}

#[tokio::test]
async fn test_single_consumer_preserves_source_order() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = create_input_file(temp_dir.path(), "input.txt", FRUITS_1)?;
    let output = temp_dir.path().join("output.txt");

    let mut orchestrator = Orchestrator::new(2)?;
    orchestrator.add_producer(FileLineSource::new(&input), None)?;
    orchestrator.add_consumer(FileLineSink::new(&output), None)?;

    let (orchestrator, stats) = run_pipeline(orchestrator).await?;

    assert_eq!(read_lines(&output), FRUITS_1);
    assert_eq!(orchestrator.get_stats(), stats);
    Ok(())
}

#[tokio::test]
async fn test_blank_lines_and_whitespace_are_normalized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = create_input_file(
        temp_dir.path(),
        "messy.txt",
        &["  apple  ", "", "\tbanana", "   ", "cherry\r"],
    )?;
    let output = temp_dir.path().join("clean.txt");

    let stats = run_files(vec![input], vec![output.clone()], &quiet_settings(3)).await?;

    assert_eq!(stats.total_produced, 3);
    assert_eq!(read_lines(&output), vec!["APPLE", "BANANA", "CHERRY"]);
    Ok(())
}

#[tokio::test]
async fn test_many_producers_many_consumers_small_capacity() -> Result<()> {
    let mut orchestrator = Orchestrator::new(1)?;
    let mut expected = HashSet::new();
    for p in 0..6 {
        let lines: Vec<String> = (0..200).map(|i| format!("p{p}-item{i}")).collect();
        expected.extend(lines.iter().cloned());
        orchestrator.add_producer(MemoryLineSource::new(lines), None)?;
    }
    let sinks: Vec<MemoryLineSink> = (0..4).map(|_| MemoryLineSink::new()).collect();
    for sink in &sinks {
        orchestrator.add_consumer(sink.clone(), None)?;
    }

    let (_, stats) = run_pipeline(orchestrator).await?;

    let written: Vec<String> = sinks.iter().flat_map(|s| s.lines()).collect();
    assert_eq!(written.len(), 1200);
    assert_eq!(written.into_iter().collect::<HashSet<_>>(), expected);
    assert_eq!(stats.total_produced, stats.total_consumed);
    assert!(stats
        .workers
        .iter()
        .all(|w| w.status == WorkerStatus::Succeeded));
    Ok(())
}

#[tokio::test]
async fn test_stats_serialize_to_json() -> Result<()> {
    let mut orchestrator = Orchestrator::new(4)?;
    orchestrator.add_producer(MemoryLineSource::new(["a", "b"]), Some("reader"))?;
    orchestrator.add_consumer(MemoryLineSink::new(), Some("writer"))?;

    let (_, stats) = run_pipeline(orchestrator).await?;
    let json = serde_json::to_value(&stats)?;

    assert_eq!(json["state"], "Completed");
    assert_eq!(json["total_produced"], 2);
    assert_eq!(json["workers"][0]["name"], "reader");
    assert_eq!(json["workers"][0]["role"], "producer");
    assert_eq!(json["workers"][1]["status"], "succeeded");
    assert!(json["started_at"].is_string());
    Ok(())
}
