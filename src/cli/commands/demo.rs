use crate::{
    core::{LineTransform, RunStatistics},
    engine::{run_pipeline, Orchestrator},
    services::{ConsoleReporter, FileLineSink, FileLineSource},
};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const SAMPLE_INPUT_1: &[&str] = &["apple", "banana", "cherry", "date", "elderberry"];
const SAMPLE_INPUT_2: &[&str] = &["fig", "grape", "honeydew", "kiwi", "lemon"];

/// Execute demo command
pub async fn execute_demo(directory: &Path, capacity: usize) -> Result<RunStatistics> {
    fs::create_dir_all(directory)
        .with_context(|| format!("Failed to create demo directory: {}", directory.display()))?;

    let input1 = directory.join("input1.txt");
    let input2 = directory.join("input2.txt");
    let output1 = directory.join("output1.txt");
    let output2 = directory.join("output2.txt");
    write_sample(&input1, SAMPLE_INPUT_1)?;
    write_sample(&input2, SAMPLE_INPUT_2)?;

    println!("🍎 Producer-Consumer デモ");
    println!("   - 入力: {}, {}", input1.display(), input2.display());
    println!("   - 出力: {}, {}", output1.display(), output2.display());
    println!("   - キュー容量: {capacity}");

    let mut orchestrator = Orchestrator::new(capacity)?
        .with_processor(LineTransform::Uppercase)
        .with_reporter(ConsoleReporter::new());
    orchestrator.add_producer(FileLineSource::new(&input1), Some("Producer-1"))?;
    orchestrator.add_producer(FileLineSource::new(&input2), Some("Producer-2"))?;
    orchestrator.add_consumer(FileLineSink::new(&output1), Some("Consumer-1"))?;
    orchestrator.add_consumer(FileLineSink::new(&output2), Some("Consumer-2"))?;

    let (orchestrator, _) = run_pipeline(orchestrator).await?;
    let stats = orchestrator.get_stats();

    println!("\n📊 統計:");
    println!("   - 生成数: {}", stats.total_produced);
    println!("   - 消費数: {}", stats.total_consumed);
    println!("   - キュー残数: {}", stats.queue_size);
    println!("   - Producer数: {}", stats.producers);
    println!("   - Consumer数: {}", stats.consumers);

    for output in [&output1, &output2] {
        let content = fs::read_to_string(output)
            .with_context(|| format!("Failed to read output: {}", output.display()))?;
        println!("\n📄 {}:", output.display());
        for line in content.lines() {
            println!("   {line}");
        }
    }

    Ok(stats)
}

fn write_sample(path: &Path, lines: &[&str]) -> Result<()> {
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(path, content).with_context(|| format!("Failed to write sample: {}", path.display()))
}
