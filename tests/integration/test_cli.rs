// CLI引数解析とコマンド実行の統合テスト
use crate::fixtures::*;
use anyhow::Result;
use bounded_pipeline::{
    cli::{execute_demo, execute_run, Cli, Commands, RunConfig},
    LineTransform, RunStatistics,
};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn test_parse_run_command() {
    let cli = Cli::try_parse_from([
        "bounded_pipeline",
        "--verbose",
        "run",
        "-i",
        "a.txt",
        "--input",
        "b.txt",
        "-o",
        "out.txt",
        "--capacity",
        "3",
        "--transform",
        "reverse",
        "--stats",
        "stats.json",
        "--quiet",
    ])
    .unwrap();

    assert!(cli.verbose);
    match cli.command {
        Commands::Run {
            inputs,
            outputs,
            capacity,
            transform,
            stats,
            quiet,
            stdout_consumers,
            ..
        } => {
            assert_eq!(inputs, vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]);
            assert_eq!(outputs, vec![PathBuf::from("out.txt")]);
            assert_eq!(capacity, Some(3));
            assert_eq!(transform, Some(LineTransform::Reverse));
            assert_eq!(stats, Some(PathBuf::from("stats.json")));
            assert!(quiet);
            assert_eq!(stdout_consumers, None);
        }
        Commands::Demo { .. } => panic!("expected run command"),
    }
}

#[test]
fn test_parse_demo_defaults() {
    let cli = Cli::try_parse_from(["bounded_pipeline", "demo"]).unwrap();

    assert!(!cli.verbose);
    assert!(matches!(
        cli.command,
        Commands::Demo { capacity: 5, ref directory } if directory == &PathBuf::from("demo_output")
    ));
}

#[test]
fn test_parse_rejects_unknown_transform() {
    let result = Cli::try_parse_from(["bounded_pipeline", "run", "--transform", "shout"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_command_with_input_dir_and_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input_dir = temp_dir.path().join("inputs");
    fs::create_dir(&input_dir)?;
    create_input_file(&input_dir, "1.txt", FRUITS_1)?;
    create_input_file(&input_dir, "2.txt", FRUITS_2)?;

    let outputs = vec![temp_dir.path().join("o1.txt"), temp_dir.path().join("o2.txt")];
    let config_path = temp_dir.path().join("settings.json");
    fs::write(
        &config_path,
        serde_json::json!({
            "capacity": 2,
            "transform": "uppercase",
            "report_progress": false,
            "outputs": outputs,
        })
        .to_string(),
    )?;
    let stats_path = temp_dir.path().join("stats.json");

    let stats = execute_run(RunConfig {
        input_dir: Some(input_dir),
        config_file: Some(config_path),
        stats_output: Some(stats_path.clone()),
        ..RunConfig::default()
    })
    .await?;

    assert_eq!(stats.capacity, 2);
    assert_eq!(stats.producers, 2);
    assert_eq!(stats.consumers, 2);
    assert_eq!(stats.total_consumed, 10);
    assert_eq!(read_all_sorted(&outputs), sorted_upper(&[FRUITS_1, FRUITS_2]));

    let saved: RunStatistics = serde_json::from_str(&fs::read_to_string(stats_path)?)?;
    assert_eq!(saved.total_produced, 10);
    Ok(())
}

#[tokio::test]
async fn test_run_command_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();

    let result = execute_run(RunConfig {
        config_file: Some(temp_dir.path().join("absent.json")),
        outputs: vec![temp_dir.path().join("out.txt")],
        ..RunConfig::default()
    })
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_demo_command() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let stats = execute_demo(&temp_dir.path().join("demo"), 5).await?;

    assert_eq!(stats.total_produced, 10);
    assert_eq!(stats.total_consumed, 10);
    assert!(temp_dir.path().join("demo/input1.txt").exists());
    assert!(temp_dir.path().join("demo/output2.txt").exists());
    Ok(())
}

#[test]
fn test_stdout_carries_only_transformed_lines() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = create_input_file(temp_dir.path(), "input.txt", FRUITS_1)?;

    let output = Command::new(env!("CARGO_BIN_EXE_bounded_pipeline"))
        .args(["--verbose", "run", "--stdout-consumers", "1", "-t", "uppercase", "-i"])
        .arg(&input)
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    let expected: Vec<String> = FRUITS_1.iter().map(|s| s.to_uppercase()).collect();
    assert_eq!(stdout.lines().collect::<Vec<_>>(), expected);

    // 進捗とログは標準エラーに出る
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[Producer-1] Produced: apple"));
    assert!(stderr.contains("Completed!"));
    Ok(())
}

#[tokio::test]
async fn test_run_command_rejects_duplicate_outputs() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = create_input_file(temp_dir.path(), "input.txt", FRUITS_1)?;
    let output = temp_dir.path().join("out.txt");

    let result = execute_run(RunConfig {
        inputs: vec![input],
        outputs: vec![output.clone(), output.clone()],
        quiet: true,
        ..RunConfig::default()
    })
    .await;

    let error = result.unwrap_err();
    assert!(error.to_string().contains("出力先が重複しています"));
    assert!(!output.exists());
    Ok(())
}
