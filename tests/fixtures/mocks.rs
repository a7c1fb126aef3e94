// テスト用のモック実装
// mockallの自動生成されたモックを再エクスポートし、よく使う設定をまとめる

pub use bounded_pipeline::core::traits::{
    MockItemProcessor, MockLineSink, MockLineSource, MockPipelineConfig, MockPipelineReporter,
};
use bounded_pipeline::PipelineError;

/// 開けないシンクのモック
pub fn unavailable_sink(resource: &str) -> MockLineSink {
    let resource = resource.to_string();
    let mut sink = MockLineSink::new();
    sink.expect_describe().return_const(resource.clone());
    sink.expect_open().returning(move || {
        Err(PipelineError::sink_unavailable(
            resource.clone(),
            anyhow::anyhow!("permission denied"),
        ))
    });
    sink.expect_write_line().never();
    sink.expect_flush().never();
    sink
}

/// 指定行まで読めた後に読み込みエラーを返すソースのモック
pub fn flaky_source(resource: &str, good_lines: Vec<&str>) -> MockLineSource {
    let resource = resource.to_string();
    let mut lines: Vec<String> = good_lines.into_iter().map(str::to_string).collect();
    lines.reverse();
    let failing_line = lines.len() + 1;

    let mut source = MockLineSource::new();
    source.expect_describe().return_const(resource.clone());
    source.expect_open().returning(|| Ok(()));
    source.expect_next_line().returning(move || match lines.pop() {
        Some(line) => Ok(Some(line)),
        None => Err(PipelineError::read_error(
            resource.clone(),
            failing_line,
            anyhow::anyhow!("device error"),
        )),
    });
    source
}
