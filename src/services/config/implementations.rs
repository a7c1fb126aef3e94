// 設定管理の具象実装

use crate::core::{LineTransform, PipelineConfig, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// デフォルトのキュー容量
pub const DEFAULT_CAPACITY: usize = 10;

/// デフォルト設定実装
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPipelineConfig {
    capacity: usize,
    transform: LineTransform,
    enable_progress: bool,
}

impl DefaultPipelineConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_transform(mut self, transform: LineTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_progress_reporting(mut self, enable: bool) -> Self {
        self.enable_progress = enable;
        self
    }
}

impl Default for DefaultPipelineConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            transform: LineTransform::Identity,
            enable_progress: true,
        }
    }
}

impl PipelineConfig for DefaultPipelineConfig {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn transform(&self) -> LineTransform {
        self.transform
    }

    fn enable_progress_reporting(&self) -> bool {
        self.enable_progress
    }
}

/// JSON設定ファイルの内容
///
/// 全項目省略可能。CLI引数で指定された値が優先される。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSettings {
    pub capacity: Option<usize>,
    pub transform: Option<LineTransform>,
    pub report_progress: Option<bool>,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

impl PipelineSettings {
    /// JSONファイルから設定を読み込む
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!("設定ファイルを読み込めません {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> PipelineResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::configuration(format!("JSON解析エラー: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 設定値の妥当性をチェック
    pub fn validate(&self) -> PipelineResult<()> {
        if let Some(capacity) = self.capacity.filter(|c| *c == 0) {
            return Err(PipelineError::CapacityConfig { capacity });
        }
        ensure_distinct_outputs(&self.outputs)
    }

    /// 後から指定された値で上書きした設定を返す
    pub fn merge(mut self, overrides: PipelineSettings) -> Self {
        if overrides.capacity.is_some() {
            self.capacity = overrides.capacity;
        }
        if overrides.transform.is_some() {
            self.transform = overrides.transform;
        }
        if overrides.report_progress.is_some() {
            self.report_progress = overrides.report_progress;
        }
        if !overrides.inputs.is_empty() {
            self.inputs = overrides.inputs;
        }
        if !overrides.outputs.is_empty() {
            self.outputs = overrides.outputs;
        }
        self
    }

    /// 未指定項目をデフォルトで埋めた設定に変換
    pub fn to_config(&self) -> DefaultPipelineConfig {
        let defaults = DefaultPipelineConfig::default();
        DefaultPipelineConfig::new(self.capacity.unwrap_or(defaults.capacity))
            .with_transform(self.transform.unwrap_or(defaults.transform))
            .with_progress_reporting(self.report_progress.unwrap_or(defaults.enable_progress))
    }
}

/// 出力先の重複をチェック
///
/// 同じファイルを複数のシンクが開くと互いの行を上書きするため、起動前に拒否する。
/// `./out.txt` と `out.txt` のような表記揺れも同一とみなす。
pub fn ensure_distinct_outputs(outputs: &[PathBuf]) -> PipelineResult<()> {
    let mut seen = HashSet::new();
    for output in outputs {
        let normalized: PathBuf = output
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        if !seen.insert(normalized) {
            return Err(PipelineError::configuration(format!(
                "出力先が重複しています: {}",
                output.display()
            )));
        }
    }
    Ok(())
}
