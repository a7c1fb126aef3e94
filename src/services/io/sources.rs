// LineSourceの具象実装

use crate::core::{LineSource, PipelineError, PipelineResult};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// ローカルファイルを1行ずつ読み込むソース
#[derive(Debug)]
pub struct FileLineSource {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    line_number: usize,
}

impl FileLineSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reader: None,
            line_number: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileLineSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&mut self) -> PipelineResult<()> {
        let file = File::open(&self.path)
            .map_err(|e| PipelineError::source_unavailable(self.describe(), e))?;
        self.reader = Some(BufReader::new(file));
        self.line_number = 0;
        Ok(())
    }

    fn next_line(&mut self) -> PipelineResult<Option<String>> {
        let resource = self.describe();
        let line_number = self.line_number + 1;
        let reader = self.reader.as_mut().ok_or_else(|| {
            PipelineError::read_error(&resource, line_number, anyhow::anyhow!("ソースが開かれていません"))
        })?;

        let mut buffer = String::new();
        let read = reader
            .read_line(&mut buffer)
            .map_err(|e| PipelineError::read_error(&resource, line_number, e))?;
        if read == 0 {
            return Ok(None);
        }

        self.line_number = line_number;
        let trimmed_len = buffer.trim_end_matches(['\n', '\r']).len();
        buffer.truncate(trimmed_len);
        Ok(Some(buffer))
    }
}

/// メモリ上の行を供給するソース（テスト・デモ用）
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSource {
    name: String,
    lines: VecDeque<String>,
}

impl MemoryLineSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "memory".to_string(),
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl LineSource for MemoryLineSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn open(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn next_line(&mut self) -> PipelineResult<Option<String>> {
        Ok(self.lines.pop_front())
    }
}
