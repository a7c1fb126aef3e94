// LineSinkの具象実装

use crate::core::{LineSink, PipelineError, PipelineResult};
use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ローカルファイルへ書き出すシンク
///
/// `open` 時に既存ファイルを切り詰め、親ディレクトリが無ければ作成する。
#[derive(Debug)]
pub struct FileLineSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileLineSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&mut self) -> PipelineResult<&mut BufWriter<File>> {
        let resource = self.path.display().to_string();
        self.writer
            .as_mut()
            .ok_or_else(|| PipelineError::write_error(resource, anyhow::anyhow!("シンクが開かれていません")))
    }
}

impl LineSink for FileLineSink {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&mut self) -> PipelineResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PipelineError::sink_unavailable(self.describe(), e))?;
        }
        let file = File::create(&self.path)
            .map_err(|e| PipelineError::sink_unavailable(self.describe(), e))?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> PipelineResult<()> {
        let resource = self.describe();
        writeln!(self.writer()?, "{line}").map_err(|e| PipelineError::write_error(resource, e))
    }

    fn flush(&mut self) -> PipelineResult<()> {
        let resource = self.describe();
        match self.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| PipelineError::write_error(resource, e)),
            None => Ok(()),
        }
    }
}

/// 書き出した行をメモリ上に保持するシンク（テスト・デモ用）
///
/// クローンは同じバッファを共有するため、実行後に内容を確認できる。
#[derive(Debug, Clone, Default)]
pub struct MemoryLineSink {
    name: String,
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLineSink {
    pub fn new() -> Self {
        Self {
            name: "memory".to_string(),
            lines: Arc::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 書き出された行のコピーを取得
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

impl LineSink for MemoryLineSink {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn open(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> PipelineResult<()> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> PipelineResult<()> {
        Ok(())
    }
}

/// 標準出力へ書き出すシンク
#[derive(Debug, Clone, Default)]
pub struct StdoutLineSink;

impl StdoutLineSink {
    pub fn new() -> Self {
        Self
    }
}

impl LineSink for StdoutLineSink {
    fn describe(&self) -> String {
        "<stdout>".to_string()
    }

    fn open(&mut self) -> PipelineResult<()> {
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> PipelineResult<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{line}").map_err(|e| PipelineError::write_error("<stdout>", e))
    }

    fn flush(&mut self) -> PipelineResult<()> {
        std::io::stdout()
            .flush()
            .map_err(|e| PipelineError::write_error("<stdout>", e))
    }
}
