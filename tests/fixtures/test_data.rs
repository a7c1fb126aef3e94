// テスト用の入出力ファイル生成

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const FRUITS_1: &[&str] = &["apple", "banana", "cherry", "date", "elderberry"];
pub const FRUITS_2: &[&str] = &["fig", "grape", "honeydew", "kiwi", "lemon"];

/// 1行1アイテムの入力ファイルを作成
pub fn create_input_file(dir: &Path, name: &str, lines: &[&str]) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content)?;
    Ok(path)
}

/// ファイルの全行を読み込む（存在しなければ空）
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// 複数ファイルの全行をソートして返す
pub fn read_all_sorted(paths: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = paths.iter().flat_map(|p| read_lines(p)).collect();
    lines.sort();
    lines
}

/// 期待値をソート済みの所有文字列に変換
pub fn sorted_upper(groups: &[&[&str]]) -> Vec<String> {
    let mut lines: Vec<String> = groups
        .iter()
        .flat_map(|g| g.iter().map(|s| s.to_uppercase()))
        .collect();
    lines.sort();
    lines
}
