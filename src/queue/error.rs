// キュー操作のエラー型

use std::fmt;
use thiserror::Error;

/// 取り出し・タスク管理のエラー
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// キューが閉じられ、残りのアイテムも全て取り出された
    #[error("キューは閉じられています")]
    Closed,

    #[error("キューが空です")]
    Empty,

    #[error("キューが満杯です")]
    Full,

    #[error("待機がタイムアウトしました")]
    Timeout,

    /// 投入されたアイテム数より多く `task_done` が呼ばれた
    #[error("task_done の呼び出し回数が投入数を超えました")]
    TaskDoneOverflow,
}

/// 投入失敗。拒否されたアイテムを呼び出し元に返す
#[derive(PartialEq, Eq)]
pub enum PutError<T> {
    Closed(T),
    Full(T),
    Timeout(T),
}

impl<T> PutError<T> {
    /// 拒否されたアイテムを取り出す
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(item) | Self::Full(item) | Self::Timeout(item) => item,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Debug for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("Closed(..)"),
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Timeout(_) => f.write_str("Timeout(..)"),
        }
    }
}

impl<T> fmt::Display for PutError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("閉じられたキューには投入できません"),
            Self::Full(_) => f.write_str("キューが満杯です"),
            Self::Timeout(_) => f.write_str("投入待機がタイムアウトしました"),
        }
    }
}

impl<T> std::error::Error for PutError<T> {}

impl<T> From<PutError<T>> for QueueError {
    fn from(error: PutError<T>) -> Self {
        match error {
            PutError::Closed(_) => QueueError::Closed,
            PutError::Full(_) => QueueError::Full,
            PutError::Timeout(_) => QueueError::Timeout,
        }
    }
}
