// BoundedBlockingQueue - 固定容量のブロッキングFIFOキュー
// 単一のMutexで内部状態を保護し、Condvarで待機・通知を行う

use super::error::{PutError, QueueError};
use crate::core::{PipelineError, PipelineResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Mutexで保護される内部状態
struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
    /// 投入済みで `task_done` がまだ呼ばれていないアイテム数
    unfinished: usize,
}

/// 固定容量のスレッドセーフなブロッキングキュー
///
/// - `put` は満杯の間ブロックし、`get` は空の間ブロックする
/// - `close` 後の `put` は即座に失敗し、`get` は残りを取り出した後に
///   `QueueError::Closed` を返す
/// - `size` / `is_empty` / `is_full` は参考値であり、呼び出し元が利用する
///   時点では古くなっている可能性がある
pub struct BoundedBlockingQueue<T> {
    state: Mutex<QueueState<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    all_done: Condvar,
    capacity: usize,
}

impl<T> fmt::Debug for BoundedBlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BoundedBlockingQueue")
            .field("capacity", &self.capacity)
            .field("size", &state.items.len())
            .field("closed", &state.closed)
            .field("unfinished", &state.unfinished)
            .finish()
    }
}

impl<T> BoundedBlockingQueue<T> {
    /// 新しいキューを作成。容量0は `CapacityConfig` エラー
    pub fn new(capacity: usize) -> PipelineResult<Self> {
        if capacity == 0 {
            return Err(PipelineError::CapacityConfig { capacity });
        }

        Ok(Self {
            state: Mutex::new(QueueState {
                items: VecDeque::with_capacity(capacity),
                closed: false,
                unfinished: 0,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            all_done: Condvar::new(),
            capacity,
        })
    }

    /// 空きができるまで待機してから末尾に追加
    pub fn put(&self, item: T) -> Result<(), PutError<T>> {
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.closed {
            self.not_full.wait(&mut state);
        }
        self.push_locked(state, item)
    }

    /// `put` のタイムアウト付き版
    pub fn put_timeout(&self, item: T, timeout: Duration) -> Result<(), PutError<T>> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while state.items.len() >= self.capacity && !state.closed {
            // タイムアウト後も条件を再確認し、届いていた通知を無駄にしない
            if self.not_full.wait_until(&mut state, deadline).timed_out()
                && state.items.len() >= self.capacity
                && !state.closed
            {
                return Err(PutError::Timeout(item));
            }
        }
        self.push_locked(state, item)
    }

    /// ブロックしない投入。満杯なら `PutError::Full`
    pub fn try_put(&self, item: T) -> Result<(), PutError<T>> {
        let state = self.state.lock();
        if !state.closed && state.items.len() >= self.capacity {
            return Err(PutError::Full(item));
        }
        self.push_locked(state, item)
    }

    /// アイテムが届くまで待機して先頭を取り出す
    pub fn get(&self) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(QueueError::Closed);
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// `get` のタイムアウト付き版
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, QueueError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Ok(item);
            }
            if state.closed {
                return Err(QueueError::Closed);
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out()
                && state.items.is_empty()
                && !state.closed
            {
                return Err(QueueError::Timeout);
            }
        }
    }

    /// ブロックしない取り出し。空なら `QueueError::Empty`
    pub fn try_get(&self) -> Result<T, QueueError> {
        let mut state = self.state.lock();
        match state.items.pop_front() {
            Some(item) => {
                drop(state);
                self.not_full.notify_one();
                Ok(item)
            }
            None if state.closed => Err(QueueError::Closed),
            None => Err(QueueError::Empty),
        }
    }

    /// キューを閉じて全ての待機者を起こす。2回目以降は何もしない
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// 取り出したアイテムの処理完了を通知
    pub fn task_done(&self) -> Result<(), QueueError> {
        let mut state = self.state.lock();
        if state.unfinished == 0 {
            return Err(QueueError::TaskDoneOverflow);
        }
        state.unfinished -= 1;
        if state.unfinished == 0 {
            self.all_done.notify_all();
        }
        Ok(())
    }

    /// 投入済みの全アイテムに `task_done` が呼ばれるまで待機
    pub fn join(&self) {
        let mut state = self.state.lock();
        while state.unfinished > 0 {
            self.all_done.wait(&mut state);
        }
    }

    /// 未完了タスク数
    pub fn unfinished_tasks(&self) -> usize {
        self.state.lock().unfinished
    }

    pub fn size(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn push_locked(
        &self,
        mut state: MutexGuard<'_, QueueState<T>>,
        item: T,
    ) -> Result<(), PutError<T>> {
        if state.closed {
            return Err(PutError::Closed(item));
        }
        debug_assert!(state.items.len() < self.capacity);
        state.items.push_back(item);
        state.unfinished += 1;
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }
}
