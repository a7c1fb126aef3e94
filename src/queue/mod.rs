// キュー層 - ProducerとConsumerが共有する固定容量キュー

pub mod bounded;
pub mod error;

// 公開API
pub use bounded::BoundedBlockingQueue;
pub use error::{PutError, QueueError};
