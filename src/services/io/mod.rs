// 入出力機能
// Producerが読み込むソースとConsumerが書き出すシンク

pub mod sinks;
pub mod sources;

// 公開API
pub use sinks::{FileLineSink, MemoryLineSink, StdoutLineSink};
pub use sources::{FileLineSource, MemoryLineSource};
