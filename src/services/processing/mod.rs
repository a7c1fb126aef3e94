// アイテム処理機能
// Consumerが各アイテムに適用する変換

pub mod transform;

// 公開API
pub use transform::FnProcessor;
