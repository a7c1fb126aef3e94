// テストユーティリティとモック実装
// 統合テストで共有するヘルパー

pub mod mocks;
pub mod test_data;

// 公開API
pub use mocks::*;
pub use test_data::*;
