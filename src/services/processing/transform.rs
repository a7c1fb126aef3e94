// ItemProcessorの具象実装

use crate::core::{ItemProcessor, LineTransform, PipelineResult};

impl ItemProcessor for LineTransform {
    fn process(&self, item: &str) -> PipelineResult<String> {
        Ok(self.apply(item))
    }
}

/// クロージャを `ItemProcessor` として扱うアダプタ
pub struct FnProcessor<F> {
    func: F,
}

impl<F> FnProcessor<F>
where
    F: Fn(&str) -> PipelineResult<String> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> ItemProcessor for FnProcessor<F>
where
    F: Fn(&str) -> PipelineResult<String> + Send + Sync,
{
    fn process(&self, item: &str) -> PipelineResult<String> {
        (self.func)(item)
    }
}
