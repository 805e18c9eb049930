//! S3驱动工厂

use std::sync::Arc;

use crate::storage::{StoreClientConfig, StoreFactory, StoreHandle};
use super::config::S3Options;
use super::driver::S3Store;

/// S3驱动工厂
pub struct S3StoreFactory {
    options: S3Options,
}

impl S3StoreFactory {
    pub fn new(options: S3Options) -> Self {
        Self { options }
    }
}

impl StoreFactory for S3StoreFactory {
    fn driver_type(&self) -> &'static str {
        "s3"
    }

    fn configure(&self, config: StoreClientConfig) -> StoreHandle {
        Arc::new(S3Store::new(self.options.clone(), config))
    }
}
