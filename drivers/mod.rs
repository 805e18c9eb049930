// Driver package / 驱动包
pub mod s3;

use crate::config::StoreConfig;
use crate::storage::{MemoryStoreFactory, StoreFactory};

/// Build the store factory selected in config / 根据配置创建存储驱动工厂
pub fn create_factory(config: &StoreConfig) -> anyhow::Result<Box<dyn StoreFactory>> {
    match config.driver.as_str() {
        // S3 object store / S3对象存储驱动
        "s3" => Ok(Box::new(s3::S3StoreFactory::new(config.s3_options()))),
        // In-process store for local runs / 内存存储驱动
        "memory" => Ok(Box::new(MemoryStoreFactory::default())),
        other => Err(anyhow::anyhow!("Driver type not found: {}", other)),
    }
}
