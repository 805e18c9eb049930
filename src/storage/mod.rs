use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tokio::io::AsyncRead;

/// Inbound object body handed to a store write / 写入存储的对象数据流
pub type ObjectBody = Box<dyn AsyncRead + Unpin + Send>;

/// Error reported by the object store / 对象存储返回的错误
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    /// Status code reported by the store, if any / 存储返回的状态码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
    /// Extended trace of the failure, preferred over `message` on the write path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            stack: None,
        }
    }

    pub fn stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Most detailed description available (stack, then message) / 最详细的错误描述
    pub fn detail(&self) -> &str {
        self.stack.as_deref().unwrap_or(&self.message)
    }
}

/// Descriptor of a successfully written object / 写入成功后的对象位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub location: String,
}

/// Object store capability (get/put by key within a bucket) / 对象存储接口
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Driver name / 驱动名称
    fn name(&self) -> &str;

    /// Read the whole object into memory / 读取完整对象
    async fn read(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Stream `body` into the object at `key` / 流式写入对象
    async fn write(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<StoredObject, StoreError>;
}

pub mod client;
pub mod memory;

pub use client::{StoreClientConfig, StoreFactory, StoreGate, StoreHandle};
pub use memory::{MemoryStore, MemoryStoreFactory};
