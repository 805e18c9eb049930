//! S3驱动核心实现

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::Region;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::storage::{ObjectBody, ObjectStore, StoreClientConfig, StoreError, StoredObject};
use super::config::S3Options;

/// S3客户端（进程内只创建一次）
pub struct S3Store {
    options: S3Options,
    region: Region,
    /// 凭证错误延迟到首次使用时报告
    credentials: Result<Credentials, String>,
    permits: Arc<Semaphore>,
}

impl S3Store {
    pub fn new(options: S3Options, config: StoreClientConfig) -> Self {
        let credentials = Credentials::new(
            Some(&config.access_key_id),
            Some(&config.secret_access_key),
            None,
            None,
            None,
        )
        .map_err(|e| format!("创建S3凭证失败: {}", e));

        if options.downgrades_tls(config.secure) {
            tracing::warn!("S3端点 {} 未使用HTTPS，传输不加密", options.endpoint);
        }

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: options.endpoint_for(&config.region, config.secure),
        };

        let permits = Arc::new(Semaphore::new(options.max_connections.max(1)));

        Self {
            options,
            region,
            credentials,
            permits,
        }
    }

    /// 创建指定存储桶的客户端
    fn bucket(&self, name: &str) -> Result<Box<Bucket>, StoreError> {
        let credentials = self.credentials.clone().map_err(StoreError::new)?;
        let bucket = Bucket::new(name, self.region.clone(), credentials).map_err(s3_error)?;

        Ok(if self.options.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        })
    }

    /// 获取传输槽位，达到上限时排队等待
    async fn acquire(&self) -> Result<OwnedSemaphorePermit, StoreError> {
        self.permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| StoreError::new("S3传输通道已关闭"))
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        "S3"
    }

    async fn read(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        let bucket = self.bucket(bucket)?;
        let _permit = self.acquire().await?;

        tracing::debug!(target: "s3_relay::store", "S3 GetObject: bucket={}, key={}", bucket.name(), key);

        // rust-s3返回完整响应
        let response = bucket.get_object(key).await.map_err(s3_error)?;
        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(StoreError::with_status(code, error_message(response.bytes())));
        }

        Ok(Bytes::copy_from_slice(response.bytes()))
    }

    async fn write(&self, bucket: &str, key: &str, mut body: ObjectBody) -> Result<StoredObject, StoreError> {
        let bucket = self.bucket(bucket)?;
        let _permit = self.acquire().await?;

        tracing::debug!(target: "s3_relay::store", "S3 PutObject(stream): bucket={}, key={}", bucket.name(), key);

        let response = bucket
            .put_object_stream(&mut body, key)
            .await
            .map_err(s3_error)?;
        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(StoreError::with_status(code, format!("S3上传失败: HTTP {}", code)));
        }

        Ok(StoredObject {
            location: format!("{}/{}", bucket.url(), key.trim_start_matches('/')),
        })
    }
}

/// 转换rust-s3错误
fn s3_error(e: S3Error) -> StoreError {
    match e {
        S3Error::HttpFailWithBody(code, body) => StoreError::with_status(code, error_message(body.as_bytes())),
        other => StoreError::new(other.to_string()).stack(format!("{:?}", other)),
    }
}

/// 从S3错误XML中提取<Message>，没有时返回原文
fn error_message(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if let Some(start) = text.find("<Message>") {
        let rest = &text[start + "<Message>".len()..];
        if let Some(end) = rest.find("</Message>") {
            return rest[..end].to_string();
        }
    }
    let text = text.trim();
    if text.is_empty() {
        "S3请求失败".to_string()
    } else {
        text.to_string()
    }
}
