//! Process-wide store client / 进程级存储客户端
//!
//! The first request that reaches the configurator decides the credentials for the
//! whole process lifetime. Later requests reuse the same handle even when they carry
//! different credentials, so one process serves exactly one credential set.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::ObjectStore;

pub type StoreHandle = Arc<dyn ObjectStore>;

/// Resolved settings the store client is built from / 存储客户端配置
#[derive(Clone)]
pub struct StoreClientConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    /// Always true for clients built from a request / 始终启用TLS
    pub secure: bool,
}

impl std::fmt::Debug for StoreClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClientConfig")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("region", &self.region)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Builds a store client from resolved credentials / 存储客户端工厂
///
/// Construction must not fail: any problem with the credentials is reported by the
/// first read or write that uses the client.
pub trait StoreFactory: Send + Sync {
    /// Driver type name / 驱动类型名称
    fn driver_type(&self) -> &'static str;

    fn configure(&self, config: StoreClientConfig) -> StoreHandle;
}

/// Configure-once gate around the store client / 一次性初始化闸门
pub struct StoreGate {
    factory: Box<dyn StoreFactory>,
    client: OnceCell<StoreHandle>,
}

impl StoreGate {
    pub fn new(factory: Box<dyn StoreFactory>) -> Self {
        Self {
            factory,
            client: OnceCell::new(),
        }
    }

    /// Return the shared client, building it from `config` if none exists yet.
    /// `config` is ignored once the client has been built.
    pub fn client(&self, config: impl FnOnce() -> StoreClientConfig) -> StoreHandle {
        self.client
            .get_or_init(|| {
                let config = config();
                tracing::info!(
                    "Initializing {} store client: region={}, access_key_id={}, secure={}",
                    self.factory.driver_type(),
                    config.region,
                    config.access_key_id,
                    config.secure
                );
                let handle = self.factory.configure(config);
                tracing::debug!("Store client ready: {}", handle.name());
                handle
            })
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ObjectBody, StoreError, StoredObject};
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that remembers which access key it was built with
    struct TaggedStore {
        access_key_id: String,
        inner: MemoryStore,
    }

    #[async_trait]
    impl ObjectStore for TaggedStore {
        fn name(&self) -> &str {
            &self.access_key_id
        }

        async fn read(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
            self.inner.read(bucket, key).await
        }

        async fn write(&self, bucket: &str, key: &str, body: ObjectBody) -> Result<StoredObject, StoreError> {
            self.inner.write(bucket, key, body).await
        }
    }

    struct CountingFactory {
        calls: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StoreFactory for CountingFactory {
        fn driver_type(&self) -> &'static str {
            "counting"
        }

        fn configure(&self, config: StoreClientConfig) -> StoreHandle {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push(config.access_key_id.clone());
            Arc::new(TaggedStore {
                access_key_id: config.access_key_id,
                inner: MemoryStore::new(),
            })
        }
    }

    fn config_for(key: &str) -> StoreClientConfig {
        StoreClientConfig {
            access_key_id: key.to_string(),
            secret_access_key: "secret".to_string(),
            region: "us-east-1".to_string(),
            secure: true,
        }
    }

    #[test]
    fn test_first_config_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = StoreGate::new(Box::new(CountingFactory {
            calls: calls.clone(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }));

        assert!(!gate.is_initialized());
        let first = gate.client(|| config_for("AKIA_FIRST"));
        let second = gate.client(|| config_for("AKIA_SECOND"));

        assert!(gate.is_initialized());
        assert_eq!(first.name(), "AKIA_FIRST");
        assert_eq!(second.name(), "AKIA_FIRST");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_requests_configure_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let gate = Arc::new(StoreGate::new(Box::new(CountingFactory {
            calls: calls.clone(),
            seen: seen.clone(),
        })));

        let mut handles = Vec::new();
        for i in 0..64 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move {
                gate.client(|| config_for(&format!("AKIA_{}", i))).name().to_string()
            }));
        }

        let mut names = Vec::new();
        for handle in handles {
            names.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let winner = seen.lock()[0].clone();
        assert!(names.iter().all(|n| *n == winner));
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", config_for("AKIA"));
        assert!(rendered.contains("AKIA"));
        assert!(!rendered.contains("\"secret\""));
    }
}
