use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::context::merge_context;
use crate::issuer::TokenIssuer;
use crate::storage::StoreGate;

/// Shared application state / 应用共享状态
pub struct AppState {
    /// Configure-once store client / 一次性初始化的存储客户端
    pub store: StoreGate,
    pub issuer: Arc<dyn TokenIssuer>,
    /// Context fields applied to every request / 默认请求上下文
    pub context_defaults: Map<String, Value>,
}

impl AppState {
    pub fn new(store: StoreGate, issuer: Arc<dyn TokenIssuer>, context_defaults: Map<String, Value>) -> Self {
        Self {
            store,
            issuer,
            context_defaults,
        }
    }

    /// Raw context bag for one request / 单个请求的原始上下文
    pub fn context_data(&self, query: HashMap<String, String>) -> Map<String, Value> {
        merge_context(&self.context_defaults, query)
    }
}
