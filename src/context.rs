//! Request context validation and authorization / 请求上下文校验与鉴权

use std::collections::HashMap;

use axum::http::Method;
use serde_json::{Map, Value};

use crate::error::RelayError;
use crate::storage::StoreClientConfig;

/// Required fields, checked in this order / 必填字段（按顺序检查）
pub const REQUIRED_FIELDS: [&str; 5] = ["access_key_id", "secret_access_key", "region", "path", "bucket"];

/// Transfer direction chosen by the inbound verb / 传输方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// store -> client
    Read,
    /// client -> store
    Write,
}

/// Validated per-request context / 已校验的请求上下文
#[derive(Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub bucket: String,
    pub path: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    /// Exact verb the caller must use, when set / 强制的请求方法
    pub method: Option<String>,
    pub no_location: bool,
    pub issuer_url: Option<String>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .field("access_key_id", &self.access_key_id)
            .field("region", &self.region)
            .field("method", &self.method)
            .field("no_location", &self.no_location)
            .field("issuer_url", &self.issuer_url)
            .finish()
    }
}

/// Merge configured defaults with query parameters; configured keys win
/// 合并默认上下文与查询参数（配置项优先，查询参数只补充缺失字段）
pub fn merge_context(defaults: &Map<String, Value>, query: HashMap<String, String>) -> Map<String, Value> {
    let mut data = defaults.clone();
    for (key, value) in query {
        data.entry(key).or_insert(Value::String(value));
    }
    data
}

/// Loose truthiness for the no_location flag / no_location 标志的真值判断
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => {
            let s = s.trim();
            !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
        }
        Some(_) => true,
    }
}

fn required(data: &Map<String, Value>, field: &'static str) -> Result<String, RelayError> {
    match data.get(field).and_then(|v| v.as_str()) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(RelayError::MissingField(field)),
    }
}

fn optional_string(data: &Map<String, Value>, field: &str) -> Option<String> {
    data.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

impl RequestContext {
    /// Validate the raw context bag, failing on the first bad required field
    pub fn from_data(data: &Map<String, Value>) -> Result<Self, RelayError> {
        // Same order as REQUIRED_FIELDS
        let access_key_id = required(data, "access_key_id")?;
        let secret_access_key = required(data, "secret_access_key")?;
        let region = required(data, "region")?;
        let path = required(data, "path")?;
        let bucket = required(data, "bucket")?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            region,
            path,
            bucket,
            method: data.get("method").and_then(|v| v.as_str()).map(|s| s.to_string()),
            no_location: is_truthy(data.get("no_location")),
            issuer_url: optional_string(data, "issuer_url"),
        })
    }

    /// Check the inbound verb and pick the transfer direction / 校验请求方法
    ///
    /// With an override the verb must match it exactly (case-sensitive); without one
    /// only GET and PUT are accepted. GET reads, every other accepted verb writes.
    pub fn authorize(&self, verb: &Method) -> Result<Direction, RelayError> {
        match &self.method {
            Some(required) => {
                if verb.as_str() != required {
                    return Err(RelayError::VerbNotAllowed(required.clone()));
                }
            }
            None => {
                if *verb != Method::GET && *verb != Method::PUT {
                    return Err(RelayError::VerbNotAllowed("PUT or GET".to_string()));
                }
            }
        }

        Ok(if *verb == Method::GET {
            Direction::Read
        } else {
            Direction::Write
        })
    }

    /// Store client settings derived from this request / 存储客户端配置
    pub fn store_config(&self) -> StoreClientConfig {
        StoreClientConfig {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            region: self.region.clone(),
            secure: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_data() -> Map<String, Value> {
        json!({
            "access_key_id": "AKIA",
            "secret_access_key": "secret",
            "region": "us-east-1",
            "path": "reports/q1.csv",
            "bucket": "uploads",
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    #[test]
    fn test_valid_context() {
        let ctx = RequestContext::from_data(&full_data()).unwrap();
        assert_eq!(ctx.bucket, "uploads");
        assert_eq!(ctx.path, "reports/q1.csv");
        assert_eq!(ctx.method, None);
        assert!(!ctx.no_location);
        assert_eq!(ctx.issuer_url, None);
    }

    #[test]
    fn test_each_missing_field_is_named() {
        for field in REQUIRED_FIELDS {
            let mut data = full_data();
            data.remove(field);
            let err = RequestContext::from_data(&data).unwrap_err();
            assert_eq!(err.to_string(), format!("Missing {}.", field));
        }
    }

    #[test]
    fn test_first_missing_field_wins() {
        let mut data = full_data();
        data.remove("bucket");
        data.remove("region");
        let err = RequestContext::from_data(&data).unwrap_err();
        assert!(matches!(err, RelayError::MissingField("region")));
    }

    #[test]
    fn test_non_string_field_is_missing() {
        let mut data = full_data();
        data.insert("secret_access_key".to_string(), json!(12345));
        let err = RequestContext::from_data(&data).unwrap_err();
        assert!(matches!(err, RelayError::MissingField("secret_access_key")));

        let mut data = full_data();
        data.insert("path".to_string(), json!(""));
        assert!(matches!(RequestContext::from_data(&data), Err(RelayError::MissingField("path"))));
    }

    #[test]
    fn test_default_verbs() {
        let ctx = RequestContext::from_data(&full_data()).unwrap();
        assert_eq!(ctx.authorize(&Method::GET).unwrap(), Direction::Read);
        assert_eq!(ctx.authorize(&Method::PUT).unwrap(), Direction::Write);

        for verb in [Method::POST, Method::DELETE, Method::HEAD, Method::PATCH] {
            let err = ctx.authorize(&verb).unwrap_err();
            assert_eq!(err.to_string(), "The verb must be PUT or GET.");
        }
    }

    #[test]
    fn test_method_override() {
        let mut data = full_data();
        data.insert("method".to_string(), json!("PUT"));
        let ctx = RequestContext::from_data(&data).unwrap();

        assert_eq!(ctx.authorize(&Method::PUT).unwrap(), Direction::Write);
        let err = ctx.authorize(&Method::GET).unwrap_err();
        assert_eq!(err.to_string(), "The verb must be PUT.");

        data.insert("method".to_string(), json!("POST"));
        let ctx = RequestContext::from_data(&data).unwrap();
        assert_eq!(ctx.authorize(&Method::POST).unwrap(), Direction::Write);
    }

    #[test]
    fn test_method_override_is_case_sensitive() {
        let mut data = full_data();
        data.insert("method".to_string(), json!("get"));
        let ctx = RequestContext::from_data(&data).unwrap();
        assert!(matches!(ctx.authorize(&Method::GET), Err(RelayError::VerbNotAllowed(ref v)) if v == "get"));
    }

    #[test]
    fn test_no_location_truthiness() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(null))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!("0"))));
        assert!(!is_truthy(Some(&json!("false"))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!("1"))));
        assert!(is_truthy(Some(&json!("true"))));
        assert!(is_truthy(Some(&json!(1))));
    }

    #[test]
    fn test_configured_keys_win_over_query() {
        let defaults = json!({"region": "us-east-1", "bucket": "default-bucket", "method": "GET"})
            .as_object()
            .cloned()
            .unwrap();
        let mut query = HashMap::new();
        query.insert("bucket".to_string(), "other".to_string());
        query.insert("method".to_string(), "PUT".to_string());
        query.insert("path".to_string(), "a.txt".to_string());

        let data = merge_context(&defaults, query);
        assert_eq!(data.get("region"), Some(&json!("us-east-1")));
        assert_eq!(data.get("bucket"), Some(&json!("default-bucket")));
        assert_eq!(data.get("method"), Some(&json!("GET")));
        assert_eq!(data.get("path"), Some(&json!("a.txt")));
    }

    #[test]
    fn test_debug_hides_secret() {
        let ctx = RequestContext::from_data(&full_data()).unwrap();
        assert!(!format!("{:?}", ctx).contains("secret"));
    }
}
