//! Scoped-access issuer / 受限访问令牌签发
//!
//! After an upload the relay can hand out a narrower link instead of the raw object
//! location. The policy pins the method to GET and the path to the written key,
//! disables body parsing and merging, disables self-revocation and forbids further
//! delegation. The issuing service owns the cryptography; this module only builds
//! the policy and calls it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters fixed by the policy / 策略固定的参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyParams {
    pub method: String,
    pub path: String,
}

/// Policy sent to the token issuer / 发送给签发服务的策略
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedTokenPolicy {
    pub params: PolicyParams,
    pub disable_parse_body: bool,
    pub disable_merge_body: bool,
    pub disable_self_revocation: bool,
    pub delegation_depth: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,
}

impl ScopedTokenPolicy {
    /// Read-only, non-delegable access to a single object / 只读、不可再委托的单对象访问
    pub fn read_only(path: &str, issuer_url: Option<String>) -> Self {
        Self {
            params: PolicyParams {
                method: "GET".to_string(),
                path: path.to_string(),
            },
            disable_parse_body: true,
            disable_merge_body: true,
            disable_self_revocation: true,
            delegation_depth: 0,
            issuer_url,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("No token issuer endpoint configured")]
    NoEndpoint,
    #[error("Invalid token issuer endpoint {0}: {1}")]
    InvalidEndpoint(String, url::ParseError),
    #[error("Token issuer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Token issuer returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Token issuer reply has no url")]
    MissingUrl,
    #[error("Token issuer returned an unusable url: {0}")]
    InvalidUrl(String),
}

/// Token issuance capability / 令牌签发接口
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Issue a scoped access url for `policy` / 签发受限访问URL
    async fn issue(&self, policy: &ScopedTokenPolicy) -> Result<String, IssueError>;
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    url: Option<String>,
}

/// Issuer reached over HTTP: POSTs the policy as JSON, reads `{"url": ...}` back
pub struct HttpTokenIssuer {
    client: reqwest::Client,
    default_endpoint: Option<String>,
    token: Option<String>,
}

impl HttpTokenIssuer {
    pub fn new(default_endpoint: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            default_endpoint: Some(default_endpoint.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            token: Some(token.trim()).filter(|s| !s.is_empty()).map(|s| s.to_string()),
        }
    }

    /// Resolve where to POST the policy / 解析签发端点
    ///
    /// The configured endpoint always wins and is the only one that receives the
    /// bearer token. A request-supplied `issuer_url` is used as the target only when
    /// nothing is configured, and then the call is made without credentials.
    fn endpoint(&self, policy: &ScopedTokenPolicy) -> Result<(Url, bool), IssueError> {
        let (raw, trusted) = match (self.default_endpoint.as_deref(), policy.issuer_url.as_deref()) {
            (Some(configured), _) => (configured, true),
            (None, Some(requested)) => (requested, false),
            (None, None) => return Err(IssueError::NoEndpoint),
        };
        let url = Url::parse(raw).map_err(|e| IssueError::InvalidEndpoint(raw.to_string(), e))?;
        Ok((url, trusted))
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, policy: &ScopedTokenPolicy) -> Result<String, IssueError> {
        let (endpoint, trusted) = self.endpoint(policy)?;
        tracing::debug!(
            "Requesting scoped token: endpoint={}, configured={}, path={}",
            endpoint,
            trusted,
            policy.params.path
        );

        let mut request = self.client.post(endpoint).json(policy);
        if let (true, Some(token)) = (trusted, self.token.as_ref()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IssueError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let reply: IssueResponse = response.json().await?;
        match reply.url {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(IssueError::MissingUrl),
        }
    }
}
