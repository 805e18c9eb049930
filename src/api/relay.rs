//! ANY / - 对象存储中继
//!
//! Validating -> Authorizing -> (Configuring) -> Transferring -> {Completing | Issuing}.
//! Each request produces a single `RelayOutcome`, which is turned into the response
//! exactly once.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::TryStreamExt;
use serde_json::{Map, Value};
use tokio_util::io::StreamReader;

use crate::context::{is_truthy, Direction, RequestContext};
use crate::error::RelayError;
use crate::issuer::{IssueError, ScopedTokenPolicy};
use crate::state::AppState;
use crate::storage::ObjectBody;

/// Terminal result of one relayed request / 请求的最终结果
#[derive(Debug)]
pub enum RelayOutcome {
    /// GET: full object body
    Object(Bytes),
    /// PUT with no_location
    Stored,
    /// PUT: scoped url for the written object
    Located(HeaderValue),
    Failed(RelayError),
}

impl IntoResponse for RelayOutcome {
    fn into_response(self) -> Response {
        match self {
            RelayOutcome::Object(data) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/octet-stream")),
                    (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
                ],
                data,
            )
                .into_response(),
            RelayOutcome::Stored => StatusCode::OK.into_response(),
            RelayOutcome::Located(url) => (StatusCode::OK, [(header::LOCATION, url)]).into_response(),
            RelayOutcome::Failed(err) => {
                let status = err.status();
                let message = err.to_string();
                tracing::warn!("{}: {}", status.as_u16(), message);
                (status, message).into_response()
            }
        }
    }
}

pub async fn relay(
    State(state): State<Arc<AppState>>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Body,
) -> RelayOutcome {
    let data = state.context_data(query);

    tracing::info!(
        "Request: bucket={}, path={}, method={}, no_location={}",
        field(&data, "bucket"),
        field(&data, "path"),
        method,
        is_truthy(data.get("no_location"))
    );

    match handle(&state, &method, &data, body).await {
        Ok(outcome) => outcome,
        Err(err) => RelayOutcome::Failed(err),
    }
}

fn field<'a>(data: &'a Map<String, Value>, name: &str) -> &'a str {
    data.get(name).and_then(|v| v.as_str()).unwrap_or("")
}

async fn handle(
    state: &AppState,
    method: &Method,
    data: &Map<String, Value>,
    body: Body,
) -> Result<RelayOutcome, RelayError> {
    let ctx = RequestContext::from_data(data)?;
    let direction = ctx.authorize(method)?;

    let store = state.store.client(|| ctx.store_config());

    match direction {
        Direction::Read => {
            // 读取路径完整缓冲后再响应
            let data = store.read(&ctx.bucket, &ctx.path).await.map_err(|e| {
                tracing::error!(
                    "Store download error: bucket={}, path={}, method={}, no_location={}, error={}, details={}",
                    ctx.bucket,
                    ctx.path,
                    method,
                    ctx.no_location,
                    e.message,
                    serde_json::to_string(&e).unwrap_or_default()
                );
                RelayError::StoreRead(e)
            })?;
            Ok(RelayOutcome::Object(data))
        }
        Direction::Write => {
            let stream = body
                .into_data_stream()
                .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
            let reader: ObjectBody = Box::new(StreamReader::new(stream));

            let stored = store
                .write(&ctx.bucket, &ctx.path, reader)
                .await
                .map_err(RelayError::StoreWrite)?;
            tracing::info!("Upload to store completed: {}", stored.location);

            if ctx.no_location {
                return Ok(RelayOutcome::Stored);
            }

            let policy = ScopedTokenPolicy::read_only(&ctx.path, ctx.issuer_url.clone());
            let url = state.issuer.issue(&policy).await.map_err(RelayError::Issuance)?;
            let location = HeaderValue::from_str(&url)
                .map_err(|_| RelayError::Issuance(IssueError::InvalidUrl(url)))?;
            Ok(RelayOutcome::Located(location))
        }
    }
}
