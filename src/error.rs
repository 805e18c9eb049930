//! Relay error taxonomy / 中继错误类型
//!
//! Every variant resolves to exactly one terminal HTTP response.

use axum::http::StatusCode;

use crate::issuer::IssueError;
use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// First required context field that is absent or not a string
    #[error("Missing {0}.")]
    MissingField(&'static str),

    /// Inbound verb rejected; holds the verb(s) that would be accepted
    #[error("The verb must be {0}.")]
    VerbNotAllowed(String),

    #[error("{}", .0.message)]
    StoreRead(StoreError),

    #[error("{}", .0.detail())]
    StoreWrite(StoreError),

    #[error("{0}")]
    Issuance(IssueError),
}

impl RelayError {
    /// Status code of the terminal response / 响应状态码
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingField(_) => StatusCode::BAD_REQUEST,
            RelayError::VerbNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::StoreRead(e) => e
                .status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            RelayError::StoreWrite(_) | RelayError::Issuance(_) => StatusCode::BAD_GATEWAY,
        }
    }
}
