//! HTTP mapping of transfer errors.
//!
//! Each error kind gets its own status so callers can tell a bad request
//! from an on-chain failure from an unknown outcome. Nothing that failed
//! maps to a 2xx.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::error::TransferError;

use super::types::ErrorBody;

/// A `TransferError` on its way out of a handler.
#[derive(Debug)]
pub struct ApiError(pub TransferError);

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match &self.0 {
            TransferError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TransferError::ExecutionReverted(_) | TransferError::TransactionFailed { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TransferError::GasAllowanceExceeded { .. }
            | TransferError::Rejected(_)
            | TransferError::Network(_) => StatusCode::BAD_GATEWAY,
            TransferError::ConfirmationTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            TransferError::Cancelled { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn tx_hash(&self) -> Option<String> {
        match &self.0 {
            TransferError::ConfirmationTimeout { hash, .. }
            | TransferError::TransactionFailed { hash, .. } => Some(hash.to_string()),
            TransferError::Cancelled { hash } => hash.map(|h| h.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
            tx_hash: self.tx_hash(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::TxHash;
    use std::time::Duration;

    #[test]
    fn test_status_per_kind() {
        let cases = [
            (TransferError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (TransferError::ExecutionReverted("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (
                TransferError::TransactionFailed {
                    hash: TxHash::ZERO,
                    block_number: 1,
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TransferError::GasAllowanceExceeded {
                    attempts: 3,
                    last_gas_limit: 1,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (TransferError::Network("x".into()), StatusCode::BAD_GATEWAY),
            (
                TransferError::ConfirmationTimeout {
                    hash: TxHash::ZERO,
                    waited: Duration::from_secs(1),
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (TransferError::Cancelled { hash: None }, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            let api = ApiError(err);
            assert_eq!(api.status(), status);
            assert!(!api.status().is_success());
        }
    }

    #[test]
    fn test_timeout_body_keeps_hash() {
        let api = ApiError(TransferError::ConfirmationTimeout {
            hash: TxHash::repeat_byte(1),
            waited: Duration::from_secs(120),
        });
        assert_eq!(api.tx_hash(), Some(TxHash::repeat_byte(1).to_string()));
    }
}
