use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use types::errors::{EngineError, LedgerError, MarketError, OrderError};

/// Central error type for the gateway
#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    BadRequest(String),
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::Engine(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::Engine(err) => {
                let (status, code) = match &err {
                    EngineError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                    EngineError::Order(OrderError::NotFound { .. }) => {
                        (StatusCode::NOT_FOUND, "ORDER_NOT_FOUND")
                    }
                    EngineError::Order(_) => (StatusCode::BAD_REQUEST, "INVALID_ORDER"),
                    EngineError::Market(MarketError::NotActive(_)) => {
                        (StatusCode::NOT_FOUND, "MARKET_NOT_ACTIVE")
                    }
                    EngineError::Market(MarketError::AlreadyResolved(_)) => {
                        (StatusCode::CONFLICT, "MARKET_ALREADY_RESOLVED")
                    }
                    EngineError::Market(MarketError::NotResolved(_)) => {
                        (StatusCode::CONFLICT, "MARKET_NOT_RESOLVED")
                    }
                    EngineError::Balance(_) => (StatusCode::CONFLICT, "INSUFFICIENT_SHARES"),
                    EngineError::Ledger(LedgerError::InsufficientFunds { .. }) => {
                        (StatusCode::CONFLICT, "INSUFFICIENT_COLLATERAL")
                    }
                    EngineError::Ledger(LedgerError::Overflow) => {
                        (StatusCode::BAD_REQUEST, "AMOUNT_OVERFLOW")
                    }
                };
                (status, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
