// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::adapters::AdapterError;
use crate::records::StoreError;
use crate::workflow::{DisclosureError, SubmissionError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::not_found(e.to_string()),
            StoreError::DuplicateId(_)
            | StoreError::IllegalTransition { .. }
            | StoreError::AlreadyInFlight(_) => Self::conflict(e.to_string()),
        }
    }
}

impl From<AdapterError> for ApiError {
    fn from(e: AdapterError) -> Self {
        match e {
            AdapterError::Unavailable(_) => Self::service_unavailable(e.to_string()),
            AdapterError::NotFound(_) => Self::not_found(e.to_string()),
            AdapterError::InvalidInput(_) => Self::unprocessable(e.to_string()),
            AdapterError::Rejected(_) => Self::bad_gateway(e.to_string()),
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        match e {
            SubmissionError::InvalidInput(_) => Self::bad_request(e.to_string()),
            SubmissionError::Encryption(_) => Self::unprocessable(e.to_string()),
            SubmissionError::AdapterUnavailable(_) => Self::service_unavailable(e.to_string()),
            SubmissionError::SubmissionFailed(_) => Self::bad_gateway(e.to_string()),
            SubmissionError::Store(inner) => inner.into(),
        }
    }
}

impl From<DisclosureError> for ApiError {
    fn from(e: DisclosureError) -> Self {
        match e {
            DisclosureError::Pending(_) => Self::conflict(e.to_string()),
            DisclosureError::LedgerRead(_) => Self::service_unavailable(e.to_string()),
            DisclosureError::GatewayFailed(_) | DisclosureError::VerificationRejected(_) => {
                Self::bad_gateway(e.to_string())
            }
            DisclosureError::Store(inner) => inner.into(),
        }
    }
}
