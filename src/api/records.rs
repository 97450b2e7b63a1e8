// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::ApiError,
    models::{
        CreateRecordRequest, DisclosureResponse, RecordListResponse, RecordResponse, SyncResponse,
    },
    records::RecordId,
    state::AppState,
    workflow::NewReading,
};

#[utoipa::path(
    get,
    path = "/v1/records",
    tag = "Records",
    responses((status = 200, body = RecordListResponse))
)]
pub async fn list_records(State(state): State<AppState>) -> Json<RecordListResponse> {
    let records = state
        .store
        .list_all()
        .into_iter()
        .map(RecordResponse::from)
        .collect();
    Json(RecordListResponse { records })
}

/// Encrypt a reading and register it on the ledger.
///
/// Responds once the ledger has confirmed the record.
#[utoipa::path(
    post,
    path = "/v1/records",
    request_body = CreateRecordRequest,
    tag = "Records",
    responses(
        (status = 201, body = RecordResponse),
        (status = 400, description = "Missing name"),
        (status = 422, description = "Value cannot be encrypted"),
        (status = 502, description = "Ledger rejected the record"),
        (status = 503, description = "Encryption service unavailable")
    )
)]
pub async fn create_record(
    State(state): State<AppState>,
    Json(request): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>), ApiError> {
    let reading = NewReading {
        creator: state.creator.clone(),
        value: request.value,
        name: request.name,
        description: request.description,
        zone_code: request.zone_code,
    };
    let record = state.submission.submit(reading).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

#[utoipa::path(
    get,
    path = "/v1/records/{record_id}",
    params(
        ("record_id" = String, Path, description = "Identifier of the record")
    ),
    tag = "Records",
    responses(
        (status = 200, body = RecordResponse),
        (status = 404, description = "Unknown record")
    )
)]
pub async fn get_record(
    Path(record_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RecordResponse>, ApiError> {
    let record = state.store.get(&RecordId::from(record_id))?;
    Ok(Json(record.into()))
}

/// Reveal a record's hidden value once the ledger accepts the decryption proof.
#[utoipa::path(
    post,
    path = "/v1/records/{record_id}/disclose",
    params(
        ("record_id" = String, Path, description = "Identifier of the record to disclose")
    ),
    tag = "Records",
    responses(
        (status = 200, body = DisclosureResponse),
        (status = 404, description = "Unknown record"),
        (status = 409, description = "A disclosure of this record is already in flight"),
        (status = 502, description = "Gateway failed or the ledger rejected the proof"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn disclose_record(
    Path(record_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DisclosureResponse>, ApiError> {
    let disclosure = state
        .disclosure
        .disclose(&RecordId::from(record_id))
        .await?;
    Ok(Json(disclosure.into()))
}

/// Mirror ledger records into the local store now.
#[utoipa::path(
    post,
    path = "/v1/records/sync",
    tag = "Records",
    responses(
        (status = 200, body = SyncResponse),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn sync_records(State(state): State<AppState>) -> Result<Json<SyncResponse>, ApiError> {
    let report = state.sync.sync_once().await?;
    Ok(Json(SyncResponse {
        report,
        total_records: state.store.len(),
    }))
}
