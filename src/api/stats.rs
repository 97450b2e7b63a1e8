// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use chrono::Utc;

use crate::{
    aggregation::{summarize, RecordStats},
    state::AppState,
};

/// Summary statistics computed over the local store at request time.
#[utoipa::path(
    get,
    path = "/v1/stats",
    tag = "Stats",
    responses((status = 200, body = RecordStats))
)]
pub async fn get_stats(State(state): State<AppState>) -> Json<RecordStats> {
    Json(summarize(&state.store.list_all(), Utc::now()))
}
