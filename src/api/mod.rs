// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    aggregation::RecordStats,
    models::{
        CreateRecordRequest, DisclosureResponse, RecordListResponse, RecordResponse, SyncResponse,
    },
    records::RecordId,
    state::AppState,
    sync::SyncReport,
};

pub mod health;
pub mod records;
pub mod stats;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/records",
            get(records::list_records).post(records::create_record),
        )
        // Static segment, matched ahead of `{record_id}`.
        .route("/records/sync", post(records::sync_records))
        .route("/records/{record_id}", get(records::get_record))
        .route(
            "/records/{record_id}/disclose",
            post(records::disclose_record),
        )
        .route("/stats", get(stats::get_stats))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        records::list_records,
        records::create_record,
        records::get_record,
        records::disclose_record,
        records::sync_records,
        stats::get_stats,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            RecordId,
            CreateRecordRequest,
            RecordResponse,
            RecordListResponse,
            DisclosureResponse,
            SyncReport,
            SyncResponse,
            RecordStats,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Records", description = "Confidential record submission and verified disclosure"),
        (name = "Stats", description = "Aggregate statistics"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
