//! HTTP server for the Salonbase API.
//!
//! # API Endpoints
//!
//! | Method | Path                      | Description                          |
//! |--------|---------------------------|--------------------------------------|
//! | GET    | `/health`                 | Health check                         |
//! | POST   | `/api/import/{entity}`    | Upload a CSV file for import         |
//! | GET    | `/api/export/{entity}`    | Download entity rows as CSV          |
//! | POST   | `/api/membership/upgrade` | Change a customer's membership plan  |
//! | GET    | `/api/reports/revenue`    | Revenue totals by day or month       |
//! | GET    | `/api/logs`               | SSE stream for real-time progress    |

use axum::{
    extract::{Multipart, Path, Query},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, PROGRESS};
use super::types::{
    error_response, new_job_id, ImportResponse, RevenueResponse, RowErrors, UpgradeRequest,
    UpgradeResponse, ValidationStats,
};
use crate::error::{ImportError, ServiceError};
use crate::membership::upgrade_plan;
use crate::models::Entity;
use crate::reports::{revenue_by_day, revenue_by_month};
use crate::service::DataServiceClient;
use crate::transfer::{self, MemorySink};
use crate::validation::validate_rows;

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // CORS stays permissive: the web client runs on its own origin.
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/import/{entity}", post(import_entity))
        .route("/api/export/{entity}", get(export_entity))
        .route("/api/membership/upgrade", post(upgrade_membership))
        .route("/api/reports/revenue", get(revenue_report))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Salonbase server running on http://localhost:{}", port);
    println!("   POST /api/import/{{entity}}    - Upload CSV file");
    println!("   GET  /api/export/{{entity}}    - Download CSV export");
    println!("   POST /api/membership/upgrade - Change membership plan");
    println!("   GET  /api/reports/revenue    - Revenue report");
    println!("   GET  /api/logs               - SSE progress stream");
    println!("   GET  /health                 - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salonbase",
        "version": env!("CARGO_PKG_VERSION"),
        "entities": Entity::all().map(|e| e.to_string()),
    }))
}

/// SSE endpoint for real-time progress streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = PROGRESS.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[derive(Debug, Deserialize)]
struct ImportQuery {
    #[serde(default)]
    dry_run: bool,
}

/// CSV import endpoint
async fn import_entity(
    Path(entity): Path<String>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, (StatusCode, Json<Value>)> {
    let entity: Entity = entity.parse().map_err(|e: String| bad_request(&e))?;
    if !entity.importable() {
        return Err(bad_request(&format!(
            "CSV import is not offered for {}",
            entity
        )));
    }

    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data.ok_or_else(|| bad_request("No file provided"))?;
    let file_name = file_name.ok_or_else(|| bad_request("No file name provided"))?;

    log_info(format!(
        "Importing {} ({} bytes) into {}",
        file_name,
        bytes.len(),
        entity
    ));

    let text = transfer::decode_upload_bytes(&bytes).map_err(import_failure)?;
    let columns = entity.columns();
    let records = transfer::parse_import(&file_name, &text, &columns).map_err(import_failure)?;

    let (valid, failures) = validate_rows(entity, &records);
    if !failures.is_empty() {
        log_error(format!(
            "{} of {} rows failed validation",
            failures.len(),
            records.len()
        ));
        let stats = ValidationStats {
            valid,
            invalid: failures.len(),
            errors: failures
                .into_iter()
                .map(|(row_index, errors)| RowErrors { row_index, errors })
                .collect(),
        };
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "jobId": new_job_id(),
                "status": "invalid",
                "validation": stats,
            })),
        ));
    }

    let mut imported = 0;
    if query.dry_run {
        log_success(format!(
            "Validated {} rows for {} (dry run)",
            records.len(),
            entity
        ));
    } else {
        let client = DataServiceClient::from_env().map_err(service_failure)?;
        for (index, record) in records.iter().enumerate() {
            client.insert_record(entity, record).await.map_err(|e| {
                import_failure(ImportError::CallbackFailure {
                    row: index + 1,
                    message: e.to_string(),
                })
            })?;
            imported += 1;
        }
        log_success(format!("Imported {} rows into {}", imported, entity));
    }

    Ok(Json(ImportResponse {
        job_id: new_job_id(),
        status: if query.dry_run { "validated" } else { "imported" }.to_string(),
        entity: entity.to_string(),
        imported,
        parsed: records.len(),
        dry_run: query.dry_run,
        validation: ValidationStats {
            valid,
            invalid: 0,
            errors: vec![],
        },
    }))
}

#[derive(Debug, Deserialize)]
struct ExportQuery {
    #[serde(default)]
    sample: bool,
}

/// CSV export endpoint
async fn export_entity(
    Path(entity): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let entity: Entity = entity.parse().map_err(|e: String| bad_request(&e))?;
    let columns = entity.columns();
    let mut sink = MemorySink::new();

    let delivered = if query.sample {
        transfer::export_sample(&columns, entity.base_name(), &mut sink)
    } else {
        let client = DataServiceClient::from_env().map_err(service_failure)?;
        let records = client.fetch_entity(entity).await.map_err(service_failure)?;
        log_success(format!("Exporting {} {} rows", records.len(), entity));
        transfer::export_csv(
            &records,
            &columns,
            entity.base_name(),
            Utc::now().date_naive(),
            &mut sink,
        )
    };
    delivered.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&e.to_string())),
        )
    })?;

    let filename = sink.filename.unwrap_or_default();
    let body = sink.content.unwrap_or_default();

    Ok((
        [
            (header::CONTENT_TYPE, transfer::CSV_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response())
}

/// Membership plan-change endpoint
async fn upgrade_membership(
    Json(request): Json<UpgradeRequest>,
) -> Result<Json<UpgradeResponse>, (StatusCode, Json<Value>)> {
    let client = DataServiceClient::from_env().map_err(service_failure)?;

    let outcome = upgrade_plan(
        &client,
        &request.customer_id,
        request.old_plan.as_ref(),
        &request.new_plan,
    )
    .await
    .map_err(|e| {
        log_error(format!("Plan change failed: {}", e));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(error_response(&e.to_string())),
        )
    })?;

    Ok(Json(UpgradeResponse {
        job_id: new_job_id(),
        status: "upgraded".to_string(),
        outcome,
    }))
}

#[derive(Debug, Deserialize)]
struct RevenueQuery {
    by: Option<String>,
}

/// Revenue report endpoint
async fn revenue_report(
    Query(query): Query<RevenueQuery>,
) -> Result<Json<RevenueResponse>, (StatusCode, Json<Value>)> {
    let by = query.by.unwrap_or_else(|| "day".to_string());

    let client = DataServiceClient::from_env().map_err(service_failure)?;
    let sales = client
        .fetch_entity(Entity::Sales)
        .await
        .map_err(service_failure)?;

    let (buckets, skipped) = match by.as_str() {
        "day" => revenue_by_day(&sales),
        "month" => revenue_by_month(&sales),
        other => {
            return Err(bad_request(&format!(
                "Unknown grouping '{}' (expected day or month)",
                other
            )))
        }
    };

    Ok(Json(RevenueResponse {
        by,
        buckets,
        skipped,
    }))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(error_response(message)))
}

fn service_failure(error: ServiceError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_response(&error.to_string())),
    )
}

fn import_failure(error: ImportError) -> (StatusCode, Json<Value>) {
    let status = match error {
        ImportError::CallbackFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(error_response(&error.to_string())))
}
