use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use pack_allocator::config::Config;
use pack_allocator::{AllocationError, AllocationService, CatalogSnapshot, Fulfillment};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

type AppState = Arc<AllocationService>;
type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

#[derive(Deserialize, Serialize)]
struct AllocateRequest {
    items: i64,
}

#[derive(Serialize)]
struct AllocateResponse {
    items: u64,
    catalog_version: u64,
    packs: Fulfillment,
    pack_count: u64,
    total_items: u64,
    overage: u64,
}

#[derive(Deserialize, Serialize)]
struct PutSizesRequest {
    sizes: Vec<i64>,
}

#[derive(Deserialize, Serialize)]
struct AddSizeRequest {
    size: i64,
}

fn to_status(err: AllocationError) -> (StatusCode, String) {
    if err.is_user_error() {
        tracing::warn!(error = %err, "rejected request");
        (StatusCode::BAD_REQUEST, err.to_string())
    } else {
        tracing::error!(error = %err, "allocation failed");
        sentry::capture_error(&err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

async fn allocate(
    State(service): State<AppState>,
    Json(req): Json<AllocateRequest>,
) -> ApiResult<AllocateResponse> {
    tracing::info!(items = req.items, "POST /allocate");

    let snapshot = service.list_catalog();
    let catalog_version = snapshot.version;
    let items = req.items;
    let solver = Arc::clone(&service);
    let fulfillment = tokio::task::spawn_blocking(move || solver.solve_against(items, &snapshot))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(to_status)?;

    let items = items as u64;
    Ok(Json(AllocateResponse {
        items,
        catalog_version,
        pack_count: fulfillment.pack_count(),
        total_items: fulfillment.total_items(),
        overage: fulfillment.overage(items),
        packs: fulfillment,
    }))
}

async fn list_packs(State(service): State<AppState>) -> Json<CatalogSnapshot> {
    Json(service.list_catalog().as_ref().clone())
}

async fn put_packs(
    State(service): State<AppState>,
    Json(req): Json<PutSizesRequest>,
) -> ApiResult<CatalogSnapshot> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "PUT /packs"
    );
    let snapshot = service.set_catalog(req.sizes).map_err(to_status)?;
    Ok(Json(snapshot.as_ref().clone()))
}

async fn add_pack(
    State(service): State<AppState>,
    Json(req): Json<AddSizeRequest>,
) -> ApiResult<CatalogSnapshot> {
    tracing::info!(size = req.size, "POST /packs");
    let snapshot = service.add_size(req.size).map_err(to_status)?;
    Ok(Json(snapshot.as_ref().clone()))
}

async fn remove_pack(
    State(service): State<AppState>,
    Path(size): Path<u64>,
) -> ApiResult<CatalogSnapshot> {
    tracing::info!(size, "DELETE /packs");
    let snapshot = service.remove_size(size).map_err(to_status)?;
    Ok(Json(snapshot.as_ref().clone()))
}

fn app(service: AppState) -> Router {
    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/allocate", post(allocate))
        .route("/packs", get(list_packs).put(put_packs).post(add_pack))
        .route("/packs/{size}", delete(remove_pack))
        .with_state(service)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[tokio::main]
async fn main() {
    let config_path = std::env::var("PACK_ALLOCATOR_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.server.log_file)
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to open {}: {}", config.server.log_file.display(), e);
            std::process::exit(1);
        });

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let service = AllocationService::from_config(&config.solver, &config.cache)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
    tracing::info!(
        strategy = service.strategy_name(),
        catalog = %service.list_catalog().catalog,
        max_order = service.max_order(),
        "pack allocator starting"
    );

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to bind {}: {}", addr, e);
            std::process::exit(1);
        });
    eprintln!("Listening on {addr}");
    if let Err(e) = axum::serve(listener, app(Arc::new(service))).await {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}
