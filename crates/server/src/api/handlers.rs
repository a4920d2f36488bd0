//! HTTP request handlers and shared application state.

use crate::api::errors::ApiError;
use crate::api::models::GrowUnitResponse;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use ottometer_core::GrowUnit;
use ottometer_storage::{GrowUnitStore, Storage};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide store handle, opened once at startup.
    pub storage: Arc<Storage>,
    /// Time budget for a single storage operation.
    pub op_timeout: Duration,
}

impl AppState {
    pub fn new(storage: Arc<Storage>, op_timeout: Duration) -> Self {
        Self {
            storage,
            op_timeout,
        }
    }
}

/// Run a read on the blocking pool, bounded by the state's timeout.
///
/// sled transactions are synchronous; running them inline would stall the
/// async workers while a writer holds the lock. Abandoning a read on timeout
/// leaves no trace, so the task is simply left to finish.
async fn read_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&GrowUnitStore<'_>) -> ottometer_storage::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let storage = state.storage.clone();
    let task = tokio::task::spawn_blocking(move || f(&GrowUnitStore::new(&storage)));

    match tokio::time::timeout(state.op_timeout, task).await {
        Err(_) => {
            tracing::warn!(
                timeout_ms = state.op_timeout.as_millis() as u64,
                "storage read timed out"
            );
            Err(ApiError::Timeout)
        }
        Ok(joined) => finish(joined),
    }
}

/// Run a write on the blocking pool with a commit deadline.
///
/// The deadline is checked inside the transaction, so the response is only
/// a timeout when nothing was committed. The task is always awaited.
async fn write_store<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&GrowUnitStore<'_>) -> ottometer_storage::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let storage = state.storage.clone();
    let deadline = Instant::now() + state.op_timeout;
    let task = tokio::task::spawn_blocking(move || {
        f(&GrowUnitStore::new(&storage).with_deadline(deadline))
    });

    finish(task.await)
}

fn finish<T>(
    joined: Result<ottometer_storage::Result<T>, tokio::task::JoinError>,
) -> Result<T, ApiError> {
    match joined {
        Err(join_err) => Err(ApiError::Internal(format!(
            "storage task failed: {}",
            join_err
        ))),
        Ok(result) => result.map_err(ApiError::from),
    }
}

/// `GET /api/hello`
pub async fn hello() -> &'static str {
    "Hello World!\n"
}

/// `GET /api/growunits`
pub async fn list_grow_units(
    State(state): State<AppState>,
) -> Result<Json<Vec<GrowUnitResponse>>, ApiError> {
    let units = read_store(&state, |store| store.list()).await?;
    Ok(Json(units.into_iter().map(GrowUnitResponse::from).collect()))
}

/// `POST /api/growunits`
///
/// Responds with the identifier assigned to the new grow unit.
pub async fn create_grow_unit(
    State(state): State<AppState>,
    payload: Result<Json<GrowUnit>, JsonRejection>,
) -> Result<Json<u64>, ApiError> {
    let Json(unit) = payload?;
    let id = write_store(&state, move |store| store.create(&unit)).await?;
    tracing::info!(id, "grow unit created");
    Ok(Json(id))
}

/// `GET /api/growunits/:id`
pub async fn get_grow_unit(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<GrowUnitResponse>, ApiError> {
    let Path(id) = id?;
    let unit = read_store(&state, move |store| store.get(id)).await?;
    Ok(Json(unit.into()))
}

/// `PUT /api/growunits/:id`
///
/// Creates the record if the identifier is unused.
pub async fn update_grow_unit(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<GrowUnit>, JsonRejection>,
) -> Result<Json<u64>, ApiError> {
    let Path(id) = id?;
    let Json(unit) = payload?;
    let id = write_store(&state, move |store| store.update(&unit, id)).await?;
    tracing::info!(id, "grow unit updated");
    Ok(Json(id))
}
