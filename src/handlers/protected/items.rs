use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::store::Item;

/// GET /table/:table_name/items - Full scan, each item annotated with `__id`
pub async fn items_get(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
) -> ApiResult<Vec<Item>> {
    let items = state.table(&table_name).list().await?;
    Ok(ApiResponse::success(items))
}

/// GET /table/:table_name/item/:item_id - Single item or 404
pub async fn item_get(
    State(state): State<AppState>,
    Path((table_name, item_id)): Path<(String, String)>,
) -> ApiResult<Item> {
    let item = state
        .table(&table_name)
        .get(&item_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Item '{}' not found in {}", item_id, table_name)))?;
    Ok(ApiResponse::success(item))
}

/// POST /table/:table_name/item - Create (upsert); missing key values are generated
pub async fn item_post(
    State(state): State<AppState>,
    Path(table_name): Path<String>,
    payload: Result<Json<Item>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(item) = payload?;
    let created = state.table(&table_name).create(item).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /table/:table_name/item/:item_id - Replace; the id decides the key
pub async fn item_put(
    State(state): State<AppState>,
    Path((table_name, item_id)): Path<(String, String)>,
    payload: Result<Json<Item>, JsonRejection>,
) -> ApiResult<Item> {
    let Json(item) = payload?;
    let updated = state.table(&table_name).update(&item_id, item).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /table/:table_name/item/:item_id - Idempotent delete
pub async fn item_delete(
    State(state): State<AppState>,
    Path((table_name, item_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    state.table(&table_name).delete(&item_id).await?;
    Ok(ApiResponse::success(json!({ "id": item_id, "deleted": true })))
}
