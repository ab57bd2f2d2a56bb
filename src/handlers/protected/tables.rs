use axum::extract::State;
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub table_name: String,
    pub item_count: usize,
}

/// GET /tables - Every table with its item count
pub async fn tables_get(State(state): State<AppState>) -> ApiResult<Vec<TableSummary>> {
    let names = state.store.list_tables().await?;

    let mut tables = Vec::with_capacity(names.len());
    for table_name in names {
        // One unreadable table should not hide the rest
        let item_count = match state.table(&table_name).count().await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not count items in {}: {}", table_name, e);
                0
            }
        };
        tables.push(TableSummary {
            table_name,
            item_count,
        });
    }

    Ok(ApiResponse::success(tables))
}

/// GET /tables/names - Sorted table names
pub async fn table_names_get(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(ApiResponse::success(state.store.list_tables().await?))
}
