use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use service::domain::{Product, ProductDraft, ProductPatch};
use service::storage::collection::Committed;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Return at most this many products, in insertion order.
    pub limit: Option<String>,
}

impl ListQuery {
    fn limit(&self) -> Result<Option<usize>, JsonApiError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse::<usize>().map(Some).map_err(|_| {
                JsonApiError::new(StatusCode::BAD_REQUEST, "Invalid Limit", Some(format!("limit must be a non-negative integer, got {raw:?}")))
            }),
        }
    }
}

/// Wait for the write behind a mutation. The in-memory change stands either way,
/// so a failed save is logged and the committed value is still returned.
pub(crate) async fn settle<T>(committed: Committed<T>) -> T {
    let (value, ticket) = committed.split();
    if let Err(e) = ticket.wait().await {
        warn!(err = %e, "write failed after commit; memory and file diverge until the next save");
    }
    value
}

#[utoipa::path(
    get, path = "/api/products", tag = "products",
    params(ListQuery),
    responses(
        (status = 200, description = "List OK", body = [crate::openapi::ProductDoc]),
        (status = 400, description = "Invalid Limit")
    )
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Vec<Product>>, JsonApiError> {
    let limit = q.limit()?;
    let products = state.catalog.list_bounded(limit).await;
    info!(count = products.len(), ?limit, "list products");
    Ok(Json(products))
}

#[utoipa::path(
    get, path = "/api/products/{pid}", tag = "products",
    params(("pid" = u64, Path, description = "Product id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ProductDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(pid): Path<u64>) -> Result<Json<Product>, JsonApiError> {
    Ok(Json(state.catalog.get(pid).await?))
}

#[utoipa::path(
    post, path = "/api/products", tag = "products",
    request_body = crate::openapi::ProductDraftDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error"),
        (status = 409, description = "Duplicate Code")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ProductDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), JsonApiError> {
    let Json(draft) = payload?;
    let product = settle(state.catalog.create(draft).await?).await;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put, path = "/api/products/{pid}", tag = "products",
    params(("pid" = u64, Path, description = "Product id")),
    request_body = crate::openapi::ProductPatchDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::ProductDoc),
        (status = 400, description = "Validation Error"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(pid): Path<u64>,
    payload: Result<Json<ProductPatch>, JsonRejection>,
) -> Result<Json<Product>, JsonApiError> {
    let Json(patch) = payload?;
    let product = settle(state.catalog.update(pid, patch).await?).await;
    Ok(Json(product))
}

#[utoipa::path(
    delete, path = "/api/products/{pid}", tag = "products",
    params(("pid" = u64, Path, description = "Product id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(pid): Path<u64>) -> Result<StatusCode, JsonApiError> {
    settle(state.catalog.delete(pid).await?).await;
    Ok(StatusCode::NO_CONTENT)
}
