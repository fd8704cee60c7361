use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use service::domain::Cart;
use service::file::cart_store::AddToCart;

use crate::errors::JsonApiError;
use crate::routes::products::settle;
use crate::state::ServerState;

/// Optional body of the add-to-cart call.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartInput {
    #[serde(default)]
    pub quantity: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddToCartOutput {
    pub message: String,
    /// `None` when the cart id did not resolve.
    pub cart: Option<Cart>,
}

#[utoipa::path(
    post, path = "/api/carts", tag = "carts",
    responses((status = 201, description = "Created", body = crate::openapi::CartDoc))
)]
pub async fn create(State(state): State<ServerState>) -> Result<(StatusCode, Json<Cart>), JsonApiError> {
    let cart = settle(state.carts.create_cart().await?).await;
    Ok((StatusCode::CREATED, Json(cart)))
}

#[utoipa::path(
    get, path = "/api/carts/{cid}", tag = "carts",
    params(("cid" = String, Path, description = "Cart id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::CartDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(cid): Path<String>) -> Result<Json<Cart>, JsonApiError> {
    Ok(Json(state.carts.get_cart(&cid).await?))
}

// The body is optional and may be empty or lack `quantity`; anything that does
// not parse falls back to the default quantity.
fn parse_quantity(body: &[u8]) -> Option<u32> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<AddToCartInput>(body) {
        Ok(input) => input.quantity,
        Err(e) => {
            debug!(err = %e, "unparseable add-to-cart body; using default quantity");
            None
        }
    }
}

#[utoipa::path(
    post, path = "/api/carts/{cid}/product/{pid}", tag = "carts",
    params(
        ("cid" = String, Path, description = "Cart id"),
        ("pid" = u64, Path, description = "Product id, not checked against the catalog")
    ),
    request_body(content = crate::openapi::AddToCartDoc, description = "Optional; quantity defaults to 1"),
    responses(
        (status = 200, description = "Added, or silently ignored when the cart does not exist"),
        (status = 400, description = "Invalid path")
    )
)]
pub async fn add_product(
    State(state): State<ServerState>,
    Path((cid, pid)): Path<(String, u64)>,
    body: Bytes,
) -> Result<Json<AddToCartOutput>, JsonApiError> {
    let quantity = parse_quantity(&body);
    let cart = match state.carts.add_product(&cid, pid, quantity).await? {
        AddToCart::Updated(committed) => Some(settle(committed).await),
        AddToCart::NoOp => None,
    };
    Ok(Json(AddToCartOutput { message: "product added to cart".to_string(), cart }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_parsing_is_lenient() {
        assert_eq!(parse_quantity(b""), None);
        assert_eq!(parse_quantity(b"  \n"), None);
        assert_eq!(parse_quantity(b"{}"), None);
        assert_eq!(parse_quantity(br#"{"quantity": 3}"#), Some(3));
        assert_eq!(parse_quantity(br#"{"quantity": "many"}"#), None);
        assert_eq!(parse_quantity(b"not json"), None);
    }
}
