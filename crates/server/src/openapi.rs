use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ProductDoc {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: String,
    pub code: String,
    pub stock: u64,
}

/// All fields are required by validation; `price` and `stock` must be > 0.
#[derive(ToSchema)]
pub struct ProductDraftDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub code: Option<String>,
    pub stock: Option<u64>,
}

#[derive(ToSchema)]
pub struct ProductPatchDoc {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub thumbnail: Option<String>,
    pub stock: Option<u64>,
}

#[allow(non_snake_case)]
#[derive(ToSchema)]
pub struct CartItemDoc { pub productId: u64, pub quantity: u32 }

#[derive(ToSchema)]
pub struct CartDoc { pub id: String, pub items: Vec<CartItemDoc> }

#[derive(ToSchema)]
pub struct AddToCartDoc { pub quantity: Option<u32> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::create,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::carts::create,
        crate::routes::carts::get,
        crate::routes::carts::add_product,
    ),
    components(
        schemas(
            HealthResponse,
            ProductDoc,
            ProductDraftDoc,
            ProductPatchDoc,
            CartItemDoc,
            CartDoc,
            AddToCartDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "products"),
        (name = "carts")
    )
)]
pub struct ApiDoc;
