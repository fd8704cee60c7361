//! Server-rendered HTML pages.

use axum::{extract::State, http::StatusCode, response::Html};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use tracing::error;

use service::domain::Product;

use crate::errors::JsonApiError;
use crate::state::ServerState;

// `.html` names turn on HTML auto-escaping.
static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in [
        ("layout.html", include_str!("../templates/layout.html")),
        ("home.html", include_str!("../templates/home.html")),
        ("realtime_products.html", include_str!("../templates/realtime_products.html")),
    ] {
        env.add_template(name, source).expect("bundled template parses");
    }
    env
});

fn render(name: &str, title: &str, products: &[Product]) -> Result<Html<String>, JsonApiError> {
    TEMPLATES
        .get_template(name)
        .and_then(|tmpl| tmpl.render(context! { title, products }))
        .map(Html)
        .map_err(|e| {
            error!(template = name, err = %e, "template render failed");
            JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Render Failed", Some(e.to_string()))
        })
}

/// Product list rendered once per request.
pub async fn home(State(state): State<ServerState>) -> Result<Html<String>, JsonApiError> {
    let products = state.catalog.list().await;
    render("home.html", "Products", &products)
}

/// Product list kept current over `/ws`, with add and delete forms.
pub async fn realtime_products(State(state): State<ServerState>) -> Result<Html<String>, JsonApiError> {
    let products = state.catalog.list().await;
    render("realtime_products.html", "Realtime products", &products)
}
