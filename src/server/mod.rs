//! Inventory service: the REST endpoints the dealership client consumes.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the in-memory reference implementation of the remote inventory
//! API. `showroom serve` runs it for local development, and the client's
//! end-to-end tests bind it to an ephemeral port.
//!
//! Reads are public; create, edit and delete require an admin bearer token.

pub mod auth;
pub mod error;
pub mod state;
pub mod vehicles;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::ServerError;
pub use state::AppState;

use crate::config::ServerConfig;
use crate::inventory::Vehicle;
use crate::session::now_unix;
use state::StoredImage;

/// Assemble the router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/vehicles", get(vehicles::list_vehicles))
        .route("/vehicles/recents", get(vehicles::recent_vehicles))
        .route("/vehicles/dashboard", get(vehicles::dashboard_vehicles))
        .route("/vehicles/addVehicle", post(vehicles::add_vehicle))
        .route(
            "/vehicles/{id}",
            put(vehicles::update_vehicle).delete(vehicles::delete_vehicle),
        )
        .route("/uploads/{id}", get(vehicles::get_upload))
        .route("/auth/login", post(auth::login))
        .route("/healthz", get(healthz))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Bind `0.0.0.0:{port}` and serve until the process exits.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let port = config.port;
    let seed = config.seed_demo;
    let state = AppState::new(config);
    if seed {
        seed_demo_inventory(&state).await;
    }

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(%port, "showroom inventory service listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}

const DEMO_STOCK: &[(&str, &str, i32, &str, &str)] = &[
    ("Toyota", "Corolla", 2021, "21500", "Reliable commuter with adaptive cruise."),
    ("Honda", "Civic", 2022, "27900", "Sport trim, manual gearbox."),
    ("Ford", "Mustang", 2020, "48000", "5.0 V8, performance pack."),
    ("BMW", "X5", 2023, "89000", "xDrive40i, panoramic roof."),
    ("Porsche", "911", 2022, "165000", "Carrera S, sport chrono."),
    ("Ferrari", "Roma", 2023, "245000", "Delivery miles only."),
];

fn placeholder_svg(brand: &str, model: &str, view: &str) -> Vec<u8> {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"500\">\
         <rect width=\"100%\" height=\"100%\" fill=\"#1f2933\"/>\
         <text x=\"50%\" y=\"50%\" fill=\"#f5f7fa\" font-size=\"40\" text-anchor=\"middle\">{brand} {model} ({view})</text>\
         </svg>"
    )
    .into_bytes()
}

/// Fill an empty inventory with demo vehicles and placeholder images.
pub async fn seed_demo_inventory(state: &AppState) {
    let mut inventory = state.inventory.write().await;
    if !inventory.is_empty() {
        return;
    }
    let now = now_unix();
    for &(brand, model, year, price, description) in DEMO_STOCK {
        let images = ["front", "side", "interior"]
            .iter()
            .map(|view| {
                inventory.store_image(StoredImage {
                    content_type: "image/svg+xml".into(),
                    bytes: placeholder_svg(brand, model, view),
                })
            })
            .collect();
        inventory.insert(Vehicle {
            id: uuid::Uuid::new_v4().to_string(),
            brand: brand.into(),
            model: model.into(),
            year: Some(year),
            price: Some(price.into()),
            description: description.into(),
            images,
            available: true,
            created_at: Some(now),
        });
    }
    info!(vehicles = inventory.len(), "seeded demo inventory");
}

#[cfg(test)]
pub mod test_helpers;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
