//! Vehicle routes: listing views, multipart create, edit, delete and uploads.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use tracing::info;
use uuid::Uuid;

use super::auth::AdminUser;
use super::error::ServerError;
use super::state::{AppState, RECENT_LIMIT, StoredImage};
use crate::api::MessageBody;
use crate::inventory::{ImageUpload, NewVehicle, Vehicle, VehicleUpdate, content_type_for};
use crate::session::now_unix;

/// `GET /vehicles`: every vehicle, insertion order.
pub async fn list_vehicles(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    Json(state.inventory.read().await.all())
}

/// `GET /vehicles/recents`: newest arrivals for the landing page.
pub async fn recent_vehicles(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    Json(state.inventory.read().await.recent(RECENT_LIMIT))
}

/// `GET /vehicles/dashboard`: every vehicle, newest first.
pub async fn dashboard_vehicles(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    Json(state.inventory.read().await.newest_first())
}

/// `POST /vehicles/addVehicle`: multipart form with one `images` part per file.
pub async fn add_vehicle(
    State(state): State<AppState>,
    admin: AdminUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vehicle>), ServerError> {
    let form = read_vehicle_form(multipart).await?;
    form.validate()?;

    let mut inventory = state.inventory.write().await;
    let images = form
        .images
        .into_iter()
        .map(|upload| inventory.store_image(StoredImage { content_type: upload.content_type, bytes: upload.bytes }))
        .collect();
    let vehicle = Vehicle {
        id: Uuid::new_v4().to_string(),
        brand: form.brand.trim().to_owned(),
        model: form.model.trim().to_owned(),
        year: Some(form.year),
        price: Some(form.price.trim().to_owned()),
        description: form.description,
        images,
        available: form.available,
        created_at: Some(now_unix()),
    };
    inventory.insert(vehicle.clone());
    info!(id = %vehicle.id, admin = %admin.email, images = vehicle.images.len(), "vehicle added");
    Ok((StatusCode::CREATED, Json(vehicle)))
}

async fn read_vehicle_form(mut multipart: Multipart) -> Result<NewVehicle, ServerError> {
    let mut form = NewVehicle {
        brand: String::new(),
        model: String::new(),
        year: 0,
        price: String::new(),
        description: String::new(),
        available: true,
        images: Vec::new(),
    };
    let mut year = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "images" {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let content_type = field
                .content_type()
                .map_or_else(|| content_type_for(&file_name).to_owned(), str::to_owned);
            let bytes: Bytes = field.bytes().await?;
            if bytes.is_empty() {
                continue;
            }
            form.images.push(ImageUpload { file_name, content_type, bytes: bytes.to_vec() });
            continue;
        }

        let value = field.text().await?;
        match name.as_str() {
            "brand" => form.brand = value,
            "model" => form.model = value,
            "year" => {
                year = Some(
                    value
                        .trim()
                        .parse::<i32>()
                        .map_err(|_| ServerError::BadRequest(format!("year must be an integer, got {value:?}")))?,
                );
            }
            "price" => form.price = value,
            "description" => form.description = value,
            "available" => form.available = !matches!(value.trim(), "false" | "0" | "off" | "no"),
            _ => {}
        }
    }

    form.year = year.ok_or_else(|| ServerError::BadRequest("year is required".into()))?;
    Ok(form)
}

/// `PUT /vehicles/{id}`: partial edit.
pub async fn update_vehicle(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(update): Json<VehicleUpdate>,
) -> Result<Json<Vehicle>, ServerError> {
    let updated = state
        .inventory
        .write()
        .await
        .update(&id, &update)?
        .ok_or_else(|| ServerError::VehicleNotFound(id.clone()))?;
    info!(%id, admin = %admin.email, "vehicle updated");
    Ok(Json(updated))
}

/// `DELETE /vehicles/{id}`
pub async fn delete_vehicle(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ServerError> {
    let removed = state
        .inventory
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| ServerError::VehicleNotFound(id.clone()))?;
    info!(%id, admin = %admin.email, images = removed.images.len(), "vehicle deleted");
    Ok(Json(MessageBody { message: format!("vehicle {id} deleted") }))
}

/// `GET /uploads/{id}`: raw image bytes.
pub async fn get_upload(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response, ServerError> {
    let inventory = state.inventory.read().await;
    let image = inventory.image(&id).ok_or(ServerError::ImageNotFound)?;
    Ok(([(CONTENT_TYPE, image.content_type.clone())], image.bytes.clone()).into_response())
}
