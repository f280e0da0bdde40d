//! Shared service state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! inventory lives entirely in memory: vehicles in insertion order plus the
//! uploaded image bytes keyed by upload id. Newest-first views are derived by
//! walking the list backwards, so no clock ordering is needed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::inventory::{InventoryError, Vehicle, VehicleImage, VehicleUpdate};

/// Number of vehicles returned by `GET /vehicles/recents`.
pub const RECENT_LIMIT: usize = 6;

pub const UPLOAD_PREFIX: &str = "/uploads/";

// =============================================================================
// INVENTORY
// =============================================================================

/// Uploaded image bytes served back under `/uploads/{id}`.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Inventory {
    vehicles: Vec<Vehicle>,
    images: HashMap<Uuid, StoredImage>,
}

impl Inventory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All vehicles in insertion order.
    #[must_use]
    pub fn all(&self) -> Vec<Vehicle> {
        self.vehicles.clone()
    }

    /// The newest `limit` vehicles, newest first.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<Vehicle> {
        self.vehicles.iter().rev().take(limit).cloned().collect()
    }

    /// All vehicles, newest first.
    #[must_use]
    pub fn newest_first(&self) -> Vec<Vehicle> {
        self.vehicles.iter().rev().cloned().collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Store an uploaded image and return the entry pointing at it.
    pub fn store_image(&mut self, image: StoredImage) -> VehicleImage {
        let id = Uuid::new_v4();
        self.images.insert(id, image);
        VehicleImage::new(format!("{UPLOAD_PREFIX}{id}"))
    }

    #[must_use]
    pub fn image(&self, id: &Uuid) -> Option<&StoredImage> {
        self.images.get(id)
    }

    #[must_use]
    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn insert(&mut self, vehicle: Vehicle) {
        self.vehicles.push(vehicle);
    }

    /// Apply `update` to the vehicle with `id`, returning the edited record.
    ///
    /// Returns `Ok(None)` when no such vehicle exists.
    ///
    /// # Errors
    ///
    /// Returns the validation error when the update is rejected.
    pub fn update(&mut self, id: &str, update: &VehicleUpdate) -> Result<Option<Vehicle>, InventoryError> {
        let Some(vehicle) = self.vehicles.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        update.apply(vehicle)?;
        Ok(Some(vehicle.clone()))
    }

    /// Remove a vehicle and the uploads it referenced.
    pub fn remove(&mut self, id: &str) -> Option<Vehicle> {
        let index = self.vehicles.iter().position(|v| v.id == id)?;
        let vehicle = self.vehicles.remove(index);
        for image in &vehicle.images {
            if let Some(upload_id) = upload_id(&image.url) {
                self.images.remove(&upload_id);
            }
        }
        Some(vehicle)
    }
}

/// Extract the upload id from an `/uploads/{id}` URL.
pub(crate) fn upload_id(url: &str) -> Option<Uuid> {
    url.strip_prefix(UPLOAD_PREFIX).and_then(|raw| Uuid::parse_str(raw).ok())
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub inventory: Arc<RwLock<Inventory>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), inventory: Arc::new(RwLock::new(Inventory::new())) }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
