//! Locally held vehicle collections kept in step with the inventory service.
//!
//! DESIGN
//! ======
//! A `VehicleCollection` owns one fetched view (all, recent or dashboard).
//! Mutations go to the service first and are followed by a full refetch, so
//! the local list is always a copy of what the service returned last. A failed
//! fetch leaves the previous list in place and records the message for display.

use std::fmt;

use tracing::{debug, warn};

use crate::api::{ApiError, VehicleApi};
use crate::inventory::filter::{Criteria, Matches, filter};
use crate::inventory::price::PriceTable;
use crate::inventory::{NewVehicle, Vehicle};

/// Which service view a collection mirrors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectionKind {
    /// `GET /vehicles`
    #[default]
    All,
    /// `GET /vehicles/recents`
    Recent,
    /// `GET /vehicles/dashboard`
    Dashboard,
}

impl CollectionKind {
    /// The price table this view filters with.
    #[must_use]
    pub fn price_table(self) -> PriceTable {
        match self {
            Self::All | Self::Recent => PriceTable::catalog(),
            Self::Dashboard => PriceTable::dashboard(),
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Recent => "recent",
            Self::Dashboard => "dashboard",
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct VehicleCollection {
    kind: CollectionKind,
    vehicles: Vec<Vehicle>,
    loading: bool,
    error: Option<String>,
}

impl VehicleCollection {
    #[must_use]
    pub fn new(kind: CollectionKind) -> Self {
        Self { kind, ..Self::default() }
    }

    #[must_use]
    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    #[must_use]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the most recent failed call, cleared by the next success.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Refetch this collection's view.
    ///
    /// # Errors
    ///
    /// Returns the service error. The previous list is kept.
    pub async fn refresh(&mut self, api: &dyn VehicleApi) -> Result<(), ApiError> {
        self.loading = true;
        let result = match self.kind {
            CollectionKind::All => api.list_vehicles().await,
            CollectionKind::Recent => api.recent_vehicles().await,
            CollectionKind::Dashboard => api.dashboard_vehicles().await,
        };
        self.loading = false;

        match result {
            Ok(vehicles) => {
                debug!(kind = %self.kind, count = vehicles.len(), "collection refreshed");
                self.vehicles = vehicles;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Validate and submit `vehicle`, then refetch.
    ///
    /// Once the service has accepted the vehicle the created record is
    /// returned even if the refetch fails; that failure is left in `error()`
    /// and the previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns the validation or create error. Nothing is sent when
    /// validation fails.
    pub async fn add(&mut self, api: &dyn VehicleApi, vehicle: NewVehicle) -> Result<Vehicle, ApiError> {
        if let Err(e) = vehicle.validate() {
            return Err(self.record(e.into()));
        }
        let created = match api.create_vehicle(&vehicle).await {
            Ok(created) => created,
            Err(e) => return Err(self.record(e)),
        };
        if let Err(e) = self.refresh(api).await {
            debug!(id = %created.id, error = %e, "vehicle created but refetch failed");
        }
        Ok(created)
    }

    /// Delete the vehicle with `id`, then refetch.
    ///
    /// # Errors
    ///
    /// Returns the service error.
    pub async fn remove(&mut self, api: &dyn VehicleApi, id: &str) -> Result<(), ApiError> {
        if let Err(e) = api.delete_vehicle(id).await {
            return Err(self.record(e));
        }
        self.refresh(api).await
    }

    /// The held vehicles narrowed by `criteria`.
    #[must_use]
    pub fn filtered<'a>(&'a self, criteria: &Criteria, table: &PriceTable) -> Matches<'a> {
        filter(&self.vehicles, criteria, table)
    }

    fn record(&mut self, err: ApiError) -> ApiError {
        warn!(kind = %self.kind, error = %err, "collection call failed");
        self.error = Some(err.to_string());
        err
    }
}

#[cfg(test)]
#[path = "collection_test.rs"]
mod tests;
