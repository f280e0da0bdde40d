//! Vehicle records and the payloads used to create and edit them.
//!
//! DESIGN
//! ======
//! Prices travel as strings on the wire and are only interpreted as numbers
//! when a filter needs them (`Vehicle::price_value`). Deserialization is
//! lenient about numeric-vs-string encodings of `year` and `price` because
//! the inventory service has emitted both over time. A field that is missing
//! or unreadable decodes as empty so one bad record never fails a listing;
//! the filters then treat that field as non-matching.

pub mod filter;
pub mod price;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// VEHICLE
// =============================================================================

/// One image entry attached to a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImage {
    pub url: String,
}

impl VehicleImage {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// One inventory item as returned by the inventory service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    /// `None` when the record has no readable integral year.
    #[serde(default, deserialize_with = "de_year", skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// String-encoded decimal. `None` when the record carries no price.
    #[serde(default, deserialize_with = "de_price", skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<VehicleImage>,
    #[serde(default = "default_available")]
    pub available: bool,
    /// Unix seconds at which the record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

fn default_available() -> bool {
    true
}

impl Vehicle {
    /// Price as a float. Missing, blank, non-numeric and non-finite prices yield `None`.
    #[must_use]
    pub fn price_value(&self) -> Option<f64> {
        parse_price(self.price.as_deref()?)
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}

pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

fn de_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        NumberOrString::Int(n) => i32::try_from(n).ok(),
        // 2020.0 prints as "2020"; fractional years do not parse.
        NumberOrString::Float(f) => f.to_string().parse::<i32>().ok(),
        NumberOrString::Text(s) => s.trim().parse::<i32>().ok(),
        NumberOrString::Other(_) => None,
    }))
}

fn de_price<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        NumberOrString::Int(n) => Some(n.to_string()),
        NumberOrString::Float(f) => Some(f.to_string()),
        NumberOrString::Text(s) => Some(s),
        NumberOrString::Other(_) => None,
    }))
}

// =============================================================================
// CREATE / UPDATE PAYLOADS
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("price must be a number, got {0:?}")]
    InvalidPrice(String),
    #[error("at least one image is required")]
    NoImages,
}

/// Binary image attached to an add-vehicle submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Build an upload, guessing the content type from the file extension.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_owned();
        Self { file_name, content_type, bytes }
    }
}

pub(crate) fn content_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

/// The add-vehicle form: text fields plus the images to upload.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: String,
    pub description: String,
    pub available: bool,
    pub images: Vec<ImageUpload>,
}

impl NewVehicle {
    /// Check the form before it is submitted.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: blank brand/model, non-numeric price,
    /// or no attached image.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.brand.trim().is_empty() {
            return Err(InventoryError::MissingField("brand"));
        }
        if self.model.trim().is_empty() {
            return Err(InventoryError::MissingField("model"));
        }
        if parse_price(&self.price).is_none() {
            return Err(InventoryError::InvalidPrice(self.price.clone()));
        }
        if self.images.is_empty() {
            return Err(InventoryError::NoImages);
        }
        Ok(())
    }
}

/// Partial edit for `PUT /vehicles/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl VehicleUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the edit in place.
    ///
    /// # Errors
    ///
    /// Rejects blank brand/model and non-numeric prices without touching `vehicle`.
    pub fn apply(&self, vehicle: &mut Vehicle) -> Result<(), InventoryError> {
        if self.brand.as_deref().is_some_and(|b| b.trim().is_empty()) {
            return Err(InventoryError::MissingField("brand"));
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(InventoryError::MissingField("model"));
        }
        if let Some(price) = &self.price {
            if parse_price(price).is_none() {
                return Err(InventoryError::InvalidPrice(price.clone()));
            }
        }

        if let Some(brand) = &self.brand {
            vehicle.brand.clone_from(brand);
        }
        if let Some(model) = &self.model {
            vehicle.model.clone_from(model);
        }
        if let Some(year) = self.year {
            vehicle.year = Some(year);
        }
        if let Some(price) = &self.price {
            vehicle.price = Some(price.clone());
        }
        if let Some(description) = &self.description {
            vehicle.description.clone_from(description);
        }
        if let Some(available) = self.available {
            vehicle.available = available;
        }
        Ok(())
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Minimal vehicle with one image.
    #[must_use]
    pub fn vehicle(id: &str, brand: &str, model: &str, year: i32, price: Option<&str>) -> Vehicle {
        Vehicle {
            id: id.into(),
            brand: brand.into(),
            model: model.into(),
            year: Some(year),
            price: price.map(Into::into),
            description: String::new(),
            images: vec![VehicleImage::new(format!("/uploads/{id}-front.jpg"))],
            available: true,
            created_at: None,
        }
    }

    /// Vehicle carrying `count` images.
    #[must_use]
    pub fn vehicle_with_images(id: &str, count: usize) -> Vehicle {
        let mut v = vehicle(id, "Mazda", "MX-5", 2021, Some("32000"));
        v.images = (0..count)
            .map(|i| VehicleImage::new(format!("/uploads/{id}-{i}.jpg")))
            .collect();
        v
    }

    #[must_use]
    pub fn new_vehicle() -> NewVehicle {
        NewVehicle {
            brand: "Toyota".into(),
            model: "Supra".into(),
            year: 2022,
            price: "55000".into(),
            description: "Twin-scroll turbo, one owner".into(),
            available: true,
            images: vec![ImageUpload::new("supra-front.jpg", vec![0xFF, 0xD8, 0xFF])],
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
