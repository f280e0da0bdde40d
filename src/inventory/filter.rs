//! Client-side search and filtering over an already-fetched vehicle list.
//!
//! DESIGN
//! ======
//! Five independent predicates combined with AND; an empty criterion is
//! inactive and matches everything. When nothing is active the input slice
//! is handed back as-is, so recomputing on every keystroke costs nothing for
//! the unfiltered view.
//!
//! ERROR HANDLING
//! ==============
//! There are no error states. A field that cannot be compared (missing or
//! non-numeric price, unknown price bucket) simply fails its predicate.

use super::Vehicle;
use super::price::PriceTable;

/// The criteria currently applied to a listing, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Case-insensitive substring of brand or model.
    pub search: String,
    /// Exact model year.
    pub year: String,
    /// Exact model line.
    pub model: String,
    /// Exact brand.
    pub brand: String,
    /// Price bucket key from the listing's `PriceTable`.
    pub price: String,
}

impl Criteria {
    #[must_use]
    pub fn search(mut self, term: &str) -> Self {
        term.clone_into(&mut self.search);
        self
    }

    #[must_use]
    pub fn year(mut self, year: &str) -> Self {
        year.clone_into(&mut self.year);
        self
    }

    #[must_use]
    pub fn model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.model);
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: &str) -> Self {
        brand.clone_into(&mut self.brand);
        self
    }

    #[must_use]
    pub fn price(mut self, bucket: &str) -> Self {
        bucket.clone_into(&mut self.price);
        self
    }

    /// True when no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.search, &self.year, &self.model, &self.brand, &self.price]
            .iter()
            .all(|field| active(field).is_none())
    }

    /// Whether `vehicle` satisfies every active criterion.
    #[must_use]
    pub fn matches(&self, vehicle: &Vehicle, table: &PriceTable) -> bool {
        if let Some(term) = active(&self.search) {
            let term = term.to_lowercase();
            if !vehicle.brand.to_lowercase().contains(&term) && !vehicle.model.to_lowercase().contains(&term) {
                return false;
            }
        }
        if let Some(year) = active(&self.year) {
            if vehicle.year.is_none_or(|y| y.to_string() != year) {
                return false;
            }
        }
        if let Some(model) = active(&self.model) {
            if vehicle.model != model {
                return false;
            }
        }
        if let Some(brand) = active(&self.brand) {
            if vehicle.brand != brand {
                return false;
            }
        }
        if let Some(bucket) = active(&self.price) {
            if !table.matches(bucket, vehicle.price_value()) {
                return false;
            }
        }
        true
    }
}

fn active(field: &str) -> Option<&str> {
    let trimmed = field.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Result of a filter pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Matches<'a> {
    /// No criterion was active; the input slice unchanged.
    All(&'a [Vehicle]),
    /// Vehicles passing every active criterion, in input order.
    Subset(Vec<&'a Vehicle>),
}

impl<'a> Matches<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::All(all) => all.len(),
            Self::Subset(subset) => subset.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All(_))
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a Vehicle> + '_> {
        match self {
            Self::All(all) => Box::new((*all).iter()),
            Self::Subset(subset) => Box::new(subset.iter().copied()),
        }
    }

    /// Owned copies of the matched vehicles.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Vehicle> {
        self.iter().cloned().collect()
    }
}

/// Compute the visible subset of `vehicles` for `criteria`.
#[must_use]
pub fn filter<'a>(vehicles: &'a [Vehicle], criteria: &Criteria, table: &PriceTable) -> Matches<'a> {
    if criteria.is_empty() {
        return Matches::All(vehicles);
    }
    Matches::Subset(
        vehicles
            .iter()
            .filter(|vehicle| criteria.matches(vehicle, table))
            .collect(),
    )
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
