//! Price bucket tables.
//!
//! Each listing surface offers its own set of coarse price ranges, so tables
//! are plain data rather than a hardcoded enum. Buckets are half-open
//! `[lower, upper)`; a missing bound is unbounded on that side.

/// A named price range offered as a filter option.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBucket {
    /// Stable identifier used in filter criteria (e.g. `"100k-200k"`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Inclusive floor.
    pub lower: Option<f64>,
    /// Exclusive ceiling.
    pub upper: Option<f64>,
}

impl PriceBucket {
    #[must_use]
    pub fn new(key: &str, label: &str, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { key: key.to_owned(), label: label.to_owned(), lower, upper }
    }

    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        self.lower.map_or(true, |lower| price >= lower) && self.upper.map_or(true, |upper| price < upper)
    }
}

/// An ordered set of price buckets for one listing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    buckets: Vec<PriceBucket>,
}

impl PriceTable {
    #[must_use]
    pub fn new(buckets: Vec<PriceBucket>) -> Self {
        Self { buckets }
    }

    /// Public catalog: five buckets.
    #[must_use]
    pub fn catalog() -> Self {
        Self::new(vec![
            PriceBucket::new("under-25k", "Under $25k", None, Some(25_000.0)),
            PriceBucket::new("25k-50k", "$25k - $50k", Some(25_000.0), Some(50_000.0)),
            PriceBucket::new("50k-100k", "$50k - $100k", Some(50_000.0), Some(100_000.0)),
            PriceBucket::new("100k-200k", "$100k - $200k", Some(100_000.0), Some(200_000.0)),
            PriceBucket::new("over-200k", "Over $200k", Some(200_000.0), None),
        ])
    }

    /// Admin dashboard: three buckets.
    #[must_use]
    pub fn dashboard() -> Self {
        Self::new(vec![
            PriceBucket::new("under-100k", "Under $100k", None, Some(100_000.0)),
            PriceBucket::new("100k-200k", "$100k - $200k", Some(100_000.0), Some(200_000.0)),
            PriceBucket::new("over-200k", "Over $200k", Some(200_000.0), None),
        ])
    }

    #[must_use]
    pub fn buckets(&self) -> &[PriceBucket] {
        &self.buckets
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PriceBucket> {
        self.buckets.iter().find(|bucket| bucket.key == key)
    }

    /// Whether `price` falls in the bucket named `key`.
    ///
    /// An unknown key or a missing price never matches.
    #[must_use]
    pub fn matches(&self, key: &str, price: Option<f64>) -> bool {
        match (self.get(key), price) {
            (Some(bucket), Some(price)) => bucket.contains(price),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
