//! Catalog service domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named price point for a service (e.g. "Short hair", 35.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTier {
    pub title: String,
    pub price: f64,
}

/// Insert payload for a catalog service.
#[derive(Debug, Clone)]
pub struct NewService {
    pub name: String,
    pub category: String,
    pub description: String,
    pub duration: String,
    pub pricing: Vec<PricingTier>,
    /// Public paths of uploaded images, e.g. `uploads/<file>.jpg`.
    pub images: Vec<String>,
}

/// A salon service offered to customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub duration: String,
    pub pricing: Vec<PricingTier>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
