//! Catalog: read-only product input: sides and per-method pricing tiers.
//!
//! DESIGN
//! ======
//! The catalog is owned by an external collaborator and arrives as JSON.
//! This module only defines its shape and validates it once at load time,
//! so downstream code can trust that every side has positive dimensions and
//! every tier bucket has non-negative prices.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use canvas::geometry::Rect;
use canvas::scene::{LayerId, PrintMethod};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate side id: {0}")]
    DuplicateSide(String),
    #[error("side {side_id} is invalid: {reason}")]
    InvalidSide { side_id: String, reason: String },
    #[error("pricing for {method} is invalid: {reason}")]
    InvalidPricing { method: PrintMethod, reason: String },
}

// =============================================================================
// SIDES
// =============================================================================

/// Physical size of the product used to calibrate pixels to millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealLifeDimensions {
    /// Width of the garment as photographed, in millimeters.
    pub product_width_mm: f64,
}

/// Natural (intrinsic) size of a side's product photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    pub url: String,
    pub width: f64,
    pub height: f64,
}

/// One printable face of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    pub id: String,
    pub name: String,
    /// Printable region in background-image pixel space.
    pub print_area: Rect,
    pub real_life_dimensions: RealLifeDimensions,
    /// Display zoom applied to the background image when mounted.
    #[serde(default = "unit_zoom")]
    pub zoom_scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundImage>,
    /// Garment panels visible from this side.
    #[serde(default)]
    pub layers: Vec<LayerId>,
}

fn unit_zoom() -> f64 {
    1.0
}

impl Side {
    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason: &str| CatalogError::InvalidSide { side_id: self.id.clone(), reason: reason.to_string() };
        if self.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        let width_mm = self.real_life_dimensions.product_width_mm;
        if !width_mm.is_finite() || width_mm <= 0.0 {
            return Err(invalid("productWidthMm must be positive"));
        }
        if !self.zoom_scale.is_finite() || self.zoom_scale <= 0.0 {
            return Err(invalid("zoomScale must be positive"));
        }
        if self.print_area.is_degenerate() {
            return Err(invalid("printArea has no area"));
        }
        if let Some(bg) = &self.background {
            if !(bg.width > 0.0 && bg.height > 0.0) {
                return Err(invalid("background size must be positive"));
            }
        }
        Ok(())
    }
}

// =============================================================================
// PRICING TIERS
// =============================================================================

/// Area bracket: artwork up to `max_area_mm2` costs a flat `price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaBracket {
    pub max_area_mm2: f64,
    pub price: f64,
}

/// Per-item pricing for transfer methods, as a function of printed area.
///
/// With brackets, the smallest bracket that fits the area wins; areas beyond
/// every bracket use `price_per_mm2` if set, else the largest bracket. Without
/// brackets the price is `area × price_per_mm2`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPricing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_per_mm2: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub brackets: Vec<AreaBracket>,
}

/// One bucket of a bulk method, selected by color or stitch count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkBucket {
    /// Inclusive upper bound on colors (screen printing, applique) or stitches (embroidery).
    pub up_to: u32,
    /// Job cost covering the first `base_quantity` pieces.
    pub base_price: f64,
    pub base_quantity: u32,
    /// Cost of each piece beyond `base_quantity`.
    pub additional_price_per_piece: f64,
}

/// Job pricing for bulk methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPricing {
    pub buckets: Vec<BulkBucket>,
}

impl BulkPricing {
    /// Single-bucket pricing that applies regardless of color or stitch count.
    #[must_use]
    pub fn flat(base_price: f64, base_quantity: u32, additional_price_per_piece: f64) -> Self {
        Self { buckets: vec![BulkBucket { up_to: u32::MAX, base_price, base_quantity, additional_price_per_piece }] }
    }

    /// The smallest bucket whose bound covers `units`, or the largest bucket
    /// when `units` exceeds them all.
    #[must_use]
    pub fn bucket_for(&self, units: u32) -> Option<&BulkBucket> {
        self.buckets
            .iter()
            .filter(|b| units <= b.up_to)
            .min_by_key(|b| b.up_to)
            .or_else(|| self.buckets.iter().max_by_key(|b| b.up_to))
    }
}

/// Tier specs keyed by print method. Methods absent here are unpriced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtf: Option<TransferPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dtg: Option<TransferPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen_printing: Option<BulkPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embroidery: Option<BulkPricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applique: Option<BulkPricing>,
}

impl PricingTable {
    #[must_use]
    pub fn transfer(&self, method: PrintMethod) -> Option<&TransferPricing> {
        match method {
            PrintMethod::Dtf => self.dtf.as_ref(),
            PrintMethod::Dtg => self.dtg.as_ref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn bulk(&self, method: PrintMethod) -> Option<&BulkPricing> {
        match method {
            PrintMethod::ScreenPrinting => self.screen_printing.as_ref(),
            PrintMethod::Embroidery => self.embroidery.as_ref(),
            PrintMethod::Applique => self.applique.as_ref(),
            _ => None,
        }
    }

    /// Whether any tier spec exists for `method`.
    #[must_use]
    pub fn has(&self, method: PrintMethod) -> bool {
        if method.is_transfer() { self.transfer(method).is_some() } else { self.bulk(method).is_some() }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for method in PrintMethod::ALL {
            let invalid = |reason: &str| CatalogError::InvalidPricing { method, reason: reason.to_string() };
            if let Some(t) = self.transfer(method) {
                if t.price_per_mm2.is_some_and(|p| !p.is_finite() || p < 0.0) {
                    return Err(invalid("pricePerMm2 must be non-negative"));
                }
                if t.brackets.iter().any(|b| !(b.price >= 0.0 && b.max_area_mm2 > 0.0)) {
                    return Err(invalid("brackets need positive maxAreaMm2 and non-negative price"));
                }
            }
            if let Some(b) = self.bulk(method) {
                if b.buckets.is_empty() {
                    return Err(invalid("at least one bucket is required"));
                }
                let bad = b.buckets.iter().any(|k| !(k.base_price >= 0.0 && k.additional_price_per_piece >= 0.0));
                if bad {
                    return Err(invalid("bucket prices must be non-negative"));
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// CATALOG
// =============================================================================

/// Everything the engine needs from the product catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Sides in display order.
    pub sides: Vec<Side>,
    #[serde(default)]
    pub pricing: PricingTable,
}

impl Catalog {
    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `Parse` for malformed JSON and `DuplicateSide`, `InvalidSide`
    /// or `InvalidPricing` when the content breaks an invariant.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check side and pricing invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for side in &self.sides {
            if !seen.insert(side.id.as_str()) {
                return Err(CatalogError::DuplicateSide(side.id.clone()));
            }
            side.validate()?;
        }
        self.pricing.validate()
    }

    #[must_use]
    pub fn side(&self, side_id: &str) -> Option<&Side> {
        self.sides.iter().find(|s| s.id == side_id)
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
