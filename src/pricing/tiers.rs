//! Cost formulas for a single object under a single tier spec.
//!
//! Transfer methods cost a per-item amount driven by printed area. Bulk
//! methods carry a job cost: `base_price` covers the first `base_quantity`
//! pieces and every piece beyond adds `additional_price_per_piece`; the
//! per-item figure is that job cost spread over the order quantity.

use crate::catalog::{BulkBucket, PricingTable, TransferPricing};

/// Per-item price of printing `area_mm2` with a transfer spec.
///
/// `None` when the pricing has neither a rate nor brackets.
#[must_use]
pub fn transfer_per_item(spec: &TransferPricing, area_mm2: f64) -> Option<f64> {
    if area_mm2 <= 0.0 {
        return Some(0.0);
    }
    let bracket = spec
        .brackets
        .iter()
        .filter(|b| area_mm2 <= b.max_area_mm2)
        .min_by(|a, b| a.max_area_mm2.total_cmp(&b.max_area_mm2));
    let price = match (bracket, spec.price_per_mm2) {
        (Some(b), _) => b.price,
        (None, Some(rate)) => area_mm2 * rate,
        (None, None) => spec.brackets.iter().map(|b| b.price).max_by(f64::total_cmp)?,
    };
    Some(non_negative(price))
}

/// Per-item price of a bulk job at `quantity` pieces.
///
/// `(base + max(0, q − base_quantity) × additional) / q`. A quantity of zero
/// is treated as one.
#[must_use]
pub fn bulk_per_item(bucket: &BulkBucket, quantity: u32) -> f64 {
    let q = quantity.max(1);
    let extra = q.saturating_sub(bucket.base_quantity);
    let job = non_negative(bucket.base_price) + f64::from(extra) * non_negative(bucket.additional_price_per_piece);
    job / f64::from(q)
}

/// The highest per-item transfer price the catalog would charge for this
/// area, or `fallback_rate × area` when no transfer method is priced.
#[must_use]
pub fn most_conservative_transfer(table: &PricingTable, area_mm2: f64, fallback_rate: f64) -> f64 {
    if area_mm2 <= 0.0 {
        return 0.0;
    }
    [table.dtf.as_ref(), table.dtg.as_ref()]
        .into_iter()
        .flatten()
        .filter_map(|spec| transfer_per_item(spec, area_mm2))
        .max_by(f64::total_cmp)
        .unwrap_or_else(|| non_negative(area_mm2 * fallback_rate))
}

/// Estimated embroidery stitch count for an area.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn estimate_stitches(area_mm2: f64, stitches_per_mm2: f64) -> u32 {
    let stitches = (area_mm2 * stitches_per_mm2).ceil();
    if stitches.is_finite() && stitches > 0.0 { stitches.min(f64::from(u32::MAX)) as u32 } else { 0 }
}

/// Clamp negative and non-finite prices to zero.
#[must_use]
pub fn non_negative(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 { price } else { 0.0 }
}

#[cfg(test)]
#[path = "tiers_test.rs"]
mod tests;
