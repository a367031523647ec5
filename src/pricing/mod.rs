//! Print-method pricing: what the customer's artwork adds to each item.
//!
//! DESIGN
//! ======
//! For every artwork node on every mounted side:
//!
//! 1. Its visible bounding box (clipped to the print area) is converted to
//!    millimeters with the side's current calibration.
//! 2. Its method is the explicit override, else the auto-selection policy
//!    applied to its sampled color count, area, and the order quantity.
//! 3. Its per-item cost comes from the method's tier spec. A missing spec
//!    is priced at the most expensive transfer rate and reported.
//!
//! Side subtotals and the grand total are plain sums. Quotes are cached by
//! quantity plus every side's scene version, so an unchanged design is never
//! re-rasterized and a changed one is never served stale.

pub mod select;
pub mod tiers;

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use canvas::render::Rasterizer;
use canvas::scene::{ObjectId, ObjectKind, PrintMethod, Scene, SceneObject};

use crate::catalog::{Catalog, Side};
use crate::colors::sample_object;
use crate::config::EngineConfig;
use crate::diagnostic::Diagnostic;
use crate::registry::{CanvasRegistry, SceneVersion};
use crate::units::{SizeMm, pixel_to_mm_ratio, rect_to_mm};

use self::select::effective_method;
use self::tiers::{bulk_per_item, estimate_stitches, most_conservative_transfer, transfer_per_item};

// =============================================================================
// QUOTE
// =============================================================================

/// Price line for one artwork object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectPrice {
    pub object_id: ObjectId,
    pub kind: ObjectKind,
    pub method: PrintMethod,
    pub auto_selected: bool,
    pub width_mm: f64,
    pub height_mm: f64,
    pub area_mm2: f64,
    pub colors: usize,
    /// Cost added to each item.
    pub per_item: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidePrice {
    pub side_id: String,
    pub lines: Vec<ObjectPrice>,
    pub subtotal: f64,
}

/// Price of the customization, per item, for one order quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Quantity actually priced (after clamping).
    pub quantity: u32,
    pub total_additional_price: f64,
    pub per_side: Vec<SidePrice>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PriceQuote {
    #[must_use]
    pub fn side(&self, side_id: &str) -> Option<&SidePrice> {
        self.per_side.iter().find(|s| s.side_id == side_id)
    }
}

/// What a pricing pass reads.
pub struct PricingContext<'a> {
    pub registry: &'a CanvasRegistry,
    pub catalog: &'a Catalog,
    pub config: &'a EngineConfig,
    pub rasterizer: &'a dyn Rasterizer,
}

// =============================================================================
// PRICING
// =============================================================================

/// Price every mounted side of `sides`, in the given order.
///
/// Sides that are not mounted contribute nothing.
#[must_use]
pub fn price_sides(ctx: &PricingContext<'_>, sides: &[Side], quantity: u32) -> PriceQuote {
    let mut diagnostics = Vec::new();
    let q = if quantity == 0 {
        let d = Diagnostic::Quantity { requested: quantity, used: 1 };
        tracing::warn!(error = %d, "clamping quantity");
        diagnostics.push(d);
        1
    } else {
        quantity
    };

    let mut per_side = Vec::new();
    for side in sides {
        let ratio = pixel_to_mm_ratio(
            side,
            ctx.registry.background_metrics(&side.id).map(|m| m.rendered_width),
            ctx.config.fallback_px_to_mm,
        );
        let priced = ctx.registry.with_scene(&side.id, |scene| price_scene(ctx, scene, ratio, q));
        match priced {
            Ok((lines, diags)) => {
                diagnostics.extend(diags);
                let subtotal = lines.iter().map(|l| l.per_item).sum();
                per_side.push(SidePrice { side_id: side.id.clone(), lines, subtotal });
            }
            Err(e) => tracing::debug!(side_id = %side.id, error = %e, "side not mounted; not priced"),
        }
    }

    let total_additional_price = per_side.iter().map(|s| s.subtotal).sum();
    tracing::debug!(quantity = q, total = total_additional_price, sides = per_side.len(), "priced sides");
    PriceQuote { quantity: q, total_additional_price, per_side, diagnostics }
}

fn price_scene(ctx: &PricingContext<'_>, scene: &Scene, ratio: f64, quantity: u32) -> (Vec<ObjectPrice>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let lines = scene
        .artwork()
        .map(|node| {
            let (line, diag) = price_object(ctx, scene, node, ratio, quantity);
            diagnostics.extend(diag);
            line
        })
        .collect();
    (lines, diagnostics)
}

fn price_object(
    ctx: &PricingContext<'_>,
    scene: &Scene,
    node: &SceneObject,
    ratio: f64,
    quantity: u32,
) -> (ObjectPrice, Option<Diagnostic>) {
    let size = printed_size(node, ratio);
    let area = size.area_mm2();
    let colors = if area > 0.0 {
        sample_object(scene, &node.id, ctx.rasterizer, ctx.config.color_sensitivity).count
    } else {
        0
    };

    let explicit = scene.metadata(&node.id).and_then(|m| m.print_method);
    let table = &ctx.catalog.pricing;
    let choice = effective_method(explicit, colors, area, quantity, &ctx.config.auto_select, table);

    let (per_item, diagnostic) = if area <= 0.0 {
        (0.0, None)
    } else {
        match tier_price(ctx, choice.method, area, colors, quantity) {
            Some(price) => (price, None),
            None => {
                let d = Diagnostic::PricingLookup { method: choice.method };
                tracing::warn!(object_id = %node.id, error = %d, "pricing fallback");
                (most_conservative_transfer(table, area, ctx.config.fallback_price_per_mm2), Some(d))
            }
        }
    };

    let line = ObjectPrice {
        object_id: node.id,
        kind: node.kind(),
        method: choice.method,
        auto_selected: choice.auto_selected,
        width_mm: size.width_mm,
        height_mm: size.height_mm,
        area_mm2: area,
        colors,
        per_item,
    };
    (line, diagnostic)
}

/// Per-item price under the method's own tier spec, if the catalog has one.
fn tier_price(ctx: &PricingContext<'_>, method: PrintMethod, area: f64, colors: usize, quantity: u32) -> Option<f64> {
    let table = &ctx.catalog.pricing;
    if method.is_transfer() {
        return transfer_per_item(table.transfer(method)?, area);
    }
    let units = match method {
        PrintMethod::Embroidery => estimate_stitches(area, ctx.config.stitches_per_mm2),
        _ => u32::try_from(colors.max(1)).unwrap_or(u32::MAX),
    };
    let bucket = table.bulk(method)?.bucket_for(units)?;
    Some(bulk_per_item(bucket, quantity))
}

/// Physical size of the part of `node` inside its clip region.
fn printed_size(node: &SceneObject, ratio: f64) -> SizeMm {
    let bbox = node.bounding_rect();
    let visible = match node.clip {
        Some(clip) => bbox.intersection(&clip).unwrap_or_default(),
        None => bbox,
    };
    rect_to_mm(&visible, ratio)
}

// =============================================================================
// CACHE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    quantity: u32,
    versions: Vec<SceneVersion>,
}

/// Holds the last quote and the scene versions it was computed from.
#[derive(Debug, Default)]
pub struct PricingCache {
    last: Mutex<Option<(CacheKey, PriceQuote)>>,
}

impl PricingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached quote when `quantity` and `versions` match the last
    /// computation; otherwise compute, store, and return a fresh one.
    pub fn get_or_compute(
        &self,
        quantity: u32,
        versions: Vec<SceneVersion>,
        compute: impl FnOnce() -> PriceQuote,
    ) -> PriceQuote {
        let key = CacheKey { quantity, versions };
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((cached_key, quote)) = last.as_ref() {
            if *cached_key == key {
                return quote.clone();
            }
        }
        let quote = compute();
        *last = Some((key, quote.clone()));
        quote
    }

    pub fn invalidate(&self) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
