//! Canvas pixels to physical millimeters.
//!
//! A side is calibrated by one fact: the product photo, as rendered on the
//! canvas, spans `productWidthMm` of real garment. Everything else follows
//! from the rendered background width. Ratios are derived per pricing pass
//! and never cached, since zoom or resize changes them.

use serde::Serialize;

use canvas::geometry::Rect;

use crate::catalog::Side;

/// Where and how large a side's background image is drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundMetrics {
    /// Canvas x of the image's top-left corner.
    pub left: f64,
    /// Canvas y of the image's top-left corner.
    pub top: f64,
    /// Width of the image on the canvas after zoom, in canvas pixels.
    pub rendered_width: f64,
    pub rendered_height: f64,
    /// Intrinsic pixel width of the image file, when known.
    pub natural_width: Option<f64>,
}

impl BackgroundMetrics {
    /// Metrics for a background drawn at the origin.
    #[must_use]
    pub fn rendered(rendered_width: f64, rendered_height: f64) -> Self {
        Self { rendered_width, rendered_height, ..Self::default() }
    }

    /// Metrics for a side's catalog background drawn at its zoom scale.
    #[must_use]
    pub fn for_side(side: &Side) -> Option<Self> {
        let bg = side.background.as_ref()?;
        Some(Self {
            left: 0.0,
            top: 0.0,
            rendered_width: bg.width * side.zoom_scale,
            rendered_height: bg.height * side.zoom_scale,
            natural_width: Some(bg.width),
        })
    }
}

/// Physical size of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeMm {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl SizeMm {
    #[must_use]
    pub fn area_mm2(&self) -> f64 {
        self.width_mm * self.height_mm
    }
}

/// Millimeters per canvas pixel for `side`.
///
/// `productWidthMm / rendered_background_width`, or `fallback` when the
/// rendered width is unknown or not positive.
#[must_use]
pub fn pixel_to_mm_ratio(side: &Side, rendered_background_width: Option<f64>, fallback: f64) -> f64 {
    match rendered_background_width {
        Some(w) if w.is_finite() && w > 0.0 => side.real_life_dimensions.product_width_mm / w,
        _ => fallback,
    }
}

#[must_use]
pub fn pixels_to_mm(px: f64, ratio: f64) -> f64 {
    px * ratio
}

/// Size in millimeters of a canvas-space bounding box.
#[must_use]
pub fn rect_to_mm(rect: &Rect, ratio: f64) -> SizeMm {
    SizeMm { width_mm: pixels_to_mm(rect.width.abs(), ratio), height_mm: pixels_to_mm(rect.height.abs(), ratio) }
}

/// Map the side's print area from background-image pixels into canvas pixels.
///
/// The image-to-canvas scale is `rendered_width / natural_width`; when the
/// natural width is unknown the side's zoom scale stands in.
#[must_use]
pub fn print_area_on_canvas(side: &Side, metrics: &BackgroundMetrics) -> Rect {
    let natural = metrics.natural_width.or_else(|| side.background.as_ref().map(|bg| bg.width));
    let scale = match natural {
        Some(n) if n > 0.0 && metrics.rendered_width > 0.0 => metrics.rendered_width / n,
        _ => side.zoom_scale,
    };
    side.print_area.scaled(scale).translated(metrics.left, metrics.top)
}

#[cfg(test)]
#[path = "units_test.rs"]
mod tests;
