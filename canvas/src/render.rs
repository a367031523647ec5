//! Rasterizing: turns a filtered view of a scene into pixels.
//!
//! The engine never draws for display; it rasterizes only to inspect ink
//! colors. [`Rasterizer`] is the seam a host can fill with its real canvas
//! backend. [`BoxRasterizer`] is the built-in implementation: it paints
//! shapes with their outline, text runs as filled boxes in their fill color,
//! and bitmaps from a registry of decoded images. Bitmaps that were never
//! registered paint nothing.
//!
//! Output is non-premultiplied RGBA. Nodes are composited source-over in
//! draw order, honoring opacity and clip regions.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::collections::HashMap;

use image::{Rgba, RgbaImage};

use crate::color::Rgb;
use crate::consts::{DEFAULT_FILL_HEX, LINE_HALF_THICKNESS_PX, MAX_RASTER_EDGE_PX};
use crate::geometry::{Point, Rect};
use crate::scene::{Content, Scene, SceneObject, ShapeKind};

/// Produces pixels for the nodes of a scene accepted by `include`.
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene, include: &dyn Fn(&SceneObject) -> bool) -> RgbaImage;
}

/// Flat-fill rasterizer backed by a registry of decoded bitmaps.
#[derive(Debug, Clone)]
pub struct BoxRasterizer {
    bitmaps: HashMap<String, RgbaImage>,
    max_edge: u32,
}

impl Default for BoxRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxRasterizer {
    #[must_use]
    pub fn new() -> Self {
        Self { bitmaps: HashMap::new(), max_edge: MAX_RASTER_EDGE_PX }
    }

    /// Cap the longest output edge. Values below 1 are raised to 1.
    #[must_use]
    pub fn with_max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge.max(1);
        self
    }

    /// Register decoded pixels for an image `src`.
    pub fn insert_bitmap(&mut self, src: impl Into<String>, bitmap: RgbaImage) {
        self.bitmaps.insert(src.into(), bitmap);
    }

    #[must_use]
    pub fn has_bitmap(&self, src: &str) -> bool {
        self.bitmaps.contains_key(src)
    }

    /// Paint one node's visible pixels onto `canvas`, whose top-left maps to
    /// `origin` in canvas space at `scale` output pixels per canvas pixel.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn paint(&self, canvas: &mut RgbaImage, node: &SceneObject, origin: Point, scale: f64) {
        let Some(area) = visible_rect(node) else {
            return;
        };
        let fill = node.content.fill().and_then(|hex| Rgb::from_hex(hex).or_else(|| Rgb::from_hex(DEFAULT_FILL_HEX)));
        let bitmap = match &node.content {
            Content::Image(img) => self.bitmaps.get(&img.src),
            _ => None,
        };

        let x0 = ((area.x - origin.x) * scale).floor().max(0.0) as u32;
        let y0 = ((area.y - origin.y) * scale).floor().max(0.0) as u32;
        let x1 = (((area.right() - origin.x) * scale).ceil() as u32).min(canvas.width());
        let y1 = (((area.bottom() - origin.y) * scale).ceil() as u32).min(canvas.height());

        for py in y0..y1 {
            for px in x0..x1 {
                let p = Point::new(origin.x + (f64::from(px) + 0.5) / scale, origin.y + (f64::from(py) + 0.5) / scale);
                if !area.contains(p) {
                    continue;
                }
                let Some(unit) = node.transform.to_unit(p) else {
                    continue;
                };
                if !covers(node, unit) {
                    continue;
                }
                let src = match (&node.content, fill, bitmap) {
                    (Content::Image(_), _, Some(bmp)) => sample_bitmap(bmp, unit),
                    (Content::Image(_), _, None) => None,
                    (_, Some(rgb), _) => Some(Rgba([rgb.r, rgb.g, rgb.b, u8::MAX])),
                    _ => None,
                };
                let Some(src) = src else {
                    continue;
                };
                blend(canvas.get_pixel_mut(px, py), src, node.opacity);
            }
        }
    }
}

impl Rasterizer for BoxRasterizer {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn rasterize(&self, scene: &Scene, include: &dyn Fn(&SceneObject) -> bool) -> RgbaImage {
        let nodes: Vec<&SceneObject> = scene.nodes().filter(|n| include(n) && n.opacity > 0.0).collect();
        let Some(bounds) = nodes.iter().filter_map(|n| visible_rect(n)).reduce(|a, b| a.union(&b)) else {
            return RgbaImage::new(0, 0);
        };

        let longest = bounds.width.max(bounds.height);
        let scale = (f64::from(self.max_edge) / longest).min(1.0);
        let width = (bounds.width * scale).ceil().max(1.0) as u32;
        let height = (bounds.height * scale).ceil().max(1.0) as u32;
        let mut canvas = RgbaImage::new(width, height);

        let origin = Point::new(bounds.x, bounds.y);
        for node in nodes {
            self.paint(&mut canvas, node, origin, scale);
        }
        canvas
    }
}

/// Bounding box of a node intersected with its clip, or `None` if nothing
/// of it is visible.
fn visible_rect(node: &SceneObject) -> Option<Rect> {
    let bbox = node.bounding_rect();
    let visible = match node.clip {
        Some(clip) => bbox.intersection(&clip)?,
        None => bbox,
    };
    if visible.is_degenerate() {
        return None;
    }
    Some(visible)
}

/// Whether the normalized object coordinate `unit` lies inside the node's outline.
fn covers(node: &SceneObject, unit: Point) -> bool {
    let inside_box = (0.0..=1.0).contains(&unit.x) && (0.0..=1.0).contains(&unit.y);
    if !inside_box {
        return false;
    }
    let Content::Shape(shape) = &node.content else {
        return true;
    };
    match shape.shape {
        ShapeKind::Rect => true,
        ShapeKind::Ellipse => {
            let dx = unit.x - 0.5;
            let dy = unit.y - 0.5;
            dx * dx + dy * dy <= 0.25
        }
        ShapeKind::Triangle => (unit.x - 0.5).abs() <= unit.y / 2.0,
        ShapeKind::Line => (unit.y - 0.5).abs() * node.transform.scaled_height() <= LINE_HALF_THICKNESS_PX,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn sample_bitmap(bitmap: &RgbaImage, unit: Point) -> Option<Rgba<u8>> {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return None;
    }
    let x = ((unit.x * f64::from(bitmap.width())) as u32).min(bitmap.width() - 1);
    let y = ((unit.y * f64::from(bitmap.height())) as u32).min(bitmap.height() - 1);
    bitmap.get_pixel_checked(x, y).copied()
}

/// Source-over compositing of `src` (scaled by `opacity`) onto `dst`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, opacity: f64) {
    let sa = f64::from(src[3]) / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let sc = f64::from(src[c]);
        let dc = f64::from(dst[c]);
        dst[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}
