//! Ink color counting for print-method auto-selection.
//!
//! Colors are counted on rendered pixels, never on declared fills: a photo
//! carries many inks though it declares none. Each opaque pixel joins the
//! first existing bucket within `sensitivity` (redmean distance) of its
//! color, or starts a new one. Sampling never mutates the scene.

use std::collections::HashMap;

use image::RgbaImage;
use serde::Serialize;

use canvas::color::Rgb;
use canvas::consts::OPAQUE_ALPHA_CUTOFF;
use canvas::render::Rasterizer;
use canvas::scene::{ObjectId, Scene, SceneObject};

/// Distinct ink colors found in a raster.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColorSample {
    /// Bucket colors as `#rrggbb`, most-used first.
    pub colors: Vec<String>,
    pub count: usize,
}

struct Bucket {
    color: Rgb,
    pixels: u64,
}

/// Count distinct colors in `image`, merging those closer than `sensitivity`.
/// Pixels with alpha below the opacity cutoff are ignored.
#[must_use]
pub fn sample_colors(image: &RgbaImage, sensitivity: f64) -> ColorSample {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut assigned: HashMap<Rgb, usize> = HashMap::new();

    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        if a < OPAQUE_ALPHA_CUTOFF {
            continue;
        }
        let rgb = Rgb::new(r, g, b);
        let idx = match assigned.get(&rgb) {
            Some(&idx) => idx,
            None => {
                let idx = buckets.iter().position(|k| k.color.distance(rgb) < sensitivity).unwrap_or_else(|| {
                    buckets.push(Bucket { color: rgb, pixels: 0 });
                    buckets.len() - 1
                });
                assigned.insert(rgb, idx);
                idx
            }
        };
        buckets[idx].pixels += 1;
    }

    buckets.sort_by(|a, b| b.pixels.cmp(&a.pixels).then_with(|| a.color.to_hex().cmp(&b.color.to_hex())));
    let colors: Vec<String> = buckets.iter().map(|k| k.color.to_hex()).collect();
    ColorSample { count: colors.len(), colors }
}

/// Colors of all artwork on a side. Background and guides are excluded.
#[must_use]
pub fn sample_scene(scene: &Scene, rasterizer: &dyn Rasterizer, sensitivity: f64) -> ColorSample {
    let image = rasterizer.rasterize(scene, &SceneObject::is_exportable);
    sample_colors(&image, sensitivity)
}

/// Colors of a single artwork node, rendered alone.
#[must_use]
pub fn sample_object(scene: &Scene, id: &ObjectId, rasterizer: &dyn Rasterizer, sensitivity: f64) -> ColorSample {
    let image = rasterizer.rasterize(scene, &|node: &SceneObject| node.id == *id && node.is_exportable());
    sample_colors(&image, sensitivity)
}

#[cfg(test)]
#[path = "colors_test.rs"]
mod tests;
