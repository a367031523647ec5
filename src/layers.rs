//! Garment layer colors, shared across sides.
//!
//! A layer (say `"body"`) is usually visible from several sides. Recoloring
//! it on one side recolors it everywhere: [`LayerColorStore::set`] is the only
//! write path, and it fans out to every mounted scene that shows the layer
//! before returning. Lock order is store first, then registry.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use canvas::color::normalize_hex;
use canvas::scene::LayerId;

use crate::diagnostic::Diagnostic;
use crate::registry::CanvasRegistry;

/// `layer_id -> #rrggbb` for one side.
pub type SideLayerColors = BTreeMap<LayerId, String>;

#[derive(Debug, Default)]
pub struct LayerColorStore {
    colors: RwLock<BTreeMap<String, SideLayerColors>>,
}

impl LayerColorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `layer_id` to `hex` on `side_id` and on every registered side
    /// whose scene contains the layer. Returns the sorted ids of every side
    /// written.
    ///
    /// # Errors
    ///
    /// `LayerColor` when `hex` is not a valid color; nothing is written.
    pub fn set(
        &self,
        registry: &CanvasRegistry,
        side_id: &str,
        layer_id: &str,
        hex: &str,
    ) -> Result<Vec<String>, Diagnostic> {
        let normalized = normalize_hex(hex)
            .ok_or_else(|| Diagnostic::LayerColor { layer_id: layer_id.to_string(), value: hex.to_string() })?;

        let mut colors = self.colors.write().unwrap_or_else(PoisonError::into_inner);
        colors.entry(side_id.to_string()).or_default().insert(layer_id.to_string(), normalized.clone());
        let mut written = vec![side_id.to_string()];

        registry.for_each_scene_mut(|scene| {
            if !scene.has_layer(layer_id) {
                return;
            }
            if scene.side_id() != side_id {
                colors
                    .entry(scene.side_id().to_string())
                    .or_default()
                    .insert(layer_id.to_string(), normalized.clone());
                written.push(scene.side_id().to_string());
            }
            scene.touch();
        });

        written.sort();
        tracing::debug!(side_id = %side_id, layer_id = %layer_id, color = %normalized, sides = written.len(), "layer color set");
        Ok(written)
    }

    /// Apply a saved map of layer colors to a side, with propagation.
    /// Invalid entries are skipped and returned as diagnostics.
    pub fn apply(&self, registry: &CanvasRegistry, side_id: &str, layers: &SideLayerColors) -> Vec<Diagnostic> {
        layers
            .iter()
            .filter_map(|(layer_id, hex)| self.set(registry, side_id, layer_id, hex).err())
            .inspect(|d| tracing::warn!(side_id = %side_id, error = %d, "skipping layer color"))
            .collect()
    }

    /// Current colors of one side.
    #[must_use]
    pub fn snapshot(&self, side_id: &str) -> SideLayerColors {
        self.colors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(side_id)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, side_id: &str, layer_id: &str) -> Option<String> {
        self.colors.read().unwrap_or_else(PoisonError::into_inner).get(side_id)?.get(layer_id).cloned()
    }
}

#[cfg(test)]
#[path = "layers_test.rs"]
mod tests;
