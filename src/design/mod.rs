//! Design state: the customer-authored part of every side, as data.
//!
//! DESIGN
//! ======
//! A [`DesignState`] is what gets persisted with an order: for each side, the
//! artwork objects (never the background or guides) and the side's layer
//! colors. It is plain serde data with camelCase field names so the same blob
//! round-trips through the browser, the database, and this crate.
//!
//! Saving is a synchronous snapshot of the registry. Restoring is async and
//! lives in [`restore`]; rebuilding individual nodes goes through the
//! [`reviver::ObjectReviver`] seam.

pub mod restore;
pub mod reviver;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use canvas::geometry::Transform;
use canvas::scene::{Content, ObjectId, ObjectKind, ObjectMetadata, PrintMethod, SceneObject};

use crate::diagnostic::Diagnostic;
use crate::layers::{LayerColorStore, SideLayerColors};
use crate::registry::CanvasRegistry;

// =============================================================================
// TYPES
// =============================================================================

/// One serialized artwork object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    /// Stable id assigned when the object was first placed.
    pub object_id: ObjectId,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(flatten)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_method: Option<PrintMethod>,
    #[serde(default = "opaque")]
    pub opacity: f64,
}

fn opaque() -> f64 {
    1.0
}

impl PlacedObject {
    /// Capture a live node and its side-table metadata.
    #[must_use]
    pub fn from_node(node: &SceneObject, metadata: Option<&ObjectMetadata>) -> Self {
        Self {
            object_id: node.id,
            transform: node.transform,
            content: node.content.clone(),
            print_method: metadata.and_then(|m| m.print_method),
            opacity: node.opacity,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.content.kind()
    }

    #[must_use]
    pub fn metadata(&self) -> ObjectMetadata {
        ObjectMetadata { print_method: self.print_method }
    }
}

/// Everything saved for one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideDesign {
    /// Artwork in draw order.
    #[serde(default)]
    pub objects: Vec<PlacedObject>,
    #[serde(default)]
    pub layer_colors: SideLayerColors,
}

/// `side_id -> SideDesign`, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DesignState {
    sides: BTreeMap<String, SideDesign>,
}

impl DesignState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a saved design blob.
    ///
    /// # Errors
    ///
    /// Returns the serde error for malformed JSON.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// # Errors
    ///
    /// Returns the serde error if a value cannot be represented in JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn insert(&mut self, side_id: impl Into<String>, design: SideDesign) {
        self.sides.insert(side_id.into(), design);
    }

    #[must_use]
    pub fn side(&self, side_id: &str) -> Option<&SideDesign> {
        self.sides.get(side_id)
    }

    /// Sides in id order.
    pub fn sides(&self) -> impl Iterator<Item = (&str, &SideDesign)> {
        self.sides.iter().map(|(id, d)| (id.as_str(), d))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sides.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }
}

// =============================================================================
// SAVE
// =============================================================================

/// Snapshot one side: its artwork and its layer colors.
///
/// # Errors
///
/// `UnknownSide` when the side is not registered.
pub fn save_side(registry: &CanvasRegistry, layers: &LayerColorStore, side_id: &str) -> Result<SideDesign, Diagnostic> {
    let objects = registry.with_scene(side_id, |scene| {
        scene.artwork().map(|node| PlacedObject::from_node(node, scene.metadata(&node.id))).collect()
    })?;
    Ok(SideDesign { objects, layer_colors: layers.snapshot(side_id) })
}

/// Snapshot every registered side.
#[must_use]
pub fn save_all(registry: &CanvasRegistry, layers: &LayerColorStore) -> DesignState {
    let mut state = DesignState::new();
    for side_id in registry.side_ids() {
        match save_side(registry, layers, &side_id) {
            Ok(design) => state.insert(side_id, design),
            // Unmounted between listing and snapshot.
            Err(e) => tracing::debug!(side_id = %side_id, error = %e, "side vanished during save"),
        }
    }
    state
}

#[cfg(test)]
#[path = "design_test.rs"]
mod tests;
