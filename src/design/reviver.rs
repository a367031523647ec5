//! Rebuilding live nodes from serialized objects.
//!
//! In a browser this step loads image bitmaps and web fonts, so it is async
//! and may fail per object. The engine only depends on the trait; the
//! built-in [`ValidatingReviver`] builds the node directly and rejects only
//! geometry a scene cannot hold. Anything a live scene accepts (empty text,
//! named or unknown fills) must survive a save and restore unchanged.

use canvas::scene::{NodeRole, SceneObject};

use super::PlacedObject;
use crate::diagnostic::Diagnostic;

/// Turns a [`PlacedObject`] back into a scene node.
#[async_trait::async_trait]
pub trait ObjectReviver: Send + Sync {
    /// Rebuild one object. The returned node keeps `object.object_id`.
    ///
    /// # Errors
    ///
    /// Returns a `Reconstruct` diagnostic when the object cannot be rebuilt.
    async fn enliven(&self, side_id: &str, object: &PlacedObject) -> Result<SceneObject, Diagnostic>;
}

/// Builds artwork nodes, rejecting non-finite geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatingReviver;

#[async_trait::async_trait]
impl ObjectReviver for ValidatingReviver {
    async fn enliven(&self, side_id: &str, object: &PlacedObject) -> Result<SceneObject, Diagnostic> {
        validate(object).map_err(|reason| Diagnostic::Reconstruct {
            side_id: side_id.to_string(),
            object_id: object.object_id,
            reason: reason.to_string(),
        })?;
        let mut node = SceneObject::with_id(object.object_id, NodeRole::Artwork, object.transform, object.content.clone());
        node.opacity = object.opacity;
        Ok(node)
    }
}

fn validate(object: &PlacedObject) -> Result<(), &'static str> {
    if !object.transform.is_finite() {
        return Err("non-finite transform");
    }
    if !object.opacity.is_finite() {
        return Err("non-finite opacity");
    }
    Ok(())
}
