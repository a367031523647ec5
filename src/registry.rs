//! Canvas registry: one live scene per product side, plus readiness.
//!
//! DESIGN
//! ======
//! A side is *ready* once its scene is registered and its background image
//! has loaded. Restoration against an unready side places objects with the
//! wrong calibration, so callers await [`CanvasRegistry::wait_ready`] instead
//! of polling flags.
//!
//! Each side slot owns a `tokio::sync::watch` channel carrying its readiness.
//! Slots are created lazily by whichever comes first (a waiter or a
//! registration) and survive `unregister`, so a waiter that arrives early
//! still sees a later mount. Scene access happens through closures under a
//! std `RwLock`; no guard is ever held across an `.await`.
//!
//! Every registration gets a fresh mount number. A remounted scene restarts
//! its version at zero, so derived data is keyed by [`SceneVersion`] (mount
//! and version together) rather than the bare counter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use tokio::sync::watch;

use canvas::scene::Scene;

use crate::diagnostic::Diagnostic;
use crate::units::BackgroundMetrics;

// =============================================================================
// READINESS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Readiness {
    registered: bool,
    image_loaded: bool,
}

impl Readiness {
    fn is_ready(self) -> bool {
        self.registered && self.image_loaded
    }
}

/// Identity of one scene state: which mount of a side, at which edit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneVersion {
    pub side_id: String,
    pub mount: u64,
    pub version: u64,
}

struct SideSlot {
    scene: Option<Scene>,
    mount: u64,
    metrics: Option<BackgroundMetrics>,
    ready: watch::Sender<Readiness>,
}

impl SideSlot {
    fn new() -> Self {
        let (ready, _) = watch::channel(Readiness::default());
        Self { scene: None, mount: 0, metrics: None, ready }
    }
}

// =============================================================================
// REGISTRY
// =============================================================================

/// Owns every mounted scene. Shared by reference; all methods take `&self`.
#[derive(Default)]
pub struct CanvasRegistry {
    slots: RwLock<HashMap<String, SideSlot>>,
    mounts: AtomicU64,
}

impl CanvasRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SideSlot>> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SideSlot>> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mount a scene under its own side id. Re-registering replaces the
    /// scene and resets the image-loaded flag.
    pub fn register(&self, scene: Scene) {
        let side_id = scene.side_id().to_string();
        let mut slots = self.write();
        let slot = slots.entry(side_id.clone()).or_insert_with(SideSlot::new);
        slot.mount = self.mounts.fetch_add(1, Ordering::Relaxed) + 1;
        slot.scene = Some(scene);
        slot.metrics = None;
        slot.ready.send_replace(Readiness { registered: true, image_loaded: false });
        tracing::debug!(side_id = %side_id, "scene registered");
    }

    /// Unmount a side: drops the scene, its metrics, and its readiness.
    /// Returns the scene if one was mounted.
    pub fn unregister(&self, side_id: &str) -> Option<Scene> {
        let mut slots = self.write();
        let slot = slots.get_mut(side_id)?;
        slot.metrics = None;
        slot.ready.send_replace(Readiness::default());
        tracing::debug!(side_id = %side_id, "scene unregistered");
        slot.scene.take()
    }

    #[must_use]
    pub fn is_registered(&self, side_id: &str) -> bool {
        self.read().get(side_id).is_some_and(|s| s.scene.is_some())
    }

    /// Record that the side's background image finished loading and how it
    /// is drawn. Resolves pending readiness waiters and bumps the scene
    /// version, since the pixel calibration changed.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when no scene is registered for `side_id`.
    pub fn mark_image_loaded(&self, side_id: &str, metrics: BackgroundMetrics) -> Result<(), Diagnostic> {
        let mut slots = self.write();
        let slot = registered_slot(&mut slots, side_id)?;
        slot.metrics = Some(metrics);
        if let Some(scene) = slot.scene.as_mut() {
            scene.touch();
        }
        slot.ready.send_modify(|r| r.image_loaded = true);
        tracing::debug!(side_id = %side_id, rendered_width = metrics.rendered_width, "background loaded");
        Ok(())
    }

    #[must_use]
    pub fn is_image_loaded(&self, side_id: &str) -> bool {
        self.read().get(side_id).is_some_and(|s| s.ready.borrow().image_loaded)
    }

    #[must_use]
    pub fn is_ready(&self, side_id: &str) -> bool {
        self.read().get(side_id).is_some_and(|s| s.ready.borrow().is_ready())
    }

    /// Update background placement after a zoom or resize. Bumps the scene
    /// version so derived prices are recomputed.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when no scene is registered for `side_id`.
    pub fn set_background_metrics(&self, side_id: &str, metrics: BackgroundMetrics) -> Result<(), Diagnostic> {
        let mut slots = self.write();
        let slot = registered_slot(&mut slots, side_id)?;
        slot.metrics = Some(metrics);
        if let Some(scene) = slot.scene.as_mut() {
            scene.touch();
        }
        Ok(())
    }

    #[must_use]
    pub fn background_metrics(&self, side_id: &str) -> Option<BackgroundMetrics> {
        self.read().get(side_id).and_then(|s| s.metrics)
    }

    /// Wait until `side_id` is registered and image-loaded, at most `timeout`.
    ///
    /// # Errors
    ///
    /// `NotReady` on timeout or when the registry is dropped mid-wait.
    pub async fn wait_ready(&self, side_id: &str, timeout: Duration) -> Result<(), Diagnostic> {
        let mut rx = {
            let mut slots = self.write();
            slots.entry(side_id.to_string()).or_insert_with(SideSlot::new).ready.subscribe()
        };
        let not_ready = |reason: &str| Diagnostic::NotReady { side_id: side_id.to_string(), reason: reason.to_string() };
        match tokio::time::timeout(timeout, rx.wait_for(|r| r.is_ready())).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(not_ready("registry dropped")),
            Err(_) => Err(not_ready(&format!("timed out after {}ms", timeout.as_millis()))),
        }
    }

    /// Run `f` against a registered scene.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when no scene is registered for `side_id`.
    pub fn with_scene<R>(&self, side_id: &str, f: impl FnOnce(&Scene) -> R) -> Result<R, Diagnostic> {
        let slots = self.read();
        let scene = slots
            .get(side_id)
            .and_then(|s| s.scene.as_ref())
            .ok_or_else(|| Diagnostic::UnknownSide(side_id.to_string()))?;
        Ok(f(scene))
    }

    /// Run `f` against a registered scene with mutable access.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when no scene is registered for `side_id`.
    pub fn with_scene_mut<R>(&self, side_id: &str, f: impl FnOnce(&mut Scene) -> R) -> Result<R, Diagnostic> {
        let mut slots = self.write();
        let slot = registered_slot(&mut slots, side_id)?;
        let scene = slot.scene.as_mut().ok_or_else(|| Diagnostic::UnknownSide(side_id.to_string()))?;
        Ok(f(scene))
    }

    /// Run `f` against every registered scene under one write lock.
    pub fn for_each_scene_mut(&self, mut f: impl FnMut(&mut Scene)) {
        let mut slots = self.write();
        for scene in slots.values_mut().filter_map(|s| s.scene.as_mut()) {
            f(scene);
        }
    }

    /// Registered side ids, sorted.
    #[must_use]
    pub fn side_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> =
            self.read().iter().filter(|(_, s)| s.scene.is_some()).map(|(id, _)| id.clone()).collect();
        ids.sort();
        ids
    }

    /// Version of every registered scene, sorted by side id.
    #[must_use]
    pub fn versions(&self) -> Vec<SceneVersion> {
        let mut out: Vec<SceneVersion> = self
            .read()
            .iter()
            .filter_map(|(id, s)| {
                let scene = s.scene.as_ref()?;
                Some(SceneVersion { side_id: id.clone(), mount: s.mount, version: scene.version() })
            })
            .collect();
        out.sort();
        out
    }
}

fn registered_slot<'a>(slots: &'a mut HashMap<String, SideSlot>, side_id: &str) -> Result<&'a mut SideSlot, Diagnostic> {
    slots
        .get_mut(side_id)
        .filter(|s| s.scene.is_some())
        .ok_or_else(|| Diagnostic::UnknownSide(side_id.to_string()))
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
