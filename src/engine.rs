//! `DesignEngine`: the single entry point a host talks to.
//!
//! DESIGN
//! ======
//! The engine owns every collaborator (registry, layer colors, catalog,
//! config, reviver, rasterizer, fonts, pricing cache) and exposes the
//! operations a storefront needs: mount sides, save and restore designs,
//! quote prices, recolor garment layers, toggle edit mode, and export text
//! for production. Every method takes `&self` so one engine can be shared
//! by the UI task and background work alike.

use std::sync::atomic::{AtomicBool, Ordering};

use canvas::geometry::Transform;
use canvas::render::{BoxRasterizer, Rasterizer};
use canvas::scene::{Scene, SceneObject};

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::design::restore::{RestoreContext, RestoreReport, restore};
use crate::design::reviver::{ObjectReviver, ValidatingReviver};
use crate::design::{DesignState, SideDesign, save_all, save_side};
use crate::diagnostic::Diagnostic;
use crate::export::fonts::FontBook;
use crate::export::store::{ArtifactStore, HttpArtifactStore, UploadError};
use crate::export::{ExportReport, PregeneratedExports, UploadReport, export_and_upload, export_text};
use crate::layers::LayerColorStore;
use crate::pricing::{PriceQuote, PricingCache, PricingContext, price_sides};
use crate::registry::CanvasRegistry;
use crate::units::BackgroundMetrics;

pub struct DesignEngine {
    config: EngineConfig,
    catalog: Catalog,
    registry: CanvasRegistry,
    layers: LayerColorStore,
    reviver: Box<dyn ObjectReviver>,
    rasterizer: Box<dyn Rasterizer + Send + Sync>,
    fonts: FontBook,
    pricing_cache: PricingCache,
    edit_mode: AtomicBool,
}

impl DesignEngine {
    /// Engine with the validating reviver, the box rasterizer, and no fonts.
    /// Starts in edit mode.
    #[must_use]
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            config,
            catalog,
            registry: CanvasRegistry::new(),
            layers: LayerColorStore::new(),
            reviver: Box::new(ValidatingReviver),
            rasterizer: Box::new(BoxRasterizer::new()),
            fonts: FontBook::new(),
            pricing_cache: PricingCache::new(),
            edit_mode: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn with_reviver(mut self, reviver: impl ObjectReviver + 'static) -> Self {
        self.reviver = Box::new(reviver);
        self
    }

    #[must_use]
    pub fn with_rasterizer(mut self, rasterizer: impl Rasterizer + Send + Sync + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self.pricing_cache.invalidate();
        self
    }

    #[must_use]
    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn registry(&self) -> &CanvasRegistry {
        &self.registry
    }

    #[must_use]
    pub fn layers(&self) -> &LayerColorStore {
        &self.layers
    }

    // =========================================================================
    // MOUNTING
    // =========================================================================

    /// Create and register the scene for a catalog side, with its background
    /// marker. The side is not ready until its image loads.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when the catalog has no such side.
    pub fn mount_side(&self, side_id: &str) -> Result<(), Diagnostic> {
        let side = self.catalog.side(side_id).ok_or_else(|| Diagnostic::UnknownSide(side_id.to_string()))?;
        let mut scene = Scene::new(side.id.clone(), side.layers.clone());
        if let Some(metrics) = BackgroundMetrics::for_side(side) {
            let src = side.background.as_ref().map(|bg| bg.url.clone()).unwrap_or_default();
            scene.set_background(SceneObject::background(
                src,
                Transform::at(metrics.left, metrics.top, metrics.rendered_width, metrics.rendered_height),
            ));
        }
        self.registry.register(scene);
        Ok(())
    }

    /// Record that a side's background image loaded, making it ready.
    ///
    /// # Errors
    ///
    /// `UnknownSide` when the side is not mounted.
    pub fn mark_image_loaded(&self, side_id: &str, metrics: BackgroundMetrics) -> Result<(), Diagnostic> {
        self.registry.mark_image_loaded(side_id, metrics)
    }

    /// Mount every catalog side and mark it loaded at its catalog size.
    /// Sides without a background image fall back to the default ratio.
    pub fn mount_all(&self) {
        for side in &self.catalog.sides {
            let metrics = BackgroundMetrics::for_side(side).unwrap_or_default();
            let mounted = self.mount_side(&side.id).and_then(|()| self.registry.mark_image_loaded(&side.id, metrics));
            if let Err(e) = mounted {
                tracing::warn!(side_id = %side.id, error = %e, "mount failed");
            }
        }
    }

    /// Unmount a side, dropping its scene.
    pub fn unmount_side(&self, side_id: &str) {
        self.registry.unregister(side_id);
    }

    // =========================================================================
    // DESIGN STATE
    // =========================================================================

    #[must_use]
    pub fn save(&self) -> DesignState {
        save_all(&self.registry, &self.layers)
    }

    /// # Errors
    ///
    /// `UnknownSide` when the side is not mounted.
    pub fn save_side(&self, side_id: &str) -> Result<SideDesign, Diagnostic> {
        save_side(&self.registry, &self.layers, side_id)
    }

    /// Restore a saved design onto the mounted sides.
    pub async fn restore(&self, state: &DesignState) -> RestoreReport {
        let ctx = RestoreContext {
            registry: &self.registry,
            layers: &self.layers,
            catalog: &self.catalog,
            reviver: self.reviver.as_ref(),
            ready_timeout: self.config.ready_timeout,
            interactive: self.edit_mode.load(Ordering::Acquire),
        };
        restore(&ctx, state).await
    }

    // =========================================================================
    // PRICING
    // =========================================================================

    /// Quote every mounted catalog side at `quantity`. Reuses the previous
    /// quote while no scene has changed.
    #[must_use]
    pub fn price_sides(&self, quantity: u32) -> PriceQuote {
        self.pricing_cache.get_or_compute(quantity, self.registry.versions(), || {
            let ctx = PricingContext {
                registry: &self.registry,
                catalog: &self.catalog,
                config: &self.config,
                rasterizer: self.rasterizer.as_ref(),
            };
            price_sides(&ctx, &self.catalog.sides, quantity)
        })
    }

    // =========================================================================
    // EDITING
    // =========================================================================

    /// Recolor a garment layer on `side_id` and every side that shows it.
    ///
    /// # Errors
    ///
    /// `LayerColor` when `hex` is not a color.
    pub fn set_layer_color(&self, side_id: &str, layer_id: &str, hex: &str) -> Result<Vec<String>, Diagnostic> {
        self.layers.set(&self.registry, side_id, layer_id, hex)
    }

    /// Toggle whether artwork can be selected and moved.
    pub fn set_edit_mode(&self, enabled: bool) {
        self.edit_mode.store(enabled, Ordering::Release);
        self.registry.for_each_scene_mut(|scene| scene.set_interactive(enabled));
    }

    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.edit_mode.load(Ordering::Acquire)
    }

    // =========================================================================
    // EXPORT
    // =========================================================================

    #[must_use]
    pub fn export_text(&self, state: &DesignState) -> ExportReport {
        export_text(state, &self.fonts)
    }

    pub async fn export_and_upload(
        &self,
        state: &DesignState,
        pregenerated: Option<&PregeneratedExports>,
        store: &dyn ArtifactStore,
    ) -> UploadReport {
        export_and_upload(state, pregenerated, &self.fonts, store).await
    }

    /// HTTP artifact store for the configured upload URL, if any.
    ///
    /// # Errors
    ///
    /// `HttpClientBuild` when the HTTP client cannot be built.
    pub fn upload_store(&self) -> Result<Option<HttpArtifactStore>, UploadError> {
        self.config
            .upload_url
            .as_ref()
            .map(|url| HttpArtifactStore::new(url.clone(), self.config.upload_timeout))
            .transpose()
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
