//! Restoring a saved design onto mounted scenes.
//!
//! Sides restore concurrently; each side runs strictly in order:
//! wait for readiness, clear artwork, apply layer colors, rebuild each object,
//! re-render. A side that never becomes ready is abandoned; an object that
//! cannot be rebuilt is skipped. Neither stops the rest.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;

use canvas::geometry::Rect;
use canvas::scene::NodeRole;

use super::reviver::ObjectReviver;
use super::{DesignState, SideDesign};
use crate::catalog::Catalog;
use crate::diagnostic::Diagnostic;
use crate::layers::LayerColorStore;
use crate::registry::CanvasRegistry;
use crate::units::print_area_on_canvas;

/// Collaborators a restore pass needs.
pub struct RestoreContext<'a> {
    pub registry: &'a CanvasRegistry,
    pub layers: &'a LayerColorStore,
    pub catalog: &'a Catalog,
    pub reviver: &'a dyn ObjectReviver,
    pub ready_timeout: Duration,
    /// Edit mode: restored artwork is selectable and evented.
    pub interactive: bool,
}

/// Outcome of a restore pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    /// Objects restored per side.
    pub restored: BTreeMap<String, usize>,
    /// Sides that never became ready or were unmounted mid-restore.
    pub abandoned: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RestoreReport {
    /// Number of objects skipped because they could not be rebuilt.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.diagnostics.iter().filter(|d| matches!(d, Diagnostic::Reconstruct { .. })).count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.abandoned.is_empty() && self.diagnostics.is_empty()
    }
}

enum SideOutcome {
    Restored { side_id: String, count: usize, diagnostics: Vec<Diagnostic> },
    Abandoned { side_id: String, diagnostic: Diagnostic, diagnostics: Vec<Diagnostic> },
}

/// Restore every side present in `state`.
pub async fn restore(ctx: &RestoreContext<'_>, state: &DesignState) -> RestoreReport {
    let outcomes = join_all(state.sides().map(|(side_id, design)| restore_side(ctx, side_id, design))).await;

    let mut report = RestoreReport::default();
    for outcome in outcomes {
        match outcome {
            SideOutcome::Restored { side_id, count, diagnostics } => {
                report.restored.insert(side_id, count);
                report.diagnostics.extend(diagnostics);
            }
            SideOutcome::Abandoned { side_id, diagnostic, diagnostics } => {
                report.abandoned.push(side_id);
                report.diagnostics.extend(diagnostics);
                report.diagnostics.push(diagnostic);
            }
        }
    }
    tracing::info!(
        sides = report.restored.len(),
        abandoned = report.abandoned.len(),
        skipped = report.skipped(),
        "design restored"
    );
    report
}

async fn restore_side(ctx: &RestoreContext<'_>, side_id: &str, design: &SideDesign) -> SideOutcome {
    let abandon = |diagnostic: Diagnostic, diagnostics: Vec<Diagnostic>| {
        tracing::warn!(side_id = %side_id, error = %diagnostic, "abandoning side restore");
        SideOutcome::Abandoned { side_id: side_id.to_string(), diagnostic, diagnostics }
    };

    if let Err(e) = ctx.registry.wait_ready(side_id, ctx.ready_timeout).await {
        return abandon(e, Vec::new());
    }

    let cleared = match ctx.registry.with_scene_mut(side_id, |scene| scene.clear_artwork()) {
        Ok(n) => n,
        Err(e) => return abandon(e, Vec::new()),
    };
    tracing::debug!(side_id = %side_id, cleared, "cleared artwork before restore");

    let mut diagnostics = ctx.layers.apply(ctx.registry, side_id, &design.layer_colors);
    let clip = clip_region(ctx, side_id);

    let mut count = 0;
    for object in &design.objects {
        let mut node = match ctx.reviver.enliven(side_id, object).await {
            Ok(node) => node,
            Err(e) => {
                tracing::warn!(side_id = %side_id, object_id = %object.object_id, error = %e, "skipping object");
                diagnostics.push(e);
                continue;
            }
        };
        node.id = object.object_id;
        node.role = NodeRole::Artwork;
        node.clip = clip;
        node.selectable = ctx.interactive;
        node.evented = ctx.interactive;

        let metadata = object.metadata();
        if let Err(e) = ctx.registry.with_scene_mut(side_id, |scene| scene.add_with_metadata(node, metadata)) {
            return abandon(e, diagnostics);
        }
        count += 1;
    }

    if let Err(e) = ctx.registry.with_scene_mut(side_id, |scene| scene.touch()) {
        return abandon(e, diagnostics);
    }
    SideOutcome::Restored { side_id: side_id.to_string(), count, diagnostics }
}

/// Print area in canvas pixels, when the side and its background are known.
fn clip_region(ctx: &RestoreContext<'_>, side_id: &str) -> Option<Rect> {
    let side = ctx.catalog.side(side_id)?;
    let metrics = ctx.registry.background_metrics(side_id)?;
    Some(print_area_on_canvas(side, &metrics))
}

#[cfg(test)]
#[path = "restore_test.rs"]
mod tests;
