//! Diagnostics: the typed failures the engine recovers from.
//!
//! DESIGN
//! ======
//! Nothing in the engine propagates a failure to its caller as a hard error:
//! a pricing or export glitch must never block checkout. Each fallible step
//! returns `Result<T, Diagnostic>`; the step's caller logs the diagnostic,
//! applies the documented fallback, and attaches the diagnostic to its report
//! so a host can surface it if it wants to.

use serde::Serialize;

use canvas::scene::{ObjectId, PrintMethod};

/// A recoverable failure, tagged with where it happened.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Diagnostic {
    /// A side was used before it was registered and its background loaded.
    #[error("side {side_id} is not ready: {reason}")]
    NotReady { side_id: String, reason: String },

    /// The side is not mounted in the registry.
    #[error("side {0} is not registered")]
    UnknownSide(String),

    /// A serialized object could not be turned back into a scene node.
    #[error("object {object_id} on side {side_id} could not be reconstructed: {reason}")]
    Reconstruct { side_id: String, object_id: ObjectId, reason: String },

    /// No tier spec exists for a method; a conservative fallback was priced.
    #[error("no pricing tiers for {method}; priced with fallback transfer rate")]
    PricingLookup { method: PrintMethod },

    /// The requested quantity was unusable and has been clamped.
    #[error("invalid quantity {requested}; priced as {used}")]
    Quantity { requested: u32, used: u32 },

    /// A layer color write was rejected.
    #[error("invalid layer color {value:?} for layer {layer_id}")]
    LayerColor { layer_id: String, value: String },

    /// Artifact generation or upload failed for one object.
    #[error("export of object {object_id} on side {side_id} failed: {reason}")]
    Export { side_id: String, object_id: ObjectId, reason: String },
}

impl Diagnostic {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotReady { .. } => "E_NOT_READY",
            Self::UnknownSide(_) => "E_UNKNOWN_SIDE",
            Self::Reconstruct { .. } => "E_RECONSTRUCT",
            Self::PricingLookup { .. } => "E_PRICING_LOOKUP",
            Self::Quantity { .. } => "E_QUANTITY",
            Self::LayerColor { .. } => "E_LAYER_COLOR",
            Self::Export { .. } => "E_EXPORT",
        }
    }
}

/// Wire form of a diagnostic for JSON reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    pub code: &'static str,
    pub message: String,
}

impl From<&Diagnostic> for DiagnosticRecord {
    fn from(d: &Diagnostic) -> Self {
        Self { code: d.code(), message: d.to_string() }
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DiagnosticRecord::from(self).serialize(serializer)
    }
}
