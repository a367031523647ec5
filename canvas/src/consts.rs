//! Shared numeric constants for the canvas crate.

// ── Geometry ────────────────────────────────────────────────────

/// Areas at or below this value (in squared canvas pixels) are treated as empty.
pub const DEGENERATE_AREA_EPSILON: f64 = 1e-9;

// ── Rasterizing ─────────────────────────────────────────────────

/// Longest raster edge in pixels. Larger scenes are downscaled to fit.
pub const MAX_RASTER_EDGE_PX: u32 = 1024;

/// Half-thickness of a line shape, in object-local pixels, when painted.
pub const LINE_HALF_THICKNESS_PX: f64 = 1.5;

/// Alpha below which a painted pixel is considered transparent.
pub const OPAQUE_ALPHA_CUTOFF: u8 = 128;

// ── Color ───────────────────────────────────────────────────────

/// Fill used when a shape or text node carries an unparsable color.
pub const DEFAULT_FILL_HEX: &str = "#000000";
