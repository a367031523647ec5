//! Engine configuration parsed from environment variables.
//!
//! Every knob has a default so an empty environment yields a working engine.
//! Unparsable values fall back to the default rather than failing startup.

use std::time::Duration;

pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_FALLBACK_PX_TO_MM: f64 = 0.25;
pub const DEFAULT_COLOR_SENSITIVITY: f64 = 40.0;
pub const DEFAULT_AUTO_MAX_BULK_COLORS: usize = 4;
pub const DEFAULT_AUTO_MIN_BULK_QUANTITY: u32 = 50;
pub const DEFAULT_AUTO_MIN_BULK_AREA_MM2: f64 = 10_000.0;
pub const DEFAULT_STITCHES_PER_MM2: f64 = 1.5;
pub const DEFAULT_FALLBACK_PRICE_PER_MM2: f64 = 10.0;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Thresholds for choosing a print method when the customer picked none.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoSelectPolicy {
    /// Bulk methods are only considered for artwork with at most this many colors.
    pub max_bulk_colors: usize,
    /// Bulk methods are only considered at or above this order quantity.
    pub min_bulk_quantity: u32,
    /// Bulk methods are only considered for artwork at least this large.
    pub min_bulk_area_mm2: f64,
}

impl Default for AutoSelectPolicy {
    fn default() -> Self {
        Self {
            max_bulk_colors: DEFAULT_AUTO_MAX_BULK_COLORS,
            min_bulk_quantity: DEFAULT_AUTO_MIN_BULK_QUANTITY,
            min_bulk_area_mm2: DEFAULT_AUTO_MIN_BULK_AREA_MM2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How long restoration waits for a side to become ready before giving up on it.
    pub ready_timeout: Duration,
    /// Pixel-to-mm ratio used while a side's background width is unknown.
    pub fallback_px_to_mm: f64,
    /// Colors closer than this (redmean distance) count as one ink.
    pub color_sensitivity: f64,
    pub auto_select: AutoSelectPolicy,
    /// Embroidery stitch estimate per mm² of artwork.
    pub stitches_per_mm2: f64,
    /// Transfer rate used when the catalog prices no transfer method at all.
    pub fallback_price_per_mm2: f64,
    /// Artifact upload endpoint. Uploading is disabled when absent.
    pub upload_url: Option<String>,
    pub upload_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            fallback_px_to_mm: DEFAULT_FALLBACK_PX_TO_MM,
            color_sensitivity: DEFAULT_COLOR_SENSITIVITY,
            auto_select: AutoSelectPolicy::default(),
            stitches_per_mm2: DEFAULT_STITCHES_PER_MM2,
            fallback_price_per_mm2: DEFAULT_FALLBACK_PRICE_PER_MM2,
            upload_url: None,
            upload_timeout: Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables.
    ///
    /// - `PRINTDESK_READY_TIMEOUT_MS`: default 5000
    /// - `PRINTDESK_FALLBACK_PX_TO_MM`: default 0.25
    /// - `PRINTDESK_COLOR_SENSITIVITY`: default 40
    /// - `PRINTDESK_AUTO_MAX_BULK_COLORS`: default 4
    /// - `PRINTDESK_AUTO_MIN_BULK_QUANTITY`: default 50
    /// - `PRINTDESK_AUTO_MIN_BULK_AREA_MM2`: default 10000
    /// - `PRINTDESK_STITCHES_PER_MM2`: default 1.5
    /// - `PRINTDESK_FALLBACK_PRICE_PER_MM2`: default 10
    /// - `PRINTDESK_UPLOAD_URL`: unset disables uploads
    /// - `PRINTDESK_UPLOAD_TIMEOUT_SECS`: default 30
    #[must_use]
    pub fn from_env() -> Self {
        let upload_url = std::env::var("PRINTDESK_UPLOAD_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty());

        Self {
            ready_timeout: Duration::from_millis(env_parse("PRINTDESK_READY_TIMEOUT_MS", DEFAULT_READY_TIMEOUT_MS)),
            fallback_px_to_mm: positive_or(
                env_parse("PRINTDESK_FALLBACK_PX_TO_MM", DEFAULT_FALLBACK_PX_TO_MM),
                DEFAULT_FALLBACK_PX_TO_MM,
            ),
            color_sensitivity: positive_or(
                env_parse("PRINTDESK_COLOR_SENSITIVITY", DEFAULT_COLOR_SENSITIVITY),
                DEFAULT_COLOR_SENSITIVITY,
            ),
            auto_select: AutoSelectPolicy {
                max_bulk_colors: env_parse("PRINTDESK_AUTO_MAX_BULK_COLORS", DEFAULT_AUTO_MAX_BULK_COLORS),
                min_bulk_quantity: env_parse("PRINTDESK_AUTO_MIN_BULK_QUANTITY", DEFAULT_AUTO_MIN_BULK_QUANTITY),
                min_bulk_area_mm2: env_parse("PRINTDESK_AUTO_MIN_BULK_AREA_MM2", DEFAULT_AUTO_MIN_BULK_AREA_MM2),
            },
            stitches_per_mm2: positive_or(
                env_parse("PRINTDESK_STITCHES_PER_MM2", DEFAULT_STITCHES_PER_MM2),
                DEFAULT_STITCHES_PER_MM2,
            ),
            fallback_price_per_mm2: positive_or(
                env_parse("PRINTDESK_FALLBACK_PRICE_PER_MM2", DEFAULT_FALLBACK_PRICE_PER_MM2),
                DEFAULT_FALLBACK_PRICE_PER_MM2,
            ),
            upload_url,
            upload_timeout: Duration::from_secs(env_parse(
                "PRINTDESK_UPLOAD_TIMEOUT_SECS",
                DEFAULT_UPLOAD_TIMEOUT_SECS,
            )),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn positive_or(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
