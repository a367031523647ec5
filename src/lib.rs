//! Design state, print pricing, and production export for customizable
//! apparel.
//!
//! A product has one or more printable sides. Each mounted side is a
//! [`canvas::scene::Scene`] held by the [`registry::CanvasRegistry`]; the
//! [`engine::DesignEngine`] ties the registry to the catalog and exposes the
//! storefront operations (save, restore, quote, recolor, export).
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Facade owning every collaborator |
//! | [`catalog`] | Sides, print areas, and per-method price tables |
//! | [`registry`] | Per-side scenes, background metrics, readiness signals |
//! | [`units`] | Pixel to millimetre conversion and print-area mapping |
//! | [`layers`] | Garment layer colors shared across sides |
//! | [`design`] | Save/restore of the portable design document |
//! | [`colors`] | Distinct-color sampling of rendered artwork |
//! | [`pricing`] | Method selection, tier math, quotes, and the quote cache |
//! | [`export`] | Vector text export and artifact upload |
//! | [`config`] | Environment-driven engine settings |
//! | [`diagnostic`] | Logged, non-fatal failures with stable codes |

pub mod catalog;
pub mod colors;
pub mod config;
pub mod design;
pub mod diagnostic;
pub mod engine;
pub mod export;
pub mod layers;
pub mod pricing;
pub mod registry;
pub mod units;

pub use engine::DesignEngine;
