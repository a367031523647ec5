//! Retained scene graph for the product designer.
//!
//! Each printable side of a product owns one [`scene::Scene`]: a z-ordered
//! list of graphics nodes (one background marker, customer artwork, and
//! optional snap guides) plus a typed metadata side-table and a version
//! counter bumped on every mutation. The engine crate reads scenes to price
//! and serialize designs; this crate never talks to the network.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`scene`] | Scene nodes, content payloads, metadata side-table, and the per-side store |
//! | [`geometry`] | Points, rectangles, and object transforms (bounding boxes under rotation) |
//! | [`color`] | RGB colors, hex parsing, and perceptual distance |
//! | [`render`] | Rasterizer seam and the built-in flat-fill rasterizer |
//! | [`consts`] | Shared numeric constants |

pub mod color;
pub mod consts;
pub mod geometry;
pub mod render;
pub mod scene;
