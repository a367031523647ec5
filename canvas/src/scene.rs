//! Scene model: nodes, their content, and the per-side store.
//!
//! A [`Scene`] is the live, mutable object graph for one printable side. It
//! holds nodes in draw order (index 0 is drawn first), a side-table of
//! [`ObjectMetadata`] keyed by stable [`ObjectId`], the garment layer ids
//! visible on this side, and a version counter.
//!
//! Every mutating method bumps the version. Consumers that cache derived data
//! (prices, color counts) compare versions instead of trusting stale values.
//!
//! Nodes come in three roles: exactly one background marker (the product
//! photo), customer artwork, and snap guides. Only artwork is ever exported.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Rect, Transform};

/// Stable identity of a scene node. Assigned once, never regenerated.
pub type ObjectId = Uuid;

/// Identifier of a garment panel layer (e.g. `"body"`, `"sleeve-left"`).
pub type LayerId = String;

// =============================================================================
// PRINT METHOD
// =============================================================================

/// Physical production technique used to realize a piece of artwork.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintMethod {
    /// Direct-to-film transfer.
    Dtf,
    /// Direct-to-garment inkjet.
    Dtg,
    /// Screen printing, one screen per color.
    ScreenPrinting,
    Embroidery,
    /// Sewn fabric patch.
    Applique,
}

impl PrintMethod {
    pub const ALL: [PrintMethod; 5] =
        [Self::Dtf, Self::Dtg, Self::ScreenPrinting, Self::Embroidery, Self::Applique];

    /// Transfer methods are priced per item by printed area.
    #[must_use]
    pub fn is_transfer(self) -> bool {
        matches!(self, Self::Dtf | Self::Dtg)
    }

    /// Bulk methods are priced as a job cost amortized over the order quantity.
    #[must_use]
    pub fn is_bulk(self) -> bool {
        !self.is_transfer()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dtf => "dtf",
            Self::Dtg => "dtg",
            Self::ScreenPrinting => "screen_printing",
            Self::Embroidery => "embroidery",
            Self::Applique => "applique",
        }
    }
}

impl fmt::Display for PrintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CONTENT
// =============================================================================

/// Customer-facing kind of a placed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Image,
    Text,
    Shape,
}

/// Primitive outline of a shape node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rect,
    /// Ellipse inscribed in the bounding box.
    Ellipse,
    /// Isosceles triangle with its apex at the top-center.
    Triangle,
    /// Horizontal segment across the box's vertical center.
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageContent {
    /// URL or path of the bitmap.
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
    pub font_family: String,
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    #[serde(default = "default_font_style")]
    pub font_style: String,
    #[serde(default = "default_text_align")]
    pub text_align: String,
    pub fill: String,
}

fn default_font_weight() -> String {
    "normal".into()
}

fn default_font_style() -> String {
    "normal".into()
}

fn default_text_align() -> String {
    "left".into()
}

impl TextContent {
    /// Plain text run with default weight, style, and alignment.
    #[must_use]
    pub fn new(text: impl Into<String>, font_family: impl Into<String>, font_size: f64, fill: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: font_family.into(),
            font_size,
            font_weight: default_font_weight(),
            font_style: default_font_style(),
            text_align: default_text_align(),
            fill: fill.into(),
        }
    }

    #[must_use]
    pub fn is_bold(&self) -> bool {
        matches!(self.font_weight.as_str(), "bold" | "bolder" | "600" | "700" | "800" | "900")
    }

    #[must_use]
    pub fn is_italic(&self) -> bool {
        matches!(self.font_style.as_str(), "italic" | "oblique")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeContent {
    pub shape: ShapeKind,
    pub fill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default)]
    pub stroke_width: f64,
}

/// What a node draws. Tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Content {
    Image(ImageContent),
    Text(TextContent),
    Shape(ShapeContent),
}

impl Content {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Image(_) => ObjectKind::Image,
            Self::Text(_) => ObjectKind::Text,
            Self::Shape(_) => ObjectKind::Shape,
        }
    }

    /// Fill color for text and shapes; `None` for bitmaps.
    #[must_use]
    pub fn fill(&self) -> Option<&str> {
        match self {
            Self::Image(_) => None,
            Self::Text(t) => Some(&t.fill),
            Self::Shape(s) => Some(&s.fill),
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Structural role of a node within its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// The product photo. Exactly one per scene; never exported.
    Background,
    /// Snap/alignment line shown while editing; never exported.
    Guide,
    /// Customer-authored design element.
    Artwork,
}

/// A live graphics node.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    pub role: NodeRole,
    pub transform: Transform,
    pub content: Content,
    /// `0.0` (invisible) to `1.0` (opaque).
    pub opacity: f64,
    /// Whether the node can be selected by pointer.
    pub selectable: bool,
    /// Whether the node receives pointer events at all.
    pub evented: bool,
    /// Clip region in canvas pixels. Derived from calibration, not persisted.
    pub clip: Option<Rect>,
}

impl SceneObject {
    /// New artwork node with a fresh id.
    #[must_use]
    pub fn artwork(transform: Transform, content: Content) -> Self {
        Self::with_id(Uuid::new_v4(), NodeRole::Artwork, transform, content)
    }

    #[must_use]
    pub fn with_id(id: ObjectId, role: NodeRole, transform: Transform, content: Content) -> Self {
        Self { id, role, transform, content, opacity: 1.0, selectable: true, evented: true, clip: None }
    }

    /// The product photo for a side, non-interactive.
    #[must_use]
    pub fn background(src: impl Into<String>, transform: Transform) -> Self {
        let mut node =
            Self::with_id(Uuid::new_v4(), NodeRole::Background, transform, Content::Image(ImageContent { src: src.into() }));
        node.selectable = false;
        node.evented = false;
        node
    }

    /// A horizontal or vertical snap line across `bounds`.
    #[must_use]
    pub fn guide(bounds: Rect) -> Self {
        let mut node = Self::with_id(
            Uuid::new_v4(),
            NodeRole::Guide,
            Transform::at(bounds.x, bounds.y, bounds.width, bounds.height),
            Content::Shape(ShapeContent { shape: ShapeKind::Line, fill: "#ff00ff".into(), stroke: None, stroke_width: 1.0 }),
        );
        node.selectable = false;
        node.evented = false;
        node
    }

    #[must_use]
    pub fn is_background(&self) -> bool {
        self.role == NodeRole::Background
    }

    #[must_use]
    pub fn is_guide(&self) -> bool {
        self.role == NodeRole::Guide
    }

    /// Artwork is everything that is neither the background nor a guide.
    #[must_use]
    pub fn is_exportable(&self) -> bool {
        !self.is_background() && !self.is_guide()
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.content.kind()
    }

    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        self.transform.bounding_rect()
    }
}

/// Typed per-object properties kept outside the graphics node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Explicit print method chosen by the customer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_method: Option<PrintMethod>,
}

// =============================================================================
// SCENE
// =============================================================================

/// The live object graph for one product side.
#[derive(Debug, Clone)]
pub struct Scene {
    side_id: String,
    nodes: Vec<SceneObject>,
    metadata: HashMap<ObjectId, ObjectMetadata>,
    layers: Vec<LayerId>,
    version: u64,
}

impl Scene {
    /// Empty scene for `side_id` showing the given garment layers.
    #[must_use]
    pub fn new(side_id: impl Into<String>, layers: Vec<LayerId>) -> Self {
        Self { side_id: side_id.into(), nodes: Vec::new(), metadata: HashMap::new(), layers, version: 0 }
    }

    #[must_use]
    pub fn side_id(&self) -> &str {
        &self.side_id
    }

    /// Monotonic edit counter. Starts at `0` and grows on every mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[must_use]
    pub fn layers(&self) -> &[LayerId] {
        &self.layers
    }

    #[must_use]
    pub fn has_layer(&self, layer_id: &str) -> bool {
        self.layers.iter().any(|l| l == layer_id)
    }

    /// Record a render/edit without structural change (e.g. a layer recolor).
    pub fn touch(&mut self) {
        self.version += 1;
    }

    /// Install the background marker, replacing any previous one. The
    /// background is always drawn first.
    pub fn set_background(&mut self, mut node: SceneObject) {
        self.nodes.retain(|n| !n.is_background());
        node.role = NodeRole::Background;
        self.nodes.insert(0, node);
        self.touch();
    }

    #[must_use]
    pub fn background(&self) -> Option<&SceneObject> {
        self.nodes.iter().find(|n| n.is_background())
    }

    /// Append a node on top of the stack with default metadata.
    pub fn add(&mut self, node: SceneObject) {
        self.add_with_metadata(node, ObjectMetadata::default());
    }

    /// Append a node on top of the stack. A node with the same id is replaced
    /// in place instead of duplicated. Background nodes go through
    /// [`Scene::set_background`], so a scene never holds two.
    pub fn add_with_metadata(&mut self, node: SceneObject, metadata: ObjectMetadata) {
        if node.is_background() {
            self.set_background(node);
            return;
        }
        if node.is_exportable() {
            self.metadata.insert(node.id, metadata);
        }
        if let Some(existing) = self.nodes.iter_mut().find(|n| n.id == node.id) {
            *existing = node;
        } else {
            self.nodes.push(node);
        }
        self.touch();
    }

    /// Remove a node and its metadata.
    pub fn remove(&mut self, id: &ObjectId) -> Option<SceneObject> {
        let idx = self.nodes.iter().position(|n| n.id == *id)?;
        self.metadata.remove(id);
        self.touch();
        Some(self.nodes.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObject> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    /// Replace a node's transform. Returns `false` if the node doesn't exist.
    pub fn set_transform(&mut self, id: &ObjectId, transform: Transform) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == *id) else {
            return false;
        };
        node.transform = transform;
        self.touch();
        true
    }

    /// Replace a node's content. Returns `false` if the node doesn't exist.
    pub fn set_content(&mut self, id: &ObjectId, content: Content) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == *id) else {
            return false;
        };
        node.content = content;
        self.touch();
        true
    }

    /// Set or clear the explicit print method of an artwork node.
    /// Returns `false` if no artwork node has this id.
    pub fn set_print_method(&mut self, id: &ObjectId, method: Option<PrintMethod>) -> bool {
        let Some(meta) = self.metadata.get_mut(id) else {
            return false;
        };
        meta.print_method = method;
        self.touch();
        true
    }

    /// Metadata of an artwork node. Background and guides have none.
    #[must_use]
    pub fn metadata(&self, id: &ObjectId) -> Option<&ObjectMetadata> {
        self.metadata.get(id)
    }

    /// All nodes in draw order.
    pub fn nodes(&self) -> impl Iterator<Item = &SceneObject> {
        self.nodes.iter()
    }

    /// Artwork nodes in draw order, skipping background and guides.
    pub fn artwork(&self) -> impl Iterator<Item = &SceneObject> {
        self.nodes.iter().filter(|n| n.is_exportable())
    }

    /// Remove every artwork node, keeping background and guides. Returns the
    /// number of nodes removed.
    pub fn clear_artwork(&mut self) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !n.is_exportable());
        self.metadata.clear();
        self.touch();
        before - self.nodes.len()
    }

    /// Apply interactivity flags to every artwork node.
    pub fn set_interactive(&mut self, interactive: bool) {
        for node in self.nodes.iter_mut().filter(|n| n.is_exportable()) {
            node.selectable = interactive;
            node.evented = interactive;
        }
        self.touch();
    }

    /// Number of nodes of every role.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
