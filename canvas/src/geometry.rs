//! Geometry primitives in canvas pixel space.
//!
//! Canvas space has its origin at the top-left of the rendered side with `y`
//! growing downward. Object transforms follow the usual retained-canvas
//! convention: `left`/`top` position the unscaled box, `scale_x`/`scale_y`
//! stretch it, and `angle` rotates it clockwise around its center.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::DEGENERATE_AREA_EPSILON;

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotate this point clockwise by `degrees` around `center`.
    #[must_use]
    pub fn rotate_around(self, center: Point, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point { x: center.x + dx * cos - dy * sin, y: center.y + dx * sin + dy * cos }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// `true` when the rectangle has no usable area or carries non-finite values.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let finite = self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite();
        !finite || self.width <= 0.0 || self.height <= 0.0 || self.area() <= DEGENERATE_AREA_EPSILON
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Smallest rectangle containing both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect { x, y, width: self.right().max(other.right()) - x, height: self.bottom().max(other.bottom()) - y }
    }

    /// Overlap of two rectangles, or `None` when they do not intersect.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect { x, y, width: right - x, height: bottom - y })
    }

    /// Multiply every component by `factor` (used when mapping between pixel spaces).
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect { x: self.x * factor, y: self.y * factor, width: self.width * factor, height: self.height * factor }
    }

    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }
}

/// Placement of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Left edge of the unrotated, scaled box.
    pub left: f64,
    /// Top edge of the unrotated, scaled box.
    pub top: f64,
    /// Intrinsic (unscaled) width in canvas pixels.
    pub width: f64,
    /// Intrinsic (unscaled) height in canvas pixels.
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    /// Clockwise rotation in degrees around the box center.
    #[serde(default)]
    pub angle: f64,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self { left: 0.0, top: 0.0, width: 0.0, height: 0.0, scale_x: 1.0, scale_y: 1.0, angle: 0.0, flip_x: false, flip_y: false }
    }
}

impl Transform {
    /// Unrotated box at `(left, top)` with the given intrinsic size and unit scale.
    #[must_use]
    pub fn at(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height, ..Self::default() }
    }

    #[must_use]
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x.abs()
    }

    #[must_use]
    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y.abs()
    }

    /// The scaled box before rotation.
    #[must_use]
    pub fn local_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.scaled_width(), self.scaled_height())
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.local_rect().center()
    }

    /// Axis-aligned bounding box of the rotated, scaled box.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        let w = self.scaled_width();
        let h = self.scaled_height();
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let half_w = ((w * cos).abs() + (h * sin).abs()) / 2.0;
        let half_h = ((w * sin).abs() + (h * cos).abs()) / 2.0;
        let c = self.center();
        Rect::new(c.x - half_w, c.y - half_h, half_w * 2.0, half_h * 2.0)
    }

    /// Map a canvas point into normalized object coordinates (`0..=1` on both
    /// axes inside the object), undoing rotation and flips.
    #[must_use]
    pub fn to_unit(&self, p: Point) -> Option<Point> {
        let w = self.scaled_width();
        let h = self.scaled_height();
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        let c = self.center();
        let local = p.rotate_around(c, -self.angle);
        let mut u = (local.x - self.left) / w;
        let mut v = (local.y - self.top) / h;
        if self.flip_x {
            u = 1.0 - u;
        }
        if self.flip_y {
            v = 1.0 - v;
        }
        Some(Point::new(u, v))
    }

    /// `true` when every component is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [self.left, self.top, self.width, self.height, self.scale_x, self.scale_y, self.angle]
            .iter()
            .all(|v| v.is_finite())
    }
}
