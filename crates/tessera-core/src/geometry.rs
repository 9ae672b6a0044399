//! Geometric primitives for resolved layout coordinates.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned box defined by minimum and maximum coordinates
//! - [`Insets`] - Padding values for four sides
//!
//! # Coordinate System
//!
//! Tessera uses the SVG convention:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The origin lifeline of a sequence diagram sits at `x = 0`; anything drawn
//! to its left (a note on the first participant, for example) has negative X.

use serde::Deserialize;

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use tessera_core::geometry::Point;
/// let start = Point::new(10.0, 20.0);
/// assert_eq!(start.x(), 10.0);
/// assert_eq!(start.y(), 20.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }
}

/// Width and height of an element
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the component-wise maximum of two sizes
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Grows the size by the horizontal and vertical sums of `insets`
    pub fn add_padding(self, insets: Insets) -> Self {
        Self {
            width: self.width + insets.horizontal_sum(),
            height: self.height + insets.vertical_sum(),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned rectangle stored as its minimum and maximum corners.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Creates bounds from a horizontal and a vertical span.
    ///
    /// Spans given in reverse order are normalized so that `min <= max`.
    ///
    /// ```
    /// # use tessera_core::geometry::Bounds;
    /// let bounds = Bounds::from_spans((120.0, 20.0), (0.0, 30.0));
    /// assert_eq!(bounds.min_x(), 20.0);
    /// assert_eq!(bounds.width(), 100.0);
    /// ```
    pub fn from_spans(x_span: (f32, f32), y_span: (f32, f32)) -> Self {
        Self {
            min_x: x_span.0.min(x_span.1),
            min_y: y_span.0.min(y_span.1),
            max_x: x_span.0.max(x_span.1),
            max_y: y_span.0.max(y_span.1),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the smallest bounds containing both `self` and `other`.
    ///
    /// ```
    /// # use tessera_core::geometry::{Bounds, Point, Size};
    /// let head = Bounds::new_from_top_left(Point::new(-40.0, 0.0), Size::new(80.0, 30.0));
    /// let note = Bounds::new_from_top_left(Point::new(10.0, 50.0), Size::new(90.0, 40.0));
    /// let merged = head.merge(&note);
    /// assert_eq!(merged.min_x(), -40.0);
    /// assert_eq!(merged.max_x(), 100.0);
    /// assert_eq!(merged.height(), 90.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows the bounds outward by `insets`
    pub fn add_padding(&self, insets: Insets) -> Self {
        Self {
            min_x: self.min_x - insets.left(),
            min_y: self.min_y - insets.top(),
            max_x: self.max_x + insets.right(),
            max_y: self.max_y + insets.bottom(),
        }
    }

    /// Returns true if `y` lies within the vertical span (inclusive)
    pub fn contains_y(self, y: f32) -> bool {
        y >= self.min_y && y <= self.max_y
    }
}

/// Spacing around an element with independent values per side.
///
/// Deserializes from a table with `top`, `right`, `bottom` and `left` keys;
/// missing keys default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Insets {
    top: f32,
    right: f32,
    bottom: f32,
    left: f32,
}

impl Insets {
    /// Creates new insets with specified values for each side
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Creates uniform insets with the same value for all sides
    pub fn uniform(value: f32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Creates insets with one value for top/bottom and another for left/right
    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }

    pub fn top(self) -> f32 {
        self.top
    }

    pub fn right(self) -> f32 {
        self.right
    }

    pub fn bottom(self) -> f32 {
        self.bottom
    }

    pub fn left(self) -> f32 {
        self.left
    }

    /// Returns the sum of left and right insets
    pub fn horizontal_sum(self) -> f32 {
        self.left + self.right
    }

    /// Returns the sum of top and bottom insets
    pub fn vertical_sum(self) -> f32 {
        self.top + self.bottom
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    /// Merged bounds should contain both inputs.
    fn check_bounds_merge_contains_both(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged = b1.merge(&b2);
        for b in [b1, b2] {
            prop_assert!(merged.min_x() <= b.min_x());
            prop_assert!(merged.min_y() <= b.min_y());
            prop_assert!(merged.max_x() >= b.max_x());
            prop_assert!(merged.max_y() >= b.max_y());
        }
        Ok(())
    }

    /// Merge order must not matter.
    fn check_bounds_merge_is_commutative(b1: Bounds, b2: Bounds) -> Result<(), TestCaseError> {
        let merged1 = b1.merge(&b2);
        let merged2 = b2.merge(&b1);
        prop_assert!(approx_eq!(f32, merged1.min_x(), merged2.min_x()));
        prop_assert!(approx_eq!(f32, merged1.max_y(), merged2.max_y()));
        Ok(())
    }

    proptest! {
        #[test]
        fn bounds_merge_contains_both(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_bounds_merge_contains_both(b1, b2)?;
        }

        #[test]
        fn bounds_merge_is_commutative(b1 in bounds_strategy(), b2 in bounds_strategy()) {
            check_bounds_merge_is_commutative(b1, b2)?;
        }
    }
}
