// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connector shape computation.

use kurbo::{CubicBez, Point, Rect, Vec2};

use crate::branch_line_width;

/// The extent of a node's box as the connector math sees it.
///
/// `inner_height` is the caption area; `outer_height` additionally includes
/// the bottom border carrying the branch color. All values are device
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
    /// Box width.
    pub width: f64,
    /// Height of the content area, excluding the bottom border.
    pub inner_height: f64,
    /// Height including the bottom border.
    pub outer_height: f64,
}

impl NodeBox {
    /// Build a box from a measured caption size and the border width drawn
    /// under it.
    pub fn from_caption(width: f64, height: f64, border_width: f64) -> Self {
        Self {
            width,
            inner_height: height,
            outer_height: height + border_width,
        }
    }
}

/// A branch curve between a child node and its parent.
///
/// Produced fresh per call by [`connector`]; never retained by this crate.
/// The frame `(left, top, width, height)` is relative to the child box's
/// top-left corner, and all four curve points are relative to the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectorShape {
    /// Frame x relative to the child box (negative when extending left).
    pub left: f64,
    /// Frame y relative to the child box.
    pub top: f64,
    /// Frame width.
    pub width: f64,
    /// Frame height.
    pub height: f64,
    /// Curve start, on the child side.
    pub start: Point,
    /// Curve end, on the parent side.
    pub end: Point,
    /// First control point.
    pub control1: Point,
    /// Second control point.
    pub control2: Point,
    /// True when the curve runs from the frame's left edge to its right.
    pub left_to_right: bool,
    /// True when the curve runs from the frame's top edge to its bottom.
    pub top_to_bottom: bool,
    /// True when the child box horizontally overlaps the parent box.
    pub overlaps: bool,
    /// Stroke width for this branch, already depth-tapered and zoom-scaled.
    pub line_width: f64,
}

impl ConnectorShape {
    /// The curve to stroke, in frame-local coordinates.
    pub fn curve(&self) -> CubicBez {
        CubicBez::new(self.start, self.control1, self.control2, self.end)
    }

    /// The frame rectangle, relative to the child box's top-left corner.
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.width,
            self.top + self.height,
        )
    }
}

/// Compute the branch connector from a child node to its parent.
///
/// - `depth` is the child's depth (≥ 1; the parent sits at `depth - 1`).
/// - `offset` is the child box's top-left relative to the parent box's
///   top-left, in device pixels.
/// - `parent` and `child` describe the two boxes, in device pixels.
/// - `zoom_factor` feeds the depth taper via [`branch_line_width`].
///
/// The function is pure: identical inputs always yield an identical
/// [`ConnectorShape`]. The curve is always directed from the child side to
/// the parent side.
///
/// Four horizontal cases are distinguished — child left or right of the
/// parent's center, each either clear of the parent box or overlapping it.
/// Non-overlap frames get one extra device pixel of width so rounding in
/// the host's rasterizer cannot open a gap where frame and box meet, and
/// the frame is never narrower than the stroke itself. Overlap curves have
/// their endpoints inset by half the stroke width so the stroke clears the
/// stacked boxes, and bend mostly vertically (the control-point roles swap
/// axes). When parent and child stroke widths differ, the parent-side
/// endpoint shifts by half the difference so this branch stays centered on
/// the thicker line it meets.
///
/// The `1/5` pull-in on the far control point is a tuned constant; changing
/// it visibly alters the branch silhouette.
pub fn connector(
    depth: u32,
    offset: Vec2,
    parent: NodeBox,
    child: NodeBox,
    zoom_factor: f64,
) -> ConnectorShape {
    debug_assert!(depth >= 1, "connectors start at depth 1");

    let line_width = branch_line_width(zoom_factor, depth);
    let parent_line_width = branch_line_width(zoom_factor, depth.saturating_sub(1));
    let half = line_width / 2.0;

    let left;
    let mut width;
    let left_to_right;
    let mut overlaps = false;

    // Child lies left of the parent's horizontal center?
    if offset.x + child.width / 2.0 < parent.width / 2.0 {
        let abs_x = offset.x.abs();
        if abs_x > child.width {
            // Clear of the parent; one extra pixel against rounding gaps.
            width = abs_x - child.width + 1.0;
            left = child.width;
            left_to_right = true;
        } else {
            left = -offset.x;
            width = child.width + offset.x;
            left_to_right = false;
            overlaps = true;
        }
    } else if offset.x > parent.width {
        width = offset.x - parent.width + 1.0;
        left = parent.width - offset.x;
        left_to_right = false;
    } else {
        width = parent.width - offset.x;
        left = 0.0;
        left_to_right = true;
        overlaps = true;
    }

    // A zero-area frame cannot hold the stroke.
    if width < line_width {
        width = line_width;
    }

    let top;
    let height;
    let top_to_bottom;
    if offset.y + child.inner_height < parent.inner_height {
        top = child.inner_height;
        height = parent.outer_height - offset.y - top;
        top_to_bottom = true;
    } else {
        top = parent.inner_height - offset.y;
        height = child.outer_height - top;
        top_to_bottom = false;
    }

    let (mut start_x, mut end_x) = if left_to_right {
        (0.0, width)
    } else {
        (width, 0.0)
    };

    // Center this branch's end on the thicker parent line it joins.
    let width_diff = (parent_line_width - line_width) / 2.0;
    let (start_y, end_y) = if top_to_bottom {
        (half, height - half - width_diff)
    } else {
        (height - half, half + width_diff)
    };

    let control1;
    let control2;
    if !overlaps {
        let c2x = if start_x > end_x {
            start_x / 5.0
        } else {
            end_x - end_x / 5.0
        };
        control2 = Point::new(c2x, end_y);
        control1 = Point::new((start_x - end_x).abs() / 2.0, start_y);
    } else {
        // Pull the endpoints in so the stroke fits fully inside the frame.
        if left_to_right {
            start_x += half;
            end_x -= half;
        } else {
            start_x -= half;
            end_x += half;
        }

        control1 = Point::new(start_x, (start_y - end_y).abs() / 2.0);
        let c2y = if start_y > end_y {
            start_y / 5.0
        } else {
            end_y - end_y / 5.0
        };
        control2 = Point::new(end_x, c2y);
    }

    ConnectorShape {
        left,
        top,
        width,
        height,
        start: Point::new(start_x, start_y),
        end: Point::new(end_x, end_y),
        control1,
        control2,
        left_to_right,
        top_to_bottom,
        overlaps,
        line_width,
    }
}
