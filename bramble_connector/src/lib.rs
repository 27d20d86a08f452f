// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Connector: branch-curve geometry for mind-map style trees.
//!
//! A mind map joins every non-root node to its parent with a curved branch.
//! This crate computes that branch as pure data — a [`ConnectorShape`]
//! holding the local frame the curve lives in, the draw-direction flags, and
//! the cubic bezier's end and control points — from the child's offset
//! relative to its parent, the two node boxes, and the depth-tapered branch
//! width. It never touches a drawing surface; stroking the returned
//! [`kurbo::CubicBez`] with [`ConnectorShape::line_width`] is the caller's
//! job.
//!
//! All inputs are device (zoom-scaled) values except `depth`; see
//! [`connector`] for the exact contract. The same function serves regular
//! branches, live drag previews, and the provisional branch of a
//! drag-to-create gesture (computed at `depth + 1` against a stand-in child
//! box).
//!
//! # Coordinate space
//!
//! The frame `(left, top, width, height)` is positioned relative to the
//! *child* box's top-left corner, and the curve points are relative to the
//! frame — matching a per-branch canvas parented to the child node. `left`
//! is negative whenever the frame extends toward a parent lying to the
//! child's left.
//!
//! Identical inputs always produce an identical shape, so callers may
//! compare shapes to skip redundant repaints.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod curve;

pub use curve::{ConnectorShape, NodeBox, connector};

/// Width of a branch line at the given tree depth, in device pixels.
///
/// Branches taper as they get deeper: `zoom_factor * (12 - 2 * depth)`,
/// clamped to a 2-device-pixel floor so deep branches stay visible at any
/// zoom. Depth 0 is the root's own border.
pub fn branch_line_width(zoom_factor: f64, depth: u32) -> f64 {
    let width = zoom_factor * (12.0 - f64::from(depth) * 2.0);
    if width < 2.0 { 2.0 } else { width }
}
