// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Moving an existing node by dragging.

use kurbo::Point;

/// State for dragging an existing node to a new offset.
///
/// One node drags at a time. While the drag runs the renderer repositions
/// the node's visual at the provisional device position and redraws only
/// the branch to its parent; the data model is untouched until the session
/// [finishes](NodeDrag::finish) and the host decides to commit the reported
/// logical offset.
///
/// Like the creation tool, the session tolerates its node disappearing
/// mid-drag: [`NodeDrag::cancel`] drops the reference without a report.
#[derive(Clone, Debug, Default)]
pub struct NodeDrag<K> {
    node: Option<K>,
}

impl<K: Copy + PartialEq> NodeDrag<K> {
    /// No drag in progress.
    pub const fn new() -> Self {
        Self { node: None }
    }

    /// Begin dragging `node`.
    ///
    /// Refused (returning `false`) while another drag is active.
    pub fn start(&mut self, node: K) -> bool {
        if self.node.is_some() {
            return false;
        }
        self.node = Some(node);
        true
    }

    /// The node being dragged, if any.
    pub fn node(&self) -> Option<K> {
        self.node
    }

    /// Whether a node drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.node.is_some()
    }

    /// End the drag, converting the final device position to the logical
    /// offset the data model should be offered.
    pub fn finish(&mut self, device_pos: Point, zoom_factor: f64) -> Option<(K, Point)> {
        let node = self.node.take()?;
        let logical = Point::new(device_pos.x / zoom_factor, device_pos.y / zoom_factor);
        Some((node, logical))
    }

    /// Abandon the drag without a report.
    pub fn cancel(&mut self) -> Option<K> {
        self.node.take()
    }
}
