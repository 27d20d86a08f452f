// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drag-to-create tool.
//!
//! The creation handle binds to one node at a time. Pulling the handle out
//! starts a drag; the host draws a provisional branch at the attached
//! node's depth plus one while the drag runs, and on release the gesture
//! reports where the new child would sit and how far the pointer traveled.
//! The data model decides whether that is worth a node.
//!
//! ```
//! use bramble_gesture::{CreationGesture, CreationPhase};
//! use kurbo::Point;
//!
//! let mut tool: CreationGesture<u32> = CreationGesture::new();
//! tool.attach(7, 2, 120.0);
//! assert_eq!(tool.phase(), CreationPhase::Attached);
//!
//! tool.begin_drag(None);
//! let proposal = tool
//!     .finish_drag(Point::new(0.0, 0.0), Point::new(6.0, 8.0), 2.0)
//!     .unwrap();
//! assert_eq!(proposal.parent, 7);
//! assert_eq!(proposal.distance, 5.0); // 10 device pixels at zoom 2
//! assert_eq!(tool.phase(), CreationPhase::Attached);
//! ```

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;

use bramble_metrics::Color;

/// Which horizontal half of its node the creation handle sits on.
///
/// Mirrors the layout symmetry: nodes growing rightward get the handle on
/// their right edge, and vice versa.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum HandleSide {
    /// Node offset is negative, handle on the left.
    Left,
    /// Node sits on its parent's vertical axis.
    #[default]
    Center,
    /// Node offset is positive, handle on the right.
    Right,
}

impl HandleSide {
    fn from_offset_x(offset_x: f64) -> Self {
        if offset_x > 0.0 {
            Self::Right
        } else if offset_x < 0.0 {
            Self::Left
        } else {
            Self::Center
        }
    }
}

/// Lifecycle phase of the creation tool.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CreationPhase {
    /// Not bound to any node.
    Idle,
    /// Bound to a node, handle at rest.
    Attached,
    /// Handle is being pulled out.
    Dragging,
}

/// What a finished creation drag proposes to the data model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CreationProposal<K> {
    /// The node the handle was attached to — the prospective parent.
    pub parent: K,
    /// Proposed child offset relative to the parent, logical coordinates.
    pub offset: Point,
    /// Euclidean drag distance, logical coordinates.
    pub distance: f64,
}

/// State machine for dragging new branches out of existing nodes.
///
/// `IDLE → ATTACHED → DRAGGING → ATTACHED`, with [`CreationGesture::detach`]
/// forcing `IDLE` from anywhere — including mid-drag, when the attached
/// node may already be gone. After a detach the tool holds no reference to
/// the old node.
#[derive(Clone, Debug)]
pub struct CreationGesture<K> {
    node: Option<K>,
    depth: u32,
    side: HandleSide,
    line_color: Option<Color>,
    dragging: bool,
}

impl<K: Copy + PartialEq> CreationGesture<K> {
    /// A detached tool.
    pub const fn new() -> Self {
        Self {
            node: None,
            depth: 0,
            side: HandleSide::Center,
            line_color: None,
            dragging: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> CreationPhase {
        match (self.node, self.dragging) {
            (None, _) => CreationPhase::Idle,
            (Some(_), false) => CreationPhase::Attached,
            (Some(_), true) => CreationPhase::Dragging,
        }
    }

    /// Bind the handle to `node` at the given depth.
    ///
    /// A no-op (returning `false`) when already attached to the same node,
    /// so hover events can call this freely. Rebinding to a different node
    /// cancels any drag in progress. `offset_x` is the node's logical
    /// x offset, used to pick the handle side.
    pub fn attach(&mut self, node: K, depth: u32, offset_x: f64) -> bool {
        if self.node == Some(node) {
            return false;
        }
        self.node = Some(node);
        self.depth = depth;
        self.side = HandleSide::from_offset_x(offset_x);
        self.line_color = None;
        self.dragging = false;
        true
    }

    /// Unbind from the current node, cancelling any drag in progress.
    ///
    /// Returns the node the tool was attached to, if any. Safe to call when
    /// the node has already been deleted.
    pub fn detach(&mut self) -> Option<K> {
        self.dragging = false;
        self.line_color = None;
        self.node.take()
    }

    /// The node the handle is bound to.
    pub fn attached_node(&self) -> Option<K> {
        self.node
    }

    /// Depth cached at attach time.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Depth the provisional branch is drawn at.
    pub fn preview_depth(&self) -> u32 {
        self.depth + 1
    }

    /// Which side of the node the handle sits on.
    pub fn side(&self) -> HandleSide {
        self.side
    }

    /// Start pulling the handle out.
    ///
    /// `line_color` is the preview color the collaborator granted (it may
    /// decline, in which case the host falls back to the parent's branch
    /// color). Returns `false` unless the tool is attached and at rest.
    pub fn begin_drag(&mut self, line_color: Option<Color>) -> bool {
        if self.node.is_none() || self.dragging {
            return false;
        }
        self.line_color = line_color;
        self.dragging = true;
        true
    }

    /// Preview color for the drag in progress.
    pub fn line_color(&self) -> Option<Color> {
        self.line_color
    }

    /// Whether a creation drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Finish the drag and report what it proposes.
    ///
    /// `anchor` is the handle's rest position and `dragged` its final
    /// position, both in device coordinates relative to the attached node;
    /// both are divided by `zoom_factor` so the data model sees logical
    /// values. Returns `None` when no drag was in progress. The tool
    /// returns to `ATTACHED` either way.
    pub fn finish_drag(
        &mut self,
        anchor: Point,
        dragged: Point,
        zoom_factor: f64,
    ) -> Option<CreationProposal<K>> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        self.line_color = None;
        let parent = self.node?;

        let offset = Point::new(dragged.x / zoom_factor, dragged.y / zoom_factor);
        let dx = (anchor.x - dragged.x) / zoom_factor;
        let dy = (anchor.y - dragged.y) / zoom_factor;
        let distance = (dx * dx + dy * dy).sqrt();

        Some(CreationProposal {
            parent,
            offset,
            distance,
        })
    }
}

impl<K: Copy + PartialEq> Default for CreationGesture<K> {
    fn default() -> Self {
        Self::new()
    }
}
