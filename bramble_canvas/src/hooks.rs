// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host notifications and the pointer-input vocabulary.
//!
//! Rather than attaching a handler to every node surface, the host resolves
//! which node (and which part of it) a raw pointer event targets and feeds
//! one [`CanvasInput`] into [`MapCanvas::dispatch`](crate::MapCanvas::dispatch)
//! — a single dispatch point over an explicit per-node registry. The
//! canvas updates its own state (for example, installing a node's drag
//! handlers on first hover) and forwards the event to the matching
//! [`CanvasHooks`] method.

use kurbo::Point;

use bramble_metrics::Color;

/// What a pointer event targets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PointerTarget<K> {
    /// A node's container, outside its caption.
    Node(K),
    /// A node's caption.
    Caption(K),
    /// A node's fold button.
    FoldButton(K),
    /// The drawing surface itself.
    Surface,
}

/// A pointer event, already hit-resolved by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CanvasInput<K> {
    /// Primary button pressed.
    PointerDown {
        /// Event target.
        target: PointerTarget<K>,
    },
    /// Primary button released.
    PointerUp {
        /// Event target.
        target: PointerTarget<K>,
    },
    /// Double click.
    DoubleClick {
        /// Event target.
        target: PointerTarget<K>,
    },
    /// Pointer entered a target.
    PointerOver {
        /// Event target.
        target: PointerTarget<K>,
    },
    /// Wheel scrolled over the surface.
    Wheel {
        /// Scroll delta, positive away from the user.
        delta: f64,
    },
}

/// Callbacks a host may implement to observe interaction.
///
/// Every method has a silent no-op default, so hosts implement only what
/// they care about — the renderer calls them unconditionally.
pub trait CanvasHooks<K> {
    /// Pointer pressed on a node's caption.
    fn node_pointer_down(&mut self, node: K) {
        let _ = node;
    }

    /// Pointer released on a node's caption.
    fn node_pointer_up(&mut self, node: K) {
        let _ = node;
    }

    /// A node's caption was double-clicked.
    fn node_double_clicked(&mut self, node: K) {
        let _ = node;
    }

    /// Pointer entered a node's container.
    fn node_hovered(&mut self, node: K) {
        let _ = node;
    }

    /// Pointer entered a node's caption.
    fn caption_hovered(&mut self, node: K) {
        let _ = node;
    }

    /// Wheel scrolled over the drawing surface.
    fn wheel_scrolled(&mut self, delta: f64) {
        let _ = delta;
    }

    /// A node-move drag repositioned its node (fires per move).
    fn node_dragging(&mut self) {}

    /// A node-move drag finished at the given logical offset.
    ///
    /// The model was not touched; committing the offset is the host's call.
    fn node_dragged(&mut self, node: K, offset: Point) {
        let _ = (node, offset);
    }

    /// A node's fold button was clicked.
    fn fold_button_clicked(&mut self, node: K) {
        let _ = node;
    }

    /// A creation drag started on `node`; return a preview line color, or
    /// `None` to fall back to the node's branch color.
    fn creation_drag_started(&mut self, node: K) -> Option<Color> {
        let _ = node;
        None
    }
}

/// A hooks value for hosts that want no notifications.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<K> CanvasHooks<K> for NoHooks {}
