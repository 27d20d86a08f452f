// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node visual records.

use kurbo::{Point, Size};
use smallvec::SmallVec;

use bramble_connector::{ConnectorShape, NodeBox};
use bramble_metrics::{Color, Font};

bitflags::bitflags! {
    /// Boolean visual state of one node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct VisualFlags: u8 {
        /// The node's container is shown (its parent is not folded away).
        const SHOWN = 0b0000_0001;
        /// The node is highlighted as selected.
        const SELECTED = 0b0000_0010;
        /// Drag handlers have been installed on this node.
        ///
        /// Installation is deferred to the first pointer hover so drawing a
        /// large tree stays cheap.
        const HANDLERS = 0b0000_0100;
    }
}

impl Default for VisualFlags {
    fn default() -> Self {
        Self::SHOWN
    }
}

/// Which side of its node a fold button sits on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FoldSide {
    /// Node grows leftward.
    Left,
    /// Node grows rightward.
    Right,
}

/// Whether a node's children are shown or hidden.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FoldState {
    /// Children visible.
    Open,
    /// Children hidden.
    Closed,
}

/// The fold control of a node with collapsible children.
///
/// Created at most once per node, the first time one of its non-root
/// children is rendered (and only when neither the node nor its parent is
/// the root). The state only moves through explicit open/close calls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoldButton {
    /// Button side, mirroring the node's horizontal growth direction.
    pub side: FoldSide,
    /// Current fold state.
    pub state: FoldState,
}

/// Everything the paint layer needs to render one node.
///
/// Records are parent-relative: `device_pos` is the node box's top-left
/// relative to the parent's, already zoom-scaled, and the connector frame
/// is relative to this node's box. The record is fully derived from the
/// data model plus the current zoom — rebuilding the tree from scratch
/// produces identical records.
#[derive(Clone, Debug)]
pub struct NodeVisual<K> {
    /// Parent key; `None` for the root.
    pub parent: Option<K>,
    /// Children in draw order, as last drawn.
    pub children: SmallVec<[K; 4]>,
    /// Depth at last draw (root is 0).
    pub depth: u32,
    /// Box top-left relative to the parent box, device pixels.
    pub device_pos: Point,
    /// Measured caption extent, device pixels (clamped and padded).
    pub caption_size: Size,
    /// Box extents derived from the caption and border.
    pub node_box: NodeBox,
    /// Bottom-border width carrying the branch color, device pixels.
    pub border_width: f64,
    /// Branch color, painted on the border and the connector.
    pub branch_color: Color,
    /// Caption font (logical size; scale by `font_scale` to paint).
    pub font: Font,
    /// Zoom factor baked into the device values of this record.
    pub font_scale: f64,
    /// Caption x shift within the box; non-zero only for the root.
    pub caption_offset_x: f64,
    /// Branch to the parent; `None` for the root.
    pub connector: Option<ConnectorShape>,
    /// Fold control, once any foldable child has been rendered.
    pub fold_button: Option<FoldButton>,
    /// Boolean state flags.
    pub flags: VisualFlags,
}

impl<K> NodeVisual<K> {
    /// Whether this node's own container is shown.
    ///
    /// Effective visibility also requires every ancestor to be shown; see
    /// [`MapCanvas::is_visible`](crate::MapCanvas::is_visible).
    pub fn is_shown(&self) -> bool {
        self.flags.contains(VisualFlags::SHOWN)
    }

    /// Whether the node is highlighted as selected.
    pub fn is_selected(&self) -> bool {
        self.flags.contains(VisualFlags::SELECTED)
    }
}
