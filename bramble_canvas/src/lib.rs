// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Canvas: the retained visual tree for a mind map.
//!
//! This crate turns a host-owned mind-map model into per-node visual
//! records a paint layer can render, and keeps those records current
//! through structural edits, zoom changes, and the interactive gestures
//! from [`bramble_gesture`]. It draws nothing itself: a visual record
//! carries the node's device position, box extents, caption metrics, fold
//! control, and branch [`ConnectorShape`](bramble_connector::ConnectorShape);
//! the host strokes and fills.
//!
//! ## The collaborator split
//!
//! - The **data model** owns the tree. [`MapModel`] is the read surface the
//!   renderer walks (parent, children, depth, offset, caption, font,
//!   colors, fold flag) plus the three mutation entry points the renderer
//!   itself calls: `set_caption`, `set_offset`, `create_child`. The
//!   renderer never creates or destroys node identity.
//! - The **visual registry** is owned here and is fully derived: a
//!   [`MapCanvas::draw_tree`] from the model alone reconstructs it at any
//!   time, and a redraw with unchanged state is a no-op in content.
//! - The **host** paints from the records, feeds pointer input through the
//!   single [`MapCanvas::dispatch`] entry point, and observes interaction
//!   through the optional [`CanvasHooks`] callbacks (unimplemented hooks
//!   silently no-op).
//!
//! ## Update granularity
//!
//! Attribute changes invalidate exactly the touched node plus the branches
//! that meet it ([`MapCanvas::redraw_connectors`]); only a zoom change may
//! walk the whole tree ([`MapCanvas::scale_map`]). Mutating operations
//! record the affected node keys; hosts drain them with
//! [`MapCanvas::take_dirty`] and repaint just those.
//!
//! Operations aimed at a node with no visual record (a double delete, an
//! update racing a removal) are safe no-ops. Caption measurement failures
//! degrade to the last known size — a slightly stale box beats a failed
//! draw. Only an invalid zoom factor is a hard error, rejected before any
//! state changes.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod canvas;
mod dirty;
mod hooks;
mod model;
mod visual;

pub use canvas::MapCanvas;
pub use hooks::{CanvasHooks, CanvasInput, NoHooks, PointerTarget};
pub use model::MapModel;
pub use visual::{FoldButton, FoldSide, FoldState, NodeVisual, VisualFlags};
