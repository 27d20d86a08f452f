// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Gesture: pointer-gesture state machines for mind-map editing.
//!
//! Three small session types, each tracking exactly one interaction at a
//! time and each tolerant of losing its target mid-gesture (a node deleted
//! under the pointer, a map swapped out):
//!
//! - [`CreationGesture`] — the drag-to-create tool. A handle attaches to a
//!   node; pulling it out previews a provisional branch and, on release,
//!   yields a [`CreationProposal`] with the new child's logical offset and
//!   the logical drag distance. Whether a child actually materializes is
//!   the data model's decision — this crate never enforces a minimum
//!   distance.
//! - [`NodeDrag`] — moving an existing node. Tracks which node is being
//!   dragged and converts the final device position back to the logical
//!   offset reported to the data model.
//! - [`CaptionEdit`] — in-place caption editing. Snapshots the original
//!   text for rollback, tracks the live text, and marks when the host's
//!   debounced connector redraw is due.
//!
//! The machines are pure state: they hold no geometry and never touch the
//! renderer. The renderer (or host) reads their state each event and does
//! the drawing. All are generic over a copyable node key `K`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod creation;
mod drag;
mod edit;

pub use creation::{CreationGesture, CreationPhase, CreationProposal, HandleSide};
pub use drag::NodeDrag;
pub use edit::CaptionEdit;
