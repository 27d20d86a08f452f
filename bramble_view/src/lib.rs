// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble View: zoom state and drawing-surface/viewport bookkeeping.
//!
//! A map view draws in two coordinate spaces. *Logical* coordinates are what
//! the data model stores and are independent of zoom; *device* coordinates
//! are logical coordinates multiplied by the current zoom factor and are
//! what actually gets painted. This crate owns the conversion:
//!
//! - [`Zoom`] holds the current factor and the delta from the previous one.
//!   It is the single piece of view-wide mutable state; everything else
//!   reads it. Invalid factors are rejected before any state changes.
//! - [`View`] combines a [`Zoom`] with the drawing surface's device size and
//!   a scroll viewport, and implements the whole-surface operations: resize
//!   on zoom while keeping the same logical point under the viewport
//!   center, centering, scrolling, and panning.
//!
//! Repositioning individual nodes on zoom is deliberately *not* here — that
//! belongs to the tree renderer, which walks its visual records once per
//! zoom change.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod zoom;

pub use zoom::{InvalidZoom, View, Viewport, Zoom};
