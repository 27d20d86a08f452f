// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The read/write surface of the host-owned mind-map model.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Point;

use bramble_metrics::{Color, Font};

/// Access to the mind-map tree the renderer draws from.
///
/// The model owns every node; the renderer only reads attributes and calls
/// the mutation entry points. Parent links are lookup-only back-references
/// — ownership runs strictly along the `children` edges, so implementations
/// need no cyclic ownership.
///
/// Offsets are logical coordinates relative to the *parent's* box, not
/// absolute canvas positions. `children` order is draw order; geometry does
/// not depend on it.
pub trait MapModel {
    /// Node handle. Small and copyable; a generational id or index works
    /// well.
    type Key: Copy + Eq + core::hash::Hash;

    /// The root node.
    fn root(&self) -> Self::Key;

    /// Parent of `node`, or `None` for the root.
    fn parent(&self, node: Self::Key) -> Option<Self::Key>;

    /// Children of `node` in draw order.
    fn children(&self, node: Self::Key) -> Vec<Self::Key>;

    /// Distance from the root (root is 0).
    fn depth(&self, node: Self::Key) -> u32;

    /// Logical offset relative to the parent's box.
    fn offset(&self, node: Self::Key) -> Point;

    /// Caption text.
    fn caption(&self, node: Self::Key) -> String;

    /// Caption font attributes.
    fn font(&self, node: Self::Key) -> Font;

    /// Color of the branch joining `node` to its parent.
    fn branch_color(&self, node: Self::Key) -> Color;

    /// Whether the node's children start out hidden.
    fn fold_children(&self, node: Self::Key) -> bool;

    /// Whether `node` is the root.
    fn is_root(&self, node: Self::Key) -> bool {
        self.parent(node).is_none()
    }

    /// Whether `node` has no children.
    fn is_leaf(&self, node: Self::Key) -> bool {
        self.children(node).is_empty()
    }

    /// Replace a node's caption. Called when a caption edit commits.
    fn set_caption(&mut self, node: Self::Key, caption: &str);

    /// Move a node to a new logical offset. Called when a node drag is
    /// committed by the host.
    fn set_offset(&mut self, node: Self::Key, offset: Point);

    /// Materialize a new child at a logical offset, or decline (for
    /// example when the creation drag was too short — that threshold is
    /// model policy, never enforced by the renderer).
    fn create_child(&mut self, parent: Self::Key, offset: Point) -> Option<Self::Key>;
}
