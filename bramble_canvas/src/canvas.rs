// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The map canvas: registry, traversals, and the host-facing operations.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::{Point, Size, Vec2};
use smallvec::SmallVec;

use bramble_connector::{ConnectorShape, NodeBox, branch_line_width, connector};
use bramble_gesture::{CaptionEdit, CreationGesture, CreationProposal, NodeDrag};
use bramble_metrics::{
    Color, Font, HeuristicMeasurer, NODE_CAPTION_MIN_WIDTH, ROOT_CAPTION_MIN_WIDTH,
    TextMeasurer, caption_metrics,
};
use bramble_view::{InvalidZoom, View};

use crate::dirty::DirtySet;
use crate::hooks::{CanvasHooks, CanvasInput, PointerTarget};
use crate::model::MapModel;
use crate::visual::{FoldButton, FoldSide, FoldState, NodeVisual, VisualFlags};

/// Line-height factor used when measurement fails and no earlier size is
/// known.
const FALLBACK_LINE_HEIGHT: f64 = 1.3;

/// The retained visual tree of one mind map.
///
/// Owns the per-node visual records, the view (zoom + surface + viewport),
/// and the three gesture sessions. Generic over the model's node key `K`
/// and the caption measurer `T` (the deterministic
/// [`HeuristicMeasurer`] by default; hosts with a real text stack plug in
/// their own).
///
/// Model access is passed per call rather than stored, so the host keeps
/// full ownership of its tree between calls.
#[derive(Debug)]
pub struct MapCanvas<K, T = HeuristicMeasurer> {
    view: View,
    visuals: HashMap<K, NodeVisual<K>>,
    root: Option<K>,
    creation: CreationGesture<K>,
    creation_preview: Option<ConnectorShape>,
    node_drag: NodeDrag<K>,
    caption_edit: CaptionEdit<K>,
    measurer: T,
    dirty: DirtySet<K>,
}

impl<K: Copy + Eq + core::hash::Hash> MapCanvas<K, HeuristicMeasurer> {
    /// A canvas using the heuristic caption measurer.
    pub fn new() -> Self {
        Self::with_measurer(HeuristicMeasurer::default())
    }
}

impl<K: Copy + Eq + core::hash::Hash> Default for MapCanvas<K, HeuristicMeasurer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Copy + Eq + core::hash::Hash, T: TextMeasurer> MapCanvas<K, T> {
    /// A canvas measuring captions through `measurer`.
    pub fn with_measurer(measurer: T) -> Self {
        Self {
            view: View::new(),
            visuals: HashMap::new(),
            root: None,
            creation: CreationGesture::new(),
            creation_preview: None,
            node_drag: NodeDrag::new(),
            caption_edit: CaptionEdit::new(),
            measurer,
            dirty: DirtySet::new(),
        }
    }

    // --- view ---

    /// The view state (zoom, surface, viewport).
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Current zoom factor.
    pub fn zoom_factor(&self) -> f64 {
        self.view.zoom.factor()
    }

    /// Set a new zoom factor.
    ///
    /// Rejects non-positive or non-finite values before touching any
    /// state. Follow up with [`Self::apply_view_zoom`] (surface + scroll)
    /// and [`Self::scale_map`] (per-node walk) to make it visible.
    pub fn set_zoom_factor(&mut self, factor: f64) -> Result<(), InvalidZoom> {
        self.view.zoom.set_factor(factor)
    }

    /// Resize the drawing surface for the latest zoom change, keeping the
    /// same logical point under the viewport center.
    pub fn apply_view_zoom(&mut self) {
        self.view.apply_zoom();
    }

    /// Set the viewport (visible window) size.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.view.viewport.size = size;
    }

    /// Set the drawing surface from logical dimensions.
    pub fn set_dimensions(&mut self, logical: Size) {
        self.view.set_dimensions(logical);
    }

    /// Scroll so the surface center sits under the viewport center.
    pub fn center(&mut self) {
        self.view.center();
    }

    /// Pan the viewport (map dragging).
    pub fn scroll_by(&mut self, delta: Vec2) {
        self.view.scroll_by(delta);
    }

    /// Drop all visual state and reset the surface. Zoom survives; the
    /// next [`Self::draw_tree`] starts fresh.
    pub fn clear(&mut self) {
        self.visuals.clear();
        self.root = None;
        self.creation.detach();
        self.creation_preview = None;
        self.node_drag.cancel();
        self.caption_edit.cancel();
        self.dirty.clear();
        self.view.clear();
    }

    // --- registry accessors ---

    /// The root drawn by the last [`Self::draw_tree`].
    pub fn root(&self) -> Option<K> {
        self.root
    }

    /// The visual record of a node, if drawn.
    pub fn visual(&self, node: K) -> Option<&NodeVisual<K>> {
        self.visuals.get(&node)
    }

    /// Whether a node currently has a visual record.
    pub fn has_visual(&self, node: K) -> bool {
        self.visuals.contains_key(&node)
    }

    /// Device position of a node's box relative to the surface origin.
    ///
    /// Walks the parent chain summing the parent-relative positions.
    pub fn world_position(&self, node: K) -> Option<Point> {
        let mut v = self.visuals.get(&node)?;
        let mut pos = v.device_pos.to_vec2();
        while let Some(parent) = v.parent {
            v = self.visuals.get(&parent)?;
            pos += v.device_pos.to_vec2();
        }
        Some(pos.to_point())
    }

    /// Whether a node and all of its ancestors are shown.
    pub fn is_visible(&self, node: K) -> bool {
        let Some(mut v) = self.visuals.get(&node) else {
            return false;
        };
        loop {
            if !v.is_shown() {
                return false;
            }
            match v.parent.and_then(|p| self.visuals.get(&p)) {
                Some(parent) => v = parent,
                None => return true,
            }
        }
    }

    /// Keys in paint order: parents strictly before their children.
    pub fn paint_order(&self) -> Vec<K> {
        let mut out = Vec::with_capacity(self.visuals.len());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = alloc::vec![root];
        while let Some(key) = stack.pop() {
            let Some(v) = self.visuals.get(&key) else {
                continue;
            };
            out.push(key);
            for &child in v.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    /// Drain the keys touched since the last call, in first-touched order.
    pub fn take_dirty(&mut self) -> Vec<K> {
        self.dirty.drain()
    }

    // --- drawing ---

    /// Draw the whole tree, replacing any prior visual state.
    pub fn draw_tree<M: MapModel<Key = K>>(&mut self, model: &M) {
        self.visuals.clear();
        self.creation.detach();
        self.creation_preview = None;
        self.node_drag.cancel();
        self.caption_edit.cancel();
        self.dirty.clear();

        let root = model.root();
        self.root = Some(root);
        self.insert_subtree(model, root);
    }

    /// Draw one node (and its subtree) into an already drawn tree.
    ///
    /// Used after the model materializes a child from a creation report.
    /// A no-op when the node's parent has no visual yet.
    pub fn create_node_visual<M: MapModel<Key = K>>(&mut self, model: &M, node: K) {
        if let Some(parent) = model.parent(node)
            && !self.visuals.contains_key(&parent)
        {
            return;
        }
        self.insert_subtree(model, node);
    }

    /// Pre-order insertion; a child's connector reads the parent box the
    /// same pass just produced.
    fn insert_subtree<M: MapModel<Key = K>>(&mut self, model: &M, start: K) {
        let mut stack = alloc::vec![start];
        while let Some(node) = stack.pop() {
            self.build_visual(model, node);
            for &child in model.children(node).iter().rev() {
                stack.push(child);
            }
        }
    }

    fn build_visual<M: MapModel<Key = K>>(&mut self, model: &M, node: K) {
        let zoom = self.view.zoom.factor();
        let depth = model.depth(node);
        let parent = model.parent(node);
        let is_root = parent.is_none();
        let offset = model.offset(node);
        let font = model.font(node);
        let caption = model.caption(node);

        let border_width = branch_line_width(zoom, depth);
        let caption_size = self.measure_caption(&font, &caption, is_root, None);
        let node_box = NodeBox::from_caption(caption_size.width, caption_size.height, border_width);
        let device_pos = self.view.zoom.point_to_device(offset);

        let mut flags = VisualFlags::default();
        if let Some(p) = parent
            && model.fold_children(p)
        {
            flags.remove(VisualFlags::SHOWN);
        }

        let shape = parent.and_then(|p| self.visuals.get(&p)).map(|pv| {
            connector(depth, device_pos.to_vec2(), pv.node_box, node_box, zoom)
        });

        let visual = NodeVisual {
            parent,
            children: SmallVec::new(),
            depth,
            device_pos,
            caption_size,
            node_box,
            border_width,
            branch_color: model.branch_color(node),
            font,
            font_scale: zoom,
            caption_offset_x: if is_root {
                -zoom * ROOT_CAPTION_MIN_WIDTH / 2.0
            } else {
                0.0
            },
            connector: shape,
            fold_button: None,
            flags,
        };

        if let Some(p) = parent {
            // The parent grows a fold button the first time a foldable
            // child shows up — unless it or its own parent is the root.
            if !is_root
                && !model.is_root(p)
                && let Some(pv) = self.visuals.get_mut(&p)
                && pv.fold_button.is_none()
            {
                pv.fold_button = Some(FoldButton {
                    side: if model.offset(p).x > 0.0 {
                        FoldSide::Right
                    } else {
                        FoldSide::Left
                    },
                    state: if model.fold_children(p) {
                        FoldState::Closed
                    } else {
                        FoldState::Open
                    },
                });
            }
            if let Some(pv) = self.visuals.get_mut(&p)
                && !pv.children.contains(&node)
            {
                pv.children.push(node);
            }
        }

        self.visuals.insert(node, visual);
        self.dirty.mark(node);
    }

    /// Measure a caption, falling back to `last` (or a minimal box) when
    /// the measurer cannot answer.
    fn measure_caption(&self, font: &Font, text: &str, is_root: bool, last: Option<Size>) -> Size {
        let zoom = self.view.zoom.factor();
        match caption_metrics(&self.measurer, font, text, is_root, zoom) {
            Ok(size) => size,
            Err(_unavailable) => {
                #[cfg(feature = "log")]
                log::warn!("caption measurement unavailable; reusing previous size");
                last.unwrap_or_else(|| {
                    let min = if is_root {
                        ROOT_CAPTION_MIN_WIDTH
                    } else {
                        NODE_CAPTION_MIN_WIDTH
                    };
                    Size::new(
                        zoom * min + 2.0,
                        zoom * font.size * FALLBACK_LINE_HEIGHT + 2.0,
                    )
                })
            }
        }
    }

    // --- incremental updates ---

    /// Re-apply a node's font, colors, and metrics, then redraw the
    /// branches that meet it. Safe no-op without a visual.
    pub fn update_node<M: MapModel<Key = K>>(&mut self, model: &M, node: K) {
        let Some(v) = self.visuals.get(&node) else {
            return;
        };
        let is_root = v.parent.is_none();
        let last = v.caption_size;
        let border_width = v.border_width;

        let font = model.font(node);
        let caption_size = self.measure_caption(&font, &model.caption(node), is_root, Some(last));

        if let Some(v) = self.visuals.get_mut(&node) {
            v.font = font;
            v.branch_color = model.branch_color(node);
            v.caption_size = caption_size;
            v.node_box =
                NodeBox::from_caption(caption_size.width, caption_size.height, border_width);
        }
        self.redraw_connectors(node);
    }

    /// Re-measure a node's caption as if it read `text`, resizing the box
    /// without touching connectors. Safe no-op without a visual.
    pub fn set_node_text<M: MapModel<Key = K>>(&mut self, model: &M, node: K, text: &str) {
        let Some(v) = self.visuals.get(&node) else {
            return;
        };
        let is_root = v.parent.is_none();
        let last = v.caption_size;
        let border_width = v.border_width;

        let caption_size = self.measure_caption(&model.font(node), text, is_root, Some(last));
        if let Some(v) = self.visuals.get_mut(&node) {
            v.caption_size = caption_size;
            v.node_box =
                NodeBox::from_caption(caption_size.width, caption_size.height, border_width);
        }
        self.dirty.mark(node);
    }

    /// Recompute the branch to this node's parent and the branches from
    /// each child back to it. This is the whole invalidation for any
    /// geometry-affecting attribute change — never a full-tree redraw.
    pub fn redraw_connectors(&mut self, node: K) {
        let Some(v) = self.visuals.get(&node) else {
            return;
        };
        let has_parent = v.parent.is_some();
        let children: SmallVec<[K; 4]> = v.children.clone();

        if has_parent {
            self.recompute_connector(node);
        }
        for child in children {
            self.recompute_connector(child);
        }
        self.dirty.mark(node);
    }

    fn recompute_connector(&mut self, node: K) {
        let zoom = self.view.zoom.factor();
        let Some(v) = self.visuals.get(&node) else {
            return;
        };
        let Some(parent) = v.parent else {
            return;
        };
        let Some(pv) = self.visuals.get(&parent) else {
            return;
        };
        let shape = connector(v.depth, v.device_pos.to_vec2(), pv.node_box, v.node_box, zoom);
        if let Some(v) = self.visuals.get_mut(&node) {
            v.connector = Some(shape);
        }
    }

    /// Move a node's visual to the model's current offset and redraw its
    /// branch. Safe no-op without a visual.
    pub fn position_node<M: MapModel<Key = K>>(&mut self, model: &M, node: K) {
        if !self.visuals.contains_key(&node) {
            return;
        }
        let device_pos = self.view.zoom.point_to_device(model.offset(node));
        let Some(v) = self.visuals.get_mut(&node) else {
            return;
        };
        v.device_pos = device_pos;
        self.recompute_connector(node);
        self.dirty.mark(node);
    }

    /// Remove a node's visual subtree. Double deletes are safe no-ops;
    /// removing a container removes its descendants.
    pub fn delete_node(&mut self, node: K) {
        if !self.visuals.contains_key(&node) {
            return;
        }
        if let Some(parent) = self.visuals.get(&node).and_then(|v| v.parent)
            && let Some(pv) = self.visuals.get_mut(&parent)
        {
            pv.children.retain(|c| *c != node);
            self.dirty.mark(parent);
        }
        if self.root == Some(node) {
            self.root = None;
        }

        let mut stack = alloc::vec![node];
        while let Some(key) = stack.pop() {
            let Some(v) = self.visuals.remove(&key) else {
                continue;
            };
            stack.extend(v.children.iter().copied());

            // Gestures must not keep references into the removed subtree.
            if self.creation.attached_node() == Some(key) {
                self.creation.detach();
                self.creation_preview = None;
            }
            if self.node_drag.node() == Some(key) {
                self.node_drag.cancel();
            }
            if self.caption_edit.node() == Some(key) {
                self.caption_edit.cancel();
            }
        }
    }

    // --- fold ---

    /// Show a node's direct children. Idempotent.
    pub fn open_node(&mut self, node: K) {
        self.set_fold(node, FoldState::Open);
    }

    /// Hide a node's direct children. Idempotent.
    pub fn close_node(&mut self, node: K) {
        self.set_fold(node, FoldState::Closed);
    }

    fn set_fold(&mut self, node: K, state: FoldState) {
        let Some(v) = self.visuals.get_mut(&node) else {
            return;
        };
        if let Some(button) = v.fold_button.as_mut() {
            button.state = state;
        }
        let children: SmallVec<[K; 4]> = v.children.clone();
        for child in children {
            if let Some(cv) = self.visuals.get_mut(&child) {
                match state {
                    FoldState::Open => cv.flags.insert(VisualFlags::SHOWN),
                    FoldState::Closed => cv.flags.remove(VisualFlags::SHOWN),
                }
                self.dirty.mark(child);
            }
        }
        self.dirty.mark(node);
    }

    /// Drop a node's fold control so a later child render may recreate it.
    pub fn remove_fold_button(&mut self, node: K) {
        if let Some(v) = self.visuals.get_mut(&node)
            && v.fold_button.take().is_some()
        {
            self.dirty.mark(node);
        }
    }

    // --- selection ---

    /// Highlight a node as selected. Safe no-op without a visual.
    pub fn highlight_node(&mut self, node: K) {
        if let Some(v) = self.visuals.get_mut(&node) {
            v.flags.insert(VisualFlags::SELECTED);
            self.dirty.mark(node);
        }
    }

    /// Clear a node's selection highlight. Safe no-op without a visual.
    pub fn unhighlight_node(&mut self, node: K) {
        if let Some(v) = self.visuals.get_mut(&node) {
            v.flags.remove(VisualFlags::SELECTED);
            self.dirty.mark(node);
        }
    }

    // --- zoom rescale ---

    /// Re-scale every node for the current zoom factor: device positions,
    /// border thickness, caption metrics, and connectors.
    ///
    /// The one operation that may touch the whole tree — zoom is a global
    /// change.
    pub fn scale_map<M: MapModel<Key = K>>(&mut self, model: &M) {
        let Some(root) = self.root else {
            return;
        };
        let zoom = self.view.zoom.factor();

        // The root keeps its caption centered on the box.
        if self.visuals.contains_key(&root) {
            let border_width = branch_line_width(zoom, 0);
            let font = model.font(root);
            let last = self.visuals[&root].caption_size;
            let caption_size = self.measure_caption(&font, &model.caption(root), true, Some(last));
            let device_pos = self.view.zoom.point_to_device(model.offset(root));
            if let Some(v) = self.visuals.get_mut(&root) {
                v.border_width = border_width;
                v.font = font;
                v.font_scale = zoom;
                v.caption_size = caption_size;
                v.node_box =
                    NodeBox::from_caption(caption_size.width, caption_size.height, border_width);
                v.device_pos = device_pos;
                v.caption_offset_x = -zoom * ROOT_CAPTION_MIN_WIDTH / 2.0;
            }
            self.dirty.mark(root);
        }

        // Pre-order walk so a child's connector meets its parent's
        // already-rescaled box.
        let mut stack: Vec<K> = self
            .visuals
            .get(&root)
            .map(|v| v.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(node) = stack.pop() {
            let Some(v) = self.visuals.get(&node) else {
                continue;
            };
            let depth = v.depth;
            let last = v.caption_size;
            for &child in v.children.iter().rev() {
                stack.push(child);
            }

            let border_width = branch_line_width(zoom, depth);
            let font = model.font(node);
            let caption_size = self.measure_caption(&font, &model.caption(node), false, Some(last));
            let device_pos = self.view.zoom.point_to_device(model.offset(node));
            if let Some(v) = self.visuals.get_mut(&node) {
                v.border_width = border_width;
                v.font = font;
                v.font_scale = zoom;
                v.caption_size = caption_size;
                v.node_box =
                    NodeBox::from_caption(caption_size.width, caption_size.height, border_width);
                v.device_pos = device_pos;
            }
            self.recompute_connector(node);
            self.dirty.mark(node);
        }
    }

    // --- input dispatch ---

    /// The single entry point for hit-resolved pointer input.
    ///
    /// Updates canvas-side state (drag handlers install on a node's first
    /// hover) and forwards to the matching [`CanvasHooks`] method. Fold
    /// buttons fire on pointer-up.
    pub fn dispatch<H: CanvasHooks<K>>(&mut self, input: CanvasInput<K>, hooks: &mut H) {
        match input {
            CanvasInput::PointerOver {
                target: PointerTarget::Node(node),
            } => {
                self.install_handlers(node);
                hooks.node_hovered(node);
            }
            CanvasInput::PointerOver {
                target: PointerTarget::Caption(node),
            } => {
                self.install_handlers(node);
                hooks.caption_hovered(node);
            }
            CanvasInput::PointerDown {
                target: PointerTarget::Caption(node),
            } => hooks.node_pointer_down(node),
            CanvasInput::PointerUp {
                target: PointerTarget::Caption(node),
            } => hooks.node_pointer_up(node),
            CanvasInput::PointerUp {
                target: PointerTarget::FoldButton(node),
            } => hooks.fold_button_clicked(node),
            CanvasInput::DoubleClick {
                target: PointerTarget::Caption(node),
            } => hooks.node_double_clicked(node),
            CanvasInput::Wheel { delta } => hooks.wheel_scrolled(delta),
            _ => {}
        }
    }

    /// Lazily install a node's drag handlers; cheap for large trees since
    /// it happens on first hover rather than at draw time.
    fn install_handlers(&mut self, node: K) {
        if let Some(v) = self.visuals.get_mut(&node)
            && v.parent.is_some()
        {
            v.flags.insert(VisualFlags::HANDLERS);
        }
    }

    /// Whether a node's drag handlers have been installed.
    pub fn handlers_installed(&self, node: K) -> bool {
        self.visuals
            .get(&node)
            .is_some_and(|v| v.flags.contains(VisualFlags::HANDLERS))
    }

    // --- node-move drag ---

    /// Start dragging an existing node.
    ///
    /// Refused for the root, for nodes without installed handlers (never
    /// hovered), for unknown nodes, and while another drag runs.
    pub fn begin_node_drag(&mut self, node: K) -> bool {
        let Some(v) = self.visuals.get(&node) else {
            return false;
        };
        if v.parent.is_none() || !v.flags.contains(VisualFlags::HANDLERS) {
            return false;
        }
        self.node_drag.start(node)
    }

    /// Reposition the dragged node at a provisional device offset,
    /// redrawing only its branch, and notify the host.
    pub fn drag_node_to<H: CanvasHooks<K>>(&mut self, device_pos: Point, hooks: &mut H) {
        let Some(node) = self.node_drag.node() else {
            return;
        };
        let Some(v) = self.visuals.get_mut(&node) else {
            // The node vanished mid-drag; end the session cleanly.
            self.node_drag.cancel();
            return;
        };
        v.device_pos = device_pos;
        self.recompute_connector(node);
        self.dirty.mark(node);
        hooks.node_dragging();
    }

    /// Finish the node drag, reporting the resulting logical offset.
    ///
    /// The model is not touched; the host commits via
    /// [`MapModel::set_offset`] and then calls [`Self::position_node`].
    pub fn finish_node_drag<H: CanvasHooks<K>>(
        &mut self,
        device_pos: Point,
        hooks: &mut H,
    ) -> Option<(K, Point)> {
        let zoom = self.view.zoom.factor();
        let (node, logical) = self.node_drag.finish(device_pos, zoom)?;
        hooks.node_dragged(node, logical);
        Some((node, logical))
    }

    /// Abandon a node drag without a report.
    pub fn cancel_node_drag(&mut self) {
        self.node_drag.cancel();
    }

    // --- creation gesture ---

    /// Bind the creation handle to a node (no-op when already bound to
    /// it). Refused for nodes without a visual.
    pub fn attach_creation_handle<M: MapModel<Key = K>>(&mut self, model: &M, node: K) -> bool {
        if !self.visuals.contains_key(&node) {
            return false;
        }
        self.creation
            .attach(node, model.depth(node), model.offset(node).x)
    }

    /// Unbind the creation handle.
    pub fn detach_creation_handle(&mut self) {
        self.creation.detach();
        self.creation_preview = None;
    }

    /// The creation tool, for host inspection (phase, side, depth).
    pub fn creation(&self) -> &CreationGesture<K> {
        &self.creation
    }

    /// Start pulling the handle out. Asks the host for a preview color,
    /// falling back to the attached node's branch color.
    pub fn begin_creation_drag<H: CanvasHooks<K>>(&mut self, hooks: &mut H) -> bool {
        let Some(node) = self.creation.attached_node() else {
            return false;
        };
        let color = hooks
            .creation_drag_started(node)
            .or_else(|| self.visuals.get(&node).map(|v| v.branch_color));
        self.creation.begin_drag(color)
    }

    /// Recompute the provisional branch for the handle's current device
    /// position (relative to the attached node's box).
    ///
    /// The preview is a connector at the attached node's depth plus one,
    /// against a zero-sized stand-in child carrying only the child-depth
    /// border. Ends the session cleanly if the attached node vanished.
    pub fn creation_drag_to(&mut self, handle_pos: Point) -> Option<&ConnectorShape> {
        if !self.creation.is_dragging() {
            return None;
        }
        let node = self.creation.attached_node()?;
        let Some(v) = self.visuals.get(&node) else {
            self.detach_creation_handle();
            return None;
        };

        let zoom = self.view.zoom.factor();
        let depth = self.creation.preview_depth();
        let stand_in = NodeBox::from_caption(0.0, 0.0, branch_line_width(zoom, depth));
        let shape = connector(depth, handle_pos.to_vec2(), v.node_box, stand_in, zoom);
        self.creation_preview = Some(shape);
        self.creation_preview.as_ref()
    }

    /// The provisional branch of the drag in progress.
    pub fn creation_preview(&self) -> Option<&ConnectorShape> {
        self.creation_preview.as_ref()
    }

    /// Preview line color for the drag in progress.
    pub fn creation_line_color(&self) -> Option<Color> {
        self.creation.line_color()
    }

    /// Finish the creation drag.
    ///
    /// `anchor` is the handle's rest position, `dragged` its final device
    /// position, both relative to the attached node. The proposal carries
    /// logical values; whether a child materializes (for example, whether
    /// the distance was worth it) is the model's policy.
    pub fn finish_creation_drag(
        &mut self,
        anchor: Point,
        dragged: Point,
    ) -> Option<CreationProposal<K>> {
        self.creation_preview = None;
        let zoom = self.view.zoom.factor();
        self.creation.finish_drag(anchor, dragged, zoom)
    }

    /// Whether any drag — node move or creation — is in progress.
    pub fn is_dragging(&self) -> bool {
        self.node_drag.is_dragging() || self.creation.is_dragging()
    }

    // --- caption editing ---

    /// Enter caption edit mode on a node, returning the size the editing
    /// surface should take. No-op (returning `None`) while any edit is
    /// active or when the node has no visual.
    pub fn edit_caption<M: MapModel<Key = K>>(&mut self, model: &M, node: K) -> Option<Size> {
        let v = self.visuals.get(&node)?;
        let is_root = v.parent.is_none();
        let last = v.caption_size;

        let caption = model.caption(node);
        if !self.caption_edit.edit(node, &caption) {
            return None;
        }
        Some(self.measure_caption(&model.font(node), &caption, is_root, Some(last)))
    }

    /// Record a keystroke: stores the live text, resizes the node's box to
    /// fit it, and arms the debounced connector redraw. Returns the new
    /// editing-surface size.
    pub fn caption_edit_input<M: MapModel<Key = K>>(
        &mut self,
        model: &M,
        text: &str,
    ) -> Option<Size> {
        let node = self.caption_edit.node()?;
        self.caption_edit.input(text);
        self.set_node_text(model, node, text);
        self.visuals.get(&node).map(|v| v.caption_size)
    }

    /// Run the debounced connector redraw if one is due. The host calls
    /// this a short delay after each [`Self::caption_edit_input`] burst.
    pub fn flush_caption_edit_redraw(&mut self) {
        if let Some(node) = self.caption_edit.take_pending_redraw() {
            self.redraw_connectors(node);
        }
    }

    /// Commit the edit: hands the live text to the model, resizes to the
    /// committed caption, and exits to view mode.
    pub fn commit_caption_edit<M: MapModel<Key = K>>(
        &mut self,
        model: &mut M,
    ) -> Option<(K, String)> {
        let (node, text) = self.caption_edit.commit()?;
        model.set_caption(node, &text);
        self.update_node(model, node);
        Some((node, text))
    }

    /// Cancel the edit (or handle focus loss): restores the snapshot
    /// caption via [`Self::update_node`] without committing anything.
    pub fn stop_edit_caption<M: MapModel<Key = K>>(&mut self, model: &M) {
        if let Some((node, _original)) = self.caption_edit.cancel() {
            self.update_node(model, node);
        }
    }

    /// Whether a caption edit session is active.
    pub fn is_editing_caption(&self) -> bool {
        self.caption_edit.is_editing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::string::ToString;
    use alloc::vec;
    use bramble_metrics::MeasurementUnavailable;

    struct Entry {
        parent: Option<u32>,
        children: Vec<u32>,
        offset: Point,
        caption: String,
        font: Font,
        color: Color,
        fold: bool,
    }

    struct TestMap {
        nodes: BTreeMap<u32, Entry>,
        next: u32,
    }

    impl TestMap {
        fn new() -> Self {
            let mut nodes = BTreeMap::new();
            nodes.insert(
                0,
                Entry {
                    parent: None,
                    children: Vec::new(),
                    offset: Point::new(400.0, 300.0),
                    caption: "root".to_string(),
                    font: Font::default(),
                    color: Color::rgb(40, 90, 160),
                    fold: false,
                },
            );
            Self { nodes, next: 1 }
        }

        fn add(&mut self, parent: u32, offset: Point, caption: &str) -> u32 {
            let key = self.next;
            self.next += 1;
            self.nodes.insert(
                key,
                Entry {
                    parent: Some(parent),
                    children: Vec::new(),
                    offset,
                    caption: caption.to_string(),
                    font: Font::default(),
                    color: Color::rgb(40, 90, 160),
                    fold: false,
                },
            );
            self.nodes.get_mut(&parent).unwrap().children.push(key);
            key
        }

        fn set_fold(&mut self, node: u32, fold: bool) {
            self.nodes.get_mut(&node).unwrap().fold = fold;
        }
    }

    impl MapModel for TestMap {
        type Key = u32;

        fn root(&self) -> u32 {
            0
        }

        fn parent(&self, node: u32) -> Option<u32> {
            self.nodes.get(&node).and_then(|e| e.parent)
        }

        fn children(&self, node: u32) -> Vec<u32> {
            self.nodes.get(&node).map(|e| e.children.clone()).unwrap_or_default()
        }

        fn depth(&self, node: u32) -> u32 {
            let mut depth = 0;
            let mut cur = node;
            while let Some(p) = self.parent(cur) {
                depth += 1;
                cur = p;
            }
            depth
        }

        fn offset(&self, node: u32) -> Point {
            self.nodes[&node].offset
        }

        fn caption(&self, node: u32) -> String {
            self.nodes[&node].caption.clone()
        }

        fn font(&self, node: u32) -> Font {
            self.nodes[&node].font
        }

        fn branch_color(&self, node: u32) -> Color {
            self.nodes[&node].color
        }

        fn fold_children(&self, node: u32) -> bool {
            self.nodes[&node].fold
        }

        fn set_caption(&mut self, node: u32, caption: &str) {
            self.nodes.get_mut(&node).unwrap().caption = caption.to_string();
        }

        fn set_offset(&mut self, node: u32, offset: Point) {
            self.nodes.get_mut(&node).unwrap().offset = offset;
        }

        fn create_child(&mut self, parent: u32, offset: Point) -> Option<u32> {
            Some(self.add(parent, offset, "idea"))
        }
    }

    /// Records every hook call for assertions.
    #[derive(Default)]
    struct Recorder {
        downs: Vec<u32>,
        ups: Vec<u32>,
        doubles: Vec<u32>,
        hovers: Vec<u32>,
        caption_hovers: Vec<u32>,
        wheels: Vec<f64>,
        dragging: usize,
        dragged: Vec<(u32, Point)>,
        folds: Vec<u32>,
        creation_color: Option<Color>,
    }

    impl CanvasHooks<u32> for Recorder {
        fn node_pointer_down(&mut self, node: u32) {
            self.downs.push(node);
        }
        fn node_pointer_up(&mut self, node: u32) {
            self.ups.push(node);
        }
        fn node_double_clicked(&mut self, node: u32) {
            self.doubles.push(node);
        }
        fn node_hovered(&mut self, node: u32) {
            self.hovers.push(node);
        }
        fn caption_hovered(&mut self, node: u32) {
            self.caption_hovers.push(node);
        }
        fn wheel_scrolled(&mut self, delta: f64) {
            self.wheels.push(delta);
        }
        fn node_dragging(&mut self) {
            self.dragging += 1;
        }
        fn node_dragged(&mut self, node: u32, offset: Point) {
            self.dragged.push((node, offset));
        }
        fn fold_button_clicked(&mut self, node: u32) {
            self.folds.push(node);
        }
        fn creation_drag_started(&mut self, _node: u32) -> Option<Color> {
            self.creation_color
        }
    }

    fn three_levels() -> (TestMap, u32, u32, u32) {
        let mut map = TestMap::new();
        let child = map.add(0, Point::new(150.0, 40.0), "first");
        let sibling = map.add(0, Point::new(-150.0, -30.0), "second");
        let grandchild = map.add(child, Point::new(120.0, 20.0), "deeper");
        (map, child, sibling, grandchild)
    }

    #[test]
    fn draw_tree_builds_every_visual() {
        let (map, child, sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        assert_eq!(canvas.root(), Some(0));
        for key in [0, child, sibling, grandchild] {
            assert!(canvas.has_visual(key), "visual missing for {key}");
        }
        assert!(canvas.visual(0).unwrap().connector.is_none(), "root has no branch");
        assert!(canvas.visual(child).unwrap().connector.is_some());
        assert!(canvas.visual(grandchild).unwrap().connector.is_some());
        assert_eq!(canvas.visual(grandchild).unwrap().depth, 2);
    }

    #[test]
    fn paint_order_is_parents_first() {
        let (map, child, _sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        let order = canvas.paint_order();
        let pos = |k: u32| order.iter().position(|&o| o == k).unwrap();
        assert_eq!(pos(0), 0, "root paints first");
        assert!(pos(child) < pos(grandchild));
    }

    #[test]
    fn connector_matches_parent_box_from_same_pass() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        let parent_box = canvas.visual(0).unwrap().node_box;
        let v = canvas.visual(child).unwrap();
        let expected = connector(1, v.device_pos.to_vec2(), parent_box, v.node_box, 1.0);
        assert_eq!(v.connector, Some(expected));
    }

    #[test]
    fn border_width_tapers_with_depth() {
        let (map, child, _sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        assert_eq!(canvas.visual(0).unwrap().border_width, 12.0);
        assert_eq!(canvas.visual(child).unwrap().border_width, 10.0);
        assert_eq!(canvas.visual(grandchild).unwrap().border_width, 8.0);
    }

    #[test]
    fn fold_button_only_below_the_root_family() {
        let (map, child, sibling, _grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        // Root and its direct children never get a button from their own
        // children's render...
        assert!(canvas.visual(0).unwrap().fold_button.is_none());
        // ...but `child` has a non-root child, so it gets one.
        let button = canvas.visual(child).unwrap().fold_button.unwrap();
        assert_eq!(button.side, FoldSide::Right, "child grows rightward");
        assert_eq!(button.state, FoldState::Open);
        // `sibling` is a leaf; nothing created one for it.
        assert!(canvas.visual(sibling).unwrap().fold_button.is_none());
    }

    #[test]
    fn folded_parent_hides_children_at_draw() {
        let (mut map, child, _sibling, grandchild) = three_levels();
        map.set_fold(child, true);
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        assert!(!canvas.visual(grandchild).unwrap().is_shown());
        assert!(!canvas.is_visible(grandchild));
        assert!(canvas.is_visible(child));
        let button = canvas.visual(child).unwrap().fold_button.unwrap();
        assert_eq!(button.state, FoldState::Closed);
    }

    #[test]
    fn open_close_are_idempotent_and_reversible() {
        let (map, child, _sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.close_node(child);
        assert!(!canvas.is_visible(grandchild));
        canvas.close_node(child);
        assert!(!canvas.is_visible(grandchild), "second close is a no-op");

        canvas.open_node(child);
        assert!(canvas.is_visible(grandchild));
        canvas.open_node(child);
        assert!(canvas.is_visible(grandchild), "second open is a no-op");

        let button = canvas.visual(child).unwrap().fold_button.unwrap();
        assert_eq!(button.state, FoldState::Open);
    }

    #[test]
    fn fold_hides_whole_subtree_through_ancestors() {
        let (map, child, _sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        // Folding the root's child hides the grandchild even though the
        // grandchild's own flag stays shown.
        canvas.close_node(0);
        assert!(canvas.visual(grandchild).unwrap().is_shown());
        assert!(!canvas.is_visible(grandchild));
        assert!(!canvas.is_visible(child));
    }

    #[test]
    fn delete_removes_subtree_and_is_safe_twice() {
        let (map, child, sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.delete_node(child);
        assert!(!canvas.has_visual(child));
        assert!(!canvas.has_visual(grandchild), "descendants go with the container");
        assert!(canvas.has_visual(sibling));
        assert!(
            !canvas.visual(0).unwrap().children.contains(&child),
            "parent must unlink the removed child"
        );

        // Double delete is a safe no-op.
        canvas.delete_node(child);
        assert!(canvas.has_visual(0));
    }

    #[test]
    fn updates_on_missing_visuals_are_noops() {
        let (map, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.update_node(&map, 999);
        canvas.position_node(&map, 999);
        canvas.redraw_connectors(999);
        canvas.highlight_node(999);
        canvas.open_node(999);
        assert!(!canvas.has_visual(999));
    }

    #[test]
    fn redraw_connectors_is_idempotent() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.redraw_connectors(child);
        let first = canvas.visual(child).unwrap().connector;
        canvas.redraw_connectors(child);
        let second = canvas.visual(child).unwrap().connector;
        assert_eq!(first, second);
    }

    #[test]
    fn scale_map_rescales_positions_borders_and_fonts() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.set_zoom_factor(2.0).unwrap();
        canvas.scale_map(&map);

        let v = canvas.visual(child).unwrap();
        assert_eq!(v.device_pos, Point::new(300.0, 80.0));
        assert_eq!(v.border_width, 20.0);
        assert_eq!(v.font_scale, 2.0);

        let root = canvas.visual(0).unwrap();
        assert_eq!(root.border_width, 24.0);
        assert_eq!(root.caption_offset_x, -ROOT_CAPTION_MIN_WIDTH);
    }

    #[test]
    fn zoom_round_trip_restores_device_state() {
        let (map, child, sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        let before: Vec<_> = [0, child, sibling, grandchild]
            .into_iter()
            .map(|k| {
                let v = canvas.visual(k).unwrap();
                (v.device_pos, v.node_box, v.border_width, v.connector)
            })
            .collect();

        canvas.set_zoom_factor(2.0).unwrap();
        canvas.scale_map(&map);
        canvas.set_zoom_factor(1.0).unwrap();
        canvas.scale_map(&map);

        let after: Vec<_> = [0, child, sibling, grandchild]
            .into_iter()
            .map(|k| {
                let v = canvas.visual(k).unwrap();
                (v.device_pos, v.node_box, v.border_width, v.connector)
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn invalid_zoom_is_rejected_before_any_state_change() {
        let (map, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        assert!(canvas.set_zoom_factor(0.0).is_err());
        assert!(canvas.set_zoom_factor(f64::NAN).is_err());
        assert_eq!(canvas.zoom_factor(), 1.0);
    }

    #[test]
    fn hover_installs_handlers_once_then_drag_works() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let mut hooks = Recorder::default();

        // Before any hover the drag handlers are not installed.
        assert!(!canvas.handlers_installed(child));
        assert!(!canvas.begin_node_drag(child));

        canvas.dispatch(
            CanvasInput::PointerOver {
                target: PointerTarget::Node(child),
            },
            &mut hooks,
        );
        assert!(canvas.handlers_installed(child));
        assert_eq!(hooks.hovers, vec![child]);

        assert!(canvas.begin_node_drag(child));
        assert!(canvas.is_dragging());
    }

    #[test]
    fn root_is_never_draggable() {
        let (map, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let mut hooks = Recorder::default();

        canvas.dispatch(
            CanvasInput::PointerOver {
                target: PointerTarget::Node(0),
            },
            &mut hooks,
        );
        assert!(!canvas.handlers_installed(0));
        assert!(!canvas.begin_node_drag(0));
    }

    #[test]
    fn node_drag_repositions_and_reports_logical_offset() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        canvas.set_zoom_factor(2.0).unwrap();
        canvas.scale_map(&map);
        let mut hooks = Recorder::default();

        canvas.dispatch(
            CanvasInput::PointerOver {
                target: PointerTarget::Node(child),
            },
            &mut hooks,
        );
        assert!(canvas.begin_node_drag(child));

        canvas.drag_node_to(Point::new(360.0, 90.0), &mut hooks);
        assert_eq!(hooks.dragging, 1);
        let v = canvas.visual(child).unwrap();
        assert_eq!(v.device_pos, Point::new(360.0, 90.0));
        let parent_box = canvas.visual(0).unwrap().node_box;
        let v = canvas.visual(child).unwrap();
        let expected = connector(1, Vec2::new(360.0, 90.0), parent_box, v.node_box, 2.0);
        assert_eq!(v.connector, Some(expected));

        let (node, logical) = canvas.finish_node_drag(Point::new(360.0, 90.0), &mut hooks).unwrap();
        assert_eq!(node, child);
        assert_eq!(logical, Point::new(180.0, 45.0));
        assert_eq!(hooks.dragged, vec![(child, Point::new(180.0, 45.0))]);
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn creation_flow_attach_preview_commit() {
        let (mut map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        canvas.set_zoom_factor(2.0).unwrap();
        canvas.scale_map(&map);
        let mut hooks = Recorder::default();

        assert!(canvas.attach_creation_handle(&map, child));
        // Re-attaching to the same node is a no-op.
        assert!(!canvas.attach_creation_handle(&map, child));

        assert!(canvas.begin_creation_drag(&mut hooks));
        // No color from the host: preview falls back to the branch color.
        assert_eq!(canvas.creation_line_color(), Some(Color::rgb(40, 90, 160)));

        let preview = canvas.creation_drag_to(Point::new(90.0, 30.0)).copied().unwrap();
        assert_eq!(preview.line_width, branch_line_width(2.0, 2), "preview draws at depth + 1");
        assert_eq!(canvas.creation_preview(), Some(&preview));

        // 5 device pixels of travel at zoom 2 reports 2.5 logical.
        let proposal = canvas
            .finish_creation_drag(Point::new(0.0, 0.0), Point::new(3.0, 4.0))
            .unwrap();
        assert_eq!(proposal.parent, child);
        assert_eq!(proposal.distance, 2.5);
        assert_eq!(proposal.offset, Point::new(1.5, 2.0));
        assert!(canvas.creation_preview().is_none());

        // The model accepts; the new node is drawn incrementally.
        let new = map.create_child(proposal.parent, proposal.offset).unwrap();
        canvas.create_node_visual(&map, new);
        let v = canvas.visual(new).unwrap();
        assert_eq!(v.depth, 2);
        assert!(v.connector.is_some());
        assert!(canvas.visual(child).unwrap().children.contains(&new));
    }

    #[test]
    fn creation_drag_survives_node_deletion() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let mut hooks = Recorder::default();

        canvas.attach_creation_handle(&map, child);
        canvas.begin_creation_drag(&mut hooks);
        canvas.delete_node(child);

        // The tool detached itself; further drag events resolve to nothing.
        assert!(canvas.creation_drag_to(Point::new(10.0, 10.0)).is_none());
        assert!(
            canvas
                .finish_creation_drag(Point::ZERO, Point::new(9.0, 9.0))
                .is_none()
        );
        assert!(!canvas.is_dragging());
    }

    #[test]
    fn caption_edit_resizes_live_and_commits_to_model() {
        let (mut map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        let initial = canvas.edit_caption(&map, child).unwrap();
        assert!(canvas.is_editing_caption());
        // A second edit anywhere is refused while this one runs.
        assert!(canvas.edit_caption(&map, 0).is_none());

        let grown = canvas
            .caption_edit_input(&map, "a much longer caption that needs wrapping room")
            .unwrap();
        assert!(grown.height >= initial.height);
        assert_eq!(canvas.visual(child).unwrap().caption_size, grown);

        // The debounced connector redraw runs when the host flushes.
        canvas.flush_caption_edit_redraw();
        let parent_box = canvas.visual(0).unwrap().node_box;
        let v = canvas.visual(child).unwrap();
        let tracked = connector(1, v.device_pos.to_vec2(), parent_box, v.node_box, 1.0);
        assert_eq!(v.connector, Some(tracked), "connector tracked the resized box");

        let (node, text) = canvas.commit_caption_edit(&mut map).unwrap();
        assert_eq!(node, child);
        assert_eq!(map.caption(child), text);
        assert!(!canvas.is_editing_caption());
    }

    #[test]
    fn caption_edit_cancel_restores_view_state() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let before = canvas.visual(child).unwrap().caption_size;

        canvas.edit_caption(&map, child).unwrap();
        canvas.caption_edit_input(&map, "something entirely different and much longer");
        canvas.stop_edit_caption(&map);

        assert!(!canvas.is_editing_caption());
        assert_eq!(canvas.visual(child).unwrap().caption_size, before);
        assert_eq!(map.caption(child), "first", "cancel never touches the model");
    }

    #[test]
    fn highlight_is_a_flag_on_the_visual() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        canvas.highlight_node(child);
        assert!(canvas.visual(child).unwrap().is_selected());
        canvas.unhighlight_node(child);
        assert!(!canvas.visual(child).unwrap().is_selected());
    }

    #[test]
    fn remove_fold_button_allows_recreation() {
        let (map, child, _sibling, grandchild) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);

        assert!(canvas.visual(child).unwrap().fold_button.is_some());
        canvas.remove_fold_button(child);
        assert!(canvas.visual(child).unwrap().fold_button.is_none());

        // Re-rendering the grandchild recreates the control.
        canvas.create_node_visual(&map, grandchild);
        assert!(canvas.visual(child).unwrap().fold_button.is_some());
    }

    #[test]
    fn dirty_keys_are_batched_and_drained() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        canvas.take_dirty();

        canvas.position_node(&map, child);
        canvas.highlight_node(child);
        let dirty = canvas.take_dirty();
        assert_eq!(dirty, vec![child], "duplicates collapse");
        assert!(canvas.take_dirty().is_empty());
    }

    #[test]
    fn dispatch_routes_to_hooks() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let mut hooks = Recorder::default();

        canvas.dispatch(
            CanvasInput::PointerDown {
                target: PointerTarget::Caption(child),
            },
            &mut hooks,
        );
        canvas.dispatch(
            CanvasInput::PointerUp {
                target: PointerTarget::Caption(child),
            },
            &mut hooks,
        );
        canvas.dispatch(
            CanvasInput::DoubleClick {
                target: PointerTarget::Caption(child),
            },
            &mut hooks,
        );
        canvas.dispatch(
            CanvasInput::PointerOver {
                target: PointerTarget::Caption(child),
            },
            &mut hooks,
        );
        canvas.dispatch(
            CanvasInput::PointerUp {
                target: PointerTarget::FoldButton(child),
            },
            &mut hooks,
        );
        canvas.dispatch(CanvasInput::Wheel { delta: -3.0 }, &mut hooks);

        assert_eq!(hooks.downs, vec![child]);
        assert_eq!(hooks.ups, vec![child]);
        assert_eq!(hooks.doubles, vec![child]);
        assert_eq!(hooks.caption_hovers, vec![child]);
        assert_eq!(hooks.folds, vec![child]);
        assert_eq!(hooks.wheels, vec![-3.0]);
    }

    #[test]
    fn host_color_wins_over_branch_fallback() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        let mut hooks = Recorder {
            creation_color: Some(Color::rgb(200, 30, 30)),
            ..Recorder::default()
        };

        canvas.attach_creation_handle(&map, child);
        canvas.begin_creation_drag(&mut hooks);
        assert_eq!(canvas.creation_line_color(), Some(Color::rgb(200, 30, 30)));
    }

    /// A measurer that can be switched off to exercise the fallback path.
    struct Flaky(core::cell::Cell<bool>);

    impl TextMeasurer for Flaky {
        fn measure(
            &self,
            font: &Font,
            text: &str,
            max_width: f64,
        ) -> Result<Size, MeasurementUnavailable> {
            if self.0.get() {
                HeuristicMeasurer::default().measure(font, text, max_width)
            } else {
                Err(MeasurementUnavailable)
            }
        }
    }

    #[test]
    fn measurement_failure_keeps_last_known_size() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32, Flaky> =
            MapCanvas::with_measurer(Flaky(core::cell::Cell::new(true)));
        canvas.draw_tree(&map);
        let before = canvas.visual(child).unwrap().caption_size;

        // The environment stops answering; updates degrade, never fail.
        if let Some(v) = canvas.visual(child) {
            assert!(v.caption_size.width > 0.0);
        }
        canvas_measurer_off(&mut canvas);
        canvas.update_node(&map, child);
        assert_eq!(canvas.visual(child).unwrap().caption_size, before);
    }

    fn canvas_measurer_off(canvas: &mut MapCanvas<u32, Flaky>) {
        canvas.measurer.0.set(false);
    }

    #[test]
    fn measurement_failure_on_fresh_draw_uses_minimal_box() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32, Flaky> =
            MapCanvas::with_measurer(Flaky(core::cell::Cell::new(false)));
        canvas.draw_tree(&map);

        let v = canvas.visual(child).unwrap();
        assert_eq!(v.caption_size.width, NODE_CAPTION_MIN_WIDTH + 2.0);
        assert!(v.caption_size.height > 0.0);
    }

    #[test]
    fn clear_drops_everything_but_zoom() {
        let (map, child, ..) = three_levels();
        let mut canvas: MapCanvas<u32> = MapCanvas::new();
        canvas.draw_tree(&map);
        canvas.set_zoom_factor(2.0).unwrap();
        canvas.attach_creation_handle(&map, child);

        canvas.clear();
        assert!(canvas.root().is_none());
        assert!(!canvas.has_visual(0));
        assert!(canvas.creation().attached_node().is_none());
        assert_eq!(canvas.zoom_factor(), 2.0, "zoom survives a clear");

        // An idempotent redraw rebuilds the same records from the model.
        canvas.set_zoom_factor(1.0).unwrap();
        canvas.draw_tree(&map);
        assert!(canvas.has_visual(child));
    }
}
