// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end run of the Bramble pipeline against an in-memory mind map:
//! draw, zoom, drag a new branch out of a node, and edit a caption —
//! printing the visual records a paint layer would consume.

use std::collections::BTreeMap;

use kurbo::{Point, Size};

use bramble_canvas::{CanvasHooks, CanvasInput, MapCanvas, MapModel, PointerTarget};
use bramble_metrics::{Color, Font};

#[derive(Debug)]
struct Node {
    parent: Option<u32>,
    children: Vec<u32>,
    offset: Point,
    caption: String,
    font: Font,
    branch_color: Color,
    fold_children: bool,
}

/// A minimal owned mind map implementing the model contract.
#[derive(Debug, Default)]
struct MindMap {
    nodes: BTreeMap<u32, Node>,
    next_key: u32,
}

impl MindMap {
    fn with_root(caption: &str, offset: Point) -> Self {
        let mut map = Self::default();
        map.nodes.insert(
            0,
            Node {
                parent: None,
                children: Vec::new(),
                offset,
                caption: caption.to_string(),
                font: Font::new(17.0),
                branch_color: Color::rgb(36, 89, 164),
                fold_children: false,
            },
        );
        map.next_key = 1;
        map
    }

    fn add(&mut self, parent: u32, offset: Point, caption: &str, color: Color) -> u32 {
        let key = self.next_key;
        self.next_key += 1;
        self.nodes.insert(
            key,
            Node {
                parent: Some(parent),
                children: Vec::new(),
                offset,
                caption: caption.to_string(),
                font: Font::default(),
                branch_color: color,
                fold_children: false,
            },
        );
        self.nodes.get_mut(&parent).expect("parent exists").children.push(key);
        key
    }
}

impl MapModel for MindMap {
    type Key = u32;

    fn root(&self) -> u32 {
        0
    }

    fn parent(&self, node: u32) -> Option<u32> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn children(&self, node: u32) -> Vec<u32> {
        self.nodes.get(&node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn depth(&self, node: u32) -> u32 {
        let mut depth = 0;
        let mut current = node;
        while let Some(p) = self.parent(current) {
            depth += 1;
            current = p;
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
        self.nodes[&node].branch_color
    }

    fn fold_children(&self, node: u32) -> bool {
        self.nodes[&node].fold_children
    }

    fn set_caption(&mut self, node: u32, caption: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            caption.clone_into(&mut n.caption);
        }
    }

    fn set_offset(&mut self, node: u32, offset: Point) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.offset = offset;
        }
    }

    fn create_child(&mut self, parent: u32, offset: Point) -> Option<u32> {
        Some(self.add(parent, offset, "new idea", Color::rgb(190, 80, 40)))
    }
}

/// Prints interaction reports as they arrive.
#[derive(Default)]
struct Logger;

impl CanvasHooks<u32> for Logger {
    fn node_dragged(&mut self, node: u32, offset: Point) {
        println!("  hook: node {node} dragged to logical {offset:?}");
    }

    fn fold_button_clicked(&mut self, node: u32) {
        println!("  hook: fold button clicked on node {node}");
    }
}

fn dump(canvas: &MapCanvas<u32>, label: &str) {
    println!("{label}:");
    for key in canvas.paint_order() {
        let v = canvas.visual(key).expect("painted key has a visual");
        let world = canvas.world_position(key).expect("world position");
        print!(
            "  node {key}: depth {} at ({:.1}, {:.1}) box {:.1}x{:.1} border {:.1}",
            v.depth, world.x, world.y, v.node_box.width, v.node_box.outer_height, v.border_width,
        );
        match v.connector {
            Some(c) => println!(
                " branch {:.1}x{:.1} ({})",
                c.width,
                c.height,
                if c.overlaps { "overlap" } else { "clear" }
            ),
            None => println!(" (root)"),
        }
    }
}

fn main() {
    let mut map = MindMap::with_root("weekend plans", Point::new(400.0, 300.0));
    let hike = map.add(0, Point::new(210.0, -60.0), "hike", Color::rgb(30, 120, 60));
    let food = map.add(0, Point::new(-230.0, 40.0), "food", Color::rgb(160, 60, 30));
    map.add(hike, Point::new(150.0, 30.0), "pack water", Color::rgb(30, 120, 60));
    map.add(food, Point::new(-140.0, 50.0), "groceries", Color::rgb(160, 60, 30));

    let mut canvas: MapCanvas<u32> = MapCanvas::new();
    let mut hooks = Logger::default();

    canvas.set_viewport_size(Size::new(800.0, 600.0));
    canvas.set_dimensions(Size::new(1600.0, 1200.0));
    canvas.draw_tree(&map);
    canvas.center();
    dump(&canvas, "initial tree");

    // Zoom in; the surface rescales around the viewport center and every
    // node is rescaled in one walk.
    canvas.set_zoom_factor(1.5).expect("valid zoom");
    canvas.apply_view_zoom();
    canvas.scale_map(&map);
    dump(&canvas, "after zoom 1.5x");

    // Drag a new branch out of "hike".
    canvas.dispatch(
        CanvasInput::PointerOver {
            target: PointerTarget::Node(hike),
        },
        &mut hooks,
    );
    canvas.attach_creation_handle(&map, hike);
    canvas.begin_creation_drag(&mut hooks);
    canvas.creation_drag_to(Point::new(180.0, 75.0));
    let proposal = canvas
        .finish_creation_drag(Point::new(0.0, 0.0), Point::new(180.0, 75.0))
        .expect("drag was in progress");
    println!(
        "creation drag on node {}: offset {:?}, distance {:.1}",
        proposal.parent, proposal.offset, proposal.distance
    );
    if let Some(new) = map.create_child(proposal.parent, proposal.offset) {
        canvas.create_node_visual(&map, new);
        println!("  model accepted: node {new}");
    }

    // Edit the root caption in place.
    canvas.edit_caption(&map, 0).expect("no other edit running");
    canvas.caption_edit_input(&map, "weekend plans (rainy variant)");
    canvas.flush_caption_edit_redraw();
    canvas.commit_caption_edit(&mut map);
    println!("root caption is now {:?}", map.caption(0));

    dump(&canvas, "final tree");
    println!("repaint queue: {:?}", canvas.take_dirty());
}
