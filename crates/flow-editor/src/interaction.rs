//! Pointer interaction state machine.
//!
//! Exactly one gesture is active at a time, owned by the pointer that
//! started it; events from any other pointer are ignored until it ends.
//! Every editing gesture opens a history transaction on press. On release
//! the `moved` flag decides between commit and rollback, so a click that
//! never crosses the movement threshold leaves no undo entry.
//!
//! Drag and resize positions are always recomputed from the press
//! position and the cumulative pointer delta; snapping rounds the result,
//! never an intermediate value.

use crate::editor::{Editor, QuickAdd};
use crate::hit::{EdgeEnd, Hit, ResizeHandle, marquee_hits};
use crate::input::{PointerButton, PointerEvent};
use flow_core::geometry::{snap, snap_point};
use flow_core::grouping::{GroupOrigin, toggle_collapse};
use flow_core::id::{EdgeId, NodeId};
use flow_core::model::{Anchor, Edge, Endpoint, Selection};
use flow_core::routing::{EdgeHandle, ResolvedEnd, RoutedEdge, resolve_endpoint, route_between};
use kurbo::{Point, Rect, Vec2};
use std::mem;

/// The active pointer gesture and its typed payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Moving the selected nodes.
    Drag {
        pointer: u32,
        start: Point,
        origins: Vec<(NodeId, Point)>,
        moved: bool,
    },
    Resize {
        pointer: u32,
        start: Point,
        node: NodeId,
        handle: ResizeHandle,
        initial: Rect,
        moved: bool,
    },
    /// Drawing a new connector out of an anchor marker.
    Connect {
        pointer: u32,
        from: (NodeId, Anchor),
        current: Point,
    },
    EdgeHandleDrag {
        pointer: u32,
        edge: EdgeId,
        handle: EdgeHandle,
        start: Point,
        moved: bool,
    },
    /// Dragging one end of an existing connector to rebind it.
    EdgeEndpointDrag {
        pointer: u32,
        edge: EdgeId,
        end: EdgeEnd,
        start: Point,
        current: Point,
    },
    EdgeLabelDrag {
        pointer: u32,
        edge: EdgeId,
        start: Point,
        origin: Vec2,
        moved: bool,
    },
    GroupDrag {
        pointer: u32,
        start: Point,
        origin: GroupOrigin,
        moved: bool,
    },
    Marquee {
        pointer: u32,
        start: Point,
        current: Point,
        additive: bool,
        moved: bool,
    },
    /// Panning the camera; positions are in screen space.
    Pan {
        pointer: u32,
        start_screen: Point,
        start_pan: Vec2,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn pointer(&self) -> Option<u32> {
        match *self {
            Gesture::Idle => None,
            Gesture::Drag { pointer, .. }
            | Gesture::Resize { pointer, .. }
            | Gesture::Connect { pointer, .. }
            | Gesture::EdgeHandleDrag { pointer, .. }
            | Gesture::EdgeEndpointDrag { pointer, .. }
            | Gesture::EdgeLabelDrag { pointer, .. }
            | Gesture::GroupDrag { pointer, .. }
            | Gesture::Marquee { pointer, .. }
            | Gesture::Pan { pointer, .. } => Some(pointer),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Drag { .. } => "drag",
            Gesture::Resize { .. } => "resize",
            Gesture::Connect { .. } => "connect",
            Gesture::EdgeHandleDrag { .. } => "edge-handle",
            Gesture::EdgeEndpointDrag { .. } => "edge-endpoint",
            Gesture::EdgeLabelDrag { .. } => "edge-label",
            Gesture::GroupDrag { .. } => "group-drag",
            Gesture::Marquee { .. } => "marquee",
            Gesture::Pan { .. } => "pan",
        }
    }

    /// The marquee rectangle in world space, while one is being drawn.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match *self {
            Gesture::Marquee { start, current, .. } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }
}

/// Whether a cumulative delta crosses the movement threshold on either axis.
fn exceeds(delta: Vec2, epsilon: f64) -> bool {
    delta.x.abs() > epsilon || delta.y.abs() > epsilon
}

impl Editor {
    fn world(&self, e: &PointerEvent) -> Point {
        self.camera.screen_to_world(e.position)
    }

    fn owns(&self, e: &PointerEvent) -> bool {
        self.gesture.pointer() == Some(e.pointer_id)
    }

    /// Abort the active gesture, restoring the document to its state at
    /// press time.
    pub fn cancel_gesture(&mut self) {
        if self.gesture.is_idle() {
            return;
        }
        log::debug!("gesture {} cancelled", self.gesture.name());
        self.gesture = Gesture::Idle;
        self.history.rollback(&mut self.doc);
        self.request_redraw();
    }

    // ─── Press ───────────────────────────────────────────────────────────

    pub fn pointer_down(&mut self, e: &PointerEvent) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        if e.button == PointerButton::Secondary {
            return false;
        }
        let world = self.world(e);
        let hit = self.hit_context().hit_test(world);
        let pointer = e.pointer_id;

        let pan = e.button == PointerButton::Middle
            || (self.space_held && e.button == PointerButton::Primary && hit.is_plain());
        if pan {
            self.gesture = Gesture::Pan {
                pointer,
                start_screen: e.position,
                start_pan: self.camera.pan,
            };
            log::debug!("gesture pan started");
            return true;
        }
        if e.button != PointerButton::Primary {
            return false;
        }
        if !matches!(hit, Hit::QuickAdd { .. }) {
            self.quick_add = None;
        }

        log::trace!("press at {world:?} hit {hit:?}");
        match hit {
            Hit::QuickAdd { node, anchor } => {
                self.quick_add = Some(QuickAdd { node, anchor });
            }
            Hit::Resize { node, handle } => {
                let Some(initial) = self.doc.node(node).map(|n| n.rect()) else {
                    return false;
                };
                self.history.begin(&self.doc, "Resize");
                self.gesture = Gesture::Resize {
                    pointer,
                    start: world,
                    node,
                    handle,
                    initial,
                    moved: false,
                };
            }
            Hit::Anchor { node, anchor } => {
                self.history.begin(&self.doc, "Connect");
                self.gesture = Gesture::Connect {
                    pointer,
                    from: (node, anchor),
                    current: world,
                };
            }
            Hit::EdgeHandle { edge, handle } => {
                self.history.begin(&self.doc, "Adjust route");
                self.gesture = Gesture::EdgeHandleDrag {
                    pointer,
                    edge,
                    handle,
                    start: world,
                    moved: false,
                };
            }
            Hit::EdgeEndpoint { edge, end } => {
                self.history.begin(&self.doc, "Reconnect");
                self.gesture = Gesture::EdgeEndpointDrag {
                    pointer,
                    edge,
                    end,
                    start: world,
                    current: world,
                };
            }
            Hit::EdgeLabel(edge) => {
                let Some(origin) = self.doc.edge(edge).map(|ed| ed.label.offset) else {
                    return false;
                };
                self.selection = Selection::Edge(edge);
                self.history.begin(&self.doc, "Move label");
                self.gesture = Gesture::EdgeLabelDrag {
                    pointer,
                    edge,
                    start: world,
                    origin,
                    moved: false,
                };
            }
            Hit::GroupToggle(group) => {
                self.history.begin(&self.doc, "Toggle group");
                toggle_collapse(&mut self.doc, group, &self.config, &mut self.selection);
                self.history.commit(&self.doc);
                self.selection = Selection::Group(group);
            }
            Hit::GroupBody(group) => {
                let Some(origin) = GroupOrigin::capture(&self.doc, group) else {
                    return false;
                };
                self.selection = Selection::Group(group);
                self.history.begin(&self.doc, "Move group");
                self.gesture = Gesture::GroupDrag {
                    pointer,
                    start: world,
                    origin,
                    moved: false,
                };
            }
            Hit::Node(id) if e.modifiers.shift => {
                self.selection.toggle_node(id);
            }
            Hit::Node(id) => {
                if !self.selection.contains_node(id) {
                    self.selection.set_nodes(vec![id]);
                }
                let origins = self
                    .doc
                    .nodes
                    .iter()
                    .filter(|n| self.selection.contains_node(n.id))
                    .map(|n| (n.id, Point::new(n.x, n.y)))
                    .collect();
                self.history.begin(&self.doc, "Move");
                self.gesture = Gesture::Drag {
                    pointer,
                    start: world,
                    origins,
                    moved: false,
                };
            }
            Hit::Edge(edge) => {
                self.selection = Selection::Edge(edge);
            }
            Hit::Canvas => {
                let additive = e.modifiers.shift;
                if !additive {
                    self.selection = Selection::Empty;
                }
                self.gesture = Gesture::Marquee {
                    pointer,
                    start: world,
                    current: world,
                    additive,
                    moved: false,
                };
            }
        }
        if !self.gesture.is_idle() {
            log::debug!("gesture {} started", self.gesture.name());
        }
        self.request_redraw();
        true
    }

    // ─── Move ────────────────────────────────────────────────────────────

    pub fn pointer_move(&mut self, e: &PointerEvent) -> bool {
        if !self.owns(e) {
            return false;
        }
        let world = self.world(e);
        let epsilon = self.config.drag_epsilon;
        let grid = self.config.grid_size;
        let mut gesture = mem::take(&mut self.gesture);

        match &mut gesture {
            Gesture::Idle => {}
            Gesture::Pan {
                start_screen,
                start_pan,
                ..
            } => {
                self.camera.pan = *start_pan + (e.position - *start_screen);
            }
            Gesture::Drag {
                start,
                origins,
                moved,
                ..
            } => {
                let delta = world - *start;
                *moved |= exceeds(delta, epsilon);
                for (id, origin) in origins.iter() {
                    let x = self.snap_value(origin.x + delta.x);
                    let y = self.snap_value(origin.y + delta.y);
                    if let Some(node) = self.doc.node_mut(*id) {
                        node.x = x;
                        node.y = y;
                    }
                }
            }
            Gesture::Resize {
                start,
                node,
                handle,
                initial,
                moved,
                ..
            } => {
                let delta = world - *start;
                *moved |= exceeds(delta, epsilon);
                let rect = self.resized(*initial, *handle, delta);
                if let Some(node) = self.doc.node_mut(*node) {
                    node.x = rect.x0;
                    node.y = rect.y0;
                    node.w = rect.width();
                    node.h = rect.height();
                }
            }
            Gesture::Connect { current, .. } => {
                *current = world;
            }
            Gesture::EdgeHandleDrag {
                edge,
                handle,
                start,
                moved,
                ..
            } => {
                *moved |= exceeds(world - *start, epsilon);
                if let Some(edge) = self.doc.edge_mut(*edge) {
                    handle.apply(edge, world, grid);
                }
            }
            Gesture::EdgeEndpointDrag { current, .. } => {
                *current = world;
            }
            Gesture::EdgeLabelDrag {
                edge,
                start,
                origin,
                moved,
                ..
            } => {
                let delta = world - *start;
                *moved |= exceeds(delta, epsilon);
                if let Some(edge) = self.doc.edge_mut(*edge) {
                    edge.label.offset = *origin + delta;
                }
            }
            Gesture::GroupDrag {
                start,
                origin,
                moved,
                ..
            } => {
                let raw = world - *start;
                *moved |= exceeds(raw, epsilon);
                let delta = Vec2::new(snap(raw.x, grid), snap(raw.y, grid));
                origin.apply(&mut self.doc, delta);
            }
            Gesture::Marquee {
                start,
                current,
                moved,
                ..
            } => {
                *current = world;
                *moved |= exceeds(world - *start, self.config.marquee_epsilon);
            }
        }

        log::trace!("gesture {} moved to {world:?}", gesture.name());
        self.gesture = gesture;
        self.request_redraw();
        true
    }

    /// Resize `initial` by dragging `handle` by `delta`. Only the dragged
    /// edges move and snap; the opposite edges stay fixed, including when
    /// the minimum size is hit.
    fn resized(&self, initial: Rect, handle: ResizeHandle, delta: Vec2) -> Rect {
        let min_w = self.config.min_node_width;
        let min_h = self.config.min_node_height;
        let Rect { mut x0, mut y0, mut x1, mut y1 } = initial;

        if handle.moves_left() {
            x0 = self.snap_value(x0 + delta.x).min(x1 - min_w);
        }
        if handle.moves_right() {
            x1 = self.snap_value(x1 + delta.x).max(x0 + min_w);
        }
        if handle.moves_top() {
            y0 = self.snap_value(y0 + delta.y).min(y1 - min_h);
        }
        if handle.moves_bottom() {
            y1 = self.snap_value(y1 + delta.y).max(y0 + min_h);
        }
        Rect::new(x0, y0, x1, y1)
    }

    // ─── Release ─────────────────────────────────────────────────────────

    pub fn pointer_up(&mut self, e: &PointerEvent) -> bool {
        if !self.owns(e) {
            return false;
        }
        let world = self.world(e);
        let gesture = mem::replace(&mut self.gesture, Gesture::Idle);
        let name = gesture.name();

        let committed = match gesture {
            Gesture::Idle | Gesture::Pan { .. } => false,
            Gesture::Drag { moved, .. }
            | Gesture::Resize { moved, .. }
            | Gesture::EdgeHandleDrag { moved, .. }
            | Gesture::EdgeLabelDrag { moved, .. }
            | Gesture::GroupDrag { moved, .. } => self.finish(moved),
            Gesture::Connect { from, .. } => {
                let created = self.finish_connect(from, world);
                self.finish(created)
            }
            Gesture::EdgeEndpointDrag { edge, end, .. } => {
                let rebound = self.finish_rebind(edge, end, world, e.modifiers.alt);
                self.finish(rebound)
            }
            Gesture::Marquee {
                start,
                additive,
                moved,
                ..
            } => {
                if moved {
                    let hits = marquee_hits(&self.doc, Rect::from_points(start, world));
                    if additive {
                        let mut ids = self.selection.nodes().to_vec();
                        ids.extend(hits);
                        self.selection.set_nodes(ids);
                    } else {
                        self.selection.set_nodes(hits);
                    }
                } else if !additive {
                    self.selection = Selection::Empty;
                }
                false
            }
        };

        log::debug!("gesture {name} ended (committed: {committed})");
        self.selection.retain_valid(&self.doc);
        self.request_redraw();
        true
    }

    /// Commit the open transaction when `keep`, else roll it back.
    fn finish(&mut self, keep: bool) -> bool {
        if keep {
            self.history.commit(&self.doc)
        } else {
            self.history.rollback(&mut self.doc);
            false
        }
    }

    fn finish_connect(&mut self, from: (NodeId, Anchor), world: Point) -> bool {
        let Some((node, anchor)) = self.hit_context().drop_target(world) else {
            return false;
        };
        if (node, anchor) == from {
            log::debug!("connect rejected: same node and anchor");
            return false;
        }
        let id = self.doc.fresh_edge_id();
        self.doc.edges.push(Edge::new(
            id,
            Endpoint::bound(from.0, from.1),
            Endpoint::bound(node, anchor),
        ));
        self.selection = Selection::Edge(id);
        true
    }

    fn finish_rebind(&mut self, edge: EdgeId, end: EdgeEnd, world: Point, alt: bool) -> bool {
        let target = match self.hit_context().drop_target(world) {
            Some((node, anchor)) => Endpoint::bound(node, anchor),
            None if alt && self.hit_context().hit_test(world) == Hit::Canvas => {
                Endpoint::Free(snap_point(world, self.config.grid_size))
            }
            None => return false,
        };
        let Some(edge) = self.doc.edge_mut(edge) else {
            return false;
        };
        let (slot, other) = match end {
            EdgeEnd::From => (&mut edge.from, edge.to),
            EdgeEnd::To => (&mut edge.to, edge.from),
        };
        if target.node().is_some() && target == other {
            log::debug!("rebind rejected: same node and anchor as the other end");
            return false;
        }
        if *slot == target {
            return false;
        }
        *slot = target;
        true
    }

    // ─── Previews ────────────────────────────────────────────────────────

    /// The connector being drawn or rebound, routed to the pointer.
    pub fn connect_preview(&self) -> Option<RoutedEdge> {
        let grid = self.config.grid_size;
        match self.gesture {
            Gesture::Connect { from, current, .. } => {
                let edge = Edge::new(
                    EdgeId::intern("preview"),
                    Endpoint::bound(from.0, from.1),
                    Endpoint::Free(current),
                );
                let start = resolve_endpoint(&self.doc, &self.config, &edge.from)?;
                let end = ResolvedEnd {
                    point: current,
                    anchor: None,
                };
                Some(route_between(&start, &end, &edge, grid))
            }
            Gesture::EdgeEndpointDrag {
                edge, end, current, ..
            } => {
                let mut edge = self.doc.edge(edge)?.clone();
                match end {
                    EdgeEnd::From => edge.from = Endpoint::Free(current),
                    EdgeEnd::To => edge.to = Endpoint::Free(current),
                }
                let from = resolve_endpoint(&self.doc, &self.config, &edge.from)?;
                let to = resolve_endpoint(&self.doc, &self.config, &edge.to)?;
                Some(route_between(&from, &to, &edge, grid))
            }
            _ => None,
        }
    }
}
