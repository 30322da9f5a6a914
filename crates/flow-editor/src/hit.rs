//! Hit testing: world point → interactive element.
//!
//! Tests run in a fixed priority order, most specific first: quick-add
//! satellites, resize handles, anchor markers, edge handles and labels,
//! group toggles and bodies, node bodies, edge bodies, then the canvas.
//! Within one class the topmost (last painted) element wins. Tolerances
//! are configured in screen pixels and divided by the zoom scale.

use flow_core::config::EditorConfig;
use flow_core::geometry::{anchor_point, nearest_anchor, rects_intersect};
use flow_core::grouping::{group_frame, representative_member, toggle_button_rect, visible_nodes};
use flow_core::id::{EdgeId, GroupId, NodeId};
use flow_core::model::{Anchor, Document, Edge, Node, Selection};
use flow_core::routing::{EdgeHandle, RoutedEdge, route_all, route_edge};
use kurbo::{Point, Rect, Vec2};

/// Resize square half-size relative to the anchor marker radius.
const RESIZE_HANDLE_RATIO: f64 = 0.8;

/// One of the eight resize handles around a selected node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NW,
        ResizeHandle::N,
        ResizeHandle::NE,
        ResizeHandle::E,
        ResizeHandle::SE,
        ResizeHandle::S,
        ResizeHandle::SW,
        ResizeHandle::W,
    ];

    pub fn position(self, rect: Rect) -> Point {
        let c = rect.center();
        match self {
            ResizeHandle::N => Point::new(c.x, rect.y0),
            ResizeHandle::NE => Point::new(rect.x1, rect.y0),
            ResizeHandle::E => Point::new(rect.x1, c.y),
            ResizeHandle::SE => Point::new(rect.x1, rect.y1),
            ResizeHandle::S => Point::new(c.x, rect.y1),
            ResizeHandle::SW => Point::new(rect.x0, rect.y1),
            ResizeHandle::W => Point::new(rect.x0, c.y),
            ResizeHandle::NW => Point::new(rect.x0, rect.y0),
        }
    }

    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::NW | ResizeHandle::SW)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::NE | ResizeHandle::SE)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::NE | ResizeHandle::NW)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::SE | ResizeHandle::SW)
    }
}

/// Which end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeEnd {
    From,
    To,
}

/// What a press landed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit {
    QuickAdd { node: NodeId, anchor: Anchor },
    Resize { node: NodeId, handle: ResizeHandle },
    Anchor { node: NodeId, anchor: Anchor },
    EdgeHandle { edge: EdgeId, handle: EdgeHandle },
    EdgeEndpoint { edge: EdgeId, end: EdgeEnd },
    EdgeLabel(EdgeId),
    GroupToggle(GroupId),
    GroupBody(GroupId),
    Node(NodeId),
    Edge(EdgeId),
    Canvas,
}

impl Hit {
    /// Plain element hits, which a pan gesture may override.
    pub fn is_plain(&self) -> bool {
        matches!(self, Hit::Node(_) | Hit::Edge(_) | Hit::GroupBody(_) | Hit::Canvas)
    }
}

// ─── Geometry helpers ────────────────────────────────────────────────────

fn near(a: Point, b: Point, r: f64) -> bool {
    a.distance_squared(b) <= r * r
}

fn contains(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Centre of the quick-add satellite beyond `anchor`.
pub fn quick_add_point(rect: Rect, anchor: Anchor, config: &EditorConfig) -> Point {
    anchor_point(rect, anchor) + anchor.outward() * config.quick_add_offset
}

/// Approximate box of an edge label, centred on its label point.
pub fn label_rect(edge: &Edge, routed: &RoutedEdge) -> Rect {
    let size = edge.label.font_size;
    let chars = edge.label.text.chars().count() as f64;
    let half = Vec2::new((0.3 * size * chars + 4.0).max(6.0), size / 2.0 + 3.0);
    let c = routed.label_point(edge);
    Rect::from_points(c - half, c + half)
}

/// The single selected node, if it is visible.
pub fn single_selected_node<'a>(doc: &'a Document, selection: &Selection) -> Option<&'a Node> {
    match selection.nodes() {
        [id] => visible_nodes(doc).find(|n| n.id == *id),
        _ => None,
    }
}

// ─── Press hit test ──────────────────────────────────────────────────────

/// Everything a hit test needs besides the point.
#[derive(Debug, Clone, Copy)]
pub struct HitContext<'a> {
    pub doc: &'a Document,
    pub config: &'a EditorConfig,
    pub selection: &'a Selection,
    /// Current zoom scale.
    pub scale: f64,
    /// Whether quick-add satellites are showing.
    pub quick_add: bool,
}

impl HitContext<'_> {
    fn handle_radius(&self) -> f64 {
        self.config.handle_radius / self.scale
    }

    /// Half-size of a resize square. Smaller than the anchor radius so the
    /// anchor marker under a side handle stays reachable around its rim.
    fn resize_half(&self) -> f64 {
        self.handle_radius() * RESIZE_HANDLE_RATIO
    }

    /// Find the element under world point `p`.
    pub fn hit_test(&self, p: Point) -> Hit {
        let r = self.handle_radius();
        let selected = single_selected_node(self.doc, self.selection);

        if let Some(node) = selected {
            let rect = node.rect();
            if self.quick_add {
                let satellite = r * 1.5;
                for anchor in Anchor::ALL {
                    if near(quick_add_point(rect, anchor, self.config), p, satellite) {
                        return Hit::QuickAdd {
                            node: node.id,
                            anchor,
                        };
                    }
                }
            }
            let half = self.resize_half();
            for handle in ResizeHandle::ALL {
                let at = handle.position(rect);
                if (at.x - p.x).abs() <= half && (at.y - p.y).abs() <= half {
                    return Hit::Resize {
                        node: node.id,
                        handle,
                    };
                }
            }
            for anchor in Anchor::ALL {
                if near(anchor_point(rect, anchor), p, r) {
                    return Hit::Anchor {
                        node: node.id,
                        anchor,
                    };
                }
            }
        }

        if let Some(hit) = self.hit_edge_handles(p, r) {
            return hit;
        }
        if let Some(hit) = self.hit_groups(p) {
            return hit;
        }
        if let Some(node) = visible_nodes(self.doc)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .find(|n| contains(n.rect(), p))
        {
            return Hit::Node(node.id);
        }
        let tolerance = self.config.edge_hit_tolerance / self.scale;
        let edges: Vec<(EdgeId, RoutedEdge)> = route_all(self.doc, self.config).collect();
        for (id, routed) in edges.iter().rev() {
            let width = self.doc.edge(*id).map_or(0.0, |e| e.style.width);
            if routed.distance_to(p) <= tolerance + width / 2.0 {
                return Hit::Edge(*id);
            }
        }
        Hit::Canvas
    }

    fn hit_edge_handles(&self, p: Point, r: f64) -> Option<Hit> {
        if let Some(id) = self.selection.edge()
            && let Some(edge) = self.doc.edge(id)
            && let Some(routed) = route_edge(self.doc, self.config, edge)
        {
            if let Some(handle) = routed.handle()
                && near(handle.position(), p, r)
            {
                return Some(Hit::EdgeHandle { edge: id, handle });
            }
            if near(routed.start(), p, r) {
                return Some(Hit::EdgeEndpoint {
                    edge: id,
                    end: EdgeEnd::From,
                });
            }
            if near(routed.end(), p, r) {
                return Some(Hit::EdgeEndpoint {
                    edge: id,
                    end: EdgeEnd::To,
                });
            }
        }
        let labelled: Vec<(EdgeId, RoutedEdge)> = route_all(self.doc, self.config).collect();
        labelled.iter().rev().find_map(|(id, routed)| {
            let edge = self.doc.edge(*id)?;
            if edge.label.text.trim().is_empty() {
                return None;
            }
            contains(label_rect(edge, routed), p).then_some(Hit::EdgeLabel(*id))
        })
    }

    fn hit_groups(&self, p: Point) -> Option<Hit> {
        for group in self.doc.groups.iter().rev() {
            let Some(frame) = group_frame(self.doc, group, self.config) else {
                continue;
            };
            if contains(toggle_button_rect(frame), p) {
                return Some(Hit::GroupToggle(group.id));
            }
            if !contains(frame, p) {
                continue;
            }
            // An expanded frame only owns its padding; members stay clickable.
            if group.collapsed || !visible_nodes(self.doc).any(|n| contains(n.rect(), p)) {
                return Some(Hit::GroupBody(group.id));
            }
        }
        None
    }

    /// Where a connector dropped at `p` would attach: an anchor marker,
    /// a node body (nearest anchor), or a collapsed group frame (nearest
    /// member, nearest anchor on the frame).
    pub fn drop_target(&self, p: Point) -> Option<(NodeId, Anchor)> {
        let r = self.handle_radius();
        let nodes: Vec<&Node> = visible_nodes(self.doc).collect();

        for node in nodes.iter().rev() {
            for anchor in Anchor::ALL {
                if near(anchor_point(node.rect(), anchor), p, r) {
                    return Some((node.id, anchor));
                }
            }
        }
        let collapsed: Vec<(NodeId, Rect)> = self
            .doc
            .groups
            .iter()
            .rev()
            .filter(|g| g.collapsed)
            .filter_map(|g| {
                let frame = group_frame(self.doc, g, self.config)?;
                let member = representative_member(self.doc, g, p)?;
                Some((member, frame))
            })
            .collect();
        for &(member, frame) in &collapsed {
            for anchor in Anchor::ALL {
                if near(anchor_point(frame, anchor), p, r) {
                    return Some((member, anchor));
                }
            }
        }
        if let Some(node) = nodes.iter().rev().find(|n| contains(n.rect(), p)) {
            return Some((node.id, nearest_anchor(node.rect(), p)));
        }
        collapsed
            .iter()
            .find(|(_, frame)| contains(*frame, p))
            .map(|&(member, frame)| (member, nearest_anchor(frame, p)))
    }
}

/// Visible nodes whose bounds intersect `rect`, in document order.
/// Members of collapsed groups are never hit.
pub fn marquee_hits(doc: &Document, rect: Rect) -> Vec<NodeId> {
    visible_nodes(doc)
        .filter(|n| rects_intersect(rect, n.rect()))
        .map(|n| n.id)
        .collect()
}
