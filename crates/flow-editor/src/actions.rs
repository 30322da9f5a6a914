//! Editing commands.
//!
//! Every command runs as one history transaction through `Editor::edit`:
//! snapshot, mutate, commit. A command whose preconditions fail leaves
//! the document untouched, so the commit pushes nothing.

use crate::editor::{Editor, QuickAdd};
use flow_core::grouping::{collapsed_frame, create_group, toggle_collapse, ungroup};
use flow_core::id::{GroupId, NodeId};
use flow_core::model::{
    Anchor, Color, Edge, Endpoint, Node, NodeType, RouteKind, Selection, TextAlign,
};
use kurbo::Point;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

// ─── Clipboard ───────────────────────────────────────────────────────────

/// Nodes and the edges running between them, copied out of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clipboard {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Clipboard {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ─── Layout parameters ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Horizontal gap between nodes laid out by auto-arrange.
pub const ARRANGE_GAP: f64 = 70.0;
/// Vertical stagger applied to every other node by auto-arrange.
pub const ARRANGE_STAGGER: f64 = 12.0;

// ─── Themes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemePreset {
    pub name: &'static str,
    /// Node fills, assigned by position and cycled.
    pub fills: [Color; 5],
    pub stroke: Color,
    pub text: Color,
    pub edge: Color,
}

pub static THEME_PRESETS: [ThemePreset; 3] = [
    ThemePreset {
        name: "North",
        fills: [
            Color::rgb(0xE0, 0xF2, 0xFE),
            Color::rgb(0xDC, 0xFC, 0xE7),
            Color::rgb(0xFE, 0xF3, 0xC7),
            Color::rgb(0xFE, 0xE2, 0xE2),
            Color::rgb(0xED, 0xE9, 0xFE),
        ],
        stroke: Color::rgb(0x1E, 0x29, 0x3B),
        text: Color::rgb(0x0F, 0x17, 0x2A),
        edge: Color::rgb(0x33, 0x41, 0x55),
    },
    ThemePreset {
        name: "Sunset",
        fills: [
            Color::rgb(0xFF, 0xF7, 0xED),
            Color::rgb(0xFF, 0xE4, 0xE6),
            Color::rgb(0xF5, 0xF3, 0xFF),
            Color::rgb(0xEC, 0xFE, 0xFF),
            Color::rgb(0xFE, 0xF9, 0xC3),
        ],
        stroke: Color::rgb(0x7C, 0x2D, 0x12),
        text: Color::rgb(0x43, 0x14, 0x07),
        edge: Color::rgb(0x9A, 0x34, 0x12),
    },
    ThemePreset {
        name: "Forest",
        fills: [
            Color::rgb(0xDC, 0xFC, 0xE7),
            Color::rgb(0xCC, 0xFB, 0xF1),
            Color::rgb(0xEC, 0xFC, 0xCB),
            Color::rgb(0xF0, 0xFD, 0xF4),
            Color::rgb(0xD9, 0xF9, 0x9D),
        ],
        stroke: Color::rgb(0x14, 0x53, 0x2D),
        text: Color::rgb(0x05, 0x2E, 0x16),
        edge: Color::rgb(0x16, 0x65, 0x34),
    },
];

// ─── Property edits ──────────────────────────────────────────────────────

/// A property change on the single selected node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeProperty {
    Text(String),
    FontFamily(String),
    FontSize(f64),
    TextColor(Color),
    Align(TextAlign),
    Bold(bool),
    Italic(bool),
    Fill(Color),
    Stroke(Color),
    StrokeWidth(f64),
    Radius(f64),
    Width(f64),
    Height(f64),
}

/// A property change on the selected edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeProperty {
    Stroke(Color),
    Width(f64),
    Dashed(bool),
    Arrow(bool),
    LabelText(String),
    LabelSize(f64),
    LabelColor(Color),
    Route(RouteKind),
    CornerRadius(f64),
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

impl NodeProperty {
    /// Apply to `node`; numeric values are clamped to their valid range.
    /// Non-finite numbers are ignored.
    fn apply(&self, node: &mut Node, min_w: f64, min_h: f64) {
        match self {
            NodeProperty::Text(text) => node.text = text.clone(),
            NodeProperty::FontFamily(family) => node.text_style.font_family = family.clone(),
            NodeProperty::FontSize(v) => {
                if let Some(v) = finite(*v) {
                    node.text_style.font_size = v.clamp(8.0, 72.0);
                }
            }
            NodeProperty::TextColor(c) => node.text_style.color = *c,
            NodeProperty::Align(a) => node.text_style.align = *a,
            NodeProperty::Bold(b) => node.text_style.bold = *b,
            NodeProperty::Italic(i) => node.text_style.italic = *i,
            NodeProperty::Fill(c) => node.shape_style.fill = *c,
            NodeProperty::Stroke(c) => node.shape_style.stroke = *c,
            NodeProperty::StrokeWidth(v) => {
                if let Some(v) = finite(*v) {
                    node.shape_style.stroke_width = v.clamp(1.0, 20.0);
                }
            }
            NodeProperty::Radius(v) => {
                if let Some(v) = finite(*v) {
                    node.shape_style.radius = v.clamp(0.0, 80.0);
                }
            }
            NodeProperty::Width(v) => {
                if let Some(v) = finite(*v) {
                    node.w = v.max(min_w);
                }
            }
            NodeProperty::Height(v) => {
                if let Some(v) = finite(*v) {
                    node.h = v.max(min_h);
                }
            }
        }
    }
}

impl EdgeProperty {
    fn apply(&self, edge: &mut Edge) {
        match self {
            EdgeProperty::Stroke(c) => edge.style.stroke = *c,
            EdgeProperty::Width(v) => {
                if let Some(v) = finite(*v) {
                    edge.style.width = v.clamp(1.0, 12.0);
                }
            }
            EdgeProperty::Dashed(d) => edge.style.dashed = *d,
            EdgeProperty::Arrow(a) => edge.style.arrow = *a,
            EdgeProperty::LabelText(text) => edge.label.text = text.clone(),
            EdgeProperty::LabelSize(v) => {
                if let Some(v) = finite(*v) {
                    edge.label.font_size = v.clamp(8.0, 40.0);
                }
            }
            EdgeProperty::LabelColor(c) => edge.label.color = *c,
            EdgeProperty::Route(kind) => edge.route.kind = *kind,
            EdgeProperty::CornerRadius(v) => {
                if let Some(v) = finite(*v) {
                    edge.route.corner_radius = v.clamp(0.0, 40.0);
                }
            }
        }
    }
}

// ─── Commands ────────────────────────────────────────────────────────────

impl Editor {
    /// Run `f` as one undoable transaction labelled `label`. Any gesture in
    /// progress is cancelled first.
    fn edit<R>(&mut self, label: &str, f: impl FnOnce(&mut Self) -> R) -> R {
        self.cancel_gesture();
        self.history.begin(&self.doc, label);
        let result = f(self);
        self.history.commit(&self.doc);
        self.selection.retain_valid(&self.doc);
        if let Some(q) = self.quick_add
            && self.doc.node(q.node).is_none()
        {
            self.quick_add = None;
        }
        self.request_redraw();
        result
    }

    /// Selected node ids that resolve, in document order.
    fn selected_nodes(&self) -> SmallVec<[NodeId; 8]> {
        self.doc
            .nodes
            .iter()
            .filter(|n| self.selection.contains_node(n.id))
            .map(|n| n.id)
            .collect()
    }

    /// Add a node of `kind` centred in the viewport, on top, and select it.
    pub fn add_node(&mut self, kind: NodeType) -> NodeId {
        let center = self.camera.world_center(self.viewport_size);
        self.edit("Add node", |ed| {
            let id = ed.doc.fresh_node_id();
            let mut node = Node::new(id, kind, 0.0, 0.0);
            node.x = ed.snap_value(center.x - node.w / 2.0);
            node.y = ed.snap_value(center.y - node.h / 2.0);
            ed.doc.push_on_top(node);
            ed.selection = Selection::Nodes(vec![id]);
            id
        })
    }

    /// Delete the selection: nodes with their edges, the selected edge, or
    /// the selected group's grouping (members stay).
    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.edit("Delete", |ed| {
            match std::mem::take(&mut ed.selection) {
                Selection::Empty => false,
                Selection::Nodes(ids) => ed.doc.remove_nodes(&ids) > 0,
                Selection::Edge(id) => ed.doc.remove_edge(id),
                Selection::Group(id) => ungroup(&mut ed.doc, id),
            }
        })
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selected nodes and the edges between them. Returns the
    /// number of nodes copied; nothing is copied without a node selection.
    pub fn copy_selection(&mut self) -> usize {
        let ids: HashSet<NodeId> = self.selected_nodes().into_iter().collect();
        if ids.is_empty() {
            return 0;
        }
        let inside = |e: &Endpoint| e.node().is_some_and(|n| ids.contains(&n));
        let clipboard = Clipboard {
            nodes: self
                .doc
                .nodes
                .iter()
                .filter(|n| ids.contains(&n.id))
                .cloned()
                .collect(),
            edges: self
                .doc
                .edges
                .iter()
                .filter(|e| inside(&e.from) && inside(&e.to))
                .cloned()
                .collect(),
        };
        let count = clipboard.nodes.len();
        log::debug!("copied {count} node(s), {} edge(s)", clipboard.edges.len());
        self.clipboard = Some(clipboard);
        count
    }

    /// Paste the clipboard with fresh ids, offset a further step from the
    /// previous paste, and select the pasted nodes.
    pub fn paste(&mut self) -> Vec<NodeId> {
        let Some(clipboard) = self.clipboard.clone().filter(|c| !c.is_empty()) else {
            return Vec::new();
        };
        self.edit("Paste", |ed| {
            ed.paste_offset += ed.config.paste_step;
            let offset = ed.paste_offset;
            let base_z = ed.doc.max_z();
            let mut remap = HashMap::new();
            let mut pasted = Vec::with_capacity(clipboard.nodes.len());

            for (i, source) in clipboard.nodes.iter().enumerate() {
                let mut node = source.clone();
                node.id = ed.doc.fresh_node_id();
                node.x = ed.snap_value(source.x + offset);
                node.y = ed.snap_value(source.y + offset);
                node.z = base_z + i as u32 + 1;
                remap.insert(source.id, node.id);
                pasted.push(node.id);
                ed.doc.nodes.push(node);
            }
            let rebind = |e: Endpoint| match e {
                Endpoint::Bound { node, anchor } => remap
                    .get(&node)
                    .map(|&node| Endpoint::Bound { node, anchor }),
                Endpoint::Free(_) => None,
            };
            for source in &clipboard.edges {
                let (Some(from), Some(to)) = (rebind(source.from), rebind(source.to)) else {
                    continue;
                };
                let mut edge = source.clone();
                edge.id = ed.doc.fresh_edge_id();
                edge.from = from;
                edge.to = to;
                ed.doc.edges.push(edge);
            }
            ed.selection.set_nodes(pasted.clone());
            pasted
        })
    }

    // ─── Layout ──────────────────────────────────────────────────────────

    /// Align two or more selected nodes. Centre and middle use the mean of
    /// the node centres.
    pub fn align(&mut self, alignment: Alignment) -> bool {
        let ids = self.selected_nodes();
        if ids.len() < 2 {
            return false;
        }
        let nodes: Vec<&Node> = ids.iter().filter_map(|id| self.doc.node(*id)).collect();
        let count = nodes.len() as f64;
        let target = match alignment {
            Alignment::Left => nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min),
            Alignment::Right => nodes.iter().map(|n| n.x + n.w).fold(f64::NEG_INFINITY, f64::max),
            Alignment::Top => nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min),
            Alignment::Bottom => nodes.iter().map(|n| n.y + n.h).fold(f64::NEG_INFINITY, f64::max),
            Alignment::Center => nodes.iter().map(|n| n.center().x).sum::<f64>() / count,
            Alignment::Middle => nodes.iter().map(|n| n.center().y).sum::<f64>() / count,
        };
        self.edit("Align", |ed| {
            for id in &ids {
                let Some(n) = ed.doc.node_mut(*id) else {
                    continue;
                };
                match alignment {
                    Alignment::Left => n.x = target,
                    Alignment::Right => n.x = target - n.w,
                    Alignment::Center => n.x = target - n.w / 2.0,
                    Alignment::Top => n.y = target,
                    Alignment::Bottom => n.y = target - n.h,
                    Alignment::Middle => n.y = target - n.h / 2.0,
                }
            }
            true
        })
    }

    /// Spread three or more selected nodes so the gaps between them are
    /// equal, keeping the outermost two in place.
    pub fn distribute(&mut self, axis: Axis) -> bool {
        let ids = self.selected_nodes();
        if ids.len() < 3 {
            return false;
        }
        // (id, position, extent) along the axis.
        let mut spans: Vec<(NodeId, f64, f64)> = ids
            .iter()
            .filter_map(|id| self.doc.node(*id))
            .map(|n| match axis {
                Axis::Horizontal => (n.id, n.x, n.w),
                Axis::Vertical => (n.id, n.y, n.h),
            })
            .collect();
        spans.sort_by(|a, b| a.1.total_cmp(&b.1));
        let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
            return false;
        };
        let start = first.1;
        let total: f64 = spans.iter().map(|s| s.2).sum();
        let gap = (last.1 + last.2 - start - total) / (spans.len() - 1) as f64;

        self.edit("Distribute", |ed| {
            let mut cursor = start;
            for (id, _, extent) in &spans {
                if let Some(n) = ed.doc.node_mut(*id) {
                    match axis {
                        Axis::Horizontal => n.x = cursor,
                        Axis::Vertical => n.y = cursor,
                    }
                }
                cursor += extent + gap;
            }
            true
        })
    }

    /// Lay the selected nodes (or every node when fewer than two are
    /// selected) out left to right around their mean centre line.
    pub fn auto_arrange(&mut self) -> bool {
        let selected = self.selected_nodes();
        let mut targets: Vec<(NodeId, Point, f64, f64)> = self
            .doc
            .nodes
            .iter()
            .filter(|n| selected.len() < 2 || selected.contains(&n.id))
            .map(|n| (n.id, Point::new(n.x, n.y), n.w, n.h))
            .collect();
        if targets.len() < 2 {
            return false;
        }
        targets.sort_by(|a, b| a.1.x.total_cmp(&b.1.x).then(a.1.y.total_cmp(&b.1.y)));
        let base_x = targets.iter().map(|t| t.1.x).fold(f64::INFINITY, f64::min);
        let center_y =
            targets.iter().map(|t| t.1.y + t.3 / 2.0).sum::<f64>() / targets.len() as f64;

        self.edit("Auto arrange", |ed| {
            let mut cursor = base_x;
            for (i, (id, _, w, h)) in targets.iter().enumerate() {
                let stagger = if i % 2 == 0 { 0.0 } else { ARRANGE_STAGGER };
                let x = ed.snap_value(cursor);
                let y = ed.snap_value(center_y - h / 2.0 + stagger);
                if let Some(n) = ed.doc.node_mut(*id) {
                    n.x = x;
                    n.y = y;
                }
                cursor += w + ARRANGE_GAP;
            }
            true
        })
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    pub fn bring_to_front(&mut self) -> bool {
        let ids = self.selected_nodes();
        if ids.is_empty() {
            return false;
        }
        self.edit("Bring to front", |ed| ed.doc.bring_to_front(&ids))
    }

    pub fn send_to_back(&mut self) -> bool {
        let ids = self.selected_nodes();
        if ids.is_empty() {
            return false;
        }
        self.edit("Send to back", |ed| ed.doc.send_to_back(&ids))
    }

    // ─── Theme ───────────────────────────────────────────────────────────

    /// Apply the next theme preset to the selected nodes (or all nodes)
    /// and every edge. Returns the preset applied.
    pub fn apply_theme(&mut self) -> Option<&'static ThemePreset> {
        let selected = self.selected_nodes();
        let targets: Vec<NodeId> = if selected.is_empty() {
            self.doc.nodes.iter().map(|n| n.id).collect()
        } else {
            selected.to_vec()
        };
        if targets.is_empty() {
            return None;
        }
        let preset = &THEME_PRESETS[self.theme_index % THEME_PRESETS.len()];
        self.edit("Apply theme", |ed| {
            for (i, id) in targets.iter().enumerate() {
                if let Some(n) = ed.doc.node_mut(*id) {
                    n.shape_style.fill = preset.fills[i % preset.fills.len()];
                    n.shape_style.stroke = preset.stroke;
                    n.text_style.color = preset.text;
                }
            }
            for edge in &mut ed.doc.edges {
                edge.style.stroke = preset.edge;
            }
        });
        self.theme_index = (self.theme_index + 1) % THEME_PRESETS.len();
        Some(preset)
    }

    // ─── Properties ──────────────────────────────────────────────────────

    /// Edit a property of the single selected node.
    pub fn set_node_property(&mut self, prop: NodeProperty) -> bool {
        let [id] = self.selection.nodes() else {
            return false;
        };
        let id = *id;
        let (min_w, min_h) = (self.config.min_node_width, self.config.min_node_height);
        self.edit("Edit node", |ed| {
            let Some(node) = ed.doc.node_mut(id) else {
                return false;
            };
            prop.apply(node, min_w, min_h);
            true
        })
    }

    /// Edit a property of the selected edge.
    pub fn set_edge_property(&mut self, prop: EdgeProperty) -> bool {
        let Some(id) = self.selection.edge() else {
            return false;
        };
        self.edit("Edit connector", |ed| {
            let Some(edge) = ed.doc.edge_mut(id) else {
                return false;
            };
            prop.apply(edge);
            true
        })
    }

    /// Rename the selected group. A collapsed group's frame follows the
    /// new label size.
    pub fn set_group_text(&mut self, text: &str) -> bool {
        let Some(id) = self.selection.group() else {
            return false;
        };
        self.edit("Rename group", |ed| {
            let Some(group) = ed.doc.group_mut(id) else {
                return false;
            };
            group.text = text.to_string();
            let collapsed = group.collapsed;
            if collapsed {
                let frame = ed
                    .doc
                    .group(id)
                    .and_then(|g| collapsed_frame(&ed.doc, g, &ed.config));
                if let Some(group) = ed.doc.group_mut(id) {
                    group.frame = frame;
                }
            }
            true
        })
    }

    // ─── Groups ──────────────────────────────────────────────────────────

    /// Group the selected nodes and select the new group.
    pub fn group_selection(&mut self) -> Option<GroupId> {
        let ids = self.selected_nodes();
        if ids.len() < 2 {
            return None;
        }
        self.edit("Group", |ed| {
            let id = create_group(&mut ed.doc, &ids)?;
            ed.selection = Selection::Group(id);
            Some(id)
        })
    }

    /// Dissolve the selected group (or the group of the first selected
    /// node) and select its former members.
    pub fn ungroup_selection(&mut self) -> bool {
        let id = match &self.selection {
            Selection::Group(id) => Some(*id),
            Selection::Nodes(ids) => ids
                .first()
                .and_then(|n| self.doc.group_of(*n))
                .map(|g| g.id),
            _ => None,
        };
        let Some(id) = id else {
            return false;
        };
        let members: Vec<NodeId> = self
            .doc
            .group(id)
            .map(|g| g.members.to_vec())
            .unwrap_or_default();
        self.edit("Ungroup", |ed| {
            if !ungroup(&mut ed.doc, id) {
                return false;
            }
            ed.selection.set_nodes(members);
            true
        })
    }

    pub fn toggle_group(&mut self, id: GroupId) -> bool {
        if self.doc.group(id).is_none() {
            return false;
        }
        self.edit("Toggle group", |ed| {
            toggle_collapse(&mut ed.doc, id, &ed.config, &mut ed.selection)
        })
    }

    // ─── Quick add ───────────────────────────────────────────────────────

    /// Open the type picker for a new node beyond `anchor` of `node`.
    pub fn open_quick_add(&mut self, node: NodeId, anchor: Anchor) -> bool {
        if self.doc.node(node).is_none() {
            return false;
        }
        self.quick_add = Some(QuickAdd { node, anchor });
        self.request_redraw();
        true
    }

    pub fn cancel_quick_add(&mut self) {
        if self.quick_add.take().is_some() {
            self.request_redraw();
        }
    }

    /// Create a node of `kind` in the open picker's direction, connected
    /// from the source node, and select it.
    pub fn confirm_quick_add(&mut self, kind: NodeType) -> Option<NodeId> {
        let QuickAdd { node: source, anchor } = self.quick_add.take()?;
        let rect = self.doc.node(source)?.rect();
        let gap = self.config.quick_add_gap;
        let (w, h) = kind.default_size();
        let center = rect.center();
        let (x, y) = match anchor {
            Anchor::Right => (rect.x1 + gap, center.y - h / 2.0),
            Anchor::Left => (rect.x0 - gap - w, center.y - h / 2.0),
            Anchor::Bottom => (center.x - w / 2.0, rect.y1 + gap),
            Anchor::Top => (center.x - w / 2.0, rect.y0 - gap - h),
        };
        let id = self.edit("Quick add", |ed| {
            let id = ed.doc.fresh_node_id();
            let node = Node::new(id, kind, ed.snap_value(x), ed.snap_value(y));
            ed.doc.push_on_top(node);
            let edge_id = ed.doc.fresh_edge_id();
            ed.doc.edges.push(Edge::new(
                edge_id,
                Endpoint::bound(source, anchor),
                Endpoint::bound(id, anchor.opposite()),
            ));
            ed.selection = Selection::Nodes(vec![id]);
            id
        });
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_core::config::EditorConfig;
    use flow_core::model::Document;
    use pretty_assertions::assert_eq;

    fn editor_with(nodes: &[(&str, f64, f64, f64, f64)]) -> Editor {
        let mut doc = Document::new();
        for &(id, x, y, w, h) in nodes {
            let mut n = Node::new(NodeId::intern(id), NodeType::Rectangle, x, y);
            n.w = w;
            n.h = h;
            doc.push_on_top(n);
        }
        Editor::with_document(doc, EditorConfig::default())
    }

    fn ids(names: &[&str]) -> Vec<NodeId> {
        names.iter().map(|n| NodeId::intern(n)).collect()
    }

    fn pos(editor: &Editor, id: &str) -> (f64, f64) {
        let n = editor.document().node(NodeId::intern(id)).unwrap();
        (n.x, n.y)
    }

    #[test]
    fn add_node_centres_in_viewport() {
        let mut ed = Editor::default();
        let id = ed.add_node(NodeType::Rectangle);
        let n = ed.document().node(id).unwrap();
        // 800x600 viewport, 180x80 node: (310, 260) is already on the grid.
        assert_eq!((n.x, n.y), (310.0, 260.0));
        assert_eq!(n.z, 1);
        assert_eq!(ed.history().undo_label(), Some("Add node"));
    }

    #[test]
    fn delete_nodes_cascades_edges() {
        let mut ed = Editor::default();
        ed.load_sample();
        ed.select_nodes(ids(&["n3"]));
        assert!(ed.delete_selection());
        let doc = ed.document();
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.edges.len(), 1);
        assert!(ed.selection().is_empty());
        assert!(!ed.delete_selection());
    }

    #[test]
    fn delete_group_keeps_members() {
        let mut ed = editor_with(&[("da", 0.0, 0.0, 100.0, 50.0), ("db", 200.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["da", "db"]));
        let gid = ed.group_selection().unwrap();
        assert_eq!(ed.selection(), &Selection::Group(gid));
        ed.delete_selection();
        assert!(ed.document().groups.is_empty());
        assert_eq!(ed.document().nodes.len(), 2);
    }

    #[test]
    fn paste_offsets_grow_and_edges_remap() {
        let mut ed = Editor::default();
        ed.load_sample();
        ed.select_nodes(ids(&["n1", "n2"]));
        assert_eq!(ed.copy_selection(), 2);

        let first = ed.paste();
        assert_eq!(first.len(), 2);
        assert_eq!(ed.paste_offset(), 20.0);
        let p = ed.document().node(first[0]).unwrap();
        assert_eq!((p.x, p.y), (100.0, 140.0));
        assert_eq!(ed.document().edges.len(), 5);
        let pasted_edge = ed.document().edges.last().unwrap();
        assert_eq!(pasted_edge.from.node(), Some(first[0]));
        assert_eq!(pasted_edge.to.node(), Some(first[1]));

        let second = ed.paste();
        let p = ed.document().node(second[0]).unwrap();
        assert_eq!((p.x, p.y), (120.0, 160.0));
        assert_eq!(ed.selection().nodes(), second.as_slice());
        assert_eq!(ed.document().max_z(), 8);
    }

    #[test]
    fn paste_with_empty_clipboard_is_noop() {
        let mut ed = Editor::default();
        assert!(ed.paste().is_empty());
        assert_eq!(ed.copy_selection(), 0);
        assert!(!ed.can_undo());
    }

    #[test]
    fn align_center_uses_mean_of_centres() {
        let mut ed = editor_with(&[("aa", 0.0, 0.0, 100.0, 50.0), ("ab", 200.0, 100.0, 40.0, 30.0)]);
        ed.select_nodes(ids(&["aa", "ab"]));
        assert!(ed.align(Alignment::Center));
        // centres 50 and 220 → 135
        assert_eq!(pos(&ed, "aa").0, 85.0);
        assert_eq!(pos(&ed, "ab").0, 115.0);

        assert!(ed.align(Alignment::Bottom));
        assert_eq!(pos(&ed, "aa").1, 80.0);
        assert_eq!(pos(&ed, "ab").1, 100.0);
    }

    #[test]
    fn align_needs_two_nodes() {
        let mut ed = editor_with(&[("ac", 0.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["ac"]));
        assert!(!ed.align(Alignment::Left));
        assert!(!ed.can_undo());
    }

    #[test]
    fn distribute_equalizes_gaps() {
        let mut ed = editor_with(&[
            ("ta", 0.0, 0.0, 100.0, 50.0),
            ("tb", 130.0, 0.0, 50.0, 50.0),
            ("tc", 400.0, 0.0, 100.0, 50.0),
        ]);
        ed.select_nodes(ids(&["tc", "ta", "tb"]));
        assert!(ed.distribute(Axis::Horizontal));
        // span 500, widths 250 → gap 125
        assert_eq!(pos(&ed, "ta").0, 0.0);
        assert_eq!(pos(&ed, "tb").0, 225.0);
        assert_eq!(pos(&ed, "tc").0, 400.0);
    }

    #[test]
    fn z_order_commands_keep_indices_dense() {
        let mut ed = editor_with(&[
            ("za", 0.0, 0.0, 50.0, 50.0),
            ("zb", 0.0, 0.0, 50.0, 50.0),
            ("zc", 0.0, 0.0, 50.0, 50.0),
        ]);
        ed.select_nodes(ids(&["za"]));
        assert!(ed.bring_to_front());
        let order: Vec<(&str, u32)> = ed.document().nodes.iter().map(|n| (n.id.as_str(), n.z)).collect();
        assert_eq!(order, vec![("zb", 1), ("zc", 2), ("za", 3)]);

        ed.select_nodes(ids(&["zc"]));
        assert!(ed.send_to_back());
        let order: Vec<(&str, u32)> = ed.document().nodes.iter().map(|n| (n.id.as_str(), n.z)).collect();
        assert_eq!(order, vec![("zc", 1), ("zb", 2), ("za", 3)]);
    }

    #[test]
    fn themes_cycle_and_touch_all_edges() {
        let mut ed = Editor::default();
        ed.load_sample();
        assert_eq!(ed.apply_theme().map(|p| p.name), Some("North"));
        let doc = ed.document();
        assert_eq!(doc.nodes[0].shape_style.fill, THEME_PRESETS[0].fills[0]);
        assert_eq!(doc.nodes[1].shape_style.fill, THEME_PRESETS[0].fills[1]);
        assert!(doc.edges.iter().all(|e| e.style.stroke == THEME_PRESETS[0].edge));

        ed.select_nodes(ids(&["n2"]));
        assert_eq!(ed.apply_theme().map(|p| p.name), Some("Sunset"));
        let n2 = ed.document().node(NodeId::intern("n2")).unwrap();
        assert_eq!(n2.shape_style.fill, THEME_PRESETS[1].fills[0]);
        let n1 = ed.document().node(NodeId::intern("n1")).unwrap();
        assert_eq!(n1.shape_style.fill, THEME_PRESETS[0].fills[0]);
        assert_eq!(ed.apply_theme().map(|p| p.name), Some("Forest"));
        assert_eq!(ed.apply_theme().map(|p| p.name), Some("North"));
    }

    #[test]
    fn auto_arrange_lays_out_left_to_right() {
        let mut ed = editor_with(&[
            ("ra", 300.0, 0.0, 100.0, 40.0),
            ("rb", 0.0, 100.0, 100.0, 40.0),
        ]);
        assert!(ed.auto_arrange());
        // mean centre y = (20 + 120) / 2 = 70
        assert_eq!(pos(&ed, "rb"), (0.0, 50.0));
        assert_eq!(pos(&ed, "ra"), (170.0, 60.0));
    }

    #[test]
    fn node_properties_are_clamped() {
        let mut ed = editor_with(&[("pa", 0.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["pa"]));
        ed.set_node_property(NodeProperty::FontSize(200.0));
        ed.set_node_property(NodeProperty::StrokeWidth(0.0));
        ed.set_node_property(NodeProperty::Width(5.0));
        ed.set_node_property(NodeProperty::Radius(f64::NAN));
        ed.set_node_property(NodeProperty::Text("Hello".into()));
        let n = ed.document().node(NodeId::intern("pa")).unwrap();
        assert_eq!(n.text_style.font_size, 72.0);
        assert_eq!(n.shape_style.stroke_width, 1.0);
        assert_eq!(n.w, 40.0);
        assert_eq!(n.shape_style.radius, 0.0);
        assert_eq!(n.text, "Hello");
        assert_eq!(ed.history().undo_len(), 4, "NaN radius leaves no entry");
    }

    #[test]
    fn node_property_needs_single_selection() {
        let mut ed = editor_with(&[("pb", 0.0, 0.0, 100.0, 50.0), ("pc", 0.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["pb", "pc"]));
        assert!(!ed.set_node_property(NodeProperty::Bold(true)));
    }

    #[test]
    fn edge_properties_are_clamped() {
        let mut ed = Editor::default();
        ed.load_sample();
        let e1 = flow_core::id::EdgeId::intern("e1");
        ed.set_selection(Selection::Edge(e1));
        ed.set_edge_property(EdgeProperty::Width(50.0));
        ed.set_edge_property(EdgeProperty::LabelSize(2.0));
        ed.set_edge_property(EdgeProperty::Route(RouteKind::Curved));
        ed.set_edge_property(EdgeProperty::CornerRadius(-3.0));
        let e = ed.document().edge(e1).unwrap();
        assert_eq!(e.style.width, 12.0);
        assert_eq!(e.label.font_size, 8.0);
        assert_eq!(e.route.kind, RouteKind::Curved);
        assert_eq!(e.route.corner_radius, 0.0);
    }

    #[test]
    fn ungroup_selects_former_members() {
        let mut ed = editor_with(&[("ua", 0.0, 0.0, 100.0, 50.0), ("ub", 200.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["ua", "ub"]));
        ed.group_selection();
        assert!(ed.ungroup_selection());
        assert_eq!(ed.selection().nodes(), ids(&["ua", "ub"]).as_slice());
        assert!(ed.document().groups.is_empty());
    }

    #[test]
    fn renaming_collapsed_group_resizes_frame() {
        let mut ed = editor_with(&[("ga", 0.0, 0.0, 100.0, 50.0), ("gb", 200.0, 0.0, 100.0, 50.0)]);
        ed.select_nodes(ids(&["ga", "gb"]));
        let gid = ed.group_selection().unwrap();
        ed.toggle_group(gid);
        let before = ed.document().group(gid).unwrap().frame.unwrap();
        ed.set_selection(Selection::Group(gid));
        ed.set_group_text(&"A much longer group label".repeat(2));
        let after = ed.document().group(gid).unwrap().frame.unwrap();
        assert!(after.width() > before.width());
    }

    #[test]
    fn quick_add_places_connected_node() {
        let mut ed = editor_with(&[("qa", 0.0, 0.0, 100.0, 60.0)]);
        assert!(ed.open_quick_add(NodeId::intern("qa"), Anchor::Right));
        let id = ed.confirm_quick_add(NodeType::Rectangle).unwrap();
        let n = ed.document().node(id).unwrap();
        // 100 + 80 gap; centred on y = 30 with height 80 → -10
        assert_eq!((n.x, n.y), (180.0, -10.0));
        let edge = &ed.document().edges[0];
        assert_eq!(edge.from, Endpoint::bound(NodeId::intern("qa"), Anchor::Right));
        assert_eq!(edge.to, Endpoint::bound(id, Anchor::Left));
        assert_eq!(ed.selection().nodes(), &[id]);
        assert!(ed.quick_add().is_none());

        ed.undo();
        assert_eq!(ed.document().nodes.len(), 1);
        assert!(ed.document().edges.is_empty());
    }

    #[test]
    fn escape_only_closes_picker() {
        let mut ed = editor_with(&[("qb", 0.0, 0.0, 100.0, 60.0)]);
        ed.select_nodes(ids(&["qb"]));
        ed.open_quick_add(NodeId::intern("qb"), Anchor::Bottom);
        ed.key_down("Escape", crate::input::Modifiers::NONE);
        assert!(ed.quick_add().is_none());
        assert_eq!(ed.selection().nodes(), ids(&["qb"]).as_slice());
        assert_eq!(ed.confirm_quick_add(NodeType::Oval), None);
    }
}
