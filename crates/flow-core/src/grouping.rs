//! Node groups: creation, collapse/expand, frames, and the connectable
//! abstraction that lets a collapsed group stand in for its members.
//!
//! A collapsed group hides its members; anything that needs to draw,
//! hit-test, or connect to a member goes through [`Connectable`] and gets
//! the group's frame instead.

use crate::config::EditorConfig;
use crate::geometry::{align_rect_outward, anchor_point, snap};
use crate::id::{GroupId, NodeId};
use crate::model::{Anchor, Document, Group, Node, Selection};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashSet;

// ─── Visibility ──────────────────────────────────────────────────────────

/// The collapsed group hiding `node`, if any.
pub fn collapsed_group_of(doc: &Document, node: NodeId) -> Option<&Group> {
    doc.group_of(node).filter(|g| g.collapsed)
}

/// A node is visible unless it belongs to a collapsed group.
pub fn is_node_visible(doc: &Document, node: NodeId) -> bool {
    collapsed_group_of(doc, node).is_none()
}

/// Visible nodes in paint order.
pub fn visible_nodes(doc: &Document) -> impl Iterator<Item = &Node> {
    doc.nodes.iter().filter(|n| is_node_visible(doc, n.id))
}

// ─── Frames ──────────────────────────────────────────────────────────────

fn member_bounds(doc: &Document, group: &Group) -> Option<Rect> {
    group
        .members
        .iter()
        .filter_map(|id| doc.node(*id))
        .map(Node::rect)
        .reduce(|a, b| a.union(b))
}

/// Frame drawn around an expanded group: member bounds plus padding,
/// grown outward to the grid. Derived on demand, never stored.
pub fn expanded_frame(doc: &Document, group: &Group, config: &EditorConfig) -> Option<Rect> {
    let bounds = member_bounds(doc, group)?;
    let padded = bounds.inflate(config.group_padding, config.group_padding);
    Some(align_rect_outward(padded, config.grid_size))
}

/// Compact size for a collapsed group, estimated from its label length.
pub fn estimate_collapsed_size(text: &str, config: &EditorConfig) -> Size {
    let chars = text.trim().chars().count() as f64;
    let grid = config.grid_size.max(1.0);
    let w = (7.5 * chars + 40.0).clamp(config.collapsed_min_width, config.collapsed_max_width);
    let h = 44.0_f64.clamp(config.collapsed_min_height, config.collapsed_max_height);
    Size::new(
        ((w / grid).ceil() * grid).min(config.collapsed_max_width.max(config.collapsed_min_width)),
        ((h / grid).ceil() * grid).min(config.collapsed_max_height.max(config.collapsed_min_height)),
    )
}

fn within_ratio(actual: f64, estimate: f64, ratio: f64) -> bool {
    actual <= estimate * ratio && actual * ratio >= estimate
}

/// Frame a group would take if collapsed now. Reuses the persisted frame
/// while its size stays within the hysteresis ratio of the estimate.
pub fn collapsed_frame(doc: &Document, group: &Group, config: &EditorConfig) -> Option<Rect> {
    let estimate = estimate_collapsed_size(&group.text, config);
    if let Some(frame) = group.frame
        && within_ratio(frame.width(), estimate.width, config.collapse_hysteresis)
        && within_ratio(frame.height(), estimate.height, config.collapse_hysteresis)
    {
        return Some(frame);
    }
    let center = expanded_frame(doc, group, config)?.center();
    let x0 = snap(center.x - estimate.width / 2.0, config.grid_size);
    let y0 = snap(center.y - estimate.height / 2.0, config.grid_size);
    Some(Rect::from_origin_size((x0, y0), estimate))
}

/// The frame currently shown for `group`: the persisted frame when
/// collapsed, the derived padded bounds when expanded.
pub fn group_frame(doc: &Document, group: &Group, config: &EditorConfig) -> Option<Rect> {
    if group.collapsed {
        group.frame.or_else(|| collapsed_frame(doc, group, config))
    } else {
        expanded_frame(doc, group, config)
    }
}

/// Collapse/expand toggle button at the frame's top-right corner.
pub fn toggle_button_rect(frame: Rect) -> Rect {
    const SIZE: f64 = 16.0;
    Rect::new(frame.x1 - SIZE - 4.0, frame.y0 + 4.0, frame.x1 - 4.0, frame.y0 + 4.0 + SIZE)
}

// ─── Structure ───────────────────────────────────────────────────────────

/// Group at least two existing, ungrouped nodes. Returns the new group id,
/// or `None` when the preconditions fail.
pub fn create_group(doc: &mut Document, nodes: &[NodeId]) -> Option<GroupId> {
    let mut seen = HashSet::new();
    let members: Vec<NodeId> = nodes.iter().copied().filter(|id| seen.insert(*id)).collect();
    if members.len() < 2 {
        return None;
    }
    if members.iter().any(|id| doc.node(*id).is_none() || doc.group_of(*id).is_some()) {
        return None;
    }
    let id = doc.fresh_group_id();
    log::debug!("created group {id} with {} members", members.len());
    doc.groups.push(Group::new(id, members));
    Some(id)
}

/// Dissolve a group explicitly; members stay where they are.
pub fn ungroup(doc: &mut Document, id: GroupId) -> bool {
    doc.remove_group(id)
}

/// Collapse a group, persisting its compact frame and removing its
/// members from `selection`.
pub fn collapse(
    doc: &mut Document,
    id: GroupId,
    config: &EditorConfig,
    selection: &mut Selection,
) -> bool {
    let Some(group) = doc.group(id) else {
        return false;
    };
    if group.collapsed {
        return false;
    }
    let Some(frame) = collapsed_frame(doc, group, config) else {
        return false;
    };
    if let Some(group) = doc.group_mut(id) {
        group.collapsed = true;
        group.frame = Some(frame);
    }
    selection.retain_valid(doc);
    true
}

/// Expand a group. The persisted frame is kept for the next collapse.
pub fn expand(doc: &mut Document, id: GroupId) -> bool {
    match doc.group_mut(id) {
        Some(group) if group.collapsed => {
            group.collapsed = false;
            true
        }
        _ => false,
    }
}

pub fn toggle_collapse(
    doc: &mut Document,
    id: GroupId,
    config: &EditorConfig,
    selection: &mut Selection,
) -> bool {
    match doc.group(id).map(|g| g.collapsed) {
        Some(true) => expand(doc, id),
        Some(false) => collapse(doc, id, config, selection),
        None => false,
    }
}

// ─── Translation ─────────────────────────────────────────────────────────

/// Positions captured when a group drag starts.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOrigin {
    pub group: GroupId,
    pub members: Vec<(NodeId, Point)>,
    pub frame: Option<Rect>,
}

impl GroupOrigin {
    pub fn capture(doc: &Document, id: GroupId) -> Option<Self> {
        let group = doc.group(id)?;
        let members = group
            .members
            .iter()
            .filter_map(|m| doc.node(*m))
            .map(|n| (n.id, Point::new(n.x, n.y)))
            .collect();
        Some(Self {
            group: id,
            members,
            frame: group.frame,
        })
    }

    /// Place the frame and every member at origin + `delta`.
    pub fn apply(&self, doc: &mut Document, delta: Vec2) {
        for (id, origin) in &self.members {
            if let Some(node) = doc.node_mut(*id) {
                node.x = origin.x + delta.x;
                node.y = origin.y + delta.y;
            }
        }
        if let Some(group) = doc.group_mut(self.group) {
            group.frame = self.frame.map(|f| f + delta);
        }
    }
}

/// Translate a group and its members by `delta`.
pub fn translate_group(doc: &mut Document, id: GroupId, delta: Vec2) -> bool {
    let Some(origin) = GroupOrigin::capture(doc, id) else {
        return false;
    };
    origin.apply(doc, delta);
    true
}

// ─── Connectable ─────────────────────────────────────────────────────────

/// Something a connector endpoint can visually attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectable {
    Node(NodeId),
    CollapsedGroup(GroupId),
}

impl Connectable {
    /// What `node` currently presents as: itself, or its collapsed group.
    pub fn for_node(doc: &Document, node: NodeId) -> Option<Self> {
        doc.node(node)?;
        Some(match collapsed_group_of(doc, node) {
            Some(group) => Connectable::CollapsedGroup(group.id),
            None => Connectable::Node(node),
        })
    }

    pub fn rect(&self, doc: &Document, config: &EditorConfig) -> Option<Rect> {
        match *self {
            Connectable::Node(id) => doc.node(id).map(Node::rect),
            Connectable::CollapsedGroup(id) => {
                let group = doc.group(id)?;
                group_frame(doc, group, config)
            }
        }
    }

    pub fn anchor_point(
        &self,
        doc: &Document,
        config: &EditorConfig,
        anchor: Anchor,
    ) -> Option<Point> {
        self.rect(doc, config).map(|r| anchor_point(r, anchor))
    }
}

/// The member of a group whose centre is closest to `p`.
pub fn representative_member(doc: &Document, group: &Group, p: Point) -> Option<NodeId> {
    group
        .members
        .iter()
        .filter_map(|id| doc.node(*id))
        .min_by(|a, b| {
            a.center()
                .distance_squared(p)
                .total_cmp(&b.center().distance_squared(p))
        })
        .map(|n| n.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;
    use pretty_assertions::assert_eq;

    fn two_node_doc() -> Document {
        let mut doc = Document::new();
        let mut a = Node::new(NodeId::intern("ga"), NodeType::Rectangle, 0.0, 0.0);
        a.w = 100.0;
        a.h = 50.0;
        let mut b = Node::new(NodeId::intern("gb"), NodeType::Rectangle, 300.0, 0.0);
        b.w = 100.0;
        b.h = 50.0;
        doc.push_on_top(a);
        doc.push_on_top(b);
        doc
    }

    fn ab() -> [NodeId; 2] {
        [NodeId::intern("ga"), NodeId::intern("gb")]
    }

    #[test]
    fn create_requires_two_ungrouped_nodes() {
        let mut doc = two_node_doc();
        assert_eq!(create_group(&mut doc, &[NodeId::intern("ga")]), None);
        assert_eq!(create_group(&mut doc, &[NodeId::intern("ga"), NodeId::intern("ga")]), None);
        let id = create_group(&mut doc, &ab()).unwrap();
        assert_eq!(doc.group(id).unwrap().members.len(), 2);
        assert_eq!(create_group(&mut doc, &ab()), None, "already grouped");
    }

    #[test]
    fn create_collapses_repeated_ids() {
        let mut doc = two_node_doc();
        let [a, b] = ab();
        let id = create_group(&mut doc, &[a, b, a, b, a]).unwrap();
        assert_eq!(doc.group(id).unwrap().members.as_slice(), &[a, b]);
    }

    #[test]
    fn expanded_frame_pads_and_aligns() {
        let mut doc = two_node_doc();
        let id = create_group(&mut doc, &ab()).unwrap();
        let config = EditorConfig::default();
        let frame = expanded_frame(&doc, doc.group(id).unwrap(), &config).unwrap();
        assert_eq!(frame, Rect::new(-20.0, -20.0, 420.0, 70.0));
    }

    #[test]
    fn collapse_hides_members_and_clears_selection() {
        let mut doc = two_node_doc();
        let config = EditorConfig::default();
        let id = create_group(&mut doc, &ab()).unwrap();
        let mut sel = Selection::Nodes(ab().to_vec());
        assert!(collapse(&mut doc, id, &config, &mut sel));
        assert!(sel.is_empty());
        assert!(!is_node_visible(&doc, NodeId::intern("ga")));
        let frame = doc.group(id).unwrap().frame.unwrap();
        assert!(frame.width() >= 72.0 && frame.height() >= 30.0);
        assert_eq!(visible_nodes(&doc).count(), 0);
    }

    #[test]
    fn recollapse_reuses_frame_within_hysteresis() {
        let mut doc = two_node_doc();
        let config = EditorConfig::default();
        let id = create_group(&mut doc, &ab()).unwrap();
        let mut sel = Selection::Empty;
        collapse(&mut doc, id, &config, &mut sel);
        let moved = doc.group(id).unwrap().frame.unwrap() + Vec2::new(500.0, 500.0);
        doc.group_mut(id).unwrap().frame = Some(moved);
        expand(&mut doc, id);
        assert_eq!(doc.group(id).unwrap().frame, Some(moved), "expand keeps frame");
        collapse(&mut doc, id, &config, &mut sel);
        assert_eq!(doc.group(id).unwrap().frame, Some(moved));
    }

    #[test]
    fn recollapse_recomputes_oversized_frame() {
        let mut doc = two_node_doc();
        let config = EditorConfig::default();
        let id = create_group(&mut doc, &ab()).unwrap();
        doc.group_mut(id).unwrap().frame = Some(Rect::new(0.0, 0.0, 1000.0, 1000.0));
        let mut sel = Selection::Empty;
        collapse(&mut doc, id, &config, &mut sel);
        let frame = doc.group(id).unwrap().frame.unwrap();
        assert!(frame.width() <= config.collapsed_max_width);
    }

    #[test]
    fn estimate_respects_bounds() {
        let config = EditorConfig::default();
        let tiny = estimate_collapsed_size("", &config);
        assert!(tiny.width >= 72.0 && tiny.height >= 30.0);
        let huge = estimate_collapsed_size(&"x".repeat(500), &config);
        assert_eq!(huge.width, config.collapsed_max_width);
    }

    #[test]
    fn connectable_resolves_to_collapsed_group() {
        let mut doc = two_node_doc();
        let config = EditorConfig::default();
        let id = create_group(&mut doc, &ab()).unwrap();
        let a = NodeId::intern("ga");
        assert_eq!(Connectable::for_node(&doc, a), Some(Connectable::Node(a)));
        collapse(&mut doc, id, &config, &mut Selection::Empty);
        let proxy = Connectable::for_node(&doc, a).unwrap();
        assert_eq!(proxy, Connectable::CollapsedGroup(id));
        assert_eq!(proxy.rect(&doc, &config), doc.group(id).unwrap().frame);
        assert_eq!(Connectable::for_node(&doc, NodeId::intern("nobody")), None);
    }

    #[test]
    fn translate_moves_members_and_frame() {
        let mut doc = two_node_doc();
        let config = EditorConfig::default();
        let id = create_group(&mut doc, &ab()).unwrap();
        collapse(&mut doc, id, &config, &mut Selection::Empty);
        let frame = doc.group(id).unwrap().frame.unwrap();
        assert!(translate_group(&mut doc, id, Vec2::new(10.0, 20.0)));
        assert_eq!(doc.node(NodeId::intern("gb")).unwrap().x, 310.0);
        assert_eq!(doc.group(id).unwrap().frame, Some(frame + Vec2::new(10.0, 20.0)));
    }

    #[test]
    fn representative_is_nearest_member() {
        let mut doc = two_node_doc();
        let id = create_group(&mut doc, &ab()).unwrap();
        let group = doc.group(id).unwrap();
        let near_b = representative_member(&doc, group, Point::new(390.0, 0.0));
        assert_eq!(near_b, Some(NodeId::intern("gb")));
    }
}
