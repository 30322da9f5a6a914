//! Document normalization.
//!
//! Brings any document into canonical form: sizes and style values
//! clamped to their floors, references resolved, groups disjoint and
//! populated, structural coordinates on the grid, z-indices dense.
//! Applying it twice changes nothing the second time.

use crate::config::EditorConfig;
use crate::geometry::{snap, snap_point};
use crate::grouping::collapsed_frame;
use crate::id::NodeId;
use crate::model::{APP_TAG, Document, Endpoint, FORMAT_VERSION, Meta, ShapeStyle, TextStyle};
use kurbo::{Point, Rect};
use std::collections::HashSet;

pub const MIN_FONT_SIZE: f64 = 8.0;

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value } else { fallback }
}

fn normalize_text_style(style: &mut TextStyle) {
    let fallback = TextStyle::default();
    style.font_size = finite_or(style.font_size, fallback.font_size).max(MIN_FONT_SIZE);
    if style.font_family.trim().is_empty() {
        style.font_family = fallback.font_family;
    }
}

fn normalize_shape_style(style: &mut ShapeStyle) {
    let fallback = ShapeStyle::default();
    style.stroke_width = finite_or(style.stroke_width, fallback.stroke_width).max(1.0);
    style.radius = finite_or(style.radius, fallback.radius).max(0.0);
}

fn snap_rect(rect: Rect, grid: f64) -> Rect {
    let origin = snap_point(rect.origin(), grid);
    let w = snap(rect.width(), grid).max(grid.max(1.0));
    let h = snap(rect.height(), grid).max(grid.max(1.0));
    Rect::new(origin.x, origin.y, origin.x + w, origin.y + h)
}

fn finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Normalize `doc` in place. Returns the number of structural repairs
/// (dropped edges, dropped memberships, dissolved groups).
pub fn normalize(doc: &mut Document, config: &EditorConfig) -> usize {
    let mut repairs = 0;

    // Nodes
    for node in &mut doc.nodes {
        let (w, h) = node.kind.default_size();
        node.x = finite_or(node.x, 0.0);
        node.y = finite_or(node.y, 0.0);
        node.w = finite_or(node.w, w).max(config.min_node_width);
        node.h = finite_or(node.h, h).max(config.min_node_height);
        normalize_text_style(&mut node.text_style);
        normalize_shape_style(&mut node.shape_style);
    }
    doc.normalize_z();

    // Edges
    let node_ids: HashSet<NodeId> = doc.nodes.iter().map(|n| n.id).collect();
    let before = doc.edges.len();
    doc.edges.retain(|e| {
        [e.from, e.to].iter().all(|end| match end.node() {
            Some(id) => node_ids.contains(&id),
            None => true,
        })
    });
    repairs += before - doc.edges.len();
    let grid = config.grid_size;
    for edge in &mut doc.edges {
        for end in [&mut edge.from, &mut edge.to] {
            if let Endpoint::Free(p) = end {
                *p = if finite_point(*p) { snap_point(*p, grid) } else { Point::ZERO };
            }
        }
        edge.style.width = finite_or(edge.style.width, 2.0).max(1.0);
        edge.route.corner_radius = finite_or(edge.route.corner_radius, 0.0).max(0.0);
        edge.route.bend = edge.route.bend.filter(|b| b.is_finite()).map(|b| snap(b, grid));
        edge.route.control = edge
            .route
            .control
            .filter(|p| finite_point(*p))
            .map(|p| snap_point(p, grid));
        edge.label.font_size = finite_or(edge.label.font_size, 12.0).max(MIN_FONT_SIZE);
        if !finite_point(edge.label.offset.to_point()) {
            edge.label.offset = kurbo::Vec2::ZERO;
        }
    }

    // Groups: members must exist, appear once, and belong to one group.
    let mut claimed: HashSet<NodeId> = HashSet::new();
    for group in &mut doc.groups {
        let before = group.members.len();
        group
            .members
            .retain(|m| node_ids.contains(m) && claimed.insert(*m));
        repairs += before - group.members.len();
        normalize_text_style(&mut group.text_style);
        normalize_shape_style(&mut group.shape_style);
        group.frame = group
            .frame
            .filter(|f| finite_point(f.origin()) && f.width().is_finite() && f.height().is_finite())
            .map(|f| snap_rect(f, grid));
    }
    repairs += doc.prune_groups();
    for i in 0..doc.groups.len() {
        let group = &doc.groups[i];
        if group.collapsed && group.frame.is_none() {
            let frame = collapsed_frame(doc, group, config);
            doc.groups[i].frame = frame;
        }
    }

    // Metadata
    if doc.meta.created_at.trim().is_empty() {
        doc.meta.created_at = Meta::now().created_at;
    }
    if doc.meta.app.trim().is_empty() {
        doc.meta.app = APP_TAG.into();
    }
    doc.meta.version = FORMAT_VERSION.into();

    if repairs > 0 {
        log::debug!("normalize: {repairs} structural repair(s)");
    }
    repairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{EdgeId, GroupId};
    use crate::model::*;
    use kurbo::Vec2;
    use pretty_assertions::assert_eq;

    fn messy() -> Document {
        let mut doc = sample_document();
        doc.nodes[0].w = 5.0;
        doc.nodes[0].z = 9;
        doc.nodes[1].text_style.font_size = 2.0;
        doc.nodes[2].shape_style.stroke_width = 0.0;
        doc.nodes[3].shape_style.radius = -3.0;
        doc.edges[0].route.bend = Some(123.0);
        doc.edges[1].route.control = Some(Point::new(11.0, 19.0));
        doc.edges.push(Edge::new(
            EdgeId::intern("dangling"),
            Endpoint::bound(NodeId::intern("n1"), Anchor::Right),
            Endpoint::bound(NodeId::intern("gone"), Anchor::Left),
        ));
        let mut g1 = Group::new(GroupId::intern("g1"), [NodeId::intern("n1"), NodeId::intern("n2")]);
        g1.frame = Some(Rect::new(3.0, 4.0, 90.0, 51.0));
        let g2 = Group::new(GroupId::intern("g2"), [NodeId::intern("n2"), NodeId::intern("n1")]);
        let mut g3 = Group::new(GroupId::intern("g3"), [NodeId::intern("n3"), NodeId::intern("n4")]);
        g3.collapsed = true;
        doc.groups.extend([g1, g2, g3]);
        doc.meta.version = "1.0".into();
        doc
    }

    #[test]
    fn clamps_and_repairs() {
        let mut doc = messy();
        let config = EditorConfig::default();
        let repairs = normalize(&mut doc, &config);

        let n1 = doc.node(NodeId::intern("n1")).unwrap();
        assert_eq!(n1.w, 40.0);
        assert_eq!(doc.node(NodeId::intern("n2")).unwrap().text_style.font_size, 8.0);
        assert_eq!(doc.node(NodeId::intern("n3")).unwrap().shape_style.stroke_width, 1.0);
        assert_eq!(doc.node(NodeId::intern("n4")).unwrap().shape_style.radius, 0.0);
        assert!(doc.edge(EdgeId::intern("dangling")).is_none());
        assert_eq!(doc.edges[0].route.bend, Some(120.0));
        assert_eq!(doc.edges[1].route.control, Some(Point::new(10.0, 20.0)));
        assert_eq!(doc.meta.version, FORMAT_VERSION);

        // g2 loses both members to g1 and dissolves.
        let ids: Vec<&str> = doc.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g3"]);
        assert_eq!(doc.group(GroupId::intern("g1")).unwrap().frame, Some(Rect::new(0.0, 0.0, 90.0, 50.0)));
        assert!(doc.group(GroupId::intern("g3")).unwrap().frame.is_some());
        assert!(repairs >= 3);
    }

    #[test]
    fn z_indices_become_dense() {
        let mut doc = messy();
        normalize(&mut doc, &EditorConfig::default());
        let mut zs: Vec<u32> = doc.nodes.iter().map(|n| n.z).collect();
        zs.sort_unstable();
        assert_eq!(zs, vec![1, 2, 3, 4]);
        assert_eq!(doc.nodes.last().unwrap().id.as_str(), "n1");
    }

    #[test]
    fn normalize_is_idempotent() {
        let config = EditorConfig::default();
        let mut once = messy();
        normalize(&mut once, &config);
        let mut twice = once.clone();
        assert_eq!(normalize(&mut twice, &config), 0);
        assert_eq!(twice, once);
    }

    #[test]
    fn non_finite_values_fall_back() {
        let mut doc = sample_document();
        doc.nodes[0].x = f64::NAN;
        doc.nodes[0].h = f64::INFINITY;
        doc.edges[0].label.offset = Vec2::new(f64::NAN, 1.0);
        normalize(&mut doc, &EditorConfig::default());
        let n1 = doc.node(NodeId::intern("n1")).unwrap();
        assert_eq!(n1.x, 0.0);
        assert_eq!(n1.h, 80.0);
        assert_eq!(doc.edges[0].label.offset, Vec2::ZERO);
    }
}
