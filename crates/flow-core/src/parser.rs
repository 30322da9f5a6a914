//! Parser for flowchart XML → Document.
//!
//! Validation is all-or-nothing: the first structural problem aborts the
//! import with an [`ImportError`] and no document is produced. Value-level
//! problems (unparsable numbers, bad colors) fall back to defaults and are
//! then clamped by [`normalize`].

use crate::config::EditorConfig;
use crate::error::ImportError;
use crate::id::{EdgeId, GroupId, NodeId};
use crate::model::*;
use crate::normalize::normalize;
use crate::xml::{Element, parse_xml};
use kurbo::{Point, Rect, Vec2};
use std::collections::HashSet;

/// Format versions this parser understands.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["1.0", "1.1"];

/// Parse and normalize a flowchart XML document with default settings.
#[must_use = "parsing result should be used"]
pub fn parse_document(input: &str) -> Result<Document, ImportError> {
    parse_document_with(input, &EditorConfig::default())
}

/// Parse and normalize a flowchart XML document.
pub fn parse_document_with(input: &str, config: &EditorConfig) -> Result<Document, ImportError> {
    let result = parse_inner(input, config);
    match &result {
        Ok(doc) => log::debug!(
            "imported {} nodes, {} edges, {} groups",
            doc.nodes.len(),
            doc.edges.len(),
            doc.groups.len()
        ),
        Err(e) => log::warn!("import failed: {e}"),
    }
    result
}

fn parse_inner(input: &str, config: &EditorConfig) -> Result<Document, ImportError> {
    let root = parse_xml(input)?;
    if root.name != "flowchart" {
        return Err(ImportError::MissingRoot(root.name));
    }
    if let Some(version) = root.attr("version")
        && !SUPPORTED_VERSIONS.contains(&version.trim())
    {
        return Err(ImportError::UnsupportedVersion(version.to_string()));
    }

    let mut doc = Document::new();
    if let Some(created) = root.attr("createdAt").filter(|s| !s.trim().is_empty()) {
        doc.meta.created_at = created.to_string();
    }
    if let Some(app) = root.attr("app").filter(|s| !s.trim().is_empty()) {
        doc.meta.app = app.to_string();
    }

    let nodes = parse_nodes(&root)?;
    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    doc.edges = parse_edges(&root, &node_ids)?;
    doc.groups = parse_groups(&root, &node_ids)?;
    doc.nodes = nodes;

    normalize(&mut doc, config);
    Ok(doc)
}

// ─── Sections ────────────────────────────────────────────────────────────

fn section<'a>(root: &'a Element, name: &'a str, item: &'a str) -> impl Iterator<Item = &'a Element> {
    root.child(name)
        .into_iter()
        .flat_map(move |s| s.children_named(item))
}

/// Endpoints are written `id:anchor` and group members as a comma list,
/// so ids may contain neither separator.
const RESERVED_ID_CHARS: [char; 2] = [':', ','];

fn required_id<'a>(el: &'a Element, kind: &'static str, index: usize) -> Result<&'a str, ImportError> {
    let id = el
        .attr("id")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ImportError::MissingId { kind, index })?;
    if id.contains(RESERVED_ID_CHARS) {
        return Err(ImportError::InvalidId { kind, id: id.to_string() });
    }
    Ok(id)
}

fn parse_nodes(root: &Element) -> Result<Vec<Node>, ImportError> {
    let mut seen = HashSet::new();
    let mut staged: Vec<(f64, Node)> = Vec::new();

    for (index, el) in section(root, "nodes", "node").enumerate() {
        let id = required_id(el, "node", index)?;
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId { kind: "node", id: id.to_string() });
        }
        let tag = el.attr("type").unwrap_or("").trim();
        let kind = NodeType::from_tag(tag).ok_or_else(|| ImportError::UnsupportedNodeType {
            id: id.to_string(),
            tag: tag.to_string(),
        })?;

        let mut node = Node::new(NodeId::intern(id), kind, 0.0, 0.0);
        node.x = num_attr(el, "x", 0.0);
        node.y = num_attr(el, "y", 0.0);
        node.w = num_attr(el, "w", node.w);
        node.h = num_attr(el, "h", node.h);
        let z = num_attr(el, "zIndex", index as f64 + 1.0);

        if let Some(text) = el.child("text") {
            node.text = text.text.clone();
            node.text_style = text_style(text);
        }
        if let Some(shape) = el.child("shape") {
            node.shape_style = shape_style(shape, node.shape_style);
        }
        staged.push((z, node));
    }

    // Order by stored z before dense renumbering.
    staged.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(staged
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut node))| {
            node.z = i as u32 + 1;
            node
        })
        .collect())
}

fn parse_edges(root: &Element, node_ids: &HashSet<&str>) -> Result<Vec<Edge>, ImportError> {
    let mut seen = HashSet::new();
    let mut edges = Vec::new();

    for (index, el) in section(root, "edges", "edge").enumerate() {
        let id = required_id(el, "edge", index)?;
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId { kind: "edge", id: id.to_string() });
        }
        let from = endpoint(el, id, "from", node_ids)?;
        let to = endpoint(el, id, "to", node_ids)?;
        let mut edge = Edge::new(EdgeId::intern(id), from, to);

        let defaults = EdgeStyle::default();
        edge.style = EdgeStyle {
            stroke: color_attr(el, "stroke", defaults.stroke),
            width: num_attr(el, "strokeWidth", defaults.width),
            dashed: bool_attr(el, "dashed", defaults.dashed),
            arrow: bool_attr(el, "arrow", defaults.arrow),
        };

        let owner = || format!("edge '{id}'");
        edge.route.kind = el
            .attr("route")
            .and_then(|r| RouteKind::from_tag(r.trim()))
            .unwrap_or_default();
        edge.route.corner_radius = num_attr(el, "cornerRadius", 0.0);
        if let Some(raw) = el.attr("bend") {
            let bend = raw.trim().parse::<f64>().ok().filter(|b| b.is_finite());
            edge.route.bend = Some(bend.ok_or_else(|| ImportError::MalformedAttribute {
                owner: owner(),
                attr: "bend",
                value: raw.to_string(),
            })?);
        }
        if let Some(raw) = el.attr("control") {
            edge.route.control = Some(parse_pair(raw).ok_or_else(|| ImportError::MalformedAttribute {
                owner: owner(),
                attr: "control",
                value: raw.to_string(),
            })?);
        }

        if let Some(label) = el.child("label") {
            let defaults = EdgeLabel::default();
            edge.label = EdgeLabel {
                text: label.text.clone(),
                font_size: num_attr(label, "fontSize", defaults.font_size),
                color: color_attr(label, "color", defaults.color),
                offset: Vec2::new(num_attr(label, "offsetX", 0.0), num_attr(label, "offsetY", 0.0)),
            };
        }
        edges.push(edge);
    }
    Ok(edges)
}

fn parse_groups(root: &Element, node_ids: &HashSet<&str>) -> Result<Vec<Group>, ImportError> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();

    for (index, el) in section(root, "groups", "group").enumerate() {
        let id = required_id(el, "group", index)?;
        if !seen.insert(id) {
            return Err(ImportError::DuplicateId { kind: "group", id: id.to_string() });
        }
        let mut members = Vec::new();
        for member in el.attr("members").unwrap_or("").split(',').map(str::trim) {
            if member.is_empty() {
                continue;
            }
            if !node_ids.contains(member) {
                return Err(ImportError::DanglingReference {
                    owner: format!("group '{id}'"),
                    node: member.to_string(),
                });
            }
            members.push(NodeId::intern(member));
        }

        let mut group = Group::new(GroupId::intern(id), members);
        group.collapsed = bool_attr(el, "collapsed", false);
        if let Some(raw) = el.attr("frame") {
            group.frame = Some(parse_frame(raw).ok_or_else(|| ImportError::MalformedAttribute {
                owner: format!("group '{id}'"),
                attr: "frame",
                value: raw.to_string(),
            })?);
        }
        if let Some(kind) = el.attr("type").and_then(|t| NodeType::from_tag(t.trim())) {
            group.kind = kind;
        }
        group.text = el.text.clone();
        group.text_style = text_style(el);
        group.shape_style = shape_style(el, group.kind.default_shape_style());
        groups.push(group);
    }
    Ok(groups)
}

// ─── Attribute helpers ───────────────────────────────────────────────────

fn endpoint(
    el: &Element,
    edge: &str,
    side: &'static str,
    node_ids: &HashSet<&str>,
) -> Result<Endpoint, ImportError> {
    let raw = el.attr(side).unwrap_or("").trim();
    let malformed = || ImportError::MalformedEndpoint {
        edge: edge.to_string(),
        side,
        value: raw.to_string(),
    };
    if raw.contains(':') {
        let mut parts = raw.split(':');
        let (Some(node), Some(anchor), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(malformed());
        };
        if node.is_empty() {
            return Err(malformed());
        }
        if !node_ids.contains(node) {
            return Err(ImportError::DanglingReference {
                owner: format!("edge '{edge}'"),
                node: node.to_string(),
            });
        }
        return Ok(Endpoint::bound(NodeId::intern(node), Anchor::parse(anchor)));
    }
    parse_pair(raw).map(Endpoint::Free).ok_or_else(malformed)
}

fn parse_numbers<const N: usize>(raw: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = raw.split(',');
    for slot in &mut out {
        let v = parts.next()?.trim().parse::<f64>().ok()?;
        if !v.is_finite() {
            return None;
        }
        *slot = v;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// `"x,y"` → point.
fn parse_pair(raw: &str) -> Option<Point> {
    parse_numbers::<2>(raw).map(|[x, y]| Point::new(x, y))
}

/// `"x,y,w,h"` → rect with non-negative size.
fn parse_frame(raw: &str) -> Option<Rect> {
    let [x, y, w, h] = parse_numbers::<4>(raw)?;
    if w < 0.0 || h < 0.0 {
        return None;
    }
    Some(Rect::new(x, y, x + w, y + h))
}

fn num_attr(el: &Element, key: &str, default: f64) -> f64 {
    el.attr(key)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// `"1"`/`"true"` are true, any other present value is false.
fn bool_attr(el: &Element, key: &str, default: bool) -> bool {
    match el.attr(key) {
        Some(v) => {
            let v = v.trim();
            v == "1" || v.eq_ignore_ascii_case("true")
        }
        None => default,
    }
}

fn color_attr(el: &Element, key: &str, default: Color) -> Color {
    el.attr(key).map_or(default, |v| Color::sanitize(v, default))
}

fn text_style(el: &Element) -> TextStyle {
    let defaults = TextStyle::default();
    TextStyle {
        font_family: el
            .attr("fontFamily")
            .filter(|f| !f.trim().is_empty())
            .map_or(defaults.font_family, str::to_string),
        font_size: num_attr(el, "fontSize", defaults.font_size),
        color: color_attr(el, "color", defaults.color),
        bold: bool_attr(el, "bold", defaults.bold),
        italic: bool_attr(el, "italic", defaults.italic),
        align: el.attr("align").map_or(defaults.align, |a| TextAlign::parse(a.trim())),
    }
}

fn shape_style(el: &Element, defaults: ShapeStyle) -> ShapeStyle {
    ShapeStyle {
        fill: color_attr(el, "fill", defaults.fill),
        stroke: color_attr(el, "stroke", defaults.stroke),
        stroke_width: num_attr(el, "strokeWidth", defaults.stroke_width),
        radius: num_attr(el, "radius", defaults.radius),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn wrap(body: &str) -> String {
        format!("<?xml version=\"1.0\"?>\n<flowchart version=\"1.1\" app=\"t\" createdAt=\"2024-01-01T00:00:00Z\">{body}</flowchart>")
    }

    const TWO_NODES: &str = r##"<nodes>
        <node id="a" type="rectangle" x="0" y="0" w="100" h="50" zIndex="2"><text>A</text><shape fill="#ff0000"/></node>
        <node id="b" type="elmas" x="300" y="0" w="100" h="50" zIndex="1"/>
    </nodes>"##;

    #[test]
    fn parses_nodes_edges_and_groups() {
        let xml = wrap(&format!(
            r##"{TWO_NODES}
            <edges><edge id="e" from="a:right" to="b:left" route="curved" control="150,60" dashed="true"><label offsetX="4" offsetY="-2">go</label></edge></edges>
            <groups><group id="g" members="a, b" collapsed="1" frame="100,100,80,50">Both</group></groups>"##
        ));
        let doc = parse_document(&xml).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].id.as_str(), "b", "ordered by zIndex");
        assert_eq!(doc.nodes[0].kind, NodeType::Diamond);
        let a = doc.node(NodeId::intern("a")).unwrap();
        assert_eq!(a.text, "A");
        assert_eq!(a.shape_style.fill, Color::rgb(0xFF, 0, 0));
        assert_eq!(a.z, 2);

        let e = &doc.edges[0];
        assert_eq!(e.from, Endpoint::bound(NodeId::intern("a"), Anchor::Right));
        assert_eq!(e.route.kind, RouteKind::Curved);
        assert_eq!(e.route.control, Some(Point::new(150.0, 60.0)));
        assert!(e.style.dashed);
        assert_eq!(e.label.offset, Vec2::new(4.0, -2.0));
        assert_eq!(e.label.text, "go");

        let g = &doc.groups[0];
        assert!(g.collapsed);
        assert_eq!(g.members.len(), 2);
        assert_eq!(g.frame, Some(Rect::new(100.0, 100.0, 180.0, 150.0)));
        assert_eq!(g.text, "Both");
        assert_eq!(doc.meta.created_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn free_endpoints_and_unknown_anchor() {
        let xml = wrap(&format!(
            r#"{TWO_NODES}<edges><edge id="e" from="a:sideways" to="400,20"/></edges>"#
        ));
        let doc = parse_document(&xml).unwrap();
        assert_eq!(doc.edges[0].from.anchor(), Some(Anchor::Right));
        assert_eq!(doc.edges[0].to, Endpoint::Free(Point::new(400.0, 20.0)));
    }

    #[test]
    fn missing_version_is_accepted_and_legacy_version_too() {
        let doc = parse_document("<flowchart><nodes/></flowchart>").unwrap();
        assert!(doc.nodes.is_empty());
        assert!(parse_document(r#"<flowchart version="1.0"></flowchart>"#).is_ok());
    }

    #[test]
    fn rejects_structural_problems() {
        let cases: Vec<(String, fn(&ImportError) -> bool)> = vec![
            ("<graph/>".into(), |e| matches!(e, ImportError::MissingRoot(_))),
            (
                r#"<flowchart version="2.0"/>"#.into(),
                |e| matches!(e, ImportError::UnsupportedVersion(_)),
            ),
            (
                wrap(r#"<nodes><node type="oval"/></nodes>"#),
                |e| matches!(e, ImportError::MissingId { kind: "node", index: 0 }),
            ),
            (
                wrap(r#"<nodes><node id="a" type="oval"/><node id="a" type="oval"/></nodes>"#),
                |e| matches!(e, ImportError::DuplicateId { kind: "node", .. }),
            ),
            (
                wrap(r#"<nodes><node id="a:b" type="oval"/></nodes>"#),
                |e| matches!(e, ImportError::InvalidId { kind: "node", .. }),
            ),
            (
                wrap(r#"<nodes><node id="a,b" type="oval"/></nodes>"#),
                |e| matches!(e, ImportError::InvalidId { kind: "node", .. }),
            ),
            (
                wrap(r#"<nodes><node id="a" type="hexagon"/></nodes>"#),
                |e| matches!(e, ImportError::UnsupportedNodeType { .. }),
            ),
            (
                wrap(&format!(r#"{TWO_NODES}<edges><edge id="e" from="a:right:x" to="b:left"/></edges>"#)),
                |e| matches!(e, ImportError::MalformedEndpoint { side: "from", .. }),
            ),
            (
                wrap(&format!(r#"{TWO_NODES}<edges><edge id="e" from="a:right" to="zz:left"/></edges>"#)),
                |e| matches!(e, ImportError::DanglingReference { .. }),
            ),
            (
                wrap(&format!(r#"{TWO_NODES}<groups><group id="g" members="a,zz"/></groups>"#)),
                |e| matches!(e, ImportError::DanglingReference { .. }),
            ),
            (
                wrap(&format!(r#"{TWO_NODES}<groups><group id="g" members="a,b" frame="1,2,3"/></groups>"#)),
                |e| matches!(e, ImportError::MalformedAttribute { attr: "frame", .. }),
            ),
            ("<flowchart>".into(), |e| matches!(e, ImportError::Syntax(_))),
        ];
        for (xml, check) in cases {
            let err = parse_document(&xml).unwrap_err();
            assert!(check(&err), "unexpected error {err:?} for {xml}");
        }
    }

    #[test]
    fn error_messages_are_descriptive() {
        let xml = wrap(&format!(r#"{TWO_NODES}<edges><edge id="e1" from="a:right" to="ghost:left"/></edges>"#));
        let err = parse_document(&xml).unwrap_err();
        assert_eq!(err.to_string(), "edge 'e1' references missing node 'ghost'");
    }

    #[test]
    fn bad_values_fall_back_and_clamp() {
        let xml = wrap(
            r##"<nodes><node id="a" type="note" x="abc" w="3"><text fontSize="1" color="blue" bold="TRUE">t</text></node></nodes>"##,
        );
        let doc = parse_document(&xml).unwrap();
        let a = &doc.nodes[0];
        assert_eq!(a.x, 0.0);
        assert_eq!(a.w, 40.0);
        assert_eq!(a.h, 90.0);
        assert_eq!(a.text_style.font_size, 8.0);
        assert_eq!(a.text_style.color, TextStyle::default().color);
        assert!(a.text_style.bold);
    }
}
