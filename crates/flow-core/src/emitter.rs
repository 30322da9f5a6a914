//! Emitter: Document → flowchart XML.
//!
//! Output is deterministic: document order, fixed attribute order, and
//! shortest round-trip number formatting, so equal documents always
//! serialize to identical bytes.

use crate::model::*;
use crate::xml::escape;
use kurbo::Point;
use std::fmt::Write;

/// Emit a `Document` as a flowchart XML string.
#[must_use]
pub fn emit_document(doc: &Document) -> String {
    let mut out = String::with_capacity(512 + 256 * (doc.nodes.len() + doc.edges.len()));

    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<flowchart version=\"{FORMAT_VERSION}\" app=\"{}\" createdAt=\"{}\">",
        escape(&doc.meta.app),
        escape(&doc.meta.created_at),
    );

    out.push_str("  <nodes>\n");
    for node in &doc.nodes {
        emit_node(&mut out, node);
    }
    out.push_str("  </nodes>\n");

    out.push_str("  <edges>\n");
    for edge in &doc.edges {
        emit_edge(&mut out, edge);
    }
    out.push_str("  </edges>\n");

    out.push_str("  <groups>\n");
    for group in &doc.groups {
        emit_group(&mut out, group);
    }
    out.push_str("  </groups>\n");

    out.push_str("</flowchart>\n");
    log::debug!(
        "emitted {} nodes, {} edges, {} groups",
        doc.nodes.len(),
        doc.edges.len(),
        doc.groups.len()
    );
    out
}

// ─── Elements ────────────────────────────────────────────────────────────

fn emit_node(out: &mut String, node: &Node) {
    let _ = writeln!(
        out,
        "    <node id=\"{}\" type=\"{}\" x=\"{}\" y=\"{}\" w=\"{}\" h=\"{}\" zIndex=\"{}\">",
        escape(node.id.as_str()),
        node.kind.tag(),
        format_num(node.x),
        format_num(node.y),
        format_num(node.w),
        format_num(node.h),
        node.z,
    );
    out.push_str("      <text");
    emit_text_style_attrs(out, &node.text_style);
    let _ = writeln!(out, ">{}</text>", escape(&node.text));
    out.push_str("      <shape");
    emit_shape_style_attrs(out, &node.shape_style);
    out.push_str("/>\n");
    out.push_str("    </node>\n");
}

fn emit_edge(out: &mut String, edge: &Edge) {
    let _ = write!(
        out,
        "    <edge id=\"{}\" from=\"{}\" to=\"{}\" stroke=\"{}\" strokeWidth=\"{}\" dashed=\"{}\" arrow=\"{}\" route=\"{}\" cornerRadius=\"{}\"",
        escape(edge.id.as_str()),
        escape(&format_endpoint(&edge.from)),
        escape(&format_endpoint(&edge.to)),
        edge.style.stroke.to_hex(),
        format_num(edge.style.width),
        format_bool(edge.style.dashed),
        format_bool(edge.style.arrow),
        edge.route.kind.as_str(),
        format_num(edge.route.corner_radius),
    );
    if let Some(bend) = edge.route.bend {
        let _ = write!(out, " bend=\"{}\"", format_num(bend));
    }
    if let Some(control) = edge.route.control {
        let _ = write!(out, " control=\"{}\"", format_point(control));
    }
    out.push_str(">\n");
    let label = &edge.label;
    let _ = writeln!(
        out,
        "      <label fontSize=\"{}\" color=\"{}\" offsetX=\"{}\" offsetY=\"{}\">{}</label>",
        format_num(label.font_size),
        label.color.to_hex(),
        format_num(label.offset.x),
        format_num(label.offset.y),
        escape(&label.text),
    );
    out.push_str("    </edge>\n");
}

fn emit_group(out: &mut String, group: &Group) {
    let members: Vec<&str> = group.members.iter().map(|m| m.as_str()).collect();
    let _ = write!(
        out,
        "    <group id=\"{}\" members=\"{}\" collapsed=\"{}\"",
        escape(group.id.as_str()),
        escape(&members.join(",")),
        format_bool(group.collapsed),
    );
    if let Some(frame) = group.frame {
        let _ = write!(
            out,
            " frame=\"{},{},{},{}\"",
            format_num(frame.x0),
            format_num(frame.y0),
            format_num(frame.width()),
            format_num(frame.height()),
        );
    }
    let _ = write!(out, " type=\"{}\"", group.kind.tag());
    emit_shape_style_attrs(out, &group.shape_style);
    emit_text_style_attrs(out, &group.text_style);
    let _ = writeln!(out, ">{}</group>", escape(&group.text));
}

fn emit_text_style_attrs(out: &mut String, style: &TextStyle) {
    let _ = write!(
        out,
        " fontFamily=\"{}\" fontSize=\"{}\" color=\"{}\" bold=\"{}\" italic=\"{}\" align=\"{}\"",
        escape(&style.font_family),
        format_num(style.font_size),
        style.color.to_hex(),
        format_bool(style.bold),
        format_bool(style.italic),
        style.align.as_str(),
    );
}

fn emit_shape_style_attrs(out: &mut String, style: &ShapeStyle) {
    let _ = write!(
        out,
        " fill=\"{}\" stroke=\"{}\" strokeWidth=\"{}\" radius=\"{}\"",
        style.fill.to_hex(),
        style.stroke.to_hex(),
        format_num(style.stroke_width),
        format_num(style.radius),
    );
}

// ─── Value formatting ────────────────────────────────────────────────────

/// `nodeId:anchor` for bound endpoints, `x,y` for free ones.
pub fn format_endpoint(endpoint: &Endpoint) -> String {
    match endpoint {
        Endpoint::Bound { node, anchor } => format!("{}:{}", node.as_str(), anchor.as_str()),
        Endpoint::Free(p) => format_point(*p),
    }
}

fn format_point(p: Point) -> String {
    format!("{},{}", format_num(p.x), format_num(p.y))
}

fn format_bool(b: bool) -> &'static str {
    if b { "1" } else { "0" }
}

/// Integers print without a fraction; everything else uses the shortest
/// representation that parses back to the same value.
pub fn format_num(n: f64) -> String {
    if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{EdgeId, GroupId, NodeId};
    use kurbo::Rect;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_num_is_exact() {
        assert_eq!(format_num(180.0), "180");
        assert_eq!(format_num(-0.0), "0");
        assert_eq!(format_num(12.5), "12.5");
        assert_eq!(format_num(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn endpoint_forms() {
        let bound = Endpoint::bound(NodeId::intern("a"), Anchor::Top);
        assert_eq!(format_endpoint(&bound), "a:top");
        assert_eq!(format_endpoint(&Endpoint::Free(Point::new(10.0, -20.5))), "10,-20.5");
    }

    #[test]
    fn emits_nodes_edges_and_groups() {
        let mut doc = sample_document();
        doc.meta.created_at = "2024-01-01T00:00:00.000Z".into();
        let mut group = Group::new(GroupId::intern("g1"), [NodeId::intern("n1"), NodeId::intern("n2")]);
        group.collapsed = true;
        group.frame = Some(Rect::new(100.0, 100.0, 180.0, 150.0));
        doc.groups.push(group);
        doc.edges[0].route.bend = Some(260.0);

        let xml = emit_document(&doc);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<flowchart version=\"1.1\""));
        assert!(xml.contains("createdAt=\"2024-01-01T00:00:00.000Z\""));
        assert!(xml.contains(
            "<node id=\"n1\" type=\"rectangle\" x=\"80\" y=\"120\" w=\"180\" h=\"80\" zIndex=\"1\">"
        ));
        assert!(xml.contains("from=\"n1:right\" to=\"n2:left\""));
        assert!(xml.contains("route=\"orthogonal\" cornerRadius=\"0\" bend=\"260\">"));
        assert!(xml.contains(">Yes</label>"));
        assert!(xml.contains(
            "<group id=\"g1\" members=\"n1,n2\" collapsed=\"1\" frame=\"100,100,80,50\" type=\"subprocess\""
        ));
    }

    #[test]
    fn text_is_escaped() {
        let mut doc = Document::new();
        let mut node = Node::new(NodeId::intern("esc"), NodeType::Note, 0.0, 0.0);
        node.text = "a < b & \"c\"".into();
        doc.push_on_top(node);
        let mut edge = Edge::new(
            EdgeId::intern("esc_e"),
            Endpoint::bound(NodeId::intern("esc"), Anchor::Right),
            Endpoint::Free(Point::new(1.0, 2.0)),
        );
        edge.label.text = "<yes>".into();
        doc.edges.push(edge);
        let xml = emit_document(&doc);
        assert!(xml.contains(">a &lt; b &amp; &quot;c&quot;</text>"));
        assert!(xml.contains(">&lt;yes&gt;</label>"));
        assert!(xml.contains("to=\"1,2\""));
    }

    #[test]
    fn emission_is_deterministic() {
        let doc = sample_document();
        assert_eq!(emit_document(&doc), emit_document(&doc));
    }
}
