//! Core document model for flowcharts.
//!
//! A `Document` owns its nodes, connectors, and groups by value, in
//! insertion order. Every edge endpoint and group member that names a node
//! must resolve inside the same document; stale ids are treated as
//! not-found by every lookup. Nodes are kept ordered by their dense
//! z-index after any reorder, so painting order is the vector order.

use crate::config::{MIN_NODE_HEIGHT, MIN_NODE_WIDTH};
use crate::id::{EdgeId, GroupId, NodeId};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Format version written by the exporter.
pub const FORMAT_VERSION: &str = "1.1";

/// Application tag written into document metadata.
pub const APP_TAG: &str = "FlowchartEditor";

// ─── Colors ──────────────────────────────────────────────────────────────

/// Opaque sRGB color, persisted as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x11, 0x11, 0x11);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#RRGGBB` string (surrounding whitespace ignored).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().strip_prefix('#')?;
        let bytes = hex.as_bytes();
        if bytes.len() != 6 {
            return None;
        }
        let r = hex_val(bytes[0])? << 4 | hex_val(bytes[1])?;
        let g = hex_val(bytes[2])? << 4 | hex_val(bytes[3])?;
        let b = hex_val(bytes[4])? << 4 | hex_val(bytes[5])?;
        Some(Self::rgb(r, g, b))
    }

    /// Parse `hex`, falling back to `fallback` when it is not a valid color.
    pub fn sanitize(hex: &str, fallback: Color) -> Color {
        Self::from_hex(hex).unwrap_or(fallback)
    }

    /// Emit as uppercase `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

// ─── Node types ──────────────────────────────────────────────────────────

/// The closed set of node shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Rectangle,
    Rounded,
    Oval,
    Diamond,
    Parallelogram,
    Cylinder,
    Document,
    Subprocess,
    Note,
}

impl NodeType {
    pub const ALL: [NodeType; 9] = [
        NodeType::Rectangle,
        NodeType::Rounded,
        NodeType::Oval,
        NodeType::Diamond,
        NodeType::Parallelogram,
        NodeType::Cylinder,
        NodeType::Document,
        NodeType::Subprocess,
        NodeType::Note,
    ];

    /// Tag written to the `type` attribute.
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Rectangle => "rectangle",
            NodeType::Rounded => "rounded",
            NodeType::Oval => "oval",
            NodeType::Diamond => "diamond",
            NodeType::Parallelogram => "parallelogram",
            NodeType::Cylinder => "cylinder",
            NodeType::Document => "document",
            NodeType::Subprocess => "subprocess",
            NodeType::Note => "note",
        }
    }

    /// Resolve a `type` attribute. Accepts the canonical tags and the
    /// legacy tags written by 1.0 documents.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "rectangle" | "dikdortgen" => NodeType::Rectangle,
            "rounded" | "yuvarlatilmis" => NodeType::Rounded,
            "oval" => NodeType::Oval,
            "diamond" | "elmas" => NodeType::Diamond,
            "parallelogram" | "paralelkenar" => NodeType::Parallelogram,
            "cylinder" | "silindir" => NodeType::Cylinder,
            "document" | "belge" => NodeType::Document,
            "subprocess" | "altSurec" => NodeType::Subprocess,
            "note" | "not" => NodeType::Note,
            _ => return None,
        };
        Some(kind)
    }

    /// Size of a freshly created node of this type.
    pub fn default_size(self) -> (f64, f64) {
        match self {
            NodeType::Rectangle | NodeType::Rounded | NodeType::Oval => (180.0, 80.0),
            NodeType::Diamond | NodeType::Cylinder => (190.0, 110.0),
            NodeType::Parallelogram => (190.0, 86.0),
            NodeType::Document => (190.0, 95.0),
            NodeType::Subprocess => (200.0, 90.0),
            NodeType::Note => (180.0, 90.0),
        }
    }

    /// Label of a freshly created node of this type.
    pub fn default_label(self) -> &'static str {
        match self {
            NodeType::Diamond => "Decision",
            NodeType::Parallelogram => "Data",
            NodeType::Cylinder => "Database",
            NodeType::Document => "Document",
            NodeType::Subprocess => "Subprocess",
            NodeType::Note => "Note",
            _ => "New block",
        }
    }

    /// Shape style of a freshly created node of this type.
    pub fn default_shape_style(self) -> ShapeStyle {
        let mut style = ShapeStyle::default();
        match self {
            NodeType::Rounded => style.radius = 24.0,
            NodeType::Note => {
                style.fill = Color::rgb(0xFF, 0xF7, 0xCC);
                style.stroke = Color::rgb(0xA1, 0x62, 0x07);
            }
            _ => {}
        }
        style
    }
}

// ─── Styles ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    /// Unknown values fall back to `Center`.
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => TextAlign::Left,
            "right" => TextAlign::Right,
            _ => TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size: f64,
    pub color: Color,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Arial".into(),
            font_size: 14.0,
            color: Color::BLACK,
            bold: false,
            italic: false,
            align: TextAlign::Center,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub radius: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: Color::WHITE,
            stroke: Color::rgb(0x1F, 0x29, 0x37),
            stroke_width: 2.0,
            radius: 10.0,
        }
    }
}

// ─── Nodes ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeType,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Plain text; may encode a formula (see `formula::detect`).
    pub text: String,
    pub text_style: TextStyle,
    pub shape_style: ShapeStyle,
    /// Paint order, dense `1..=N` after any reorder.
    pub z: u32,
}

impl Node {
    /// A node of `kind` at `(x, y)` with the type's default size, label,
    /// and styles. The z-index is left at 1; callers place it on top.
    pub fn new(id: NodeId, kind: NodeType, x: f64, y: f64) -> Self {
        let (w, h) = kind.default_size();
        Self {
            id,
            kind,
            x,
            y,
            w,
            h,
            text: kind.default_label().to_string(),
            text_style: TextStyle::default(),
            shape_style: kind.default_shape_style(),
            z: 1,
        }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Clamp the size up to the minimum node size.
    pub fn enforce_min_size(&mut self) {
        self.w = self.w.max(MIN_NODE_WIDTH);
        self.h = self.h.max(MIN_NODE_HEIGHT);
    }
}

// ─── Anchors & endpoints ─────────────────────────────────────────────────

/// One of the four side midpoints of a node or group frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Right, Anchor::Bottom, Anchor::Left];

    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Top => "top",
            Anchor::Right => "right",
            Anchor::Bottom => "bottom",
            Anchor::Left => "left",
        }
    }

    /// Unknown anchor names normalize to `Right`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "top" => Anchor::Top,
            "bottom" => Anchor::Bottom,
            "left" => Anchor::Left,
            _ => Anchor::Right,
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Anchor::Top => Anchor::Bottom,
            Anchor::Right => Anchor::Left,
            Anchor::Bottom => Anchor::Top,
            Anchor::Left => Anchor::Right,
        }
    }

    /// True for the left/right sides, whose connectors leave horizontally.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Anchor::Left | Anchor::Right)
    }

    /// Unit vector pointing away from the shape.
    pub fn outward(self) -> Vec2 {
        match self {
            Anchor::Top => Vec2::new(0.0, -1.0),
            Anchor::Right => Vec2::new(1.0, 0.0),
            Anchor::Bottom => Vec2::new(0.0, 1.0),
            Anchor::Left => Vec2::new(-1.0, 0.0),
        }
    }
}

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Endpoint {
    /// Attached to a side of a node.
    Bound { node: NodeId, anchor: Anchor },
    /// Detached, at a world coordinate.
    Free(Point),
}

impl Endpoint {
    pub fn bound(node: NodeId, anchor: Anchor) -> Self {
        Endpoint::Bound { node, anchor }
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            Endpoint::Bound { node, .. } => Some(*node),
            Endpoint::Free(_) => None,
        }
    }

    pub fn anchor(&self) -> Option<Anchor> {
        match self {
            Endpoint::Bound { anchor, .. } => Some(*anchor),
            Endpoint::Free(_) => None,
        }
    }
}

// ─── Edges ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: Color,
    pub width: f64,
    pub dashed: bool,
    pub arrow: bool,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            stroke: Color::rgb(0x33, 0x41, 0x55),
            width: 2.0,
            dashed: false,
            arrow: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Straight,
    #[default]
    Orthogonal,
    Curved,
}

impl RouteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteKind::Straight => "straight",
            RouteKind::Orthogonal => "orthogonal",
            RouteKind::Curved => "curved",
        }
    }

    pub fn from_tag(s: &str) -> Option<Self> {
        match s {
            "straight" => Some(RouteKind::Straight),
            "orthogonal" => Some(RouteKind::Orthogonal),
            "curved" => Some(RouteKind::Curved),
            _ => None,
        }
    }
}

/// How a connector is drawn between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub kind: RouteKind,
    /// Rounding of orthogonal corners; 0 keeps sharp corners.
    pub corner_radius: f64,
    /// Grid-snapped bend coordinate overriding the automatic midpoint.
    pub bend: Option<f64>,
    /// Grid-snapped curve control point overriding the automatic one.
    pub control: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLabel {
    pub text: String,
    pub font_size: f64,
    pub color: Color,
    /// Displacement from the connector's midpoint.
    pub offset: Vec2,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: 12.0,
            color: Color::BLACK,
            offset: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: Endpoint,
    pub to: Endpoint,
    pub style: EdgeStyle,
    pub route: Route,
    pub label: EdgeLabel,
}

impl Edge {
    /// A connector with default style, orthogonal route, and empty label.
    pub fn new(id: EdgeId, from: Endpoint, to: Endpoint) -> Self {
        Self {
            id,
            from,
            to,
            style: EdgeStyle::default(),
            route: Route::default(),
            label: EdgeLabel::default(),
        }
    }

    /// Whether either endpoint is bound to `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.from.node() == Some(node) || self.to.node() == Some(node)
    }
}

// ─── Groups ──────────────────────────────────────────────────────────────

/// A named set of at least two nodes that can collapse into one proxy box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub members: SmallVec<[NodeId; 4]>,
    pub collapsed: bool,
    /// Persisted collapsed frame, kept across expand for hysteresis.
    pub frame: Option<Rect>,
    pub text: String,
    pub kind: NodeType,
    pub text_style: TextStyle,
    pub shape_style: ShapeStyle,
}

impl Group {
    pub fn new(id: GroupId, members: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            id,
            members: members.into_iter().collect(),
            collapsed: false,
            frame: None,
            text: "Group".into(),
            kind: NodeType::Subprocess,
            text_style: TextStyle::default(),
            shape_style: NodeType::Subprocess.default_shape_style(),
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.members.contains(&node)
    }
}

// ─── Document ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub version: String,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    pub app: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            version: FORMAT_VERSION.into(),
            created_at: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            app: APP_TAG.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub groups: Vec<Group>,
    pub meta: Meta,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document stamped with the current time.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            meta: Meta::now(),
        }
    }

    // ─── Lookups ─────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// The group containing `node`, if any.
    pub fn group_of(&self, node: NodeId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(node))
    }

    // ─── Id generation ───────────────────────────────────────────────────

    pub fn fresh_node_id(&self) -> NodeId {
        loop {
            let id = NodeId::with_prefix("n");
            if self.node(id).is_none() {
                return id;
            }
        }
    }

    pub fn fresh_edge_id(&self) -> EdgeId {
        loop {
            let id = EdgeId::with_prefix("e");
            if self.edge(id).is_none() {
                return id;
            }
        }
    }

    pub fn fresh_group_id(&self) -> GroupId {
        loop {
            let id = GroupId::with_prefix("g");
            if self.group(id).is_none() {
                return id;
            }
        }
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Highest z-index in use, 0 for an empty document.
    pub fn max_z(&self) -> u32 {
        self.nodes.iter().map(|n| n.z).max().unwrap_or(0)
    }

    /// Reorder nodes by z-index (stable) and renumber them `1..=N`.
    pub fn normalize_z(&mut self) {
        self.nodes.sort_by_key(|n| n.z);
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.z = i as u32 + 1;
        }
    }

    /// Append `node` above every existing node.
    pub fn push_on_top(&mut self, mut node: Node) {
        node.z = self.max_z() + 1;
        self.nodes.push(node);
    }

    /// Move `ids` above every other node, keeping their relative order.
    /// Returns false when none of the ids resolve.
    pub fn bring_to_front(&mut self, ids: &[NodeId]) -> bool {
        self.restack(ids, true)
    }

    /// Move `ids` below every other node, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[NodeId]) -> bool {
        self.restack(ids, false)
    }

    fn restack(&mut self, ids: &[NodeId], front: bool) -> bool {
        self.normalize_z();
        let (picked, rest): (Vec<Node>, Vec<Node>) =
            self.nodes.drain(..).partition(|n| ids.contains(&n.id));
        if picked.is_empty() {
            self.nodes = rest;
            return false;
        }
        self.nodes = if front {
            rest.into_iter().chain(picked).collect()
        } else {
            picked.into_iter().chain(rest).collect()
        };
        for (i, node) in self.nodes.iter_mut().enumerate() {
            node.z = i as u32 + 1;
        }
        true
    }

    // ─── Removal ─────────────────────────────────────────────────────────

    /// Remove nodes together with the edges bound to them and their group
    /// memberships. Groups left with fewer than two members dissolve.
    /// Returns the number of nodes removed.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> usize {
        let doomed: HashSet<NodeId> = ids.iter().copied().collect();
        let before = self.nodes.len();
        self.nodes.retain(|n| !doomed.contains(&n.id));
        let removed = before - self.nodes.len();
        if removed == 0 {
            return 0;
        }
        self.edges.retain(|e| {
            !e.from.node().is_some_and(|n| doomed.contains(&n))
                && !e.to.node().is_some_and(|n| doomed.contains(&n))
        });
        for group in &mut self.groups {
            group.members.retain(|m| !doomed.contains(m));
        }
        self.prune_groups();
        self.normalize_z();
        log::debug!("removed {removed} node(s) with cascade");
        removed
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        before != self.edges.len()
    }

    /// Dissolve a group, leaving its members in place.
    pub fn remove_group(&mut self, id: GroupId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| g.id != id);
        before != self.groups.len()
    }

    /// Dissolve every group with fewer than two members.
    /// Returns the number of groups dissolved.
    pub fn prune_groups(&mut self) -> usize {
        let before = self.groups.len();
        self.groups.retain(|g| g.members.len() >= 2);
        let dissolved = before - self.groups.len();
        if dissolved > 0 {
            log::debug!("dissolved {dissolved} undersized group(s)");
        }
        dissolved
    }
}

// ─── Selection ───────────────────────────────────────────────────────────

/// A set of nodes, or exactly one edge, or exactly one group.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Nodes(Vec<NodeId>),
    Edge(EdgeId),
    Group(GroupId),
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    /// Selected node ids, empty unless the selection is a node set.
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Selection::Nodes(ids) => ids,
            _ => &[],
        }
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes().contains(&id)
    }

    pub fn edge(&self) -> Option<EdgeId> {
        match self {
            Selection::Edge(id) => Some(*id),
            _ => None,
        }
    }

    pub fn group(&self) -> Option<GroupId> {
        match self {
            Selection::Group(id) => Some(*id),
            _ => None,
        }
    }

    /// Replace with a node set; an empty set becomes `Empty`.
    pub fn set_nodes(&mut self, mut ids: Vec<NodeId>) {
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        *self = if ids.is_empty() {
            Selection::Empty
        } else {
            Selection::Nodes(ids)
        };
    }

    /// Add or remove `id` from the node set. An edge or group selection is
    /// replaced.
    pub fn toggle_node(&mut self, id: NodeId) {
        let mut ids = self.nodes().to_vec();
        if let Some(pos) = ids.iter().position(|n| *n == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        self.set_nodes(ids);
    }

    /// Drop anything that no longer resolves in `doc`, and nodes hidden
    /// inside a collapsed group. Returns true when the selection changed.
    pub fn retain_valid(&mut self, doc: &Document) -> bool {
        let next = match self {
            Selection::Empty => Selection::Empty,
            Selection::Nodes(ids) => {
                let kept: Vec<NodeId> = ids
                    .iter()
                    .copied()
                    .filter(|id| {
                        doc.node(*id).is_some() && !doc.group_of(*id).is_some_and(|g| g.collapsed)
                    })
                    .collect();
                if kept.is_empty() {
                    Selection::Empty
                } else {
                    Selection::Nodes(kept)
                }
            }
            Selection::Edge(id) if doc.edge(*id).is_some() => Selection::Edge(*id),
            Selection::Group(id) if doc.group(*id).is_some() => Selection::Group(*id),
            Selection::Edge(_) | Selection::Group(_) => Selection::Empty,
        };
        let changed = next != *self;
        *self = next;
        changed
    }
}

// ─── Sample ──────────────────────────────────────────────────────────────

/// A small start → process → decision → end flow with labelled branches.
pub fn sample_document() -> Document {
    let mut doc = Document::new();

    let mut n1 = Node::new(NodeId::intern("n1"), NodeType::Rectangle, 80.0, 120.0);
    n1.text = "Start".into();
    n1.shape_style.fill = Color::rgb(0xDC, 0xFC, 0xE7);
    n1.z = 1;

    let mut n2 = Node::new(NodeId::intern("n2"), NodeType::Rectangle, 340.0, 120.0);
    n2.text = "Process".into();
    n2.shape_style.fill = Color::rgb(0xE0, 0xF2, 0xFE);
    n2.z = 2;

    let mut n3 = Node::new(NodeId::intern("n3"), NodeType::Diamond, 620.0, 100.0);
    n3.text = "Decision".into();
    n3.shape_style.fill = Color::rgb(0xFE, 0xF3, 0xC7);
    n3.z = 3;

    let mut n4 = Node::new(NodeId::intern("n4"), NodeType::Oval, 900.0, 120.0);
    n4.text = "Done".into();
    n4.shape_style.fill = Color::rgb(0xFE, 0xE2, 0xE2);
    n4.z = 4;

    let link = |id: &str, from: &str, fa: Anchor, to: &str, ta: Anchor| {
        Edge::new(
            EdgeId::intern(id),
            Endpoint::bound(NodeId::intern(from), fa),
            Endpoint::bound(NodeId::intern(to), ta),
        )
    };
    let e1 = link("e1", "n1", Anchor::Right, "n2", Anchor::Left);
    let e2 = link("e2", "n2", Anchor::Right, "n3", Anchor::Left);
    let mut e3 = link("e3", "n3", Anchor::Right, "n4", Anchor::Left);
    e3.label.text = "Yes".into();
    let mut e4 = link("e4", "n3", Anchor::Top, "n2", Anchor::Bottom);
    e4.label.text = "No".into();

    doc.nodes.extend([n1, n2, n3, n4]);
    doc.edges.extend([e1, e2, e3, e4]);
    doc
}
