//! Connector routing.
//!
//! Turns an `Edge` plus the current document into concrete geometry:
//! endpoint positions, the routed path, the label position, and the
//! editable bend/control handle. Everything here is a pure function of
//! its inputs, so the same document always routes identically.

use crate::config::EditorConfig;
use crate::geometry::{dedupe_points, polyline_midpoint, snap, snap_point};
use crate::grouping::{Connectable, collapsed_group_of};
use crate::id::EdgeId;
use crate::model::{Anchor, Document, Edge, Endpoint, RouteKind};
use kurbo::{BezPath, ParamCurve, ParamCurveNearest, Point, QuadBez, Vec2};
use smallvec::SmallVec;

/// Tolerance for nearest-point queries on curved segments.
const NEAREST_ACCURACY: f64 = 1e-3;

// ─── Endpoints ───────────────────────────────────────────────────────────

/// An endpoint resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedEnd {
    pub point: Point,
    /// Side the connector leaves from; `None` for free points.
    pub anchor: Option<Anchor>,
}

pub fn resolve_endpoint(
    doc: &Document,
    config: &EditorConfig,
    endpoint: &Endpoint,
) -> Option<ResolvedEnd> {
    match *endpoint {
        Endpoint::Bound { node, anchor } => {
            let target = Connectable::for_node(doc, node)?;
            Some(ResolvedEnd {
                point: target.anchor_point(doc, config, anchor)?,
                anchor: Some(anchor),
            })
        }
        Endpoint::Free(point) => Some(ResolvedEnd {
            point,
            anchor: None,
        }),
    }
}

/// Whether both ends of `edge` sit inside the same collapsed group.
pub fn is_hidden_by_group(doc: &Document, edge: &Edge) -> bool {
    let (Some(a), Some(b)) = (edge.from.node(), edge.to.node()) else {
        return false;
    };
    match (collapsed_group_of(doc, a), collapsed_group_of(doc, b)) {
        (Some(ga), Some(gb)) => ga.id == gb.id,
        _ => false,
    }
}

/// Resolve both ends, or `None` when the edge dangles or is hidden
/// inside a collapsed group.
pub fn resolve_endpoints(
    doc: &Document,
    config: &EditorConfig,
    edge: &Edge,
) -> Option<(ResolvedEnd, ResolvedEnd)> {
    if is_hidden_by_group(doc, edge) {
        return None;
    }
    let from = resolve_endpoint(doc, config, &edge.from)?;
    let to = resolve_endpoint(doc, config, &edge.to)?;
    Some((from, to))
}

// ─── Routed geometry ─────────────────────────────────────────────────────

/// Which coordinate an orthogonal bend value sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BendAxis {
    /// The bend is a vertical segment at `x = bend`.
    X,
    /// The bend is a horizontal segment at `y = bend`.
    Y,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteShape {
    /// Straight or orthogonal vertices, first to last.
    Polyline(SmallVec<[Point; 6]>),
    Curve(QuadBez),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    pub shape: RouteShape,
    pub corner_radius: f64,
    /// Set for orthogonal routes.
    pub bend: Option<(BendAxis, f64)>,
}

/// The bend axis chosen by the source side; a free source follows the
/// dominant direction of the chord.
pub fn bend_axis(from: &ResolvedEnd, to: Point) -> BendAxis {
    match from.anchor {
        Some(anchor) if anchor.is_horizontal() => BendAxis::X,
        Some(_) => BendAxis::Y,
        None => {
            let d = to - from.point;
            if d.x.abs() >= d.y.abs() {
                BendAxis::X
            } else {
                BendAxis::Y
            }
        }
    }
}

/// Vertices of a one-bend Manhattan route.
pub fn orthogonal_points(
    start: Point,
    end: Point,
    axis: BendAxis,
    bend: f64,
) -> SmallVec<[Point; 6]> {
    let pts = match axis {
        BendAxis::X => [start, Point::new(bend, start.y), Point::new(bend, end.y), end],
        BendAxis::Y => [start, Point::new(start.x, bend), Point::new(end.x, bend), end],
    };
    dedupe_points(&pts)
}

/// Automatic control point: perpendicular offset from the chord midpoint,
/// pushed toward the side the source anchor faces.
pub fn auto_control_point(start: Point, end: Point, from_anchor: Option<Anchor>) -> Point {
    let chord = end - start;
    let len = chord.hypot();
    let mid = start.midpoint(end);
    let magnitude = (0.25 * len + 24.0).clamp(42.0, 160.0);
    if len <= f64::EPSILON {
        let dir = from_anchor.map_or(Vec2::new(0.0, -1.0), Anchor::outward);
        return mid + dir * magnitude;
    }
    let perp = Vec2::new(-chord.y, chord.x) / len;
    let sign = match from_anchor {
        Some(anchor) if perp.dot(anchor.outward()) < 0.0 => -1.0,
        _ => 1.0,
    };
    mid + perp * (magnitude * sign)
}

/// Route an edge, or `None` if it cannot be drawn.
pub fn route_edge(doc: &Document, config: &EditorConfig, edge: &Edge) -> Option<RoutedEdge> {
    let (from, to) = resolve_endpoints(doc, config, edge)?;
    Some(route_between(&from, &to, edge, config.grid_size))
}

/// Route between already-resolved ends. Used for previews of edges that
/// are not in the document yet.
pub fn route_between(from: &ResolvedEnd, to: &ResolvedEnd, edge: &Edge, grid: f64) -> RoutedEdge {
    let route = &edge.route;
    match route.kind {
        RouteKind::Straight => RoutedEdge {
            shape: RouteShape::Polyline(dedupe_points(&[from.point, to.point])),
            corner_radius: 0.0,
            bend: None,
        },
        RouteKind::Orthogonal => {
            let axis = bend_axis(from, to.point);
            let value = route.bend.unwrap_or_else(|| {
                let mid = from.point.midpoint(to.point);
                match axis {
                    BendAxis::X => snap(mid.x, grid),
                    BendAxis::Y => snap(mid.y, grid),
                }
            });
            RoutedEdge {
                shape: RouteShape::Polyline(orthogonal_points(from.point, to.point, axis, value)),
                corner_radius: route.corner_radius.max(0.0),
                bend: Some((axis, value)),
            }
        }
        RouteKind::Curved => {
            let control = route
                .control
                .unwrap_or_else(|| auto_control_point(from.point, to.point, from.anchor));
            RoutedEdge {
                shape: RouteShape::Curve(QuadBez::new(from.point, control, to.point)),
                corner_radius: 0.0,
                bend: None,
            }
        }
    }
}

impl RoutedEdge {
    pub fn start(&self) -> Point {
        match &self.shape {
            RouteShape::Polyline(pts) => pts.first().copied().unwrap_or(Point::ZERO),
            RouteShape::Curve(q) => q.p0,
        }
    }

    pub fn end(&self) -> Point {
        match &self.shape {
            RouteShape::Polyline(pts) => pts.last().copied().unwrap_or(Point::ZERO),
            RouteShape::Curve(q) => q.p2,
        }
    }

    /// Vertices strictly between the two ends.
    pub fn interior_points(&self) -> &[Point] {
        match &self.shape {
            RouteShape::Polyline(pts) if pts.len() > 2 => &pts[1..pts.len() - 1],
            _ => &[],
        }
    }

    /// Drawable path. Orthogonal corners are rounded with quadratic arcs
    /// whose radius never exceeds half the shorter adjoining segment.
    pub fn path(&self) -> BezPath {
        let mut path = BezPath::new();
        match &self.shape {
            RouteShape::Curve(q) => {
                path.move_to(q.p0);
                path.quad_to(q.p1, q.p2);
            }
            RouteShape::Polyline(pts) => {
                let Some(&first) = pts.first() else {
                    return path;
                };
                path.move_to(first);
                for i in 1..pts.len() {
                    let p = pts[i];
                    let is_corner = i + 1 < pts.len();
                    if !is_corner || self.corner_radius <= 0.0 {
                        path.line_to(p);
                        continue;
                    }
                    let prev = pts[i - 1];
                    let next = pts[i + 1];
                    let len_in = prev.distance(p);
                    let len_out = p.distance(next);
                    let r = self.corner_radius.min(len_in / 2.0).min(len_out / 2.0);
                    if r <= 0.0 {
                        path.line_to(p);
                        continue;
                    }
                    let dir_in = (p - prev) / len_in;
                    let dir_out = (next - p) / len_out;
                    path.line_to(p - dir_in * r);
                    path.quad_to(p, p + dir_out * r);
                }
            }
        }
        path
    }

    /// Position of the label anchor before its stored offset.
    pub fn midpoint(&self) -> Point {
        match &self.shape {
            RouteShape::Polyline(pts) => polyline_midpoint(pts),
            RouteShape::Curve(q) => q.eval(0.5),
        }
    }

    /// Label position: path midpoint plus the label offset.
    pub fn label_point(&self, edge: &Edge) -> Point {
        self.midpoint() + edge.label.offset
    }

    /// Shortest distance from `p` to the drawn path.
    pub fn distance_to(&self, p: Point) -> f64 {
        self.path()
            .segments()
            .map(|seg| seg.nearest(p, NEAREST_ACCURACY).distance_sq)
            .fold(f64::INFINITY, f64::min)
            .sqrt()
    }

    /// The adjustable handle of this route, if its kind exposes one.
    pub fn handle(&self) -> Option<EdgeHandle> {
        match (&self.shape, self.bend) {
            (RouteShape::Curve(q), _) => Some(EdgeHandle::Control(q.p1)),
            (RouteShape::Polyline(_), Some((axis, value))) => {
                let mid = self.start().midpoint(self.end());
                let at = match axis {
                    BendAxis::X => Point::new(value, mid.y),
                    BendAxis::Y => Point::new(mid.x, value),
                };
                Some(EdgeHandle::Bend { axis, at })
            }
            _ => None,
        }
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// The draggable shape parameter of a selected edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeHandle {
    /// Moves only along `axis`.
    Bend { axis: BendAxis, at: Point },
    /// Moves freely in 2-D.
    Control(Point),
}

impl EdgeHandle {
    pub fn position(&self) -> Point {
        match *self {
            EdgeHandle::Bend { at, .. } => at,
            EdgeHandle::Control(p) => p,
        }
    }

    /// Store the handle at `world`, snapped to the grid, forcing the route
    /// kind that matches the handle.
    pub fn apply(&self, edge: &mut Edge, world: Point, grid: f64) {
        match *self {
            EdgeHandle::Bend { axis, .. } => {
                let value = match axis {
                    BendAxis::X => world.x,
                    BendAxis::Y => world.y,
                };
                edge.route.kind = RouteKind::Orthogonal;
                edge.route.bend = Some(snap(value, grid));
            }
            EdgeHandle::Control(_) => {
                edge.route.kind = RouteKind::Curved;
                edge.route.control = Some(snap_point(world, grid));
            }
        }
    }
}

/// Route every drawable edge in document order.
pub fn route_all<'a>(
    doc: &'a Document,
    config: &'a EditorConfig,
) -> impl Iterator<Item = (EdgeId, RoutedEdge)> + 'a {
    doc.edges
        .iter()
        .filter_map(move |e| route_edge(doc, config, e).map(|r| (e.id, r)))
}

/// Drawable path of one edge.
pub fn edge_path(doc: &Document, config: &EditorConfig, edge: &Edge) -> Option<BezPath> {
    route_edge(doc, config, edge).map(|r| r.path())
}
