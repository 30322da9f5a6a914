//! Pure geometry helpers shared by routing, grouping, and hit testing.

use crate::model::{Anchor, Document};
use kurbo::{Point, Rect};
use smallvec::SmallVec;

/// Consecutive points closer than this on both axes collapse into one.
pub const DUPLICATE_EPSILON: f64 = 0.01;

/// Padding around content when computing export bounds.
pub const BOUNDS_PADDING: f64 = 40.0;

/// Round `value` to the nearest multiple of `grid`. A non-positive grid
/// leaves the value untouched.
#[must_use]
pub fn snap(value: f64, grid: f64) -> f64 {
    if grid <= 0.0 {
        return value;
    }
    (value / grid).round() * grid
}

#[must_use]
pub fn snap_point(p: Point, grid: f64) -> Point {
    Point::new(snap(p.x, grid), snap(p.y, grid))
}

/// Grow `rect` outward to grid lines (floor the min corner, ceil the max).
#[must_use]
pub fn align_rect_outward(rect: Rect, grid: f64) -> Rect {
    if grid <= 0.0 {
        return rect;
    }
    Rect::new(
        (rect.x0 / grid).floor() * grid,
        (rect.y0 / grid).floor() * grid,
        (rect.x1 / grid).ceil() * grid,
        (rect.y1 / grid).ceil() * grid,
    )
}

/// Midpoint of the side of `rect` named by `anchor`.
#[must_use]
pub fn anchor_point(rect: Rect, anchor: Anchor) -> Point {
    let c = rect.center();
    match anchor {
        Anchor::Top => Point::new(c.x, rect.y0),
        Anchor::Right => Point::new(rect.x1, c.y),
        Anchor::Bottom => Point::new(c.x, rect.y1),
        Anchor::Left => Point::new(rect.x0, c.y),
    }
}

/// The anchor of `rect` closest to `p` (ties resolve in `Anchor::ALL` order).
#[must_use]
pub fn nearest_anchor(rect: Rect, p: Point) -> Anchor {
    let mut best = Anchor::Top;
    let mut best_d = f64::INFINITY;
    for anchor in Anchor::ALL {
        let d = anchor_point(rect, anchor).distance_squared(p);
        if d < best_d {
            best_d = d;
            best = anchor;
        }
    }
    best
}

/// Closed-interval overlap test; touching edges count as intersecting.
#[must_use]
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Drop consecutive points that coincide within `DUPLICATE_EPSILON`.
#[must_use]
pub fn dedupe_points(points: &[Point]) -> SmallVec<[Point; 6]> {
    let mut out: SmallVec<[Point; 6]> = SmallVec::new();
    for &p in points {
        let keep = match out.last() {
            Some(last) => {
                (last.x - p.x).abs() > DUPLICATE_EPSILON || (last.y - p.y).abs() > DUPLICATE_EPSILON
            }
            None => true,
        };
        if keep {
            out.push(p);
        }
    }
    out
}

/// Point halfway along the polyline by arc length.
#[must_use]
pub fn polyline_midpoint(points: &[Point]) -> Point {
    let Some(&first) = points.first() else {
        return Point::ZERO;
    };
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= 0.0 {
        return first;
    }
    let half = total / 2.0;
    let mut walked = 0.0;
    for w in points.windows(2) {
        let len = w[0].distance(w[1]);
        if walked + len >= half && len > 0.0 {
            return w[0].lerp(w[1], (half - walked) / len);
        }
        walked += len;
    }
    points[points.len() - 1]
}

/// Bounds of all nodes plus padding, for export framing.
/// An empty document yields a fixed default page.
#[must_use]
pub fn document_bounds(doc: &Document) -> Rect {
    let mut rects = doc.nodes.iter().map(|n| n.rect());
    let Some(first) = rects.next() else {
        return Rect::new(-100.0, -100.0, 900.0, 600.0);
    };
    rects.fold(first, |acc, r| acc.union(r)).inflate(BOUNDS_PADDING, BOUNDS_PADDING)
}
