pub mod config;
pub mod emitter;
pub mod error;
pub mod formula;
pub mod geometry;
pub mod grouping;
pub mod id;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod routing;
pub mod xml;

pub use config::EditorConfig;
pub use emitter::emit_document;
pub use error::ImportError;
pub use grouping::Connectable;
pub use id::{EdgeId, GroupId, NodeId};
pub use model::*;
pub use normalize::normalize;
pub use parser::{parse_document, parse_document_with};
pub use routing::{EdgeHandle, RoutedEdge, route_edge};

// Re-export kurbo geometry so downstream crates share one set of types.
pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
