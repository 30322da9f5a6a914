//! Interned identifiers for nodes, edges, and groups.
//!
//! All three id kinds share one global interner, so ids are 4-byte `Copy`
//! handles with O(1) equality and hashing. The textual form is what gets
//! persisted in the XML format.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global string interner shared by every id kind.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Monotonic counter backing generated ids.
static COUNTER: AtomicU64 = AtomicU64::new(1);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an id, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }

            /// Generate an id of the form `{prefix}_{n}`.
            ///
            /// The counter is process-wide; callers that need an id unused
            /// by a particular document go through `Document::fresh_*_id`.
            pub fn with_prefix(prefix: &str) -> Self {
                let n = COUNTER.fetch_add(1, Ordering::Relaxed);
                Self::intern(&format!("{prefix}_{n}"))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "@{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a flowchart node.
    NodeId
);

interned_id!(
    /// Identifier of a connector.
    EdgeId
);

interned_id!(
    /// Identifier of a node group.
    GroupId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("start");
        let b = NodeId::intern("start");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "start");
        assert_eq!(a.to_string(), "start");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = EdgeId::with_prefix("e");
        let b = EdgeId::with_prefix("e");
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("e_"));
    }

    #[test]
    fn kinds_share_text_but_not_type() {
        let n = NodeId::intern("x1");
        let g = GroupId::intern("x1");
        assert_eq!(n.as_str(), g.as_str());
    }

    #[test]
    fn serde_uses_plain_string() {
        let id = GroupId::intern("g_loop");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"g_loop\"");
        let back: GroupId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
