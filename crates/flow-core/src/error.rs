//! Import failures. Any of these aborts the whole import; no partial
//! document is ever produced.

use crate::xml::XmlError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImportError {
    #[error("malformed XML: {0}")]
    Syntax(#[from] XmlError),

    #[error("root element must be <flowchart>, found <{0}>")]
    MissingRoot(String),

    #[error("unsupported format version '{0}'")]
    UnsupportedVersion(String),

    #[error("{kind} #{index} has no id")]
    MissingId { kind: &'static str, index: usize },

    #[error("{kind} id '{id}' contains a reserved character (':' or ',')")]
    InvalidId { kind: &'static str, id: String },

    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("node '{id}' has unsupported type '{tag}'")]
    UnsupportedNodeType { id: String, tag: String },

    #[error("edge '{edge}' has malformed {side} endpoint '{value}'")]
    MalformedEndpoint {
        edge: String,
        side: &'static str,
        value: String,
    },

    #[error("{owner} references missing node '{node}'")]
    DanglingReference { owner: String, node: String },

    #[error("{owner} has malformed attribute {attr}=\"{value}\"")]
    MalformedAttribute {
        owner: String,
        attr: &'static str,
        value: String,
    },
}
