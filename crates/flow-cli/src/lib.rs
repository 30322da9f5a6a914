//! CLI logic for the `flowchart` tool.
//!
//! Every subcommand imports through the same all-or-nothing parser the
//! editor uses, so `check` passing means the editor will load the file.

pub mod config;
pub mod error;

mod args;

pub use args::{Args, Command};
pub use error::CliError;

use std::fs;
use std::io::Write;
use std::path::Path;

use flow_core::formula;
use flow_core::geometry::document_bounds;
use flow_core::{Document, EditorConfig, Endpoint, emit_document, parse_document_with, sample_document};
use log::info;
use serde::Serialize;

/// Document statistics reported by `flowchart stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub version: String,
    pub nodes: usize,
    pub edges: usize,
    pub groups: usize,
    pub collapsed_groups: usize,
    /// Edge ends not attached to any node.
    pub free_endpoints: usize,
    pub labelled_edges: usize,
    /// Nodes whose text is a math formula.
    pub formulas: usize,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Stats {
    pub fn of(doc: &Document) -> Self {
        let free_endpoints = doc
            .edges
            .iter()
            .flat_map(|e| [e.from, e.to])
            .filter(|end| matches!(end, Endpoint::Free(_)))
            .count();
        let bounds = document_bounds(doc);
        Self {
            version: doc.meta.version.clone(),
            nodes: doc.nodes.len(),
            edges: doc.edges.len(),
            groups: doc.groups.len(),
            collapsed_groups: doc.groups.iter().filter(|g| g.collapsed).count(),
            free_endpoints,
            labelled_edges: doc.edges.iter().filter(|e| !e.label.text.is_empty()).count(),
            formulas: doc.nodes.iter().filter(|n| formula::detect(&n.text).is_some()).count(),
            bounds: Bounds {
                x: bounds.x0,
                y: bounds.y0,
                width: bounds.width(),
                height: bounds.height(),
            },
        }
    }
}

/// Run the CLI, writing command output to `out`.
///
/// # Errors
///
/// Returns [`CliError`] for configuration, file I/O, and import errors.
pub fn run(args: &Args, out: &mut impl Write) -> Result<(), CliError> {
    let config = config::load_config(args.config.as_deref())?;

    match &args.command {
        Command::Check { input } => {
            let doc = import(input, &config)?;
            writeln!(
                out,
                "{}: ok ({} nodes, {} edges, {} groups)",
                input.display(),
                doc.nodes.len(),
                doc.edges.len(),
                doc.groups.len()
            )?;
        }
        Command::Fmt { input, output } => {
            let doc = import(input, &config)?;
            emit(&emit_document(&doc), output.as_deref(), out)?;
        }
        Command::Stats { input, json } => {
            let stats = Stats::of(&import(input, &config)?);
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
            } else {
                write_stats(&stats, out)?;
            }
        }
        Command::Dump { input } => {
            let doc = import(input, &config)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&doc)?)?;
        }
        Command::Sample { output } => {
            emit(&emit_document(&sample_document()), output.as_deref(), out)?;
        }
    }
    Ok(())
}

fn import(path: &Path, config: &EditorConfig) -> Result<Document, CliError> {
    info!("importing {}", path.display());
    let source = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document_with(&source, config).map_err(|source| CliError::Import {
        path: path.to_path_buf(),
        source,
    })
}

fn emit(xml: &str, output: Option<&Path>, out: &mut impl Write) -> Result<(), CliError> {
    match output {
        Some(path) => {
            fs::write(path, xml).map_err(|source| CliError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            info!("wrote {}", path.display());
        }
        None => out.write_all(xml.as_bytes())?,
    }
    Ok(())
}

fn write_stats(stats: &Stats, out: &mut impl Write) -> Result<(), CliError> {
    writeln!(out, "version:          {}", stats.version)?;
    writeln!(out, "nodes:            {}", stats.nodes)?;
    writeln!(out, "edges:            {}", stats.edges)?;
    writeln!(out, "  labelled:       {}", stats.labelled_edges)?;
    writeln!(out, "  free ends:      {}", stats.free_endpoints)?;
    writeln!(out, "groups:           {}", stats.groups)?;
    writeln!(out, "  collapsed:      {}", stats.collapsed_groups)?;
    writeln!(out, "formulas:         {}", stats.formulas)?;
    let b = stats.bounds;
    writeln!(out, "bounds:           {} {} {}x{}", b.x, b.y, b.width, b.height)?;
    Ok(())
}
