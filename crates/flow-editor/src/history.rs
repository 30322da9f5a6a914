//! Undo/redo history.
//!
//! Every edit runs as a transaction: `begin` captures a deep copy of the
//! document, the edit mutates the live document, and `commit` pushes the
//! captured copy onto the undo stack only if the document actually
//! changed. Undo and redo swap whole documents, so a step never aliases
//! the live state.

use flow_core::config::HISTORY_LIMIT;
use flow_core::model::Document;
use std::collections::VecDeque;

/// A stored document state with the label of the edit that left it.
#[derive(Debug, Clone)]
struct Snapshot {
    doc: Document,
    label: String,
}

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Debug)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Maximum undo depth; the oldest entry is evicted first.
    max_depth: usize,
    /// State captured by `begin`, awaiting commit or discard.
    pending: Option<Snapshot>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_depth.min(64)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            pending: None,
        }
    }

    /// Open a transaction. Idempotent while one is already open: the first
    /// snapshot wins. Returns true when a new snapshot was taken.
    pub fn begin(&mut self, doc: &Document, label: &str) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Snapshot {
            doc: doc.clone(),
            label: label.to_string(),
        });
        log::trace!("history: begin '{label}'");
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Close the open transaction. The pre-edit state is recorded only if
    /// `doc` differs from it; recording clears the redo stack.
    /// Returns true when an undo entry was pushed.
    pub fn commit(&mut self, doc: &Document) -> bool {
        let Some(before) = self.pending.take() else {
            return false;
        };
        if before.doc == *doc {
            log::debug!("history: '{}' made no change, discarded", before.label);
            return false;
        }
        log::debug!("history: commit '{}'", before.label);
        self.push_undo(before);
        self.redo_stack.clear();
        true
    }

    /// Drop the open transaction without recording anything.
    pub fn cancel(&mut self) {
        if let Some(before) = self.pending.take() {
            log::debug!("history: cancel '{}'", before.label);
        }
    }

    /// Drop the open transaction and restore the state it captured.
    pub fn rollback(&mut self, doc: &mut Document) {
        if let Some(before) = self.pending.take() {
            log::debug!("history: rollback '{}'", before.label);
            *doc = before.doc;
        }
    }

    /// Run `edit` as one transaction.
    pub fn transact<R>(
        &mut self,
        doc: &mut Document,
        label: &str,
        edit: impl FnOnce(&mut Document) -> R,
    ) -> R {
        let opened = self.begin(doc, label);
        let result = edit(doc);
        if opened {
            self.commit(doc);
        }
        result
    }

    /// Restore the previous state. Returns the label of the undone edit.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        self.pending = None;
        let snapshot = self.undo_stack.pop_back()?;
        let current = std::mem::replace(doc, snapshot.doc);
        self.redo_stack.push(Snapshot {
            doc: current,
            label: snapshot.label.clone(),
        });
        log::debug!("history: undo '{}'", snapshot.label);
        Some(snapshot.label)
    }

    /// Re-apply the last undone state. Returns its label.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        self.pending = None;
        let snapshot = self.redo_stack.pop()?;
        let current = std::mem::replace(doc, snapshot.doc);
        self.push_undo(Snapshot {
            doc: current,
            label: snapshot.label.clone(),
        });
        log::debug!("history: redo '{}'", snapshot.label);
        Some(snapshot.label)
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Forget everything, including any open transaction.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the edit `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|s| s.label.as_str())
    }
}
