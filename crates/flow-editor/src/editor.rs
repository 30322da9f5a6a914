//! Editor application state.
//!
//! `Editor` is the one value that owns everything a session needs: the
//! live document, selection, history, camera, UI toggles, the active
//! gesture, and the clipboard. Hosts feed it `InputEvent`s and call its
//! commands; renderers read it through the accessors.

use crate::actions::Clipboard;
use crate::history::History;
use crate::hit::{Hit, HitContext};
use crate::input::{InputEvent, Modifiers};
use crate::interaction::Gesture;
use crate::redraw::RedrawScheduler;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::viewport::{Camera, WHEEL_ZOOM_IN, WHEEL_ZOOM_OUT, ZOOM_IN_STEP, ZOOM_OUT_STEP};
use flow_core::config::EditorConfig;
use flow_core::emitter::emit_document;
use flow_core::error::ImportError;
use flow_core::geometry::snap;
use flow_core::id::NodeId;
use flow_core::model::{Anchor, Document, Selection, sample_document};
use flow_core::normalize::normalize;
use flow_core::parser::parse_document_with;
use kurbo::{Point, Size};

/// The open quick-add type picker: a new node will be placed beyond
/// `anchor` of `node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAdd {
    pub node: NodeId,
    pub anchor: Anchor,
}

pub struct Editor {
    pub(crate) doc: Document,
    pub(crate) selection: Selection,
    pub(crate) history: History,
    pub(crate) config: EditorConfig,
    pub camera: Camera,
    /// Canvas size in screen pixels.
    pub viewport_size: Size,
    pub snap_enabled: bool,
    pub grid_visible: bool,
    pub(crate) gesture: Gesture,
    pub(crate) clipboard: Option<Clipboard>,
    pub(crate) paste_offset: f64,
    pub(crate) quick_add: Option<QuickAdd>,
    /// Space held: primary-button drags over plain hits pan.
    pub(crate) space_held: bool,
    pub(crate) theme_index: usize,
    pub redraw: RedrawScheduler,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An editor on an empty document.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_document(Document::new(), config)
    }

    /// An editor on `doc`, normalized first.
    pub fn with_document(mut doc: Document, config: EditorConfig) -> Self {
        normalize(&mut doc, &config);
        Self {
            doc,
            selection: Selection::Empty,
            history: History::new(config.history_limit),
            config,
            camera: Camera::new(),
            viewport_size: Size::new(800.0, 600.0),
            snap_enabled: true,
            grid_visible: true,
            gesture: Gesture::Idle,
            clipboard: None,
            paste_offset: 0.0,
            quick_add: None,
            space_held: false,
            theme_index: 0,
            redraw: RedrawScheduler::new(),
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn quick_add(&self) -> Option<QuickAdd> {
        self.quick_add
    }

    pub fn paste_offset(&self) -> f64 {
        self.paste_offset
    }

    pub fn is_space_held(&self) -> bool {
        self.space_held
    }

    pub(crate) fn hit_context(&self) -> HitContext<'_> {
        HitContext {
            doc: &self.doc,
            config: &self.config,
            selection: &self.selection,
            scale: self.camera.scale,
            quick_add: self.gesture.is_idle(),
        }
    }

    /// What a press at world point `p` would hit right now.
    pub fn hit_at(&self, p: Point) -> Hit {
        self.hit_context().hit_test(p)
    }

    /// Snap a structural coordinate when snapping is on.
    pub(crate) fn snap_value(&self, value: f64) -> f64 {
        if self.snap_enabled {
            snap(value, self.config.grid_size)
        } else {
            value
        }
    }

    pub(crate) fn request_redraw(&mut self) {
        self.redraw.request();
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Replace the selection with `ids`; hidden or missing nodes are dropped.
    pub fn select_nodes(&mut self, ids: Vec<NodeId>) {
        self.selection.set_nodes(ids);
        self.selection.retain_valid(&self.doc);
        self.request_redraw();
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.selection.retain_valid(&self.doc);
        self.request_redraw();
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::Empty);
    }

    // ─── Document lifecycle ──────────────────────────────────────────────

    fn replace_document(&mut self, doc: Document) {
        self.gesture = Gesture::Idle;
        self.doc = doc;
        self.selection = Selection::Empty;
        self.history.clear();
        self.paste_offset = 0.0;
        self.quick_add = None;
        self.request_redraw();
    }

    /// Import an XML document. On failure the current document, selection,
    /// and history are left untouched.
    pub fn load_xml(&mut self, xml: &str) -> Result<(), ImportError> {
        let doc = parse_document_with(xml, &self.config)?;
        log::debug!(
            "loaded document: {} nodes, {} edges, {} groups",
            doc.nodes.len(),
            doc.edges.len(),
            doc.groups.len()
        );
        self.replace_document(doc);
        Ok(())
    }

    /// Export the current document.
    pub fn save_xml(&self) -> String {
        emit_document(&self.doc)
    }

    /// Start over with an empty document.
    pub fn new_document(&mut self) {
        self.replace_document(Document::new());
    }

    pub fn load_sample(&mut self) {
        let mut doc = sample_document();
        normalize(&mut doc, &self.config);
        self.replace_document(doc);
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Undo the last edit. Any gesture in progress is cancelled first.
    pub fn undo(&mut self) -> Option<String> {
        self.cancel_gesture();
        let label = self.history.undo(&mut self.doc)?;
        self.selection.retain_valid(&self.doc);
        self.request_redraw();
        Some(label)
    }

    pub fn redo(&mut self) -> Option<String> {
        self.cancel_gesture();
        let label = self.history.redo(&mut self.doc)?;
        self.selection.retain_valid(&self.doc);
        self.request_redraw();
        Some(label)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.request_redraw();
    }

    pub fn zoom_in(&mut self) {
        self.camera
            .zoom_from_center(ZOOM_IN_STEP, self.viewport_size, &self.config);
        self.request_redraw();
    }

    pub fn zoom_out(&mut self) {
        self.camera
            .zoom_from_center(ZOOM_OUT_STEP, self.viewport_size, &self.config);
        self.request_redraw();
    }

    pub fn reset_zoom(&mut self) {
        self.camera.reset();
        self.request_redraw();
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.grid_visible = !self.grid_visible;
        self.request_redraw();
        self.grid_visible
    }

    pub fn toggle_snap(&mut self) -> bool {
        self.snap_enabled = !self.snap_enabled;
        self.snap_enabled
    }

    // ─── Input dispatch ──────────────────────────────────────────────────

    /// Feed one host event. Returns whether the editor consumed it.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown(e) => self.pointer_down(e),
            InputEvent::PointerMove(e) => self.pointer_move(e),
            InputEvent::PointerUp(e) => self.pointer_up(e),
            InputEvent::Wheel {
                position,
                delta_y,
                modifiers,
            } => self.wheel(*position, *delta_y, *modifiers),
            InputEvent::KeyDown { key, modifiers } => self.key_down(key, *modifiers).is_some(),
            InputEvent::KeyUp { key, .. } => self.key_up(key),
            InputEvent::Blur => {
                self.space_held = false;
                true
            }
        }
    }

    /// Ctrl/⌘ + wheel zooms about the cursor; a plain wheel is left to the host.
    pub fn wheel(&mut self, position: Point, delta_y: f64, modifiers: Modifiers) -> bool {
        if !modifiers.command() {
            return false;
        }
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.camera.zoom_at(position, factor, &self.config);
        self.request_redraw();
        true
    }

    /// Resolve and run a shortcut. Returns the action that ran; `Save` is
    /// returned for the host to act on.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers)?;
        log::debug!("shortcut {key:?} → {action:?}");
        match action {
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Redo => {
                self.redo();
            }
            ShortcutAction::Copy => {
                self.copy_selection();
            }
            ShortcutAction::Paste => {
                self.paste();
            }
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Save => {}
            ShortcutAction::Group => {
                self.group_selection();
            }
            ShortcutAction::Ungroup => {
                self.ungroup_selection();
            }
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.reset_zoom(),
            ShortcutAction::PanStart => self.space_held = true,
            ShortcutAction::BringToFront => {
                self.bring_to_front();
            }
            ShortcutAction::SendToBack => {
                self.send_to_back();
            }
            ShortcutAction::Dismiss => self.cancel_quick_add(),
        }
        Some(action)
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        if key == " " {
            self.space_held = false;
            return true;
        }
        false
    }
}
