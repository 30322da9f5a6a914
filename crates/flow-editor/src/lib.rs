pub mod actions;
pub mod editor;
pub mod history;
pub mod hit;
pub mod input;
pub mod interaction;
pub mod redraw;
pub mod shortcuts;
pub mod viewport;

pub use actions::{Alignment, Axis, Clipboard, EdgeProperty, NodeProperty, THEME_PRESETS};
pub use editor::{Editor, QuickAdd};
pub use history::History;
pub use hit::{EdgeEnd, Hit, HitContext, ResizeHandle};
pub use input::{InputEvent, Modifiers, PointerButton, PointerEvent};
pub use interaction::Gesture;
pub use redraw::RedrawScheduler;
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::Camera;
