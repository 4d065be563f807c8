pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod debounce;
pub mod error;
pub mod gesture;
pub mod hit;
pub mod history;
pub mod input;
pub mod palette;
pub mod properties;
pub mod shortcuts;
pub mod validation;

pub use canvas::{CanvasApi, CanvasContext, CanvasSurface, RenderItem};
pub use clipboard::{ClipboardEntry, ClipboardEnvelope, SystemClipboard};
pub use config::EditorConfig;
pub use error::{EditorError, EditorResult, Field, ValidationError};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use properties::{PanelMode, PropertiesEditor, Tab};
pub use shortcuts::ShortcutAction;
