pub mod autosave;
pub mod history;
pub mod input;
pub mod placement;
pub mod reducer;
pub mod resize;
pub mod session;
pub mod shortcuts;

pub use autosave::{AutosaveConfig, AutosaveMachine, AutosaveStatus, SaveError};
#[cfg(feature = "runtime")]
pub use autosave::{Autosave, SaveFn, SaveFuture};
pub use history::{Carry, HistoryState, Snapshot};
pub use input::{ArrowKey, InputEvent, Modifiers};
pub use reducer::{Action, reduce};
pub use resize::{ElementMetrics, KeyboardNudger, PointerCapture, ResizeController, ResizeTarget};
pub use session::{Dispatch, EditorSession};
pub use shortcuts::{ShortcutAction, ShortcutMap};
