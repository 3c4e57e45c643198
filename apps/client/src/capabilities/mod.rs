//! Host capabilities the workflow calls through instead of reaching for
//! globals: preview references for a selected file and the system clipboard.

pub mod clipboard;
pub mod preview;

pub use clipboard::{Clipboard, SystemClipboard};
pub use preview::{InMemoryPreviewStore, PreviewRef, PreviewStore};
