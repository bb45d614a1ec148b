/// Services module
/// Tauri-side implementations of the core crate's UI seams

pub mod dialog;
pub mod view_sink;

pub use dialog::{Bridge, DialogPicker};
pub use view_sink::WebviewSink;
