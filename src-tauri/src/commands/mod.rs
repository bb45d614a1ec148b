/// Commands module
/// All Tauri commands (IPC handlers) are defined here
/// The bridge commands are the only host capabilities the UI can reach;
/// everything else goes through the client session.

pub mod bridge;
pub mod session;
