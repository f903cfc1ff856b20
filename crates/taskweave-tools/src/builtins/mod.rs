//! The built-in tool set: todo planning plus virtual-filesystem operations.

/// `cp` — copy a file.
pub mod copy_file;
/// `mkdir`, `cd`, `pwd` — namespace and cursor operations.
pub mod dirs;
/// `edit_file` — targeted in-file replacement.
pub mod edit_file;
/// `file_history` — render a file's version history.
pub mod file_history;
/// `ls` — directory listing.
pub mod list_files;
/// `read_file` — windowed, line-numbered file reads.
pub mod read_file;
/// `write_file` — write a new file version.
pub mod write_file;
/// `write_todos` — atomic whole-plan replacement.
pub mod write_todos;

use crate::registry::ToolRegistry;
use std::sync::Arc;

/// Register every built-in tool into `registry`.
pub fn register_builtins(registry: &mut ToolRegistry) {
    registry.register(Arc::new(write_todos::WriteTodosTool::new()));
    registry.register(Arc::new(list_files::LsTool::new()));
    registry.register(Arc::new(read_file::ReadFileTool::new()));
    registry.register(Arc::new(write_file::WriteFileTool::new()));
    registry.register(Arc::new(edit_file::EditFileTool::new()));
    registry.register(Arc::new(dirs::MkdirTool::new()));
    registry.register(Arc::new(dirs::CdTool::new()));
    registry.register(Arc::new(dirs::PwdTool::new()));
    registry.register(Arc::new(file_history::FileHistoryTool::new()));
    registry.register(Arc::new(copy_file::CopyFileTool::new()));
}
