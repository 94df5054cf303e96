//! Shared TUI building blocks.

mod task;
pub mod text;
mod text_input;

pub use task::{TaskId, TaskKind, TaskSeq, TaskState, Tasks};
pub use text::truncate_with_ellipsis;
pub use text_input::TextInput;
