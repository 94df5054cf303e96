//! Directory feature slice: searchable, paginated employee listing and the
//! detail screen.

mod render;
mod state;
mod update;

pub use render::{render_detail, render_directory};
pub use state::DirectoryState;
pub use update::{
    enter, handle_detail_key, handle_fetched, handle_key, handle_paste, request_refresh, sign_out,
};
