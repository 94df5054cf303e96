//! Full-screen TUI for the employee directory.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
pub use features::{auth, directory};
use roster_core::config::Config;
use roster_core::session::SessionContext;
pub use runtime::TuiRuntime;

/// Runs the interactive directory until the user quits.
///
/// # Errors
/// Returns an error when stderr is not a terminal or the terminal fails.
pub async fn run(config: &Config, session: SessionContext) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "The directory UI requires a terminal.\n\
             Use `roster list` for non-interactive output."
        );
    }

    let mut runtime = TuiRuntime::new(config, session)?;
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
