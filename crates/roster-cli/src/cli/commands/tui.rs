//! Interactive directory.

use anyhow::Result;
use roster_core::config::Config;
use roster_core::session::SessionContext;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, session: SessionContext) -> Result<()> {
    roster_tui::run(config, session).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config, _session: SessionContext) -> Result<()> {
    anyhow::bail!("This build has no interactive UI. Use `roster list` instead.")
}
