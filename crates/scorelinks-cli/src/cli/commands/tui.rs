//! Interactive mode.

use anyhow::Result;
use scorelinks_core::config::Config;
#[cfg(feature = "tui")]
use scorelinks_core::interrupt;

#[cfg(feature = "tui")]
pub fn run(config: &Config, base_url: &str) -> Result<()> {
    interrupt::init()?;
    scorelinks_tui::run(config, base_url)
}

#[cfg(not(feature = "tui"))]
pub fn run(_config: &Config, _base_url: &str) -> Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").")
}
