mod app;
mod events;
mod logging;
mod persist;
mod strings;
mod terminal;
mod theme;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use exbar_core::Config;
use terminal::TerminalGuard;
use tracing::{error, info};

fn main() -> Result<()> {
    let cfg = Config::load();
    let _log_guard = logging::init(&cfg.log_dir())?;
    info!(target: "tui", "starting with {:?}", cfg);

    let paths: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let mut app = app::App::new(&cfg, &paths)?;
    let mut term = TerminalGuard::new()?;
    let res = events::run(&mut term, &mut app);
    if let Err(e) = &res {
        error!(target: "tui", "event loop failed: {:#}", e);
    }
    res
}
