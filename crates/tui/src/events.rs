use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use tracing::info;

use crate::{app::App, terminal::TerminalGuard, ui};

pub fn run(term: &mut TerminalGuard, app: &mut App) -> anyhow::Result<()> {
    let mut last_draw = Instant::now();
    let heartbeat = Duration::from_millis(500);
    let mut block_cursor = None;
    loop {
        if app.dirty || last_draw.elapsed() >= heartbeat {
            term.terminal.draw(|f| ui::draw(f, app))?;
            app.dirty = false;
            last_draw = Instant::now();
        }
        let block = app.cursor_block();
        if block_cursor != Some(block) {
            term.set_cursor_block(block);
            block_cursor = Some(block);
        }

        if event::poll(Duration::from_millis(120))? {
            match event::read()? {
                Event::Key(key) => {
                    app.on_key(key);
                }
                Event::Paste(s) => {
                    app.on_paste(&s);
                }
                Event::Resize(_, _) => {
                    app.dirty = true;
                }
                Event::FocusLost => {
                    app.on_focus_lost();
                }
                _ => {}
            }
        }

        if app.should_quit {
            info!(target: "tui", "quit");
            break;
        }
    }
    Ok(())
}
