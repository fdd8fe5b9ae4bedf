//! Live terminal surface (crossterm raw mode + alternate screen)

use std::{
    io::{self, Stdout},
    time::Duration,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{widget::draw_dashboard, Renderer};
use crate::shared::{error::RenderError, present::DisplayModel, refresh::CancelHandle};

const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    chart_columns: usize,
    active: bool,
}

impl TerminalRenderer {
    /// Take over the terminal. Restored by [`Renderer::shutdown`], on drop, or
    /// by the panic hook.
    pub fn new(chart_columns: usize) -> Result<Self, RenderError> {
        install_panic_hook();

        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(error) = execute!(stdout, EnterAlternateScreen) {
            restore_terminal();
            return Err(error.into());
        }

        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(error) => {
                restore_terminal();
                return Err(error.into());
            }
        };

        Ok(Self {
            terminal,
            chart_columns,
            active: true,
        })
    }
}

impl Renderer for TerminalRenderer {
    fn draw(&mut self, model: &DisplayModel) -> Result<(), RenderError> {
        let chart_columns = self.chart_columns;
        self.terminal.draw(|f| draw_dashboard(f, model, chart_columns))?;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), RenderError> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        debug!("Terminal restored");
        Ok(())
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

/// Best-effort restore, safe to call from any state
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}

/// Keys that stop the dashboard. Raw mode delivers Ctrl+C as a key event
/// instead of SIGINT.
pub fn is_exit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Watch the keyboard on the blocking pool and cancel on an exit key.
///
/// Returns once an exit key is pressed, the dashboard is cancelled by other
/// means, or the terminal stops delivering events.
pub fn spawn_input_watcher(cancel: CancelHandle) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || loop {
        if cancel.is_cancelled() {
            return;
        }

        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if is_exit_key(&key) => {
                    debug!(code = ?key.code, "Exit key pressed");
                    cancel.cancel();
                    return;
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(%error, "Failed to read terminal event");
                    return;
                }
            },
            Ok(false) => {}
            Err(error) => {
                warn!(%error, "Failed to poll terminal events");
                return;
            }
        }
    })
}
