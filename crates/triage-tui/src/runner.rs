//! Terminal lifecycle and the dispatch loop.
//!
//! Commands drained from the app run on worker threads and report back over
//! a channel; the editor is the one exception and runs in the foreground
//! with the dashboard suspended.

use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use triage_dispatch::{begin_note_capture, Command, Message};
use triage_remote::IncidentApi;

use crate::app::App;
use crate::error::TuiError;
use crate::render::Dimensions;
use crate::ui::render_dashboard;

pub fn run_tui(
    app: &mut App,
    api: Arc<dyn IncidentApi>,
    tick_rate: Duration,
) -> Result<(), TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_loop(&mut terminal, app, api, tick_rate);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    api: Arc<dyn IncidentApi>,
    tick_rate: Duration,
) -> Result<(), TuiError> {
    let size = terminal.size()?;
    app.set_dimensions(Dimensions::new(size.width, size.height));

    let (tx, rx) = mpsc::channel();

    while !app.should_quit {
        terminal.draw(|frame| render_dashboard(frame, app))?;

        for command in app.drain_commands() {
            match command {
                Command::OpenEditor { editor } => run_editor_session(terminal, app, &editor)?,
                other => spawn_worker(other, Arc::clone(&api), tx.clone()),
            }
        }

        while let Ok(message) = rx.try_recv() {
            app.apply_message(message);
        }

        if event::poll(tick_rate)? {
            handle_terminal_event(app, event::read()?);
        }
    }
    Ok(())
}

fn spawn_worker(command: Command, api: Arc<dyn IncidentApi>, tx: mpsc::Sender<Message>) {
    thread::spawn(move || {
        let message = triage_dispatch::execute(command, api.as_ref());
        let _ = tx.send(message);
    });
}

/// Run the note-capture editor in the foreground. The dashboard leaves the
/// alternate screen for the whole session and redraws afterwards. A capture
/// setup failure is applied as a message; nothing is spawned for it.
fn run_editor_session(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    editor: &str,
) -> Result<(), TuiError> {
    let pending = match begin_note_capture(editor) {
        Ok(pending) => pending,
        Err(err) => {
            app.apply_message(Message::Failed(err));
            return Ok(());
        }
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let message = pending.run_blocking();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    app.apply_message(message);
    Ok(())
}

fn handle_terminal_event(app: &mut App, event: CEvent) {
    match event {
        CEvent::Key(key) => app.handle_key_event(key),
        CEvent::Resize(width, height) => app.set_dimensions(Dimensions::new(width, height)),
        _ => {}
    }
}
