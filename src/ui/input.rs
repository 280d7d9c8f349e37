/// Keyboard input.
///
/// The game is turn-based: every key press becomes exactly one `Command`,
/// and every command the host applies is followed by one engine turn.
/// Auto-repeat counts as further presses, so holding a direction keeps
/// walking one cell per repeat. Release events are ignored.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, poll};

/// One discrete player intent.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    Break,
    /// Let a turn pass without acting.
    Wait,
    /// Start a new session after a crush.
    Confirm,
    Quit,
}

impl Command {
    /// Does this command advance the engine by one turn?
    pub fn takes_turn(self) -> bool {
        matches!(self, Command::MoveLeft | Command::MoveRight | Command::Break | Command::Wait)
    }
}

pub struct InputState {
    pending: Vec<Command>,
}

impl InputState {
    pub fn new() -> Self {
        InputState { pending: Vec::with_capacity(8) }
    }

    /// Wait up to `timeout` for input, then drain everything available
    /// without blocking further. Returns the commands in arrival order.
    pub fn drain_events(&mut self, timeout: Duration) -> Vec<Command> {
        self.pending.clear();

        let mut wait = timeout;
        while poll(wait).unwrap_or(false) {
            wait = Duration::ZERO;
            if let Ok(Event::Key(key)) = event::read() {
                if let Some(cmd) = command_for(&key) {
                    self.pending.push(cmd);
                }
            }
        }

        std::mem::take(&mut self.pending)
    }
}

/// Key binding table.
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release { return None; }

    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Command::MoveLeft),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Command::MoveRight),
        KeyCode::Char('q') | KeyCode::Char('Q')
        | KeyCode::Char('e') | KeyCode::Char('E') => Some(Command::Break),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S')
        | KeyCode::Char(' ') => Some(Command::Wait),
        KeyCode::Enter => Some(Command::Confirm),
        KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}
