//! No-echo password prompt.
//!
//! On a terminal the prompt switches to crossterm raw mode and collects key
//! events itself, so nothing typed is echoed. When stdin is not a terminal the
//! password is read as a plain line.

use crate::error::{CrossOldError, Result};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

/// What the prompt should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Submit,
    Cancel,
}

/// Apply one key event to the password buffer.
pub fn apply_key(buffer: &mut String, key: KeyEvent) -> KeyOutcome {
    if key.kind != KeyEventKind::Press {
        return KeyOutcome::Continue;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Enter, _) => KeyOutcome::Submit,
        (KeyCode::Esc, _) => KeyOutcome::Cancel,
        (KeyCode::Char('c') | KeyCode::Char('d'), modifiers)
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            KeyOutcome::Cancel
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.clear();
            KeyOutcome::Continue
        }
        (KeyCode::Backspace, _) => {
            buffer.pop();
            KeyOutcome::Continue
        }
        (KeyCode::Char(c), modifiers)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            buffer.push(c);
            KeyOutcome::Continue
        }
        _ => KeyOutcome::Continue,
    }
}

/// Prompt on stderr and read a password without echoing it.
pub fn read_password(prompt: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{prompt}")?;
    stderr.flush()?;

    let password = if io::stdin().is_terminal() {
        read_raw()
    } else {
        read_line(&mut io::stdin().lock())
    };

    writeln!(stderr)?;
    password
}

fn read_raw() -> Result<String> {
    let _guard = RawModeGuard::enable()?;
    let mut buffer = String::new();

    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut buffer, key) {
                KeyOutcome::Continue => {}
                KeyOutcome::Submit => return Ok(buffer),
                KeyOutcome::Cancel => {
                    return Err(CrossOldError::io(
                        "Password entry cancelled",
                        io::Error::new(io::ErrorKind::Interrupted, "cancelled"),
                    ))
                }
            }
        }
    }
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(CrossOldError::io(
            "No password on standard input",
            io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"),
        ));
    }
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Leaves raw mode when dropped, including on early return.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| CrossOldError::io("Failed to enable raw mode", e))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
