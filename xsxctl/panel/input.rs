use log::error;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

/// What the keyboard asks of the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The line being typed changed.
    Edit(String),
    /// Enter was pressed on this line.
    Line(String),
    /// The terminal changed size.
    Resized,
    Quit,
}

/// Builds command lines out of key presses.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: String,
}

impl LineEditor {
    pub fn key(&mut self, key: KeyEvent) -> Option<Input> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Input::Quit)
            }
            KeyCode::Esc => Some(Input::Quit),
            KeyCode::Enter => Some(Input::Line(std::mem::take(&mut self.buffer))),
            KeyCode::Backspace => self
                .buffer
                .pop()
                .map(|_| Input::Edit(self.buffer.clone())),
            KeyCode::Char(c) => {
                self.buffer.push(c);
                Some(Input::Edit(self.buffer.clone()))
            }
            _ => None,
        }
    }
}

/// Reads terminal events on a thread of its own until the panel stops
/// listening.
pub fn forward_keys(inputs: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let mut editor = LineEditor::default();
        while !inputs.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    error!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
            let input = match event::read() {
                Ok(Event::Key(key)) => editor.key(key),
                Ok(Event::Resize(..)) => Some(Input::Resized),
                Ok(_) => None,
                Err(e) => {
                    error!("Failed to read terminal event: {}", e);
                    break;
                }
            };
            if let Some(input) = input {
                if inputs.blocking_send(input).is_err() {
                    break;
                }
            }
        }
    });
}
