use crate::error::App;
use crate::panel::slots::{Board, Slot, Surface};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    crossterm::{
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    },
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stdout, Stdout};

/// A terminal that redraws the board whenever a slot changed.
pub struct Screen<B: Backend> {
    terminal: Terminal<B>,
    board: Board,
    stale: bool,
}

impl<B: Backend> Screen<B> {
    pub fn new(backend: B) -> Result<Self, App> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            board: Board::default(),
            stale: true,
        })
    }
}

impl Screen<CrosstermBackend<Stdout>> {
    /// Takes over stdout: raw mode on the alternate screen.
    pub fn enter() -> Result<Self, App> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        Self::new(CrosstermBackend::new(stdout()))
    }

    /// Hands the terminal back the way `enter` found it.
    pub fn leave(mut self) -> Result<(), App> {
        disable_raw_mode()?;
        stdout().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<B: Backend> Surface for Screen<B> {
    fn write(&mut self, slot: Slot, text: &str) {
        self.board.write(slot, text);
    }

    fn invalidate(&mut self) {
        self.stale = true;
    }

    fn flush(&mut self) -> Result<(), App> {
        let stale = std::mem::take(&mut self.stale);
        if !self.board.take_dirty() && !stale {
            return Ok(());
        }
        let board = &self.board;
        self.terminal.draw(|frame| ui(frame, board))?;
        Ok(())
    }
}

fn label(slot: Slot) -> Span<'static> {
    Span::styled(
        format!("{:>9}: ", slot.label()),
        Style::default().fg(Color::Yellow),
    )
}

fn field(board: &Board, slot: Slot) -> Line<'_> {
    Line::from(vec![label(slot), Span::raw(board.get(slot))])
}

fn boxed<'a>(lines: Vec<Line<'a>>, title: &'a str) -> Paragraph<'a> {
    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: false })
}

fn ui(frame: &mut Frame, board: &Board) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(4),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    let now_playing = vec![
        Line::from(vec![
            label(Slot::TransportStatus),
            Span::raw(format!(
                "{}  {} / {}",
                board.get(Slot::TransportStatus),
                board.get(Slot::StreamPos),
                board.get(Slot::StreamLen)
            )),
        ]),
        field(board, Slot::Title),
        field(board, Slot::Album),
        Line::from(vec![
            label(Slot::PlaylistIndex),
            Span::raw(format!(
                "{} of {}",
                board.get(Slot::PlaylistIndex),
                board.get(Slot::PlaylistLength)
            )),
        ]),
    ];
    frame.render_widget(boxed(now_playing, "Now playing"), rows[0]);

    let playlist = vec![field(board, Slot::Playlist), field(board, Slot::Volume)];
    frame.render_widget(boxed(playlist, "Playlist"), rows[1]);

    let scanner = vec![Line::raw(board.get(Slot::ScannerProgress))];
    frame.render_widget(boxed(scanner, "Scanner"), rows[2]);

    let message = vec![Line::raw(board.get(Slot::Message))];
    frame.render_widget(boxed(message, "Message"), rows[3]);

    let prompt = vec![Line::raw(format!("> {}", board.get(Slot::Prompt)))];
    frame.render_widget(
        boxed(prompt, "Command (Enter to send, Esc to quit)"),
        rows[4],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn contents(screen: &Screen<TestBackend>) -> String {
        screen
            .terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn slots_land_in_their_boxes() {
        let mut screen = Screen::new(TestBackend::new(70, 24)).unwrap();
        screen.write(Slot::TransportStatus, "playing");
        screen.write(Slot::StreamPos, "01:05");
        screen.write(Slot::StreamLen, "03:20");
        screen.write(Slot::Album, "Kind of Blue");
        screen.write(Slot::Message, "OK");
        screen.write(Slot::Prompt, "volume 4");
        screen.flush().unwrap();

        let drawn = contents(&screen);
        assert!(drawn.contains("Now playing"));
        assert!(drawn.contains("   Status: playing  01:05 / 03:20"));
        assert!(drawn.contains("    Album: Kind of Blue"));
        assert!(drawn.contains("OK"));
        assert!(drawn.contains("> volume 4"));
    }

    #[test]
    fn first_flush_draws_an_empty_board() {
        let mut screen = Screen::new(TestBackend::new(70, 24)).unwrap();
        screen.flush().unwrap();
        assert!(contents(&screen).contains("Scanner"));
        assert!(!screen.stale);
        screen.invalidate();
        assert!(screen.stale);
        screen.flush().unwrap();
        assert!(!screen.stale);
    }
}
