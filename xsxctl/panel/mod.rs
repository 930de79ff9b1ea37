//! The control panel: one task owning the slots and the message banner,
//! fed by two status pollers, request completions and typed commands.

pub mod banner;
pub mod input;
pub mod render;
pub mod screen;
pub mod slots;

use crate::api::{Command, Completion, Dispatcher, Reply, Transport};
use crate::config::Config;
use crate::error::{App, Class};
use banner::Banner;
use input::Input;
use log::{debug, error, info, warn};
use render::{render_playback, render_scanner, PLAYLIST_EMPTY};
use slots::{Slot, Surface};
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// UI state: whatever is on the surface plus the banner's deadline.
pub struct Panel<S> {
    surface: S,
    banner: Banner,
}

impl<S: Surface> Panel<S> {
    pub fn new(surface: S, message_timeout: Duration) -> Self {
        Self {
            surface,
            banner: Banner::new(message_timeout),
        }
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Shows the line being typed.
    pub fn typing(&mut self, text: &str) {
        self.surface.write(Slot::Prompt, text);
    }

    pub fn redraw(&mut self) {
        self.surface.invalidate();
    }

    /// Slot updates that happen as soon as a command goes out.
    pub fn issued(&mut self, command: &Command) {
        match command {
            Command::Clear => self.surface.write(Slot::Playlist, PLAYLIST_EMPTY),
            Command::SetVolume(volume) => self.surface.write(Slot::Volume, &volume.to_string()),
            _ => {}
        }
    }

    pub fn notify(&mut self, text: &str, now: Instant) {
        self.banner.set(&mut self.surface, text, now);
    }

    /// Renders a finished request. Failures are logged and leave the last
    /// rendered state alone.
    pub fn apply(&mut self, completion: Completion, now: Instant) {
        let Completion { command, result } = completion;
        match result {
            Ok(Reply::Message(reply)) => {
                if !reply.is_ok() {
                    warn!(
                        "{} refused with status {}: {}",
                        command.name(),
                        reply.status,
                        reply.message
                    );
                }
                self.banner.set(&mut self.surface, &reply.message, now);
            }
            Ok(Reply::Playback(status)) => render_playback(&status, &mut self.surface),
            Ok(Reply::Scanner(status)) => render_scanner(&status, &mut self.surface),
            Ok(Reply::List(entries)) => {
                debug!("{} listed {} entries", command.name(), entries.len());
            }
            Ok(Reply::Ignored) => {}
            Err(e) => match e.class() {
                Class::Network => warn!("{}: server unreachable: {e}", command.name()),
                Class::Parse => error!("{}: unusable reply: {e}", command.name()),
                Class::Application => warn!("{}: {e}", command.name()),
                Class::Local => error!("{}: {e}", command.name()),
            },
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.banner.deadline()
    }

    pub fn expire(&mut self, now: Instant) -> bool {
        self.banner.expire(&mut self.surface, now)
    }

    pub fn flush(&mut self) -> Result<(), App> {
        self.surface.flush()
    }
}

fn poll_every(period: Duration) -> time::Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Runs the panel until `stop` fires or the user quits.
///
/// Both pollers tick from the start, independently of each other and of
/// outstanding requests. `inputs` carries keyboard input; when it closes
/// the panel keeps polling.
pub async fn run<T, S>(
    panel: &mut Panel<S>,
    dispatcher: &Dispatcher<T>,
    config: &Config,
    mut inputs: mpsc::Receiver<Input>,
    mut stop: watch::Receiver<bool>,
) -> Result<(), App>
where
    T: Transport,
    S: Surface,
{
    let (done, mut completions) = mpsc::channel(32);
    let mut playback = poll_every(config.playback_poll());
    let mut scanner = poll_every(config.scanner_poll());
    let mut inputs_open = true;
    info!(
        "Panel polling {} every {:?} (playback) and {:?} (scanner)",
        config.server,
        config.playback_poll(),
        config.scanner_poll()
    );

    panel.flush()?;
    loop {
        let deadline = panel.deadline();
        tokio::select! {
            _ = playback.tick() => dispatcher.spawn(Command::Status, done.clone()),
            _ = scanner.tick() => dispatcher.spawn(Command::ScannerStatus, done.clone()),
            Some(completion) = completions.recv() => panel.apply(completion, Instant::now()),
            () = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                panel.expire(Instant::now());
            }
            input = inputs.recv(), if inputs_open => match input {
                Some(Input::Edit(text)) => panel.typing(&text),
                Some(Input::Line(line)) => {
                    panel.typing("");
                    if !submit(panel, &line, dispatcher, &done) {
                        info!("Quit requested");
                        break;
                    }
                }
                Some(Input::Resized) => panel.redraw(),
                Some(Input::Quit) => {
                    info!("Quit requested");
                    break;
                }
                None => {
                    debug!("Command input closed");
                    inputs_open = false;
                }
            },
            _ = stop.changed() => {
                info!("Stop signal received, leaving panel");
                break;
            }
        }
        panel.flush()?;
    }
    Ok(())
}

/// Sends one typed line. Returns false when the line asks to quit.
fn submit<T, S>(
    panel: &mut Panel<S>,
    line: &str,
    dispatcher: &Dispatcher<T>,
    done: &mpsc::Sender<Completion>,
) -> bool
where
    T: Transport,
    S: Surface,
{
    let line = line.trim();
    match line {
        "quit" | "exit" => return false,
        "" => return true,
        _ => {}
    }
    match Command::parse_line(line) {
        Ok(command) => {
            info!("Sending {}", command.name());
            panel.issued(&command);
            dispatcher.spawn(command, done.clone());
        }
        Err(e) => panel.notify(&e.to_string(), Instant::now()),
    }
    true
}
