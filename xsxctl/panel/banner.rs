use crate::panel::slots::{Slot, Surface};
use tokio::time::{Duration, Instant};

/// The message slot and the deadline at which it blanks itself.
///
/// There is at most one pending deadline: setting a new message moves it
/// instead of adding a second one.
#[derive(Debug)]
pub struct Banner {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Banner {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    pub fn set(&mut self, surface: &mut impl Surface, text: &str, now: Instant) {
        surface.write(Slot::Message, text);
        self.deadline = Some(now + self.timeout);
    }

    pub fn clear(&mut self, surface: &mut impl Surface) {
        surface.write(Slot::Message, "");
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Blanks the message if its deadline has passed.
    pub fn expire(&mut self, surface: &mut impl Surface, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.clear(surface);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::slots::Board;

    const TIMEOUT: Duration = Duration::from_millis(3000);

    #[test]
    fn message_clears_after_timeout() {
        let mut board = Board::default();
        let mut banner = Banner::new(TIMEOUT);
        let start = Instant::now();
        banner.set(&mut board, "OK", start);

        assert!(!banner.expire(&mut board, start + Duration::from_millis(2999)));
        assert_eq!(board.get(Slot::Message), "OK");
        assert!(banner.expire(&mut board, start + TIMEOUT));
        assert_eq!(board.get(Slot::Message), "");
        assert_eq!(banner.deadline(), None);
    }

    #[test]
    fn second_message_moves_the_deadline() {
        let mut board = Board::default();
        let mut banner = Banner::new(TIMEOUT);
        let start = Instant::now();
        banner.set(&mut board, "OK", start);
        banner.set(&mut board, "Playlist is empty", start + Duration::from_millis(2000));

        // The first message's expiry no longer applies.
        assert!(!banner.expire(&mut board, start + Duration::from_millis(3500)));
        assert_eq!(board.get(Slot::Message), "Playlist is empty");
        assert!(banner.expire(&mut board, start + Duration::from_millis(5000)));
        assert_eq!(board.get(Slot::Message), "");
        assert!(!banner.expire(&mut board, start + Duration::from_millis(9000)));
    }

    #[test]
    fn explicit_clear_drops_the_deadline() {
        let mut board = Board::default();
        let mut banner = Banner::new(TIMEOUT);
        banner.set(&mut board, "OK", Instant::now());
        banner.clear(&mut board);
        assert_eq!(banner.deadline(), None);
        assert_eq!(board.get(Slot::Message), "");
    }
}
