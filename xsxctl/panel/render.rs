use crate::api::reply::{PlaybackStatus, ScannerStatus, TransportStatus};
use crate::panel::slots::{Slot, Surface};

pub const SCANNER_IDLE: &str = "File scanner is not running at present";
pub const PLAYLIST_EMPTY: &str = "Playlist is empty";

/// `MM:SS`, both fields zero-padded to two digits. Negative input, which
/// the engine reports for some streams, counts as zero.
pub fn sec_to_minsec(total: i64) -> String {
    let total = total.max(0);
    format!("{:02}:{:02}", total / 60, total % 60)
}

pub fn render_playback(status: &PlaybackStatus, surface: &mut impl Surface) {
    surface.write(Slot::TransportStatus, status.transport_status.label());
    if status.transport_status == TransportStatus::Stopped {
        surface.write(Slot::StreamPos, &sec_to_minsec(0));
        surface.write(Slot::StreamLen, &sec_to_minsec(0));
    } else {
        surface.write(Slot::StreamPos, &sec_to_minsec(i64::from(status.pos)));
        surface.write(Slot::StreamLen, &sec_to_minsec(i64::from(status.len)));
    }
    surface.write(Slot::Title, &status.title);
    surface.write(Slot::Album, &status.album);
    if status.playlist_index >= 0 {
        surface.write(Slot::PlaylistIndex, &(i64::from(status.playlist_index) + 1).to_string());
    } else {
        surface.write(Slot::PlaylistIndex, "?");
    }
    surface.write(Slot::PlaylistLength, &status.playlist_length.to_string());
}

pub fn render_scanner(status: &ScannerStatus, surface: &mut impl Surface) {
    if !status.running {
        surface.write(Slot::ScannerProgress, SCANNER_IDLE);
        return;
    }
    let progress = format!(
        "Files scanned: {}, entries added to index: {}, index entries modified: {}, \
         index entries deleted: {}, cover images extracted: {}",
        status.scanned, status.added, status.modified, status.deleted, status.extracted
    );
    surface.write(Slot::ScannerProgress, &progress);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::slots::Board;

    fn playing() -> PlaybackStatus {
        PlaybackStatus {
            transport_status: TransportStatus::Playing,
            pos: 65,
            len: 200,
            title: "A".into(),
            album: "B".into(),
            playlist_index: 2,
            playlist_length: 10,
            artist: String::new(),
            composer: String::new(),
            genre: String::new(),
            bitrate: 0,
            seekable: true,
        }
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(sec_to_minsec(0), "00:00");
        assert_eq!(sec_to_minsec(65), "01:05");
        assert_eq!(sec_to_minsec(-12), "00:00");
        assert_eq!(sec_to_minsec(599), "09:59");
        assert_eq!(sec_to_minsec(6005), "100:05");
    }

    #[test]
    fn playing_status_fills_every_slot() {
        let mut board = Board::default();
        render_playback(&playing(), &mut board);
        assert_eq!(board.get(Slot::TransportStatus), "playing");
        assert_eq!(board.get(Slot::StreamPos), "01:05");
        assert_eq!(board.get(Slot::StreamLen), "03:20");
        assert_eq!(board.get(Slot::Title), "A");
        assert_eq!(board.get(Slot::Album), "B");
        assert_eq!(board.get(Slot::PlaylistIndex), "3");
        assert_eq!(board.get(Slot::PlaylistLength), "10");
    }

    #[test]
    fn stopped_zeroes_the_clock() {
        let mut board = Board::default();
        let status = PlaybackStatus {
            transport_status: TransportStatus::Stopped,
            playlist_index: -1,
            ..playing()
        };
        render_playback(&status, &mut board);
        assert_eq!(board.get(Slot::TransportStatus), "stopped");
        assert_eq!(board.get(Slot::StreamPos), "00:00");
        assert_eq!(board.get(Slot::StreamLen), "00:00");
        assert_eq!(board.get(Slot::PlaylistIndex), "?");
    }

    #[test]
    fn last_possible_index_does_not_overflow() {
        let mut board = Board::default();
        let status = PlaybackStatus {
            playlist_index: i32::MAX,
            playlist_length: i32::MAX,
            ..playing()
        };
        render_playback(&status, &mut board);
        assert_eq!(board.get(Slot::PlaylistIndex), "2147483648");
        assert_eq!(board.get(Slot::PlaylistLength), "2147483647");
    }

    #[test]
    fn buffering_stream_without_length() {
        let mut board = Board::default();
        let status = PlaybackStatus {
            transport_status: TransportStatus::Buffering,
            pos: -3,
            len: 0,
            ..playing()
        };
        render_playback(&status, &mut board);
        assert_eq!(board.get(Slot::TransportStatus), "buffering");
        assert_eq!(board.get(Slot::StreamPos), "00:00");
        assert_eq!(board.get(Slot::StreamLen), "00:00");
    }

    #[test]
    fn scanner_progress() {
        let mut board = Board::default();
        let mut status = ScannerStatus {
            running: false,
            scanned: 0,
            added: 0,
            modified: 0,
            deleted: 0,
            extracted: 0,
        };
        render_scanner(&status, &mut board);
        assert_eq!(board.get(Slot::ScannerProgress), SCANNER_IDLE);

        status = ScannerStatus {
            running: true,
            scanned: 5,
            added: 2,
            modified: 1,
            deleted: 0,
            extracted: 3,
        };
        render_scanner(&status, &mut board);
        assert_eq!(
            board.get(Slot::ScannerProgress),
            "Files scanned: 5, entries added to index: 2, index entries modified: 1, \
             index entries deleted: 0, cover images extracted: 3"
        );
    }
}
