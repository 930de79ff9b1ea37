use crate::error::App;
use log::trace;
use std::collections::BTreeMap;

/// Named display regions of the control panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Message,
    TransportStatus,
    StreamPos,
    StreamLen,
    Title,
    Album,
    PlaylistIndex,
    PlaylistLength,
    Playlist,
    Volume,
    ScannerProgress,
    Prompt,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Slot::Message,
        Slot::TransportStatus,
        Slot::StreamPos,
        Slot::StreamLen,
        Slot::Title,
        Slot::Album,
        Slot::PlaylistIndex,
        Slot::PlaylistLength,
        Slot::Playlist,
        Slot::Volume,
        Slot::ScannerProgress,
        Slot::Prompt,
    ];

    /// Element id of this region on the server's HTML pages. The prompt
    /// only exists in the terminal and gets an id in the same style.
    pub fn id(self) -> &'static str {
        match self {
            Slot::Message => "messagecell",
            Slot::TransportStatus => "transportstatusspan",
            Slot::StreamPos => "streamposspan",
            Slot::StreamLen => "streamlenspan",
            Slot::Title => "titlespan",
            Slot::Album => "albumspan",
            Slot::PlaylistIndex => "playlistindexspan",
            Slot::PlaylistLength => "playlistlengthspan",
            Slot::Playlist => "playlist",
            Slot::Volume => "volumeslider",
            Slot::ScannerProgress => "scannerprogresscell",
            Slot::Prompt => "commandinput",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Message => "Message",
            Slot::TransportStatus => "Status",
            Slot::StreamPos => "Position",
            Slot::StreamLen => "Length",
            Slot::Title => "Title",
            Slot::Album => "Album",
            Slot::PlaylistIndex => "Track",
            Slot::PlaylistLength => "Tracks",
            Slot::Playlist => "Playlist",
            Slot::Volume => "Volume",
            Slot::ScannerProgress => "Scanner",
            Slot::Prompt => "Command",
        }
    }
}

/// Something renderers can write slot text into.
pub trait Surface {
    fn write(&mut self, slot: Slot, text: &str);

    /// Forces the next flush to redraw everything.
    fn invalidate(&mut self) {}

    /// Pushes pending changes out, if the surface has anywhere to push them.
    fn flush(&mut self) -> Result<(), App> {
        Ok(())
    }
}

/// Slot contents held in memory.
#[derive(Debug, Default, Clone)]
pub struct Board {
    slots: BTreeMap<Slot, String>,
    dirty: bool,
}

impl Board {
    pub fn get(&self, slot: Slot) -> &str {
        self.slots.get(&slot).map_or("", String::as_str)
    }

    /// Whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Surface for Board {
    fn write(&mut self, slot: Slot, text: &str) {
        if self.get(slot) != text {
            trace!("#{} <- {text}", slot.id());
            self.slots.insert(slot, text.to_string());
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_tracks_changes() {
        let mut board = Board::default();
        assert_eq!(board.get(Slot::Title), "");
        board.write(Slot::Title, "So What");
        assert!(board.take_dirty());
        board.write(Slot::Title, "So What");
        assert!(!board.take_dirty());
        assert_eq!(board.get(Slot::Title), "So What");
    }

    #[test]
    fn slot_ids_are_unique() {
        let mut ids: Vec<_> = Slot::ALL.iter().map(|slot| slot.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Slot::ALL.len());
    }
}
