//! Ordered play queue

use resonance_core::{Track, TrackId};

/// Tracks staged for sequential playback plus the active position.
///
/// The index is always within bounds when the queue is non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Queue {
    tracks: Vec<Track>,
    index: usize,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole queue, clamping `index` into range
    pub fn replace(&mut self, tracks: Vec<Track>, index: usize) {
        self.index = index.min(tracks.len().saturating_sub(1));
        self.tracks = tracks;
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Active position, or `None` for an empty queue
    pub fn index(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.index)
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.index)
    }

    /// Position of the first track with this id
    pub fn position_of(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn has_next(&self) -> bool {
        !self.tracks.is_empty() && self.index + 1 < self.tracks.len()
    }

    pub fn has_previous(&self) -> bool {
        !self.tracks.is_empty() && self.index > 0
    }

    /// Moves forward one position and returns the new current track
    pub fn advance(&mut self) -> Option<&Track> {
        if !self.has_next() {
            return None;
        }
        self.index += 1;
        self.tracks.get(self.index)
    }

    /// Moves back one position and returns the new current track
    pub fn retreat(&mut self) -> Option<&Track> {
        if !self.has_previous() {
            return None;
        }
        self.index -= 1;
        self.tracks.get(self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resonance_core::ProfileId;

    fn tracks(n: usize) -> Vec<Track> {
        let artist = ProfileId::new();
        (0..n)
            .map(|i| Track::new(format!("Track {}", i), artist, "Vela".to_string()))
            .collect()
    }

    #[test]
    fn test_empty_queue_has_no_index() {
        let queue = Queue::new();
        assert_eq!(queue.index(), None);
        assert!(queue.current().is_none());
        assert!(!queue.has_next());
        assert!(!queue.has_previous());
    }

    #[test]
    fn test_replace_clamps_index() {
        let mut queue = Queue::new();
        queue.replace(tracks(3), 7);
        assert_eq!(queue.index(), Some(2));

        queue.replace(Vec::new(), 4);
        assert_eq!(queue.index(), None);
    }

    #[test]
    fn test_advance_and_retreat_stop_at_edges() {
        let mut queue = Queue::new();
        let list = tracks(2);
        queue.replace(list.clone(), 0);

        assert_eq!(queue.advance().map(|t| t.id), Some(list[1].id));
        assert!(queue.advance().is_none());
        assert_eq!(queue.index(), Some(1));

        assert_eq!(queue.retreat().map(|t| t.id), Some(list[0].id));
        assert!(queue.retreat().is_none());
        assert_eq!(queue.index(), Some(0));
    }

    #[test]
    fn test_position_of() {
        let mut queue = Queue::new();
        let list = tracks(3);
        queue.replace(list.clone(), 0);
        assert_eq!(queue.position_of(list[2].id), Some(2));
        assert_eq!(queue.position_of(TrackId::new()), None);
    }
}
