use crate::fetch::AssetLoader;
use crate::track::Track;

pub struct PlayQueue {
    tracks: Vec<Track>,
    index: usize,
    lookahead: usize,
}

impl PlayQueue {
    pub fn new(tracks: Vec<Track>, lookahead: usize) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }
        Some(Self {
            tracks,
            index: 0,
            lookahead,
        })
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    pub fn current_track(&self) -> &Track {
        &self.tracks[self.index]
    }

    pub fn current_track_mut(&mut self) -> &mut Track {
        &mut self.tracks[self.index]
    }

    pub fn next_track(&mut self) {
        self.index = (self.index + 1) % self.tracks.len();
    }

    pub fn last_track(&mut self) {
        self.index = (self.index + self.tracks.len() - 1) % self.tracks.len();
    }

    pub fn next_indices(&self) -> Vec<usize> {
        let len = self.tracks.len();
        let window = self.lookahead.min(len - 1);
        (1..=window).map(|offset| (self.index + offset) % len).collect()
    }

    pub fn next_tracks(&self) -> Vec<&Track> {
        self.next_indices()
            .into_iter()
            .map(|idx| &self.tracks[idx])
            .collect()
    }

    // Starts fetches for the lookahead window. A failure is reported by
    // `poll_prefetches` and retried on the next fill.
    pub fn fill_next_tracks(&mut self, loader: &AssetLoader) {
        for idx in self.next_indices() {
            let track = &mut self.tracks[idx];
            if track.fetch_failed() {
                log::warn!("prefetch of {} failed earlier, retrying", track.path());
                track.retry();
            }
            track.fetch(loader);
        }
    }

    pub fn poll_prefetches(&mut self) -> usize {
        let mut failed = 0;
        for idx in self.next_indices() {
            let track = &mut self.tracks[idx];
            if let Some(err) = track.poll_fetch() {
                log::warn!("prefetch of {} failed: {err}", track.display_name());
                failed += 1;
            }
        }
        failed
    }
}
