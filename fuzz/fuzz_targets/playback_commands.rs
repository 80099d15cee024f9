#![no_main]

use libfuzzer_sys::fuzz_target;
use std::collections::HashSet;
use tapedeck::model::TrackDescriptor;
use tapedeck::queue::PlayQueue;
use tapedeck::reconcile::{Command, EngineSnapshot, LoopState, reconcile};
use tapedeck::studio::PlaybackState;
use tapedeck::track::Track;

fuzz_target!(|data: &[u8]| {
    let len = (data.len() % 32).max(1);
    let lookahead = data.first().map_or(2, |byte| usize::from(byte % 6));
    let tracks = (0..len)
        .map(|idx| Track::new(TrackDescriptor::new(&format!("tracks/{idx}.ogg"), "t")))
        .collect();
    let Some(mut queue) = PlayQueue::new(tracks, lookahead) else {
        return;
    };

    let mut state = LoopState::default();
    for byte in data {
        match byte % 4 {
            0 => queue.next_track(),
            1 => queue.last_track(),
            2 => state = state.started(),
            _ => {}
        }

        let window = queue.next_indices();
        let distinct: HashSet<usize> = window.iter().copied().collect();
        assert!(queue.index() < len);
        assert!(!window.contains(&queue.index()));
        assert_eq!(distinct.len(), window.len());

        let playback = if byte & 0x10 == 0 {
            PlaybackState::Stopped
        } else {
            PlaybackState::Playing
        };
        let snapshot = EngineSnapshot {
            pause_intensity: f32::from(byte & 0x7f),
            playback,
            instance_paused: byte & 0x20 != 0,
            overlay: PlaybackState::Stopped,
            effect_levels: [f32::from(*byte) / 128.0; 4],
        };
        let was_pending = state.advance_pending;
        let (next, tick) = reconcile(&state, &snapshot, &[*byte % 101; 4]);
        let advances = tick
            .commands
            .iter()
            .filter(|command| **command == Command::AdvanceTrack)
            .count();
        assert!(advances <= 1);
        if was_pending {
            assert_eq!(advances, 0);
        }
        assert_eq!(next.advance_pending, playback == PlaybackState::Stopped);
        state = next;
    }
});
