use crate::effects::{AmbienceKind, EffectKind, Effectiveness, normalize};
use crate::error::{EngineError, LoadError};
use crate::event::SingleInstanceEvent;
use crate::fetch::{AssetLoader, Fetch};
use crate::manifest;
use crate::model::{Controls, Settings};
use crate::queue::PlayQueue;
use crate::reconcile::{self, Command, EngineSnapshot, LoopState, Tick};
use crate::studio::{INTENSITY, InstanceId, PlaybackState, StopMode, StudioEngine};
use crate::track::{LoadProgress, Track};
use std::collections::BTreeMap;

pub const BUTTON_SFX: &str = "event:/SFX/tapeStop";
pub const PAUSE_OVERLAY: &str = "snapshot:/Paused";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Transition {
    direction: Direction,
    start_paused: bool,
}

pub struct Player {
    loader: AssetLoader,
    manifest_path: String,
    lookahead: usize,
    keep_loaded: bool,
    sounds: BTreeMap<String, String>,
    manifest: Fetch,
    queue: Option<PlayQueue>,
    pause_overlay: SingleInstanceEvent,
    button_sfx: SingleInstanceEvent,
    ambience: [SingleInstanceEvent; 4],
    controls: Controls,
    loop_state: LoopState,
    transition: Option<Transition>,
    stalled: Option<Transition>,
    failures: usize,
    lights: [Effectiveness; 4],
    now_playing: Option<String>,
    pub dirty: bool,
    pub status: String,
}

impl Player {
    pub fn new(settings: &Settings, loader: AssetLoader) -> Self {
        Self {
            loader,
            manifest_path: settings.manifest.clone(),
            lookahead: settings.lookahead,
            keep_loaded: settings.keep_loaded,
            sounds: settings.sounds.clone(),
            manifest: Fetch::Idle,
            queue: None,
            pause_overlay: SingleInstanceEvent::new(PAUSE_OVERLAY),
            button_sfx: SingleInstanceEvent::new(BUTTON_SFX),
            ambience: AmbienceKind::ALL.map(|kind| SingleInstanceEvent::new(kind.event_path())),
            controls: settings.controls,
            loop_state: LoopState::default(),
            transition: None,
            stalled: None,
            failures: 0,
            lights: [Effectiveness::from_level(0.0); 4],
            now_playing: None,
            dirty: true,
            status: String::from("Starting"),
        }
    }

    // Only the pause overlay is required. Every other sound degrades to a warning.
    pub fn start(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        for (event, asset) in &self.sounds {
            match self.loader.fetch_now(asset) {
                Ok(bytes) => {
                    if let Err(err) = engine.load_bank(event, bytes) {
                        log::warn!("sound {event} unavailable: {err}");
                    }
                }
                Err(err) => log::warn!("sound {event} unavailable: {err}"),
            }
        }

        self.pause_overlay
            .load(engine)
            .map_err(LoadError::into_engine)?;
        self.pause_overlay.instance(engine)?;

        if let Err(err) = self.button_sfx.load(engine) {
            log::warn!("button sound disabled: {err}");
        }
        for layer in &mut self.ambience {
            if let Err(err) = layer.load(engine) {
                log::warn!("ambience {} disabled: {err}", layer.path());
            }
        }

        self.manifest.start(&self.loader, &self.manifest_path);
        self.set_status("Loading track list");
        log::info!("player started on {}", engine.output_name());
        Ok(())
    }

    // One pass of the main loop. The engine is updated exactly once, even
    // when there is nothing to reconcile yet.
    pub fn tick(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        self.poll_manifest();
        if let Some(queue) = self.queue.as_mut() {
            queue.poll_prefetches();
        }
        self.advance_transition(engine)?;
        self.reconcile_tick(engine)?;
        engine.update()
    }

    fn poll_manifest(&mut self) {
        if self.queue.is_some() || self.manifest.failed() {
            return;
        }
        let parsed = match self.manifest.poll() {
            None => return,
            Some(Ok(bytes)) => manifest::parse(&self.manifest_path, bytes),
            Some(Err(err)) => Err(err.clone()),
        };

        match parsed {
            Ok(descriptors) => {
                log::info!("track list has {} entries", descriptors.len());
                let tracks = descriptors
                    .into_iter()
                    .enumerate()
                    .map(|(slot, descriptor)| Track::in_slot(descriptor, slot))
                    .collect();
                self.queue = PlayQueue::new(tracks, self.lookahead);
                self.transition = Some(Transition {
                    direction: Direction::Forward,
                    start_paused: true,
                });
                self.set_status("Loading first track");
            }
            Err(err) => {
                log::error!("track list unavailable: {err}");
                self.manifest = Fetch::Done(Err(err.clone()));
                self.set_status(&format!("Track list unavailable: {err} (r to retry)"));
            }
        }
    }

    fn advance_transition(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        let Some(transition) = self.transition else {
            return Ok(());
        };
        let Some(queue) = self.queue.as_mut() else {
            return Ok(());
        };

        match queue.current_track_mut().load(engine, &self.loader) {
            Ok(LoadProgress::Pending) => Ok(()),
            Ok(LoadProgress::Ready) => {
                self.transition = None;
                self.failures = 0;
                self.begin_playback(engine, transition.start_paused)
            }
            Err(LoadError::Engine(err)) => Err(err),
            Err(err) => {
                self.skip_failed(transition, &err);
                Ok(())
            }
        }
    }

    fn skip_failed(&mut self, transition: Transition, err: &LoadError) {
        let Some(queue) = self.queue.as_mut() else {
            return;
        };
        let name = queue.current_track().display_name().to_string();
        log::warn!("skipping {name}: {err}");
        self.failures += 1;

        if self.failures >= queue.len() {
            log::error!("every track failed to load, playback halted");
            self.transition = None;
            self.stalled = Some(transition);
            self.set_status("No playable tracks (r to retry)");
            return;
        }
        match transition.direction {
            Direction::Forward => queue.next_track(),
            Direction::Back => queue.last_track(),
        }
        self.set_status(&format!("Skipped {name}: {err}"));
    }

    fn begin_playback(
        &mut self,
        engine: &mut dyn StudioEngine,
        start_paused: bool,
    ) -> Result<(), EngineError> {
        let Some(queue) = self.queue.as_mut() else {
            return Ok(());
        };
        let track = queue.current_track_mut();
        let name = track.display_name().to_string();
        let path = track.path().to_string();
        let event = track
            .event_mut()
            .ok_or_else(|| EngineError::NotLoaded(path))?;

        event.start(engine)?;
        if start_paused {
            event.set_paused(engine, true)?;
        }
        for kind in EffectKind::ALL {
            let value = normalize(self.controls.effect(kind));
            event.set_parameter(engine, kind.parameter(), value, true)?;
        }
        queue.fill_next_tracks(&self.loader);

        self.loop_state = self.loop_state.started().pushed(&self.controls.effects);
        if start_paused {
            self.pause_overlay.start(engine)?;
            self.set_status(&format!("Ready: {name} (space to play)"));
        } else {
            self.set_status(&format!("Now playing {name}"));
        }
        log::info!("now playing {name}");
        self.now_playing = Some(name);
        Ok(())
    }

    fn reconcile_tick(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        if self.transition.is_some() {
            return Ok(());
        }
        let Some(queue) = self.queue.as_ref() else {
            return Ok(());
        };
        let track = queue.current_track();
        let Some(event) = track.event() else {
            return Ok(());
        };
        if !track.is_loaded() || !event.has_instance() {
            return Ok(());
        }

        let engine_ref: &dyn StudioEngine = engine;
        let mut effect_levels = [0.0; 4];
        for kind in EffectKind::ALL {
            effect_levels[kind.index()] = event.parameter(engine_ref, kind.readback())?;
        }
        let snapshot = EngineSnapshot {
            pause_intensity: self.pause_overlay.parameter(engine_ref, INTENSITY)?,
            playback: event.playback_state(engine_ref)?,
            instance_paused: event.paused(engine_ref)?,
            overlay: self.pause_overlay.playback_state(engine_ref)?,
            effect_levels,
        };

        let (next, tick) =
            reconcile::reconcile(&self.loop_state, &snapshot, &self.controls.effects);
        self.loop_state = next;
        self.apply(engine, tick)
    }

    fn apply(&mut self, engine: &mut dyn StudioEngine, tick: Tick) -> Result<(), EngineError> {
        for kind in EffectKind::ALL {
            let light = tick.lights[kind.index()];
            if !light.in_range && self.lights[kind.index()].in_range {
                log::warn!("{} readback left the [0, 1] range", kind.label());
            }
        }
        if tick.lights != self.lights {
            self.lights = tick.lights;
            self.dirty = true;
        }

        for command in tick.commands {
            match command {
                Command::PauseCurrent => {
                    if let Some(event) = self.current_event_mut() {
                        event.set_paused(engine, true)?;
                    }
                }
                Command::AdvanceTrack => {
                    log::debug!("current track ended");
                    self.change_track(engine, Direction::Forward, false)?;
                }
                Command::PushEffects { values, immediate } => {
                    if let Some(event) = self.current_event_mut() {
                        for kind in EffectKind::ALL {
                            event.set_parameter(
                                engine,
                                kind.parameter(),
                                values[kind.index()],
                                immediate,
                            )?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    pub fn next_track(
        &mut self,
        engine: &mut dyn StudioEngine,
        button_sfx: bool,
    ) -> Result<(), EngineError> {
        self.change_track(engine, Direction::Forward, button_sfx)
    }

    pub fn last_track(
        &mut self,
        engine: &mut dyn StudioEngine,
        button_sfx: bool,
    ) -> Result<(), EngineError> {
        self.change_track(engine, Direction::Back, button_sfx)
    }

    fn change_track(
        &mut self,
        engine: &mut dyn StudioEngine,
        direction: Direction,
        button_sfx: bool,
    ) -> Result<(), EngineError> {
        if self.queue.is_none() {
            return Ok(());
        }
        if self.transition.is_some() {
            log::debug!("track change ignored, one is already loading");
            return Ok(());
        }
        if button_sfx {
            self.play_button_sfx(engine)?;
        }

        let keep_loaded = self.keep_loaded;
        let Some(queue) = self.queue.as_mut() else {
            return Ok(());
        };
        let current = queue.current_track_mut();
        if let Some(event) = current.event() {
            event.stop(engine, StopMode::AllowFadeout)?;
        }
        if !keep_loaded {
            current.unload(engine)?;
        }
        match direction {
            Direction::Forward => queue.next_track(),
            Direction::Back => queue.last_track(),
        }

        self.failures = 0;
        self.transition = Some(Transition {
            direction,
            start_paused: false,
        });
        self.set_status("Loading next track");
        self.advance_transition(engine)
    }

    pub fn toggle_pause(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        self.play_button_sfx(engine)?;
        let paused = self.is_paused(engine)?;
        self.set_pause_state(engine, !paused)
    }

    pub fn is_paused(&self, engine: &dyn StudioEngine) -> Result<bool, EngineError> {
        let instance_paused = match self.current_event() {
            Some(event) => event.paused(engine)?,
            None => false,
        };
        let overlay = self.pause_overlay.playback_state(engine)?;
        Ok(reconcile::is_paused(instance_paused, overlay))
    }

    fn set_pause_state(
        &mut self,
        engine: &mut dyn StudioEngine,
        paused: bool,
    ) -> Result<(), EngineError> {
        if paused {
            self.pause_overlay.start(engine)?;
            self.set_status("Paused");
            return Ok(());
        }

        if let Some(event) = self.current_event_mut() {
            event.set_paused(engine, false)?;
        }
        self.pause_overlay.stop(engine, StopMode::AllowFadeout)?;
        match self.now_playing.clone() {
            Some(name) => self.set_status(&format!("Now playing {name}")),
            None => self.set_status("Playing"),
        }
        Ok(())
    }

    pub fn toggle_ambience(
        &mut self,
        engine: &mut dyn StudioEngine,
        kind: AmbienceKind,
    ) -> Result<(), EngineError> {
        self.play_button_sfx(engine)?;
        let layer = &mut self.ambience[kind.index()];
        if !layer.is_loaded() {
            self.set_status(&format!("{} is unavailable", kind.label()));
            return Ok(());
        }

        let on = layer.playback_state(engine)? == PlaybackState::Stopped;
        if on {
            layer.start(engine)?;
        } else {
            layer.stop(engine, StopMode::AllowFadeout)?;
        }
        self.push_ambience(engine, kind)?;
        let state = if on { "on" } else { "off" };
        self.set_status(&format!("{} {state}", kind.label()));
        Ok(())
    }

    pub fn set_ambience_amount(
        &mut self,
        engine: &mut dyn StudioEngine,
        kind: AmbienceKind,
        raw: u8,
    ) -> Result<(), EngineError> {
        self.controls.set_ambience(kind, raw);
        self.dirty = true;
        if self.ambience[kind.index()].is_loaded() {
            self.push_ambience(engine, kind)?;
        }
        Ok(())
    }

    fn push_ambience(
        &mut self,
        engine: &mut dyn StudioEngine,
        kind: AmbienceKind,
    ) -> Result<(), EngineError> {
        let value = kind.scale(self.controls.ambience(kind));
        self.ambience[kind.index()].set_parameter(engine, kind.parameter(), value, false)
    }

    pub fn set_effect(&mut self, kind: EffectKind, raw: u8) {
        self.controls.set_effect(kind, raw);
        self.dirty = true;
    }

    pub fn retry_failed(&mut self) {
        if self.manifest.failed() {
            self.manifest.reset_failed();
            self.manifest.start(&self.loader, &self.manifest_path);
            self.set_status("Retrying track list");
            return;
        }

        let Some(queue) = self.queue.as_mut() else {
            self.set_status("Nothing to retry");
            return;
        };
        for idx in 0..queue.len() {
            if let Some(track) = queue.track_mut(idx) {
                track.retry();
            }
        }
        match self.stalled.take() {
            Some(transition) => {
                self.failures = 0;
                self.transition = Some(transition);
                self.set_status("Retrying tracks");
            }
            None => self.set_status("Retrying failed downloads"),
        }
    }

    fn play_button_sfx(&self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        if self.button_sfx.is_loaded() {
            self.button_sfx.one_shot(engine)?;
        }
        Ok(())
    }

    fn current_event(&self) -> Option<&SingleInstanceEvent> {
        self.queue.as_ref()?.current_track().event()
    }

    fn current_event_mut(&mut self) -> Option<&mut SingleInstanceEvent> {
        self.queue.as_mut()?.current_track_mut().event_mut()
    }

    pub fn current_instance(&self) -> Option<InstanceId> {
        self.current_event()?.current_instance()
    }

    pub fn queue(&self) -> Option<&PlayQueue> {
        self.queue.as_ref()
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn lights(&self) -> &[Effectiveness; 4] {
        &self.lights
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.transition.is_some() || self.manifest.is_in_flight()
    }

    pub fn is_halted(&self) -> bool {
        self.stalled.is_some()
    }

    pub fn ambience_available(&self, kind: AmbienceKind) -> bool {
        self.ambience[kind.index()].is_loaded()
    }

    pub fn ambience_active(&self, engine: &dyn StudioEngine, kind: AmbienceKind) -> bool {
        self.ambience[kind.index()]
            .playback_state(engine)
            .is_ok_and(|state| state == PlaybackState::Playing)
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryAssetSource;
    use crate::studio::MemoryStudio;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const MANIFEST: &str = r#"[
        {"path": "tracks/a.ogg", "name": "A"},
        {"path": "tracks/b.ogg", "name": "B"},
        {"path": "tracks/c.ogg", "name": "C"}
    ]"#;

    fn source() -> MemoryAssetSource {
        MemoryAssetSource::new()
            .with_asset("tracklist.json", MANIFEST)
            .with_asset("tracks/a.ogg", vec![1_u8; 8])
            .with_asset("tracks/b.ogg", vec![2_u8; 8])
            .with_asset("tracks/c.ogg", vec![3_u8; 8])
            .with_asset("sfx/tape_stop.ogg", vec![4_u8; 8])
            .with_asset("ambience/rain.ogg", vec![5_u8; 8])
    }

    fn player_with(source: MemoryAssetSource, settings: Settings) -> (Player, MemoryStudio) {
        let loader = AssetLoader::new(Arc::new(source), Duration::from_secs(5));
        let mut player = Player::new(&settings, loader);
        let mut studio = MemoryStudio::new();
        player.start(&mut studio).expect("start");
        (player, studio)
    }

    fn tick_until(
        player: &mut Player,
        studio: &mut MemoryStudio,
        done: impl Fn(&Player) -> bool,
    ) {
        for _ in 0..500 {
            player.tick(studio).expect("tick");
            if done(player) {
                return;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("condition never reached");
    }

    fn running() -> (Player, MemoryStudio) {
        let (mut player, mut studio) = player_with(source(), Settings::default());
        tick_until(&mut player, &mut studio, |p| p.now_playing().is_some());
        (player, studio)
    }

    #[test]
    fn first_track_starts_paused_behind_the_overlay() {
        let (player, studio) = running();
        assert_eq!(player.now_playing(), Some("A"));
        assert_eq!(player.is_paused(&studio), Ok(true));

        let instance = player.current_instance().expect("instance");
        assert_eq!(studio.paused(instance), Ok(true));
        assert_eq!(studio.playback_state(instance), Ok(PlaybackState::Playing));
    }

    #[test]
    fn every_tick_updates_the_engine_once() {
        let (mut player, mut studio) = running();
        let before = studio.updates();
        for _ in 0..3 {
            player.tick(&mut studio).expect("tick");
        }
        assert_eq!(studio.updates(), before + 3);
    }

    #[test]
    fn finished_track_advances_exactly_once() {
        let (mut player, mut studio) = running();
        let instance = player.current_instance().expect("instance");
        studio.finish(instance).expect("finish");

        tick_until(&mut player, &mut studio, |p| p.now_playing() == Some("B"));
        for _ in 0..5 {
            player.tick(&mut studio).expect("tick");
        }
        assert_eq!(player.queue().map(PlayQueue::index), Some(1));
    }

    #[test]
    fn unchanged_sliders_write_nothing() {
        let (mut player, mut studio) = running();
        player.tick(&mut studio).expect("settle");
        let before = studio.parameter_writes();
        for _ in 0..5 {
            player.tick(&mut studio).expect("tick");
        }
        assert_eq!(studio.parameter_writes(), before);

        player.set_effect(EffectKind::Grit, 60);
        player.tick(&mut studio).expect("tick");
        assert_eq!(studio.parameter_writes(), before + EffectKind::ALL.len());
    }

    #[test]
    fn pause_toggles_both_ways() {
        let (mut player, mut studio) = running();
        player.toggle_pause(&mut studio).expect("resume");
        for _ in 0..20 {
            player.tick(&mut studio).expect("tick");
        }
        assert_eq!(player.is_paused(&studio), Ok(false));

        player.toggle_pause(&mut studio).expect("pause");
        assert_eq!(player.is_paused(&studio), Ok(true));
    }

    #[test]
    fn manual_change_is_ignored_while_loading() {
        let slow = source().with_delay(Duration::from_millis(40));
        let mut settings = Settings::default();
        settings.lookahead = 0;
        let (mut player, mut studio) = player_with(slow, settings);
        tick_until(&mut player, &mut studio, |p| p.now_playing().is_some());

        player.next_track(&mut studio, true).expect("next");
        assert!(player.is_loading());
        player.next_track(&mut studio, true).expect("ignored");
        assert_eq!(player.queue().map(PlayQueue::index), Some(1));

        tick_until(&mut player, &mut studio, |p| p.now_playing() == Some("B"));
    }

    #[test]
    fn last_track_wraps_and_unloads_when_not_keeping() {
        let mut settings = Settings::default();
        settings.keep_loaded = false;
        let (mut player, mut studio) = player_with(source(), settings);
        tick_until(&mut player, &mut studio, |p| p.now_playing().is_some());

        player.last_track(&mut studio, false).expect("last");
        tick_until(&mut player, &mut studio, |p| p.now_playing() == Some("C"));
        let queue = player.queue().expect("queue");
        assert!(!queue.tracks()[0].is_loaded());
    }

    #[test]
    fn ambience_toggle_starts_and_fades_the_layer() {
        let (mut player, mut studio) = running();
        assert!(player.ambience_available(AmbienceKind::Rain));
        assert!(!player.ambience_available(AmbienceKind::Birds));

        player
            .toggle_ambience(&mut studio, AmbienceKind::Rain)
            .expect("on");
        assert!(player.ambience_active(&studio, AmbienceKind::Rain));

        player
            .toggle_ambience(&mut studio, AmbienceKind::Rain)
            .expect("off");
        assert!(!player.ambience_active(&studio, AmbienceKind::Rain));

        player
            .toggle_ambience(&mut studio, AmbienceKind::Birds)
            .expect("unavailable");
        assert!(player.status.contains("unavailable"));
    }

    #[test]
    fn radio_snapshot_takes_the_raw_amount() {
        let (mut player, mut studio) = running();
        player
            .toggle_ambience(&mut studio, AmbienceKind::Radio)
            .expect("on");
        player
            .set_ambience_amount(&mut studio, AmbienceKind::Radio, 40)
            .expect("amount");
        for _ in 0..20 {
            player.tick(&mut studio).expect("tick");
        }
        let radio = &player.ambience[AmbienceKind::Radio.index()];
        assert_eq!(radio.parameter(&studio, INTENSITY), Ok(40.0));
    }

    #[test]
    fn failed_track_is_skipped() {
        let source = MemoryAssetSource::new()
            .with_asset("tracklist.json", MANIFEST)
            .with_asset("tracks/b.ogg", vec![2_u8; 8]);
        let (mut player, mut studio) = player_with(source, Settings::default());
        tick_until(&mut player, &mut studio, |p| p.now_playing().is_some());
        assert_eq!(player.now_playing(), Some("B"));
    }

    #[test]
    fn repeated_manifest_entry_plays_twice() {
        let manifest = r#"[
            {"path": "tracks/a.ogg", "name": "A"},
            {"path": "tracks/b.ogg", "name": "B"},
            {"path": "tracks/a.ogg", "name": "A"}
        ]"#;
        let source = source().with_asset("tracklist.json", manifest);
        let (mut player, mut studio) = player_with(source, Settings::default());
        tick_until(&mut player, &mut studio, |p| p.now_playing() == Some("A"));

        player.next_track(&mut studio, true).expect("to B");
        tick_until(&mut player, &mut studio, |p| p.now_playing() == Some("B"));
        player.next_track(&mut studio, true).expect("to A again");
        tick_until(&mut player, &mut studio, |p| {
            p.now_playing() == Some("A") && !p.is_loading()
        });

        assert_eq!(player.queue().map(PlayQueue::index), Some(2));
        assert!(!player.is_halted());
        assert_eq!(player.status, "Now playing A");
    }

    #[test]
    fn missing_lookahead_track_is_flagged_while_playing() {
        let source = MemoryAssetSource::new()
            .with_asset("tracklist.json", MANIFEST)
            .with_asset("tracks/a.ogg", vec![1_u8; 8])
            .with_asset("tracks/c.ogg", vec![3_u8; 8]);
        let (mut player, mut studio) = player_with(source, Settings::default());
        tick_until(&mut player, &mut studio, |p| {
            p.queue().is_some_and(|queue| queue.tracks()[1].fetch_failed())
        });

        assert_eq!(player.now_playing(), Some("A"));
        assert_eq!(player.queue().map(PlayQueue::index), Some(0));
    }

    #[test]
    fn all_tracks_failing_halts_until_retry() {
        let source = MemoryAssetSource::new().with_asset("tracklist.json", MANIFEST);
        let (mut player, mut studio) = player_with(source, Settings::default());
        tick_until(&mut player, &mut studio, Player::is_halted);
        assert!(player.now_playing().is_none());

        player.retry_failed();
        assert!(!player.is_halted());
        assert!(player.is_loading());
    }

    #[test]
    fn missing_manifest_can_be_retried() {
        let (mut player, mut studio) = player_with(MemoryAssetSource::new(), Settings::default());
        tick_until(&mut player, &mut studio, |p| p.status.contains("unavailable"));
        assert!(player.queue().is_none());

        player.retry_failed();
        assert!(player.is_loading());
    }
}
