use crate::error::{EngineError, LoadError};
use crate::studio::{EventId, InstanceId, PlaybackState, StopMode, StudioEngine};

#[derive(Debug, Clone)]
pub struct SingleInstanceEvent {
    path: String,
    description: Option<EventId>,
    instance: Option<InstanceId>,
}

impl SingleInstanceEvent {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            description: None,
            instance: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.description.is_some()
    }

    pub fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    pub fn load(&mut self, engine: &mut dyn StudioEngine) -> Result<(), LoadError> {
        if self.description.is_some() {
            return Ok(());
        }
        let description = engine.event(&self.path).map_err(|err| match err {
            EngineError::EventNotFound(path) => LoadError::EventNotFound(path),
            other => LoadError::Engine(other),
        })?;
        self.description = Some(description);
        Ok(())
    }

    fn description(&self) -> Result<EventId, EngineError> {
        self.description
            .ok_or_else(|| EngineError::NotLoaded(self.path.clone()))
    }

    pub fn instance(&mut self, engine: &mut dyn StudioEngine) -> Result<InstanceId, EngineError> {
        if let Some(instance) = self.instance {
            return Ok(instance);
        }
        let instance = engine.create_instance(self.description()?)?;
        self.instance = Some(instance);
        Ok(instance)
    }

    pub fn current_instance(&self) -> Option<InstanceId> {
        self.instance
    }

    pub fn one_shot(&self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        let instance = engine.create_instance(self.description()?)?;
        engine.start(instance)?;
        engine.release_instance(instance)
    }

    pub fn start(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        let instance = self.instance(engine)?;
        engine.start(instance)
    }

    pub fn stop(&self, engine: &mut dyn StudioEngine, mode: StopMode) -> Result<(), EngineError> {
        match self.instance {
            Some(instance) => engine.stop(instance, mode),
            None => Ok(()),
        }
    }

    pub fn set_paused(
        &mut self,
        engine: &mut dyn StudioEngine,
        paused: bool,
    ) -> Result<(), EngineError> {
        let instance = self.instance(engine)?;
        engine.set_paused(instance, paused)
    }

    pub fn paused(&self, engine: &dyn StudioEngine) -> Result<bool, EngineError> {
        match self.instance {
            Some(instance) => engine.paused(instance),
            None => Ok(false),
        }
    }

    pub fn playback_state(&self, engine: &dyn StudioEngine) -> Result<PlaybackState, EngineError> {
        match self.instance {
            Some(instance) => engine.playback_state(instance),
            None => Ok(PlaybackState::Stopped),
        }
    }

    pub fn parameter(&self, engine: &dyn StudioEngine, name: &str) -> Result<f32, EngineError> {
        match self.instance {
            Some(instance) => engine.parameter(instance, name),
            None => Ok(0.0),
        }
    }

    pub fn set_parameter(
        &mut self,
        engine: &mut dyn StudioEngine,
        name: &str,
        value: f32,
        immediate: bool,
    ) -> Result<(), EngineError> {
        let instance = self.instance(engine)?;
        engine.set_parameter(instance, name, value, immediate)
    }

    pub fn unload(&mut self, engine: &mut dyn StudioEngine) -> Result<(), EngineError> {
        if let Some(instance) = self.instance.take() {
            engine.release_instance(instance)?;
        }
        self.description = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::MemoryStudio;
    use std::sync::Arc;

    fn studio_with(path: &str) -> MemoryStudio {
        let mut studio = MemoryStudio::new();
        studio
            .load_bank(path, Arc::from(vec![0_u8; 4]))
            .expect("bank");
        studio
    }

    #[test]
    fn load_is_idempotent() {
        let mut studio = studio_with("event:/Ambiences/Rain");
        let mut rain = SingleInstanceEvent::new("event:/Ambiences/Rain");
        rain.load(&mut studio).expect("first load");
        rain.load(&mut studio).expect("second load");
        assert!(rain.is_loaded());
    }

    #[test]
    fn unresolved_path_is_a_load_error() {
        let mut studio = MemoryStudio::new();
        let mut missing = SingleInstanceEvent::new("event:/Ambiences/Thunder");
        assert!(matches!(
            missing.load(&mut studio),
            Err(LoadError::EventNotFound(path)) if path == "event:/Ambiences/Thunder"
        ));
        assert!(!missing.is_loaded());
    }

    #[test]
    fn start_reuses_the_persistent_instance() {
        let mut studio = studio_with("event:/Ambiences/Vinyl");
        let mut vinyl = SingleInstanceEvent::new("event:/Ambiences/Vinyl");
        vinyl.load(&mut studio).expect("load");

        vinyl.start(&mut studio).expect("start");
        let first = vinyl.current_instance();
        vinyl.start(&mut studio).expect("restart");

        assert_eq!(vinyl.current_instance(), first);
        assert_eq!(studio.instance_count(), 1);
    }

    #[test]
    fn one_shots_do_not_touch_the_persistent_instance() {
        let mut studio = studio_with("event:/SFX/tapeStop");
        let mut sfx = SingleInstanceEvent::new("event:/SFX/tapeStop");
        sfx.load(&mut studio).expect("load");

        sfx.one_shot(&mut studio).expect("first");
        sfx.one_shot(&mut studio).expect("overlapping");
        assert!(!sfx.has_instance());
        assert_eq!(studio.instance_count(), 2);

        studio.update().expect("update");
        assert_eq!(studio.instance_count(), 0);
    }

    #[test]
    fn queries_without_instance_report_stopped() {
        let mut studio = studio_with("event:/Ambiences/Birds");
        let mut birds = SingleInstanceEvent::new("event:/Ambiences/Birds");
        birds.load(&mut studio).expect("load");

        assert_eq!(birds.playback_state(&studio), Ok(PlaybackState::Stopped));
        assert_eq!(birds.paused(&studio), Ok(false));
    }

    #[test]
    fn start_before_load_is_an_engine_error() {
        let mut studio = MemoryStudio::new();
        let mut sfx = SingleInstanceEvent::new("event:/SFX/tapeStop");
        assert_eq!(
            sfx.start(&mut studio),
            Err(EngineError::NotLoaded(String::from("event:/SFX/tapeStop")))
        );
    }

    #[test]
    fn unload_releases_the_instance() {
        let mut studio = studio_with("event:/Tracks/a");
        let mut track = SingleInstanceEvent::new("event:/Tracks/a");
        track.load(&mut studio).expect("load");
        track.start(&mut studio).expect("start");
        track.stop(&mut studio, StopMode::Immediate).expect("stop");

        track.unload(&mut studio).expect("unload");
        assert!(!track.is_loaded());
        assert!(!track.has_instance());
        assert_eq!(studio.instance_count(), 0);
    }
}
