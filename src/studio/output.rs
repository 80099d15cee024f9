use super::memory::MemoryStudio;
use super::{
    BankId, EventId, InstanceId, PlaybackState, StopMode, StudioEngine, is_snapshot,
};
use crate::error::EngineError;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

const LOOPING_PREFIX: &str = "event:/Ambiences/";

// How far each snapshot pulls event output down at full intensity.
const SNAPSHOT_DUCK: &[(&str, f32)] = &[("snapshot:/Paused", 1.0), ("snapshot:/Radio", 0.4)];

struct Voice {
    sink: Sink,
    data: Arc<[u8]>,
    looping: bool,
}

pub struct RodioStudio {
    stream: OutputStream,
    state: MemoryStudio,
    voices: HashMap<InstanceId, Voice>,
}

impl RodioStudio {
    pub fn new() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::from_default_device()
            .map_err(|err| EngineError::Output(format!("no default output device: {err}")))?
            .with_error_callback(|err| log::warn!("audio stream error: {err}"))
            .open_stream_or_fallback()
            .map_err(|err| EngineError::Output(format!("failed to open output stream: {err}")))?;
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            state: MemoryStudio::new(),
            voices: HashMap::new(),
        })
    }

    fn decode(data: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, EngineError> {
        Decoder::new(Cursor::new(Arc::clone(data)))
            .map_err(|err| EngineError::Output(format!("failed to decode audio: {err}")))
    }

    fn spawn_voice(&mut self, instance: InstanceId, event: EventId) -> Result<(), EngineError> {
        if let Some(old) = self.voices.remove(&instance) {
            old.sink.stop();
        }

        let Some(data) = self.state.event_data(event) else {
            return Ok(());
        };
        let looping = self
            .state
            .event_path(event)
            .is_some_and(|path| path.starts_with(LOOPING_PREFIX));

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(Self::decode(&data)?);
        self.voices.insert(
            instance,
            Voice {
                sink,
                data,
                looping,
            },
        );
        Ok(())
    }

    fn duck(&self) -> f32 {
        SNAPSHOT_DUCK
            .iter()
            .map(|(path, depth)| {
                1.0 - depth * self.state.snapshot_intensity(path) / super::INTENSITY_MAX
            })
            .product::<f32>()
            .clamp(0.0, 1.0)
    }

    fn sync_voices(&mut self) -> Result<(), EngineError> {
        let mut ended = Vec::new();
        for (id, voice) in &self.voices {
            if !voice.sink.empty() {
                continue;
            }
            let playing = self
                .state
                .instance(*id)
                .is_ok_and(|instance| instance.state != PlaybackState::Stopped);
            if voice.looping && playing {
                voice.sink.append(Self::decode(&voice.data)?);
            } else {
                ended.push(*id);
            }
        }
        for id in ended {
            self.voices.remove(&id);
            if self.state.instance(id).is_ok() {
                self.state.finish(id)?;
            }
        }

        let duck = self.duck();
        for (id, voice) in &self.voices {
            let Ok(instance) = self.state.instance(*id) else {
                voice.sink.stop();
                continue;
            };
            if instance.state == PlaybackState::Stopped {
                voice.sink.stop();
                continue;
            }
            let amount = instance.params().written_amount().unwrap_or(1.0);
            voice
                .sink
                .set_volume((instance.gain() * amount * duck).clamp(0.0, 1.0));
            if instance.paused && !voice.sink.is_paused() {
                voice.sink.pause();
            } else if !instance.paused && voice.sink.is_paused() {
                voice.sink.play();
            }
        }
        Ok(())
    }
}

impl StudioEngine for RodioStudio {
    fn load_bank(&mut self, name: &str, data: Arc<[u8]>) -> Result<BankId, EngineError> {
        if !is_snapshot(name) {
            Self::decode(&data).map_err(|err| EngineError::BankLoad {
                name: name.to_string(),
                reason: err.to_string(),
            })?;
        }
        self.state.load_bank(name, data)
    }

    fn unload_bank(&mut self, bank: BankId) -> Result<(), EngineError> {
        self.state.unload_bank(bank)?;
        let live: Vec<InstanceId> = self.state.instances().map(|(id, _)| id).collect();
        self.voices.retain(|id, voice| {
            let keep = live.contains(id);
            if !keep {
                voice.sink.stop();
            }
            keep
        });
        Ok(())
    }

    fn event(&mut self, path: &str) -> Result<EventId, EngineError> {
        self.state.event(path)
    }

    fn create_instance(&mut self, event: EventId) -> Result<InstanceId, EngineError> {
        self.state.create_instance(event)
    }

    fn release_instance(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        self.state.release_instance(instance)?;
        if self.state.instance(instance).is_err()
            && let Some(voice) = self.voices.remove(&instance)
        {
            voice.sink.stop();
        }
        Ok(())
    }

    fn start(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        self.state.start(instance)?;
        let event = self.state.instance(instance)?.event;
        self.spawn_voice(instance, event)
    }

    fn stop(&mut self, instance: InstanceId, mode: StopMode) -> Result<(), EngineError> {
        self.state.stop(instance, mode)?;
        if mode == StopMode::Immediate
            && let Some(voice) = self.voices.remove(&instance)
        {
            voice.sink.stop();
        }
        Ok(())
    }

    fn set_paused(&mut self, instance: InstanceId, paused: bool) -> Result<(), EngineError> {
        self.state.set_paused(instance, paused)?;
        if let Some(voice) = self.voices.get(&instance) {
            if paused {
                voice.sink.pause();
            } else {
                voice.sink.play();
            }
        }
        Ok(())
    }

    fn paused(&self, instance: InstanceId) -> Result<bool, EngineError> {
        self.state.paused(instance)
    }

    fn playback_state(&self, instance: InstanceId) -> Result<PlaybackState, EngineError> {
        self.state.playback_state(instance)
    }

    fn parameter(&self, instance: InstanceId, name: &str) -> Result<f32, EngineError> {
        self.state.parameter(instance, name)
    }

    fn set_parameter(
        &mut self,
        instance: InstanceId,
        name: &str,
        value: f32,
        immediate: bool,
    ) -> Result<(), EngineError> {
        self.state.set_parameter(instance, name, value, immediate)
    }

    fn update(&mut self) -> Result<(), EngineError> {
        self.sync_voices()?;
        self.state.advance();
        let live: Vec<InstanceId> = self.state.instances().map(|(id, _)| id).collect();
        self.voices.retain(|id, voice| {
            let keep = live.contains(id);
            if !keep {
                voice.sink.stop();
            }
            keep
        });
        Ok(())
    }

    fn output_name(&self) -> String {
        String::from("System default output (rodio)")
    }
}
