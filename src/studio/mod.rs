mod instance;
mod memory;
mod output;

pub use memory::MemoryStudio;
pub use output::RodioStudio;

use crate::error::EngineError;
use std::fmt;
use std::sync::Arc;

pub const SNAPSHOT_PREFIX: &str = "snapshot:/";
pub const INTENSITY: &str = "Intensity";
pub const INTENSITY_MAX: f32 = 100.0;

pub const PARAMETER_STEP: f32 = 0.05;
pub const FADE_STEP: f32 = 0.1;
pub const SNAPSHOT_STEP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BankId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    AllowFadeout,
    Immediate,
}

pub trait StudioEngine {
    // A bank exposes one event, named by the bank's label.
    fn load_bank(&mut self, name: &str, data: Arc<[u8]>) -> Result<BankId, EngineError>;
    fn unload_bank(&mut self, bank: BankId) -> Result<(), EngineError>;
    fn event(&mut self, path: &str) -> Result<EventId, EngineError>;
    fn create_instance(&mut self, event: EventId) -> Result<InstanceId, EngineError>;
    fn release_instance(&mut self, instance: InstanceId) -> Result<(), EngineError>;
    // Starting a playing instance restarts it.
    fn start(&mut self, instance: InstanceId) -> Result<(), EngineError>;
    fn stop(&mut self, instance: InstanceId, mode: StopMode) -> Result<(), EngineError>;
    fn set_paused(&mut self, instance: InstanceId, paused: bool) -> Result<(), EngineError>;
    fn paused(&self, instance: InstanceId) -> Result<bool, EngineError>;
    fn playback_state(&self, instance: InstanceId) -> Result<PlaybackState, EngineError>;
    /// Parameters that were never written read as zero. `FooAmount` reads back
    /// the current value of `Foo` when `FooAmount` itself was never written.
    fn parameter(&self, instance: InstanceId, name: &str) -> Result<f32, EngineError>;
    fn set_parameter(
        &mut self,
        instance: InstanceId,
        name: &str,
        value: f32,
        immediate: bool,
    ) -> Result<(), EngineError>;
    fn update(&mut self) -> Result<(), EngineError>;
    fn output_name(&self) -> String;
}

pub fn is_snapshot(path: &str) -> bool {
    path.starts_with(SNAPSHOT_PREFIX)
}
