use super::instance::Instance;
use super::{
    BankId, EventId, InstanceId, PlaybackState, StopMode, StudioEngine, is_snapshot,
};
use crate::error::EngineError;
use std::collections::HashMap;
use std::sync::Arc;

struct Bank {
    name: String,
    data: Arc<[u8]>,
    event: EventId,
}

pub struct MemoryStudio {
    banks: HashMap<BankId, Bank>,
    events: HashMap<String, EventId>,
    descriptions: HashMap<EventId, String>,
    instances: HashMap<InstanceId, Instance>,
    next_id: u32,
    updates: u64,
    parameter_writes: usize,
}

impl MemoryStudio {
    pub fn new() -> Self {
        Self {
            banks: HashMap::new(),
            events: HashMap::new(),
            descriptions: HashMap::new(),
            instances: HashMap::new(),
            next_id: 1,
            updates: 0,
            parameter_writes: 0,
        }
    }

    pub fn parameter_writes(&self) -> usize {
        self.parameter_writes
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn bank_count(&self) -> usize {
        self.banks.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn finish(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        self.instance_mut(instance)?.finish();
        Ok(())
    }

    pub(super) fn event_path(&self, event: EventId) -> Option<&str> {
        self.descriptions.get(&event).map(String::as_str)
    }

    pub(super) fn event_data(&self, event: EventId) -> Option<Arc<[u8]>> {
        self.banks
            .values()
            .find(|bank| bank.event == event)
            .map(|bank| Arc::clone(&bank.data))
    }

    pub(super) fn instance(&self, instance: InstanceId) -> Result<&Instance, EngineError> {
        self.instances
            .get(&instance)
            .ok_or(EngineError::InvalidHandle {
                kind: "instance",
                id: instance.0,
            })
    }

    fn instance_mut(&mut self, instance: InstanceId) -> Result<&mut Instance, EngineError> {
        self.instances
            .get_mut(&instance)
            .ok_or(EngineError::InvalidHandle {
                kind: "instance",
                id: instance.0,
            })
    }

    pub(super) fn instances(&self) -> impl Iterator<Item = (InstanceId, &Instance)> {
        self.instances.iter().map(|(id, instance)| (*id, instance))
    }

    pub(super) fn snapshot_intensity(&self, path: &str) -> f32 {
        let Some(event) = self.events.get(path) else {
            return 0.0;
        };
        self.instances
            .values()
            .filter(|instance| instance.event == *event)
            .map(|instance| instance.parameter(super::INTENSITY))
            .fold(0.0, f32::max)
    }

    pub(super) fn advance(&mut self) {
        for instance in self.instances.values_mut() {
            instance.advance();
        }
        self.instances.retain(|_, instance| {
            !(instance.released && instance.state == PlaybackState::Stopped)
        });
        self.updates += 1;
    }

    fn allocate(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for MemoryStudio {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioEngine for MemoryStudio {
    fn load_bank(&mut self, name: &str, data: Arc<[u8]>) -> Result<BankId, EngineError> {
        if self.banks.values().any(|bank| bank.name == name) {
            return Err(EngineError::BankAlreadyLoaded(name.to_string()));
        }
        if data.is_empty() {
            return Err(EngineError::BankLoad {
                name: name.to_string(),
                reason: String::from("bank is empty"),
            });
        }

        let bank = BankId(self.allocate());
        let event = EventId(self.allocate());
        self.events.insert(name.to_string(), event);
        self.descriptions.insert(event, name.to_string());
        self.banks.insert(
            bank,
            Bank {
                name: name.to_string(),
                data,
                event,
            },
        );
        Ok(bank)
    }

    fn unload_bank(&mut self, bank: BankId) -> Result<(), EngineError> {
        let removed = self.banks.remove(&bank).ok_or(EngineError::InvalidHandle {
            kind: "bank",
            id: bank.0,
        })?;
        self.events.remove(&removed.name);
        self.descriptions.remove(&removed.event);
        self.instances
            .retain(|_, instance| instance.event != removed.event);
        Ok(())
    }

    fn event(&mut self, path: &str) -> Result<EventId, EngineError> {
        if let Some(event) = self.events.get(path) {
            return Ok(*event);
        }
        if !is_snapshot(path) {
            return Err(EngineError::EventNotFound(path.to_string()));
        }

        let event = EventId(self.allocate());
        self.events.insert(path.to_string(), event);
        self.descriptions.insert(event, path.to_string());
        Ok(event)
    }

    fn create_instance(&mut self, event: EventId) -> Result<InstanceId, EngineError> {
        let path = self
            .descriptions
            .get(&event)
            .ok_or(EngineError::InvalidHandle {
                kind: "event",
                id: event.0,
            })?;
        let snapshot = is_snapshot(path);
        let instance = InstanceId(self.allocate());
        self.instances
            .insert(instance, Instance::new(event, snapshot));
        Ok(instance)
    }

    fn release_instance(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        let entry = self.instance_mut(instance)?;
        if entry.state == PlaybackState::Stopped {
            self.instances.remove(&instance);
        } else {
            entry.released = true;
        }
        Ok(())
    }

    fn start(&mut self, instance: InstanceId) -> Result<(), EngineError> {
        self.instance_mut(instance)?.start();
        Ok(())
    }

    fn stop(&mut self, instance: InstanceId, mode: StopMode) -> Result<(), EngineError> {
        self.instance_mut(instance)?.stop(mode);
        Ok(())
    }

    fn set_paused(&mut self, instance: InstanceId, paused: bool) -> Result<(), EngineError> {
        self.instance_mut(instance)?.paused = paused;
        Ok(())
    }

    fn paused(&self, instance: InstanceId) -> Result<bool, EngineError> {
        Ok(self.instance(instance)?.paused)
    }

    fn playback_state(&self, instance: InstanceId) -> Result<PlaybackState, EngineError> {
        Ok(self.instance(instance)?.state)
    }

    fn parameter(&self, instance: InstanceId, name: &str) -> Result<f32, EngineError> {
        Ok(self.instance(instance)?.parameter(name))
    }

    fn set_parameter(
        &mut self,
        instance: InstanceId,
        name: &str,
        value: f32,
        immediate: bool,
    ) -> Result<(), EngineError> {
        self.instance_mut(instance)?
            .set_parameter(name, value, immediate);
        self.parameter_writes += 1;
        Ok(())
    }

    fn update(&mut self) -> Result<(), EngineError> {
        for instance in self.instances.values_mut() {
            if instance.released && instance.state == PlaybackState::Playing {
                instance.finish();
            }
        }
        self.advance();
        Ok(())
    }

    fn output_name(&self) -> String {
        String::from("Silent (no output device)")
    }
}
