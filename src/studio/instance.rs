use super::{
    EventId, FADE_STEP, INTENSITY, INTENSITY_MAX, PARAMETER_STEP, PlaybackState, SNAPSHOT_STEP,
    StopMode,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct Parameter {
    current: f32,
    target: f32,
}

#[derive(Debug, Default, Clone)]
pub(super) struct Parameters {
    values: HashMap<String, Parameter>,
}

impl Parameters {
    pub(super) fn get(&self, name: &str) -> f32 {
        if let Some(param) = self.values.get(name) {
            return param.current;
        }
        name.strip_suffix("Amount")
            .and_then(|stem| self.values.get(stem))
            .map_or(0.0, |param| param.current)
    }

    pub(super) fn written_amount(&self) -> Option<f32> {
        self.values
            .iter()
            .find(|(name, _)| name.ends_with("Amount"))
            .map(|(_, param)| param.current)
    }

    pub(super) fn set(&mut self, name: &str, value: f32, immediate: bool) {
        let param = self
            .values
            .entry(name.to_string())
            .or_insert(Parameter {
                current: value,
                target: value,
            });
        param.target = value;
        if immediate {
            param.current = value;
        }
    }

    fn advance(&mut self) {
        for param in self.values.values_mut() {
            let delta = param.target - param.current;
            if delta.abs() <= PARAMETER_STEP {
                param.current = param.target;
            } else {
                param.current += PARAMETER_STEP.copysign(delta);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct Instance {
    pub(super) event: EventId,
    pub(super) snapshot: bool,
    pub(super) state: PlaybackState,
    pub(super) paused: bool,
    pub(super) released: bool,
    pub(super) fade: f32,
    params: Parameters,
    intensity: f32,
    level: f32,
}

impl Instance {
    pub(super) fn new(event: EventId, snapshot: bool) -> Self {
        Self {
            event,
            snapshot,
            state: PlaybackState::Stopped,
            paused: false,
            released: false,
            fade: 1.0,
            params: Parameters::default(),
            intensity: 0.0,
            level: INTENSITY_MAX,
        }
    }

    pub(super) fn start(&mut self) {
        self.state = PlaybackState::Playing;
        self.fade = 1.0;
    }

    pub(super) fn stop(&mut self, mode: StopMode) {
        match mode {
            StopMode::Immediate => self.finish(),
            StopMode::AllowFadeout if self.state == PlaybackState::Playing => {
                self.state = PlaybackState::Stopping;
            }
            StopMode::AllowFadeout => {}
        }
    }

    pub(super) fn finish(&mut self) {
        self.state = PlaybackState::Stopped;
        self.fade = 0.0;
        self.intensity = 0.0;
    }

    pub(super) fn parameter(&self, name: &str) -> f32 {
        if self.snapshot && name == INTENSITY {
            self.intensity
        } else {
            self.params.get(name)
        }
    }

    pub(super) fn set_parameter(&mut self, name: &str, value: f32, immediate: bool) {
        if self.snapshot && name == INTENSITY {
            self.level = value.clamp(0.0, INTENSITY_MAX);
            if immediate && self.state == PlaybackState::Playing {
                self.intensity = self.level;
            }
        } else {
            self.params.set(name, value, immediate);
        }
    }

    pub(super) fn params(&self) -> &Parameters {
        &self.params
    }

    pub(super) fn gain(&self) -> f32 {
        match self.state {
            PlaybackState::Stopped => 0.0,
            _ => self.fade,
        }
    }

    pub(super) fn advance(&mut self) {
        self.params.advance();
        if self.paused {
            return;
        }

        match self.state {
            PlaybackState::Playing if self.snapshot => {
                self.intensity = step_toward(self.intensity, self.level, SNAPSHOT_STEP);
            }
            PlaybackState::Stopping if self.snapshot => {
                self.intensity = (self.intensity - SNAPSHOT_STEP).max(0.0);
                if self.intensity <= 0.0 {
                    self.finish();
                }
            }
            PlaybackState::Stopping => {
                self.fade = (self.fade - FADE_STEP).max(0.0);
                if self.fade <= 0.0 {
                    self.finish();
                }
            }
            PlaybackState::Playing | PlaybackState::Stopped => {}
        }
    }
}

fn step_toward(current: f32, target: f32, step: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= step {
        target
    } else {
        current + step.copysign(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolated_parameter_moves_one_step_per_advance() {
        let mut instance = Instance::new(EventId(1), false);
        instance.set_parameter("Grit", 0.0, true);
        instance.set_parameter("Grit", 1.0, false);
        assert_eq!(instance.parameter("Grit"), 0.0);

        instance.advance();
        assert!((instance.parameter("Grit") - PARAMETER_STEP).abs() < 1e-6);
    }

    #[test]
    fn amount_readback_mirrors_control_parameter() {
        let mut instance = Instance::new(EventId(1), false);
        instance.set_parameter("Chops", 0.4, true);
        assert_eq!(instance.parameter("ChopsAmount"), 0.4);
        assert_eq!(instance.parameter("Unwritten"), 0.0);
    }

    #[test]
    fn snapshot_intensity_ramps_up_and_fades_out() {
        let mut snapshot = Instance::new(EventId(2), true);
        snapshot.start();
        for _ in 0..10 {
            snapshot.advance();
        }
        assert_eq!(snapshot.parameter(INTENSITY), INTENSITY_MAX);

        snapshot.stop(StopMode::AllowFadeout);
        assert_eq!(snapshot.state, PlaybackState::Stopping);
        for _ in 0..10 {
            snapshot.advance();
        }
        assert_eq!(snapshot.state, PlaybackState::Stopped);
        assert_eq!(snapshot.parameter(INTENSITY), 0.0);
    }

    #[test]
    fn paused_instance_holds_its_fade() {
        let mut instance = Instance::new(EventId(3), false);
        instance.start();
        instance.stop(StopMode::AllowFadeout);
        instance.paused = true;
        instance.advance();
        assert_eq!(instance.fade, 1.0);
        assert_eq!(instance.state, PlaybackState::Stopping);
    }
}
