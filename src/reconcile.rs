use crate::effects::{Effectiveness, SliderState};
use crate::studio::{INTENSITY_MAX, PlaybackState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSnapshot {
    pub pause_intensity: f32,
    pub playback: PlaybackState,
    pub instance_paused: bool,
    pub overlay: PlaybackState,
    // Indexed like `EffectKind::ALL`.
    pub effect_levels: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PauseCurrent,
    AdvanceTrack,
    PushEffects { values: [f32; 4], immediate: bool },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tick {
    pub commands: Vec<Command>,
    pub lights: [Effectiveness; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoopState {
    pub sliders: SliderState,
    // An advance was issued for the current stop and no start followed yet.
    pub advance_pending: bool,
}

impl LoopState {
    pub fn started(self) -> Self {
        Self {
            advance_pending: false,
            ..self
        }
    }

    pub fn pushed(self, raw: &[u8; 4]) -> Self {
        Self {
            sliders: SliderState {
                values: self.sliders.observe(raw).values,
                changed: false,
            },
            ..self
        }
    }
}

pub fn is_paused(instance_paused: bool, overlay: PlaybackState) -> bool {
    instance_paused || overlay != PlaybackState::Stopped
}

pub fn reconcile(
    prev: &LoopState,
    snapshot: &EngineSnapshot,
    sliders: &[u8; 4],
) -> (LoopState, Tick) {
    let mut commands = Vec::new();
    let mut next = *prev;

    if snapshot.pause_intensity >= INTENSITY_MAX
        && !is_paused(snapshot.instance_paused, snapshot.overlay)
    {
        commands.push(Command::PauseCurrent);
    }

    if snapshot.playback == PlaybackState::Stopped {
        if !prev.advance_pending {
            commands.push(Command::AdvanceTrack);
            next.advance_pending = true;
        }
    } else {
        next.advance_pending = false;
    }

    next.sliders = prev.sliders.observe(sliders);
    if next.sliders.changed {
        commands.push(Command::PushEffects {
            values: next.sliders.values,
            immediate: false,
        });
    }

    let lights = snapshot.effect_levels.map(Effectiveness::from_level);
    (next, Tick { commands, lights })
}
