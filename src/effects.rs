#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Grit,
    Brightness,
    Chops,
    Vocals,
}

impl EffectKind {
    pub const ALL: [Self; 4] = [Self::Grit, Self::Brightness, Self::Chops, Self::Vocals];

    pub fn index(self) -> usize {
        match self {
            Self::Grit => 0,
            Self::Brightness => 1,
            Self::Chops => 2,
            Self::Vocals => 3,
        }
    }

    pub fn parameter(self) -> &'static str {
        match self {
            Self::Grit => "Grit",
            Self::Brightness => "Brightness",
            Self::Chops => "Chops",
            Self::Vocals => "Vocals",
        }
    }

    pub fn readback(self) -> &'static str {
        match self {
            Self::Grit => "GritAmount",
            Self::Brightness => "BrightnessAmount",
            Self::Chops => "ChopsAmount",
            Self::Vocals => "VocalsAmount",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Grit => "Grit",
            Self::Brightness => "Brightness",
            Self::Chops => "Chops",
            Self::Vocals => "Vocals",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbienceKind {
    Rain,
    Vinyl,
    Birds,
    Radio,
}

impl AmbienceKind {
    pub const ALL: [Self; 4] = [Self::Rain, Self::Vinyl, Self::Birds, Self::Radio];

    pub fn index(self) -> usize {
        match self {
            Self::Rain => 0,
            Self::Vinyl => 1,
            Self::Birds => 2,
            Self::Radio => 3,
        }
    }

    pub fn event_path(self) -> &'static str {
        match self {
            Self::Rain => "event:/Ambiences/Rain",
            Self::Vinyl => "event:/Ambiences/Vinyl",
            Self::Birds => "event:/Ambiences/Birds",
            Self::Radio => "snapshot:/Radio",
        }
    }

    pub fn default_asset(self) -> Option<&'static str> {
        match self {
            Self::Rain => Some("ambience/rain.ogg"),
            Self::Vinyl => Some("ambience/vinyl.ogg"),
            Self::Birds => Some("ambience/birds.ogg"),
            Self::Radio => None,
        }
    }

    pub fn parameter(self) -> &'static str {
        match self {
            Self::Rain => "RainAmount",
            Self::Vinyl => "VinylAmount",
            Self::Birds => "BirdAmount",
            Self::Radio => crate::studio::INTENSITY,
        }
    }

    pub fn scale(self, raw: u8) -> f32 {
        match self {
            Self::Radio => f32::from(raw.min(100)),
            _ => normalize(raw),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Rain => "Rain",
            Self::Vinyl => "Vinyl",
            Self::Birds => "Birds",
            Self::Radio => "Radio",
        }
    }
}

pub fn normalize(raw: u8) -> f32 {
    f32::from(raw.min(100)) / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SliderState {
    pub values: [f32; 4],
    pub changed: bool,
}

impl SliderState {
    pub fn observe(&self, raw: &[u8; 4]) -> Self {
        let values = raw.map(normalize);
        Self {
            values,
            changed: values != self.values,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Effectiveness {
    pub mix: f32,
    // False when the parameter was outside [0, 1]; `mix` is then unclamped.
    pub in_range: bool,
}

impl Effectiveness {
    pub fn from_level(level: f32) -> Self {
        Self {
            mix: effectiveness(level),
            in_range: (0.0..=1.0).contains(&level),
        }
    }
}

pub fn effectiveness(level: f32) -> f32 {
    1.0 - (level - 1.0) * (level - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert;

    #[test]
    fn curve_hits_its_anchor_points() {
        assert_eq!(effectiveness(0.0), 0.0);
        assert_eq!(effectiveness(1.0), 1.0);
        assert_eq!(effectiveness(0.5), 0.75);
    }

    #[test]
    fn out_of_range_levels_are_flagged_not_clamped() {
        let light = Effectiveness::from_level(1.5);
        assert!(!light.in_range);
        assert_eq!(light.mix, 0.75);
        assert!(Effectiveness::from_level(0.2).in_range);
    }

    #[test]
    fn unchanged_sliders_are_not_marked_changed() {
        let first = SliderState::default().observe(&[10, 20, 30, 40]);
        assert!(first.changed);
        assert_eq!(first.values, [0.1, 0.2, 0.3, 0.4]);

        let second = first.observe(&[10, 20, 30, 40]);
        assert!(!second.changed);

        let third = second.observe(&[10, 20, 31, 40]);
        assert!(third.changed);
    }

    #[test]
    fn zero_sliders_match_the_initial_snapshot() {
        assert!(!SliderState::default().observe(&[0; 4]).changed);
    }

    #[test]
    fn radio_amount_uses_intensity_units() {
        assert_eq!(AmbienceKind::Radio.scale(40), 40.0);
        assert_eq!(AmbienceKind::Rain.scale(40), 0.4);
        assert_eq!(AmbienceKind::Radio.parameter(), "Intensity");
    }

    proptest::proptest! {
        #[test]
        fn curve_is_monotonic_on_unit_interval(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(effectiveness(low) <= effectiveness(high));
            prop_assert!((0.0..=1.0).contains(&effectiveness(low)));
        }
    }
}
