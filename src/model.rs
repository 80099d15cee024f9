use crate::effects::{AmbienceKind, EffectKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub path: String,
    #[serde(alias = "displayName", alias = "display_name")]
    pub name: String,
    #[serde(default)]
    pub event: Option<String>,
}

impl TrackDescriptor {
    pub fn new(path: &str, name: &str) -> Self {
        Self {
            path: path.to_string(),
            name: name.to_string(),
            event: None,
        }
    }

    pub fn event_path(&self) -> String {
        if let Some(event) = &self.event {
            return event.clone();
        }
        let stem = Path::new(&self.path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(self.path.as_str());
        format!("event:/Tracks/{stem}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Controls {
    #[serde(default)]
    pub effects: [u8; 4],
    #[serde(default = "default_ambience_amounts")]
    pub ambience: [u8; 4],
}

impl Controls {
    pub fn effect(&self, kind: EffectKind) -> u8 {
        self.effects[kind.index()]
    }

    pub fn ambience(&self, kind: AmbienceKind) -> u8 {
        self.ambience[kind.index()]
    }

    pub fn set_effect(&mut self, kind: EffectKind, raw: u8) {
        self.effects[kind.index()] = raw.min(100);
    }

    pub fn set_ambience(&mut self, kind: AmbienceKind, raw: u8) {
        self.ambience[kind.index()] = raw.min(100);
    }
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            effects: [0; 4],
            ambience: default_ambience_amounts(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_manifest")]
    pub manifest: String,
    #[serde(default = "default_asset_root")]
    pub asset_root: PathBuf,
    // Event path to asset path for sounds loaded before the first track.
    #[serde(default = "default_sounds")]
    pub sounds: BTreeMap<String, String>,
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    #[serde(default = "default_keep_loaded")]
    pub keep_loaded: bool,
    #[serde(default)]
    pub controls: Controls,
    #[serde(default)]
    pub null_audio: bool,
}

fn default_manifest() -> String {
    String::from("tracklist.json")
}

fn default_asset_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_sounds() -> BTreeMap<String, String> {
    let mut sounds = BTreeMap::new();
    sounds.insert(
        crate::player::BUTTON_SFX.to_string(),
        String::from("sfx/tape_stop.ogg"),
    );
    for kind in AmbienceKind::ALL {
        if let Some(asset) = kind.default_asset() {
            sounds.insert(kind.event_path().to_string(), asset.to_string());
        }
    }
    sounds
}

fn default_lookahead() -> usize {
    2
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_keep_loaded() -> bool {
    true
}

fn default_ambience_amounts() -> [u8; 4] {
    [50, 50, 50, 100]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            asset_root: default_asset_root(),
            sounds: default_sounds(),
            lookahead: default_lookahead(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            keep_loaded: default_keep_loaded(),
            controls: Controls::default(),
            null_audio: false,
        }
    }
}
