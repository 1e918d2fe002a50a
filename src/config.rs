use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::workout::{Preset, RunDistance, WorkoutDraft, DEFAULT_RUN_TENTHS, DEFAULT_VEST_LBS};

/// User preferences that seed a new workout and the presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub run_distance_tenths: u32,
    pub vest_weight_lbs: u32,
    pub preset: Option<Preset>,
    pub sound: bool,
    pub celebration: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_distance_tenths: DEFAULT_RUN_TENTHS,
            vest_weight_lbs: DEFAULT_VEST_LBS,
            preset: None,
            sound: true,
            celebration: true,
        }
    }
}

impl Settings {
    /// A fresh draft carrying the preferred distance, vest weight and preset.
    /// The run and vest questions are still left for the user to answer.
    pub fn draft(&self) -> WorkoutDraft {
        let mut draft = WorkoutDraft::new();
        draft.set_run_distance(RunDistance::from_tenths(self.run_distance_tenths));
        draft.set_vest_weight(self.vest_weight_lbs);
        if let Some(preset) = self.preset {
            draft.select_preset(preset);
        }
        draft
    }
}

pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("murph_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        serde_json::from_slice::<Settings>(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        })
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}
