use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnakeError};
use crate::storage::{ContentProvider, FileContentProvider};

const CONFIG_FILE_NAME: &str = "gridsnake_config.yaml";
const HIGH_SCORE_FILE_NAME: &str = "gridsnake_high_score.yaml";
const MAX_PIXELS: i32 = 1000;

pub trait Validate {
    fn validate(&self) -> std::result::Result<(), String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PointerMode {
    // decide from the terminal type
    Auto,
    On,
    Off,
}

impl PointerMode {
    // Pointer reporting is the terminal's stand-in for touch support. Linux
    // virtual consoles and dumb terminals never report pointer events.
    pub fn is_supported(&self, term: Option<&str>) -> bool {
        match self {
            PointerMode::On => true,
            PointerMode::Off => false,
            PointerMode::Auto => match term {
                None => false,
                Some(term) => !matches!(term, "" | "dumb" | "linux"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_interval_ms: u64,
    pub swipe_threshold_px: i32,
    pub cell_width_px: i32,
    pub cell_height_px: i32,
    pub pointer: PointerMode,
    pub color: bool,
    pub high_score_file: PathBuf,
    pub log_file: Option<PathBuf>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 150,
            swipe_threshold_px: 50,
            cell_width_px: 10,
            cell_height_px: 20,
            pointer: PointerMode::Auto,
            color: true,
            high_score_file: file_next_to_exe(HIGH_SCORE_FILE_NAME),
            log_file: None,
        }
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if !(50..=2000).contains(&self.tick_interval_ms) {
            return Err("Tick interval must be between 50ms and 2000ms".to_string());
        }
        if !(1..=MAX_PIXELS).contains(&self.swipe_threshold_px) {
            return Err(format!("Swipe threshold must be between 1 and {}px", MAX_PIXELS));
        }
        if !(1..=MAX_PIXELS).contains(&self.cell_width_px)
            || !(1..=MAX_PIXELS).contains(&self.cell_height_px)
        {
            return Err(format!("Cell pixel size must be between 1 and {}px", MAX_PIXELS));
        }
        if self.high_score_file.as_os_str().is_empty() {
            return Err("High score file path must not be empty".to_string());
        }
        Ok(())
    }
}

fn file_next_to_exe(file_name: &str) -> PathBuf {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(file_name);
        }
    }
    PathBuf::from(file_name)
}

pub fn default_config_path() -> PathBuf {
    file_next_to_exe(CONFIG_FILE_NAME)
}

// A missing document yields the defaults; a present one must parse and validate.
pub fn load_config(provider: &impl ContentProvider) -> Result<GameConfig> {
    let config = match provider.get_content()? {
        Some(content) => serde_yaml_ng::from_str::<GameConfig>(&content)?,
        None => GameConfig::default(),
    };
    config.validate().map_err(SnakeError::InvalidConfig)?;
    Ok(config)
}

pub fn load_config_file(path: impl Into<PathBuf>) -> Result<GameConfig> {
    load_config(&FileContentProvider::new(path))
}
