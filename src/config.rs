//! Application paths and player settings
//!
//! Paths resolve in this order: `--config-dir` → `LINEPLAY_CONFIG_DIR` →
//! current folder if it already holds lineplay files → platform dirs.
//! Settings live in `lineplay.json`; missing keys take their defaults.

use anyhow::{bail, Context, Result};
use glam::Vec3;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file name
pub const CONFIG_FILE: &str = "lineplay.json";
/// Default log file name for `--log` without a path
pub const LOG_FILE: &str = "lineplay.log";

const APP_DIR: &str = "lineplay";
const ENV_CONFIG_DIR: &str = "LINEPLAY_CONFIG_DIR";

/// Configuration for overriding default application paths
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    /// Custom config directory (from CLI or ENV)
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// Priority: CLI args → ENV var → None (use defaults)
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir = cli_dir.or_else(|| std::env::var(ENV_CONFIG_DIR).ok().map(PathBuf::from));
        Self { config_dir }
    }
}

/// Path of a configuration file.
///
/// Platform paths:
/// - Linux: ~/.config/lineplay/{name}
/// - macOS: ~/Library/Application Support/lineplay/{name}
/// - Windows: %APPDATA%\lineplay\{name}
pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::config_dir).join(name)
}

/// Path of a data file (logs).
///
/// - Linux: ~/.local/share/lineplay/{name}
pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    resolve_dir(config, dirs_next::data_dir).join(name)
}

/// Create config and data directories if missing
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let config_dir = resolve_dir(config, dirs_next::config_dir);
    let data_dir = resolve_dir(config, dirs_next::data_dir);

    for dir in [&config_dir, &data_dir] {
        if !dir.exists() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    [CONFIG_FILE, LOG_FILE].iter().any(|f| dir.join(f).exists())
}

fn resolve_dir(config: &PathConfig, platform: fn() -> Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Ok(cwd) = std::env::current_dir() {
        if has_local_files(&cwd) {
            return cwd;
        }
    }
    platform()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Playback and staging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Frame ticks per second
    pub fps: f32,
    pub auto_play: bool,
    /// Auto-advance to the next scene every `timer_interval_ms`
    pub timer_mode: bool,
    pub timer_interval_ms: u64,
    /// Stage transition duration
    pub entrance_time_ms: u64,
    /// Onstage distance from the viewer
    pub camera_distance: f32,
    /// Offstage distance from the viewer
    pub off_stage_distance: f32,
    /// Onstage distance multiplier while immersive
    pub vr_distance_multiple: f32,
    /// Scrubbing steps frames instead of only rotating
    pub spin_scrub: bool,
    pub scrub_threshold: f32,
    pub auto_rotate: bool,
    /// Radians per update
    pub auto_rotate_speed: f32,
    /// Decode threads; None = cores - 1
    pub workers: Option<usize>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            auto_play: true,
            timer_mode: false,
            timer_interval_ms: 5000,
            entrance_time_ms: 1200,
            camera_distance: 0.2,
            off_stage_distance: 3.0,
            vr_distance_multiple: 2.5,
            spin_scrub: true,
            scrub_threshold: 25.0,
            auto_rotate: true,
            auto_rotate_speed: -0.005,
            workers: None,
        }
    }
}

impl PlayerConfig {
    /// Read settings from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let config: Self = serde_json::from_str(&body)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        config.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let body = serde_json::to_string_pretty(self)?;
        std::fs::write(path, body)
            .with_context(|| format!("Failed to write settings: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            bail!("fps must be positive, got {}", self.fps);
        }
        if self.timer_interval_ms == 0 {
            bail!("timer_interval_ms must be positive");
        }
        if self.workers == Some(0) {
            bail!("workers must be at least 1");
        }
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    pub fn entrance_time(&self) -> Duration {
        Duration::from_millis(self.entrance_time_ms)
    }

    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }

    /// Stage position of the focused scene
    pub fn onstage(&self, immersive: bool) -> Vec3 {
        let z = -self.camera_distance;
        Vec3::new(0.0, 0.0, if immersive { z * self.vr_distance_multiple } else { z })
    }

    /// Stage position of every other scene
    pub fn offstage(&self) -> Vec3 {
        Vec3::new(0.0, 0.0, -self.off_stage_distance)
    }
}
