use clap::Parser;
use std::path::PathBuf;

use crate::config::PlayerConfig;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Headless line-art animation player
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Animation set manifest (JSON: {"scenes": {"name": {"url", "scale"}}})
    #[arg(value_name = "MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Single animation document to add as a scene (can be specified multiple times)
    #[arg(short = 's', long = "scene", value_name = "SCENE_FILE")]
    pub scenes: Vec<PathBuf>,

    /// Load every scene, print a summary and exit (non-zero on any failure)
    #[arg(long = "check")]
    pub check: bool,

    /// Headless playback duration in seconds
    #[arg(long = "seconds", value_name = "N", default_value_t = 10.0)]
    pub seconds: f32,

    /// Playback rate override
    #[arg(long = "fps", value_name = "N")]
    pub fps: Option<f32>,

    /// Auto-advance scenes on a timer
    #[arg(short = 't', long = "timer")]
    pub timer: bool,

    /// Decode worker threads (default: cores - 1)
    #[arg(short = 'w', long = "workers", value_name = "N")]
    pub workers: Option<usize>,

    /// Enable debug logging to file (default: lineplay.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// Merge CLI overrides on top of file settings
    pub fn apply_to(&self, config: &mut PlayerConfig) {
        if let Some(fps) = self.fps {
            config.fps = fps;
        }
        if self.timer {
            config.timer_mode = true;
        }
        if let Some(n) = self.workers {
            config.workers = Some(n);
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
