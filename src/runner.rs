//! Application runner - headless playback loop and `--check` mode.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cli::Args;
use crate::config::{self, PlayerConfig};
use crate::core::{default_pool_size, FileFetcher, Orchestrator, PlayerEvent, SceneLoader, Workers};
use crate::entities::{AnimationSet, Fetch, WorkerPool};

/// Headless loop period (~60 Hz)
const FRAME_PERIOD: Duration = Duration::from_millis(16);
/// Per-scene limit for `--check`
const CHECK_TIMEOUT: Duration = Duration::from_secs(60);

/// Run lineplay with parsed arguments.
pub fn run_app(args: Args) -> Result<()> {
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = config::ensure_dirs(&path_config) {
        warn!("Failed to create application directories: {}", e);
    }

    let config_path = config::config_file(config::CONFIG_FILE, &path_config);
    info!("Config path: {}", config_path.display());

    let mut player_config = PlayerConfig::load(&config_path)?;
    args.apply_to(&mut player_config);
    player_config.validate().context("Invalid settings after CLI overrides")?;
    debug!("Settings: {:?}", player_config);

    let (set, base_dir) = load_scene_set(&args)?;
    if set.is_empty() {
        bail!("No scenes to play: pass a manifest or --scene FILE");
    }
    info!("{} scenes: {}", set.len(), set.names().join(", "));

    let threads = player_config.workers.unwrap_or_else(default_pool_size);
    let workers: Arc<dyn WorkerPool> =
        Arc::new(Workers::new(threads).context("Failed to start decode workers")?);
    let fetcher: Arc<dyn Fetch> = Arc::new(match base_dir {
        Some(dir) => FileFetcher::with_base_dir(dir),
        None => FileFetcher::new(),
    });

    if args.check {
        run_check(&set, workers, fetcher)
    } else {
        run_playback(&set, workers, fetcher, player_config, args.seconds)
    }
}

/// Collect scenes from the manifest and `--scene` files, in that order.
///
/// Returns the set plus the manifest folder for resolving relative urls.
pub fn load_scene_set(args: &Args) -> Result<(AnimationSet, Option<PathBuf>)> {
    let mut set = AnimationSet::default();
    let mut base_dir = None;

    if let Some(manifest) = &args.manifest {
        let body = std::fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read manifest: {}", manifest.display()))?;
        set = AnimationSet::parse(&body)
            .with_context(|| format!("Invalid manifest: {}", manifest.display()))?;
        base_dir = manifest.parent().map(Path::to_path_buf);
        info!("Manifest {}: {} scenes", manifest.display(), set.len());
    }

    if !args.scenes.is_empty() {
        // Scene files are relative to the working directory, not the manifest
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        let files = args
            .scenes
            .iter()
            .map(|p| cwd.join(p).to_string_lossy().into_owned());
        set.merge(AnimationSet::from_locators(files));
    }

    Ok((set, base_dir))
}

/// Load every scene and print one line per scene. Fails if any scene fails.
fn run_check(set: &AnimationSet, workers: Arc<dyn WorkerPool>, fetcher: Arc<dyn Fetch>) -> Result<()> {
    let names = set.names();
    let mut loader = SceneLoader::new(set.entries(), workers, fetcher);
    let started = Instant::now();

    for i in 0..loader.len() {
        loader.request(i);
    }

    let mut failed = 0;
    for (i, name) in names.iter().enumerate() {
        match loader.wait_for(i, CHECK_TIMEOUT) {
            Ok(scene) => println!(
                "{:<24} ok    {} clips, {} frames, {} vertices",
                name,
                scene.clips().len(),
                scene.frame_count(),
                scene.vertex_count()
            ),
            Err(e) => {
                failed += 1;
                println!("{:<24} FAIL  {}", name, e);
            }
        }
    }

    let stats = loader.stats();
    info!(
        "Check finished in {:.2?}: {} fetches, {} decode jobs, {} results",
        started.elapsed(),
        stats.fetches(),
        stats.jobs_submitted(),
        stats.results_routed()
    );

    if failed > 0 {
        bail!("{} of {} scenes failed to load", failed, names.len());
    }
    Ok(())
}

/// Drive the orchestrator at display rate for `seconds`.
fn run_playback(
    set: &AnimationSet,
    workers: Arc<dyn WorkerPool>,
    fetcher: Arc<dyn Fetch>,
    config: PlayerConfig,
    seconds: f32,
) -> Result<()> {
    let names = set.names();
    let mut orch = Orchestrator::new(set.entries(), workers, fetcher, config);
    orch.start();

    let run_for = Duration::from_secs_f32(seconds.max(0.0));
    let started = Instant::now();
    let mut last = started;

    while started.elapsed() < run_for {
        std::thread::sleep(FRAME_PERIOD);
        let now = Instant::now();
        orch.update(now - last);
        last = now;

        for event in orch.events().poll() {
            log_event(&event, &names);
        }
    }

    match orch.focused_scene() {
        Some(scene) => info!(
            "Stopped on {:?} at frames {:?}",
            orch.focused().map(|i| names[i].as_str()),
            scene.frame_indices()
        ),
        None => warn!("No scene was shown"),
    }
    orch.dispose();
    Ok(())
}

fn log_event(event: &PlayerEvent, names: &[String]) {
    let name = |i: &usize| names.get(*i).map(String::as_str).unwrap_or("?");
    match event {
        PlayerEvent::SceneReady { index } => debug!("Scene ready: {}", name(index)),
        PlayerEvent::SceneFailed { index, error } => warn!("Scene {} failed: {}", name(index), error),
        PlayerEvent::FocusChanged { to, .. } => info!("Now showing: {}", name(to)),
        PlayerEvent::TransitionAborted { target } => warn!("Skipped {}: not loadable", name(target)),
        PlayerEvent::AdvanceDropped { .. } => debug!("Advance ignored during transition"),
        PlayerEvent::PlaybackToggled { playing } => debug!("Playing: {}", playing),
    }
}
