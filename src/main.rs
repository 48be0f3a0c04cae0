use std::process::ExitCode;

use rigid_dynamics::ConfigError;
use rigid_dynamics::SceneConfig;

const BUNDLED_SCENE: &str = include_str!("../scenes/drop.json");

const SIMULATED_SECONDS: f32 = 2.0;

const FRAME_TIME: f32 = 1.0 / 60.0;

fn load_scene() -> Result<SceneConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => SceneConfig::from_path(path),
        None => SceneConfig::from_json_str(BUNDLED_SCENE),
    }
}

fn run() -> Result<(), ConfigError> {
    let scene = load_scene()?;
    let (mut world, keys) = scene.build()?;
    log::info!("simulating {} bodies for {}s", world.len(), SIMULATED_SECONDS);

    while world.elapsed() < SIMULATED_SECONDS {
        world.advance(FRAME_TIME);
    }

    for (config, key) in scene.bodies.iter().zip(keys) {
        if let Some(body) = world.body(key) {
            log::info!(
                "{}: position {:?} velocity {:?} orientation {:?}",
                config.name.as_deref().unwrap_or("<unnamed>"),
                body.position,
                body.velocity,
                body.orientation
            );
        }
    }
    log::info!("{} steps, {:.3}s simulated", world.steps(), world.elapsed());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
