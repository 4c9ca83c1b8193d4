//! Asteroid Waves headless runner
//!
//! Drives the simulation against the headless engine with a simple
//! spin-and-shoot autopilot, then prints the final world snapshot.
//!
//! Usage: `asteroid-waves [config.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; there is no standalone web entry point
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use asteroid_waves::consts::*;
    use asteroid_waves::sim::GameEvent;
    use asteroid_waves::{GameConfig, GameState, HeadlessEngine, TickInput, resolve_collision, tick};

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.validate()?;
    let seconds: u64 = match args.next() {
        Some(s) => s.parse()?,
        None => 60,
    };

    log::info!("Asteroid Waves (headless) starting...");
    let manifest = GameState::preload();
    log::info!("Preloaded {} assets", manifest.entries.len());

    let mut engine = HeadlessEngine::new(config.bounds());
    let mut state = GameState::new(config);
    state.start(&mut engine)?;

    let input = TickInput {
        rotate_right: true,
        fire: true,
        ..Default::default()
    };
    for _ in 0..seconds * 1000 / SIM_TICK_MS {
        tick(&mut state, &mut engine, &input, SIM_TICK_MS)?;
        engine.step(SIM_DT);
        for (a, b) in engine.overlaps() {
            resolve_collision(&mut state, &mut engine, a, b)?;
        }
        for event in state.drain_events() {
            match event {
                GameEvent::WaveSpawned { .. } | GameEvent::ExtraLife { .. } | GameEvent::GameOver { .. } => {
                    log::info!("{:?}", event)
                }
                other => log::debug!("{:?}", other),
            }
        }
        if state.is_game_over() {
            break;
        }
    }

    log::info!(
        "Finished at {} ms: score {}, lives {}, wave {}",
        state.time_ms(),
        state.score(),
        state.lives(),
        state.wave()
    );
    println!("{}", serde_json::to_string_pretty(&state.snapshot())?);
    Ok(())
}
