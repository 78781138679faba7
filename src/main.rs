//! Inkball headless runner
//!
//! Loads a configuration (a `config.json` path, or the built-in demo levels),
//! runs the simulation at the fixed tick rate and prints the final snapshot
//! as JSON.
//!
//! Usage: `inkball [config.json] [seed] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
const DEMO_CONFIG: &str = r#"{
    "levels": [
        {
            "layout": "XXXXXXXXXXXXXXXXXX\nXS              1X\nX                X\nX   B0           X\nX                X\nX        H1      X\nX                X\nX                X\nX     2222       X\nX                X\nX   H2        S  X\nX                X\nX                X\nX                X\nX           H0   X\nX                X\nX                X\nXXXXXXXXXXXXXXXXXX",
            "time": 120,
            "spawn_interval": 5,
            "score_increase_from_hole_capture_modifier": 1.0,
            "score_decrease_from_wrong_hole_modifier": 1.0,
            "balls": ["blue", "orange", "grey", "orange"]
        },
        {
            "layout": "XXXXXXXXXXXXXXXXXX\nX S            S X\nX                X\nX   3        4   X\nX   3   H3   4   X\nX   3        4   X\nX                X\nX                X\nX  H4        H0  X\nX                X\nX                X\nX       B3       X\nX                X\nX                X\nX                X\nX                X\nX                X\nXXXXXXXXXXXXXXXXXX",
            "time": 150,
            "spawn_interval": 4,
            "score_increase_from_hole_capture_modifier": 1.5,
            "score_decrease_from_wrong_hole_modifier": 1.5,
            "balls": ["yellow", "green", "yellow", "grey"]
        }
    ],
    "score_increase_from_hole_capture": {
        "grey": 70, "orange": 50, "blue": 50, "green": 50, "yellow": 100
    },
    "score_decrease_from_wrong_hole": {
        "grey": 0, "orange": 25, "blue": 25, "green": 25, "yellow": 100
    }
}"#;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Inkball (headless) starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly; no standalone entry point
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    use inkball::GameConfig;
    use inkball::Session;
    use inkball::consts::*;
    use inkball::sim::{GamePhase, TickInput};

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => {
            log::info!("Reading config from {}", path);
            GameConfig::from_json(&std::fs::read_to_string(path)?)?
        }
        None => GameConfig::from_json(DEMO_CONFIG)?,
    };
    let seed: u64 = args.get(1).map(|s| s.parse()).transpose()?.unwrap_or(42);
    let seconds: u32 = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(60);

    let mut session = Session::new(config, seed)?;
    let input = TickInput::default();
    let mut captures = 0;

    for t in 0..seconds * TICK_RATE {
        if let Some(outcome) = session.tick(&input, SIM_DT)? {
            captures += outcome.captures.len();
        }
        if t % TICK_RATE == 0 {
            let state = &session.state;
            log::info!(
                "t={:>3}s level={} phase={:?} score={} time={} balls={} next spawn in {:.1}s",
                t / TICK_RATE,
                state.level_index,
                state.phase,
                state.score,
                state.remaining_time_display(),
                state.board.balls.len(),
                state.time_to_spawn()
            );
        }
        if session.is_finished() || session.state.phase == GamePhase::TimesUp {
            break;
        }
    }

    log::info!("Run finished: {} captures, score {}", captures, session.state.score);
    println!("{}", session.state.snapshot().to_json()?);
    Ok(())
}
