//! Ant colony sandbox
//!
//! Drives an engine the way a host game loop would: initialize once, a fixed
//! number of ticks, then deinitialize. Ants walk a one-dimensional track,
//! pick up food at the far end and drop it at the nest.
//!
//! Usage: `sandbox [config.toml|config.ron] [ticks]`

use std::cell::RefCell;
use std::rc::Rc;

use anthill::prelude::*;
use thiserror::Error;

const DEFAULT_TICKS: u32 = 20;
const TRACK_LENGTH: f32 = 10.0;

#[derive(Error, Debug)]
enum SandboxError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("invalid tick count `{0}`")]
    InvalidTicks(String),
}

struct Position(f32);
impl Component for Position {}

struct Speed(f32);
impl Component for Speed {}

/// Marks an ant on its way back to the nest with food
struct Carrying;
impl Component for Carrying {}

/// Marks an ant that should stay put this run
struct Resting;
impl Component for Resting {}

anthill::node! {
    struct WalkerNode {
        position: Position,
        speed: Speed,
    }
    exclude { Resting }
}

anthill::node! {
    struct CarrierNode {
        position: Position,
        carrying: Carrying,
    }
}

/// Moves every walking ant along the track, bouncing at both ends
struct Movement {
    walkers: Rc<NodeList<WalkerNode>>,
}

impl System for Movement {
    fn capabilities(&self) -> Capabilities {
        Capabilities::EXECUTE_FIXED
    }

    fn execute_fixed(&mut self) {
        self.walkers.for_each(|node| {
            let node = node.borrow();
            let mut position = node.position.borrow_mut();
            let mut speed = node.speed.borrow_mut();
            position.0 += speed.0;
            if !(0.0..=TRACK_LENGTH).contains(&position.0) {
                position.0 = position.0.clamp(0.0, TRACK_LENGTH);
                speed.0 = -speed.0;
            }
        });
    }
}

/// Picks up food at the far end of the track and drops it at the nest
struct Forage {
    engine: WeakEngine,
    stored: Rc<RefCell<u32>>,
}

impl System for Forage {
    fn capabilities(&self) -> Capabilities {
        Capabilities::EXECUTE | Capabilities::DEINITIALIZE
    }

    fn execute(&mut self) {
        let Some(engine) = self.engine.upgrade() else {
            return;
        };

        for ant in engine.entities() {
            let Some(position) = ant.get::<Position>() else {
                continue;
            };
            let at = position.borrow().0;

            if at >= TRACK_LENGTH && !ant.has::<Carrying>() {
                log::debug!("{ant} picked up food");
                ant.add(Carrying);
            } else if at <= 0.0 && ant.remove::<Carrying>().is_some() {
                *self.stored.borrow_mut() += 1;
                log::debug!("{ant} stored food");
            }
        }
    }

    fn deinitialize(&mut self) {
        log::info!("Colony stored {} food", self.stored.borrow());
    }
}

/// Logs how many ants are carrying food after each tick
struct Census {
    carriers: Rc<NodeList<CarrierNode>>,
    tick: u32,
}

impl System for Census {
    fn capabilities(&self) -> Capabilities {
        Capabilities::EXECUTE_LATE | Capabilities::RESET
    }

    fn execute_late(&mut self) {
        self.tick += 1;
        log::info!("tick {:>3}: {} ants carrying food", self.tick, self.carriers.len());
    }

    fn reset(&mut self) {
        self.tick = 0;
    }
}

fn parse_args() -> Result<(EngineConfig, u32), SandboxError> {
    let mut args = std::env::args().skip(1);

    let config = match args.next() {
        Some(path) => {
            log::info!("Loading config from {path}");
            EngineConfig::load_from_file(&path).map_err(EngineError::from)?
        }
        None => EngineConfig::default(),
    };

    let ticks = match args.next() {
        Some(raw) => raw.parse().map_err(|_| SandboxError::InvalidTicks(raw))?,
        None => DEFAULT_TICKS,
    };

    Ok((config, ticks))
}

fn spawn_colony(engine: &Engine) {
    for (i, speed) in [1.0, 1.5, 2.5, 0.5].into_iter().enumerate() {
        let ant = Entity::new(format!("ant{i}"));
        ant.add(Position(0.0));
        ant.add(Speed(speed));
        if i == 3 {
            ant.add(Resting);
        }
        engine.add_entity(&ant);
    }
}

fn run() -> Result<(), SandboxError> {
    let (config, ticks) = parse_args()?;
    let debug = config.debug;
    let engine = Engine::with_config(config);

    spawn_colony(&engine);

    let walkers = engine.try_get_nodes::<WalkerNode>()?;
    let carriers = engine.try_get_nodes::<CarrierNode>()?;
    log::info!("{} of {} ants are walking", walkers.len(), engine.entity_count());

    engine.add_system(Movement { walkers });
    engine.add_system(Forage {
        engine: engine.downgrade(),
        stored: Rc::default(),
    });
    engine.add_system(Census { carriers, tick: 0 });

    engine.initialize();
    for _ in 0..ticks {
        engine.execute();
        engine.execute_fixed();
        engine.execute_late();
        engine.cleanup();
    }

    if debug {
        for profile in engine.scenario().profiles() {
            log::info!(
                "{:<10} priority {:>2}: {} calls, {:?} avg",
                profile.name,
                profile.priority,
                profile.calls,
                profile.average()
            );
        }
    }

    engine.deinitialize();
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting anthill sandbox");

    if let Err(err) = run() {
        log::error!("Sandbox failed: {err}");
        std::process::exit(1);
    }
}
