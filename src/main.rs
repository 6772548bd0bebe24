use anyhow::{Context, Result};
use log::info;
use parking_lot::Mutex;
use rusted_world::core::{Direction, Position, Serial};
use rusted_world::engine::assets::{AnimationGroupsType, AnimationLibrary};
use rusted_world::engine::config::Settings;
use rusted_world::engine::game_loop::GameLoop;
use rusted_world::game::effects::{EffectRequest, GraphicEffectType};
use rusted_world::game::mobiles::Mobile;
use rusted_world::game::objects::{Item, Layer};
use rusted_world::game::world::{WalkRequestSender, World, WorldEvent};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Simulated wall time per rendered frame
const FRAME: Duration = Duration::from_millis(16);

/// Simulated seconds the demo runs for
const DEMO_SECONDS: u64 = 4;

const PLAYER: Serial = Serial(0x0000_0001);
const GUARD: Serial = Serial(0x0000_0042);
const SWORD: Serial = Serial(0x4000_0001);

/// Stand-in for the network layer: logs requests and lets the demo confirm them
#[derive(Clone, Default)]
struct LoggingSender {
    pending: Arc<Mutex<VecDeque<u8>>>,
}

impl WalkRequestSender for LoggingSender {
    fn send_walk_request(&mut self, direction: Direction, sequence: u8) {
        info!("-> walk request #{} {:?}", sequence, direction);
        self.pending.lock().push_back(sequence);
    }

    fn request_resync(&mut self) {
        info!("-> resync request");
        self.pending.lock().clear();
    }
}

fn demo_library() -> AnimationLibrary {
    let people: Vec<u8> = (0..35).collect();
    AnimationLibrary::new()
        .with_body(0x0190, AnimationGroupsType::Human)
        .with_groups(0x0190, &people, 5)
        .with_effect(0x36D4, vec![0, 1, 2, 3], 50)
        .with_effect(0x36CB, vec![0, 1, 2, 3, 4, 5, 6, 7], 50)
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Rusted World...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(&path).with_context(|| format!("loading {}", path))?,
        None => Settings::default(),
    };

    let sender = LoggingSender::default();
    let pending = Arc::clone(&sender.pending);
    let mut world = World::new(settings.clone(), Box::new(demo_library()), Box::new(sender));

    world.set_player(PLAYER, Position::new(1000, 1000, 0), Direction::EAST);

    let mut guard = Mobile::new(GUARD);
    guard.entity.set_graphic(0x0190);
    guard.entity.set_name("a guard");
    guard.entity.set_position(Position::new(1004, 1000, 0));
    world.add_mobile(guard);

    let mut sword = Item::new(SWORD);
    sword.entity.set_graphic(0x13B9);
    sword.entity.set_position(Position::new(1000, 1000, 0));
    world.add_item(sword);
    world.equip(SWORD, PLAYER, Layer::OneHanded)?;

    if let Some(player) = world.player() {
        info!("Player abilities: {:?}", player.abilities());
    }

    let mut game_loop = GameLoop::new(settings.tick_ms);
    let mut fired = false;

    while game_loop.total_ms() < DEMO_SECONDS * 1000 {
        for tick in game_loop.advance(FRAME) {
            world.walk(Direction::EAST, false);

            // Server round trip happens instantly in the demo
            let confirmed: Vec<u8> = pending.lock().drain(..).collect();
            for seq in confirmed {
                world.confirm_walk(seq);
            }

            if !fired && tick.total_ms >= 1000 {
                fired = true;
                world.spawn_effect(&EffectRequest {
                    kind: GraphicEffectType::Moving,
                    source: PLAYER,
                    target: GUARD,
                    graphic: 0x36D4,
                    hue: 0,
                    source_position: Position::default(),
                    target_position: Position::default(),
                    duration: 0,
                    fixed_direction: false,
                    explode: true,
                });
            }

            world.update(tick.total_ms, tick.frame_ms);

            for event in world.process_delta() {
                match event {
                    WorldEvent::Changed { serial, change } if serial == PLAYER => {
                        if let Some(player) = world.player() {
                            info!("[{:>5} ms] player {:?} now at {}", tick.total_ms, change, player.position());
                        }
                    }
                    other => log::debug!("[{:>5} ms] {:?}", tick.total_ms, other),
                }
            }
        }
    }

    info!(
        "Finished after {} ms ({} steps, {:.0} fps): {} live effects, {} map cells",
        game_loop.total_ms(),
        game_loop.update_count(),
        game_loop.fps(),
        world.effects().len(),
        world.map().tile_count()
    );

    world.clear();
    Ok(())
}
