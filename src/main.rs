//! Merge Well entry point
//!
//! Headless autoplay: drops pieces at random positions until the well
//! overflows, firing a power-up when a breach has lasted too long.
//!
//! Usage: `merge-well [SEED] [SAVE_DIR]`. Without a save directory the run
//! uses an in-memory store.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use merge_well::Session;
use merge_well::Tuning;
use merge_well::cosmetics::{Inventory, PurchaseOutcome};
use merge_well::persistence::{FileStore, KeyValueStore, MemoryStore};
use merge_well::settings::Settings;
use merge_well::sim::{GameEvent, PhysicsWorld, PowerUpKind, SandboxWorld};

/// Simulated frame length fed to the session
const FRAME_DT: f32 = 1.0 / 60.0;
/// Seconds between autoplay drops
const DROP_INTERVAL: f32 = 0.8;
/// Give up after this much simulated time
const MAX_RUN_SECS: f32 = 600.0;
/// Breach time after which autoplay spends coins on a rescue
const RESCUE_AFTER_SECS: f32 = 1.5;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5EED);
    let save_dir = args.next();

    log::info!("Merge Well (headless) starting with seed {:#x}", seed);

    let result = match save_dir {
        Some(dir) => FileStore::open(dir).map(|mut store| run(&mut store, seed)),
        None => Ok(run(&mut MemoryStore::new(), seed)),
    };
    if let Err(e) = result {
        log::error!("Could not open save directory: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on wasm
}

fn run<S: KeyValueStore>(store: &mut S, seed: u64) {
    let settings = Settings::load(&*store);
    let mut inventory = Inventory::load(&*store);
    let tuning = Tuning::default();
    let world = SandboxWorld::for_tuning(&tuning);
    let mut session = Session::load(&*store, tuning, seed, world);

    // Spend savings before the run, cheapest first
    shop(&mut session, &mut inventory);

    let mut pilot = Pcg32::seed_from_u64(seed ^ 0xA076_1D64_78BD_642F);
    let width = session.state().tuning.well_width;
    let mut clock = 0.0_f32;
    let mut next_drop = 0.0_f32;
    let mut merges = 0u32;
    let mut shake = 0.0_f32;
    let mut last_rescue = f32::NEG_INFINITY;

    while clock < MAX_RUN_SECS && !session.state().is_game_over() {
        if clock >= next_drop {
            session.drop_at(pilot.random_range(0.0..width));
            next_drop = clock + DROP_INTERVAL;
        }

        session.update(FRAME_DT);
        clock += FRAME_DT;

        let state = session.state();
        let affordable = state.session.can_afford(state.tuning.power_up_cost);
        if state.breach.elapsed() > RESCUE_AFTER_SECS
            && affordable
            && clock - last_rescue > RESCUE_AFTER_SECS
        {
            rescue(&mut session);
            last_rescue = clock;
        }

        for event in session.drain_events() {
            match event {
                GameEvent::Merged { impact, .. } => {
                    merges += 1;
                    shake = shake.max(settings.shake_for(impact));
                }
                GameEvent::GameOver { score } => {
                    println!("Game over after {:.1}s with score {}", clock, score);
                }
                _ => {}
            }
        }
    }

    let snap = session.snapshot();
    println!(
        "Score {} | high score {} | coins {} | best tier {} | merges {} | max shake {:.0}",
        snap.session.score,
        snap.session.high_score,
        snap.session.coins,
        snap.session.highest_tier.info().name,
        merges,
        shake
    );

    if let Err(e) = session.save(store) {
        log::warn!("Save failed: {}", e);
    }
    if let Err(e) = inventory.save(store) {
        log::warn!("Inventory save failed: {}", e);
    }
    if let Err(e) = settings.save(store) {
        log::warn!("Settings save failed: {}", e);
    }
}

/// Buy and equip whatever is affordable, cheapest first
fn shop(session: &mut Session<SandboxWorld>, inventory: &mut Inventory) {
    let mut items: Vec<_> = merge_well::cosmetics::CATALOG
        .iter()
        .filter(|i| !inventory.is_unlocked(i.id))
        .collect();
    items.sort_by_key(|i| i.price);

    let (state, world) = session.parts_mut();
    for item in items {
        match inventory.purchase(state, item.id) {
            PurchaseOutcome::Purchased { .. } => {
                inventory.equip(state, world, item.id);
            }
            PurchaseOutcome::InsufficientCoins => break,
            _ => {}
        }
    }
}

/// Clear the area around the highest piece
fn rescue(session: &mut Session<SandboxWorld>) {
    let highest = session
        .world()
        .pieces()
        .into_iter()
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    if let Some(piece) = highest {
        session.select_power_up(Some(PowerUpKind::AreaClearLarge));
        session.pointer_release(Vec2::new(piece.pos.x, piece.pos.y));
    }
}
