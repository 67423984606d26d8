use bevy::prelude::*;

use bastion::game::config::InitialConfig;
use bastion::game::level::{spawn_level, CastleSite, LevelLayout, DEFAULT_LEVEL_PATH};
use bastion::game::simulation::{BoundingBox, Path, SimConfig, SimTick, UnitMoveCommand};
use bastion::game::unit::{is_in_range, unit_bundle, Owner, Unit, UnitKind, UnitStats};
use bastion::game::GamePlugin;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::error::Error;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

const DEFAULT_TICKS: u64 = 6_000;

fn setup_file_logging() -> std::io::Result<String> {
    let log_dir = PathBuf::from("logs");
    fs::create_dir_all(&log_dir)?;

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("bastion_{}.log", now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bevy_ecs=info,bastion=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(log_path_str)
}

fn cleanup_old_logs(log_dir: &FsPath, keep_count: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };

    let mut log_files: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|s| s.starts_with("bastion") && s.ends_with(".log"))
        })
        .collect();

    // Oldest first
    log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

    if log_files.len() > keep_count {
        for file in log_files.iter().take(log_files.len() - keep_count) {
            let _ = fs::remove_file(file.path());
        }
    }
}

/// Free cells along the right side and the bottom edge of a castle.
fn rally_points(castle: &BoundingBox, cell_size: i32) -> Vec<IVec2> {
    let cells = castle.width / cell_size;
    let right = (0..cells).map(|i| IVec2::new(castle.x + castle.width, castle.y + i * cell_size));
    let below = (0..cells).map(|i| IVec2::new(castle.x + i * cell_size, castle.y + castle.height));
    right.chain(below).collect()
}

/// The open cell diagonally above-left of a castle.
fn approach_point(castle: &BoundingBox, cell_size: i32) -> Vec2 {
    Vec2::new((castle.x - cell_size) as f32, (castle.y - cell_size) as f32)
}

fn main() -> Result<(), Box<dyn Error>> {
    let log_file = setup_file_logging()?;
    println!("Bastion movement demo - logging to {}", log_file);

    let mut args = std::env::args().skip(1);
    let level_path = args.next().unwrap_or_else(|| DEFAULT_LEVEL_PATH.to_string());
    let ticks = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => DEFAULT_TICKS,
    };

    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(GamePlugin);

    // Startup: config and RNG.
    app.update();

    let config = app.world().resource::<SimConfig>().clone();
    let seed = app.world().resource::<InitialConfig>().rng_seed;
    let text = fs::read_to_string(&level_path)?;
    let layout = LevelLayout::parse(
        &text,
        config.level_size.x as usize,
        config.level_size.y as usize,
    )?;
    info!("Loaded level {}", level_path);

    let castles = spawn_level(app.world_mut(), &layout, &config.grid);
    let (Some(player), Some(ai)) = (
        castles.iter().find(|c| c.owner == Owner::PLAYER).copied(),
        castles.iter().find(|c| c.owner != Owner::PLAYER).copied(),
    ) else {
        return Err("level needs a player and an AI castle".into());
    };

    let mut orders: Vec<(Entity, CastleSite)> = Vec::new();
    for (home, enemy) in [(player, ai), (ai, player)] {
        for (i, point) in rally_points(&home.bounds, config.grid.cell_size).into_iter().enumerate() {
            let kind = if i % 2 == 0 { UnitKind::Soldier } else { UnitKind::Worker };
            let entity = app.world_mut().spawn(unit_bundle(kind, home.owner, point, &config)).id();
            app.world_mut().write_message(UnitMoveCommand {
                entity,
                target: approach_point(&enemy.bounds, config.grid.cell_size),
            });
            orders.push((entity, enemy));
        }
    }
    info!("Spawned {} units, running {} ticks", orders.len(), ticks);

    for _ in 0..ticks {
        app.world_mut().run_schedule(FixedUpdate);
    }

    let world = app.world_mut();
    let tick = world.resource::<SimTick>().0;
    let mut units = world.query_filtered::<(&BoundingBox, &Path, &UnitStats), With<Unit>>();

    let mut moving = 0;
    let mut arrived = 0;
    for (entity, enemy) in &orders {
        let Ok((bounds, path, stats)) = units.get(world, *entity) else {
            continue;
        };
        if path.is_moving() {
            moving += 1;
        }
        if is_in_range(bounds, stats.interaction_radius, &enemy.bounds, config.grid.cell_size) {
            arrived += 1;
        }
    }

    info!(
        "Finished at tick {} (seed {}): {} units still moving, {} of {} within reach of the enemy castle",
        tick,
        seed,
        moving,
        arrived,
        orders.len()
    );

    Ok(())
}
