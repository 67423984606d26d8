use bevy::ecs::message::Messages;
use bevy::prelude::*;
use bastion::game::simulation::{
    resolve_pair, ActualPosition, BoundingBox, CollisionBody, CollisionEvent, JitterSource, ObstacleKind,
    Path, SimConfig, SimRng, StaticObstacle, SteeringForce, UnitDamageCommand, UnitMoveCommand,
    UnitStopCommand,
};
use bastion::game::structures::OccupancyGrid;
use bastion::game::unit::{unit_bundle, Owner, UnitKind};
use bastion::game::GamePlugin;

/// Headless app with config loaded and a 12×8 open arena.
fn arena_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(GamePlugin);

    // Runs Startup: config, RNG
    app.update();

    app.world_mut().insert_resource(SimRng::seeded(11));
    let rows: Vec<String> = (0..8).map(|_| ".".repeat(12)).collect();
    app.world_mut().resource_mut::<OccupancyGrid>().load(&rows);
    app
}

fn spawn(app: &mut App, kind: UnitKind, x: i32, y: i32) -> Entity {
    let config = app.world().resource::<SimConfig>().clone();
    app.world_mut()
        .spawn(unit_bundle(kind, Owner::PLAYER, IVec2::new(x, y), &config))
        .id()
}

fn tick(app: &mut App, count: usize) {
    for _ in 0..count {
        app.world_mut().run_schedule(FixedUpdate);
    }
}

fn bounds(app: &App, entity: Entity) -> BoundingBox {
    *app.world().get::<BoundingBox>(entity).expect("unit should exist")
}

fn force(app: &App, entity: Entity) -> Vec2 {
    app.world().get::<SteeringForce>(entity).expect("unit should exist").0
}

#[test]
fn test_overlapping_idle_units_are_pushed_apart() {
    let mut app = arena_app();
    let a = spawn(&mut app, UnitKind::Soldier, 64, 120);
    let b = spawn(&mut app, UnitKind::Soldier, 72, 120);

    tick(&mut app, 1);

    // Jitter is at most 30 degrees, so the pushes keep their horizontal sign.
    assert!(force(&app, a).x < 0.0, "Left unit should be pushed left: {:?}", force(&app, a));
    assert!(force(&app, b).x > 0.0, "Right unit should be pushed right: {:?}", force(&app, b));

    tick(&mut app, 600);

    assert!(!bounds(&app, a).intersects(&bounds(&app, b)), "Units should end up separated");
    assert_eq!(force(&app, a), Vec2::ZERO);
    assert_eq!(force(&app, b), Vec2::ZERO);
}

/// No rotation and unit scale on every draw, so pushes are exact.
struct NeutralJitter;

impl JitterSource for NeutralJitter {
    fn jitter_degrees(&mut self, _limit: i32) -> i32 {
        0
    }

    fn impulse_scale(&mut self, _min_percent: i32, _max_percent: i32) -> f32 {
        1.0
    }
}

#[test]
fn test_each_overlapping_pair_is_pushed_once_from_snapshot() {
    let mut app = arena_app();
    app.world_mut().insert_resource(SimRng::from_source(NeutralJitter));

    let mut units = [
        spawn(&mut app, UnitKind::Soldier, 64, 120),
        spawn(&mut app, UnitKind::Soldier, 72, 120),
        spawn(&mut app, UnitKind::Soldier, 68, 126),
    ];
    units.sort();

    // Replay the pairs by hand on the pre-tick boxes.
    let config = app.world().resource::<SimConfig>().clone();
    let bodies = units.map(|entity| CollisionBody {
        bounds: bounds(&app, entity),
        is_moving: false,
    });
    let mut expected = [Vec2::ZERO; 3];
    let mut overlapping = Vec::new();
    for i in 0..3 {
        for j in (i + 1)..3 {
            let (head, tail) = expected.split_at_mut(j);
            let pushed = resolve_pair(
                &bodies[i],
                &bodies[j],
                &mut head[i],
                &mut tail[0],
                &mut NeutralJitter,
                &config.collision,
            );
            if pushed.is_some() {
                overlapping.push((units[i], units[j]));
            }
        }
    }
    assert_eq!(overlapping.len(), 3, "All three units overlap each other");

    tick(&mut app, 1);

    // Integration already spent one step of each push this tick.
    for (entity, push) in units.iter().zip(expected) {
        let decayed = push - push * config.force.step_fraction;
        let actual = force(&app, *entity);
        assert!((actual - decayed).length() < 1e-4, "{:?}: expected {:?}, got {:?}", entity, decayed, actual);
    }

    let messages = app.world().resource::<Messages<CollisionEvent>>();
    let mut cursor = messages.get_cursor();
    let mut reported: Vec<(Entity, Entity)> = cursor
        .read(messages)
        .map(|event| (event.entity1, event.entity2))
        .collect();
    reported.sort();
    assert_eq!(reported, overlapping, "One event per overlapping pair");
}

#[test]
fn test_moving_unit_keeps_walking_through_stationary_one() {
    let mut app = arena_app();
    let walker = spawn(&mut app, UnitKind::Worker, 70, 120);
    let idle = spawn(&mut app, UnitKind::Worker, 80, 120);
    app.world_mut()
        .entity_mut(walker)
        .insert(Path::from_waypoints([Vec2::new(160.0, 120.0)]));

    tick(&mut app, 1);

    assert_eq!(force(&app, walker), Vec2::ZERO, "The mover's push is discarded");
    assert_ne!(force(&app, idle), Vec2::ZERO, "The idle unit takes the push");

    let position = app.world().get::<ActualPosition>(walker).expect("unit should exist").0;
    assert!(position.x > 70.0, "Walker should have advanced, got {:?}", position);
}

#[test]
fn test_move_command_walks_unit_onto_target_cell() {
    let mut app = arena_app();
    let unit = spawn(&mut app, UnitKind::Worker, 16, 104);

    app.world_mut().write_message(UnitMoveCommand {
        entity: unit,
        target: Vec2::new(70.0, 110.0),
    });
    tick(&mut app, 1);
    assert!(app.world().get::<Path>(unit).expect("unit should exist").is_moving());

    // 48px at 0.22px per tick
    tick(&mut app, 300);

    assert!(!app.world().get::<Path>(unit).expect("unit should exist").is_moving());
    assert_eq!(bounds(&app, unit).position(), IVec2::new(64, 104));
    assert_eq!(
        app.world().get::<ActualPosition>(unit).expect("unit should exist").0,
        Vec2::new(64.0, 104.0)
    );
}

#[test]
fn test_unreachable_target_leaves_unit_idle() {
    let mut app = arena_app();
    let unit = spawn(&mut app, UnitKind::Soldier, 16, 104);

    app.world_mut().write_message(UnitMoveCommand {
        entity: unit,
        target: Vec2::new(1000.0, 1000.0),
    });
    tick(&mut app, 10);

    assert!(!app.world().get::<Path>(unit).expect("unit should exist").is_moving());
    assert_eq!(bounds(&app, unit).position(), IVec2::new(16, 104));
}

#[test]
fn test_stop_command_clears_path() {
    let mut app = arena_app();
    let unit = spawn(&mut app, UnitKind::Soldier, 16, 104);

    app.world_mut().write_message(UnitMoveCommand {
        entity: unit,
        target: Vec2::new(160.0, 104.0),
    });
    tick(&mut app, 5);
    assert!(app.world().get::<Path>(unit).expect("unit should exist").is_moving());

    app.world_mut().write_message(UnitStopCommand { entity: unit });
    tick(&mut app, 1);

    assert!(!app.world().get::<Path>(unit).expect("unit should exist").is_moving());
}

#[test]
fn test_push_into_wall_bounces_back() {
    let mut app = arena_app();
    let unit = spawn(&mut app, UnitKind::Soldier, 32, 104);
    let wall = BoundingBox::new(48, 104, 16, 16);
    app.world_mut().spawn((StaticObstacle { kind: ObstacleKind::Wall }, wall));
    app.world_mut()
        .entity_mut(unit)
        .insert(SteeringForce(Vec2::new(20.0, 0.0)));

    for _ in 0..200 {
        tick(&mut app, 1);
        assert!(!bounds(&app, unit).intersects(&wall), "Unit entered the wall");
    }

    assert_eq!(force(&app, unit), Vec2::ZERO);
    assert!(bounds(&app, unit).x < 32, "Unit should have bounced away from the wall");
}

#[test]
fn test_lethal_damage_removes_unit_at_end_of_tick() {
    let mut app = arena_app();
    let doomed = spawn(&mut app, UnitKind::Worker, 16, 104);
    let survivor = spawn(&mut app, UnitKind::Soldier, 64, 104);

    app.world_mut().write_message(UnitDamageCommand { entity: doomed, amount: 50 });
    app.world_mut().write_message(UnitDamageCommand { entity: survivor, amount: 50 });
    tick(&mut app, 1);

    assert!(app.world().get_entity(doomed).is_err(), "Dead worker should be despawned");
    assert!(app.world().get_entity(survivor).is_ok(), "Soldier has 60 hp and survives");
}
