//! Sector Demo
//!
//! Headless walk-through of a single world sector:
//! - A walled room with a few scattered crates
//! - A player walking a scripted path and sliding along walls
//! - Point lights picked by the camera view each tick
//! - Interactables picked by ray casting from the player
//!
//! Pass a `.toml` or `.ron` physics config as the first argument to
//! override the defaults.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tile_engine::foundation::logging::{self, LevelFilter};
use tile_engine::prelude::*;

// Room bounds: -ROOM_HALF to +ROOM_HALF on both axes
const ROOM_HALF: f32 = 12.0;
const WALL_THICKNESS: f32 = 1.0;

const NUM_CRATES: usize = 12;
const PLAYER_RADIUS: f32 = 0.4;
const PLAYER_SPEED: f32 = 0.35;

// Camera looks straight down from this height
const CAMERA_HEIGHT: f32 = 4.0;
const CAMERA_RATIO: f32 = 16.0 / 9.0;
const CAMERA_FOV: f32 = std::f32::consts::FRAC_PI_3;

// How far the player can reach an interactable
const INTERACT_RANGE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Light {
    Lamp(u32),
    Torch(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interactable {
    Door,
    Lever,
    Chest,
}

type Sector = WorldSector<Light, Interactable>;

fn load_config() -> Result<PhysicsConfig, ConfigError> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading physics config from {}", path);
            let config = PhysicsConfig::load_from_file(&path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(PhysicsConfig::default()),
    }
}

fn build_walls(sector: &mut Sector) -> Result<(), SectorError> {
    let span = 2.0 * ROOM_HALF - 2.0 * WALL_THICKNESS;
    let inner = ROOM_HALF - WALL_THICKNESS * 0.5;

    let walls = [
        (Vec3::new(0.0, -inner, 0.0), Collision::rectangle(span, WALL_THICKNESS)),
        (Vec3::new(0.0, inner, 0.0), Collision::rectangle(span, WALL_THICKNESS)),
        (Vec3::new(-inner, 0.0, 0.0), Collision::rectangle(WALL_THICKNESS, span)),
        (Vec3::new(inner, 0.0, 0.0), Collision::rectangle(WALL_THICKNESS, span)),
        // Pillar in the middle of the room
        (Vec3::new(3.0, 0.0, 0.0), Collision::rectangle(1.0, 1.0)),
    ];

    for (position, shape) in walls {
        sector.add_object(PhysicsObject::new(position).with_collision(shape))?;
    }
    Ok(())
}

fn scatter_crates(sector: &mut Sector, rng: &mut StdRng) -> Result<usize, SectorError> {
    let limit = ROOM_HALF - 3.0 * WALL_THICKNESS;
    let mut placed = 0;

    for _ in 0..NUM_CRATES {
        let x = rng.gen_range(-limit..limit);
        let y = rng.gen_range(-limit..limit);
        // Keep the player's path clear
        if y.abs() < 2.0 {
            continue;
        }

        let mut shape = Collision::rectangle(0.8, 0.8);
        shape.rotate(rng.gen_range(0.0..std::f32::consts::FRAC_PI_2));
        sector.add_object(PhysicsObject::new(Vec3::new(x, y, 0.0)).with_collision(shape).removable())?;
        placed += 1;
    }
    Ok(placed)
}

fn place_lights_and_items(sector: &mut Sector) -> Result<(), SectorError> {
    for (i, x) in [-8.0_f32, -4.0, 0.0, 4.0, 8.0].into_iter().enumerate() {
        let id = u32::try_from(i).unwrap_or(u32::MAX);
        sector.add_point_light(Light::Lamp(id), Point2::new(x, 6.0))?;
        sector.add_point_light(Light::Torch(id), Point2::new(x, -6.0))?;
    }

    let items = [
        (Interactable::Door, Point2::new(10.5, 0.0), Vec2::new(0.5, 1.0)),
        (Interactable::Lever, Point2::new(-10.5, 0.0), Vec2::new(0.25, 0.25)),
        (Interactable::Chest, Point2::new(0.5, 10.5), Vec2::new(0.6, 0.4)),
    ];
    for (item, center, half_extents) in items {
        sector.add_interactable(item, AABox::from_center_extents(center, half_extents))?;
    }
    Ok(())
}

fn walk_player(sector: &mut Sector, player: ObjectKey) -> Result<(), Box<dyn std::error::Error>> {
    // East into the pillar, then north-east so the blocked axis slides
    let path = [Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.0)];

    for (tick, heading) in path.iter().cycle().take(40).enumerate() {
        let current = sector
            .physics()
            .get(player)
            .ok_or(PhysicsError::UnknownObject)?
            .ground_position();
        let proposed = current + heading.normalize() * PLAYER_SPEED;

        let result = sector.physics_mut().check_collision(player, proposed)?;
        if result.blocked() {
            log::debug!(
                "tick {}: blocked at ({:.2}, {:.2}), allowed ({:.2}, {:.2})",
                tick,
                current.x,
                current.y,
                result.horizontal,
                result.vertical
            );
        }
        sector
            .physics_mut()
            .set_position(player, Vec3::new(result.position.x, result.position.y, 0.0))?;

        for event in sector.physics_mut().step() {
            let kind = sector.physics().get(event.other).map(|other| other.collision().kind());
            log::info!("tick {}: player touched {:?}", tick, kind);
        }

        let lights = sector.lights_in_camera_view(
            Vec3::new(result.position.x, result.position.y, CAMERA_HEIGHT),
            CAMERA_RATIO,
            CAMERA_FOV,
        );
        log::trace!("tick {}: {} lights in view", tick, lights.len());
    }

    let end = sector
        .physics()
        .get(player)
        .ok_or(PhysicsError::UnknownObject)?
        .ground_position();
    log::info!("Player stopped at ({:.2}, {:.2})", end.x, end.y);

    for direction in [Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0), Vec2::new(0.0, 1.0)] {
        let ray = Ray2D::new(end, direction);
        match sector.ray_cast(&ray, INTERACT_RANGE) {
            Some(item) => log::info!("Looking towards ({}, {}): {:?}", direction.x, direction.y, item),
            None => log::info!("Looking towards ({}, {}): nothing", direction.x, direction.y),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LevelFilter::Info);

    log::info!("Starting sector demo");

    let config = load_config()?;
    let bounds = AABox::new(Point2::new(-ROOM_HALF, -ROOM_HALF), Point2::new(ROOM_HALF, ROOM_HALF));
    let mut sector = Sector::new(bounds, 64, &config)?;

    build_walls(&mut sector)?;
    let mut rng = StdRng::seed_from_u64(42);
    let crates = scatter_crates(&mut sector, &mut rng)?;
    place_lights_and_items(&mut sector)?;
    log::info!(
        "Sector ready: {} objects ({} crates), {} lights",
        sector.physics().len(),
        crates,
        sector.light_count()
    );

    let player = sector.add_object(
        PhysicsObject::new(Vec3::new(-6.0, 0.0, 0.0)).with_collision(Collision::circle(PLAYER_RADIUS)),
    )?;
    walk_player(&mut sector, player)?;

    let despawned = sector.physics_mut().despawn_removable();
    log::info!("Despawned {} removable objects, {} remain", despawned, sector.physics().len());

    log::info!("Sector demo finished successfully");
    Ok(())
}
