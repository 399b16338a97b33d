use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use duskcast_common::{EngineConfig, EntityId, Pose, Rgba};
use duskcast_map::Map;
use duskcast_query::{EntityQueryFacade, GridInspector};
use duskcast_raycast::{RayCaster, column_angle};
use duskcast_render::{Billboard, BotSprite, Framebuffer, ProjectileSprite, SceneObject, SceneRenderer};
use duskcast_spatial::SpatialGrid;
use duskcast_texture::{SpriteAtlas, TextureCache};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

const DEMO_LEVEL: &str = "\
################
#..............#
#..2222...33...#
#..2..........4#
#......D.......#
#..5...#...11..#
#......#.......#
################
";

#[derive(Parser)]
#[command(name = "duskcast-cli", about = "Headless driver for the duskcast ray caster")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Scene {
    /// ASCII level file; the built-in demo level when omitted
    #[arg(short, long)]
    map: Option<PathBuf>,
    /// YAML engine config; defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Player x in world units
    #[arg(long, default_value = "1.5")]
    x: f32,
    /// Player y in world units
    #[arg(long, default_value = "1.5")]
    y: f32,
    /// View angle in degrees, 0 faces +x
    #[arg(long, default_value = "30")]
    angle: f32,
    /// Open every door before casting
    #[arg(long)]
    open_doors: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and crate info
    Info,
    /// Print the default engine config as YAML
    Config,
    /// Cast a fan of rays and print the distance buffer
    Cast {
        #[command(flatten)]
        scene: Scene,
        /// Number of columns to cast
        #[arg(long, default_value = "9")]
        columns: usize,
    },
    /// Render one frame to a PPM image
    Render {
        #[command(flatten)]
        scene: Scene,
        /// Output image path
        #[arg(short, long, default_value = "frame.ppm")]
        out: PathBuf,
        /// Number of random entities to scatter over the level
        #[arg(short, long, default_value = "8")]
        entities: usize,
        /// Seed for entity placement
        #[arg(long, default_value = "42")]
        seed: u64,
        /// Render with the zoomed field of view
        #[arg(long)]
        zoom: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("duskcast-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", duskcast_common::crate_info());
            println!("map: {}", duskcast_map::crate_info());
            println!("texture: {}", duskcast_texture::crate_info());
            println!("spatial: {}", duskcast_spatial::crate_info());
            println!("raycast: {}", duskcast_raycast::crate_info());
            println!("query: {}", duskcast_query::crate_info());
            println!("render: {}", duskcast_render::crate_info());
        }
        Commands::Config => {
            print!("{}", EngineConfig::default().to_yaml_string()?);
        }
        Commands::Cast { scene, columns } => {
            let (map, config, pose) = load_scene(&scene)?;
            let mut caster = RayCaster::new(&map, &config)?;
            let fov = config.fov;
            println!(
                "Casting {columns} columns from ({:.2}, {:.2}) at {:.1} deg, fov {:.1} deg",
                pose.x,
                pose.y,
                scene.angle,
                fov.to_degrees()
            );
            let buffer = caster.cast_all(&map, &pose, fov, columns);
            for (i, hit) in buffer.iter().enumerate() {
                println!(
                    "  [{i:3}] rel={:+6.1} dist={:6.3} raw={:6.3} mat={} side={:?} u={:.3} cell=({}, {}){}",
                    column_angle(i, fov, columns).to_degrees(),
                    hit.distance,
                    hit.raw_distance,
                    hit.material_id,
                    hit.side,
                    hit.wall_u,
                    hit.map_x,
                    hit.map_y,
                    if hit.hit { "" } else { " (miss)" }
                );
            }
        }
        Commands::Render {
            scene,
            out,
            entities,
            seed,
            zoom,
        } => {
            let (map, config, pose) = load_scene(&scene)?;
            let textures = TextureCache::with_default_textures(&config);
            let atlas = SpriteAtlas::with_default_sprites();

            let mut grid = SpatialGrid::new(config.cell_size);
            let objects = scatter_entities(&map, &config, entities, seed);
            for (id, obj) in &objects {
                grid.insert(*id, obj.position());
            }

            let mut renderer = SceneRenderer::new(&map, config.clone(), &textures, &atlas)?;
            renderer.set_zoomed(zoom);
            let mut frame = Framebuffer::new(config.screen_width, config.screen_height);
            let stats = renderer.render(&map, &pose, &grid, &objects, &mut frame)?;

            let file = File::create(&out)
                .with_context(|| format!("creating {}", out.display()))?;
            frame.write_ppm(BufWriter::new(file))?;

            let facade = EntityQueryFacade::new(&grid, &config);
            println!("Wrote {}x{} frame to {}", config.screen_width, config.screen_height, out.display());
            println!(
                "Columns: {} (walls hit {}), sprites: {} drawn of {} in view",
                stats.columns_cast, stats.wall_hits, stats.sprites_drawn, stats.sprites_considered
            );
            println!("Nearest entity: {:.2}", facade.nearest_enemy_distance(&pose));
            println!("{}", GridInspector::summary(&grid));
            println!("Frame timing: {}", renderer.timer().report());
        }
    }

    Ok(())
}

fn load_scene(scene: &Scene) -> anyhow::Result<(Map, EngineConfig, Pose)> {
    let config = match &scene.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut map = match &scene.map {
        Some(path) => load_map(path)?,
        None => Map::parse_ascii(DEMO_LEVEL)?,
    };
    if scene.open_doors {
        let doors: Vec<(i32, i32)> = map.doors().collect();
        for (x, y) in doors {
            map.open_door(x, y)?;
        }
    }
    tracing::info!(width = map.width(), height = map.height(), "level loaded");
    let pose = Pose::new(scene.x, scene.y, scene.angle.to_radians());
    Ok((map, config, pose))
}

fn load_map(path: &Path) -> anyhow::Result<Map> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading map {}", path.display()))?;
    Ok(Map::parse_ascii(&text)?)
}

/// Scatter bots and a few projectiles over open cells. Several may share
/// a cell; a level without open cells gets none.
fn scatter_entities(
    map: &Map,
    config: &EngineConfig,
    count: usize,
    seed: u64,
) -> HashMap<EntityId, SceneObject> {
    let open: Vec<(i32, i32)> = (0..map.height() as i32)
        .flat_map(|y| (0..map.width() as i32).map(move |x| (x, y)))
        .filter(|&(x, y)| !map.is_solid(x, y))
        .collect();
    if open.is_empty() {
        if count > 0 {
            tracing::warn!("level has no open cells, skipping entities");
        }
        return HashMap::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tile = config.tile_size;
    let mut objects: HashMap<EntityId, SceneObject> = HashMap::with_capacity(count);
    for n in 0..count {
        let (cx, cy) = open[rng.gen_range(0..open.len())];
        let jitter = Vec2::new(rng.gen_range(-0.2..0.2), rng.gen_range(-0.2..0.2));
        let pos = (Vec2::new(cx as f32 + 0.5, cy as f32 + 0.5) + jitter) * tile;
        let id = EntityId::from_raw(n as u128 + 1);
        let obj: SceneObject = if n % 4 == 3 {
            ProjectileSprite::new(id, pos, 0.4, 0.1 * tile, Rgba::rgb(255, 200, 40)).into()
        } else {
            BotSprite::new(id, pos, 0.35 * tile, (n % 4) as u32).into()
        };
        objects.insert(id, obj);
    }
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scatter_on_a_level_without_open_cells_is_empty() {
        let map = Map::parse_ascii("##\n##\n").unwrap();
        let objects = scatter_entities(&map, &EngineConfig::default(), 8, 42);
        assert!(objects.is_empty());
    }

    #[test]
    fn scatter_places_every_entity_in_an_open_cell() {
        let map = Map::parse_ascii(DEMO_LEVEL).unwrap();
        let config = EngineConfig::default();
        let objects = scatter_entities(&map, &config, 20, 7);
        assert_eq!(objects.len(), 20);
        for obj in objects.values() {
            let p = obj.position() / config.tile_size;
            assert!(!map.is_solid(p.x.floor() as i32, p.y.floor() as i32), "{p:?}");
        }
    }

    #[test]
    fn scatter_is_deterministic_per_seed() {
        let map = Map::parse_ascii(DEMO_LEVEL).unwrap();
        let config = EngineConfig::default();
        let a = scatter_entities(&map, &config, 10, 3);
        let b = scatter_entities(&map, &config, 10, 3);
        assert_eq!(a, b);
    }

    #[test]
    fn single_open_cell_takes_every_entity() {
        let map = Map::parse_ascii("###\n#.#\n###\n").unwrap();
        let objects = scatter_entities(&map, &EngineConfig::default(), 4, 1);
        assert_eq!(objects.len(), 4);
        assert!(objects.values().all(|o| (o.position() - Vec2::splat(1.5)).length() < 0.3));
    }
}
