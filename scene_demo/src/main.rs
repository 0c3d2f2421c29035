//! Scene engine demo
//!
//! Builds a scattered field of tiles under a perspective camera, draws it
//! into a recording backend, then picks, measures and searches the same
//! scene. Pass a `.toml` or `.ron` configuration file as the first argument
//! to override the engine defaults.

use std::path::PathBuf;
use std::rc::Rc;

use rand::prelude::*;
use scene_engine::core::config::ConfigError;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::scene::SHAPE_TYPE;

// Scene layout constants
const TILE_COUNT: usize = 12;
const FIELD_EXTENT: f32 = 4.0;
const PICK_SAMPLES: usize = 8;
const SEED: u64 = 0x5eed;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("camera matrices are not invertible")]
    SingularCamera,
}

struct DemoScene {
    root: NodeRef,
    camera: Rc<CameraNode>,
}

fn build_scene(rng: &mut StdRng) -> DemoScene {
    let camera = Rc::new(CameraNode::perspective(
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(0.0, 0.0, 0.0),
        std::f32::consts::FRAC_PI_3,
        16.0 / 9.0,
        0.1,
        100.0,
    ));

    let root = Rc::new(Group::named("root"));
    root.append(Rc::clone(&camera) as NodeRef);

    for index in 0..TILE_COUNT {
        let offset = Vec3::new(
            rng.gen_range(-FIELD_EXTENT..FIELD_EXTENT),
            rng.gen_range(-FIELD_EXTENT..FIELD_EXTENT),
            rng.gen_range(-2.0..0.0),
        );
        let tile = Group::named(format!("tile-{index}"));
        tile.append(Rc::new(TransformNode::from_translation(offset)));
        tile.append(Rc::new(MaterialNode::rgb(rng.gen(), rng.gen(), rng.gen())));
        tile.append(Rc::new(Quad::new(rng.gen_range(0.5..1.5), rng.gen_range(0.5..1.5))));
        root.append(Rc::new(tile));
    }

    let overlay = Group::named("overlay");
    overlay.append(Rc::new(BlendModeNode::new(BlendMode::Alpha)));
    overlay.append(Rc::new(TextureNode::new(Some(Texture::new("glass")))));
    overlay.append(Rc::new(Switch::with_children(
        [
            Rc::new(Quad::new(3.0, 3.0)) as NodeRef,
            Rc::new(Quad::new(1.0, 1.0)),
        ],
        SwitchChoice::Child(1),
    )));
    root.append(Rc::new(overlay));

    DemoScene {
        root: root as NodeRef,
        camera,
    }
}

fn path_names(path: &Path) -> String {
    path.iter()
        .map(|node| node.name().unwrap_or(node.node_type().name()))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn run(config: &SceneEngineConfig) -> Result<(), DemoError> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let scene = build_scene(&mut rng);

    // Render
    let backend = RecordingBackend::new();
    let commands = backend.log();
    let mut render = RenderAction::with_config(Box::new(backend), config.render.clone());
    render.apply(&scene.root);
    let stats = render.stats();
    let state_changes = commands.borrow().iter().filter(|c| c.is_state_change()).count();
    log::info!(
        "Rendered {} shapes ({} triangles) with {} commands, {} of them state changes",
        stats.shapes,
        stats.triangles,
        commands.borrow().len(),
        state_changes
    );

    // Bounds
    let mut bounds = BoundingBoxAction::new();
    bounds.apply(&scene.root);
    let aabb = bounds.bounding_box();
    log::info!("Scene bounds: {:?} .. {:?}", aabb.min, aabb.max);

    // Pick
    let inverse = scene
        .camera
        .inverse_view_projection()
        .ok_or(DemoError::SingularCamera)?;
    for _ in 0..PICK_SAMPLES {
        let ndc = Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let Some(mut pick) = PickAction::from_ndc(ndc, &inverse, config.picking.clone()) else {
            log::warn!("Could not unproject {ndc:?}");
            continue;
        };
        pick.apply(&scene.root);
        match pick.picked_point() {
            Some(hit) => log::info!(
                "Pick at ({:.2}, {:.2}): {} hit(s), nearest {} at t = {:.3}",
                ndc.x,
                ndc.y,
                pick.picked().len(),
                path_names(&hit.path),
                hit.t
            ),
            None => log::info!("Pick at ({:.2}, {:.2}): nothing", ndc.x, ndc.y),
        }
    }

    // Search
    let mut search = SearchAction::new(SearchTarget::Type(&SHAPE_TYPE), SearchInterest::All);
    search.apply(&scene.root);
    log::info!("Found {} visible shapes", search.paths().len());

    let mut hidden = SearchAction::new(SearchTarget::Type(&SHAPE_TYPE), SearchInterest::All)
        .search_all_children(true);
    hidden.apply(&scene.root);
    log::info!("Found {} shapes including unselected switch children", hidden.paths().len());

    let mut by_name = SearchAction::new(SearchTarget::Name("tile-3".into()), SearchInterest::First);
    by_name.apply(&scene.root);
    if let Some(path) = by_name.found() {
        log::info!("tile-3 lives at {}", path_names(path));
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SceneEngineConfig::load(&path).map_err(DemoError::from)?,
        None => SceneEngineConfig::default(),
    };

    logging::init_with_config(&config.logging);
    log::info!("Starting scene engine demo");

    match run(&config) {
        Ok(()) => {
            log::info!("Scene engine demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Scene engine demo failed: {e}");
            Err(e.into())
        }
    }
}
