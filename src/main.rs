//! Demo: runs the frame loop and the flying camera (WASD, Space, Shift,
//! right mouse to look) behind a real window.
//!
//! The scene holds a textured cube, a ground plane, the world axes and a
//! helix drawn as a line strip. It is drawn through the null backend, which
//! only counts draw calls, so the window itself stays blank.

use std::path::Path;
use std::rc::Rc;

use skyframe::platform::window;
use skyframe::prelude::*;

const CONFIG_PATH: &str = "skyframe.ron";

fn load_config() -> EngineConfig {
    if !Path::new(CONFIG_PATH).exists() {
        return EngineConfig::default().with_title("Skyframe Demo");
    }
    match EngineConfig::load_ron(CONFIG_PATH) {
        Ok(config) => {
            log::info!("Loaded {CONFIG_PATH}");
            config
        }
        Err(e) => {
            log::warn!("Ignoring {CONFIG_PATH}: {e}");
            EngineConfig::default().with_title("Skyframe Demo")
        }
    }
}

fn axes() -> Group {
    let mut group = Group::new("axes");
    for (axis, color) in [
        (Vec3::X, [1.0, 0.0, 0.0, 1.0]),
        (Vec3::Y, [0.0, 1.0, 0.0, 1.0]),
        (Vec3::Z, [0.0, 0.0, 1.0, 1.0]),
    ] {
        group.push(ObjectHandle::new(Mesh::line(Vec3::ZERO, axis * 2.0, color)));
    }
    group
}

fn helix() -> LineStrip {
    let points = (0..80).map(|i| {
        let t = i as f32 * 0.2;
        Vec3::new(t.cos(), t * 0.1, t.sin())
    });
    let mut strip = LineStrip::new(points, [1.0, 0.8, 0.2, 1.0], 2.0);
    strip.set_position(Vec3::new(3.0, 0.0, -6.0));
    strip
}

/// Scene camera with W and Up flying toward the view.
fn demo_camera(engine: &Engine<NullBackend>) -> CameraHandle {
    let config = engine.config();
    let camera = FlyingCamera::create_default(
        engine.bus(),
        &config.camera,
        config.width,
        config.height,
        engine.backend().depth_range(),
    );
    {
        let mut camera = camera.borrow_mut();
        *camera.bindings_mut() = FlyBindings::toward_view();
        camera.set_position(Vec3::new(0.0, 1.5, 0.0));
    }
    CameraHandle::new(camera)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    let mut engine = Engine::new(config, NullBackend::default())?;
    let mut scene = Scene::with_camera("Demo", Rc::clone(engine.bus()), demo_camera(&engine));

    let mut cube = Mesh::cube();
    cube.set_texture("crate");
    cube.set_position(Vec3::new(0.0, 0.5, -5.0));
    scene.add(ObjectHandle::new(cube));

    let mut ground = Mesh::plane(20.0);
    ground.info_mut().use_texture = false;
    scene.add(ObjectHandle::new(ground));

    scene.add(ObjectHandle::new(axes()));
    scene.add(ObjectHandle::new(helix()));
    engine.set_scene(scene);

    window::run(engine)?;
    Ok(())
}
