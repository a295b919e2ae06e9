use std::rc::Rc;

use tracing::{debug, error};
use triangle_core::{scene::Scene, shaders::Shaders, time::FrameStats};

use crate::{
    config::ShaderPaths,
    render::{self, gl_error_name, scene_buffer::SceneBuffer},
};

/// Everything the callbacks share. Built once the context is current and
/// dropped before the platform is shut down.
#[derive(Debug)]
pub struct AppState {
    /// `None` when the shaders failed to build; frames are then only cleared.
    shaders: Option<Shaders<glow::Context>>,
    scene_buffer: Option<SceneBuffer>,
    stats: FrameStats,
}

impl AppState {
    pub fn new(gl: &Rc<glow::Context>, paths: &ShaderPaths, stats_interval: f32) -> Self {
        let scene = Scene::triangle();

        let scene_buffer = match SceneBuffer::upload(gl, &scene) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                error!("Failed to upload the scene: {}", err);
                None
            }
        };

        let shaders = match Shaders::init(gl, &paths.vertex, &paths.fragment) {
            Ok(shaders) => Some(shaders),
            Err(err) => {
                error!("{}", err.summary());
                None
            }
        };

        Self {
            shaders,
            scene_buffer,
            stats: FrameStats::new(stats_interval),
        }
    }

    pub fn render(&mut self, gl: &glow::Context) {
        if let Err(code) =
            render::draw_scene(gl, self.shaders.as_ref(), self.scene_buffer.as_ref())
        {
            error!("GL error after draw: {} (0x{:04X})", gl_error_name(code), code);
        }
        self.stats.record_frame();
    }

    pub fn update(&mut self, delta_time: f32) {
        self.stats.advance(delta_time);
    }

    pub fn key(&mut self, code: u8, pressed: bool) {
        debug!(
            "Key 0x{:02X} {}",
            code,
            if pressed { "pressed" } else { "released" }
        );
    }
}
