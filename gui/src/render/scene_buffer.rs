use std::{fmt, rc::Rc};

use glow::HasContext;
use triangle_core::scene::Scene;

/// The scene's vertices in a static GL array buffer.
pub struct SceneBuffer {
    gl: Rc<glow::Context>,
    buffer: glow::Buffer,
    vertex_count: i32,
    stride: i32,
}

impl SceneBuffer {
    pub fn upload(gl: &Rc<glow::Context>, scene: &Scene) -> Result<Self, String> {
        unsafe {
            let buffer = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, scene.as_bytes(), glow::STATIC_DRAW);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                gl: Rc::clone(gl),
                buffer,
                vertex_count: scene.vertex_count(),
                stride: scene.stride(),
            })
        }
    }

    pub fn handle(&self) -> glow::Buffer {
        self.buffer
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub fn stride(&self) -> i32 {
        self.stride
    }
}

impl Drop for SceneBuffer {
    fn drop(&mut self) {
        unsafe { self.gl.delete_buffer(self.buffer) }
    }
}

impl fmt::Debug for SceneBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneBuffer")
            .field("buffer", &self.buffer)
            .field("vertex_count", &self.vertex_count)
            .finish()
    }
}
