pub mod scene_buffer;

use glow::HasContext;
use triangle_core::shaders::Shaders;

use scene_buffer::SceneBuffer;

/// Only the color buffer is cleared each frame.
pub const CLEAR_MASK: u32 = glow::COLOR_BUFFER_BIT;

/// Clears the frame and, when both the program and the vertex buffer exist,
/// draws the triangle.
pub fn draw_scene(
    gl: &glow::Context,
    shaders: Option<&Shaders<glow::Context>>,
    buffer: Option<&SceneBuffer>,
) -> Result<(), u32> {
    unsafe {
        gl.clear(CLEAR_MASK);
    }

    let (Some(shaders), Some(buffer)) = (shaders, buffer) else {
        return Ok(());
    };

    unsafe {
        gl.use_program(Some(shaders.program()));
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer.handle()));
        if let Some(position) = shaders.position_attribute() {
            gl.enable_vertex_attrib_array(position);
            gl.vertex_attrib_pointer_f32(position, 3, glow::FLOAT, false, buffer.stride(), 0);
        }
        gl.draw_arrays(glow::TRIANGLES, 0, buffer.vertex_count());
    }

    check_gl_error(gl)
}

/// Reads and clears the GL error flag.
pub fn check_gl_error(gl: &glow::Context) -> Result<(), u32> {
    match unsafe { gl.get_error() } {
        glow::NO_ERROR => Ok(()),
        code => Err(code),
    }
}

pub fn gl_error_name(code: u32) -> &'static str {
    match code {
        glow::NO_ERROR => "GL_NO_ERROR",
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        _ => "unknown GL error",
    }
}
