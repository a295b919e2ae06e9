use std::{fmt, rc::Rc};

use tracing::{debug, error};

use crate::{
    logging,
    shaders::{
        backend::{ShaderBackend, ShaderStage, diagnostic_log},
        error::ShaderError,
        unit::ShaderUnit,
    },
};

/// Vertex attribute carrying the triangle positions.
pub const POSITION_ATTRIBUTE: &str = "a_posL";

/// A successfully linked program. Deleted on drop.
pub struct ShaderProgram<B: ShaderBackend> {
    gl: Rc<B>,
    handle: B::Program,
    position_attribute: Option<u32>,
}

impl<B: ShaderBackend> ShaderProgram<B> {
    /// Links a vertex and a fragment unit. The units are released once the
    /// link has been attempted, whatever its outcome.
    pub fn link(
        gl: &Rc<B>,
        vertex: ShaderUnit<B>,
        fragment: ShaderUnit<B>,
    ) -> Result<Self, ShaderError> {
        expect_stage(&vertex, ShaderStage::Vertex)?;
        expect_stage(&fragment, ShaderStage::Fragment)?;

        let handle = gl
            .create_program()
            .map_err(ShaderError::PlatformResource)?;
        let mut program = Self {
            gl: Rc::clone(gl),
            handle,
            position_attribute: None,
        };

        gl.attach_shader(handle, vertex.handle());
        gl.attach_shader(handle, fragment.handle());
        gl.link_program(handle);
        let linked = gl.program_link_status(handle);
        gl.detach_shader(handle, vertex.handle());
        gl.detach_shader(handle, fragment.handle());

        if !linked {
            let log = diagnostic_log(gl.program_info_log(handle));
            if let Some(log) = &log {
                error!("Error linking program:\n{}", logging::truncate_message(log));
            }
            return Err(ShaderError::Link { log });
        }

        program.position_attribute = program.attribute_location(POSITION_ATTRIBUTE);
        debug!(
            "Linked program {:?} ({} = {:?})",
            handle, POSITION_ATTRIBUTE, program.position_attribute
        );

        Ok(program)
    }

    pub fn handle(&self) -> B::Program {
        self.handle
    }

    /// Location of `a_posL`, looked up once at link time.
    pub fn position_attribute(&self) -> Option<u32> {
        self.position_attribute
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.gl.attrib_location(self.handle, name)
    }
}

impl<B: ShaderBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        self.gl.delete_program(self.handle);
    }
}

impl<B: ShaderBackend> fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("position_attribute", &self.position_attribute)
            .finish()
    }
}

fn expect_stage<B: ShaderBackend>(
    unit: &ShaderUnit<B>,
    expected: ShaderStage,
) -> Result<(), ShaderError> {
    if unit.stage() == expected {
        Ok(())
    } else {
        Err(ShaderError::StageMismatch {
            expected,
            found: unit.stage(),
        })
    }
}
