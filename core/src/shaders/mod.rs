//! Shader loading, compilation and linking.
//!
//! [`Shaders::init`] is the entry point used by the application: it loads a
//! vertex and a fragment shader from disk and links them, reporting which
//! stage failed through [`ShaderInitError::code`].

pub mod backend;
pub mod error;
pub mod program;
pub mod unit;

use std::{path::Path, rc::Rc};

use tracing::info;

pub use backend::{ShaderBackend, ShaderStage};
pub use error::{ShaderError, ShaderInitError};
pub use program::{POSITION_ATTRIBUTE, ShaderProgram};
pub use unit::ShaderUnit;

/// The linked triangle program, built from a vertex and a fragment file.
#[derive(Debug)]
pub struct Shaders<B: ShaderBackend> {
    program: ShaderProgram<B>,
}

impl<B: ShaderBackend> Shaders<B> {
    pub fn init(
        gl: &Rc<B>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderInitError> {
        let vertex = ShaderUnit::load(gl, ShaderStage::Vertex, vertex_path.as_ref())
            .map_err(ShaderInitError::Vertex)?;
        // An early return here drops `vertex`, which releases it.
        let fragment = ShaderUnit::load(gl, ShaderStage::Fragment, fragment_path.as_ref())
            .map_err(ShaderInitError::Fragment)?;
        let program =
            ShaderProgram::link(gl, vertex, fragment).map_err(ShaderInitError::Link)?;

        info!(
            "Shaders ready: {:?} + {:?}",
            vertex_path.as_ref(),
            fragment_path.as_ref()
        );
        Ok(Self { program })
    }

    /// Same as [`Shaders::init`] but from in-memory sources.
    pub fn from_sources(
        gl: &Rc<B>,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderInitError> {
        let vertex = ShaderUnit::from_source(gl, ShaderStage::Vertex, vertex_source)
            .map_err(ShaderInitError::Vertex)?;
        let fragment = ShaderUnit::from_source(gl, ShaderStage::Fragment, fragment_source)
            .map_err(ShaderInitError::Fragment)?;
        let program =
            ShaderProgram::link(gl, vertex, fragment).map_err(ShaderInitError::Link)?;
        Ok(Self { program })
    }

    pub fn program(&self) -> B::Program {
        self.program.handle()
    }

    pub fn position_attribute(&self) -> Option<u32> {
        self.program.position_attribute()
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.program.attribute_location(name)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{
        logging::{self, MAX_DEBUG_MESSAGE_LEN},
        test_utils::{fixtures, mock_gl::MockGl},
    };

    #[fixture]
    fn gl() -> Rc<MockGl> {
        Rc::new(MockGl::new())
    }

    #[rstest]
    fn init_valid_pair(gl: Rc<MockGl>) {
        let shaders = Shaders::init(
            &gl,
            fixtures::shaders::valid_vertex(),
            fixtures::shaders::valid_fragment(),
        )
        .unwrap();

        assert!(gl.is_live_program(shaders.program()));
        assert_eq!(shaders.position_attribute(), Some(0));
    }

    #[rstest]
    fn vertex_failure_allocates_no_fragment_shader(gl: Rc<MockGl>) {
        let err = Shaders::init(
            &gl,
            fixtures::shaders::syntax_error_vertex(),
            fixtures::shaders::valid_fragment(),
        )
        .unwrap_err();

        assert_eq!(err.code(), -1);
        assert_eq!(gl.created_shaders_of(ShaderStage::Fragment), 0);
        assert_eq!(gl.live_shaders(None), 0);
    }

    #[rstest]
    fn undecodable_vertex_source_is_a_vertex_failure(gl: Rc<MockGl>) {
        let err = Shaders::init(
            &gl,
            fixtures::shaders::not_utf8_vertex(),
            fixtures::shaders::valid_fragment(),
        )
        .unwrap_err();

        assert_eq!(err.code(), -1);
        assert!(matches!(
            err,
            ShaderInitError::Vertex(ShaderError::Compile { .. })
        ));
        assert_eq!(gl.live_shaders(None), 0);
    }

    #[rstest]
    fn fragment_failure_releases_vertex_shader(gl: Rc<MockGl>) {
        let err = Shaders::init(
            &gl,
            fixtures::shaders::valid_vertex(),
            fixtures::shaders::syntax_error_fragment(),
        )
        .unwrap_err();

        assert_eq!(err.code(), -2);
        assert_eq!(gl.created_shaders_of(ShaderStage::Vertex), 1);
        assert_eq!(gl.live_shaders(Some(ShaderStage::Vertex)), 0);
    }

    #[rstest]
    fn link_failure_is_its_own_code(gl: Rc<MockGl>) {
        let err = Shaders::init(
            &gl,
            fixtures::shaders::valid_vertex(),
            fixtures::shaders::path("unlinkable.fs"),
        )
        .unwrap_err();

        assert_eq!(err.code(), -3);
        assert_eq!(gl.live_programs(), 0);
    }

    #[rstest]
    fn long_link_log_stays_within_the_message_cap(gl: Rc<MockGl>) {
        let varying = format!("v_{}", "x".repeat(5000));
        let fragment = format!(
            "precision mediump float;\nvarying vec4 {};\nvoid main()\n{{\n    gl_FragColor = {};\n}}\n",
            varying, varying
        );

        let err = Shaders::from_sources(&gl, fixtures::shaders::MINIMAL_VERTEX, &fragment)
            .unwrap_err();
        assert_eq!(err.code(), -3);

        let summary = err.summary();
        assert!(summary.len() <= MAX_DEBUG_MESSAGE_LEN);
        assert!(!summary.contains(&varying));
        assert!(logging::truncate_message(&err.to_string()).len() <= MAX_DEBUG_MESSAGE_LEN);
    }

    #[rstest]
    fn failed_init_leaves_nothing_to_release(gl: Rc<MockGl>) {
        let shaders: Option<Shaders<MockGl>> = Shaders::init(
            &gl,
            fixtures::shaders::path("missing.vs"),
            fixtures::shaders::valid_fragment(),
        )
        .ok();

        drop(shaders);
        assert_eq!(gl.live_shaders(None), 0);
        assert_eq!(gl.live_programs(), 0);
    }
}
