use std::fmt::Debug;

use glow::HasContext;
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum ShaderStage {
    #[strum(serialize = "vertex")]
    Vertex,
    #[strum(serialize = "fragment")]
    Fragment,
}

impl ShaderStage {
    pub fn gl_enum(&self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

/// The slice of the GL API needed to build a shader program.
///
/// Every method assumes the context behind the backend is current on the
/// calling thread. `glow::Context` is the production implementation; tests
/// use [`crate::test_utils::mock_gl::MockGl`].
pub trait ShaderBackend {
    type Shader: Copy + Eq + Debug;
    type Program: Copy + Eq + Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn delete_program(&self, program: Self::Program);
}

// The glow calls are only unsafe because they need a current context, which
// the backend contract already requires of the caller.
impl ShaderBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, stage.gl_enum()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }
}

/// Turns a raw info log into a diagnostic, dropping logs that carry no text.
pub fn diagnostic_log(raw: String) -> Option<String> {
    let trimmed = raw.trim_end_matches(['\0', '\n', '\r', ' ']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[rstest]
    #[case("", None)]
    #[case("\0", None)]
    #[case("\n", None)]
    #[case("ERROR: 0:1: syntax error\n", Some("ERROR: 0:1: syntax error"))]
    fn diagnostic_log_skips_empty_logs(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(diagnostic_log(raw.to_string()).as_deref(), expected);
    }

    #[test]
    fn stages_map_to_distinct_gl_enums() {
        let enums: Vec<u32> = ShaderStage::iter().map(|stage| stage.gl_enum()).collect();
        assert_eq!(enums, vec![glow::VERTEX_SHADER, glow::FRAGMENT_SHADER]);
    }

    #[test]
    fn stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
