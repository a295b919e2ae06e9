//! In-memory stand-in for a GL context.
//!
//! Tracks every shader and program object it hands out so tests can check
//! for leaks, and "compiles" sources with a handful of GLSL-like rules:
//! a source needs a `main` function and balanced brackets, `#error` fails
//! compilation, fragment varyings must be declared by the vertex shader at
//! link time, and attribute locations follow declaration order.

use std::{
    cell::RefCell,
    collections::BTreeMap,
    num::NonZeroU32,
};

use crate::shaders::{ShaderBackend, ShaderStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MockHandle(NonZeroU32);

#[derive(Debug)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct MockProgram {
    attached: Vec<MockHandle>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
}

#[derive(Debug, Default)]
struct MockState {
    next_handle: u32,
    shaders: BTreeMap<MockHandle, MockShader>,
    programs: BTreeMap<MockHandle, MockProgram>,
    vertex_shaders_created: usize,
    fragment_shaders_created: usize,
    programs_created: usize,
    fail_shader_creation: bool,
    fail_program_creation: bool,
    error: u32,
}

impl MockState {
    fn allocate(&mut self) -> MockHandle {
        let handle = MockHandle(NonZeroU32::MIN.saturating_add(self.next_handle));
        self.next_handle += 1;
        handle
    }
}

#[derive(Debug, Default)]
pub struct MockGl {
    state: RefCell<MockState>,
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_shader_creation(&self) {
        self.state.borrow_mut().fail_shader_creation = true;
    }

    pub fn fail_next_program_creation(&self) {
        self.state.borrow_mut().fail_program_creation = true;
    }

    /// Shader objects currently alive, optionally only those of one stage.
    pub fn live_shaders(&self, stage: Option<ShaderStage>) -> usize {
        self.state
            .borrow()
            .shaders
            .values()
            .filter(|shader| stage.is_none_or(|stage| shader.stage == stage))
            .count()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn is_live_program(&self, program: MockHandle) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    pub fn created_shaders(&self) -> usize {
        let state = self.state.borrow();
        state.vertex_shaders_created + state.fragment_shaders_created
    }

    pub fn created_shaders_of(&self, stage: ShaderStage) -> usize {
        let state = self.state.borrow();
        match stage {
            ShaderStage::Vertex => state.vertex_shaders_created,
            ShaderStage::Fragment => state.fragment_shaders_created,
        }
    }

    pub fn created_programs(&self) -> usize {
        self.state.borrow().programs_created
    }

    /// Mimics `glUseProgram` + `glDrawArrays(GL_TRIANGLES, 0, count)`,
    /// raising the error flag the way a driver would.
    pub fn draw_triangles(&self, program: MockHandle, position: Option<u32>, count: i32) {
        let mut state = self.state.borrow_mut();
        let linked = state
            .programs
            .get(&program)
            .map(|program| program.linked)
            .unwrap_or(false);
        let attribute_count = state
            .programs
            .get(&program)
            .map(|program| program.attributes.len())
            .unwrap_or(0);

        if state.error != glow::NO_ERROR {
            return;
        }
        if !linked {
            state.error = glow::INVALID_OPERATION;
        } else if count < 0 {
            state.error = glow::INVALID_VALUE;
        } else if position.is_some_and(|location| location as usize >= attribute_count) {
            state.error = glow::INVALID_VALUE;
        }
    }

    /// Returns and clears the error flag, like `glGetError`.
    pub fn get_error(&self) -> u32 {
        std::mem::replace(&mut self.state.borrow_mut().error, glow::NO_ERROR)
    }
}

impl ShaderBackend for MockGl {
    type Shader = MockHandle;
    type Program = MockHandle;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_shader_creation) {
            return Err("out of shader objects".to_string());
        }
        match stage {
            ShaderStage::Vertex => state.vertex_shaders_created += 1,
            ShaderStage::Fragment => state.fragment_shaders_created += 1,
        }
        let handle = state.allocate();
        state.shaders.insert(
            handle,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(handle)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(shader) = self.state.borrow_mut().shaders.get_mut(&shader) {
            shader.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        if let Some(shader) = self.state.borrow_mut().shaders.get_mut(&shader) {
            match check_source(&shader.source) {
                Ok(()) => {
                    shader.compiled = true;
                    shader.log.clear();
                }
                Err(log) => {
                    shader.compiled = false;
                    shader.log = log;
                }
            }
        }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|shader| shader.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|shader| shader.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.fail_program_creation) {
            return Err("out of program objects".to_string());
        }
        state.programs_created += 1;
        let handle = state.allocate();
        state.programs.insert(handle, MockProgram::default());
        Ok(handle)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(program) = self.state.borrow_mut().programs.get_mut(&program) {
            program.attached.retain(|attached| *attached != shader);
        }
    }

    fn link_program(&self, program: Self::Program) {
        let mut state = self.state.borrow_mut();
        let Some(attached) = state
            .programs
            .get(&program)
            .map(|program| program.attached.clone())
        else {
            return;
        };

        let result = link_sources(
            attached
                .iter()
                .filter_map(|handle| state.shaders.get(handle))
                .collect(),
        );

        if let Some(program) = state.programs.get_mut(&program) {
            match result {
                Ok(attributes) => {
                    program.linked = true;
                    program.attributes = attributes;
                    program.log.clear();
                }
                Err(log) => {
                    program.linked = false;
                    program.attributes.clear();
                    program.log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|program| program.log.clone())
            .unwrap_or_default()
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let program = state.programs.get(&program).filter(|program| program.linked)?;
        program
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .map(|index| index as u32)
    }

    fn delete_program(&self, program: Self::Program) {
        self.state.borrow_mut().programs.remove(&program);
    }
}

fn check_source(source: &str) -> Result<(), String> {
    if let Some((line, _)) = source
        .lines()
        .enumerate()
        .find(|(_, text)| text.trim_start().starts_with("#error"))
    {
        return Err(format!("ERROR: 0:{}: '#error' : user error\n", line + 1));
    }

    let mut depth: i64 = 0;
    for (line, text) in source.lines().enumerate() {
        for c in text.chars() {
            match c {
                '{' | '(' => depth += 1,
                '}' | ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("ERROR: 0:{}: '{}' : syntax error\n", line + 1, c));
            }
        }
    }
    if depth != 0 {
        let last_line = source.lines().count();
        return Err(format!(
            "ERROR: 0:{}: '' : syntax error: unexpected end of file\n",
            last_line
        ));
    }

    if !source.contains("void main") {
        return Err("ERROR: 0:0: 'main' : function not defined\n".to_string());
    }

    Ok(())
}

/// Names declared by `qualifier <type> <name>;` lines, in order.
fn declarations(source: &str, qualifier: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix(qualifier))
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .filter_map(|rest| rest.split_whitespace().last())
        .map(|name| name.trim_end_matches(';').to_string())
        .collect()
}

fn link_sources(shaders: Vec<&MockShader>) -> Result<Vec<String>, String> {
    let vertex: Vec<&&MockShader> = shaders
        .iter()
        .filter(|shader| shader.stage == ShaderStage::Vertex)
        .collect();
    let fragment: Vec<&&MockShader> = shaders
        .iter()
        .filter(|shader| shader.stage == ShaderStage::Fragment)
        .collect();

    let (vertex, fragment) = match (vertex.as_slice(), fragment.as_slice()) {
        ([vertex], [fragment]) => (vertex, fragment),
        _ => {
            return Err(
                "ERROR: program needs exactly one vertex and one fragment shader\n".to_string(),
            );
        }
    };

    if !vertex.compiled || !fragment.compiled {
        return Err("ERROR: attached shader is not compiled\n".to_string());
    }

    let outputs = declarations(&vertex.source, "varying");
    for input in declarations(&fragment.source, "varying") {
        if !outputs.contains(&input) {
            return Err(format!(
                "ERROR: Varying {} is not written by the vertex shader\n",
                input
            ));
        }
    }

    Ok(declarations(&vertex.source, "attribute"))
}
