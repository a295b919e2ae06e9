use std::{
    fmt,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, error};

use crate::{
    logging,
    shaders::{
        backend::{ShaderBackend, ShaderStage, diagnostic_log},
        error::ShaderError,
    },
};

pub const MAX_SHADER_PATH_LEN: usize = 260;
pub const MAX_SHADER_SOURCE_LEN: u64 = 1024 * 1024;

/// A compiled shader object. The GL handle is deleted when the unit drops.
pub struct ShaderUnit<B: ShaderBackend> {
    gl: Rc<B>,
    handle: B::Shader,
    stage: ShaderStage,
}

impl<B: ShaderBackend> ShaderUnit<B> {
    /// Reads `path` as a whole and compiles it as a `stage` shader.
    pub fn load(gl: &Rc<B>, stage: ShaderStage, path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref();
        let path_len = path.as_os_str().len();
        if path_len > MAX_SHADER_PATH_LEN {
            return Err(ShaderError::PathTooLong {
                path: path.to_path_buf(),
                len: path_len,
            });
        }

        let unit = Self::create(gl, stage)?;
        let source = read_source(path)?;
        let source = String::from_utf8(source).map_err(|err| {
            let log = format!("source is not valid UTF-8: {}", err.utf8_error());
            error!("Error compiling {} shader from {:?}: {}", stage, path, log);
            ShaderError::Compile {
                stage,
                log: Some(log),
            }
        })?;
        unit.compile(&source)?;

        debug!("Compiled {} shader from {:?}", stage, path);
        Ok(unit)
    }

    pub fn from_source(gl: &Rc<B>, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let unit = Self::create(gl, stage)?;
        unit.compile(source)?;
        Ok(unit)
    }

    fn create(gl: &Rc<B>, stage: ShaderStage) -> Result<Self, ShaderError> {
        let handle = gl
            .create_shader(stage)
            .map_err(ShaderError::PlatformResource)?;
        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            stage,
        })
    }

    fn compile(&self, source: &str) -> Result<(), ShaderError> {
        self.gl.shader_source(self.handle, source);
        self.gl.compile_shader(self.handle);

        if self.gl.shader_compile_status(self.handle) {
            return Ok(());
        }

        let log = diagnostic_log(self.gl.shader_info_log(self.handle));
        if let Some(log) = &log {
            error!(
                "Error compiling {} shader:\n{}",
                self.stage,
                logging::truncate_message(log)
            );
        }
        Err(ShaderError::Compile {
            stage: self.stage,
            log,
        })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> B::Shader {
        self.handle
    }
}

impl<B: ShaderBackend> Drop for ShaderUnit<B> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.handle);
    }
}

impl<B: ShaderBackend> fmt::Debug for ShaderUnit<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderUnit")
            .field("stage", &self.stage)
            .field("handle", &self.handle)
            .finish()
    }
}

/// Undecodable bytes are left to the caller, which reports them as a
/// compile failure of the stage being loaded.
fn read_source(path: &Path) -> Result<Vec<u8>, ShaderError> {
    let io_error = |source| ShaderError::Io {
        path: PathBuf::from(path),
        source,
    };

    let len = fs::metadata(path).map_err(io_error)?.len();
    if len > MAX_SHADER_SOURCE_LEN {
        return Err(ShaderError::SourceTooLarge {
            path: path.to_path_buf(),
            len,
        });
    }

    fs::read(path).map_err(io_error)
}
