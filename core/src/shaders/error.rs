use std::{fmt, io, path::PathBuf};

use crate::{logging, shaders::backend::ShaderStage};

#[derive(Debug)]
pub enum ShaderError {
    PathTooLong {
        path: PathBuf,
        len: usize,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    SourceTooLarge {
        path: PathBuf,
        len: u64,
    },
    /// The GL refused to hand out a shader or program object.
    PlatformResource(String),
    Compile {
        stage: ShaderStage,
        log: Option<String>,
    },
    StageMismatch {
        expected: ShaderStage,
        found: ShaderStage,
    },
    Link {
        log: Option<String>,
    },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::PathTooLong { path, len } => {
                write!(f, "shader path {:?} is too long ({} bytes)", path, len)
            }
            ShaderError::Io { path, source } => {
                write!(f, "failed to read shader source {:?}: {}", path, source)
            }
            ShaderError::SourceTooLarge { path, len } => {
                write!(f, "shader source {:?} is too large ({} bytes)", path, len)
            }
            ShaderError::PlatformResource(message) => {
                write!(f, "failed to allocate GL object: {}", message)
            }
            ShaderError::Compile { stage, log } => match log {
                Some(log) => write!(f, "error compiling {} shader:\n{}", stage, log),
                None => write!(f, "error compiling {} shader", stage),
            },
            ShaderError::StageMismatch { expected, found } => {
                write!(f, "expected a {} shader, got a {} shader", expected, found)
            }
            ShaderError::Link { log } => match log {
                Some(log) => write!(f, "error linking program:\n{}", log),
                None => write!(f, "error linking program"),
            },
        }
    }
}

impl std::error::Error for ShaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShaderError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Failure of the two-shader `init`, tagged with the stage that broke.
#[derive(Debug)]
pub enum ShaderInitError {
    Vertex(ShaderError),
    Fragment(ShaderError),
    Link(ShaderError),
}

impl ShaderInitError {
    /// Stage code reported to the caller: -1 vertex, -2 fragment, -3 link.
    pub fn code(&self) -> i32 {
        match self {
            ShaderInitError::Vertex(_) => -1,
            ShaderInitError::Fragment(_) => -2,
            ShaderInitError::Link(_) => -3,
        }
    }

    pub fn cause(&self) -> &ShaderError {
        match self {
            ShaderInitError::Vertex(err)
            | ShaderInitError::Fragment(err)
            | ShaderInitError::Link(err) => err,
        }
    }

    fn stage_name(&self) -> &'static str {
        match self {
            ShaderInitError::Vertex(_) => "vertex shader",
            ShaderInitError::Fragment(_) => "fragment shader",
            ShaderInitError::Link(_) => "program link",
        }
    }

    /// One line for the debug sink, without the compiler or linker log (that
    /// is logged where the failure happens). Capped like every diagnostic.
    pub fn summary(&self) -> String {
        let cause = match self.cause() {
            ShaderError::Compile { stage, .. } => format!("error compiling {} shader", stage),
            ShaderError::Link { .. } => "error linking program".to_string(),
            other => other.to_string(),
        };
        let summary = format!(
            "Init shader failed at {} ({}): {}",
            self.stage_name(),
            self.code(),
            cause
        );
        logging::truncate_message(&summary).to_string()
    }
}

impl fmt::Display for ShaderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed ({}): {}",
            self.stage_name(),
            self.code(),
            self.cause()
        )
    }
}

impl std::error::Error for ShaderInitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_error_codes_are_distinct_per_stage() {
        let vertex = ShaderInitError::Vertex(ShaderError::Compile {
            stage: ShaderStage::Vertex,
            log: None,
        });
        let fragment = ShaderInitError::Fragment(ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: None,
        });
        let link = ShaderInitError::Link(ShaderError::Link { log: None });

        assert_eq!(vertex.code(), -1);
        assert_eq!(fragment.code(), -2);
        assert_eq!(link.code(), -3);
    }

    #[test]
    fn summary_leaves_out_the_log() {
        let err = ShaderInitError::Fragment(ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: Some("0:3: undeclared identifier".to_string()),
        });
        assert_eq!(
            err.summary(),
            "Init shader failed at fragment shader (-2): error compiling fragment shader"
        );
    }

    #[test]
    fn summary_of_unbounded_causes_is_capped() {
        let err = ShaderInitError::Vertex(ShaderError::PlatformResource("x".repeat(10_000)));
        assert_eq!(err.summary().len(), logging::MAX_DEBUG_MESSAGE_LEN);
    }

    #[test]
    fn compile_error_display_includes_log() {
        let err = ShaderError::Compile {
            stage: ShaderStage::Fragment,
            log: Some("0:3: undeclared identifier".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "error compiling fragment shader:\n0:3: undeclared identifier"
        );
    }
}
