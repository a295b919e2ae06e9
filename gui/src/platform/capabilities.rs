use glutin::config::{
    Api, ColorBufferType, Config, ConfigSurfaceTypes, ConfigTemplate, ConfigTemplateBuilder,
    GlConfig,
};
use raw_window_handle::RawWindowHandle;

/// Framebuffer capabilities requested from EGL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
    pub depth: u8,
    pub stencil: u8,
    pub samples: u8,
}

impl Default for SurfaceCapabilities {
    /// RGBA8, depth 8, stencil 8, 4x multisampling.
    fn default() -> Self {
        Self {
            red: 8,
            green: 8,
            blue: 8,
            alpha: 8,
            depth: 8,
            stencil: 8,
            samples: 4,
        }
    }
}

impl SurfaceCapabilities {
    /// Window-surface capable, ES2 renderable configs matching `self`.
    pub fn template(&self, native_window: RawWindowHandle) -> ConfigTemplate {
        ConfigTemplateBuilder::new()
            .with_buffer_type(ColorBufferType::Rgb {
                r_size: self.red,
                g_size: self.green,
                b_size: self.blue,
            })
            .with_alpha_size(self.alpha)
            .with_depth_size(self.depth)
            .with_stencil_size(self.stencil)
            .with_multisampling(self.samples)
            .with_surface_type(ConfigSurfaceTypes::WINDOW)
            .with_api(Api::GLES2)
            .compatible_with_native_window(native_window)
            .build()
    }

    /// What a chosen config actually provides.
    pub fn of(config: &Config) -> Self {
        let (red, green, blue) = match config.color_buffer_type() {
            Some(ColorBufferType::Rgb {
                r_size,
                g_size,
                b_size,
            }) => (r_size, g_size, b_size),
            _ => (0, 0, 0),
        };
        Self {
            red,
            green,
            blue,
            alpha: config.alpha_size(),
            depth: config.depth_size(),
            stencil: config.stencil_size(),
            samples: config.num_samples(),
        }
    }

    /// Whether `offered` meets or exceeds every requested size.
    pub fn satisfied_by(&self, offered: &SurfaceCapabilities) -> bool {
        offered.red >= self.red
            && offered.green >= self.green
            && offered.blue >= self.blue
            && offered.alpha >= self.alpha
            && offered.depth >= self.depth
            && offered.stencil >= self.stencil
            && offered.samples >= self.samples
    }
}
