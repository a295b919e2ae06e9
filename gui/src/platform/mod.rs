//! Native window + EGL context.
//!
//! [`bootstrap::bootstrap`] walks the [`BootstrapStage`]s in order and
//! returns a [`PlatformContext`] that owns every platform handle until
//! [`PlatformContext::shutdown`] releases them.

pub mod bootstrap;
pub mod capabilities;
pub mod keys;

use std::{fmt, num::NonZeroU32, rc::Rc};

use glow::HasContext;
use glutin::{
    config::{Config, GlConfig},
    context::{NotCurrentContext, PossiblyCurrentContext},
    display::Display,
    prelude::*,
    surface::{PbufferSurface, Surface, WindowSurface},
};
use glutin_winit::GlWindow;
use raw_window_handle::HandleError;
use strum::{Display as StrumDisplay, EnumIter};
use tracing::{debug, info, warn};
use winit::{dpi::PhysicalSize, error::OsError, window::Window};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl WindowConfig {
    pub fn surface_size(&self) -> Result<(NonZeroU32, NonZeroU32), BootstrapError> {
        match (NonZeroU32::new(self.width), NonZeroU32::new(self.height)) {
            (Some(width), Some(height)) => Ok((width, height)),
            _ => Err(BootstrapError::InvalidSize {
                width: self.width,
                height: self.height,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, StrumDisplay)]
pub enum BootstrapStage {
    Uninit,
    WindowCreated,
    DisplayReady,
    ConfigChosen,
    SurfaceCreated,
    ContextCurrent,
    Ready,
}

impl BootstrapStage {
    pub fn next(self) -> Option<Self> {
        match self {
            BootstrapStage::Uninit => Some(BootstrapStage::WindowCreated),
            BootstrapStage::WindowCreated => Some(BootstrapStage::DisplayReady),
            BootstrapStage::DisplayReady => Some(BootstrapStage::ConfigChosen),
            BootstrapStage::ConfigChosen => Some(BootstrapStage::SurfaceCreated),
            BootstrapStage::SurfaceCreated => Some(BootstrapStage::ContextCurrent),
            BootstrapStage::ContextCurrent => Some(BootstrapStage::Ready),
            BootstrapStage::Ready => None,
        }
    }
}

#[derive(Debug)]
pub enum BootstrapError {
    InvalidSize { width: u32, height: u32 },
    Window(OsError),
    WindowHandle(HandleError),
    DisplayHandle(HandleError),
    Display(glutin::error::Error),
    ChooseConfig(glutin::error::Error),
    NoMatchingConfig,
    Surface(glutin::error::Error),
    Context(glutin::error::Error),
    MakeCurrent(glutin::error::Error),
}

impl BootstrapError {
    /// The stage that could not be reached.
    pub fn stage(&self) -> BootstrapStage {
        match self {
            BootstrapError::InvalidSize { .. }
            | BootstrapError::Window(_)
            | BootstrapError::WindowHandle(_) => BootstrapStage::WindowCreated,
            BootstrapError::DisplayHandle(_) | BootstrapError::Display(_) => {
                BootstrapStage::DisplayReady
            }
            BootstrapError::ChooseConfig(_) | BootstrapError::NoMatchingConfig => {
                BootstrapStage::ConfigChosen
            }
            BootstrapError::Surface(_) => BootstrapStage::SurfaceCreated,
            BootstrapError::Context(_) | BootstrapError::MakeCurrent(_) => {
                BootstrapStage::ContextCurrent
            }
        }
    }
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapError::InvalidSize { width, height } => {
                write!(f, "invalid window size {}x{}", width, height)
            }
            BootstrapError::Window(err) => write!(f, "failed to create the window: {}", err),
            BootstrapError::WindowHandle(err) => {
                write!(f, "failed to get the native window handle: {}", err)
            }
            BootstrapError::DisplayHandle(err) => {
                write!(f, "failed to get a native display handle: {}", err)
            }
            BootstrapError::Display(err) => write!(f, "failed to get an EGLDisplay: {}", err),
            BootstrapError::ChooseConfig(err) => write!(f, "eglChooseConfig() failed: {}", err),
            BootstrapError::NoMatchingConfig => write!(f, "no EGLConfig matches the request"),
            BootstrapError::Surface(err) => write!(f, "failed to create EGL surface: {}", err),
            BootstrapError::Context(err) => write!(f, "failed to create EGL context: {}", err),
            BootstrapError::MakeCurrent(err) => {
                write!(f, "failed to make EGL context current: {}", err)
            }
        }
    }
}

impl std::error::Error for BootstrapError {}

/// The drawing surface, either on screen or the offscreen fallback.
pub enum DrawSurface {
    Window(Surface<WindowSurface>),
    Offscreen(Surface<PbufferSurface>),
}

impl DrawSurface {
    fn make_current(
        &self,
        context: NotCurrentContext,
    ) -> glutin::error::Result<PossiblyCurrentContext> {
        match self {
            DrawSurface::Window(surface) => context.make_current(surface),
            DrawSurface::Offscreen(surface) => context.make_current(surface),
        }
    }

    fn swap_buffers(&self, context: &PossiblyCurrentContext) -> glutin::error::Result<()> {
        match self {
            DrawSurface::Window(surface) => surface.swap_buffers(context),
            DrawSurface::Offscreen(surface) => surface.swap_buffers(context),
        }
    }

    pub fn is_offscreen(&self) -> bool {
        matches!(self, DrawSurface::Offscreen(_))
    }
}

/// Every platform handle needed to draw, owned for the life of the process.
pub struct PlatformContext {
    gl: Rc<glow::Context>,
    context: PossiblyCurrentContext,
    surface: DrawSurface,
    config: Config,
    display: Display,
    window: Window,
}

impl PlatformContext {
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn shared_gl(&self) -> Rc<glow::Context> {
        Rc::clone(&self.gl)
    }

    /// Shows the frame that was just rendered.
    pub fn present(&self) -> glutin::error::Result<()> {
        self.surface.swap_buffers(&self.context)
    }

    pub fn resize(&self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if let DrawSurface::Window(surface) = &self.surface {
            self.window.resize_surface(surface, &self.context);
        }
        unsafe {
            self.gl
                .viewport(0, 0, size.width as i32, size.height as i32);
        }
        debug!("Viewport resized to {}x{}", size.width, size.height);
    }

    /// Logs the GL implementation and the chosen framebuffer format.
    pub fn log_system_specs(&self) {
        let (vendor, renderer, version, extensions) = unsafe {
            (
                self.gl.get_parameter_string(glow::VENDOR),
                self.gl.get_parameter_string(glow::RENDERER),
                self.gl.get_parameter_string(glow::VERSION),
                self.gl.get_parameter_string(glow::EXTENSIONS),
            )
        };
        info!("Vendor: {}", vendor);
        info!("Renderer: {}", renderer);
        info!("OpenGL version supported {}", version);
        info!(
            "Framebuffer: {:?}, alpha {}, depth {}, stencil {}, {}x MSAA",
            self.config.color_buffer_type(),
            self.config.alpha_size(),
            self.config.depth_size(),
            self.config.stencil_size(),
            self.config.num_samples()
        );
        if self.surface.is_offscreen() {
            warn!("Rendering to an offscreen surface; nothing will be shown");
        }
        debug!("Extensions:\n{}", extensions);
    }

    /// Releases the platform in reverse order of creation: the context is
    /// released from the thread, then context, surface, display and window
    /// are dropped.
    pub fn shutdown(self) {
        let PlatformContext {
            gl,
            context,
            surface,
            config,
            display,
            window,
        } = self;

        drop(gl);
        match context.make_not_current() {
            Ok(context) => drop(context),
            Err(err) => warn!("Failed to release the EGL context: {}", err),
        }
        debug!("EGL context released");
        drop(surface);
        drop(config);
        drop(display);
        debug!("EGL display released");
        drop(window);
        info!("Platform shut down");
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn stages_advance_in_declaration_order() {
        let stages: Vec<BootstrapStage> = BootstrapStage::iter().collect();
        for pair in stages.windows(2) {
            assert_eq!(pair[0].next(), Some(pair[1]));
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(BootstrapStage::Ready.next(), None);
    }

    #[rstest]
    #[case(BootstrapError::InvalidSize { width: 0, height: 600 }, BootstrapStage::WindowCreated)]
    #[case(BootstrapError::DisplayHandle(HandleError::Unavailable), BootstrapStage::DisplayReady)]
    #[case(BootstrapError::NoMatchingConfig, BootstrapStage::ConfigChosen)]
    #[case(
        BootstrapError::Surface(glutin::error::ErrorKind::BadNativeWindow.into()),
        BootstrapStage::SurfaceCreated
    )]
    #[case(
        BootstrapError::MakeCurrent(glutin::error::ErrorKind::BadContext.into()),
        BootstrapStage::ContextCurrent
    )]
    fn errors_name_the_stage_they_block(
        #[case] error: BootstrapError,
        #[case] stage: BootstrapStage,
    ) {
        assert_eq!(error.stage(), stage);
    }

    #[rstest]
    #[case(800, 600, true)]
    #[case(0, 600, false)]
    #[case(800, 0, false)]
    fn surface_size_must_be_non_zero(
        #[case] width: u32,
        #[case] height: u32,
        #[case] valid: bool,
    ) {
        let config = WindowConfig {
            title: "Framework".to_string(),
            width,
            height,
        };
        assert_eq!(config.surface_size().is_ok(), valid);
    }
}
