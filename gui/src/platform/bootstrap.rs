use std::{ffi::CStr, fmt, num::NonZeroU32, rc::Rc};

use glow::HasContext;
use glutin::{
    config::Config,
    context::{ContextApi, ContextAttributesBuilder, NotCurrentContext, Version},
    display::{Display, DisplayApiPreference},
    prelude::*,
    surface::{PbufferSurface, SurfaceAttributesBuilder, WindowSurface},
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use tracing::{debug, info, warn};
use winit::{dpi::PhysicalSize, event_loop::ActiveEventLoop, window::Window};

use super::{
    BootstrapError, BootstrapStage, DrawSurface, PlatformContext, WindowConfig,
    capabilities::SurfaceCapabilities,
};

/// Tracks how far bootstrap got so a failure can be reported against the
/// last stage that succeeded.
#[derive(Debug)]
struct Progress {
    stage: BootstrapStage,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: BootstrapStage::Uninit,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            debug!("Bootstrap: {} -> {}", self.stage, next);
            self.stage = next;
        }
    }
}

/// Brings up window, EGL display, config, surface and context, and loads
/// the GL entry points. Stages run in order; the first failure aborts.
pub fn bootstrap(
    event_loop: &ActiveEventLoop,
    config: &WindowConfig,
) -> Result<PlatformContext, BootstrapError> {
    let mut progress = Progress::new();
    let result = run_stages(event_loop, config, &mut progress);
    if let Err(err) = &result {
        warn!(
            "Bootstrap stopped after {} while reaching {}",
            progress.stage,
            err.stage()
        );
    }
    result
}

fn run_stages(
    event_loop: &ActiveEventLoop,
    config: &WindowConfig,
    progress: &mut Progress,
) -> Result<PlatformContext, BootstrapError> {
    let (width, height) = config.surface_size()?;

    let window = create_window(event_loop, config)?;
    let raw_window = window
        .window_handle()
        .map_err(BootstrapError::WindowHandle)?
        .as_raw();
    progress.advance();

    let display = create_display(event_loop, &window)?;
    let version = display.version_string();
    info!("EGL display: {}", version);
    progress.advance();

    let capabilities = SurfaceCapabilities::default();
    let gl_config = choose_config(&display, &capabilities, raw_window)?;
    progress.advance();

    let surface = create_surface(&display, &gl_config, raw_window, width, height)?;
    progress.advance();

    let context = create_context(&display, &gl_config, raw_window)?;
    let context = surface
        .make_current(context)
        .map_err(BootstrapError::MakeCurrent)?;
    progress.advance();

    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|symbol: &CStr| {
            display.get_proc_address(symbol)
        })
    };
    unsafe {
        gl.viewport(0, 0, width.get() as i32, height.get() as i32);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
    }
    progress.advance();
    info!(
        "Platform ready: {}x{} \"{}\"",
        width, height, config.title
    );

    Ok(PlatformContext {
        gl: Rc::new(gl),
        context,
        surface,
        config: gl_config,
        display,
        window,
    })
}

fn create_window(
    event_loop: &ActiveEventLoop,
    config: &WindowConfig,
) -> Result<Window, BootstrapError> {
    let attributes = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height))
        .with_resizable(false);
    event_loop
        .create_window(attributes)
        .map_err(BootstrapError::Window)
}

/// The window's own display connection is preferred; the event loop's
/// default display is the fallback.
fn create_display(
    event_loop: &ActiveEventLoop,
    window: &Window,
) -> Result<Display, BootstrapError> {
    with_fallback(
        "EGL display",
        || {
            let raw = window
                .display_handle()
                .map_err(BootstrapError::DisplayHandle)?
                .as_raw();
            unsafe { Display::new(raw, DisplayApiPreference::Egl) }
                .map_err(BootstrapError::Display)
        },
        || {
            let raw = event_loop
                .display_handle()
                .map_err(BootstrapError::DisplayHandle)?
                .as_raw();
            unsafe { Display::new(raw, DisplayApiPreference::Egl) }
                .map_err(BootstrapError::Display)
        },
    )
}

/// Takes the first config EGL offers for the requested capabilities.
fn choose_config(
    display: &Display,
    requested: &SurfaceCapabilities,
    raw_window: RawWindowHandle,
) -> Result<Config, BootstrapError> {
    let template = requested.template(raw_window);
    let chosen = unsafe { display.find_configs(template) }
        .map_err(BootstrapError::ChooseConfig)?
        .next()
        .ok_or(BootstrapError::NoMatchingConfig)?;

    let offered = SurfaceCapabilities::of(&chosen);
    if !requested.satisfied_by(&offered) {
        warn!(
            "Chosen config is below the request: wanted {:?}, got {:?}",
            requested, offered
        );
    }
    Ok(chosen)
}

/// A window surface when possible, otherwise an offscreen pbuffer of the
/// same size.
fn create_surface(
    display: &Display,
    config: &Config,
    raw_window: RawWindowHandle,
    width: NonZeroU32,
    height: NonZeroU32,
) -> Result<DrawSurface, BootstrapError> {
    with_fallback(
        "EGL surface",
        || {
            let attributes =
                SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
            unsafe { display.create_window_surface(config, &attributes) }
                .map(DrawSurface::Window)
                .map_err(BootstrapError::Surface)
        },
        || {
            let attributes = SurfaceAttributesBuilder::<PbufferSurface>::new().build(width, height);
            unsafe { display.create_pbuffer_surface(config, &attributes) }
                .map(DrawSurface::Offscreen)
                .map_err(BootstrapError::Surface)
        },
    )
}

fn create_context(
    display: &Display,
    config: &Config,
    raw_window: RawWindowHandle,
) -> Result<NotCurrentContext, BootstrapError> {
    let attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(2, 0))))
        .build(Some(raw_window));
    unsafe { display.create_context(config, &attributes) }.map_err(BootstrapError::Context)
}

/// Runs `primary`, and `fallback` only if it fails. The primary error is
/// logged; the fallback's error is the one returned.
fn with_fallback<T, E: fmt::Display>(
    what: &str,
    primary: impl FnOnce() -> Result<T, E>,
    fallback: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    match primary() {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("Failed to create {}: {}; trying fallback", what, err);
            fallback()
        }
    }
}
