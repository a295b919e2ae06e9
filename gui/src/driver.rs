use std::{fmt, rc::Rc};

use tracing::{error, info, warn};
use triangle_core::{callbacks::Callbacks, frame_loop::FrameLoop};
use winit::{
    application::ApplicationHandler,
    error::EventLoopError,
    event::{ElementState, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::WindowId,
};

use crate::platform::{
    BootstrapError, PlatformContext, WindowConfig, bootstrap::bootstrap, keys::virtual_key_code,
};

type InitFn<S> = Box<dyn FnOnce(&Rc<glow::Context>) -> S>;

#[derive(Debug)]
pub enum DriverError {
    EventLoop(EventLoopError),
    Bootstrap(BootstrapError),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::EventLoop(err) => write!(f, "event loop error: {}", err),
            DriverError::Bootstrap(err) => write!(f, "platform bootstrap failed: {}", err),
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::EventLoop(err) => Some(err),
            DriverError::Bootstrap(err) => Some(err),
        }
    }
}

impl From<EventLoopError> for DriverError {
    fn from(err: EventLoopError) -> Self {
        DriverError::EventLoop(err)
    }
}

impl From<BootstrapError> for DriverError {
    fn from(err: BootstrapError) -> Self {
        DriverError::Bootstrap(err)
    }
}

/// Runs the platform and feeds its events to a [`FrameLoop`].
///
/// Every loop iteration measures the time since the previous one, handles
/// the queued events, renders once if nothing arrived, then always updates.
pub struct FrameDriver<S> {
    window_config: WindowConfig,
    init: Option<InitFn<S>>,
    frame_loop: FrameLoop<S>,
    platform: Option<PlatformContext>,
    fatal: Option<BootstrapError>,
}

impl<S> FrameDriver<S> {
    /// `init` runs once, right after the context is made current.
    pub fn new(
        window_config: WindowConfig,
        init: impl FnOnce(&Rc<glow::Context>) -> S + 'static,
    ) -> Self {
        Self {
            window_config,
            init: Some(Box::new(init)),
            frame_loop: FrameLoop::new(),
            platform: None,
            fatal: None,
        }
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks<S> {
        self.frame_loop.callbacks_mut()
    }

    pub fn run(mut self, event_loop: EventLoop<()>) -> Result<(), DriverError> {
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;

        match self.fatal.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

fn present(platform: Option<&PlatformContext>) {
    if let Some(Err(err)) = platform.map(PlatformContext::present) {
        warn!("Failed to swap buffers: {}", err);
    }
}

impl<S> ApplicationHandler for FrameDriver<S> {
    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if matches!(cause, StartCause::Init) {
            return;
        }
        self.frame_loop.begin_iteration();
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.platform.is_some() || self.fatal.is_some() {
            return;
        }

        let platform = match bootstrap(event_loop, &self.window_config) {
            Ok(platform) => platform,
            Err(err) => {
                error!("Platform bootstrap failed at {}: {}", err.stage(), err);
                self.fatal = Some(err);
                event_loop.exit();
                return;
            }
        };
        platform.log_system_specs();

        if let Some(init) = self.init.take() {
            self.frame_loop.start(init(&platform.shared_gl()));
        }
        self.platform = Some(platform);
        info!("Entering main loop");
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.frame_loop.record_event();

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(code) = virtual_key_code(&event.logical_key) {
                    self.frame_loop
                        .key(code, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(platform) = self.platform.as_ref() {
                    self.frame_loop
                        .render(platform.gl(), || present(Some(platform)));
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(platform) = self.platform.as_ref() {
                    platform.resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let platform = self.platform.as_ref();
        self.frame_loop
            .end_iteration(platform.map(PlatformContext::gl), || present(platform));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        let platform = self.platform.take();
        self.frame_loop.shutdown(|| {
            if let Some(platform) = platform {
                platform.shutdown();
            }
        });
    }
}
