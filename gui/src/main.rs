mod config;
mod driver;
mod platform;
mod render;
mod state;

use std::process::ExitCode;

use tracing::{error, info};
use triangle_core::logging::init_logging;
use winit::event_loop::EventLoop;

use config::AppConfig;
use driver::FrameDriver;
use state::AppState;

fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            init_logging(None);
            error!("Failed to load settings: {}", err);
            return ExitCode::FAILURE;
        }
    };
    init_logging(config.log_filter.as_deref());

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Failed to create the event loop: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let shader_paths = config.shaders.clone();
    let stats_interval = config.stats_interval;
    let mut driver = FrameDriver::new(config.window, move |gl| {
        AppState::new(gl, &shader_paths, stats_interval)
    });

    let callbacks = driver.callbacks_mut();
    callbacks.register_key(AppState::key);
    callbacks.register_render(AppState::render);
    callbacks.register_update(AppState::update);

    match driver.run(event_loop) {
        Ok(()) => {
            info!("Exited cleanly");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
