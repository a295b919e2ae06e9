//! Per-iteration bookkeeping of the main loop, independent of the window
//! system.
//!
//! An iteration is `begin_iteration`, any number of `record_event` (and
//! `key`/`render` for the events that ask for them), then `end_iteration`,
//! which renders when the iteration carried no event and always updates
//! with the time measured at the start of the iteration.

use std::time::Instant;

use tracing::debug;

use crate::{callbacks::Callbacks, time::FrameClock};

pub struct FrameLoop<S, G = glow::Context> {
    callbacks: Callbacks<S, G>,
    state: Option<S>,
    clock: FrameClock,
    delta_time: f32,
    events_this_iteration: usize,
}

impl<S, G> FrameLoop<S, G> {
    pub fn new() -> Self {
        Self {
            callbacks: Callbacks::new(),
            state: None,
            clock: FrameClock::new(),
            delta_time: 0.0,
            events_this_iteration: 0,
        }
    }

    pub fn callbacks_mut(&mut self) -> &mut Callbacks<S, G> {
        &mut self.callbacks
    }

    /// Installs the application state. Callbacks are only dispatched once a
    /// state exists.
    pub fn start(&mut self, state: S) {
        self.start_at(state, Instant::now());
    }

    pub fn start_at(&mut self, state: S, now: Instant) {
        self.state = Some(state);
        self.clock = FrameClock::starting_at(now);
        self.delta_time = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the seconds elapsed since the previous iteration began.
    pub fn begin_iteration(&mut self) -> f32 {
        self.begin_iteration_at(Instant::now())
    }

    pub fn begin_iteration_at(&mut self, now: Instant) -> f32 {
        self.delta_time = self.clock.tick_at(now).as_secs_f32();
        self.events_this_iteration = 0;
        self.delta_time
    }

    pub fn record_event(&mut self) {
        self.events_this_iteration += 1;
    }

    pub fn key(&mut self, code: u8, pressed: bool) {
        if let Some(state) = self.state.as_mut() {
            self.callbacks.key(state, code, pressed);
        }
    }

    /// Runs the render callback, then `present` if it ran.
    pub fn render(&mut self, gl: &G, present: impl FnOnce()) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if !self.callbacks.render(state, gl) {
            return false;
        }
        present();
        true
    }

    /// Renders if nothing arrived this iteration, then updates. Returns
    /// whether a frame was rendered.
    pub fn end_iteration(&mut self, gl: Option<&G>, present: impl FnOnce()) -> bool {
        let rendered = match gl {
            Some(gl) if self.events_this_iteration == 0 => self.render(gl, present),
            _ => false,
        };
        if let Some(state) = self.state.as_mut() {
            self.callbacks.update(state, self.delta_time);
        }
        rendered
    }

    /// Drops the application state, then runs `release_platform`, so GL
    /// objects owned by the state go while the context is still current.
    pub fn shutdown(&mut self, release_platform: impl FnOnce()) {
        if let Some(state) = self.state.take() {
            drop(state);
            debug!("Application state released");
        }
        release_platform();
    }
}

impl<S, G> Default for FrameLoop<S, G> {
    fn default() -> Self {
        Self::new()
    }
}
