//! Per-frame callbacks registered by the application.
//!
//! At most one callback of each kind is held; registering a second one
//! replaces the first. Dispatching a kind nobody registered does nothing.

use tracing::debug;

pub type RenderFn<S, G> = Box<dyn FnMut(&mut S, &G)>;
pub type UpdateFn<S> = Box<dyn FnMut(&mut S, f32)>;
pub type KeyFn<S> = Box<dyn FnMut(&mut S, u8, bool)>;

/// Callbacks over an application state `S`, rendering through `G`.
pub struct Callbacks<S, G = glow::Context> {
    render: Option<RenderFn<S, G>>,
    update: Option<UpdateFn<S>>,
    key: Option<KeyFn<S>>,
}

impl<S, G> Callbacks<S, G> {
    pub fn new() -> Self {
        Self {
            render: None,
            update: None,
            key: None,
        }
    }

    pub fn register_render(&mut self, callback: impl FnMut(&mut S, &G) + 'static) {
        if self.render.replace(Box::new(callback)).is_some() {
            debug!("Replaced render callback");
        }
    }

    pub fn register_update(&mut self, callback: impl FnMut(&mut S, f32) + 'static) {
        if self.update.replace(Box::new(callback)).is_some() {
            debug!("Replaced update callback");
        }
    }

    pub fn register_key(&mut self, callback: impl FnMut(&mut S, u8, bool) + 'static) {
        if self.key.replace(Box::new(callback)).is_some() {
            debug!("Replaced key callback");
        }
    }

    /// Returns whether a render callback ran.
    pub fn render(&mut self, state: &mut S, gl: &G) -> bool {
        match self.render.as_mut() {
            Some(render) => {
                render(state, gl);
                true
            }
            None => false,
        }
    }

    pub fn update(&mut self, state: &mut S, delta_time: f32) {
        if let Some(update) = self.update.as_mut() {
            update(state, delta_time);
        }
    }

    pub fn key(&mut self, state: &mut S, code: u8, pressed: bool) {
        if let Some(key) = self.key.as_mut() {
            key(state, code, pressed);
        }
    }
}

impl<S, G> Default for Callbacks<S, G> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    #[fixture]
    fn callbacks() -> Callbacks<Recorder, ()> {
        Callbacks::new()
    }

    #[rstest]
    fn unregistered_callbacks_are_no_ops(mut callbacks: Callbacks<Recorder, ()>) {
        let mut state = Recorder::default();
        assert!(!callbacks.render(&mut state, &()));
        callbacks.update(&mut state, 0.016);
        callbacks.key(&mut state, b'A', true);
        assert!(state.events.is_empty());
    }

    #[rstest]
    fn dispatch_reaches_registered_callbacks(mut callbacks: Callbacks<Recorder, ()>) {
        callbacks.register_render(|state: &mut Recorder, _| state.events.push("render".into()));
        callbacks.register_update(|state: &mut Recorder, dt| {
            state.events.push(format!("update {:.3}", dt))
        });
        callbacks.register_key(|state: &mut Recorder, code, pressed| {
            state.events.push(format!("key {} {}", code, pressed))
        });

        let mut state = Recorder::default();
        assert!(callbacks.render(&mut state, &()));
        callbacks.update(&mut state, 0.5);
        callbacks.key(&mut state, 0x1B, false);

        assert_eq!(state.events, vec!["render", "update 0.500", "key 27 false"]);
    }

    #[rstest]
    fn registering_again_overwrites(mut callbacks: Callbacks<Recorder, ()>) {
        callbacks.register_update(|state: &mut Recorder, _| state.events.push("first".into()));
        callbacks.register_update(|state: &mut Recorder, _| state.events.push("second".into()));

        let mut state = Recorder::default();
        callbacks.update(&mut state, 0.0);

        assert_eq!(state.events, vec!["second"]);
    }
}
