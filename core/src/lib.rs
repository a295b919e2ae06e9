extern crate glam;
extern crate glow;
extern crate strum;

pub mod callbacks;
pub mod frame_loop;
pub mod logging;
pub mod scene;
pub mod settings;
pub mod shaders;
pub mod test_utils;
pub mod time;
